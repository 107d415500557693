// src/commands/utils/mod.rs
use crate::fs::FsError;

/// True if `--help` appears anywhere in the arguments.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help")
}

/// The short message coreutils prints for a filesystem error.
pub fn describe_fs_error(err: &FsError) -> &'static str {
    match err {
        FsError::NotFound { .. } => "No such file or directory",
        FsError::AlreadyExists { .. } => "File exists",
        FsError::IsDirectory { .. } => "Is a directory",
        FsError::NotDirectory { .. } => "Not a directory",
        FsError::NotEmpty { .. } => "Directory not empty",
    }
}

/// Split arguments into single-letter flags and operands. `--` ends flag
/// parsing; a lone `-` is an operand. Unknown letters are returned as errors.
pub fn parse_flags(args: &[String], allowed: &str) -> Result<(Vec<char>, Vec<String>), char> {
    let mut flags = Vec::new();
    let mut operands = Vec::new();
    let mut only_operands = false;

    for arg in args {
        if only_operands || arg == "-" || !arg.starts_with('-') {
            operands.push(arg.clone());
        } else if arg == "--" {
            only_operands = true;
        } else {
            for c in arg[1..].chars() {
                if !allowed.contains(c) {
                    return Err(c);
                }
                flags.push(c);
            }
        }
    }

    Ok((flags, operands))
}
