use async_trait::async_trait;
use crate::commands::{Command, CommandContext, CommandResult};

/// Clear screen and move the cursor home
pub const CLEAR_SEQUENCE: &str = "\x1B[2J\x1B[H";

pub struct ClearCommand;

#[async_trait]
impl Command for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn description(&self) -> &'static str {
        "Clear the terminal screen"
    }

    fn usage(&self) -> &'static str {
        "clear"
    }

    async fn execute(&self, _ctx: CommandContext) -> CommandResult {
        CommandResult::success(CLEAR_SEQUENCE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::fs::InMemoryFs;

    #[tokio::test]
    async fn test_clear_outputs_ansi_sequence() {
        let ctx = CommandContext {
            args: vec![],
            stdin: String::new(),
            cwd: "/".to_string(),
            fs: Arc::new(InMemoryFs::new()),
        };
        let result = ClearCommand.execute(ctx).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "\x1B[2J\x1B[H");
    }
}
