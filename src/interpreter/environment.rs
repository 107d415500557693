//! Script Environment
//!
//! Variable and function bindings visible during one script run.

use std::collections::HashMap;

use crate::parser::Token;

/// A function captured by `function name(params) ... end`.
///
/// The body is stored as raw tokens and is not validated.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Vec<Token>,
}

#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: HashMap<String, String>,
    functions: HashMap<String, FunctionDefinition>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a variable, or the empty string when it is not set.
    pub fn get(&self, name: &str) -> String {
        self.variables.get(name).cloned().unwrap_or_default()
    }

    /// Value of a variable only if it is set.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn unset(&mut self, name: &str) {
        self.variables.remove(name);
    }

    pub fn define_function(&mut self, name: impl Into<String>, parameters: Vec<String>, body: Vec<Token>) {
        let name = name.into();
        self.functions.insert(
            name.clone(),
            FunctionDefinition {
                name,
                parameters,
                body,
            },
        );
    }

    pub fn lookup_function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name)
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }
}
