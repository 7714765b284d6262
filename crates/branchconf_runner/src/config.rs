//! Command configuration types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An external command to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program to run
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: HashMap<String, String>,
    /// Whether to run the program through `sudo`
    pub sudo: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            sudo: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self
    }

    /// The argv actually executed, with `sudo` prepended when requested.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        if self.sudo {
            argv.push("sudo".to_string());
        }
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .argv()
            .into_iter()
            .map(|arg| {
                if arg.contains(' ') || arg.contains('=') {
                    format!("'{}'", arg)
                } else {
                    arg
                }
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = CommandSpec::new("service")
            .args(["nginx", "restart"])
            .env("LANG", "C");

        assert_eq!(cmd.argv(), vec!["service", "nginx", "restart"]);
        assert_eq!(cmd.env.get("LANG"), Some(&"C".to_string()));
    }

    #[test]
    fn test_sudo_prefix() {
        let cmd = CommandSpec::new("service").arg("nginx").arg("restart").sudo(true);
        assert_eq!(cmd.argv(), vec!["sudo", "service", "nginx", "restart"]);
        assert_eq!(cmd.to_string(), "sudo service nginx restart");
    }

    #[test]
    fn test_display_quotes_arguments() {
        let cmd = CommandSpec::new("echo").arg("a b").arg("k=v");
        assert_eq!(cmd.to_string(), "echo 'a b' 'k=v'");
    }
}
