//! Clipboard via the platform's copy command.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::Clipboard;

/// Candidate copy commands, in lookup order.
const CANDIDATES: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
];

/// Pipes text into the first copy command found on PATH.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Find a usable copy command. `None` when the platform has none.
    pub fn detect() -> Option<Self> {
        CANDIDATES.iter().find_map(|(name, args)| {
            which::which(name)
                .ok()
                .map(|path| Self::new(path, args.iter().map(|a| a.to_string()).collect()))
        })
    }
}

impl Clipboard for CommandClipboard {
    fn copy(&self, text: &str) -> bool {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Clipboard: failed to spawn {:?}: {}", self.program, e);
                return false;
            }
        };

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(text.as_bytes())
        {
            tracing::warn!("Clipboard: write failed: {}", e);
            let _ = child.kill();
            return false;
        }

        match child.wait() {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::warn!("Clipboard: {:?} did not finish: {}", self.program, e);
                false
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_copy_through_cat() {
        let Ok(cat) = which::which("cat") else {
            return;
        };
        let clipboard = CommandClipboard::new(cat, vec![]);
        assert!(clipboard.copy("receipt"));
    }

    #[test]
    fn test_missing_program_is_not_fatal() {
        let clipboard = CommandClipboard::new("/definitely/not/here", vec![]);
        assert!(!clipboard.copy("receipt"));
    }
}
