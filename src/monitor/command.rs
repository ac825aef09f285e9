//! Shell-command detection strategy.
//!
//! Runs a user-configured command (typically an xrandr pipeline) and
//! takes each non-empty line of stdout as one monitor name. Unlike the
//! native strategy, the order is exactly what the command printed —
//! existing configs rely on that, so it is never sorted here.

use std::process::Command;

use tracing::debug;

use super::{DetectError, Detector, RawDisplays};

/// Detector that shells out to a configured command.
pub struct CommandDetector {
    command: String,
}

impl CommandDetector {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Detector for CommandDetector {
    fn enumerate(&self) -> Result<RawDisplays, DetectError> {
        debug!("running detection command: {}", self.command);
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()
            .map_err(DetectError::Spawn)?;

        if !output.status.success() {
            return Err(DetectError::CommandFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let outputs = parse_output(&String::from_utf8_lossy(&output.stdout));
        Ok(RawDisplays {
            outputs,
            primary_hint: None,
        })
    }
}

/// Split stdout into monitor names: one per line, trimmed, empty lines
/// dropped, order preserved.
fn parse_output(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_name_per_line() {
        assert_eq!(parse_output("eDP-1\nHDMI-1\n"), vec!["eDP-1", "HDMI-1"]);
    }

    #[test]
    fn trailing_blank_lines_are_discarded() {
        assert_eq!(parse_output("eDP-1\nHDMI-1\n\n"), vec!["eDP-1", "HDMI-1"]);
    }

    #[test]
    fn interior_whitespace_lines_are_discarded_and_names_trimmed() {
        assert_eq!(
            parse_output("  eDP-1  \n   \n\tHDMI-1\n"),
            vec!["eDP-1", "HDMI-1"]
        );
    }

    #[test]
    fn empty_output_yields_empty_list() {
        assert!(parse_output("").is_empty());
        assert!(parse_output("\n\n").is_empty());
    }

    #[test]
    fn command_order_is_preserved_not_sorted() {
        // The native strategy sorts; this one must not. "b" before "a"
        // stays that way.
        let detector = CommandDetector::new("printf 'b\\na\\n'");
        let raw = detector.enumerate().unwrap();
        assert_eq!(raw.outputs, vec!["b", "a"]);
        assert_eq!(raw.primary_hint, None);
    }

    #[test]
    fn nonzero_exit_is_a_command_failure() {
        let detector = CommandDetector::new("echo broken >&2; exit 3");
        match detector.enumerate() {
            Err(DetectError::CommandFailed { status, stderr }) => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }
}
