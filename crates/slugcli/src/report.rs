use std::io::Write;

use crate::error::Error;

/// Where fatal errors go before the process exits.
pub trait ErrorReporter {
    fn report(&self, error: &Error);
}

/// Writes `\n  error: <message>\n\n` to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl StderrReporter {
    pub fn format(error: &Error) -> String {
        format!("\n  error: {error}\n\n")
    }
}

impl ErrorReporter for StderrReporter {
    fn report(&self, error: &Error) {
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(Self::format(error).as_bytes());
        let _ = stderr.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slugcli_argparse::ParseError;

    #[test]
    fn format_matches_classic_layout() {
        let err = Error::from(ParseError::MissingRequiredArgument("port".to_string()));
        assert_eq!(
            StderrReporter::format(&err),
            "\n  error: missing required argument `port'\n\n"
        );
    }

    #[test]
    fn action_failures_carry_the_command_name() {
        let err = Error::Action {
            command: "tcp".to_string(),
            source: anyhow::anyhow!("port 80 is privileged"),
        };
        assert_eq!(
            err.to_string(),
            "command `tcp' failed: port 80 is privileged"
        );
        assert_eq!(err.exit_code(), 1);
    }
}
