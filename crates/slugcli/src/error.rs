use slugcli_argparse::{DeclError, ParseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Decl(#[from] DeclError),

    #[error("no command named `{0}' to attach an action to")]
    NoSuchCommand(String),

    #[error("command `{command}' failed: {source:#}")]
    Action {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
