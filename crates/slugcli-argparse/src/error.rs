use thiserror::Error;

/// A flag or command declaration that cannot be accepted.
///
/// These are raised while the embedding program is being configured, never
/// while argv is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclError {
    #[error("empty flag declaration")]
    EmptyFlags,

    #[error("flag declaration `{0}' has no alias")]
    MissingAlias(String),

    #[error("flag declaration `{flags}' has unexpected token `{token}'")]
    UnexpectedToken { flags: String, token: String },

    #[error("empty command declaration")]
    EmptyCommand,

    #[error("malformed argument `{arg}' in command `{command}'")]
    MalformedArgument { command: String, arg: String },

    /// A `<required>` slot follows an `[optional]` one.
    #[error("required argument `{required}' not allowed after optional argument `{optional}'")]
    RequiredAfterOptional { required: String, optional: String },

    #[error("option conflict: {alias} maps to both `{first}' and `{second}'")]
    AliasConflict {
        alias: String,
        first: String,
        second: String,
    },
}

/// A malformed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing required argument `{0}'")]
    MissingRequiredArgument(String),

    #[error("option `{flags}' argument missing{}", got_suffix(.got))]
    OptionMissingArgument { flags: String, got: Option<String> },

    #[error("unknown option `{0}'")]
    UnknownOption(String),
}

fn got_suffix(got: &Option<String>) -> String {
    match got {
        Some(flag) => format!(", got `{flag}'"),
        None => String::new(),
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_missing_argument_mentions_offending_flag() {
        let err = ParseError::OptionMissingArgument {
            flags: "-c, --config <path>".to_string(),
            got: Some("-v".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "option `-c, --config <path>' argument missing, got `-v'"
        );

        let err = ParseError::OptionMissingArgument {
            flags: "-c, --config <path>".to_string(),
            got: None,
        };
        assert_eq!(err.to_string(), "option `-c, --config <path>' argument missing");
    }
}
