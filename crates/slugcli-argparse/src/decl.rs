//! Declaration mini-language.
//!
//! Flags are declared as `"-c, --config <path>"` and commands as
//! `"tcp <port> [host]"`. Both are parsed once, at configuration time, into
//! immutable declarations.

use crate::error::DeclError;

/// Name reserved for the fallback command.
pub const WILDCARD: &str = "*";

/// How many tokens an option claims after itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Plain switch; bound to `"true"`.
    #[default]
    None,
    /// `<arg>`: the next token is mandatory.
    Required,
    /// `[arg]`: the next token is taken only if it is not itself a flag.
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    flags: String,
    short: Option<String>,
    long: Option<String>,
    name: String,
    value_name: Option<String>,
    description: String,
    kind: ValueKind,
    negated: bool,
    default_value: Option<String>,
    env: Option<String>,
}

impl OptionDecl {
    /// Parse a flag spec such as `"-v"`, `"-v, --verbose"`,
    /// `"-c, --config <path>"`, `"-c, --config [path]"` or `"-T, --no-tests"`.
    ///
    /// Aliases may be separated by spaces, commas or `|`.
    pub fn parse(flags: &str, description: impl Into<String>) -> Result<Self, DeclError> {
        let mut short = None;
        let mut long = None;
        let mut kind = ValueKind::None;
        let mut value_name = None;

        let tokens = flags
            .split([' ', ',', '|'])
            .filter(|t| !t.is_empty());
        for token in tokens {
            if kind != ValueKind::None {
                return Err(unexpected(flags, token));
            }
            if let Some(inner) = strip_brackets(token, '<', '>') {
                kind = ValueKind::Required;
                value_name = Some(inner.to_string());
            } else if let Some(inner) = strip_brackets(token, '[', ']') {
                kind = ValueKind::Optional;
                value_name = Some(inner.to_string());
            } else if token.starts_with("--") && token.len() > 2 && long.is_none() {
                long = Some(token.to_string());
            } else if token.starts_with('-') && !token.starts_with("--") && token.len() > 1
                && short.is_none()
            {
                short = Some(token.to_string());
            } else {
                return Err(unexpected(flags, token));
            }
        }

        let name = if let Some(l) = &long {
            l[2..].replace("no-", "")
        } else if let Some(s) = &short {
            s[1..].to_string()
        } else if flags.trim().is_empty() {
            return Err(DeclError::EmptyFlags);
        } else {
            return Err(DeclError::MissingAlias(flags.to_string()));
        };
        let negated = long.as_deref().is_some_and(|l| l.contains("no-"));

        Ok(Self {
            flags: flags.to_string(),
            short,
            long,
            name,
            value_name,
            description: description.into(),
            kind,
            negated,
            default_value: None,
            env: None,
        })
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Read the value from this environment variable when argv does not set it.
    pub fn with_env(mut self, key: impl Into<String>) -> Self {
        self.env = Some(key.into());
        self
    }

    /// The declaration exactly as written.
    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// Canonical name: the long alias with `--` and every `no-` removed, or
    /// the short alias without `-` when there is no long one.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_name(&self) -> Option<&str> {
        self.value_name.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.kind == ValueKind::Required
    }

    pub fn is_optional(&self) -> bool {
        self.kind == ValueKind::Optional
    }

    /// True when the long alias contains `no-` anywhere.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// Whether `token` is exactly one of this option's aliases.
    pub fn matches(&self, token: &str) -> bool {
        self.short.as_deref() == Some(token) || self.long.as_deref() == Some(token)
    }

    pub(crate) fn aliases(&self) -> impl Iterator<Item = &str> {
        self.short.as_deref().into_iter().chain(self.long.as_deref())
    }
}

fn strip_brackets(token: &str, open: char, close: char) -> Option<&str> {
    token.strip_prefix(open)?.strip_suffix(close)
}

fn unexpected(flags: &str, token: &str) -> DeclError {
    DeclError::UnexpectedToken {
        flags: flags.to_string(),
        token: token.to_string(),
    }
}

/// A positional slot from a command's syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDecl {
    pub name: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDecl {
    name: String,
    syntax: String,
    description: String,
    body: String,
    args: Vec<ArgDecl>,
    options: Vec<OptionDecl>,
}

impl CommandDecl {
    /// Parse a command syntax such as `"tcp <port> [host]"` or `"*"`.
    ///
    /// Words other than the name and `<..>`/`[..]` slots are kept in the
    /// syntax string for help output and otherwise ignored.
    pub fn parse(syntax: &str, description: impl Into<String>) -> Result<Self, DeclError> {
        let mut words = syntax.split_whitespace();
        let name = words.next().ok_or(DeclError::EmptyCommand)?.to_string();

        let mut args: Vec<ArgDecl> = Vec::new();
        for word in words {
            let (required, inner) = if word.starts_with('<') {
                (true, strip_brackets(word, '<', '>'))
            } else if word.starts_with('[') {
                (false, strip_brackets(word, '[', ']'))
            } else {
                continue;
            };
            let inner = inner.filter(|s| !s.is_empty()).ok_or_else(|| {
                DeclError::MalformedArgument {
                    command: name.clone(),
                    arg: word.to_string(),
                }
            })?;

            if required {
                if let Some(prev) = args.iter().find(|a| !a.required) {
                    return Err(DeclError::RequiredAfterOptional {
                        required: word.to_string(),
                        optional: prev.name.clone(),
                    });
                }
            }
            args.push(ArgDecl {
                name: inner.to_string(),
                required,
            });
        }

        Ok(Self {
            name,
            syntax: syntax.trim().to_string(),
            description: description.into(),
            body: String::new(),
            args,
            options: Vec::new(),
        })
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a command-local option.
    pub fn with_option(mut self, option: OptionDecl) -> Result<Self, DeclError> {
        self.push_option(option)?;
        Ok(self)
    }

    pub fn push_option(&mut self, option: OptionDecl) -> Result<(), DeclError> {
        crate::registry::check_aliases(&self.options, &option)?;
        self.options.push(option);
        Ok(())
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn args(&self) -> &[ArgDecl] {
        &self.args
    }

    pub fn options(&self) -> &[OptionDecl] {
        &self.options
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }
}
