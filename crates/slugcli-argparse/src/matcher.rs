//! Option matching over normalized tokens.

use crate::decl::{OptionDecl, ValueKind};
use crate::error::{ParseError, ParseResult};
use crate::matches::Matches;
use crate::registry::option_for;
use crate::tokenize::looks_like_option;

/// Result of one option scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    /// Non-option tokens, including everything after `--`.
    pub args: Vec<String>,
    /// Unrecognized option-like tokens, each possibly followed by its
    /// putative argument.
    pub unknown: Vec<String>,
    /// Values of the options that were recognized.
    pub matches: Matches,
    /// Which `unknown` entries are putative arguments taken from the
    /// positional stream.
    pub swallowed: Vec<Swallowed>,
}

/// `unknown[index]` was taken as an unknown flag's argument when `args` held
/// `position` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swallowed {
    pub index: usize,
    pub position: usize,
}

/// Split `tokens` into positional args and unknown options, binding every
/// token that names one of `options`.
///
/// An unrecognized flag takes the next token with it when that token does not
/// start with `-`, so `--bogus 8080` puts both in `unknown` and leaves no
/// positional behind.
pub fn match_options(tokens: &[String], options: &[OptionDecl]) -> ParseResult<Scan> {
    let mut scan = Scan::default();
    let mut literal = false;
    let mut i = 0usize;

    while i < tokens.len() {
        let arg = tokens[i].as_str();
        i += 1;

        if literal {
            scan.args.push(arg.to_string());
            continue;
        }
        if arg == "--" {
            literal = true;
            continue;
        }

        if let Some(option) = option_for(options, arg) {
            i += bind_option(option, tokens.get(i).map(String::as_str), &mut scan.matches)?;
            continue;
        }

        if arg.len() > 1 && arg.starts_with('-') {
            tracing::debug!(option = arg, "unknown option");
            scan.unknown.push(arg.to_string());
            if let Some(next) = tokens.get(i).filter(|n| !n.starts_with('-')) {
                scan.swallowed.push(Swallowed {
                    index: scan.unknown.len(),
                    position: scan.args.len(),
                });
                scan.unknown.push(next.clone());
                i += 1;
            }
            continue;
        }

        scan.args.push(arg.to_string());
    }

    Ok(scan)
}

/// Bind `option` using `next` as its candidate value. Returns how many extra
/// tokens were consumed (0 or 1).
pub(crate) fn bind_option(
    option: &OptionDecl,
    next: Option<&str>,
    matches: &mut Matches,
) -> ParseResult<usize> {
    match option.kind() {
        ValueKind::Required => {
            let value = match next {
                None => {
                    return Err(ParseError::OptionMissingArgument {
                        flags: option.flags().to_string(),
                        got: None,
                    });
                }
                Some(value) if looks_like_option(value) => {
                    return Err(ParseError::OptionMissingArgument {
                        flags: option.flags().to_string(),
                        got: Some(value.to_string()),
                    });
                }
                Some(value) => value,
            };
            matches.set_option(option.name(), value);
            Ok(1)
        }
        ValueKind::Optional => match next {
            Some(value) if !value.is_empty() && !looks_like_option(value) => {
                matches.set_option(option.name(), value);
                Ok(1)
            }
            _ => {
                matches.set_option(option.name(), "true");
                Ok(0)
            }
        },
        ValueKind::None => {
            matches.set_option(option.name(), "true");
            Ok(0)
        }
    }
}
