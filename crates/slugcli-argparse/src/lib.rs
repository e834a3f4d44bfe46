//! Argument normalization and command resolution for slugcli.
//!
//! The pipeline is:
//! - [`tokenize::normalize`]: `-abc` → `-a -b -c`, `--k=v` → `--k v`
//! - [`matcher::match_options`]: bind declared global options, split the rest
//!   into positional args and unknown flags
//! - [`resolve::resolve`]: pick a command (exact name, then `*`), bind its
//!   positional slots and command-local options
//!
//! [`parse`] and [`parse_with_env`] run all three. Nothing here prints or
//! exits; every failure comes back as a [`ParseError`].

pub mod decl;
mod error;
pub mod matcher;
mod matches;
pub mod registry;
pub mod resolve;
pub mod tokenize;

pub use decl::{ArgDecl, CommandDecl, OptionDecl, ValueKind, WILDCARD};
pub use error::{DeclError, ParseError, ParseResult};
pub use matcher::{Scan, Swallowed};
pub use matches::Matches;
pub use registry::Registry;
pub use resolve::{Invocation, Resolution};

/// Parse `argv` (program name excluded) against `registry`.
pub fn parse<S: AsRef<str>>(registry: &Registry, argv: &[S]) -> ParseResult<Parsed> {
    parse_with_env(registry, argv, &[])
}

/// Parse `argv` using `env` as a value source for options that declare one.
///
/// Value precedence is:
/// 1) argv
/// 2) env
/// 3) declared default
pub fn parse_with_env<S: AsRef<str>>(
    registry: &Registry,
    argv: &[S],
    env: &[(String, String)],
) -> ParseResult<Parsed> {
    let tokens = tokenize::normalize(argv);
    let scan = matcher::match_options(&tokens, registry.options())?;
    let args = scan.args.clone();

    let resolution = match resolve::resolve(registry, scan)? {
        Resolution::Command(mut inv) => {
            inv.matches.apply_fallbacks(registry.options(), env);
            if let Some(command) = registry.command(&inv.command) {
                inv.matches.apply_fallbacks(command.options(), env);
            }
            Resolution::Command(inv)
        }
        Resolution::NoCommand {
            mut matches,
            unknown,
        } => {
            matches.apply_fallbacks(registry.options(), env);
            Resolution::NoCommand { matches, unknown }
        }
        Resolution::Help => Resolution::Help,
    };

    Ok(Parsed {
        tokens,
        args,
        resolution,
    })
}

/// Full output of one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    /// argv after normalization.
    pub tokens: Vec<String>,
    /// Positional tokens seen by the resolver, command name included.
    pub args: Vec<String>,
    pub resolution: Resolution,
}
