//! Command selection and positional binding.

use crate::decl::CommandDecl;
use crate::error::{ParseError, ParseResult};
use crate::matcher::{Scan, Swallowed, bind_option};
use crate::matches::Matches;
use crate::registry::{Registry, option_for};

/// A command selected and bound by one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Name of the selected command (`*` for the fallback).
    pub command: String,
    /// The token that selected the wildcard command, if the wildcard was used.
    pub invoked_as: Option<String>,
    pub matches: Matches,
    /// Unrecognized options left after command-local options were bound.
    pub unknown: Vec<String>,
}

impl Invocation {
    pub fn via_wildcard(&self) -> bool {
        self.invoked_as.is_some()
    }
}

/// What the resolver decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Command(Invocation),
    /// `-h`/`--help` was given and no command matched.
    Help,
    /// Nothing matched; the caller decides what to fall back to.
    NoCommand { matches: Matches, unknown: Vec<String> },
}

/// Select a command for `scan` and bind its positional slots.
pub fn resolve(registry: &Registry, scan: Scan) -> ParseResult<Resolution> {
    let Some(candidate) = scan.args.first().cloned() else {
        if help_requested(&scan.unknown) {
            tracing::debug!("help requested without a command");
            return Ok(Resolution::Help);
        }
        // Global flags with nothing to apply them to.
        if let Some(first) = scan.unknown.first() {
            return Err(ParseError::UnknownOption(first.clone()));
        }
        return Ok(no_command(scan));
    };

    if let Some(command) = registry.command(&candidate) {
        tracing::debug!(command = command.name(), "command selected");
        return bind(command, None, scan).map(Resolution::Command);
    }

    if let Some(command) = registry.wildcard() {
        tracing::debug!(token = candidate.as_str(), "falling back to wildcard command");
        return bind(command, Some(candidate), scan).map(Resolution::Command);
    }

    if help_requested(&scan.unknown) {
        tracing::debug!(token = candidate.as_str(), "help requested for unknown command");
        return Ok(Resolution::Help);
    }
    Ok(no_command(scan))
}

fn no_command(scan: Scan) -> Resolution {
    Resolution::NoCommand {
        matches: scan.matches,
        unknown: scan.unknown,
    }
}

/// Bind `scan.args[1..]` to `command`'s slots in declaration order, and its
/// local options to matching entries of `scan.unknown`.
fn bind(command: &CommandDecl, invoked_as: Option<String>, scan: Scan) -> ParseResult<Invocation> {
    let Scan {
        mut args,
        unknown,
        mut matches,
        swallowed,
    } = scan;

    let (unknown, restored) = bind_local_options(command, unknown, &swallowed, &mut matches)?;
    // Back into the positional stream at their original places, after the
    // command name. Same-position tokens go in reverse to keep their order.
    for (position, token) in restored.into_iter().rev() {
        let at = position.clamp(1, args.len().max(1));
        args.insert(at, token);
    }

    let mut tokens = args.into_iter().skip(1);
    for arg in command.args() {
        match tokens.next() {
            Some(value) => matches.set_arg(&arg.name, value),
            None if arg.required => {
                return Err(ParseError::MissingRequiredArgument(arg.name.clone()));
            }
            None => {}
        }
    }
    for value in tokens {
        matches.push_rest(value);
    }

    Ok(Invocation {
        command: command.name().to_string(),
        invoked_as,
        matches,
        unknown,
    })
}

/// Bind `command`'s own options out of `unknown`. Returns the entries left
/// unknown, and the putative arguments a local option did not take, with the
/// positional index they were taken from.
fn bind_local_options(
    command: &CommandDecl,
    unknown: Vec<String>,
    swallowed: &[Swallowed],
    matches: &mut Matches,
) -> ParseResult<(Vec<String>, Vec<(usize, String)>)> {
    if command.options().is_empty() {
        return Ok((unknown, Vec::new()));
    }

    let mut remaining = Vec::with_capacity(unknown.len());
    let mut restored = Vec::new();
    let mut i = 0usize;
    while i < unknown.len() {
        let token = unknown[i].as_str();
        i += 1;
        let Some(option) = option_for(command.options(), token) else {
            remaining.push(token.to_string());
            continue;
        };
        let consumed = bind_option(option, unknown.get(i).map(String::as_str), matches)?;
        let putative = swallowed.iter().find(|s| s.index == i);
        match (consumed, putative) {
            (0, Some(s)) => {
                restored.push((s.position, unknown[i].clone()));
                i += 1;
            }
            _ => i += consumed,
        }
    }
    Ok((remaining, restored))
}

fn help_requested(unknown: &[String]) -> bool {
    unknown.iter().any(|o| o == "--help" || o == "-h")
}
