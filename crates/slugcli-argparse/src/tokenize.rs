//! Token normalization.
//!
//! `-abc` becomes `-a -b -c` and `--name=value` becomes `--name value`, so the
//! matcher only ever sees one flag per token.

/// Normalize `args` (program name excluded), splitting joined short flags and
/// `--name=value` pairs. Order is preserved and nothing is validated.
pub fn normalize<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized = Vec::new();
    for arg in args {
        let arg = arg.as_ref();
        if is_short_cluster(arg) {
            tracing::trace!(token = arg, "expanding short flag cluster");
            normalized.extend(arg.chars().skip(1).map(|c| format!("-{c}")));
        } else if let Some((flag, value)) = split_long_assignment(arg) {
            tracing::trace!(token = arg, "splitting long flag assignment");
            normalized.push(flag.to_string());
            normalized.push(value.to_string());
        } else {
            normalized.push(arg.to_string());
        }
    }
    normalized
}

/// `-abc`: a dash, a non-dash second char, and more than two chars in total.
fn is_short_cluster(arg: &str) -> bool {
    let mut chars = arg.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| c != '-') && chars.next().is_some()
}

fn split_long_assignment(arg: &str) -> Option<(&str, &str)> {
    if !arg.starts_with("--") {
        return None;
    }
    arg.split_once('=')
}

/// Whether `arg` would be taken for a flag by the matcher (`-` alone is a value).
pub fn looks_like_option(arg: &str) -> bool {
    arg.starts_with('-') && arg != "-"
}
