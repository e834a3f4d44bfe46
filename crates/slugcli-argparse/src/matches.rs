use std::collections::{HashMap, HashSet};

use crate::decl::OptionDecl;

/// Values bound by one parse.
///
/// Declarations are never mutated; every parse produces a fresh `Matches`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    options: HashMap<String, String>,
    explicit: HashSet<String>,
    args: HashMap<String, String>,
    rest: Vec<String>,
}

impl Matches {
    /// Value of an option by canonical name: argv, then env, then default.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(|s| s.as_str())
    }

    /// Whether an option has a value from any source.
    pub fn is_present(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Whether an option was given in argv (not env or default).
    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains(name)
    }

    /// Value bound to a positional argument slot.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(|s| s.as_str())
    }

    /// Positional tokens left over after every declared slot was filled.
    pub fn rest(&self) -> &[String] {
        self.rest.as_slice()
    }
}

impl Matches {
    pub(crate) fn set_option(&mut self, name: &str, value: impl Into<String>) {
        self.explicit.insert(name.to_string());
        self.options.insert(name.to_string(), value.into());
    }

    pub(crate) fn set_arg(&mut self, name: &str, value: impl Into<String>) {
        self.args.insert(name.to_string(), value.into());
    }

    pub(crate) fn push_rest(&mut self, value: String) {
        self.rest.push(value);
    }

    /// Fill options argv left unset, from `env` first and then the declared default.
    pub(crate) fn apply_fallbacks<'o>(
        &mut self,
        options: impl IntoIterator<Item = &'o OptionDecl>,
        env: &[(String, String)],
    ) {
        for option in options {
            if self.options.contains_key(option.name()) {
                continue;
            }
            let from_env = option
                .env()
                .and_then(|key| env.iter().find(|(k, _)| k == key))
                .map(|(_, v)| v.clone());
            if let Some(value) = from_env.or_else(|| option.default_value().map(str::to_string)) {
                self.options.insert(option.name().to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_prefer_env_over_default_and_keep_argv() {
        let config = OptionDecl::parse("-c, --config <path>", "")
            .unwrap()
            .with_env("DEVTOOL_CONFIG")
            .with_default("devtool.json");
        let level = OptionDecl::parse("-l, --level <n>", "")
            .unwrap()
            .with_default("1");
        let host = OptionDecl::parse("--host <addr>", "").unwrap();

        let env = vec![("DEVTOOL_CONFIG".to_string(), "env.json".to_string())];

        let mut m = Matches::default();
        m.set_option("level", "3");
        m.apply_fallbacks([&config, &level, &host], &env);

        assert_eq!(m.get("config"), Some("env.json"));
        assert!(!m.is_explicit("config"));
        assert_eq!(m.get("level"), Some("3"));
        assert!(m.is_explicit("level"));
        assert!(!m.is_present("host"));

        let mut m = Matches::default();
        m.apply_fallbacks([&config], &[]);
        assert_eq!(m.get("config"), Some("devtool.json"));
    }
}
