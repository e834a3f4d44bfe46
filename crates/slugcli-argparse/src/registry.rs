use indexmap::IndexMap;

use crate::decl::{CommandDecl, OptionDecl, WILDCARD};
use crate::error::DeclError;

/// Declared global options and commands, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    options: Vec<OptionDecl>,
    commands: IndexMap<String, CommandDecl>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a global option.
    ///
    /// Re-declaring the same flag spec replaces the earlier declaration; a
    /// different declaration reusing one of its aliases is rejected.
    pub fn add_option(&mut self, option: OptionDecl) -> Result<(), DeclError> {
        if let Some(slot) = self.options.iter_mut().find(|o| o.flags() == option.flags()) {
            *slot = option;
            return Ok(());
        }
        check_aliases(&self.options, &option)?;
        self.options.push(option);
        Ok(())
    }

    /// Declare a command. A command with the same name is replaced.
    pub fn add_command(&mut self, command: CommandDecl) {
        self.commands.insert(command.name().to_string(), command);
    }

    pub fn options(&self) -> &[OptionDecl] {
        &self.options
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandDecl> {
        self.commands.values()
    }

    pub fn command(&self, name: &str) -> Option<&CommandDecl> {
        self.commands.get(name)
    }

    pub fn command_mut(&mut self, name: &str) -> Option<&mut CommandDecl> {
        self.commands.get_mut(name)
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// The `*` fallback command, if declared.
    pub fn wildcard(&self) -> Option<&CommandDecl> {
        self.commands.get(WILDCARD)
    }

    /// Global option matching `token` exactly by short or long alias.
    pub fn option_for(&self, token: &str) -> Option<&OptionDecl> {
        option_for(&self.options, token)
    }
}

pub(crate) fn option_for<'a>(options: &'a [OptionDecl], token: &str) -> Option<&'a OptionDecl> {
    options.iter().find(|o| o.matches(token))
}

pub(crate) fn check_aliases(existing: &[OptionDecl], option: &OptionDecl) -> Result<(), DeclError> {
    for alias in option.aliases() {
        if let Some(prev) = option_for(existing, alias) {
            return Err(DeclError::AliasConflict {
                alias: alias.to_string(),
                first: prev.flags().to_string(),
                second: option.flags().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_for_matches_short_and_long() {
        let mut registry = Registry::new();
        assert!(registry.option_for("-v").is_none());

        registry
            .add_option(OptionDecl::parse("-v, --version", "display option").unwrap())
            .unwrap();

        assert_eq!(registry.option_for("-v").map(|o| o.name()), Some("version"));
        assert_eq!(
            registry.option_for("--version").map(|o| o.name()),
            Some("version")
        );
        assert!(registry.option_for("-f").is_none());
        assert!(registry.option_for("--foo").is_none());
    }

    #[test]
    fn redeclaring_same_flags_replaces() {
        let mut registry = Registry::new();
        registry
            .add_option(OptionDecl::parse("-f, --foo", "first").unwrap())
            .unwrap();
        registry
            .add_option(OptionDecl::parse("-f, --foo", "second").unwrap())
            .unwrap();
        assert_eq!(registry.options().len(), 1);
        assert_eq!(registry.options()[0].description(), "second");
    }

    #[test]
    fn alias_reuse_is_a_conflict() {
        let mut registry = Registry::new();
        registry
            .add_option(OptionDecl::parse("-v, --verbose", "").unwrap())
            .unwrap();
        let err = registry
            .add_option(OptionDecl::parse("-v, --version", "").unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            DeclError::AliasConflict {
                alias: "-v".to_string(),
                first: "-v, --verbose".to_string(),
                second: "-v, --version".to_string(),
            }
        );
    }

    #[test]
    fn commands_keep_declaration_order_and_wildcard() {
        let mut registry = Registry::new();
        registry.add_command(CommandDecl::parse("tcp <port>", "").unwrap());
        registry.add_command(CommandDecl::parse("udp <port>", "").unwrap());
        assert!(registry.wildcard().is_none());
        registry.add_command(CommandDecl::parse("* [target]", "").unwrap());

        let names: Vec<&str> = registry.commands().map(|c| c.name()).collect();
        assert_eq!(names, vec!["tcp", "udp", "*"]);
        assert!(registry.wildcard().is_some());
        assert!(registry.has_command("udp"));
    }
}
