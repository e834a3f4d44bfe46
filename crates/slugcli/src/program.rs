use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use slugcli_argparse::{CommandDecl, DeclError, Invocation, OptionDecl, Registry, Resolution};

use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::help::{HELP_COMMAND, HELP_SYNTAX, HelpRenderer, PlainHelp, help_action, version_action};
use crate::report::{ErrorReporter, StderrReporter};
use crate::topic::Topic;

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A command matched by name (or through `*`) and its action ran.
    Ran(Invocation),
    /// Nothing matched; the fallback (`*`, else `help`) ran with its
    /// positional slots left unbound.
    Fallback(Invocation),
    /// `-h`/`--help` was given without a command; usage was printed.
    Help,
}

/// Declared commands, options and topics, plus the capabilities used to
/// print help and report errors.
pub struct Program {
    name: String,
    description: String,
    version: Option<String>,
    exe: String,
    args: Vec<String>,
    registry: Registry,
    topics: IndexMap<String, Topic>,
    dispatcher: Dispatcher,
    help: Box<dyn HelpRenderer>,
    reporter: Box<dyn ErrorReporter>,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// A program with only the implicit `help [cmd]` command.
    pub fn new() -> Self {
        let mut program = Self {
            name: String::new(),
            description: String::new(),
            version: None,
            exe: String::new(),
            args: Vec::new(),
            registry: Registry::new(),
            topics: IndexMap::new(),
            dispatcher: Dispatcher::default(),
            help: Box::new(PlainHelp),
            reporter: Box::new(StderrReporter),
        };
        let help = CommandDecl::parse(HELP_SYNTAX, "display help for [cmd]");
        debug_assert!(help.is_ok(), "`{HELP_SYNTAX}' must parse");
        if let Ok(help) = help {
            program.registry.add_command(help);
            program
                .dispatcher
                .set(HELP_COMMAND, Box::new(help_action));
        }
        program
    }

    /// Pretty name used in version output.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Short description printed at the top of usage.
    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Executable name shown in usage. Normally taken from `argv[0]`.
    pub fn set_exe(&mut self, exe: impl Into<String>) -> &mut Self {
        self.exe = exe.into();
        self
    }

    /// Set the version and register a `version` command that prints it.
    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version_as(
            version,
            "version",
            "output version number",
            "Displays the program's version number.",
        )
    }

    /// Like [`Program::version`] with a custom command syntax, description and body.
    pub fn version_as(
        &mut self,
        version: impl Into<String>,
        syntax: &str,
        description: &str,
        body: &str,
    ) -> &mut Self {
        self.version = Some(version.into());
        match CommandDecl::parse(syntax, description) {
            Ok(decl) => {
                let name = decl.name().to_string();
                self.registry.add_command(decl.with_body(body));
                self.dispatcher.set(name, Box::new(version_action));
            }
            Err(err) => tracing::warn!(%err, "version command not registered"),
        }
        self
    }

    /// Replace the help renderer.
    pub fn set_help(&mut self, help: impl HelpRenderer + 'static) -> &mut Self {
        self.help = Box::new(help);
        self
    }

    /// Replace the error reporter used by [`Program::parse`].
    pub fn set_reporter(&mut self, reporter: impl ErrorReporter + 'static) -> &mut Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Declare a global option from a flag spec such as `"-c, --config <path>"`.
    pub fn option(&mut self, flags: &str, description: &str) -> Result<&mut Self, DeclError> {
        self.option_decl(OptionDecl::parse(flags, description)?)
    }

    pub fn option_with_default(
        &mut self,
        flags: &str,
        description: &str,
        default_value: &str,
    ) -> Result<&mut Self, DeclError> {
        self.option_decl(OptionDecl::parse(flags, description)?.with_default(default_value))
    }

    pub fn option_decl(&mut self, option: OptionDecl) -> Result<&mut Self, DeclError> {
        self.registry.add_option(option)?;
        Ok(self)
    }

    /// Declare a command from a syntax such as `"tcp <port> [host]"`.
    pub fn command(
        &mut self,
        syntax: &str,
        description: &str,
    ) -> Result<CommandBuilder<'_>, DeclError> {
        let decl = CommandDecl::parse(syntax, description)?;
        let name = decl.name().to_string();
        self.registry.add_command(decl);
        Ok(CommandBuilder {
            program: self,
            name,
        })
    }

    /// Attach an action to a command that is already declared.
    pub fn action<F>(&mut self, command: &str, action: F) -> Result<&mut Self, Error>
    where
        F: Fn(&Program, &Invocation) -> anyhow::Result<()> + 'static,
    {
        if !self.registry.has_command(command) {
            return Err(Error::NoSuchCommand(command.to_string()));
        }
        self.dispatcher.set(command, Box::new(action));
        Ok(self)
    }

    pub fn topic(&mut self, name: &str, description: &str) -> &mut Topic {
        self.topics
            .entry(name.to_string())
            .and_modify(|t| {
                t.set_description(description);
            })
            .or_insert_with(|| Topic::new(name, description))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version_number(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Base name of `argv[0]` from the last run.
    pub fn exe(&self) -> &str {
        &self.exe
    }

    /// Positional tokens (command name included) from the last run.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn options(&self) -> &[OptionDecl] {
        self.registry.options()
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandDecl> {
        self.registry.commands()
    }

    pub fn find_command(&self, name: &str) -> Option<&CommandDecl> {
        self.registry.command(name)
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.values()
    }

    pub fn find_topic(&self, name: &str) -> Option<&Topic> {
        self.topics.get(name)
    }

    /// `<name> -- v <version>`, falling back to the executable name.
    pub fn version_text(&self) -> String {
        let name = if self.name.is_empty() {
            &self.exe
        } else {
            &self.name
        };
        format!(
            "{} -- v {}\n\n",
            name,
            self.version.as_deref().unwrap_or_default()
        )
    }

    /// Help for a command or topic named `subject`, else program usage.
    pub fn help_text(&self, subject: Option<&str>) -> String {
        if let Some(subject) = subject {
            if let Some(command) = self.registry.command(subject) {
                return self.help.command(command);
            }
            if let Some(topic) = self.topics.get(subject) {
                return self.help.topic(topic);
            }
        }
        self.help.usage(self)
    }

    /// Parse the process arguments and dispatch.
    ///
    /// This is the only place that exits: 0 after help, 1 after an error
    /// (reported through the error reporter).
    pub fn parse(&mut self) -> Outcome {
        let argv: Vec<String> = std::env::args_os()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let env: Vec<(String, String)> = std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect();

        match self.run_with_env(&argv, &env) {
            Ok(Outcome::Help) => exit(0),
            Ok(outcome) => outcome,
            Err(err) => exit(self.report_and_code(&err)),
        }
    }

    /// Hand `err` to the error reporter and return the exit code for it.
    fn report_and_code(&self, err: &Error) -> i32 {
        self.reporter.report(err);
        err.exit_code()
    }

    /// Parse `argv` (program name first) and dispatch, without touching the
    /// process environment.
    pub fn run<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<Outcome, Error> {
        self.run_with_env(argv, &[])
    }

    pub fn run_with_env<S: AsRef<str>>(
        &mut self,
        argv: &[S],
        env: &[(String, String)],
    ) -> Result<Outcome, Error> {
        let rest = match argv.split_first() {
            Some((bin, rest)) => {
                if let Some(base) = Path::new(bin.as_ref()).file_name() {
                    self.exe = base.to_string_lossy().into_owned();
                }
                rest
            }
            None => argv,
        };

        let parsed = slugcli_argparse::parse_with_env(&self.registry, rest, env)?;
        self.args = parsed.args;

        match parsed.resolution {
            Resolution::Command(invocation) => {
                self.dispatcher.dispatch(self, &invocation)?;
                Ok(Outcome::Ran(invocation))
            }
            Resolution::Help => {
                print!("{}", self.help.usage(self));
                Ok(Outcome::Help)
            }
            Resolution::NoCommand { matches, unknown } => {
                let fallback = self
                    .registry
                    .wildcard()
                    .or_else(|| self.registry.command(HELP_COMMAND));
                let Some(fallback) = fallback else {
                    print!("{}", self.help.usage(self));
                    return Ok(Outcome::Help);
                };
                tracing::debug!(command = fallback.name(), "no command matched, falling back");
                let invocation = Invocation {
                    command: fallback.name().to_string(),
                    invoked_as: None,
                    matches,
                    unknown,
                };
                self.dispatcher.dispatch(self, &invocation)?;
                Ok(Outcome::Fallback(invocation))
            }
        }
    }
}

fn exit(code: i32) -> ! {
    let _ = std::io::stdout().flush();
    std::process::exit(code)
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("exe", &self.exe)
            .field("version", &self.version)
            .field("registry", &self.registry)
            .field("topics", &self.topics)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Chained configuration of a freshly declared command.
pub struct CommandBuilder<'p> {
    program: &'p mut Program,
    name: String,
}

impl CommandBuilder<'_> {
    /// Add a command-local option.
    pub fn option(self, flags: &str, description: &str) -> Result<Self, DeclError> {
        self.option_decl(OptionDecl::parse(flags, description)?)
    }

    pub fn option_decl(self, option: OptionDecl) -> Result<Self, DeclError> {
        if let Some(command) = self.program.registry.command_mut(&self.name) {
            command.push_option(option)?;
        }
        Ok(self)
    }

    /// Long-form text for `help <command>`.
    pub fn body(self, body: &str) -> Self {
        if let Some(command) = self.program.registry.command_mut(&self.name) {
            command.set_body(body);
        }
        self
    }

    pub fn action<F>(self, action: F) -> Self
    where
        F: Fn(&Program, &Invocation) -> anyhow::Result<()> + 'static,
    {
        self.program.dispatcher.set(self.name.as_str(), Box::new(action));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use slugcli_argparse::ParseError;

    use super::*;

    type Calls = Rc<RefCell<Vec<String>>>;

    fn recording(calls: &Calls) -> impl Fn(&Program, &Invocation) -> anyhow::Result<()> + 'static {
        let calls = Rc::clone(calls);
        move |_, inv| {
            calls.borrow_mut().push(inv.command.clone());
            Ok(())
        }
    }

    fn device_tool(calls: &Calls) -> Program {
        let mut program = Program::new();
        program.set_name("Device Tool").version("0.1");
        program
            .option("-v, --verbose", "display verbose information")
            .unwrap();
        program
            .command("tcp <port>", "capture TCP packets on <port>")
            .unwrap()
            .option("-H, --host <addr>", "bind address")
            .unwrap()
            .action(recording(calls));
        program
    }

    #[test]
    fn dispatches_exactly_once() {
        let calls = Calls::default();
        let mut program = device_tool(&calls);

        let outcome = program.run(&["devtool", "-v", "tcp", "8080"]).unwrap();
        let Outcome::Ran(inv) = outcome else {
            panic!("expected Ran, got {outcome:?}");
        };
        assert_eq!(inv.matches.arg("port"), Some("8080"));
        assert_eq!(inv.matches.get("verbose"), Some("true"));
        assert_eq!(*calls.borrow(), vec!["tcp"]);
    }

    #[test]
    fn exe_and_args_come_from_the_last_run() {
        let calls = Calls::default();
        let mut program = device_tool(&calls);
        program
            .run(&["/usr/local/bin/devtool", "tcp", "1", "--host", "::1"])
            .unwrap();
        assert_eq!(program.exe(), "devtool");
        assert_eq!(program.args(), &["tcp".to_string(), "1".to_string()]);
    }

    #[test]
    fn unknown_options_reach_the_action() {
        let calls = Calls::default();
        let mut program = device_tool(&calls);
        let Outcome::Ran(inv) = program.run(&["devtool", "tcp", "1", "--bogus"]).unwrap() else {
            panic!("expected Ran");
        };
        assert_eq!(inv.unknown, vec!["--bogus"]);
    }

    #[test]
    fn parse_errors_skip_dispatch() {
        let calls = Calls::default();
        let mut program = device_tool(&calls);
        let err = program.run(&["devtool", "tcp"]).unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::MissingRequiredArgument(ref name)) if name == "port"
        ));
        assert!(calls.borrow().is_empty());

        let err = program.run(&["devtool", "--bogus"]).unwrap_err();
        assert_eq!(err.to_string(), "unknown option `--bogus'");
    }

    #[test]
    fn help_flag_without_command() {
        let calls = Calls::default();
        let mut program = device_tool(&calls);
        assert_eq!(program.run(&["devtool", "--help"]).unwrap(), Outcome::Help);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn no_command_falls_back_to_help() {
        let calls = Calls::default();
        let mut program = device_tool(&calls);
        let Outcome::Fallback(inv) = program.run(&["devtool"]).unwrap() else {
            panic!("expected Fallback");
        };
        assert_eq!(inv.command, "help");

        let Outcome::Fallback(inv) = program.run(&["devtool", "nope"]).unwrap() else {
            panic!("expected Fallback");
        };
        assert_eq!(inv.command, "help");
    }

    #[test]
    fn wildcard_is_preferred_over_help() {
        let calls = Calls::default();
        let mut program = device_tool(&calls);
        program
            .command("* [target]", "default action")
            .unwrap()
            .action(recording(&calls));

        let Outcome::Fallback(inv) = program.run(&["devtool"]).unwrap() else {
            panic!("expected Fallback");
        };
        assert_eq!(inv.command, "*");

        let Outcome::Ran(inv) = program.run(&["devtool", "deploy", "prod"]).unwrap() else {
            panic!("expected Ran");
        };
        assert_eq!(inv.invoked_as.as_deref(), Some("deploy"));
        assert_eq!(inv.matches.arg("target"), Some("prod"));
        assert_eq!(*calls.borrow(), vec!["*", "*"]);
    }

    #[test]
    fn fallback_leaves_wildcard_slots_unbound() {
        let calls = Calls::default();
        let mut program = device_tool(&calls);
        program
            .command("* <target>", "default action")
            .unwrap()
            .action(recording(&calls));

        let Outcome::Fallback(inv) = program.run(&["devtool", "-v"]).unwrap() else {
            panic!("expected Fallback");
        };
        assert_eq!(inv.command, "*");
        assert_eq!(inv.matches.arg("target"), None);
        assert_eq!(inv.matches.get("verbose"), Some("true"));
        assert_eq!(*calls.borrow(), vec!["*"]);

        let err = program.run(&["devtool", "deploy"]).unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::MissingRequiredArgument(ref name)) if name == "target"
        ));
    }

    #[derive(Clone, Default)]
    struct Collecting(Rc<RefCell<Vec<String>>>);

    impl ErrorReporter for Collecting {
        fn report(&self, error: &Error) {
            self.0.borrow_mut().push(error.to_string());
        }
    }

    #[test]
    fn failures_go_to_the_configured_reporter() {
        let calls = Calls::default();
        let reporter = Collecting::default();
        let mut program = device_tool(&calls);
        program.set_reporter(reporter.clone());

        let err = program.run(&["devtool", "tcp"]).unwrap_err();
        assert_eq!(program.report_and_code(&err), 1);
        assert_eq!(
            *reporter.0.borrow(),
            vec!["missing required argument `port'"]
        );
    }

    #[test]
    fn implicit_help_command_is_declared() {
        let program = Program::new();
        let help = program.find_command("help").unwrap();
        assert_eq!(help.args().len(), 1);
        assert_eq!(help.args()[0].name, "cmd");
        assert!(!help.args()[0].required);
    }

    #[test]
    fn version_text_prefers_the_pretty_name() {
        let calls = Calls::default();
        let mut program = device_tool(&calls);
        assert_eq!(program.version_text(), "Device Tool -- v 0.1\n\n");

        program.set_name("");
        program.run(&["devtool", "version"]).unwrap();
        assert_eq!(program.version_text(), "devtool -- v 0.1\n\n");
        assert_eq!(
            program.help_text(Some("version")),
            "Displays the program's version number.\n"
        );
    }

    #[test]
    fn action_requires_a_declared_command() {
        let mut program = Program::new();
        let err = program.action("nope", |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, Error::NoSuchCommand(ref name) if name == "nope"));
    }

    #[test]
    fn action_failures_are_wrapped() {
        let mut program = Program::new();
        program
            .command("tcp <port>", "")
            .unwrap()
            .action(|_, _| anyhow::bail!("port 80 is privileged"));
        let err = program.run(&["devtool", "tcp", "80"]).unwrap_err();
        assert_eq!(err.to_string(), "command `tcp' failed: port 80 is privileged");
    }

    #[test]
    fn declared_command_without_action_is_a_no_op() {
        let mut program = Program::new();
        program.command("ping <host>", "").unwrap();
        assert!(matches!(
            program.run(&["devtool", "ping", "a"]).unwrap(),
            Outcome::Ran(_)
        ));
    }
}
