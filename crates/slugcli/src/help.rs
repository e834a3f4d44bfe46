//! Help rendering.
//!
//! The program only asks a [`HelpRenderer`] for strings; [`PlainHelp`] is the
//! default and can be swapped with `Program::set_help`.

use slugcli_argparse::{CommandDecl, Invocation};

use crate::program::Program;
use crate::topic::Topic;

/// Syntax of the implicit help command.
pub const HELP_SYNTAX: &str = "help [cmd]";
pub const HELP_COMMAND: &str = "help";

pub trait HelpRenderer {
    /// Program-wide usage: description, options, commands, topics.
    fn usage(&self, program: &Program) -> String;

    /// Text for `help <command>`.
    fn command(&self, command: &CommandDecl) -> String {
        let text = if command.body().is_empty() {
            command.description()
        } else {
            command.body()
        };
        format!("{}\n", text.trim_end())
    }

    /// Text for `help <topic>`.
    fn topic(&self, topic: &Topic) -> String {
        let text = if topic.body.is_empty() {
            &topic.description
        } else {
            &topic.body
        };
        format!("{}\n", text.trim_end())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHelp;

const INDENT: &str = "     ";
const GAP: usize = 3;

impl HelpRenderer for PlainHelp {
    fn usage(&self, program: &Program) -> String {
        let mut out = String::new();
        if !program.description().is_empty() {
            out.push_str(program.description());
            out.push_str("\n\n");
        }

        out.push_str("Usage:\n\n");
        out.push_str(&format!("         {}", program.exe()));
        if !program.options().is_empty() {
            out.push_str(" [options]");
        }
        if program.commands().next().is_some() {
            out.push_str(" command");
        }
        out.push_str("\n\n");

        if !program.options().is_empty() {
            out.push_str("Global options are:\n\n");
            let rows: Vec<(&str, String)> = program
                .options()
                .iter()
                .map(|o| {
                    let help = match o.default_value() {
                        Some(d) if !d.is_empty() => {
                            format!("{} (defaults to {d})", o.description())
                        }
                        _ => o.description().to_string(),
                    };
                    (o.flags(), help)
                })
                .collect();
            push_rows(&mut out, &rows);
            out.push('\n');
        }

        let commands: Vec<(&str, String)> = program
            .commands()
            .map(|c| (c.syntax(), c.description().to_string()))
            .collect();
        if !commands.is_empty() {
            out.push_str("The commands are:\n\n");
            push_rows(&mut out, &commands);
            out.push('\n');
            out.push_str(&format!(
                "Use \"{} help [command]\" for more information about a command.\n\n",
                program.exe()
            ));
        }

        let topics: Vec<(&str, String)> = program
            .topics()
            .map(|t| (t.name.as_str(), t.description.clone()))
            .collect();
        if !topics.is_empty() {
            out.push_str("Additional help topics:\n\n");
            push_rows(&mut out, &topics);
            out.push('\n');
            out.push_str(&format!(
                "Use \"{} help [topic]\" for more information about that topic.\n\n",
                program.exe()
            ));
        }

        out
    }
}

fn push_rows(out: &mut String, rows: &[(&str, String)]) {
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0) + GAP;
    for (left, help) in rows {
        out.push_str(&format!("{INDENT}{left:width$}{help}\n"));
    }
}

/// Action behind the implicit `help [cmd]` command.
pub fn help_action(program: &Program, invocation: &Invocation) -> anyhow::Result<()> {
    print!("{}", program.help_text(invocation.matches.arg("cmd")));
    Ok(())
}

/// Action behind the `version` command.
pub fn version_action(program: &Program, _: &Invocation) -> anyhow::Result<()> {
    print!("{}", program.version_text());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_tool() -> Program {
        let mut program = Program::new();
        program
            .set_name("Device Tool")
            .set_description("Device troubleshooting tool");
        program
            .option("-v, --verbose", "display verbose information")
            .unwrap();
        program
            .option_with_default("-c, --config <path>", "settings file", "devtool.json")
            .unwrap();
        program
            .command("tcp <port>", "capture TCP packets on <port>")
            .unwrap()
            .body("Captures TCP traffic.\n");
        program
            .topic("path", "setting the path for reading")
            .set_body("The path is read from $DEVTOOL_PATH.");
        program.set_exe("devtool");
        program
    }

    #[test]
    fn usage_lists_everything_in_declaration_order() {
        let text = PlainHelp.usage(&device_tool());
        assert!(text.starts_with("Device troubleshooting tool\n\nUsage:\n\n         devtool [options] command\n"));
        assert!(text.contains("Global options are:"));
        assert!(text.contains("-v, --verbose"));
        assert!(text.contains("settings file (defaults to devtool.json)"));
        assert!(text.contains("The commands are:"));
        let tcp = text.find("tcp <port>").unwrap();
        let help = text.find("help [cmd]").unwrap();
        assert!(help < tcp, "implicit help is declared first");
        assert!(text.contains("Use \"devtool help [command]\""));
        assert!(text.contains("Additional help topics:"));
        assert!(text.contains("setting the path for reading"));
    }

    #[test]
    fn rows_are_aligned() {
        let mut out = String::new();
        push_rows(
            &mut out,
            &[("-v", "short".to_string()), ("--verbose", "long".to_string())],
        );
        assert_eq!(out, "     -v          short\n     --verbose   long\n");
    }

    #[test]
    fn command_and_topic_prefer_body() {
        let program = device_tool();
        assert_eq!(program.help_text(Some("tcp")), "Captures TCP traffic.\n");
        assert_eq!(
            program.help_text(Some("path")),
            "The path is read from $DEVTOOL_PATH.\n"
        );
        assert_eq!(
            program.help_text(Some("help")),
            "display help for [cmd]\n"
        );
        assert_eq!(
            program.help_text(Some("nope")),
            PlainHelp.usage(&program)
        );
    }
}
