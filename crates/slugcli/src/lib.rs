//! Declare a command-line program's commands, flags and help topics, then
//! let [`Program::parse`] turn argv into one action call.
//!
//! ```no_run
//! use slugcli::Program;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut program = Program::new();
//!     program.set_description("Device troubleshooting tool").version("0.1");
//!     program.option("-v, --verbose", "display verbose information")?;
//!     program
//!         .command("tcp <port>", "capture TCP packets on <port>")?
//!         .action(|_, inv| {
//!             println!("capturing on {}", inv.matches.arg("port").unwrap_or_default());
//!             Ok(())
//!         });
//!     program.parse();
//!     Ok(())
//! }
//! ```
//!
//! Parsing itself lives in `slugcli-argparse`; this crate adds dispatch, help,
//! error reporting and JSON manifests.

mod dispatch;
mod error;
mod help;
mod manifest;
mod program;
mod report;
mod topic;

pub use dispatch::{Action, Dispatcher};
pub use error::Error;
pub use help::{HelpRenderer, PlainHelp};
pub use manifest::{CommandManifest, OptionManifest, ProgramManifest, TopicManifest};
pub use program::{CommandBuilder, Outcome, Program};
pub use report::{ErrorReporter, StderrReporter};
pub use topic::Topic;

pub use slugcli_argparse::{
    CommandDecl, DeclError, Invocation, Matches, OptionDecl, ParseError, ValueKind,
};
