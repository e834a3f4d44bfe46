use std::collections::HashMap;

use slugcli_argparse::Invocation;

use crate::error::Error;
use crate::program::Program;

/// Per-command callback. Unrecognized options are in `invocation.unknown`.
pub type Action = Box<dyn Fn(&Program, &Invocation) -> anyhow::Result<()>>;

/// Command name → action.
#[derive(Default)]
pub struct Dispatcher {
    actions: HashMap<String, Action>,
}

impl Dispatcher {
    pub fn set(&mut self, command: impl Into<String>, action: Action) {
        self.actions.insert(command.into(), action);
    }

    /// Run the action registered for `invocation.command`, once.
    ///
    /// A command declared without an action is a no-op.
    pub fn dispatch(&self, program: &Program, invocation: &Invocation) -> Result<(), Error> {
        let Some(action) = self.actions.get(&invocation.command) else {
            tracing::debug!(command = %invocation.command, "no action registered");
            return Ok(());
        };
        tracing::debug!(command = %invocation.command, "executing command");
        action(program, invocation).map_err(|source| Error::Action {
            command: invocation.command.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.actions.keys().collect();
        names.sort();
        f.debug_struct("Dispatcher").field("actions", &names).finish()
    }
}
