//! # Command Module
//!
//! A small command registry in the style of a debugger's `command container`:
//! commands are grouped under named containers and invoked as
//! `<container> <command> [args...]`. The rest of the line is handed to the
//! command handler unparsed.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::consts::CONTAINER;
use crate::errors::{DebuggerError, Result};
use crate::feedback::Feedback;
use crate::host::DebuggerHost;
use crate::load::load_symbols;

type Handler<H> = fn(&mut H, &str) -> Result<Feedback>;

/// Commands grouped by container name.
pub struct CommandSet<H> {
    containers: HashMap<String, HashMap<String, Handler<H>>>,
}

impl<H: DebuggerHost> CommandSet<H> {
    pub fn new() -> Self {
        Self {
            containers: HashMap::new(),
        }
    }

    /// Adds an empty container. Adding one that exists is fine; the
    /// container keeps its commands.
    pub fn add_container(&mut self, name: &str) {
        self.containers.entry(name.to_string()).or_default();
        debug!("added command container '{name}'");
    }

    /// Registers a command under a container, creating the container on
    /// demand.
    ///
    /// # Errors
    ///
    /// [`DebuggerError::CommandExists`] if the container already has a
    /// command of that name.
    pub fn add_command(&mut self, container: &str, name: &str, handler: Handler<H>) -> Result<()> {
        let commands = self.containers.entry(container.to_string()).or_default();
        if commands.contains_key(name) {
            return Err(DebuggerError::CommandExists(format!("{container} {name}")));
        }
        commands.insert(name.to_string(), handler);
        debug!("registered command '{container} {name}'");

        Ok(())
    }

    /// Dispatches a full command line of the form
    /// `<container> <command> [args...]`.
    ///
    /// # Errors
    ///
    /// [`DebuggerError::UnknownContainer`] or
    /// [`DebuggerError::UnknownCommand`] when the line names nothing
    /// registered, plus whatever the handler returns.
    pub fn dispatch(&self, host: &mut H, line: &str) -> Result<Feedback> {
        let mut tokens = line.split_whitespace();
        let container = tokens.next().unwrap_or_default();
        let commands = self
            .containers
            .get(container)
            .ok_or_else(|| DebuggerError::UnknownContainer(container.to_string()))?;

        let name = tokens.next().unwrap_or_default();
        let handler = commands
            .get(name)
            .ok_or_else(|| DebuggerError::UnknownCommand(format!("{container} {name}")))?;

        let rest = tokens.collect::<Vec<&str>>().join(" ");
        handler(host, &rest)
    }
}

impl<H: DebuggerHost> Default for CommandSet<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers the `uefi` container and its commands.
pub fn register<H: DebuggerHost>(set: &mut CommandSet<H>) -> Result<()> {
    set.add_container(CONTAINER);
    set.add_command(CONTAINER, "load-symbols", load_symbols)?;
    info!("UEFI utility commands loaded");

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::addr::Addr;
    use crate::consts::PE_MAGIC;
    use crate::host::testing::FakeHost;

    #[test]
    fn test_dispatch_registered_command() {
        let mut set = CommandSet::new();
        register(&mut set).unwrap();
        let mut host = FakeHost::new().with_word(0x7000, PE_MAGIC);

        let feedback = set.dispatch(&mut host, "uefi load-symbols 0x7010").unwrap();

        assert!(matches!(
            feedback,
            Feedback::Plan(plan) if plan.base == Addr::from(0x7000usize)
        ));
        assert_eq!(host.commands.len(), 3);
    }

    #[test]
    fn test_dispatch_unknown_container() {
        let mut set = CommandSet::new();
        register(&mut set).unwrap();
        let mut host = FakeHost::new();

        assert!(matches!(
            set.dispatch(&mut host, "acpi load-symbols 0x1000"),
            Err(DebuggerError::UnknownContainer(c)) if c == "acpi"
        ));
    }

    #[test]
    fn test_dispatch_unknown_command() {
        let mut set = CommandSet::new();
        register(&mut set).unwrap();
        let mut host = FakeHost::new();

        assert!(matches!(
            set.dispatch(&mut host, "uefi unload-symbols"),
            Err(DebuggerError::UnknownCommand(c)) if c == "uefi unload-symbols"
        ));
    }

    #[test]
    fn test_register_twice_errors() {
        let mut set = CommandSet::new();
        register(&mut set).unwrap();

        assert!(matches!(
            register::<FakeHost>(&mut set),
            Err(DebuggerError::CommandExists(_))
        ));
    }
}
