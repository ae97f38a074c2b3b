//! # Host Module
//!
//! The narrow capability surface this crate needs from whatever holds the
//! debuggee: look up a register in the current frame, read debuggee memory,
//! accept a pass-through debugger command and print informational text.
//!
//! Keeping the surface this small lets the image-base scan and the command
//! layer run unchanged against a live process ([`process::ProcessHost`]), a
//! raw memory image on disk ([`dump::DumpHost`]) or a scripted fake in unit
//! tests.

use crate::addr::Addr;
use crate::errors::Result;

pub mod dump;
pub mod process;

pub trait DebuggerHost {
    /// Looks up a register by name in the current frame and returns its
    /// unsigned value.
    ///
    /// # Errors
    ///
    /// [`DebuggerError::InvalidRegister`](crate::errors::DebuggerError::InvalidRegister)
    /// if the frame has no register of that name.
    fn read_register(&mut self, name: &str) -> Result<u64>;

    /// Reads a native-endian `u32` from debuggee memory.
    ///
    /// # Errors
    ///
    /// [`DebuggerError::MemoryRead`](crate::errors::DebuggerError::MemoryRead)
    /// if the address is not readable.
    fn read_u32(&mut self, addr: Addr) -> Result<u32>;

    /// Hands a command string through to the underlying debugger.
    ///
    /// The commands this crate generates are LLDB syntax. Hosts that have no
    /// live debugger buffer them instead; see [`DebuggerHost::drain_script`].
    fn run_command(&mut self, command: &str) -> Result<()>;

    /// Informational output for the user.
    fn report(&mut self, text: &str);

    /// Removes and returns the commands buffered by [`DebuggerHost::run_command`]
    /// since the last drain, in submission order.
    fn drain_script(&mut self) -> Vec<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::io;

    use super::DebuggerHost;
    use crate::addr::Addr;
    use crate::errors::{DebuggerError, Result};

    /// A scripted host: a register file, a sparse set of readable pages and
    /// a record of everything the code under test did with it.
    #[derive(Debug, Default)]
    pub(crate) struct FakeHost {
        pub registers: HashMap<String, u64>,
        /// Readable words by address; anything absent is unmapped.
        pub memory: HashMap<usize, u32>,
        pub probes: Vec<Addr>,
        pub commands: Vec<String>,
        pub reports: Vec<String>,
    }

    impl FakeHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_register(mut self, name: &str, value: u64) -> Self {
            self.registers.insert(name.to_string(), value);
            self
        }

        /// Maps the pages from `lo` up to and including `hi`, filled with
        /// `word` at each page base.
        pub fn with_pages(mut self, lo: usize, hi: usize, word: u32) -> Self {
            let mut page = lo & !0xfff;
            while page <= hi {
                self.memory.insert(page, word);
                page += 0x1000;
            }
            self
        }

        pub fn with_word(mut self, addr: usize, word: u32) -> Self {
            self.memory.insert(addr, word);
            self
        }
    }

    impl DebuggerHost for FakeHost {
        fn read_register(&mut self, name: &str) -> Result<u64> {
            self.registers
                .get(name)
                .copied()
                .ok_or_else(|| DebuggerError::InvalidRegister(name.to_string()))
        }

        fn read_u32(&mut self, addr: Addr) -> Result<u32> {
            self.probes.push(addr);
            self.memory
                .get(&addr.usize())
                .copied()
                .ok_or_else(|| DebuggerError::MemoryRead {
                    addr,
                    source: io::Error::from(io::ErrorKind::InvalidInput),
                })
        }

        fn run_command(&mut self, command: &str) -> Result<()> {
            self.commands.push(command.to_string());
            Ok(())
        }

        fn report(&mut self, text: &str) {
            self.reports.push(text.to_string());
        }

        fn drain_script(&mut self) -> Vec<String> {
            std::mem::take(&mut self.commands)
        }
    }
}
