//! # Dump Host
//!
//! A [`DebuggerHost`] backed by a raw memory image on disk, for running the
//! scan offline against a dump captured from the virtual machine (for
//! example with QEMU's `pmemsave`).
//!
//! The image is a flat slice of the guest address space: file offset `0`
//! corresponds to the load offset the host was opened with, and reads
//! outside the file behave like unmapped memory. A dump has no frame, so
//! every register lookup fails.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, trace};

use super::DebuggerHost;
use crate::addr::Addr;
use crate::errors::{DebuggerError, Result};

pub struct DumpHost {
    file: File,
    len: u64,
    /// Address that file offset 0 maps to.
    offset: Addr,
    script: Vec<String>,
}

impl DumpHost {
    /// Opens a raw memory image whose first byte sits at address `offset`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or its length cannot be read.
    pub fn open(path: impl AsRef<Path>, offset: Addr) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        debug!(
            "opened memory image {} ({len} bytes at {offset})",
            path.as_ref().display()
        );

        Ok(Self {
            file,
            len,
            offset,
            script: Vec::new(),
        })
    }

    fn unmapped(&self, addr: Addr) -> DebuggerError {
        DebuggerError::MemoryRead {
            addr,
            source: io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "address is outside the memory image",
            ),
        }
    }
}

impl DebuggerHost for DumpHost {
    fn read_register(&mut self, name: &str) -> Result<u64> {
        trace!("register lookup '{name}' against a memory image");
        Err(DebuggerError::InvalidRegister(name.to_string()))
    }

    fn read_u32(&mut self, addr: Addr) -> Result<u32> {
        if addr < self.offset {
            return Err(self.unmapped(addr));
        }
        let rel = (addr - self.offset).u64();
        if rel + 4 > self.len {
            return Err(self.unmapped(addr));
        }

        let mut buf = [0u8; 4];
        self.file
            .seek(SeekFrom::Start(rel))
            .and_then(|_| self.file.read_exact(&mut buf))
            .map_err(|source| DebuggerError::MemoryRead { addr, source })?;

        Ok(u32::from_ne_bytes(buf))
    }

    fn run_command(&mut self, command: &str) -> Result<()> {
        trace!("buffering host command: {command}");
        self.script.push(command.to_string());
        Ok(())
    }

    fn report(&mut self, text: &str) {
        println!("{text}");
    }

    fn drain_script(&mut self) -> Vec<String> {
        std::mem::take(&mut self.script)
    }
}
