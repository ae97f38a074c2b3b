//! # Process Host
//!
//! A [`DebuggerHost`] backed by a live process on the local machine.
//!
//! The host attaches with ptrace so the debuggee is stopped while its memory
//! is scanned, reads registers with [`ptrace::getregs`] and memory through
//! `/proc/<pid>/mem`. Pass-through debugger commands are buffered: there is
//! no LLDB on this side to execute them, they are handed back to the caller
//! as a command script.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use nix::sys::ptrace;
use nix::sys::wait::waitpid;
use nix::unistd::Pid;
use tracing::{info, trace, warn};

use super::DebuggerHost;
use crate::addr::Addr;
use crate::errors::{DebuggerError, Result};

pub struct ProcessHost {
    pid: Pid,
    mem: File,
    script: Vec<String>,
}

impl ProcessHost {
    /// Attaches to `pid` and waits for it to stop.
    ///
    /// The debuggee stays stopped until this host is dropped, which detaches
    /// and lets it resume.
    ///
    /// # Errors
    ///
    /// Fails if the process cannot be traced or `/proc/<pid>/mem` cannot be
    /// opened.
    pub fn attach(pid: Pid) -> Result<Self> {
        ptrace::attach(pid)?;
        waitpid(pid, None)?;
        let mem = File::options()
            .read(true)
            .write(false)
            .open(format!("/proc/{pid}/mem"))?;
        info!("attached to process {pid}");

        Ok(Self {
            pid,
            mem,
            script: Vec::new(),
        })
    }
}

impl DebuggerHost for ProcessHost {
    fn read_register(&mut self, name: &str) -> Result<u64> {
        let regs = ptrace::getregs(self.pid)?;

        let value = match name {
            "r8" => regs.r8,
            "r9" => regs.r9,
            "r10" => regs.r10,
            "r11" => regs.r11,
            "r12" => regs.r12,
            "r13" => regs.r13,
            "r14" => regs.r14,
            "r15" => regs.r15,
            "rip" => regs.rip,
            "rbp" => regs.rbp,
            "rsp" => regs.rsp,
            "rax" => regs.rax,
            "rbx" => regs.rbx,
            "rcx" => regs.rcx,
            "rdx" => regs.rdx,
            "rsi" => regs.rsi,
            "rdi" => regs.rdi,
            "orig_rax" => regs.orig_rax,
            "eflags" => regs.eflags,
            "cs" => regs.cs,
            "ss" => regs.ss,
            "ds" => regs.ds,
            "es" => regs.es,
            "fs" => regs.fs,
            "gs" => regs.gs,
            "fs_base" => regs.fs_base,
            "gs_base" => regs.gs_base,
            _ => return Err(DebuggerError::InvalidRegister(name.to_string())),
        };
        trace!("register {name} = {value:#018x}");

        Ok(value)
    }

    fn read_u32(&mut self, addr: Addr) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.mem
            .seek(SeekFrom::Start(addr.u64()))
            .and_then(|_| self.mem.read_exact(&mut buf))
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

impl Drop for ProcessHost {
    fn drop(&mut self) {
        if let Err(e) = ptrace::detach(self.pid, None) {
            warn!("could not detach from process {}: {e}", self.pid);
        }
    }
}
