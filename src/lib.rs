//! # uefiload
//!
//! Locates the load address of a UEFI payload in memory and generates the
//! debugger commands that attach its debug symbols.
//!
//! UEFI applications are PE images that firmware relocates to an address only
//! known at runtime, so a debugger attached to the virtual machine cannot map
//! symbols on its own. Given a reference address somewhere inside the running
//! image (typically the instruction pointer while the payload spins on a wait
//! variable), this crate scans backward through guest memory one page at a
//! time until it finds the PE magic marker, then emits the LLDB commands that
//! register the symbol file, load the module at the discovered base and
//! release the spin-wait.
//!
//! The scan and the command layer are generic over a narrow
//! [`DebuggerHost`](host::DebuggerHost) capability, with two shipped hosts:
//! a live process reached through ptrace and `/proc/<pid>/mem`
//! ([`ProcessHost`](host::process::ProcessHost)), and a raw memory image on
//! disk ([`DumpHost`](host::dump::DumpHost)).

pub mod addr;
pub mod command;
pub mod consts;
pub mod errors;
pub mod feedback;
pub mod host;
pub mod load;
pub mod scan;

pub use addr::Addr;
pub use errors::{DebuggerError, Result};
