use thiserror::Error;

use crate::addr::Addr;

pub type Result<T> = std::result::Result<T, DebuggerError>;

#[derive(Error, Debug)]
pub enum DebuggerError {
    #[error("Os error: {0}")]
    Os(#[from] nix::Error),
    #[error("Io error: {0}")]
    StdIo(#[from] std::io::Error),
    #[error("expected minimum argument count of {min}, got {got}")]
    NotEnoughArguments { min: usize, got: usize },
    #[error("invalid register '{0}'")]
    InvalidRegister(String),
    #[error("invalid hexadecimal literal '{0}'")]
    InvalidHexLiteral(String),
    #[error("expected an address or register, got '{0}'")]
    NotAnAddress(String),
    #[error("could not read memory at {addr}: {source}")]
    MemoryRead {
        addr: Addr,
        #[source]
        source: std::io::Error,
    },
    #[error("scanned down to address zero without finding an image base")]
    ScanExhausted,
    #[error("no such command container '{0}'")]
    UnknownContainer(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("a command '{0}' is already registered")]
    CommandExists(String),
}
