//! # Symbol Loading
//!
//! The `load-symbols` command: resolve a reference address, discover the
//! image base and generate the debugger commands that attach symbols and
//! release the debuggee's spin-wait.
//!
//! The command line is positional with defaults for trailing arguments:
//!
//! ```text
//! <address-or-$register> [wait-variable] [binary-path] [symbols-path]
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::addr::Addr;
use crate::consts::{DEFAULT_BINARY_PATH, DEFAULT_SYMBOLS_PATH, DEFAULT_WAIT_VARIABLE};
use crate::errors::{DebuggerError, Result};
use crate::feedback::Feedback;
use crate::host::DebuggerHost;
use crate::scan::find_image_base;

const ARGC_MIN: usize = 1;

/// The first token of a `load-symbols` command line: where to start the
/// image-base scan.
///
/// # Examples
///
/// ```
/// use uefiload::load::AddressSpec;
/// use uefiload::addr::Addr;
///
/// let spec: AddressSpec = "0x1000000".parse().unwrap();
/// assert_eq!(spec, AddressSpec::Literal(Addr::from(0x100_0000usize)));
///
/// let spec: AddressSpec = "$rip".parse().unwrap();
/// assert_eq!(spec, AddressSpec::Register("rip".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSpec {
    /// A register name to look up in the current frame, written `$name`.
    Register(String),
    /// A decimal or `0x`-prefixed hexadecimal address.
    Literal(Addr),
}

impl FromStr for AddressSpec {
    type Err = DebuggerError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(register) = s.strip_prefix('$') {
            Ok(AddressSpec::Register(register.to_string()))
        } else if let Some(hex) = s.strip_prefix("0x") {
            usize::from_str_radix(hex, 16)
                .map(|v| AddressSpec::Literal(Addr::from(v)))
                .map_err(|_| DebuggerError::InvalidHexLiteral(s.to_string()))
        } else {
            s.parse::<usize>()
                .map(|v| AddressSpec::Literal(Addr::from(v)))
                .map_err(|_| DebuggerError::NotAnAddress(s.to_string()))
        }
    }
}

impl AddressSpec {
    /// Resolves to a concrete address, reading the register from the host
    /// frame if one was named.
    pub fn resolve<H: DebuggerHost>(&self, host: &mut H) -> Result<Addr> {
        match self {
            AddressSpec::Register(name) => Ok(Addr::from(host.read_register(name)?)),
            AddressSpec::Literal(addr) => Ok(*addr),
        }
    }
}

/// A parsed `load-symbols` command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub address: AddressSpec,
    pub wait_variable: String,
    pub binary_path: PathBuf,
    pub symbols_path: PathBuf,
}

impl LoadRequest {
    /// Splits `command` on whitespace and fills omitted trailing arguments
    /// with the defaults from [`crate::consts`].
    ///
    /// The paths are not checked for existence; a wrong path surfaces when
    /// the debugger runs the generated commands.
    ///
    /// # Errors
    ///
    /// * [`DebuggerError::NotEnoughArguments`] if no token is given.
    /// * The address parse errors of [`AddressSpec`].
    pub fn parse(command: &str) -> Result<Self> {
        let argv: Vec<&str> = command.split_whitespace().collect();
        if argv.len() < ARGC_MIN {
            return Err(DebuggerError::NotEnoughArguments {
                min: ARGC_MIN,
                got: argv.len(),
            });
        }

        Ok(Self {
            address: argv[0].parse()?,
            wait_variable: argv
                .get(1)
                .copied()
                .unwrap_or(DEFAULT_WAIT_VARIABLE)
                .to_string(),
            binary_path: argv.get(2).copied().unwrap_or(DEFAULT_BINARY_PATH).into(),
            symbols_path: argv.get(3).copied().unwrap_or(DEFAULT_SYMBOLS_PATH).into(),
        })
    }

    /// File name of the binary, as `target modules load` wants it.
    fn binary_file_name(&self) -> &str {
        self.binary_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_BINARY_PATH)
    }
}

/// What `load-symbols` resolved and the commands it generated.
#[derive(Debug, Clone, Serialize)]
pub struct LoadPlan {
    /// The resolved reference address the scan started from.
    pub reference: Addr,
    /// The discovered image base, used as the module load slide.
    pub base: Addr,
    pub binary_path: PathBuf,
    pub symbols_path: PathBuf,
    pub wait_variable: String,
    /// The three pass-through debugger commands, in order.
    pub commands: Vec<String>,
}

/// Runs the `load-symbols` command against `host`.
///
/// Resolves the reference address, scans backward for the image base and
/// hands three commands to the host: add the symbol file, load the module
/// with the base as slide, and zero the wait variable so the debuggee leaves
/// its spin-loop.
///
/// # Errors
///
/// Argument and address errors from [`LoadRequest::parse`], register errors
/// from the host, and the scan errors of [`find_image_base`]. Failures of
/// the generated commands themselves belong to the debugger that runs them.
pub fn load_symbols<H: DebuggerHost>(host: &mut H, command: &str) -> Result<Feedback> {
    let request = LoadRequest::parse(command)?;
    debug!("parsed request: {request:?}");

    let reference = request.address.resolve(host)?;
    host.report(&format!("reference address: {reference}"));
    host.report(&format!("binary path: {}", request.binary_path.display()));
    host.report(&format!("symbols path: {}", request.symbols_path.display()));

    let base = find_image_base(host, reference)?;
    host.report(&format!("base address: {base}"));

    let commands = vec![
        format!("target symbols add {}", request.symbols_path.display()),
        format!(
            "target modules load --file {} --slide {}",
            request.binary_file_name(),
            base.usize()
        ),
        format!("expr {} = 0", request.wait_variable),
    ];
    for command in &commands {
        host.run_command(command)?;
    }

    Ok(Feedback::Plan(LoadPlan {
        reference,
        base,
        binary_path: request.binary_path,
        symbols_path: request.symbols_path,
        wait_variable: request.wait_variable,
        commands,
    }))
}
