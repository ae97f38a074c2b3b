//! Constants shared by the command layer and the image-base scan.

/// Name of the command container all commands of this crate are registered
/// under.
pub const CONTAINER: &str = "uefi";

/// First four bytes of a UEFI PE image, read as a native-endian `u32` at the
/// image base: the DOS magic `MZ` followed by the first bytes of the stub.
///
/// Comparing against this value is a partial signature check, not a PE/COFF
/// header parse. It is sufficient here because image bases are page aligned
/// and nothing else in the scanned region starts with these bytes.
pub const PE_MAGIC: u32 = 0x0078_5A4D;

/// Probe granularity of the image-base scan. PE images are loaded at
/// page-aligned addresses.
pub const PAGE_SIZE: usize = 0x1000;

/// Spin-wait variable cleared after symbols are attached, unless the command
/// line names another one.
pub const DEFAULT_WAIT_VARIABLE: &str = "waiting";

/// Binary path used when the command line omits one.
pub const DEFAULT_BINARY_PATH: &str = "zig-out/hdd/EFI/BOOT/bootx64.efi";

/// Symbols path used when the command line omits one.
pub const DEFAULT_SYMBOLS_PATH: &str = "zig-out/hdd/EFI/BOOT/bootx64.pdb";
