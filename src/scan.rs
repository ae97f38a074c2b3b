//! # Image Base Discovery
//!
//! Finds the load address of a PE image given an address somewhere inside
//! it.
//!
//! PE images are loaded at page-aligned addresses and begin with a fixed
//! magic marker, so the base can be found without parsing anything: align
//! the hint down to its page and walk backward one page at a time until the
//! marker shows up. The scan has no lower bound of its own; it ends at the
//! first unreadable page (in practice the unmapped region below the image)
//! or, failing that, at address zero.

use tracing::{debug, trace};

use crate::addr::Addr;
use crate::consts::{PAGE_SIZE, PE_MAGIC};
use crate::errors::{DebuggerError, Result};
use crate::host::DebuggerHost;

/// Scans backward from `hint` for the base of the PE image containing it.
///
/// # Errors
///
/// * [`DebuggerError::MemoryRead`] if a probe hits unreadable memory. The
///   read error is surfaced verbatim.
/// * [`DebuggerError::ScanExhausted`] if every page down to address zero is
///   readable but none starts with the magic marker.
pub fn find_image_base<H: DebuggerHost>(host: &mut H, hint: Addr) -> Result<Addr> {
    let mut candidate = hint.page_floor();

    loop {
        trace!("probing {candidate}");
        if host.read_u32(candidate)? == PE_MAGIC {
            debug!("found image base {candidate}");
            return Ok(candidate);
        }
        candidate = candidate
            .checked_sub(PAGE_SIZE)
            .ok_or(DebuggerError::ScanExhausted)?;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::host::testing::FakeHost;

    #[test]
    fn test_scan_finds_page_aligned_base() {
        let mut host = FakeHost::new()
            .with_pages(0x0fff_0000, 0x1000_0000, 0xdead_beef)
            .with_word(0x0fff_8000, PE_MAGIC);

        let base = find_image_base(&mut host, Addr::from(0x1000_0123usize)).unwrap();

        assert_eq!(base, Addr::from(0x0fff_8000usize));
    }

    #[test]
    fn test_scan_probes_every_page_down_to_base_and_no_further() {
        let mut host = FakeHost::new()
            .with_pages(0x0fff_d000, 0x1000_0000, 0xdead_beef)
            .with_word(0x0fff_d000, PE_MAGIC);

        let base = find_image_base(&mut host, Addr::from(0x1000_0fffusize)).unwrap();

        assert_eq!(base, Addr::from(0x0fff_d000usize));
        let expected: Vec<Addr> = (0..=3)
            .map(|i| Addr::from(0x1000_0000usize - i * 0x1000))
            .collect();
        assert_eq!(host.probes, expected);
    }

    #[test]
    fn test_scan_starts_at_the_hints_page() {
        let mut host = FakeHost::new().with_word(0x4000, PE_MAGIC);

        let base = find_image_base(&mut host, Addr::from(0x4a10usize)).unwrap();

        assert_eq!(base, Addr::from(0x4000usize));
        assert_eq!(host.probes, vec![Addr::from(0x4000usize)]);
    }

    #[test]
    fn test_scan_surfaces_read_failure() {
        // pages below 0x1000_0000 are unmapped and no page holds the magic
        let mut host = FakeHost::new().with_pages(0x1000_0000, 0x1000_2000, 0);

        let res = find_image_base(&mut host, Addr::from(0x1000_2fffusize));

        assert!(matches!(
            res,
            Err(DebuggerError::MemoryRead { addr, .. }) if addr == Addr::from(0x0fff_f000usize)
        ));
    }

    #[test]
    fn test_scan_stops_at_address_zero() {
        let mut host = FakeHost::new().with_pages(0, 0x3000, 0);

        let res = find_image_base(&mut host, Addr::from(0x3fffusize));

        assert!(matches!(res, Err(DebuggerError::ScanExhausted)));
        assert_eq!(host.probes.len(), 4);
    }
}
