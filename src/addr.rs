//! # Address Module
//!
//! A thin newtype over `usize` for addresses in the debuggee's address space,
//! with the page arithmetic the image-base scan needs.

use std::fmt::Display;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::Serialize;

use crate::consts::PAGE_SIZE;

/// An address in the debuggee's address space
///
/// # Examples
///
/// ```
/// use uefiload::addr::Addr;
///
/// let a = Addr::from(0x1234_5678usize);
/// assert_eq!(a.page_floor(), Addr::from(0x1234_5000usize));
/// assert_eq!(format!("{a}"), "0x0000000012345678");
/// ```
#[derive(Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Addr(usize);

impl Addr {
    pub fn usize(&self) -> usize {
        self.0
    }

    pub fn u64(&self) -> u64 {
        self.0 as u64
    }

    /// Start of the 4 KiB page containing this address (bits 0-11 cleared).
    #[must_use]
    pub fn page_floor(&self) -> Addr {
        Addr(self.0 & !(PAGE_SIZE - 1))
    }

    pub fn is_page_aligned(&self) -> bool {
        self.0 & (PAGE_SIZE - 1) == 0
    }

    /// Like [`usize::checked_sub`]: [None] if the subtraction would go below
    /// address zero.
    #[must_use]
    pub fn checked_sub(&self, rhs: usize) -> Option<Addr> {
        self.0.checked_sub(rhs).map(Addr)
    }
}

impl Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", { self.0 })
    }
}

impl std::fmt::Debug for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl Add for Addr {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add<usize> for Addr {
    type Output = Self;
    fn add(self, rhs: usize) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<usize> for Addr {
    fn add_assign(&mut self, rhs: usize) {
        self.0 += rhs
    }
}

impl Sub for Addr {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub<usize> for Addr {
    type Output = Self;
    fn sub(self, rhs: usize) -> Self::Output {
        Self(self.0 - rhs)
    }
}

impl SubAssign<usize> for Addr {
    fn sub_assign(&mut self, rhs: usize) {
        self.0 -= rhs
    }
}

impl From<usize> for Addr {
    fn from(value: usize) -> Self {
        Addr(value)
    }
}

impl From<u64> for Addr {
    fn from(value: u64) -> Self {
        Addr(value as usize)
    }
}

impl From<Addr> for usize {
    fn from(value: Addr) -> Self {
        value.0
    }
}

impl From<Addr> for u64 {
    fn from(value: Addr) -> Self {
        value.0 as u64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_addr_arithmetic() {
        let a = Addr::from(100usize);
        let b = Addr::from(50usize);
        assert_eq!((a + b).usize(), 150);
        assert_eq!((a - b).usize(), 50);
        assert_eq!((a - 4usize).usize(), 96);
    }

    #[test]
    fn test_addr_page_floor() {
        assert_eq!(Addr::from(0x1000_0fffusize).page_floor().usize(), 0x1000_0000);
        assert_eq!(Addr::from(0x1000_1000usize).page_floor().usize(), 0x1000_1000);
        assert!(Addr::from(0x2000usize).is_page_aligned());
        assert!(!Addr::from(0x2004usize).is_page_aligned());
    }

    #[test]
    fn test_addr_checked_sub() {
        assert_eq!(
            Addr::from(0x1000usize).checked_sub(0x1000),
            Some(Addr::from(0usize))
        );
        assert_eq!(Addr::from(0xfffusize).checked_sub(0x1000), None);
    }

    #[test]
    fn test_addr_display() {
        let a = Addr::from(0x1234usize);
        assert_eq!(a.u64(), 0x1234u64);
        assert_eq!(format!("{}", a), "0x0000000000001234");
    }
}
