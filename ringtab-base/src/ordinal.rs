// Ordinals are small integers that play three roles at once: they select
// a column type slot, they name a row, and they are the elements of a
// permutation. Two of them pack into an `Extent` as
//
//     extent = amount * OMEGA + size
//
// so a single integer can carry "how many type slots" and "how many rows"
// together. OMEGA is one past the largest row ordinal, which keeps every
// row in range of the 16-bit compact index width.

use crate::{capacity, Result};
use std::fmt;

pub const OMEGA: usize = 1 << 15;

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Ordinal(u16);

impl Ordinal {
    /// The sentinel one past every ordinary ordinal; only meaningful as
    /// the multiplier of an `Extent`.
    pub const OMEGA: Ordinal = Ordinal(OMEGA as u16);

    pub fn new(i: usize) -> Result<Ordinal> {
        if i >= OMEGA {
            return Err(capacity(format!("ordinal {} out of range (max {})", i, OMEGA - 1)));
        }
        Ok(Ordinal(i as u16))
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    pub fn is_omega(self) -> bool {
        self == Self::OMEGA
    }

    /// All ordinals below `n`, in ascending order.
    pub fn upto(n: usize) -> impl Iterator<Item = Ordinal> {
        (0..n.min(OMEGA)).map(|i| Ordinal(i as u16))
    }

    pub fn label(self) -> String {
        to_label(self.get())
    }

    /// Pack `self` as the type-slot amount with `size` as the row part.
    pub fn index(self, size: Ordinal) -> Extent {
        Extent((self.get() * OMEGA + size.get()) as u32)
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_omega() {
            write!(f, "Ω")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

pub fn ordinal(i: usize) -> Result<Ordinal> {
    Ordinal::new(i)
}

/// Spreadsheet-style base-26 label: 0 is "A", 25 is "Z", 26 is "AA".
pub fn to_label(mut i: usize) -> String {
    let mut buf = Vec::new();
    loop {
        buf.push(b'A' + (i % 26) as u8);
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// Inverse of `to_label`; None for anything that is not all uppercase ASCII.
pub fn from_label(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for b in label.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        n = n.checked_mul(26)?.checked_add((b - b'A') as usize + 1)?;
    }
    Some(n - 1)
}

/// A type-slot amount and a row size packed into one integer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Extent(u32);

impl Extent {
    pub fn new(amount: usize, size: usize) -> Result<Extent> {
        let amount = Ordinal::new(amount)?;
        let size = Ordinal::new(size)?;
        Ok(amount.index(size))
    }
    pub fn amount(self) -> usize {
        self.0 as usize / OMEGA
    }
    pub fn size(self) -> usize {
        self.0 as usize % OMEGA
    }
    pub fn packed(self) -> u32 {
        self.0
    }
    pub fn with_amount(self, amount: usize) -> Result<Extent> {
        Extent::new(amount, self.size())
    }
}
