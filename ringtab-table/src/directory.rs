// A table's column directory is 16 packed entries. Each entry says "the
// next `count` columns of type `ty` live in the run starting `offset` cells
// past the table's base":
//
//    31                        8 7   5 4     0
//   +---------------------------+-----+-------+
//   |          offset           |count|  ty   |
//   +---------------------------+-----+-------+
//
// A zero count marks an unused entry. Columns of one type are numbered in
// directory order, so when an entry fills up a continuation entry of the
// same type picks up the numbering where the full one left off.

use crate::column::ColumnType;
use ringtab_base::{capacity, precondition, Result};
use std::fmt;

/// The `n`-th column of type `ty` within a table.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    pub ty: ColumnType,
    pub n: usize,
}

impl ColumnRef {
    pub fn new(ty: ColumnType, n: usize) -> Self {
        ColumnRef { ty, n }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.ty, self.n)
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct DirEntry(u32);

impl DirEntry {
    const TYPE_BITS: u32 = 5;
    const COUNT_BITS: u32 = 3;
    const OFFSET_SHIFT: u32 = Self::TYPE_BITS + Self::COUNT_BITS;
    pub const MAX_COUNT: usize = (1 << Self::COUNT_BITS) - 1;
    pub const MAX_OFFSET: usize = (1 << (32 - Self::OFFSET_SHIFT)) - 1;

    pub fn pack(ty: ColumnType, count: usize, offset: usize) -> Result<Self> {
        if count > Self::MAX_COUNT {
            return Err(capacity(format!("directory count {} exceeds {}", count, Self::MAX_COUNT)));
        }
        if offset > Self::MAX_OFFSET {
            return Err(capacity(format!("directory offset {} exceeds {}", offset, Self::MAX_OFFSET)));
        }
        Ok(DirEntry(
            (ty as u32) | ((count as u32) << Self::TYPE_BITS) | ((offset as u32) << Self::OFFSET_SHIFT),
        ))
    }

    pub fn ty(self) -> Option<ColumnType> {
        ColumnType::from_u8_low_5_bits((self.0 & ((1 << Self::TYPE_BITS) - 1)) as u8)
    }

    pub fn count(self) -> usize {
        ((self.0 >> Self::TYPE_BITS) & ((1 << Self::COUNT_BITS) - 1)) as usize
    }

    pub fn offset(self) -> usize {
        (self.0 >> Self::OFFSET_SHIFT) as usize
    }

    pub fn is_empty(self) -> bool {
        self.count() == 0
    }

    pub fn packed(self) -> u32 {
        self.0
    }

    fn with_count(self, count: usize) -> Result<Self> {
        match self.ty() {
            Some(ty) => Self::pack(ty, count, self.offset()),
            None => Err(capacity("directory entry has no type")),
        }
    }
}

pub const DIRECTORY_LEN: usize = 16;

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Hash)]
pub struct Directory {
    entries: [DirEntry; DIRECTORY_LEN],
    len: u8,
}

impl Directory {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries[..self.len()]
    }

    pub fn entry(&self, i: usize) -> Option<DirEntry> {
        self.entries().get(i).copied()
    }

    /// Locate column `r`: the directory entry holding it and its position
    /// within that entry's run.
    pub fn find(&self, r: ColumnRef) -> Option<(usize, usize)> {
        let mut n = r.n;
        for (i, e) in self.entries().iter().enumerate() {
            if e.is_empty() || e.ty() != Some(r.ty) {
                continue;
            }
            if n < e.count() {
                return Some((i, n));
            }
            n -= e.count();
        }
        None
    }

    pub fn count_of(&self, ty: ColumnType) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.ty() == Some(ty))
            .map(|e| e.count())
            .sum()
    }

    pub fn column_count(&self) -> usize {
        self.entries().iter().map(|e| e.count()).sum()
    }

    /// Number of distinct types present.
    pub fn type_count(&self) -> usize {
        let mut seen = 0u32;
        for e in self.entries().iter().filter(|e| !e.is_empty()) {
            if let Some(ty) = e.ty() {
                seen |= 1 << (ty as u32);
            }
        }
        seen.count_ones() as usize
    }

    /// The last entry of type `ty`, if it still has room. Only the last one
    /// is considered so that a new column always numbers after every
    /// existing column of its type.
    pub fn open_for(&self, ty: ColumnType, slot_width: usize) -> Option<usize> {
        let i = self
            .entries()
            .iter()
            .rposition(|e| !e.is_empty() && e.ty() == Some(ty))?;
        (self.entries[i].count() < slot_width).then_some(i)
    }

    pub fn push(&mut self, entry: DirEntry) -> Result<usize> {
        let i = self.len();
        if i >= DIRECTORY_LEN {
            return Err(capacity(format!("column directory full ({} entries)", DIRECTORY_LEN)));
        }
        self.entries[i] = entry;
        self.len += 1;
        Ok(i)
    }

    /// Write `entry` at slot `i`, padding any slots between the current
    /// end and `i` with unused entries. Slot `i` must be unused.
    pub(crate) fn place(&mut self, i: usize, entry: DirEntry) -> Result<()> {
        if i >= DIRECTORY_LEN {
            return Err(capacity(format!("column directory full ({} entries)", DIRECTORY_LEN)));
        }
        if self.entry(i).is_some_and(|e| !e.is_empty()) {
            return Err(precondition(format!("directory entry {} is occupied", i)));
        }
        let len = self.len();
        if i > len {
            self.entries[len..i].fill(DirEntry::default());
        }
        self.entries[i] = entry;
        self.len = self.len.max(i as u8 + 1);
        Ok(())
    }

    pub(crate) fn bump(&mut self, i: usize) -> Result<usize> {
        let e = self.entries[..self.len()]
            .get(i)
            .copied()
            .ok_or_else(|| capacity(format!("directory entry {} out of range", i)))?;
        let sub = e.count();
        self.entries[i] = e.with_count(sub + 1)?;
        Ok(sub)
    }

    /// Every column in directory order.
    pub fn columns(&self) -> Vec<ColumnRef> {
        let mut seen = [0usize; ColumnType::ALL.len()];
        let mut out = Vec::new();
        for e in self.entries() {
            if let Some(ty) = e.ty() {
                for _ in 0..e.count() {
                    out.push(ColumnRef::new(ty, seen[ty as usize]));
                    seen[ty as usize] += 1;
                }
            }
        }
        out
    }
}
