// A compact index is a fixed-length sequence of small non-negative
// integers: permutations, rank maps and cumulative-count maps. The backing
// word is the narrowest signed width that holds the declared maximum, so a
// 100-row permutation costs 100 bytes rather than 800.
//
// The identity permutation is never materialized: `Natural(len)` stands
// in for it, and anything that wants to write copies away first.

use funty::Integral;
use ringtab_base::{capacity, Result};
use std::{cmp::Ordering, ops::Range};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub enum Width {
    Narrow,
    Wide,
}

impl Width {
    pub const NARROW_MAX: usize = i8::MAX as usize;
    pub const WIDE_MAX: usize = i16::MAX as usize;

    pub fn select(max: usize) -> Result<Width> {
        if max <= Self::NARROW_MAX {
            Ok(Width::Narrow)
        } else if max <= Self::WIDE_MAX {
            Ok(Width::Wide)
        } else {
            Err(capacity(format!(
                "compact index max {} exceeds {}",
                max,
                Self::WIDE_MAX
            )))
        }
    }

    pub fn max(&self) -> usize {
        match self {
            Width::Narrow => Self::NARROW_MAX,
            Width::Wide => Self::WIDE_MAX,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Words<W> {
    words: Box<[W]>,
}

impl<W: Integral> Words<W> {
    fn zeroed(len: usize) -> Self {
        Words {
            words: vec![W::ZERO; len].into_boxed_slice(),
        }
    }

    fn len(&self) -> usize {
        self.words.len()
    }

    fn word(v: usize) -> Result<W> {
        <W as TryFrom<usize>>::try_from(v)
            .ok()
            .ok_or_else(|| {
                capacity(format!(
                    "value {} does not fit {}-bit index",
                    v,
                    std::mem::size_of::<W>() * 8
                ))
            })
    }

    fn value(w: W) -> usize {
        // Words are only ever written through `word`, so they are never negative.
        <W as TryInto<usize>>::try_into(w).ok().unwrap_or(0)
    }

    fn get(&self, i: usize) -> Option<usize> {
        self.words.get(i).map(|w| Self::value(*w))
    }

    fn set(&mut self, i: usize, v: usize) -> Result<()> {
        let w = Self::word(v)?;
        let len = self.words.len();
        let slot = self
            .words
            .get_mut(i)
            .ok_or_else(|| capacity(format!("index position {} out of bounds ({})", i, len)))?;
        *slot = w;
        Ok(())
    }

    fn sort_range_by<F: FnMut(usize, usize) -> Ordering>(&mut self, range: Range<usize>, mut cmp: F) {
        self.words[range].sort_by(|a, b| cmp(Self::value(*a), Self::value(*b)));
    }

    pub fn as_slice(&self) -> &[W] {
        &self.words
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub enum CompactIndex {
    Natural(usize),
    Narrow(Words<i8>),
    Wide(Words<i16>),
}

impl Default for CompactIndex {
    fn default() -> Self {
        CompactIndex::Natural(0)
    }
}

impl CompactIndex {
    pub fn natural(len: usize) -> Self {
        CompactIndex::Natural(len)
    }

    /// A zero-filled index of `len` entries able to hold values up to `max`.
    pub fn with_max(len: usize, max: usize) -> Result<Self> {
        Ok(match Width::select(max)? {
            Width::Narrow => CompactIndex::Narrow(Words::zeroed(len)),
            Width::Wide => CompactIndex::Wide(Words::zeroed(len)),
        })
    }

    pub fn from_values(vals: &[usize]) -> Result<Self> {
        let max = vals.iter().copied().max().unwrap_or(0);
        let mut idx = Self::with_max(vals.len(), max)?;
        for (i, v) in vals.iter().enumerate() {
            idx.set(i, *v)?;
        }
        Ok(idx)
    }

    pub fn len(&self) -> usize {
        match self {
            CompactIndex::Natural(len) => *len,
            CompactIndex::Narrow(w) => w.len(),
            CompactIndex::Wide(w) => w.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_natural(&self) -> bool {
        matches!(self, CompactIndex::Natural(_))
    }

    /// The backing width, or None while still the natural sentinel.
    pub fn width(&self) -> Option<Width> {
        match self {
            CompactIndex::Natural(_) => None,
            CompactIndex::Narrow(_) => Some(Width::Narrow),
            CompactIndex::Wide(_) => Some(Width::Wide),
        }
    }

    pub fn as_narrow(&self) -> Option<&[i8]> {
        match self {
            CompactIndex::Narrow(w) => Some(w.as_slice()),
            _ => None,
        }
    }

    pub fn as_wide(&self) -> Option<&[i16]> {
        match self {
            CompactIndex::Wide(w) => Some(w.as_slice()),
            _ => None,
        }
    }

    pub fn get(&self, i: usize) -> Result<usize> {
        let v = match self {
            CompactIndex::Natural(len) => (i < *len).then_some(i),
            CompactIndex::Narrow(w) => w.get(i),
            CompactIndex::Wide(w) => w.get(i),
        };
        v.ok_or_else(|| capacity(format!("index position {} out of bounds ({})", i, self.len())))
    }

    pub fn last(&self) -> Option<usize> {
        match self.len() {
            0 => None,
            n => self.get(n - 1).ok(),
        }
    }

    pub fn set(&mut self, i: usize, v: usize) -> Result<()> {
        if i >= self.len() {
            return Err(capacity(format!(
                "index position {} out of bounds ({})",
                i,
                self.len()
            )));
        }
        self.materialize()?;
        match self {
            CompactIndex::Natural(_) => Err(capacity("natural index was not materialized")),
            CompactIndex::Narrow(w) => w.set(i, v),
            CompactIndex::Wide(w) => w.set(i, v),
        }
    }

    /// Copy away from the natural sentinel. A no-op once materialized.
    pub fn materialize(&mut self) -> Result<()> {
        if let CompactIndex::Natural(len) = *self {
            let mut idx = Self::with_max(len, len.saturating_sub(1))?;
            for i in 0..len {
                match &mut idx {
                    CompactIndex::Narrow(w) => w.set(i, i)?,
                    CompactIndex::Wide(w) => w.set(i, i)?,
                    CompactIndex::Natural(_) => (),
                }
            }
            *self = idx;
        }
        Ok(())
    }

    /// The stored values in position order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).map(move |i| match self {
            CompactIndex::Natural(_) => i,
            CompactIndex::Narrow(w) => Words::value(w.words[i]),
            CompactIndex::Wide(w) => Words::value(w.words[i]),
        })
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Stable in-place sort of the entries in `range`, comparing the
    /// stored values. Copies away from the natural sentinel first.
    pub(crate) fn sort_range_by<F: FnMut(usize, usize) -> Ordering>(
        &mut self,
        range: Range<usize>,
        cmp: F,
    ) -> Result<()> {
        if range.end > self.len() || range.start > range.end {
            return Err(capacity(format!(
                "sort range {:?} out of bounds ({})",
                range,
                self.len()
            )));
        }
        self.materialize()?;
        match self {
            CompactIndex::Natural(_) => return Err(capacity("natural index was not materialized")),
            CompactIndex::Narrow(w) => w.sort_range_by(range, cmp),
            CompactIndex::Wide(w) => w.sort_range_by(range, cmp),
        }
        Ok(())
    }

    /// True if this is a permutation of `0..len`.
    pub fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.len()];
        for v in self.iter() {
            match seen.get_mut(v) {
                Some(s) if !*s => *s = true,
                _ => return false,
            }
        }
        true
    }
}
