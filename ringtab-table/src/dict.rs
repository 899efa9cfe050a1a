// Dictionary compaction of a column that is already sorted under some
// order. Walking the order, every change of key closes a run; the run
// ends (one past the last logical position of each run) become the
// cumulative-count index and the first key of each run becomes the
// distinct-value array:
//
//   order-sorted keys:  a a b c c c
//   distinct keys:      a b c
//   ends:               2 3 6
//
// The first pass only counts runs (and catches unsorted input), so the
// second pass can size both outputs exactly, including the compact index
// width.

use crate::{
    accessor::{Accessor, Key, Keys},
    column::{Coded, Column, Value},
    directory::ColumnRef,
    index::CompactIndex,
    table::Table,
};
use ringtab_base::{capacity, precondition, type_mismatch, Result};
use std::{cmp::Ordering, fmt::Debug, ops::Range, rc::Rc};
use tracing::debug;

fn key_at<'k, K>(keys: &'k [K], order: &CompactIndex, pos: usize) -> Result<&'k K> {
    let row = order.get(pos)?;
    keys.get(row)
        .ok_or_else(|| capacity(format!("order names row {} of {}", row, keys.len())))
}

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Dictionary<K> {
    keys: Vec<K>,
    ends: CompactIndex,
}

impl<K: Ord + Clone + Debug> Dictionary<K> {
    /// Compact `keys` (indexed by physical row) as seen through `order`.
    pub fn compact(keys: &[K], order: &CompactIndex) -> Result<Self> {
        let n = order.len();
        if n > keys.len() {
            return Err(precondition(format!(
                "order of {} rows larger than {} backing elements",
                n,
                keys.len()
            )));
        }
        let mut runs = 0;
        let mut prev: Option<&K> = None;
        for pos in 0..n {
            let cur = key_at(keys, order, pos)?;
            match prev {
                None => runs += 1,
                Some(p) => match p.cmp(cur) {
                    Ordering::Less => runs += 1,
                    Ordering::Equal => (),
                    Ordering::Greater => {
                        return Err(precondition(format!(
                            "column not sorted: {:?} precedes {:?} at position {}",
                            p, cur, pos
                        )))
                    }
                },
            }
            prev = Some(cur);
        }

        let mut distinct = Vec::with_capacity(runs);
        let mut ends = CompactIndex::with_max(runs, n)?;
        for pos in 0..n {
            let cur = key_at(keys, order, pos)?;
            if distinct.last() != Some(cur) {
                if !distinct.is_empty() {
                    ends.set(distinct.len() - 1, pos)?;
                }
                distinct.push(cur.clone());
            }
        }
        if runs > 0 {
            ends.set(runs - 1, n)?;
        }
        Ok(Dictionary {
            keys: distinct,
            ends,
        })
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of rows the dictionary was compacted from.
    pub fn rows(&self) -> usize {
        self.ends.last().unwrap_or(0)
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn ends(&self) -> &CompactIndex {
        &self.ends
    }

    /// Logical positions holding the `i`-th distinct key.
    pub fn block(&self, i: usize) -> Result<Range<usize>> {
        let end = self.ends.get(i)?;
        let start = if i == 0 { 0 } else { self.ends.get(i - 1)? };
        Ok(start..end)
    }

    pub fn find(&self, key: &K) -> Option<usize> {
        self.keys.binary_search(key).ok()
    }

    /// The rank of the run containing logical position `pos`.
    pub fn rank_of(&self, pos: usize) -> Result<usize> {
        if pos >= self.rows() {
            return Err(capacity(format!("position {} out of {} rows", pos, self.rows())));
        }
        // ends is non-decreasing, so binary search for the first end > pos.
        let (mut lo, mut hi) = (0, self.len());
        while lo < hi {
            let mid = (lo + hi) / 2;
            if self.ends.get(mid)? <= pos {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    pub fn is_unique(&self) -> bool {
        self.len() == self.rows()
    }

    /// The key of every logical position, undoing the compaction.
    pub fn expand(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.rows());
        let mut start = 0;
        for (key, end) in self.keys.iter().zip(self.ends.iter()) {
            out.extend(std::iter::repeat(key.clone()).take(end - start));
            start = end;
        }
        out
    }

    /// Per physical row, the rank of its key, given the order the
    /// dictionary was compacted under.
    pub fn ranks(&self, order: &CompactIndex) -> Result<CompactIndex> {
        let n = self.rows();
        if order.len() != n {
            return Err(precondition(format!(
                "order has {} rows, dictionary {}",
                order.len(),
                n
            )));
        }
        let mut ranks = CompactIndex::with_max(n, self.len().saturating_sub(1))?;
        for i in 0..self.len() {
            for pos in self.block(i)? {
                ranks.set(order.get(pos)?, i)?;
            }
        }
        Ok(ranks)
    }
}

/// A dictionary over either kind of key.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub enum KeySet {
    Longs(Dictionary<i64>),
    Objs(Dictionary<Value>),
}

impl KeySet {
    pub fn compact(keys: &Keys, order: &CompactIndex) -> Result<KeySet> {
        Ok(match keys {
            Keys::Longs(v) => KeySet::Longs(Dictionary::compact(v, order)?),
            Keys::Objs(v) => KeySet::Objs(Dictionary::compact(v, order)?),
        })
    }

    pub fn len(&self) -> usize {
        match self {
            KeySet::Longs(d) => d.len(),
            KeySet::Objs(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> usize {
        match self {
            KeySet::Longs(d) => d.rows(),
            KeySet::Objs(d) => d.rows(),
        }
    }

    pub fn ends(&self) -> &CompactIndex {
        match self {
            KeySet::Longs(d) => d.ends(),
            KeySet::Objs(d) => d.ends(),
        }
    }

    pub fn block(&self, i: usize) -> Result<Range<usize>> {
        match self {
            KeySet::Longs(d) => d.block(i),
            KeySet::Objs(d) => d.block(i),
        }
    }

    pub fn key(&self, i: usize) -> Option<Key> {
        match self {
            KeySet::Longs(d) => d.keys().get(i).map(|k| Key::Long(*k)),
            KeySet::Objs(d) => d.keys().get(i).map(|k| Key::Obj(k.clone())),
        }
    }

    pub fn rank_of(&self, pos: usize) -> Result<usize> {
        match self {
            KeySet::Longs(d) => d.rank_of(pos),
            KeySet::Objs(d) => d.rank_of(pos),
        }
    }

    pub fn is_unique(&self) -> bool {
        match self {
            KeySet::Longs(d) => d.is_unique(),
            KeySet::Objs(d) => d.is_unique(),
        }
    }

    pub fn ranks(&self, order: &CompactIndex) -> Result<CompactIndex> {
        match self {
            KeySet::Longs(d) => d.ranks(order),
            KeySet::Objs(d) => d.ranks(order),
        }
    }
}

/// A key set bound to the column it came from and the order it was
/// compacted under. Holding the order snapshot keeps the key usable after
/// the table is re-sorted for something else.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct KeyIndex {
    pub(crate) column: ColumnRef,
    pub(crate) set: KeySet,
    pub(crate) order: CompactIndex,
}

impl KeyIndex {
    pub fn column(&self) -> ColumnRef {
        self.column
    }
    pub fn set(&self) -> &KeySet {
        &self.set
    }
    pub fn order(&self) -> &CompactIndex {
        &self.order
    }
    /// Physical rows of the `i`-th distinct key.
    pub fn rows_of(&self, i: usize) -> Result<Vec<usize>> {
        self.set
            .block(i)?
            .map(|pos| self.order.get(pos))
            .collect()
    }
}

impl Table {
    /// Compact column `r` under the table's current order. The column must
    /// already be sorted by the accessor's key under that order.
    pub fn compact(&self, r: ColumnRef, accessor: &Accessor) -> Result<KeySet> {
        let column = self.column(r)?;
        let keys = accessor.keys(&column)?;
        let set = KeySet::compact(&keys, self.order())?;
        debug!(
            target: "ringtab",
            table = self.id(),
            column = %r,
            rows = self.rows(),
            distinct = set.len(),
            "compacted column"
        );
        Ok(set)
    }

    /// Sort by the key of column `r`, compact, and bind the result to the
    /// order it was computed under.
    pub(crate) fn sort_and_index(&mut self, r: ColumnRef, accessor: &Accessor) -> Result<KeyIndex> {
        self.sort_by(r, accessor)?;
        let set = self.compact(r, accessor)?;
        Ok(KeyIndex {
            column: r,
            set,
            order: self.order().clone(),
        })
    }

    /// Sort by column `r` and keep its compaction as the primary key.
    /// Every key must occur exactly once.
    pub fn set_primary_key(&mut self, r: ColumnRef, accessor: &Accessor) -> Result<()> {
        let key = self.sort_and_index(r, accessor)?;
        if !key.set.is_unique() {
            let dup = (0..key.set.len())
                .find(|i| key.set.block(*i).map(|b| b.len() > 1).unwrap_or(false))
                .and_then(|i| key.set.key(i));
            return Err(precondition(format!(
                "duplicate primary key value: {}",
                dup.map(|k| k.to_string()).unwrap_or_default()
            )));
        }
        self.pk = Some(key);
        Ok(())
    }

    /// Sort by column `r` and keep its compaction as the foreign key.
    pub fn set_foreign_key(&mut self, r: ColumnRef, accessor: &Accessor) -> Result<()> {
        self.fk = Some(self.sort_and_index(r, accessor)?);
        Ok(())
    }

    pub fn primary_key(&self) -> Option<&KeyIndex> {
        self.pk.as_ref()
    }

    pub fn foreign_key(&self) -> Option<&KeyIndex> {
        self.fk.as_ref()
    }

    /// Replace column `r` with its dictionary-coded form. The table's order
    /// is left untouched; sorting happens on a private order.
    pub fn encode(&mut self, r: ColumnRef) -> Result<()> {
        let column = self.column(r)?;
        let flat = column.source()?;
        let keys = Accessor::obj().keys(flat)?;
        let mut order = CompactIndex::natural(self.rows());
        order.sort_range_by(0..self.rows(), |a, b| keys.compare(a, b))?;
        let set = KeySet::compact(&keys, &order)?;
        let ranks = set.ranks(&order)?;
        let firsts = (0..set.len())
            .map(|i| set.block(i).and_then(|b| order.get(b.start)))
            .collect::<Result<Vec<usize>>>()?;
        let values = flat.gather(&firsts)?;
        if values.column_type() != flat.column_type() {
            return Err(type_mismatch("dictionary values changed column type"));
        }
        debug!(
            target: "ringtab",
            table = self.id(),
            column = %r,
            distinct = set.len(),
            "dictionary-coded column"
        );
        self.replace(r, Column::Coded(Rc::new(Coded { values, ranks })))
    }
}
