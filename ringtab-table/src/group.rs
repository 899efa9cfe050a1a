// Grouping is a small state machine on the table:
//
//   Ungrouped --group_by--> Open --then_by--> Open --collect--> Done
//                                                                 |
//   Done --group_by--> Open  <------------------------------------'
//
// `group_by` sorts by a key and compacts it into the first level of
// blocks. Each `then_by` stably sorts inside every block of the finest
// level and splits it again, so the block boundaries of coarser levels are
// never disturbed. `collect` folds values over the finest blocks into a new
// table holding one key column per level and one column per aggregate.

use crate::{
    accessor::{Accessor, Keys},
    column::Column,
    dict::KeySet,
    directory::ColumnRef,
    index::CompactIndex,
    table::Table,
};
use ringtab_base::{capacity, precondition, type_mismatch, Result};
use std::{cmp::Ordering, fmt, ops::Range};
use tracing::{debug, trace};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Level {
    column: ColumnRef,
    keys: Keys,
    ends: CompactIndex,
}

impl Level {
    pub fn column(&self) -> ColumnRef {
        self.column
    }

    pub fn ends(&self) -> &CompactIndex {
        &self.ends
    }

    pub fn blocks(&self) -> usize {
        self.ends.len()
    }

    fn block(&self, i: usize) -> Result<Range<usize>> {
        let end = self.ends.get(i)?;
        let start = if i == 0 { 0 } else { self.ends.get(i - 1)? };
        Ok(start..end)
    }
}

/// The open levels of a grouping, coarsest first.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Grouping {
    levels: Vec<Level>,
}

impl Grouping {
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    fn finest(&self) -> Result<&Level> {
        self.levels
            .last()
            .ok_or_else(|| precondition("grouping has no levels"))
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum GroupState {
    #[default]
    Ungrouped,
    Open(Grouping),
    Done,
}

/// Folds the long values of one block into a single aggregate.
pub enum Reduce<'f> {
    Sum,
    Min,
    Max,
    Count,
    With(Box<dyn Fn(i64, i64) -> i64 + 'f>),
}

impl fmt::Debug for Reduce<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduce::Sum => f.write_str("Sum"),
            Reduce::Min => f.write_str("Min"),
            Reduce::Max => f.write_str("Max"),
            Reduce::Count => f.write_str("Count"),
            Reduce::With(_) => f.write_str("With(..)"),
        }
    }
}

impl<'f> Reduce<'f> {
    pub fn with(f: impl Fn(i64, i64) -> i64 + 'f) -> Self {
        Reduce::With(Box::new(f))
    }

    /// Blocks are never empty, so every fold has a first element to
    /// start from; an empty input folds to zero.
    pub fn fold(&self, mut vals: impl Iterator<Item = i64>) -> Result<i64> {
        if let Reduce::Count = self {
            return Ok(vals.count() as i64);
        }
        let Some(first) = vals.next() else {
            return Ok(0);
        };
        let mut acc = first;
        for v in vals {
            acc = match self {
                Reduce::Sum => acc
                    .checked_add(v)
                    .ok_or_else(|| capacity(format!("sum overflows at {} + {}", acc, v)))?,
                Reduce::Min => acc.min(v),
                Reduce::Max => acc.max(v),
                Reduce::Count => acc,
                Reduce::With(f) => f(acc, v),
            };
        }
        Ok(acc)
    }
}

/// One aggregate column of a `collect_all`.
#[derive(Debug)]
pub struct Aggregate<'f> {
    pub column: ColumnRef,
    pub accessor: Accessor<'f>,
    pub reduce: Reduce<'f>,
}

impl<'f> Aggregate<'f> {
    pub fn new(column: ColumnRef, accessor: Accessor<'f>, reduce: Reduce<'f>) -> Self {
        Aggregate {
            column,
            accessor,
            reduce,
        }
    }
}

impl Table {
    pub fn grouping(&self) -> &GroupState {
        &self.grouping
    }

    /// Sort by the key of column `r` and open a grouping on it.
    pub fn group_by(&mut self, r: ColumnRef, accessor: &Accessor) -> Result<()> {
        if let GroupState::Open(_) = self.grouping {
            return Err(precondition(format!(
                "grouping already in progress on table {}",
                self.id()
            )));
        }
        let keys = accessor.keys(&self.column(r)?)?;
        self.reorder_by(|a, b| keys.compare(a, b))?;
        let ends = KeySet::compact(&keys, self.order())?.ends().clone();
        debug!(
            target: "ringtab",
            table = self.id(),
            column = %r,
            rows = self.rows(),
            groups = ends.len(),
            "group_by"
        );
        self.grouping = GroupState::Open(Grouping {
            levels: vec![Level {
                column: r,
                keys,
                ends,
            }],
        });
        Ok(())
    }

    /// Split every block of the open grouping by the key of column `r`.
    pub fn then_by(&mut self, r: ColumnRef, accessor: &Accessor) -> Result<()> {
        let blocks = match &self.grouping {
            GroupState::Open(g) => {
                let finest = g.finest()?;
                (0..finest.blocks())
                    .map(|i| finest.block(i))
                    .collect::<Result<Vec<_>>>()?
            }
            _ => {
                return Err(precondition(format!(
                    "no grouping in progress on table {}",
                    self.id()
                )))
            }
        };
        let keys = accessor.keys(&self.column(r)?)?;
        for block in blocks.iter() {
            if block.len() > 1 {
                self.order_mut()
                    .sort_range_by(block.clone(), |a, b| keys.compare(a, b))?;
            }
        }
        let ends = boundaries(&keys, self.order(), blocks.into_iter())?;
        debug!(
            target: "ringtab",
            table = self.id(),
            column = %r,
            groups = ends.len(),
            "then_by"
        );
        if let GroupState::Open(g) = &mut self.grouping {
            g.levels.push(Level {
                column: r,
                keys,
                ends,
            });
        }
        Ok(())
    }

    /// Fold column `r` over every group with `reduce`.
    pub fn collect(&mut self, r: ColumnRef, accessor: Accessor, reduce: Reduce) -> Result<Table> {
        self.collect_all(vec![Aggregate::new(r, accessor, reduce)])
    }

    /// Fold several columns over every group, producing a table with one
    /// row per group: the key of each level, then each aggregate.
    pub fn collect_all(&mut self, aggregates: Vec<Aggregate>) -> Result<Table> {
        let GroupState::Open(g) = &self.grouping else {
            return Err(precondition(format!(
                "no grouping in progress on table {}",
                self.id()
            )));
        };
        let finest = g.finest()?;
        let blocks = (0..finest.blocks())
            .map(|i| finest.block(i))
            .collect::<Result<Vec<_>>>()?;
        let firsts = blocks
            .iter()
            .map(|b| self.rank(b.start))
            .collect::<Result<Vec<_>>>()?;

        let mut out = Table::new(self.slab(), blocks.len())?;
        for level in g.levels.iter() {
            out.extend(level.keys.gather(&firsts)?)?;
        }
        for agg in aggregates.iter() {
            if !agg.accessor.is_long() {
                return Err(type_mismatch(format!(
                    "aggregate over {} needs a long accessor",
                    agg.column
                )));
            }
            let Keys::Longs(vals) = agg.accessor.keys(&self.column(agg.column)?)? else {
                return Err(type_mismatch("long accessor produced object keys"));
            };
            let mut folded = Vec::with_capacity(blocks.len());
            for block in blocks.iter() {
                let rows = block
                    .clone()
                    .map(|pos| self.rank(pos))
                    .collect::<Result<Vec<_>>>()?;
                let v = agg
                    .reduce
                    .fold(rows.iter().filter_map(|row| vals.get(*row).copied()))?;
                trace!(target: "ringtab", column = %agg.column, rows = rows.len(), value = v, "fold block");
                folded.push(v);
            }
            out.extend(Column::from(folded))?;
        }
        debug!(
            target: "ringtab",
            table = self.id(),
            result = out.id(),
            levels = g.depth(),
            groups = blocks.len(),
            aggregates = aggregates.len(),
            "collect"
        );
        self.grouping = GroupState::Done;
        Ok(out)
    }
}

/// Ends of the runs of equal keys inside each of `blocks`, which are
/// already sorted by `keys` under `order`.
fn boundaries(
    keys: &Keys,
    order: &CompactIndex,
    blocks: impl Iterator<Item = Range<usize>>,
) -> Result<CompactIndex> {
    let mut ends = Vec::new();
    for block in blocks {
        let mut prev: Option<usize> = None;
        for pos in block.clone() {
            let row = order.get(pos)?;
            if let Some(p) = prev {
                match keys.compare(p, row) {
                    Ordering::Equal => (),
                    Ordering::Less => ends.push(pos),
                    Ordering::Greater => {
                        return Err(precondition(format!(
                            "column not sorted at position {}",
                            pos
                        )))
                    }
                }
            }
            prev = Some(row);
        }
        if !block.is_empty() {
            ends.push(block.end);
        }
    }
    CompactIndex::from_values(&ends)
}
