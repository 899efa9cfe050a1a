// Sort-merge joins over two compacted key sets. Both distinct-key arrays
// are ascending, so a single pass with one cursor per side finds, for each
// left key, the matching right key (if any) without ever backing up.
//
// Results are produced in the left table's physical row order so they can
// be extended straight back onto the left table.

use crate::{
    column::Column,
    dict::{Dictionary, KeyIndex, KeySet},
    directory::ColumnRef,
    table::Table,
};
use ringtab_base::{missing, type_mismatch, Result};
use std::{cmp::Ordering, fmt::Debug};
use tracing::{debug, trace};

/// For each left distinct key, the rank of the equal right key.
fn merge_dict<K: Ord + Clone + Debug>(left: &Dictionary<K>, right: &Dictionary<K>) -> Vec<Option<usize>> {
    let rkeys = right.keys();
    let mut j = 0;
    left.keys()
        .iter()
        .map(|k| {
            while j < rkeys.len() && rkeys[j].cmp(k) == Ordering::Less {
                j += 1;
            }
            (j < rkeys.len() && rkeys[j] == *k).then_some(j)
        })
        .collect()
}

fn merge(left: &KeySet, right: &KeySet) -> Result<Vec<Option<usize>>> {
    match (left, right) {
        (KeySet::Longs(l), KeySet::Longs(r)) => Ok(merge_dict(l, r)),
        (KeySet::Objs(l), KeySet::Objs(r)) => Ok(merge_dict(l, r)),
        _ => Err(type_mismatch("cannot join long keys against object keys")),
    }
}

fn foreign_key(t: &Table) -> Result<&KeyIndex> {
    t.foreign_key()
        .ok_or_else(|| missing(format!("no foreign key on table {}", t.id())))
}

fn primary_key(t: &Table) -> Result<&KeyIndex> {
    t.primary_key()
        .ok_or_else(|| missing(format!("no primary key on table {}", t.id())))
}

/// One-to-one join: for every left row, the value of column `value` at
/// the right row whose primary key equals the left row's foreign key. A
/// single unmatched key fails the whole join.
pub fn inject(left: &Table, right: &Table, value: ColumnRef) -> Result<Column> {
    let fk = foreign_key(left)?;
    let pk = primary_key(right)?;
    let values = right.column(value)?;
    debug!(
        target: "ringtab",
        left = left.id(),
        right = right.id(),
        left_keys = fk.set().len(),
        right_keys = pk.set().len(),
        column = %value,
        "inject"
    );
    let matches = merge(fk.set(), pk.set())?;
    let mut rows = vec![0; left.rows()];
    for (i, m) in matches.into_iter().enumerate() {
        let Some(j) = m else {
            let key = fk.set().key(i).map(|k| k.to_string()).unwrap_or_default();
            return Err(missing(format!(
                "no primary key found matching foreign key: {}",
                key
            )));
        };
        let target = pk.order().get(pk.set().block(j)?.start)?;
        let block = fk.set().block(i)?;
        trace!(target: "ringtab", key = i, rows = block.len(), right_row = target, "inject block");
        for pos in block {
            let row = fk.order().get(pos)?;
            if let Some(slot) = rows.get_mut(row) {
                *slot = target;
            }
        }
    }
    values.gather(&rows)
}

/// One-to-many join: for every left row, the list of column `value` over
/// every right row whose foreign key equals the left row's primary key.
/// Unmatched rows get an empty list.
pub fn surject(left: &Table, right: &Table, value: ColumnRef) -> Result<Column> {
    let pk = primary_key(left)?;
    let fk = foreign_key(right)?;
    let values = right.column(value)?;
    debug!(
        target: "ringtab",
        left = left.id(),
        right = right.id(),
        left_keys = pk.set().len(),
        right_keys = fk.set().len(),
        column = %value,
        "surject"
    );
    let matches = merge(pk.set(), fk.set())?;
    let empty = Column::empty(values.column_type());
    let mut parts = vec![empty; left.rows()];
    for (i, m) in matches.into_iter().enumerate() {
        let Some(j) = m else {
            continue;
        };
        let part = values.gather(&fk.rows_of(j)?)?;
        trace!(target: "ringtab", key = i, len = part.len(), "surject block");
        for pos in pk.set().block(i)? {
            let row = pk.order().get(pos)?;
            if let Some(slot) = parts.get_mut(row) {
                *slot = part.clone();
            }
        }
    }
    Column::nested(parts)
}

impl Table {
    /// Inject column `value` of `right` and extend it onto this table.
    pub fn join_one(&mut self, right: &Table, value: ColumnRef) -> Result<ColumnRef> {
        let joined = inject(self, right, value)?;
        self.extend(joined)
    }

    /// Surject column `value` of `right` and extend it onto this table.
    pub fn join_many(&mut self, right: &Table, value: ColumnRef) -> Result<ColumnRef> {
        let joined = surject(self, right, value)?;
        self.extend(joined)
    }
}
