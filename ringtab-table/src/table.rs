// A table is a row count, a window of slab runs described by its column
// directory, and the current order: the permutation through which every
// logical row position is translated to a physical row of the columns.
//
// Columns are stored in physical order and never rewritten. Sorting only
// permutes the order, and an order that is still the identity is kept as
// the natural sentinel until something actually needs to move a row.

use crate::{
    accessor::Accessor,
    column::{Column, ColumnType},
    dict::KeyIndex,
    directory::{ColumnRef, DirEntry, Directory, DIRECTORY_LEN},
    group::GroupState,
    index::CompactIndex,
    slab::Slab,
};
use ringtab_base::{capacity, missing, precondition, type_mismatch, Extent, Result, OMEGA};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// The largest row count a table may have; every rank must fit the wide
/// compact index width.
pub const MAX_ROWS: usize = OMEGA - 1;

pub struct Table {
    slab: Slab,
    id: u64,
    base: usize,
    rows: usize,
    directory: Directory,
    order: CompactIndex,
    pub(crate) pk: Option<KeyIndex>,
    pub(crate) fk: Option<KeyIndex>,
    pub(crate) grouping: GroupState,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("base", &self.base)
            .field("rows", &self.rows)
            .field("columns", &self.directory.column_count())
            .field("natural", &self.order.is_natural())
            .finish()
    }
}

impl Table {
    pub fn new(slab: &Slab, rows: usize) -> Result<Table> {
        if rows > MAX_ROWS {
            return Err(capacity(format!(
                "table of {} rows exceeds {} rows",
                rows, MAX_ROWS
            )));
        }
        let id = slab.next_table_id();
        let base = slab.base_for(id);
        debug!(target: "ringtab", table = id, base, rows, "new table");
        Ok(Table {
            slab: slab.clone(),
            id,
            base,
            rows,
            directory: Directory::default(),
            order: CompactIndex::natural(rows),
            pk: None,
            fk: None,
            grouping: GroupState::Ungrouped,
        })
    }

    /// A table whose row count is taken from the first column.
    pub fn with_columns(slab: &Slab, columns: impl IntoIterator<Item = Column>) -> Result<Table> {
        let columns: Vec<Column> = columns.into_iter().collect();
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut table = Table::new(slab, rows)?;
        for c in columns {
            table.extend(c)?;
        }
        Ok(table)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn slab(&self) -> &Slab {
        &self.slab
    }

    /// Where this table's probes for slab runs start.
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn order(&self) -> &CompactIndex {
        &self.order
    }

    pub(crate) fn order_mut(&mut self) -> &mut CompactIndex {
        &mut self.order
    }

    /// The number of column types present packed with the row count.
    pub fn extent(&self) -> Result<Extent> {
        Extent::new(self.directory.type_count(), self.rows)
    }

    fn cell(&self, entry: usize, sub: usize) -> Result<usize> {
        let e = self
            .directory
            .entry(entry)
            .ok_or_else(|| capacity(format!("directory entry {} out of range", entry)))?;
        Ok((self.base + e.offset() + sub) & self.slab.mask())
    }

    fn check_len(&self, column: &Column) -> Result<()> {
        if column.len() != self.rows {
            return Err(precondition(format!(
                "column of {} rows does not fit table {} of {} rows",
                column.len(),
                self.id,
                self.rows
            )));
        }
        Ok(())
    }

    /// Claim a fresh run and record it as a directory entry holding
    /// `count` columns of type `ty`.
    fn open_entry(&mut self, ty: ColumnType, count: usize) -> Result<usize> {
        let i = self.directory.len();
        self.open_entry_at(i, ty, count)?;
        Ok(i)
    }

    fn open_entry_at(&mut self, i: usize, ty: ColumnType, count: usize) -> Result<()> {
        if i >= DIRECTORY_LEN {
            return Err(capacity(format!(
                "column directory full ({} entries)",
                DIRECTORY_LEN
            )));
        }
        let start = self.slab.claim(self.base)?;
        let offset = start.wrapping_sub(self.base) & self.slab.mask();
        let placed = DirEntry::pack(ty, count, offset).and_then(|e| self.directory.place(i, e));
        if placed.is_err() {
            self.slab.release(start);
        }
        placed
    }

    /// Run `f` against this table and, if it fails, put the directory back
    /// the way it was and release every run claimed in the meantime.
    pub(crate) fn atomically<T>(&mut self, f: impl FnOnce(&mut Table) -> Result<T>) -> Result<T> {
        let saved = self.directory;
        let res = f(self);
        if res.is_err() {
            let mask = self.slab.mask();
            for (i, e) in self.directory.entries().iter().enumerate() {
                let kept = saved.entry(i).is_some_and(|s| !s.is_empty());
                if !e.is_empty() && !kept {
                    self.slab.release((self.base + e.offset()) & mask);
                }
            }
            trace!(
                target: "ringtab",
                table = self.id,
                entries = saved.len(),
                "rolled back directory"
            );
            self.directory = saved;
        }
        res
    }

    /// Register `column` as the next column of its type.
    pub fn extend(&mut self, column: Column) -> Result<ColumnRef> {
        self.check_len(&column)?;
        let ty = column.column_type();
        let r = ColumnRef::new(ty, self.directory.count_of(ty));
        let (entry, sub) = match self.directory.open_for(ty, self.slab.slot_width()) {
            Some(i) => (i, self.directory.bump(i)?),
            None => (self.open_entry(ty, 1)?, 0),
        };
        let cell = self.cell(entry, sub)?;
        self.slab.put(cell, column);
        trace!(target: "ringtab", table = self.id, column = %r, entry, cell, "extended");
        Ok(r)
    }

    pub fn column(&self, r: ColumnRef) -> Result<Column> {
        let (entry, sub) = self
            .directory
            .find(r)
            .ok_or_else(|| missing(format!("no column {} in table {}", r, self.id)))?;
        self.slab
            .get(self.cell(entry, sub)?)
            .ok_or_else(|| missing(format!("column {} of table {} is vacant", r, self.id)))
    }

    /// The `i`-th column in directory order.
    pub fn column_at(&self, i: usize) -> Result<Column> {
        let r = self
            .columns()
            .get(i)
            .copied()
            .ok_or_else(|| missing(format!("no column at {} in table {}", i, self.id)))?;
        self.column(r)
    }

    pub fn columns(&self) -> Vec<ColumnRef> {
        self.directory.columns()
    }

    /// Column `r` read in logical row order.
    pub fn column_in_order(&self, r: ColumnRef) -> Result<Column> {
        let column = self.column(r)?;
        if self.order.is_natural() {
            return column.decode();
        }
        column.gather(&self.order.to_vec())
    }

    /// Point column `r` at a new handle. Views sharing the old handle are
    /// unaffected.
    pub fn replace(&mut self, r: ColumnRef, column: Column) -> Result<()> {
        self.check_len(&column)?;
        if column.column_type() != r.ty {
            return Err(type_mismatch(format!(
                "cannot replace {} with a {} column",
                r,
                column.column_type()
            )));
        }
        let (entry, sub) = self
            .directory
            .find(r)
            .ok_or_else(|| missing(format!("no column {} in table {}", r, self.id)))?;
        let cell = self.cell(entry, sub)?;
        self.slab.put(cell, column);
        Ok(())
    }

    /// A new table on the same slab with the same rows and order but no
    /// columns; its runs are probed from a base of its own.
    pub fn view(&self) -> Result<Table> {
        let mut t = Table::new(&self.slab, self.rows)?;
        t.order = self.order.clone();
        debug!(target: "ringtab", source = self.id, view = t.id, "view");
        Ok(t)
    }

    /// Copy the column handles of directory entries `start..start + count`
    /// into the same entries of `target`, which must all be unused there.
    /// Nothing is copied if any entry fails.
    pub fn export(&self, target: &mut Table, start: usize, count: usize) -> Result<()> {
        debug!(
            target: "ringtab",
            source = self.id,
            dest = target.id,
            start,
            count,
            "export"
        );
        self.slab.check_compatible(&target.slab)?;
        if target.rows != self.rows {
            return Err(precondition(format!(
                "export of {} rows into table of {} rows",
                self.rows, target.rows
            )));
        }
        let end = start
            .checked_add(count)
            .filter(|end| *end <= self.directory.len())
            .ok_or_else(|| {
                capacity(format!(
                    "export of entries {}..{}+{} from directory of {}",
                    start,
                    start,
                    count,
                    self.directory.len()
                ))
            })?;
        if let Some(i) = (start..end).find(|i| target.directory.entry(*i).is_some_and(|e| !e.is_empty())) {
            return Err(precondition(format!(
                "export into entry {} overlaps an occupied entry of table {}",
                i, target.id
            )));
        }
        target.atomically(|target| {
            for i in start..end {
                let e = self
                    .directory
                    .entry(i)
                    .ok_or_else(|| capacity(format!("directory entry {} out of range", i)))?;
                if e.is_empty() {
                    continue;
                }
                let ty = e
                    .ty()
                    .ok_or_else(|| type_mismatch(format!("directory entry {} has no type", i)))?;
                target.open_entry_at(i, ty, e.count())?;
                for sub in 0..e.count() {
                    if let Some(c) = self.slab.get(self.cell(i, sub)?) {
                        target.slab.put(target.cell(i, sub)?, c);
                    }
                }
            }
            Ok(())
        })
    }

    /// A view holding every column of this one. Column data is shared.
    pub fn duplicate(&self) -> Result<Table> {
        let mut t = self.view()?;
        self.export(&mut t, 0, self.directory.len())?;
        Ok(t)
    }

    /// The physical row at logical position `pos`.
    pub fn rank(&self, pos: usize) -> Result<usize> {
        self.order.get(pos)
    }

    /// Stably sort the order by `cmp` over physical rows. Returns false,
    /// without touching the order, if it is already sorted.
    pub fn reorder_by<F: FnMut(usize, usize) -> Ordering>(&mut self, mut cmp: F) -> Result<bool> {
        let mut sorted = true;
        let mut prev = None;
        for row in self.order.iter() {
            if let Some(p) = prev {
                if cmp(p, row) == Ordering::Greater {
                    sorted = false;
                    break;
                }
            }
            prev = Some(row);
        }
        if sorted {
            return Ok(false);
        }
        self.order.sort_range_by(0..self.rows, &mut cmp)?;
        Ok(true)
    }

    /// Sort by the accessor's key of column `r`.
    pub fn sort_by(&mut self, r: ColumnRef, accessor: &Accessor) -> Result<bool> {
        let keys = accessor.keys(&self.column(r)?)?;
        let moved = self.reorder_by(|a, b| keys.compare(a, b))?;
        debug!(
            target: "ringtab",
            table = self.id,
            column = %r,
            rows = self.rows,
            moved,
            "sort"
        );
        Ok(moved)
    }

    pub fn reset_order(&mut self) {
        self.order = CompactIndex::natural(self.rows);
    }

    /// Install an explicit order; it must be a permutation of the rows.
    pub fn set_order(&mut self, order: CompactIndex) -> Result<()> {
        if order.len() != self.rows || !order.is_permutation() {
            return Err(precondition(format!(
                "order of {} entries is not a permutation of {} rows",
                order.len(),
                self.rows
            )));
        }
        self.order = order;
        Ok(())
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        let mask = self.slab.mask();
        for e in self.directory.entries().iter().filter(|e| !e.is_empty()) {
            self.slab.release((self.base + e.offset()) & mask);
        }
    }
}
