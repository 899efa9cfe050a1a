use crate::{
    column::{ColumnType, Value},
    directory::ColumnRef,
    row::Row,
    table::Table,
};
use ringtab_base::{capacity, precondition, Result};

/// A movable position over a table's logical rows. A fresh cursor sits
/// before the first row (or after the last, from `cursor_at_end`), so the
/// usual loop is `while cursor.advance() { ... }`.
#[derive(Clone, Debug)]
pub struct RowCursor<'t> {
    table: &'t Table,
    pos: isize,
    column_base: usize,
}

impl<'t> RowCursor<'t> {
    pub fn new(table: &'t Table) -> Self {
        RowCursor {
            table,
            pos: -1,
            column_base: 0,
        }
    }

    /// Number every column lookup from `base` instead of zero, so the
    /// `pos`-th column of a type read through this cursor is the
    /// `base + pos`-th of the table.
    pub fn with_base(mut self, base: usize) -> Self {
        self.column_base = base;
        self
    }

    pub fn column_base(&self) -> usize {
        self.column_base
    }

    pub fn table(&self) -> &'t Table {
        self.table
    }

    fn rows(&self) -> isize {
        self.table.rows() as isize
    }

    /// Move to the next row; false (and parked past the end) if there is none.
    pub fn advance(&mut self) -> bool {
        if self.pos + 1 < self.rows() {
            self.pos += 1;
            true
        } else {
            self.pos = self.rows();
            false
        }
    }

    /// Move to the previous row; false (and parked before the start) if
    /// there is none.
    pub fn recede(&mut self) -> bool {
        if self.pos > 0 && self.pos <= self.rows() {
            self.pos -= 1;
            true
        } else {
            self.pos = -1;
            false
        }
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos >= self.table.rows() {
            return Err(capacity(format!(
                "seek to row {} of {}",
                pos,
                self.table.rows()
            )));
        }
        self.pos = pos as isize;
        Ok(())
    }

    /// The logical position, if the cursor is on a row.
    pub fn position(&self) -> Option<usize> {
        (0..self.rows())
            .contains(&self.pos)
            .then_some(self.pos as usize)
    }

    /// The physical row under the cursor.
    pub fn row(&self) -> Result<usize> {
        let pos = self
            .position()
            .ok_or_else(|| precondition("cursor is not on a row"))?;
        self.table.rank(pos)
    }
}

impl Row for RowCursor<'_> {
    fn value(&self, ty: ColumnType, pos: usize) -> Result<Value> {
        let row = self.row()?;
        let r = ColumnRef::new(ty, self.column_base + pos);
        self.table
            .column(r)?
            .get(row)
            .ok_or_else(|| capacity(format!("row {} out of range of column {}", row, r)))
    }
}

impl Table {
    pub fn cursor(&self) -> RowCursor<'_> {
        RowCursor::new(self)
    }

    /// A cursor parked past the last row, for walking backwards.
    pub fn cursor_at_end(&self) -> RowCursor<'_> {
        let mut c = RowCursor::new(self);
        c.pos = self.rows() as isize;
        c
    }
}
