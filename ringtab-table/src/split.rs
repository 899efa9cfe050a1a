// Splitting one delimited text column into one text column per field. A
// cell that ends with the delimiter is a header cell: the trailing
// delimiter only marks it and is not an empty last field.

use crate::{
    column::{Column, ColumnType},
    directory::ColumnRef,
    table::Table,
};
use memchr::memmem;
use ringtab_base::{precondition, type_mismatch, Result};
use tracing::debug;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Split {
    /// The new field columns, in field order.
    pub columns: Vec<ColumnRef>,
    /// Physical rows whose cell was marked as a header.
    pub header_rows: Vec<usize>,
}

impl Split {
    pub fn first(&self) -> Option<ColumnRef> {
        self.columns.first().copied()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// The fields of one cell, and whether it carried the header mark.
pub fn split_cell<'a>(cell: &'a str, delim: &str) -> (Vec<&'a str>, bool) {
    let (body, header) = match cell.strip_suffix(delim) {
        Some(body) if !delim.is_empty() => (body, true),
        _ => (cell, false),
    };
    let mut fields = Vec::new();
    let mut start = 0;
    for hit in memmem::find_iter(body.as_bytes(), delim.as_bytes()) {
        fields.push(&body[start..hit]);
        start = hit + delim.len();
    }
    fields.push(&body[start..]);
    (fields, header)
}

impl Table {
    /// Split text column `r` on `delim`, extending one text column per
    /// field. Rows with fewer fields than the widest are padded with "".
    /// If any field column cannot be added, none are.
    pub fn split(&mut self, r: ColumnRef, delim: &str) -> Result<Split> {
        if delim.is_empty() {
            return Err(precondition("empty split delimiter"));
        }
        let column = self.column(r)?.decode()?;
        let cells = column.as_texts().ok_or_else(|| {
            type_mismatch(format!(
                "split needs a {} column, not {}",
                ColumnType::Text,
                column.column_type()
            ))
        })?;

        let mut header_rows = Vec::new();
        let mut rows = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            let (fields, header) = split_cell(cell, delim);
            if header {
                header_rows.push(i);
            }
            rows.push(fields);
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        debug!(
            target: "ringtab",
            table = self.id(),
            column = %r,
            rows = rows.len(),
            width,
            headers = header_rows.len(),
            "split"
        );

        let columns = self.atomically(|t| {
            (0..width)
                .map(|f| t.extend(Column::text(rows.iter().map(|row| row.get(f).copied().unwrap_or("")))))
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(Split {
            columns,
            header_rows,
        })
    }
}
