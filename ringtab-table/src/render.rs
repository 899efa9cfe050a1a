// Plain-text grid rendering, mostly for tests and debugging:
//
//       | A    | B
//     --+------+--
//     0 | cats | 0
//     1 | cats | 1
//
// Columns are labelled in directory order, rows are listed in logical
// order with their logical position in the left margin.

use crate::table::Table;
use ringtab_base::to_label;
use std::fmt::{self, Write};

impl Table {
    pub fn render(&self) -> Result<String, fmt::Error> {
        let columns = self.columns();
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(columns.len());
        for r in columns.iter() {
            let cells = match self.column(*r) {
                Ok(c) => (0..self.rows())
                    .map(|pos| match self.rank(pos).ok().and_then(|row| c.get(row)) {
                        Some(v) => v.to_string(),
                        None => "?".to_string(),
                    })
                    .collect(),
                Err(_) => vec!["?".to_string(); self.rows()],
            };
            grid.push(cells);
        }
        let margin = self.rows().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = grid
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                cells
                    .iter()
                    .map(|s| s.chars().count())
                    .chain(std::iter::once(to_label(i).len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.rows() + 2);
        let mut line = format!("{:margin$}", "");
        for (i, w) in widths.iter().copied().enumerate() {
            write!(line, " | {:w$}", to_label(i))?;
        }
        lines.push(line);
        let mut line = "-".repeat(margin);
        for w in widths.iter() {
            write!(line, "-+-{}", "-".repeat(*w))?;
        }
        lines.push(line);
        for pos in 0..self.rows() {
            let mut line = format!("{:>margin$}", pos);
            for (cells, w) in grid.iter().zip(widths.iter().copied()) {
                write!(line, " | {:w$}", cells[pos])?;
            }
            lines.push(line);
        }
        let mut s = String::new();
        for line in lines {
            writeln!(s, "{}", line.trim_end())?;
        }
        Ok(s)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render()?)
    }
}
