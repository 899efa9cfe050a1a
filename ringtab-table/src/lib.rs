// Tables of heterogeneous columns sharing one slab:
//
//   Slab      one ring of column cells, shared by every table made on it
//   Table     a row count, a 16-entry column directory naming runs of slab
//             cells, and the current order (a permutation of the rows)
//   KeySet    sorted distinct keys of a column plus the ends of each key's
//             block of rows under the order it was compacted with
//
// Sorting permutes the order and never moves column data. Grouping and
// joining work on compacted key sets, and put their results back as new
// columns (joins) or a new table (group collect) on the same slab.

mod accessor;
mod column;
mod cursor;
mod dict;
mod directory;
mod group;
mod index;
mod join;
mod render;
mod row;
mod slab;
mod split;
mod table;

#[cfg(test)]
mod test;

pub use accessor::{Accessor, Key, Keys};
pub use column::{Coded, Column, ColumnType, Value};
pub use cursor::RowCursor;
pub use dict::{Dictionary, KeyIndex, KeySet};
pub use directory::{ColumnRef, DirEntry, Directory, DIRECTORY_LEN};
pub use group::{Aggregate, GroupState, Grouping, Level, Reduce};
pub use index::{CompactIndex, Width};
pub use join::{inject, surject};
pub use row::{combine_rows, default_of, register_default, Combine, FromValue, Row};
pub use slab::{Slab, SlabOptions};
pub use split::{split_cell, Split};
pub use table::{Table, MAX_ROWS};
