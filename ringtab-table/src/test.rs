mod accessor;
mod index;
mod row;
mod slab;
mod split;

use crate::{Column, Slab, SlabOptions, Table};
use ringtab_base::Result;

pub(crate) fn small_slab() -> Result<Slab> {
    Slab::new(SlabOptions {
        capacity_log2: 6,
        slot_width: 4,
    })
}

/// The pets table: ids 0..8 and their categories.
pub(crate) fn pets(slab: &Slab) -> Result<Table> {
    Table::with_columns(
        slab,
        [
            Column::from(vec![0i64, 1, 2, 3, 4, 5, 6, 7]),
            Column::from(vec![
                "cats", "cats", "dogs", "dogs", "other", "other", "other", "dogs",
            ]),
        ],
    )
}
