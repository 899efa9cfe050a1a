// In-process columnar tables sharing one ring-shaped slab of column cells.
//
// The pieces live in two crates: `ringtab-base` has the error type, the
// ordinal and extent values and the occupancy bitmap; `ringtab-table` has
// everything built on them. This crate just puts both under one name.

pub use ringtab_base::{
    capacity, err, from_label, missing, ordinal, precondition, to_label, type_mismatch, Bitmap,
    Error, ErrorKind, Extent, Ordinal, Result, OMEGA,
};
pub use ringtab_table::*;

#[cfg(test)]
mod test;
