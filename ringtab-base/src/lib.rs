mod bitmap;
mod error;
mod ordinal;

#[cfg(test)]
mod test;

pub use bitmap::Bitmap;
pub use error::{capacity, err, missing, precondition, type_mismatch, Error, ErrorKind, Result};
pub use ordinal::{from_label, ordinal, to_label, Extent, Ordinal, OMEGA};
