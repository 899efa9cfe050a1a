// The slab is one power-of-two-length ring of column cells shared by every
// table created against it. A table never owns cells directly; each entry
// of its directory claims a run of `slot_width` consecutive cells (wrapping
// at the end of the ring) and the table remembers where the run starts.
//
// The probe for a run starts at `hash(table id) & mask`, so unrelated
// tables spread out over the ring, but disjointness does not depend on the
// hash: a run is only handed out if every cell in it is unclaimed, and the
// claimed-cell bitmap is the single source of truth for that.
//
// Tables hold a cloned handle to the slab and release their runs on drop.

use crate::column::Column;
use ringtab_base::{capacity, precondition, Bitmap, Result};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, fmt, rc::Rc};
use tracing::{debug, trace};

#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SlabOptions {
    /// The ring holds `1 << capacity_log2` cells.
    pub capacity_log2: u8,
    /// Cells reserved per directory entry; bounded by the 3-bit count field.
    pub slot_width: u8,
}

impl Default for SlabOptions {
    fn default() -> Self {
        SlabOptions {
            capacity_log2: 12,
            slot_width: 7,
        }
    }
}

impl SlabOptions {
    pub const MIN_CAPACITY_LOG2: u8 = 4;
    pub const MAX_CAPACITY_LOG2: u8 = 24;
    pub const MAX_SLOT_WIDTH: u8 = 7;

    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_CAPACITY_LOG2..=Self::MAX_CAPACITY_LOG2).contains(&self.capacity_log2) {
            return Err(precondition(format!(
                "slab capacity_log2 {} outside {}..={}",
                self.capacity_log2,
                Self::MIN_CAPACITY_LOG2,
                Self::MAX_CAPACITY_LOG2
            )));
        }
        if self.slot_width == 0 || self.slot_width > Self::MAX_SLOT_WIDTH {
            return Err(precondition(format!(
                "slab slot_width {} outside 1..={}",
                self.slot_width,
                Self::MAX_SLOT_WIDTH
            )));
        }
        Ok(())
    }
}

struct Cells {
    cells: Vec<Option<Column>>,
    claimed: Bitmap,
    mask: usize,
    slot_width: usize,
    next_table: u64,
}

#[derive(Clone)]
pub struct Slab(Rc<RefCell<Cells>>);

impl Default for Slab {
    fn default() -> Self {
        Slab::build(&SlabOptions::default())
    }
}

impl fmt::Debug for Slab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.0.borrow();
        f.debug_struct("Slab")
            .field("capacity", &cells.cells.len())
            .field("claimed", &cells.claimed.count())
            .field("slot_width", &cells.slot_width)
            .finish()
    }
}

impl Slab {
    pub fn new(options: SlabOptions) -> Result<Slab> {
        options.validate()?;
        debug!(
            target: "ringtab",
            capacity_log2 = options.capacity_log2,
            slot_width = options.slot_width,
            "new slab"
        );
        Ok(Slab::build(&options))
    }

    fn build(options: &SlabOptions) -> Slab {
        let len = 1usize << options.capacity_log2;
        Slab(Rc::new(RefCell::new(Cells {
            cells: vec![None; len],
            claimed: Bitmap::new(len),
            mask: len - 1,
            slot_width: options.slot_width as usize,
            next_table: 0,
        })))
    }

    pub fn capacity(&self) -> usize {
        self.0.borrow().cells.len()
    }

    pub fn mask(&self) -> usize {
        self.0.borrow().mask
    }

    pub fn slot_width(&self) -> usize {
        self.0.borrow().slot_width
    }

    /// Number of cells currently claimed by live tables.
    pub fn claimed(&self) -> usize {
        self.0.borrow().claimed.count() as usize
    }

    pub fn same_store(&self, other: &Slab) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Two slabs can exchange column handles only if they agree on ring
    /// geometry, since directory offsets are interpreted modulo the mask.
    pub(crate) fn check_compatible(&self, other: &Slab) -> Result<()> {
        if self.same_store(other) {
            return Ok(());
        }
        let (a, b) = (self.0.borrow(), other.0.borrow());
        if a.mask != b.mask || a.slot_width != b.slot_width {
            return Err(precondition(format!(
                "mismatched slabs: mask {:#x}/width {} vs mask {:#x}/width {}",
                a.mask, a.slot_width, b.mask, b.slot_width
            )));
        }
        Ok(())
    }

    pub(crate) fn next_table_id(&self) -> u64 {
        let mut cells = self.0.borrow_mut();
        let id = cells.next_table;
        cells.next_table += 1;
        id
    }

    pub(crate) fn base_for(&self, table_id: u64) -> usize {
        (rapidhash::rapidhash(&table_id.to_le_bytes()) as usize) & self.mask()
    }

    /// Claim a run of `slot_width` cells, probing forward from `base`.
    /// Returns the absolute index of the first cell.
    pub(crate) fn claim(&self, base: usize) -> Result<usize> {
        let mut cells = self.0.borrow_mut();
        let (len, width) = (cells.cells.len(), cells.slot_width);
        for k in 0..len {
            let start = (base + k) & cells.mask;
            if cells.claimed.run_is_clear(start, width) {
                cells.claimed.set_run(start, width, true);
                trace!(target: "ringtab", start, width, probes = k + 1, "claimed slab run");
                return Ok(start);
            }
        }
        Err(capacity(format!(
            "slab exhausted: no free run of {} cells in {}",
            width, len
        )))
    }

    pub(crate) fn release(&self, start: usize) {
        let mut cells = self.0.borrow_mut();
        let (width, mask) = (cells.slot_width, cells.mask);
        for k in 0..width {
            cells.cells[(start + k) & mask] = None;
        }
        cells.claimed.set_run(start, width, false);
        trace!(target: "ringtab", start, width, "released slab run");
    }

    pub(crate) fn put(&self, cell: usize, column: Column) {
        let mut cells = self.0.borrow_mut();
        let mask = cells.mask;
        cells.cells[cell & mask] = Some(column);
    }

    pub(crate) fn get(&self, cell: usize) -> Option<Column> {
        let cells = self.0.borrow();
        cells.cells[cell & cells.mask].clone()
    }
}
