/// A growable bitmap that counts bits in order from least-to-most
/// significant bits and ascending words. The slab uses one to track
/// which of its cells are claimed by a live table.
#[derive(Clone, Default, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Bitmap {
    bits: Vec<u64>,
    len: usize,
}
impl Bitmap {
    pub fn new(len: usize) -> Self {
        Bitmap {
            bits: vec![0; len.div_ceil(64)],
            len,
        }
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|x| *x == 0)
    }
    pub fn set(&mut self, i: usize, val: bool) {
        if i >= self.len {
            return;
        }
        if val {
            self.bits[i / 64] |= 1 << (i % 64);
        } else {
            self.bits[i / 64] &= !(1 << (i % 64));
        }
    }
    pub fn get(&self, i: usize) -> bool {
        i < self.len && (self.bits[i / 64] & (1 << (i % 64))) != 0
    }
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|x| x.count_ones()).sum()
    }
    pub fn any(&self) -> bool {
        !self.is_empty()
    }
    // Number of set bits at or below i; past the end that is every set bit.
    pub fn rank(&self, i: usize) -> usize {
        if i >= self.len {
            return self.count() as usize;
        }
        let word = i / 64;
        let mut n: usize = self.bits[..word].iter().map(|x| x.count_ones() as usize).sum();
        let mask = if i % 64 == 63 {
            u64::MAX
        } else {
            (1u64 << (i % 64 + 1)) - 1
        };
        n += (self.bits[word] & mask).count_ones() as usize;
        n
    }
    // True if every bit in the circular run starting at `start` of
    // length `width` is clear.
    pub fn run_is_clear(&self, start: usize, width: usize) -> bool {
        self.len > 0 && (0..width).all(|k| !self.get((start + k) % self.len))
    }
    pub fn set_run(&mut self, start: usize, width: usize, val: bool) {
        if self.len == 0 {
            return;
        }
        for k in 0..width {
            let i = (start + k) % self.len;
            self.set(i, val);
        }
    }
}
