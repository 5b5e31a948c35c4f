/// Collection of unique indices supporting add, remove, and contains operations.
/// Uses packed bitfields where each bit represents one index's containment state.
#[derive(Debug, Clone, Default)]
pub struct IndexSet {
    /// Packed bitfields representing index containment.
    flags: Vec<u64>,
    count: usize,
}

impl IndexSet {
    const SHIFT: usize = 6;
    const MASK: usize = 63;

    /// Gets the bundle capacity needed for the given count.
    #[inline(always)]
    fn get_bundle_capacity(count: usize) -> usize {
        (count + Self::MASK) >> Self::SHIFT
    }

    /// Creates a new IndexSet able to hold indices below `initial_capacity` without resizing.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            flags: vec![0; Self::get_bundle_capacity(initial_capacity)],
            count: 0,
        }
    }

    /// Number of indices contained in the set.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Checks if an index is contained in the set.
    #[inline(always)]
    pub fn contains(&self, index: usize) -> bool {
        let packed_index = index >> Self::SHIFT;
        packed_index < self.flags.len()
            && (self.flags[packed_index] & (1u64 << (index & Self::MASK))) > 0
    }

    /// Adds an index to the set. Returns false if the index was already present.
    pub fn add(&mut self, index: usize) -> bool {
        let bundle_index = index >> Self::SHIFT;
        if bundle_index >= self.flags.len() {
            // Round up to power of 2
            let new_capacity = (bundle_index + 1).next_power_of_two();
            self.flags.resize(new_capacity, 0);
        }
        let slot = 1u64 << (index & Self::MASK);
        if self.flags[bundle_index] & slot != 0 {
            return false;
        }
        self.flags[bundle_index] |= slot;
        self.count += 1;
        true
    }

    /// Removes an index from the set. Returns false if the index was not present.
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        self.flags[index >> Self::SHIFT] &= !(1u64 << (index & Self::MASK));
        self.count -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove() {
        let mut set = IndexSet::new(16);
        assert!(set.add(3));
        assert!(!set.add(3));
        assert!(set.add(200));
        assert!(set.contains(3));
        assert!(set.contains(200));
        assert!(!set.contains(4));
        assert_eq!(set.len(), 2);

        assert!(set.remove(3));
        assert!(!set.remove(3));
        assert!(!set.contains(3));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_contains_beyond_capacity() {
        let set = IndexSet::new(0);
        assert!(!set.contains(10_000));
    }
}
