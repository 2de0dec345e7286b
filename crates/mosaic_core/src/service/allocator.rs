//! Grid tile allocation.
//!
//! Occupancy is always recomputed from the live ledger, so a tile freed by
//! eviction becomes available to the next allocation.

use crate::model::settings::AdminSettings;
use crate::service::error::{MosaicError, MosaicResult};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Picks free tiles in a `rows x cols` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionAllocator {
    total_slots: u32,
}

impl PositionAllocator {
    pub fn new(total_slots: u32) -> Self {
        Self { total_slots }
    }

    pub fn for_settings(settings: &AdminSettings) -> Self {
        Self::new(settings.total_slots())
    }

    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    /// Tiles in `[0, total_slots)` not held by a live entry, ascending.
    ///
    /// Occupied positions outside the grid (left over after a shrink) are
    /// ignored.
    pub fn available_positions(&self, occupied: &HashSet<u32>) -> Vec<u32> {
        (0..self.total_slots)
            .filter(|position| !occupied.contains(position))
            .collect()
    }

    /// Picks one of `available` uniformly at random.
    pub fn allocate<G: Rng + ?Sized>(&self, available: &[u32], rng: &mut G) -> MosaicResult<u32> {
        available
            .choose(rng)
            .copied()
            .ok_or(MosaicError::CapacityExhausted {
                total_slots: self.total_slots,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::PositionAllocator;
    use crate::service::error::MosaicError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn available_excludes_occupied_and_out_of_range() {
        let allocator = PositionAllocator::new(6);
        let occupied = HashSet::from([0, 3, 42]);
        assert_eq!(allocator.available_positions(&occupied), vec![1, 2, 4, 5]);
    }

    #[test]
    fn allocate_fails_when_nothing_is_free() {
        let allocator = PositionAllocator::new(1);
        let available = allocator.available_positions(&HashSet::from([0]));
        let mut rng = StdRng::seed_from_u64(7);

        let err = allocator.allocate(&available, &mut rng).unwrap_err();
        assert!(matches!(err, MosaicError::CapacityExhausted { total_slots: 1 }));
    }

    #[test]
    fn allocate_only_returns_available_positions() {
        let allocator = PositionAllocator::new(10);
        let available = vec![2, 5, 9];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let picked = allocator.allocate(&available, &mut rng).unwrap();
            assert!(available.contains(&picked));
        }
    }

    #[test]
    fn allocate_spreads_over_all_free_tiles() {
        let allocator = PositionAllocator::new(4);
        let available = allocator.available_positions(&HashSet::new());
        let mut rng = StdRng::seed_from_u64(2024);
        let mut hits: HashMap<u32, u32> = HashMap::new();
        for _ in 0..4000 {
            *hits.entry(allocator.allocate(&available, &mut rng).unwrap()).or_default() += 1;
        }

        assert_eq!(hits.len(), 4);
        for count in hits.values() {
            assert!((800..1200).contains(count), "skewed distribution: {hits:?}");
        }
    }
}
