use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::HashMap;
use std::collections::VecDeque;

use ordered_float::OrderedFloat;

use crate::EPS;

// Wider than EPS so rounding accumulated across rebuilds does not orphan
// otherwise-live records at pull time.
const STALE_EPS: f64 = 1e-9;

#[derive(Clone, Copy, Debug)]
struct Record {
    key: u32,
    value: f64,
}

impl Record {
    #[inline]
    fn order_key(&self) -> (OrderedFloat<f64>, u32) {
        (OrderedFloat(self.value), self.key)
    }
}

/// Buffered priority structure for band-partitioned frontier processing.
///
/// `current` holds the authoritative best value per key; improvements append
/// to the `d1` buffer, and `d0` is rebuilt from `current` as sorted blocks
/// when the buffer fills and after every non-empty pull. Records that no
/// longer match `current` are stale and skipped lazily when pulling.
#[derive(Debug)]
pub(super) struct BlockQueue {
    current: HashMap<u32, f64>,
    d0: VecDeque<Vec<Record>>,
    d1: Vec<Record>,
    block_size: usize,
    merge_threshold: usize,
    bound: f64,
}

impl BlockQueue {
    pub fn new(block_size_hint: usize, bound: f64) -> Self {
        let block_size = block_size_hint.max(16);
        Self {
            current: HashMap::new(),
            d0: VecDeque::new(),
            d1: Vec::new(),
            block_size,
            merge_threshold: block_size.max(8),
            bound,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn insert(&mut self, key: u32, value: f64) {
        if self.buffer_improvement(key, value) && self.d1.len() >= self.merge_threshold {
            self.merge_rebuild();
        }
    }

    // Batch insert with a single deferred merge check; ordering is re-derived
    // from the values, not the call.
    pub fn batch_prepend(&mut self, records: &[(u32, f64)]) {
        for &(key, value) in records {
            self.buffer_improvement(key, value);
        }
        if self.d1.len() >= self.merge_threshold {
            self.merge_rebuild();
        }
    }

    fn buffer_improvement(&mut self, key: u32, value: f64) -> bool {
        let improved = match self.current.get(&key) {
            Some(&best) => value + EPS < best,
            None => true,
        };
        if improved {
            self.current.insert(key, value);
            self.d1.push(Record { key, value });
        }
        improved
    }

    // Takes up to `limit` keys in (value, key) order from the block heads and
    // the live buffer records, and returns the smallest remaining value
    // (`bound` once nothing remains).
    pub fn pull(&mut self, limit: usize, taken: &mut Vec<u32>) -> f64 {
        taken.clear();
        if self.current.is_empty() {
            return self.bound;
        }
        if self.d0.is_empty() && !self.d1.is_empty() {
            self.merge_rebuild();
        }

        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, u32)>> = BinaryHeap::new();
        for block in &self.d0 {
            if let Some(head) = block.first() {
                if self.current.contains_key(&head.key) {
                    heap.push(Reverse(head.order_key()));
                }
            }
        }
        for record in &self.d1 {
            if self.current.contains_key(&record.key) {
                heap.push(Reverse(record.order_key()));
            }
        }

        while taken.len() < limit {
            let Some(Reverse((OrderedFloat(value), key))) = heap.pop() else {
                break;
            };
            match self.current.get(&key) {
                Some(&best) if (best - value).abs() <= STALE_EPS => {
                    taken.push(key);
                    self.current.remove(&key);
                }
                _ => {}
            }
        }

        if !taken.is_empty() {
            self.merge_rebuild();
        }
        self.remaining_min()
    }

    fn remaining_min(&self) -> f64 {
        let mut min = self.bound;
        for &value in self.current.values() {
            if value < min {
                min = value;
            }
        }
        min
    }

    // Rebuild d0 from current and drop the buffer: afterwards the block
    // concatenation is exactly current sorted by (value, key).
    fn merge_rebuild(&mut self) {
        let mut all: Vec<Record> = self
            .current
            .iter()
            .map(|(&key, &value)| Record { key, value })
            .collect();
        all.sort_unstable_by_key(Record::order_key);

        self.d0.clear();
        for chunk in all.chunks(self.block_size) {
            self.d0.push_back(chunk.to_vec());
        }
        self.d1.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ordered_float::OrderedFloat;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::BlockQueue;

    #[test]
    fn insert_keeps_best_value_per_key() {
        let mut queue = BlockQueue::new(16, f64::INFINITY);
        queue.insert(3, 10.0);
        queue.insert(3, 9.0);
        queue.insert(3, 11.0); // ignored

        let mut taken = Vec::new();
        let boundary = queue.pull(4, &mut taken);
        assert_eq!(taken, vec![3]);
        assert_eq!(boundary, f64::INFINITY);
        assert!(queue.is_empty());
    }

    #[test]
    fn redundant_insert_leaves_buffer_untouched() {
        let mut queue = BlockQueue::new(16, f64::INFINITY);
        queue.insert(7, 5.0);
        assert_eq!(queue.d1.len(), 1);
        queue.insert(7, 5.0);
        queue.insert(7, 6.5);
        assert_eq!(queue.d1.len(), 1);
        queue.insert(7, 4.0);
        assert_eq!(queue.d1.len(), 2);
    }

    #[test]
    fn pull_reports_smallest_remaining_value() {
        let mut queue = BlockQueue::new(16, 100.0);
        queue.insert(10, 10.0);
        queue.insert(11, 11.0);
        queue.insert(12, 12.0);

        let mut taken = Vec::new();
        let boundary = queue.pull(1, &mut taken);
        assert_eq!(taken, vec![10]);
        assert_eq!(boundary, 11.0);

        let boundary = queue.pull(1, &mut taken);
        assert_eq!(taken, vec![11]);
        assert_eq!(boundary, 12.0);

        let boundary = queue.pull(1, &mut taken);
        assert_eq!(taken, vec![12]);
        assert_eq!(boundary, 100.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn pull_breaks_value_ties_by_key() {
        let mut queue = BlockQueue::new(16, f64::INFINITY);
        queue.insert(9, 2.0);
        queue.insert(4, 2.0);
        queue.insert(6, 2.0);

        let mut taken = Vec::new();
        queue.pull(1, &mut taken);
        assert_eq!(taken, vec![4]);
    }

    #[test]
    fn batch_prepend_takes_precedence_on_pull() {
        let mut queue = BlockQueue::new(16, f64::INFINITY);
        queue.insert(10, 100.0);
        queue.insert(11, 120.0);

        queue.batch_prepend(&[(1, 1.0), (2, 2.0), (3, 3.0)]);

        let mut taken = Vec::new();
        let boundary = queue.pull(1, &mut taken);
        assert_eq!(taken, vec![1]);
        assert_eq!(boundary, 2.0);
    }

    #[test]
    fn merge_rebuild_sorts_current_into_blocks() {
        let mut queue = BlockQueue::new(16, f64::INFINITY);
        for key in 0..40_u32 {
            queue.insert(key, f64::from(100 + (key % 7) * 13 + key));
        }
        // A non-empty pull always ends in a rebuild.
        let mut taken = Vec::new();
        queue.pull(1, &mut taken);
        assert_eq!(taken.len(), 1);
        assert!(queue.d1.is_empty());
        assert!(queue.d0.len() > 1);

        let mut flat: Vec<(OrderedFloat<f64>, u32)> = Vec::new();
        for block in &queue.d0 {
            assert!(!block.is_empty());
            assert!(block.len() <= queue.block_size);
            for record in block {
                flat.push(record.order_key());
            }
        }
        assert_eq!(flat.len(), queue.current.len());
        assert!(flat.is_sorted());
    }

    // The structure only promises to surface block heads and buffered
    // records per pull, so the model checks the first key pulled (always
    // the global minimum), key validity, and the reported boundary.
    #[test]
    fn randomized_agrees_with_reference_model() {
        let bound = f64::INFINITY;
        let mut queue = BlockQueue::new(16, bound);
        let mut model: BTreeMap<u32, f64> = BTreeMap::new();
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);

        for _ in 0..5_000 {
            match rng.random_range(0..3) {
                0 => {
                    let key = rng.random_range(0..256_u32);
                    let value = f64::from(rng.random_range(0..5_000_u32));
                    queue.insert(key, value);
                    model
                        .entry(key)
                        .and_modify(|cur| *cur = cur.min(value))
                        .or_insert(value);
                }
                1 => {
                    let len = rng.random_range(0..=16_usize);
                    let mut batch = Vec::with_capacity(len);
                    for _ in 0..len {
                        let key = rng.random_range(0..256_u32);
                        let value = f64::from(rng.random_range(0..5_000_u32));
                        batch.push((key, value));
                    }
                    queue.batch_prepend(&batch);
                    for (key, value) in batch {
                        model
                            .entry(key)
                            .and_modify(|cur| *cur = cur.min(value))
                            .or_insert(value);
                    }
                }
                _ => {
                    let limit = rng.random_range(1..=8_usize);
                    let mut taken = Vec::new();
                    let boundary = queue.pull(limit, &mut taken);
                    if model.is_empty() {
                        assert!(taken.is_empty());
                        assert_eq!(boundary, bound);
                        continue;
                    }

                    assert!(!taken.is_empty());
                    assert!(taken.len() <= limit);
                    let expected_first = model
                        .iter()
                        .map(|(&key, &value)| (OrderedFloat(value), key))
                        .min()
                        .map(|(_, key)| key)
                        .unwrap();
                    assert_eq!(taken[0], expected_first);

                    for &key in &taken {
                        assert!(model.remove(&key).is_some(), "pulled unknown key {key}");
                    }
                    let expected_boundary = model
                        .values()
                        .copied()
                        .fold(bound, f64::min);
                    assert_eq!(boundary, expected_boundary);
                    assert_eq!(queue.is_empty(), model.is_empty());
                    assert!(queue.d1.is_empty(), "pull must leave the buffer merged");
                }
            }
        }
    }
}
