mod block_queue;
mod find_pivots;

use std::cmp::Ordering;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::EPS;
use crate::graph::DirectedGraph;

use block_queue::BlockQueue;
use find_pivots::find_pivots;

pub(crate) const NO_PRED: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Label {
    pub(crate) dist: f64,
    pub(crate) path_len: u32,
    pub(crate) pred: u32,
}

impl Label {
    fn unreached() -> Self {
        Self {
            dist: f64::INFINITY,
            path_len: 0,
            pred: NO_PRED,
        }
    }
}

// Every tie in the solver is broken through this (dist, path_len, vertex)
// lexicographic key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DistKey {
    dist: f64,
    path_len: u32,
    vertex: u32,
}

impl DistKey {
    fn new(dist: f64, path_len: u32, vertex: u32) -> Self {
        Self {
            dist,
            path_len,
            vertex,
        }
    }
}

impl Eq for DistKey {}

impl Ord for DistKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (OrderedFloat(self.dist), self.path_len, self.vertex).cmp(&(
            OrderedFloat(other.dist),
            other.path_len,
            other.vertex,
        ))
    }
}

impl PartialOrd for DistKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct Solver<'a> {
    graph: &'a DirectedGraph,
    source: usize,
    labels: Vec<Label>,
    mark_w: Vec<u32>,
    mark_queued: Vec<u32>,
    w_pos: Vec<usize>,
    settled_bits: Vec<u64>,
    epoch: u32,
    k: usize,
    t: usize,
    level_max: usize,
    block_hint: usize,
}

impl<'a> Solver<'a> {
    pub fn new(graph: &'a DirectedGraph, source: usize) -> Self {
        let n = graph.vertex_count();
        assert!(source < n, "source vertex out of range");

        let raw_ln = (n.max(2) as f64).ln();
        let ln_n = raw_ln.max(2.0);
        let k = (ln_n.powf(1.0 / 3.0).floor() as usize).max(2);
        let t = (ln_n.powf(2.0 / 3.0).floor() as usize).max(1);
        let level_max = (raw_ln / t as f64).ceil() as usize;
        let block_hint = (raw_ln.powf(2.0 / 3.0).floor() as usize).max(32);

        let mut labels = vec![Label::unreached(); n];
        labels[source] = Label {
            dist: 0.0,
            path_len: 1,
            pred: NO_PRED,
        };

        Self {
            graph,
            source,
            labels,
            mark_w: vec![0; n],
            mark_queued: vec![0; n],
            w_pos: vec![0; n],
            settled_bits: vec![0; n],
            epoch: 0,
            k,
            t,
            level_max,
            block_hint,
        }
    }

    pub fn solve(&mut self) -> Vec<f64> {
        self.labels[self.source] = Label {
            dist: 0.0,
            path_len: 1,
            pred: NO_PRED,
        };
        let seeds = [self.source as u32];
        let _ = self.bmssp(self.level_max, f64::INFINITY, &seeds, 0);
        self.distances()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.labels.iter().map(|label| label.dist).collect()
    }

    pub fn predecessor(&self, vertex: usize) -> Option<usize> {
        match self.labels[vertex].pred {
            NO_PRED => None,
            pred => Some(pred as usize),
        }
    }

    #[inline]
    pub(crate) fn next_epoch(&mut self) -> u32 {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            self.mark_w.fill(0);
            self.mark_queued.fill(0);
            self.epoch = 1;
        }
        self.epoch
    }

    #[inline]
    fn dist_key(&self, vertex: usize) -> DistKey {
        let label = self.labels[vertex];
        DistKey::new(label.dist, label.path_len, vertex as u32)
    }

    fn relax(&mut self, u: usize, v: usize, weight: f64) -> bool {
        let from = self.labels[u];
        let cand = from.dist + weight;
        let to = self.labels[v];
        if cand + EPS < to.dist {
            self.labels[v] = Label {
                dist: cand,
                path_len: from.path_len + 1,
                pred: u as u32,
            };
            return true;
        }
        if (cand - to.dist).abs() <= EPS {
            // Equal distance: adopt the lexicographically smaller predecessor.
            let adopt = to.pred == NO_PRED || self.dist_key(u) < self.dist_key(to.pred as usize);
            if adopt {
                self.labels[v] = Label {
                    dist: to.dist,
                    path_len: from.path_len + 1,
                    pred: u as u32,
                };
                return true;
            }
        }
        false
    }

    // Bounded exploration from `start` once the recursion bottoms out. The
    // queue holds label snapshots; stale pops are skipped and improved
    // vertices re-pushed, so pop order follows current labels.
    fn base_case(&mut self, bound: f64, start: usize) -> (f64, Vec<u32>) {
        let queued_epoch = self.next_epoch();
        let done_epoch = self.next_epoch();
        let mut heap: BinaryHeap<Reverse<DistKey>> = BinaryHeap::new();
        let mut explored: Vec<u32> = Vec::with_capacity(self.k + 2);

        self.mark_queued[start] = queued_epoch;
        explored.push(start as u32);
        heap.push(Reverse(self.dist_key(start)));

        while explored.len() < self.k + 1 {
            let Some(Reverse(key)) = heap.pop() else {
                break;
            };
            let u = key.vertex as usize;
            if key != self.dist_key(u) {
                continue;
            }
            if self.mark_w[u] == done_epoch {
                continue;
            }
            self.mark_w[u] = done_epoch;

            let edges = self.graph.out_edges(u);
            for edge in edges {
                let v = edge.to as usize;
                let cand = self.labels[u].dist + edge.weight;
                if cand <= self.labels[v].dist + EPS && cand < bound - EPS {
                    let changed = self.relax(u, v, edge.weight);
                    if self.mark_queued[v] != queued_epoch {
                        self.mark_queued[v] = queued_epoch;
                        explored.push(v as u32);
                        heap.push(Reverse(self.dist_key(v)));
                    } else if changed && self.mark_w[v] != done_epoch {
                        heap.push(Reverse(self.dist_key(v)));
                    }
                }
            }
        }

        if explored.len() <= self.k {
            return (bound, explored);
        }

        let cut = explored
            .iter()
            .map(|&v| self.labels[v as usize].dist)
            .fold(f64::NEG_INFINITY, f64::max);
        let kept = explored
            .iter()
            .copied()
            .filter(|&v| self.labels[v as usize].dist < cut - EPS)
            .collect();
        (cut, kept)
    }

    fn bmssp(&mut self, level: usize, bound: f64, seeds: &[u32], depth: usize) -> (f64, Vec<u32>) {
        if seeds.is_empty() {
            return (bound, Vec::new());
        }
        if level == 0 {
            let start = seeds
                .iter()
                .copied()
                .min_by_key(|&v| self.dist_key(v as usize))
                .expect("non-empty seed set");
            return self.base_case(bound, start as usize);
        }
        debug_assert!(depth < 64, "recursion deeper than the settled-mask width");

        let (pivots, reached) = find_pivots(self, bound, seeds);

        let mut queue = BlockQueue::new(self.block_hint, bound);
        for &p in &pivots {
            queue.insert(p, self.labels[p as usize].dist);
        }

        let pull_limit = (2 * (level - 1) * self.t).max(1);
        let settle_cap = self.k * self.k * level.max(2);
        let overflow_cap = self.k * self.k * level * self.t;

        let settled_bit = 1_u64 << depth;
        let mut settled: Vec<u32> = Vec::new();
        let mut batch: Vec<u32> = Vec::with_capacity(pull_limit);
        let mut carry: Vec<(u32, f64)> = Vec::new();

        while settled.len() < settle_cap && !queue.is_empty() {
            let boundary = queue.pull(pull_limit, &mut batch);
            if batch.is_empty() {
                break;
            }

            let (inner_bound, mut completed) = self.bmssp(level - 1, boundary, &batch, depth + 1);

            // A batch that settles nothing (all-equal values under the cut,
            // as in zero-weight cycles) would be requeued unchanged and
            // pulled forever. Settle it directly instead.
            if completed.is_empty() {
                completed.extend_from_slice(&batch);
            }

            for &u in &completed {
                let u = u as usize;
                if self.settled_bits[u] & settled_bit == 0 {
                    self.settled_bits[u] |= settled_bit;
                    settled.push(u as u32);
                }
            }

            carry.clear();
            for &u in &completed {
                let u = u as usize;
                let edges = self.graph.out_edges(u);
                for edge in edges {
                    let v = edge.to as usize;
                    let cand = self.labels[u].dist + edge.weight;
                    if cand > self.labels[v].dist + EPS {
                        continue;
                    }
                    self.relax(u, v, edge.weight);
                    // Vertices already settled at this level stay out of the
                    // queue; requeueing them cycles on zero-weight cliques.
                    if self.settled_bits[v] & settled_bit != 0 {
                        continue;
                    }
                    if boundary - EPS <= cand && cand < bound - EPS {
                        queue.insert(v as u32, cand);
                    } else if inner_bound - EPS <= cand && cand < boundary - EPS {
                        carry.push((v as u32, cand));
                    }
                }
            }
            for &x in &batch {
                if self.settled_bits[x as usize] & settled_bit != 0 {
                    continue;
                }
                let dist = self.labels[x as usize].dist;
                if inner_bound - EPS <= dist && dist < boundary - EPS {
                    carry.push((x, dist));
                }
            }
            queue.batch_prepend(&carry);

            if settled.len() >= overflow_cap {
                let ret_bound = inner_bound.min(bound);
                for &w in &reached {
                    let w_us = w as usize;
                    if self.labels[w_us].dist < ret_bound - EPS
                        && self.settled_bits[w_us] & settled_bit == 0
                    {
                        self.settled_bits[w_us] |= settled_bit;
                        settled.push(w);
                    }
                }
                self.clear_settled(settled_bit, &settled);
                return (ret_bound, settled);
            }
        }

        for &w in &reached {
            let w_us = w as usize;
            if self.labels[w_us].dist < bound - EPS && self.settled_bits[w_us] & settled_bit == 0 {
                self.settled_bits[w_us] |= settled_bit;
                settled.push(w);
            }
        }
        self.clear_settled(settled_bit, &settled);
        (bound, settled)
    }

    fn clear_settled(&mut self, bit: u64, settled: &[u32]) {
        for &u in settled {
            self.settled_bits[u as usize] &= !bit;
        }
    }
}

pub fn bmssp(graph: &DirectedGraph, source: usize) -> Vec<f64> {
    if graph.vertex_count() == 0 {
        return Vec::new();
    }
    let mut solver = Solver::new(graph, source);
    solver.solve()
}
