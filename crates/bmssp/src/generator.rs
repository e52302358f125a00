use std::collections::HashSet;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::graph::DirectedGraph;

const MAX_WEIGHT: u64 = 1_000_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GraphCase {
    SparseRandom,
    DenseRandom,
    AlmostLine,
    GridRandom,
    ZeroHeavy,
}

impl GraphCase {
    pub fn label(self) -> &'static str {
        match self {
            Self::SparseRandom => "sparse_random",
            Self::DenseRandom => "dense_random",
            Self::AlmostLine => "almost_line",
            Self::GridRandom => "grid_random",
            Self::ZeroHeavy => "zero_heavy",
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratedGraph {
    pub graph: DirectedGraph,
    pub source: usize,
}

pub fn generate_case(case: GraphCase, size: usize, seed: u64) -> GeneratedGraph {
    match case {
        GraphCase::SparseRandom => sparse_random_case(size.max(4), seed, 3),
        GraphCase::DenseRandom => dense_random_case(size.max(4), seed),
        GraphCase::AlmostLine => almost_line_case(size.max(4), seed),
        GraphCase::GridRandom => grid_random_case(size.max(4), seed),
        GraphCase::ZeroHeavy => zero_heavy_case(size.max(4), seed),
    }
}

pub fn uniform_random(n: usize, m: usize, max_weight: u64, seed: u64) -> DirectedGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = n.max(2);
    let m = m.min(complete_edges(n));
    let mut edges = Vec::with_capacity(m);
    let mut used = HashSet::with_capacity(m * 2 + 1);

    while edges.len() < m {
        let u = rng.random_range(0..n);
        let v = rng.random_range(0..n);
        push_unique_edge(
            &mut edges,
            &mut used,
            u,
            v,
            rng.random_range(1..=max_weight.max(1)) as f64,
        );
    }

    DirectedGraph::from_edges(n, &edges)
}

fn sparse_random_case(size: usize, seed: u64, edge_factor: usize) -> GeneratedGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = size;
    let m_target = n.saturating_mul(edge_factor).min(complete_edges(n));
    let mut edges = Vec::with_capacity(m_target);
    let mut used = HashSet::with_capacity(m_target * 2 + 1);

    while edges.len() < m_target {
        let u = rng.random_range(0..n);
        let v = rng.random_range(0..n);
        push_unique_edge(
            &mut edges,
            &mut used,
            u,
            v,
            rng.random_range(0..=MAX_WEIGHT) as f64,
        );
    }

    let source = rng.random_range(0..n);
    GeneratedGraph {
        graph: DirectedGraph::from_edges(n, &edges),
        source,
    }
}

fn dense_random_case(size: usize, seed: u64) -> GeneratedGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = floor_sqrt(size).max(4);
    let mut edges = Vec::with_capacity(complete_edges(n));

    for u in 0..n {
        for v in 0..n {
            if u == v {
                continue;
            }
            edges.push((u as u32, v as u32, rng.random_range(0..=MAX_WEIGHT) as f64));
        }
    }

    let source = rng.random_range(0..n);
    GeneratedGraph {
        graph: DirectedGraph::from_edges(n, &edges),
        source,
    }
}

fn almost_line_case(size: usize, seed: u64) -> GeneratedGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = size;
    let m_target = n.saturating_mul(2).min(complete_edges(n));
    let mut edges = Vec::with_capacity(m_target);
    let mut used = HashSet::with_capacity(m_target * 4);

    for i in 0..(n - 1) {
        push_unique_edge(&mut edges, &mut used, i, i + 1, half_integer(&mut rng));
    }

    while edges.len() < m_target && n > 3 {
        let a = rng.random_range(0..(n - 2));
        let b = (a + rng.random_range(2..=3)).min(n - 1);
        let (u, v) = if rng.random_bool(0.5) { (b, a) } else { (a, b) };
        push_unique_edge(&mut edges, &mut used, u, v, half_integer(&mut rng));
    }

    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(&mut rng);
    for edge in &mut edges {
        edge.0 = perm[edge.0 as usize] as u32;
        edge.1 = perm[edge.1 as usize] as u32;
    }
    edges.shuffle(&mut rng);

    GeneratedGraph {
        graph: DirectedGraph::from_edges(n, &edges),
        source: perm[0],
    }
}

fn grid_random_case(size: usize, seed: u64) -> GeneratedGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let len = floor_sqrt(size).max(3);
    let n = len * len;
    let mut edges = Vec::with_capacity(n * 4);
    let index = |i: usize, j: usize| -> usize { i * len + j };

    for i in 0..len {
        for j in 0..len {
            if j + 1 < len {
                edges.push((
                    index(i, j) as u32,
                    index(i, j + 1) as u32,
                    rng.random_range(0..=MAX_WEIGHT) as f64,
                ));
            }
            if i + 1 < len {
                edges.push((
                    index(i, j) as u32,
                    index(i + 1, j) as u32,
                    rng.random_range(0..=MAX_WEIGHT) as f64,
                ));
            }
            if j > 0 {
                edges.push((
                    index(i, j) as u32,
                    index(i, j - 1) as u32,
                    rng.random_range(0..=MAX_WEIGHT) as f64,
                ));
            }
            if i > 0 {
                edges.push((
                    index(i, j) as u32,
                    index(i - 1, j) as u32,
                    rng.random_range(0..=MAX_WEIGHT) as f64,
                ));
            }
        }
    }

    edges.shuffle(&mut rng);
    let source = rng.random_range(0..n);
    GeneratedGraph {
        graph: DirectedGraph::from_edges(n, &edges),
        source,
    }
}

// Zero-weight cliques chained by positive edges.
fn zero_heavy_case(size: usize, seed: u64) -> GeneratedGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let cluster = 3_usize;
    let clusters = (size / cluster).max(2);
    let n = clusters * cluster;
    let mut edges = Vec::with_capacity(n * cluster);

    for c in 0..clusters {
        let base = c * cluster;
        for i in 0..cluster {
            for j in 0..cluster {
                if i != j {
                    edges.push(((base + i) as u32, (base + j) as u32, 0.0));
                }
            }
        }
        if c + 1 < clusters {
            let from = base + rng.random_range(0..cluster);
            let to = (c + 1) * cluster + rng.random_range(0..cluster);
            edges.push((from as u32, to as u32, rng.random_range(1..=MAX_WEIGHT) as f64));
        }
    }

    GeneratedGraph {
        graph: DirectedGraph::from_edges(n, &edges),
        source: 0,
    }
}

#[inline]
fn half_integer<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(0..=2 * MAX_WEIGHT) as f64 * 0.5
}

#[inline]
fn complete_edges(n: usize) -> usize {
    n.saturating_mul(n.saturating_sub(1))
}

#[inline]
fn floor_sqrt(value: usize) -> usize {
    (value as f64).sqrt().floor() as usize
}

#[inline]
fn push_unique_edge(
    edges: &mut Vec<(u32, u32, f64)>,
    used: &mut HashSet<u64>,
    u: usize,
    v: usize,
    weight: f64,
) -> bool {
    if u == v {
        return false;
    }
    let key = ((u as u64) << 32) | v as u64;
    if used.insert(key) {
        edges.push((u as u32, v as u32, weight));
        true
    } else {
        false
    }
}
