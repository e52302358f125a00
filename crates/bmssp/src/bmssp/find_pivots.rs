use super::Solver;
use crate::EPS;

pub(super) fn find_pivots(
    solver: &mut Solver<'_>,
    bound: f64,
    seeds: &[u32],
) -> (Vec<u32>, Vec<u32>) {
    if seeds.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let w_epoch = solver.next_epoch();
    let mut reached: Vec<u32> = Vec::with_capacity(seeds.len().saturating_mul(2));
    for &x in seeds {
        let x = x as usize;
        if solver.mark_w[x] != w_epoch {
            solver.mark_w[x] = w_epoch;
            solver.w_pos[x] = reached.len();
            reached.push(x as u32);
        }
    }

    let mut frontier = reached.clone();
    let mut next_frontier: Vec<u32> = Vec::new();
    let blowup_limit = solver.k.saturating_mul(seeds.len());

    for _ in 0..solver.k {
        next_frontier.clear();
        for &u in &frontier {
            let u = u as usize;
            let edges = solver.graph.out_edges(u);
            for edge in edges {
                let v = edge.to as usize;
                let cand = solver.labels[u].dist + edge.weight;
                if cand > solver.labels[v].dist + EPS {
                    continue;
                }
                if cand + EPS < solver.labels[v].dist {
                    solver.labels[v] = super::Label {
                        dist: cand,
                        path_len: solver.labels[u].path_len + 1,
                        pred: u as u32,
                    };
                }
                if cand < bound - EPS && solver.mark_w[v] != w_epoch {
                    solver.mark_w[v] = w_epoch;
                    solver.w_pos[v] = reached.len();
                    reached.push(v as u32);
                    next_frontier.push(v as u32);
                }
            }
        }

        // Superlinear growth: settle for the whole seed set as pivots.
        if reached.len() > blowup_limit {
            return (seeds.to_vec(), reached);
        }

        if next_frontier.is_empty() {
            break;
        }
        std::mem::swap(&mut frontier, &mut next_frontier);
    }

    // Tight-edge forest on the reached set, in reached-local indices.
    let mut tight: Vec<Vec<u32>> = vec![Vec::new(); reached.len()];
    for (ui, &u) in reached.iter().enumerate() {
        let u = u as usize;
        let from_dist = solver.labels[u].dist;
        for edge in solver.graph.out_edges(u) {
            let v = edge.to as usize;
            if solver.mark_w[v] == w_epoch
                && (solver.labels[v].dist - (from_dist + edge.weight)).abs() <= EPS
            {
                tight[ui].push(solver.w_pos[v] as u32);
            }
        }
    }

    // Subtree sizes per seed root, with explicit stacks: the forest can
    // degenerate into long paths.
    let mut visited = vec![false; reached.len()];
    let mut sizes = vec![0_usize; reached.len()];
    let mut stack: Vec<u32> = Vec::new();
    let mut order: Vec<u32> = Vec::new();
    for &s in seeds {
        let root = solver.w_pos[s as usize];
        if visited[root] {
            continue;
        }
        stack.push(root as u32);
        while let Some(i) = stack.pop() {
            let i = i as usize;
            if visited[i] {
                continue;
            }
            visited[i] = true;
            order.push(i as u32);
            for &child in &tight[i] {
                if !visited[child as usize] {
                    stack.push(child);
                }
            }
        }
        while let Some(i) = order.pop() {
            let i = i as usize;
            let mut size = 1_usize;
            for &child in &tight[i] {
                size += sizes[child as usize];
            }
            sizes[i] = size;
        }
    }

    let mut pivots = Vec::new();
    for &s in seeds {
        if sizes[solver.w_pos[s as usize]] >= solver.k {
            pivots.push(s);
        }
    }

    (pivots, reached)
}
