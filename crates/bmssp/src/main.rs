use std::fmt::Write as _;
use std::io::Read;
use std::process::ExitCode;
use std::str::FromStr;

use bmssp::DirectedGraph;
use bmssp::Solver;

// Reads "n m", m lines of "u v w", and a source vertex from stdin; prints
// one distance per line, INF for unreachable vertices.
fn main() -> ExitCode {
    let mut input = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("error: failed to read stdin: {err}");
        return ExitCode::FAILURE;
    }

    match run(&input) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(input: &str) -> Result<String, String> {
    let mut tokens = input.split_ascii_whitespace();
    let n: usize = next_token(&mut tokens, "vertex count")?;
    let m: usize = next_token(&mut tokens, "edge count")?;

    let mut graph = DirectedGraph::new(n);
    for i in 0..m {
        let u: usize = next_token(&mut tokens, "edge tail")?;
        let v: usize = next_token(&mut tokens, "edge head")?;
        let w: f64 = next_token(&mut tokens, "edge weight")?;
        if u >= n || v >= n {
            return Err(format!("edge {i} references a vertex outside 0..{n}"));
        }
        if !w.is_finite() || w < 0.0 {
            return Err(format!("edge {i} has invalid weight {w}"));
        }
        graph.add_edge(u, v, w);
    }

    let source: usize = next_token(&mut tokens, "source vertex")?;
    if source >= n {
        return Err(format!("source vertex {source} outside 0..{n}"));
    }

    let mut solver = Solver::new(&graph, source);
    let dist = solver.solve();

    let mut report = String::with_capacity(dist.len() * 8);
    for d in dist {
        if d.is_infinite() {
            report.push_str("INF\n");
        } else {
            let _ = writeln!(report, "{d}");
        }
    }
    Ok(report)
}

fn next_token<'a, T, I>(tokens: &mut I, what: &str) -> Result<T, String>
where
    T: FromStr,
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or_else(|| format!("missing {what}"))?;
    token
        .parse()
        .map_err(|_| format!("invalid {what}: {token:?}"))
}
