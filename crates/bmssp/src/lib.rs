mod bmssp;
mod dijkstra;
pub mod generator;
pub mod graph;

pub use bmssp::Solver;
pub use bmssp::bmssp;
pub use dijkstra::dijkstra_binary_heap;
pub use graph::DirectedGraph;
pub use graph::Edge;

// A strict improvement means `new + EPS < old`.
pub(crate) const EPS: f64 = 1e-12;
