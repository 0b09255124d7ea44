//! Task dependency cycle detection
//!
//! A depth-first walk from every node that keeps the current path. Reaching a
//! node that is still on the path closes a cycle.

use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};

/// Find one dependency cycle, returned as a path whose first and last nodes
/// are the same. A self-loop is the path `[a, a]`.
pub fn find_cycle<N, E>(graph: &DiGraph<N, E>) -> Option<Vec<NodeIndex>> {
    let mut finished = HashSet::new();
    let mut path = Vec::new();
    graph
        .node_indices()
        .find_map(|node| visit(graph, node, &mut path, &mut finished))
}

fn visit<N, E>(
    graph: &DiGraph<N, E>,
    node: NodeIndex,
    path: &mut Vec<NodeIndex>,
    finished: &mut HashSet<NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    if let Some(start) = path.iter().position(|&on_path| on_path == node) {
        let mut cycle = path[start..].to_vec();
        cycle.push(node);
        return Some(cycle);
    }
    if finished.contains(&node) {
        return None;
    }

    path.push(node);
    for next in graph.neighbors(node) {
        if let Some(cycle) = visit(graph, next, path, finished) {
            return Some(cycle);
        }
    }
    path.pop();
    finished.insert(node);
    None
}
