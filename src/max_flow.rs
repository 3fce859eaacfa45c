use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    error::{EliminationError, Result},
    network::{Capacity, EliminationNetwork},
    time_limit::TimeLimit,
};

/// Directed graph with capacities. Antiparallel edges are not supported: the
/// reverse residual of an edge is read back as its flow.
pub trait FlowGraph {
    fn get_node_count(&self) -> usize;
    // Target + edge capacity
    fn get_node_adj_list(&self, node: usize) -> impl Iterator<Item = (usize, Capacity)>;
}

impl FlowGraph for EliminationNetwork {
    fn get_node_count(&self) -> usize {
        self.node_count()
    }

    fn get_node_adj_list(&self, node: usize) -> impl Iterator<Item = (usize, Capacity)> {
        self.outgoing_edges(node).iter().map(|&e| {
            let edge = self.edges()[e];
            (edge.to, edge.capacity)
        })
    }
}

impl FlowGraph for [Vec<(usize, Capacity)>] {
    fn get_node_count(&self) -> usize {
        self.len()
    }

    fn get_node_adj_list(&self, node: usize) -> impl Iterator<Item = (usize, Capacity)> {
        self[node].iter().copied()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MaxFlowLimits {
    pub max_iterations: Option<usize>,
    pub time_limit: Option<std::time::Duration>,
}

#[derive(Clone, Debug)]
pub struct MaxFlowResult {
    pub total_flow: u64,
    pub iterations: usize,
    residual: Vec<FxHashMap<usize, Capacity>>,
    /// Nodes still reachable from the source in the final residual graph.
    pub source_side: FxHashSet<usize>,
}

impl MaxFlowResult {
    /// Flow pushed along the original edge `from -> to`.
    pub fn flow_on(&self, from: usize, to: usize) -> u64 {
        match self.residual[to].get(&from) {
            Some(Capacity::Finite(flow)) => *flow,
            _ => 0,
        }
    }
}

fn dfs_visit(
    node: usize,
    visited: &mut Vec<bool>,
    adj_list: &[FxHashMap<usize, Capacity>],
    sink: usize,
) -> Option<Vec<usize>> {
    if node == sink {
        return Some(vec![node]);
    }

    if visited[node] {
        return None;
    }

    visited[node] = true;

    for (&head, &capacity) in adj_list[node].iter() {
        if capacity.is_positive() && !visited[head] {
            if let Some(mut path) = dfs_visit(head, visited, adj_list, sink) {
                path.push(node);
                return Some(path);
            }
        }
    }

    None
}

/// Ford-Fulkerson with depth-first augmenting paths. Every augmenting path must
/// cross a finite edge, otherwise the flow is unbounded and the computation
/// fails.
pub fn compute_max_flow(
    flow_graph: &(impl FlowGraph + ?Sized),
    source: usize,
    sink: usize,
    limits: MaxFlowLimits,
) -> Result<MaxFlowResult> {
    let nodes_count = flow_graph.get_node_count();
    let time_limit = TimeLimit::new(limits.time_limit);

    let mut adj_list = vec![FxHashMap::default(); nodes_count];

    for node in 0..nodes_count {
        for (target, capacity) in flow_graph.get_node_adj_list(node) {
            let merged = match adj_list[node].get(&target) {
                Some(Capacity::Finite(existing)) => capacity.saturating_add(*existing),
                Some(Capacity::Unbounded) => Capacity::Unbounded,
                None => capacity,
            };
            adj_list[node].insert(target, merged);
            adj_list[target].entry(node).or_insert(Capacity::Finite(0));
        }
    }

    let mut tot_flow: u64 = 0;
    let mut iterations = 0;

    loop {
        let Some(path) = dfs_visit(source, &mut vec![false; nodes_count], &adj_list, sink) else {
            break;
        };

        iterations += 1;
        if let Some(max_iterations) = limits.max_iterations {
            if iterations > max_iterations {
                return Err(EliminationError::FlowComputation(format!(
                    "no convergence within {} augmenting iterations",
                    max_iterations
                )));
            }
        }
        if !time_limit.can_progress() {
            return Err(EliminationError::FlowComputation(format!(
                "time limit exceeded after {:.2?} and {} iterations",
                time_limit.elapsed(),
                iterations
            )));
        }

        // Path is reversed

        let mut bottleneck = Capacity::Unbounded;
        for edge in path.windows(2) {
            let (node, next) = (edge[1], edge[0]);
            bottleneck = bottleneck.min(adj_list[node][&next]);
        }
        let Capacity::Finite(path_flow) = bottleneck else {
            return Err(EliminationError::FlowComputation(
                "augmenting path made only of unbounded edges".to_string(),
            ));
        };

        tot_flow = tot_flow.checked_add(path_flow).ok_or_else(|| {
            EliminationError::FlowComputation("total flow overflows u64".to_string())
        })?;

        for edge in path.windows(2) {
            let (node, next) = (edge[1], edge[0]);
            if let Some(capacity) = adj_list[node].get_mut(&next) {
                *capacity = capacity.saturating_sub(path_flow);
            }
            if let Some(rev_capacity) = adj_list[next].get_mut(&node) {
                *rev_capacity = rev_capacity.saturating_add(path_flow);
            }
        }
    }

    let mut source_side = FxHashSet::default();
    let mut visited = vec![false; nodes_count];
    let mut stack = vec![source];
    while let Some(node) = stack.pop() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        source_side.insert(node);
        for (&head, capacity) in adj_list[node].iter() {
            if capacity.is_positive() {
                stack.push(head);
            }
        }
    }

    log::debug!(
        "Max flow {} -> {}: {} after {} augmenting paths",
        source,
        sink,
        tot_flow,
        iterations
    );

    Ok(MaxFlowResult {
        total_flow: tot_flow,
        iterations,
        residual: adj_list,
        source_side,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use Capacity::*;

    fn unlimited() -> MaxFlowLimits {
        MaxFlowLimits::default()
    }

    #[test]
    fn classic_two_path_graph() {
        // 0 -> 1 -> 3, 0 -> 2 -> 3, 1 -> 2
        let graph: Vec<Vec<(usize, Capacity)>> = vec![
            vec![(1, Finite(3)), (2, Finite(2))],
            vec![(2, Finite(5)), (3, Finite(2))],
            vec![(3, Finite(3))],
            vec![],
        ];
        let result = compute_max_flow(graph.as_slice(), 0, 3, unlimited()).unwrap();
        assert_eq!(result.total_flow, 5);
        assert_eq!(result.flow_on(0, 1) + result.flow_on(0, 2), 5);
        assert_eq!(result.source_side, [0].into_iter().collect::<FxHashSet<_>>());
    }

    #[test]
    fn unbounded_middle_edges_are_limited_by_finite_ones() {
        let graph: Vec<Vec<(usize, Capacity)>> = vec![
            vec![(1, Finite(4))],
            vec![(2, Unbounded)],
            vec![(3, Finite(3))],
            vec![],
        ];
        let result = compute_max_flow(graph.as_slice(), 0, 3, unlimited()).unwrap();
        assert_eq!(result.total_flow, 3);
        assert_eq!(result.flow_on(1, 2), 3);
        // The cut is on the sink edge
        assert!(result.source_side.contains(&2));
        assert!(!result.source_side.contains(&3));
    }

    #[test]
    fn disconnected_sink_gives_zero_flow() {
        let graph: Vec<Vec<(usize, Capacity)>> = vec![vec![(1, Finite(4))], vec![], vec![]];
        let result = compute_max_flow(graph.as_slice(), 0, 2, unlimited()).unwrap();
        assert_eq!(result.total_flow, 0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn all_unbounded_path_fails() {
        let graph: Vec<Vec<(usize, Capacity)>> = vec![vec![(1, Unbounded)], vec![]];
        assert!(matches!(
            compute_max_flow(graph.as_slice(), 0, 1, unlimited()),
            Err(EliminationError::FlowComputation(_))
        ));
    }

    #[test]
    fn iteration_budget_is_enforced() {
        let graph: Vec<Vec<(usize, Capacity)>> = vec![
            vec![(1, Finite(1)), (2, Finite(1))],
            vec![(3, Finite(1))],
            vec![(3, Finite(1))],
            vec![],
        ];
        let limits = MaxFlowLimits {
            max_iterations: Some(1),
            time_limit: None,
        };
        assert!(matches!(
            compute_max_flow(graph.as_slice(), 0, 3, limits),
            Err(EliminationError::FlowComputation(_))
        ));
    }

    #[test]
    fn expired_time_limit_is_reported() {
        let graph: Vec<Vec<(usize, Capacity)>> = vec![vec![(1, Finite(1))], vec![]];
        let limits = MaxFlowLimits {
            max_iterations: None,
            time_limit: Some(std::time::Duration::ZERO),
        };
        assert!(matches!(
            compute_max_flow(graph.as_slice(), 0, 1, limits),
            Err(EliminationError::FlowComputation(_))
        ));
    }
}
