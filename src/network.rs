use rustc_hash::FxHashMap;

use crate::{
    division::Division,
    error::{EliminationError, Result},
    team::TeamId,
};

pub const SOURCE: usize = 0;
pub const SINK: usize = 1;

/// Edge capacity. Game-to-team edges are `Unbounded`; all arithmetic on it
/// stays exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capacity {
    Finite(u64),
    Unbounded,
}

impl Capacity {
    pub fn is_positive(self) -> bool {
        match self {
            Capacity::Finite(value) => value > 0,
            Capacity::Unbounded => true,
        }
    }

    pub fn min(self, other: Capacity) -> Capacity {
        match (self, other) {
            (Capacity::Unbounded, other) | (other, Capacity::Unbounded) => other,
            (Capacity::Finite(a), Capacity::Finite(b)) => Capacity::Finite(a.min(b)),
        }
    }

    pub fn saturating_sub(self, amount: u64) -> Capacity {
        match self {
            Capacity::Finite(value) => Capacity::Finite(value.saturating_sub(amount)),
            Capacity::Unbounded => Capacity::Unbounded,
        }
    }

    pub fn saturating_add(self, amount: u64) -> Capacity {
        match self {
            Capacity::Finite(value) => Capacity::Finite(value.saturating_add(amount)),
            Capacity::Unbounded => Capacity::Unbounded,
        }
    }

    /// Upper bound handed to an LP solver.
    pub fn upper_bound(self) -> f64 {
        match self {
            Capacity::Finite(value) => value as f64,
            Capacity::Unbounded => f64::INFINITY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkNode {
    Source,
    Sink,
    /// Remaining games between two teams other than the target, lower id first.
    Game(TeamId, TeamId),
    Team(TeamId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: usize,
    pub to: usize,
    pub capacity: Capacity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceEdge {
    /// Index into `EliminationNetwork::edges`.
    pub edge: usize,
    pub pair: (TeamId, TeamId),
    pub capacity: u64,
}

/// Flow network answering "can every remaining game be played without any
/// other team passing the target's best possible win total". Built fresh for
/// each query and owned by it.
#[derive(Clone, Debug)]
pub struct EliminationNetwork {
    target: TeamId,
    nodes: Vec<NetworkNode>,
    edges: Vec<FlowEdge>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    team_nodes: FxHashMap<TeamId, usize>,
    source_edges: Vec<SourceEdge>,
}

impl EliminationNetwork {
    fn new(target: TeamId) -> Self {
        let mut network = Self {
            target,
            nodes: vec![],
            edges: vec![],
            outgoing: vec![],
            incoming: vec![],
            team_nodes: FxHashMap::default(),
            source_edges: vec![],
        };
        network.add_node(NetworkNode::Source);
        network.add_node(NetworkNode::Sink);
        network
    }

    fn add_node(&mut self, node: NetworkNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        self.outgoing.push(vec![]);
        self.incoming.push(vec![]);
        if let NetworkNode::Team(team) = node {
            self.team_nodes.insert(team, index);
        }
        index
    }

    fn add_edge(&mut self, from: usize, to: usize, capacity: Capacity) -> usize {
        let index = self.edges.len();
        self.edges.push(FlowEdge { from, to, capacity });
        self.outgoing[from].push(index);
        self.incoming[to].push(index);
        index
    }

    pub fn target(&self) -> TeamId {
        self.target
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn outgoing_edges(&self, node: usize) -> &[usize] {
        &self.outgoing[node]
    }

    pub fn incoming_edges(&self, node: usize) -> &[usize] {
        &self.incoming[node]
    }

    pub fn team_node(&self, team: TeamId) -> Option<usize> {
        self.team_nodes.get(&team).copied()
    }

    pub fn source_edges(&self) -> &[SourceEdge] {
        &self.source_edges
    }

    pub fn total_source_capacity(&self) -> u64 {
        self.source_edges.iter().map(|e| e.capacity).sum()
    }

    pub fn game_nodes_count(&self) -> usize {
        self.source_edges.len()
    }
}

pub fn build_network(target: TeamId, division: &Division) -> Result<EliminationNetwork> {
    let target_team = division.team(target)?;
    let ceiling = target_team.max_wins() as i64;

    let others: Vec<_> = division.teams().filter(|t| t.id != target).collect();

    let mut network = EliminationNetwork::new(target);

    let team_nodes: Vec<_> = others
        .iter()
        .map(|team| network.add_node(NetworkNode::Team(team.id)))
        .collect();

    for (i, first) in others.iter().enumerate() {
        for (j, second) in others.iter().enumerate().skip(i + 1) {
            // The lower id row is authoritative for the pair
            let games = first.games_against(second.id)?;
            if games == 0 {
                continue;
            }

            let game = network.add_node(NetworkNode::Game(first.id, second.id));
            let edge = network.add_edge(SOURCE, game, Capacity::Finite(games as u64));
            network.source_edges.push(SourceEdge {
                edge,
                pair: (first.id, second.id),
                capacity: games as u64,
            });
            network.add_edge(game, team_nodes[i], Capacity::Unbounded);
            network.add_edge(game, team_nodes[j], Capacity::Unbounded);
        }
    }

    for (team, &node) in others.iter().zip(team_nodes.iter()) {
        let capacity = ceiling - team.wins as i64;
        if capacity < 0 {
            return Err(EliminationError::NegativeCapacity {
                target,
                team: team.id,
                capacity,
            });
        }
        network.add_edge(node, SINK, Capacity::Finite(capacity as u64));
    }

    log::debug!(
        "Built network for team {}: {} nodes, {} edges, {} games to place",
        target,
        network.node_count(),
        network.edges.len(),
        network.total_source_capacity()
    );

    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Team;

    fn teams4() -> Division {
        Division::from_teams(vec![
            Team::new(0, "Atlanta", 83, 71, 8, vec![0, 1, 6, 1]),
            Team::new(1, "Philadelphia", 80, 79, 3, vec![1, 0, 0, 2]),
            Team::new(2, "New_York", 78, 78, 6, vec![6, 0, 0, 0]),
            Team::new(3, "Montreal", 77, 82, 3, vec![1, 2, 0, 0]),
        ])
        .unwrap()
    }

    #[test]
    fn capacity_arithmetic_keeps_unbounded() {
        assert_eq!(Capacity::Unbounded.saturating_sub(5), Capacity::Unbounded);
        assert_eq!(Capacity::Unbounded.min(Capacity::Finite(3)), Capacity::Finite(3));
        assert_eq!(Capacity::Finite(7).min(Capacity::Finite(3)), Capacity::Finite(3));
        assert_eq!(Capacity::Finite(2).saturating_add(3), Capacity::Finite(5));
        assert!(!Capacity::Finite(0).is_positive());
        assert!(Capacity::Unbounded.is_positive());
        assert_eq!(Capacity::Unbounded.upper_bound(), f64::INFINITY);
    }

    #[test]
    fn builds_game_and_team_nodes() {
        let network = build_network(1, &teams4()).unwrap();

        // Atlanta-New_York and Atlanta-Montreal still play, New_York-Montreal do not
        assert_eq!(network.game_nodes_count(), 2);
        let pairs: Vec<_> = network.source_edges().iter().map(|e| e.pair).collect();
        assert_eq!(pairs, vec![(0, 2), (0, 3)]);
        assert_eq!(network.total_source_capacity(), 7);

        // source, sink, 3 teams, 2 games
        assert_eq!(network.node_count(), 7);
        // 3 edges per game plus one sink edge per team
        assert_eq!(network.edges().len(), 9);
        assert!(network.team_node(1).is_none());
    }

    #[test]
    fn sink_edges_hold_remaining_headroom() {
        let network = build_network(1, &teams4()).unwrap();
        let sink_capacities: FxHashMap<_, _> = network
            .incoming_edges(SINK)
            .iter()
            .map(|&e| {
                let edge = network.edges()[e];
                (network.nodes()[edge.from], edge.capacity)
            })
            .collect();

        assert_eq!(sink_capacities[&NetworkNode::Team(0)], Capacity::Finite(0));
        assert_eq!(sink_capacities[&NetworkNode::Team(2)], Capacity::Finite(5));
        assert_eq!(sink_capacities[&NetworkNode::Team(3)], Capacity::Finite(6));
    }

    #[test]
    fn game_edges_are_unbounded() {
        let network = build_network(0, &teams4()).unwrap();
        for source_edge in network.source_edges() {
            let game = network.edges()[source_edge.edge].to;
            for &e in network.outgoing_edges(game) {
                assert_eq!(network.edges()[e].capacity, Capacity::Unbounded);
            }
        }
    }

    #[test]
    fn negative_headroom_is_an_error() {
        match build_network(3, &teams4()) {
            Err(EliminationError::NegativeCapacity {
                target,
                team,
                capacity,
            }) => {
                assert_eq!(target, 3);
                assert_eq!(team, 0);
                assert_eq!(capacity, -3);
            }
            other => panic!("unexpected result {:?}", other.map(|n| n.node_count())),
        }
    }

    #[test]
    fn unknown_target_is_an_error() {
        assert!(matches!(
            build_network(9, &teams4()),
            Err(EliminationError::UnknownTeam(9))
        ));
    }

    #[test]
    fn rebuilding_gives_identical_network() {
        let division = teams4();
        let first = build_network(2, &division).unwrap();
        let second = build_network(2, &division).unwrap();
        assert_eq!(first.edges(), second.edges());
        assert_eq!(first.source_edges(), second.source_edges());
    }
}
