use std::time::Duration;

use crate::{
    error::{EliminationError, Result},
    lp_solvers::*,
    network::{EliminationNetwork, SINK, SOURCE},
};

/// Optimal LP flow: one value per network edge plus the total `F`.
#[derive(Clone, Debug)]
pub struct LpFlow {
    pub edge_flows: Vec<f64>,
    pub total_flow: f64,
}

/// Maximum flow as a linear program: a bounded variable per edge, a free
/// total `F`, and conservation at every node but the sink.
pub fn solve_lp_flow<Solver: LpSolver>(
    network: &EliminationNetwork,
    time_limit: Option<Duration>,
    verbose: bool,
) -> Result<LpFlow> {
    let mut model = Solver::create_new_model(
        &format!("elimination_team_{}", network.target()),
        verbose,
        ObjSense::Maximize,
    );

    let edge_vars: Vec<_> = network
        .edges()
        .iter()
        .enumerate()
        .map(|(idx, edge)| {
            model.add_variable(
                &format!("f[{}->{}]#{}", edge.from, edge.to, idx),
                false,
                0.0,
                0.0,
                edge.capacity.upper_bound(),
            )
        })
        .collect();

    let total_var = model.add_variable("F", false, 1.0, 0.0, f64::INFINITY);

    for node in 0..network.node_count() {
        if node == SINK {
            continue;
        }

        // inflow (+ F at the source) - outflow == 0
        let mut vars = vec![];
        let mut coeffs = vec![];
        for &e in network.incoming_edges(node) {
            vars.push(edge_vars[e].clone());
            coeffs.push(1.0);
        }
        for &e in network.outgoing_edges(node) {
            vars.push(edge_vars[e].clone());
            coeffs.push(-1.0);
        }
        if node == SOURCE {
            vars.push(total_var.clone());
            coeffs.push(1.0);
        }

        model.add_constraint(
            &format!("conservation_{}", node),
            &vars,
            &coeffs,
            Some(0.0),
            Some(0.0),
        );
    }

    let mut model = model.build();
    if let Some(time_limit) = time_limit {
        model = model.set_time_limit(time_limit);
    }

    let solved_model = model.solve();

    if !solved_model.is_optimal() {
        return Err(EliminationError::LpSolve(format!(
            "no optimal flow for team {}: {}",
            network.target(),
            solved_model.status()
        )));
    }

    let Some(sol) = solved_model.get_solutions(1).into_iter().next() else {
        return Err(EliminationError::LpSolve(format!(
            "solver reported optimal without a solution for team {}",
            network.target()
        )));
    };

    let flow = LpFlow {
        edge_flows: sol.get_values(&edge_vars),
        total_flow: sol.get_value(&total_var),
    };

    log::debug!(
        "LP flow for team {}: {:.3} of {} source capacity",
        network.target(),
        flow.total_flow,
        network.total_source_capacity()
    );

    Ok(flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        division::Division, lp_solvers::mini_lp::MiniLpSolver, network::build_network, team::Team,
    };

    #[test]
    fn lp_flow_respects_capacities_and_conservation() {
        let division = Division::from_teams(vec![
            Team::new(0, "Atlanta", 83, 71, 8, vec![0, 1, 6, 1]),
            Team::new(1, "Philadelphia", 80, 79, 3, vec![1, 0, 0, 2]),
            Team::new(2, "New_York", 78, 78, 6, vec![6, 0, 0, 0]),
            Team::new(3, "Montreal", 77, 82, 3, vec![1, 2, 0, 0]),
        ])
        .unwrap();
        let network = build_network(1, &division).unwrap();
        let flow = solve_lp_flow::<MiniLpSolver>(&network, None, false).unwrap();

        // Atlanta cannot take any win, New_York at most 5 of its 6 games
        assert!((flow.total_flow - 6.0).abs() < 1e-6);

        for (edge, value) in network.edges().iter().zip(flow.edge_flows.iter()) {
            assert!(*value >= -1e-9);
            assert!(*value <= edge.capacity.upper_bound() + 1e-9);
        }

        let out_of_source: f64 = network
            .outgoing_edges(SOURCE)
            .iter()
            .map(|&e| flow.edge_flows[e])
            .sum();
        assert!((out_of_source - flow.total_flow).abs() < 1e-6);
    }
}
