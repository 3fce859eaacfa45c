use std::marker::PhantomData;

use crate::{
    config::EliminationConfig,
    error::Result,
    lp_flow::solve_lp_flow,
    lp_solvers::{DefaultLpSolver, LpSolver},
    max_flow::{compute_max_flow, MaxFlowLimits, MaxFlowResult},
    network::{EliminationNetwork, SINK, SOURCE},
};

/// Decides elimination from a built network: the target is eliminated iff
/// some source edge cannot be saturated.
pub trait ElimCertifier {
    fn name(&self) -> &'static str;
    fn is_eliminated(&self, network: &EliminationNetwork) -> Result<bool>;
}

pub struct MaxFlowCertifier {
    pub limits: MaxFlowLimits,
}

impl MaxFlowCertifier {
    pub fn new(config: &EliminationConfig) -> Self {
        Self {
            limits: MaxFlowLimits {
                max_iterations: config.max_flow_iterations,
                time_limit: config.time_limit,
            },
        }
    }

    pub fn max_flow(&self, network: &EliminationNetwork) -> Result<MaxFlowResult> {
        compute_max_flow(network, SOURCE, SINK, self.limits)
    }
}

impl ElimCertifier for MaxFlowCertifier {
    fn name(&self) -> &'static str {
        "MaxFlow"
    }

    fn is_eliminated(&self, network: &EliminationNetwork) -> Result<bool> {
        let result = self.max_flow(network)?;

        let unsaturated = network.source_edges().iter().find(|source_edge| {
            let edge = network.edges()[source_edge.edge];
            result.flow_on(edge.from, edge.to) < source_edge.capacity
        });

        if let Some(source_edge) = unsaturated {
            log::debug!(
                "Team {} eliminated: games {:?} cannot all be placed ({} of {} total)",
                network.target(),
                source_edge.pair,
                result.total_flow,
                network.total_source_capacity()
            );
        }

        Ok(unsaturated.is_some())
    }
}

pub struct LpCertifier<Solver: LpSolver = DefaultLpSolver> {
    pub tolerance: f64,
    pub time_limit: Option<std::time::Duration>,
    pub verbose: bool,
    _phantom: PhantomData<Solver>,
}

impl<Solver: LpSolver> LpCertifier<Solver> {
    pub fn new(config: &EliminationConfig) -> Self {
        Self {
            tolerance: config.lp_tolerance,
            time_limit: config.time_limit,
            verbose: config.solver_verbose,
            _phantom: PhantomData,
        }
    }
}

impl<Solver: LpSolver> ElimCertifier for LpCertifier<Solver> {
    fn name(&self) -> &'static str {
        "LinearProgramming"
    }

    fn is_eliminated(&self, network: &EliminationNetwork) -> Result<bool> {
        let flow = solve_lp_flow::<Solver>(network, self.time_limit, self.verbose)?;

        let unsaturated = network.source_edges().iter().find(|source_edge| {
            !is_saturated(
                flow.edge_flows[source_edge.edge],
                source_edge.capacity as f64,
                self.tolerance,
            )
        });

        if let Some(source_edge) = unsaturated {
            log::debug!(
                "Team {} eliminated: games {:?} carry {:.6} of {}",
                network.target(),
                source_edge.pair,
                flow.edge_flows[source_edge.edge],
                source_edge.capacity
            );
        }

        Ok(unsaturated.is_some())
    }
}

/// Saturation test with absolute tolerance, solver flows are floating point.
pub fn is_saturated(flow: f64, capacity: f64, tolerance: f64) -> bool {
    (flow - capacity).abs() < tolerance
}
