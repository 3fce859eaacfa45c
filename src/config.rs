use std::{fmt::Display, str::FromStr, time::Duration};

/// Default bound on augmenting paths before the max-flow solve gives up.
pub const DEFAULT_MAX_FLOW_ITERATIONS: usize = 100_000;

/// Absolute tolerance for LP source-edge saturation.
pub const DEFAULT_LP_TOLERANCE: f64 = 1e-5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveMethod {
    MaxFlow,
    LinearProgramming,
}

impl FromStr for SolveMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MaxFlow" | "max-flow" | "Network Flows" => Ok(SolveMethod::MaxFlow),
            "LinearProgramming" | "lp" | "Linear Programming" => {
                Ok(SolveMethod::LinearProgramming)
            }
            _ => Err(format!(
                "unknown method '{}', expected MaxFlow or LinearProgramming",
                s
            )),
        }
    }
}

impl Display for SolveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveMethod::MaxFlow => write!(f, "MaxFlow"),
            SolveMethod::LinearProgramming => write!(f, "LinearProgramming"),
        }
    }
}

/// How much of the season table is checked at load time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Accept any non-negative counts, as read.
    #[default]
    Permissive,
    /// Require a symmetric against-matrix, zero self entries and rows summing
    /// to `remaining`.
    Strict,
}

#[derive(Clone, Debug)]
pub struct EliminationConfig {
    pub max_flow_iterations: Option<usize>,
    pub time_limit: Option<Duration>,
    pub lp_tolerance: f64,
    pub validation: ValidationMode,
    pub solver_verbose: bool,
}

impl Default for EliminationConfig {
    fn default() -> Self {
        Self {
            max_flow_iterations: Some(DEFAULT_MAX_FLOW_ITERATIONS),
            time_limit: None,
            lp_tolerance: DEFAULT_LP_TOLERANCE,
            validation: ValidationMode::Permissive,
            solver_verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_method_spellings() {
        assert_eq!("MaxFlow".parse::<SolveMethod>(), Ok(SolveMethod::MaxFlow));
        assert_eq!("Network Flows".parse::<SolveMethod>(), Ok(SolveMethod::MaxFlow));
        assert_eq!(
            "LinearProgramming".parse::<SolveMethod>(),
            Ok(SolveMethod::LinearProgramming)
        );
        assert_eq!(
            "Linear Programming".parse::<SolveMethod>(),
            Ok(SolveMethod::LinearProgramming)
        );
        assert!("Simplex".parse::<SolveMethod>().is_err());
    }

    #[test]
    fn method_display_round_trips() {
        for method in [SolveMethod::MaxFlow, SolveMethod::LinearProgramming] {
            assert_eq!(method.to_string().parse::<SolveMethod>(), Ok(method));
        }
    }
}
