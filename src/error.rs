use thiserror::Error;

use crate::team::TeamId;

#[derive(Debug, Error)]
pub enum EliminationError {
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("team {0} does not exist in the division")]
    UnknownTeam(TeamId),

    /// The target's ceiling is below another team's current wins. Normally
    /// caught by the trivial check before a network is ever built.
    #[error("sink edge of team {team} has negative capacity {capacity} when certifying team {target}")]
    NegativeCapacity {
        target: TeamId,
        team: TeamId,
        capacity: i64,
    },

    #[error("max-flow computation failed: {0}")]
    FlowComputation(String),

    #[error("linear program solve failed: {0}")]
    LpSolve(String),

    #[error("certifiers disagree on team {team}: max-flow says {max_flow}, linear program says {lp}")]
    CertifierDisagreement { team: TeamId, max_flow: bool, lp: bool },

    #[error("failed to read division: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EliminationError>;
