pub mod certifier;
pub mod config;
pub mod division;
pub mod error;
pub mod network;
pub mod team;

pub mod lp_flow;
pub mod lp_solvers;
pub mod max_flow;
pub mod parser;
pub mod time_limit;

pub use config::{EliminationConfig, SolveMethod, ValidationMode};
pub use division::Division;
pub use error::{EliminationError, Result};
pub use team::{Team, TeamId};
