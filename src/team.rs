use std::fmt::Display;

use crate::error::{EliminationError, Result};

pub type TeamId = usize;

/// Season snapshot of one team. `against[k]` holds the games left against the
/// team with id `k`, self entry included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub remaining: u32,
    pub against: Vec<u32>,
}

impl Team {
    pub fn new(
        id: TeamId,
        name: impl Into<String>,
        wins: u32,
        losses: u32,
        remaining: u32,
        against: Vec<u32>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            wins,
            losses,
            remaining,
            against,
        }
    }

    /// Best final win count this team can still reach.
    pub fn max_wins(&self) -> u64 {
        self.wins as u64 + self.remaining as u64
    }

    pub fn games_against(&self, other: TeamId) -> Result<u32> {
        self.against
            .get(other)
            .copied()
            .ok_or(EliminationError::UnknownTeam(other))
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} \t {} wins \t {} losses \t {} remaining",
            self.name, self.wins, self.losses, self.remaining
        )
    }
}
