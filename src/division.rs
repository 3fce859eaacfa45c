use std::{
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use crate::{
    certifier::{ElimCertifier, LpCertifier, MaxFlowCertifier},
    config::{EliminationConfig, SolveMethod, ValidationMode},
    error::{EliminationError, Result},
    lp_solvers::DefaultLpSolver,
    network::{build_network, EliminationNetwork, NetworkNode},
    parser::parse_division,
    team::{Team, TeamId},
};

/// All teams of a division, indexed by their dense id. Read-only once loaded,
/// so queries on different teams can run concurrently.
#[derive(Clone, Debug)]
pub struct Division {
    teams: Vec<Team>,
}

impl Division {
    /// Ids must be dense and in order: the team at position `i` has id `i`.
    pub fn from_teams(teams: Vec<Team>) -> Result<Self> {
        if let Some((index, team)) = teams.iter().enumerate().find(|(i, t)| t.id != *i) {
            return Err(EliminationError::MalformedInput {
                line: index + 2,
                reason: format!(
                    "{} has id {} but is listed at position {}",
                    team.name, team.id, index
                ),
            });
        }
        Ok(Self { teams })
    }

    pub fn from_reader(input: impl BufRead, validation: ValidationMode) -> Result<Self> {
        let division = Self::from_teams(parse_division(input)?)?;
        if validation == ValidationMode::Strict {
            division.validate()?;
        }
        Ok(division)
    }

    pub fn from_file(path: impl AsRef<Path>, validation: ValidationMode) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?), validation)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get_team_ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.teams.iter().map(|t| t.id)
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> + '_ {
        self.teams.iter()
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams.get(id).ok_or(EliminationError::UnknownTeam(id))
    }

    pub fn check_team_exists(&self, id: TeamId) -> Result<()> {
        self.team(id).map(|_| ())
    }

    /// Strict consistency of the season table: one column per team, zero self
    /// entries, symmetric head-to-head counts and rows summing to `remaining`.
    pub fn validate(&self) -> Result<()> {
        // Data lines start after the header
        let malformed = |team: &Team, reason: String| EliminationError::MalformedInput {
            line: team.id + 2,
            reason,
        };

        for team in &self.teams {
            if team.against.len() != self.teams.len() {
                return Err(malformed(
                    team,
                    format!(
                        "{} has {} opponent columns, division has {} teams",
                        team.name,
                        team.against.len(),
                        self.teams.len()
                    ),
                ));
            }
        }

        for team in &self.teams {
            if team.against[team.id] != 0 {
                return Err(malformed(
                    team,
                    format!(
                        "{} lists {} games against itself",
                        team.name, team.against[team.id]
                    ),
                ));
            }

            let scheduled: u64 = team.against.iter().map(|&g| g as u64).sum();
            if scheduled != team.remaining as u64 {
                return Err(malformed(
                    team,
                    format!(
                        "{} has {} remaining games but {} scheduled against opponents",
                        team.name, team.remaining, scheduled
                    ),
                ));
            }

            for other in &self.teams {
                let theirs = other.against[team.id];
                if team.against[other.id] != theirs {
                    return Err(malformed(
                        team,
                        format!(
                            "{} lists {} games against {}, which lists {}",
                            team.name, team.against[other.id], other.name, theirs
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Teams whose current wins already exceed the best final total of `id`.
    fn teams_out_of_reach(&self, id: TeamId) -> Result<Vec<TeamId>> {
        let team = self.team(id)?;
        Ok(self
            .teams
            .iter()
            .filter(|other| other.id != id && other.wins as u64 > team.max_wins())
            .map(|other| other.id)
            .collect())
    }

    pub fn is_trivially_eliminated(&self, id: TeamId) -> Result<bool> {
        Ok(!self.teams_out_of_reach(id)?.is_empty())
    }

    pub fn build_network(&self, id: TeamId) -> Result<EliminationNetwork> {
        build_network(id, self)
    }

    pub fn is_eliminated(&self, id: TeamId, method: SolveMethod) -> Result<bool> {
        self.is_eliminated_with(id, method, &EliminationConfig::default())
    }

    pub fn is_eliminated_with(
        &self,
        id: TeamId,
        method: SolveMethod,
        config: &EliminationConfig,
    ) -> Result<bool> {
        match method {
            SolveMethod::MaxFlow => self.certify(id, &MaxFlowCertifier::new(config)),
            SolveMethod::LinearProgramming => {
                self.certify(id, &LpCertifier::<DefaultLpSolver>::new(config))
            }
        }
    }

    /// Trivial check first, then a fresh network handed to `certifier`.
    pub fn certify(&self, id: TeamId, certifier: &impl ElimCertifier) -> Result<bool> {
        self.check_team_exists(id)?;

        if self.is_trivially_eliminated(id)? {
            log::debug!("Team {} trivially eliminated", id);
            return Ok(true);
        }

        let network = self.build_network(id)?;
        let eliminated = certifier.is_eliminated(&network)?;
        log::info!(
            "Team {} ({}): eliminated = {}",
            id,
            certifier.name(),
            eliminated
        );
        Ok(eliminated)
    }

    /// Runs both certifiers and fails if their verdicts differ.
    pub fn cross_check(&self, id: TeamId, config: &EliminationConfig) -> Result<bool> {
        let max_flow = self.is_eliminated_with(id, SolveMethod::MaxFlow, config)?;
        let lp = self.is_eliminated_with(id, SolveMethod::LinearProgramming, config)?;
        if max_flow != lp {
            return Err(EliminationError::CertifierDisagreement {
                team: id,
                max_flow,
                lp,
            });
        }
        Ok(max_flow)
    }

    /// Teams that together make `id` eliminated, or `None` if it is not.
    /// Either the teams already out of reach, or the teams on the source side
    /// of a minimum cut: their combined wins plus the games among them exceed
    /// what they can absorb below the target's ceiling.
    pub fn elimination_certificate(
        &self,
        id: TeamId,
        config: &EliminationConfig,
    ) -> Result<Option<Vec<TeamId>>> {
        let out_of_reach = self.teams_out_of_reach(id)?;
        if !out_of_reach.is_empty() {
            return Ok(Some(out_of_reach));
        }

        let network = self.build_network(id)?;
        let result = MaxFlowCertifier::new(config).max_flow(&network)?;
        if result.total_flow == network.total_source_capacity() {
            return Ok(None);
        }

        let mut subset: Vec<_> = result
            .source_side
            .iter()
            .filter_map(|&node| match network.nodes()[node] {
                NetworkNode::Team(team) => Some(team),
                _ => None,
            })
            .collect();
        subset.sort_unstable();
        Ok(Some(subset))
    }
}

impl FromStr for Division {
    type Err = EliminationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes(), ValidationMode::Permissive)
    }
}

impl Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for team in &self.teams {
            writeln!(f, "{}: {} ", team.id, team)?;
        }
        Ok(())
    }
}
