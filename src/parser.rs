use std::io::BufRead;

use crate::{
    error::{EliminationError, Result},
    team::Team,
};

/// Fields before the per-opponent columns: name, wins, losses, remaining.
const RECORD_PREFIX_FIELDS: usize = 4;

/// Reads a division file: a header line (ignored) followed by one
/// `name wins losses remaining g0 g1 ...` line per team. Team ids follow line
/// order among the data lines; blank lines are skipped.
pub fn parse_division(input: impl BufRead) -> Result<Vec<Team>> {
    let mut data_lines = vec![];
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        // First line is the team count header
        if idx == 0 || line.trim().is_empty() {
            continue;
        }
        data_lines.push((idx + 1, line));
    }

    let teams_count = data_lines.len();
    let mut teams = Vec::with_capacity(teams_count);

    for (id, (line_number, line)) in data_lines.iter().enumerate() {
        let parts: Vec<_> = line.split_whitespace().collect();

        if parts.len() != RECORD_PREFIX_FIELDS + teams_count {
            return Err(EliminationError::MalformedInput {
                line: *line_number,
                reason: format!(
                    "expected {} fields for a division of {} teams, found {}",
                    RECORD_PREFIX_FIELDS + teams_count,
                    teams_count,
                    parts.len()
                ),
            });
        }

        let wins = parse_count(parts[1], *line_number, "wins")?;
        let losses = parse_count(parts[2], *line_number, "losses")?;
        let remaining = parse_count(parts[3], *line_number, "remaining")?;
        let against = parts[RECORD_PREFIX_FIELDS..]
            .iter()
            .enumerate()
            .map(|(column, field)| parse_count(field, *line_number, &format!("g{}", column)))
            .collect::<Result<Vec<_>>>()?;

        teams.push(Team::new(id, parts[0], wins, losses, remaining, against));
    }

    log::debug!("Parsed division with {} teams", teams.len());
    Ok(teams)
}

fn parse_count(field: &str, line: usize, column: &str) -> Result<u32> {
    field
        .parse()
        .map_err(|_| EliminationError::MalformedInput {
            line,
            reason: format!("field '{}' is not a non-negative integer: {:?}", column, field),
        })
}
