use crate::error::TeamError;
use crate::player::Player;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Player counts a match day can be played with.
pub const GAME_SIZES: [usize; 2] = [10, 12];

/// Number of shuffles tried before settling on the best split found.
pub const MAX_SHUFFLES: usize = 100;

/// A split whose rank totals differ by at most this much ends the search early.
pub const GOOD_ENOUGH_DIFFERENCE: u32 = 1;

pub fn is_game_size(n: usize) -> bool {
    GAME_SIZES.contains(&n)
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub enum TeamLabel {
    Orange,
    Yellow,
}

impl TeamLabel {
    pub fn other(self) -> TeamLabel {
        match self {
            TeamLabel::Orange => TeamLabel::Yellow,
            TeamLabel::Yellow => TeamLabel::Orange,
        }
    }
}

impl fmt::Display for TeamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamLabel::Orange => write!(f, "Orange"),
            TeamLabel::Yellow => write!(f, "Yellow"),
        }
    }
}

impl FromStr for TeamLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Orange" => Ok(TeamLabel::Orange),
            "Yellow" => Ok(TeamLabel::Yellow),
            _ => Err(format!("unknown team label {}", s)),
        }
    }
}

/// A player available for a match day, along with their current league rank
/// (`None` if they haven't got any results yet).
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Candidate {
    pub player_id: i32,
    pub name: String,
    pub rank: Option<u32>,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Team {
    pub label: TeamLabel,
    pub players: Vec<Candidate>,
    pub rank_total: u32,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct TeamSplit {
    pub orange: Team,
    pub yellow: Team,
    pub difference: u32,
}

/// One row of a locked roster.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Assignment {
    pub date: NaiveDate,
    pub player_id: i32,
    pub team: TeamLabel,
    pub slot: i32,
}

impl TeamSplit {
    pub fn assignments(&self, date: NaiveDate) -> Vec<Assignment> {
        [&self.orange, &self.yellow].iter()
            .flat_map(|team| team.players.iter().enumerate().map(move |(slot, c)| Assignment {
                date,
                player_id: c.player_id,
                team: team.label,
                slot: slot as i32,
            }))
            .collect()
    }
}

// unranked players count as one place below the weakest ranked candidate
fn weights(candidates: &[Candidate]) -> Vec<u32> {
    let unranked = candidates.iter().filter_map(|c| c.rank).max().unwrap_or(0) + 1;
    candidates.iter().map(|c| c.rank.unwrap_or(unranked)).collect()
}

fn build_team(label: TeamLabel, mut members: Vec<(u32, Candidate)>) -> Team {
    members.sort_by(|(wa, a), (wb, b)| {
        wa.cmp(wb).then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    Team {
        label,
        rank_total: members.iter().map(|(w, _)| w).sum(),
        players: members.into_iter().map(|(_, c)| c).collect(),
    }
}

/// Splits 10 or 12 candidates into two equal teams, keeping the split whose
/// rank totals are closest out of up to `MAX_SHUFFLES` random shuffles.
pub fn generate_teams<R>(candidates: &[Candidate], rng: &mut R) -> Result<TeamSplit, TeamError>
    where R: Rng + ?Sized {
    if !is_game_size(candidates.len()) {
        return Err(TeamError::WrongPlayerCount(candidates.len()));
    }
    let mut seen = HashSet::new();
    for c in candidates {
        if !seen.insert(c.player_id) {
            return Err(TeamError::DuplicatePlayer(c.player_id));
        }
    }

    let half = candidates.len() / 2;
    let mut pool: Vec<(u32, Candidate)> = weights(candidates).into_iter()
        .zip(candidates.iter().cloned())
        .collect();
    let mut best: (u32, Vec<(u32, Candidate)>) = (u32::MAX, pool.clone());
    for _ in 0..MAX_SHUFFLES {
        pool.shuffle(rng);
        let first: u32 = pool[..half].iter().map(|(w, _)| w).sum();
        let second: u32 = pool[half..].iter().map(|(w, _)| w).sum();
        let diff = if first > second { first - second } else { second - first };
        if diff < best.0 {
            best = (diff, pool.clone());
        }
        if diff <= GOOD_ENOUGH_DIFFERENCE {
            break;
        }
    }

    let (difference, mut split) = best;
    let yellow = split.split_off(half);
    Ok(TeamSplit {
        orange: build_team(TeamLabel::Orange, split),
        yellow: build_team(TeamLabel::Yellow, yellow),
        difference,
    })
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct RosterEntry {
    pub player_id: i32,
    pub name: String,
    pub slot: i32,
}

/// A match day's locked roster, ready for display.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Roster {
    pub date: NaiveDate,
    pub orange: Vec<RosterEntry>,
    pub yellow: Vec<RosterEntry>,
}

impl Roster {
    pub fn from_assignments(date: NaiveDate, assignments: &[Assignment], players: &[Player]) -> Roster {
        let entries = |label: TeamLabel| {
            let mut entries: Vec<RosterEntry> = assignments.iter()
                .filter(|a| a.date == date && a.team == label)
                .map(|a| RosterEntry {
                    player_id: a.player_id,
                    name: players.iter()
                        .find(|p| p.id == a.player_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| format!("Player {}", a.player_id)),
                    slot: a.slot,
                })
                .collect();
            entries.sort_by_key(|e| e.slot);
            entries
        };
        Roster { date, orange: entries(TeamLabel::Orange), yellow: entries(TeamLabel::Yellow) }
    }

    pub fn is_locked(&self) -> bool {
        !self.orange.is_empty() || !self.yellow.is_empty()
    }

    pub fn player_ids(&self) -> Vec<i32> {
        self.orange.iter().chain(self.yellow.iter()).map(|e| e.player_id).collect()
    }

    pub fn team_of(&self, player_id: i32) -> Option<TeamLabel> {
        if self.orange.iter().any(|e| e.player_id == player_id) {
            Some(TeamLabel::Orange)
        } else if self.yellow.iter().any(|e| e.player_id == player_id) {
            Some(TeamLabel::Yellow)
        } else {
            None
        }
    }
}
