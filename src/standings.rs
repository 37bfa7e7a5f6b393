use crate::player::Player;
use crate::results::MatchResult;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One row of the league table.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Standing {
    pub rank: u32,
    pub player_id: i32,
    pub name: String,
    pub games_played: u32,
    pub points: i32,
}

/// Builds the league table from every recorded result. Players without
/// results are left out. Ties on points go to the player with fewer games,
/// then by name.
pub fn compute_standings(players: &[Player], results: &[MatchResult]) -> Vec<Standing> {
    let mut dates: HashMap<i32, HashSet<_>> = HashMap::new();
    let mut points: HashMap<i32, i32> = HashMap::new();
    for result in results {
        dates.entry(result.player_id).or_default().insert(result.date);
        *points.entry(result.player_id).or_default() += result.points.value();
    }

    let mut table: Vec<Standing> = dates.iter()
        .map(|(&player_id, played)| Standing {
            rank: 0,
            player_id,
            name: players.iter()
                .find(|p| p.id == player_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("Player {}", player_id)),
            games_played: played.len() as u32,
            points: points[&player_id],
        })
        .collect();
    table.sort_by(|a, b| {
        b.points.cmp(&a.points)
            .then_with(|| a.games_played.cmp(&b.games_played))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    for (i, standing) in table.iter_mut().enumerate() {
        standing.rank = i as u32 + 1;
    }
    table
}

pub fn rank_of(table: &[Standing], player_id: i32) -> Option<u32> {
    table.iter().find(|s| s.player_id == player_id).map(|s| s.rank)
}
