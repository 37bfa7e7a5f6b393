//! Statistics derived from results and locked rosters. Everything here is
//! recomputed on each request; nothing is stored.

use crate::player::Player;
use crate::results::{MatchResult, Points};
use crate::team::{Assignment, TeamLabel};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const RECENT_MATCHES: usize = 5;
pub const MIN_GAMES_TOGETHER: u32 = 3;
pub const MAX_PAIRINGS: usize = 10;

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct MostActive {
    pub games: u32,
    pub players: Vec<String>,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct WinRate {
    pub name: String,
    pub games_played: u32,
    pub wins: u32,
    pub win_rate: f64,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct MatchSummary {
    pub date: NaiveDate,
    pub total_points: i32,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Streak {
    pub player: String,
    pub length: u32,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Pairing {
    pub player1: String,
    pub player2: String,
    pub games_together: u32,
    pub wins_together: u32,
    pub win_rate: f64,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct FunFact {
    pub title: String,
    pub description: String,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Statistics {
    pub total_matches: usize,
    pub active_players: usize,
    pub most_active: Option<MostActive>,
    pub win_rates: Vec<WinRate>,
    pub recent_matches: Vec<MatchSummary>,
    pub longest_win_streak: Option<Streak>,
    pub longest_losing_streak: Option<Streak>,
    pub best_pairings: Vec<Pairing>,
    pub fun_facts: Vec<FunFact>,
}

fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (1000.0 * part as f64 / whole as f64).round() / 10.0
}

fn by_rate_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

struct Lookup<'a> {
    players: &'a [Player],
}

impl<'a> Lookup<'a> {
    fn name(&self, player_id: i32) -> String {
        self.players.iter()
            .find(|p| p.id == player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Player {}", player_id))
    }

    fn is_active(&self, player_id: i32) -> bool {
        self.players.iter().any(|p| p.id == player_id && p.is_active())
    }
}

// each player's results in date order
fn history(results: &[MatchResult]) -> BTreeMap<i32, Vec<&MatchResult>> {
    let mut by_player: BTreeMap<i32, Vec<&MatchResult>> = BTreeMap::new();
    for result in results {
        by_player.entry(result.player_id).or_default().push(result);
    }
    for games in by_player.values_mut() {
        games.sort_by_key(|r| r.date);
    }
    by_player
}

fn most_active(lookup: &Lookup, history: &BTreeMap<i32, Vec<&MatchResult>>) -> Option<MostActive> {
    let games = history.values().map(|g| g.len() as u32).max()?;
    let mut players: Vec<String> = history.iter()
        .filter(|(_, g)| g.len() as u32 == games)
        .map(|(&id, _)| lookup.name(id))
        .collect();
    players.sort_by_key(|name| name.to_lowercase());
    Some(MostActive { games, players })
}

fn win_rates(lookup: &Lookup, history: &BTreeMap<i32, Vec<&MatchResult>>) -> Vec<WinRate> {
    let mut rates: Vec<WinRate> = history.iter()
        .filter(|(id, _)| lookup.is_active(**id))
        .map(|(&id, games)| {
            let wins = games.iter().filter(|r| r.points == Points::Win).count() as u32;
            let games_played = games.len() as u32;
            WinRate { name: lookup.name(id), games_played, wins, win_rate: percentage(wins, games_played) }
        })
        .collect();
    rates.sort_by(|a, b| by_rate_desc(a.win_rate, b.win_rate)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())));
    rates
}

fn recent_matches(results: &[MatchResult]) -> Vec<MatchSummary> {
    let mut totals: BTreeMap<NaiveDate, i32> = BTreeMap::new();
    for result in results {
        *totals.entry(result.date).or_default() += result.points.value();
    }
    totals.into_iter()
        .rev()
        .take(RECENT_MATCHES)
        .map(|(date, total_points)| MatchSummary { date, total_points })
        .collect()
}

fn longest_streak(lookup: &Lookup, history: &BTreeMap<i32, Vec<&MatchResult>>, points: Points) -> Option<Streak> {
    let mut best: Option<Streak> = None;
    for (&id, games) in history {
        let mut run: u32 = 0;
        let mut longest: u32 = 0;
        for result in games {
            if result.points == points {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }
        let name = lookup.name(id);
        let better = match &best {
            None => longest > 0,
            Some(b) => longest > b.length
                || (longest == b.length && name.to_lowercase() < b.player.to_lowercase()),
        };
        if better {
            best = Some(Streak { player: name, length: longest });
        }
    }
    best
}

fn best_pairings(lookup: &Lookup, results: &[MatchResult], assignments: &[Assignment]) -> Vec<Pairing> {
    let points: HashMap<(NaiveDate, i32), i32> = results.iter()
        .map(|r| ((r.date, r.player_id), r.points.value()))
        .collect();
    let mut teams: BTreeMap<(NaiveDate, TeamLabel), Vec<i32>> = BTreeMap::new();
    for a in assignments {
        teams.entry((a.date, a.team)).or_default().push(a.player_id);
    }
    let played: BTreeSet<NaiveDate> = results.iter().map(|r| r.date).collect();
    let team_points = |date: NaiveDate, label: TeamLabel| -> i32 {
        teams.get(&(date, label))
            .map(|ids| ids.iter().filter_map(|id| points.get(&(date, *id))).sum::<i32>())
            .unwrap_or(0)
    };

    // keyed by player names in order, so each pair is counted once
    let mut pairs: BTreeMap<(String, String), (u32, u32)> = BTreeMap::new();
    for ((date, label), ids) in &teams {
        if !played.contains(date) {
            continue;
        }
        let won = team_points(*date, *label) > team_points(*date, label.other());
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                let (name_a, name_b) = (lookup.name(*a), lookup.name(*b));
                let key = if name_a <= name_b { (name_a, name_b) } else { (name_b, name_a) };
                let entry = pairs.entry(key).or_insert((0, 0));
                entry.0 += 1;
                if won {
                    entry.1 += 1;
                }
            }
        }
    }

    let mut pairings: Vec<Pairing> = pairs.into_iter()
        .filter(|(_, (games, _))| *games >= MIN_GAMES_TOGETHER)
        .map(|((player1, player2), (games_together, wins_together))| Pairing {
            player1,
            player2,
            games_together,
            wins_together,
            win_rate: percentage(wins_together, games_together),
        })
        .collect();
    pairings.sort_by(|a, b| by_rate_desc(a.win_rate, b.win_rate)
        .then_with(|| b.wins_together.cmp(&a.wins_together)));
    pairings.truncate(MAX_PAIRINGS);
    pairings
}

fn fun_facts(win_rates: &[WinRate], most_active: &Option<MostActive>) -> Vec<FunFact> {
    let mut facts = Vec::new();
    if let Some(top) = win_rates.first() {
        facts.push(FunFact {
            title: "Top Performer".into(),
            description: format!("{} leads with {:.1}% win rate!", top.name, top.win_rate),
        });
    }
    match most_active {
        Some(active) if active.players.len() > 1 => facts.push(FunFact {
            title: "Iron Players".into(),
            description: format!("{} have each played {} games.", active.players.join(" & "), active.games),
        }),
        Some(active) => facts.push(FunFact {
            title: "Iron Player".into(),
            description: format!("{} has played {} games.", active.players[0], active.games),
        }),
        None => {},
    }
    facts
}

/// Returns `None` until at least one result has been recorded.
pub fn compute_statistics(players: &[Player], results: &[MatchResult], assignments: &[Assignment])
    -> Option<Statistics> {
    if results.is_empty() {
        return None;
    }
    let lookup = Lookup { players };
    let history = history(results);
    let total_matches = results.iter().map(|r| r.date).collect::<BTreeSet<_>>().len();
    let most_active = most_active(&lookup, &history);
    let win_rates = win_rates(&lookup, &history);
    let fun_facts = fun_facts(&win_rates, &most_active);
    Some(Statistics {
        total_matches,
        active_players: history.len(),
        most_active,
        recent_matches: recent_matches(results),
        longest_win_streak: longest_streak(&lookup, &history, Points::Win),
        longest_losing_streak: longest_streak(&lookup, &history, Points::Loss),
        best_pairings: best_pairings(&lookup, results, assignments),
        win_rates,
        fun_facts,
    })
}
