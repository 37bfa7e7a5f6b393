use warp::{http::StatusCode, Reply, Rejection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use chrono::{Local, NaiveDate};
use log::info;
use std::collections::HashMap;
use matchday::error::TeamError;
use matchday::player::{clean_name, name_taken, Player};
use matchday::results::validate_results;
use matchday::standings::{compute_standings, rank_of};
use matchday::stats::compute_statistics;
use matchday::team::{generate_teams, Candidate, Roster, TeamLabel, TeamSplit};
use crate::AHandlebars;
use crate::store::AStore;
use crate::err_handler::{store_err, template_err, player_not_found};

type Result<T> = std::result::Result<T, Rejection>;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Deserialize)]
pub struct DateQuery {
    date: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePlayerBody {
    name: String,
}

#[derive(Deserialize)]
pub struct PlayerStatusBody {
    active: bool,
}

#[derive(Deserialize)]
pub struct UnlockBody {
    date: String,
}

fn today() -> NaiveDate {
    Local::now().naive_local().date()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

fn query_date(query: &DateQuery) -> NaiveDate {
    query.date.as_deref().and_then(parse_date).unwrap_or_else(today)
}

fn render(hb: &AHandlebars, template: &str, context: serde_json::Value, status: StatusCode) -> Result<Box<dyn Reply>> {
    let html = hb.render(template, &context).map_err(template_err)?;
    Ok(Box::new(warp::reply::with_status(warp::reply::html(html), status)))
}

fn see_other(location: String) -> Result<Box<dyn Reply>> {
    Ok(Box::new(warp::reply::with_header(StatusCode::SEE_OTHER, "location", location)))
}

pub async fn health_handler(store: AStore) -> Result<impl Reply> {
    store.health_check().await.map_err(store_err)?;
    Ok(StatusCode::OK)
}

pub async fn index() -> Result<Box<dyn Reply>> {
    see_other("/players".into())
}

#[derive(Serialize)]
struct PlayerView {
    id: i32,
    name: String,
    active: bool,
    status: String,
    rank: Option<u32>,
}

async fn players_page(store: &AStore, hb: &AHandlebars, error: Option<String>, status: StatusCode)
    -> Result<Box<dyn Reply>> {
    let mut players = store.players().await.map_err(store_err)?;
    let results = store.results().await.map_err(store_err)?;
    let table = compute_standings(&players, &results);
    players.sort_by_key(Player::sort_key);
    let views: Vec<PlayerView> = players.iter().map(|p| PlayerView {
        id: p.id,
        name: p.name.clone(),
        active: p.is_active(),
        status: p.status.to_string(),
        rank: rank_of(&table, p.id),
    }).collect();
    render(hb, "players", json!({
        "title": "Players",
        "players": views,
        "error": error,
    }), status)
}

pub async fn get_players(store: AStore, hb: AHandlebars) -> Result<Box<dyn Reply>> {
    players_page(&store, &hb, None, StatusCode::OK).await
}

pub async fn create_player(store: AStore, hb: AHandlebars, body: CreatePlayerBody) -> Result<Box<dyn Reply>> {
    let name = match clean_name(&body.name) {
        Some(name) => name,
        None => {
            let error = "Player name can't be empty".to_string();
            return players_page(&store, &hb, Some(error), StatusCode::BAD_REQUEST).await;
        },
    };
    let players = store.players().await.map_err(store_err)?;
    if name_taken(&players, &name) {
        let error = format!("{} is already on the roster", name);
        return players_page(&store, &hb, Some(error), StatusCode::BAD_REQUEST).await;
    }
    let player = store.insert_player(name).await.map_err(store_err)?;
    info!("added player {} ({})", player.name, player.id);
    see_other("/players".into())
}

pub async fn set_player_status(id: i32, store: AStore, body: PlayerStatusBody) -> Result<Box<dyn Reply>> {
    let player = store.set_player_active(id, body.active).await
        .map_err(store_err)?
        .ok_or_else(|| player_not_found(id))?;
    info!("player {} ({}) is now {}", player.name, player.id, player.status);
    see_other("/players".into())
}

#[derive(Serialize)]
struct CandidateView {
    id: i32,
    name: String,
    rank: Option<u32>,
    selected: bool,
}

// `selected` is None when the page should preselect the locked roster
async fn teams_page(store: &AStore, hb: &AHandlebars, date: NaiveDate, selected: Option<Vec<i32>>,
    error: Option<String>, status: StatusCode) -> Result<Box<dyn Reply>> {
    let mut players = store.players().await.map_err(store_err)?;
    let results = store.results().await.map_err(store_err)?;
    let assignments = store.roster(date).await.map_err(store_err)?;
    let table = compute_standings(&players, &results);
    players.sort_by_key(Player::sort_key);
    let roster = Roster::from_assignments(date, &assignments, &players);
    let selected = selected.unwrap_or_else(|| roster.player_ids());
    let candidates: Vec<CandidateView> = players.iter()
        .filter(|p| p.is_active())
        .map(|p| CandidateView {
            id: p.id,
            name: p.name.clone(),
            rank: rank_of(&table, p.id),
            selected: selected.contains(&p.id),
        })
        .collect();
    render(hb, "teams", json!({
        "title": "Teams",
        "date": date.format(DATE_FORMAT).to_string(),
        "players": candidates,
        "locked": roster.is_locked(),
        "roster": roster,
        "error": error,
    }), status)
}

pub async fn get_teams(store: AStore, hb: AHandlebars, query: DateQuery) -> Result<Box<dyn Reply>> {
    teams_page(&store, &hb, query_date(&query), None, None, StatusCode::OK).await
}

fn split_teams(candidates: &[Candidate]) -> std::result::Result<TeamSplit, TeamError> {
    generate_teams(candidates, &mut rand::thread_rng())
}

/// Generates teams from the selected players and locks them in for the
/// date, replacing whatever was locked before.
pub async fn lock_teams(store: AStore, hb: AHandlebars, form: Vec<(String, String)>) -> Result<Box<dyn Reply>> {
    let mut date = None;
    let mut selected = Vec::new();
    let mut malformed = None;
    for (key, value) in &form {
        match key.as_str() {
            "date" => date = parse_date(value),
            "player_id" => match value.parse::<i32>() {
                Ok(id) => selected.push(id),
                Err(_) => malformed = Some(format!("Couldn't read player {:?}", value)),
            },
            _ => {},
        }
    }
    let date = match date {
        Some(date) => date,
        None => {
            let error = "Pick a date for the match day".to_string();
            return teams_page(&store, &hb, today(), Some(selected), Some(error), StatusCode::BAD_REQUEST).await;
        },
    };
    if let Some(error) = malformed {
        return teams_page(&store, &hb, date, Some(selected), Some(error), StatusCode::BAD_REQUEST).await;
    }

    let players = store.players().await.map_err(store_err)?;
    let results = store.results().await.map_err(store_err)?;
    let table = compute_standings(&players, &results);
    let mut candidates = Vec::with_capacity(selected.len());
    for &id in &selected {
        match players.iter().find(|p| p.id == id && p.is_active()) {
            Some(p) => candidates.push(Candidate { player_id: p.id, name: p.name.clone(), rank: rank_of(&table, p.id) }),
            None => {
                let error = format!("Player {} isn't an active player", id);
                return teams_page(&store, &hb, date, Some(selected.clone()), Some(error), StatusCode::BAD_REQUEST).await;
            },
        }
    }

    let split = match split_teams(&candidates) {
        Ok(split) => split,
        Err(err) => {
            return teams_page(&store, &hb, date, Some(selected), Some(err.to_string()), StatusCode::BAD_REQUEST).await;
        },
    };
    store.replace_roster(date, split.assignments(date)).await.map_err(store_err)?;
    info!("locked teams for {}: {} {} vs {} {} (difference {})", date,
        TeamLabel::Orange, split.orange.rank_total,
        TeamLabel::Yellow, split.yellow.rank_total,
        split.difference);
    see_other(format!("/teams?date={}", date.format(DATE_FORMAT)))
}

pub async fn unlock_teams(store: AStore, hb: AHandlebars, body: UnlockBody) -> Result<Box<dyn Reply>> {
    let date = match parse_date(&body.date) {
        Some(date) => date,
        None => {
            let error = format!("{:?} isn't a valid date", body.date);
            return teams_page(&store, &hb, today(), None, Some(error), StatusCode::BAD_REQUEST).await;
        },
    };
    let cleared = store.clear_roster(date).await.map_err(store_err)?;
    info!("unlocked teams for {} ({} assignments cleared)", date, cleared);
    see_other(format!("/teams?date={}", date.format(DATE_FORMAT)))
}

#[derive(Serialize)]
struct PointsOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

fn points_options(current: Option<&str>) -> Vec<PointsOption> {
    let current = current.unwrap_or("");
    vec![("", "Not playing"), ("3", "Win (3)"), ("1", "Draw (1)"), ("0", "Loss (0)")].into_iter()
        .map(|(value, label)| PointsOption { value, label, selected: value == current })
        .collect()
}

#[derive(Serialize)]
struct EntryRow {
    player_id: i32,
    name: String,
    team: Option<String>,
    options: Vec<PointsOption>,
}

// `entered` holds the raw values of a rejected submission, so the form can
// be shown again as the user filled it in
async fn standings_page(store: &AStore, hb: &AHandlebars, date: NaiveDate, entered: Option<HashMap<i32, String>>,
    error: Option<String>, status: StatusCode) -> Result<Box<dyn Reply>> {
    let mut players = store.players().await.map_err(store_err)?;
    let results = store.results().await.map_err(store_err)?;
    let assignments = store.roster(date).await.map_err(store_err)?;
    let table = compute_standings(&players, &results);
    players.sort_by_key(Player::sort_key);
    let roster = Roster::from_assignments(date, &assignments, &players);
    let recorded: HashMap<i32, String> = results.iter()
        .filter(|r| r.date == date)
        .map(|r| (r.player_id, r.points.value().to_string()))
        .collect();
    let current = entered.as_ref().unwrap_or(&recorded);

    let rows: Vec<(i32, String, Option<TeamLabel>)> = if roster.is_locked() {
        roster.orange.iter().map(|e| (e.player_id, e.name.clone(), Some(TeamLabel::Orange)))
            .chain(roster.yellow.iter().map(|e| (e.player_id, e.name.clone(), Some(TeamLabel::Yellow))))
            .collect()
    } else {
        players.iter()
            .filter(|p| p.is_active() || recorded.contains_key(&p.id))
            .map(|p| (p.id, p.name.clone(), None))
            .collect()
    };
    let entries: Vec<EntryRow> = rows.into_iter()
        .map(|(player_id, name, team)| EntryRow {
            player_id,
            name,
            team: team.map(|t| t.to_string()),
            options: points_options(current.get(&player_id).map(String::as_str)),
        })
        .collect();

    render(hb, "standings", json!({
        "title": "Standings",
        "date": date.format(DATE_FORMAT).to_string(),
        "standings": table,
        "entries": entries,
        "locked": roster.is_locked(),
        "error": error,
    }), status)
}

pub async fn get_standings(store: AStore, hb: AHandlebars, query: DateQuery) -> Result<Box<dyn Reply>> {
    standings_page(&store, &hb, query_date(&query), None, None, StatusCode::OK).await
}

/// Validates a match day's points and, if they add up, replaces the
/// results recorded for that date.
pub async fn submit_results(store: AStore, hb: AHandlebars, form: Vec<(String, String)>) -> Result<Box<dyn Reply>> {
    let mut date = None;
    let mut entered = HashMap::new();
    let mut submitted = Vec::new();
    let mut malformed = None;
    for (key, value) in &form {
        if key == "date" {
            date = parse_date(value);
        } else if let Some(id) = key.strip_prefix("points_") {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match (id.parse::<i32>(), value.parse::<i32>()) {
                (Ok(id), Ok(points)) => {
                    entered.insert(id, value.to_string());
                    submitted.push((id, points));
                },
                _ => malformed = Some(format!("Couldn't read points {:?} for {}", value, key)),
            }
        }
    }
    let date = match date {
        Some(date) => date,
        None => {
            let error = "Pick a date for the results".to_string();
            return standings_page(&store, &hb, today(), Some(entered), Some(error), StatusCode::BAD_REQUEST).await;
        },
    };
    if let Some(error) = malformed {
        return standings_page(&store, &hb, date, Some(entered), Some(error), StatusCode::BAD_REQUEST).await;
    }

    let known: Vec<i32> = store.players().await.map_err(store_err)?.iter().map(|p| p.id).collect();
    let results = match validate_results(date, &submitted, &known) {
        Ok(results) => results,
        Err(err) => {
            info!("rejected results for {}: {}", date, err);
            return standings_page(&store, &hb, date, Some(entered), Some(err.to_string()), StatusCode::BAD_REQUEST).await;
        },
    };
    let count = results.len();
    store.replace_results(date, results).await.map_err(store_err)?;
    info!("recorded {} results for {}", count, date);
    see_other(format!("/standings?date={}", date.format(DATE_FORMAT)))
}

pub async fn get_statistics(store: AStore, hb: AHandlebars) -> Result<Box<dyn Reply>> {
    let players = store.players().await.map_err(store_err)?;
    let results = store.results().await.map_err(store_err)?;
    let assignments = store.assignments().await.map_err(store_err)?;
    render(&hb, "statistics", json!({
        "title": "Statistics",
        "stats": compute_statistics(&players, &results, &assignments),
    }), StatusCode::OK)
}
