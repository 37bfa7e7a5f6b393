use crate::schema::*;
use crate::store::StoreError;
use chrono::prelude::*;
use matchday::player::{Player, PlayerStatus};
use matchday::results::{MatchResult, Points};
use matchday::team::{Assignment, TeamLabel};
use std::convert::{From, TryFrom};

#[derive(Debug, Queryable)]
pub struct PlayerRow {
    pub id: i32,
    pub name: String,
    pub active: bool,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Player {
        Player {
            id: row.id,
            name: row.name,
            status: PlayerStatus::from_active(row.active),
        }
    }
}

#[derive(Insertable)]
#[table_name = "players"]
pub struct PlayerRowInsertable {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Queryable)]
pub struct AssignmentRow {
    pub match_date: NaiveDate,
    pub player_id: i32,
    pub team: String,
    pub slot: i32,
    pub locked_at: DateTime<Utc>,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = StoreError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let team = row.team.parse::<TeamLabel>().map_err(StoreError::InvalidRow)?;
        Ok(Assignment {
            date: row.match_date,
            player_id: row.player_id,
            team,
            slot: row.slot,
        })
    }
}

#[derive(Debug, Insertable)]
#[table_name = "team_assignments"]
pub struct AssignmentRowInsertable {
    pub match_date: NaiveDate,
    pub player_id: i32,
    pub team: String,
    pub slot: i32,
}

impl From<&Assignment> for AssignmentRowInsertable {
    fn from(assignment: &Assignment) -> Self {
        AssignmentRowInsertable {
            match_date: assignment.date,
            player_id: assignment.player_id,
            team: assignment.team.to_string(),
            slot: assignment.slot,
        }
    }
}

#[derive(Debug, Queryable)]
pub struct ResultRow {
    pub match_date: NaiveDate,
    pub player_id: i32,
    pub points: i32,
}

impl TryFrom<ResultRow> for MatchResult {
    type Error = StoreError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        let points = Points::try_from(row.points)
            .map_err(|err| StoreError::InvalidRow(err.to_string()))?;
        Ok(MatchResult { date: row.match_date, player_id: row.player_id, points })
    }
}

#[derive(Debug, Insertable)]
#[table_name = "results"]
pub struct ResultRowInsertable {
    pub match_date: NaiveDate,
    pub player_id: i32,
    pub points: i32,
}

impl From<&MatchResult> for ResultRowInsertable {
    fn from(result: &MatchResult) -> Self {
        ResultRowInsertable {
            match_date: result.date,
            player_id: result.player_id,
            points: result.points.value(),
        }
    }
}
