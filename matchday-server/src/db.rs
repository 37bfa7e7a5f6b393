use tokio_diesel::{AsyncConnection, AsyncRunQueryDsl};
use diesel::prelude::*;
use diesel::pg::PgConnection;
use diesel::r2d2::{Pool, ConnectionManager};
use async_trait::async_trait;
use chrono::NaiveDate;
use matchday::player::Player;
use matchday::results::MatchResult;
use matchday::team::Assignment;
use std::convert::TryFrom;
use crate::schema::*;
use crate::model::*;
use crate::store::{Store, StoreResult};

pub type DBPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_db_pool(db_url: &str, max_size: u32) -> Result<DBPool, r2d2::Error> {
    Pool::builder()
        .max_size(max_size)
        .build(ConnectionManager::new(db_url))
}

/// `Store` backed by PostgreSQL. Each call checks a connection out of the
/// pool and hands it back once the query (or transaction) finishes.
#[derive(Clone)]
pub struct PgStore {
    db: DBPool,
}

impl PgStore {
    pub fn new(db: DBPool) -> PgStore {
        PgStore { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        self.db.run(|conn| diesel::sql_query("SELECT 1").execute(conn)).await?;
        Ok(())
    }

    async fn players(&self) -> StoreResult<Vec<Player>> {
        let rows = players::table
            .order(players::id.asc())
            .load_async::<PlayerRow>(&self.db)
            .await?;
        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn insert_player(&self, name: String) -> StoreResult<Player> {
        let row = diesel::insert_into(players::table)
            .values(PlayerRowInsertable { name, active: true })
            .get_result_async::<PlayerRow>(&self.db)
            .await?;
        Ok(row.into())
    }

    async fn set_player_active(&self, id: i32, active: bool) -> StoreResult<Option<Player>> {
        let row = self.db.run(move |conn| {
            diesel::update(players::table.find(id))
                .set(players::active.eq(active))
                .get_result::<PlayerRow>(conn)
                .optional()
        }).await?;
        Ok(row.map(Player::from))
    }

    async fn assignments(&self) -> StoreResult<Vec<Assignment>> {
        team_assignments::table
            .order((team_assignments::match_date.asc(), team_assignments::team.asc(), team_assignments::slot.asc()))
            .load_async::<AssignmentRow>(&self.db)
            .await?
            .into_iter()
            .map(Assignment::try_from)
            .collect()
    }

    async fn roster(&self, date: NaiveDate) -> StoreResult<Vec<Assignment>> {
        team_assignments::table
            .filter(team_assignments::match_date.eq(date))
            .order((team_assignments::team.asc(), team_assignments::slot.asc()))
            .load_async::<AssignmentRow>(&self.db)
            .await?
            .into_iter()
            .map(Assignment::try_from)
            .collect()
    }

    async fn replace_roster(&self, date: NaiveDate, assignments: Vec<Assignment>) -> StoreResult<()> {
        let rows: Vec<AssignmentRowInsertable> = assignments.iter().map(AssignmentRowInsertable::from).collect();
        self.db.transaction(move |conn| {
            diesel::delete(team_assignments::table.filter(team_assignments::match_date.eq(date)))
                .execute(conn)?;
            diesel::insert_into(team_assignments::table)
                .values(&rows)
                .execute(conn)
        }).await?;
        Ok(())
    }

    async fn clear_roster(&self, date: NaiveDate) -> StoreResult<usize> {
        let deleted = diesel::delete(team_assignments::table.filter(team_assignments::match_date.eq(date)))
            .execute_async(&self.db)
            .await?;
        Ok(deleted)
    }

    async fn results(&self) -> StoreResult<Vec<MatchResult>> {
        results::table
            .order((results::match_date.asc(), results::player_id.asc()))
            .load_async::<ResultRow>(&self.db)
            .await?
            .into_iter()
            .map(MatchResult::try_from)
            .collect()
    }

    async fn replace_results(&self, date: NaiveDate, submitted: Vec<MatchResult>) -> StoreResult<()> {
        let rows: Vec<ResultRowInsertable> = submitted.iter().map(ResultRowInsertable::from).collect();
        self.db.transaction(move |conn| {
            diesel::delete(results::table.filter(results::match_date.eq(date)))
                .execute(conn)?;
            diesel::insert_into(results::table)
                .values(&rows)
                .execute(conn)
        }).await?;
        Ok(())
    }
}
