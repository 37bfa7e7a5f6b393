use tokio;
use std::sync::Arc;
use handlebars::Handlebars;
#[macro_use] extern crate diesel;
use dotenv::dotenv;
use pretty_env_logger;
use log::{error, info};
use crate::config::Config;
use crate::db::PgStore;
use crate::store::AStore;

mod config;
mod db;
mod err_handler;
mod filters;
mod handlers;
mod model;
mod routes;
mod schema;
mod store;

pub type AHandlebars = Arc<Handlebars<'static>>;

pub const TEMPLATES: &[&str] = &[
    "players", "teams", "standings", "statistics", "error",
];

fn initialize_handlebars(dir: &str, expected_templates: &[&str]) -> Result<Handlebars<'static>, String> {
    let mut hb = Handlebars::new();
    hb.register_templates_directory(".hbs", dir)
        .map_err(|err| format!("failed to open handlebars templates in {}: {}", dir, err))?;
    hb.set_strict_mode(true);
    for name in expected_templates {
        if hb.get_template(name).is_none() {
            return Err(format!("Couldn't find template \"{}.hbs\" in {}", name, dir));
        }
    }
    Ok(hb)
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("bad configuration: {}", err);
            std::process::exit(1);
        },
    };
    let hb = match initialize_handlebars(&config.template_dir, TEMPLATES) {
        Ok(hb) => Arc::new(hb),
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        },
    };
    let db_pool = match db::create_db_pool(&config.database_url, config.pool_size) {
        Ok(pool) => pool,
        Err(err) => {
            error!("couldn't connect to the database: {}", err);
            std::process::exit(1);
        },
    };
    let store: AStore = Arc::new(PgStore::new(db_pool));

    let routes = routes::routes(store, hb, config.static_dir.clone());

    info!("listening on http://{}", config.addr);
    warp::serve(routes).run(config.addr).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::store::memory::MemoryStore;
    use matchday::team::TeamLabel;
    use std::collections::HashSet;
    use warp::http::StatusCode;

    fn templates() -> AHandlebars {
        Arc::new(initialize_handlebars("./templates", TEMPLATES).unwrap())
    }

    fn app(store: Arc<MemoryStore>)
        -> impl warp::Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        routes::routes(store, templates(), "./static".into())
    }

    fn roster_of(n: usize) -> Arc<MemoryStore> {
        let names: Vec<String> = (1..=n).map(|i| format!("Player {}", i)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        Arc::new(MemoryStore::with_players(&names))
    }

    fn body_of<B: AsRef<[u8]>>(res: &warp::http::Response<B>) -> String {
        String::from_utf8_lossy(res.body().as_ref()).into_owned()
    }

    fn lock_form(date: &str, ids: impl IntoIterator<Item = i32>) -> String {
        let mut form = format!("date={}", date);
        for id in ids {
            form.push_str(&format!("&player_id={}", id));
        }
        form
    }

    fn post(path: &str, body: String) -> warp::test::RequestBuilder {
        warp::test::request()
            .method("POST")
            .path(path)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body)
    }

    fn get(path: &str) -> warp::test::RequestBuilder {
        warp::test::request().path(path)
    }

    #[test]
    fn test_templates_load() {
        let hb = templates();
        for name in TEMPLATES {
            assert!(hb.get_template(name).is_some());
        }
        assert!(initialize_handlebars("./no-such-dir", TEMPLATES).is_err());
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let store = roster_of(0);
        let app = app(store.clone());

        let res = get("/").reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/players");

        assert_eq!(get("/health").reply(&app).await.status(), StatusCode::OK);
        store.set_failing(true);
        assert_eq!(get("/health").reply(&app).await.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(get("/nowhere").reply(&app).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_players() {
        let store = Arc::new(MemoryStore::with_players(&["zed", "Amy"]));
        let app = app(store.clone());

        let res = get("/players").reply(&app).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_of(&res);
        let amy = body.find("Amy").unwrap();
        let zed = body.find("zed").unwrap();
        assert!(amy < zed);

        let res = post("/players", "name=++Bea++".into()).reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let players = store.players().await.unwrap();
        assert_eq!(players.len(), 3);
        assert!(players.iter().any(|p| p.name == "Bea" && p.is_active()));

        let res = post("/players", "name=+++".into()).reply(&app).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_of(&res).contains("can&#x27;t be empty") || body_of(&res).contains("can't be empty"));

        let res = post("/players", "name=AMY".into()).reply(&app).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.players().await.unwrap().len(), 3);

        let res = post("/players", "nom=Cy".into()).reply(&app).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_player_status() {
        let store = roster_of(2);
        let app = app(store.clone());

        let res = post("/players/1/status", "active=false".into()).reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let players = store.players().await.unwrap();
        assert!(!players.iter().find(|p| p.id == 1).unwrap().is_active());

        let res = post("/players/1/status", "active=true".into()).reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(store.players().await.unwrap().iter().all(|p| p.is_active()));

        let res = post("/players/99/status", "active=false".into()).reply(&app).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_lock_teams() {
        let store = roster_of(14);
        let app = app(store.clone());
        let date = matchday::test_utils::date(2026, 10, 19);

        let res = post("/teams", lock_form("2026-10-19", 1..=12)).reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/teams?date=2026-10-19");
        let roster = store.roster(date).await.unwrap();
        assert_eq!(roster.len(), 12);
        let orange = roster.iter().filter(|a| a.team == TeamLabel::Orange).count();
        assert_eq!(orange, 6);
        let ids: HashSet<i32> = roster.iter().map(|a| a.player_id).collect();
        assert_eq!(ids, (1..=12).collect());

        let res = get("/teams?date=2026-10-19").reply(&app).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_of(&res).contains("Orange"));

        // locking again replaces the previous roster
        let res = post("/teams", lock_form("2026-10-19", 5..=14)).reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let roster = store.roster(date).await.unwrap();
        assert_eq!(roster.len(), 10);
        let ids: HashSet<i32> = roster.iter().map(|a| a.player_id).collect();
        assert_eq!(ids, (5..=14).collect());
    }

    #[tokio::test]
    async fn test_lock_teams_rejected() {
        let store = roster_of(12);
        let app = app(store.clone());
        let date = matchday::test_utils::date(2026, 10, 19);

        let res = post("/teams", lock_form("2026-10-19", 1..=11)).reply(&app).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_of(&res).contains("got 11"));
        assert!(store.roster(date).await.unwrap().is_empty());

        store.set_player_active(3, false).await.unwrap();
        let res = post("/teams", lock_form("2026-10-19", 1..=10)).reply(&app).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(store.roster(date).await.unwrap().is_empty());

        let res = post("/teams", lock_form("not-a-date", 4..=13)).reply(&app).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unlock_teams() {
        let store = roster_of(10);
        let app = app(store.clone());
        let date = matchday::test_utils::date(2026, 10, 19);

        post("/teams", lock_form("2026-10-19", 1..=10)).reply(&app).await;
        assert_eq!(store.roster(date).await.unwrap().len(), 10);

        let res = post("/teams/unlock", "date=2026-10-19".into()).reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(store.roster(date).await.unwrap().is_empty());
    }

    fn results_form(date: &str, points: &[(i32, i32)]) -> String {
        let mut form = format!("date={}", date);
        for (id, p) in points {
            form.push_str(&format!("&points_{}={}", id, p));
        }
        form
    }

    #[tokio::test]
    async fn test_submit_results() {
        let store = roster_of(13);
        let app = app(store.clone());
        let date = matchday::test_utils::date(2026, 10, 19);

        // 6 wins and 6 losses add up to 18
        let points: Vec<(i32, i32)> = (1..=12).map(|id| (id, if id <= 6 { 3 } else { 0 })).collect();
        let mut form = results_form("2026-10-19", &points);
        form.push_str("&points_13=");
        let res = post("/results", form).reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/standings?date=2026-10-19");
        let results = store.results().await.unwrap();
        assert_eq!(results.len(), 12);
        assert!(results.iter().all(|r| r.date == date));

        // a draw for everyone replaces the earlier results
        let points: Vec<(i32, i32)> = (1..=12).map(|id| (id, 1)).collect();
        let res = post("/results", results_form("2026-10-19", &points)).reply(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let results = store.results().await.unwrap();
        assert_eq!(results.len(), 12);
        assert!(results.iter().all(|r| r.points.value() == 1));

        let res = get("/standings?date=2026-10-19").reply(&app).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_of(&res).contains("Player 1"));
    }

    #[tokio::test]
    async fn test_submit_results_rejected() {
        let store = roster_of(12);
        let app = app(store.clone());

        let mut points: Vec<(i32, i32)> = (1..=12).map(|id| (id, if id <= 6 { 3 } else { 0 })).collect();
        points[0].1 = 1;
        let res = post("/results", results_form("2026-10-19", &points)).reply(&app).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_of(&res).contains("12 players must have 12 or 18 total points (current: 16)"));
        assert!(store.results().await.unwrap().is_empty());

        let points: Vec<(i32, i32)> = (1..=12).map(|id| (id, 2)).collect();
        let res = post("/results", results_form("2026-10-19", &points)).reply(&app).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(store.results().await.unwrap().is_empty());

        let points: Vec<(i32, i32)> = (1..=11).map(|id| (id, 1)).collect();
        let res = post("/results", results_form("2026-10-19", &points)).reply(&app).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(store.results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_statistics() {
        let store = roster_of(10);
        let app = app(store.clone());

        let res = get("/statistics").reply(&app).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_of(&res).contains("No matches"));

        post("/teams", lock_form("2026-10-19", 1..=10)).reply(&app).await;
        let points: Vec<(i32, i32)> = (1..=10).map(|id| (id, 1)).collect();
        post("/results", results_form("2026-10-19", &points)).reply(&app).await;

        let res = get("/statistics").reply(&app).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_of(&res);
        assert!(body.contains("Top Performer"));
        assert!(!body.contains("No matches"));
    }

    #[tokio::test]
    async fn test_store_failure() {
        let store = roster_of(10);
        let app = app(store.clone());
        store.set_failing(true);
        let requests = vec![
            get("/players"),
            get("/teams?date=2026-10-19"),
            post("/teams", lock_form("2026-10-19", 1..=10)),
            get("/standings"),
            post("/results", "date=2026-10-19&points_1=1".into()),
            get("/statistics"),
        ];
        for request in requests {
            let res = request.reply(&app).await;
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert!(body_of(&res).contains("Something went wrong"));
        }
    }

    #[tokio::test]
    async fn test_form_without_length() {
        let store = roster_of(10);
        let app = app(store.clone());
        let res = warp::test::request()
            .method("POST")
            .path("/results")
            .header("content-type", "application/x-www-form-urlencoded")
            .reply(&app)
            .await;
        assert_eq!(res.status(), StatusCode::LENGTH_REQUIRED);
        assert!(store.results().await.unwrap().is_empty());
    }
}
