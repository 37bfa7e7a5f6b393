use std::convert::Infallible;
use warp::{Filter, Reply};
use crate::{filters, handlers};
use crate::filters::with;
use crate::err_handler::handle_rejection;
use crate::store::AStore;
use crate::AHandlebars;

pub fn routes(store: AStore, hb: AHandlebars, static_dir: String)
    -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let index_route = warp::path::end()
        .and(warp::get())
        .and_then(handlers::index);

    let health_route = warp::path!("health")
        .and(warp::get())
        .and(with(store.clone()))
        .and_then(handlers::health_handler);

    let players = warp::path!("players");
    let players_route = players
        .and(warp::get())
        .and(with(store.clone()))
        .and(with(hb.clone()))
        .and_then(handlers::get_players)
        .or(players
            .and(warp::post())
            .and(with(store.clone()))
            .and(with(hb.clone()))
            .and(filters::form())
            .and_then(handlers::create_player));

    let player_status_route = warp::path!("players" / i32 / "status")
        .and(warp::post())
        .and(with(store.clone()))
        .and(filters::form())
        .and_then(handlers::set_player_status);

    let teams = warp::path!("teams");
    let teams_route = teams
        .and(warp::get())
        .and(with(store.clone()))
        .and(with(hb.clone()))
        .and(warp::query())
        .and_then(handlers::get_teams)
        .or(teams
            .and(warp::post())
            .and(with(store.clone()))
            .and(with(hb.clone()))
            .and(filters::form_pairs())
            .and_then(handlers::lock_teams));

    let unlock_route = warp::path!("teams" / "unlock")
        .and(warp::post())
        .and(with(store.clone()))
        .and(with(hb.clone()))
        .and(filters::form())
        .and_then(handlers::unlock_teams);

    let standings_route = warp::path!("standings")
        .and(warp::get())
        .and(with(store.clone()))
        .and(with(hb.clone()))
        .and(warp::query())
        .and_then(handlers::get_standings);

    let results_route = warp::path!("results")
        .and(warp::post())
        .and(with(store.clone()))
        .and(with(hb.clone()))
        .and(filters::form_pairs())
        .and_then(handlers::submit_results);

    let statistics_route = warp::path!("statistics")
        .and(warp::get())
        .and(with(store.clone()))
        .and(with(hb.clone()))
        .and_then(handlers::get_statistics);

    let static_route = warp::path("static").and(warp::fs::dir(static_dir));

    let log = warp::log("matchday");

    index_route
        .or(health_route)
        .or(players_route)
        .or(player_status_route)
        .or(teams_route)
        .or(unlock_route)
        .or(standings_route)
        .or(results_route)
        .or(statistics_route)
        .or(static_route)
        .recover(move |err| handle_rejection(err, hb.clone()))
        .with(log)
}
