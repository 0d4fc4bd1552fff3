#[macro_use]
extern crate rocket;

use log::info;
use rocket::serde::json::Json;
use rocket_okapi::{openapi, openapi_get_routes, swagger_ui::*};
use std::env;

mod capture;

/// # Get info
///
/// Returns capture team info
#[openapi(tag = "Capture")]
#[get("/")]
fn index() -> Json<capture::Info> {
    info!("INDEX");
    Json(capture::info())
}

/// # Start game
///
/// Tells the team a game is starting
#[openapi(tag = "Capture")]
#[post("/start", format = "json", data = "<gs>")]
fn start(gs: Json<capture::GameState>) -> Json<String> {
    capture::start(gs.into_inner());
    Json("ok".to_owned())
}

/// # Choose action
///
/// Returns the asked-about agent's action for this turn
#[openapi(tag = "Capture")]
#[post("/move", format = "json", data = "<gs>")]
fn movement(gs: Json<capture::GameState>) -> Json<capture::MoveResponse> {
    Json(capture::make_move(gs.into_inner()))
}

/// # End game
///
/// Tells the team the game is over
#[openapi(tag = "Capture")]
#[post("/end", format = "json", data = "<gs>")]
fn end(gs: Json<capture::GameState>) -> Json<String> {
    capture::end(gs.into_inner());
    Json("ok".to_owned())
}

#[launch]
fn launch() -> _ {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
    info!("LAUNCH");
    rocket::build()
        .mount("/", openapi_get_routes![index, start, movement, end])
        .mount(
            "/docs",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../openapi.json".to_owned(),
                ..Default::default()
            }),
        )
}
