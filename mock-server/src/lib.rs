//! A stand-in for the RetroAchievements web API, serving canned payloads.
//!
//! Every endpoint lives under `/API/<endpoint>.php`, requires the `z`/`y`
//! credentials below, and answers a plain `Invalid API Key` body with status
//! 200 otherwise, like the real service. Game 1 on console 1 and the user
//! `MockUser` exist; everything else gets the service's not-found shapes.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub const MOCK_USERNAME: &str = "MockUser";
pub const MOCK_API_KEY: &str = "mock-api-key";

pub const KNOWN_GAME_ID: &str = "1";
pub const KNOWN_CONSOLE_ID: &str = "1";

const TOP_TEN_USERS: &str = include_str!("../../test-vectors/payloads/top_ten_users.json");
const GAME: &str = include_str!("../../test-vectors/payloads/game.json");
const GAME_NOT_FOUND: &str = include_str!("../../test-vectors/payloads/game_not_found.json");
const GAME_EXTENDED: &str = include_str!("../../test-vectors/payloads/game_extended.json");
const CONSOLE_IDS: &str = include_str!("../../test-vectors/payloads/console_ids.json");
const GAME_LIST: &str = include_str!("../../test-vectors/payloads/game_list.json");
const USER_RANK_AND_SCORE: &str =
    include_str!("../../test-vectors/payloads/user_rank_and_score.json");
const USER_PROGRESS: &str = include_str!("../../test-vectors/payloads/user_progress.json");
const USER_RECENTLY_PLAYED_GAMES: &str =
    include_str!("../../test-vectors/payloads/user_recently_played_games.json");
const USER_SUMMARY: &str = include_str!("../../test-vectors/payloads/user_summary.json");
const USER_COMPLETED_GAMES: &str =
    include_str!("../../test-vectors/payloads/user_completed_games.json");

type Params = HashMap<String, String>;

pub fn app() -> Router {
    Router::new()
        .route("/API/{endpoint}", get(dispatch))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn dispatch(Path(endpoint): Path<String>, Query(params): Query<Params>) -> Response {
    let authorized =
        param(&params, "z") == Some(MOCK_USERNAME) && param(&params, "y") == Some(MOCK_API_KEY);

    if !authorized {
        tracing::debug!("[{endpoint}] rejecting credentials");
        return "Invalid API Key".into_response();
    }

    let query = |key| param(&params, key);
    let known_user = query("u") == Some(MOCK_USERNAME);

    let body = match endpoint.as_str() {
        "API_GetTopTenUsers.php" => TOP_TEN_USERS.to_string(),
        "API_GetGame.php" if query("i") == Some(KNOWN_GAME_ID) => GAME.to_string(),
        "API_GetGame.php" => GAME_NOT_FOUND.to_string(),
        "API_GetGameExtended.php" if query("i") == Some(KNOWN_GAME_ID) => GAME_EXTENDED.to_string(),
        "API_GetGameExtended.php" => GAME_NOT_FOUND.to_string(),
        "API_GetConsoleIDs.php" => CONSOLE_IDS.to_string(),
        "API_GetGameList.php" if query("i") == Some(KNOWN_CONSOLE_ID) => GAME_LIST.to_string(),
        "API_GetGameList.php" => "[]".to_string(),
        "API_GetUserRankAndScore.php" if known_user => USER_RANK_AND_SCORE.to_string(),
        "API_GetUserRankAndScore.php" => {
            json!({ "Score": null, "Rank": 1, "TotalRanked": "43560" }).to_string()
        }
        "API_GetUserProgress.php" => user_progress(query("i").unwrap_or_default()).to_string(),
        "API_GetUserRecentlyPlayedGames.php" if known_user => {
            recently_played(query("c"), query("o")).to_string()
        }
        "API_GetUserRecentlyPlayedGames.php" => "[]".to_string(),
        "API_GetUserSummary.php" if known_user => USER_SUMMARY.to_string(),
        "API_GetUserSummary.php" => json!({
            "RecentlyPlayed": [],
            "MemberSince": null,
            "LastGameID": null,
            "LastGame": null,
            "TotalPoints": null,
            "Status": "Offline"
        })
        .to_string(),
        "API_GetUserCompletedGames.php" if known_user => USER_COMPLETED_GAMES.to_string(),
        "API_GetUserCompletedGames.php" => "[]".to_string(),
        _ => {
            tracing::debug!("[{endpoint}] unknown endpoint");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    ([(CONTENT_TYPE, "application/json")], body).into_response()
}

fn param<'p>(params: &'p Params, key: &str) -> Option<&'p str> {
    params.get(key).map(String::as_str)
}

/// Known games get their fixture entry, every other id gets all zeros.
fn user_progress(game_ids: &str) -> Value {
    let fixture: Map<String, Value> =
        serde_json::from_str(USER_PROGRESS).expect("fixture is valid JSON");

    let zeros = json!({
        "NumPossibleAchievements": 0,
        "PossibleScore": 0,
        "NumAchieved": 0,
        "ScoreAchieved": 0,
        "NumAchievedHardcore": 0,
        "ScoreAchievedHardcore": 0
    });

    let progress: Map<String, Value> = game_ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            let entry = fixture.get(id).cloned().unwrap_or_else(|| zeros.clone());

            (id.to_string(), entry)
        })
        .collect();

    if progress.is_empty() {
        Value::Array(Vec::new())
    } else {
        Value::Object(progress)
    }
}

fn recently_played(limit: Option<&str>, offset: Option<&str>) -> Value {
    let games: Vec<Value> =
        serde_json::from_str(USER_RECENTLY_PLAYED_GAMES).expect("fixture is valid JSON");

    let offset = offset.and_then(|o| o.parse::<usize>().ok()).unwrap_or(0);
    let limit = limit.and_then(|c| c.parse::<usize>().ok()).unwrap_or(10).min(50);

    Value::Array(games.into_iter().skip(offset).take(limit).collect())
}
