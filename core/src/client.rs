//! Request builders, response parsers, and the blocking client.
//!
//! # Design
//! `RaClient` holds the credentials and a transport and is never mutated
//! after construction. Every endpoint is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; the method named after the endpoint runs one through the
//! transport and the other on the result.
//!
//! The service signals "not found" differently per endpoint (a null title for
//! a game, an empty list for a console's games). Each parser keeps its own
//! endpoint's convention instead of unifying them.

use serde::de::Error as _;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{
    CompletedGame, Console, Game, GameUserInfo, RankAndScore, Record, User, UserSummary,
};

/// Body the service sends for a wrong API key or an unknown username.
pub const INVALID_API_KEY: &str = "Invalid API Key";

pub const DEFAULT_RECENT_GAMES: u32 = 5;
pub const DEFAULT_RECENT_ACHIEVEMENTS: u32 = 10;

const TOP_TEN_USERS: &str = "API_GetTopTenUsers.php";
const GAME: &str = "API_GetGame.php";
const GAME_EXTENDED: &str = "API_GetGameExtended.php";
const CONSOLE_IDS: &str = "API_GetConsoleIDs.php";
const GAME_LIST: &str = "API_GetGameList.php";
const USER_RANK_AND_SCORE: &str = "API_GetUserRankAndScore.php";
const USER_PROGRESS: &str = "API_GetUserProgress.php";
const USER_RECENTLY_PLAYED_GAMES: &str = "API_GetUserRecentlyPlayedGames.php";
const USER_SUMMARY: &str = "API_GetUserSummary.php";
const USER_COMPLETED_GAMES: &str = "API_GetUserCompletedGames.php";

/// Blocking client for the RetroAchievements web API.
#[derive(Debug, Clone)]
pub struct RaClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl RaClient<UreqTransport> {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(username, api_key))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);

        Self { config, transport }
    }
}

impl<T: Transport> RaClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The top ten users by points.
    pub fn top_ten_users(&self) -> Result<Vec<User>, ApiError> {
        let response = self.send(self.build_top_ten_users())?;

        self.parse_top_ten_users(response)
    }

    /// Basic game info, or `None` if the game does not exist.
    pub fn game_info(&self, game_id: u32) -> Result<Option<Game>, ApiError> {
        let response = self.send(self.build_game_info(game_id))?;

        self.parse_game_info(game_id, response)
    }

    /// Full game info including achievements, or `None` if the game does not
    /// exist.
    pub fn game_info_extended(&self, game_id: u32) -> Result<Option<Game>, ApiError> {
        let response = self.send(self.build_game_info_extended(game_id))?;

        self.parse_game_info_extended(game_id, response)
    }

    pub fn console_ids(&self) -> Result<Vec<Console>, ApiError> {
        let response = self.send(self.build_console_ids())?;

        self.parse_console_ids(response)
    }

    /// The games of a console, or `None` if the console does not exist.
    pub fn game_list(&self, console_id: u32) -> Result<Option<Vec<Game>>, ApiError> {
        let response = self.send(self.build_game_list(console_id))?;

        self.parse_game_list(response)
    }

    pub fn user_rank_and_score(&self, username: &str) -> Result<RankAndScore, ApiError> {
        let response = self.send(self.build_user_rank_and_score(username))?;

        self.parse_user_rank_and_score(response)
    }

    /// Progress of a user on several games at once. Unknown games are
    /// reported with all counts at zero.
    pub fn user_progress(
        &self,
        username: &str,
        game_ids: &[u32],
    ) -> Result<Vec<GameUserInfo>, ApiError> {
        let response = self.send(self.build_user_progress(username, game_ids))?;

        self.parse_user_progress(response)
    }

    /// The games a user played last, newest first, each with `user_info` set.
    /// The service caps `limit` at 50; page further with `offset`.
    pub fn user_recently_played_games(
        &self,
        username: &str,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Game>, ApiError> {
        let request = self.build_user_recently_played_games(username, limit, offset);
        let response = self.send(request)?;

        self.parse_user_recently_played_games(response)
    }

    /// See [`DEFAULT_RECENT_GAMES`] and [`DEFAULT_RECENT_ACHIEVEMENTS`] for the
    /// counts the service's own site uses.
    pub fn user_summary(
        &self,
        username: &str,
        recent_games: u32,
        recent_achievements: u32,
    ) -> Result<UserSummary, ApiError> {
        let request = self.build_user_summary(username, recent_games, recent_achievements);
        let response = self.send(request)?;

        self.parse_user_summary(response)
    }

    pub fn user_completed_games(&self, username: &str) -> Result<Vec<CompletedGame>, ApiError> {
        let response = self.send(self.build_user_completed_games(username))?;

        self.parse_user_completed_games(response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let params: Vec<_> = request
            .query
            .iter()
            .filter(|(key, _)| key != "y")
            .map(|(key, value)| format!("{key}={value}"))
            .collect();

        debug!(params = %params.join("&"), "GET {}", request.url);

        self.transport.execute(&request)
    }
}

// Request builders.
impl<T> RaClient<T> {
    fn build(&self, endpoint: &str, params: Vec<(&str, String)>) -> HttpRequest {
        let query = params
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .chain([
                ("z".to_string(), self.config.username.clone()),
                ("y".to_string(), self.config.api_key.clone()),
            ])
            .collect();

        HttpRequest {
            url: format!("{}/{endpoint}", self.config.base_url),
            query,
        }
    }

    pub fn build_top_ten_users(&self) -> HttpRequest {
        self.build(TOP_TEN_USERS, Vec::new())
    }

    pub fn build_game_info(&self, game_id: u32) -> HttpRequest {
        self.build(GAME, vec![("i", game_id.to_string())])
    }

    pub fn build_game_info_extended(&self, game_id: u32) -> HttpRequest {
        self.build(GAME_EXTENDED, vec![("i", game_id.to_string())])
    }

    pub fn build_console_ids(&self) -> HttpRequest {
        self.build(CONSOLE_IDS, Vec::new())
    }

    pub fn build_game_list(&self, console_id: u32) -> HttpRequest {
        self.build(GAME_LIST, vec![("i", console_id.to_string())])
    }

    pub fn build_user_rank_and_score(&self, username: &str) -> HttpRequest {
        self.build(USER_RANK_AND_SCORE, vec![("u", username.to_string())])
    }

    pub fn build_user_progress(&self, username: &str, game_ids: &[u32]) -> HttpRequest {
        let game_ids = game_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        self.build(
            USER_PROGRESS,
            vec![("u", username.to_string()), ("i", game_ids)],
        )
    }

    /// `c` is left out entirely when `limit` is `None` so the service applies
    /// its own default.
    pub fn build_user_recently_played_games(
        &self,
        username: &str,
        limit: Option<u32>,
        offset: u32,
    ) -> HttpRequest {
        let mut params = vec![("u", username.to_string())];

        if let Some(limit) = limit {
            params.push(("c", limit.to_string()));
        }

        params.push(("o", offset.to_string()));

        self.build(USER_RECENTLY_PLAYED_GAMES, params)
    }

    pub fn build_user_summary(
        &self,
        username: &str,
        recent_games: u32,
        recent_achievements: u32,
    ) -> HttpRequest {
        self.build(
            USER_SUMMARY,
            vec![
                ("u", username.to_string()),
                ("g", recent_games.to_string()),
                ("a", recent_achievements.to_string()),
            ],
        )
    }

    pub fn build_user_completed_games(&self, username: &str) -> HttpRequest {
        self.build(USER_COMPLETED_GAMES, vec![("u", username.to_string())])
    }
}

// Response parsers.
impl<T> RaClient<T> {
    pub fn parse_top_ten_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        records(decode(response)?)
    }

    pub fn parse_game_info(
        &self,
        game_id: u32,
        response: HttpResponse,
    ) -> Result<Option<Game>, ApiError> {
        parse_game(game_id, decode(response)?)
    }

    pub fn parse_game_info_extended(
        &self,
        game_id: u32,
        response: HttpResponse,
    ) -> Result<Option<Game>, ApiError> {
        parse_game(game_id, decode(response)?)
    }

    pub fn parse_console_ids(&self, response: HttpResponse) -> Result<Vec<Console>, ApiError> {
        records(decode(response)?)
    }

    /// An unknown console is answered with an empty list.
    pub fn parse_game_list(&self, response: HttpResponse) -> Result<Option<Vec<Game>>, ApiError> {
        let games: Vec<Game> = records(decode(response)?)?;

        Ok((!games.is_empty()).then_some(games))
    }

    pub fn parse_user_rank_and_score(
        &self,
        response: HttpResponse,
    ) -> Result<RankAndScore, ApiError> {
        Ok(RankAndScore::from_raw(decode(response)?)?)
    }

    /// The payload is an object keyed by game id; entries keep that order.
    pub fn parse_user_progress(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<GameUserInfo>, ApiError> {
        let entries: Map<String, Value> = match decode(response)? {
            // PHP encodes an empty map as `[]`
            Value::Array(list) if list.is_empty() => return Ok(Vec::new()),
            value => serde_json::from_value(value)?,
        };

        entries
            .into_iter()
            .map(|(key, entry)| -> Result<GameUserInfo, ApiError> {
                let mut info = GameUserInfo::from_raw(entry)?;

                if info.game_id.is_none() {
                    let game_id = key.parse().map_err(|_| {
                        serde_json::Error::custom(format!("`{key}` is not a game id"))
                    })?;

                    info.game_id = Some(game_id);
                }

                Ok(info)
            })
            .collect()
    }

    pub fn parse_user_recently_played_games(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Game>, ApiError> {
        let entries: Vec<Value> = serde_json::from_value(decode(response)?)?;

        entries
            .into_iter()
            .map(|entry| -> Result<Game, ApiError> {
                let user_info = GameUserInfo::from_raw(entry.clone())?;
                let mut game = Game::from_raw(entry)?;
                game.user_info = Some(user_info);

                Ok(game)
            })
            .collect()
    }

    pub fn parse_user_summary(&self, response: HttpResponse) -> Result<UserSummary, ApiError> {
        Ok(UserSummary::from_raw(decode(response)?)?)
    }

    pub fn parse_user_completed_games(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<CompletedGame>, ApiError> {
        records(decode(response)?)
    }
}

/// Checks for the auth sentinel, then parses the body as JSON.
///
/// The sentinel is checked regardless of the status code; a non-2xx status on
/// its own is not an error since the service is inconsistent about it.
fn decode(response: HttpResponse) -> Result<Value, ApiError> {
    if response.body.trim() == INVALID_API_KEY {
        warn!(status = response.status, "the service rejected the credentials");

        return Err(ApiError::InvalidAuth);
    }

    if !(200..300).contains(&response.status) {
        warn!(status = response.status, "unexpected status code");
    }

    Ok(serde_json::from_str(&response.body)?)
}

fn records<R: Record>(value: Value) -> Result<Vec<R>, ApiError> {
    let entries: Vec<Value> = serde_json::from_value(value)?;

    entries
        .into_iter()
        .map(|entry| R::from_raw(entry).map_err(ApiError::from))
        .collect()
}

/// A null or missing title means the game does not exist. The game id is
/// taken from the request since the basic game info omits it.
fn parse_game(game_id: u32, value: Value) -> Result<Option<Game>, ApiError> {
    if value.get("Title").map_or(true, Value::is_null) {
        return Ok(None);
    }

    let mut game = Game::from_raw(value)?;
    game.game_id = Some(i64::from(game_id));

    Ok(Some(game))
}
