//! Blocking client for the RetroAchievements web API.
//!
//! # Overview
//! Every endpoint is a single authenticated GET against
//! `https://retroachievements.org/API/<endpoint>.php` whose JSON answer is
//! turned into typed records (`User`, `Game`, `Achievement`, ...). Each record
//! keeps the JSON fragment it was built from in `raw`.
//!
//! # Design
//! - `RaClient` holds only credentials, settings and a transport; calls are
//!   independent of each other.
//! - Each endpoint is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), so both halves can be tested
//!   without a network. The endpoint-named method does the round-trip through
//!   a `Transport`, by default `UreqTransport`.
//! - The service's loosely-typed fields (numbers as strings, relative image
//!   paths, `YYYY-MM-DD HH:MM:SS` timestamps) are normalized by `coerce`.
//!
//! ```no_run
//! use ra_core::{ApiError, RaClient};
//!
//! fn main() -> Result<(), ApiError> {
//!     let client = RaClient::new("username", "api-key");
//!
//!     if let Some(game) = client.game_info_extended(1)? {
//!         println!("{:?} has {:?} achievements", game.title, game.num_achievements);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod coerce;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::{RaClient, DEFAULT_RECENT_ACHIEVEMENTS, DEFAULT_RECENT_GAMES, INVALID_API_KEY};
pub use coerce::CoerceError;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{
    Achievement, CompletedGame, Console, Game, GameUserInfo, RankAndScore, Record, User,
    UserSummary,
};
