//! Every client operation against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in a background thread, then calls
//! each endpoint through `RaClient` and its default `ureq` transport, so the
//! query strings, the auth sentinel and the payload parsing are exercised over
//! real HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use mock_server::{MOCK_API_KEY, MOCK_USERNAME};
use ra_core::{ApiError, ClientConfig, RaClient, DEFAULT_RECENT_ACHIEVEMENTS, DEFAULT_RECENT_GAMES};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr, username: &str, api_key: &str) -> RaClient {
    let config = ClientConfig::new(username, api_key)
        .with_base_url(&format!("http://{addr}/API/"))
        .with_timeout(Duration::from_secs(5));

    RaClient::with_config(config)
}

#[test]
fn all_endpoints() {
    let addr = start_server();
    let client = client_for(addr, MOCK_USERNAME, MOCK_API_KEY);

    // Step 1: top ten users.
    let users = client.top_ten_users().unwrap();
    assert_eq!(users.len(), 10);
    assert_eq!(users[0].username, "MaxMilyin");
    assert_eq!(users[0].points, Some(346_289));
    assert_eq!(users[0].retro_points, Some(995_092));

    // Step 2: basic game info, found and not found.
    let game = client.game_info(1).unwrap().expect("game 1 exists");
    assert_eq!(game.game_id, Some(1));
    assert_eq!(game.console_name.as_deref(), Some("Mega Drive"));
    assert!(game.achievements.is_none());
    assert!(client.game_info(424_242).unwrap().is_none());

    // Step 3: extended game info.
    let game = client.game_info_extended(1).unwrap().expect("game 1 exists");
    let achievements = game.achievements.expect("extended info has achievements");
    assert_eq!(achievements.len(), 3);
    assert_eq!(achievements[0].title.as_deref(), Some("That Was Easy"));
    assert!(client.game_info_extended(424_242).unwrap().is_none());

    // Step 4: consoles and their games.
    let consoles = client.console_ids().unwrap();
    assert_eq!(consoles.len(), 5);
    assert_eq!(consoles[2].id, Some(3));
    assert_eq!(consoles[2].name.as_deref(), Some("SNES"));

    let games = client.game_list(1).unwrap().expect("console 1 exists");
    assert_eq!(games.len(), 3);
    assert_eq!(
        games[1].image_icon.as_deref(),
        Some("https://retroachievements.org/Images/065427.png")
    );
    assert!(client.game_list(99).unwrap().is_none());

    // Step 5: rank and score.
    let rank = client.user_rank_and_score(MOCK_USERNAME).unwrap();
    assert_eq!(rank.score, Some(11_382));
    assert_eq!(rank.total_ranked, Some(43_560));

    let unknown = client.user_rank_and_score("nobody").unwrap();
    assert_eq!(unknown.score, None);
    assert_eq!(unknown.rank, Some(1));

    // Step 6: progress for a batch of games.
    let progress = client.user_progress(MOCK_USERNAME, &[1, 3, 8]).unwrap();
    assert_eq!(progress.len(), 3);
    let unknown_game = progress.iter().find(|p| p.game_id == Some(8)).unwrap();
    assert_eq!(unknown_game.num_possible_achievements, Some(0));

    // Step 7: recently played games, paged.
    let recent = client
        .user_recently_played_games(MOCK_USERNAME, None, 0)
        .unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|game| game.user_info.is_some()));

    let page = client
        .user_recently_played_games(MOCK_USERNAME, Some(1), 1)
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].game_id, Some(1));

    assert!(client
        .user_recently_played_games("nobody", None, 0)
        .unwrap()
        .is_empty());

    // Step 8: summary with nested last game.
    let summary = client
        .user_summary(MOCK_USERNAME, DEFAULT_RECENT_GAMES, DEFAULT_RECENT_ACHIEVEMENTS)
        .unwrap();
    assert_eq!(summary.last_game_id, Some(3));
    assert_eq!(
        summary.last_game.and_then(|game| game.title).as_deref(),
        Some("Sonic the Hedgehog 2")
    );

    let unknown = client.user_summary("nobody", 5, 10).unwrap();
    assert!(unknown.last_game.is_none());
    assert_eq!(unknown.total_points, None);

    // Step 9: completed games.
    let completed = client.user_completed_games(MOCK_USERNAME).unwrap();
    assert_eq!(completed.len(), 2);
    assert_eq!(completed[0].pct_won, Some(1.0));
    assert_eq!(completed[1].hardcore_mode, Some(true));
}

#[test]
fn wrong_credentials_fail_every_endpoint() {
    let addr = start_server();
    let client = client_for(addr, MOCK_USERNAME, "not-the-key");

    assert!(matches!(client.top_ten_users(), Err(ApiError::InvalidAuth)));
    assert!(matches!(client.game_info(1), Err(ApiError::InvalidAuth)));
    assert!(matches!(client.game_info_extended(1), Err(ApiError::InvalidAuth)));
    assert!(matches!(client.console_ids(), Err(ApiError::InvalidAuth)));
    assert!(matches!(client.game_list(1), Err(ApiError::InvalidAuth)));
    assert!(matches!(
        client.user_rank_and_score(MOCK_USERNAME),
        Err(ApiError::InvalidAuth)
    ));
    assert!(matches!(
        client.user_progress(MOCK_USERNAME, &[1]),
        Err(ApiError::InvalidAuth)
    ));
    assert!(matches!(
        client.user_recently_played_games(MOCK_USERNAME, Some(10), 0),
        Err(ApiError::InvalidAuth)
    ));
    assert!(matches!(
        client.user_summary(MOCK_USERNAME, 5, 10),
        Err(ApiError::InvalidAuth)
    ));
    assert!(matches!(
        client.user_completed_games(MOCK_USERNAME),
        Err(ApiError::InvalidAuth)
    ));
}

#[test]
fn unreachable_host_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client_for(addr, MOCK_USERNAME, MOCK_API_KEY);

    let err = client.console_ids().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
