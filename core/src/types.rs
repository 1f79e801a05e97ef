//! Records built from the service's JSON payloads.
//!
//! # Design
//! Field names, optionality and value types are dictated by the remote
//! service, which documents none of them. Every normalized field is therefore
//! optional and every record keeps the fragment it was built from in `raw`, so
//! callers can reach fields this crate does not model. Nested records (a
//! game's achievements, a summary's last game) keep their own fragment.
//!
//! Records are only ever created through [`Record::from_raw`]; the derived
//! `Deserialize` impls alone would leave `raw` empty.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::PrimitiveDateTime;

use crate::coerce::{
    de_datetime, de_flag, de_float, de_image_url, de_int, de_list, de_record, de_text,
};

/// A record that can be built from, and keeps, a raw JSON fragment.
pub trait Record: Sized {
    fn from_raw(raw: Value) -> Result<Self, serde_json::Error>;
}

macro_rules! record {
    ($($ty:ty,)*) => {
        $(
            impl Record for $ty {
                fn from_raw(raw: Value) -> Result<Self, serde_json::Error> {
                    let mut record = <$ty>::deserialize(&raw)?;
                    record.raw = raw;

                    Ok(record)
                }
            }
        )*
    };
}

record! {
    User,
    Achievement,
    GameUserInfo,
    UserSummary,
    Console,
    RankAndScore,
    CompletedGame,
}

/// An entry of the top-ten ranking. The service keys its fields `"1"`, `"2"`
/// and `"3"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    #[serde(rename = "1")]
    pub username: String,
    #[serde(rename = "2", default, deserialize_with = "de_int")]
    pub points: Option<i64>,
    #[serde(rename = "3", default, deserialize_with = "de_int")]
    pub retro_points: Option<i64>,
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Achievement {
    #[serde(rename = "ID", default, deserialize_with = "de_int")]
    pub id: Option<i64>,
    #[serde(rename = "NumAwarded", default, deserialize_with = "de_int")]
    pub num_awarded: Option<i64>,
    #[serde(rename = "NumAwardedHardcore", default, deserialize_with = "de_int")]
    pub num_awarded_hardcore: Option<i64>,
    #[serde(rename = "Title", default, deserialize_with = "de_text")]
    pub title: Option<String>,
    #[serde(rename = "Description", default, deserialize_with = "de_text")]
    pub description: Option<String>,
    #[serde(rename = "Points", default, deserialize_with = "de_int")]
    pub points: Option<i64>,
    #[serde(rename = "TrueRatio", default, deserialize_with = "de_int")]
    pub true_ratio: Option<i64>,
    #[serde(rename = "Author", default, deserialize_with = "de_text")]
    pub author: Option<String>,
    #[serde(rename = "DateModified", default, deserialize_with = "de_datetime")]
    pub date_modified: Option<PrimitiveDateTime>,
    #[serde(rename = "DateCreated", default, deserialize_with = "de_datetime")]
    pub date_created: Option<PrimitiveDateTime>,
    #[serde(rename = "BadgeName", default, deserialize_with = "de_text")]
    pub badge_name: Option<String>,
    #[serde(rename = "DisplayOrder", default, deserialize_with = "de_int")]
    pub display_order: Option<i64>,
    #[serde(rename = "MemAddr", default, deserialize_with = "de_text")]
    pub mem_addr: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

/// A game as reported by any of the game-returning endpoints.
///
/// Which fields are filled depends on the endpoint: the console game list and
/// recently-played games only carry identifiers, titles and the icon, while
/// the extended game info also carries `achievements` and the player counts.
/// `user_info` is only set for recently-played games.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Game {
    /// `ID` or, failing that, `GameID`.
    #[serde(rename = "ID", default, deserialize_with = "de_int")]
    pub game_id: Option<i64>,
    #[serde(rename = "GameID", default, deserialize_with = "de_int")]
    listed_game_id: Option<i64>,
    #[serde(rename = "Title", default, deserialize_with = "de_text")]
    pub title: Option<String>,
    #[serde(rename = "ForumTopicID", default, deserialize_with = "de_int")]
    pub forum_topic_id: Option<i64>,
    #[serde(rename = "ConsoleID", default, deserialize_with = "de_int")]
    pub console_id: Option<i64>,
    #[serde(rename = "ConsoleName", default, deserialize_with = "de_text")]
    pub console_name: Option<String>,
    #[serde(rename = "Flags", default, deserialize_with = "de_int")]
    pub flags: Option<i64>,
    #[serde(rename = "ImageIcon", default, deserialize_with = "de_image_url")]
    pub image_icon: Option<String>,
    #[serde(rename = "ImageTitle", default, deserialize_with = "de_image_url")]
    pub image_title: Option<String>,
    #[serde(rename = "ImageIngame", default, deserialize_with = "de_image_url")]
    pub image_in_game: Option<String>,
    #[serde(rename = "ImageBoxArt", default, deserialize_with = "de_image_url")]
    pub image_box_art: Option<String>,
    #[serde(rename = "Publisher", default, deserialize_with = "de_text")]
    pub publisher: Option<String>,
    #[serde(rename = "Developer", default, deserialize_with = "de_text")]
    pub developer: Option<String>,
    #[serde(rename = "Genre", default, deserialize_with = "de_text")]
    pub genre: Option<String>,
    /// Free-form; the service mixes full dates, years and prose.
    #[serde(rename = "Released", default, deserialize_with = "de_text")]
    pub release_date: Option<String>,
    #[serde(rename = "Achievements", default, deserialize_with = "de_achievements")]
    pub achievements: Option<Vec<Achievement>>,
    #[serde(rename = "IsFinal", default, deserialize_with = "de_flag")]
    pub is_final: Option<bool>,
    #[serde(rename = "NumAchievements", default, deserialize_with = "de_int")]
    pub num_achievements: Option<i64>,
    #[serde(rename = "NumDistinctPlayersCasual", default, deserialize_with = "de_int")]
    pub num_distinct_players_casual: Option<i64>,
    #[serde(rename = "NumDistinctPlayersHardcore", default, deserialize_with = "de_int")]
    pub num_distinct_players_hardcore: Option<i64>,
    #[serde(rename = "RichPresencePatch", default, deserialize_with = "de_text")]
    pub rich_presence_patch: Option<String>,
    #[serde(skip)]
    pub user_info: Option<GameUserInfo>,
    #[serde(skip)]
    pub raw: Value,
}

impl Record for Game {
    fn from_raw(raw: Value) -> Result<Self, serde_json::Error> {
        let mut game = Game::deserialize(&raw)?;
        game.game_id = game.game_id.or(game.listed_game_id.take());
        game.raw = raw;

        Ok(game)
    }
}

/// A user's progress on one game.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameUserInfo {
    #[serde(rename = "GameID", default, deserialize_with = "de_int")]
    pub game_id: Option<i64>,
    #[serde(rename = "NumPossibleAchievements", default, deserialize_with = "de_int")]
    pub num_possible_achievements: Option<i64>,
    #[serde(rename = "PossibleScore", default, deserialize_with = "de_int")]
    pub possible_score: Option<i64>,
    #[serde(rename = "NumAchieved", default, deserialize_with = "de_int")]
    pub num_achieved: Option<i64>,
    #[serde(rename = "ScoreAchieved", default, deserialize_with = "de_int")]
    pub score_achieved: Option<i64>,
    #[serde(rename = "NumAchievedHardcore", default, deserialize_with = "de_int")]
    pub num_achieved_hardcore: Option<i64>,
    #[serde(rename = "ScoreAchievedHardcore", default, deserialize_with = "de_int")]
    pub score_achieved_hardcore: Option<i64>,
    #[serde(rename = "LastPlayed", default, deserialize_with = "de_datetime")]
    pub last_played: Option<PrimitiveDateTime>,
    #[serde(rename = "MyVote", default, deserialize_with = "de_int")]
    pub my_vote: Option<i64>,
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserSummary {
    /// Kept as the service sends them.
    #[serde(rename = "RecentlyPlayed", default, deserialize_with = "de_list")]
    pub recently_played: Vec<Value>,
    #[serde(rename = "RichPresenceMsg", default, deserialize_with = "de_text")]
    pub rich_presence_msg: Option<String>,
    #[serde(rename = "MemberSince", default, deserialize_with = "de_datetime")]
    pub member_since: Option<PrimitiveDateTime>,
    #[serde(rename = "LastGameID", default, deserialize_with = "de_int")]
    pub last_game_id: Option<i64>,
    #[serde(rename = "LastGame", default, deserialize_with = "de_record")]
    pub last_game: Option<Game>,
    #[serde(rename = "ContribCount", default, deserialize_with = "de_int")]
    pub contrib_count: Option<i64>,
    #[serde(rename = "ContribYield", default, deserialize_with = "de_int")]
    pub contrib_yield: Option<i64>,
    #[serde(rename = "TotalPoints", default, deserialize_with = "de_int")]
    pub total_points: Option<i64>,
    #[serde(rename = "TotalTruePoints", default, deserialize_with = "de_int")]
    pub total_true_points: Option<i64>,
    #[serde(rename = "Permissions", default, deserialize_with = "de_int")]
    pub permissions: Option<i64>,
    #[serde(rename = "Untracked", default, deserialize_with = "de_flag")]
    pub untracked: Option<bool>,
    #[serde(rename = "Motto", default, deserialize_with = "de_text")]
    pub motto: Option<String>,
    #[serde(rename = "Rank", default, deserialize_with = "de_int")]
    pub rank: Option<i64>,
    #[serde(rename = "TotalRanked", default, deserialize_with = "de_int")]
    pub total_ranked: Option<i64>,
    /// Nested by game id, then by achievement id. Kept as the service sends it.
    #[serde(rename = "RecentAchievements", default)]
    pub recent_achievements: Value,
    #[serde(rename = "UserPic", default, deserialize_with = "de_image_url")]
    pub user_pic: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "de_text")]
    pub status: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Console {
    #[serde(rename = "ID", default, deserialize_with = "de_int")]
    pub id: Option<i64>,
    #[serde(rename = "Name", default, deserialize_with = "de_text")]
    pub name: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

/// A user's score and rank. For unknown users the service reports a null
/// score and rank 1.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankAndScore {
    #[serde(rename = "Score", default, deserialize_with = "de_int")]
    pub score: Option<i64>,
    #[serde(rename = "Rank", default, deserialize_with = "de_int")]
    pub rank: Option<i64>,
    #[serde(rename = "TotalRanked", default, deserialize_with = "de_int")]
    pub total_ranked: Option<i64>,
    #[serde(skip)]
    pub raw: Value,
}

/// One entry of a user's completed games. A game mastered in hardcore is
/// listed twice, once per mode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletedGame {
    #[serde(rename = "GameID", default, deserialize_with = "de_int")]
    pub game_id: Option<i64>,
    #[serde(rename = "Title", default, deserialize_with = "de_text")]
    pub title: Option<String>,
    #[serde(rename = "ConsoleID", default, deserialize_with = "de_int")]
    pub console_id: Option<i64>,
    #[serde(rename = "ConsoleName", default, deserialize_with = "de_text")]
    pub console_name: Option<String>,
    #[serde(rename = "ImageIcon", default, deserialize_with = "de_image_url")]
    pub image_icon: Option<String>,
    #[serde(rename = "MaxPossible", default, deserialize_with = "de_int")]
    pub max_possible: Option<i64>,
    #[serde(rename = "NumAwarded", default, deserialize_with = "de_int")]
    pub num_awarded: Option<i64>,
    #[serde(rename = "PctWon", default, deserialize_with = "de_float")]
    pub pct_won: Option<f64>,
    #[serde(rename = "HardcoreMode", default, deserialize_with = "de_flag")]
    pub hardcore_mode: Option<bool>,
    #[serde(skip)]
    pub raw: Value,
}

/// The extended game info sends achievements as an object keyed by id, or as
/// an empty array when the game has none.
fn de_achievements<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<Achievement>>, D::Error> {
    use serde::de::Error as _;

    let entries = match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(map)) => map.into_iter().map(|(_, entry)| entry).collect(),
        Some(Value::Array(list)) => list,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected achievements as an object or array, found `{other}`"
            )))
        }
    };

    entries
        .into_iter()
        .map(Achievement::from_raw)
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
        .map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    fn achievement_json(id: u32) -> Value {
        json!({
            "ID": id.to_string(),
            "NumAwarded": "1053",
            "NumAwardedHardcore": "587",
            "Title": "Ring Collector",
            "Description": "Collect 100 rings",
            "Points": "5",
            "TrueRatio": "6",
            "Author": "Scott",
            "DateModified": "2014-02-10 21:02:05",
            "DateCreated": "2012-11-02 00:03:12",
            "BadgeName": "04960",
            "DisplayOrder": "1",
            "MemAddr": "0xfe20>=100"
        })
    }

    #[test]
    fn achievement_fields_are_coerced() {
        let raw = achievement_json(42);
        let achievement = Achievement::from_raw(raw.clone()).unwrap();

        assert_eq!(achievement.id, Some(42));
        assert_eq!(achievement.num_awarded, Some(1053));
        assert_eq!(achievement.points, Some(5));
        assert_eq!(achievement.title.as_deref(), Some("Ring Collector"));
        assert_eq!(achievement.date_created, Some(datetime!(2012-11-02 00:03:12)));
        assert_eq!(achievement.mem_addr.as_deref(), Some("0xfe20>=100"));
        assert_eq!(achievement.raw, raw);
    }

    #[test]
    fn missing_fields_stay_none() {
        let game = Game::from_raw(json!({ "Title": "Sonic" })).unwrap();

        assert_eq!(game.title.as_deref(), Some("Sonic"));
        assert_eq!(game.game_id, None);
        assert_eq!(game.image_icon, None);
        assert_eq!(game.achievements, None);
        assert_eq!(game.user_info, None);
    }

    #[test]
    fn game_id_reads_either_key() {
        let by_id = Game::from_raw(json!({ "ID": 1 })).unwrap();
        let by_game_id = Game::from_raw(json!({ "GameID": "1" })).unwrap();

        assert_eq!(by_id.game_id, Some(1));
        assert_eq!(by_game_id.game_id, Some(1));
    }

    #[test]
    fn game_id_prefers_id_when_both_keys_are_sent() {
        let game = Game::from_raw(json!({ "ID": 7, "GameID": "1", "Title": "Tetris" })).unwrap();

        assert_eq!(game.game_id, Some(7));
        assert_eq!(game.title.as_deref(), Some("Tetris"));
    }

    #[test]
    fn image_paths_become_absolute() {
        let game = Game::from_raw(json!({
            "ImageIcon": "/Images/000001.png",
            "ImageBoxArt": null
        }))
        .unwrap();

        assert_eq!(
            game.image_icon.as_deref(),
            Some("https://retroachievements.org/Images/000001.png")
        );
        assert_eq!(game.image_box_art, None);
    }

    #[test]
    fn achievements_keep_object_order() {
        let game = Game::from_raw(json!({
            "Achievements": {
                "9": achievement_json(9),
                "3": achievement_json(3),
                "5": achievement_json(5)
            }
        }))
        .unwrap();

        let ids: Vec<_> = game
            .achievements
            .unwrap()
            .iter()
            .map(|achievement| achievement.id.unwrap())
            .collect();
        assert_eq!(ids, [9, 3, 5]);
    }

    #[test]
    fn empty_achievement_array_is_empty_list() {
        let game = Game::from_raw(json!({ "Achievements": [] })).unwrap();
        assert_eq!(game.achievements, Some(Vec::new()));
    }

    #[test]
    fn nested_last_game_keeps_its_own_raw() {
        let last_game = json!({ "ID": 11, "Title": "Dr. Mario", "IsFinal": "0" });
        let summary = UserSummary::from_raw(json!({
            "LastGameID": "11",
            "LastGame": last_game.clone(),
            "MemberSince": "2013-10-05 21:43:01",
            "Untracked": "0"
        }))
        .unwrap();

        let game = summary.last_game.unwrap();
        assert_eq!(game.raw, last_game);
        assert_eq!(game.is_final, Some(false));
        assert_eq!(summary.last_game_id, Some(11));
        assert_eq!(summary.untracked, Some(false));
        assert!(summary.recently_played.is_empty());
        assert_eq!(summary.recent_achievements, Value::Null);
    }

    #[test]
    fn null_recently_played_is_empty() {
        let summary = UserSummary::from_raw(json!({
            "RecentlyPlayed": null,
            "LastGame": null
        }))
        .unwrap();

        assert!(summary.recently_played.is_empty());
        assert!(summary.last_game.is_none());
    }

    #[test]
    fn bad_datetime_fails_the_record() {
        let err = Achievement::from_raw(json!({ "DateCreated": "yesterday" })).unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn non_numeric_points_fail_the_record() {
        let err = User::from_raw(json!({ "1": "Scott", "2": "lots" })).unwrap_err();
        assert!(err.to_string().contains("lots"));
    }
}
