use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::QueryError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Player {
    pub id: u32,
    pub web_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
    pub team: u32,
    pub element_type: u8,
    #[serde(default)]
    pub now_cost: u32,
    #[serde(default)]
    pub total_points: i32,
    #[serde(default, deserialize_with = "de_decimal")]
    pub form: f64,
    #[serde(default, deserialize_with = "de_decimal")]
    pub selected_by_percent: f64,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub starts: u32,
    #[serde(default)]
    pub goals_scored: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub bonus: u32,
    #[serde(default)]
    pub yellow_cards: u32,
    #[serde(default)]
    pub red_cards: u32,
    #[serde(default)]
    pub clean_sheets: u32,
    #[serde(default)]
    pub goals_conceded: u32,
    #[serde(default)]
    pub saves: u32,
    #[serde(default, deserialize_with = "de_decimal")]
    pub expected_goals: f64,
    #[serde(default, deserialize_with = "de_decimal")]
    pub expected_assists: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub chance_of_playing_next_round: Option<u8>,
    #[serde(default)]
    pub news: String,
    #[serde(default, deserialize_with = "de_decimal")]
    pub points_per_game: f64,
    #[serde(default, deserialize_with = "de_decimal")]
    pub defensive_contribution_per_90: f64,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }

    pub fn price(&self) -> f64 {
        f64::from(self.now_cost) / 10.0
    }

    pub fn is_available(&self) -> bool {
        self.status == "a"
    }

    pub fn position(&self) -> Option<Position> {
        Position::from_code(self.element_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub strength_overall_home: u32,
    #[serde(default)]
    pub strength_overall_away: u32,
    #[serde(default)]
    pub strength_attack_home: u32,
    #[serde(default)]
    pub strength_attack_away: u32,
    #[serde(default)]
    pub strength_defence_home: u32,
    #[serde(default)]
    pub strength_defence_away: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Gameweek {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub deadline_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Fixture {
    pub id: u32,
    #[serde(default)]
    pub event: Option<u32>,
    #[serde(default)]
    pub kickoff_time: Option<DateTime<Utc>>,
    pub team_h: u32,
    pub team_a: u32,
    #[serde(default)]
    pub team_h_score: Option<u8>,
    #[serde(default)]
    pub team_a_score: Option<u8>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub team_h_difficulty: Option<u8>,
    #[serde(default)]
    pub team_a_difficulty: Option<u8>,
}

impl Fixture {
    pub fn involves(&self, team_id: u32) -> bool {
        self.team_h == team_id || self.team_a == team_id
    }

    /// Final score as (home, away), only once the match is finished.
    pub fn final_score(&self) -> Option<(u8, u8)> {
        if !self.finished {
            return None;
        }
        Some((self.team_h_score?, self.team_a_score?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Bootstrap {
    #[serde(rename = "elements", default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(rename = "events", default)]
    pub gameweeks: Vec<Gameweek>,
}

/// One squad slot from `entry/{id}/event/{gw}/picks/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pick {
    pub element: u32,
    pub position: u8,
    #[serde(default)]
    pub multiplier: u8,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
}

// Money fields are in tenths of a million.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryHistory {
    pub event: u32,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub bank: u32,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub event_transfers: u32,
    #[serde(default)]
    pub event_transfers_cost: u32,
    #[serde(default)]
    pub points_on_bench: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManagerPicks {
    #[serde(default)]
    pub active_chip: Option<String>,
    #[serde(default)]
    pub entry_history: Option<EntryHistory>,
    pub picks: Vec<Pick>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const VALID: &'static str = "gkp, gk, def, mid, fwd, forward";

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Position::Goalkeeper => 1,
            Position::Defender => 2,
            Position::Midfielder => 3,
            Position::Forward => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Position {
    type Err = QueryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gkp" | "gk" => Ok(Position::Goalkeeper),
            "def" => Ok(Position::Defender),
            "mid" => Ok(Position::Midfielder),
            "fwd" | "forward" => Ok(Position::Forward),
            _ => Err(QueryError::UnsupportedOption {
                option: "position",
                value: raw.to_string(),
                valid: Position::VALID,
            }),
        }
    }
}

pub fn position_label(code: u8) -> &'static str {
    Position::from_code(code).map(Position::label).unwrap_or("???")
}

// Upstream sends most decimals as strings ("5.2"), a few as numbers.
fn de_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(v) => Ok(v),
        Raw::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed.parse::<f64>().map_err(serde::de::Error::custom)
        }
        Raw::Null => Ok(0.0),
    }
}
