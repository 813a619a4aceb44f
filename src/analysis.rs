use std::str::FromStr;
use std::sync::Arc;

use crate::error::QueryError;
use crate::index::BootstrapIndex;
use crate::model::{Player, Position};

pub const MAX_COMPARE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    TotalPoints,
    Form,
    Price,
    PointsPerGame,
    Ownership,
}

impl SortKey {
    pub const VALID: &'static str = "total_points, points, form, price, points_per_game, ppg, ownership";

    fn value(self, p: &Player) -> f64 {
        match self {
            SortKey::TotalPoints => f64::from(p.total_points),
            SortKey::Form => p.form,
            SortKey::Price => f64::from(p.now_cost),
            SortKey::PointsPerGame => p.points_per_game,
            SortKey::Ownership => p.selected_by_percent,
        }
    }

    /// Price sorts cheapest first, everything else highest first.
    fn descending(self) -> bool {
        self != SortKey::Price
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "total_points" | "points" => Ok(SortKey::TotalPoints),
            "form" => Ok(SortKey::Form),
            "price" => Ok(SortKey::Price),
            "points_per_game" | "ppg" => Ok(SortKey::PointsPerGame),
            "ownership" => Ok(SortKey::Ownership),
            _ => Err(QueryError::UnsupportedOption {
                option: "sort key",
                value: raw.to_string(),
                valid: SortKey::VALID,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TotalPoints,
    Form,
    PointsPerGame,
    ExpectedGoals,
    ExpectedAssists,
    Value,
}

impl Metric {
    pub const VALID: &'static str = "points, total_points, form, points_per_game, ppg, x_g, x_a, value";

    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalPoints => "total_points",
            Metric::Form => "form",
            Metric::PointsPerGame => "ppg",
            Metric::ExpectedGoals => "xG",
            Metric::ExpectedAssists => "xA",
            Metric::Value => "value",
        }
    }

    pub fn value(self, p: &Player) -> f64 {
        match self {
            Metric::TotalPoints => f64::from(p.total_points),
            Metric::Form => p.form,
            Metric::PointsPerGame => p.points_per_game,
            Metric::ExpectedGoals => p.expected_goals,
            Metric::ExpectedAssists => p.expected_assists,
            Metric::Value => {
                if p.minutes == 0 || p.now_cost == 0 {
                    0.0
                } else {
                    f64::from(p.total_points) / p.price()
                }
            }
        }
    }

    pub fn display_value(self, value: f64) -> String {
        match self {
            Metric::TotalPoints => format!("{value:.0}"),
            _ => format!("{value:.2}"),
        }
    }
}

impl FromStr for Metric {
    type Err = QueryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "points" | "total_points" => Ok(Metric::TotalPoints),
            "form" => Ok(Metric::Form),
            "points_per_game" | "ppg" => Ok(Metric::PointsPerGame),
            "x_g" => Ok(Metric::ExpectedGoals),
            "x_a" => Ok(Metric::ExpectedAssists),
            "value" => Ok(Metric::Value),
            _ => Err(QueryError::UnsupportedOption {
                option: "metric",
                value: raw.to_string(),
                valid: Metric::VALID,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerFilter {
    pub position: Option<Position>,
    pub team: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_form: Option<f64>,
    pub min_points: Option<i32>,
    pub available_only: bool,
    pub sort_by: SortKey,
    pub limit: usize,
}

impl Default for PlayerFilter {
    fn default() -> Self {
        Self {
            position: None,
            team: None,
            min_price: None,
            max_price: None,
            min_form: None,
            min_points: None,
            available_only: false,
            sort_by: SortKey::default(),
            limit: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilteredPlayers {
    pub total: usize,
    pub players: Vec<Arc<Player>>,
}

#[derive(Debug, Clone, Default)]
pub struct Comparison {
    pub players: Vec<Arc<Player>>,
    pub not_found: Vec<String>,
}

pub fn resolve_team_id(bootstrap: &BootstrapIndex, query: &str) -> Result<u32, QueryError> {
    bootstrap
        .search_teams(query)
        .first()
        .map(|t| t.id)
        .ok_or_else(|| QueryError::UnknownTeam(query.to_string()))
}

pub fn filter_players(
    bootstrap: &BootstrapIndex,
    filter: &PlayerFilter,
) -> Result<FilteredPlayers, QueryError> {
    let team_id = filter
        .team
        .as_deref()
        .map(|name| resolve_team_id(bootstrap, name))
        .transpose()?;

    let mut players: Vec<Arc<Player>> = bootstrap
        .players()
        .into_iter()
        .filter(|p| filter.position.is_none_or(|pos| p.element_type == pos.code()))
        .filter(|p| team_id.is_none_or(|id| p.team == id))
        .filter(|p| filter.min_price.is_none_or(|min| p.price() >= min))
        .filter(|p| filter.max_price.is_none_or(|max| p.price() <= max))
        .filter(|p| filter.min_form.is_none_or(|min| p.form >= min))
        .filter(|p| filter.min_points.is_none_or(|min| p.total_points >= min))
        .filter(|p| !filter.available_only || p.is_available())
        .collect();

    let key = filter.sort_by;
    players.sort_by(|a, b| {
        let ord = key.value(a).total_cmp(&key.value(b));
        if key.descending() { ord.reverse() } else { ord }
    });

    let total = players.len();
    players.truncate(filter.limit);
    Ok(FilteredPlayers { total, players })
}

pub fn top_players(
    bootstrap: &BootstrapIndex,
    metric: Metric,
    position: Option<Position>,
    limit: usize,
) -> Vec<(Arc<Player>, f64)> {
    let mut ranked: Vec<(Arc<Player>, f64)> = bootstrap
        .players()
        .into_iter()
        .filter(|p| position.is_none_or(|pos| p.element_type == pos.code()))
        .filter(|p| metric != Metric::Value || p.minutes > 0)
        .map(|p| {
            let v = metric.value(&p);
            (p, v)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

pub fn differentials(
    bootstrap: &BootstrapIndex,
    max_ownership: f64,
    min_form: f64,
    position: Option<Position>,
    limit: usize,
) -> Vec<Arc<Player>> {
    let mut picks: Vec<Arc<Player>> = bootstrap
        .players()
        .into_iter()
        .filter(|p| position.is_none_or(|pos| p.element_type == pos.code()))
        .filter(|p| p.selected_by_percent <= max_ownership && p.form >= min_form)
        .filter(|p| p.is_available())
        .collect();
    picks.sort_by(|a, b| b.form.total_cmp(&a.form));
    picks.truncate(limit);
    picks
}

pub fn compare_players(
    bootstrap: &BootstrapIndex,
    names: &[String],
) -> Result<Comparison, QueryError> {
    if names.len() > MAX_COMPARE {
        return Err(QueryError::TooManyPlayers {
            given: names.len(),
            max: MAX_COMPARE,
        });
    }

    let mut out = Comparison::default();
    for name in names {
        match bootstrap.search_players(name).into_iter().next() {
            Some(player) => out.players.push(player),
            None => out.not_found.push(name.clone()),
        }
    }
    Ok(out)
}
