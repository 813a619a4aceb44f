use std::sync::Arc;

use crate::cache::FplCache;
use crate::model::{Fixture, Gameweek, Player, Team, position_label};

pub use crate::index::UNKNOWN_TEAM;

// Fixtures without a gameweek sort after every scheduled one.
const UNSCHEDULED_GAMEWEEK: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct GameweekFixtures {
    pub gameweek: Arc<Gameweek>,
    pub fixtures: Vec<Arc<Fixture>>,
}

impl FplCache {
    pub fn player(&self, id: u32) -> Option<Arc<Player>> {
        self.bootstrap_view()?.index.player(id)
    }

    pub fn search_players(&self, query: &str) -> Vec<Arc<Player>> {
        self.bootstrap_view()
            .map(|g| g.index.search_players(query))
            .unwrap_or_default()
    }

    pub fn all_players(&self) -> Vec<Arc<Player>> {
        self.bootstrap_view()
            .map(|g| g.index.players())
            .unwrap_or_default()
    }

    pub fn players_by_team(&self, team_id: u32) -> Vec<Arc<Player>> {
        self.bootstrap_view()
            .map(|g| g.index.players_by_team(team_id))
            .unwrap_or_default()
    }

    pub fn team(&self, id: u32) -> Option<Arc<Team>> {
        self.bootstrap_view()?.index.team(id)
    }

    pub fn team_short_name(&self, id: u32) -> String {
        self.bootstrap_view()
            .map(|g| g.index.team_short_name(id))
            .unwrap_or_else(|| UNKNOWN_TEAM.to_string())
    }

    pub fn search_teams(&self, query: &str) -> Vec<Arc<Team>> {
        self.bootstrap_view()
            .map(|g| g.index.search_teams(query))
            .unwrap_or_default()
    }

    pub fn all_teams(&self) -> Vec<Arc<Team>> {
        self.bootstrap_view()
            .map(|g| g.index.teams())
            .unwrap_or_default()
    }

    pub fn gameweek(&self, id: u32) -> Option<Arc<Gameweek>> {
        self.bootstrap_view()?.index.gameweek(id)
    }

    pub fn all_gameweeks(&self) -> Vec<Arc<Gameweek>> {
        self.bootstrap_view()
            .map(|g| g.index.gameweeks())
            .unwrap_or_default()
    }

    pub fn current_gameweek(&self) -> Option<u32> {
        self.bootstrap_view()?.index.current_gameweek()
    }

    pub fn position_name(&self, element_type: u8) -> &'static str {
        position_label(element_type)
    }

    pub fn fixture(&self, id: u32) -> Option<Arc<Fixture>> {
        self.fixtures_view()?.index.fixture(id)
    }

    pub fn all_fixtures(&self) -> Vec<Arc<Fixture>> {
        self.fixtures_view()
            .map(|g| g.index.fixtures())
            .unwrap_or_default()
    }

    pub fn fixtures_by_gameweek(&self, gameweek: u32) -> Vec<Arc<Fixture>> {
        self.fixtures_view()
            .map(|g| g.index.by_gameweek(gameweek))
            .unwrap_or_default()
    }

    pub fn fixtures_by_team(&self, team_id: u32) -> Vec<Arc<Fixture>> {
        self.fixtures_view()
            .map(|g| g.index.by_team(team_id))
            .unwrap_or_default()
    }

    pub fn upcoming_fixtures(&self, team_id: u32, limit: usize) -> Option<Vec<Arc<Fixture>>> {
        let current = self.current_gameweek()?;
        let mut upcoming: Vec<Arc<Fixture>> = self
            .fixtures_by_team(team_id)
            .into_iter()
            .filter(|f| !f.finished && f.event.is_some_and(|gw| gw >= current))
            .collect();
        sort_by_schedule(&mut upcoming);
        upcoming.truncate(limit);
        Some(upcoming)
    }

    pub fn next_gameweeks(&self, count: u32) -> Option<Vec<GameweekFixtures>> {
        let bootstrap = self.bootstrap_view()?;
        let current = bootstrap.index.current_gameweek()?;
        let fixtures = self.fixtures_view();

        let out = (current..current.saturating_add(count))
            .filter_map(|id| bootstrap.index.gameweek(id))
            .map(|gameweek| {
                let mut list = fixtures
                    .as_ref()
                    .map(|g| g.index.by_gameweek(gameweek.id))
                    .unwrap_or_default();
                sort_by_kickoff(&mut list);
                GameweekFixtures {
                    gameweek,
                    fixtures: list,
                }
            })
            .collect();
        Some(out)
    }
}

pub fn sort_by_kickoff(fixtures: &mut [Arc<Fixture>]) {
    fixtures.sort_by_key(|f| f.kickoff_time);
}

pub fn sort_by_schedule(fixtures: &mut [Arc<Fixture>]) {
    fixtures.sort_by_key(|f| (f.event.unwrap_or(UNSCHEDULED_GAMEWEEK), f.kickoff_time));
}
