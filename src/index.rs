use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::FetchError;
use crate::fetch::{DatasetKind, Payload};
use crate::model::{Bootstrap, Fixture, Gameweek, Player, Team};

pub const UNKNOWN_TEAM: &str = "Unknown";

pub trait IndexSet: Sized + Send + Sync + 'static {
    const KIND: DatasetKind;

    fn build(payload: Payload) -> Result<Self, FetchError>;

    fn record_count(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct BootstrapIndex {
    players_by_id: IndexMap<u32, Arc<Player>>,
    players_by_name: IndexMap<String, Vec<Arc<Player>>>,
    players_by_team: IndexMap<u32, Vec<Arc<Player>>>,
    teams_by_id: IndexMap<u32, Arc<Team>>,
    teams_by_name: IndexMap<String, Arc<Team>>,
    gameweeks_by_id: IndexMap<u32, Arc<Gameweek>>,
}

impl BootstrapIndex {
    pub fn from_bootstrap(data: Bootstrap) -> Self {
        let mut index = BootstrapIndex::default();

        for player in data.players {
            let player = Arc::new(player);
            index.players_by_id.insert(player.id, Arc::clone(&player));

            let name_key = player.web_name.to_lowercase();
            let full_key = player.full_name().to_lowercase();
            index
                .players_by_name
                .entry(name_key.clone())
                .or_default()
                .push(Arc::clone(&player));
            if full_key != name_key {
                index
                    .players_by_name
                    .entry(full_key)
                    .or_default()
                    .push(Arc::clone(&player));
            }

            index
                .players_by_team
                .entry(player.team)
                .or_default()
                .push(player);
        }

        for team in data.teams {
            let team = Arc::new(team);
            index.teams_by_id.insert(team.id, Arc::clone(&team));
            // Later teams overwrite earlier ones under a shared key.
            index
                .teams_by_name
                .insert(team.name.to_lowercase(), Arc::clone(&team));
            index
                .teams_by_name
                .insert(team.short_name.to_lowercase(), team);
        }

        for gameweek in data.gameweeks {
            index.gameweeks_by_id.insert(gameweek.id, Arc::new(gameweek));
        }

        index
    }

    pub fn player(&self, id: u32) -> Option<Arc<Player>> {
        self.players_by_id.get(&id).cloned()
    }

    pub fn players(&self) -> Vec<Arc<Player>> {
        self.players_by_id.values().cloned().collect()
    }

    pub fn players_by_team(&self, team_id: u32) -> Vec<Arc<Player>> {
        self.players_by_team
            .get(&team_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn search_players(&self, query: &str) -> Vec<Arc<Player>> {
        search_tiered(
            self.players_by_name
                .iter()
                .map(|(key, players)| (key.as_str(), players.as_slice())),
            query,
        )
    }

    pub fn team(&self, id: u32) -> Option<Arc<Team>> {
        self.teams_by_id.get(&id).cloned()
    }

    pub fn team_short_name(&self, id: u32) -> String {
        self.teams_by_id
            .get(&id)
            .map(|t| t.short_name.clone())
            .unwrap_or_else(|| UNKNOWN_TEAM.to_string())
    }

    pub fn teams(&self) -> Vec<Arc<Team>> {
        self.teams_by_id.values().cloned().collect()
    }

    pub fn search_teams(&self, query: &str) -> Vec<Arc<Team>> {
        search_tiered(
            self.teams_by_name
                .iter()
                .map(|(key, team)| (key.as_str(), std::slice::from_ref(team))),
            query,
        )
    }

    pub fn gameweek(&self, id: u32) -> Option<Arc<Gameweek>> {
        self.gameweeks_by_id.get(&id).cloned()
    }

    pub fn gameweeks(&self) -> Vec<Arc<Gameweek>> {
        self.gameweeks_by_id.values().cloned().collect()
    }

    /// The gameweek flagged current, else the one flagged next.
    pub fn current_gameweek(&self) -> Option<u32> {
        let gameweeks = || self.gameweeks_by_id.values();
        gameweeks()
            .find(|gw| gw.is_current)
            .or_else(|| gameweeks().find(|gw| gw.is_next))
            .map(|gw| gw.id)
    }

    pub fn player_count(&self) -> usize {
        self.players_by_id.len()
    }

    pub fn team_count(&self) -> usize {
        self.teams_by_id.len()
    }
}

impl IndexSet for BootstrapIndex {
    const KIND: DatasetKind = DatasetKind::Bootstrap;

    fn build(payload: Payload) -> Result<Self, FetchError> {
        match payload {
            Payload::Bootstrap(data) => Ok(Self::from_bootstrap(data)),
            other => Err(FetchError::WrongPayload {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn record_count(&self) -> usize {
        self.player_count()
    }
}

#[derive(Debug, Default)]
pub struct FixtureIndex {
    fixtures: Vec<Arc<Fixture>>,
    by_id: IndexMap<u32, Arc<Fixture>>,
    by_gameweek: IndexMap<u32, Vec<Arc<Fixture>>>,
    by_team: IndexMap<u32, Vec<Arc<Fixture>>>,
}

impl FixtureIndex {
    pub fn from_fixtures(fixtures: Vec<Fixture>) -> Self {
        let mut index = FixtureIndex::default();

        for fixture in fixtures {
            let fixture = Arc::new(fixture);
            index.by_id.insert(fixture.id, Arc::clone(&fixture));

            if let Some(gw) = fixture.event {
                index
                    .by_gameweek
                    .entry(gw)
                    .or_default()
                    .push(Arc::clone(&fixture));
            }

            index
                .by_team
                .entry(fixture.team_h)
                .or_default()
                .push(Arc::clone(&fixture));
            if fixture.team_a != fixture.team_h {
                index
                    .by_team
                    .entry(fixture.team_a)
                    .or_default()
                    .push(Arc::clone(&fixture));
            }

            index.fixtures.push(fixture);
        }

        index
    }

    pub fn fixture(&self, id: u32) -> Option<Arc<Fixture>> {
        self.by_id.get(&id).cloned()
    }

    pub fn fixtures(&self) -> Vec<Arc<Fixture>> {
        self.fixtures.clone()
    }

    pub fn by_gameweek(&self, gameweek: u32) -> Vec<Arc<Fixture>> {
        self.by_gameweek.get(&gameweek).cloned().unwrap_or_default()
    }

    pub fn by_team(&self, team_id: u32) -> Vec<Arc<Fixture>> {
        self.by_team.get(&team_id).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

impl IndexSet for FixtureIndex {
    const KIND: DatasetKind = DatasetKind::Fixtures;

    fn build(payload: Payload) -> Result<Self, FetchError> {
        match payload {
            Payload::Fixtures(fixtures) => Ok(Self::from_fixtures(fixtures)),
            other => Err(FetchError::WrongPayload {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn record_count(&self) -> usize {
        self.len()
    }
}

/// Exact key hits first, then substring hits, each record once.
pub fn search_tiered<'a, T: 'a>(
    entries: impl Iterator<Item = (&'a str, &'a [Arc<T>])> + Clone,
    query: &str,
) -> Vec<Arc<T>> {
    let query = query.to_lowercase();
    let mut seen: HashSet<*const T> = HashSet::new();
    let mut results = Vec::new();

    let mut collect = |records: &'a [Arc<T>], results: &mut Vec<Arc<T>>| {
        for record in records {
            if seen.insert(Arc::as_ptr(record)) {
                results.push(Arc::clone(record));
            }
        }
    };

    for (key, records) in entries.clone() {
        if key == query {
            collect(records, &mut results);
        }
    }
    for (key, records) in entries {
        if key != query && key.contains(&query) {
            collect(records, &mut results);
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32, web: &str, first: &str, second: &str, team: u32) -> Player {
        Player {
            id,
            web_name: web.to_string(),
            first_name: first.to_string(),
            second_name: second.to_string(),
            team,
            element_type: 3,
            ..Default::default()
        }
    }

    fn team(id: u32, name: &str, short: &str) -> Team {
        Team {
            id,
            name: name.to_string(),
            short_name: short.to_string(),
            ..Default::default()
        }
    }

    fn gameweek(id: u32, current: bool, next: bool) -> Gameweek {
        Gameweek {
            id,
            is_current: current,
            is_next: next,
            ..Default::default()
        }
    }

    #[test]
    fn identical_display_and_full_name_is_keyed_once() {
        let index = BootstrapIndex::from_bootstrap(Bootstrap {
            players: vec![player(1, "Ben White", "Ben", "White", 1)],
            ..Default::default()
        });
        assert_eq!(index.players_by_name.len(), 1);
        assert_eq!(index.search_players("white").len(), 1);
    }

    #[test]
    fn player_is_keyed_by_display_and_full_name() {
        let index = BootstrapIndex::from_bootstrap(Bootstrap {
            players: vec![player(1, "Salah", "Mohamed", "Salah", 12)],
            ..Default::default()
        });
        assert!(index.players_by_name.contains_key("salah"));
        assert!(index.players_by_name.contains_key("mohamed salah"));
        assert_eq!(index.search_players("mohamed").len(), 1);
    }

    #[test]
    fn exact_key_matches_come_before_substring_matches() {
        let index = BootstrapIndex::from_bootstrap(Bootstrap {
            players: vec![
                player(1, "Gabriel", "Gabriel", "dos Santos Magalhães", 1),
                player(2, "Gabriel Jesus", "Gabriel", "Fernando de Jesus", 1),
                player(3, "Gabriel", "Gabriel", "Martinelli Silva", 1),
            ],
            ..Default::default()
        });
        let ids: Vec<u32> = index.search_players("GABRIEL").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn team_name_collision_is_last_write_wins() {
        let index = BootstrapIndex::from_bootstrap(Bootstrap {
            teams: vec![team(1, "Alpha", "ALP"), team(2, "Beta", "alp")],
            ..Default::default()
        });
        assert_eq!(index.teams_by_name.get("alp").map(|t| t.id), Some(2));
        assert_eq!(index.team_count(), 2);
    }

    #[test]
    fn team_search_deduplicates_across_keys() {
        let index = BootstrapIndex::from_bootstrap(Bootstrap {
            teams: vec![team(1, "Manchester City", "MCI"), team(2, "Manchester Utd", "MUN")],
            ..Default::default()
        });
        let ids: Vec<u32> = index.search_teams("m").iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
        let exact: Vec<u32> = index.search_teams("mun").iter().map(|t| t.id).collect();
        assert_eq!(exact, vec![2]);
    }

    #[test]
    fn current_gameweek_prefers_current_then_next() {
        let next_only = BootstrapIndex::from_bootstrap(Bootstrap {
            gameweeks: vec![gameweek(1, false, false), gameweek(2, false, true)],
            ..Default::default()
        });
        assert_eq!(next_only.current_gameweek(), Some(2));

        let both = BootstrapIndex::from_bootstrap(Bootstrap {
            gameweeks: vec![gameweek(1, true, false), gameweek(2, false, true)],
            ..Default::default()
        });
        assert_eq!(both.current_gameweek(), Some(1));

        let neither = BootstrapIndex::from_bootstrap(Bootstrap {
            gameweeks: vec![gameweek(1, false, false), gameweek(2, false, false)],
            ..Default::default()
        });
        assert_eq!(neither.current_gameweek(), None);
    }

    #[test]
    fn fixture_is_listed_once_under_each_side_and_gameweek() {
        let index = FixtureIndex::from_fixtures(vec![
            Fixture {
                id: 10,
                event: Some(4),
                team_h: 3,
                team_a: 7,
                ..Default::default()
            },
            Fixture {
                id: 11,
                event: None,
                team_h: 7,
                team_a: 5,
                ..Default::default()
            },
        ]);
        assert_eq!(index.by_team(3).iter().map(|f| f.id).collect::<Vec<_>>(), vec![10]);
        assert_eq!(index.by_team(7).iter().map(|f| f.id).collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(index.by_gameweek(4).len(), 1);
        assert!(index.by_gameweek(99).is_empty());
        assert!(index.by_team(99).is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn wrong_payload_kind_is_rejected() {
        let err = FixtureIndex::build(Payload::Bootstrap(Bootstrap::default())).unwrap_err();
        assert!(matches!(err, FetchError::WrongPayload { .. }));
    }
}
