use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fpl_cache::analysis::{self, Metric, PlayerFilter, SortKey};
use fpl_cache::config::resolve_manager_id;
use fpl_cache::error::QueryError;
use fpl_cache::format::{
    format_deadline, format_fixture, format_my_team, format_player, format_team,
};
use fpl_cache::model::Position;
use fpl_cache::query::{sort_by_kickoff, sort_by_schedule};
use fpl_cache::{CacheConfig, FplCache, HttpFetcher};

#[derive(Parser, Debug)]
#[command(name = "fpl_cache")]
#[command(about = "Query Fantasy Premier League data through a TTL cache")]
#[command(version)]
struct Args {
    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Player by id
    Player { id: u32 },
    /// Players by name, exact matches first
    Search { name: String },
    /// Filter and sort players
    Filter {
        #[arg(long)]
        position: Option<Position>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        min_form: Option<f64>,
        #[arg(long)]
        min_points: Option<i32>,
        #[arg(long)]
        available_only: bool,
        #[arg(long, default_value = "total_points")]
        sort_by: SortKey,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Top players by metric
    Top {
        metric: Metric,
        #[arg(long)]
        position: Option<Position>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Low-ownership, in-form available players
    Differentials {
        #[arg(long, default_value_t = 10.0)]
        max_ownership: f64,
        #[arg(long, default_value_t = 5.0)]
        min_form: f64,
        #[arg(long)]
        position: Option<Position>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Side-by-side comparison of up to ten players
    Compare { names: Vec<String> },
    /// Team by id
    Team { id: u32 },
    /// Teams by name
    SearchTeam { name: String },
    /// All teams by strength
    Teams,
    /// Fixtures of one gameweek
    Gameweek { id: u32 },
    /// Fixtures of one team
    TeamFixtures {
        team: String,
        #[arg(long)]
        gameweek: Option<u32>,
    },
    /// Next fixtures of one team with difficulty ratings
    Upcoming {
        team: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Upcoming gameweeks with their fixtures
    NextGameweeks {
        #[arg(long, default_value_t = 5)]
        count: u32,
    },
    /// A manager's squad for a gameweek
    MyTeam {
        /// Defaults to FPL_MANAGER_ID
        manager_id: Option<u32>,
        /// Defaults to the current gameweek
        #[arg(long)]
        gameweek: Option<u32>,
    },
    /// Force a refresh of both datasets
    Refresh,
    /// Record counts
    Stats,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CacheConfig::from_env();
    let fetcher = Arc::new(HttpFetcher::new(
        config.base_url.clone(),
        config.request_timeout,
    ));
    let cache = FplCache::new(&config, fetcher.clone());
    let out = run(&cache, &fetcher, args.command)?;
    println!("{out}");
    Ok(())
}

fn run(cache: &FplCache, fetcher: &HttpFetcher, command: Command) -> Result<String> {
    if matches!(command, Command::Refresh) {
        cache.refresh(true).context("refresh failed")?;
    } else {
        cache.ensure_loaded().context("loading FPL data")?;
    }
    // One bootstrap generation per command, so records and their teams agree.
    let view = cache
        .bootstrap_view()
        .context("bootstrap snapshot not installed")?;
    let bootstrap = &view.index;

    let text = match command {
        Command::Player { id } => match bootstrap.player(id) {
            Some(p) => format_player(&p, bootstrap),
            None => format!("Player {id} not found"),
        },
        Command::Search { name } => {
            let results = bootstrap.search_players(&name);
            if results.is_empty() {
                return Ok(format!("No players found matching '{name}'"));
            }
            let mut lines = vec![if results.len() > 10 {
                format!("Found {} players, showing top 10:", results.len())
            } else {
                format!("Found {} player(s):", results.len())
            }];
            lines.extend(results.iter().take(10).map(|p| format_player(p, bootstrap)));
            lines.join("\n")
        }
        Command::Filter {
            position,
            team,
            min_price,
            max_price,
            min_form,
            min_points,
            available_only,
            sort_by,
            limit,
        } => {
            let filter = PlayerFilter {
                position,
                team,
                min_price,
                max_price,
                min_form,
                min_points,
                available_only,
                sort_by,
                limit,
            };
            let found = analysis::filter_players(bootstrap, &filter)?;
            if found.players.is_empty() {
                return Ok("No players match the filters".to_string());
            }
            let mut lines = vec![format!(
                "Found {} players (showing {}):",
                found.total,
                found.players.len()
            )];
            lines.extend(found.players.iter().map(|p| format_player(p, bootstrap)));
            lines.join("\n")
        }
        Command::Top {
            metric,
            position,
            limit,
        } => {
            let ranked = analysis::top_players(bootstrap, metric, position, limit);
            let pos_label = position.map(|p| format!(" {p}")).unwrap_or_default();
            let mut lines = vec![format!("Top {limit}{pos_label} by {}:", metric.label())];
            for (i, (p, value)) in ranked.iter().enumerate() {
                lines.push(format!(
                    "{}. {} [{}={}]",
                    i + 1,
                    format_player(p, bootstrap),
                    metric.label(),
                    metric.display_value(*value)
                ));
            }
            lines.join("\n")
        }
        Command::Differentials {
            max_ownership,
            min_form,
            position,
            limit,
        } => {
            let picks =
                analysis::differentials(bootstrap, max_ownership, min_form, position, limit);
            if picks.is_empty() {
                return Ok(format!(
                    "No differentials found (ownership ≤{max_ownership}%, form ≥{min_form})"
                ));
            }
            let pos_label = position.map(|p| format!(" {p}")).unwrap_or_default();
            let mut lines = vec![format!(
                "Differentials{pos_label} (≤{max_ownership}% owned, ≥{min_form} form):"
            )];
            lines.extend(picks.iter().map(|p| format_player(p, bootstrap)));
            lines.join("\n")
        }
        Command::Compare { names } => {
            let comparison = analysis::compare_players(bootstrap, &names)?;
            if comparison.players.is_empty() {
                return Ok(format!("No players found: {}", comparison.not_found.join(", ")));
            }
            let mut lines = vec!["Player Comparison:".to_string(), "-".repeat(60)];
            for p in &comparison.players {
                lines.push(format!(
                    "\n**{}** ({} {}) £{:.1}m",
                    p.web_name,
                    bootstrap.team_short_name(p.team),
                    cache.position_name(p.element_type),
                    p.price()
                ));
                lines.push(format!(
                    "  Points: {} | Form: {:.1} | PPG: {:.1}",
                    p.total_points, p.form, p.points_per_game
                ));
                lines.push(format!(
                    "  xG: {:.2} | xA: {:.2}",
                    p.expected_goals, p.expected_assists
                ));
                lines.push(format!("  Ownership: {:.1}%", p.selected_by_percent));
                if !p.is_available() {
                    lines.push(format!("  ⚠️ Status: {} - {}", p.status, p.news));
                }
            }
            if !comparison.not_found.is_empty() {
                lines.push(format!("\nNot found: {}", comparison.not_found.join(", ")));
            }
            lines.join("\n")
        }
        Command::Team { id } => match bootstrap.team(id) {
            Some(t) => format_team(&t),
            None => format!("Team {id} not found"),
        },
        Command::SearchTeam { name } => {
            let results = bootstrap.search_teams(&name);
            if results.is_empty() {
                return Ok(format!("No teams found matching '{name}'"));
            }
            let mut lines = vec![format!("Found {} team(s):", results.len())];
            lines.extend(results.iter().map(|t| format_team(t)));
            lines.join("\n")
        }
        Command::Teams => {
            let mut teams = bootstrap.teams();
            teams.sort_by(|a, b| b.strength.cmp(&a.strength));
            let mut lines = vec![format!("All {} teams (sorted by strength):", teams.len())];
            lines.extend(teams.iter().map(|t| format_team(t)));
            lines.join("\n")
        }
        Command::Gameweek { id } => {
            let mut fixtures = cache.fixtures_by_gameweek(id);
            if fixtures.is_empty() {
                return Ok(format!("No fixtures found for GW{id}"));
            }
            sort_by_kickoff(&mut fixtures);
            let mut lines = vec![format!("GW{id} fixtures ({} matches):", fixtures.len())];
            lines.extend(fixtures.iter().map(|f| format_fixture(f, bootstrap, None)));
            lines.join("\n")
        }
        Command::TeamFixtures { team, gameweek } => {
            let Some(t) = bootstrap.search_teams(&team).into_iter().next() else {
                return Ok(format!("Team '{team}' not found"));
            };
            let mut fixtures: Vec<_> = cache
                .fixtures_by_team(t.id)
                .into_iter()
                .filter(|f| gameweek.is_none_or(|gw| f.event == Some(gw)))
                .collect();
            if fixtures.is_empty() {
                return Ok(format!("No fixtures found for {}", t.name));
            }
            sort_by_schedule(&mut fixtures);
            let gw_filter = gameweek.map(|gw| format!(" (GW{gw})")).unwrap_or_default();
            let mut lines = vec![format!("{} fixtures{gw_filter}:", t.name)];
            lines.extend(
                fixtures
                    .iter()
                    .map(|f| format_fixture(f, bootstrap, Some(t.id))),
            );
            lines.join("\n")
        }
        Command::Upcoming { team, limit } => {
            let Some(t) = bootstrap.search_teams(&team).into_iter().next() else {
                return Ok(format!("Team '{team}' not found"));
            };
            let Some(upcoming) = cache.upcoming_fixtures(t.id, limit) else {
                return Ok("Could not determine current gameweek".to_string());
            };
            if upcoming.is_empty() {
                return Ok(format!("No upcoming fixtures found for {}", t.name));
            }
            let mut lines = vec![format!("{} next {} fixtures:", t.name, upcoming.len())];
            lines.extend(
                upcoming
                    .iter()
                    .map(|f| format_fixture(f, bootstrap, Some(t.id))),
            );
            lines.join("\n")
        }
        Command::NextGameweeks { count } => {
            let Some(gameweeks) = cache.next_gameweeks(count) else {
                return Ok("Could not determine current gameweek".to_string());
            };
            if gameweeks.is_empty() {
                return Ok("No upcoming gameweeks found".to_string());
            }
            let mut lines = Vec::new();
            for gw in &gameweeks {
                lines.push(format!(
                    "\n## GW{} (deadline: {})",
                    gw.gameweek.id,
                    format_deadline(gw.gameweek.deadline_time)
                ));
                lines.extend(
                    gw.fixtures
                        .iter()
                        .map(|f| format_fixture(f, bootstrap, None)),
                );
            }
            lines.join("\n")
        }
        Command::Stats => {
            let stats = cache.stats();
            format!(
                "{} players, {} teams, {} fixtures",
                stats.players, stats.teams, stats.fixtures
            )
        }
        Command::MyTeam {
            manager_id,
            gameweek,
        } => {
            let manager_id = resolve_manager_id(manager_id)?;
            let gameweek = gameweek
                .or_else(|| bootstrap.current_gameweek())
                .ok_or(QueryError::NoCurrentGameweek)?;
            let picks = fetcher
                .fetch_manager_picks(manager_id, gameweek)
                .with_context(|| format!("fetching picks for manager {manager_id}"))?;
            format_my_team(&picks, bootstrap)
        }
        Command::Refresh => {
            let stats = cache.stats();
            format!(
                "Cache refreshed: {} players, {} teams, {} fixtures",
                stats.players, stats.teams, stats.fixtures
            )
        }
    };
    Ok(text)
}
