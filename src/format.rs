use crate::index::BootstrapIndex;
use crate::model::{Fixture, ManagerPicks, Player, Position, Team, position_label};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M";

// Squad slots past this one are the bench.
const STARTING_SLOTS: u8 = 11;

/// `bootstrap` must be the generation `p` was read from.
pub fn format_player(p: &Player, bootstrap: &BootstrapIndex) -> String {
    let team_name = bootstrap.team_short_name(p.team);
    let pos = position_label(p.element_type);

    let mut parts = vec![
        format!("{} ({} {}) £{:.1}m", p.web_name, team_name, pos, p.price()),
        format!("{}pts ({:.1}/g)", p.total_points, p.points_per_game),
        format!("form:{:.1}", p.form),
        format!("{:.1}%", p.selected_by_percent),
        format!("{}min", p.minutes),
        format!("{}g {}a {}bps", p.goals_scored, p.assists, p.bonus),
    ];

    match p.position() {
        Some(Position::Goalkeeper) => {
            parts.push(format!("{}sv {}cs", p.saves, p.clean_sheets));
        }
        Some(Position::Defender) => parts.push(format!(
            "{}cs {}gc | xG:{:.2} xA:{:.2} | def/90:{:.1}",
            p.clean_sheets,
            p.goals_conceded,
            p.expected_goals,
            p.expected_assists,
            p.defensive_contribution_per_90
        )),
        Some(Position::Midfielder) => parts.push(format!(
            "xG:{:.2} xA:{:.2} | {}cs | def/90:{:.1}",
            p.expected_goals, p.expected_assists, p.clean_sheets, p.defensive_contribution_per_90
        )),
        _ => parts.push(format!(
            "xG:{:.2} xA:{:.2}",
            p.expected_goals, p.expected_assists
        )),
    }

    if p.yellow_cards > 0 || p.red_cards > 0 {
        parts.push(format!("{}Y {}R", p.yellow_cards, p.red_cards));
    }

    if !p.is_available() {
        let chance = p
            .chance_of_playing_next_round
            .map(|c| format!(" {c}%"))
            .unwrap_or_default();
        let news = if p.news.is_empty() {
            String::new()
        } else {
            format!(" - {}", p.news)
        };
        parts.push(format!("⚠️ {}{chance}{news}", status_text(&p.status)));
    }

    parts.join(" | ")
}

fn status_text(status: &str) -> &str {
    match status {
        "d" => "doubtful",
        "i" => "injured",
        "s" => "suspended",
        "n" | "u" => "unavailable",
        other => other,
    }
}

pub fn format_team(t: &Team) -> String {
    format!(
        "{} ({}) | strength: {} | home: {} atk:{} def:{} | away: {} atk:{} def:{}",
        t.name,
        t.short_name,
        t.strength,
        t.strength_overall_home,
        t.strength_attack_home,
        t.strength_defence_home,
        t.strength_overall_away,
        t.strength_attack_away,
        t.strength_defence_away
    )
}

/// One-line fixture. With a `perspective` team the line shows the opponent,
/// venue and that side's difficulty rating.
pub fn format_fixture(
    fix: &Fixture,
    bootstrap: &BootstrapIndex,
    perspective: Option<u32>,
) -> String {
    let team_name = |id: u32| {
        bootstrap
            .team(id)
            .map(|t| t.short_name.clone())
            .unwrap_or_else(|| "???".to_string())
    };
    let home = team_name(fix.team_h);
    let away = team_name(fix.team_a);

    let gw = fix
        .event
        .map(|e| format!("GW{e}"))
        .unwrap_or_else(|| "TBD".to_string());
    let kickoff = fix
        .kickoff_time
        .map(|k| k.format(DATETIME_FMT).to_string())
        .unwrap_or_else(|| "TBD".to_string());
    let score = fix.final_score().map(|(h, a)| format!("{h}-{a}"));

    if let Some(team_id) = perspective {
        let (opp, venue, fdr) = if team_id == fix.team_h {
            (away, "H", fix.team_h_difficulty)
        } else {
            (home, "A", fix.team_a_difficulty)
        };
        let fdr = fdr.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string());
        return match score {
            Some(score) => format!("{gw}: {opp} ({venue}) FDR:{fdr} | {score} | {kickoff}"),
            None => format!("{gw}: {opp} ({venue}) FDR:{fdr} | {kickoff}"),
        };
    }

    match score {
        Some(score) => format!("{gw}: {home} {score} {away} | {kickoff}"),
        None => format!("{gw}: {home} vs {away} | {kickoff}"),
    }
}

pub fn format_deadline(deadline: Option<chrono::DateTime<chrono::Utc>>) -> String {
    deadline
        .map(|d| d.format(DATETIME_FMT).to_string())
        .unwrap_or_default()
}

pub fn format_my_team(picks: &ManagerPicks, bootstrap: &BootstrapIndex) -> String {
    let mut lines = Vec::new();

    let mut squad: Vec<_> = picks.picks.iter().collect();
    squad.sort_by_key(|pick| pick.position);
    if !squad.is_empty() {
        let heading = picks
            .entry_history
            .as_ref()
            .map(|h| format!("## Squad (GW{})", h.event))
            .unwrap_or_else(|| "## Squad".to_string());
        lines.push(heading);
    }
    let mut bench_started = false;
    for pick in squad {
        let Some(player) = bootstrap.player(pick.element) else {
            continue;
        };
        if pick.position > STARTING_SLOTS && !bench_started {
            lines.push("\n## Bench".to_string());
            bench_started = true;
        }
        let markers = if pick.is_captain {
            " (C)"
        } else if pick.is_vice_captain {
            " (VC)"
        } else {
            ""
        };
        lines.push(format!(
            "- {} ({} {}) £{:.1}m{markers}",
            player.web_name,
            bootstrap.team_short_name(player.team),
            position_label(player.element_type),
            player.price()
        ));
    }

    if let Some(chip) = &picks.active_chip {
        lines.push(format!("\n## Active chip\n- {chip}"));
    }

    if let Some(history) = &picks.entry_history {
        lines.push("\n## Transfers".to_string());
        lines.push(format!(
            "- Bank: £{:.1}m | Squad value: £{:.1}m",
            f64::from(history.bank) / 10.0,
            f64::from(history.value) / 10.0
        ));
        lines.push(format!(
            "- Made: {} | Cost: {}pts",
            history.event_transfers, history.event_transfers_cost
        ));
        lines.push(format!(
            "- Points: {} | Bench: {}",
            history.points, history.points_on_bench
        ));
    }

    lines.join("\n")
}
