use std::fmt::Write;

use crate::analysis::{
    AnalysisBundle, AnalysisKind, MatchupInsights, PlayerAnalysis, ScalingDisplay, SectionSource,
    TeamAnalysis, scaling_display,
};
use crate::patch::PatchOverview;
use crate::roster::{Perspective, Role};
use strum::IntoEnumIterator;

const GAUGE_WIDTH: usize = 20;

// Plain-text panels for a terminal. `width` is the wrap column.
pub fn render_bundle(bundle: &AnalysisBundle, perspective: Perspective, width: usize) -> String {
    let mut out = String::new();
    for kind in AnalysisKind::iter() {
        if let SectionSource::Fallback(reason) = bundle.provenance.get(kind) {
            push_wrapped(&mut out, &format!("! {}", reason.notice()), width, "");
            break;
        }
    }

    out.push_str(&render_team_panel(&bundle.team_analysis, perspective, width));
    out.push('\n');
    out.push_str(&render_player_panel(&bundle.player_analysis, width));
    out.push('\n');
    out.push_str(&render_matchup_panel(&bundle.matchup_insights, perspective, width));
    out
}

pub fn render_team_panel(team: &TeamAnalysis, perspective: Perspective, width: usize) -> String {
    let mut out = heading(&format!("Team Analysis ({} side)", perspective), width);
    push_wrapped(&mut out, &team.summary, width, "");
    push_list(&mut out, "Strengths", &team.strengths, width);
    push_list(&mut out, "Weaknesses", &team.weaknesses, width);
    push_list(&mut out, "Win Conditions", &team.win_conditions, width);

    match scaling_display(&team.scaling) {
        ScalingDisplay::Gauge { percent, label } => {
            let _ = writeln!(out, "Scaling: {} {}", gauge(percent), label);
        }
        ScalingDisplay::Text(text) => push_wrapped(&mut out, &format!("Scaling: {}", text), width, ""),
    }
    push_field(&mut out, "Playstyle", &team.playstyle, width);
    push_field(&mut out, "Team Fighting", &team.teamfight, width);
    out
}

pub fn render_player_panel(player: &PlayerAnalysis, width: usize) -> String {
    let mut out = heading("Player Analysis", width);
    push_wrapped(&mut out, &player.summary, width, "");
    push_list(&mut out, "Strengths", &player.strengths, width);
    push_list(&mut out, "Areas for Improvement", &player.improvements, width);
    push_list(&mut out, "Itemization", &player.itemization, width);

    if !player.performance_metrics.is_empty() {
        out.push_str("Performance Metrics:\n");
        for (metric, target) in &player.performance_metrics {
            push_wrapped(&mut out, &format!("{}: {}", metric, target), width, "  ");
        }
    }
    out
}

pub fn render_matchup_panel(matchups: &MatchupInsights, perspective: Perspective, width: usize) -> String {
    let mut out = heading("Matchup Insights", width);
    for (role, lane) in matchups.lanes() {
        let verdict = lane.verdict();
        let _ = writeln!(
            out,
            "{} {} ({}): {} side {}",
            verdict.icon(),
            role,
            lane.advantage,
            perspective,
            verdict
        );
        for tip in &lane.tips {
            push_wrapped(&mut out, &format!("- {}", tip), width, "    ");
        }
        if !lane.counter_strategy.trim().is_empty() {
            push_wrapped(&mut out, &format!("Counter: {}", lane.counter_strategy), width, "    ");
        }
    }
    out
}

pub fn render_patch_overview(overview: &PatchOverview, source: SectionSource, width: usize) -> String {
    let mut out = heading(&format!("Patch {} Overview", overview.version), width);
    if let SectionSource::Fallback(reason) = source {
        push_wrapped(&mut out, &format!("! {}", reason.notice()), width, "");
    }
    push_wrapped(&mut out, &overview.summary, width, "");
    push_list(&mut out, "Champion Changes", &overview.champion_changes, width);
    push_list(&mut out, "Item Changes", &overview.item_changes, width);
    push_list(&mut out, "Meta Predictions", &overview.meta_predictions, width);

    let trending = Role::iter()
        .filter_map(|role| {
            let picks = overview.trending_for(role);
            (!picks.is_empty()).then(|| format!("{}: {}", role, picks.join(", ")))
        })
        .collect::<Vec<_>>();
    push_list(&mut out, "Trending Picks", &trending, width);
    push_list(&mut out, "Tips", &overview.player_tips, width);
    out
}

// "[##############------]"
pub fn gauge(percent: u8) -> String {
    let filled = (usize::from(percent.min(100)) * GAUGE_WIDTH + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(GAUGE_WIDTH - filled))
}

fn heading(title: &str, width: usize) -> String {
    format!("{}\n{}\n", title, "=".repeat(title.chars().count().min(width.max(1))))
}

fn push_field(out: &mut String, label: &str, value: &str, width: usize) {
    if !value.trim().is_empty() {
        push_wrapped(out, &format!("{}: {}", label, value), width, "");
    }
}

fn push_list(out: &mut String, label: &str, items: &[String], width: usize) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}:", label);
    for item in items {
        push_wrapped(out, &format!("- {}", item), width, "    ");
    }
}

fn push_wrapped(out: &mut String, text: &str, width: usize, indent: &str) {
    let options = textwrap::Options::new(width.max(20))
        .initial_indent(if indent.is_empty() { "" } else { "  " })
        .subsequent_indent(indent);
    for line in textwrap::wrap(text, options) {
        out.push_str(&line);
        out.push('\n');
    }
}
