use draftmaster::render::{gauge, render_bundle, render_matchup_panel, render_patch_overview, render_team_panel};
use draftmaster::*;

#[test]
fn test_gauge_fill() {
    assert_eq!(gauge(70), "[##############------]");
    assert_eq!(gauge(0), "[--------------------]");
    assert_eq!(gauge(100), "[####################]");
}

#[test]
fn test_team_panel_shows_gauge_or_text() {
    let team = TeamAnalysis::fallback();
    let panel = render_team_panel(&team, Side::Blue, 80);
    assert!(panel.starts_with("Team Analysis (Blue side)"));
    assert!(panel.contains("Scaling: [##############------] 7/10 mid game focused"));

    let team = TeamAnalysis {
        scaling: "Not available".to_string(),
        ..TeamAnalysis::fallback()
    };
    let panel = render_team_panel(&team, Side::Red, 80);
    assert!(panel.contains("Scaling: Not available"));
}

#[test]
fn test_matchup_panel_marks_each_lane() {
    let panel = render_matchup_panel(&MatchupInsights::fallback(), Side::Blue, 80);
    assert!(panel.contains("↗ Top (Strong): Blue side has advantage"));
    assert!(panel.contains("↘ Jungle (Slight Disadvantage): Blue side is at a disadvantage"));
    assert!(panel.contains("↗ ADC (Even)"));
}

#[test]
fn test_fallback_notice_is_shown_once() {
    let mut bundle = AnalysisBundle::default();
    for kind in [AnalysisKind::TeamAnalysis, AnalysisKind::PlayerAnalysis] {
        bundle.insert(
            AnalysisResult::fallback(kind),
            SectionSource::Fallback(FallbackReason::MissingCredential),
        );
    }

    let text = render_bundle(&bundle, Side::Blue, 200);
    let notice = FallbackReason::MissingCredential.notice();
    assert_eq!(text.matches(notice).count(), 1);

    let clean = render_bundle(&AnalysisBundle::default(), Side::Blue, 200);
    assert!(!clean.contains("Sample analysis shown"));
}

#[test]
fn test_patch_overview_lists_trending_picks_by_role() {
    let text = render_patch_overview(&PatchOverview::fallback(), SectionSource::Model, 100);
    assert!(text.starts_with("Patch 14.1 Overview"));
    assert!(text.contains("Top: Aatrox, Gnar"));
    assert!(text.contains("ADC: Jinx, Caitlyn"));
}
