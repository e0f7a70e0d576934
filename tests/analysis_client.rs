mod common;

use common::*;
use draftmaster::client::strip_code_fences;
use draftmaster::prompts::{PLAYER_ANALYSIS_PREAMBLE, TEAM_ANALYSIS_PREAMBLE};
use draftmaster::*;
use std::sync::Arc;

fn requests() -> [AnalysisRequest; 3] {
    sample_input().requests().expect("sample input is valid")
}

#[tokio::test]
async fn test_team_request_parses_model_reply() {
    let backend = Arc::new(FakeCompletion::happy());
    let client = AnalysisClient::new(Arc::clone(&backend));

    let [team, _, _] = requests();
    let result = client.request(&team).await.expect("team analysis");

    match result {
        AnalysisResult::TeamAnalysis(team) => {
            assert_eq!(team.summary, "Blue side wants early skirmishes around drakes.");
            assert_eq!(team.win_conditions.len(), 2);
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let sent = backend.requests();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].json_mode);
    assert_eq!(sent[0].preamble, TEAM_ANALYSIS_PREAMBLE);
    assert!(sent[0].prompt.contains("Blue Team: Aatrox, Lee Sin, Ahri, Kai'Sa, Leona"));
}

#[tokio::test]
async fn test_fenced_reply_is_accepted() {
    let backend = Arc::new(FakeCompletion::new(|_| Ok(format!("```json\n{}\n```", TEAM_JSON))));
    let client = AnalysisClient::new(backend);

    let [team, _, _] = requests();
    let (result, source) = client.request_or_fallback(&team).await.unwrap();

    assert_eq!(source, SectionSource::Model);
    assert_ne!(result, AnalysisResult::fallback(AnalysisKind::TeamAnalysis));
}

#[test]
fn test_strip_code_fences() {
    assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(strip_code_fences("  ```\n{\"a\": 1}```  "), "{\"a\": 1}");
    assert_eq!(strip_code_fences("```json{\"a\": 1}```"), "{\"a\": 1}");
}

#[tokio::test]
async fn test_unparsable_reply_yields_fixed_fallback_for_every_kind() {
    let client = AnalysisClient::new(Arc::new(FakeCompletion::new(|_| {
        Ok("Sure! Here is your analysis: the blue team is great.".to_string())
    })));

    for request in requests() {
        let kind = request.kind();
        let (result, source) = client.request_or_fallback(&request).await.unwrap();
        assert_eq!(result, AnalysisResult::fallback(kind), "{}", kind);
        assert_eq!(
            source,
            SectionSource::Fallback(FallbackReason::MalformedResponse)
        );
    }
}

#[tokio::test]
async fn test_request_reports_the_failure_kind() {
    let [team, _, _] = requests();

    let client = AnalysisClient::new(Arc::new(FakeCompletion::new(|_| Ok("not json".into()))));
    assert!(matches!(
        client.request(&team).await,
        Err(AppError::AI(AIError::MalformedResponse(_)))
    ));

    let client = AnalysisClient::new(Arc::new(FakeCompletion::failing(AIError::unavailable(
        Upstream::TextGeneration,
        "connection refused",
        true,
    ))));
    assert!(matches!(
        client.request(&team).await,
        Err(AppError::AI(AIError::UpstreamUnavailable { .. }))
    ));
}

#[tokio::test]
async fn test_missing_credential_falls_back_with_configuration_notice() {
    let client = AnalysisClient::new(Arc::new(FakeCompletion::failing(
        AIError::MissingCredential(Upstream::TextGeneration),
    )));

    let [_, player, _] = requests();
    let (result, source) = client.request_or_fallback(&player).await.unwrap();

    assert_eq!(result, AnalysisResult::fallback(AnalysisKind::PlayerAnalysis));
    assert_eq!(
        source,
        SectionSource::Fallback(FallbackReason::MissingCredential)
    );
    assert!(FallbackReason::MissingCredential.notice().contains("API key"));
}

#[tokio::test]
async fn test_matchup_missing_a_lane_is_malformed() {
    let client = AnalysisClient::new(Arc::new(FakeCompletion::new(|_| {
        Ok(r#"{"top": {"favorable": true, "advantage": "Strong", "tips": [], "counter_strategy": ""}}"#.to_string())
    })));

    let [_, _, matchup] = requests();
    let (result, source) = client.request_or_fallback(&matchup).await.unwrap();

    assert_eq!(result, AnalysisResult::fallback(AnalysisKind::MatchupInsights));
    assert!(source.is_fallback());
}

#[tokio::test]
async fn test_empty_summary_is_malformed() {
    let client = AnalysisClient::new(Arc::new(FakeCompletion::new(|_| {
        Ok(r#"{"summary": "   ", "strengths": []}"#.to_string())
    })));

    let [team, _, _] = requests();
    assert!(matches!(
        client.request(&team).await,
        Err(AppError::AI(AIError::MalformedResponse(_)))
    ));
}

#[tokio::test]
async fn test_incomplete_roster_is_invalid_input_and_never_sent() {
    let backend = Arc::new(FakeCompletion::happy());
    let client = AnalysisClient::new(Arc::clone(&backend));

    let mut roster = full_roster();
    roster.set(Side::Red, Role::Support, "").unwrap();
    let request = AnalysisRequest::TeamAnalysis {
        blue: roster.blue.clone(),
        red: roster.red.clone(),
        side: Side::Blue,
    };

    assert!(matches!(
        client.request(&request).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        client.request_or_fallback(&request).await,
        Err(AppError::InvalidInput(_))
    ));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_one_failing_section_does_not_block_the_others() {
    let backend = Arc::new(FakeCompletion::new(|request| {
        if request.preamble == PLAYER_ANALYSIS_PREAMBLE {
            Err(AIError::unavailable(Upstream::TextGeneration, "503", true))
        } else {
            happy_reply(request)
        }
    }));
    let client = AnalysisClient::new(Arc::clone(&backend));

    let bundle = client.analyze(&sample_input()).await.unwrap();

    assert_eq!(backend.calls(), 3);
    assert_eq!(bundle.team_analysis.summary, "Blue side wants early skirmishes around drakes.");
    assert_eq!(bundle.player_analysis, PlayerAnalysis::fallback());
    assert_eq!(bundle.matchup_insights.mid.advantage, "Strong");
    assert_eq!(
        bundle.fallback_sections(),
        vec![(AnalysisKind::PlayerAnalysis, FallbackReason::UpstreamUnavailable)]
    );
}

#[tokio::test]
async fn test_player_request_uses_pick_in_own_role() {
    let input = GenerateInput::new(
        full_roster(),
        Side::Red,
        SummonerIdentity::new("Caps", Region::EUW, Role::Adc),
    );

    let [_, player, _] = input.requests().unwrap();
    assert_eq!(
        player,
        AnalysisRequest::PlayerAnalysis {
            summoner_name: "Caps".to_string(),
            region: Region::EUW,
            champion: "Jinx".to_string(),
            role: Role::Adc,
        }
    );
}

#[tokio::test]
async fn test_patch_overview_from_model_and_fallback() {
    let client = AnalysisClient::new(Arc::new(FakeCompletion::happy()));
    let (overview, source) = client.patch_overview("14.5.1").await;
    assert_eq!(source, SectionSource::Model);
    assert_eq!(overview.trending_for(Role::Adc), ["Jinx".to_string()]);
    assert!(overview.trending_for(Role::Mid).is_empty());

    let client = AnalysisClient::new(Arc::new(FakeCompletion::failing(
        AIError::MissingCredential(Upstream::TextGeneration),
    )));
    let (overview, source) = client.patch_overview("13.24.1").await;
    assert_eq!(overview.version, "13.24.1");
    assert_eq!(overview.summary, PatchOverview::fallback().summary);
    assert_eq!(
        source,
        SectionSource::Fallback(FallbackReason::MissingCredential)
    );
}
