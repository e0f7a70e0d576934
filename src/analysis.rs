//! Structured analysis payloads, the fixed fallbacks substituted for them, and
//! the small display helpers the panels need (scaling gauge, lane verdicts).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::error::AIError;
use crate::roster::{Perspective, Region, Role, Side, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum AnalysisKind {
    TeamAnalysis,
    PlayerAnalysis,
    MatchupInsights,
}

// region:  --- Requests

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    TeamAnalysis {
        blue: Team,
        red: Team,
        side: Perspective,
    },
    PlayerAnalysis {
        summoner_name: String,
        region: Region,
        champion: String,
        role: Role,
    },
    MatchupInsights {
        blue: Team,
        red: Team,
        perspective: Perspective,
    },
}

impl AnalysisRequest {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisRequest::TeamAnalysis { .. } => AnalysisKind::TeamAnalysis,
            AnalysisRequest::PlayerAnalysis { .. } => AnalysisKind::PlayerAnalysis,
            AnalysisRequest::MatchupInsights { .. } => AnalysisKind::MatchupInsights,
        }
    }

    // Every field the instruction template renders must be filled.
    pub fn validate(&self) -> Result<(), String> {
        fn check_team(side: Side, team: &Team) -> Result<(), String> {
            match Role::iter().find(|role| team[role.index()].trim().is_empty()) {
                Some(role) => Err(format!("{} {} is not selected", side, role)),
                None => Ok(()),
            }
        }

        match self {
            AnalysisRequest::TeamAnalysis { blue, red, .. }
            | AnalysisRequest::MatchupInsights { blue, red, .. } => {
                check_team(Side::Blue, blue)?;
                check_team(Side::Red, red)
            }
            AnalysisRequest::PlayerAnalysis {
                summoner_name,
                champion,
                ..
            } => {
                if summoner_name.trim().is_empty() {
                    return Err("summoner name is missing".to_string());
                }
                if champion.trim().is_empty() {
                    return Err("player champion is not selected".to_string());
                }
                Ok(())
            }
        }
    }
}

// endregion:  --- Requests

// region:  --- Payloads

// A typed record the text-generation backend must return as JSON.
pub trait StructuredPayload: DeserializeOwned + Serialize + Clone {
    const LABEL: &'static str;

    fn fallback() -> Self;

    // Shape checks serde cannot express.
    fn validate(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamAnalysis {
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub win_conditions: Vec<String>,
    #[serde(default)]
    pub scaling: String, // e.g. "7/10 mid game focused"
    #[serde(default)]
    pub playstyle: String,
    #[serde(default)]
    pub teamfight: String,
}

impl StructuredPayload for TeamAnalysis {
    const LABEL: &'static str = "team analysis";

    fn fallback() -> Self {
        TeamAnalysis {
            summary: "This is a mock team analysis response for testing.".to_string(),
            strengths: strings(&["Strong early game", "Good crowd control", "Objective control"]),
            weaknesses: strings(&[
                "Lacks scaling",
                "Vulnerable to split push",
                "Weak against tank compositions",
            ]),
            win_conditions: strings(&[
                "Snowball early leads",
                "Control objectives",
                "Force team fights",
            ]),
            scaling: "7/10 mid game focused".to_string(),
            playstyle: "Aggressive early game with objective focus".to_string(),
            teamfight: "Strong engage potential with good follow-up damage".to_string(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        require_text("summary", &self.summary)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerAnalysis {
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub itemization: Vec<String>,
    #[serde(default)]
    pub performance_metrics: BTreeMap<String, String>,
}

impl StructuredPayload for PlayerAnalysis {
    const LABEL: &'static str = "player analysis";

    fn fallback() -> Self {
        PlayerAnalysis {
            summary: "This is a mock player analysis response for testing.".to_string(),
            strengths: strings(&["Good CS", "Map awareness", "Team fight positioning"]),
            improvements: strings(&["Vision control", "Roaming", "Early trading"]),
            itemization: strings(&["Item 1", "Item 2", "Situational Item 3"]),
            performance_metrics: BTreeMap::from([
                ("CS/min".to_string(), "Target 8.0+".to_string()),
                ("KDA".to_string(), "Aim for 3.5+".to_string()),
            ]),
        }
    }

    fn validate(&self) -> Result<(), String> {
        require_text("summary", &self.summary)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneMatchup {
    pub favorable: bool,
    pub advantage: String, // Strong / Slight / Even / Slight Disadvantage / Strong Disadvantage
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub counter_strategy: String,
}

impl LaneMatchup {
    fn new(favorable: bool, advantage: &str, tips: &[&str], counter_strategy: &str) -> Self {
        LaneMatchup {
            favorable,
            advantage: advantage.to_string(),
            tips: strings(tips),
            counter_strategy: counter_strategy.to_string(),
        }
    }

    pub fn verdict(&self) -> LaneVerdict {
        LaneVerdict::classify(self.favorable, &self.advantage)
    }
}

// Per-lane verdicts, keyed top/jungle/mid/adc/support.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupInsights {
    pub top: LaneMatchup,
    pub jungle: LaneMatchup,
    pub mid: LaneMatchup,
    pub adc: LaneMatchup,
    pub support: LaneMatchup,
}

impl MatchupInsights {
    pub fn lane(&self, role: Role) -> &LaneMatchup {
        match role {
            Role::Top => &self.top,
            Role::Jungle => &self.jungle,
            Role::Mid => &self.mid,
            Role::Adc => &self.adc,
            Role::Support => &self.support,
        }
    }

    pub fn lanes(&self) -> impl Iterator<Item = (Role, &LaneMatchup)> {
        Role::iter().map(move |role| (role, self.lane(role)))
    }
}

impl StructuredPayload for MatchupInsights {
    const LABEL: &'static str = "matchup insights";

    fn fallback() -> Self {
        MatchupInsights {
            top: LaneMatchup::new(
                true,
                "Strong",
                &["Harass when abilities on cooldown", "Call for jungle attention at level 6"],
                "Focus on short trades and disengage",
            ),
            jungle: LaneMatchup::new(
                false,
                "Slight Disadvantage",
                &["Focus on tracking enemy jungler", "Counter-gank mid and bot"],
                "Invade enemy jungle when lanes have priority",
            ),
            mid: LaneMatchup::new(
                true,
                "Slight",
                &["Push and roam", "Help jungler secure scuttles"],
                "Focus on wave management and vision control",
            ),
            adc: LaneMatchup::new(
                true,
                "Even",
                &["Focus on farming", "Scale for late game"],
                "Coordinate with support for aggressive trades",
            ),
            support: LaneMatchup::new(
                false,
                "Strong Disadvantage",
                &["Focus on protecting ADC", "Roam when possible"],
                "Play defensive and scale",
            ),
        }
    }

    fn validate(&self) -> Result<(), String> {
        for (role, lane) in self.lanes() {
            require_text(&format!("{}.advantage", role.lane_key()), &lane.advantage)?;
        }
        Ok(())
    }
}

// endregion:  --- Payloads

// region:  --- Results

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    TeamAnalysis(TeamAnalysis),
    PlayerAnalysis(PlayerAnalysis),
    MatchupInsights(MatchupInsights),
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::TeamAnalysis(_) => AnalysisKind::TeamAnalysis,
            AnalysisResult::PlayerAnalysis(_) => AnalysisKind::PlayerAnalysis,
            AnalysisResult::MatchupInsights(_) => AnalysisKind::MatchupInsights,
        }
    }

    pub fn fallback(kind: AnalysisKind) -> Self {
        match kind {
            AnalysisKind::TeamAnalysis => AnalysisResult::TeamAnalysis(TeamAnalysis::fallback()),
            AnalysisKind::PlayerAnalysis => {
                AnalysisResult::PlayerAnalysis(PlayerAnalysis::fallback())
            }
            AnalysisKind::MatchupInsights => {
                AnalysisResult::MatchupInsights(MatchupInsights::fallback())
            }
        }
    }
}

// Why a section shows canned content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    MissingCredential,
    UpstreamUnavailable,
    MalformedResponse,
}

impl FallbackReason {
    pub fn from_error(error: &AIError) -> Self {
        match error {
            AIError::MissingCredential(_) | AIError::EmbeddingBackendUnavailable => {
                FallbackReason::MissingCredential
            }
            AIError::UpstreamUnavailable { .. } => FallbackReason::UpstreamUnavailable,
            AIError::MalformedResponse(_) => FallbackReason::MalformedResponse,
        }
    }

    pub fn notice(self) -> &'static str {
        match self {
            FallbackReason::MissingCredential => {
                "Sample analysis shown: set an OpenAI API key for live analysis."
            }
            FallbackReason::UpstreamUnavailable => {
                "Sample analysis shown: the analysis service could not be reached."
            }
            FallbackReason::MalformedResponse => {
                "Sample analysis shown: the analysis service returned an unusable answer."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionSource {
    #[default]
    Model,
    Fallback(FallbackReason),
}

impl SectionSource {
    pub fn is_fallback(self) -> bool {
        matches!(self, SectionSource::Fallback(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Provenance {
    pub team_analysis: SectionSource,
    pub player_analysis: SectionSource,
    pub matchup_insights: SectionSource,
}

impl Provenance {
    pub fn get(&self, kind: AnalysisKind) -> SectionSource {
        match kind {
            AnalysisKind::TeamAnalysis => self.team_analysis,
            AnalysisKind::PlayerAnalysis => self.player_analysis,
            AnalysisKind::MatchupInsights => self.matchup_insights,
        }
    }

    pub fn set(&mut self, kind: AnalysisKind, source: SectionSource) {
        match kind {
            AnalysisKind::TeamAnalysis => self.team_analysis = source,
            AnalysisKind::PlayerAnalysis => self.player_analysis = source,
            AnalysisKind::MatchupInsights => self.matchup_insights = source,
        }
    }
}

// The three sections produced by one generate. Never partially updated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub team_analysis: TeamAnalysis,
    pub player_analysis: PlayerAnalysis,
    pub matchup_insights: MatchupInsights,
    #[serde(skip)]
    pub provenance: Provenance,
}

impl AnalysisBundle {
    pub fn insert(&mut self, result: AnalysisResult, source: SectionSource) {
        self.provenance.set(result.kind(), source);
        match result {
            AnalysisResult::TeamAnalysis(team) => self.team_analysis = team,
            AnalysisResult::PlayerAnalysis(player) => self.player_analysis = player,
            AnalysisResult::MatchupInsights(matchup) => self.matchup_insights = matchup,
        }
    }

    pub fn fallback_sections(&self) -> Vec<(AnalysisKind, FallbackReason)> {
        AnalysisKind::iter()
            .filter_map(|kind| match self.provenance.get(kind) {
                SectionSource::Fallback(reason) => Some((kind, reason)),
                SectionSource::Model => None,
            })
            .collect()
    }

    // One "<section_name>: <json>" fragment per top-level section, in a fixed order.
    pub fn fragments(&self) -> Result<Vec<Fragment>, serde_json::Error> {
        Ok(vec![
            Fragment::render(AnalysisKind::TeamAnalysis, &self.team_analysis)?,
            Fragment::render(AnalysisKind::PlayerAnalysis, &self.player_analysis)?,
            Fragment::render(AnalysisKind::MatchupInsights, &self.matchup_insights)?,
        ])
    }
}

// A retrievable unit of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub section: AnalysisKind,
    pub text: String,
}

impl Fragment {
    fn render(section: AnalysisKind, content: &impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(Fragment {
            section,
            text: format!("{}: {}", section, serde_json::to_string_pretty(content)?),
        })
    }
}

// endregion:  --- Results

// region:  --- Display helpers

// How the team "scaling" field should be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalingDisplay {
    Gauge { percent: u8, label: String },
    Text(String),
}

// "7/10 mid game focused" -> 70, "10" -> 100. Only ratings out of 10 get a gauge.
pub fn scaling_fill(scaling: &str) -> Option<u8> {
    if !scaling.contains("10") {
        return None;
    }
    let score = scaling.split('/').next().unwrap_or(scaling);
    let score: u32 = score.trim().parse().ok()?;
    Some(score.saturating_mul(10).min(100) as u8)
}

pub fn scaling_display(scaling: &str) -> ScalingDisplay {
    match scaling_fill(scaling) {
        Some(percent) => ScalingDisplay::Gauge {
            percent,
            label: scaling.to_string(),
        },
        None if scaling.trim().is_empty() => ScalingDisplay::Text("Not available".to_string()),
        None => ScalingDisplay::Text(scaling.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneVerdict {
    Favorable,
    Even,
    Unfavorable,
}

impl LaneVerdict {
    pub fn classify(favorable: bool, advantage: &str) -> Self {
        if favorable {
            LaneVerdict::Favorable
        } else if advantage.trim() == "Even" {
            LaneVerdict::Even
        } else {
            LaneVerdict::Unfavorable
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            LaneVerdict::Favorable => "↗",
            LaneVerdict::Even => "↔",
            LaneVerdict::Unfavorable => "↘",
        }
    }
}

impl fmt::Display for LaneVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LaneVerdict::Favorable => "has advantage",
            LaneVerdict::Even => "is even",
            LaneVerdict::Unfavorable => "is at a disadvantage",
        };
        f.write_str(text)
    }
}

// endregion:  --- Display helpers

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("field '{}' is empty", field))
    } else {
        Ok(())
    }
}
