#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use draftmaster::prompts::{
    CHAT_PREAMBLE, CONDENSE_QUESTION_PREAMBLE, MATCHUP_INSIGHTS_PREAMBLE,
    PATCH_OVERVIEW_PREAMBLE, PLAYER_ANALYSIS_PREAMBLE, TEAM_ANALYSIS_PREAMBLE,
};
use draftmaster::*;

pub const TEAM_JSON: &str = r#"{
  "summary": "Blue side wants early skirmishes around drakes.",
  "strengths": ["Early pressure", "Pick potential"],
  "weaknesses": ["Falls off after 30 minutes"],
  "win_conditions": ["Take first three drakes", "Close before Jinx scales"],
  "scaling": "6/10 early game focused",
  "playstyle": "Skirmish-heavy",
  "teamfight": "Strong engage from Leona"
}"#;

pub const PLAYER_JSON: &str = r#"{
  "summary": "Ahri in mid rewards roaming after level 6.",
  "strengths": ["Wave clear"],
  "improvements": ["Ward before roaming"],
  "itemization": ["Luden's Companion", "Zhonya's Hourglass"],
  "performance_metrics": {"CS/min": "7.5+"}
}"#;

pub const MATCHUP_JSON: &str = r#"{
  "top": {"favorable": true, "advantage": "Slight", "tips": ["Short trades"], "counter_strategy": "Freeze near tower"},
  "jungle": {"favorable": false, "advantage": "Even", "tips": ["Track the enemy"], "counter_strategy": "Mirror pathing"},
  "mid": {"favorable": true, "advantage": "Strong", "tips": ["Push and roam"], "counter_strategy": "Hold charm for engage"},
  "adc": {"favorable": false, "advantage": "Slight Disadvantage", "tips": ["Farm safely"], "counter_strategy": "Play for scaling"},
  "support": {"favorable": true, "advantage": "Strong", "tips": ["Look for level 2 all-in"], "counter_strategy": "Hook on cooldown"}
}"#;

pub const PATCH_JSON: &str = r#"{
  "version": "14.5.1",
  "summary": "Bruisers are back in the top lane.",
  "champion_changes": ["Aatrox buffed"],
  "item_changes": ["Sundered Sky cheaper"],
  "meta_predictions": ["Juggernauts rise"],
  "trending_picks": {"Top": ["Aatrox"], "ADC": ["Jinx"]},
  "player_tips": ["Respect level 6 spikes"]
}"#;

pub const CHAT_ANSWER: &str = "Take early drakes and end before the enemy scales.";

type Handler = dyn Fn(&CompletionRequest) -> Result<String, AIError> + Send + Sync;

// Completion backend driven by a closure, with a log of every request.
pub struct FakeCompletion {
    handler: Box<Handler>,
    requests: Mutex<Vec<CompletionRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeCompletion {
    pub fn new(
        handler: impl Fn(&CompletionRequest) -> Result<String, AIError> + Send + Sync + 'static,
    ) -> Self {
        FakeCompletion {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn happy() -> Self {
        Self::new(happy_reply)
    }

    pub fn failing(error: AIError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    // Every call waits for a permit before answering.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn calls_with(&self, preamble: &str) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.preamble == preamble)
            .collect()
    }
}

impl CompletionBackend for FakeCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AIError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| AIError::unavailable(Upstream::TextGeneration, "gate closed", false))?
                .forget();
        }
        (self.handler)(&request)
    }
}

// A well-behaved model: valid JSON per preamble, a fixed chat answer.
pub fn happy_reply(request: &CompletionRequest) -> Result<String, AIError> {
    let preamble = request.preamble.as_str();
    let reply = if preamble == TEAM_ANALYSIS_PREAMBLE {
        TEAM_JSON.to_string()
    } else if preamble == PLAYER_ANALYSIS_PREAMBLE {
        PLAYER_JSON.to_string()
    } else if preamble == MATCHUP_INSIGHTS_PREAMBLE {
        MATCHUP_JSON.to_string()
    } else if preamble == PATCH_OVERVIEW_PREAMBLE {
        PATCH_JSON.to_string()
    } else if preamble == CONDENSE_QUESTION_PREAMBLE {
        // Echo the follow-up back as the standalone question.
        request
            .prompt
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("Follow-up question: ")
            .to_string()
    } else if preamble == CHAT_PREAMBLE {
        CHAT_ANSWER.to_string()
    } else {
        return Err(AIError::malformed("unexpected preamble"));
    };
    Ok(reply)
}

// Embeds text as keyword presence flags, one dimension per section.
pub struct KeywordEmbedding {
    failure: Option<AIError>,
    calls: AtomicUsize,
}

const KEYWORDS: &[(&str, usize)] = &[
    ("team_analysis", 0),
    ("win condition", 0),
    ("playstyle", 0),
    ("player_analysis", 1),
    ("build", 1),
    ("item", 1),
    ("matchup_insights", 2),
    ("lane", 2),
    ("counter", 2),
];

impl KeywordEmbedding {
    pub fn new() -> Self {
        KeywordEmbedding {
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: AIError) -> Self {
        KeywordEmbedding {
            failure: Some(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let text = text.to_lowercase();
        let mut vector = vec![0.0; 3];
        for (keyword, dim) in KEYWORDS {
            if text.contains(keyword) {
                vector[*dim] = 1.0;
            }
        }
        vector
    }
}

impl EmbeddingBackend for KeywordEmbedding {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AIError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(texts.iter().map(|text| Self::vector(text)).collect())
    }
}

pub fn team(picks: [&str; 5]) -> Team {
    picks.map(|pick| pick.to_string())
}

pub fn full_roster() -> RosterSelection {
    RosterSelection::from_teams(
        team(["Aatrox", "Lee Sin", "Ahri", "Kai'Sa", "Leona"]),
        team(["Darius", "Graves", "Syndra", "Jinx", "Thresh"]),
    )
}

pub fn sample_input() -> GenerateInput {
    GenerateInput::new(
        full_roster(),
        Side::Blue,
        SummonerIdentity::new("Faker", Region::KR, Role::Mid),
    )
}

pub fn session_with(
    completion: Arc<FakeCompletion>,
    embedding: Arc<KeywordEmbedding>,
) -> Session<FakeCompletion, KeywordEmbedding> {
    let mut settings = Settings::default();
    settings.max_retries = 0;
    Session::from_settings(&settings, completion, embedding)
}
