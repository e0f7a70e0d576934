use std::sync::Arc;
use std::time::Instant;

use crate::analysis::{
    AnalysisBundle, AnalysisKind, AnalysisRequest, AnalysisResult, FallbackReason, MatchupInsights,
    PlayerAnalysis, SectionSource, StructuredPayload, TeamAnalysis,
};
use crate::backend::{CompletionBackend, CompletionRequest};
use crate::error::{AIError, AppError, Result};
use crate::patch::PatchOverview;
use crate::prompts::{PATCH_OVERVIEW_PREAMBLE, preamble_for, render_patch_request, render_request};
use crate::session::GenerateInput;

// Issues structured-analysis requests. Holds no cache: every call goes upstream.
pub struct AnalysisClient<B> {
    backend: Arc<B>,
    temperature: f32,
}

impl<B> Clone for AnalysisClient<B> {
    fn clone(&self) -> Self {
        AnalysisClient {
            backend: Arc::clone(&self.backend),
            temperature: self.temperature,
        }
    }
}

impl<B: CompletionBackend> AnalysisClient<B> {
    pub fn new(backend: Arc<B>) -> Self {
        AnalysisClient {
            backend,
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn request(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        request.validate().map_err(AppError::InvalidInput)?;

        let preamble = preamble_for(request);
        let prompt = render_request(request);
        let result = match request.kind() {
            AnalysisKind::TeamAnalysis => AnalysisResult::TeamAnalysis(
                self.fetch_structured::<TeamAnalysis>(preamble, prompt).await?,
            ),
            AnalysisKind::PlayerAnalysis => AnalysisResult::PlayerAnalysis(
                self.fetch_structured::<PlayerAnalysis>(preamble, prompt).await?,
            ),
            AnalysisKind::MatchupInsights => AnalysisResult::MatchupInsights(
                self.fetch_structured::<MatchupInsights>(preamble, prompt).await?,
            ),
        };
        Ok(result)
    }

    // Upstream failures become the fixed payload for the kind. Only bad input is an error.
    pub async fn request_or_fallback(&self, request: &AnalysisRequest) -> Result<(AnalysisResult, SectionSource)> {
        match self.request(request).await {
            Ok(result) => Ok((result, SectionSource::Model)),
            Err(AppError::AI(e)) => {
                let reason = FallbackReason::from_error(&e);
                log::warn!("Using fallback {}: {}", request.kind(), e);
                Ok((AnalysisResult::fallback(request.kind()), SectionSource::Fallback(reason)))
            }
            Err(e) => Err(e),
        }
    }

    // Runs the three analyses concurrently; each section falls back on its own.
    pub async fn analyze(&self, input: &GenerateInput) -> Result<AnalysisBundle> {
        let [team, player, matchup] = input.requests()?;

        let started = Instant::now();
        let (team, player, matchup) = futures::join!(
            self.request_or_fallback(&team),
            self.request_or_fallback(&player),
            self.request_or_fallback(&matchup),
        );

        let mut bundle = AnalysisBundle::default();
        for (result, source) in [team?, player?, matchup?] {
            bundle.insert(result, source);
        }
        log::info!(
            "Analysis finished in {:?} ({} fallback sections)",
            started.elapsed(),
            bundle.fallback_sections().len()
        );
        Ok(bundle)
    }

    pub async fn patch_overview(&self, version: &str) -> (PatchOverview, SectionSource) {
        match self
            .fetch_structured::<PatchOverview>(PATCH_OVERVIEW_PREAMBLE, render_patch_request(version))
            .await
        {
            Ok(mut overview) => {
                if overview.version.trim().is_empty() {
                    overview.version = version.to_string();
                }
                (overview, SectionSource::Model)
            }
            Err(e) => {
                log::warn!("Using fallback patch overview: {}", e);
                let mut overview = PatchOverview::fallback();
                overview.version = version.to_string();
                (overview, SectionSource::Fallback(FallbackReason::from_error(&e)))
            }
        }
    }

    async fn fetch_structured<P: StructuredPayload>(&self, preamble: &str, prompt: String) -> Result<P, AIError> {
        let request = CompletionRequest::new(preamble, prompt)
            .json()
            .temperature(self.temperature);

        let started = Instant::now();
        let reply = self.backend.complete(request).await?;
        log::debug!("{} reply after {:?}", P::LABEL, started.elapsed());

        let payload: P = serde_json::from_str(strip_code_fences(&reply))
            .map_err(|e| AIError::malformed(format!("{}: {}", P::LABEL, e)))?;
        payload
            .validate()
            .map_err(|reason| AIError::malformed(format!("{}: {}", P::LABEL, reason)))?;
        Ok(payload)
    }
}

// Models like to wrap JSON in ```json fences even in JSON mode.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the end of the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().trim_end_matches("```").trim()
}
