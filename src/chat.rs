//! Question answering over a generated bundle.
//!
//! Each bundle section becomes one [`Fragment`]; fragments are embedded once
//! into a [`ConversationIndex`] and the closest `k` are handed to the
//! text-generation backend together with the conversation so far.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::analysis::{AnalysisBundle, Fragment};
use crate::backend::{CompletionBackend, CompletionRequest, EmbeddingBackend};
use crate::error::{AIError, AppError, Result};
use crate::prompts::{
    CHAT_PREAMBLE, CONDENSE_QUESTION_PREAMBLE, render_chat_prompt, render_condense_prompt,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        ChatTurn {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

// region:  --- Index

// Embedded fragments of one bundle. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationIndex {
    entries: Vec<(Fragment, Vec<f32>)>,
}

impl ConversationIndex {
    pub fn from_embeddings(
        fragments: Vec<Fragment>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, AIError> {
        if fragments.len() != vectors.len() {
            return Err(AIError::malformed(format!(
                "expected {} embeddings, got {}",
                fragments.len(),
                vectors.len()
            )));
        }
        Ok(ConversationIndex {
            entries: fragments.into_iter().zip(vectors).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.entries.iter().map(|(fragment, _)| fragment)
    }

    // Highest cosine similarity first; equal scores keep fragment order.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<&Fragment> {
        let mut scored: Vec<(&Fragment, f32)> = self
            .entries
            .iter()
            .map(|(fragment, vector)| (fragment, cosine_similarity(query, vector)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.into_iter().take(k).map(|(fragment, _)| fragment).collect()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

// endregion:  --- Index

// region:  --- Engine

// Stateless half of the chat: talks to the backends, owns no history.
pub struct ChatEngine<B, E> {
    completion: Arc<B>,
    embedding: Arc<E>,
    k: usize,
    temperature: f32,
    condense_follow_ups: bool,
}

impl<B, E> Clone for ChatEngine<B, E> {
    fn clone(&self) -> Self {
        ChatEngine {
            completion: Arc::clone(&self.completion),
            embedding: Arc::clone(&self.embedding),
            k: self.k,
            temperature: self.temperature,
            condense_follow_ups: self.condense_follow_ups,
        }
    }
}

impl<B: CompletionBackend, E: EmbeddingBackend> ChatEngine<B, E> {
    pub fn new(completion: Arc<B>, embedding: Arc<E>) -> Self {
        ChatEngine {
            completion,
            embedding,
            k: 3,
            temperature: 0.0,
            condense_follow_ups: true,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_condensing(mut self, condense_follow_ups: bool) -> Self {
        self.condense_follow_ups = condense_follow_ups;
        self
    }

    pub async fn build_index(&self, bundle: &AnalysisBundle) -> Result<ConversationIndex, AIError> {
        let fragments = bundle
            .fragments()
            .map_err(|e| AIError::malformed(format!("could not serialize bundle: {}", e)))?;
        let texts = fragments.iter().map(|f| f.text.clone()).collect::<Vec<_>>();

        let started = Instant::now();
        let vectors = self.embedding.embed(texts).await.map_err(embedding_error)?;

        let index = ConversationIndex::from_embeddings(fragments, vectors)?;
        log::info!(
            "Built chat index over {} fragments in {:?}",
            index.len(),
            started.elapsed()
        );
        Ok(index)
    }

    pub async fn answer(
        &self,
        index: &ConversationIndex,
        history: &[ChatTurn],
        question: &str,
    ) -> Result<String, AIError> {
        let standalone = self.standalone_question(history, question).await?;

        let mut query = self
            .embedding
            .embed(vec![standalone])
            .await
            .map_err(embedding_error)?;
        let query = query
            .pop()
            .ok_or_else(|| AIError::malformed("no embedding returned for the question"))?;

        let context = index.top_k(&query, self.k);
        log::debug!(
            "Retrieved sections: {:?}",
            context.iter().map(|f| f.section).collect::<Vec<_>>()
        );

        let request = CompletionRequest::new(CHAT_PREAMBLE, render_chat_prompt(&context, question))
            .history(history)
            .temperature(self.temperature);
        let answer = self.completion.complete(request).await?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(AIError::malformed("empty chat answer"));
        }
        Ok(answer.to_string())
    }

    // Follow-ups like "and theirs?" retrieve poorly on their own.
    async fn standalone_question(&self, history: &[ChatTurn], question: &str) -> Result<String, AIError> {
        if !self.condense_follow_ups || history.is_empty() {
            return Ok(question.to_string());
        }

        let request = CompletionRequest::new(CONDENSE_QUESTION_PREAMBLE, render_condense_prompt(question))
            .history(history)
            .temperature(0.0);
        let condensed = self.completion.complete(request).await?;
        let condensed = condensed.trim();
        if condensed.is_empty() {
            Ok(question.to_string())
        } else {
            Ok(condensed.to_string())
        }
    }
}

// A missing embedding credential is a configuration problem, whatever the backend calls it.
fn embedding_error(error: AIError) -> AIError {
    if error.is_missing_credential() {
        AIError::EmbeddingBackendUnavailable
    } else {
        error
    }
}

// endregion:  --- Engine

// region:  --- Session state

#[derive(Debug, Clone, Default)]
pub enum ChatState {
    #[default]
    Uninitialized,
    Ready(Arc<ConversationIndex>),
}

// Index plus history for the current bundle.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    state: ChatState,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ChatState::Ready(_))
    }

    pub fn index(&self) -> Option<Arc<ConversationIndex>> {
        match &self.state {
            ChatState::Ready(index) => Some(Arc::clone(index)),
            ChatState::Uninitialized => None,
        }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    // Installs an index built elsewhere. History belongs to the bundle, so it is kept.
    pub fn attach(&mut self, index: Arc<ConversationIndex>) {
        self.state = ChatState::Ready(index);
    }

    pub fn record(&mut self, turn: ChatTurn) {
        self.history.push(turn);
    }

    pub fn reset(&mut self) {
        self.state = ChatState::Uninitialized;
        self.history.clear();
    }

    // Rebuilds the index for a new bundle and starts a fresh conversation.
    pub async fn build<B, E>(&mut self, engine: &ChatEngine<B, E>, bundle: &AnalysisBundle) -> Result<(), AIError>
    where
        B: CompletionBackend,
        E: EmbeddingBackend,
    {
        self.reset();
        let index = engine.build_index(bundle).await?;
        self.attach(Arc::new(index));
        Ok(())
    }

    // The turn is appended only when an answer came back.
    pub async fn ask<B, E>(&mut self, engine: &ChatEngine<B, E>, question: &str) -> Result<String>
    where
        B: CompletionBackend,
        E: EmbeddingBackend,
    {
        let index = self.index().ok_or(AppError::NoAnalysis)?;
        let answer = engine.answer(&index, &self.history, question).await?;
        self.record(ChatTurn::new(question, answer.clone()));
        Ok(answer)
    }
}

// endregion:  --- Session state
