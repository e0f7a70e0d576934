//! The command surface handed to a UI layer: `generate`, `ask` and `reset`
//! on an explicit [`Session`], plus a [`SessionRegistry`] for running many
//! sessions side by side.
//!
//! Operations on one session are serialised. A `reset` never waits for them:
//! it bumps the session generation, and anything that finishes against an
//! older generation is dropped with [`AppError::Superseded`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use uuid::Uuid;

use crate::analysis::{AnalysisBundle, AnalysisRequest};
use crate::backend::{CompletionBackend, EmbeddingBackend};
use crate::chat::{ChatEngine, ChatSession, ChatTurn};
use crate::client::AnalysisClient;
use crate::error::{AppError, Result};
use crate::roster::{Perspective, RosterSelection, SummonerIdentity};
use crate::settings::Settings;
use crate::store::ResultStore;

// Everything one `generate` depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateInput {
    pub roster: RosterSelection,
    #[serde(default)]
    pub perspective: Perspective,
    pub summoner: SummonerIdentity,
}

impl GenerateInput {
    pub fn new(roster: RosterSelection, perspective: Perspective, summoner: SummonerIdentity) -> Self {
        GenerateInput {
            roster,
            perspective,
            summoner,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.roster.validate()?;
        self.summoner.validate()
    }

    // Team, player and matchup requests, in that order.
    // The player's champion is the pick in their role on the perspective side.
    pub fn requests(&self) -> Result<[AnalysisRequest; 3]> {
        self.validate()?;

        let roster = self.roster.trimmed();
        let champion = roster.get(self.perspective, self.summoner.role).to_string();
        let RosterSelection { blue, red } = roster;
        Ok([
            AnalysisRequest::TeamAnalysis {
                blue: blue.clone(),
                red: red.clone(),
                side: self.perspective,
            },
            AnalysisRequest::PlayerAnalysis {
                summoner_name: self.summoner.name.trim().to_string(),
                region: self.summoner.region,
                champion,
                role: self.summoner.role,
            },
            AnalysisRequest::MatchupInsights {
                blue,
                red,
                perspective: self.perspective,
            },
        ])
    }
}

// Mutable part of a session, behind a short-lived lock.
#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    store: ResultStore,
    chat: ChatSession,
}

pub struct Session<B, E> {
    id: Uuid,
    client: AnalysisClient<B>,
    chat: ChatEngine<B, E>,
    reuse_identical_requests: bool,
    op_lock: AsyncMutex<()>, // Serialises generate and ask.
    state: Mutex<SessionState>,
}

impl<B: CompletionBackend, E: EmbeddingBackend> Session<B, E> {
    pub fn new(client: AnalysisClient<B>, chat: ChatEngine<B, E>) -> Self {
        Session {
            id: Uuid::new_v4(),
            client,
            chat,
            reuse_identical_requests: false,
            op_lock: AsyncMutex::new(()),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn from_settings(settings: &Settings, completion: Arc<B>, embedding: Arc<E>) -> Self {
        let client = AnalysisClient::new(Arc::clone(&completion))
            .with_temperature(settings.analysis_temperature);
        let chat = ChatEngine::new(completion, embedding)
            .with_k(settings.retrieval_k)
            .with_temperature(settings.chat_temperature)
            .with_condensing(settings.condense_follow_ups);
        Self::new(client, chat).reuse_identical_requests(settings.reuse_identical_requests)
    }

    pub fn reuse_identical_requests(mut self, reuse: bool) -> Self {
        self.reuse_identical_requests = reuse;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client(&self) -> &AnalysisClient<B> {
        &self.client
    }

    pub async fn generate(&self, input: GenerateInput) -> Result<AnalysisBundle> {
        input.validate()?;
        let _op = self.op_lock.lock().await;

        let generation = {
            let state = self.lock_state();
            if self.reuse_identical_requests && state.store.matches(&input) {
                log::info!("Session {}: reusing bundle for identical input", self.id);
                return Ok(state.store.bundle().clone());
            }
            state.generation
        };

        log::info!("Session {}: generating analysis", self.id);
        let bundle = self.client.analyze(&input).await?;
        let index = match self.chat.build_index(&bundle).await {
            Ok(index) => Some(Arc::new(index)),
            Err(e) => {
                log::warn!("Session {}: chat index not built: {}", self.id, e);
                None
            }
        };

        let mut state = self.lock_state();
        if state.generation != generation {
            log::info!("Session {}: discarding analysis finished after reset", self.id);
            return Err(AppError::Superseded);
        }
        state.store.set(bundle.clone(), input);
        state.chat.reset();
        if let Some(index) = index {
            state.chat.attach(index);
        }
        Ok(bundle)
    }

    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::invalid("question is empty"));
        }
        let _op = self.op_lock.lock().await;

        let (generation, index, history, bundle) = {
            let state = self.lock_state();
            let bundle = state.store.get().ok_or(AppError::NoAnalysis)?;
            let index = state.chat.index();
            // The bundle is only needed when the index has to be built now.
            let bundle = index.is_none().then(|| bundle.clone());
            (state.generation, index, state.chat.history().to_vec(), bundle)
        };

        let index = match (index, bundle) {
            (Some(index), _) => index,
            (None, Some(bundle)) => {
                let index = Arc::new(self.chat.build_index(&bundle).await?);
                let mut state = self.lock_state();
                if state.generation != generation {
                    return Err(AppError::Superseded);
                }
                state.chat.attach(Arc::clone(&index));
                index
            }
            (None, None) => return Err(AppError::NoAnalysis),
        };

        let answer = self.chat.answer(&index, &history, question).await?;

        let mut state = self.lock_state();
        if state.generation != generation {
            log::info!("Session {}: discarding answer finished after reset", self.id);
            return Err(AppError::Superseded);
        }
        state.chat.record(ChatTurn::new(question, answer.clone()));
        Ok(answer)
    }

    // Clears bundle, index and history. Never waits for an in-flight operation.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.generation += 1;
        state.store.reset();
        state.chat.reset();
        log::info!("Session {}: reset (generation {})", self.id, state.generation);
    }

    pub fn bundle(&self) -> Option<AnalysisBundle> {
        self.lock_state().store.get().cloned()
    }

    pub fn is_generated(&self) -> bool {
        self.lock_state().store.is_generated()
    }

    pub fn is_chat_ready(&self) -> bool {
        self.lock_state().chat.is_ready()
    }

    pub fn history(&self) -> Vec<ChatTurn> {
        self.lock_state().chat.history().to_vec()
    }

    pub fn generation(&self) -> u64 {
        self.lock_state().generation
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        // The state is plain data; a panic elsewhere cannot leave it half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Independent sessions keyed by id. Nothing is shared between them but the backends.
pub struct SessionRegistry<B, E> {
    settings: Settings,
    completion: Arc<B>,
    embedding: Arc<E>,
    sessions: RwLock<HashMap<Uuid, Arc<Session<B, E>>>>,
}

impl<B: CompletionBackend, E: EmbeddingBackend> SessionRegistry<B, E> {
    pub fn new(settings: Settings, completion: Arc<B>, embedding: Arc<E>) -> Self {
        SessionRegistry {
            settings,
            completion,
            embedding,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn open(&self) -> Arc<Session<B, E>> {
        let session = Arc::new(Session::from_settings(
            &self.settings,
            Arc::clone(&self.completion),
            Arc::clone(&self.embedding),
        ));
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        log::info!("Opened session {}", session.id());
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<Session<B, E>>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::UnknownSession(id))
    }

    // Resets the session so late results from it are discarded, then drops it.
    pub async fn close(&self, id: Uuid) -> Result<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(AppError::UnknownSession(id))?;
        session.reset();
        log::info!("Closed session {}", id);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
