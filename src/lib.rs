pub mod ai;
pub mod analysis;
pub mod backend;
pub mod chat;
pub mod client;
pub mod error;
pub mod logging;
pub mod patch;
pub mod prompts;
pub mod reference;
pub mod render;
pub mod roster;
pub mod session;
pub mod settings;
pub mod store;

// Re-export commonly used items for easier access
pub use ai::OpenAIBackend;
pub use analysis::{
    AnalysisBundle, AnalysisKind, AnalysisRequest, AnalysisResult, FallbackReason, LaneMatchup,
    LaneVerdict, MatchupInsights, PlayerAnalysis, SectionSource, StructuredPayload, TeamAnalysis,
};
pub use backend::{CompletionBackend, CompletionRequest, EmbeddingBackend, RetryPolicy};
pub use chat::{ChatEngine, ChatSession, ChatTurn, ConversationIndex};
pub use client::AnalysisClient;
pub use error::{AIError, AppError, Upstream};
pub use patch::PatchOverview;
pub use roster::{Perspective, Region, Role, RosterSelection, Side, SummonerIdentity, Team};
pub use session::{GenerateInput, Session, SessionRegistry};
pub use settings::Settings;
pub use store::ResultStore;
