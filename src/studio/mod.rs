//! The AURA studio: prompts, interpretation, error classification and the
//! per-feature orchestration on top of a generative model.

mod board;
mod errors;
mod interpret;
mod market;
mod models;
mod orchestrator;
mod prompts;
mod quota;
mod schemas;
mod search_index;
mod state;
mod tutor;

pub use board::AnalysisBoard;
pub use errors::{
    classify, ErrorKind, StudioError, BAD_REQUEST_MESSAGE, EMPTY_RESPONSE_MESSAGE,
    INVALID_RESPONSE_MESSAGE, NETWORK_ERROR_MESSAGE, QUOTA_EXCEEDED_MESSAGE,
    UNKNOWN_ERROR_MESSAGE,
};
pub use interpret::InterpretError;
pub use models::*;
pub use orchestrator::{
    SearchOutcome, Studio, StudioSettings, StudioSnapshot, TutorUpdate, DEFAULT_PRODUCER_COUNT,
};
pub use quota::QuotaGate;
pub use search_index::{default_search_index, load_search_index};
pub use state::FeatureState;
pub use tutor::{
    ConnectionState, LiveServerMessage, MessageEffects, Speaker, TranscriptTurn, TutorEvent,
    TutorSession, DEFAULT_LIVE_MODEL,
};
