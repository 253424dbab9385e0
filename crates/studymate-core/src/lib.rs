//! StudyMate core: configuration, per-user session state, query resolution,
//! and the conversation loop shared by the CLI surfaces.

pub mod app;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod session;

pub use app::{Command, StudyApp};
pub use channel::{Channel, ChannelError, ChannelMessage};
pub use config::Config;
pub use engine::{Processed, StudyEngine, summarize};
pub use error::StudyError;
pub use registry::{SessionId, SessionRegistry, SharedSession};
pub use resolver::{Answer, QueryResolver};
pub use session::{LoadedDocument, SessionState};
pub use studymate_index::ScoredChunk;

pub use studymate_document;
pub use studymate_index;
