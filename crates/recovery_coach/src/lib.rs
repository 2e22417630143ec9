//! Coaching chat and the session that ties the engine together.

pub mod api_types;
pub mod generator;
pub mod llm;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod retry;
pub mod session;

pub use generator::{FragmentStream, LlmGenerator, TextGenerator, APOLOGY};
pub use orchestrator::{sensation_message, ChatOrchestrator, MessageKind};
pub use session::{ChecklistUpdate, CoachSession};
