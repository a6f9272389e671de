pub mod config;
pub mod error;
pub mod html;
pub mod model;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod publish_ledger;
pub mod timeline;
pub mod web_pages;

pub use config::AppConfig;
pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use providers::Collaborators;
