mod matcher;
mod orchestrator;
mod reader;
mod report;
mod resolver;

pub use orchestrator::{SyncOrchestrator, SyncPlan};
pub use report::SyncReport;
