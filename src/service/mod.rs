pub mod analysis_client;
pub mod categorizer;
pub mod summary;
pub mod workflow;

pub use analysis_client::{AnalysisBackend, AnalysisClientError, HttpAnalysisClient};
pub use categorizer::{categorize, infer_category};
pub use summary::summarize;
pub use workflow::{BillSession, BillSnapshot, BillWorkflow, WorkflowOutcome};
