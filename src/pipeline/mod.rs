pub mod batch;
pub mod orchestrator;
pub mod reconcile;
