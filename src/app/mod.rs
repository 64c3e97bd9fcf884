// Application layer - Use case interactors

pub mod container;
pub mod pipeline;

// Re-export interactors
pub use pipeline::{
    EventReceiver, JobHandle, JobId, PipelineOrchestrator, PipelineSettings,
};
