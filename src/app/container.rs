use std::sync::Arc;

use crate::adapters::toml_config::AppConfig;
use crate::adapters::{FFmpegAdapter, YtDlpAdapter};
use crate::app::pipeline::{PipelineOrchestrator, PipelineSettings};
use crate::ports::{FetchPort, MediaToolPort};

pub trait AppContainer: Send + Sync {
    fn pipeline(&self) -> Arc<PipelineOrchestrator>;
}

/// Wires the orchestrator to the yt-dlp and ffmpeg adapters
pub struct DefaultAppContainer {
    pipeline: Arc<PipelineOrchestrator>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Self {
        let fetch_port: Arc<dyn FetchPort> = Arc::new(YtDlpAdapter::from_config(config));
        let media_tool_port: Arc<dyn MediaToolPort> = Arc::new(FFmpegAdapter::from_config(config));

        let pipeline = PipelineOrchestrator::new(fetch_port, media_tool_port)
            .with_settings(PipelineSettings::from_config(config));

        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn pipeline(&self) -> Arc<PipelineOrchestrator> {
        Arc::clone(&self.pipeline)
    }
}
