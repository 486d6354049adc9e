//! Listener module initialization.
//!
//! Converts `SrcstatConfig.listener` into a `PipelineConfig`, loads the
//! `[[servers]]` secret table and builds the `LogPipeline` with an mpsc
//! event channel for the match engine.

use anyhow::Result;
use tokio::sync::mpsc;

use srcstat_core::config::SrcstatConfig;
use srcstat_log_pipeline::{LogPipeline, LogPipelineBuilder, PipelineConfig, SecretTable, ServerEvent};

/// Initialize the UDP log listener.
///
/// # Returns
///
/// The pipeline (not yet started) and the receiving end of its event channel.
pub fn init(
    config: &SrcstatConfig,
    event_channel_capacity: usize,
) -> Result<(LogPipeline, mpsc::Receiver<ServerEvent>)> {
    tracing::info!(
        bind_addr = %config.listener.bind_addr,
        servers = config.servers.len(),
        "initializing log listener"
    );

    let pipeline_config = PipelineConfig::from_core(&config.listener)
        .map_err(|e| anyhow::anyhow!("invalid listener config: {}", e))?;
    let secrets = SecretTable::from_entries(&config.servers);
    if config.servers.is_empty() {
        tracing::warn!("no [[servers]] configured, every log packet will be rejected");
    }

    let (pipeline, event_rx) = LogPipelineBuilder::new()
        .config(pipeline_config)
        .secrets(secrets)
        .event_channel_capacity(event_channel_capacity)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build log pipeline: {}", e))?;

    let event_rx =
        event_rx.ok_or_else(|| anyhow::anyhow!("log pipeline did not create an event channel"))?;
    Ok((pipeline, event_rx))
}
