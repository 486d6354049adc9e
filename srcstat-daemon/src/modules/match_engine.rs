//! Match engine module initialization.

use anyhow::Result;
use tokio::sync::mpsc;

use srcstat_core::config::SrcstatConfig;
use srcstat_log_pipeline::ServerEvent;
use srcstat_match_engine::{CompletedMatch, MatchEngine, MatchEngineBuilder};

/// Initialize the match engine on top of the listener's event channel.
///
/// # Returns
///
/// The engine (not yet started) and the receiver for completed matches.
pub fn init(
    config: &SrcstatConfig,
    event_rx: mpsc::Receiver<ServerEvent>,
) -> Result<(MatchEngine, mpsc::Receiver<CompletedMatch>)> {
    tracing::info!(
        use_real_dmg = ?config.match_engine.use_real_dmg,
        worker_channel_capacity = config.match_engine.worker_channel_capacity,
        "initializing match engine"
    );

    MatchEngineBuilder::new()
        .config(config.match_engine.clone())
        .event_receiver(event_rx)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build match engine: {}", e))
}
