//! Prometheus metrics HTTP server.
//!
//! Uses the built-in HTTP listener from `metrics-exporter-prometheus`
//! to expose the Prometheus scrape endpoint.
//!
//! # Usage
//!
//! ```ignore
//! let config = MetricsConfig::default();
//! install_metrics_recorder(&config)?;
//! // After this, all metrics::counter!() and metrics::gauge!() calls are recorded
//! ```

use std::net::SocketAddr;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use srcstat_core::config::MetricsConfig;

/// Parse `listen_addr:port` into a socket address.
pub fn metrics_addr(config: &MetricsConfig) -> Result<SocketAddr> {
    if config.endpoint != "/metrics" {
        return Err(anyhow::anyhow!(
            "unsupported metrics endpoint '{}': only '/metrics' is currently supported",
            config.endpoint
        ));
    }

    format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address: {}", e))
}

/// Install the global metrics recorder and start the HTTP listener.
///
/// This function should be called once per process.
///
/// # Errors
///
/// - Invalid address or endpoint
/// - Socket binding fails
/// - Global recorder is already installed
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr = metrics_addr(config)?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces; restrict listen_addr in untrusted networks"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    srcstat_core::metrics::describe_all();

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_address_parses() {
        let addr = metrics_addr(&MetricsConfig::default()).unwrap();
        assert_eq!(addr.port(), MetricsConfig::default().port);
    }

    #[test]
    fn custom_endpoint_is_rejected() {
        let config = MetricsConfig {
            endpoint: "/stats".to_owned(),
            ..MetricsConfig::default()
        };
        assert!(metrics_addr(&config).is_err());
    }

    #[test]
    fn bad_listen_addr_is_rejected() {
        let config = MetricsConfig {
            listen_addr: "not-an-ip".to_owned(),
            ..MetricsConfig::default()
        };
        let err = metrics_addr(&config).unwrap_err();
        assert!(err.to_string().contains("invalid metrics listen address"));
    }
}
