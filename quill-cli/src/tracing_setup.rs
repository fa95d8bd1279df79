//! Log output for the `quill` binary.
//!
//! Everything is written to stderr; stdout carries only command results.
//! `RUST_LOG` takes precedence over `--debug`. With the `telemetry` feature,
//! `--otel` also ships spans to `$OTEL_EXPORTER_OTLP_ENDPOINT`.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "telemetry")]
const DEFAULT_ENDPOINT: &str = "http://localhost:4317";

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    pub debug: bool,
    pub otel: bool,
}

impl TracingConfig {
    /// Filter used when `RUST_LOG` is unset
    fn default_filter(&self) -> &'static str {
        if self.debug {
            "quill=debug,quill_store=debug,sqlx=info,warn"
        } else {
            "warn"
        }
    }
}

fn env_filter(config: &TracingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter()))
}

pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[cfg(feature = "telemetry")]
pub fn init_tracing_with_otel(config: &TracingConfig) -> Result<()> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_owned());
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .map_err(|err| anyhow!("OTLP exporter for {endpoint}: {err}"))?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(opentelemetry_sdk::Resource::new([KeyValue::new(
            "service.name",
            "quill",
        )]))
        .build();
    let spans = tracing_opentelemetry::layer().with_tracer(provider.tracer("quill"));
    // The global slot keeps the provider alive until `shutdown_otel`
    let _ = opentelemetry::global::set_tracer_provider(provider);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.debug)
                .compact(),
        )
        .with(spans)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    tracing::debug!(%endpoint, "span export enabled");
    Ok(())
}

/// Flush spans still buffered in the batch exporter.
#[cfg(feature = "telemetry")]
pub fn shutdown_otel() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(not(feature = "telemetry"))]
pub fn shutdown_otel() {}

pub fn init(config: &TracingConfig) -> Result<()> {
    #[cfg(feature = "telemetry")]
    if config.otel {
        return init_tracing_with_otel(config);
    }

    init_tracing(config)?;
    if config.otel {
        tracing::warn!("--otel ignored: built without the telemetry feature");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_quiet() {
        assert_eq!(TracingConfig::default().default_filter(), "warn");
    }

    #[test]
    fn test_debug_filter_parses() {
        let config = TracingConfig {
            debug: true,
            otel: false,
        };
        let directives = config.default_filter();
        assert!(directives.contains("quill_store=debug"));
        assert!(directives.parse::<EnvFilter>().is_ok());
    }
}
