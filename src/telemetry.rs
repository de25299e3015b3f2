use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

const SERVICE_NAME: &str = "datamall_bus_stops";

/// Keeps the log writer and the span exporter alive. Call [`Telemetry::shutdown`] before exiting.
pub struct Telemetry {
    _guard: WorkerGuard,
    provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                error!("error shutting down the tracer provider {e}");
            }
        }
    }
}

/// Logs go to stderr and to a daily rolling file in `log_dir`.
/// Spans are exported over OTLP only when an endpoint is given.
pub fn init(log_dir: &Path, otlp_endpoint: Option<&str>) -> Result<Telemetry> {
    let provider = otlp_endpoint.map(tracer_provider).transpose()?;

    let telemetry_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(SERVICE_NAME)));

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily(log_dir, format!("{SERVICE_NAME}.log"));
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();

    let console_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    Registry::default()
        .with(telemetry_layer)
        .with(file_log)
        .with(console_log)
        .with(env_filter)
        .try_init()?;

    Ok(Telemetry {
        _guard: guard,
        provider,
    })
}

fn tracer_provider(endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_millis(1000))
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
        .build())
}
