//! Logging, optional OpenTelemetry export, and per-request DB query counting.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{ExporterBuildError, WithExportConfig};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::{span::Id, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::Context, registry::LookupSpan, EnvFilter, Layer};

use crate::config::Config;

const DEFAULT_FILTER: &str = "info";
const TRACER_NAME: &str = "cookbook-server";

/// Name of the span the store opens around every query.
pub const DB_QUERY_SPAN: &str = "db.query";

pub const DB_QUERY_COUNT_HEADER: HeaderName = HeaderName::from_static("x-db-query-count");

tokio::task_local! {
    /// Task-local counter for database queries in the current request.
    /// This follows the async task across await points and thread migrations.
    static DB_QUERY_COUNTER: Arc<AtomicU32>;
}

/// Get the current database query count for this request, if available.
pub fn get_query_count() -> Option<u32> {
    DB_QUERY_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// A tracing Layer that counts `db.query` spans per HTTP request.
///
/// Store queries run synchronously inside the handler's task, so the
/// task-local counter installed by [`query_counting_middleware`] is in scope
/// when their spans open.
pub struct DbQueryCountingLayer;

impl<S> Layer<S> for DbQueryCountingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        if span.name() == DB_QUERY_SPAN {
            let _ = DB_QUERY_COUNTER.try_with(|counter| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    }
}

/// Middleware that initializes the per-request database query counter.
///
/// Must be the outermost layer so the counter wraps the whole request.
pub async fn query_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    DB_QUERY_COUNTER.scope(counter, next.run(request)).await
}

/// Middleware that adds an `X-DB-Query-Count` header to responses.
/// Only installed when query tracking is enabled in the config.
pub async fn db_query_count_header_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if let Some(count) = get_query_count() {
        response
            .headers_mut()
            .insert(DB_QUERY_COUNT_HEADER, HeaderValue::from(count));
    }

    response
}

struct OtlpProviders {
    tracer: SdkTracerProvider,
    logger: SdkLoggerProvider,
}

fn build_otlp_providers(
    endpoint: &str,
    service_name: &str,
) -> Result<OtlpProviders, ExporterBuildError> {
    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let tracer = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let logger = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    Ok(OtlpProviders { tracer, logger })
}

/// Quick TCP check to see if the collector is up (resolve hostname first).
fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

enum OtelStatus {
    Disabled,
    Unreachable(String),
    BuildFailed(String, ExporterBuildError),
    Enabled(String),
}

/// Keeps the OpenTelemetry providers alive; flush them with [`shutdown`].
///
/// [`shutdown`]: TelemetryGuard::shutdown
pub struct TelemetryGuard {
    providers: Option<OtlpProviders>,
}

impl TelemetryGuard {
    pub fn shutdown(self) {
        let Some(providers) = self.providers else {
            return;
        };
        if let Err(e) = providers.tracer.shutdown() {
            tracing::warn!(error = %e, "failed to flush trace exporter");
        }
        if let Err(e) = providers.logger.shutdown() {
            tracing::warn!(error = %e, "failed to flush log exporter");
        }
    }
}

/// Initialize logging with optional OpenTelemetry export.
///
/// If an OTLP endpoint is configured and reachable, traces and logs are also
/// sent to the collector. Otherwise only console logging is used. Must run
/// inside the tokio runtime because the gRPC exporters need it.
pub fn init_telemetry(config: &Config) -> TelemetryGuard {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (providers, status) = match config.otel_endpoint.as_deref() {
        None => (None, OtelStatus::Disabled),
        Some(endpoint) if !collector_reachable(endpoint) => {
            (None, OtelStatus::Unreachable(endpoint.to_string()))
        }
        Some(endpoint) => match build_otlp_providers(endpoint, &config.otel_service_name) {
            Ok(providers) => (Some(providers), OtelStatus::Enabled(endpoint.to_string())),
            Err(e) => (None, OtelStatus::BuildFailed(endpoint.to_string(), e)),
        },
    };

    let otel_trace_layer = providers.as_ref().map(|p| {
        opentelemetry::global::set_tracer_provider(p.tracer.clone());
        tracing_opentelemetry::layer().with_tracer(p.tracer.tracer(TRACER_NAME))
    });
    let otel_log_layer = providers
        .as_ref()
        .map(|p| OpenTelemetryTracingBridge::new(&p.logger));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(DbQueryCountingLayer)
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .init();

    match status {
        OtelStatus::Disabled => {
            tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only")
        }
        OtelStatus::Unreachable(endpoint) => tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        ),
        OtelStatus::BuildFailed(endpoint, e) => tracing::warn!(
            error = %e,
            "Failed to create OTLP exporters for {}, using console logging only",
            endpoint
        ),
        OtelStatus::Enabled(endpoint) => tracing::info!(
            "OpenTelemetry enabled, exporting traces and logs to {} as {}",
            endpoint,
            config.otel_service_name
        ),
    }

    TelemetryGuard { providers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_only_db_query_spans() {
        let counter = Arc::new(AtomicU32::new(0));
        let subscriber = tracing_subscriber::registry().with(DbQueryCountingLayer);

        DB_QUERY_COUNTER.sync_scope(counter.clone(), || {
            tracing::subscriber::with_default(subscriber, || {
                let _a = tracing::info_span!("db.query", op = "list_recipes").entered();
                let _b = tracing::info_span!("http_request").entered();
                let _c = tracing::info_span!("db.query", op = "get_recipe").entered();
            });
            assert_eq!(get_query_count(), Some(2));
        });

        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_no_count_outside_a_request() {
        assert_eq!(get_query_count(), None);
    }

    #[test]
    fn test_unreachable_collector() {
        assert!(!collector_reachable("http://127.0.0.1:1/"));
        assert!(!collector_reachable("not a host"));
    }
}
