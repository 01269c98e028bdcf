use std::net::SocketAddr;

use axum::http::HeaderValue;
use clap::Parser;

/// Server configuration. Every option can also be set through the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "cookbook-server", version, about = "Recipe CRUD API")]
pub struct Config {
    /// SQLite database file, or `:memory:` for a throwaway database
    #[arg(long, env = "DATABASE_URL", default_value = "cookbook.db")]
    pub database_url: String,

    /// Address to listen on
    #[arg(long, env = "COOKBOOK_BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: SocketAddr,

    /// Maximum pooled database connections (ignored for in-memory databases)
    #[arg(long, env = "COOKBOOK_DB_MAX_CONNECTIONS", default_value_t = 8)]
    pub db_max_connections: u32,

    /// Browser origin allowed to call the API (e.g. the client dev server)
    #[arg(long, env = "COOKBOOK_CORS_ORIGIN", value_parser = parse_origin)]
    pub cors_origin: Option<HeaderValue>,

    /// Add an X-DB-Query-Count header to every response
    #[arg(
        long,
        env = "TRACK_DB_QUERY_COUNT",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub track_db_query_count: bool,

    /// OTLP collector endpoint; console logging only when unset or unreachable
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otel_endpoint: Option<String>,

    #[arg(long, env = "OTEL_SERVICE_NAME", default_value = "cookbook-server")]
    pub otel_service_name: String,

    /// Print the OpenAPI document and exit
    #[arg(long)]
    pub openapi: bool,
}

fn parse_origin(value: &str) -> Result<HeaderValue, String> {
    HeaderValue::from_str(value).map_err(|e| format!("invalid origin '{}': {}", value, e))
}
