//! Derived dev-server proxy targets.
//!
//! The API and socket routes point at the application server. Entries from
//! the merged `devServerProxy` are layered on top per key.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::{kind_of, merge_maps, MergedConfig};
use crate::server::ServerConfig;

/// Route prefix for API calls
pub const API_ROUTE: &str = "/api";

/// Route prefix for the real-time channel
pub const SOCKET_ROUTE: &str = "/socket.io";

/// Errors deriving the proxy table
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("'mainApiHost' must be a non-empty string, got {0}")]
    InvalidHost(String),

    #[error("'devServerProxy' must be a mapping, got {0}")]
    InvalidProxyTable(&'static str),
}

/// `{protocol}://{host}:{port}`
pub fn api_target(server: &ServerConfig, host: &str) -> String {
    format!("{}://{}:{}", server.protocol(), host, server.port)
}

/// The derived entries alone, before user routes are layered on
pub fn derived_routes(target: &str) -> Map<String, Value> {
    let mut routes = Map::new();
    for route in [API_ROUTE, SOCKET_ROUTE] {
        // dev-only: the local server usually has a self-signed certificate
        routes.insert(
            route.to_string(),
            json!({
                "target": target,
                "secure": false
            }),
        );
    }
    routes
}

/// Build the final proxy table from the server record and the merged config
pub fn resolve_proxy(
    server: &ServerConfig,
    merged: &MergedConfig,
) -> Result<Map<String, Value>, ProxyError> {
    let host = match merged.get("mainApiHost") {
        Some(Value::String(host)) if !host.trim().is_empty() => host.as_str(),
        Some(other) => return Err(ProxyError::InvalidHost(other.to_string())),
        None => return Err(ProxyError::InvalidHost("nothing".to_string())),
    };

    let target = api_target(server, host);
    debug!(%target, "derived proxy target");

    let user_routes = match merged.get("devServerProxy") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(routes)) => routes.clone(),
        Some(other) => return Err(ProxyError::InvalidProxyTable(kind_of(other))),
    };

    Ok(merge_maps(derived_routes(&target), user_routes))
}
