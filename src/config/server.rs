use std::{net::IpAddr, time::Duration};

use http::{HeaderName, Method};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request body size limit in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Request timeout in seconds. Applies to every route, including the
    /// forecast endpoint whose model fit is CPU-bound.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
            timeout_secs: default_timeout(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8000
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MB
}

fn default_timeout() -> u64 {
    30
}

/// CORS configuration.
///
/// The dashboard frontend is usually served from a different origin than the
/// API, so CORS is enabled by default with a permissive origin list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Enable CORS.
    #[serde(default = "crate::config::default_true")]
    pub enabled: bool,

    /// Allowed origins. Use `["*"]` to allow any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Allowed request headers beyond the CORS-safelisted ones.
    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,

    /// Max age for preflight responses, in seconds.
    #[serde(default = "default_cors_max_age")]
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: default_allowed_origins(),
            allowed_headers: default_allowed_headers(),
            max_age_secs: default_cors_max_age(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_allowed_headers() -> Vec<String> {
    vec!["authorization".to_string(), "content-type".to_string()]
}

fn default_cors_max_age() -> u64 {
    3600
}

impl CorsConfig {
    /// Build a `CorsLayer` from this configuration.
    ///
    /// Returns `None` when CORS is disabled. Unparseable origins and header
    /// names are skipped with a warning.
    pub fn layer(&self) -> Option<CorsLayer> {
        if !self.enabled {
            return None;
        }

        let origin = if self.allowed_origins.iter().any(|o| o == "*") {
            AllowOrigin::any()
        } else {
            let origins = self
                .allowed_origins
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect::<Vec<_>>();
            AllowOrigin::list(origins)
        };

        let headers = self
            .allowed_headers
            .iter()
            .filter_map(|h| match h.parse::<HeaderName>() {
                Ok(name) => Some(name),
                Err(_) => {
                    tracing::warn!(header = %h, "Ignoring invalid CORS header name");
                    None
                }
            })
            .collect::<Vec<_>>();

        Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(AllowMethods::list([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::OPTIONS,
                ]))
                .allow_headers(AllowHeaders::list(headers))
                .max_age(Duration::from_secs(self.max_age_secs)),
        )
    }
}
