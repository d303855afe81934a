//! CORS policy built from a comma-separated origin list.

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};

const DEFAULT_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parse `CORS_ALLOW_ORIGINS`-style input. Unset or blank falls back to
    /// the local dev front-ends, `*` allows everything.
    pub fn parse(value: Option<&str>) -> Self {
        let value = match value.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => {
                return AllowedOrigins::List(
                    DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
                );
            }
        };

        if value == "*" {
            return AllowedOrigins::Any;
        }

        AllowedOrigins::List(
            value
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// Credentials are only allowed for an explicit origin list; browsers reject
/// them for a wildcard origin.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    match origins {
        AllowedOrigins::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(values)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
    }
}
