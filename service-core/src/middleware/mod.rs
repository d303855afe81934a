pub mod cors;
pub mod tracing;

pub use self::cors::{AllowedOrigins, cors_layer};
pub use self::tracing::{REQUEST_ID_HEADER, request_id_middleware, request_span};
