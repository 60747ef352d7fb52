pub mod auth;
pub mod security_headers;

pub use auth::{resolve_auth_user, AuthUser, Claims};
pub use security_headers::security_headers_middleware;
