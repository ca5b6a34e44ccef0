//! Authentication: password hashing, bearer tokens and the request
//! middleware that turns a token into a [`Principal`](agency_security::Principal).

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::authn_middleware;
pub use token::{AuthConfig, BootstrapAdmin, TokenError, TokenService};
