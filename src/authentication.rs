pub mod middleware;
pub use middleware::UserId;
mod password;
pub use password::{validate_credentials, AuthError, Credentials};
