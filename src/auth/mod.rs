mod helpers;
mod jwt;
mod middleware;
mod password;

pub use helpers::extract_bearer_token;
pub use jwt::{Claims, TokenIssuer};
pub use middleware::{AuthError, RequireUser};
pub use password::PasswordHasher;
