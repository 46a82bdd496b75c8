//! Authentication: token issuing, password hashing and request identity

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use middleware::{extract_token, jwt_auth_middleware};
pub use password::PasswordHasher;
