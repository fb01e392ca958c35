//! Authentication and authorization module

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;

pub use jwt::{Claims, JwtService, TokenError, TokenPair, REFRESH_TOKEN_TTL};
pub use middleware::{authenticate, extract_token, jwt_auth_middleware, Actor};
pub use password::PasswordHasher;
pub use session::{MemorySessionStore, RedisSessionStore, SessionStore};
