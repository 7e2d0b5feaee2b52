//! Authentication Module
//! Mission: Password hashing, JWT issuance and per-route role gating

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod roles;

pub use jwt::{JwtHandler, TokenError};
pub use middleware::{auth_middleware, AuthError, AuthUser};
pub use models::{AuthContext, Claims, User, UserRole};
pub use roles::{role_gate, AuthorizationError, RoleSet};
