//! Authentication: JWT tokens and password hashing.

pub mod jwt;
pub mod password;
mod service;

pub use jwt::{get_user_id_from_claims, verify_token, Claims, JwtError, TokenType};
pub use password::{hash_password, verify_password, PasswordError};
pub use service::AuthService;
