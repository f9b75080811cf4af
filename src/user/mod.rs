//! User management and account lifecycle.

mod model;
mod service;

pub use model::{
    AuthTokensResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UpdateUserRequest,
    User, UserResponse, UserRole,
};
pub use service::{UserError, UserService};
