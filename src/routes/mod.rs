//! Route definitions for the lending API

mod borrowing;
mod device;
mod user;

pub use borrowing::borrowing_routes;
pub use device::device_routes;
pub use user::user_routes;
