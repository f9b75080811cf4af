//! Borrowing lifecycle: the request/approval/cancel/return state machine
//! and its coordination with device availability.

mod model;
mod service;
pub mod transition;

pub use model::{
    Borrowing, BorrowingDetail, BorrowingStatus, CreateBorrowingRequest,
};
pub use service::{BorrowingError, BorrowingService};
pub use transition::{InvalidTransition, Resolution, Verdict};
