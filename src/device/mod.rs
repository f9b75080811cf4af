//! Device management: CRUD plus the availability flag the borrowing
//! lifecycle coordinates against.

mod model;
mod service;

pub use model::{
    ChangeDeviceStatusRequest, CreateDeviceRequest, Device, DeviceSearchQuery, DeviceStatus,
    UpdateDeviceRequest,
};
pub use service::{DeviceError, DeviceService};
