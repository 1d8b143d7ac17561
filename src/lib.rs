pub mod adb;
pub mod args;

pub use adb::{AdbClient, AdbConfig, AdbError, AdbResult, Device, DeviceState};
