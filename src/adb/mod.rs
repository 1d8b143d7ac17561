// ADB module - Android Debug Bridge host protocol client
// Talks to an already running adb server over TCP loopback (default port 5037).

pub mod client;
pub mod codec;
pub mod connection;
pub mod error;
pub mod parsers;
pub mod service;
pub mod session;
pub mod types;


// Re-export the main types and functions for easy access
pub use client::AdbClient;
pub use codec::{Encoding, Status};
pub use connection::Connection;
pub use error::{AdbError, AdbResult};
pub use parsers::PROCESS_NOT_RUNNING;
pub use session::Session;
pub use types::{AdbConfig, Device, DeviceState};
