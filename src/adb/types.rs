// Core ADB types and client configuration
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5037;
pub const PORT_ENV: &str = "ANDROID_ADB_SERVER_PORT";

/// Connection state reported by `host:devices-l`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceState {
    Device,
    Offline,
    Unauthorized,
    Unknown,
    Bootloader,
    Recovery,
    Sideload,
    NoPermissions,
    Host,
    Authorizing,
    Connecting,
    Other(String),
}

impl DeviceState {
    pub fn from_token(token: &str) -> Self {
        match token {
            "device" => DeviceState::Device,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            "unknown" => DeviceState::Unknown,
            "bootloader" => DeviceState::Bootloader,
            "recovery" => DeviceState::Recovery,
            "sideload" => DeviceState::Sideload,
            "no-permissions" => DeviceState::NoPermissions,
            "host" => DeviceState::Host,
            "authorizing" => DeviceState::Authorizing,
            "connecting" => DeviceState::Connecting,
            other => DeviceState::Other(other.to_string()),
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, DeviceState::Device)
    }
}

/// One line of a device listing. A snapshot, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub serial: String,
    pub state: DeviceState,
    pub properties: BTreeMap<String, String>,
}

impl Device {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn model(&self) -> Option<&str> {
        self.property("model")
    }

    pub fn transport_id(&self) -> Option<u32> {
        self.property("transport_id")?.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbConfig {
    /// Loopback port of the ADB daemon.
    pub port: u16,
    /// Applied to every connect, read and write.
    pub timeout: Duration,
    /// Upper bound on the best-effort read after a write-only command.
    pub drain_timeout: Duration,
    /// Wait for the installer's verdict once the package has been streamed.
    /// Verification of a large APK can outlast `timeout`.
    pub install_timeout: Duration,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(10),
            drain_timeout: Duration::from_millis(500),
            install_timeout: Duration::from_secs(300),
        }
    }
}

impl AdbConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Defaults, with the port taken from `ANDROID_ADB_SERVER_PORT` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(PORT_ENV) {
            match raw.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => log::warn!("Ignoring invalid {}={:?}", PORT_ENV, raw),
            }
        }
        config
    }

    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}
