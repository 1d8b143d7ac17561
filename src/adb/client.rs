// Device operations built on the host protocol. Every call opens its own
// connection; the only state kept between calls is the API level cache.
use super::codec;
use super::error::{AdbError, AdbResult};
use super::parsers::{self, PROCESS_NOT_RUNNING};
use super::service;
use super::session::Session;
use super::types::{AdbConfig, Device};
use std::collections::HashMap;
use std::io::SeekFrom;
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt};
use tokio::sync::RwLock;

/// First API level that ships `pidof`.
pub const PIDOF_MIN_API_LEVEL: u32 = 24;

pub const INSTALL_SUCCESS: &str = "Success\n";

const WAKE_SWIPE: (u32, u32, u32, u32) = (930, 880, 930, 380);
const KEYCODE_POWER: u32 = 26;
const KEYCODE_ENTER: u32 = 66;

#[derive(Debug, Default)]
pub struct AdbClient {
    config: AdbConfig,
    // serial -> API level, only successful lookups are stored
    api_levels: RwLock<HashMap<String, u32>>,
}

impl AdbClient {
    pub fn new(config: AdbConfig) -> Self {
        Self {
            config,
            api_levels: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_port(port: u16) -> Self {
        Self::new(AdbConfig::with_port(port))
    }

    pub fn config(&self) -> &AdbConfig {
        &self.config
    }

    // ============================================================
    // HOST SERVICES
    // ============================================================

    pub async fn list_devices(&self) -> AdbResult<Vec<Device>> {
        let data = Session::host(&self.config)
            .await?
            .request(service::DEVICES)
            .await?;
        let devices = parsers::parse_devices(&String::from_utf8_lossy(&data));
        log::debug!("Found {} device(s)", devices.len());
        Ok(devices)
    }

    /// Internal version of the running daemon (`host:version`).
    pub async fn server_version(&self) -> AdbResult<u32> {
        let data = Session::host(&self.config)
            .await?
            .request(service::VERSION)
            .await?;
        let text = String::from_utf8_lossy(&data);
        u32::from_str_radix(text.trim(), 16)
            .map_err(|e| AdbError::protocol(format!("invalid version {text:?}: {e}")))
    }

    // ============================================================
    // RAW COMMAND PATHS
    // ============================================================

    /// Write-only command, host-scoped when `serial` is `None`.
    pub async fn send_command(&self, serial: Option<&str>, command: &str) -> AdbResult<()> {
        Session::open(&self.config, serial).await?.fire(command).await
    }

    pub async fn send_shell_command(&self, serial: &str, command: &str) -> AdbResult<()> {
        require("serial", serial)?;
        self.send_command(Some(serial), &service::shell(command)).await
    }

    /// Data-returning command, host-scoped when `serial` is `None`.
    pub async fn command_output(&self, serial: Option<&str>, command: &str) -> AdbResult<Vec<u8>> {
        Session::open(&self.config, serial)
            .await?
            .request(command)
            .await
    }

    /// Runs a shell command and returns everything it printed.
    pub async fn shell_output(&self, serial: &str, command: &str) -> AdbResult<String> {
        require("serial", serial)?;
        let data = self
            .command_output(Some(serial), &service::shell_query(command))
            .await?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    pub async fn get_property(&self, serial: &str, name: &str) -> AdbResult<String> {
        require("property name", name)?;
        let output = self.shell_output(serial, &format!("getprop {name}")).await?;
        Ok(output.trim().to_string())
    }

    // ============================================================
    // DEVICE QUERIES
    // ============================================================

    /// API level of the device, cached per serial. 0 means the device did not
    /// report a usable value; that result is not cached.
    pub async fn get_api_level(&self, serial: &str) -> AdbResult<u32> {
        require("serial", serial)?;
        if let Some(&level) = self.api_levels.read().await.get(serial) {
            return Ok(level);
        }
        let output = self
            .shell_output(serial, "getprop ro.build.version.sdk")
            .await?;
        let level = parsers::parse_api_level(&output);
        if level == 0 {
            log::warn!("Could not read API level of {} from {:?}", serial, output);
        } else {
            log::debug!("{} reports API level {}", serial, level);
            self.api_levels
                .write()
                .await
                .insert(serial.to_string(), level);
        }
        Ok(level)
    }

    pub async fn cached_api_level(&self, serial: &str) -> Option<u32> {
        self.api_levels.read().await.get(serial).copied()
    }

    /// Pid of the package's process, or `PROCESS_NOT_RUNNING` (-1).
    pub async fn get_process_id(&self, package: &str, serial: &str) -> AdbResult<i32> {
        require("package", package)?;
        let level = self.get_api_level(serial).await?;
        let pid = if level >= PIDOF_MIN_API_LEVEL {
            let output = self.shell_output(serial, &format!("pidof {package}")).await?;
            parsers::parse_pidof(&output)
        } else {
            let output = self.shell_output(serial, "ps").await?;
            parsers::parse_ps(&output, package)
        };
        if pid == PROCESS_NOT_RUNNING {
            log::debug!("{} is not running on {}", package, serial);
        }
        Ok(pid)
    }

    // ============================================================
    // SCREEN
    // ============================================================

    pub async fn turn_on_display(&self, serial: &str) -> AdbResult<()> {
        let (x1, y1, x2, y2) = WAKE_SWIPE;
        self.send_shell_command(serial, &format!("input keyevent {KEYCODE_POWER}")).await?;
        self.send_shell_command(
            serial,
            &format!("input touchscreen swipe {x1} {y1} {x2} {y2}"),
        )
        .await
    }

    /// Types the PIN and presses Enter. No retry if the PIN is wrong.
    pub async fn unlock(&self, serial: &str, pin: &str) -> AdbResult<()> {
        require("pin", pin)?;
        self.send_shell_command(serial, &format!("input text {pin}")).await?;
        self.send_shell_command(serial, &format!("input keyevent {KEYCODE_ENTER}")).await
    }

    // ============================================================
    // INSTALL
    // ============================================================

    /// Streams an APK to `cmd package install`. The size is measured from the
    /// source's current position to its end before anything is sent, since
    /// the daemon stops reading at the declared length.
    ///
    /// The installer's reply is awaited for up to `AdbConfig::install_timeout`,
    /// not the general I/O timeout.
    pub async fn install_package<R>(&self, serial: &str, package: &mut R) -> AdbResult<()>
    where
        R: AsyncRead + AsyncSeek + Unpin,
    {
        require("serial", serial)?;
        let len = measure(package).await?;
        let command = service::install(len);
        log::info!("Installing {} byte package on {}", len, serial);

        let mut conn = Session::device(&self.config, serial)
            .await?
            .open_stream(&command)
            .await?;
        let streamed = conn.stream_from(package, len).await;
        let response = match streamed {
            Ok(_) => conn.read_all_within(self.config.install_timeout).await,
            Err(e) => Err(e),
        };
        conn.close().await;

        let response = codec::Encoding::Utf8.decode(&response?);
        if response == INSTALL_SUCCESS {
            log::info!("Package installed on {}", serial);
            Ok(())
        } else {
            log::warn!("Install on {} failed: {}", serial, response.trim_end());
            Err(AdbError::InstallFailed { message: response })
        }
    }
}

fn require(name: &str, value: &str) -> AdbResult<()> {
    if value.is_empty() {
        return Err(AdbError::invalid_argument(format!("{name} must not be empty")));
    }
    Ok(())
}

async fn measure<S>(source: &mut S) -> AdbResult<u64>
where
    S: AsyncSeek + Unpin,
{
    let not_seekable = |e: std::io::Error| {
        AdbError::invalid_argument(format!("package source is not seekable: {e}"))
    };
    let start = source.stream_position().await.map_err(not_seekable)?;
    let end = source.seek(SeekFrom::End(0)).await.map_err(not_seekable)?;
    source.seek(SeekFrom::Start(start)).await.map_err(not_seekable)?;
    Ok(end.saturating_sub(start))
}
