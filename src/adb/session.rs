// Host-scoped and device-scoped request paths over a single connection.
use super::codec::{self, Encoding};
use super::connection::Connection;
use super::error::AdbResult;
use super::service::{self, ResponseShape};
use super::types::AdbConfig;

/// A connection that has been bound to its scope and is ready for exactly
/// one service command. Every method consumes the session, so the socket
/// never outlives the operation.
#[derive(Debug)]
pub struct Session {
    conn: Connection,
    serial: Option<String>,
}

impl Session {
    pub async fn host(config: &AdbConfig) -> AdbResult<Self> {
        let conn = Connection::open(config).await?;
        Ok(Self { conn, serial: None })
    }

    /// Opens a connection and selects the device transport. A rejected
    /// selection returns here, before any service command is written.
    pub async fn device(config: &AdbConfig, serial: &str) -> AdbResult<Self> {
        let mut conn = Connection::open(config).await?;
        let select = service::transport(serial);
        conn.send_command(&select, Encoding::Utf8).await?;
        if let Err(e) = conn.expect_okay(&select).await {
            conn.close().await;
            return Err(e);
        }
        log::debug!("Selected transport {}", serial);
        Ok(Self {
            conn,
            serial: Some(serial.to_string()),
        })
    }

    /// Opens a host session or a device session depending on `serial`.
    pub async fn open(config: &AdbConfig, serial: Option<&str>) -> AdbResult<Self> {
        match serial {
            Some(serial) if !serial.is_empty() => Self::device(config, serial).await,
            _ => Self::host(config).await,
        }
    }

    fn scope(&self) -> &str {
        self.serial.as_deref().unwrap_or("host")
    }

    async fn send_checked(&mut self, command: &str, encoding: Encoding) -> AdbResult<()> {
        log::debug!("[{}] {}", self.scope(), command);
        self.conn.send_command(command, encoding).await?;
        self.conn.expect_okay(command).await
    }

    /// Sends a data-returning service and reads the payload in the shape the
    /// service uses.
    pub async fn request(mut self, command: &str) -> AdbResult<Vec<u8>> {
        let result = self.request_inner(command).await;
        self.conn.close().await;
        result
    }

    async fn request_inner(&mut self, command: &str) -> AdbResult<Vec<u8>> {
        self.send_checked(command, Encoding::Utf8).await?;
        match service::response_shape(command) {
            ResponseShape::Empty => Ok(Vec::new()),
            ResponseShape::Framed => self.conn.read_framed().await,
            ResponseShape::FramedUntilClose => {
                let data = self.conn.read_all().await?;
                Ok(codec::unwrap_framed(&data)?.to_vec())
            }
            ResponseShape::UntilClose => self.conn.read_all().await,
        }
    }

    /// Sends a write-only command over the single-byte path, then drains
    /// briefly before closing.
    pub async fn fire(mut self, command: &str) -> AdbResult<()> {
        match self.send_checked(command, Encoding::Latin1).await {
            Ok(()) => {
                self.conn.drain_and_close().await;
                Ok(())
            }
            Err(e) => {
                self.conn.close().await;
                Err(e)
            }
        }
    }

    /// Sends the command and, after OKAY, hands back the bare connection for
    /// raw streaming.
    pub async fn open_stream(mut self, command: &str) -> AdbResult<Connection> {
        match self.send_checked(command, Encoding::Utf8).await {
            Ok(()) => Ok(self.conn),
            Err(e) => {
                self.conn.close().await;
                Err(e)
            }
        }
    }
}
