// One TCP socket to the ADB daemon and the primitives spoken over it.
use super::codec::{self, Encoding, Status};
use super::error::{AdbError, AdbResult};
use super::types::AdbConfig;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const READ_CHUNK: usize = 4096;
const STREAM_CHUNK: usize = 32 * 1024;

async fn with_timeout<T, F>(duration: Duration, description: &str, fut: F) -> AdbResult<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(AdbError::Timeout {
            duration,
            description: description.to_string(),
        }),
    }
}

/// Owns the socket; dropping it closes the connection on any exit path.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    timeout: Duration,
    drain_timeout: Duration,
}

impl Connection {
    pub async fn open(config: &AdbConfig) -> AdbResult<Self> {
        let address = config.address();
        let stream = match tokio::time::timeout(config.timeout, TcpStream::connect(&address)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(AdbError::Connection { address, source }),
            Err(_) => {
                return Err(AdbError::Timeout {
                    duration: config.timeout,
                    description: format!("connecting to ADB daemon at {address}"),
                });
            }
        };
        log::trace!("Connected to ADB daemon at {}", address);
        Ok(Self {
            stream,
            timeout: config.timeout,
            drain_timeout: config.drain_timeout,
        })
    }

    pub async fn send_command(&mut self, command: &str, encoding: Encoding) -> AdbResult<()> {
        let frame = codec::encode_frame(command, encoding)?;
        log::trace!("-> {} ({:?}, {} bytes)", command, encoding, frame.len());
        let stream = &mut self.stream;
        with_timeout(self.timeout, "sending command", async {
            stream.write_all(&frame).await?;
            stream.flush().await
        })
        .await
    }

    async fn read_exact_4(&mut self, what: &str) -> AdbResult<[u8; 4]> {
        let mut buf = [0u8; 4];
        let stream = &mut self.stream;
        with_timeout(self.timeout, what, stream.read_exact(&mut buf)).await?;
        Ok(buf)
    }

    pub async fn read_status(&mut self) -> AdbResult<Status> {
        let raw = self.read_exact_4("reading status").await?;
        codec::decode_status(raw)
    }

    /// Reads the status; on `FAIL` reads the daemon's message and rejects.
    pub async fn expect_okay(&mut self, command: &str) -> AdbResult<()> {
        match self.read_status().await? {
            Status::Okay => {
                log::trace!("<- OKAY for {}", command);
                Ok(())
            }
            Status::Fail => {
                let message = Encoding::Latin1.decode(&self.read_framed().await?);
                log::debug!("<- FAIL for {}: {}", command, message);
                Err(AdbError::DaemonRejected {
                    command: command.to_string(),
                    message,
                })
            }
        }
    }

    /// Reads one `HHHH<payload>` frame.
    pub async fn read_framed(&mut self) -> AdbResult<Vec<u8>> {
        let prefix = self.read_exact_4("reading length prefix").await?;
        let len = codec::decode_length_prefix(prefix)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let mut payload = vec![0u8; len];
        let stream = &mut self.stream;
        with_timeout(
            self.timeout,
            "reading framed payload",
            stream.read_exact(&mut payload),
        )
        .await?;
        Ok(payload)
    }

    /// Reads until the daemon closes its end of the stream.
    pub async fn read_all(&mut self) -> AdbResult<Vec<u8>> {
        self.read_all_within(self.timeout).await
    }

    /// Like `read_all`, with `timeout` applied to each read instead of the
    /// connection default.
    pub async fn read_all_within(&mut self, timeout: Duration) -> AdbResult<Vec<u8>> {
        let mut data = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let stream = &mut self.stream;
            let n = with_timeout(timeout, "reading response", stream.read(&mut chunk)).await?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
        }
        log::trace!("<- {} bytes until close", data.len());
        Ok(data)
    }

    pub async fn write_raw(&mut self, bytes: &[u8]) -> AdbResult<()> {
        let stream = &mut self.stream;
        with_timeout(self.timeout, "writing raw bytes", stream.write_all(bytes)).await
    }

    /// Copies exactly `len` bytes from `source` onto the socket, unframed.
    pub async fn stream_from<R>(&mut self, source: &mut R, len: u64) -> AdbResult<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; STREAM_CHUNK];
        let mut sent: u64 = 0;
        while sent < len {
            let want = usize::try_from(len - sent).map_or(buf.len(), |left| left.min(buf.len()));
            let n = with_timeout(
                self.timeout,
                "reading package source",
                source.read(&mut buf[..want]),
            )
            .await?;
            if n == 0 {
                return Err(AdbError::Io {
                    source: std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!("package source ended after {sent} of {len} bytes"),
                    ),
                });
            }
            self.write_raw(&buf[..n]).await?;
            sent += n as u64;
        }
        let stream = &mut self.stream;
        with_timeout(self.timeout, "flushing raw stream", stream.flush()).await?;
        log::debug!("Streamed {} raw bytes", sent);
        Ok(sent)
    }

    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            log::trace!("Ignoring shutdown error: {}", e);
        }
    }

    /// Gives the daemon a moment to act on a write-only command before the
    /// socket goes away. Closing straight after the OKAY can drop the command.
    pub async fn drain_and_close(mut self) {
        let mut byte = [0u8; 1];
        match tokio::time::timeout(self.drain_timeout, self.stream.read(&mut byte)).await {
            Ok(Ok(n)) => log::trace!("Drain read returned {} bytes", n),
            Ok(Err(e)) => log::trace!("Ignoring drain error: {}", e),
            Err(_) => log::trace!("Drain read timed out after {:?}", self.drain_timeout),
        }
        self.close().await;
    }
}
