// Wire codec for the ADB host protocol: 4 hex digit length prefix + payload.
use super::error::{AdbError, AdbResult};

pub const OKAY: &[u8; 4] = b"OKAY";
pub const FAIL: &[u8; 4] = b"FAIL";

/// Largest payload a 4 hex digit prefix can describe.
pub const MAX_PAYLOAD_LEN: usize = 0xFFFF;

/// Byte encoding used for a command frame.
///
/// The daemon counts bytes, so the prefix must be computed in the same
/// encoding the payload is written in. Generic write-only commands go out as
/// single-byte Latin-1; transport selection and data-returning services use
/// UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Latin1,
    Utf8,
}

impl Encoding {
    pub fn encode(self, text: &str) -> AdbResult<Vec<u8>> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        AdbError::invalid_argument(format!(
                            "character {c:?} cannot be encoded as Latin-1"
                        ))
                    })
                })
                .collect(),
        }
    }

    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

/// Response status token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Okay,
    Fail,
}

pub fn encode_length_prefix(len: usize) -> AdbResult<[u8; 4]> {
    if len > MAX_PAYLOAD_LEN {
        return Err(AdbError::invalid_argument(format!(
            "payload of {len} bytes exceeds the {MAX_PAYLOAD_LEN} byte frame limit"
        )));
    }
    let hex = format!("{len:04X}");
    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(hex.as_bytes());
    Ok(prefix)
}

pub fn encode_frame(command: &str, encoding: Encoding) -> AdbResult<Vec<u8>> {
    let payload = encoding.encode(command)?;
    let prefix = encode_length_prefix(payload.len())?;
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&prefix);
    frame.extend_from_slice(&payload);
    Ok(frame)
}

pub fn decode_length_prefix(bytes: [u8; 4]) -> AdbResult<usize> {
    if !bytes.iter().all(u8::is_ascii_hexdigit) {
        return Err(AdbError::protocol(format!(
            "invalid length prefix {:?}",
            Encoding::Latin1.decode(&bytes)
        )));
    }
    // All four bytes are ASCII hex digits, so this cannot fail.
    let text = Encoding::Latin1.decode(&bytes);
    usize::from_str_radix(&text, 16)
        .map_err(|e| AdbError::protocol(format!("invalid length prefix {text:?}: {e}")))
}

pub fn decode_status(bytes: [u8; 4]) -> AdbResult<Status> {
    match &bytes {
        OKAY => Ok(Status::Okay),
        FAIL => Ok(Status::Fail),
        other => Err(AdbError::protocol(format!(
            "unexpected status token {:?}",
            Encoding::Latin1.decode(other)
        ))),
    }
}

/// Splits a buffered `HHHH<payload>` body. The stream must have delivered at
/// least the declared length.
pub fn unwrap_framed(data: &[u8]) -> AdbResult<&[u8]> {
    if data.is_empty() {
        return Ok(data);
    }
    if data.len() < 4 {
        return Err(AdbError::protocol(format!(
            "response of {} bytes is too short for a length prefix",
            data.len()
        )));
    }
    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(&data[..4]);
    let len = decode_length_prefix(prefix)?;
    let body = &data[4..];
    if len > body.len() {
        return Err(AdbError::protocol(format!(
            "length prefix declares {} bytes but only {} arrived before close",
            len,
            body.len()
        )));
    }
    Ok(&body[..len])
}
