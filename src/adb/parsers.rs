// Text parsing for daemon and device output
use super::types::{Device, DeviceState};
use std::collections::BTreeMap;

/// Returned by process lookups when the package has no running process.
pub const PROCESS_NOT_RUNNING: i32 = -1;

/// Parses a `host:devices-l` listing. Lines with fewer than two tokens are
/// skipped, as are property tokens that carry no separator.
pub fn parse_devices(output: &str) -> Vec<Device> {
    output.lines().filter_map(parse_device_line).collect()
}

pub fn parse_device_line(line: &str) -> Option<Device> {
    let mut tokens = line.split_whitespace().peekable();
    let serial = tokens.next()?;
    let state_token = tokens.next()?;

    // "no permissions (...)" spills over into the next token
    let state = if state_token == "no" && tokens.next_if_eq(&"permissions").is_some() {
        DeviceState::NoPermissions
    } else {
        DeviceState::from_token(state_token)
    };

    let properties: BTreeMap<String, String> = tokens
        .filter_map(|token| {
            let (key, value) = token.split_once([':', '='])?;
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect();

    Some(Device {
        serial: serial.to_string(),
        state,
        properties,
    })
}

/// `getprop ro.build.version.sdk` output; 0 when it is not a number.
pub fn parse_api_level(output: &str) -> u32 {
    output.trim().parse().unwrap_or(0)
}

/// First integer token of `pidof` output.
pub fn parse_pidof(output: &str) -> i32 {
    output
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .unwrap_or(PROCESS_NOT_RUNNING)
}

/// Finds the pid column of the first `ps` line ending with `package`.
pub fn parse_ps(output: &str, package: &str) -> i32 {
    output
        .lines()
        .find(|line| line.trim().ends_with(package))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|pid| pid.parse().ok())
        .unwrap_or(PROCESS_NOT_RUNNING)
}
