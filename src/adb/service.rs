// Per-service response conventions. Nothing in the bytes tells these apart,
// so the shape is looked up by service name.

pub const DEVICES: &str = "host:devices-l";
pub const VERSION: &str = "host:version";
pub const TRANSPORT_PREFIX: &str = "host:transport:";
pub const SHELL_PREFIX: &str = "shell:";
pub const EXEC_PREFIX: &str = "exec:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Nothing follows the status.
    Empty,
    /// `HHHH` length then exactly that many bytes.
    Framed,
    /// A length-prefixed body, but the daemon also closes the stream after
    /// it; read until close, then unwrap the frame.
    FramedUntilClose,
    /// Raw bytes until the daemon closes the stream.
    UntilClose,
}

const SHAPES: &[(&str, ResponseShape)] = &[
    ("host:version", ResponseShape::Framed),
    ("host:features", ResponseShape::Framed),
    ("host:host-features", ResponseShape::Framed),
    ("host:get-state", ResponseShape::Framed),
    ("host:get-serialno", ResponseShape::Framed),
    ("host:get-devpath", ResponseShape::Framed),
    ("host:devices", ResponseShape::FramedUntilClose),
    ("host:devices-l", ResponseShape::FramedUntilClose),
];

const PREFIX_SHAPES: &[(&str, ResponseShape)] = &[
    (TRANSPORT_PREFIX, ResponseShape::Empty),
    (SHELL_PREFIX, ResponseShape::UntilClose),
    (EXEC_PREFIX, ResponseShape::UntilClose),
];

pub fn response_shape(service: &str) -> ResponseShape {
    if let Some((_, shape)) = SHAPES.iter().find(|(name, _)| *name == service) {
        return *shape;
    }
    PREFIX_SHAPES
        .iter()
        .find(|(prefix, _)| service.starts_with(prefix))
        .map_or(ResponseShape::Empty, |(_, shape)| *shape)
}

pub fn transport(serial: &str) -> String {
    format!("{TRANSPORT_PREFIX}{serial}")
}

/// `shell:<command>`, the write-only form.
pub fn shell(command: &str) -> String {
    format!("{SHELL_PREFIX}{command}")
}

/// `shell: <command>`, the form used when the output is read back.
pub fn shell_query(command: &str) -> String {
    format!("{SHELL_PREFIX} {command}")
}

pub fn install(len: u64) -> String {
    format!("{EXEC_PREFIX}cmd package 'install' -S {len}")
}
