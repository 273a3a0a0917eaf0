use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("Failed to enumerate devices: {source}")]
    DeviceEnumerationFailed {
        #[from]
        source: adb_client::RustADBError,
    },

    #[error(
        "'adb' binary not usable: {description}. Install Android Platform Tools or use --impl=rust."
    )]
    AdbBinaryUnavailable { description: String },

    #[error("Failed to run 'adb {command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("'adb {command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("ADB key not found at {path:?}. Please run 'adb devices' once to generate it.")]
    KeyNotFound { path: PathBuf },

    #[error("Failed to determine home directory for ADB key")]
    HomeDirectoryNotFound,

    #[error("Failed to connect to device '{device}': {source}")]
    ConnectionFailed {
        device: String,
        source: adb_client::RustADBError,
    },

    #[error("Shell command '{command}' failed: {source}")]
    ShellCommandFailed {
        command: String,
        source: adb_client::RustADBError,
    },

    #[error("Operation timed out after {duration:?}: {description}")]
    Timeout {
        duration: Duration,
        description: String,
    },

    #[error("Task failed to complete: {source}")]
    JoinError {
        #[from]
        source: tokio::task::JoinError,
    },

    #[error("Could not parse screen size from 'wm size' output")]
    ScreenSizeParseFailed,

    #[error("Framebuffer capture failed: {source}")]
    FramebufferCaptureFailed { source: adb_client::RustADBError },

    #[error("Failed to convert framebuffer to PNG: {description}")]
    FramebufferToPngFailed { description: String },

    #[error("Tap coordinates are out of bounds: x={x}, y={y} (screen {width}x{height})")]
    TapOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("No touch-capable input devices found on the device")]
    NoTouchDeviceFound,

    #[error("No devices found")]
    NoDevicesFound,

    #[error("Device '{name}' not found")]
    DeviceNotFound { name: String },

    #[error("No connected device reports a manufacturer containing '{needle}'")]
    NoMatchingManufacturer { needle: String },

    #[error("Unknown ADB implementation '{name}', expected 'shell', 'rust' or 'usb'")]
    UnknownBackend { name: String },
}

impl AdbError {
    /// Check if this error means the device went away and the connection
    /// has to be reopened.
    pub fn is_disconnect(&self) -> bool {
        let text = match self {
            AdbError::ShellCommandFailed { source, .. }
            | AdbError::ConnectionFailed { source, .. }
            | AdbError::FramebufferCaptureFailed { source } => source.to_string(),
            AdbError::CommandFailed { stderr, .. } => stderr.clone(),
            AdbError::Timeout { .. } => return true,
            _ => return false,
        };
        is_disconnect_message(&text)
    }
}

/// Heuristic on transport error text (adb_client and the adb binary both
/// surface these as plain strings).
pub fn is_disconnect_message(text: &str) -> bool {
    let lower = text.to_lowercase();
    [
        "device not found",
        "device offline",
        "no devices/emulators found",
        "no write endpoint",
        "clse",
        "broken pipe",
        "connection reset",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
}
