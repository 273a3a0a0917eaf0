// Core ADB types and traits
use super::error::{AdbError, AdbResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Deadline for ordinary shell commands.
pub const SHELL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
pub struct ImageCapture {
    pub bytes: Vec<u8>,
    pub duration_ms: u128,
}

#[derive(Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Device {
    pub name: String,
    pub transport_id: Option<String>,
}

impl Device {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport_id: None,
        }
    }
}

/// Which ADB implementation to talk through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// External `adb` binary
    Shell,
    /// ADB server protocol, pure Rust
    #[default]
    Rust,
    /// Direct USB, no ADB server
    Usb,
}

impl BackendKind {
    pub const ENV_VAR: &'static str = "ADB_IMPL";

    /// Read `ADB_IMPL`, falling back to the default on absence or bad value.
    pub fn from_env() -> Self {
        match std::env::var(Self::ENV_VAR) {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                log::warn!("⚠️ {e}; using default backend");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Shell => "shell",
            BackendKind::Rust => "rust",
            BackendKind::Usb => "usb",
        }
    }
}

impl FromStr for BackendKind {
    type Err = AdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shell" => Ok(BackendKind::Shell),
            "rust" => Ok(BackendKind::Rust),
            "usb" => Ok(BackendKind::Usb),
            other => Err(AdbError::UnknownBackend {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities the automation needs from a connected device.
///
/// A client is a live connection: obtain it with `open`, release it with
/// `close`. Nothing here is global; two clients never share state.
#[allow(async_fn_in_trait)]
pub trait AdbClient: Send + Sync {
    async fn list_devices() -> AdbResult<Vec<Device>>
    where
        Self: Sized;

    async fn open(device_name: &str) -> AdbResult<Self>
    where
        Self: Sized;

    /// Run a command in the device shell and return its stdout as text,
    /// failing with [`AdbError::Timeout`] after `timeout`.
    ///
    /// Arguments are joined with spaces into one remote command line, so a
    /// single argument may carry shell syntax (pipes, redirects).
    async fn shell_exec_timeout(&self, command: &[&str], timeout: Duration)
    -> AdbResult<String>;

    async fn shell_exec(&self, command: &[&str]) -> AdbResult<String> {
        self.shell_exec_timeout(command, SHELL_TIMEOUT).await
    }

    // Raw backend-specific capture (implemented per backend), PNG encoded
    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>>;

    async fn screen_capture(&self) -> AdbResult<ImageCapture> {
        let start = std::time::Instant::now();
        let bytes = self.screen_capture_bytes().await?;
        Ok(ImageCapture {
            bytes,
            duration_ms: start.elapsed().as_millis(),
        })
    }

    async fn tap(&self, x: u32, y: u32) -> AdbResult<()> {
        let (width, height) = self.screen_dimensions();
        if x >= width || y >= height {
            return Err(AdbError::TapOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        let (xs, ys) = (x.to_string(), y.to_string());
        self.shell_exec(&["input", "tap", &xs, &ys]).await?;
        log::debug!("👆 Tapped ({x},{y}) on {}", self.device_name());
        Ok(())
    }

    /// Release the connection.
    async fn close(self) -> AdbResult<()>
    where
        Self: Sized;

    fn screen_dimensions(&self) -> (u32, u32);
    fn device_name(&self) -> &str;
}

/// Parse `wm size` output. An override size, when present, wins because it
/// is what `input tap` coordinates are interpreted against.
pub fn parse_screen_size(stdout: &str) -> AdbResult<(u32, u32)> {
    let mut physical = None;
    let mut override_size = None;
    for line in stdout.lines() {
        let line = line.trim();
        let (slot, rest) = if let Some(rest) = line.strip_prefix("Physical size:") {
            (&mut physical, rest)
        } else if let Some(rest) = line.strip_prefix("Override size:") {
            (&mut override_size, rest)
        } else {
            continue;
        };
        if let Some((w, h)) = rest.trim().split_once('x')
            && let (Ok(w), Ok(h)) = (w.trim().parse::<u32>(), h.trim().parse::<u32>())
        {
            *slot = Some((w, h));
        }
    }
    override_size
        .or(physical)
        .ok_or(AdbError::ScreenSizeParseFailed)
}
