use super::error::{AdbError, AdbResult};
use super::rust_impl::RustAdb;
use super::shell::AdbShell;
use super::types::{AdbClient, BackendKind, Device};
use super::usb_impl::UsbAdb;
use std::time::Duration;

/// A connection through whichever implementation was selected at runtime.
pub enum AdbBackend {
    Shell(AdbShell),
    Rust(RustAdb),
    Usb(UsbAdb),
}

impl AdbBackend {
    pub async fn list_devices_with(kind: BackendKind) -> AdbResult<Vec<Device>> {
        match kind {
            BackendKind::Shell => AdbShell::list_devices().await,
            BackendKind::Rust => RustAdb::list_devices().await,
            BackendKind::Usb => UsbAdb::list_devices().await,
        }
    }

    pub async fn open_with(kind: BackendKind, name: &str) -> AdbResult<Self> {
        log::debug!("Opening {name} with the {kind} backend");
        Ok(match kind {
            BackendKind::Shell => AdbBackend::Shell(AdbShell::open(name).await?),
            BackendKind::Rust => AdbBackend::Rust(RustAdb::open(name).await?),
            BackendKind::Usb => AdbBackend::Usb(UsbAdb::open(name).await?),
        })
    }

    /// Connect to the first available device.
    pub async fn connect_first(kind: BackendKind) -> AdbResult<Self> {
        let first = Self::list_devices_with(kind)
            .await?
            .into_iter()
            .next()
            .ok_or(AdbError::NoDevicesFound)?;
        Self::open_with(kind, &first.name).await
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            AdbBackend::Shell(_) => BackendKind::Shell,
            AdbBackend::Rust(_) => BackendKind::Rust,
            AdbBackend::Usb(_) => BackendKind::Usb,
        }
    }
}

impl AdbClient for AdbBackend {
    /// Uses the implementation named by `ADB_IMPL`.
    async fn list_devices() -> AdbResult<Vec<Device>> {
        Self::list_devices_with(BackendKind::from_env()).await
    }

    async fn open(device_name: &str) -> AdbResult<Self> {
        Self::open_with(BackendKind::from_env(), device_name).await
    }

    async fn shell_exec_timeout(
        &self,
        command: &[&str],
        timeout: Duration,
    ) -> AdbResult<String> {
        match self {
            AdbBackend::Shell(s) => s.shell_exec_timeout(command, timeout).await,
            AdbBackend::Rust(r) => r.shell_exec_timeout(command, timeout).await,
            AdbBackend::Usb(u) => u.shell_exec_timeout(command, timeout).await,
        }
    }

    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        match self {
            AdbBackend::Shell(s) => s.screen_capture_bytes().await,
            AdbBackend::Rust(r) => r.screen_capture_bytes().await,
            AdbBackend::Usb(u) => u.screen_capture_bytes().await,
        }
    }

    async fn close(self) -> AdbResult<()> {
        match self {
            AdbBackend::Shell(s) => s.close().await,
            AdbBackend::Rust(r) => r.close().await,
            AdbBackend::Usb(u) => u.close().await,
        }
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        match self {
            AdbBackend::Shell(s) => s.screen_dimensions(),
            AdbBackend::Rust(r) => r.screen_dimensions(),
            AdbBackend::Usb(u) => u.screen_dimensions(),
        }
    }

    fn device_name(&self) -> &str {
        match self {
            AdbBackend::Shell(s) => s.device_name(),
            AdbBackend::Rust(r) => r.device_name(),
            AdbBackend::Usb(u) => u.device_name(),
        }
    }
}
