// https://crates.io/crates/adb_client
use super::blocking::{CAPTURE_TIMEOUT, with_device};
use super::error::{AdbError, AdbResult};
use super::framebuffer;
use super::types::{AdbClient, Device, parse_screen_size};
use adb_client::{ADBDeviceExt, ADBServer, ADBServerDevice};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Backend speaking the ADB server protocol directly (server must be running).
pub struct RustAdb {
    device: Device,
    server_device: Arc<Mutex<ADBServerDevice>>,
    screen_x: u32,
    screen_y: u32,
}

impl RustAdb {
    async fn capture_framebuffer_png(&self) -> AdbResult<Vec<u8>> {
        let raw = with_device(
            &self.server_device,
            CAPTURE_TIMEOUT,
            "framebuffer capture",
            |dev| {
                dev.framebuffer_bytes()
                    .map_err(|source| AdbError::FramebufferCaptureFailed { source })
            },
        )
        .await?;
        log::trace!("📸 Captured {} framebuffer bytes", raw.len());
        framebuffer::to_png(raw, self.screen_x, self.screen_y)
    }
}

impl AdbClient for RustAdb {
    async fn list_devices() -> AdbResult<Vec<Device>> {
        let mut server = ADBServer::default();
        let device_list = tokio::task::spawn_blocking(move || server.devices()).await??;
        Ok(device_list
            .into_iter()
            .map(|d| Device::new(d.identifier))
            .collect())
    }

    async fn open(device_name: &str) -> AdbResult<Self> {
        let name = device_name.to_string();
        let task = tokio::task::spawn_blocking(move || {
            let mut server = ADBServer::default();
            server.get_device_by_name(&name)
        });
        let server_device = match tokio::time::timeout(Duration::from_secs(10), task).await {
            Ok(joined) => joined?.map_err(|source| AdbError::ConnectionFailed {
                device: device_name.to_string(),
                source,
            })?,
            Err(_) => {
                return Err(AdbError::Timeout {
                    duration: Duration::from_secs(10),
                    description: format!("opening {device_name} via ADB server"),
                });
            }
        };

        let mut adb = RustAdb {
            device: Device::new(device_name),
            server_device: Arc::new(Mutex::new(server_device)),
            screen_x: 0,
            screen_y: 0,
        };
        let out = adb.shell_exec(&["wm", "size"]).await?;
        (adb.screen_x, adb.screen_y) = parse_screen_size(&out)?;
        log::info!(
            "📱 Opened {} via ADB server ({}x{})",
            device_name,
            adb.screen_x,
            adb.screen_y
        );
        Ok(adb)
    }

    async fn shell_exec_timeout(
        &self,
        command: &[&str],
        timeout: Duration,
    ) -> AdbResult<String> {
        let args: Vec<String> = command.iter().map(|s| s.to_string()).collect();
        let description = format!("shell {}", args.join(" "));
        let out = with_device(&self.server_device, timeout, &description, move |dev| {
            let argv: Vec<&str> = args.iter().map(String::as_str).collect();
            let mut out: Vec<u8> = Vec::new();
            dev.shell_command(&argv, &mut out)
                .map_err(|source| AdbError::ShellCommandFailed {
                    command: args.join(" "),
                    source,
                })?;
            Ok(out)
        })
        .await?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        match self.capture_framebuffer_png().await {
            Ok(png) => return Ok(png),
            Err(e @ AdbError::Timeout { .. }) => return Err(e),
            Err(e) => log::debug!("Framebuffer path failed ({e}), falling back to screencap"),
        }

        with_device(&self.server_device, CAPTURE_TIMEOUT, "screencap -p", |dev| {
            let mut out: Vec<u8> = Vec::new();
            dev.shell_command(&["screencap", "-p"], &mut out)
                .map_err(|source| AdbError::ShellCommandFailed {
                    command: "screencap -p".to_string(),
                    source,
                })?;
            Ok(out)
        })
        .await
    }

    async fn close(self) -> AdbResult<()> {
        log::debug!("🔌 Released {}", self.device.name);
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        (self.screen_x, self.screen_y)
    }

    fn device_name(&self) -> &str {
        &self.device.name
    }
}
