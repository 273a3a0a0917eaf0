// Direct USB implementation without ADB daemon
use super::blocking::{CAPTURE_TIMEOUT, with_device};
use super::error::{AdbError, AdbResult};
use super::framebuffer;
use super::types::{AdbClient, Device, parse_screen_size};
use adb_client::{ADBDeviceExt, ADBUSBDevice};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const CONNECT_ATTEMPTS: u32 = 5;
// Long enough for a human to accept the "Allow USB debugging?" prompt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct UsbAdb {
    device: Device,
    usb_device: Arc<Mutex<ADBUSBDevice>>,
    screen_x: u32,
    screen_y: u32,
}

impl UsbAdb {
    /// Persistent key shared with the ADB daemon: `~/.android/adbkey`.
    fn key_path() -> AdbResult<PathBuf> {
        let path = homedir::my_home()
            .ok()
            .flatten()
            .map(|home| home.join(".android").join("adbkey"))
            .ok_or(AdbError::HomeDirectoryNotFound)?;
        if !path.exists() {
            return Err(AdbError::KeyNotFound { path });
        }
        Ok(path)
    }

    /// Handshake failures worth another attempt.
    fn is_retryable(message: &str) -> bool {
        ["Resource busy", "AUTH", "CLSE", "CNXN"]
            .iter()
            .any(|needle| message.contains(needle))
    }

    async fn connect(device_name: &str, key_path: PathBuf) -> AdbResult<ADBUSBDevice> {
        log::info!("📱 Connecting to USB device using key {}", key_path.display());
        log::debug!("If an 'Allow USB debugging?' prompt appears, accept it on the phone");

        let mut attempt = 1;
        loop {
            let key = key_path.clone();
            let task = tokio::task::spawn_blocking(move || {
                ADBUSBDevice::autodetect_with_custom_private_key(key)
            });
            let result = tokio::time::timeout(CONNECT_TIMEOUT, task)
                .await
                .map_err(|_| AdbError::Timeout {
                    duration: CONNECT_TIMEOUT,
                    description: "USB connection (authorize USB debugging on the phone)"
                        .to_string(),
                })??;

            match result {
                Ok(device) => {
                    if attempt > 1 {
                        log::debug!("✅ Connected on attempt {attempt}");
                    }
                    return Ok(device);
                }
                Err(e) if attempt < CONNECT_ATTEMPTS && Self::is_retryable(&e.to_string()) => {
                    log::warn!("⚠️ Attempt {attempt}/{CONNECT_ATTEMPTS}: {e}, retrying");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    attempt += 1;
                }
                Err(source) => {
                    return Err(AdbError::ConnectionFailed {
                        device: device_name.to_string(),
                        source,
                    });
                }
            }
        }
    }
}

impl AdbClient for UsbAdb {
    async fn list_devices() -> AdbResult<Vec<Device>> {
        let task = tokio::task::spawn_blocking(adb_client::search_adb_devices);
        let found = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .map_err(|_| AdbError::Timeout {
                duration: Duration::from_secs(2),
                description: "USB device enumeration".to_string(),
            })???;
        Ok(found
            .map(|(vendor_id, product_id)| Device::new(format!("{vendor_id:04x}:{product_id:04x}")))
            .into_iter()
            .collect())
    }

    async fn open(device_name: &str) -> AdbResult<Self> {
        let key_path = Self::key_path()?;
        let usb_device = Self::connect(device_name, key_path).await?;

        let mut adb = UsbAdb {
            device: Device::new(device_name),
            usb_device: Arc::new(Mutex::new(usb_device)),
            screen_x: 0,
            screen_y: 0,
        };

        // Fails fast if the connection is not fully authorized yet.
        adb.shell_exec(&["echo", "ok"]).await?;

        let out = adb.shell_exec(&["wm", "size"]).await?;
        (adb.screen_x, adb.screen_y) = parse_screen_size(&out)?;
        log::info!(
            "🔌 USB device {} connected ({}x{})",
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
        let out = with_device(&self.usb_device, timeout, &description, move |dev| {
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
        // No screencap fallback: it hangs forever on some USB devices.
        let raw = with_device(
            &self.usb_device,
            CAPTURE_TIMEOUT,
            "framebuffer capture",
            |dev| {
                dev.framebuffer_bytes()
                    .map_err(|source| AdbError::FramebufferCaptureFailed { source })
            },
        )
        .await?;
        framebuffer::to_png(raw, self.screen_x, self.screen_y)
    }

    async fn close(self) -> AdbResult<()> {
        log::debug!("🔌 Closed USB connection to {}", self.device.name);
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        (self.screen_x, self.screen_y)
    }

    fn device_name(&self) -> &str {
        &self.device.name
    }
}
