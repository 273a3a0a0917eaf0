use super::error::{AdbError, AdbResult};
use super::types::{AdbClient, Device, parse_screen_size};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Backend driving the external `adb` binary.
pub struct AdbShell {
    device: Device,
    screen_x: u32,
    screen_y: u32,
    /// Set when `open` had to `adb connect` a network device; `close`
    /// disconnects it again.
    connected_by_us: bool,
}

impl AdbShell {
    /// `program <args>` as a child that is killed if its future is dropped,
    /// so a timed out command does not outlive the call.
    fn command(program: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args).kill_on_drop(true);
        cmd
    }

    async fn ensure_adb_available() -> AdbResult<()> {
        match Self::command("adb", &["version"]).output().await {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(AdbError::AdbBinaryUnavailable {
                description: format!("'adb version' returned {}", out.status),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AdbError::AdbBinaryUnavailable {
                    description: "'adb' binary not found in PATH".to_string(),
                })
            }
            Err(e) => Err(AdbError::AdbBinaryUnavailable {
                description: format!("failed to invoke 'adb': {e}"),
            }),
        }
    }

    async fn output_of(program: &str, args: &[&str]) -> AdbResult<Output> {
        let output = Self::command(program, args)
            .output()
            .await
            .map_err(|source| AdbError::Spawn {
                command: args.join(" "),
                source,
            })?;
        if !output.status.success() {
            return Err(AdbError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Run `adb <args>` and return its output, failing on non-zero exit.
    async fn run(args: &[&str]) -> AdbResult<Output> {
        Self::output_of("adb", args).await
    }

    /// Device selector arguments: transport id when known, else serial.
    fn target_args(&self) -> Vec<String> {
        match &self.device.transport_id {
            Some(tid) => vec!["-t".to_string(), tid.clone()],
            None => vec!["-s".to_string(), self.device.name.clone()],
        }
    }

    async fn run_on_device(&self, args: &[&str]) -> AdbResult<Output> {
        let target = self.target_args();
        let mut full: Vec<&str> = target.iter().map(String::as_str).collect();
        full.extend_from_slice(args);
        Self::run(&full).await
    }

    pub fn parse_devices(output: &str) -> Vec<Device> {
        output
            .lines()
            .skip(1)
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let name = parts.next()?;
                if parts.next()? != "device" {
                    return None;
                }
                let transport_id = parts
                    .find_map(|part| part.strip_prefix("transport_id:"))
                    .map(str::to_string);
                Some(Device {
                    name: name.to_string(),
                    transport_id,
                })
            })
            .collect()
    }

    async fn from_device(device: Device, connected_by_us: bool) -> AdbResult<Self> {
        let mut shell = Self {
            device,
            screen_x: 0,
            screen_y: 0,
            connected_by_us,
        };
        let out = shell.shell_exec(&["wm", "size"]).await?;
        (shell.screen_x, shell.screen_y) = parse_screen_size(&out)?;
        log::info!(
            "📱 Opened {} via adb binary ({}x{})",
            shell.device.name,
            shell.screen_x,
            shell.screen_y
        );
        Ok(shell)
    }
}

impl AdbClient for AdbShell {
    async fn list_devices() -> AdbResult<Vec<Device>> {
        Self::ensure_adb_available().await?;
        let output = Self::run(&["devices", "-l"]).await?;
        Ok(Self::parse_devices(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn open(device_name: &str) -> AdbResult<Self> {
        let devices = Self::list_devices().await?;
        if let Some(device) = devices.into_iter().find(|d| d.name == device_name) {
            return Self::from_device(device, false).await;
        }

        // Not attached yet: maybe a host:port reachable over TCP.
        let output = Self::run(&["connect", device_name]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.contains("refused") || stdout.contains("failed") || stdout.contains("cannot") {
            return Err(AdbError::CommandFailed {
                command: format!("connect {device_name}"),
                stderr: format!("{} (try 'adb tcpip 5555')", stdout.trim()),
            });
        }
        let device = Self::list_devices()
            .await?
            .into_iter()
            .find(|d| d.name == device_name)
            .ok_or_else(|| AdbError::DeviceNotFound {
                name: device_name.to_string(),
            })?;
        Self::from_device(device, true).await
    }

    async fn shell_exec_timeout(
        &self,
        command: &[&str],
        timeout: Duration,
    ) -> AdbResult<String> {
        let remote = command.join(" ");
        let output = tokio::time::timeout(timeout, self.run_on_device(&["shell", &remote]))
            .await
            .map_err(|_| AdbError::Timeout {
                duration: timeout,
                description: format!("shell {remote}"),
            })??;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        let output = self.run_on_device(&["exec-out", "screencap", "-p"]).await?;
        Ok(output.stdout)
    }

    async fn close(self) -> AdbResult<()> {
        if self.connected_by_us {
            Self::run(&["disconnect", &self.device.name]).await?;
            log::info!("🔌 Disconnected {}", self.device.name);
        }
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        (self.screen_x, self.screen_y)
    }

    fn device_name(&self) -> &str {
        &self.device.name
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timed_out_command_is_killed() {
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("finished");
        let script = format!("sleep 0.3; touch '{}'", marker.display());

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            AdbShell::output_of("sh", &["-c", &script]),
        )
        .await;
        assert!(result.is_err(), "command should still be running at the deadline");

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert!(!marker.exists(), "child kept running after the timeout");
    }

    #[tokio::test]
    async fn test_failed_command_reports_stderr() {
        let err = AdbShell::output_of("sh", &["-c", "echo boom >&2; exit 3"])
            .await
            .unwrap_err();
        match err {
            AdbError::CommandFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }
}
