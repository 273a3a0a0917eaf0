// In-memory AdbClient for tests: canned shell output, recorded commands.
use super::error::{AdbError, AdbResult};
use super::types::{AdbClient, Device};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
pub(crate) struct MockAdb {
    name: String,
    size: (u32, u32),
    screenshot: Vec<u8>,
    responses: HashMap<String, String>,
    failing: Vec<String>,
    commands: Mutex<Vec<String>>,
    closed: Arc<Mutex<Vec<String>>>,
}

impl MockAdb {
    pub(crate) fn new(name: &str, size: (u32, u32)) -> Self {
        Self {
            name: name.to_string(),
            size,
            screenshot: Vec::new(),
            responses: HashMap::new(),
            failing: Vec::new(),
            commands: Mutex::new(Vec::new()),
            closed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn with_response(mut self, command: &str, output: &str) -> Self {
        self.responses.insert(command.to_string(), output.to_string());
        self
    }

    pub(crate) fn with_failure(mut self, command: &str) -> Self {
        self.failing.push(command.to_string());
        self
    }

    pub(crate) fn with_screenshot(mut self, png: Vec<u8>) -> Self {
        self.screenshot = png;
        self
    }

    /// Share a log that records the device name whenever a client is closed.
    pub(crate) fn with_close_log(mut self, log: &Arc<Mutex<Vec<String>>>) -> Self {
        self.closed = Arc::clone(log);
        self
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn taps(&self) -> Vec<(u32, u32)> {
        self.commands()
            .iter()
            .filter_map(|cmd| {
                let rest = cmd.strip_prefix("input tap ")?;
                let (x, y) = rest.split_once(' ')?;
                Some((x.parse().ok()?, y.parse().ok()?))
            })
            .collect()
    }
}

impl AdbClient for MockAdb {
    async fn list_devices() -> AdbResult<Vec<Device>> {
        Ok(Vec::new())
    }

    async fn open(device_name: &str) -> AdbResult<Self> {
        Err(AdbError::DeviceNotFound {
            name: device_name.to_string(),
        })
    }

    async fn shell_exec_timeout(&self, command: &[&str], _timeout: Duration) -> AdbResult<String> {
        let line = command.join(" ");
        self.commands.lock().unwrap().push(line.clone());
        if self.failing.contains(&line) {
            return Err(AdbError::CommandFailed {
                command: line,
                stderr: "error: device offline".to_string(),
            });
        }
        Ok(self.responses.get(&line).cloned().unwrap_or_default())
    }

    async fn screen_capture_bytes(&self) -> AdbResult<Vec<u8>> {
        Ok(self.screenshot.clone())
    }

    async fn close(self) -> AdbResult<()> {
        self.closed.lock().unwrap().push(self.name.clone());
        Ok(())
    }

    fn screen_dimensions(&self) -> (u32, u32) {
        self.size
    }

    fn device_name(&self) -> &str {
        &self.name
    }
}
