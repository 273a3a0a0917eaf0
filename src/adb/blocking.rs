// adb_client is synchronous; run its calls off the runtime with a deadline.
use super::error::{AdbError, AdbResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub(crate) const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Lock `device` on a blocking thread and run `f`, failing with
/// [`AdbError::Timeout`] if it takes longer than `timeout`.
///
/// On timeout the blocking task keeps running until the transport gives up;
/// the lock stays held until then.
pub(crate) async fn with_device<D, T, F>(
    device: &Arc<Mutex<D>>,
    timeout: Duration,
    description: &str,
    f: F,
) -> AdbResult<T>
where
    D: Send + 'static,
    T: Send + 'static,
    F: FnOnce(&mut D) -> AdbResult<T> + Send + 'static,
{
    let device = Arc::clone(device);
    let task = tokio::task::spawn_blocking(move || {
        let mut dev = device.blocking_lock();
        f(&mut dev)
    });
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined?,
        Err(_) => Err(AdbError::Timeout {
            duration: timeout,
            description: description.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::types::SHELL_TIMEOUT;

    #[tokio::test]
    async fn test_with_device_returns_value() {
        let counter = Arc::new(Mutex::new(41u32));
        let value = with_device(&counter, SHELL_TIMEOUT, "increment", |n| {
            *n += 1;
            Ok(*n)
        })
        .await
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(*counter.lock().await, 42);
    }

    #[tokio::test]
    async fn test_with_device_times_out() {
        let slot = Arc::new(Mutex::new(()));
        let err = with_device(&slot, Duration::from_millis(20), "sleepy", |_| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AdbError::Timeout { .. }));
        assert!(err.is_disconnect());
    }
}
