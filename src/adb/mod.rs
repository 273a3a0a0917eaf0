// ADB module - talking to Android devices
// Three interchangeable implementations: the external adb binary, the ADB
// server protocol in pure Rust, and direct USB without a daemon.

pub mod backend;
mod blocking;
pub mod discovery;
pub mod error;
pub mod framebuffer;
pub mod rust_impl;
pub mod shell;
pub mod touch;
pub mod types;
pub mod usb_impl;

#[cfg(test)]
pub(crate) mod mock;

// Re-export the main types and functions for easy access
pub use backend::AdbBackend;
pub use discovery::{DEFAULT_MANUFACTURER, DeviceProbe, discover, select_by_manufacturer};
pub use error::{AdbError, AdbResult};
pub use touch::{
    DEFAULT_EVENT_DEVICE, TouchEvent, TouchEventParser, TouchPhase, find_touch_device,
    record_touch_events,
};
pub use types::{AdbClient, BackendKind, Device, ImageCapture};
