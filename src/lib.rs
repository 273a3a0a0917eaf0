pub mod adb;
pub mod automation;
pub mod locate;

pub use adb::{AdbBackend, AdbClient};
pub use automation::tap_on_image;
pub use locate::{CandidatePoint, LocateError, MatchLocator, locate};
