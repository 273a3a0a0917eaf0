// Automation module
// Screenshot, locate, tap: the workflow the locate core was built for.

pub mod error;
pub mod tap;

pub use error::{AutomationError, AutomationResult};
pub use tap::{tap_on_image, tap_on_image_with};
