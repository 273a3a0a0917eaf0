use super::error::{AutomationError, AutomationResult};
use crate::adb::AdbClient;
use crate::locate::{CandidatePoint, LocateConfig, MatchLocator};
use std::path::Path;

/// Capture the screen, find `template_path` on it and tap its center.
///
/// The screenshot is kept at `screenshot_path`. Exactly one occurrence must
/// be found; zero or several is an error and nothing is tapped.
pub async fn tap_on_image<C: AdbClient>(
    client: &C,
    screenshot_path: &Path,
    template_path: &Path,
    confidence: f32,
) -> AutomationResult<CandidatePoint> {
    let locator = MatchLocator::with_config(LocateConfig::default().with_confidence(confidence));
    tap_on_image_with(client, &locator, screenshot_path, template_path).await
}

/// [`tap_on_image`] with a fully configured locator (confidence and cluster
/// radius).
pub async fn tap_on_image_with<C: AdbClient>(
    client: &C,
    locator: &MatchLocator,
    screenshot_path: &Path,
    template_path: &Path,
) -> AutomationResult<CandidatePoint> {
    let capture = client.screen_capture().await?;
    log::debug!(
        "📸 Screenshot from {}: {} bytes in {}ms",
        client.device_name(),
        capture.bytes.len(),
        capture.duration_ms
    );
    tokio::fs::write(screenshot_path, &capture.bytes)
        .await
        .map_err(|source| AutomationError::Io {
            path: screenshot_path.to_path_buf(),
            source,
        })?;

    // Correlation is CPU bound; keep it off the async workers.
    let locator = locator.clone();
    let (main, sub) = (screenshot_path.to_path_buf(), template_path.to_path_buf());
    let points =
        tokio::task::spawn_blocking(move || locator.locate_configured(&main, &sub)).await??;

    let target = match points.len() {
        0 => {
            return Err(AutomationError::NoMatch {
                template: template_path.to_path_buf(),
            });
        }
        1 => points[0],
        count => return Err(AutomationError::AmbiguousMatch { count, points }),
    };

    client.tap(target.x, target.y).await?;
    log::info!(
        "👆 Tapped {} at ({},{})",
        template_path.display(),
        target.x,
        target.y
    );
    Ok(target)
}
