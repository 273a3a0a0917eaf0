use android_image_locate::adb::BackendKind;
use android_image_locate::locate::config::DEFAULT_CONFIDENCE;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SCREENSHOT: &str = "cli-screenshot.png";
const DEFAULT_TOUCH_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Locate {
        main: PathBuf,
        sub: PathBuf,
        annotate: Option<PathBuf>,
    },
    Screenshot,
    TapImage {
        template: PathBuf,
    },
    TouchLog {
        event_device: Option<String>,
        duration: Duration,
    },
    Devices,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub mode: Mode,
    pub confidence: f32,
    pub backend: BackendKind,
    pub manufacturer: Option<String>,
    /// Where screenshots are written (`--screenshot`, `--tap-image`).
    pub output: PathBuf,
    pub debug_mode: bool,
}

#[derive(Debug, PartialEq)]
pub enum Parsed {
    Run(Args),
    Help,
    Version,
}

impl Args {
    pub fn parse() -> Result<Parsed, String> {
        Self::parse_from(env::args().skip(1))
    }

    pub fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Parsed, String> {
        let mut locate = false;
        let mut main: Option<PathBuf> = None;
        let mut sub: Option<PathBuf> = None;
        let mut annotate: Option<PathBuf> = None;
        let mut screenshot = false;
        let mut tap_image: Option<PathBuf> = None;
        let mut touch_log = false;
        let mut event_device: Option<String> = None;
        let mut duration = Duration::from_secs(DEFAULT_TOUCH_SECS);
        let mut devices = false;
        let mut confidence = DEFAULT_CONFIDENCE;
        let mut backend: Option<BackendKind> = None;
        let mut manufacturer: Option<String> = None;
        let mut output = PathBuf::from(DEFAULT_SCREENSHOT);
        let mut debug_mode = false;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                return Ok(Parsed::Help);
            } else if arg == "--version" || arg == "-v" {
                return Ok(Parsed::Version);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--locate" {
                locate = true;
            } else if let Some(val) = arg.strip_prefix("--main=") {
                main = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--sub=") {
                sub = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--annotate=") {
                annotate = Some(PathBuf::from(val));
            } else if arg == "--screenshot" || arg == "-s" {
                screenshot = true;
            } else if let Some(val) = arg.strip_prefix("--output=") {
                output = PathBuf::from(val);
            } else if let Some(val) = arg.strip_prefix("--tap-image=") {
                tap_image = Some(PathBuf::from(val));
            } else if arg == "--touch-log" {
                touch_log = true;
            } else if let Some(val) = arg.strip_prefix("--event-device=") {
                event_device = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--duration=") {
                let secs = val
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid duration value: {val}"))?;
                duration = Duration::from_secs(secs);
            } else if arg == "--devices" {
                devices = true;
            } else if let Some(val) = arg.strip_prefix("--manufacturer=") {
                manufacturer = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--confidence=") {
                confidence = val
                    .parse::<f32>()
                    .map_err(|_| format!("Invalid confidence value: {val}"))?;
            } else if let Some(val) = arg.strip_prefix("--impl=") {
                backend = Some(val.parse().map_err(|e| format!("{e}"))?);
            } else {
                return Err(format!("Unknown argument: {arg}"));
            }
        }

        let selected = [locate, screenshot, tap_image.is_some(), touch_log, devices]
            .iter()
            .filter(|&&on| on)
            .count();
        if selected > 1 {
            return Err(
                "Choose one of --locate, --screenshot, --tap-image, --touch-log, --devices"
                    .to_string(),
            );
        }

        let mode = if locate {
            Mode::Locate {
                main: main.ok_or("--locate needs --main=<image>")?,
                sub: sub.ok_or("--locate needs --sub=<image>")?,
                annotate,
            }
        } else if screenshot {
            Mode::Screenshot
        } else if let Some(template) = tap_image {
            Mode::TapImage { template }
        } else if touch_log {
            Mode::TouchLog {
                event_device,
                duration,
            }
        } else if devices {
            Mode::Devices
        } else {
            return Ok(Parsed::Help);
        };

        Ok(Parsed::Run(Args {
            mode,
            confidence,
            backend: backend.unwrap_or_else(BackendKind::from_env),
            manufacturer,
            output,
            debug_mode,
        }))
    }
}

pub fn print_help() {
    println!("🔎 Android Image Locate");
    println!();
    println!("USAGE:");
    println!("    android-image-locate [MODE] [FLAGS]");
    println!();
    println!("MODES:");
    println!("    --locate --main=<img> --sub=<img>  Print the center of every occurrence of sub in main");
    println!("    --annotate=<png>                   With --locate, also write main with matches boxed");
    println!("    --screenshot, -s                   Capture the device screen (see --output)");
    println!("    --tap-image=<png>                  Capture, locate the image and tap it");
    println!("    --touch-log                        Print touches recorded on the device");
    println!("    --devices                          List devices and their manufacturers");
    println!();
    println!("FLAGS:");
    println!("    --confidence=<0..1>     Minimum match score (default: {DEFAULT_CONFIDENCE})");
    println!("    --output=<png>          Screenshot file (default: {DEFAULT_SCREENSHOT})");
    println!("    --event-device=<path>   Input node for --touch-log (default: auto-detect)");
    println!("    --duration=<secs>       Recording time for --touch-log (default: {DEFAULT_TOUCH_SECS})");
    println!("    --manufacturer=<text>   Pick the device whose manufacturer contains <text>");
    println!("    --impl=<shell|rust|usb> ADB implementation (default: $ADB_IMPL or rust)");
    println!("                            The shell implementation requires the adb tool installed.");
    println!("    --debug                 Enable debug logging");
    println!("    --help, -h              Show this help message");
    println!("    --version, -v           Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    android-image-locate --locate --main=screen.png --sub=ok-button.png");
    println!("    android-image-locate --tap-image=ok-button.png --manufacturer=Harman");
    println!("    android-image-locate --touch-log --duration=5 --impl=shell");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Parsed, String> {
        Args::parse_from(args.iter().map(|s| s.to_string()))
    }

    fn run(args: &[&str]) -> Args {
        match parse(args).unwrap() {
            Parsed::Run(args) => args,
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn test_locate_mode() {
        let args = run(&["--locate", "--main=a.png", "--sub=b.png", "--confidence=0.9"]);
        assert_eq!(
            args.mode,
            Mode::Locate {
                main: "a.png".into(),
                sub: "b.png".into(),
                annotate: None
            }
        );
        assert_eq!(args.confidence, 0.9);
    }

    #[test]
    fn test_locate_requires_paths() {
        assert!(parse(&["--locate", "--main=a.png"]).is_err());
    }

    #[test]
    fn test_tap_image_with_backend() {
        let args = run(&["--tap-image=ok.png", "--impl=usb", "--output=shot.png", "--debug"]);
        assert_eq!(
            args.mode,
            Mode::TapImage {
                template: "ok.png".into()
            }
        );
        assert_eq!(args.backend, BackendKind::Usb);
        assert_eq!(args.output, PathBuf::from("shot.png"));
        assert!(args.debug_mode);
    }

    #[test]
    fn test_touch_log_defaults() {
        let args = run(&["--touch-log"]);
        assert_eq!(
            args.mode,
            Mode::TouchLog {
                event_device: None,
                duration: Duration::from_secs(DEFAULT_TOUCH_SECS)
            }
        );
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        assert!(parse(&["--screenshot", "--devices"]).is_err());
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(parse(&["-s", "--impl=magic"]).is_err());
        assert!(parse(&["--touch-log", "--duration=soon"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
    }

    #[test]
    fn test_no_mode_shows_help() {
        assert_eq!(parse(&[]).unwrap(), Parsed::Help);
        assert_eq!(parse(&["-v"]).unwrap(), Parsed::Version);
    }
}
