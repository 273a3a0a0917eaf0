mod args;

use android_image_locate::adb::{
    self, AdbBackend, AdbClient, AdbResult, DEFAULT_EVENT_DEVICE, discovery,
};
use android_image_locate::automation::{AutomationError, AutomationResult, tap_on_image_with};
use android_image_locate::locate::{
    ImageLoader, LocateConfig, LocateError, MatchLocator, annotate,
};
use args::{Args, Mode, Parsed};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = match Args::parse() {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help) => {
            args::print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Parsed::Version) => {
            println!(
                "Android Image Locate v{} (built {})",
                env!("APP_VERSION_DISPLAY"),
                env!("APP_BUILD_DATE")
            );
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("❌ {e}");
            args::print_help();
            return ExitCode::FAILURE;
        }
    };

    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    let locator = MatchLocator::with_config(LocateConfig::default().with_confidence(args.confidence));

    let result = match &args.mode {
        Mode::Locate {
            main,
            sub,
            annotate,
        } => run_locate(&locator, main, sub, annotate.as_deref()).map_err(AutomationError::from),
        _ => match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(run_device(&args, &locator)),
            Err(e) => {
                log::error!("❌ Failed to start async runtime: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AutomationError::Locate(LocateError::Validation(errors))) => {
            for error in errors.iter() {
                log::error!("❌ {error}");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_locate(
    locator: &MatchLocator,
    main: &Path,
    sub: &Path,
    annotate_to: Option<&Path>,
) -> Result<(), LocateError> {
    let points = locator.locate_configured(main, sub)?;
    for p in &points {
        println!("{},{}", p.x, p.y);
    }

    if let Some(output) = annotate_to {
        let main_image = ImageLoader::load_main(main)?;
        let (sub_w, sub_h) = ImageLoader::load_sub(sub)?.dimensions();
        annotate::save_annotated(&main_image.color, &points, sub_w, sub_h, output)?;
    }
    Ok(())
}

async fn connect(args: &Args) -> AdbResult<AdbBackend> {
    match &args.manufacturer {
        Some(needle) => adb::discover(args.backend, needle).await,
        None => AdbBackend::connect_first(args.backend).await,
    }
}

async fn run_device(args: &Args, locator: &MatchLocator) -> AutomationResult<()> {
    if args.mode == Mode::Devices {
        return list_devices(args).await;
    }

    let client = connect(args).await?;
    let (sx, sy) = client.screen_dimensions();
    log::info!(
        "📱 Device: {} size: {}x{} (backend={})",
        client.device_name(),
        sx,
        sy,
        client.kind()
    );

    let result = run_on_client(args, locator, &client).await;
    if let Err(e) = client.close().await {
        log::warn!("⚠️ Close failed: {e}");
    }
    result
}

async fn run_on_client(
    args: &Args,
    locator: &MatchLocator,
    client: &AdbBackend,
) -> AutomationResult<()> {
    match &args.mode {
        Mode::Screenshot => {
            let capture = client.screen_capture().await?;
            tokio::fs::write(&args.output, &capture.bytes)
                .await
                .map_err(|source| AutomationError::Io {
                    path: args.output.clone(),
                    source,
                })?;
            log::info!(
                "✅ Screenshot ({}ms) saved to {}",
                capture.duration_ms,
                args.output.display()
            );
        }
        Mode::TapImage { template } => {
            let point = tap_on_image_with(client, locator, &args.output, template).await?;
            println!("{},{}", point.x, point.y);
        }
        Mode::TouchLog {
            event_device,
            duration,
        } => {
            let device = match event_device {
                Some(device) => device.clone(),
                None => adb::find_touch_device(client).await.unwrap_or_else(|e| {
                    log::warn!("⚠️ {e}, using {DEFAULT_EVENT_DEVICE}");
                    DEFAULT_EVENT_DEVICE.to_string()
                }),
            };
            for event in adb::record_touch_events(client, &device, *duration).await? {
                println!(
                    "{:.6} {:?} x={} y={}",
                    event.timestamp, event.phase, event.x, event.y
                );
            }
        }
        Mode::Locate { .. } | Mode::Devices => {}
    }
    Ok(())
}

async fn list_devices(args: &Args) -> AutomationResult<()> {
    let devices = AdbBackend::list_devices_with(args.backend).await?;
    if devices.is_empty() {
        log::warn!("⚠️ No devices found");
        return Ok(());
    }

    let mut clients = Vec::new();
    for device in &devices {
        match AdbBackend::open_with(args.backend, &device.name).await {
            Ok(client) => clients.push(client),
            Err(e) => println!("{}\t(unavailable: {e})", device.name),
        }
    }

    for (probe, client) in discovery::probe_manufacturers(clients).await {
        let marker = match &args.manufacturer {
            Some(needle) if probe.matches(needle) => "  *",
            _ => "",
        };
        println!("{}\t{}{}", probe.device.name, probe.manufacturer, marker);
        if let Err(e) = client.close().await {
            log::warn!("⚠️ Close failed: {e}");
        }
    }
    Ok(())
}
