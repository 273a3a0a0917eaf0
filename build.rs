use std::env;
use std::process::Command;
use time::OffsetDateTime;

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let build_date = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|epoch| OffsetDateTime::from_unix_timestamp(epoch).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
        .date();

    let package_version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    // Short commit id when built from a checkout, e.g. "0.1.0 (3f2a9c1)".
    let commit = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let display_version = match commit {
        Some(commit) => format!("{package_version} ({commit})"),
        None => package_version,
    };

    println!("cargo:rustc-env=APP_BUILD_DATE={build_date}");
    println!("cargo:rustc-env=APP_VERSION_DISPLAY={display_version}");
}
