//! Recording touches from `getevent -lt` output.
//!
//! Multi-touch reports only carry the axes that changed, so the parser keeps
//! the last known position and emits one [`TouchEvent`] per `SYN_REPORT`
//! that moved, pressed or released the contact.

use super::error::{AdbError, AdbResult};
use super::types::AdbClient;
use serde::Serialize;
use std::time::Duration;

/// Touchscreen node on most head units.
pub const DEFAULT_EVENT_DEVICE: &str = "/dev/input/event1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TouchEvent {
    /// Seconds since boot, as printed by `getevent -t`.
    pub timestamp: f64,
    pub x: u32,
    pub y: u32,
    pub phase: TouchPhase,
}

/// Lazy parser over `getevent -lt` lines.
pub struct TouchEventParser<I> {
    lines: I,
    x: Option<u32>,
    y: Option<u32>,
    touching: bool,
    moved: bool,
    pressed: bool,
    released: bool,
}

impl<I> TouchEventParser<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            x: None,
            y: None,
            touching: false,
            moved: false,
            pressed: false,
            released: false,
        }
    }

    /// Feed one record; returns an event when it closes a report.
    fn feed(&mut self, line: &str) -> Option<TouchEvent> {
        let (timestamp, tokens) = split_record(line)?;
        let mut tokens = tokens.iter().skip_while(|t| !t.starts_with("EV_"));
        let _event_type = tokens.next()?;
        let code = *tokens.next()?;
        let value = tokens.next().copied().unwrap_or("");

        match code {
            "ABS_MT_POSITION_X" => {
                self.x = u32::from_str_radix(value, 16).ok().or(self.x);
                self.moved = true;
            }
            "ABS_MT_POSITION_Y" => {
                self.y = u32::from_str_radix(value, 16).ok().or(self.y);
                self.moved = true;
            }
            "BTN_TOUCH" => match value {
                "DOWN" => self.pressed = true,
                "UP" => self.released = true,
                _ => {}
            },
            // Some panels skip BTN_TOUCH and only drop the tracking id.
            "ABS_MT_TRACKING_ID" if value == "ffffffff" => self.released = true,
            "SYN_REPORT" => return self.report(timestamp),
            _ => {}
        }
        None
    }

    fn report(&mut self, timestamp: f64) -> Option<TouchEvent> {
        let (pressed, released, moved) = (self.pressed, self.released, self.moved);
        (self.pressed, self.released, self.moved) = (false, false, false);

        let (x, y) = (self.x?, self.y?);
        let phase = if released {
            self.touching = false;
            TouchPhase::Up
        } else if pressed || (moved && !self.touching) {
            self.touching = true;
            TouchPhase::Down
        } else if moved {
            TouchPhase::Move
        } else {
            return None;
        };
        Some(TouchEvent {
            timestamp,
            x,
            y,
            phase,
        })
    }
}

/// `[   1234.567890] /dev/input/event1: EV_ABS ABS_MT_POSITION_X 000001f4`
/// with the device prefix optional.
fn split_record(line: &str) -> Option<(f64, Vec<&str>)> {
    let line = line.trim();
    let rest = line.strip_prefix('[')?;
    let (stamp, rest) = rest.split_once(']')?;
    let timestamp = stamp.trim().parse().ok()?;
    Some((timestamp, rest.split_whitespace().collect()))
}

impl<I, S> Iterator for TouchEventParser<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = TouchEvent;

    fn next(&mut self) -> Option<TouchEvent> {
        loop {
            let line = self.lines.next()?;
            if let Some(event) = self.feed(line.as_ref()) {
                return Some(event);
            }
        }
    }
}

pub fn parse_touch_events(output: &str) -> Vec<TouchEvent> {
    TouchEventParser::new(output.lines()).collect()
}

// Higher is more likely the touchscreen.
fn score_touch_device(device_name: &str) -> i32 {
    let name = device_name.to_lowercase();
    const WEIGHTS: &[(&str, i32)] = &[
        ("synaptics", 100),
        ("atmel", 90),
        ("goodix", 90),
        ("focaltech", 90),
        ("ilitek", 90),
        ("cypress", 80),
        ("elan", 80),
        ("touch", 50),
        ("screen", 40),
        ("panel", 30),
        ("ts", 20),
        ("button", -50),
        ("key", -30),
        ("jack", -50),
        ("audio", -50),
        ("gpio", -30),
    ];
    WEIGHTS
        .iter()
        .filter(|(needle, _)| name.contains(needle))
        .map(|(_, weight)| weight)
        .sum()
}

/// Whether a capability line of `getevent -p` lists a multi-touch position
/// axis (0x35 / 0x36), labelled or not.
fn is_position_axis(code_line: &str) -> bool {
    let code = code_line.trim_start();
    ["0035", "0036", "ABS_MT_POSITION_X", "ABS_MT_POSITION_Y"]
        .iter()
        .any(|axis| code.starts_with(axis))
}

/// Pick the touchscreen node from `getevent -p` output.
pub fn select_touch_device(output: &str) -> Option<String> {
    struct Candidate {
        path: String,
        name: String,
        has_position: bool,
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut in_abs = false;
    for line in output.lines() {
        let line = line.trim();
        if let Some(at) = line.find("/dev/input/event")
            && line.starts_with("add device")
        {
            candidates.push(Candidate {
                path: line[at..].to_string(),
                name: String::new(),
                has_position: false,
            });
            in_abs = false;
            continue;
        }
        let Some(current) = candidates.last_mut() else {
            continue;
        };
        if let Some(rest) = line.strip_prefix("name:") {
            current.name = rest.trim().trim_matches('"').to_string();
        } else if let Some(at) = line.find("ABS (0003):") {
            in_abs = true;
            let codes = &line[at..];
            let codes = codes.split_once(':').map_or("", |(_, c)| c);
            current.has_position |= is_position_axis(codes);
        } else if (line.contains("(00") && line.contains("):")) || line.starts_with("input props:") {
            in_abs = false;
        } else if in_abs {
            current.has_position |= is_position_axis(line);
        }
    }

    let mut best: Option<(&Candidate, i32)> = None;
    for candidate in candidates.iter().filter(|c| c.has_position) {
        let score = score_touch_device(&candidate.name);
        log::debug!(
            "📱 Touch-capable {} ('{}', score {})",
            candidate.path,
            candidate.name,
            score
        );
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }
    best.map(|(candidate, _)| candidate.path.clone())
}

pub async fn find_touch_device<C: AdbClient>(client: &C) -> AdbResult<String> {
    let out = client.shell_exec(&["getevent", "-p"]).await?;
    let device = select_touch_device(&out).ok_or(AdbError::NoTouchDeviceFound)?;
    log::info!("✅ Selected touch device {device}");
    Ok(device)
}

/// Record touches on `event_device` for `duration` (rounded up to whole
/// seconds, at least one).
pub async fn record_touch_events<C: AdbClient>(
    client: &C,
    event_device: &str,
    duration: Duration,
) -> AdbResult<Vec<TouchEvent>> {
    let secs = duration.as_secs_f64().ceil().max(1.0) as u64;
    let command = format!("timeout {secs}s getevent -lt {event_device} 2>/dev/null || true");
    log::info!("👆 Recording touches on {event_device} for {secs}s");
    let out = client
        .shell_exec_timeout(&[command.as_str()], Duration::from_secs(secs + 5))
        .await?;
    let events = parse_touch_events(&out);
    log::debug!("Parsed {} touch events", events.len());
    Ok(events)
}
