//! Picking the target device out of everything attached.
//!
//! Each candidate is opened and asked for `ro.product.manufacturer`; the
//! first whose answer contains the wanted text is kept and the rest are
//! closed again.

use super::backend::AdbBackend;
use super::error::{AdbError, AdbResult};
use super::types::{AdbClient, BackendKind, Device};
use serde::Serialize;

/// Manufacturer of the head units this tool is usually pointed at.
pub const DEFAULT_MANUFACTURER: &str = "Harman";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceProbe {
    pub device: Device,
    pub manufacturer: String,
}

impl DeviceProbe {
    /// Case-sensitive substring match, e.g. "Harman" matches "Harman International".
    pub fn matches(&self, needle: &str) -> bool {
        self.manufacturer.contains(needle)
    }
}

/// First probe, in listing order, whose manufacturer contains `needle`.
pub fn select_by_manufacturer<'a>(probes: &'a [DeviceProbe], needle: &str) -> Option<&'a DeviceProbe> {
    probes.iter().find(|probe| probe.matches(needle))
}

pub async fn probe_manufacturer<C: AdbClient>(client: &C) -> AdbResult<String> {
    let out = client
        .shell_exec(&["getprop", "ro.product.manufacturer"])
        .await?;
    Ok(out.trim().to_string())
}

/// Probe every open client. Clients that fail to answer are closed and
/// dropped from the result.
pub async fn probe_manufacturers<C: AdbClient>(clients: Vec<C>) -> Vec<(DeviceProbe, C)> {
    let mut probed = Vec::with_capacity(clients.len());
    for client in clients {
        match probe_manufacturer(&client).await {
            Ok(manufacturer) => {
                log::debug!("🔍 {} reports manufacturer '{}'", client.device_name(), manufacturer);
                let probe = DeviceProbe {
                    device: Device::new(client.device_name()),
                    manufacturer,
                };
                probed.push((probe, client));
            }
            Err(e) => {
                log::warn!("⚠️ Could not probe {}: {e}", client.device_name());
                close_quietly(client).await;
            }
        }
    }
    probed
}

async fn close_quietly<C: AdbClient>(client: C) {
    let name = client.device_name().to_string();
    if let Err(e) = client.close().await {
        log::warn!("⚠️ Closing {name} failed: {e}");
    }
}

/// Keep the first client whose manufacturer contains `needle`, closing all
/// others.
pub async fn discover_among<C: AdbClient>(clients: Vec<C>, needle: &str) -> AdbResult<C> {
    let probed = probe_manufacturers(clients).await;
    let (probes, clients): (Vec<DeviceProbe>, Vec<C>) = probed.into_iter().unzip();

    let wanted = select_by_manufacturer(&probes, needle).map(|probe| probe.device.name.clone());

    let mut selected = None;
    for client in clients {
        if selected.is_none() && wanted.as_deref() == Some(client.device_name()) {
            selected = Some(client);
        } else {
            close_quietly(client).await;
        }
    }

    let client = selected.ok_or_else(|| AdbError::NoMatchingManufacturer {
        needle: needle.to_string(),
    })?;
    log::info!("✅ Selected {} (manufacturer contains '{needle}')", client.device_name());
    Ok(client)
}

/// List devices through `kind`, open each one and return the first made by
/// `needle`.
pub async fn discover(kind: BackendKind, needle: &str) -> AdbResult<AdbBackend> {
    let devices = AdbBackend::list_devices_with(kind).await?;
    if devices.is_empty() {
        return Err(AdbError::NoDevicesFound);
    }

    let mut clients = Vec::with_capacity(devices.len());
    for device in &devices {
        match AdbBackend::open_with(kind, &device.name).await {
            Ok(client) => clients.push(client),
            Err(e) => log::warn!("⚠️ Skipping {}: {e}", device.name),
        }
    }
    discover_among(clients, needle).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(name: &str, manufacturer: &str) -> DeviceProbe {
        DeviceProbe {
            device: Device::new(name),
            manufacturer: manufacturer.to_string(),
        }
    }

    #[test]
    fn test_select_first_match_in_order() {
        let probes = vec![
            probe("emulator-5554", "Google"),
            probe("HU1", "Harman International"),
            probe("HU2", "Harman"),
        ];
        let selected = select_by_manufacturer(&probes, DEFAULT_MANUFACTURER).unwrap();
        assert_eq!(selected.device.name, "HU1");
    }

    #[test]
    fn test_select_is_case_sensitive() {
        let probes = vec![probe("a", "harman")];
        assert!(select_by_manufacturer(&probes, "Harman").is_none());
    }

    #[test]
    fn test_select_none_when_empty() {
        assert!(select_by_manufacturer(&[], "Harman").is_none());
    }
}
