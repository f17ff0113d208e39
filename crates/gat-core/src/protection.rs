//! Protection devices, zones and the topology that groups them.
//!
//! A [`ProtectionTopology`] is an ordered list of [`ProtectionZone`]s; each
//! zone owns its relays in construction order. Flattening zones in order
//! gives every device a stable position, which is how the rest of the engine
//! addresses devices (the RL action space is `4 × position + adjustment`).
//!
//! Device settings are the only mutable part of a topology. Zone membership,
//! bus sets and device identities never change after construction.

use crate::diagnostics::{Category, Diagnostics};
use crate::units::{Kilometers, Kilovolts, MegavoltAmperes};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Default coordination margin carried by a relay (IEEE C37.112), seconds.
pub const DEFAULT_COORDINATION_MARGIN_S: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl DeviceId {
    pub fn new(value: impl Into<String>) -> Self {
        DeviceId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ZoneId {
    pub fn new(value: impl Into<String>) -> Self {
        ZoneId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ANSI device classes handled by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Transformer differential (87T), definite time, own zone only
    #[serde(rename = "87T")]
    Differential,
    /// Inverse-time overcurrent (50/51), reaches into neighbouring zones
    #[serde(rename = "50/51")]
    InverseTimeOvercurrent,
    /// Directional overcurrent (67), definite time, own zone only
    #[serde(rename = "67")]
    DirectionalOvercurrent,
    /// Under/over-voltage (27/59), driven by fault severity
    #[serde(rename = "27/59")]
    Voltage,
}

impl DeviceKind {
    pub fn ansi_code(self) -> &'static str {
        match self {
            DeviceKind::Differential => "87T",
            DeviceKind::InverseTimeOvercurrent => "50/51",
            DeviceKind::DirectionalOvercurrent => "67",
            DeviceKind::Voltage => "27/59",
        }
    }

    /// Primary protection: differential and inverse-time overcurrent.
    pub fn is_primary(self) -> bool {
        matches!(
            self,
            DeviceKind::Differential | DeviceKind::InverseTimeOvercurrent
        )
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ansi_code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Active,
    Inactive,
}

fn default_margin() -> f64 {
    DEFAULT_COORDINATION_MARGIN_S
}

/// A protective relay and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionDevice {
    pub id: DeviceId,
    pub zone: ZoneId,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub location: String,
    /// Pickup threshold in per-unit of the simulator base current
    pub pickup_current: f64,
    /// Seconds
    pub time_delay: f64,
    #[serde(default)]
    pub distance_km: Kilometers,
    /// Seconds
    #[serde(default = "default_margin")]
    pub coordination_margin: f64,
    #[serde(default)]
    pub status: DeviceStatus,
}

impl ProtectionDevice {
    pub fn new(
        id: impl Into<String>,
        zone: impl Into<String>,
        kind: DeviceKind,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: DeviceId::new(id),
            zone: ZoneId::new(zone),
            kind,
            location: location.into(),
            pickup_current: 1.0,
            time_delay: 0.5,
            distance_km: Kilometers(0.0),
            coordination_margin: DEFAULT_COORDINATION_MARGIN_S,
            status: DeviceStatus::Active,
        }
    }

    pub fn with_settings(mut self, pickup_current: f64, time_delay: f64) -> Self {
        self.pickup_current = pickup_current;
        self.time_delay = time_delay;
        self
    }

    pub fn with_distance(mut self, distance_km: f64) -> Self {
        self.distance_km = Kilometers(distance_km);
        self
    }

    pub fn with_margin(mut self, coordination_margin: f64) -> Self {
        self.coordination_margin = coordination_margin;
        self
    }

    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.status = status;
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == DeviceStatus::Active
    }
}

/// A transformer zone: the buses it covers and the relays protecting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionZone {
    pub id: ZoneId,
    pub transformer: String,
    pub power_mva: MegavoltAmperes,
    pub voltage_kv: Kilovolts,
    pub buses: BTreeSet<usize>,
    #[serde(default)]
    pub devices: Vec<ProtectionDevice>,
}

impl ProtectionZone {
    #[inline]
    pub fn covers(&self, bus: usize) -> bool {
        self.buses.contains(&bus)
    }
}

/// Ordered set of protection zones.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProtectionTopology {
    pub zones: Vec<ProtectionZone>,
}

impl ProtectionTopology {
    pub fn new(zones: Vec<ProtectionZone>) -> Self {
        Self { zones }
    }

    /// Two 25 MVA transformer zones of the IEEE 14-bus offshore study case,
    /// four relays each (87T, 50/51, 67, 27/59).
    ///
    /// Bus 5 sits on the tie between both transformers and is listed in
    /// both zones; zone lookup is first-match, so it resolves to Z1.
    pub fn ieee14_two_zone() -> Self {
        let z1 = ProtectionZone {
            id: ZoneId::new("Z1"),
            transformer: "TR1 (25 MVA)".to_string(),
            power_mva: MegavoltAmperes(25.0),
            voltage_kv: Kilovolts(13.8),
            buses: [0, 4, 5, 6, 7, 9].into_iter().collect(),
            devices: vec![
                ProtectionDevice::new("87T-TR1", "Z1", DeviceKind::Differential, "Transformer TR1")
                    .with_settings(0.3, 0.02)
                    .with_margin(0.0),
                ProtectionDevice::new(
                    "50/51-L4-5",
                    "Z1",
                    DeviceKind::InverseTimeOvercurrent,
                    "Line Bus4-Bus5",
                )
                .with_settings(1.3, 0.4)
                .with_distance(2.5),
                ProtectionDevice::new("67-B4", "Z1", DeviceKind::DirectionalOvercurrent, "Bus 4")
                    .with_settings(1.2, 0.35),
                ProtectionDevice::new("27/59-B7", "Z1", DeviceKind::Voltage, "Bus 7")
                    .with_settings(0.9, 1.2)
                    .with_distance(3.2)
                    .with_margin(0.4),
            ],
        };

        let z2 = ProtectionZone {
            id: ZoneId::new("Z2"),
            transformer: "TR2 (25 MVA)".to_string(),
            power_mva: MegavoltAmperes(25.0),
            voltage_kv: Kilovolts(13.8),
            buses: [1, 5, 8, 10, 11, 12, 13, 14].into_iter().collect(),
            devices: vec![
                ProtectionDevice::new("87T-TR2", "Z2", DeviceKind::Differential, "Transformer TR2")
                    .with_settings(0.3, 0.02)
                    .with_margin(0.0),
                ProtectionDevice::new(
                    "50/51-L5-6",
                    "Z2",
                    DeviceKind::InverseTimeOvercurrent,
                    "Line Bus5-Bus6",
                )
                .with_settings(1.4, 0.5)
                .with_distance(1.8),
                ProtectionDevice::new("67-B5", "Z2", DeviceKind::DirectionalOvercurrent, "Bus 5")
                    .with_settings(1.3, 0.45),
                ProtectionDevice::new("27/59-B14", "Z2", DeviceKind::Voltage, "Bus 14")
                    .with_settings(1.0, 1.4)
                    .with_distance(4.1)
                    .with_margin(0.4),
            ],
        };

        Self::new(vec![z1, z2])
    }

    /// All devices in position order (zone by zone).
    pub fn devices(&self) -> impl Iterator<Item = &ProtectionDevice> {
        self.zones.iter().flat_map(|zone| zone.devices.iter())
    }

    pub fn devices_mut(&mut self) -> impl Iterator<Item = &mut ProtectionDevice> {
        self.zones.iter_mut().flat_map(|zone| zone.devices.iter_mut())
    }

    pub fn device(&self, position: usize) -> Option<&ProtectionDevice> {
        self.devices().nth(position)
    }

    pub fn device_mut(&mut self, position: usize) -> Option<&mut ProtectionDevice> {
        self.devices_mut().nth(position)
    }

    pub fn device_by_id(&self, id: &str) -> Option<&ProtectionDevice> {
        self.devices().find(|device| device.id.as_str() == id)
    }

    pub fn device_count(&self) -> usize {
        self.zones.iter().map(|zone| zone.devices.len()).sum()
    }

    pub fn active_device_count(&self) -> usize {
        self.devices().filter(|device| device.is_active()).count()
    }

    pub fn zone(&self, id: &ZoneId) -> Option<&ProtectionZone> {
        self.zones.iter().find(|zone| &zone.id == id)
    }

    /// The first zone whose bus set contains `bus`.
    pub fn zone_for_bus(&self, bus: usize) -> Option<&ProtectionZone> {
        self.zones.iter().find(|zone| zone.covers(bus))
    }

    /// Deep copy of every device, in position order.
    pub fn snapshot_devices(&self) -> Vec<ProtectionDevice> {
        self.devices().cloned().collect()
    }

    /// Overwrite device settings from a snapshot taken on this topology.
    /// Entries are matched by position; an id mismatch skips the entry.
    pub fn restore_devices(&mut self, snapshot: &[ProtectionDevice]) {
        for (device, saved) in self.devices_mut().zip(snapshot) {
            if device.id == saved.id {
                device.clone_from(saved);
            }
        }
    }

    /// Check identities, membership and settings.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diag = Diagnostics::new();

        if self.zones.is_empty() {
            diag.error(Category::Membership, "topology has no zones", None);
        } else if self.device_count() == 0 {
            diag.error(Category::Membership, "topology has no protection devices", None);
        }

        let mut zone_ids = HashSet::new();
        let mut device_ids = HashSet::new();
        let mut bus_owners: BTreeMap<usize, Vec<&ZoneId>> = BTreeMap::new();

        for zone in &self.zones {
            let zone_entity = format!("Zone {}", zone.id);
            if !zone_ids.insert(&zone.id) {
                diag.error(Category::Identity, "duplicate zone id", Some(zone_entity.as_str()));
            }
            if zone.buses.is_empty() {
                diag.warning(Category::Membership, "zone covers no buses", Some(zone_entity.as_str()));
            }
            for &bus in &zone.buses {
                bus_owners.entry(bus).or_default().push(&zone.id);
            }

            for device in &zone.devices {
                let entity = device.id.as_str();
                if !device_ids.insert(&device.id) {
                    diag.error(Category::Identity, "duplicate device id", Some(entity));
                }
                if device.zone != zone.id {
                    diag.error(
                        Category::Membership,
                        format!(
                            "device declares zone {} but is owned by zone {}",
                            device.zone, zone.id
                        ),
                        Some(entity),
                    );
                }
                if !(device.pickup_current.is_finite() && device.pickup_current > 0.0) {
                    diag.error(Category::Settings, "pickup current must be positive", Some(entity));
                }
                if !(device.time_delay.is_finite() && device.time_delay > 0.0) {
                    diag.error(Category::Settings, "time delay must be positive", Some(entity));
                }
            }
        }

        for (bus, owners) in bus_owners {
            if owners.len() > 1 {
                let names: Vec<&str> = owners.iter().map(|id| id.as_str()).collect();
                diag.warning(
                    Category::Membership,
                    format!(
                        "bus claimed by zones {}; first match ({}) is used",
                        names.join(", "),
                        names[0]
                    ),
                    Some(format!("Bus {bus}").as_str()),
                );
            }
        }

        diag
    }
}
