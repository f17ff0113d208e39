//! # gat-core: Protection System Model
//!
//! Data structures shared by the protection-coordination engine: relays,
//! the transformer zones that own them, fault descriptions, unit newtypes
//! and the workspace error type.
//!
//! ## Design Philosophy
//!
//! The model is plain data. Nothing in this crate simulates or learns; the
//! `gat-protection` crate reads a [`ProtectionTopology`] and is the only
//! place device settings are changed.
//!
//! - **Zones** own their devices in construction order.
//! - **Positions**: flattening zones in order gives each device a stable
//!   index, used by the RL action encoding.
//! - **Closed device classes**: [`DeviceKind`] is an enum over the four
//!   ANSI functions the simulator understands, so operate logic is an
//!   exhaustive `match`.
//!
//! ## Quick Start
//!
//! ```rust
//! use gat_core::*;
//!
//! let topology = ProtectionTopology::ieee14_two_zone();
//! assert_eq!(topology.device_count(), 8);
//!
//! let zone = topology.zone_for_bus(4).unwrap();
//! assert_eq!(zone.id.as_str(), "Z1");
//!
//! let scenario = FaultScenario::validated(4, "3ph".parse().unwrap(), 0.8).unwrap();
//! assert_eq!(scenario.fault_type, FaultType::ThreePhase);
//! ```
//!
//! ## Modules
//!
//! - [`protection`] - devices, zones, topology, topology diagnostics
//! - [`fault`] - fault types and scenarios
//! - [`diagnostics`] - issue collection used by topology checks
//! - [`units`] - amperes, kV, MVA, km newtypes
//! - [`error`] - [`GatError`] / [`GatResult`]

pub mod diagnostics;
pub mod error;
pub mod fault;
pub mod protection;
pub mod units;

pub use diagnostics::{Category, DiagnosticIssue, Diagnostics, Severity};
pub use error::{GatError, GatResult};
pub use fault::{FaultScenario, FaultType};
pub use protection::{
    DeviceId, DeviceKind, DeviceStatus, ProtectionDevice, ProtectionTopology, ProtectionZone,
    ZoneId, DEFAULT_COORDINATION_MARGIN_S,
};
pub use units::{Amperes, Kilometers, Kilovolts, MegavoltAmperes};
