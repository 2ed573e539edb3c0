//! PlantCare firmware library.
//!
//! Two-plant irrigation and shading controller.  Exposes the pure-logic
//! modules for integration testing and external inspection.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod channels;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod notifier;
pub mod pins;
pub mod plant;
pub mod safety;
pub mod scheduler;
pub mod weather;

// The hardware-facing modules compile on the host too; the actual
// peripheral access is guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
pub mod sensors;
