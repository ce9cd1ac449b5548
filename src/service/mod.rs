// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer: the layered config engine.
//!
//! [`Config`] holds values for registered items, [`coerce`] turns source
//! values into typed item values, and [`ConfigBuilder`] assembles a layered
//! config from sources.

pub mod builder;
pub mod coerce;
pub mod config;
pub mod loader;

pub use builder::ConfigBuilder;
pub use coerce::coerce;
pub use config::{Config, Items};
pub use loader::LoadReport;
