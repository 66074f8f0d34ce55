//! Template Configuration Module
//!
//! Provides the PACE template bundle (objectives, benchmarks, countermeasure
//! libraries) loaded from TOML and validated once at startup.
//!
//! ## Loading Order
//!
//! 1. `PACE_CONFIG` environment variable (path to TOML file)
//! 2. `pace_templates.toml` in the current working directory
//! 3. The template bundle embedded in the crate
//!
//! ## Usage
//!
//! The bundle is plain data passed by reference; there is no global
//! instance.
//!
//! ```ignore
//! let config = PaceConfig::load();
//! let pace = pace::compute_pace(&config, &inputs);
//! ```

mod pace_config;
pub mod defaults;
pub mod validation;

pub use pace_config::*;
