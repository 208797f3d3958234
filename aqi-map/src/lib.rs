//! AQI Map - nearest PM2.5 reading on a terminal map
//!
//! Library half of the `aqi-map` binary, exposed so integration tests can
//! drive the reducer, components and HTTP clients directly.

pub mod action;
pub mod api;
pub mod components;
pub mod config;
pub mod effect;
pub mod geo;
pub mod history;
pub mod location;
pub mod logging;
pub mod reducer;
pub mod state;
