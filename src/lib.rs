//! Sensor console library
//!
//! Decodes JSON telemetry from the instrument's serial link into typed
//! records and renders them as a tabbed text display.

pub mod command;
pub mod config;
pub mod console;
pub mod decode;
pub mod fields;
pub mod records;
pub mod screen;
pub mod serial;
