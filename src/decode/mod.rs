//! Topic dispatch: route a JSON message to the decoder for its sensor
//!
//! Every message carries a `topic` tag naming its schema. The matching
//! decoder validates the message and updates the corresponding record in
//! [`TelemetryState`]; the returned [`DecodeOutcome`] names the record that
//! changed, or reports a parsing error.

pub mod anemometer;
pub mod imu;
pub mod particulate;

use serde_json::Value;
use tracing::{debug, info};

use crate::fields::{as_object, Fields};
use crate::records::TelemetryState;

/// Schema selected by the `topic` field of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Anemometer,
    ParticulateMatter,
    Imu,
    /// Reserved for command/status traffic
    Command,
}

impl Topic {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "anm" => Some(Self::Anemometer),
            "sps" => Some(Self::ParticulateMatter),
            "imu" => Some(Self::Imu),
            "type" => Some(Self::Command),
            _ => None,
        }
    }
}

/// Result of decoding one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    ParsingError,
    AnemometerUpdated,
    ParticulateMatterUpdated,
    ImuUpdated,
    /// Reserved; no decoder produces it yet
    Status,
}

/// Decode one message into `state`.
///
/// Never fails outright: every structural, routing or schema problem
/// collapses into [`DecodeOutcome::ParsingError`], with the reason logged.
pub fn decode(json: &Value, state: &mut TelemetryState) -> DecodeOutcome {
    debug!("JSON received");

    let Ok(root) = as_object(json) else {
        debug!("JSON topic missing: message is not an object");
        return DecodeOutcome::ParsingError;
    };

    let tag = match root.string("topic") {
        Ok(tag) => tag,
        Err(e) => {
            debug!(error = %e, "JSON topic missing");
            return DecodeOutcome::ParsingError;
        }
    };

    let result = match Topic::from_tag(tag) {
        Some(Topic::Anemometer) => anemometer::decode(root, &mut state.anemometer)
            .map(|()| DecodeOutcome::AnemometerUpdated),
        Some(Topic::ParticulateMatter) => particulate::decode(root, &mut state.particulate_matter)
            .map(|()| DecodeOutcome::ParticulateMatterUpdated),
        Some(Topic::Imu) => imu::decode(root, &mut state.imu).map(|()| DecodeOutcome::ImuUpdated),
        Some(Topic::Command) => {
            info!("Command topic received, ignoring");
            return DecodeOutcome::ParsingError;
        }
        None => {
            debug!(topic = tag, "Unknown topic");
            return DecodeOutcome::ParsingError;
        }
    };

    match result {
        Ok(outcome) => {
            debug!(topic = tag, ?outcome, "Message decoded");
            outcome
        }
        Err(e) => {
            debug!(topic = tag, error = %e, "Message rejected");
            DecodeOutcome::ParsingError
        }
    }
}
