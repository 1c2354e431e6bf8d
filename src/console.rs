//! Reaction dispatch between the decoder and the display
//!
//! [`Console`] owns the current sensor records and the renderer. Each
//! incoming message is decoded and, if a record changed, handed to the
//! matching [`Render`] entry point.

use serde_json::Value;
use tracing::{error, warn};

use crate::decode::{self, DecodeOutcome};
use crate::records::{AnemometerRecord, ImuRecord, ParticulateMatterRecord, TelemetryState};

/// Display entry points, one per record type.
///
/// Each is called at most once per decoded message and only ever sees a
/// fully decoded record.
pub trait Render {
    fn on_anemometer_updated(&mut self, record: &AnemometerRecord);
    fn on_particulate_matter_updated(&mut self, record: &ParticulateMatterRecord);
    fn on_imu_updated(&mut self, record: &ImuRecord);
}

pub struct Console<R> {
    state: TelemetryState,
    render: R,
}

impl<R: Render> Console<R> {
    /// Create a console with default records and draw them once.
    pub fn new(render: R) -> Self {
        let mut console = Self {
            state: TelemetryState::default(),
            render,
        };

        console.render.on_anemometer_updated(&console.state.anemometer);
        console
            .render
            .on_particulate_matter_updated(&console.state.particulate_matter);
        console.render.on_imu_updated(&console.state.imu);

        console
    }

    /// Decode one message and notify the renderer of the outcome.
    pub fn on_json_received(&mut self, json: &Value) -> DecodeOutcome {
        let outcome = decode::decode(json, &mut self.state);
        self.react(outcome);
        outcome
    }

    /// Forward a decode outcome to the renderer.
    pub fn react(&mut self, outcome: DecodeOutcome) {
        match outcome {
            DecodeOutcome::AnemometerUpdated => {
                self.render.on_anemometer_updated(&self.state.anemometer)
            }
            DecodeOutcome::ParticulateMatterUpdated => self
                .render
                .on_particulate_matter_updated(&self.state.particulate_matter),
            DecodeOutcome::ImuUpdated => self.render.on_imu_updated(&self.state.imu),
            DecodeOutcome::ParsingError => warn!("Failed to parse data"),
            other => error!(outcome = ?other, "Inconsistent decode outcome, nothing to render"),
        }
    }

    #[cfg(test)]
    fn state(&self) -> &TelemetryState {
        &self.state
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut R {
        &mut self.render
    }
}
