//! Decoder for the inertial measurement unit (`imu` topic)
//!
//! The message carries an array of sub-readings, each tagged by `dev`.
//! Devices absent from a message keep their previous reading.

use serde_json::Value;
use tracing::debug;

use crate::fields::{DecodeError, Fields, Object};
use crate::records::{ImuRecord, Triaxial, Unit};

/// Sub-device of the IMU, selected by the `dev` tag of an array element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImuDevice {
    AccTop,
    Acc,
    Mag,
    Gyr,
}

impl ImuDevice {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "acctop" => Some(Self::AccTop),
            "acc" => Some(Self::Acc),
            "mag" => Some(Self::Mag),
            "gyr" => Some(Self::Gyr),
            _ => None,
        }
    }

    #[cfg(test)]
    fn tag(self) -> &'static str {
        match self {
            Self::AccTop => "acctop",
            Self::Acc => "acc",
            Self::Mag => "mag",
            Self::Gyr => "gyr",
        }
    }

    fn reading(self, record: &mut ImuRecord) -> &mut Triaxial {
        match self {
            Self::AccTop => &mut record.acc_top,
            Self::Acc => &mut record.acc,
            Self::Mag => &mut record.mag,
            Self::Gyr => &mut record.gyr,
        }
    }
}

/// Decode an IMU message into `record`.
///
/// Accelerometer and magnetometer elements must be complete; the first bad
/// field fails the whole message. Gyroscope fields are applied one by one
/// and never fail the message. Changes are committed only on success.
pub fn decode(root: &Object, record: &mut ImuRecord) -> Result<(), DecodeError> {
    let timestamp = root.timestamp()?;
    let elements = root.array("sensor_data")?;

    let mut staged = record.clone();
    staged.timestamp = timestamp;

    for (index, element) in elements.iter().enumerate() {
        let path = format!("[{index}]");
        let element = element
            .as_object()
            .ok_or_else(|| DecodeError::wrong_type(path.as_str(), "object"))
            .map_err(|e| e.within("sensor_data"))?;

        let Some(device) = element
            .get("dev")
            .and_then(Value::as_str)
            .and_then(ImuDevice::from_tag)
        else {
            debug!(index, "Skipping sensor_data element without a known dev");
            continue;
        };

        match device {
            ImuDevice::Gyr => apply_lenient(element, device.reading(&mut staged), index),
            _ => {
                *device.reading(&mut staged) = strict_reading(element)
                    .map_err(|e| e.within(&path).within("sensor_data"))?;
            }
        }
    }

    *record = staged;
    Ok(())
}

/// Unit then x, y, z; all four are required.
fn strict_reading(element: &Object) -> Result<Triaxial, DecodeError> {
    Ok(Triaxial {
        unit: element.unit("unit")?,
        x: element.number("x")?,
        y: element.number("y")?,
        z: element.number("z")?,
    })
}

/// Apply each valid field of a gyroscope element.
///
/// An invalid axis keeps its previous value, while an invalid unit is
/// cleared. The device firmware has always behaved this way.
fn apply_lenient(element: &Object, reading: &mut Triaxial, index: usize) {
    reading.unit = element.unit("unit").unwrap_or_else(|e| {
        debug!(index, error = %e, "Gyroscope unit invalid, clearing");
        Unit::new()
    });

    for (axis, value) in [("x", &mut reading.x), ("y", &mut reading.y), ("z", &mut reading.z)] {
        match element.number(axis) {
            Ok(v) => *value = v,
            Err(e) => debug!(index, error = %e, "Gyroscope axis invalid, keeping previous value"),
        }
    }
}
