//! Decoder for the sonic anemometer (`anm` topic)

use crate::fields::{DecodeError, Fields, Object};
use crate::records::{AnemometerAxis, AnemometerRecord};

/// Decode a flat anemometer message into `record`.
///
/// Fields are checked in a fixed order (timestamp, voltages, axis
/// calibration, measurement calibration, temperatures) and the record is
/// only written once all thirteen are valid.
pub fn decode(root: &Object, record: &mut AnemometerRecord) -> Result<(), DecodeError> {
    let timestamp = root.timestamp()?;

    let vout = per_axis(|axis| root.number(&format!("{axis}_vout")))?;
    let axis_autocalibration =
        per_axis(|axis| root.boolean(&format!("autocalibrazione_asse_{axis}")))?;
    let measure_autocalibration =
        per_axis(|axis| root.boolean(&format!("autocalibrazione_misura_{axis}")))?;
    let sonic_temperature = per_axis(|axis| root.number(&format!("temp_sonica_{axis}")))?;

    let channel = |i: usize| AnemometerAxis {
        vout: vout[i],
        axis_autocalibration: axis_autocalibration[i],
        measure_autocalibration: measure_autocalibration[i],
        sonic_temperature: sonic_temperature[i],
    };

    *record = AnemometerRecord {
        timestamp,
        x: channel(0),
        y: channel(1),
        z: channel(2),
    };

    Ok(())
}

/// Read one field per axis in x, y, z order, stopping at the first failure.
fn per_axis<T>(
    mut read: impl FnMut(&str) -> Result<T, DecodeError>,
) -> Result<[T; 3], DecodeError> {
    Ok([read("x")?, read("y")?, read("z")?])
}
