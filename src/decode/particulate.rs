//! Decoder for the particulate-matter sensor (`sps` topic)

use crate::fields::{DecodeError, Fields, Object};
use crate::records::{MassDensity, ParticleCount, ParticulateMatterRecord};

/// Decode a particulate-matter message into `record`.
///
/// The nested `sensor_data.mass_density` and `sensor_data.particle_count`
/// objects are checked before their members. The record is replaced as a
/// whole on success and left untouched on any failure.
pub fn decode(root: &Object, record: &mut ParticulateMatterRecord) -> Result<(), DecodeError> {
    let timestamp = root.timestamp()?;
    let sensor_data = root.object("sensor_data")?;

    let decoded = sensor_readings(sensor_data).map_err(|e| e.within("sensor_data"))?;

    *record = ParticulateMatterRecord {
        timestamp,
        ..decoded
    };

    Ok(())
}

fn sensor_readings(sensor_data: &Object) -> Result<ParticulateMatterRecord, DecodeError> {
    let mass_density = sensor_data.object("mass_density")?;
    let mass_density = mass_density_readings(mass_density).map_err(|e| e.within("mass_density"))?;

    let particle_count = sensor_data.object("particle_count")?;
    let particle_count =
        particle_count_readings(particle_count).map_err(|e| e.within("particle_count"))?;

    let particle_size = sensor_data.number("particle_size")?;
    let mass_density_unit = sensor_data.unit("mass_density_unit")?;
    let particle_count_unit = sensor_data.unit("particle_count_unit")?;
    let particle_size_unit = sensor_data.unit("particle_size_unit")?;

    Ok(ParticulateMatterRecord {
        timestamp: 0,
        mass_density,
        mass_density_unit,
        particle_count,
        particle_count_unit,
        particle_size,
        particle_size_unit,
    })
}

fn mass_density_readings(obj: &Object) -> Result<MassDensity, DecodeError> {
    Ok(MassDensity {
        pm1_0: obj.number("pm1.0")?,
        pm2_5: obj.number("pm2.5")?,
        pm4_0: obj.number("pm4.0")?,
        pm10: obj.number("pm10")?,
    })
}

fn particle_count_readings(obj: &Object) -> Result<ParticleCount, DecodeError> {
    Ok(ParticleCount {
        pm0_5: obj.number("pm0.5")?,
        pm1_0: obj.number("pm1.0")?,
        pm2_5: obj.number("pm2.5")?,
        pm4_0: obj.number("pm4.0")?,
        pm10: obj.number("pm10")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn message() -> Value {
        json!({
            "topic": "sps",
            "timestamp": 1_700_000_000,
            "sensor_data": {
                "mass_density": { "pm1.0": 1.5, "pm2.5": 2.5, "pm4.0": 4.0, "pm10": 10.25 },
                "particle_count": { "pm0.5": 5, "pm1.0": 10, "pm2.5": 25, "pm4.0": 40, "pm10": 100 },
                "particle_size": 0.523,
                "mass_density_unit": "ug/m3",
                "particle_count_unit": "#/cm3",
                "particle_size_unit": "um"
            }
        })
    }

    fn decode_value(value: &Value, record: &mut ParticulateMatterRecord) -> Result<(), DecodeError> {
        decode(value.as_object().unwrap(), record)
    }

    fn populated() -> ParticulateMatterRecord {
        let mut record = ParticulateMatterRecord::default();
        decode_value(&message(), &mut record).unwrap();
        record
    }

    #[test]
    fn test_decode_full_message() {
        let record = populated();

        assert_eq!(record.timestamp, 1_700_000_000);
        assert_eq!(
            record.mass_density,
            MassDensity {
                pm1_0: 1.5,
                pm2_5: 2.5,
                pm4_0: 4.0,
                pm10: 10.25
            }
        );
        assert_eq!(
            record.particle_count,
            ParticleCount {
                pm0_5: 5.0,
                pm1_0: 10.0,
                pm2_5: 25.0,
                pm4_0: 40.0,
                pm10: 100.0
            }
        );
        assert_eq!(record.particle_size, 0.523);
        assert_eq!(record.mass_density_unit.as_str(), "ug/m3");
        assert_eq!(record.particle_count_unit.as_str(), "#/cm3");
        assert_eq!(record.particle_size_unit.as_str(), "um");
    }

    #[test]
    fn test_unit_of_exactly_seven_chars_is_copied() {
        let mut msg = message();
        msg["sensor_data"]["particle_count_unit"] = json!("#/cm^3.");

        let mut record = ParticulateMatterRecord::default();
        decode_value(&msg, &mut record).unwrap();
        assert_eq!(record.particle_count_unit.as_str(), "#/cm^3.");
    }

    #[test]
    fn test_overlong_unit_is_rejected() {
        let mut msg = message();
        msg["sensor_data"]["mass_density_unit"] = json!("micrograms/m3");

        let mut record = populated();
        let before = record.clone();
        let err = decode_value(&msg, &mut record).unwrap_err();

        assert_eq!(
            err,
            DecodeError::UnitTooLong {
                field: "sensor_data.mass_density_unit".to_string(),
                len: 13
            }
        );
        assert_eq!(record, before);
    }

    #[test]
    fn test_missing_sensor_data() {
        let mut record = populated();
        let before = record.clone();

        let err = decode_value(&json!({ "topic": "sps", "timestamp": 5 }), &mut record).unwrap_err();
        assert_eq!(err.field(), Some("sensor_data"));
        assert_eq!(record, before);
    }

    #[test]
    fn test_structure_checked_before_members() {
        let mut msg = message();
        msg["sensor_data"]["mass_density"] = json!([1, 2, 3, 4]);
        msg["sensor_data"]["particle_count"]["pm0.5"] = json!("many");

        let err = decode_value(&msg, &mut ParticulateMatterRecord::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::wrong_type("sensor_data.mass_density", "object")
        );
    }

    #[test]
    fn test_nested_member_failure_leaves_record_untouched() {
        let mut msg = message();
        msg["sensor_data"]["particle_count"]
            .as_object_mut()
            .unwrap()
            .remove("pm4.0");
        msg["timestamp"] = json!(1_800_000_000);

        let mut record = populated();
        let before = record.clone();
        let err = decode_value(&msg, &mut record).unwrap_err();

        assert_eq!(err.field(), Some("sensor_data.particle_count.pm4.0"));
        assert_eq!(record, before);
    }
}
