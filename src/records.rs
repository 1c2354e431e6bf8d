//! Typed sensor records
//!
//! One current instance of each record lives in [`TelemetryState`]. Every
//! successful decode of a topic overwrites its record in place; nothing is
//! kept from earlier messages except what the IMU decoder leaves untouched.

/// Capacity of a [`Unit`] in bytes.
pub const UNIT_CAPACITY: usize = 7;

/// Measurement unit as sent by the sensor, at most 7 bytes.
pub type Unit = heapless::String<UNIT_CAPACITY>;

/// One channel of the sonic anemometer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnemometerAxis {
    /// Wind-speed channel voltage
    pub vout: f64,
    pub axis_autocalibration: bool,
    pub measure_autocalibration: bool,
    /// Sonic temperature in °C
    pub sonic_temperature: f64,
}

/// Latest reading of the sonic anemometer (`anm` topic).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnemometerRecord {
    /// Capture time in seconds since the Unix epoch
    pub timestamp: u32,
    pub x: AnemometerAxis,
    pub y: AnemometerAxis,
    pub z: AnemometerAxis,
}

/// Mass density per particle size class.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MassDensity {
    pub pm1_0: f64,
    pub pm2_5: f64,
    pub pm4_0: f64,
    pub pm10: f64,
}

/// Particle count per particle size class.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParticleCount {
    pub pm0_5: f64,
    pub pm1_0: f64,
    pub pm2_5: f64,
    pub pm4_0: f64,
    pub pm10: f64,
}

/// Latest reading of the particulate-matter sensor (`sps` topic).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticulateMatterRecord {
    pub timestamp: u32,
    pub mass_density: MassDensity,
    pub mass_density_unit: Unit,
    pub particle_count: ParticleCount,
    pub particle_count_unit: Unit,
    /// Typical particle size
    pub particle_size: f64,
    pub particle_size_unit: Unit,
}

/// A three-axis reading with its unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triaxial {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub unit: Unit,
}

/// Latest readings of the inertial measurement unit (`imu` topic).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImuRecord {
    pub timestamp: u32,
    /// Top-mounted accelerometer
    pub acc_top: Triaxial,
    pub acc: Triaxial,
    pub mag: Triaxial,
    pub gyr: Triaxial,
}

/// The current record of every sensor, owned by the application root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryState {
    pub anemometer: AnemometerRecord,
    pub particulate_matter: ParticulateMatterRecord,
    pub imu: ImuRecord,
}
