//! Text rendering of the tabbed instrument display
//!
//! The screen has one tab per sensor plus a CMD tab with the command
//! buttons and a short status list. Sensor tabs hold one label per value,
//! refreshed whenever the console reports an updated record.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::command::Command;
use crate::console::Render;
use crate::decode::DecodeOutcome;
use crate::records::{AnemometerAxis, AnemometerRecord, ImuRecord, ParticulateMatterRecord, Triaxial};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Wind,
    Sps30,
    Imu,
    Cmd,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Self::Wind => "WIND",
            Self::Sps30 => "SPS30",
            Self::Imu => "IMU",
            Self::Cmd => "CMD",
        }
    }

    /// Tab showing the record named by a decode outcome.
    pub fn for_outcome(outcome: DecodeOutcome) -> Option<Self> {
        match outcome {
            DecodeOutcome::AnemometerUpdated => Some(Self::Wind),
            DecodeOutcome::ParticulateMatterUpdated => Some(Self::Sps30),
            DecodeOutcome::ImuUpdated => Some(Self::Imu),
            DecodeOutcome::ParsingError | DecodeOutcome::Status => None,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

pub struct Screen {
    wind: Vec<String>,
    sps: Vec<String>,
    imu: Vec<String>,
    status: VecDeque<String>,
    status_capacity: usize,
    active: Tab,
}

impl Screen {
    pub fn new(status_capacity: usize) -> Self {
        Self {
            wind: Vec::new(),
            sps: Vec::new(),
            imu: Vec::new(),
            status: VecDeque::with_capacity(status_capacity),
            status_capacity,
            active: Tab::Cmd,
        }
    }

    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
    }

    /// Labels currently shown on a sensor tab.
    pub fn labels(&self, tab: Tab) -> &[String] {
        match tab {
            Tab::Wind => &self.wind,
            Tab::Sps30 => &self.sps,
            Tab::Imu => &self.imu,
            Tab::Cmd => &[],
        }
    }

    /// Lines of the CMD status list, oldest first.
    pub fn status(&self) -> impl Iterator<Item = &str> {
        self.status.iter().map(String::as_str)
    }

    /// Append a line to the CMD status list, dropping the oldest when full.
    pub fn push_status(&mut self, text: impl Into<String>) {
        if self.status_capacity == 0 {
            return;
        }
        while self.status.len() >= self.status_capacity {
            self.status.pop_front();
        }
        self.status.push_back(text.into());
    }

    /// Report an operator command on the CMD tab and bring it to front.
    ///
    /// `queued` means the command reached the serial link's outbound queue,
    /// not that the device received it.
    pub fn record_command(&mut self, command: Command, queued: bool) {
        let outcome = if queued { "Queued" } else { "Failed" };
        self.push_status(format!("{outcome}: {}", command.label()));
        self.select(Tab::Cmd);
    }

    /// Render the tab currently in front.
    pub fn draw_active(&self) -> String {
        self.draw(self.active)
    }

    /// Render a tab as text.
    pub fn draw(&self, tab: Tab) -> String {
        let mut out = format!("[ {tab} ]\n");

        match tab {
            Tab::Cmd => {
                for command in Command::ALL {
                    out.push_str(&format!("  ( {} )\n", command.label()));
                }
                for line in &self.status {
                    out.push_str(&format!("  > {line}\n"));
                }
            }
            _ => {
                for label in self.labels(tab) {
                    out.push_str(&format!("  {label}\n"));
                }
            }
        }

        out
    }
}

impl Render for Screen {
    fn on_anemometer_updated(&mut self, record: &AnemometerRecord) {
        let mut labels = vec![format_timestamp(record.timestamp)];
        for (name, axis) in [("X", &record.x), ("Y", &record.y), ("Z", &record.z)] {
            labels.extend(wind_axis_labels(name, axis));
        }
        self.wind = labels;

        info!("WIND UPDATED");
    }

    fn on_particulate_matter_updated(&mut self, record: &ParticulateMatterRecord) {
        let md = &record.mass_density;
        let md_unit = record.mass_density_unit.as_str();
        let pc = &record.particle_count;
        let pc_unit = record.particle_count_unit.as_str();

        self.sps = vec![
            format_timestamp(record.timestamp),
            format!("Mass PM1.0 {:.2} {md_unit}", md.pm1_0),
            format!("Mass PM2.5 {:.2} {md_unit}", md.pm2_5),
            format!("Mass PM4.0 {:.2} {md_unit}", md.pm4_0),
            format!("Mass PM10 {:.2} {md_unit}", md.pm10),
            format!("PM0.5 {:.2} {pc_unit}", pc.pm0_5),
            format!("PM1.0 {:.2} {pc_unit}", pc.pm1_0),
            format!("PM2.5 {:.2} {pc_unit}", pc.pm2_5),
            format!("PM4.0 {:.2} {pc_unit}", pc.pm4_0),
            format!("PM10 {:.2} {pc_unit}", pc.pm10),
            format!(
                "P. Size: {:.3} {}",
                record.particle_size,
                record.particle_size_unit.as_str()
            ),
        ];

        info!("PARTICULATE MATTER UPDATED");
    }

    fn on_imu_updated(&mut self, record: &ImuRecord) {
        let mut labels = vec![format_timestamp(record.timestamp)];
        for (name, reading) in [
            ("Acc TOP", &record.acc_top),
            ("ACC", &record.acc),
            ("MAG", &record.mag),
            ("GYR", &record.gyr),
        ] {
            labels.extend(triaxial_labels(name, reading));
        }
        self.imu = labels;

        info!("IMU UPDATED");
    }
}

fn wind_axis_labels(name: &str, axis: &AnemometerAxis) -> [String; 4] {
    [
        format!("{name} Vento: {:.3} m/s", axis.vout),
        format!("{name} Cal Asse: {}", true_false(axis.axis_autocalibration)),
        format!("{name} Cal Misura: {}", true_false(axis.measure_autocalibration)),
        format!("{name} Temp Sonica: {:.2} C", axis.sonic_temperature),
    ]
}

fn triaxial_labels(name: &str, reading: &Triaxial) -> [String; 3] {
    let unit = reading.unit.as_str();
    [
        format!("{name} X: {:.2} {unit}", reading.x),
        format!("{name} Y: {:.2} {unit}", reading.y),
        format!("{name} Z: {:.2} {unit}", reading.z),
    ]
}

fn true_false(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

/// Capture time as local wall-clock time.
fn format_timestamp(timestamp: u32) -> String {
    match DateTime::from_timestamp(i64::from(timestamp), 0) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => {
            debug!(timestamp, "Timestamp out of range");
            timestamp.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Unit;

    fn unit(text: &str) -> Unit {
        let mut u = Unit::new();
        u.push_str(text).unwrap();
        u
    }

    #[test]
    fn test_wind_labels() {
        let mut screen = Screen::new(4);
        let mut record = AnemometerRecord::default();
        record.x.vout = 1.23456;
        record.x.axis_autocalibration = true;
        record.z.sonic_temperature = 21.456;

        screen.on_anemometer_updated(&record);

        let labels = screen.labels(Tab::Wind);
        assert_eq!(labels.len(), 13);
        assert_eq!(labels[1], "X Vento: 1.235 m/s");
        assert_eq!(labels[2], "X Cal Asse: True");
        assert_eq!(labels[3], "X Cal Misura: False");
        assert_eq!(labels[12], "Z Temp Sonica: 21.46 C");
    }

    #[test]
    fn test_particulate_labels_carry_units() {
        let mut screen = Screen::new(4);
        let mut record = ParticulateMatterRecord::default();
        record.mass_density.pm2_5 = 3.14159;
        record.mass_density_unit = unit("ug/m3");
        record.particle_count.pm10 = 12.0;
        record.particle_count_unit = unit("#/cm3");
        record.particle_size = 0.5;
        record.particle_size_unit = unit("um");

        screen.on_particulate_matter_updated(&record);

        let labels = screen.labels(Tab::Sps30);
        assert_eq!(labels[2], "Mass PM2.5 3.14 ug/m3");
        assert_eq!(labels[9], "PM10 12.00 #/cm3");
        assert_eq!(labels[10], "P. Size: 0.500 um");
    }

    #[test]
    fn test_imu_shows_every_device() {
        let mut screen = Screen::new(4);
        let mut record = ImuRecord::default();
        record.gyr = Triaxial {
            x: 0.0,
            y: -1.5,
            z: 0.0,
            unit: unit("dps"),
        };

        screen.on_imu_updated(&record);

        let labels = screen.labels(Tab::Imu);
        assert_eq!(labels.len(), 13);
        assert_eq!(labels[1], "Acc TOP X: 0.00 ");
        assert_eq!(labels[11], "GYR Y: -1.50 dps");
    }

    #[test]
    fn test_status_list_is_bounded() {
        let mut screen = Screen::new(2);
        screen.push_status("one");
        screen.push_status("two");
        screen.push_status("three");

        assert_eq!(screen.status().collect::<Vec<_>>(), ["two", "three"]);

        let cmd = screen.draw(Tab::Cmd);
        assert!(cmd.starts_with("[ CMD ]\n"));
        assert!(cmd.contains("( POWER OFF )"));
        assert!(cmd.contains("> three"));
        assert!(!cmd.contains("> one"));
    }

    #[test]
    fn test_status_list_with_zero_capacity_stays_empty() {
        let mut screen = Screen::new(0);
        screen.push_status("one");
        screen.record_command(Command::Start, true);

        assert_eq!(screen.status().count(), 0);
        assert_eq!(screen.draw_active(), screen.draw(Tab::Cmd));
    }

    #[test]
    fn test_record_command_reports_queued_not_sent() {
        let mut screen = Screen::new(4);
        screen.select(Tab::Imu);

        screen.record_command(Command::Stop, true);
        screen.record_command(Command::PowerOff, false);

        assert_eq!(
            screen.status().collect::<Vec<_>>(),
            ["Queued: STOP LOG", "Failed: POWER OFF"]
        );
        let cmd = screen.draw_active();
        assert!(cmd.starts_with("[ CMD ]\n"));
        assert!(!cmd.contains("Sent"));
    }

    #[test]
    fn test_tabs() {
        let mut screen = Screen::new(1);
        assert!(screen.draw_active().starts_with("[ CMD ]\n"));
        assert_eq!(Tab::for_outcome(DecodeOutcome::ImuUpdated), Some(Tab::Imu));
        assert_eq!(Tab::for_outcome(DecodeOutcome::ParsingError), None);

        screen.select(Tab::Wind);
        assert_eq!(screen.draw_active(), "[ WIND ]\n");
    }
}
