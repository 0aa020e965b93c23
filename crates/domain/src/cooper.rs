//! Classification of Cooper test results.
//!
//! The Cooper test is a 12-minute run. The distance covered is classified
//! into one of five levels depending on age and gender.

use std::fmt;

use derive_more::Display;
use strum::EnumIter;

/// Length of one lap of the course in meters.
pub const TRIP_SIZE_METERS: f32 = 320.;

/// Upper bounds (exclusive) of the levels `VeryLow`, `Low`, `Normal` and
/// `Good` in meters. Distances at or above the last bound are `Excellent`.
pub type Thresholds = [f32; 4];

const FEMALE_THRESHOLDS: [Thresholds; 8] = [
    [1300., 1500., 1750., 1951.], // 11-12
    [1500., 1600., 1900., 2001.], // 13-14
    [1600., 1700., 2000., 2101.], // 15-16
    [1700., 1800., 2100., 2301.], // 17-19
    [1500., 1800., 2200., 2701.], // 20-29
    [1400., 1700., 2000., 2501.], // 30-39
    [1200., 1500., 1900., 2301.], // 40-49
    [1100., 1400., 1700., 2201.], // 50+
];

const MALE_THRESHOLDS: [Thresholds; 8] = [
    [1950., 2050., 2250., 2601.], // 11-12
    [2100., 2200., 2400., 2701.], // 13-14
    [2200., 2300., 2500., 2801.], // 15-16
    [2300., 2500., 2700., 3001.], // 17-19
    [1600., 2200., 2400., 2801.], // 20-29
    [1500., 1900., 2300., 2701.], // 30-39
    [1400., 1700., 2100., 2501.], // 40-49
    [1300., 1600., 2000., 2401.], // 50+
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
        }
    }
}

impl TryFrom<&str> for Gender {
    type Error = GenderError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "f" | "F" => Ok(Gender::Female),
            "m" | "M" => Ok(Gender::Male),
            other => Err(GenderError(other.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Gender::Female => "female",
                Gender::Male => "male",
            }
        )
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Gender must be \"M\" or \"F\" (got {0:?})")]
pub struct GenderError(String);

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum CooperLevel {
    #[display("Very low")]
    VeryLow = 1,
    #[display("Low")]
    Low = 2,
    #[display("Normal")]
    Normal = 3,
    #[display("Good")]
    Good = 4,
    #[display("Excellent")]
    Excellent = 5,
}

impl CooperLevel {
    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CooperLevel {
    type Error = CooperLevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CooperLevel::VeryLow),
            2 => Ok(CooperLevel::Low),
            3 => Ok(CooperLevel::Normal),
            4 => Ok(CooperLevel::Good),
            5 => Ok(CooperLevel::Excellent),
            _ => Err(CooperLevelError(value)),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Cooper level must be in the range 1 to 5 (got {0})")]
pub struct CooperLevelError(u8);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooperResult {
    pub level: CooperLevel,
    pub vo2_max: f32,
}

/// Index of the age bracket, or `None` for children younger than 11.
#[must_use]
pub fn age_band_index(age: u32) -> Option<usize> {
    match age {
        11..=12 => Some(0),
        13..=14 => Some(1),
        15..=16 => Some(2),
        17..=19 => Some(3),
        20..=29 => Some(4),
        30..=39 => Some(5),
        40..=49 => Some(6),
        50.. => Some(7),
        _ => None,
    }
}

#[must_use]
pub fn thresholds(age: u32, gender: Gender) -> Option<&'static Thresholds> {
    let index = age_band_index(age)?;
    Some(match gender {
        Gender::Female => &FEMALE_THRESHOLDS[index],
        Gender::Male => &MALE_THRESHOLDS[index],
    })
}

#[must_use]
pub fn classify(distance_meters: f32, age: u32, gender: Gender) -> Option<CooperLevel> {
    let [very_low, low, normal, good] = *thresholds(age, gender)?;
    Some(if distance_meters < very_low {
        CooperLevel::VeryLow
    } else if distance_meters < low {
        CooperLevel::Low
    } else if distance_meters < normal {
        CooperLevel::Normal
    } else if distance_meters < good {
        CooperLevel::Good
    } else {
        CooperLevel::Excellent
    })
}

#[must_use]
pub fn meters_from_laps(laps: f32) -> f32 {
    meters_from_laps_with_trip_size(laps, TRIP_SIZE_METERS)
}

#[must_use]
pub fn meters_from_laps_with_trip_size(laps: f32, trip_size_meters: f32) -> f32 {
    laps * trip_size_meters
}

#[must_use]
pub fn meters_to_kilometers(meters: f32) -> f32 {
    meters / 1000.
}

/// Estimated VO2max in ml/kg/min.
///
/// The result is negative for distances below 504.9 m. It is not clamped.
#[must_use]
pub fn estimate_vo2_max(meters: f32) -> f32 {
    (meters - 504.9) / 44.73
}

/// Result for a number of laps, or `None` if no lap was run or the age has
/// no bracket.
#[must_use]
pub fn evaluate(laps: f32, age: u32, gender: Gender) -> Option<CooperResult> {
    let meters = meters_from_laps(laps);
    if meters <= 0. {
        return None;
    }
    Some(CooperResult {
        level: classify(meters, age, gender)?,
        vo2_max: estimate_vo2_max(meters),
    })
}
