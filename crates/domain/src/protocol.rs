use std::sync::LazyLock;

use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{
    CreateError, DeleteError, Name, ReadError, UpdateError, ValidationError,
    parse_non_negative_int,
};

#[allow(async_fn_in_trait)]
pub trait ProtocolService {
    /// Built-in protocols followed by the custom ones.
    async fn get_protocols(&self) -> Result<Vec<Protocol>, ReadError>;
    async fn get_protocol(&self, id: &ProtocolID) -> Result<Option<Protocol>, ReadError>;
    async fn create_protocol(
        &self,
        name: Name,
        description: String,
        timer: TimerProtocol,
    ) -> Result<Protocol, CreateError>;
    async fn replace_protocol(&self, protocol: Protocol) -> Result<Protocol, UpdateError>;
    async fn delete_protocol(&self, id: &ProtocolID) -> Result<ProtocolID, DeleteError>;
    /// Replace all custom protocols.
    async fn import_protocols(&self, protocols: Vec<Protocol>)
    -> Result<Vec<Protocol>, UpdateError>;

    fn validate_protocol_name(&self, name: &str) -> Result<Name, ValidationError> {
        Name::new(name).map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_protocol_sets(&self, sets: &str) -> Result<u32, ValidationError> {
        match parse_non_negative_int(sets) {
            0 => Err(ValidationError::Other(
                "Sets must be a positive whole number".into(),
            )),
            parsed_sets => Ok(parsed_sets),
        }
    }

    fn validate_protocol_seconds(&self, seconds: &str) -> Result<u32, ValidationError> {
        let trimmed = seconds.trim();
        if trimmed.is_empty() || trimmed.parse::<u32>().is_ok() {
            Ok(parse_non_negative_int(trimmed))
        } else {
            Err(ValidationError::Other(
                "Time must be a whole number of seconds".into(),
            ))
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait ProtocolRepository {
    async fn read_protocols(&self) -> Result<Vec<Protocol>, ReadError>;
    async fn write_protocols(&self, protocols: Vec<Protocol>)
    -> Result<Vec<Protocol>, UpdateError>;
}

#[derive(Deref, Display, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolID(String);

impl ProtocolID {
    #[must_use]
    pub fn custom() -> Self {
        Self(format!("custom-{}", Uuid::new_v4()))
    }
}

impl From<&str> for ProtocolID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProtocolID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Named, reusable interval workout.
#[derive(Debug, Clone, PartialEq)]
pub struct Protocol {
    pub id: ProtocolID,
    pub name: Name,
    pub description: String,
    pub custom: bool,
    pub timer: TimerProtocol,
}

/// Sequence the timer runs: a preparation phase followed by `sets`
/// repetitions of the intervals.
///
/// Only valid protocols can be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerProtocol {
    sets: u32,
    prep_time: u32,
    rest_between_sets: u32,
    intervals: Vec<IntervalSpec>,
}

impl TimerProtocol {
    pub fn new(
        sets: u32,
        prep_time: u32,
        rest_between_sets: u32,
        intervals: Vec<IntervalSpec>,
    ) -> Result<Self, ProtocolError> {
        if sets == 0 {
            return Err(ProtocolError::NoSets);
        }
        if intervals.is_empty() {
            return Err(ProtocolError::NoIntervals);
        }
        if let Some(index) = intervals.iter().position(|i| i.duration == 0) {
            return Err(ProtocolError::ZeroDuration(index + 1));
        }
        if checked_total_duration(sets, prep_time, rest_between_sets, &intervals).is_none() {
            return Err(ProtocolError::TooLong);
        }
        Ok(Self {
            sets,
            prep_time,
            rest_between_sets,
            intervals,
        })
    }

    #[must_use]
    pub fn sets(&self) -> u32 {
        self.sets
    }

    #[must_use]
    pub fn prep_time(&self) -> u32 {
        self.prep_time
    }

    #[must_use]
    pub fn rest_between_sets(&self) -> u32 {
        self.rest_between_sets
    }

    #[must_use]
    pub fn intervals(&self) -> &[IntervalSpec] {
        &self.intervals
    }

    /// Sum of the interval durations of one set.
    #[must_use]
    pub fn set_duration(&self) -> u32 {
        self.intervals.iter().map(|i| i.duration).sum()
    }

    /// Length of the whole workout including preparation and rests.
    #[must_use]
    pub fn total_duration(&self) -> u32 {
        self.prep_time + self.duration_from(1, 0)
    }

    /// Time from the start of interval `index` in `set` to the end of the
    /// workout.
    ///
    /// Every interval is followed by a rest, except the last interval of the
    /// last set.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn duration_from(&self, set: u32, index: usize) -> u32 {
        if set > self.sets || (set == self.sets && index >= self.intervals.len()) {
            return 0;
        }
        let remaining_in_set = &self.intervals[index.min(self.intervals.len())..];
        let remaining_sets = self.sets - set;
        let remaining_intervals =
            remaining_in_set.len() as u32 + remaining_sets * self.intervals.len() as u32;
        remaining_in_set.iter().map(|i| i.duration).sum::<u32>()
            + remaining_sets * self.set_duration()
            + remaining_intervals.saturating_sub(1) * self.rest_between_sets
    }
}

/// Total length in seconds, or `None` if it does not fit into `u32`.
///
/// All partial sums of a protocol are bounded by its total, so a protocol
/// accepted here cannot overflow in `duration_from`.
fn checked_total_duration(
    sets: u32,
    prep_time: u32,
    rest_between_sets: u32,
    intervals: &[IntervalSpec],
) -> Option<u32> {
    let set_duration = intervals
        .iter()
        .try_fold(0u32, |sum, i| sum.checked_add(i.duration))?;
    let phases = u32::try_from(intervals.len()).ok()?.checked_mul(sets)?;
    sets.checked_mul(set_duration)?
        .checked_add(phases.saturating_sub(1).checked_mul(rest_between_sets)?)?
        .checked_add(prep_time)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalSpec {
    pub label: String,
    pub duration: u32,
}

impl IntervalSpec {
    pub fn new(label: impl Into<String>, duration: u32) -> Self {
        Self {
            label: label.into(),
            duration,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Protocol must have at least one set")]
    NoSets,
    #[error("Protocol must have at least one interval")]
    NoIntervals,
    /// Carries the position of the interval, starting at 1.
    #[error("Duration of interval {0} must be positive")]
    ZeroDuration(usize),
    #[error("Protocol must not be longer than {} seconds", u32::MAX)]
    TooLong,
}

pub static DEFAULT_PROTOCOLS: LazyLock<Vec<Protocol>> = LazyLock::new(|| {
    vec![
        builtin(
            "iwt",
            "Japanese Walking",
            "5 sets alternating slow and fast pace",
            (5, 10, 10),
            &[("Slow pace", 180), ("Fast pace", 180)],
        ),
        builtin(
            "tabata",
            "Tabata Protocol",
            "8 sets of 20s high intensity work",
            (8, 10, 10),
            &[("Work hard!", 20)],
        ),
        builtin(
            "hiit",
            "Basic HIIT",
            "6 sets of 45s high intensity work",
            (6, 15, 60),
            &[("High intensity", 45)],
        ),
    ]
});

#[must_use]
pub fn is_builtin(id: &ProtocolID) -> bool {
    DEFAULT_PROTOCOLS.iter().any(|p| p.id == *id)
}

#[allow(clippy::expect_used)]
fn builtin(
    id: &str,
    name: &str,
    description: &str,
    (sets, prep_time, rest_between_sets): (u32, u32, u32),
    intervals: &[(&str, u32)],
) -> Protocol {
    Protocol {
        id: id.into(),
        name: Name::new(name).expect("valid built-in name"),
        description: description.to_string(),
        custom: false,
        timer: TimerProtocol::new(
            sets,
            prep_time,
            rest_between_sets,
            intervals
                .iter()
                .map(|(label, duration)| IntervalSpec::new(*label, *duration))
                .collect(),
        )
        .expect("valid built-in protocol"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, vec![IntervalSpec::new("W", 10)], ProtocolError::NoSets)]
    #[case(1, vec![], ProtocolError::NoIntervals)]
    #[case(
        2,
        vec![IntervalSpec::new("W", 10), IntervalSpec::new("X", 0)],
        ProtocolError::ZeroDuration(2)
    )]
    #[case(100_000, vec![IntervalSpec::new("W", 100_000)], ProtocolError::TooLong)]
    #[case(
        1,
        vec![IntervalSpec::new("W", u32::MAX), IntervalSpec::new("X", 1)],
        ProtocolError::TooLong
    )]
    fn test_timer_protocol_new_invalid(
        #[case] sets: u32,
        #[case] intervals: Vec<IntervalSpec>,
        #[case] expected: ProtocolError,
    ) {
        assert_eq!(TimerProtocol::new(sets, 5, 5, intervals), Err(expected));
    }

    #[test]
    fn test_timer_protocol_new_longest() {
        let protocol =
            TimerProtocol::new(1, 5, 0, vec![IntervalSpec::new("W", u32::MAX - 5)]).unwrap();
        assert_eq!(protocol.total_duration(), u32::MAX);
        assert_eq!(
            TimerProtocol::new(1, 6, 0, vec![IntervalSpec::new("W", u32::MAX - 5)]),
            Err(ProtocolError::TooLong)
        );
        assert_eq!(
            TimerProtocol::new(2, 0, u32::MAX, vec![IntervalSpec::new("W", 1)]),
            Err(ProtocolError::TooLong)
        );
    }

    #[test]
    fn test_protocol_error_display() {
        assert_eq!(
            ProtocolError::ZeroDuration(2).to_string(),
            "Duration of interval 2 must be positive"
        );
    }

    #[test]
    fn test_default_protocols() {
        assert_eq!(
            DEFAULT_PROTOCOLS
                .iter()
                .map(|p| (p.id.to_string(), p.timer.total_duration()))
                .collect::<Vec<_>>(),
            vec![
                ("iwt".to_string(), 10 + 5 * 360 + 9 * 10),
                ("tabata".to_string(), 10 + 8 * 20 + 7 * 10),
                ("hiit".to_string(), 15 + 6 * 45 + 5 * 60),
            ]
        );
        assert!(DEFAULT_PROTOCOLS.iter().all(|p| !p.custom));
        assert!(is_builtin(&"tabata".into()));
        assert!(!is_builtin(&ProtocolID::custom()));
    }

    #[rstest]
    #[case(1, 0, 10 + 5 + 20 + 5 + 10 + 5 + 20)]
    #[case(1, 1, 20 + 5 + 10 + 5 + 20)]
    #[case(1, 2, 10 + 5 + 20)]
    #[case(2, 0, 10 + 5 + 20)]
    #[case(2, 1, 20)]
    #[case(2, 2, 0)]
    #[case(3, 0, 0)]
    fn test_duration_from(#[case] set: u32, #[case] index: usize, #[case] expected: u32) {
        let protocol = TimerProtocol::new(
            2,
            3,
            5,
            vec![IntervalSpec::new("A", 10), IntervalSpec::new("B", 20)],
        )
        .unwrap();
        assert_eq!(protocol.duration_from(set, index), expected);
    }

    #[test]
    fn test_custom_protocol_id() {
        let id = ProtocolID::custom();
        assert!(id.starts_with("custom-"));
        assert_ne!(id, ProtocolID::custom());
    }
}
