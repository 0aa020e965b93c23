use std::fmt;

use strum::{EnumIter, IntoEnumIterator};

use crate::{CooperLevel, TestEntry, TestMetric};

/// Points awarded for an excellent Cooper result.
pub const COOPER_MAX_SCORE: f32 = 100.;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Exercise {
    PullUp,
    PushUp,
    Squats,
    VUps,
    Burpees,
    Cooper,
}

impl Exercise {
    /// Exercises counted in repetitions, i.e. all except the Cooper test.
    pub fn repetition_exercises() -> impl Iterator<Item = Exercise> {
        Exercise::iter().filter(|e| *e != Exercise::Cooper)
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Exercise::PullUp => "pullup",
            Exercise::PushUp => "pushup",
            Exercise::Squats => "squats",
            Exercise::VUps => "vups",
            Exercise::Burpees => "burpees",
            Exercise::Cooper => "cooper",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Exercise::iter().find(|e| e.key() == key)
    }

    #[must_use]
    pub fn variants(self) -> &'static [Variant] {
        match self {
            Exercise::PullUp => &[
                Variant::Complete,
                Variant::Negative,
                Variant::Bands,
                Variant::Half,
            ],
            Exercise::PushUp => &[Variant::Complete, Variant::Half, Variant::Reverence],
            Exercise::Squats => &[Variant::Complete],
            Exercise::VUps => &[Variant::Complete, Variant::Half],
            Exercise::Burpees => &[Variant::Complete, Variant::NoFlex],
            Exercise::Cooper => &[],
        }
    }

    /// Variant for a stored code, if the exercise supports it.
    #[must_use]
    pub fn variant(self, code: &str) -> Option<Variant> {
        self.variants()
            .iter()
            .copied()
            .find(|v| v.code() == code.trim())
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Exercise::PullUp => "Pull Ups",
                Exercise::PushUp => "Push Ups",
                Exercise::Squats => "Squats",
                Exercise::VUps => "V-Ups",
                Exercise::Burpees => "Burpees",
                Exercise::Cooper => "Cooper Laps",
            }
        )
    }
}

/// Way an exercise was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Variant {
    Complete,
    Negative,
    Bands,
    Half,
    Reverence,
    NoFlex,
}

impl Variant {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Variant::Complete => "c",
            Variant::Negative => "n",
            Variant::Bands => "l",
            Variant::Half => "m",
            Variant::Reverence => "r",
            Variant::NoFlex => "sf",
        }
    }

    /// Translation key of the label, relative to the exercise.
    #[must_use]
    pub fn label_key(self) -> &'static str {
        match self {
            Variant::Complete => "complete",
            Variant::Negative => "negative",
            Variant::Bands => "bands",
            Variant::Half => "half",
            Variant::Reverence => "reverence",
            Variant::NoFlex => "no_flex",
        }
    }

    /// Every variant currently scores like the complete execution.
    #[must_use]
    pub fn multiplier(self) -> f32 {
        match self {
            Variant::Complete
            | Variant::Negative
            | Variant::Bands
            | Variant::Half
            | Variant::Reverence
            | Variant::NoFlex => 1.,
        }
    }
}

#[must_use]
pub fn cooper_multiplier(level: CooperLevel) -> f32 {
    match level {
        CooperLevel::VeryLow => 0.2,
        CooperLevel::Low => 0.4,
        CooperLevel::Normal => 0.6,
        CooperLevel::Good => 0.8,
        CooperLevel::Excellent => 1.0,
    }
}

/// Points for a number of repetitions.
///
/// Without a variant the repetitions count as they are. With a variant they
/// are weighted by its multiplier and rounded.
#[must_use]
pub fn points(reps: u32, variant: Option<Variant>) -> u32 {
    match variant {
        None => reps,
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        Some(variant) => (reps as f32 * variant.multiplier()).round() as u32,
    }
}

#[must_use]
pub fn metric_points(metric: &TestMetric) -> u32 {
    points(metric.reps, metric.variant)
}

/// Points for the Cooper test. No laps means no participation and no points.
#[must_use]
pub fn cooper_points(laps: f32, level: Option<CooperLevel>) -> u32 {
    if laps <= 0. {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    level.map_or(0, |level| {
        (COOPER_MAX_SCORE * cooper_multiplier(level)).round() as u32
    })
}

#[must_use]
pub fn total_score(entry: &TestEntry, cooper_level: Option<CooperLevel>) -> u32 {
    Exercise::repetition_exercises()
        .filter_map(|exercise| entry.metric(exercise))
        .map(metric_points)
        .sum::<u32>()
        + cooper_points(entry.cooper, cooper_level)
}
