use chrono::{Local, NaiveDate};

use crate::{
    CooperResult, CreateError, DeleteError, Exercise, Gender, Name, ReadError, UpdateError,
    ValidationError, Variant, cooper, exercise, parse_non_negative_float, parse_non_negative_int,
};

#[allow(async_fn_in_trait)]
pub trait ProfileService {
    async fn get_profile(&self) -> Result<Option<UserProfile>, ReadError>;
    /// Store name, gender and age. An existing test history is kept.
    async fn save_profile(
        &self,
        name: Name,
        gender: Gender,
        age: u32,
    ) -> Result<UserProfile, UpdateError>;
    async fn delete_profile(&self) -> Result<(), DeleteError>;
    /// Replace the stored profile including its history.
    async fn import_profile(&self, profile: UserProfile) -> Result<UserProfile, UpdateError>;

    async fn append_test(&self, entry: TestEntry) -> Result<TestEntry, CreateError>;
    async fn replace_test(&self, index: usize, entry: TestEntry)
    -> Result<TestEntry, UpdateError>;
    async fn delete_test(&self, index: usize) -> Result<TestEntry, DeleteError>;

    fn validate_profile_name(&self, name: &str) -> Result<Name, ValidationError> {
        Name::new(name).map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_profile_gender(&self, gender: &str) -> Result<Gender, ValidationError> {
        Gender::try_from(gender).map_err(|err| ValidationError::Other(err.into()))
    }

    fn validate_profile_age(&self, age: &str) -> Result<u32, ValidationError> {
        match parse_non_negative_int(age) {
            0 => Err(ValidationError::Other(
                "Age must be a positive whole number".into(),
            )),
            parsed_age if parsed_age > MAX_AGE => Err(ValidationError::Other(
                format!("Age must be {MAX_AGE} or less").into(),
            )),
            parsed_age => Ok(parsed_age),
        }
    }

    fn validate_test_date(&self, date: &str) -> Result<NaiveDate, ValidationError> {
        match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
            Ok(parsed_date) => {
                if parsed_date <= Local::now().date_naive() {
                    Ok(parsed_date)
                } else {
                    Err(ValidationError::Other(
                        "Date must not be in the future".into(),
                    ))
                }
            }
            Err(_) => Err(ValidationError::Other("Invalid date".into())),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait ProfileRepository {
    async fn read_profile(&self) -> Result<Option<UserProfile>, ReadError>;
    async fn write_profile(&self, profile: UserProfile) -> Result<UserProfile, UpdateError>;
    async fn delete_profile(&self) -> Result<(), DeleteError>;
}

pub const MAX_AGE: u32 = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub name: Name,
    pub gender: Gender,
    pub age: u32,
    pub tests: Vec<TestEntry>,
}

impl UserProfile {
    #[must_use]
    pub fn new(name: Name, gender: Gender, age: u32) -> Self {
        Self {
            name,
            gender,
            age,
            tests: vec![],
        }
    }

    /// Add an entry while keeping the history sorted by date.
    ///
    /// Entries of the same date keep their insertion order.
    pub fn append_test(&mut self, entry: TestEntry) {
        self.tests.push(entry);
        self.sort_tests();
    }

    /// Replace the entry at `index`. Returns the replaced entry.
    pub fn replace_test(&mut self, index: usize, entry: TestEntry) -> Option<TestEntry> {
        let current = self.tests.get_mut(index)?;
        let replaced = std::mem::replace(current, entry);
        self.sort_tests();
        Some(replaced)
    }

    pub fn delete_test(&mut self, index: usize) -> Option<TestEntry> {
        if index < self.tests.len() {
            Some(self.tests.remove(index))
        } else {
            None
        }
    }

    #[must_use]
    pub fn cooper_result(&self, entry: &TestEntry) -> Option<CooperResult> {
        cooper::evaluate(entry.cooper, self.age, self.gender)
    }

    #[must_use]
    pub fn score(&self, entry: &TestEntry) -> u32 {
        exercise::total_score(entry, self.cooper_result(entry).map(|r| r.level))
    }

    #[must_use]
    pub fn latest_test(&self) -> Option<&TestEntry> {
        self.tests.last()
    }

    fn sort_tests(&mut self) {
        self.tests.sort_by_key(|t| t.date);
    }
}

/// Results of one self-assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct TestEntry {
    pub date: NaiveDate,
    pub pullup: TestMetric,
    pub pushup: TestMetric,
    pub squats: TestMetric,
    pub vups: TestMetric,
    pub burpees: TestMetric,
    /// Number of Cooper laps, possibly fractional.
    pub cooper: f32,
}

impl TestEntry {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            pullup: TestMetric::default(),
            pushup: TestMetric::default(),
            squats: TestMetric::default(),
            vups: TestMetric::default(),
            burpees: TestMetric::default(),
            cooper: 0.,
        }
    }

    /// Metric of a repetition exercise. The Cooper test has none.
    #[must_use]
    pub fn metric(&self, exercise: Exercise) -> Option<&TestMetric> {
        match exercise {
            Exercise::PullUp => Some(&self.pullup),
            Exercise::PushUp => Some(&self.pushup),
            Exercise::Squats => Some(&self.squats),
            Exercise::VUps => Some(&self.vups),
            Exercise::Burpees => Some(&self.burpees),
            Exercise::Cooper => None,
        }
    }

    pub fn metric_mut(&mut self, exercise: Exercise) -> Option<&mut TestMetric> {
        match exercise {
            Exercise::PullUp => Some(&mut self.pullup),
            Exercise::PushUp => Some(&mut self.pushup),
            Exercise::Squats => Some(&mut self.squats),
            Exercise::VUps => Some(&mut self.vups),
            Exercise::Burpees => Some(&mut self.burpees),
            Exercise::Cooper => None,
        }
    }

    /// Recorded value of an exercise: repetitions, or laps for the Cooper test.
    #[must_use]
    pub fn value(&self, exercise: Exercise) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        self.metric(exercise)
            .map_or(self.cooper, |metric| metric.reps as f32)
    }

    pub fn set_cooper_laps(&mut self, laps: &str) {
        self.cooper = parse_non_negative_float(laps);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TestMetric {
    pub reps: u32,
    pub variant: Option<Variant>,
}

impl TestMetric {
    #[must_use]
    pub fn new(reps: u32, variant: Option<Variant>) -> Self {
        Self { reps, variant }
    }

    /// Metric from raw form input.
    ///
    /// Unparsable repetitions count as zero. A variant code the exercise does
    /// not support is dropped.
    #[must_use]
    pub fn from_input(exercise: Exercise, reps: &str, variant: &str) -> Self {
        Self {
            reps: parse_non_negative_int(reps),
            variant: exercise.variant(variant),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::CooperLevel;

    struct Validator;

    impl ProfileService for Validator {
        async fn get_profile(&self) -> Result<Option<UserProfile>, ReadError> {
            unimplemented!()
        }
        async fn save_profile(&self, _: Name, _: Gender, _: u32) -> Result<UserProfile, UpdateError> {
            unimplemented!()
        }
        async fn delete_profile(&self) -> Result<(), DeleteError> {
            unimplemented!()
        }
        async fn import_profile(&self, _: UserProfile) -> Result<UserProfile, UpdateError> {
            unimplemented!()
        }
        async fn append_test(&self, _: TestEntry) -> Result<TestEntry, CreateError> {
            unimplemented!()
        }
        async fn replace_test(&self, _: usize, _: TestEntry) -> Result<TestEntry, UpdateError> {
            unimplemented!()
        }
        async fn delete_test(&self, _: usize) -> Result<TestEntry, DeleteError> {
            unimplemented!()
        }
    }

    #[test]
    fn test_append_test_keeps_order() {
        let mut profile = profile();
        profile.append_test(entry(3, 1));
        profile.append_test(entry(1, 2));
        profile.append_test(entry(3, 3));
        profile.append_test(entry(2, 4));
        assert_eq!(
            profile
                .tests
                .iter()
                .map(|t| (t.date, t.pullup.reps))
                .collect::<Vec<_>>(),
            vec![
                (date(1), 2),
                (date(2), 4),
                (date(3), 1),
                (date(3), 3),
            ]
        );
    }

    #[test]
    fn test_replace_test() {
        let mut profile = profile();
        profile.append_test(entry(1, 1));
        profile.append_test(entry(2, 2));

        assert_eq!(profile.replace_test(0, entry(5, 10)), Some(entry(1, 1)));
        assert_eq!(profile.tests, vec![entry(2, 2), entry(5, 10)]);

        assert_eq!(profile.replace_test(2, entry(6, 6)), None);
        assert_eq!(profile.tests, vec![entry(2, 2), entry(5, 10)]);
    }

    #[test]
    fn test_delete_test() {
        let mut profile = profile();
        profile.append_test(entry(1, 1));
        profile.append_test(entry(2, 2));

        assert_eq!(profile.delete_test(2), None);
        assert_eq!(profile.delete_test(0), Some(entry(1, 1)));
        assert_eq!(profile.tests, vec![entry(2, 2)]);
        assert_eq!(profile.latest_test(), Some(&entry(2, 2)));
    }

    #[test]
    fn test_cooper_result_and_score() {
        let profile = profile();
        let mut entry = entry(1, 10);
        entry.set_cooper_laps("7,5");

        assert_eq!(
            profile.cooper_result(&entry).map(|r| r.level),
            Some(CooperLevel::Good)
        );
        assert_eq!(profile.score(&entry), 10 + 80);

        entry.cooper = 0.;
        assert_eq!(profile.cooper_result(&entry), None);
        assert_eq!(profile.score(&entry), 10);
    }

    #[test]
    fn test_test_entry_value() {
        let mut entry = entry(1, 12);
        entry.cooper = 6.5;
        assert!((entry.value(Exercise::PullUp) - 12.).abs() < f32::EPSILON);
        assert!((entry.value(Exercise::Cooper) - 6.5).abs() < f32::EPSILON);
        assert!((entry.value(Exercise::Squats)).abs() < f32::EPSILON);

        entry.metric_mut(Exercise::Squats).unwrap().reps = 3;
        assert_eq!(entry.squats.reps, 3);
        assert!(entry.metric_mut(Exercise::Cooper).is_none());
    }

    #[rstest]
    #[case(Exercise::PullUp, "8", "n", TestMetric::new(8, Some(Variant::Negative)))]
    #[case(Exercise::PushUp, " 15 ", "sf", TestMetric::new(15, None))]
    #[case(Exercise::Burpees, "abc", "sf", TestMetric::new(0, Some(Variant::NoFlex)))]
    #[case(Exercise::Squats, "", "", TestMetric::new(0, None))]
    fn test_test_metric_from_input(
        #[case] exercise: Exercise,
        #[case] reps: &str,
        #[case] variant: &str,
        #[case] expected: TestMetric,
    ) {
        assert_eq!(TestMetric::from_input(exercise, reps, variant), expected);
    }

    #[rstest]
    #[case("25", Some(25))]
    #[case(" 7 ", Some(7))]
    #[case("0", None)]
    #[case("", None)]
    #[case("121", None)]
    fn test_validate_profile_age(#[case] age: &str, #[case] expected: Option<u32>) {
        assert_eq!(Validator.validate_profile_age(age).ok(), expected);
    }

    #[test]
    fn test_validate_test_date() {
        assert_eq!(
            Validator.validate_test_date("2024-05-01").ok(),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert!(Validator.validate_test_date("2024-13-01").is_err());
        assert!(Validator.validate_test_date("9999-01-01").is_err());
    }

    #[test]
    fn test_validate_profile_gender() {
        assert_eq!(Validator.validate_profile_gender("m").ok(), Some(Gender::Male));
        assert!(Validator.validate_profile_gender("x").is_err());
    }

    fn profile() -> UserProfile {
        UserProfile::new(Name::new("Alice").unwrap(), Gender::Male, 25)
    }

    fn entry(day: u32, reps: u32) -> TestEntry {
        let mut entry = TestEntry::new(date(day));
        entry.pullup = TestMetric::new(reps, Some(Variant::Complete));
        entry
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }
}
