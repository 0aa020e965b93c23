//! JSON representation of profiles and timer protocols.
//!
//! The same format is used in local storage and for import and export.
//! Documents are decoded field by field, so that a rejected document lists
//! every field with a problem.

use chrono::NaiveDate;
use fitcheck_domain::{self as domain, DecodeError, FieldError};
use serde_json::{Map, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub gender: String,
    pub age: u32,
    pub tests: Vec<TestEntry>,
}

impl From<&domain::UserProfile> for UserProfile {
    fn from(value: &domain::UserProfile) -> Self {
        Self {
            name: value.name.to_string(),
            gender: value.gender.key().to_string(),
            age: value.age,
            tests: value.tests.iter().map(TestEntry::from).collect(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct TestEntry {
    pub date: NaiveDate,
    pub pullup: TestMetric,
    pub pushup: TestMetric,
    pub squats: TestMetric,
    pub vups: TestMetric,
    pub burpees: TestMetric,
    pub cooper: f32,
}

impl From<&domain::TestEntry> for TestEntry {
    fn from(value: &domain::TestEntry) -> Self {
        Self {
            date: value.date,
            pullup: TestMetric::from(&value.pullup),
            pushup: TestMetric::from(&value.pushup),
            squats: TestMetric::from(&value.squats),
            vups: TestMetric::from(&value.vups),
            burpees: TestMetric::from(&value.burpees),
            cooper: value.cooper,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TestMetric {
    pub reps: u32,
    pub version: String,
}

impl From<&domain::TestMetric> for TestMetric {
    fn from(value: &domain::TestMetric) -> Self {
        Self {
            reps: value.reps,
            version: value
                .variant
                .map(|variant| variant.code().to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sets: u32,
    pub prep_time: u32,
    pub rest_between_sets: u32,
    pub intervals: Vec<Interval>,
    pub is_custom: bool,
}

impl From<&domain::Protocol> for Protocol {
    fn from(value: &domain::Protocol) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            description: value.description.clone(),
            sets: value.timer.sets(),
            prep_time: value.timer.prep_time(),
            rest_between_sets: value.timer.rest_between_sets(),
            intervals: value
                .timer
                .intervals()
                .iter()
                .map(|interval| Interval {
                    label: interval.label.clone(),
                    duration: interval.duration,
                })
                .collect(),
            is_custom: value.custom,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub label: String,
    pub duration: u32,
}

#[allow(clippy::missing_errors_doc)]
pub fn export_profile(profile: &domain::UserProfile) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&UserProfile::from(profile))
}

/// Export the custom protocols. Built-in protocols are never exported.
#[allow(clippy::missing_errors_doc)]
pub fn export_protocols(protocols: &[domain::Protocol]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(
        &protocols
            .iter()
            .filter(|p| !domain::is_builtin(&p.id))
            .map(Protocol::from)
            .collect::<Vec<_>>(),
    )
}

#[allow(clippy::missing_errors_doc)]
pub fn decode_profile(json: &str) -> Result<domain::UserProfile, DecodeError> {
    profile_from_value(&parse(json)?)
}

#[allow(clippy::missing_errors_doc)]
pub fn decode_protocols(json: &str) -> Result<Vec<domain::Protocol>, DecodeError> {
    protocols_from_value(&parse(json)?)
}

fn parse(json: &str) -> Result<Value, DecodeError> {
    serde_json::from_str(json).map_err(|err| DecodeError::Syntax(err.to_string()))
}

#[allow(clippy::missing_errors_doc)]
pub fn profile_from_value(value: &Value) -> Result<domain::UserProfile, DecodeError> {
    let mut decoder = Decoder::default();
    let profile = decoder.profile(value);
    decoder.finish(profile)
}

/// Decode a list of custom protocols.
///
/// Protocols without an identifier get a new one. Every decoded protocol is
/// marked as custom.
#[allow(clippy::missing_errors_doc)]
pub fn protocols_from_value(value: &Value) -> Result<Vec<domain::Protocol>, DecodeError> {
    let mut decoder = Decoder::default();
    let protocols = decoder.array("", Some(value)).map(|items| {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| decoder.protocol(&format!("[{i}]"), item))
            .collect::<Vec<_>>()
    });
    decoder.finish(protocols)
}

#[derive(Default)]
struct Decoder {
    errors: Vec<FieldError>,
}

impl Decoder {
    fn finish<T>(self, value: Option<T>) -> Result<T, DecodeError> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(DecodeError::Invalid(self.errors)),
        }
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        let path = if path.is_empty() { "(root)" } else { path };
        self.errors.push(FieldError::new(path, message));
    }

    fn profile(&mut self, value: &Value) -> Option<domain::UserProfile> {
        let object = self.object("", Some(value))?;

        let name = self
            .string("name", object.get("name"))
            .and_then(|name| match domain::Name::new(&name) {
                Ok(name) => Some(name),
                Err(err) => {
                    self.error("name", err.to_string());
                    None
                }
            });
        let gender = self
            .string("gender", object.get("gender"))
            .and_then(|gender| match domain::Gender::try_from(gender.as_str()) {
                Ok(gender) => Some(gender),
                Err(err) => {
                    self.error("gender", err.to_string());
                    None
                }
            });
        let age = self.age("age", object.get("age"));
        let tests = match present(object.get("tests")) {
            None => Some(vec![]),
            Some(tests) => self.array("tests", Some(tests)).map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| self.test_entry(&format!("tests[{i}]"), item))
                    .collect::<Vec<_>>()
            }),
        };

        Some(domain::UserProfile {
            name: name?,
            gender: gender?,
            age: age?,
            tests: tests?,
        })
    }

    fn test_entry(&mut self, path: &str, value: &Value) -> Option<domain::TestEntry> {
        let object = self.object(path, Some(value))?;

        let date_path = format!("{path}.date");
        let date = self
            .string(&date_path, object.get("date"))
            .and_then(|date| match NaiveDate::parse_from_str(date.trim(), DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    self.error(&date_path, "expected a date in the format YYYY-MM-DD");
                    None
                }
            });

        let mut metrics = vec![];
        for exercise in domain::Exercise::repetition_exercises() {
            metrics.push(self.test_metric(
                &format!("{path}.{}", exercise.key()),
                exercise,
                object.get(exercise.key()),
            ));
        }

        let cooper_path = format!("{path}.cooper");
        let cooper = match present(object.get("cooper")) {
            None => Some(0.),
            Some(Value::String(laps)) => Some(domain::parse_non_negative_float(laps)),
            Some(Value::Number(laps)) => match laps.as_f64() {
                #[allow(clippy::cast_possible_truncation)]
                Some(laps) if laps >= 0. => Some(laps as f32),
                _ => {
                    self.error(&cooper_path, "expected a non-negative number");
                    None
                }
            },
            Some(_) => {
                self.error(&cooper_path, "expected a number");
                None
            }
        };

        let mut entry = domain::TestEntry::new(date?);
        for (exercise, metric) in domain::Exercise::repetition_exercises().zip(metrics) {
            if let Some(slot) = entry.metric_mut(exercise) {
                *slot = metric?;
            }
        }
        entry.cooper = cooper?;
        Some(entry)
    }

    /// A missing metric means the exercise was not recorded.
    fn test_metric(
        &mut self,
        path: &str,
        exercise: domain::Exercise,
        value: Option<&Value>,
    ) -> Option<domain::TestMetric> {
        let Some(value) = present(value) else {
            return Some(domain::TestMetric::default());
        };
        let object = self.object(path, Some(value))?;

        let reps = match present(object.get("reps")) {
            None => Some(0),
            Some(reps) => self.non_negative_int(&format!("{path}.reps"), Some(reps)),
        };

        let version_path = format!("{path}.version");
        let variant = match present(object.get("version")) {
            None => Some(None),
            Some(version) => self.string(&version_path, Some(version)).and_then(|code| {
                if code.trim().is_empty() {
                    Some(None)
                } else if let Some(variant) = exercise.variant(&code) {
                    Some(Some(variant))
                } else {
                    self.error(&version_path, format!("unknown version {code:?}"));
                    None
                }
            }),
        };

        Some(domain::TestMetric::new(reps?, variant?))
    }

    fn protocol(&mut self, path: &str, value: &Value) -> Option<domain::Protocol> {
        let object = self.object(path, Some(value))?;

        let id_path = format!("{path}.id");
        let id = match present(object.get("id")) {
            None => Some(domain::ProtocolID::custom()),
            Some(id) => self.string(&id_path, Some(id)).and_then(|id| {
                let id = domain::ProtocolID::from(id.trim());
                if id.is_empty() {
                    Some(domain::ProtocolID::custom())
                } else if domain::is_builtin(&id) {
                    self.error(&id_path, format!("{id} is a built-in protocol"));
                    None
                } else {
                    Some(id)
                }
            }),
        };

        let name_path = format!("{path}.name");
        let name = self
            .string(&name_path, object.get("name"))
            .and_then(|name| match domain::Name::new(&name) {
                Ok(name) => Some(name),
                Err(err) => {
                    self.error(&name_path, err.to_string());
                    None
                }
            });
        let description = match present(object.get("description")) {
            None => Some(String::new()),
            Some(description) => self.string(&format!("{path}.description"), Some(description)),
        };

        let sets = self.non_negative_int(&format!("{path}.sets"), object.get("sets"));
        let prep_time = match present(object.get("prepTime")) {
            None => Some(0),
            Some(v) => self.non_negative_int(&format!("{path}.prepTime"), Some(v)),
        };
        let rest_between_sets = match present(object.get("restBetweenSets")) {
            None => Some(0),
            Some(v) => self.non_negative_int(&format!("{path}.restBetweenSets"), Some(v)),
        };

        let intervals_path = format!("{path}.intervals");
        let intervals = self
            .array(&intervals_path, object.get("intervals"))
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.interval(&format!("{intervals_path}[{i}]"), item))
                    .collect::<Vec<_>>()
            })
            .and_then(|intervals| intervals.into_iter().collect::<Option<Vec<_>>>());

        let timer = match (sets, prep_time, rest_between_sets, intervals) {
            (Some(sets), Some(prep_time), Some(rest_between_sets), Some(intervals)) => {
                match domain::TimerProtocol::new(sets, prep_time, rest_between_sets, intervals) {
                    Ok(timer) => Some(timer),
                    Err(err) => {
                        let field_path = match err {
                            domain::ProtocolError::NoSets => format!("{path}.sets"),
                            domain::ProtocolError::NoIntervals => intervals_path,
                            domain::ProtocolError::ZeroDuration(position) => {
                                format!("{intervals_path}[{}].duration", position - 1)
                            }
                            domain::ProtocolError::TooLong => path.to_string(),
                        };
                        self.error(&field_path, err.to_string());
                        None
                    }
                }
            }
            _ => None,
        };

        Some(domain::Protocol {
            id: id?,
            name: name?,
            description: description?,
            custom: true,
            timer: timer?,
        })
    }

    fn interval(&mut self, path: &str, value: &Value) -> Option<domain::IntervalSpec> {
        let object = self.object(path, Some(value))?;
        let label = self.string(&format!("{path}.label"), object.get("label"));
        let duration = self.non_negative_int(&format!("{path}.duration"), object.get("duration"));
        Some(domain::IntervalSpec::new(label?, duration?))
    }

    fn object<'v>(&mut self, path: &str, value: Option<&'v Value>) -> Option<&'v Map<String, Value>> {
        match present(value) {
            None => {
                self.error(path, "missing");
                None
            }
            Some(Value::Object(object)) => Some(object),
            Some(_) => {
                self.error(path, "expected an object");
                None
            }
        }
    }

    fn array<'v>(&mut self, path: &str, value: Option<&'v Value>) -> Option<&'v Vec<Value>> {
        match present(value) {
            None => {
                self.error(path, "missing");
                None
            }
            Some(Value::Array(array)) => Some(array),
            Some(_) => {
                self.error(path, "expected an array");
                None
            }
        }
    }

    fn string(&mut self, path: &str, value: Option<&Value>) -> Option<String> {
        match present(value) {
            None => {
                self.error(path, "missing");
                None
            }
            Some(Value::String(string)) => Some(string.clone()),
            Some(_) => {
                self.error(path, "expected a string");
                None
            }
        }
    }

    fn non_negative_int(&mut self, path: &str, value: Option<&Value>) -> Option<u32> {
        match present(value) {
            None => {
                self.error(path, "missing");
                None
            }
            Some(Value::Number(number)) => match number.as_u64().map(u32::try_from) {
                Some(Ok(number)) => Some(number),
                _ => {
                    self.error(path, "expected a non-negative whole number");
                    None
                }
            },
            Some(_) => {
                self.error(path, "expected a number");
                None
            }
        }
    }

    /// Ages may also be given as numeric strings.
    fn age(&mut self, path: &str, value: Option<&Value>) -> Option<u32> {
        let age = match present(value) {
            Some(Value::String(age)) => match domain::parse_non_negative_int(age) {
                0 => {
                    self.error(path, "expected a positive whole number");
                    return None;
                }
                age => age,
            },
            value => self.non_negative_int(path, value)?,
        };
        if age == 0 || age > domain::MAX_AGE {
            self.error(
                path,
                format!("expected an age between 1 and {}", domain::MAX_AGE),
            );
            return None;
        }
        Some(age)
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_profile() {
        let profile = decode_profile(
            &json!({
                "name": "Ana",
                "gender": "f",
                "age": "34",
                "tests": [
                    {
                        "date": "2024-03-01",
                        "pullup": { "reps": 4, "version": "n" },
                        "pushup": { "reps": 20, "version": "" },
                        "squats": null,
                        "cooper": "7,5"
                    }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let mut entry = domain::TestEntry::new(date(2024, 3, 1));
        entry.pullup = domain::TestMetric::new(4, Some(domain::Variant::Negative));
        entry.pushup = domain::TestMetric::new(20, None);
        entry.cooper = 7.5;

        assert_eq!(
            profile,
            domain::UserProfile {
                name: domain::Name::new("Ana").unwrap(),
                gender: domain::Gender::Female,
                age: 34,
                tests: vec![entry],
            }
        );
    }

    #[test]
    fn test_decode_profile_reports_every_field() {
        let result = decode_profile(
            &json!({
                "name": 42,
                "gender": "x",
                "tests": [
                    { "date": "01.03.2024", "pullup": { "reps": -1, "version": "r" } },
                    "nope"
                ]
            })
            .to_string(),
        );

        assert_eq!(
            result
                .unwrap_err()
                .fields()
                .iter()
                .map(|f| f.path.as_str())
                .collect::<Vec<_>>(),
            vec![
                "name",
                "gender",
                "age",
                "tests[0].date",
                "tests[0].pullup.reps",
                "tests[0].pullup.version",
                "tests[1]",
            ]
        );
    }

    #[rstest]
    #[case("{", None)]
    #[case("[]", Some("expected an object"))]
    #[case("null", Some("missing"))]
    fn test_decode_profile_malformed(#[case] json: &str, #[case] expected: Option<&str>) {
        let err = decode_profile(json).unwrap_err();
        match expected {
            None => assert!(matches!(err, DecodeError::Syntax(_))),
            Some(message) => assert_eq!(err.fields(), &[FieldError::new("(root)", message)]),
        }
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!(121))]
    #[case(json!("abc"))]
    #[case(json!(30.5))]
    fn test_decode_profile_invalid_age(#[case] age: Value) {
        let err = profile_from_value(&json!({ "name": "Bo", "gender": "M", "age": age }))
            .unwrap_err();
        assert_eq!(
            err.fields().iter().map(|f| f.path.as_str()).collect::<Vec<_>>(),
            vec!["age"]
        );
    }

    #[test]
    fn test_export_profile() {
        let mut profile = domain::UserProfile::new(
            domain::Name::new("Bo").unwrap(),
            domain::Gender::Male,
            41,
        );
        let mut entry = domain::TestEntry::new(date(2024, 1, 2));
        entry.burpees = domain::TestMetric::new(12, Some(domain::Variant::NoFlex));
        entry.cooper = 8.;
        profile.tests.push(entry);

        let exported = export_profile(&profile).unwrap();
        let value: Value = serde_json::from_str(&exported).unwrap();

        assert_eq!(value["gender"], json!("M"));
        assert_eq!(value["tests"][0]["date"], json!("2024-01-02"));
        assert_eq!(
            value["tests"][0]["burpees"],
            json!({ "reps": 12, "version": "sf" })
        );
        assert_eq!(
            value["tests"][0]["pullup"],
            json!({ "reps": 0, "version": "" })
        );
        assert_eq!(decode_profile(&exported).unwrap(), profile);
    }

    #[test]
    fn test_decode_protocols() {
        let protocols = decode_protocols(
            &json!([
                {
                    "id": "custom-1",
                    "name": "Stairs",
                    "sets": 3,
                    "prepTime": 5,
                    "restBetweenSets": 30,
                    "intervals": [{ "label": "Up", "duration": 60 }],
                    "isCustom": false
                },
                {
                    "name": "Sprints",
                    "description": "Short and fast",
                    "sets": 10,
                    "intervals": [{ "label": "Run", "duration": 15 }]
                }
            ])
            .to_string(),
        )
        .unwrap();

        assert_eq!(protocols.len(), 2);
        assert_eq!(*protocols[0].id, "custom-1");
        assert!(protocols.iter().all(|p| p.custom));
        assert!(protocols[1].id.starts_with("custom-"));
        assert_eq!(protocols[1].description, "Short and fast");
        assert_eq!(protocols[1].timer.prep_time(), 0);
        assert_eq!(protocols[1].timer.total_duration(), 10 * 15);
    }

    #[test]
    fn test_decode_protocols_reports_every_field() {
        let result = decode_protocols(
            &json!([
                {
                    "id": "tabata",
                    "name": "",
                    "sets": 0,
                    "intervals": [{ "label": "Up", "duration": 60 }]
                },
                {
                    "name": "Sprints",
                    "sets": 2,
                    "intervals": [{ "label": "Run", "duration": 15 }, { "label": "Walk", "duration": 0 }]
                },
                {
                    "name": "Empty",
                    "sets": 2,
                    "prepTime": "10",
                    "intervals": [{ "duration": 15 }]
                }
            ])
            .to_string(),
        );

        assert_eq!(
            result
                .unwrap_err()
                .fields()
                .iter()
                .map(|f| f.path.as_str())
                .collect::<Vec<_>>(),
            vec![
                "[0].id",
                "[0].name",
                "[0].sets",
                "[1].intervals[1].duration",
                "[2].prepTime",
                "[2].intervals[0].label",
            ]
        );
    }

    #[test]
    fn test_decode_protocols_too_long() {
        let result = decode_protocols(
            &json!([
                {
                    "name": "Endless",
                    "sets": 100_000,
                    "prepTime": 10,
                    "restBetweenSets": 60,
                    "intervals": [{ "label": "Work", "duration": 100_000 }]
                }
            ])
            .to_string(),
        );

        let err = result.unwrap_err();
        assert_eq!(
            err.fields()
                .iter()
                .map(|f| (f.path.as_str(), f.message.as_str()))
                .collect::<Vec<_>>(),
            vec![("[0]", "Protocol must not be longer than 4294967295 seconds")]
        );
    }

    #[test]
    fn test_export_protocols() {
        let custom = domain::Protocol {
            id: "custom-1".into(),
            name: domain::Name::new("Stairs").unwrap(),
            description: String::from("Up and down"),
            custom: true,
            timer: domain::TimerProtocol::new(
                3,
                5,
                30,
                vec![domain::IntervalSpec::new("Up", 60)],
            )
            .unwrap(),
        };
        let mut protocols = domain::DEFAULT_PROTOCOLS.clone();
        protocols.push(custom.clone());

        let exported = export_protocols(&protocols).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&exported).unwrap(),
            json!([{
                "id": "custom-1",
                "name": "Stairs",
                "description": "Up and down",
                "sets": 3,
                "prepTime": 5,
                "restBetweenSets": 30,
                "intervals": [{ "label": "Up", "duration": 60 }],
                "isCustom": true
            }])
        );
        assert_eq!(decode_protocols(&exported).unwrap(), vec![custom]);
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }
}
