use std::collections::VecDeque;

use fitcheck_domain::{self as domain, DeleteError, ReadError, StorageError, UpdateError};
use fitcheck_web_app::{self as web_app, log};
use gloo_storage::{LocalStorage as GlooLocalStorage, Storage, errors::StorageError as GlooError};
use serde_json::Value;

use crate::json;

const KEY_PROFILE: &str = "user_profile_v1";
const KEY_PROTOCOLS: &str = "timer_protocols_v1";
const KEY_SETTINGS: &str = "settings";
const KEY_LOG: &str = "log";

pub struct LocalStorage;

fn read_optional<T: serde::de::DeserializeOwned>(key: &str) -> Result<Option<T>, GlooError> {
    match GlooLocalStorage::get(key) {
        Ok(value) => Ok(Some(value)),
        Err(GlooError::KeyNotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

fn storage_error(err: impl std::error::Error + 'static) -> StorageError {
    StorageError::Other(Box::new(err))
}

impl domain::ProfileRepository for LocalStorage {
    async fn read_profile(&self) -> Result<Option<domain::UserProfile>, ReadError> {
        let Some(value) = read_optional::<Value>(KEY_PROFILE).map_err(storage_error)? else {
            return Ok(None);
        };
        json::profile_from_value(&value)
            .map(Some)
            .map_err(|err| ReadError::Storage(storage_error(err)))
    }

    async fn write_profile(
        &self,
        profile: domain::UserProfile,
    ) -> Result<domain::UserProfile, UpdateError> {
        GlooLocalStorage::set(KEY_PROFILE, json::UserProfile::from(&profile))
            .map_err(storage_error)?;
        Ok(profile)
    }

    async fn delete_profile(&self) -> Result<(), DeleteError> {
        GlooLocalStorage::delete(KEY_PROFILE);
        Ok(())
    }
}

impl domain::ProtocolRepository for LocalStorage {
    async fn read_protocols(&self) -> Result<Vec<domain::Protocol>, ReadError> {
        let Some(value) = read_optional::<Value>(KEY_PROTOCOLS).map_err(storage_error)? else {
            return Ok(vec![]);
        };
        json::protocols_from_value(&value).map_err(|err| ReadError::Storage(storage_error(err)))
    }

    async fn write_protocols(
        &self,
        protocols: Vec<domain::Protocol>,
    ) -> Result<Vec<domain::Protocol>, UpdateError> {
        GlooLocalStorage::set(
            KEY_PROTOCOLS,
            protocols.iter().map(json::Protocol::from).collect::<Vec<_>>(),
        )
        .map_err(storage_error)?;
        Ok(protocols)
    }
}

impl web_app::SettingsRepository for LocalStorage {
    async fn read_settings(&self) -> Result<web_app::Settings, String> {
        read_optional(KEY_SETTINGS)
            .map(Option::unwrap_or_default)
            .map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: web_app::Settings) -> Result<(), String> {
        GlooLocalStorage::set(KEY_SETTINGS, settings).map_err(|err| err.to_string())
    }
}

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        read_optional(KEY_LOG)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::prepend(&mut entries, entry);
        GlooLocalStorage::set(KEY_LOG, entries).map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use chrono::NaiveDate;
        use fitcheck_domain::{ProfileRepository, ProtocolRepository};
        use fitcheck_web_app::SettingsRepository;
        use fitcheck_web_app::log::Repository as _;
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::wasm_bindgen_test;

        use super::super::*;

        fn reset() {
            GlooLocalStorage::clear();
        }

        fn profile() -> domain::UserProfile {
            let mut profile = domain::UserProfile::new(
                domain::Name::new("Alice").unwrap(),
                domain::Gender::Female,
                28,
            );
            let mut entry = domain::TestEntry::new(NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
            entry.squats = domain::TestMetric::new(40, Some(domain::Variant::Complete));
            entry.cooper = 7.;
            profile.tests.push(entry);
            profile
        }

        #[wasm_bindgen_test]
        async fn test_profile() {
            reset();
            assert_eq!(LocalStorage.read_profile().await.unwrap(), None);

            LocalStorage.write_profile(profile()).await.unwrap();
            assert_eq!(LocalStorage.read_profile().await.unwrap(), Some(profile()));

            LocalStorage.delete_profile().await.unwrap();
            assert_eq!(LocalStorage.read_profile().await.unwrap(), None);
        }

        #[wasm_bindgen_test]
        async fn test_invalid_profile() {
            reset();
            GlooLocalStorage::set(KEY_PROFILE, serde_json::json!({ "name": "" })).unwrap();
            assert!(matches!(
                LocalStorage.read_profile().await,
                Err(ReadError::Storage(StorageError::Other(_)))
            ));
        }

        #[wasm_bindgen_test]
        async fn test_protocols() {
            reset();
            assert_eq!(LocalStorage.read_protocols().await.unwrap(), vec![]);

            let protocol = domain::Protocol {
                id: domain::ProtocolID::custom(),
                name: domain::Name::new("Stairs").unwrap(),
                description: String::new(),
                custom: true,
                timer: domain::TimerProtocol::new(
                    2,
                    5,
                    10,
                    vec![domain::IntervalSpec::new("Up", 30)],
                )
                .unwrap(),
            };
            LocalStorage
                .write_protocols(vec![protocol.clone()])
                .await
                .unwrap();
            assert_eq!(LocalStorage.read_protocols().await.unwrap(), vec![protocol]);
        }

        #[wasm_bindgen_test]
        async fn test_settings() {
            reset();
            assert_eq!(
                LocalStorage.read_settings().await,
                Ok(web_app::Settings::default())
            );

            let settings = web_app::Settings {
                beep_volume: 30,
                theme: web_app::Theme::Dark,
                vibration: false,
                keep_screen_awake: true,
            };
            LocalStorage.write_settings(settings).await.unwrap();
            assert_eq!(LocalStorage.read_settings().await, Ok(settings));
        }

        #[wasm_bindgen_test]
        fn test_log() {
            reset();
            assert!(LocalStorage.read_entries().unwrap().is_empty());

            for message in ["a", "b"] {
                LocalStorage
                    .write_entry(log::Entry {
                        time: String::new(),
                        level: ::log::Level::Warn,
                        message: message.to_string(),
                    })
                    .unwrap();
            }

            assert_eq!(
                LocalStorage
                    .read_entries()
                    .unwrap()
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>(),
                vec!["b", "a"]
            );
        }
    }
}
