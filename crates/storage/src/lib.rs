#![warn(clippy::pedantic)]

pub mod json;
#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
