#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod chart;
pub mod log;
mod service;
mod settings;
mod signal;
mod toast;
mod workout;

pub use service::*;
pub use settings::*;
pub use signal::*;
pub use toast::*;
pub use workout::*;
