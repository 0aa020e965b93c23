#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod cooper;
mod error;
pub mod exercise;
mod name;
mod parse;
mod profile;
mod protocol;
mod service;
mod statistics;
mod timer;

pub use cooper::*;
pub use error::*;
pub use exercise::*;
pub use name::*;
pub use parse::*;
pub use profile::*;
pub use protocol::*;
pub use service::*;
pub use statistics::*;
pub use timer::*;
