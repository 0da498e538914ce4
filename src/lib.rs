#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod gate;
pub use gate::*;

mod engine;
pub use engine::*;

mod policy;
pub use policy::*;

mod error;
pub use error::*;

mod common;
pub use common::{AdmissionDecision, MaxRequests, RecordSnapshot, WindowMs};

mod reaper;

#[cfg(test)]
mod tests;
