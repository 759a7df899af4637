#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod console;
pub mod drivers;
pub mod sched;
pub mod sensor;
pub mod shutdown;
pub mod tasks;

#[cfg(target_os = "none")]
pub mod board;

#[cfg(target_os = "none")]
pub use board::Board;
pub use sensor::{LineAssembler, SensorReading, Vector3};
