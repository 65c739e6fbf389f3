//! Kessler Core - Orbital Debris Awareness Engine
//!
//! A library crate providing satellite position resolution, orbit arc
//! sampling, proximity risk assessment, a simulation clock and a
//! Kessler cascade simulator for visualization front ends.

pub mod catalog;
pub mod clock;
pub mod kessler;
pub mod propagation;
pub mod proximity;
pub mod trajectory;
pub mod types;

#[cfg(test)]
pub mod test_utils;
