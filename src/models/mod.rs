//! Domain models and DTOs.

pub mod vulnerability;
