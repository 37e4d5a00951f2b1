//! Error taxonomy and wide-integer fixed-point helpers

pub mod errors;
pub mod fixed_point;
