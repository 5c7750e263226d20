pub mod destagger;
pub mod pipeline;
pub mod surface;
pub mod vertical;

pub mod grid;
pub mod iff;

pub mod constants;
pub mod error;
pub mod parameters;
