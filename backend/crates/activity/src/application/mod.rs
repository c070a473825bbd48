//! Application Layer

pub mod recorder;

pub use recorder::ActivityRecorder;
