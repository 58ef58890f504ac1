//! Cassette format for recording and replaying remote interactions.

pub mod format;
pub mod recorder;
pub mod replayer;
