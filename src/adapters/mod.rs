//! Adapter implementations of the port traits.

pub mod dry_run;
pub mod live;
pub mod recording;
pub mod replaying;
