//! Live adapters for real external interactions.

pub mod filesystem;
pub mod hashnode;

pub use filesystem::LiveFileSystem;
pub use hashnode::HashnodeClient;
