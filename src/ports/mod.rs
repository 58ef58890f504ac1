//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the sync core and an external
//! system (the remote publication, the local filesystem). Implementations
//! live in `src/adapters/`.

pub mod filesystem;
pub mod remote;

pub use filesystem::FileSystem;
pub use remote::{
    Lookup, LookupFuture, PublicationSnapshot, RemoteClient, RemoteDraft, RemoteFuture,
    RemotePost, RemoteSeries, SeriesRef,
};
