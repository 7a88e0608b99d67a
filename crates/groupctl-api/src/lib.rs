// groupctl-api: Async Rust client for the remote group service

pub mod client;
pub mod error;
mod groups;
pub mod transport;
pub mod types;

pub use client::GroupServiceClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    GetQuery, GroupCollection, GroupPatchBody, GroupRecord, MemberRecord, MutationResult,
};
