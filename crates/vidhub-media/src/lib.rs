// Media store client for Vidhub
//
// Wraps the external media provider: signed multipart uploads, signed
// deletes by public id. Upload staging/cleanup lives here so no handler can
// forget to remove a staged file.

pub mod client;
pub mod error;

pub use client::{MediaAsset, MediaClient, MediaConfig, MediaKind};
pub use error::{MediaError, Result};
