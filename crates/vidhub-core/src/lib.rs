// Vidhub core domain types
//
// These entities are the public wire shapes of the platform. Credential
// material (password hashes, refresh token hashes) never appears here; it
// stays in the storage row models.

pub mod comment;
pub mod identity;
pub mod playlist;
pub mod tweet;
pub mod video;

pub use comment::Comment;
pub use identity::Identity;
pub use playlist::Playlist;
pub use tweet::Tweet;
pub use video::{Video, WatchEntry};
