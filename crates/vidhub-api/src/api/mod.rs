// Resource API routes
//
// One module per resource; each carries its own router state and relies on
// the AuthIdentity extractor for authentication and the services layer for
// the ownership gate.

pub mod comments;
pub mod playlists;
pub mod tweets;
pub mod users;
pub mod videos;
