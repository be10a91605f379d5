// Services layer: business logic between routes and storage
//
// The ownership gate lives here once, instead of being re-derived in every
// resource handler: load -> absent is NotFound -> foreign owner is
// Authorization -> otherwise hand the row back for the mutation.

pub mod comment;
pub mod identity;
pub mod playlist;
pub mod tweet;
pub mod video;

pub use comment::CommentService;
pub use identity::IdentityService;
pub use playlist::PlaylistService;
pub use tweet::TweetService;
pub use video::VideoService;

use uuid::Uuid;

use crate::error::ApiError;

/// Resources that record an owning identity.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for vidhub_storage::VideoRow {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for vidhub_storage::CommentRow {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for vidhub_storage::TweetRow {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for vidhub_storage::PlaylistRow {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Gate a loaded resource on the caller's ownership.
pub fn ensure_owner<R: Owned>(
    resource: Option<R>,
    caller: Uuid,
    kind: &str,
) -> Result<R, ApiError> {
    let resource = resource.ok_or_else(|| ApiError::not_found(format!("{kind} not found")))?;
    if resource.owner_id() != caller {
        return Err(ApiError::authorization(format!(
            "You are not allowed to modify this {}",
            kind.to_lowercase()
        )));
    }
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeResource {
        owner: Uuid,
    }

    impl Owned for FakeResource {
        fn owner_id(&self) -> Uuid {
            self.owner
        }
    }

    #[test]
    fn test_ensure_owner_absent_is_not_found() {
        let caller = Uuid::now_v7();
        let err = ensure_owner(None::<FakeResource>, caller, "Video").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_ensure_owner_foreign_is_forbidden() {
        let owner = Uuid::now_v7();
        let caller = Uuid::now_v7();
        let err = ensure_owner(Some(FakeResource { owner }), caller, "Video").unwrap_err();
        assert!(matches!(err, ApiError::Authorization(_)));
    }

    #[test]
    fn test_ensure_owner_passes_own_resource() {
        let owner = Uuid::now_v7();
        let resource = ensure_owner(Some(FakeResource { owner }), owner, "Video").unwrap();
        assert_eq!(resource.owner_id(), owner);
    }
}
