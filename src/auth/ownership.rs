use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood::MoodEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Permitted,
    Forbidden,
}

pub fn access(entry: &MoodEntry, caller: &AuthUser) -> Access {
    if entry.owner_id == caller.id {
        Access::Permitted
    } else {
        Access::Forbidden
    }
}

/// Gate for every entry-specific read or write. A foreign entry is reported
/// as `Unauthorized` with no content.
pub fn authorize(entry: &MoodEntry, caller: &AuthUser) -> AppResult<()> {
    match access(entry, caller) {
        Access::Permitted => Ok(()),
        Access::Forbidden => {
            tracing::warn!(user_id = %caller.id, mood_id = %entry.id, "Access to foreign mood entry denied");
            Err(AppError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood::Mood;
    use uuid::Uuid;

    #[test]
    fn owner_is_permitted_and_others_are_not() {
        let owner = AuthUser { id: Uuid::new_v4() };
        let stranger = AuthUser { id: Uuid::new_v4() };
        let entry = MoodEntry::new(owner.id, Mood::Calm, None);

        assert_eq!(access(&entry, &owner), Access::Permitted);
        assert_eq!(access(&entry, &stranger), Access::Forbidden);
        assert!(authorize(&entry, &owner).is_ok());
        assert!(matches!(
            authorize(&entry, &stranger),
            Err(AppError::Unauthorized)
        ));
    }
}
