//! Profile operations.

use tracing::info;
use uuid::Uuid;

use super::TrackerService;
use crate::domain::{NewProfile, Profile, ProfilePatch};
use crate::ports::PortResult;

impl TrackerService {
    /// Returns the caller's profile, creating it on first access.
    pub async fn get_profile(&self, user_id: Uuid) -> PortResult<Profile> {
        self.ensure_profile(user_id).await
    }

    pub async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> PortResult<Profile> {
        self.ensure_profile(user_id).await?;
        self.store
            .update_profile(user_id, &patch, self.clock.now())
            .await
    }

    pub(crate) async fn ensure_profile(&self, user_id: Uuid) -> PortResult<Profile> {
        if let Some(profile) = self.store.get_profile(user_id).await? {
            return Ok(profile);
        }

        let user = self.store.get_user(user_id).await?;
        let display_name = user
            .display_name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| email_local_part(&user.email));
        let profile = self
            .store
            .insert_profile_if_absent(NewProfile {
                id: user_id,
                email: user.email,
                display_name,
            })
            .await?;
        info!(%user_id, "Profile created");
        Ok(profile)
    }
}

fn email_local_part(email: &str) -> Option<String> {
    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::email_local_part;

    #[test]
    fn local_part_is_text_before_at() {
        assert_eq!(email_local_part("ada@example.com").as_deref(), Some("ada"));
        assert_eq!(email_local_part("@example.com"), None);
    }
}
