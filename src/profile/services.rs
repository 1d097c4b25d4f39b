use tracing::info;

use super::dto::{Profile, UpdateProfileRequest};
use crate::{
    auth::{dto::PublicUser, repo::UserStore},
    error::AppError,
};

pub async fn get(users: &dyn UserStore, caller: &PublicUser) -> Result<Profile, AppError> {
    let user = users
        .find_by_id(caller.id)
        .await?
        .ok_or_else(|| AppError::unauthenticated("User not found"))?;
    Ok(user.into())
}

pub async fn update(
    users: &dyn UserStore,
    caller: &PublicUser,
    req: UpdateProfileRequest,
) -> Result<PublicUser, AppError> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }

    let user = users
        .update_name(caller.id, name)
        .await?
        .ok_or_else(|| AppError::unauthenticated("User not found"))?;

    info!(user_id = %user.id, "profile updated");
    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::NewUser;
    use crate::store::MemoryStore;

    async fn seeded() -> (MemoryStore, PublicUser) {
        let store = MemoryStore::new();
        let user = store
            .create(NewUser {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password_hash: "$argon2id$placeholder".into(),
            })
            .await
            .unwrap();
        (store, user.into())
    }

    #[tokio::test]
    async fn get_returns_own_record_without_hash() {
        let (store, caller) = seeded().await;
        let profile = get(&store, &caller).await.unwrap();
        assert_eq!(profile.id, caller.id);
        assert_eq!(profile.email, "ada@example.com");
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn update_trims_name_and_keeps_email() {
        let (store, caller) = seeded().await;
        let updated = update(
            &store,
            &caller,
            UpdateProfileRequest {
                name: Some("  Ada Lovelace ".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(get(&store, &caller).await.unwrap().name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn update_rejects_blank_name() {
        let (store, caller) = seeded().await;
        for name in [Some("   ".to_string()), None] {
            let err = update(&store, &caller, UpdateProfileRequest { name })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(get(&store, &caller).await.unwrap().name, "Ada");
    }
}
