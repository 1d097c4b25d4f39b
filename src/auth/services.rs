use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::UserStore,
    repo_types::NewUser,
};
use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(
    users: &dyn UserStore,
    keys: &JwtKeys,
    payload: RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let name = payload.name.trim();
    let email = normalize_email(&payload.email);

    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    // the unique index still guards concurrent registrations
    let user = users
        .create(NewUser {
            name: name.to_string(),
            email,
            password_hash,
        })
        .await?;

    let token = keys.issue(user.id)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

pub async fn login(
    users: &dyn UserStore,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> Result<AuthResponse, AppError> {
    let email = normalize_email(&payload.email);

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::unauthenticated("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::unauthenticated("Invalid credentials"));
    }

    let token = keys.issue(user.id)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(AuthResponse {
        token,
        user: PublicUser::from(user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::store::MemoryStore;

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        })
    }

    fn register_req(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn register_normalizes_and_issues_token() {
        let store = MemoryStore::new();
        let keys = keys();
        let res = register(&store, &keys, register_req("  Ada ", " Ada@Example.COM ", "secret1"))
            .await
            .unwrap();
        assert_eq!(res.user.name, "Ada");
        assert_eq!(res.user.email, "ada@example.com");
        assert_eq!(keys.verify(&res.token).unwrap().sub, res.user.id);
    }

    #[tokio::test]
    async fn register_validates_input() {
        let store = MemoryStore::new();
        let keys = keys();
        for req in [
            register_req("   ", "ada@example.com", "secret1"),
            register_req("Ada", "not-an-email", "secret1"),
            register_req("Ada", "ada@example.com", "short"),
        ] {
            let err = register(&store, &keys, req).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        let keys = keys();
        register(&store, &keys, register_req("Ada", "ada@example.com", "secret1"))
            .await
            .unwrap();
        let err = register(&store, &keys, register_req("Other", "ADA@example.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_checks_credentials() {
        let store = MemoryStore::new();
        let keys = keys();
        register(&store, &keys, register_req("Ada", "ada@example.com", "secret1"))
            .await
            .unwrap();

        let ok = login(
            &store,
            &keys,
            LoginRequest {
                email: "ADA@example.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(ok.user.email, "ada@example.com");

        let wrong_password = login(
            &store,
            &keys,
            LoginRequest {
                email: "ada@example.com".into(),
                password: "nope-nope".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(wrong_password, AppError::Unauthenticated(_)));

        let unknown = login(
            &store,
            &keys,
            LoginRequest {
                email: "bob@example.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(unknown, AppError::Unauthenticated(_)));
    }
}
