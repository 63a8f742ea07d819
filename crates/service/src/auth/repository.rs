use async_trait::async_trait;
use models::user::Subscription;
use uuid::Uuid;

use super::domain::{NewAccount, User};
use super::errors::AuthError;

/// Repository abstraction for account persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;
    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, AuthError>;
    /// Insert a new unverified account; `Conflict` if the email is taken.
    async fn create(&self, account: NewAccount) -> Result<User, AuthError>;

    async fn set_token(&self, id: Uuid, token: Option<String>) -> Result<(), AuthError>;
    async fn set_avatar_url(&self, id: Uuid, avatar_url: String) -> Result<User, AuthError>;
    async fn mark_verified(&self, id: Uuid) -> Result<(), AuthError>;
    async fn set_subscription(&self, id: Uuid, subscription: Subscription) -> Result<User, AuthError>;
}

/// In-memory repository for tests, doc examples and database-less local runs
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryUserRepository {
        users: Mutex<HashMap<Uuid, User>>, // key: user id
    }

    impl InMemoryUserRepository {
        async fn modify<F>(&self, id: Uuid, f: F) -> Result<User, AuthError>
        where
            F: FnOnce(&mut User),
        {
            let mut users = self.users.lock().await;
            let user = users.get_mut(&id).ok_or(AuthError::NotFound)?;
            f(user);
            Ok(user.clone())
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().await;
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().await;
            Ok(users.get(&id).cloned())
        }

        async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().await;
            Ok(users.values().find(|u| u.verification_token == token).cloned())
        }

        async fn create(&self, account: NewAccount) -> Result<User, AuthError> {
            let mut users = self.users.lock().await;
            if users.values().any(|u| u.email == account.email) {
                return Err(AuthError::Conflict);
            }
            let user = User {
                id: Uuid::new_v4(),
                email: account.email,
                password_hash: account.password_hash,
                avatar_url: account.avatar_url,
                subscription: Subscription::default(),
                token: None,
                verify: false,
                verification_token: account.verification_token,
            };
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn set_token(&self, id: Uuid, token: Option<String>) -> Result<(), AuthError> {
            self.modify(id, |u| u.token = token).await.map(|_| ())
        }

        async fn set_avatar_url(&self, id: Uuid, avatar_url: String) -> Result<User, AuthError> {
            self.modify(id, |u| u.avatar_url = avatar_url).await
        }

        async fn mark_verified(&self, id: Uuid) -> Result<(), AuthError> {
            self.modify(id, |u| u.verify = true).await.map(|_| ())
        }

        async fn set_subscription(&self, id: Uuid, subscription: Subscription) -> Result<User, AuthError> {
            self.modify(id, |u| u.subscription = subscription).await
        }
    }
}
