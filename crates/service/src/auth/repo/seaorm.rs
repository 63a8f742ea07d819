use sea_orm::{DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use models::user::{self as user_model, NewUser, Subscription};

use crate::auth::domain::{NewAccount, User};
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

fn to_domain(m: user_model::Model) -> Result<User, AuthError> {
    Ok(User {
        subscription: m.subscription.parse::<Subscription>()?,
        id: m.id,
        email: m.email,
        password_hash: m.password_hash,
        avatar_url: m.avatar_url,
        token: m.token,
        verify: m.verify,
        verification_token: m.verification_token,
    })
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        user_model::find_by_email(&self.db, email).await?.map(to_domain).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let res = user_model::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        res.map(to_domain).transpose()
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, AuthError> {
        user_model::find_by_verification_token(&self.db, token).await?.map(to_domain).transpose()
    }

    async fn create(&self, account: NewAccount) -> Result<User, AuthError> {
        let input = NewUser {
            email: &account.email,
            password_hash: &account.password_hash,
            avatar_url: &account.avatar_url,
            verification_token: &account.verification_token,
        };
        match user_model::create(&self.db, input).await {
            Ok(created) => to_domain(created),
            // unique index on email closes the race between lookup and insert
            Err(models::errors::ModelError::Db(msg)) if msg.contains("duplicate key") => Err(AuthError::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_token(&self, id: Uuid, token: Option<String>) -> Result<(), AuthError> {
        user_model::update_with(&self.db, id, |am| am.token = Set(token)).await?;
        Ok(())
    }

    async fn set_avatar_url(&self, id: Uuid, avatar_url: String) -> Result<User, AuthError> {
        let m = user_model::update_with(&self.db, id, |am| am.avatar_url = Set(avatar_url)).await?;
        to_domain(m)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), AuthError> {
        user_model::update_with(&self.db, id, |am| am.verify = Set(true)).await?;
        Ok(())
    }

    async fn set_subscription(&self, id: Uuid, subscription: Subscription) -> Result<User, AuthError> {
        let m = user_model::update_with(&self.db, id, |am| am.subscription = Set(subscription.to_string())).await?;
        to_domain(m)
    }
}
