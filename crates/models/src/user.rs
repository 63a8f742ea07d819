use std::{fmt, str::FromStr};

use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub subscription: String,
    pub token: Option<String>,
    pub verify: bool,
    #[sea_orm(unique)]
    pub verification_token: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Subscription tier. New accounts start on `Starter`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subscription {
    #[default]
    Starter,
    Pro,
    Business,
}

impl Subscription {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subscription::Starter => "starter",
            Subscription::Pro => "pro",
            Subscription::Business => "business",
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subscription {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(Subscription::Starter),
            "pro" => Ok(Subscription::Pro),
            "business" => Ok(Subscription::Business),
            other => Err(ModelError::Validation(format!(
                "subscription must be one of starter, pro, business (got {other:?})"
            ))),
        }
    }
}

/// Column values for a freshly signed-up account.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub avatar_url: &'a str,
    pub verification_token: &'a str,
}

pub async fn create(db: &DatabaseConnection, input: NewUser<'_>) -> Result<Model, ModelError> {
    if !input.email.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    if input.password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(input.email.to_string()),
        password_hash: Set(input.password_hash.to_string()),
        avatar_url: Set(input.avatar_url.to_string()),
        subscription: Set(Subscription::default().to_string()),
        token: Set(None),
        verify: Set(false),
        verification_token: Set(input.verification_token.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_by_verification_token(db: &DatabaseConnection, token: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::VerificationToken.eq(token))
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Load the row, apply `f` to its active model, bump `updated_at` and save.
pub async fn update_with<F>(db: &DatabaseConnection, id: Uuid, f: F) -> Result<Model, ModelError>
where
    F: FnOnce(&mut ActiveModel),
{
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?
        .ok_or_else(|| ModelError::NotFound("user".into()))?
        .into();
    f(&mut am);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_round_trips_through_str() {
        for tier in [Subscription::Starter, Subscription::Pro, Subscription::Business] {
            assert_eq!(tier.as_str().parse::<Subscription>().unwrap(), tier);
        }
        assert!("gold".parse::<Subscription>().is_err());
        assert_eq!(Subscription::default(), Subscription::Starter);
    }

    #[tokio::test]
    async fn user_lifecycle_against_postgres() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let Ok(url) = std::env::var("DATABASE_URL") else { return Ok(()); };
        let cfg = configs::DatabaseConfig { url, max_connections: 2, min_connections: 1, connect_timeout_secs: 5, acquire_timeout_secs: 5, sqlx_logging: false };
        let db = crate::db::connect_and_migrate(&cfg).await?;

        let email = format!("model_{}@example.com", Uuid::new_v4());
        let vt = Uuid::new_v4().to_string();
        let created = create(&db, NewUser { email: &email, password_hash: "$argon2id$x", avatar_url: "//avatar", verification_token: &vt }).await?;
        assert!(!created.verify);
        assert_eq!(created.subscription, "starter");

        let found = find_by_verification_token(&db, &vt).await?.unwrap();
        assert_eq!(found.id, created.id);

        let updated = update_with(&db, created.id, |am| am.verify = Set(true)).await?;
        assert!(updated.verify);
        assert!(find_by_email(&db, &email).await?.unwrap().verify);

        Entity::delete_by_id(created.id).exec(&db).await?;
        let missing = update_with(&db, created.id, |am| am.verify = Set(false)).await;
        assert!(matches!(missing, Err(ModelError::NotFound(_))));
        Ok(())
    }
}
