//! Create `users` table.
//!
//! One row per account; `email` and `verification_token` are unique lookups.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid(Users::Id).primary_key())
                    .col(string_len(Users::Email, 255).unique_key().not_null())
                    .col(string(Users::PasswordHash).not_null())
                    .col(string(Users::AvatarUrl).not_null())
                    .col(string_len(Users::Subscription, 16).not_null().default("starter"))
                    .col(ColumnDef::new(Users::Token).text().null())
                    .col(boolean(Users::Verify).not_null().default(false))
                    .col(string_len(Users::VerificationToken, 64).unique_key().not_null())
                    .col(timestamp_with_time_zone(Users::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Users::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    AvatarUrl,
    Subscription,
    Token,
    Verify,
    VerificationToken,
    CreatedAt,
    UpdatedAt,
}
