//! Create `staff` table holding hospital staff accounts.
//!
//! The password column stores an Argon2 PHC string, never the raw password.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(uuid(Staff::Id).primary_key())
                    .col(integer(Staff::HospitalId).not_null())
                    .col(string_len(Staff::Username, 128).not_null())
                    .col(string_len(Staff::PasswordHash, 255).not_null())
                    .col(timestamp_with_time_zone(Staff::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Staff::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Staff::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Staff { Table, Id, HospitalId, Username, PasswordHash, CreatedAt, UpdatedAt }
