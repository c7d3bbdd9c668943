//! Create `patient` table caching identities resolved from hospital registries.
//!
//! `national_id` and `passport_id` are both nullable; the composite unique
//! indexes added later only bind rows where the value is present.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Patient::Table)
                    .if_not_exists()
                    .col(uuid(Patient::Id).primary_key())
                    .col(integer(Patient::HospitalId).not_null())
                    .col(ColumnDef::new(Patient::NationalId).string_len(13).null())
                    .col(ColumnDef::new(Patient::PassportId).string_len(32).null())
                    .col(string_len(Patient::FirstNameTh, 128).not_null())
                    .col(string_len(Patient::MiddleNameTh, 128).not_null())
                    .col(string_len(Patient::LastNameTh, 128).not_null())
                    .col(string_len(Patient::FirstNameEn, 128).not_null())
                    .col(string_len(Patient::MiddleNameEn, 128).not_null())
                    .col(string_len(Patient::LastNameEn, 128).not_null())
                    .col(date(Patient::DateOfBirth).not_null())
                    .col(string_len(Patient::PatientHn, 64).not_null())
                    .col(string_len(Patient::PhoneNumber, 32).not_null())
                    .col(string_len(Patient::Email, 255).not_null())
                    .col(string_len(Patient::Gender, 8).not_null())
                    .col(timestamp_with_time_zone(Patient::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Patient::UpdatedAt).not_null())
                    .check(
                        Expr::col(Patient::NationalId)
                            .is_not_null()
                            .or(Expr::col(Patient::PassportId).is_not_null()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Patient::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Patient {
    Table,
    Id,
    HospitalId,
    NationalId,
    PassportId,
    FirstNameTh,
    MiddleNameTh,
    LastNameTh,
    FirstNameEn,
    MiddleNameEn,
    LastNameEn,
    DateOfBirth,
    PatientHn,
    PhoneNumber,
    Email,
    Gender,
    CreatedAt,
    UpdatedAt,
}
