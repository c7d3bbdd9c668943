use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Staff: username unique within a hospital
        manager
            .create_index(
                Index::create()
                    .name("uniq_staff_hospital_username")
                    .table(Staff::Table)
                    .col(Staff::HospitalId)
                    .col(Staff::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Patient: NULLs never collide in a Postgres unique index, so these
        // only constrain identifiers that are present.
        manager
            .create_index(
                Index::create()
                    .name("uniq_patient_hospital_national_id")
                    .table(Patient::Table)
                    .col(Patient::HospitalId)
                    .col(Patient::NationalId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uniq_patient_hospital_passport_id")
                    .table(Patient::Table)
                    .col(Patient::HospitalId)
                    .col(Patient::PassportId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_staff_hospital_username").table(Staff::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_patient_hospital_national_id").table(Patient::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_patient_hospital_passport_id").table(Patient::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Staff { Table, HospitalId, Username }

#[derive(DeriveIden)]
enum Patient { Table, HospitalId, NationalId, PassportId }
