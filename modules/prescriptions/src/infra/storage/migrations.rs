use sea_orm_migration::prelude as mig;
use sea_orm_migration::prelude::Iden;
use sea_orm_migration::sea_query;

pub struct Migrator;

#[async_trait::async_trait]
impl mig::MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn mig::MigrationTrait>> {
        vec![Box::new(CreatePrescription)]
    }
}

#[derive(Iden)]
enum PrescriptionTbl {
    #[iden = "prescription"]
    Table,
    Id,
    PrescriptionDate,
    Name,
    Age,
    Gender,
    Diagnosis,
    Medicines,
    NextVisitDate,
}

struct CreatePrescription;

impl mig::MigrationName for CreatePrescription {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "m001_create_prescription"
    }
}

#[async_trait::async_trait]
impl mig::MigrationTrait for CreatePrescription {
    async fn up(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        manager
            .create_table(
                mig::Table::create()
                    .table(PrescriptionTbl::Table)
                    .if_not_exists()
                    .col(
                        mig::ColumnDef::new(PrescriptionTbl::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        mig::ColumnDef::new(PrescriptionTbl::PrescriptionDate)
                            .date()
                            .not_null(),
                    )
                    .col(mig::ColumnDef::new(PrescriptionTbl::Name).string().not_null())
                    .col(mig::ColumnDef::new(PrescriptionTbl::Age).integer().not_null())
                    .col(mig::ColumnDef::new(PrescriptionTbl::Gender).string().not_null())
                    .col(mig::ColumnDef::new(PrescriptionTbl::Diagnosis).text().not_null())
                    .col(mig::ColumnDef::new(PrescriptionTbl::Medicines).text().not_null())
                    .col(mig::ColumnDef::new(PrescriptionTbl::NextVisitDate).date().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                mig::Index::create()
                    .if_not_exists()
                    .name("idx_prescription_date")
                    .table(PrescriptionTbl::Table)
                    .col(PrescriptionTbl::PrescriptionDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        manager
            .drop_table(mig::Table::drop().table(PrescriptionTbl::Table).to_owned())
            .await
    }
}
