//! Database migrations for agreements service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_catalog::Migration),
            Box::new(m20250301_000002_create_agreements::Migration),
            Box::new(m20250301_000003_create_compliance::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Institutions {
    Table,
    Id,
    Name,
    Country,
    Website,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Areas {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    FullName,
    Email,
    Role,
    AreaId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Agreements {
    Table,
    Id,
    Name,
    InstitutionId,
    SignatureDate,
    DurationYears,
    ExpirationDate,
    Country,
    AgreementTypes,
    Objectives,
    Status,
    DocumentUrl,
    Version,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum AgreementAreas {
    Table,
    AgreementId,
    AreaId,
}

#[derive(DeriveIden)]
enum AgreementSubtypes {
    Table,
    Id,
    AgreementId,
    Name,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AgreementResponsibles {
    Table,
    Id,
    AgreementId,
    SubtypeId,
    ProfileId,
    Kind,
}

#[derive(DeriveIden)]
enum AgreementYears {
    Table,
    Id,
    AgreementId,
    YearNumber,
    YearStart,
    YearEnd,
}

#[derive(DeriveIden)]
enum AgreementRenewals {
    Table,
    Id,
    AgreementId,
    OldExpirationDate,
    NewExpirationDate,
    ChangedAt,
}

#[derive(DeriveIden)]
enum Contraprestaciones {
    Table,
    Id,
    AgreementId,
    Kind,
    Description,
    UnitsPerYear,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Seguimientos {
    Table,
    Id,
    ContraprestacionId,
    YearId,
    Status,
    EvidenceUrl,
    Notes,
    RecordedAt,
}

#[derive(DeriveIden)]
enum MobilityRecords {
    Table,
    Id,
    AgreementId,
    ResponsibleId,
    ParticipantName,
    ParticipantKind,
    Direction,
    StartDate,
    EndDate,
    ReportSubmitted,
    ReportSubmittedAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SemiannualReports {
    Table,
    Id,
    AgreementId,
    Year,
    Semester,
    Summary,
    AuthorId,
    CreatedAt,
}

fn created_at<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

mod m20250301_000001_create_catalog {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_catalog"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Institutions::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Institutions::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Institutions::Name).string().not_null())
                        .col(ColumnDef::new(Institutions::Country).string())
                        .col(ColumnDef::new(Institutions::Website).string())
                        .col(created_at(Institutions::CreatedAt))
                        .col(created_at(Institutions::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Areas::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Areas::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Areas::Name).string().not_null())
                        .col(ColumnDef::new(Areas::Description).string())
                        .col(created_at(Areas::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Profiles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Profiles::FullName).string().not_null())
                        .col(ColumnDef::new(Profiles::Email).string().not_null().unique_key())
                        .col(
                            ColumnDef::new(Profiles::Role)
                                .string()
                                .not_null()
                                .default("user"),
                        )
                        .col(ColumnDef::new(Profiles::AreaId).uuid())
                        .col(created_at(Profiles::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_profiles_area")
                                .from(Profiles::Table, Profiles::AreaId)
                                .to(Areas::Table, Areas::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Profiles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Areas::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Institutions::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000002_create_agreements {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_agreements"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Agreements::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Agreements::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Agreements::Name).string().not_null())
                        .col(ColumnDef::new(Agreements::InstitutionId).uuid().not_null())
                        .col(ColumnDef::new(Agreements::SignatureDate).date())
                        .col(
                            ColumnDef::new(Agreements::DurationYears)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(ColumnDef::new(Agreements::ExpirationDate).date())
                        .col(ColumnDef::new(Agreements::Country).string())
                        .col(ColumnDef::new(Agreements::AgreementTypes).json().not_null())
                        .col(ColumnDef::new(Agreements::Objectives).text())
                        .col(ColumnDef::new(Agreements::Status).string().not_null())
                        .col(ColumnDef::new(Agreements::DocumentUrl).string())
                        .col(
                            ColumnDef::new(Agreements::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(created_at(Agreements::CreatedAt))
                        .col(created_at(Agreements::UpdatedAt))
                        .col(ColumnDef::new(Agreements::DeletedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_agreements_institution")
                                .from(Agreements::Table, Agreements::InstitutionId)
                                .to(Institutions::Table, Institutions::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_agreements_institution_id")
                        .table(Agreements::Table)
                        .col(Agreements::InstitutionId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AgreementAreas::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AgreementAreas::AgreementId).uuid().not_null())
                        .col(ColumnDef::new(AgreementAreas::AreaId).uuid().not_null())
                        .primary_key(
                            Index::create()
                                .col(AgreementAreas::AgreementId)
                                .col(AgreementAreas::AreaId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_agreement_areas_agreement")
                                .from(AgreementAreas::Table, AgreementAreas::AgreementId)
                                .to(Agreements::Table, Agreements::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_agreement_areas_area")
                                .from(AgreementAreas::Table, AgreementAreas::AreaId)
                                .to(Areas::Table, Areas::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AgreementSubtypes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AgreementSubtypes::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(AgreementSubtypes::AgreementId).uuid().not_null())
                        .col(ColumnDef::new(AgreementSubtypes::Name).string().not_null())
                        .col(ColumnDef::new(AgreementSubtypes::Description).string())
                        .col(created_at(AgreementSubtypes::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_agreement_subtypes_agreement")
                                .from(AgreementSubtypes::Table, AgreementSubtypes::AgreementId)
                                .to(Agreements::Table, Agreements::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AgreementResponsibles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AgreementResponsibles::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AgreementResponsibles::AgreementId).uuid())
                        .col(ColumnDef::new(AgreementResponsibles::SubtypeId).uuid())
                        .col(ColumnDef::new(AgreementResponsibles::ProfileId).uuid().not_null())
                        .col(ColumnDef::new(AgreementResponsibles::Kind).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_responsibles_agreement")
                                .from(AgreementResponsibles::Table, AgreementResponsibles::AgreementId)
                                .to(Agreements::Table, Agreements::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_responsibles_subtype")
                                .from(AgreementResponsibles::Table, AgreementResponsibles::SubtypeId)
                                .to(AgreementSubtypes::Table, AgreementSubtypes::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_responsibles_profile")
                                .from(AgreementResponsibles::Table, AgreementResponsibles::ProfileId)
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AgreementYears::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AgreementYears::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(AgreementYears::AgreementId).uuid().not_null())
                        .col(ColumnDef::new(AgreementYears::YearNumber).integer().not_null())
                        .col(ColumnDef::new(AgreementYears::YearStart).date().not_null())
                        .col(ColumnDef::new(AgreementYears::YearEnd).date().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_agreement_years_agreement")
                                .from(AgreementYears::Table, AgreementYears::AgreementId)
                                .to(Agreements::Table, Agreements::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_agreement_years_number")
                        .table(AgreementYears::Table)
                        .col(AgreementYears::AgreementId)
                        .col(AgreementYears::YearNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // No foreign key: the history outlives the agreement
            manager
                .create_table(
                    Table::create()
                        .table(AgreementRenewals::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AgreementRenewals::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(AgreementRenewals::AgreementId).uuid().not_null())
                        .col(ColumnDef::new(AgreementRenewals::OldExpirationDate).date())
                        .col(
                            ColumnDef::new(AgreementRenewals::NewExpirationDate)
                                .date()
                                .not_null(),
                        )
                        .col(created_at(AgreementRenewals::ChangedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_agreement_renewals_agreement_id")
                        .table(AgreementRenewals::Table)
                        .col(AgreementRenewals::AgreementId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                AgreementRenewals::Table.into_iden(),
                AgreementYears::Table.into_iden(),
                AgreementResponsibles::Table.into_iden(),
                AgreementSubtypes::Table.into_iden(),
                AgreementAreas::Table.into_iden(),
                Agreements::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }
}

mod m20250301_000003_create_compliance {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_compliance"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Contraprestaciones::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Contraprestaciones::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Contraprestaciones::AgreementId).uuid().not_null())
                        .col(ColumnDef::new(Contraprestaciones::Kind).string().not_null())
                        .col(ColumnDef::new(Contraprestaciones::Description).text().not_null())
                        .col(ColumnDef::new(Contraprestaciones::UnitsPerYear).integer())
                        .col(created_at(Contraprestaciones::CreatedAt))
                        .col(created_at(Contraprestaciones::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_contraprestaciones_agreement")
                                .from(Contraprestaciones::Table, Contraprestaciones::AgreementId)
                                .to(Agreements::Table, Agreements::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Seguimientos::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Seguimientos::Id).uuid().not_null().primary_key())
                        .col(
                            ColumnDef::new(Seguimientos::ContraprestacionId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Seguimientos::YearId).uuid())
                        .col(ColumnDef::new(Seguimientos::Status).string().not_null())
                        .col(ColumnDef::new(Seguimientos::EvidenceUrl).string())
                        .col(ColumnDef::new(Seguimientos::Notes).text())
                        .col(created_at(Seguimientos::RecordedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_seguimientos_contraprestacion")
                                .from(Seguimientos::Table, Seguimientos::ContraprestacionId)
                                .to(Contraprestaciones::Table, Contraprestaciones::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_seguimientos_year")
                                .from(Seguimientos::Table, Seguimientos::YearId)
                                .to(AgreementYears::Table, AgreementYears::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MobilityRecords::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(MobilityRecords::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(MobilityRecords::AgreementId).uuid().not_null())
                        .col(ColumnDef::new(MobilityRecords::ResponsibleId).uuid().not_null())
                        .col(ColumnDef::new(MobilityRecords::ParticipantName).string().not_null())
                        .col(ColumnDef::new(MobilityRecords::ParticipantKind).string().not_null())
                        .col(ColumnDef::new(MobilityRecords::Direction).string().not_null())
                        .col(ColumnDef::new(MobilityRecords::StartDate).date().not_null())
                        .col(ColumnDef::new(MobilityRecords::EndDate).date())
                        .col(
                            ColumnDef::new(MobilityRecords::ReportSubmitted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(MobilityRecords::ReportSubmittedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(ColumnDef::new(MobilityRecords::Notes).text())
                        .col(created_at(MobilityRecords::CreatedAt))
                        .col(created_at(MobilityRecords::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_mobility_agreement")
                                .from(MobilityRecords::Table, MobilityRecords::AgreementId)
                                .to(Agreements::Table, Agreements::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_mobility_responsible")
                                .from(MobilityRecords::Table, MobilityRecords::ResponsibleId)
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SemiannualReports::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SemiannualReports::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(SemiannualReports::AgreementId).uuid().not_null())
                        .col(ColumnDef::new(SemiannualReports::Year).integer().not_null())
                        .col(ColumnDef::new(SemiannualReports::Semester).small_integer().not_null())
                        .col(ColumnDef::new(SemiannualReports::Summary).text().not_null())
                        .col(ColumnDef::new(SemiannualReports::AuthorId).uuid())
                        .col(created_at(SemiannualReports::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reports_agreement")
                                .from(SemiannualReports::Table, SemiannualReports::AgreementId)
                                .to(Agreements::Table, Agreements::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reports_author")
                                .from(SemiannualReports::Table, SemiannualReports::AuthorId)
                                .to(Profiles::Table, Profiles::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_reports_period")
                        .table(SemiannualReports::Table)
                        .col(SemiannualReports::AgreementId)
                        .col(SemiannualReports::Year)
                        .col(SemiannualReports::Semester)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                SemiannualReports::Table.into_iden(),
                MobilityRecords::Table.into_iden(),
                Seguimientos::Table.into_iden(),
                Contraprestaciones::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }
}
