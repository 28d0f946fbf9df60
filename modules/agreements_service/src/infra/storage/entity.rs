//! SeaORM entities for database tables
//!
//! Enumerations are stored as lowercase strings and converted in mapper.rs.

/// Agreements table entity
pub mod agreement {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "agreements")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        pub institution_id: Uuid,
        pub signature_date: Option<Date>,
        pub duration_years: f64,
        pub expiration_date: Option<Date>,
        pub country: Option<String>,
        /// JSON array of type tags
        pub agreement_types: Json,
        pub objectives: Option<String>,
        pub status: String,
        pub document_url: Option<String>,
        pub version: i32,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        /// Soft delete timestamp
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// Counterpart institution
        #[sea_orm(
            belongs_to = "super::institution::Entity",
            from = "Column::InstitutionId",
            to = "super::institution::Column::Id"
        )]
        Institution,
        /// One-to-many relationship with contractual years
        #[sea_orm(has_many = "super::agreement_year::Entity")]
        Years,
    }

    impl Related<super::institution::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Institution.def()
        }
    }

    impl Related<super::agreement_year::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Years.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Agreement to area association
pub mod agreement_area {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "agreement_areas")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub agreement_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub area_id: Uuid,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Agreement subtypes
pub mod agreement_subtype {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "agreement_subtypes")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub agreement_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Responsible parties of agreements and subtypes
///
/// Exactly one of `agreement_id` and `subtype_id` is set.
pub mod responsible {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "agreement_responsibles")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub agreement_id: Option<Uuid>,
        pub subtype_id: Option<Uuid>,
        pub profile_id: Uuid,
        pub kind: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Contractual years
pub mod agreement_year {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "agreement_years")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub agreement_id: Uuid,
        pub year_number: i32,
        pub year_start: Date,
        pub year_end: Date,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::agreement::Entity",
            from = "Column::AgreementId",
            to = "super::agreement::Column::Id"
        )]
        Agreement,
    }

    impl Related<super::agreement::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Agreement.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Renewal history; no foreign key so rows outlive their agreement
pub mod renewal {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "agreement_renewals")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub agreement_id: Uuid,
        pub old_expiration_date: Option<Date>,
        pub new_expiration_date: Date,
        pub changed_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Deliverables owed under an agreement
pub mod contraprestacion {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "contraprestaciones")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub agreement_id: Uuid,
        pub kind: String,
        pub description: String,
        pub units_per_year: Option<i32>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// One-to-many relationship with tracking rows
        #[sea_orm(has_many = "super::seguimiento::Entity")]
        Seguimientos,
    }

    impl Related<super::seguimiento::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Seguimientos.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Tracking rows of deliverables
pub mod seguimiento {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "seguimientos")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub contraprestacion_id: Uuid,
        pub year_id: Option<Uuid>,
        pub status: String,
        pub evidence_url: Option<String>,
        pub notes: Option<String>,
        pub recorded_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::contraprestacion::Entity",
            from = "Column::ContraprestacionId",
            to = "super::contraprestacion::Column::Id"
        )]
        Contraprestacion,
    }

    impl Related<super::contraprestacion::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Contraprestacion.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Mobility records
pub mod mobility {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "mobility_records")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub agreement_id: Uuid,
        pub responsible_id: Uuid,
        pub participant_name: String,
        pub participant_kind: String,
        pub direction: String,
        pub start_date: Date,
        pub end_date: Option<Date>,
        pub report_submitted: bool,
        pub report_submitted_at: Option<DateTimeUtc>,
        pub notes: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Semi-annual reports
pub mod report {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "semiannual_reports")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub agreement_id: Uuid,
        pub year: i32,
        pub semester: i16,
        #[sea_orm(column_type = "Text")]
        pub summary: String,
        pub author_id: Option<Uuid>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Counterpart institutions
pub mod institution {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "institutions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        pub country: Option<String>,
        pub website: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::agreement::Entity")]
        Agreements,
    }

    impl Related<super::agreement::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Agreements.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Organisational areas
pub mod area {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "areas")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// User profiles
pub mod profile {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "profiles")]
    pub struct Model {
        /// Same id as the auth provider account
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub full_name: String,
        #[sea_orm(unique)]
        pub email: String,
        pub role: String,
        pub area_id: Option<Uuid>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
