//! SeaORM repository implementations
//!
//! Multi-step writes run inside a single transaction and touch only that
//! transaction, so a failure leaves no partial state behind.

use crate::contract::{
    Agreement, AgreementFilter, AgreementSubtype, AgreementYear, Area, Contraprestacion,
    Institution, MobilityRecord, Profile, Renewal, ResponsibleLink, ResponsibleTarget,
    Seguimiento, SemiannualReport,
};
use crate::domain::repository::{AgreementRepository, CatalogRepository, ComplianceRepository};
use crate::domain::years::YearPlan;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    prelude::Expr, sea_query::Func, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entity;

fn convert_all<M, T>(rows: Vec<M>) -> Result<Vec<T>>
where
    T: TryFrom<M, Error = anyhow::Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ===== Agreement Repository =====

pub struct SeaOrmAgreementRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAgreementRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

async fn insert_area_links<C: ConnectionTrait>(
    conn: &C,
    agreement_id: Uuid,
    area_ids: &[Uuid],
) -> Result<()> {
    if area_ids.is_empty() {
        return Ok(());
    }
    let rows = area_ids.iter().map(|&area_id| entity::agreement_area::ActiveModel {
        agreement_id: Set(agreement_id),
        area_id: Set(area_id),
    });
    entity::agreement_area::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn insert_responsibles<C: ConnectionTrait>(conn: &C, links: &[ResponsibleLink]) -> Result<()> {
    if links.is_empty() {
        return Ok(());
    }
    let rows = links.iter().map(entity::responsible::ActiveModel::from);
    entity::responsible::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn delete_responsibles<C: ConnectionTrait>(conn: &C, target: ResponsibleTarget) -> Result<()> {
    let query = entity::responsible::Entity::delete_many();
    let query = match target {
        ResponsibleTarget::Agreement(id) => {
            query.filter(entity::responsible::Column::AgreementId.eq(id))
        }
        ResponsibleTarget::Subtype(id) => query.filter(entity::responsible::Column::SubtypeId.eq(id)),
    };
    query.exec(conn).await?;
    Ok(())
}

#[async_trait]
impl AgreementRepository for SeaOrmAgreementRepository {
    async fn create_agreement(
        &self,
        agreement: &Agreement,
        area_ids: &[Uuid],
        responsibles: &[ResponsibleLink],
    ) -> Result<Agreement> {
        let txn = self.db.begin().await?;

        let created = entity::agreement::ActiveModel::from(agreement)
            .insert(&txn)
            .await?;
        insert_area_links(&txn, agreement.id, area_ids).await?;
        insert_responsibles(&txn, responsibles).await?;

        txn.commit().await?;
        created.try_into()
    }

    async fn update_agreement(
        &self,
        agreement: &Agreement,
        area_ids: &[Uuid],
        responsibles: &[ResponsibleLink],
    ) -> Result<Agreement> {
        let txn = self.db.begin().await?;

        let updated = entity::agreement::ActiveModel::from(agreement)
            .update(&txn)
            .await?;

        entity::agreement_area::Entity::delete_many()
            .filter(entity::agreement_area::Column::AgreementId.eq(agreement.id))
            .exec(&txn)
            .await?;
        insert_area_links(&txn, agreement.id, area_ids).await?;

        delete_responsibles(&txn, ResponsibleTarget::Agreement(agreement.id)).await?;
        insert_responsibles(&txn, responsibles).await?;

        txn.commit().await?;
        updated.try_into()
    }

    async fn find_agreement(&self, id: Uuid) -> Result<Option<Agreement>> {
        let result = entity::agreement::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;

        result.map(Agreement::try_from).transpose()
    }

    async fn list_agreements(&self, filter: &AgreementFilter) -> Result<Vec<Agreement>> {
        let mut query = entity::agreement::Entity::find();

        if !filter.include_deleted {
            query = query.filter(entity::agreement::Column::DeletedAt.is_null());
        }
        if let Some(status) = filter.status {
            query = query.filter(entity::agreement::Column::Status.eq(status.as_str()));
        }
        if let Some(institution_id) = filter.institution_id {
            query = query.filter(entity::agreement::Column::InstitutionId.eq(institution_id));
        }
        if let Some(country) = &filter.country {
            query = query.filter(entity::agreement::Column::Country.eq(country.as_str()));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(entity::agreement::Column::Name))).like(pattern),
            );
        }

        let results = query
            .order_by_asc(entity::agreement::Column::Name)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }

    async fn soft_delete_agreement(&self, id: Uuid, deleted_at: DateTime<Utc>) -> Result<()> {
        entity::agreement::Entity::update_many()
            .col_expr(entity::agreement::Column::DeletedAt, Expr::value(deleted_at))
            .col_expr(entity::agreement::Column::UpdatedAt, Expr::value(deleted_at))
            .filter(entity::agreement::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        Ok(())
    }

    async fn count_by_institution(&self, institution_id: Uuid) -> Result<u64> {
        let count = entity::agreement::Entity::find()
            .filter(entity::agreement::Column::InstitutionId.eq(institution_id))
            .count(&*self.db)
            .await?;

        Ok(count)
    }

    async fn count_by_area(&self, area_id: Uuid) -> Result<u64> {
        let count = entity::agreement_area::Entity::find()
            .filter(entity::agreement_area::Column::AreaId.eq(area_id))
            .count(&*self.db)
            .await?;

        Ok(count)
    }

    async fn list_area_ids(&self, agreement_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = entity::agreement_area::Entity::find()
            .filter(entity::agreement_area::Column::AgreementId.eq(agreement_id))
            .order_by_asc(entity::agreement_area::Column::AreaId)
            .all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.area_id).collect())
    }

    async fn list_responsibles(&self, target: ResponsibleTarget) -> Result<Vec<ResponsibleLink>> {
        let query = entity::responsible::Entity::find();
        let query = match target {
            ResponsibleTarget::Agreement(id) => {
                query.filter(entity::responsible::Column::AgreementId.eq(id))
            }
            ResponsibleTarget::Subtype(id) => {
                query.filter(entity::responsible::Column::SubtypeId.eq(id))
            }
        };
        let results = query
            .order_by_asc(entity::responsible::Column::Kind)
            .order_by_asc(entity::responsible::Column::ProfileId)
            .all(&*self.db)
            .await?;

        convert_all(results)
    }

    async fn replace_responsibles(
        &self,
        target: ResponsibleTarget,
        links: &[ResponsibleLink],
    ) -> Result<()> {
        let txn = self.db.begin().await?;
        delete_responsibles(&txn, target).await?;
        insert_responsibles(&txn, links).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn count_responsible_links(&self, profile_id: Uuid) -> Result<u64> {
        let count = entity::responsible::Entity::find()
            .filter(entity::responsible::Column::ProfileId.eq(profile_id))
            .count(&*self.db)
            .await?;

        Ok(count)
    }

    async fn create_subtype(&self, subtype: &AgreementSubtype) -> Result<AgreementSubtype> {
        let created = entity::agreement_subtype::ActiveModel::from(subtype)
            .insert(&*self.db)
            .await?;

        Ok(created.into())
    }

    async fn find_subtype(&self, id: Uuid) -> Result<Option<AgreementSubtype>> {
        let result = entity::agreement_subtype::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn list_subtypes(&self, agreement_id: Uuid) -> Result<Vec<AgreementSubtype>> {
        let results = entity::agreement_subtype::Entity::find()
            .filter(entity::agreement_subtype::Column::AgreementId.eq(agreement_id))
            .order_by_asc(entity::agreement_subtype::Column::Name)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_subtype(&self, id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;
        delete_responsibles(&txn, ResponsibleTarget::Subtype(id)).await?;
        entity::agreement_subtype::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn list_years(&self, agreement_id: Uuid) -> Result<Vec<AgreementYear>> {
        let results = entity::agreement_year::Entity::find()
            .filter(entity::agreement_year::Column::AgreementId.eq(agreement_id))
            .order_by_asc(entity::agreement_year::Column::YearNumber)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn apply_year_plan(&self, agreement_id: Uuid, plan: &YearPlan) -> Result<()> {
        let txn = self.db.begin().await?;

        if !plan.delete.is_empty() {
            entity::agreement_year::Entity::delete_many()
                .filter(entity::agreement_year::Column::AgreementId.eq(agreement_id))
                .filter(entity::agreement_year::Column::Id.is_in(plan.delete.iter().copied()))
                .exec(&txn)
                .await?;
        }

        for year in &plan.update {
            entity::agreement_year::ActiveModel::from(year)
                .update(&txn)
                .await?;
        }

        if !plan.insert.is_empty() {
            let rows = plan.insert.iter().map(|span| entity::agreement_year::ActiveModel {
                id: Set(Uuid::new_v4()),
                agreement_id: Set(agreement_id),
                year_number: Set(span.year_number),
                year_start: Set(span.start),
                year_end: Set(span.end),
            });
            entity::agreement_year::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn record_renewal(&self, renewal: &Renewal, version: i32) -> Result<Agreement> {
        let txn = self.db.begin().await?;

        entity::renewal::ActiveModel::from(renewal)
            .insert(&txn)
            .await?;

        let current = entity::agreement::Entity::find_by_id(renewal.agreement_id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow!("agreement {} disappeared during renewal", renewal.agreement_id))?;

        let mut active: entity::agreement::ActiveModel = current.into();
        active.expiration_date = Set(Some(renewal.new_expiration_date));
        active.version = Set(version);
        active.updated_at = Set(renewal.changed_at);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        updated.try_into()
    }

    async fn list_renewals(&self, agreement_id: Uuid) -> Result<Vec<Renewal>> {
        let results = entity::renewal::Entity::find()
            .filter(entity::renewal::Column::AgreementId.eq(agreement_id))
            .order_by_desc(entity::renewal::Column::ChangedAt)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }
}

// ===== Catalog Repository =====

pub struct SeaOrmCatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn create_institution(&self, institution: &Institution) -> Result<Institution> {
        let created = entity::institution::ActiveModel::from(institution)
            .insert(&*self.db)
            .await?;
        Ok(created.into())
    }

    async fn find_institution(&self, id: Uuid) -> Result<Option<Institution>> {
        let result = entity::institution::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        let results = entity::institution::Entity::find()
            .order_by_asc(entity::institution::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_institution(&self, institution: &Institution) -> Result<Institution> {
        let updated = entity::institution::ActiveModel::from(institution)
            .update(&*self.db)
            .await?;
        Ok(updated.into())
    }

    async fn delete_institution(&self, id: Uuid) -> Result<()> {
        entity::institution::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn create_area(&self, area: &Area) -> Result<Area> {
        let created = entity::area::ActiveModel::from(area)
            .insert(&*self.db)
            .await?;
        Ok(created.into())
    }

    async fn find_area(&self, id: Uuid) -> Result<Option<Area>> {
        let result = entity::area::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list_areas(&self) -> Result<Vec<Area>> {
        let results = entity::area::Entity::find()
            .order_by_asc(entity::area::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_area(&self, area: &Area) -> Result<Area> {
        let updated = entity::area::ActiveModel::from(area)
            .update(&*self.db)
            .await?;
        Ok(updated.into())
    }

    async fn delete_area(&self, id: Uuid) -> Result<()> {
        entity::area::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }

    async fn create_profile(&self, profile: &Profile) -> Result<Profile> {
        let created = entity::profile::ActiveModel::from(profile)
            .insert(&*self.db)
            .await?;
        created.try_into()
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let result = entity::profile::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        result.map(Profile::try_from).transpose()
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let result = entity::profile::Entity::find()
            .filter(entity::profile::Column::Email.eq(email))
            .one(&*self.db)
            .await?;
        result.map(Profile::try_from).transpose()
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let results = entity::profile::Entity::find()
            .order_by_asc(entity::profile::Column::FullName)
            .all(&*self.db)
            .await?;
        convert_all(results)
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        let updated = entity::profile::ActiveModel::from(profile)
            .update(&*self.db)
            .await?;
        updated.try_into()
    }

    async fn delete_profile(&self, id: Uuid) -> Result<()> {
        entity::profile::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}

// ===== Compliance Repository =====

pub struct SeaOrmComplianceRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmComplianceRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ComplianceRepository for SeaOrmComplianceRepository {
    async fn create_contraprestacion(&self, item: &Contraprestacion) -> Result<Contraprestacion> {
        let created = entity::contraprestacion::ActiveModel::from(item)
            .insert(&*self.db)
            .await?;
        Ok(created.into())
    }

    async fn find_contraprestacion(&self, id: Uuid) -> Result<Option<Contraprestacion>> {
        let result = entity::contraprestacion::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_contraprestaciones(&self, agreement_id: Uuid) -> Result<Vec<Contraprestacion>> {
        let results = entity::contraprestacion::Entity::find()
            .filter(entity::contraprestacion::Column::AgreementId.eq(agreement_id))
            .order_by_asc(entity::contraprestacion::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list_all_contraprestaciones(&self) -> Result<Vec<Contraprestacion>> {
        let results = entity::contraprestacion::Entity::find().all(&*self.db).await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_contraprestacion(&self, item: &Contraprestacion) -> Result<Contraprestacion> {
        let updated = entity::contraprestacion::ActiveModel::from(item)
            .update(&*self.db)
            .await?;
        Ok(updated.into())
    }

    async fn delete_contraprestacion(&self, id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;
        entity::seguimiento::Entity::delete_many()
            .filter(entity::seguimiento::Column::ContraprestacionId.eq(id))
            .exec(&txn)
            .await?;
        entity::contraprestacion::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn create_seguimiento(&self, item: &Seguimiento) -> Result<Seguimiento> {
        let created = entity::seguimiento::ActiveModel::from(item)
            .insert(&*self.db)
            .await?;
        created.try_into()
    }

    async fn find_seguimiento(&self, id: Uuid) -> Result<Option<Seguimiento>> {
        let result = entity::seguimiento::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        result.map(Seguimiento::try_from).transpose()
    }

    async fn list_seguimientos(&self, contraprestacion_id: Uuid) -> Result<Vec<Seguimiento>> {
        let results = entity::seguimiento::Entity::find()
            .filter(entity::seguimiento::Column::ContraprestacionId.eq(contraprestacion_id))
            .order_by_desc(entity::seguimiento::Column::RecordedAt)
            .all(&*self.db)
            .await?;
        convert_all(results)
    }

    async fn list_all_seguimientos(&self) -> Result<Vec<Seguimiento>> {
        let results = entity::seguimiento::Entity::find().all(&*self.db).await?;
        convert_all(results)
    }

    async fn update_seguimiento(&self, item: &Seguimiento) -> Result<Seguimiento> {
        let updated = entity::seguimiento::ActiveModel::from(item)
            .update(&*self.db)
            .await?;
        updated.try_into()
    }

    async fn delete_seguimiento(&self, id: Uuid) -> Result<()> {
        entity::seguimiento::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn create_mobility(&self, record: &MobilityRecord) -> Result<MobilityRecord> {
        let created = entity::mobility::ActiveModel::from(record)
            .insert(&*self.db)
            .await?;
        created.try_into()
    }

    async fn find_mobility(&self, id: Uuid) -> Result<Option<MobilityRecord>> {
        let result = entity::mobility::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        result.map(MobilityRecord::try_from).transpose()
    }

    async fn list_mobility(&self, agreement_id: Option<Uuid>) -> Result<Vec<MobilityRecord>> {
        let mut query = entity::mobility::Entity::find();
        if let Some(agreement_id) = agreement_id {
            query = query.filter(entity::mobility::Column::AgreementId.eq(agreement_id));
        }
        let results = query
            .order_by_desc(entity::mobility::Column::StartDate)
            .all(&*self.db)
            .await?;
        convert_all(results)
    }

    async fn update_mobility(&self, record: &MobilityRecord) -> Result<MobilityRecord> {
        let updated = entity::mobility::ActiveModel::from(record)
            .update(&*self.db)
            .await?;
        updated.try_into()
    }

    async fn delete_mobility(&self, id: Uuid) -> Result<()> {
        entity::mobility::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn count_mobility_by_responsible(&self, profile_id: Uuid) -> Result<u64> {
        let count = entity::mobility::Entity::find()
            .filter(entity::mobility::Column::ResponsibleId.eq(profile_id))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn create_report(&self, report: &SemiannualReport) -> Result<SemiannualReport> {
        let created = entity::report::ActiveModel::from(report)
            .insert(&*self.db)
            .await?;
        created.try_into()
    }

    async fn find_report(&self, id: Uuid) -> Result<Option<SemiannualReport>> {
        let result = entity::report::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        result.map(SemiannualReport::try_from).transpose()
    }

    async fn find_report_by_period(
        &self,
        agreement_id: Uuid,
        year: i32,
        semester: u8,
    ) -> Result<Option<SemiannualReport>> {
        let result = entity::report::Entity::find()
            .filter(entity::report::Column::AgreementId.eq(agreement_id))
            .filter(entity::report::Column::Year.eq(year))
            .filter(entity::report::Column::Semester.eq(i16::from(semester)))
            .one(&*self.db)
            .await?;
        result.map(SemiannualReport::try_from).transpose()
    }

    async fn list_reports(&self, agreement_id: Uuid) -> Result<Vec<SemiannualReport>> {
        let results = entity::report::Entity::find()
            .filter(entity::report::Column::AgreementId.eq(agreement_id))
            .order_by_desc(entity::report::Column::Year)
            .order_by_desc(entity::report::Column::Semester)
            .all(&*self.db)
            .await?;
        convert_all(results)
    }

    async fn delete_report(&self, id: Uuid) -> Result<()> {
        entity::report::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}
