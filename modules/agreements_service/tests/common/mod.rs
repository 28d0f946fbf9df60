//! Common test utilities: in-memory repositories and fixtures
#![allow(dead_code)]

use agreements_service::config::AgreementsConfig;
use agreements_service::contract::*;
use agreements_service::domain::repository::{
    AgreementRepository, CatalogRepository, ComplianceRepository,
};
use agreements_service::domain::{NoOpEventPublisher, Service, YearPlan};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ===== Agreements =====

#[derive(Default)]
struct AgreementState {
    agreements: HashMap<Uuid, Agreement>,
    areas: HashMap<Uuid, Vec<Uuid>>,
    responsibles: Vec<ResponsibleLink>,
    subtypes: HashMap<Uuid, AgreementSubtype>,
    years: HashMap<Uuid, AgreementYear>,
    renewals: Vec<Renewal>,
}

#[derive(Clone, Default)]
pub struct MockAgreementRepo {
    state: Arc<RwLock<AgreementState>>,
    year_writes: Arc<AtomicUsize>,
}

impl MockAgreementRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `apply_year_plan` calls so far
    pub fn year_writes(&self) -> usize {
        self.year_writes.load(Ordering::SeqCst)
    }

    pub fn year_rows(&self, agreement_id: Uuid) -> Vec<AgreementYear> {
        let mut rows: Vec<AgreementYear> = self
            .state
            .read()
            .years
            .values()
            .filter(|y| y.agreement_id == agreement_id)
            .cloned()
            .collect();
        rows.sort_by_key(|y| y.year_number);
        rows
    }

    /// Insert a year row behind the service's back
    pub fn insert_year_row(&self, row: AgreementYear) {
        self.state.write().years.insert(row.id, row);
    }

    pub fn print_state(&self, context: &str) {
        let state = self.state.read();
        println!("\n========== AgreementRepository State: {} ==========", context);
        println!("Agreements: {}", state.agreements.len());
        for agreement in state.agreements.values() {
            println!(
                "  {} '{}' v{} signed {:?} for {} years, expires {:?}, deleted {:?}",
                agreement.id,
                agreement.name,
                agreement.version,
                agreement.signature_date,
                agreement.duration_years,
                agreement.expiration_date,
                agreement.deleted_at
            );
        }
        println!("Years: {}", state.years.len());
        println!("Renewals: {}", state.renewals.len());
        println!("====================================================\n");
    }
}

#[async_trait]
impl AgreementRepository for MockAgreementRepo {
    async fn create_agreement(
        &self,
        agreement: &Agreement,
        area_ids: &[Uuid],
        responsibles: &[ResponsibleLink],
    ) -> anyhow::Result<Agreement> {
        let mut state = self.state.write();
        state.agreements.insert(agreement.id, agreement.clone());
        state.areas.insert(agreement.id, area_ids.to_vec());
        state.responsibles.extend(responsibles.iter().cloned());
        Ok(agreement.clone())
    }

    async fn update_agreement(
        &self,
        agreement: &Agreement,
        area_ids: &[Uuid],
        responsibles: &[ResponsibleLink],
    ) -> anyhow::Result<Agreement> {
        let mut state = self.state.write();
        state.agreements.insert(agreement.id, agreement.clone());
        state.areas.insert(agreement.id, area_ids.to_vec());
        let target = ResponsibleTarget::Agreement(agreement.id);
        state.responsibles.retain(|link| link.target != target);
        state.responsibles.extend(responsibles.iter().cloned());
        Ok(agreement.clone())
    }

    async fn find_agreement(&self, id: Uuid) -> anyhow::Result<Option<Agreement>> {
        Ok(self.state.read().agreements.get(&id).cloned())
    }

    async fn list_agreements(&self, filter: &AgreementFilter) -> anyhow::Result<Vec<Agreement>> {
        let state = self.state.read();
        let mut result: Vec<Agreement> = state
            .agreements
            .values()
            .filter(|a| filter.include_deleted || a.deleted_at.is_none())
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .filter(|a| filter.institution_id.map_or(true, |i| a.institution_id == i))
            .filter(|a| {
                filter
                    .country
                    .as_ref()
                    .map_or(true, |c| a.country.as_ref() == Some(c))
            })
            .filter(|a| {
                filter
                    .search
                    .as_ref()
                    .map_or(true, |s| a.name.to_lowercase().contains(&s.to_lowercase()))
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn soft_delete_agreement(&self, id: Uuid, deleted_at: DateTime<Utc>) -> anyhow::Result<()> {
        if let Some(agreement) = self.state.write().agreements.get_mut(&id) {
            agreement.deleted_at = Some(deleted_at);
        }
        Ok(())
    }

    async fn count_by_institution(&self, institution_id: Uuid) -> anyhow::Result<u64> {
        Ok(self
            .state
            .read()
            .agreements
            .values()
            .filter(|a| a.institution_id == institution_id)
            .count() as u64)
    }

    async fn count_by_area(&self, area_id: Uuid) -> anyhow::Result<u64> {
        Ok(self
            .state
            .read()
            .areas
            .values()
            .filter(|ids| ids.contains(&area_id))
            .count() as u64)
    }

    async fn list_area_ids(&self, agreement_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        Ok(self
            .state
            .read()
            .areas
            .get(&agreement_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_responsibles(
        &self,
        target: ResponsibleTarget,
    ) -> anyhow::Result<Vec<ResponsibleLink>> {
        Ok(self
            .state
            .read()
            .responsibles
            .iter()
            .filter(|link| link.target == target)
            .cloned()
            .collect())
    }

    async fn replace_responsibles(
        &self,
        target: ResponsibleTarget,
        links: &[ResponsibleLink],
    ) -> anyhow::Result<()> {
        let mut state = self.state.write();
        state.responsibles.retain(|link| link.target != target);
        state.responsibles.extend(links.iter().cloned());
        Ok(())
    }

    async fn count_responsible_links(&self, profile_id: Uuid) -> anyhow::Result<u64> {
        Ok(self
            .state
            .read()
            .responsibles
            .iter()
            .filter(|link| link.profile_id == profile_id)
            .count() as u64)
    }

    async fn create_subtype(&self, subtype: &AgreementSubtype) -> anyhow::Result<AgreementSubtype> {
        self.state
            .write()
            .subtypes
            .insert(subtype.id, subtype.clone());
        Ok(subtype.clone())
    }

    async fn find_subtype(&self, id: Uuid) -> anyhow::Result<Option<AgreementSubtype>> {
        Ok(self.state.read().subtypes.get(&id).cloned())
    }

    async fn list_subtypes(&self, agreement_id: Uuid) -> anyhow::Result<Vec<AgreementSubtype>> {
        let mut subtypes: Vec<AgreementSubtype> = self
            .state
            .read()
            .subtypes
            .values()
            .filter(|s| s.agreement_id == agreement_id)
            .cloned()
            .collect();
        subtypes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subtypes)
    }

    async fn delete_subtype(&self, id: Uuid) -> anyhow::Result<()> {
        let mut state = self.state.write();
        state.subtypes.remove(&id);
        state
            .responsibles
            .retain(|link| link.target != ResponsibleTarget::Subtype(id));
        Ok(())
    }

    async fn list_years(&self, agreement_id: Uuid) -> anyhow::Result<Vec<AgreementYear>> {
        Ok(self.year_rows(agreement_id))
    }

    async fn apply_year_plan(&self, agreement_id: Uuid, plan: &YearPlan) -> anyhow::Result<()> {
        self.year_writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write();
        for id in &plan.delete {
            state.years.remove(id);
        }
        for row in &plan.update {
            state.years.insert(row.id, row.clone());
        }
        for span in &plan.insert {
            let row = AgreementYear {
                id: Uuid::new_v4(),
                agreement_id,
                year_number: span.year_number,
                year_start: span.start,
                year_end: span.end,
            };
            state.years.insert(row.id, row);
        }
        Ok(())
    }

    async fn record_renewal(&self, renewal: &Renewal, version: i32) -> anyhow::Result<Agreement> {
        let mut state = self.state.write();
        state.renewals.push(renewal.clone());
        let agreement = state
            .agreements
            .get_mut(&renewal.agreement_id)
            .ok_or_else(|| anyhow::anyhow!("agreement {} vanished", renewal.agreement_id))?;
        agreement.expiration_date = Some(renewal.new_expiration_date);
        agreement.version = version;
        agreement.updated_at = renewal.changed_at;
        Ok(agreement.clone())
    }

    async fn list_renewals(&self, agreement_id: Uuid) -> anyhow::Result<Vec<Renewal>> {
        let mut renewals: Vec<Renewal> = self
            .state
            .read()
            .renewals
            .iter()
            .filter(|r| r.agreement_id == agreement_id)
            .cloned()
            .collect();
        renewals.reverse();
        Ok(renewals)
    }
}

// ===== Catalog =====

#[derive(Default)]
struct CatalogState {
    institutions: HashMap<Uuid, Institution>,
    areas: HashMap<Uuid, Area>,
    profiles: HashMap<Uuid, Profile>,
}

#[derive(Clone, Default)]
pub struct MockCatalogRepo {
    state: Arc<RwLock<CatalogState>>,
    fail_profile_inserts: Arc<AtomicBool>,
}

impl MockCatalogRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `create_profile` fail like a storage error
    pub fn fail_profile_inserts(&self) {
        self.fail_profile_inserts.store(true, Ordering::SeqCst);
    }

    pub fn profile_count(&self) -> usize {
        self.state.read().profiles.len()
    }
}

#[async_trait]
impl CatalogRepository for MockCatalogRepo {
    async fn create_institution(&self, institution: &Institution) -> anyhow::Result<Institution> {
        self.state
            .write()
            .institutions
            .insert(institution.id, institution.clone());
        Ok(institution.clone())
    }

    async fn find_institution(&self, id: Uuid) -> anyhow::Result<Option<Institution>> {
        Ok(self.state.read().institutions.get(&id).cloned())
    }

    async fn list_institutions(&self) -> anyhow::Result<Vec<Institution>> {
        let mut items: Vec<Institution> =
            self.state.read().institutions.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn update_institution(&self, institution: &Institution) -> anyhow::Result<Institution> {
        self.create_institution(institution).await
    }

    async fn delete_institution(&self, id: Uuid) -> anyhow::Result<()> {
        self.state.write().institutions.remove(&id);
        Ok(())
    }

    async fn create_area(&self, area: &Area) -> anyhow::Result<Area> {
        self.state.write().areas.insert(area.id, area.clone());
        Ok(area.clone())
    }

    async fn find_area(&self, id: Uuid) -> anyhow::Result<Option<Area>> {
        Ok(self.state.read().areas.get(&id).cloned())
    }

    async fn list_areas(&self) -> anyhow::Result<Vec<Area>> {
        let mut items: Vec<Area> = self.state.read().areas.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn update_area(&self, area: &Area) -> anyhow::Result<Area> {
        self.create_area(area).await
    }

    async fn delete_area(&self, id: Uuid) -> anyhow::Result<()> {
        self.state.write().areas.remove(&id);
        Ok(())
    }

    async fn create_profile(&self, profile: &Profile) -> anyhow::Result<Profile> {
        if self.fail_profile_inserts.load(Ordering::SeqCst) {
            anyhow::bail!("simulated profile insert failure");
        }
        self.state
            .write()
            .profiles
            .insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn find_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        Ok(self.state.read().profiles.get(&id).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> anyhow::Result<Option<Profile>> {
        Ok(self
            .state
            .read()
            .profiles
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn list_profiles(&self) -> anyhow::Result<Vec<Profile>> {
        let mut items: Vec<Profile> = self.state.read().profiles.values().cloned().collect();
        items.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(items)
    }

    async fn update_profile(&self, profile: &Profile) -> anyhow::Result<Profile> {
        self.state
            .write()
            .profiles
            .insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> anyhow::Result<()> {
        self.state.write().profiles.remove(&id);
        Ok(())
    }
}

// ===== Compliance =====

#[derive(Default)]
struct ComplianceState {
    contraprestaciones: HashMap<Uuid, Contraprestacion>,
    seguimientos: HashMap<Uuid, Seguimiento>,
    mobility: HashMap<Uuid, MobilityRecord>,
    reports: HashMap<Uuid, SemiannualReport>,
}

#[derive(Clone, Default)]
pub struct MockComplianceRepo {
    state: Arc<RwLock<ComplianceState>>,
}

impl MockComplianceRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seguimiento_count(&self) -> usize {
        self.state.read().seguimientos.len()
    }
}

#[async_trait]
impl ComplianceRepository for MockComplianceRepo {
    async fn create_contraprestacion(
        &self,
        item: &Contraprestacion,
    ) -> anyhow::Result<Contraprestacion> {
        self.state
            .write()
            .contraprestaciones
            .insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn find_contraprestacion(&self, id: Uuid) -> anyhow::Result<Option<Contraprestacion>> {
        Ok(self.state.read().contraprestaciones.get(&id).cloned())
    }

    async fn list_contraprestaciones(
        &self,
        agreement_id: Uuid,
    ) -> anyhow::Result<Vec<Contraprestacion>> {
        Ok(self
            .state
            .read()
            .contraprestaciones
            .values()
            .filter(|c| c.agreement_id == agreement_id)
            .cloned()
            .collect())
    }

    async fn list_all_contraprestaciones(&self) -> anyhow::Result<Vec<Contraprestacion>> {
        Ok(self.state.read().contraprestaciones.values().cloned().collect())
    }

    async fn update_contraprestacion(
        &self,
        item: &Contraprestacion,
    ) -> anyhow::Result<Contraprestacion> {
        self.create_contraprestacion(item).await
    }

    async fn delete_contraprestacion(&self, id: Uuid) -> anyhow::Result<()> {
        let mut state = self.state.write();
        state.contraprestaciones.remove(&id);
        state.seguimientos.retain(|_, s| s.contraprestacion_id != id);
        Ok(())
    }

    async fn create_seguimiento(&self, item: &Seguimiento) -> anyhow::Result<Seguimiento> {
        self.state
            .write()
            .seguimientos
            .insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn find_seguimiento(&self, id: Uuid) -> anyhow::Result<Option<Seguimiento>> {
        Ok(self.state.read().seguimientos.get(&id).cloned())
    }

    async fn list_seguimientos(&self, contraprestacion_id: Uuid) -> anyhow::Result<Vec<Seguimiento>> {
        let mut items: Vec<Seguimiento> = self
            .state
            .read()
            .seguimientos
            .values()
            .filter(|s| s.contraprestacion_id == contraprestacion_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(items)
    }

    async fn list_all_seguimientos(&self) -> anyhow::Result<Vec<Seguimiento>> {
        Ok(self.state.read().seguimientos.values().cloned().collect())
    }

    async fn update_seguimiento(&self, item: &Seguimiento) -> anyhow::Result<Seguimiento> {
        self.create_seguimiento(item).await
    }

    async fn delete_seguimiento(&self, id: Uuid) -> anyhow::Result<()> {
        self.state.write().seguimientos.remove(&id);
        Ok(())
    }

    async fn create_mobility(&self, record: &MobilityRecord) -> anyhow::Result<MobilityRecord> {
        self.state
            .write()
            .mobility
            .insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn find_mobility(&self, id: Uuid) -> anyhow::Result<Option<MobilityRecord>> {
        Ok(self.state.read().mobility.get(&id).cloned())
    }

    async fn list_mobility(&self, agreement_id: Option<Uuid>) -> anyhow::Result<Vec<MobilityRecord>> {
        let mut items: Vec<MobilityRecord> = self
            .state
            .read()
            .mobility
            .values()
            .filter(|m| agreement_id.map_or(true, |id| m.agreement_id == id))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(items)
    }

    async fn update_mobility(&self, record: &MobilityRecord) -> anyhow::Result<MobilityRecord> {
        self.create_mobility(record).await
    }

    async fn delete_mobility(&self, id: Uuid) -> anyhow::Result<()> {
        self.state.write().mobility.remove(&id);
        Ok(())
    }

    async fn count_mobility_by_responsible(&self, profile_id: Uuid) -> anyhow::Result<u64> {
        Ok(self
            .state
            .read()
            .mobility
            .values()
            .filter(|m| m.responsible_id == profile_id)
            .count() as u64)
    }

    async fn create_report(&self, report: &SemiannualReport) -> anyhow::Result<SemiannualReport> {
        self.state
            .write()
            .reports
            .insert(report.id, report.clone());
        Ok(report.clone())
    }

    async fn find_report(&self, id: Uuid) -> anyhow::Result<Option<SemiannualReport>> {
        Ok(self.state.read().reports.get(&id).cloned())
    }

    async fn find_report_by_period(
        &self,
        agreement_id: Uuid,
        year: i32,
        semester: u8,
    ) -> anyhow::Result<Option<SemiannualReport>> {
        Ok(self
            .state
            .read()
            .reports
            .values()
            .find(|r| r.agreement_id == agreement_id && r.year == year && r.semester == semester)
            .cloned())
    }

    async fn list_reports(&self, agreement_id: Uuid) -> anyhow::Result<Vec<SemiannualReport>> {
        let mut items: Vec<SemiannualReport> = self
            .state
            .read()
            .reports
            .values()
            .filter(|r| r.agreement_id == agreement_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| (b.year, b.semester).cmp(&(a.year, a.semester)));
        Ok(items)
    }

    async fn delete_report(&self, id: Uuid) -> anyhow::Result<()> {
        self.state.write().reports.remove(&id);
        Ok(())
    }
}

// ===== Fixtures =====

pub struct TestContext {
    pub service: Arc<Service>,
    pub agreements: MockAgreementRepo,
    pub catalog: MockCatalogRepo,
    pub compliance: MockComplianceRepo,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(AgreementsConfig::default())
    }

    pub fn with_config(config: AgreementsConfig) -> Self {
        let agreements = MockAgreementRepo::new();
        let catalog = MockCatalogRepo::new();
        let compliance = MockComplianceRepo::new();
        let service = Arc::new(Service::new(
            Arc::new(agreements.clone()),
            Arc::new(catalog.clone()),
            Arc::new(compliance.clone()),
            Arc::new(NoOpEventPublisher),
            config,
        ));
        Self {
            service,
            agreements,
            catalog,
            compliance,
        }
    }

    pub async fn institution(&self, name: &str) -> Institution {
        self.service
            .create_institution(agreements_service::domain::InstitutionDraft {
                name: name.to_string(),
                country: Some("Chile".to_string()),
                website: None,
            })
            .await
            .expect("Failed to create institution")
    }

    pub async fn profile(&self, full_name: &str, role: ProfileRole) -> Profile {
        let id = Uuid::new_v4();
        self.service
            .create_profile(Profile {
                id,
                full_name: full_name.to_string(),
                email: format!("{}@example.edu", id.simple()),
                role,
                area_id: None,
                created_at: Utc::now(),
            })
            .await
            .expect("Failed to create profile")
    }

    pub async fn agreement(
        &self,
        name: &str,
        signature_date: Option<NaiveDate>,
        duration_years: f64,
    ) -> AgreementDetail {
        let institution = self.institution(&format!("{} counterpart", name)).await;
        self.service
            .create_agreement(draft(name, institution.id, signature_date, duration_years))
            .await
            .expect("Failed to create agreement")
    }
}

pub fn draft(
    name: &str,
    institution_id: Uuid,
    signature_date: Option<NaiveDate>,
    duration_years: f64,
) -> AgreementDraft {
    AgreementDraft {
        name: name.to_string(),
        institution_id,
        signature_date,
        duration_years,
        country: Some("Chile".to_string()),
        agreement_types: vec!["mobility".to_string()],
        objectives: None,
        status: AgreementStatus::Active,
        document_url: None,
        area_ids: Vec::new(),
        responsibles: Vec::new(),
    }
}
