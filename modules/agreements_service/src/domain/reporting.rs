//! Semi-annual reports and dashboard aggregation

use super::service::{internal, Service};
use super::validation::{require_text, validate_report_period};
use crate::contract::{
    Agreement, AgreementFilter, AgreementsError, Contraprestacion, MobilityRecord, Seguimiento,
    SemiannualReport,
};
use chrono::{Days, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

const UNSPECIFIED_COUNTRY: &str = "unspecified";

/// Agreement whose expiration falls inside the dashboard window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiringAgreement {
    pub agreement_id: Uuid,
    pub name: String,
    pub expiration_date: NaiveDate,
    pub days_left: i64,
}

/// Chart inputs for the reporting screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_agreements: usize,
    pub agreements_by_status: BTreeMap<String, usize>,
    pub agreements_by_country: BTreeMap<String, usize>,
    pub agreements_by_type: BTreeMap<String, usize>,
    /// Sorted by expiration date
    pub expiring_soon: Vec<ExpiringAgreement>,
    pub mobility_by_kind: BTreeMap<String, usize>,
    pub mobility_by_direction: BTreeMap<String, usize>,
    pub pending_mobility_reports: usize,
    pub seguimientos_by_status: BTreeMap<String, usize>,
}

/// Aggregate already-fetched rows.
///
/// Soft-deleted agreements are ignored, together with the mobility records
/// and seguimientos that belong to them. An agreement is "expiring soon" when its expiration date lies in
/// `[today, today + window_days]`.
pub fn summarize(
    agreements: &[Agreement],
    mobility: &[MobilityRecord],
    contraprestaciones: &[Contraprestacion],
    seguimientos: &[Seguimiento],
    today: NaiveDate,
    window_days: u32,
) -> DashboardSummary {
    let mut summary = DashboardSummary::default();
    let horizon = today
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX);

    let live: Vec<&Agreement> = agreements
        .iter()
        .filter(|a| a.deleted_at.is_none())
        .collect();
    let live_ids: HashSet<Uuid> = live.iter().map(|a| a.id).collect();

    summary.total_agreements = live.len();
    for agreement in &live {
        *summary
            .agreements_by_status
            .entry(agreement.status.as_str().to_string())
            .or_default() += 1;

        let country = agreement
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNSPECIFIED_COUNTRY);
        *summary
            .agreements_by_country
            .entry(country.to_string())
            .or_default() += 1;

        for tag in &agreement.agreement_types {
            *summary.agreements_by_type.entry(tag.clone()).or_default() += 1;
        }

        if let Some(expiration_date) = agreement.expiration_date {
            if expiration_date >= today && expiration_date <= horizon {
                summary.expiring_soon.push(ExpiringAgreement {
                    agreement_id: agreement.id,
                    name: agreement.name.clone(),
                    expiration_date,
                    days_left: (expiration_date - today).num_days(),
                });
            }
        }
    }
    summary
        .expiring_soon
        .sort_by(|a, b| a.expiration_date.cmp(&b.expiration_date).then(a.name.cmp(&b.name)));

    for record in mobility.iter().filter(|m| live_ids.contains(&m.agreement_id)) {
        *summary
            .mobility_by_kind
            .entry(record.participant_kind.as_str().to_string())
            .or_default() += 1;
        *summary
            .mobility_by_direction
            .entry(record.direction.as_str().to_string())
            .or_default() += 1;
        if !record.report_submitted {
            summary.pending_mobility_reports += 1;
        }
    }

    let live_deliverables: HashSet<Uuid> = contraprestaciones
        .iter()
        .filter(|c| live_ids.contains(&c.agreement_id))
        .map(|c| c.id)
        .collect();
    for item in seguimientos
        .iter()
        .filter(|s| live_deliverables.contains(&s.contraprestacion_id))
    {
        *summary
            .seguimientos_by_status
            .entry(item.status.as_str().to_string())
            .or_default() += 1;
    }

    summary
}

impl Service {
    // ===== Semi-annual reports =====

    pub async fn create_report(
        &self,
        agreement_id: Uuid,
        year: i32,
        semester: u8,
        summary: String,
        author_id: Option<Uuid>,
    ) -> Result<SemiannualReport, AgreementsError> {
        validate_report_period(year, semester)?;
        require_text("summary", &summary)?;
        if summary.chars().count() > self.config.max_summary_length {
            return Err(AgreementsError::validation(format!(
                "summary must not exceed {} characters",
                self.config.max_summary_length
            )));
        }
        self.load_agreement(agreement_id).await?;
        if let Some(author_id) = author_id {
            self.get_profile(author_id).await?;
        }

        if self
            .compliance
            .find_report_by_period(agreement_id, year, semester)
            .await
            .map_err(internal)?
            .is_some()
        {
            return Err(AgreementsError::conflict(format!(
                "a report for {}-S{} already exists for agreement {}",
                year, semester, agreement_id
            )));
        }

        let report = SemiannualReport {
            id: Uuid::new_v4(),
            agreement_id,
            year,
            semester,
            summary,
            author_id,
            created_at: Utc::now(),
        };
        self.compliance
            .create_report(&report)
            .await
            .map_err(internal)
    }

    pub async fn list_reports(
        &self,
        agreement_id: Uuid,
    ) -> Result<Vec<SemiannualReport>, AgreementsError> {
        self.load_agreement(agreement_id).await?;
        self.compliance
            .list_reports(agreement_id)
            .await
            .map_err(internal)
    }

    pub async fn delete_report(&self, id: Uuid) -> Result<(), AgreementsError> {
        self.compliance
            .find_report(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AgreementsError::not_found("report", id))?;
        self.compliance.delete_report(id).await.map_err(internal)
    }

    // ===== Dashboard =====

    /// Aggregate agreements, mobility and compliance as of `today`
    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary, AgreementsError> {
        let agreements = self
            .agreements
            .list_agreements(&AgreementFilter::default())
            .await
            .map_err(internal)?;
        let mobility = self.compliance.list_mobility(None).await.map_err(internal)?;
        let contraprestaciones = self
            .compliance
            .list_all_contraprestaciones()
            .await
            .map_err(internal)?;
        let seguimientos = self
            .compliance
            .list_all_seguimientos()
            .await
            .map_err(internal)?;

        Ok(summarize(
            &agreements,
            &mobility,
            &contraprestaciones,
            &seguimientos,
            today,
            self.config.expiring_soon_days,
        ))
    }
}
