//! Required-field and format checks applied before any write

use crate::config::AgreementsConfig;
use crate::contract::{AgreementDraft, AgreementsError, MobilityDraft};
use url::Url;

/// Reject blank required text fields
pub fn require_text(field: &str, value: &str) -> Result<(), AgreementsError> {
    if value.trim().is_empty() {
        return Err(AgreementsError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Validate a public document or evidence URL
///
/// Only absolute http(s) URLs are accepted; uploads themselves live in
/// external object storage.
pub fn validate_public_url(field: &str, value: &str) -> Result<(), AgreementsError> {
    let url = Url::parse(value).map_err(|e| {
        AgreementsError::validation(format!("{} is not a valid URL: {}", field, e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AgreementsError::validation(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}

/// Validate the editable fields of an agreement
pub fn validate_agreement_draft(
    draft: &AgreementDraft,
    config: &AgreementsConfig,
) -> Result<(), AgreementsError> {
    require_text("name", &draft.name)?;

    if !draft.duration_years.is_finite() || draft.duration_years < 0.0 {
        return Err(AgreementsError::validation(
            "duration_years must be a non-negative number",
        ));
    }

    if draft.duration_years > config.max_duration_years {
        return Err(AgreementsError::validation(format!(
            "duration_years must not exceed {}",
            config.max_duration_years
        )));
    }

    if let Some(url) = &draft.document_url {
        validate_public_url("document_url", url)?;
    }

    if draft.agreement_types.iter().any(|t| t.trim().is_empty()) {
        return Err(AgreementsError::validation(
            "agreement_types must not contain blank tags",
        ));
    }

    Ok(())
}

/// Validate the editable fields of a mobility record
pub fn validate_mobility_draft(draft: &MobilityDraft) -> Result<(), AgreementsError> {
    require_text("participant_name", &draft.participant_name)?;

    if let Some(end) = draft.end_date {
        if end < draft.start_date {
            return Err(AgreementsError::validation(
                "end_date must not be before start_date",
            ));
        }
    }

    Ok(())
}

/// Validate the period of a semi-annual report
pub fn validate_report_period(year: i32, semester: u8) -> Result<(), AgreementsError> {
    if !(1..=2).contains(&semester) {
        return Err(AgreementsError::validation("semester must be 1 or 2"));
    }
    if !(1900..=9999).contains(&year) {
        return Err(AgreementsError::validation(format!(
            "year {} is out of range",
            year
        )));
    }
    Ok(())
}

/// Minimal shape check for e-mail addresses
pub fn validate_email(email: &str) -> Result<(), AgreementsError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') =>
        {
            Ok(())
        }
        _ => Err(AgreementsError::validation(format!(
            "'{}' is not a valid e-mail address",
            email
        ))),
    }
}
