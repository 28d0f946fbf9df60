//! Contractual year boundaries
//!
//! An agreement signed on `S` for `d` years is split into `ceil(d)` consecutive
//! intervals. Interval `i` (1-based) starts at `S + (i - 1)` calendar years and
//! ends the day before interval `i + 1` starts, so the set has no gaps or
//! overlaps. Every start is computed from `S` directly; a signature on 29
//! February therefore clamps to 28 February in non-leap years without
//! drifting the following starts.

use crate::contract::AgreementYear;
use chrono::{Months, NaiveDate};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Bounds of one contractual year, before it is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSpan {
    pub year_number: i32,
    pub start: NaiveDate,
    /// Inclusive
    pub end: NaiveDate,
}

/// Why a year regeneration did not touch storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingSignatureDate,
    NonPositiveDuration,
}

/// Outcome of a year generation or recalculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSync {
    /// Inputs were incomplete; nothing was written
    Skipped(SkipReason),
    /// Stored rows already matched
    Unchanged,
    Applied {
        inserted: usize,
        updated: usize,
        deleted: usize,
    },
}

/// Changes needed to turn the stored rows into the computed spans
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearPlan {
    pub insert: Vec<YearSpan>,
    /// Retained rows carrying their recomputed bounds
    pub update: Vec<AgreementYear>,
    pub delete: Vec<Uuid>,
}

impl YearPlan {
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    pub fn outcome(&self) -> YearSync {
        if self.is_empty() {
            YearSync::Unchanged
        } else {
            YearSync::Applied {
                inserted: self.insert.len(),
                updated: self.update.len(),
                deleted: self.delete.len(),
            }
        }
    }
}

/// Number of intervals for a duration; fractional durations round up.
///
/// Returns `None` for non-finite or non-positive durations.
pub fn year_count(duration_years: f64) -> Option<u32> {
    if !duration_years.is_finite() || duration_years <= 0.0 {
        return None;
    }
    let count = duration_years.ceil();
    if count > f64::from(u32::MAX / 12) {
        return None;
    }
    Some(count as u32)
}

fn add_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(years.checked_mul(12)?))
}

/// Compute the contractual years of an agreement.
///
/// Returns an empty vector when the duration is not positive.
pub fn compute_year_spans(signature_date: NaiveDate, duration_years: f64) -> Vec<YearSpan> {
    let Some(count) = year_count(duration_years) else {
        return Vec::new();
    };

    let mut spans = Vec::with_capacity(count as usize);
    for offset in 0..count {
        let Some(start) = add_years(signature_date, offset) else {
            break;
        };
        let Some(end) = add_years(signature_date, offset + 1).and_then(|next| next.pred_opt())
        else {
            break;
        };
        spans.push(YearSpan {
            year_number: offset as i32 + 1,
            start,
            end,
        });
    }
    spans
}

/// Expiration date implied by a signature date and duration.
///
/// The duration is converted to whole calendar months (1.5 years = 18 months).
pub fn expiration_date_for(signature_date: NaiveDate, duration_years: f64) -> Option<NaiveDate> {
    year_count(duration_years)?;
    let months = (duration_years * 12.0).round() as u32;
    signature_date.checked_add_months(Months::new(months))
}

/// Diff stored year rows against freshly computed spans.
///
/// Rows past the new year count are deleted, as are duplicate rows for the
/// same year number. Retained rows keep their identity and are updated only
/// when their bounds changed.
pub fn plan_reconciliation(existing: &[AgreementYear], spans: &[YearSpan]) -> YearPlan {
    let mut plan = YearPlan::default();
    let mut by_number: BTreeMap<i32, &AgreementYear> = BTreeMap::new();

    for row in existing {
        match by_number.entry(row.year_number) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(_) => plan.delete.push(row.id),
        }
    }

    for span in spans {
        match by_number.remove(&span.year_number) {
            Some(row) if row.year_start == span.start && row.year_end == span.end => {}
            Some(row) => plan.update.push(AgreementYear {
                year_start: span.start,
                year_end: span.end,
                ..row.clone()
            }),
            None => plan.insert.push(*span),
        }
    }

    plan.delete.extend(by_number.values().map(|row| row.id));
    plan
}
