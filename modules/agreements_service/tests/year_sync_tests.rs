//! Integration tests for contractual year generation and reconciliation

mod common;

use agreements_service::contract::*;
use agreements_service::domain::{SkipReason, YearSync};
use common::{date, draft, print_test_header, TestContext};
use uuid::Uuid;

fn bounds(years: &[AgreementYear]) -> Vec<(i32, chrono::NaiveDate, chrono::NaiveDate)> {
    years
        .iter()
        .map(|y| (y.year_number, y.year_start, y.year_end))
        .collect()
}

#[tokio::test]
async fn test_create_generates_two_years() {
    let ctx = TestContext::new();

    print_test_header(
        "test_create_generates_two_years",
        &["Creating an agreement signed 2024-03-15 for 2 years stores both contractual years."],
    );

    let detail = ctx.agreement("Exchange", Some(date(2024, 3, 15)), 2.0).await;
    ctx.agreements.print_state("After create");

    assert_eq!(
        bounds(&detail.years),
        vec![
            (1, date(2024, 3, 15), date(2025, 3, 14)),
            (2, date(2025, 3, 15), date(2026, 3, 14)),
        ]
    );
    assert_eq!(detail.agreement.expiration_date, Some(date(2026, 3, 15)));
}

#[tokio::test]
async fn test_fractional_duration_rounds_up() {
    let ctx = TestContext::new();

    print_test_header(
        "test_fractional_duration_rounds_up",
        &["A 1.5 year agreement gets two full contractual years."],
    );

    let detail = ctx.agreement("Research", Some(date(2024, 3, 15)), 1.5).await;

    assert_eq!(detail.years.len(), 2);
    assert_eq!(detail.years[1].year_start, date(2025, 3, 15));
    assert_eq!(detail.years[1].year_end, date(2026, 3, 14));
    assert_eq!(detail.agreement.expiration_date, Some(date(2025, 9, 15)));
}

#[tokio::test]
async fn test_missing_signature_date_writes_nothing() {
    let ctx = TestContext::new();

    print_test_header(
        "test_missing_signature_date_writes_nothing",
        &[
            "Without a signature date year generation is skipped, not an error.",
            "The repository must not see a single year write.",
        ],
    );

    let detail = ctx.agreement("Unsigned", None, 3.0).await;
    assert!(detail.years.is_empty());
    assert_eq!(ctx.agreements.year_writes(), 0);

    let outcome = ctx
        .service
        .recalculate_agreement_years(detail.agreement.id)
        .await
        .expect("Recalculation should not fail");
    assert_eq!(outcome, YearSync::Skipped(SkipReason::MissingSignatureDate));
    assert_eq!(ctx.agreements.year_writes(), 0);
}

#[tokio::test]
async fn test_zero_duration_is_skipped() {
    let ctx = TestContext::new();

    print_test_header(
        "test_zero_duration_is_skipped",
        &["A zero duration is accepted but produces no years and no writes."],
    );

    let detail = ctx.agreement("Open ended", Some(date(2024, 1, 1)), 0.0).await;
    assert!(detail.years.is_empty());
    assert_eq!(detail.agreement.expiration_date, None);

    let outcome = ctx
        .service
        .generate_years_if_needed(detail.agreement.id)
        .await
        .unwrap();
    assert_eq!(outcome, YearSync::Skipped(SkipReason::NonPositiveDuration));
    assert_eq!(ctx.agreements.year_writes(), 0);
}

#[tokio::test]
async fn test_recalculate_is_idempotent() {
    let ctx = TestContext::new();

    print_test_header(
        "test_recalculate_is_idempotent",
        &["Recalculating with unchanged inputs keeps the same boundaries and skips the write."],
    );

    let detail = ctx.agreement("Stable", Some(date(2023, 8, 31)), 4.0).await;
    let writes_after_create = ctx.agreements.year_writes();

    let outcome = ctx
        .service
        .recalculate_agreement_years(detail.agreement.id)
        .await
        .unwrap();
    assert_eq!(outcome, YearSync::Unchanged);
    assert_eq!(ctx.agreements.year_writes(), writes_after_create);

    let years = ctx.service.list_years(detail.agreement.id).await.unwrap();
    assert_eq!(bounds(&years), bounds(&detail.years));
}

#[tokio::test]
async fn test_generate_does_nothing_when_years_exist() {
    let ctx = TestContext::new();

    print_test_header(
        "test_generate_does_nothing_when_years_exist",
        &["generate_years_if_needed only acts on agreements without year rows."],
    );

    let detail = ctx.agreement("Existing", Some(date(2024, 1, 1)), 2.0).await;
    let outcome = ctx
        .service
        .generate_years_if_needed(detail.agreement.id)
        .await
        .unwrap();
    assert_eq!(outcome, YearSync::Unchanged);
}

#[tokio::test]
async fn test_shrink_from_five_to_three_years() {
    let ctx = TestContext::new();

    print_test_header(
        "test_shrink_from_five_to_three_years",
        &[
            "Reducing the duration from 5 to 3 years removes years 4 and 5.",
            "Years 1-3 keep their identity and get new bounds from the new signature date.",
        ],
    );

    let detail = ctx.agreement("Shrinking", Some(date(2024, 3, 15)), 5.0).await;
    let original_ids: Vec<Uuid> = detail.years.iter().map(|y| y.id).collect();
    assert_eq!(original_ids.len(), 5);

    let mut change = draft(
        "Shrinking",
        detail.agreement.institution_id,
        Some(date(2024, 6, 1)),
        3.0,
    );
    change.agreement_types = detail.agreement.agreement_types.clone();
    let updated = ctx
        .service
        .update_agreement(detail.agreement.id, change)
        .await
        .expect("Failed to update agreement");
    ctx.agreements.print_state("After shrink");

    let ids: Vec<Uuid> = updated.years.iter().map(|y| y.id).collect();
    assert_eq!(ids, original_ids[..3].to_vec());
    assert_eq!(
        bounds(&updated.years),
        vec![
            (1, date(2024, 6, 1), date(2025, 5, 31)),
            (2, date(2025, 6, 1), date(2026, 5, 31)),
            (3, date(2026, 6, 1), date(2027, 5, 31)),
        ]
    );
    assert_eq!(updated.agreement.version, 2);
}

#[tokio::test]
async fn test_extend_appends_years() {
    let ctx = TestContext::new();

    print_test_header(
        "test_extend_appends_years",
        &["Lengthening an agreement adds the missing trailing years."],
    );

    let detail = ctx.agreement("Growing", Some(date(2024, 3, 15)), 2.0).await;
    let updated = ctx
        .service
        .update_agreement(
            detail.agreement.id,
            draft("Growing", detail.agreement.institution_id, Some(date(2024, 3, 15)), 3.0),
        )
        .await
        .unwrap();

    assert_eq!(updated.years.len(), 3);
    assert_eq!(updated.years[0].id, detail.years[0].id);
    assert_eq!(updated.years[2].year_start, date(2026, 3, 15));
    assert_eq!(updated.years[2].year_end, date(2027, 3, 14));
}

#[tokio::test]
async fn test_recalculate_removes_duplicate_rows() {
    let ctx = TestContext::new();

    print_test_header(
        "test_recalculate_removes_duplicate_rows",
        &["A stray duplicate year row is removed by recalculation."],
    );

    let detail = ctx.agreement("Duplicated", Some(date(2024, 1, 1)), 2.0).await;
    ctx.agreements.insert_year_row(AgreementYear {
        id: Uuid::new_v4(),
        ..detail.years[1].clone()
    });

    let outcome = ctx
        .service
        .recalculate_agreement_years(detail.agreement.id)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        YearSync::Applied {
            inserted: 0,
            updated: 0,
            deleted: 1
        }
    );
    assert_eq!(ctx.agreements.year_rows(detail.agreement.id).len(), 2);
}

#[tokio::test]
async fn test_years_of_deleted_agreement_are_not_found() {
    let ctx = TestContext::new();

    print_test_header(
        "test_years_of_deleted_agreement_are_not_found",
        &["Year operations treat soft-deleted agreements as missing."],
    );

    let detail = ctx.agreement("Gone", Some(date(2024, 1, 1)), 1.0).await;
    ctx.service
        .delete_agreement(detail.agreement.id)
        .await
        .unwrap();

    let result = ctx.service.list_years(detail.agreement.id).await;
    assert!(matches!(result, Err(AgreementsError::NotFound { .. })));
    let result = ctx
        .service
        .recalculate_agreement_years(detail.agreement.id)
        .await;
    assert!(matches!(result, Err(AgreementsError::NotFound { .. })));
}
