//! Integration tests for institutions, areas and profiles

mod common;

use agreements_service::contract::*;
use agreements_service::domain::{InstitutionDraft, ProfileUpdate};
use common::{date, draft, print_test_header, TestContext};
use uuid::Uuid;

#[tokio::test]
async fn test_institution_lifecycle() {
    let ctx = TestContext::new();

    print_test_header(
        "test_institution_lifecycle",
        &["Institutions can be created, renamed, listed and deleted while unreferenced."],
    );

    let created = ctx
        .service
        .create_institution(InstitutionDraft {
            name: " Universidad Nacional ".to_string(),
            country: Some("Colombia".to_string()),
            website: Some("https://unal.example.edu".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Universidad Nacional");

    let updated = ctx
        .service
        .update_institution(
            created.id,
            InstitutionDraft {
                name: "UNAL".to_string(),
                country: Some("Colombia".to_string()),
                website: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "UNAL");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.website.is_none());

    assert_eq!(ctx.service.list_institutions().await.unwrap().len(), 1);

    ctx.service.delete_institution(created.id).await.unwrap();
    assert!(matches!(
        ctx.service.get_institution(created.id).await,
        Err(AgreementsError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_institution_validation() {
    let ctx = TestContext::new();

    print_test_header(
        "test_institution_validation",
        &["Blank names and non-http websites are rejected."],
    );

    let blank = ctx
        .service
        .create_institution(InstitutionDraft {
            name: "".to_string(),
            country: None,
            website: None,
        })
        .await;
    assert!(matches!(blank, Err(AgreementsError::Validation { .. })));

    let bad_site = ctx
        .service
        .create_institution(InstitutionDraft {
            name: "Somewhere".to_string(),
            country: None,
            website: Some("mailto:info@example.edu".to_string()),
        })
        .await;
    assert!(matches!(bad_site, Err(AgreementsError::Validation { .. })));
}

#[tokio::test]
async fn test_referenced_institution_cannot_be_deleted() {
    let ctx = TestContext::new();

    print_test_header(
        "test_referenced_institution_cannot_be_deleted",
        &[
            "An institution stays while any agreement points at it,",
            "including soft-deleted agreements whose rows are kept.",
        ],
    );

    let detail = ctx.agreement("Referencing", None, 1.0).await;
    let institution_id = detail.agreement.institution_id;

    let result = ctx.service.delete_institution(institution_id).await;
    assert!(matches!(result, Err(AgreementsError::Conflict { .. })));

    ctx.service
        .delete_agreement(detail.agreement.id)
        .await
        .unwrap();
    let result = ctx.service.delete_institution(institution_id).await;
    assert!(matches!(result, Err(AgreementsError::Conflict { .. })));
}

#[tokio::test]
async fn test_area_lifecycle_and_conflict() {
    let ctx = TestContext::new();

    print_test_header(
        "test_area_lifecycle_and_conflict",
        &["Areas linked to an agreement cannot be deleted."],
    );

    let area = ctx
        .service
        .create_area("Engineering".to_string(), Some("Faculty".to_string()))
        .await
        .unwrap();
    let renamed = ctx
        .service
        .update_area(area.id, "Engineering School".to_string(), None)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Engineering School");

    let institution = ctx.institution("Partner").await;
    let mut request = draft("With area", institution.id, None, 1.0);
    request.area_ids = vec![area.id];
    ctx.service.create_agreement(request).await.unwrap();

    let result = ctx.service.delete_area(area.id).await;
    assert!(matches!(result, Err(AgreementsError::Conflict { .. })));

    let free = ctx
        .service
        .create_area("Unused".to_string(), None)
        .await
        .unwrap();
    ctx.service.delete_area(free.id).await.unwrap();
    assert_eq!(ctx.service.list_areas().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_profile_update_and_duplicates() {
    let ctx = TestContext::new();

    print_test_header(
        "test_profile_update_and_duplicates",
        &[
            "Profile updates change name, role and area but never the email.",
            "A second profile with the same email is a conflict.",
        ],
    );

    let area = ctx
        .service
        .create_area("Research".to_string(), None)
        .await
        .unwrap();
    let profile = ctx.profile("Luis", ProfileRole::User).await;

    let updated = ctx
        .service
        .update_profile(
            profile.id,
            ProfileUpdate {
                full_name: "Luis Soto".to_string(),
                role: ProfileRole::Admin,
                area_id: Some(area.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.email, profile.email);
    assert!(updated.is_admin());
    assert_eq!(updated.area_id, Some(area.id));

    let unknown_area = ctx
        .service
        .update_profile(
            profile.id,
            ProfileUpdate {
                full_name: "Luis Soto".to_string(),
                role: ProfileRole::Admin,
                area_id: Some(Uuid::new_v4()),
            },
        )
        .await;
    assert!(matches!(unknown_area, Err(AgreementsError::NotFound { .. })));

    let duplicate = ctx
        .service
        .create_profile(Profile {
            id: Uuid::new_v4(),
            email: profile.email.clone(),
            ..profile.clone()
        })
        .await;
    assert!(matches!(duplicate, Err(AgreementsError::Conflict { .. })));
}

#[tokio::test]
async fn test_responsible_profile_cannot_be_deleted() {
    let ctx = TestContext::new();

    print_test_header(
        "test_responsible_profile_cannot_be_deleted",
        &["Profiles accountable for agreements or mobility records stay."],
    );

    let detail = ctx.agreement("Accountable", Some(date(2024, 1, 1)), 1.0).await;
    let linked = ctx.profile("Linked", ProfileRole::User).await;
    ctx.service
        .set_agreement_responsibles(
            detail.agreement.id,
            vec![ResponsibleAssignment {
                profile_id: linked.id,
                kind: ResponsibleKind::Internal,
            }],
        )
        .await
        .unwrap();

    let result = ctx.service.delete_profile(linked.id).await;
    assert!(matches!(result, Err(AgreementsError::Conflict { .. })));

    let free = ctx.profile("Free", ProfileRole::User).await;
    ctx.service.delete_profile(free.id).await.unwrap();
    assert_eq!(ctx.catalog.profile_count(), 1);
}
