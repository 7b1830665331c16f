#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};

use super::error::{DomainError, InteractionError};
use super::model::{DateRange, NewPrescription, PageRequest, PrescriptionEdit};
use super::repo::InteractionClient;
use super::service::Service;
use crate::config::DatabaseConfig;
use crate::infra::storage::{connect, sea_orm_repo::SeaOrmPrescriptionRepository};

struct CannedInteractions(Result<Value, u16>);

#[async_trait]
impl InteractionClient for CannedInteractions {
    async fn fetch(&self) -> Result<Value, InteractionError> {
        self.0.clone().map_err(InteractionError::Status)
    }
}

async fn service_with(
    interactions: CannedInteractions,
) -> Service<SeaOrmPrescriptionRepository> {
    let db = connect(&DatabaseConfig {
        url: "sqlite::memory:".to_owned(),
        run_migrations: true,
    })
    .await
    .unwrap();
    Service::new(
        Arc::new(SeaOrmPrescriptionRepository::new(db)),
        Arc::new(interactions),
    )
}

async fn service() -> Service<SeaOrmPrescriptionRepository> {
    service_with(CannedInteractions(Ok(json!({})))).await
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn new_on(date: NaiveDate, name: &str) -> NewPrescription {
    NewPrescription {
        prescription_date: date,
        name: name.to_owned(),
        age: 35,
        gender: "Female".to_owned(),
        diagnosis: "Migraine".to_owned(),
        medicines: "Sumatriptan 50mg".to_owned(),
        next_visit_date: None,
    }
}

fn edit(name: &str, next: Option<NaiveDate>) -> PrescriptionEdit {
    PrescriptionEdit {
        name: name.to_owned(),
        age: 36,
        gender: "Female".to_owned(),
        diagnosis: "Tension headache".to_owned(),
        medicines: "Ibuprofen 400mg".to_owned(),
        next_visit_date: next,
    }
}

#[tokio::test]
async fn create_then_get_round_trips_all_fields() {
    let svc = service().await;
    let mut new = new_on(day(1), "Ayesha");
    new.next_visit_date = Some(day(20));

    let created = svc.create(new.clone()).await.unwrap();
    let found = svc.get(created.id).await.unwrap();

    assert_eq!(found, created);
    assert_eq!(found.prescription_date, day(1));
    assert_eq!(found.next_visit_date, Some(day(20)));
    assert_eq!(found.medicines, new.medicines);
}

#[tokio::test]
async fn invalid_prescription_is_not_stored() {
    let svc = service().await;
    let mut new = new_on(day(1), "  ");
    new.age = 20;

    let err = svc.create(new).await.unwrap_err();

    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "name"));
    let page = svc.list(PageRequest::default(), None).await.unwrap();
    assert_eq!(page.total_elements, 0);
}

#[tokio::test]
async fn unknown_id_is_not_found_everywhere() {
    let svc = service().await;

    assert!(matches!(svc.get(77).await, Err(DomainError::NotFound { id: 77 })));
    assert!(matches!(svc.delete(77).await, Err(DomainError::NotFound { id: 77 })));
    assert!(matches!(
        svc.update(77, edit("x", None)).await,
        Err(DomainError::NotFound { id: 77 })
    ));
}

#[tokio::test]
async fn update_replaces_fields_but_keeps_prescription_date() {
    let svc = service().await;
    let created = svc.create(new_on(day(5), "Nadia")).await.unwrap();

    let updated = svc
        .update(created.id, edit("Nadia Rahman", Some(day(12))))
        .await
        .unwrap();

    assert_eq!(updated.prescription_date, day(5));
    assert_eq!(updated.name, "Nadia Rahman");
    assert_eq!(updated.age, 36);
    assert_eq!(updated.next_visit_date, Some(day(12)));
    assert_eq!(svc.get(created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_rejects_next_visit_before_original_date() {
    let svc = service().await;
    let created = svc.create(new_on(day(10), "Tariq")).await.unwrap();

    let err = svc
        .update(created.id, edit("Tariq", Some(day(9))))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { .. }));
    assert_eq!(svc.get(created.id).await.unwrap().name, "Tariq");
}

#[tokio::test]
async fn delete_removes_row() {
    let svc = service().await;
    let created = svc.create(new_on(day(1), "Sumi")).await.unwrap();

    svc.delete(created.id).await.unwrap();

    assert!(matches!(svc.get(created.id).await, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn list_is_paged_one_based() {
    let svc = service().await;
    for i in 1..=5 {
        svc.create(new_on(day(i), &format!("patient-{i}"))).await.unwrap();
    }

    let second = svc
        .list(PageRequest::new(2, 2).unwrap(), None)
        .await
        .unwrap();

    assert_eq!(second.total_elements, 5);
    assert_eq!(second.total_pages, 3);
    assert_eq!(second.page, 2);
    let names: Vec<_> = second.content.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["patient-3", "patient-4"]);

    let past_end = svc
        .list(PageRequest::new(9, 2).unwrap(), None)
        .await
        .unwrap();
    assert!(past_end.content.is_empty());
    assert_eq!(past_end.total_elements, 5);
}

#[tokio::test]
async fn list_filters_by_inclusive_date_range() {
    let svc = service().await;
    for d in [1, 5, 10, 15, 20] {
        svc.create(new_on(day(d), "p")).await.unwrap();
    }

    let page = svc
        .list(
            PageRequest::default(),
            Some(DateRange::new(day(5), day(15)).unwrap()),
        )
        .await
        .unwrap();

    assert_eq!(page.total_elements, 3);
    assert!(
        page.content
            .iter()
            .all(|p| (day(5)..=day(15)).contains(&p.prescription_date))
    );
}

#[tokio::test]
async fn daily_report_groups_and_orders_by_date() {
    let svc = service().await;
    for d in [7, 3, 7, 7, 3, 9] {
        svc.create(new_on(day(d), "p")).await.unwrap();
    }

    let report = svc.daily_report().await.unwrap();

    let pairs: Vec<_> = report.iter().map(|c| (c.date, c.count)).collect();
    assert_eq!(pairs, vec![(day(3), 2), (day(7), 3), (day(9), 1)]);
}

#[tokio::test]
async fn daily_report_is_empty_without_data() {
    assert!(service().await.daily_report().await.unwrap().is_empty());
}

#[tokio::test]
async fn interactions_pass_through_or_fail_upstream() {
    let body = json!({"interactionTypeGroup": []});
    let ok = service_with(CannedInteractions(Ok(body.clone()))).await;
    assert_eq!(ok.drug_interactions().await.unwrap(), body);

    let failing = service_with(CannedInteractions(Err(500))).await;
    assert!(matches!(
        failing.drug_interactions().await,
        Err(DomainError::Upstream(InteractionError::Status(500)))
    ));
}
