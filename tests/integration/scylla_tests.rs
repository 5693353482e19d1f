// Store tests against a live cluster.
// Run with: cargo test --test integration -- --ignored

use chrono::NaiveDate;
use labdesk::{
    config::ScyllaConfig,
    db::{DbClient, DbError},
    domain::{Invoice, NewInvoice, NewPatient, Patient, PatientFilter},
    repositories::{
        InvoiceRepository, PatientRepository, ScyllaInvoiceRepository, ScyllaPatientRepository,
    },
};
use rust_decimal::Decimal;
use uuid::Uuid;

async fn setup_client() -> DbClient {
    let scylla_config = ScyllaConfig {
        nodes: vec!["localhost:9042".to_string()],
        keyspace: "labdesk_test".to_string(),
        username: None,
        password: None,
    };

    DbClient::new(&scylla_config)
        .await
        .expect("Failed to connect to test database")
}

fn patient(document_id: &str) -> Patient {
    Patient::new(NewPatient {
        full_name: "Ana Ruiz".to_string(),
        document_id: document_id.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        email: None,
        phone: None,
    })
}

#[tokio::test]
#[ignore] // Requires running ScyllaDB
async fn test_patient_round_trip() {
    let repo = ScyllaPatientRepository::new(setup_client().await);
    let doc = format!("DOC-{}", Uuid::new_v4());
    let stored = patient(&doc);

    repo.insert_patient(&stored).await.unwrap();

    let fetched = repo.get_patient(stored.patient_id).await.unwrap();
    assert_eq!(fetched.document_id, doc);

    let found = repo
        .list_patients(&PatientFilter::new(Some(&doc)))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    repo.delete_patient(stored.patient_id).await.unwrap();
    assert!(matches!(
        repo.get_patient(stored.patient_id).await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
#[ignore] // Requires running ScyllaDB
async fn test_invoice_number_claim_is_exclusive() {
    let repo = ScyllaInvoiceRepository::new(setup_client().await);
    let number = format!("F-{}", Uuid::new_v4());

    let make = || {
        Invoice::new(NewInvoice {
            patient_id: Uuid::new_v4(),
            number: number.clone(),
            amount: Decimal::new(1000, 2),
            issued_at: None,
            paid: false,
        })
    };

    let first = make();
    let second = make();
    let (a, b) = tokio::join!(repo.insert_invoice(&first), repo.insert_invoice(&second));

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|r| matches!(r, Err(DbError::Conflict(_))))
            .count(),
        1
    );

    let winner = if outcomes[0].is_ok() { &first } else { &second };
    repo.delete_invoice(winner).await.unwrap();
    assert!(repo.insert_invoice(&make()).await.is_ok());
}

fn invoice_for(patient_id: Uuid, number: &str) -> Invoice {
    Invoice::new(NewInvoice {
        patient_id,
        number: number.to_string(),
        amount: Decimal::new(2500, 2),
        issued_at: None,
        paid: false,
    })
}

#[tokio::test]
#[ignore] // Requires running ScyllaDB
async fn test_renumber_conflict_and_release() {
    let repo = ScyllaInvoiceRepository::new(setup_client().await);
    let patient_id = Uuid::new_v4();
    let old_number = format!("F-{}", Uuid::new_v4());
    let taken_number = format!("F-{}", Uuid::new_v4());
    let new_number = format!("F-{}", Uuid::new_v4());

    let mut stored = invoice_for(patient_id, &old_number);
    let other = invoice_for(patient_id, &taken_number);
    repo.insert_invoice(&stored).await.unwrap();
    repo.insert_invoice(&other).await.unwrap();

    // Renumbering onto a number held by another invoice leaves the row as is.
    stored.number = taken_number.clone();
    assert!(matches!(
        repo.update_invoice(&stored, &old_number).await,
        Err(DbError::Conflict(_))
    ));
    assert_eq!(
        repo.get_invoice(stored.invoice_id).await.unwrap().number,
        old_number
    );

    stored.number = new_number.clone();
    repo.update_invoice(&stored, &old_number).await.unwrap();
    assert_eq!(
        repo.get_invoice(stored.invoice_id).await.unwrap().number,
        new_number
    );

    let reuse = invoice_for(patient_id, &old_number);
    assert!(repo.insert_invoice(&reuse).await.is_ok());
    assert!(matches!(
        repo.insert_invoice(&invoice_for(patient_id, &new_number)).await,
        Err(DbError::Conflict(_))
    ));

    assert_eq!(repo.delete_invoices_by_patient(patient_id).await.unwrap(), 3);
}

#[tokio::test]
#[ignore] // Requires running ScyllaDB
async fn test_stale_renumber_is_rejected() {
    let repo = ScyllaInvoiceRepository::new(setup_client().await);
    let patient_id = Uuid::new_v4();
    let first = format!("F-{}", Uuid::new_v4());
    let second = format!("F-{}", Uuid::new_v4());
    let third = format!("F-{}", Uuid::new_v4());

    let mut stored = invoice_for(patient_id, &first);
    repo.insert_invoice(&stored).await.unwrap();

    let mut stale = stored.clone();
    stored.number = second.clone();
    repo.update_invoice(&stored, &first).await.unwrap();

    stale.number = third.clone();
    assert!(matches!(
        repo.update_invoice(&stale, &first).await,
        Err(DbError::Conflict(_))
    ));
    assert_eq!(
        repo.get_invoice(stored.invoice_id).await.unwrap().number,
        second
    );

    // The rejected claim on the third number was released again.
    let reuse = invoice_for(patient_id, &third);
    assert!(repo.insert_invoice(&reuse).await.is_ok());

    assert_eq!(repo.delete_invoices_by_patient(patient_id).await.unwrap(), 2);
}

#[tokio::test]
#[ignore] // Requires running ScyllaDB
async fn test_update_after_delete_is_not_found() {
    let repo = ScyllaInvoiceRepository::new(setup_client().await);
    let number = format!("F-{}", Uuid::new_v4());
    let renumbered = format!("F-{}", Uuid::new_v4());

    let mut stored = invoice_for(Uuid::new_v4(), &number);
    repo.insert_invoice(&stored).await.unwrap();
    repo.delete_invoice(&stored).await.unwrap();

    stored.number = renumbered.clone();
    assert!(matches!(
        repo.update_invoice(&stored, &number).await,
        Err(DbError::NotFound)
    ));
    assert!(matches!(
        repo.get_invoice(stored.invoice_id).await,
        Err(DbError::NotFound)
    ));

    let reuse = invoice_for(Uuid::new_v4(), &renumbered);
    repo.insert_invoice(&reuse).await.unwrap();
    repo.delete_invoice(&reuse).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running ScyllaDB
async fn test_delete_invoices_by_patient_releases_numbers() {
    let repo = ScyllaInvoiceRepository::new(setup_client().await);
    let patient_id = Uuid::new_v4();
    let numbers: Vec<String> = (0..3).map(|_| format!("F-{}", Uuid::new_v4())).collect();

    for number in &numbers {
        repo.insert_invoice(&invoice_for(patient_id, number))
            .await
            .unwrap();
    }

    assert_eq!(repo.delete_invoices_by_patient(patient_id).await.unwrap(), 3);
    assert_eq!(repo.delete_invoices_by_patient(patient_id).await.unwrap(), 0);

    let other_patient = Uuid::new_v4();
    for number in &numbers {
        assert!(repo
            .insert_invoice(&invoice_for(other_patient, number))
            .await
            .is_ok());
    }
    assert_eq!(
        repo.delete_invoices_by_patient(other_patient).await.unwrap(),
        3
    );
}

#[tokio::test]
#[ignore] // Requires running ScyllaDB
async fn test_update_missing_patient_is_not_found() {
    let repo = ScyllaPatientRepository::new(setup_client().await);
    let ghost = patient(&format!("DOC-{}", Uuid::new_v4()));

    assert!(matches!(
        repo.update_patient(&ghost).await,
        Err(DbError::NotFound)
    ));
    assert!(matches!(
        repo.get_patient(ghost.patient_id).await,
        Err(DbError::NotFound)
    ));
}
