use axum::http::{Method, StatusCode, header};
use serde_json::json;
use uuid::Uuid;

use crate::common::TestApp;

#[tokio::test]
async fn test_invoice_lifecycle_includes_patient_name() {
    let app = TestApp::spawn().await;
    let patient_id = app.create_patient("Ana Ruiz", "DOC1").await;

    let created = app.create_invoice(&patient_id, "F-0001", "120.50").await;
    assert_eq!(created.status, StatusCode::CREATED);

    let id = created.body["id"].as_str().unwrap().to_string();
    assert_eq!(
        created.headers.get(header::LOCATION).unwrap(),
        format!("/api/invoices/{}", id).as_str()
    );
    assert_eq!(created.body["patientName"], "Ana Ruiz");
    assert_eq!(created.body["amount"], "120.50");
    assert_eq!(created.body["paid"], false);
    assert!(created.body["issuedAt"].is_string());

    let fetched = app
        .send(Method::GET, &format!("/api/invoices/{}", id), None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["number"], "F-0001");
    assert_eq!(fetched.body["patientName"], "Ana Ruiz");

    let paid = app
        .send(
            Method::PUT,
            &format!("/api/invoices/{}", id),
            Some(json!({
                "number": "F-0001",
                "amount": "99.90",
                "issuedAt": "2024-06-01T09:00:00Z",
                "paid": true,
            })),
        )
        .await;
    assert_eq!(paid.status, StatusCode::NO_CONTENT);

    let listed = app
        .send(
            Method::GET,
            &format!("/api/invoices?patientId={}&paid=true", patient_id),
            None,
        )
        .await;
    assert_eq!(listed.body["total"], 1);
    assert_eq!(listed.body["items"][0]["amount"], "99.90");
    assert_eq!(listed.body["items"][0]["patientName"], "Ana Ruiz");

    let deleted = app
        .send(Method::DELETE, &format!("/api/invoices/{}", id), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app
        .send(Method::GET, &format!("/api/invoices/{}", id), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invoice_for_missing_patient_is_rejected_and_not_stored() {
    let app = TestApp::spawn().await;

    let response = app
        .create_invoice(&Uuid::new_v4().to_string(), "F-404", "10")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Patient does not exist");

    let listed = app.send(Method::GET, "/api/invoices", None).await;
    assert_eq!(listed.body["total"], 0);
}

#[tokio::test]
async fn test_negative_amount_is_rejected() {
    let app = TestApp::spawn().await;
    let patient_id = app.create_patient("Ana Ruiz", "DOC1").await;

    let response = app.create_invoice(&patient_id, "F-1", "-0.01").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_number_conflicts() {
    let app = TestApp::spawn().await;
    let patient_id = app.create_patient("Ana Ruiz", "DOC1").await;

    let first = app.create_invoice(&patient_id, "F-7", "10").await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.create_invoice(&patient_id, "F-7", "20").await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert!(second.body["error"].is_string());
}

#[tokio::test]
async fn test_concurrent_duplicate_numbers_yield_one_created() {
    let app = TestApp::spawn().await;
    let patient_id = app.create_patient("Ana Ruiz", "DOC1").await;

    let (a, b) = tokio::join!(
        app.create_invoice(&patient_id, "F-RACE", "10"),
        app.create_invoice(&patient_id, "F-RACE", "10"),
    );

    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn test_renumbering_conflicts_only_with_other_invoices() {
    let app = TestApp::spawn().await;
    let patient_id = app.create_patient("Ana Ruiz", "DOC1").await;

    let first = app.create_invoice(&patient_id, "F-1", "10").await;
    app.create_invoice(&patient_id, "F-2", "10").await;
    let uri = format!("/api/invoices/{}", first.body["id"].as_str().unwrap());

    let body = |number: &str| {
        json!({
            "number": number,
            "amount": "10",
            "issuedAt": "2024-03-01T12:00:00Z",
            "paid": false,
        })
    };

    let taken = app.send(Method::PUT, &uri, Some(body("F-2"))).await;
    assert_eq!(taken.status, StatusCode::CONFLICT);

    let same = app.send(Method::PUT, &uri, Some(body("F-1"))).await;
    assert_eq!(same.status, StatusCode::NO_CONTENT);

    let fresh = app.send(Method::PUT, &uri, Some(body("F-3"))).await;
    assert_eq!(fresh.status, StatusCode::NO_CONTENT);

    let reused = app.create_invoice(&patient_id, "F-1", "10").await;
    assert_eq!(reused.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_missing_invoice_routes_return_not_found() {
    let app = TestApp::spawn().await;
    let uri = format!("/api/invoices/{}", Uuid::new_v4());

    assert_eq!(
        app.send(Method::DELETE, &uri, None).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.send(Method::GET, &uri, None).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_date_range_and_amount_sort() {
    let app = TestApp::spawn().await;
    let patient_id = app.create_patient("Ana Ruiz", "DOC1").await;

    for (number, amount, issued_at) in [
        ("F-A", "30", "2024-01-10T00:00:00Z"),
        ("F-B", "10", "2024-02-10T00:00:00Z"),
        ("F-C", "20", "2024-03-10T00:00:00Z"),
    ] {
        let response = app
            .send(
                Method::POST,
                "/api/invoices",
                Some(json!({
                    "patientId": patient_id,
                    "number": number,
                    "amount": amount,
                    "issuedAt": issued_at,
                    "paid": false,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let ranged = app
        .send(
            Method::GET,
            "/api/invoices?from=2024-02-10T00:00:00Z&to=2024-03-10T00:00:00Z&sortBy=amount",
            None,
        )
        .await;

    let numbers: Vec<&str> = ranged.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["number"].as_str())
        .collect();
    assert_eq!(ranged.body["total"], 2);
    assert_eq!(numbers, ["F-B", "F-C"]);
}

#[tokio::test]
async fn test_deleting_patient_removes_their_invoices() {
    let app = TestApp::spawn().await;
    let patient_id = app.create_patient("Ana Ruiz", "DOC1").await;
    app.create_invoice(&patient_id, "F-1", "10").await;

    let deleted = app
        .send(Method::DELETE, &format!("/api/patients/{}", patient_id), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let listed = app.send(Method::GET, "/api/invoices", None).await;
    assert_eq!(listed.body["total"], 0);
}

#[tokio::test]
async fn test_malformed_requests_get_json_errors() {
    let app = TestApp::spawn().await;
    let patient_id = app.create_patient("Ana Ruiz", "DOC1").await;

    let bad_query = app.send(Method::GET, "/api/invoices?paid=maybe", None).await;
    assert_eq!(bad_query.status, StatusCode::BAD_REQUEST);
    assert!(bad_query.body["error"].is_string());

    let bad_id = app.send(Method::GET, "/api/invoices/not-a-uuid", None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert!(bad_id.body["error"].is_string());

    let bad_body = app
        .send_raw(
            Method::POST,
            "/api/invoices",
            &format!(r#"{{"patientId": "{}", "number": "F-1""#, patient_id),
        )
        .await;
    assert_eq!(bad_body.status, StatusCode::BAD_REQUEST);
    assert!(bad_body.body["error"].is_string());

    // Well-formed JSON with a field of the wrong type.
    let wrong_type = app
        .send(
            Method::POST,
            "/api/invoices",
            Some(json!({
                "patientId": patient_id,
                "number": "F-1",
                "amount": "10.00",
                "paid": "yes",
            })),
        )
        .await;
    assert!(wrong_type.status.is_client_error());
    assert!(wrong_type.body["error"].is_string());
}
