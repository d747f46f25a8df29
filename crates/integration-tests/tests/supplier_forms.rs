//! Public supplier forms and tenant isolation.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use supplierdb_core::{Namespace, TenantStore};
use supplierdb_integration_tests::{TestApp, supplier_form};

#[tokio::test]
async fn test_form_is_served_for_existing_tenant() {
    let app = TestApp::spawn().await;
    app.signup("Acme Co", "jane@acme.example").await;

    // Any spelling that derives to the namespace reaches the same form.
    for path in ["/acme-co", "/Acme-Co"] {
        let response = TestApp::client().get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        let body = response.text().await.unwrap();
        assert!(body.contains("action=\"/acme-co/submit\""));
    }
}

#[tokio::test]
async fn test_unknown_tenant_is_not_found() {
    let app = TestApp::spawn().await;

    let response = TestApp::client().get(app.url("/ghost")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.submit_supplier("ghost", "S-1", "sam@bolt.example").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let namespace = Namespace::derive("ghost").unwrap();
    assert!(!app.tenants.namespace_exists(&namespace).await.unwrap());
}

#[tokio::test]
async fn test_submission_is_stored_in_order() {
    let app = TestApp::spawn().await;
    app.signup("Acme Co", "jane@acme.example").await;

    let first = app.submit_supplier("acme-co", "S-1", "sam@bolt.example").await;
    assert_eq!(first.status(), StatusCode::CREATED);
    assert!(first.text().await.unwrap().contains("Sam Supplier"));
    app.submit_supplier("acme-co", "S-2", "kim@bolt.example").await;

    let namespace = Namespace::derive("acme-co").unwrap();
    let records = app.tenants.query_all(&namespace).await.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.supplier_id.as_str()).collect();
    assert_eq!(ids, ["S-1", "S-2"]);
    assert_eq!(records[0].mobile_phone, None);
    assert_eq!(records[0].postcode.as_deref(), Some("M1 1AA"));
}

#[tokio::test]
async fn test_missing_required_field_rerenders_form() {
    let app = TestApp::spawn().await;
    app.signup("Acme Co", "jane@acme.example").await;

    let mut form = supplier_form("S-1", "sam@bolt.example");
    form.retain(|(field, _)| *field != "core_business");

    let response = TestApp::client()
        .post(app.url("/acme-co/submit"))
        .form(&form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.text().await.unwrap();
    assert!(body.contains("Core business"));
    // Entered values are kept.
    assert!(body.contains("value=\"S-1\""));

    let namespace = Namespace::derive("acme-co").unwrap();
    assert!(app.tenants.query_all(&namespace).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let app = TestApp::spawn().await;
    app.signup("Acme Co", "jane@acme.example").await;
    let globex = app.signup("Globex", "hank@globex.example").await;

    app.submit_supplier("acme-co", "S-1", "sam@bolt.example").await;

    let acme = Namespace::derive("acme-co").unwrap();
    let globex_ns = Namespace::derive("globex").unwrap();
    assert_eq!(app.tenants.query_all(&acme).await.unwrap().len(), 1);
    assert!(app.tenants.query_all(&globex_ns).await.unwrap().is_empty());

    let dashboard = globex.get(app.url("/account")).send().await.unwrap();
    let body = dashboard.text().await.unwrap();
    assert!(body.contains("0 supplier(s)"));
    assert!(!body.contains("Sam Supplier"));
}
