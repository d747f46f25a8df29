//! `PostgreSQL` tenant store and account directory against a real database.
//!
//! These tests need a `PostgreSQL` server:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/supplierdb_test \
//!     cargo test -p supplierdb-integration-tests --test postgres_adapters -- --ignored
//! ```
//!
//! Migrations are applied on connect. Every test works in fresh namespaces
//! and emails, so tests can share one database and run concurrently.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use supplierdb_core::{
    AccountLookup, CredentialHash, DirectoryError, Email, EnsureOutcome, Namespace, NewAccount,
    SupplierRecord, TenantStore, TenantStoreError, UserDirectory,
};
use supplierdb_web::db::{PgTenantStore, PgUserDirectory};

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("connect to database");
    sqlx::migrate!("../web/migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

/// A namespace no other test uses.
fn fresh_namespace() -> Namespace {
    Namespace::derive(&format!("t-{}", Uuid::new_v4().simple())).unwrap()
}

fn fresh_email() -> Email {
    Email::parse(&format!("{}@supplierdb.test", Uuid::new_v4().simple())).unwrap()
}

fn record(supplier_id: &str, email: &str) -> SupplierRecord {
    SupplierRecord {
        supplier_id: supplier_id.to_string(),
        name: "Sam Supplier".to_string(),
        company: "Bolt Works".to_string(),
        email: email.to_string(),
        company_phone: "0161 496 0000".to_string(),
        mobile_phone: None,
        core_business: "Fasteners".to_string(),
        website: Some("https://boltworks.example".to_string()),
        postcode: None,
    }
}

fn new_account(email: Email, namespace: Namespace) -> NewAccount {
    NewAccount {
        display_name: "Jane Doe".to_string(),
        email,
        company_name: namespace.to_string(),
        namespace,
        credential_hash: CredentialHash::new("$argon2id$stub".to_string()),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_concurrent_ensure_creates_once() {
    let store = Arc::new(PgTenantStore::new(pool().await));
    let namespace = fresh_namespace();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let namespace = namespace.clone();
            tokio::spawn(async move { store.ensure_namespace(&namespace).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() == EnsureOutcome::Created {
            created += 1;
        }
    }
    assert_eq!(created, 1);
    assert!(store.namespace_exists(&namespace).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_insert_into_unknown_namespace_is_rejected() {
    let store = PgTenantStore::new(pool().await);
    let ghost = fresh_namespace();

    let err = store
        .insert(&ghost, &record("S-1", "sam@bolt.example"))
        .await
        .unwrap_err();
    assert!(matches!(err, TenantStoreError::UnknownNamespace(ns) if ns == ghost));

    assert!(!store.namespace_exists(&ghost).await.unwrap());
    assert!(!store.list_namespaces().await.unwrap().contains(&ghost));
    assert!(matches!(
        store.query_all(&ghost).await,
        Err(TenantStoreError::UnknownNamespace(_))
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_records_round_trip_in_insertion_order() {
    let store = PgTenantStore::new(pool().await);
    let namespace = fresh_namespace();
    let other = fresh_namespace();
    store.ensure_namespace(&namespace).await.unwrap();
    store.ensure_namespace(&other).await.unwrap();

    let first = record("S-2", "b@bolt.example");
    let second = record("S-1", "a@bolt.example");
    store.insert(&namespace, &first).await.unwrap();
    store.insert(&namespace, &second).await.unwrap();

    assert_eq!(store.query_all(&namespace).await.unwrap(), [first, second]);
    assert!(store.query_all(&other).await.unwrap().is_empty());

    assert!(!store.release_namespace(&namespace).await.unwrap());
    assert!(store.release_namespace(&other).await.unwrap());
    assert!(!store.namespace_exists(&other).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_account_uniqueness_is_classified() {
    let pool = pool().await;
    let tenants = PgTenantStore::new(pool.clone());
    let directory = PgUserDirectory::new(pool);

    let namespace = fresh_namespace();
    let other = fresh_namespace();
    tenants.ensure_namespace(&namespace).await.unwrap();
    tenants.ensure_namespace(&other).await.unwrap();

    let email = fresh_email();
    let account = directory
        .create_account(new_account(email.clone(), namespace.clone()))
        .await
        .unwrap();
    assert_eq!(account.namespace, namespace);

    let err = directory
        .create_account(new_account(email.clone(), other))
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::DuplicateEmail));

    let err = directory
        .create_account(new_account(fresh_email(), namespace.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::NamespaceTaken(ns) if ns == namespace));

    let found = directory
        .find(&AccountLookup::Company(namespace))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.email, email);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_reset_token_is_consumed_once() {
    let pool = pool().await;
    let tenants = PgTenantStore::new(pool.clone());
    let directory = Arc::new(PgUserDirectory::new(pool));

    let namespace = fresh_namespace();
    tenants.ensure_namespace(&namespace).await.unwrap();
    let email = fresh_email();
    directory
        .create_account(new_account(email.clone(), namespace))
        .await
        .unwrap();

    let digest = Uuid::new_v4().simple().to_string();
    let now = Utc::now();
    directory
        .set_reset_token(&email, &digest, now + Duration::minutes(60))
        .await
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let directory = Arc::clone(&directory);
            let digest = digest.clone();
            tokio::spawn(async move { directory.consume_reset_token(&digest, now).await })
        })
        .collect();

    let mut redeemed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(account) => {
                assert_eq!(account.email, email);
                assert!(account.reset_token_digest.is_none());
                redeemed += 1;
            }
            Err(err) => assert!(matches!(err, DirectoryError::ExpiredOrInvalid)),
        }
    }
    assert_eq!(redeemed, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_expired_reset_token_is_rejected() {
    let pool = pool().await;
    let tenants = PgTenantStore::new(pool.clone());
    let directory = PgUserDirectory::new(pool);

    let namespace = fresh_namespace();
    tenants.ensure_namespace(&namespace).await.unwrap();
    let email = fresh_email();
    directory
        .create_account(new_account(email.clone(), namespace))
        .await
        .unwrap();

    let digest = Uuid::new_v4().simple().to_string();
    let now = Utc::now();
    directory
        .set_reset_token(&email, &digest, now)
        .await
        .unwrap();

    assert!(matches!(
        directory.consume_reset_token(&digest, now).await,
        Err(DirectoryError::ExpiredOrInvalid)
    ));
}
