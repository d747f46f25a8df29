//! Integration tests for SupplierDB.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p supplierdb-integration-tests
//! ```
//!
//! Each test spawns the full web router on an ephemeral port over the
//! in-memory tenant store, account directory, session store and mailer, then
//! drives it over HTTP with a cookie-keeping client.
//!
//! # Test Categories
//!
//! - `signup_flow` - Signup, login, dashboard and export
//! - `supplier_forms` - Public form submission and tenant isolation
//! - `password_reset` - Forgot/reset password round trip
//! - `health` - Liveness, readiness and response headers

use std::io::Cursor;
use std::sync::Arc;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use reqwest::{Client, redirect};
use secrecy::SecretString;
use tower_sessions::MemoryStore;
use url::Url;

use supplierdb_web::config::WebConfig;
use supplierdb_web::db::{MemoryTenantStore, MemoryUserDirectory};
use supplierdb_web::services::MemoryMailer;
use supplierdb_web::state::AppState;

/// Default password used by [`TestApp::signup`].
pub const PASSWORD: &str = "correct horse battery";

/// A running web server over in-memory adapters.
pub struct TestApp {
    /// Base URL ending in `/`.
    pub base_url: Url,
    /// Tenant store behind the server.
    pub tenants: Arc<MemoryTenantStore>,
    /// Account directory behind the server.
    pub directory: Arc<MemoryUserDirectory>,
    /// Outbox of reset emails.
    pub mailer: Arc<MemoryMailer>,
}

impl TestApp {
    /// Spawn the server on `127.0.0.1` with a random port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let base_url = Url::parse(&format!("http://{addr}/")).expect("valid base url");

        let config = WebConfig {
            database_url: SecretString::from("postgres://unused"),
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/../web/static").into(),
            reset_token_ttl: chrono::Duration::minutes(60),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let tenants = Arc::new(MemoryTenantStore::new());
        let directory = Arc::new(MemoryUserDirectory::new());
        let mailer = Arc::new(MemoryMailer::new());
        let state = AppState::new(config, tenants.clone(), directory.clone(), mailer.clone());
        let router = supplierdb_web::app(state, MemoryStore::default());

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });

        Self {
            base_url,
            tenants,
            directory,
            mailer,
        }
    }

    /// Absolute URL of a path on the test server.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid relative URL.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.base_url
            .join(path.trim_start_matches('/'))
            .expect("valid path")
    }

    /// A client that keeps cookies and does not follow redirects.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// Sign up a company with [`PASSWORD`] and return the logged-in client.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or signup is rejected.
    pub async fn signup(&self, company_name: &str, email: &str) -> Client {
        let client = Self::client();
        let response = client
            .post(self.url("/auth/signup"))
            .form(&[
                ("name", "Jane Doe"),
                ("email", email),
                ("company_name", company_name),
                ("password", PASSWORD),
            ])
            .send()
            .await
            .expect("signup request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED, "signup rejected");
        client
    }

    /// Submit a complete supplier record to a tenant's form.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn submit_supplier(
        &self,
        namespace: &str,
        supplier_id: &str,
        email: &str,
    ) -> reqwest::Response {
        Self::client()
            .post(self.url(&format!("/{namespace}/submit")))
            .form(&supplier_form(supplier_id, email))
            .send()
            .await
            .expect("submit request")
    }
}

/// A downloaded workbook read back into cells.
pub struct Workbook {
    /// Worksheet names in order.
    pub sheet_names: Vec<String>,
    /// Cells of the first worksheet, blank cells as `None`.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Parse `.xlsx` bytes.
///
/// # Panics
///
/// Panics if the bytes are not a workbook with at least one worksheet.
#[must_use]
pub fn read_workbook(bytes: &[u8]) -> Workbook {
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(Cursor::new(bytes.to_vec())).expect("valid xlsx");
    let sheet_names = workbook.sheet_names();
    let first = sheet_names.first().expect("at least one worksheet");
    let range = workbook.worksheet_range(first).expect("first worksheet");
    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .collect();

    Workbook { sheet_names, rows }
}

/// Form fields of a complete supplier submission.
#[must_use]
pub fn supplier_form<'a>(supplier_id: &'a str, email: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("supplierID", supplier_id),
        ("name", "Sam Supplier"),
        ("company", "Bolt Works"),
        ("email", email),
        ("company_phone_number", "0161 496 0000"),
        ("mobile_phone_number", ""),
        ("core_business", "Fasteners"),
        ("website", "https://boltworks.example"),
        ("postcode", "M1 1AA"),
    ]
}
