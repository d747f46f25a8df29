//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use supplierdb_core::{TenantStore, UserDirectory};

use crate::config::WebConfig;
use crate::db::{PgTenantStore, PgUserDirectory};
use crate::services::{AuthService, EmailError, LogMailer, ResetMailer, SmtpMailer, SupplierService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and holds the storage ports as
/// trait objects, so the same router runs over `PostgreSQL` or in memory.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    tenants: Arc<dyn TenantStore>,
    directory: Arc<dyn UserDirectory>,
    mailer: Arc<dyn ResetMailer>,
}

impl AppState {
    /// Create application state from explicit adapters.
    #[must_use]
    pub fn new(
        config: WebConfig,
        tenants: Arc<dyn TenantStore>,
        directory: Arc<dyn UserDirectory>,
        mailer: Arc<dyn ResetMailer>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                tenants,
                directory,
                mailer,
            }),
        }
    }

    /// Create application state backed by `PostgreSQL`.
    ///
    /// Uses SMTP when configured and logs reset links otherwise.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the SMTP relay configuration is invalid.
    pub fn with_postgres(config: WebConfig, pool: &PgPool) -> Result<Self, EmailError> {
        let mailer: Arc<dyn ResetMailer> = match &config.email {
            Some(email) => Arc::new(SmtpMailer::new(email)?),
            None => {
                tracing::warn!("SMTP not configured; password reset emails will not be sent");
                Arc::new(LogMailer)
            }
        };

        Ok(Self::new(
            config,
            Arc::new(PgTenantStore::new(pool.clone())),
            Arc::new(PgUserDirectory::new(pool.clone())),
            mailer,
        ))
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get the tenant store.
    #[must_use]
    pub fn tenants(&self) -> &dyn TenantStore {
        self.inner.tenants.as_ref()
    }

    /// Get the account directory.
    #[must_use]
    pub fn directory(&self) -> &dyn UserDirectory {
        self.inner.directory.as_ref()
    }

    /// Get the reset link mailer.
    #[must_use]
    pub fn mailer(&self) -> &dyn ResetMailer {
        self.inner.mailer.as_ref()
    }

    /// Authentication service over this state's ports.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.directory(), self.tenants())
    }

    /// Supplier service over this state's tenant store.
    #[must_use]
    pub fn suppliers(&self) -> SupplierService<'_> {
        SupplierService::new(self.tenants())
    }
}
