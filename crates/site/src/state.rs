//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::menu::Menu;
use crate::services::mollie::{MollieClient, MollieError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The two optional members encode the two
/// fallback modes: no pool means demo mode (nothing is persisted), no
/// Mollie client means test mode (orders complete without payment).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: Option<PgPool>,
    mollie: Option<MollieClient>,
    menu: Menu,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment client cannot be built from the
    /// configured API key.
    pub fn new(config: SiteConfig, pool: Option<PgPool>, menu: Menu) -> Result<Self, MollieError> {
        let mollie = config
            .mollie_api_key
            .as_ref()
            .map(MollieClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                mollie,
                menu,
            }),
        })
    }

    /// State with an externally built payment client (tests).
    #[must_use]
    pub fn with_mollie(config: SiteConfig, pool: Option<PgPool>, menu: Menu, mollie: Option<MollieClient>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                mollie,
                menu,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get the database connection pool, if one is configured.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get the payment provider client, if one is configured.
    #[must_use]
    pub fn mollie(&self) -> Option<&MollieClient> {
        self.inner.mollie.as_ref()
    }

    /// Get the menu dataset.
    #[must_use]
    pub fn menu(&self) -> &Menu {
        &self.inner.menu
    }
}
