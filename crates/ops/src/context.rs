//! Operations context for dependency injection

use std::sync::Arc;

use lnf_config::Config;
use lnf_errors::{Error, OpsError};
use lnf_events::EventSender;
use lnf_resolve::{Resolver, ResolverSettings};
use lnf_store::{LocalStore, Store};

/// Everything an operation needs: store, resolver, events and configuration
pub struct OpsCtx {
    /// Object store the run reads from
    pub store: Arc<dyn Store>,
    /// Per-orphan decision engine, bound to `store`
    pub resolver: Resolver,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// Effective configuration, CLI overrides already applied
    pub config: Config,
}

impl OpsCtx {
    // No public constructor - use OpsContextBuilder instead

    /// Holding collection orphans are enumerated from
    #[must_use]
    pub fn holding_collection(&self) -> &str {
        &self.config.store.holding_collection
    }
}

impl std::fmt::Debug for OpsCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpsCtx")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Open the directory-backed store described by `config`
///
/// # Errors
///
/// Returns `StoreUnavailable` if the local root is not a readable directory.
pub async fn open_local_store(config: &Config) -> Result<Arc<dyn Store>, Error> {
    let store = LocalStore::open(config.local_root()).await?;
    Ok(Arc::new(store))
}

/// Builder for [`OpsCtx`]
#[derive(Default)]
pub struct OpsContextBuilder {
    store: Option<Arc<dyn Store>>,
    tx: Option<EventSender>,
    config: Option<Config>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set object store
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the context
    ///
    /// The resolver is derived from the store and configuration so the two
    /// can never disagree.
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let store = self.store.ok_or_else(|| OpsError::MissingComponent {
            component: "store".to_string(),
        })?;

        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event_sender".to_string(),
        })?;

        let config = self.config.ok_or_else(|| OpsError::MissingComponent {
            component: "config".to_string(),
        })?;

        let resolver = Resolver::new(store.clone(), &ResolverSettings::from_config(&config))
            .with_event_sender(tx.clone());

        Ok(OpsCtx {
            store,
            resolver,
            tx,
            config,
        })
    }
}
