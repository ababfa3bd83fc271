use crate::{
    config::PurchaseServiceConfig,
    constants::DEFAULT_PROVIDER_IDENTIFIERS,
    data::{
        datasources::native_store_datasource::NativeStoreConnector,
        repositories::native_store_backend::NativeStoreBackend,
    },
    domain::{entities::iap_provider::IapProvider, repositories::store_backend::StoreBackend},
    purchase_service::PurchaseService,
};

/// Instantiates backends from implementation identifiers.
pub trait BackendFactory {
    /// Returns `None` when no backend for `identifier` initializes.
    fn create(&self, identifier: &str) -> Option<Box<dyn StoreBackend>>;
}

/// Factory for backends driven through a native store runtime.
pub struct NativeBackendFactory<C: NativeStoreConnector> {
    connector: C,
}

impl<C: NativeStoreConnector> NativeBackendFactory<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }
}

impl<C: NativeStoreConnector> BackendFactory for NativeBackendFactory<C> {
    fn create(&self, identifier: &str) -> Option<Box<dyn StoreBackend>> {
        NativeStoreBackend::connect(&self.connector, identifier)
            .map(|b| Box::new(b) as Box<dyn StoreBackend>)
    }
}

/// Picks the store backend to use, once, at startup.
///
/// Providers are tried in registration order when asked for
/// `IapProvider::Auto`.
pub struct ProviderSelector<F: BackendFactory> {
    factory: F,
    providers: Vec<(IapProvider, String)>,
}

impl<F: BackendFactory> ProviderSelector<F> {
    /// A selector with no known providers; see `register`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            providers: Vec::new(),
        }
    }

    /// A selector that knows the stock App Store, Google Play and Amazon
    /// backends, in that priority order.
    pub fn with_default_providers(factory: F) -> Self {
        let mut selector = Self::new(factory);
        for (provider, identifier) in DEFAULT_PROVIDER_IDENTIFIERS.iter() {
            selector.register(*provider, *identifier);
        }
        selector
    }

    /// Maps `provider` to `identifier`. Re-registering a provider changes its
    /// identifier but keeps its priority.
    pub fn register(&mut self, provider: IapProvider, identifier: impl Into<String>) -> &mut Self {
        let identifier = identifier.into();
        if provider == IapProvider::Auto {
            log::warn!("Ignoring registration of {identifier} under IapProvider::Auto.");
            return self;
        }
        match self.providers.iter_mut().find(|(p, _)| *p == provider) {
            Some(entry) => entry.1 = identifier,
            None => self.providers.push((provider, identifier)),
        }
        self
    }

    /// Returns the backend for `provider`, or the first that initializes for
    /// `IapProvider::Auto`. `None` means no backend is available.
    pub fn create(&self, provider: IapProvider) -> Option<Box<dyn StoreBackend>> {
        let backend = if provider == IapProvider::Auto {
            self.providers
                .iter()
                .find_map(|(_, identifier)| self.create_by_identifier(identifier))
        } else {
            self.providers
                .iter()
                .find(|(p, _)| *p == provider)
                .and_then(|(_, identifier)| self.create_by_identifier(identifier))
        };
        if backend.is_none() {
            log::warn!("No store backend available for {provider:?}.");
        }
        backend
    }

    /// Instantiates a backend from an implementation identifier directly,
    /// bypassing the provider table.
    pub fn create_by_identifier(&self, identifier: &str) -> Option<Box<dyn StoreBackend>> {
        let backend = self.factory.create(identifier);
        if backend.is_some() {
            log::info!("Selected store backend {identifier}.");
        }
        backend
    }

    /// Selects the backend named by `config.provider` and wraps it in a
    /// configured `PurchaseService`.
    pub fn create_service(&self, config: &PurchaseServiceConfig) -> Option<PurchaseService> {
        self.create(config.provider)
            .map(|backend| PurchaseService::with_config(backend, config))
    }
}
