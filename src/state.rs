use crate::application::admin::AdminService;
use crate::application::cart::CartService;
use crate::application::storefront::StorefrontService;
use crate::domain::error::AveoError;
use crate::domain::traits::KeyValueStore;
use crate::infrastructure::config::Config;
use crate::infrastructure::network::ApiClient;
use std::sync::Arc;

/// Storage key for the persisted bearer token.
pub const TOKEN_KEY: &str = "auth_token";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: Arc<ApiClient>,
    pub store: Arc<dyn KeyValueStore>,
    pub admin: Arc<AdminService>,
    pub storefront: Arc<StorefrontService>,
    pub cart: CartService<dyn KeyValueStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self, AveoError> {
        let api = Arc::new(ApiClient::from_config(&config)?);
        Ok(Self::with_client(config, store, api))
    }

    pub fn with_client(config: Config, store: Arc<dyn KeyValueStore>, api: Arc<ApiClient>) -> Self {
        let ttl = config.cache_ttl();
        Self {
            admin: Arc::new(AdminService::new(api.clone(), ttl)),
            storefront: Arc::new(StorefrontService::new(api.clone(), ttl)),
            cart: CartService::new(store.clone()),
            config: Arc::new(config),
            api,
            store,
        }
    }

    /// Put a previously saved token back on the client.
    pub async fn restore_session(&self) -> Result<bool, AveoError> {
        let token = self.store.load(TOKEN_KEY).await?;
        self.api.set_token(token);
        Ok(self.api.token().is_some())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), AveoError> {
        let response = self.storefront.login(email, password).await?;
        self.admin.cache().clear();
        self.store.save(TOKEN_KEY, &response.access_token).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), AveoError> {
        self.storefront.logout();
        self.admin.cache().clear();
        self.store.remove(TOKEN_KEY).await
    }
}
