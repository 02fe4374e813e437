use std::sync::Arc;

use crate::{
    auth::JwtConfig,
    db::{InteractionStore, MemoryStore, UserStore},
    services::{
        catalog::CatalogProvider,
        recommendations::{RecommendationEngine, RuleBasedEngine},
    },
};

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub interactions: Arc<dyn InteractionStore>,
    pub users: Arc<dyn UserStore>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub recommender: Arc<dyn RecommendationEngine>,
    pub jwt: JwtConfig,
}

impl AppState {
    /// Wires the rule-based engine on top of `catalog`
    pub fn new(
        interactions: Arc<dyn InteractionStore>,
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogProvider>,
        jwt: JwtConfig,
    ) -> Self {
        let recommender = Arc::new(RuleBasedEngine::new(Arc::clone(&catalog)));

        Self {
            interactions,
            users,
            catalog,
            recommender,
            jwt,
        }
    }

    /// State backed by a fresh in-memory store, for tests and local demos
    pub fn in_memory(catalog: Arc<dyn CatalogProvider>, jwt: JwtConfig) -> Self {
        let store = MemoryStore::new();
        Self::new(Arc::new(store.clone()), Arc::new(store), catalog, jwt)
    }
}
