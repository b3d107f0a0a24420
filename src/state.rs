//! Process-lifetime state shared read-only by every request.

use crate::{
    config::GatewaySettings,
    services::{listing_service::ListingService, store::ObjectStore},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub listings: ListingService,
    pub settings: Arc<GatewaySettings>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, settings: GatewaySettings) -> Self {
        Self {
            listings: ListingService::new(store.clone()),
            store,
            settings: Arc::new(settings),
        }
    }
}
