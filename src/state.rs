/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Cheap to Clone (Arc inside); holds no token state between requests
 */
use std::sync::Arc;

use crate::services::oauth2::OAuth2Service;

#[derive(Clone)]
pub struct AppState {
    pub oauth2: Arc<dyn OAuth2Service>,
}

impl AppState {
    pub fn new(oauth2: Arc<dyn OAuth2Service>) -> Self {
        Self { oauth2 }
    }
}
