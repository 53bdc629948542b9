use std::sync::Arc;

use docgate_core::AdmissionController;

use crate::config::ServerConfig;
use crate::store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Shared per-client limiter in front of every `/api` route.
    pub limiter: Arc<AdmissionController>,
    pub users: Arc<dyn UserStore>,
}
