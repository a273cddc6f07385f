use std::sync::Arc;

use hookforge_application::HookService;
use ipnet::IpNet;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub hook_service: HookService,
    pub redis_client: Option<redis::Client>,
    pub trusted_proxies: Arc<Vec<IpNet>>,
}
