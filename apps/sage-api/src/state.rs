use std::sync::Arc;

use sage_service::ChatService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ChatService>,
}
impl AppState {
	pub fn new(config: sage_config::Config) -> Self {
		Self { service: Arc::new(ChatService::new(config)) }
	}

	pub fn with_service(service: ChatService) -> Self {
		Self { service: Arc::new(service) }
	}
}
