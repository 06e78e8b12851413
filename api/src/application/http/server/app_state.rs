use std::sync::Arc;

use labelscan_core::application::LabelScanService;

use crate::args::ServerArgs;

#[derive(Clone)]
pub struct AppState {
    pub server: Arc<ServerArgs>,
    pub service: LabelScanService,
}

impl AppState {
    pub fn new(server: ServerArgs, service: LabelScanService) -> Self {
        Self {
            server: Arc::new(server),
            service,
        }
    }
}
