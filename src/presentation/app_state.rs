// Application state for HTTP handlers
use crate::application::overview_service::OverviewService;
use crate::application::raw_data_service::RawDataService;
use crate::application::streaming_service::StreamingOverviewService;
use crate::infrastructure::config::RawDataSettings;

#[derive(Clone)]
pub struct AppState {
    pub overview_service: OverviewService,
    pub streaming_service: StreamingOverviewService,
    pub raw_data_service: RawDataService,
    pub raw_data_settings: RawDataSettings,
}
