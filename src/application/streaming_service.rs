// Streaming overview service - Progressive loading of the overview dashboard
use crate::application::overview_service::{OverviewRequest, OverviewService};
use crate::domain::dashboard::{Chart, ChartKind, Dashboard, Metric};
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize)]
pub struct ChartSkeleton {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabSkeleton {
    pub id: String,
    pub title: String,
    pub charts: Vec<ChartSkeleton>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton {
        title: String,
        tabs: Vec<TabSkeleton>,
    },
    Metrics {
        tab_id: String,
        metrics: Vec<Metric>,
    },
    Chart {
        tab_id: String,
        chart: Chart,
    },
    Complete {
        widgets: usize,
        duration_ms: i64,
    },
    Error {
        message: String,
    },
}

#[derive(Clone)]
pub struct StreamingOverviewService {
    overview_service: OverviewService,
}

impl StreamingOverviewService {
    pub fn new(overview_service: OverviewService) -> Self {
        Self { overview_service }
    }

    pub async fn stream_overview(&self, request: OverviewRequest) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(32);
        let start_time = Instant::now();

        // 1. Layout is data-independent, send it before the upstream fetch
        let top_sellers = self.overview_service.top_sellers(request.top_sellers);
        let layout = self.overview_service.build_dashboard(&[], top_sellers);
        let _ = tx.send(skeleton(&layout)).await;

        // 2. Fetch and aggregate in the background, one message per widget
        let service = self.overview_service.clone();
        tokio::spawn(async move {
            let overview = match service.get_overview(&request).await {
                Ok(overview) => overview,
                Err(e) => {
                    tracing::error!("Overview stream failed: {:#}", e);
                    let _ = tx
                        .send(StreamMessage::Error {
                            message: format!("{:#}", e),
                        })
                        .await;
                    return;
                }
            };

            let widgets = overview.dashboard.widget_count();
            for tab in overview.dashboard.tabs {
                let metrics = StreamMessage::Metrics {
                    tab_id: tab.id.clone(),
                    metrics: tab.metrics,
                };
                if tx.send(metrics).await.is_err() {
                    tracing::debug!("Overview stream receiver dropped");
                    return;
                }

                for chart in tab.charts {
                    let msg = StreamMessage::Chart {
                        tab_id: tab.id.clone(),
                        chart,
                    };
                    if tx.send(msg).await.is_err() {
                        tracing::debug!("Overview stream receiver dropped");
                        return;
                    }
                }
            }

            // 3. Completion
            let duration_ms = start_time.elapsed().as_millis() as i64;
            let _ = tx
                .send(StreamMessage::Complete {
                    widgets,
                    duration_ms,
                })
                .await;
        });

        rx
    }
}

fn skeleton(layout: &Dashboard) -> StreamMessage {
    let tabs = layout
        .tabs
        .iter()
        .map(|t| TabSkeleton {
            id: t.id.clone(),
            title: t.title.clone(),
            charts: t
                .charts
                .iter()
                .map(|c| ChartSkeleton {
                    id: c.id.clone(),
                    title: c.title.clone(),
                    kind: c.kind(),
                })
                .collect(),
        })
        .collect();

    StreamMessage::Skeleton {
        title: layout.title.clone(),
        tabs,
    }
}
