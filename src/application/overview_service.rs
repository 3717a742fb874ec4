// Overview service - Use case for building the sales overview dashboard
use crate::application::sales_repository::{SalesQuery, SalesRepository};
use crate::domain::aggregation::{self, Measure, MonthlyTotal};
use crate::domain::dashboard::{Bar, Chart, ChartBody, Dashboard, LineSeries, MapPoint, Metric, Tab};
use crate::domain::filter::{distinct, Inclusion, SaleFilter};
use crate::domain::format::format_number;
use crate::domain::sale::SaleRecord;
use crate::infrastructure::config::OverviewSettings;
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct OverviewRequest {
    pub query: SalesQuery,
    /// Empty means every seller.
    pub sellers: Vec<String>,
    pub top_sellers: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub dashboard: Dashboard,
    /// Sellers present in the partition before the seller selection is applied.
    pub available_sellers: Vec<String>,
    pub record_count: usize,
    pub top_sellers: usize,
}

#[derive(Clone)]
pub struct OverviewService {
    repository: Arc<dyn SalesRepository>,
    settings: OverviewSettings,
}

impl OverviewService {
    pub fn new(repository: Arc<dyn SalesRepository>, settings: OverviewSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub fn settings(&self) -> &OverviewSettings {
        &self.settings
    }

    pub async fn get_overview(&self, request: &OverviewRequest) -> anyhow::Result<Overview> {
        let records = self
            .repository
            .fetch_sales(&request.query)
            .await
            .context("Failed to fetch sales for the overview")?;

        tracing::debug!(
            "Fetched {} sales for region={} year={:?}",
            records.len(),
            request.query.region.name(),
            request.query.year
        );

        Ok(self.build_overview(records, request))
    }

    pub fn build_overview(&self, records: Vec<SaleRecord>, request: &OverviewRequest) -> Overview {
        let available_sellers = distinct(&records, |r| &r.seller);

        let records = if request.sellers.is_empty() {
            records
        } else {
            let filter = SaleFilter {
                sellers: Inclusion::only(request.sellers.iter().cloned()),
                ..Default::default()
            };
            filter.apply(&records)
        };

        let top_sellers = self.top_sellers(request.top_sellers);
        let dashboard = self.build_dashboard(&records, top_sellers);

        Overview {
            dashboard,
            available_sellers,
            record_count: records.len(),
            top_sellers,
        }
    }

    /// Requested seller ranking size, clamped to the configured bounds.
    /// Bounds given in the wrong order are swapped.
    pub fn top_sellers(&self, requested: Option<usize>) -> usize {
        let s = &self.settings;
        let (low, high) = (
            s.min_sellers.min(s.max_sellers),
            s.min_sellers.max(s.max_sellers),
        );
        requested.unwrap_or(s.default_sellers).clamp(low, high)
    }

    pub fn build_dashboard(&self, records: &[SaleRecord], top_sellers: usize) -> Dashboard {
        let tabs = vec![
            Tab::new(
                "revenue",
                "Revenue",
                self.metrics(records),
                self.measure_charts(records, Measure::Revenue),
            ),
            Tab::new(
                "quantity",
                "Sales quantity",
                self.metrics(records),
                self.measure_charts(records, Measure::Quantity),
            ),
            Tab::new(
                "sellers",
                "Sellers",
                self.metrics(records),
                self.seller_charts(records, top_sellers),
            ),
        ];

        Dashboard::new(self.settings.title.clone(), tabs)
    }

    fn metrics(&self, records: &[SaleRecord]) -> Vec<Metric> {
        let revenue = aggregation::total(records, Measure::Revenue);
        vec![
            Metric::new(
                "Revenue",
                format_number(revenue, Some(&self.settings.currency_prefix)),
            ),
            Metric::new("Sales", format_number(records.len() as f64, None)),
        ]
    }

    fn measure_charts(&self, records: &[SaleRecord], measure: Measure) -> Vec<Chart> {
        let (prefix, noun) = match measure {
            Measure::Revenue => ("revenue", "Revenue"),
            Measure::Quantity => ("sales", "Sales"),
        };

        let states = aggregation::by_state(records, measure);
        let map_points = states
            .iter()
            .map(|s| MapPoint {
                label: s.state.clone(),
                lat: s.lat,
                lon: s.lon,
                value: s.value,
            })
            .collect();

        let top_states = aggregation::top_n(&states, self.settings.top_states)
            .into_iter()
            .map(|s| Bar::new(s.state, s.value))
            .collect();

        let categories = aggregation::by_category(records, measure)
            .into_iter()
            .map(|c| Bar::new(c.key, c.value))
            .collect();

        let monthly = aggregation::monthly(records, measure);

        vec![
            Chart::new(
                &format!("{prefix}_map"),
                format!("{noun} by state"),
                None,
                ChartBody::Map { points: map_points },
            ),
            Chart::new(
                &format!("{prefix}_monthly"),
                format!("Monthly {}", noun.to_lowercase()),
                Some(noun),
                line_body(&monthly),
            ),
            Chart::new(
                &format!("{prefix}_top_states"),
                format!("Top {} states ({})", self.settings.top_states, noun.to_lowercase()),
                Some(noun),
                ChartBody::Bar { bars: top_states },
            ),
            Chart::new(
                &format!("{prefix}_categories"),
                format!("{noun} by category"),
                Some(noun),
                ChartBody::Bar { bars: categories },
            ),
        ]
    }

    fn seller_charts(&self, records: &[SaleRecord], k: usize) -> Vec<Chart> {
        let totals = aggregation::by_seller(records);

        let ranking = |measure: Measure| -> Vec<Bar> {
            aggregation::top_sellers(&totals, measure, k)
                .into_iter()
                .map(|s| {
                    let value = s.value(measure);
                    Bar::new(s.seller, value)
                })
                .collect()
        };

        vec![
            Chart::new(
                "sellers_revenue",
                format!("Top {k} sellers (revenue)"),
                Some("Revenue"),
                ChartBody::HorizontalBar {
                    bars: ranking(Measure::Revenue),
                },
            ),
            Chart::new(
                "sellers_sales",
                format!("Top {k} sellers (sales)"),
                Some("Sales"),
                ChartBody::HorizontalBar {
                    bars: ranking(Measure::Quantity),
                },
            ),
        ]
    }
}

/// Splits the monthly totals into one series per year. The y-axis bound comes
/// from the series being drawn.
fn line_body(monthly: &[MonthlyTotal]) -> ChartBody {
    let mut series: Vec<LineSeries> = Vec::new();
    for point in monthly {
        let name = point.year.to_string();
        match series.last_mut() {
            Some(current) if current.name == name => {
                current.points.push(Bar::new(point.month_name, point.value));
            }
            _ => series.push(LineSeries {
                name,
                points: vec![Bar::new(point.month_name, point.value)],
            }),
        }
    }

    let y_max = monthly.iter().map(|m| m.value).fold(0.0, f64::max);

    ChartBody::Line { series, y_max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sales_repository::tests::InMemoryRepository;
    use crate::domain::dashboard::ChartKind;
    use crate::domain::region::Region;
    use crate::domain::sale::tests::sale;

    fn settings() -> OverviewSettings {
        OverviewSettings {
            title: "Sales Dashboard".to_string(),
            currency_prefix: "R$".to_string(),
            top_states: 2,
            first_year: 2020,
            last_year: 2023,
            min_sellers: 2,
            max_sellers: 10,
            default_sellers: 5,
        }
    }

    fn dataset() -> Vec<SaleRecord> {
        vec![
            sale("Livro", "livros", 50.0, (2020, 11, 3), "Ana", "SP"),
            sale("Mesa", "moveis", 1300.0, (2020, 12, 15), "Bruno", "BA"),
            sale("Cadeira", "moveis", 120.0, (2021, 1, 9), "Ana", "SP"),
            sale("Fone", "eletronicos", 80.0, (2021, 1, 21), "Carla", "RJ"),
            sale("Livro", "livros", 60.0, (2021, 2, 27), "Ana", "SP"),
        ]
    }

    fn chart<'a>(dashboard: &'a Dashboard, id: &str) -> &'a Chart {
        dashboard
            .tabs
            .iter()
            .flat_map(|t| t.charts.iter())
            .find(|c| c.id == id)
            .unwrap()
    }

    #[test]
    fn test_dashboard_layout() {
        let service = OverviewService::new(Arc::new(InMemoryRepository::default()), settings());
        let dashboard = service.build_dashboard(&dataset(), 5);

        let tabs: Vec<&str> = dashboard.tabs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(tabs, vec!["revenue", "quantity", "sellers"]);

        let charts: usize = dashboard.tabs.iter().map(|t| t.charts.len()).sum();
        assert_eq!(charts, 10);
        assert_eq!(dashboard.widget_count(), 16);

        assert_eq!(chart(&dashboard, "revenue_map").kind(), ChartKind::Map);
        assert_eq!(chart(&dashboard, "sales_monthly").kind(), ChartKind::Line);
        assert_eq!(chart(&dashboard, "sellers_sales").kind(), ChartKind::HorizontalBar);
    }

    #[test]
    fn test_metrics_are_formatted() {
        let service = OverviewService::new(Arc::new(InMemoryRepository::default()), settings());
        let dashboard = service.build_dashboard(&dataset(), 5);

        let metrics = &dashboard.tabs[0].metrics;
        assert_eq!(metrics[0].value, "R$ 1.61 thousand");
        assert_eq!(metrics[1].value, "5.00");
    }

    #[test]
    fn test_top_states_truncated() {
        let service = OverviewService::new(Arc::new(InMemoryRepository::default()), settings());
        let dashboard = service.build_dashboard(&dataset(), 5);

        match &chart(&dashboard, "revenue_top_states").body {
            ChartBody::Bar { bars } => {
                assert_eq!(bars.len(), 2);
                assert_eq!(bars[0], Bar::new("BA", 1300.0));
                assert_eq!(bars[1].label, "SP");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_monthly_series_per_year_with_own_bound() {
        let service = OverviewService::new(Arc::new(InMemoryRepository::default()), settings());
        let dashboard = service.build_dashboard(&dataset(), 5);

        match &chart(&dashboard, "sales_monthly").body {
            ChartBody::Line { series, y_max } => {
                let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["2020", "2021"]);
                assert_eq!(series[0].points[0].label, "November");
                assert_eq!(series[1].points.len(), 2);
                assert_eq!(*y_max, 2.0);
            }
            other => panic!("unexpected body {:?}", other),
        }

        match &chart(&dashboard, "revenue_monthly").body {
            ChartBody::Line { y_max, .. } => assert_eq!(*y_max, 1300.0),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_seller_charts_rank_independently() {
        let service = OverviewService::new(Arc::new(InMemoryRepository::default()), settings());
        let dashboard = service.build_dashboard(&dataset(), 2);

        match &chart(&dashboard, "sellers_revenue").body {
            ChartBody::HorizontalBar { bars } => {
                assert_eq!(bars[0], Bar::new("Bruno", 1300.0));
                assert_eq!(bars[1], Bar::new("Ana", 230.0));
            }
            other => panic!("unexpected body {:?}", other),
        }

        match &chart(&dashboard, "sellers_sales").body {
            ChartBody::HorizontalBar { bars } => {
                assert_eq!(bars[0], Bar::new("Ana", 3.0));
                assert_eq!(bars.len(), 2);
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_top_sellers_clamped() {
        let service = OverviewService::new(Arc::new(InMemoryRepository::default()), settings());
        assert_eq!(service.top_sellers(None), 5);
        assert_eq!(service.top_sellers(Some(1)), 2);
        assert_eq!(service.top_sellers(Some(50)), 10);
        assert_eq!(service.top_sellers(Some(7)), 7);
    }

    #[test]
    fn test_top_sellers_with_swapped_bounds() {
        let mut swapped = settings();
        swapped.min_sellers = 10;
        swapped.max_sellers = 2;
        let service = OverviewService::new(Arc::new(InMemoryRepository::default()), swapped);

        assert_eq!(service.top_sellers(None), 5);
        assert_eq!(service.top_sellers(Some(1)), 2);
        assert_eq!(service.top_sellers(Some(50)), 10);
    }

    #[tokio::test]
    async fn test_get_overview_applies_seller_selection() {
        let repository = Arc::new(InMemoryRepository::with_records(dataset()));
        let service = OverviewService::new(repository.clone(), settings());

        let request = OverviewRequest {
            query: SalesQuery {
                region: Region::Nordeste,
                year: Some(2021),
            },
            sellers: vec!["Carla".to_string()],
            top_sellers: None,
        };
        let overview = service.get_overview(&request).await.unwrap();

        assert_eq!(overview.record_count, 1);
        assert_eq!(overview.available_sellers, vec!["Ana", "Bruno", "Carla"]);
        assert_eq!(overview.dashboard.tabs[0].metrics[0].value, "R$ 80.00");
        assert_eq!(repository.queries.lock().unwrap()[0], request.query);
    }

    #[tokio::test]
    async fn test_get_overview_empty_selection_keeps_all() {
        let repository = Arc::new(InMemoryRepository::with_records(dataset()));
        let service = OverviewService::new(repository, settings());

        let overview = service.get_overview(&OverviewRequest::default()).await.unwrap();
        assert_eq!(overview.record_count, 5);
        assert_eq!(overview.top_sellers, 5);
    }

    #[tokio::test]
    async fn test_get_overview_propagates_source_failure() {
        let service = OverviewService::new(Arc::new(InMemoryRepository::failing()), settings());
        assert!(service.get_overview(&OverviewRequest::default()).await.is_err());
    }
}
