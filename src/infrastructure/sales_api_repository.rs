// Remote sales API repository implementation
use crate::application::sales_repository::{SalesQuery, SalesRepository};
use crate::domain::sale::SaleRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SalesApiRepository {
    url: String,
    client: reqwest::Client,
}

impl SalesApiRepository {
    pub fn new(url: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// The full dataset is requested without parameters; any partition sends both.
    fn build_request_url(&self, query: &SalesQuery) -> String {
        if query.is_unpartitioned() {
            return self.url.clone();
        }

        let region = query.region.query_value();
        let year = query.year.map(|y| y.to_string()).unwrap_or_default();
        format!(
            "{}?regiao={}&ano={}",
            self.url,
            urlencoding::encode(&region),
            urlencoding::encode(&year)
        )
    }
}

#[async_trait]
impl SalesRepository for SalesApiRepository {
    async fn fetch_sales(&self, query: &SalesQuery) -> Result<Vec<SaleRecord>> {
        let url = self.build_request_url(query);
        tracing::debug!("Fetching sales from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to the sales API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sales API request failed with status {}: {}", status, body);
        }

        let records = response
            .json::<Vec<SaleRecord>>()
            .await
            .context("Failed to parse sales API response")?;

        tracing::info!("Fetched {} sales from {}", records.len(), url);
        Ok(records)
    }
}
