// Raw data service - Use case for browsing and exporting the filtered dataset
use crate::application::sales_repository::{SalesQuery, SalesRepository};
use crate::domain::filter::{FilterOptions, SaleFilter};
use crate::domain::sale::{Column, Table};
use crate::infrastructure::csv_export::{export_file_name, CsvCache};
use anyhow::Context;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RawDataRequest {
    pub filter: SaleFilter,
    pub columns: Vec<Column>,
}

impl Default for RawDataRequest {
    fn default() -> Self {
        Self {
            filter: SaleFilter::default(),
            columns: Column::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RawDataView {
    pub table: Table,
    pub options: FilterOptions,
    pub total_rows: usize,
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct RawDataService {
    repository: Arc<dyn SalesRepository>,
    csv_cache: Arc<CsvCache>,
    default_file_name: String,
}

impl RawDataService {
    pub fn new(
        repository: Arc<dyn SalesRepository>,
        csv_cache: Arc<CsvCache>,
        default_file_name: String,
    ) -> Self {
        Self {
            repository,
            csv_cache,
            default_file_name,
        }
    }

    pub async fn view(&self, request: &RawDataRequest) -> anyhow::Result<RawDataView> {
        let records = self
            .repository
            .fetch_sales(&SalesQuery::all())
            .await
            .context("Failed to fetch the full sales dataset")?;

        let filtered = request.filter.apply(&records);
        tracing::debug!("Raw data filter kept {} of {} rows", filtered.len(), records.len());

        Ok(RawDataView {
            table: Table::project(&filtered, &request.columns),
            options: FilterOptions::from_records(&records),
            total_rows: records.len(),
        })
    }

    pub async fn export_csv(
        &self,
        request: &RawDataRequest,
        file_name: Option<&str>,
    ) -> anyhow::Result<CsvExport> {
        let view = self.view(request).await?;
        let bytes = self.csv_cache.get_or_encode(&view.table)?;
        let file_name = export_file_name(file_name.unwrap_or(""), &self.default_file_name);

        tracing::info!(
            "Exporting {} rows x {} columns as {}",
            view.table.row_count(),
            view.table.column_count(),
            file_name
        );

        Ok(CsvExport { file_name, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sales_repository::tests::InMemoryRepository;
    use crate::domain::filter::{Inclusion, ValueRange};
    use crate::domain::sale::tests::sale;
    use std::collections::BTreeSet;

    fn service(repository: Arc<InMemoryRepository>) -> RawDataService {
        RawDataService::new(repository, Arc::new(CsvCache::new(8)), "dados".to_string())
    }

    fn repository() -> Arc<InMemoryRepository> {
        Arc::new(InMemoryRepository::with_records(vec![
            sale("Cadeira", "moveis", 150.0, (2021, 1, 5), "Ana", "SP"),
            sale("Livro", "livros", 40.0, (2021, 2, 10), "Bruno", "RJ"),
            sale("Geladeira", "eletrodomesticos", 5200.0, (2022, 6, 1), "Ana", "MG"),
        ]))
    }

    #[tokio::test]
    async fn test_view_fetches_full_dataset() {
        let repository = repository();
        let view = service(repository.clone())
            .view(&RawDataRequest::default())
            .await
            .unwrap();

        assert_eq!(view.table.row_count(), 3);
        assert_eq!(view.table.column_count(), 12);
        assert_eq!(view.total_rows, 3);
        assert!(repository.queries.lock().unwrap()[0].is_unpartitioned());
    }

    #[tokio::test]
    async fn test_view_filters_and_projects() {
        let request = RawDataRequest {
            filter: SaleFilter {
                price: Some(ValueRange::new(0.0, 5000.0)),
                sellers: Inclusion::only(["Ana"]),
                ..Default::default()
            },
            columns: vec![Column::Product, Column::Price],
        };
        let view = service(repository()).view(&request).await.unwrap();

        assert_eq!(view.table.row_count(), 1);
        assert_eq!(view.table.headers(), vec!["Produto", "Preço"]);
        assert_eq!(view.options.sellers, vec!["Ana", "Bruno"]);
    }

    #[tokio::test]
    async fn test_empty_seller_selection_yields_no_rows() {
        let request = RawDataRequest {
            filter: SaleFilter {
                sellers: Inclusion::Only(BTreeSet::new()),
                ..Default::default()
            },
            ..Default::default()
        };
        let view = service(repository()).view(&request).await.unwrap();

        assert_eq!(view.table.row_count(), 0);
        assert_eq!(view.total_rows, 3);
    }

    #[tokio::test]
    async fn test_export_csv_names_and_caches() {
        let service = service(repository());
        let request = RawDataRequest::default();

        let first = service.export_csv(&request, Some("vendas")).await.unwrap();
        assert_eq!(first.file_name, "vendas.csv");
        assert!(first.bytes.starts_with("Produto,Categoria do Produto,Preço".as_bytes()));

        let second = service.export_csv(&request, None).await.unwrap();
        assert_eq!(second.file_name, "dados.csv");
        assert_eq!(first.bytes, second.bytes);
    }

    #[tokio::test]
    async fn test_view_propagates_source_failure() {
        let service = service(Arc::new(InMemoryRepository::failing()));
        assert!(service.view(&RawDataRequest::default()).await.is_err());
    }
}
