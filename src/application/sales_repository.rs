// Repository trait for sales data access
use crate::domain::region::Region;
use crate::domain::sale::SaleRecord;
use async_trait::async_trait;

/// Server-side partition of the dataset requested from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesQuery {
    pub region: Region,
    pub year: Option<i32>,
}

impl SalesQuery {
    /// The whole dataset, no partition parameters.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_unpartitioned(&self) -> bool {
        self.region == Region::Brasil && self.year.is_none()
    }
}

#[async_trait]
pub trait SalesRepository: Send + Sync {
    /// Fetch every sale matching the partition, in source order
    async fn fetch_sales(&self, query: &SalesQuery) -> anyhow::Result<Vec<SaleRecord>>;
}
