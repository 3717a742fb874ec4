// Sale record domain model
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A single sale as delivered by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(rename = "Produto")]
    pub product: String,
    #[serde(rename = "Categoria do Produto")]
    pub category: String,
    #[serde(rename = "Preço")]
    pub price: f64,
    #[serde(rename = "Frete")]
    pub freight: f64,
    #[serde(rename = "Data da Compra", with = "purchase_date")]
    pub purchase_date: NaiveDate,
    #[serde(rename = "Vendedor")]
    pub seller: String,
    #[serde(rename = "Local da compra")]
    pub location: String,
    #[serde(rename = "Avaliação da compra")]
    pub rating: u32,
    #[serde(rename = "Tipo de pagamento")]
    pub payment_type: String,
    #[serde(rename = "Quantidade de parcelas")]
    pub installments: u32,
    pub lat: f64,
    pub lon: f64,
}

/// Upstream dates are `dd/mm/yyyy`.
mod purchase_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Product,
    Category,
    Price,
    Freight,
    PurchaseDate,
    Seller,
    Location,
    Rating,
    PaymentType,
    Installments,
    Lat,
    Lon,
}

impl Column {
    /// All columns in dataset order.
    pub const ALL: [Column; 12] = [
        Column::Product,
        Column::Category,
        Column::Price,
        Column::Freight,
        Column::PurchaseDate,
        Column::Seller,
        Column::Location,
        Column::Rating,
        Column::PaymentType,
        Column::Installments,
        Column::Lat,
        Column::Lon,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::Product => "Produto",
            Column::Category => "Categoria do Produto",
            Column::Price => "Preço",
            Column::Freight => "Frete",
            Column::PurchaseDate => "Data da Compra",
            Column::Seller => "Vendedor",
            Column::Location => "Local da compra",
            Column::Rating => "Avaliação da compra",
            Column::PaymentType => "Tipo de pagamento",
            Column::Installments => "Quantidade de parcelas",
            Column::Lat => "lat",
            Column::Lon => "lon",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Column::Product => "product",
            Column::Category => "category",
            Column::Price => "price",
            Column::Freight => "freight",
            Column::PurchaseDate => "purchase_date",
            Column::Seller => "seller",
            Column::Location => "location",
            Column::Rating => "rating",
            Column::PaymentType => "payment_type",
            Column::Installments => "installments",
            Column::Lat => "lat",
            Column::Lon => "lon",
        }
    }

    pub fn cell(&self, record: &SaleRecord) -> Cell {
        match self {
            Column::Product => Cell::Text(record.product.clone()),
            Column::Category => Cell::Text(record.category.clone()),
            Column::Price => Cell::Number(record.price),
            Column::Freight => Cell::Number(record.freight),
            Column::PurchaseDate => Cell::Date(record.purchase_date),
            Column::Seller => Cell::Text(record.seller.clone()),
            Column::Location => Cell::Text(record.location.clone()),
            Column::Rating => Cell::Integer(i64::from(record.rating)),
            Column::PaymentType => Cell::Text(record.payment_type.clone()),
            Column::Installments => Cell::Integer(i64::from(record.installments)),
            Column::Lat => Cell::Number(record.lat),
            Column::Lon => Cell::Number(record.lon),
        }
    }
}

impl FromStr for Column {
    type Err = String;

    /// Accepts either the query key (`price`) or the dataset header (`Preço`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s) || c.header() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(i64),
    #[serde(serialize_with = "iso_date")]
    Date(NaiveDate),
}

fn iso_date<S: serde::Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

// Floats hash by bit pattern so identical tables share a cache key.
impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Text(s) => s.hash(state),
            Cell::Number(n) => n.to_bits().hash(state),
            Cell::Integer(n) => n.hash(state),
            Cell::Date(d) => d.hash(state),
        }
    }
}

/// Column projection of a set of records.
#[derive(Debug, Clone, PartialEq, Hash, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Builds a table over `columns`, always laid out in dataset order.
    pub fn project(records: &[SaleRecord], columns: &[Column]) -> Self {
        let columns: Vec<Column> = Column::ALL
            .into_iter()
            .filter(|c| columns.contains(c))
            .collect();

        let rows = records
            .iter()
            .map(|r| columns.iter().map(|c| c.cell(r)).collect())
            .collect();

        Self { columns, rows }
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
