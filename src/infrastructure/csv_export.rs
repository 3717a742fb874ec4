// CSV encoding of sale tables, memoized per table
use crate::domain::sale::Table;
use bytes::Bytes;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

/// Local failure while producing the CSV body.
#[derive(Debug, thiserror::Error)]
pub enum CsvEncodeError {
    #[error("Failed to write CSV record: {0}")]
    Write(#[from] csv::Error),
    #[error("Failed to flush CSV writer: {0}")]
    Flush(String),
}

/// UTF-8, comma-delimited, header row of column headers, no index column.
pub fn encode_csv(table: &Table) -> Result<Vec<u8>, CsvEncodeError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.headers())?;

    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CsvEncodeError::Flush(e.error().to_string()))
}

/// Appends `.csv` unless already present; blank names fall back to `default`.
pub fn export_file_name(name: &str, default: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() { default } else { name };
    if name.to_ascii_lowercase().ends_with(".csv") {
        name.to_string()
    } else {
        format!("{}.csv", name)
    }
}

fn table_key(table: &Table) -> u64 {
    let mut hasher = DefaultHasher::new();
    table.hash(&mut hasher);
    hasher.finish()
}

#[derive(Default)]
struct CacheEntries {
    // The table is kept to rule out digest collisions on lookup.
    encoded: HashMap<u64, (Table, Bytes)>,
    order: VecDeque<u64>,
}

/// Bounded memo of encoded tables, evicting the oldest entry first.
pub struct CsvCache {
    capacity: usize,
    entries: Mutex<CacheEntries>,
}

impl CsvCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(CacheEntries::default()),
        }
    }

    pub fn get_or_encode(&self, table: &Table) -> Result<Bytes, CsvEncodeError> {
        let key = table_key(table);

        if let Some((cached, bytes)) = self.lock().encoded.get(&key) {
            if cached == table {
                tracing::debug!("CSV cache hit for table {:016x}", key);
                return Ok(bytes.clone());
            }
            tracing::warn!("CSV cache digest collision on {:016x}", key);
        }

        let bytes = Bytes::from(encode_csv(table)?);

        let mut entries = self.lock();
        if !entries.encoded.contains_key(&key) {
            if entries.order.len() >= self.capacity {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.encoded.remove(&oldest);
                }
            }
            entries.order.push_back(key);
        }
        entries.encoded.insert(key, (table.clone(), bytes.clone()));
        tracing::debug!(
            "Encoded {} rows to {} CSV bytes (table {:016x})",
            table.row_count(),
            bytes.len(),
            key
        );

        Ok(bytes)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheEntries> {
        // A panic while holding the lock leaves the map consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sale::tests::sale;
    use crate::domain::sale::{Column, SaleRecord};

    fn records() -> Vec<SaleRecord> {
        vec![
            sale("Cadeira, gamer", "moveis", 150.5, (2021, 1, 5), "Ana", "SP"),
            sale("Livro \"Dom Casmurro\"", "livros", 40.0, (2021, 2, 10), "Bruno", "RJ"),
        ]
    }

    #[test]
    fn test_csv_round_trip() {
        let table = Table::project(&records(), &Column::ALL);
        let bytes = encode_csv(&table).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, table.headers());

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(rows.len(), table.row_count());

        for (decoded, original) in rows.iter().zip(&table.rows) {
            let expected: Vec<String> = original.iter().map(|c| c.to_string()).collect();
            assert_eq!(decoded, &expected);
        }
        assert_eq!(rows[0][0], "Cadeira, gamer");
        assert_eq!(rows[0][2], "150.5");
        assert_eq!(rows[0][4], "2021-01-05");
    }

    #[test]
    fn test_header_follows_selected_columns() {
        let table = Table::project(&records(), &[Column::Seller, Column::Price]);
        let text = String::from_utf8(encode_csv(&table).unwrap()).unwrap();
        assert_eq!(text.lines().next(), Some("Preço,Vendedor"));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("dados", "dados"), "dados.csv");
        assert_eq!(export_file_name("vendas.csv", "dados"), "vendas.csv");
        assert_eq!(export_file_name("  ", "dados"), "dados.csv");
        let once = export_file_name("report", "dados");
        assert_eq!(export_file_name(&once, "dados"), once);
    }

    #[test]
    fn test_cache_reuses_encoding() {
        let cache = CsvCache::new(4);
        let table = Table::project(&records(), &Column::ALL);

        let first = cache.get_or_encode(&table).unwrap();
        let second = cache.get_or_encode(&table.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.lock().encoded.len(), 1);
    }

    #[test]
    fn test_cache_ignores_entry_for_different_table() {
        let cache = CsvCache::new(4);
        let data = records();
        let products = Table::project(&data, &[Column::Product]);
        let prices = Table::project(&data, &[Column::Price]);

        // Plant the product table's bytes under the price table's digest.
        let stale = cache.get_or_encode(&products).unwrap();
        cache
            .lock()
            .encoded
            .insert(table_key(&prices), (products.clone(), stale.clone()));

        let encoded = cache.get_or_encode(&prices).unwrap();
        assert_ne!(encoded, stale);
        assert_eq!(encoded, Bytes::from(encode_csv(&prices).unwrap()));
        assert_eq!(cache.get_or_encode(&prices).unwrap(), encoded);
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let cache = CsvCache::new(2);
        let data = records();

        cache.get_or_encode(&Table::project(&data, &[Column::Product])).unwrap();
        cache.get_or_encode(&Table::project(&data, &[Column::Price])).unwrap();
        cache.get_or_encode(&Table::project(&data, &[Column::Seller])).unwrap();

        assert_eq!(cache.lock().encoded.len(), 2);
    }
}
