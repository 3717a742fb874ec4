// Group-by aggregates over sale records
use crate::domain::sale::SaleRecord;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Sum of price.
    Revenue,
    /// Number of sales.
    Quantity,
}

impl Measure {
    fn of(&self, record: &SaleRecord) -> f64 {
        match self {
            Measure::Revenue => record.price,
            Measure::Quantity => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTotal {
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month_start: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerTotals {
    pub seller: String,
    pub revenue: f64,
    pub quantity: usize,
}

impl SellerTotals {
    pub fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Revenue => self.revenue,
            Measure::Quantity => self.quantity as f64,
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn total(records: &[SaleRecord], measure: Measure) -> f64 {
    records.iter().map(|r| measure.of(r)).sum()
}

/// Groups in key order, then stable-sorts descending so ties stay alphabetical.
fn grouped<F>(records: &[SaleRecord], measure: Measure, key: F) -> Vec<(String, f64)>
where
    F: Fn(&SaleRecord) -> &str,
{
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *groups.entry(key(record)).or_insert(0.0) += measure.of(record);
    }

    let mut totals: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

pub fn by_category(records: &[SaleRecord], measure: Measure) -> Vec<GroupTotal> {
    grouped(records, measure, |r| r.category.as_str())
        .into_iter()
        .map(|(key, value)| GroupTotal { key, value })
        .collect()
}

/// Totals per purchase location, carrying the coordinates of the first sale seen there.
pub fn by_state(records: &[SaleRecord], measure: Measure) -> Vec<StateTotal> {
    let mut coordinates: HashMap<&str, (f64, f64)> = HashMap::new();
    for record in records {
        coordinates
            .entry(record.location.as_str())
            .or_insert((record.lat, record.lon));
    }

    grouped(records, measure, |r| r.location.as_str())
        .into_iter()
        .map(|(state, value)| {
            let (lat, lon) = coordinates[state.as_str()];
            StateTotal {
                state,
                lat,
                lon,
                value,
            }
        })
        .collect()
}

/// Chronological calendar-month totals. Months without sales between the
/// first and last sale are present with a zero value.
pub fn monthly(records: &[SaleRecord], measure: Measure) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for record in records {
        let key = (record.purchase_date.year(), record.purchase_date.month());
        *months.entry(key).or_insert(0.0) += measure.of(record);
    }

    let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let (mut year, mut month) = first;
    while (year, month) <= last {
        let value = months.get(&(year, month)).copied().unwrap_or(0.0);
        if let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) {
            series.push(MonthlyTotal {
                month_start,
                year,
                month,
                month_name: MONTH_NAMES[(month - 1) as usize],
                value,
            });
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }

    series
}

/// Revenue and sales count per seller, in seller-name order.
pub fn by_seller(records: &[SaleRecord]) -> Vec<SellerTotals> {
    let mut sellers: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = sellers.entry(record.seller.as_str()).or_insert((0.0, 0));
        entry.0 += record.price;
        entry.1 += 1;
    }

    sellers
        .into_iter()
        .map(|(seller, (revenue, quantity))| SellerTotals {
            seller: seller.to_string(),
            revenue,
            quantity,
        })
        .collect()
}

pub fn top_sellers(totals: &[SellerTotals], measure: Measure, k: usize) -> Vec<SellerTotals> {
    let mut ranked = totals.to_vec();
    ranked.sort_by(|a, b| b.value(measure).total_cmp(&a.value(measure)));
    top_n(&ranked, k)
}

/// Head of an already sorted sequence.
pub fn top_n<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items.iter().take(n).cloned().collect()
}
