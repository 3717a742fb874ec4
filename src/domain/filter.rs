// Filter predicate over sale records
use crate::domain::sale::SaleRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Inclusive range constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd> ValueRange<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: &T) -> bool {
        &self.min <= value && value <= &self.max
    }
}

/// Membership constraint on a categorical column.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Inclusion {
    /// Every value is accepted.
    #[default]
    Any,
    /// Only listed values are accepted; an empty set accepts nothing.
    Only(BTreeSet<String>),
}

impl Inclusion {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Inclusion::Only(values.into_iter().map(Into::into).collect())
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Inclusion::Any => true,
            Inclusion::Only(set) => set.contains(value),
        }
    }
}

/// Conjunction of every column constraint. `None` ranges are unconstrained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaleFilter {
    pub products: Inclusion,
    pub categories: Inclusion,
    pub sellers: Inclusion,
    pub locations: Inclusion,
    pub payment_types: Inclusion,
    pub price: Option<ValueRange<f64>>,
    pub freight: Option<ValueRange<f64>>,
    pub rating: Option<ValueRange<u32>>,
    pub installments: Option<ValueRange<u32>>,
    pub purchase_date: Option<ValueRange<NaiveDate>>,
}

fn within<T: PartialOrd>(range: &Option<ValueRange<T>>, value: &T) -> bool {
    range.as_ref().is_none_or(|r| r.contains(value))
}

impl SaleFilter {
    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.products.accepts(&record.product)
            && within(&self.price, &record.price)
            && within(&self.purchase_date, &record.purchase_date)
            && self.categories.accepts(&record.category)
            && within(&self.freight, &record.freight)
            && self.sellers.accepts(&record.seller)
            && self.locations.accepts(&record.location)
            && within(&self.rating, &record.rating)
            && self.payment_types.accepts(&record.payment_type)
            && within(&self.installments, &record.installments)
    }

    /// Keeps matching records in their original order.
    pub fn apply(&self, records: &[SaleRecord]) -> Vec<SaleRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Choices offered by the filter widgets, derived from the data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub products: Vec<String>,
    pub categories: Vec<String>,
    pub sellers: Vec<String>,
    pub locations: Vec<String>,
    pub payment_types: Vec<String>,
    pub purchase_date: Option<ValueRange<NaiveDate>>,
}

impl FilterOptions {
    pub fn from_records(records: &[SaleRecord]) -> Self {
        let purchase_date = records
            .iter()
            .map(|r| r.purchase_date)
            .min()
            .zip(records.iter().map(|r| r.purchase_date).max())
            .map(|(min, max)| ValueRange::new(min, max));

        Self {
            products: distinct(records, |r| &r.product),
            categories: distinct(records, |r| &r.category),
            sellers: distinct(records, |r| &r.seller),
            locations: distinct(records, |r| &r.location),
            payment_types: distinct(records, |r| &r.payment_type),
            purchase_date,
        }
    }
}

/// Distinct values in first-appearance order.
pub fn distinct<F>(records: &[SaleRecord], field: F) -> Vec<String>
where
    F: Fn(&SaleRecord) -> &String,
{
    let mut seen = HashSet::new();
    records
        .iter()
        .map(field)
        .filter(|v| seen.insert(*v))
        .cloned()
        .collect()
}
