// Query parameter parsing into service requests
use crate::application::overview_service::OverviewRequest;
use crate::application::raw_data_service::RawDataRequest;
use crate::application::sales_repository::SalesQuery;
use crate::domain::filter::{Inclusion, SaleFilter, ValueRange};
use crate::domain::region::Region;
use crate::domain::sale::Column;
use crate::infrastructure::config::{OverviewSettings, RawDataSettings};
use chrono::NaiveDate;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("unknown region: {0}")]
    UnknownRegion(String),
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
    #[error("year {year} is outside {first}-{last}")]
    YearOutOfRange { year: i32, first: i32, last: i32 },
    #[error("{field} range is inverted: {min} > {max}")]
    InvertedRange {
        field: &'static str,
        min: String,
        max: String,
    },
}

/// Raw `key=value` pairs of a query string, with repeated keys kept.
#[derive(Debug, Default, Clone)]
pub struct QueryPairs(pub Vec<(String, String)>);

impl QueryPairs {
    /// Last value given for `key`.
    pub fn single(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every non-blank value given for `key`, taken verbatim. `None` when the
    /// key is absent; present-but-blank is an empty list.
    pub fn values(&self, key: &str) -> Option<Vec<String>> {
        let mut found = false;
        let mut values = Vec::new();
        for (k, v) in &self.0 {
            if k != key {
                continue;
            }
            found = true;
            let v = v.trim();
            if !v.is_empty() {
                values.push(v.to_string());
            }
        }
        found.then_some(values)
    }

    /// Like `values`, with each value further split on commas. Only for keys
    /// whose items never contain a comma.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.values(key).map(|values| {
            values
                .iter()
                .flat_map(|v| v.split(','))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Parsed value of `key`; absent or blank is `None`.
    pub fn parse<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ParamError> {
        match self.single(key).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| ParamError::InvalidValue {
                field: key,
                value: raw.to_string(),
            }),
        }
    }

    fn inclusion(&self, key: &str) -> Inclusion {
        match self.values(key) {
            Some(values) => Inclusion::only(values),
            None => Inclusion::Any,
        }
    }

    fn range<T>(
        &self,
        field: &'static str,
        (min_key, max_key): (&'static str, &'static str),
        (default_min, default_max): (T, T),
    ) -> Result<ValueRange<T>, ParamError>
    where
        T: FromStr + PartialOrd + Display,
    {
        let min = self.parse(min_key)?.unwrap_or(default_min);
        let max = self.parse(max_key)?.unwrap_or(default_max);
        checked_range(field, min, max)
    }
}

fn checked_range<T: PartialOrd + Display>(
    field: &'static str,
    min: T,
    max: T,
) -> Result<ValueRange<T>, ParamError> {
    if min > max {
        return Err(ParamError::InvertedRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(ValueRange::new(min, max))
}

pub fn overview_request(
    pairs: &QueryPairs,
    settings: &OverviewSettings,
) -> Result<OverviewRequest, ParamError> {
    let region = match pairs.single("regiao") {
        Some(raw) => raw.parse::<Region>().map_err(ParamError::UnknownRegion)?,
        None => Region::Brasil,
    };

    let year: Option<i32> = pairs.parse("ano")?;
    if let Some(year) = year {
        if year < settings.first_year || year > settings.last_year {
            return Err(ParamError::YearOutOfRange {
                year,
                first: settings.first_year,
                last: settings.last_year,
            });
        }
    }

    Ok(OverviewRequest {
        query: SalesQuery { region, year },
        sellers: pairs.values("vendedores").unwrap_or_default(),
        top_sellers: pairs.parse("top")?,
    })
}

pub fn raw_data_request(
    pairs: &QueryPairs,
    settings: &RawDataSettings,
) -> Result<RawDataRequest, ParamError> {
    let columns = match pairs.list("columns") {
        Some(keys) => keys
            .iter()
            .map(|k| k.parse::<Column>().map_err(ParamError::UnknownColumn))
            .collect::<Result<Vec<_>, _>>()?,
        None => Column::ALL.to_vec(),
    };

    let date_from: Option<NaiveDate> = pairs.parse("date_from")?;
    let date_to: Option<NaiveDate> = pairs.parse("date_to")?;
    let purchase_date = match (date_from, date_to) {
        (None, None) => None,
        (from, to) => Some(checked_range(
            "purchase_date",
            from.unwrap_or(NaiveDate::MIN),
            to.unwrap_or(NaiveDate::MAX),
        )?),
    };

    let filter = SaleFilter {
        products: pairs.inclusion("products"),
        categories: pairs.inclusion("categories"),
        sellers: pairs.inclusion("sellers"),
        locations: pairs.inclusion("locations"),
        payment_types: pairs.inclusion("payment_types"),
        price: Some(pairs.range(
            "price",
            ("price_min", "price_max"),
            (0.0, settings.price_max),
        )?),
        freight: Some(pairs.range(
            "freight",
            ("freight_min", "freight_max"),
            (0.0, settings.freight_max),
        )?),
        rating: Some(pairs.range(
            "rating",
            ("rating_min", "rating_max"),
            (0, settings.rating_max),
        )?),
        installments: Some(pairs.range(
            "installments",
            ("installments_min", "installments_max"),
            (0, settings.installments_max),
        )?),
        purchase_date,
    };

    Ok(RawDataRequest { filter, columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sale::tests::sale;

    fn pairs(raw: &[(&str, &str)]) -> QueryPairs {
        QueryPairs(
            raw.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn overview_settings() -> OverviewSettings {
        OverviewSettings {
            title: "Sales Dashboard".to_string(),
            currency_prefix: "R$".to_string(),
            top_states: 5,
            first_year: 2020,
            last_year: 2023,
            min_sellers: 2,
            max_sellers: 10,
            default_sellers: 5,
        }
    }

    fn raw_settings() -> RawDataSettings {
        RawDataSettings {
            price_max: 5000.0,
            freight_max: 250.0,
            rating_max: 5,
            installments_max: 25,
            default_file_name: "dados".to_string(),
            csv_cache_capacity: 4,
        }
    }

    #[test]
    fn test_values_semantics() {
        let query = pairs(&[("sellers", "Ana"), ("sellers", "Carla"), ("products", "")]);
        assert_eq!(query.values("sellers").unwrap(), vec!["Ana", "Carla"]);
        assert_eq!(query.values("products"), Some(Vec::new()));
        assert_eq!(query.values("categories"), None);
    }

    #[test]
    fn test_list_splits_commas() {
        let query = pairs(&[("columns", "product,price"), ("columns", "seller")]);
        assert_eq!(query.list("columns").unwrap(), vec!["product", "price", "seller"]);
    }

    #[test]
    fn test_inclusion_keeps_values_with_commas() {
        let query = pairs(&[("products", ""), ("products", "Cadeira, gamer")]);
        let request = raw_data_request(&query, &raw_settings()).unwrap();
        assert_eq!(request.filter.products, Inclusion::only(["Cadeira, gamer"]));

        let chair = sale("Cadeira, gamer", "moveis", 150.0, (2021, 1, 5), "Ana", "SP");
        let single = raw_data_request(&pairs(&[("products", "Cadeira, gamer")]), &raw_settings()).unwrap();
        assert_eq!(single.filter.apply(&[chair]).len(), 1);

        let overview = overview_request(&pairs(&[("vendedores", "Silva, Ana")]), &overview_settings()).unwrap();
        assert_eq!(overview.sellers, vec!["Silva, Ana"]);
    }

    #[test]
    fn test_overview_request() {
        let query = pairs(&[("regiao", "Centro-Oeste"), ("ano", "2022"), ("vendedores", "Ana"), ("top", "7")]);
        let request = overview_request(&query, &overview_settings()).unwrap();

        assert_eq!(request.query.region, Region::CentroOeste);
        assert_eq!(request.query.year, Some(2022));
        assert_eq!(request.sellers, vec!["Ana"]);
        assert_eq!(request.top_sellers, Some(7));
    }

    #[test]
    fn test_overview_defaults_and_blank_year() {
        let request = overview_request(&pairs(&[("ano", "")]), &overview_settings()).unwrap();
        assert_eq!(request.query, SalesQuery::all());
        assert!(request.sellers.is_empty());
    }

    #[test]
    fn test_overview_rejects_bad_input() {
        let settings = overview_settings();
        assert_eq!(
            overview_request(&pairs(&[("regiao", "Atlantida")]), &settings).unwrap_err(),
            ParamError::UnknownRegion("Atlantida".to_string())
        );
        assert!(matches!(
            overview_request(&pairs(&[("ano", "1999")]), &settings),
            Err(ParamError::YearOutOfRange { year: 1999, .. })
        ));
        assert!(matches!(
            overview_request(&pairs(&[("top", "five")]), &settings),
            Err(ParamError::InvalidValue { field: "top", .. })
        ));
    }

    #[test]
    fn test_raw_data_defaults() {
        let request = raw_data_request(&QueryPairs::default(), &raw_settings()).unwrap();

        assert_eq!(request.columns, Column::ALL.to_vec());
        assert_eq!(request.filter.sellers, Inclusion::Any);
        assert_eq!(request.filter.price, Some(ValueRange::new(0.0, 5000.0)));
        assert_eq!(request.filter.installments, Some(ValueRange::new(0, 25)));
        assert!(request.filter.purchase_date.is_none());
    }

    #[test]
    fn test_raw_data_request() {
        let query = pairs(&[
            ("columns", "product,price"),
            ("sellers", ""),
            ("price_min", "10"),
            ("rating_max", "4"),
            ("date_from", "2021-01-01"),
        ]);
        let request = raw_data_request(&query, &raw_settings()).unwrap();

        assert_eq!(request.columns, vec![Column::Product, Column::Price]);
        assert_eq!(request.filter.sellers, Inclusion::only(Vec::<String>::new()));
        assert_eq!(request.filter.price, Some(ValueRange::new(10.0, 5000.0)));
        assert_eq!(request.filter.rating, Some(ValueRange::new(0, 4)));

        let dates = request.filter.purchase_date.unwrap();
        assert_eq!(dates.min, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(dates.max, NaiveDate::MAX);
    }

    #[test]
    fn test_raw_data_rejects_bad_input() {
        let settings = raw_settings();
        assert_eq!(
            raw_data_request(&pairs(&[("columns", "colour")]), &settings).unwrap_err(),
            ParamError::UnknownColumn("colour".to_string())
        );
        assert!(matches!(
            raw_data_request(&pairs(&[("freight_min", "300"), ("freight_max", "10")]), &settings),
            Err(ParamError::InvertedRange { field: "freight", .. })
        ));
        assert!(matches!(
            raw_data_request(&pairs(&[("date_to", "31/12/2021")]), &settings),
            Err(ParamError::InvalidValue { field: "date_to", .. })
        ));
    }
}
