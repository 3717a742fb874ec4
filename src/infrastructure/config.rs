use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub source: SourceSettings,
    pub overview: OverviewSettings,
    pub raw_data: RawDataSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverviewSettings {
    pub title: String,
    pub currency_prefix: String,
    pub top_states: usize,
    pub first_year: i32,
    pub last_year: i32,
    pub min_sellers: usize,
    pub max_sellers: usize,
    pub default_sellers: usize,
}

/// Default bounds of the raw-data range filters, plus export settings.
#[derive(Debug, Deserialize, Clone)]
pub struct RawDataSettings {
    pub price_max: f64,
    pub freight_max: f64,
    pub rating_max: u32,
    pub installments_max: u32,
    pub default_file_name: String,
    pub csv_cache_capacity: usize,
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
