// Region domain model
use std::str::FromStr;

/// Geographic partition applied by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Brasil,
    Sul,
    Sudeste,
    CentroOeste,
    Norte,
    Nordeste,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Brasil,
        Region::Sul,
        Region::Sudeste,
        Region::CentroOeste,
        Region::Norte,
        Region::Nordeste,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Region::Brasil => "Brasil",
            Region::Sul => "Sul",
            Region::Sudeste => "Sudeste",
            Region::CentroOeste => "Centro-Oeste",
            Region::Norte => "Norte",
            Region::Nordeste => "Nordeste",
        }
    }

    /// Value of the upstream `regiao` parameter. The whole country is the empty string.
    pub fn query_value(&self) -> String {
        match self {
            Region::Brasil => String::new(),
            other => other.name().to_lowercase(),
        }
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Region::Brasil);
        }
        Region::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}
