use crate::error::FetchError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Economic indicator kinds served by both upstream sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    /// Gross domestic product, canonically in million EUR.
    Gdp,
    /// Unemployment rate, percent of active population.
    Unemployment,
    /// Annual inflation rate, percent.
    Inflation,
    /// Total population, absolute count.
    Population,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Gdp,
        Indicator::Unemployment,
        Indicator::Inflation,
        Indicator::Population,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP",
            Indicator::Unemployment => "Unemployment",
            Indicator::Inflation => "Inflation",
            Indicator::Population => "Population",
        }
    }
}

impl FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gdp" => Ok(Indicator::Gdp),
            "unemployment" => Ok(Indicator::Unemployment),
            "inflation" => Ok(Indicator::Inflation),
            "population" => Ok(Indicator::Population),
            other => Err(format!(
                "unknown indicator {other:?} (expected gdp, unemployment, inflation or population)"
            )),
        }
    }
}

/// A country as identified by the external geographic dataset: a stable
/// ISO2-style code plus a display name. Each source adapter translates the
/// code into its own dialect via the tables in [`crate::codes`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    pub id: String,
    pub name: String,
}

impl Country {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One observation. `value` is always finite; adapters filter null/NaN
/// observations before they reach the canonical model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A normalized time series for one indicator/country pair.
///
/// Invariants (enforced by [`crate::normalize::build_series`]):
/// - `historical` is non-empty and strictly ascending by date
/// - `latest` equals the value of the last historical point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub latest: f64,
    pub historical: Vec<TimePoint>,
}

/// Batch resolution output: one series per country id. Countries with no
/// resolvable data are absent rather than mapped to an empty series.
pub type BatchResult = HashMap<String, Series>;

/// A resolved series together with the upstream source that supplied it,
/// for provenance display ("Data from Eurostat" / "Data from World Bank").
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub series: Series,
    pub source: &'static str,
}

/// Full country profile: all four indicators, resolved independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub gdp: Resolved,
    pub unemployment: Resolved,
    pub inflation: Resolved,
    pub population: Resolved,
}

/// Contract implemented by each upstream source adapter (Eurostat, World
/// Bank). Adapters own the wire format, the code dialect and the unit
/// normalization; they never retry — fallback lives in the resolver.
pub trait DataSource: Sync {
    /// Attribution label, e.g. "Eurostat".
    fn name(&self) -> &'static str;

    /// Map the external country id to this source's code dialect.
    /// `None` means the country has no representable code here and the
    /// adapter is skipped without that being a fatal error.
    fn translate(&self, country: &Country) -> Option<String>;

    /// Fetch the full series for one indicator/country pair.
    fn fetch_series(&self, indicator: Indicator, country: &Country) -> Result<Series, FetchError>;

    /// Fetch the latest value for many countries at once. Countries this
    /// source cannot cover are omitted from the result, never an error.
    fn fetch_batch(
        &self,
        indicator: Indicator,
        countries: &[Country],
    ) -> Result<BatchResult, FetchError>;
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn translate(&self, country: &Country) -> Option<String> {
        (**self).translate(country)
    }

    fn fetch_series(&self, indicator: Indicator, country: &Country) -> Result<Series, FetchError> {
        (**self).fetch_series(indicator, country)
    }

    fn fetch_batch(
        &self,
        indicator: Indicator,
        countries: &[Country],
    ) -> Result<BatchResult, FetchError> {
        (**self).fetch_batch(indicator, countries)
    }
}

/// Metadata section of a World Bank response (position 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WbMeta {
    pub page: u32,
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as u32)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("negative value for u32"));
            }
            Ok(v as u32)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WbCodeName {
    pub id: String,
    pub value: String,
}

/// Raw observation from the World Bank API (position 1 array).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WbEntry {
    pub indicator: WbCodeName,
    pub country: WbCodeName,
    pub countryiso3code: String,
    pub date: String,
    pub value: Option<f64>,
    #[serde(rename = "obs_status")]
    pub obs_status: Option<String>,
    pub decimal: Option<i32>,
}
