//! Client for the **Eurostat dissemination API** (statistics 1.0), the
//! primary data source.
//!
//! Responses are JSON-stat: a flat `value` map keyed by stringified indexes
//! into a row-major layout over the declared dimensions (`id` order, `size`
//! cardinalities). Single-country queries pin every dimension except time, so
//! the keys are time indexes; batch queries leave geography (and sometimes a
//! unit variant) free and must be decoded with explicit strides rather than
//! position guessing.

use crate::codes;
use crate::error::FetchError;
use crate::models::{BatchResult, Country, DataSource, Indicator, Series};
use crate::normalize;
use chrono::NaiveDate;
use log::debug;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub const SOURCE: &str = "Eurostat";

#[derive(Debug, Clone)]
pub struct EurostatClient {
    pub base_url: String,
    http: HttpClient,
}

impl Default for EurostatClient {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("euroind/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://ec.europa.eu/eurostat/api/dissemination/statistics/1.0/data".into(),
            http,
        }
    }
}

/// Dataset id and fixed filter parameters for a single-country query.
fn series_query(indicator: Indicator) -> (&'static str, &'static [(&'static str, &'static str)]) {
    match indicator {
        // GDP and main components, total GDP at current prices, million euro
        Indicator::Gdp => ("nama_10_gdp", &[("na_item", "B1GQ"), ("unit", "CP_MEUR")]),
        // Monthly unemployment rate, % of active population, seasonally adjusted
        Indicator::Unemployment => (
            "une_rt_m",
            &[("age", "TOTAL"), ("unit", "PC_ACT"), ("s_adj", "SA")],
        ),
        // HICP monthly annual rate, all items
        Indicator::Inflation => ("prc_hicp_manr", &[("coicop", "CP00")]),
        // Population on January 1st
        Indicator::Population => ("demo_pjan", &[("sex", "T"), ("age", "TOTAL")]),
    }
}

/// Dataset id and fixed parameters for the all-countries batch query,
/// always issued with `lastTimePeriod=1`.
fn batch_query(indicator: Indicator) -> (&'static str, &'static [(&'static str, &'static str)]) {
    match indicator {
        // Total GDP at current prices in million euro, the same canonical
        // unit the World Bank gap-fill is rebased to.
        Indicator::Gdp => ("nama_10_gdp", &[("na_item", "B1GQ"), ("unit", "CP_MEUR")]),
        Indicator::Unemployment => (
            "une_rt_m",
            &[("s_adj", "SA"), ("age", "TOTAL"), ("unit", "PC_ACT")],
        ),
        Indicator::Inflation => ("tec00118", &[]),
        Indicator::Population => ("tps00001", &[]),
    }
}

#[derive(Debug, Deserialize)]
struct JsonStat {
    #[serde(default)]
    value: HashMap<String, Option<f64>>,
    dimension: HashMap<String, Dimension>,
    #[serde(default)]
    id: Vec<String>,
    #[serde(default)]
    size: Vec<usize>,
    #[serde(default)]
    extension: Option<Extension>,
}

#[derive(Debug, Deserialize)]
struct Dimension {
    category: DimCategory,
}

#[derive(Debug, Deserialize)]
struct DimCategory {
    index: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct Extension {
    #[serde(rename = "positions-with-no-data")]
    no_data: Option<NoDataPositions>,
}

#[derive(Debug, Deserialize)]
struct NoDataPositions {
    #[serde(default)]
    time: Vec<usize>,
}

/// Parse a Eurostat time period into a calendar date. Years map to January 1,
/// months to the first of the month, quarters to the first month of the
/// quarter. Unknown granularities (weeks) are skipped.
pub fn parse_time_period(period: &str) -> Option<NaiveDate> {
    if let Some((year, rest)) = period.split_once('-') {
        let year: i32 = year.parse().ok()?;
        if let Some(q) = rest.strip_prefix('Q') {
            let q: u32 = q.parse().ok()?;
            if !(1..=4).contains(&q) {
                return None;
            }
            return NaiveDate::from_ymd_opt(year, (q - 1) * 3 + 1, 1);
        }
        let month: u32 = rest.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    let year: i32 = period.parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// Extract a series from a single-country JSON-stat payload: every dimension
/// except time has cardinality one, so the value keys are time indexes.
/// Positions the source flags as "no data" are dropped even when a sentinel
/// value is present.
pub fn series_from_jsonstat(payload: &Value) -> Result<Series, FetchError> {
    let stat: JsonStat = serde_json::from_value(payload.clone())
        .map_err(|e| FetchError::upstream(SOURCE, format!("malformed JSON-stat payload: {e}")))?;
    if stat.value.is_empty() {
        return Err(FetchError::EmptyResult { origin: SOURCE });
    }

    let time = stat
        .dimension
        .get("time")
        .ok_or_else(|| FetchError::upstream(SOURCE, "payload has no time dimension"))?;
    let no_data: &[usize] = stat
        .extension
        .as_ref()
        .and_then(|e| e.no_data.as_ref())
        .map(|n| n.time.as_slice())
        .unwrap_or(&[]);

    let mut raw: Vec<(NaiveDate, f64)> = Vec::new();
    for (period, idx) in &time.category.index {
        if no_data.contains(idx) {
            continue;
        }
        let Some(date) = parse_time_period(period) else {
            continue;
        };
        if let Some(Some(v)) = stat.value.get(&idx.to_string()) {
            raw.push((date, *v));
        }
    }

    normalize::build_series(raw).ok_or(FetchError::EmptyResult { origin: SOURCE })
}

/// Decode a batch JSON-stat payload into per-geo single-point series, keyed
/// by Eurostat geo code. EU/EA aggregates are dropped. When the payload
/// carries multiple unit variants, only the absolute level variant is kept,
/// never percentage-change variants.
pub fn batch_from_jsonstat(payload: &Value) -> Result<HashMap<String, Series>, FetchError> {
    let stat: JsonStat = serde_json::from_value(payload.clone())
        .map_err(|e| FetchError::upstream(SOURCE, format!("malformed JSON-stat payload: {e}")))?;
    if stat.value.is_empty() {
        return Err(FetchError::EmptyResult { origin: SOURCE });
    }
    if stat.id.len() != stat.size.len() {
        return Err(FetchError::upstream(
            SOURCE,
            "dimension id/size cardinality mismatch",
        ));
    }

    // Row-major strides over the declared dimension order.
    let dim_pos = |name: &str| stat.id.iter().position(|d| d == name);
    let stride = |pos: usize| stat.size[pos + 1..].iter().product::<usize>();
    let coord = |idx: usize, pos: usize| idx / stride(pos) % stat.size[pos];

    let geo_pos =
        dim_pos("geo").ok_or_else(|| FetchError::upstream(SOURCE, "payload has no geo dimension"))?;
    let geo_index = &stat
        .dimension
        .get("geo")
        .ok_or_else(|| FetchError::upstream(SOURCE, "payload has no geo dimension"))?
        .category
        .index;
    // Reverse map: coordinate -> geo code.
    let mut geo_by_coord: HashMap<usize, &str> = HashMap::new();
    for (code, i) in geo_index {
        geo_by_coord.insert(*i, code.as_str());
    }

    // Absolute-unit selection when several unit variants are flattened in:
    // keep the level variant, never percentage-change variants.
    let unit_filter: Option<(usize, usize)> = match dim_pos("unit") {
        Some(pos) if stat.size[pos] > 1 => {
            let units = &stat
                .dimension
                .get("unit")
                .ok_or_else(|| FetchError::upstream(SOURCE, "unit dimension missing category"))?
                .category
                .index;
            let absolute = units
                .iter()
                .filter(|(key, _)| !key.contains("PCH"))
                .map(|(_, i)| *i)
                .min()
                .ok_or_else(|| {
                    FetchError::upstream(SOURCE, "no absolute unit variant in batch payload")
                })?;
            Some((pos, absolute))
        }
        _ => None,
    };

    // Date of each observation: decode the time coordinate when the
    // dimension is declared, else fall back to the single time key.
    let time_by_coord: HashMap<usize, &str> = stat
        .dimension
        .get("time")
        .map(|t| {
            t.category
                .index
                .iter()
                .map(|(period, i)| (*i, period.as_str()))
                .collect()
        })
        .unwrap_or_default();
    let time_pos = dim_pos("time");

    let mut out: HashMap<String, Series> = HashMap::new();
    for (key, value) in &stat.value {
        let Some(v) = value else { continue };
        if !v.is_finite() {
            continue;
        }
        let Ok(idx) = key.parse::<usize>() else {
            continue;
        };
        if let Some((pos, wanted)) = unit_filter {
            if coord(idx, pos) != wanted {
                continue;
            }
        }
        let Some(geo) = geo_by_coord.get(&coord(idx, geo_pos)) else {
            continue;
        };
        // Aggregates (EU27_2020, EA19, ...) are not countries.
        if geo.starts_with("EU") || geo.starts_with("EA") {
            continue;
        }
        let date = time_pos
            .and_then(|pos| time_by_coord.get(&coord(idx, pos)))
            .and_then(|period| parse_time_period(period))
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        if let Some(series) = normalize::build_series(vec![(date, *v)]) {
            out.insert((*geo).to_string(), series);
        }
    }

    if out.is_empty() {
        return Err(FetchError::EmptyResult { origin: SOURCE });
    }
    Ok(out)
}

impl EurostatClient {
    fn get_json(&self, dataset: &str, params: &[(&str, &str)]) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, dataset);
        let mut query: Vec<(&str, &str)> = vec![("format", "JSON"), ("lang", "EN")];
        query.extend_from_slice(params);
        debug!("GET {url} {query:?}");
        let resp = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .map_err(|e| FetchError::upstream(SOURCE, format!("GET {dataset}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::upstream(
                SOURCE,
                format!("GET {dataset}: HTTP {status}"),
            ));
        }
        resp.json()
            .map_err(|e| FetchError::upstream(SOURCE, format!("decode {dataset}: {e}")))
    }
}

impl DataSource for EurostatClient {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn translate(&self, country: &Country) -> Option<String> {
        codes::eurostat_code(country)
    }

    fn fetch_series(&self, indicator: Indicator, country: &Country) -> Result<Series, FetchError> {
        let geo = self
            .translate(country)
            .ok_or_else(|| FetchError::NoCoverage {
                origin: SOURCE,
                country: country.name.clone(),
            })?;
        let (dataset, fixed) = series_query(indicator);
        let mut params: Vec<(&str, &str)> = fixed.to_vec();
        params.push(("geo", geo.as_str()));
        let payload = self.get_json(dataset, &params)?;
        series_from_jsonstat(&payload)
    }

    fn fetch_batch(
        &self,
        indicator: Indicator,
        countries: &[Country],
    ) -> Result<BatchResult, FetchError> {
        // One predefined dataset covers all geographies; the requested set
        // only determines which decoded rows we keep.
        let mut wanted: HashMap<String, &str> = HashMap::new();
        for country in countries {
            if let Some(code) = self.translate(country) {
                wanted.insert(code, country.id.as_str());
            }
        }
        if wanted.is_empty() {
            return Ok(BatchResult::new());
        }

        let (dataset, fixed) = batch_query(indicator);
        let mut params: Vec<(&str, &str)> = vec![("lastTimePeriod", "1")];
        params.extend_from_slice(fixed);
        let payload = self.get_json(dataset, &params)?;
        let by_geo = batch_from_jsonstat(&payload)?;

        let mut out = BatchResult::new();
        for (geo, series) in by_geo {
            if let Some(id) = wanted.get(&geo) {
                out.insert((*id).to_string(), series);
            }
        }
        debug!(
            "{dataset}: {} of {} requested countries resolved",
            out.len(),
            countries.len()
        );
        Ok(out)
    }
}
