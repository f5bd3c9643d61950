//! Client for the **World Bank Indicators API (v2)**, the fallback source.
//!
//! The `country/{codes}/indicator/{code}` endpoint returns a two-element
//! array `[Meta, [Entry, ...]]`, in reverse chronological order, with dates
//! as bare years. Batch queries join ISO3 codes with semicolons and use
//! `mrnev=1` so the API itself picks the most recent non-empty observation
//! per country.

use crate::codes;
use crate::error::FetchError;
use crate::models::{BatchResult, Country, DataSource, Indicator, Series, WbEntry, WbMeta};
use crate::normalize;
use chrono::NaiveDate;
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

pub const SOURCE: &str = "World Bank";

/// URL length cap: batch country lists beyond this are split into several
/// requests and merged by union.
const BATCH_CHUNK: usize = 25;

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|s| percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string())
        .collect::<Vec<_>>()
        .join(";")
}

fn indicator_id(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Gdp => "NY.GDP.MKTP.CD",             // GDP (current US$)
        Indicator::Unemployment => "SL.UEM.TOTL.ZS",    // Unemployment, total (% of labor force)
        Indicator::Inflation => "FP.CPI.TOTL.ZG",       // Inflation, consumer prices (annual %)
        Indicator::Population => "SP.POP.TOTL",         // Population, total
    }
}

/// Per-indicator unit reconciliation into the canonical model. GDP arrives
/// as absolute current US$ and is rebased to million EUR; the percentage and
/// count indicators pass through.
fn reconcile(indicator: Indicator, value: f64) -> f64 {
    match indicator {
        Indicator::Gdp => normalize::gdp_usd_to_meur(value),
        _ => value,
    }
}

/// Split a `[Meta, [Entry, ...]]` payload, surfacing API-level error objects.
pub fn split_payload(payload: &Value) -> Result<(WbMeta, Vec<WbEntry>), FetchError> {
    let arr = payload
        .as_array()
        .ok_or_else(|| FetchError::upstream(SOURCE, "response is not a top-level array"))?;
    if arr.is_empty() {
        return Err(FetchError::upstream(SOURCE, "empty response array"));
    }
    // An error payload puts a "message" object in position 0.
    if arr[0].get("message").is_some() {
        return Err(FetchError::upstream(
            SOURCE,
            format!("api error: {}", arr[0]),
        ));
    }
    let meta: WbMeta = serde_json::from_value(arr[0].clone())
        .map_err(|e| FetchError::upstream(SOURCE, format!("parse meta: {e}")))?;
    let entries: Vec<WbEntry> = if arr.len() > 1 && !arr[1].is_null() {
        serde_json::from_value(arr[1].clone())
            .map_err(|e| FetchError::upstream(SOURCE, format!("parse entries: {e}")))?
    } else {
        vec![]
    };
    Ok((meta, entries))
}

/// Turn one country's entries into a canonical series: drop nulls, normalize
/// the bare year to January 1, rebase units, sort ascending.
pub fn series_from_entries(indicator: Indicator, entries: &[WbEntry]) -> Option<Series> {
    let raw: Vec<(NaiveDate, f64)> = entries
        .iter()
        .filter_map(|e| {
            let value = e.value?;
            let year: i32 = e.date.parse().ok()?;
            let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
            Some((date, reconcile(indicator, value)))
        })
        .collect();
    normalize::build_series(raw)
}

#[derive(Debug, Clone)]
pub struct WorldBankClient {
    pub base_url: String,
    http: HttpClient,
}

impl Default for WorldBankClient {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("euroind/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://api.worldbank.org/v2".into(),
            http,
        }
    }
}

impl WorldBankClient {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| FetchError::upstream(SOURCE, format!("GET {url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::upstream(SOURCE, format!("HTTP {status}")));
        }
        resp.json()
            .map_err(|e| FetchError::upstream(SOURCE, format!("decode json: {e}")))
    }

    /// One chunk of a batch query: latest non-empty observation per country.
    fn fetch_latest_chunk(
        &self,
        indicator: Indicator,
        iso3_codes: &[&str],
    ) -> Result<Vec<WbEntry>, FetchError> {
        let url = format!(
            "{}/country/{}/indicator/{}?format=json&mrnev=1&per_page=300",
            self.base_url,
            enc_join(iso3_codes.iter().copied()),
            indicator_id(indicator),
        );
        let (_meta, entries) = split_payload(&self.get_json(&url)?)?;
        Ok(entries)
    }
}

impl DataSource for WorldBankClient {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn translate(&self, country: &Country) -> Option<String> {
        codes::worldbank_code(country)
    }

    fn fetch_series(&self, indicator: Indicator, country: &Country) -> Result<Series, FetchError> {
        let iso3 = self
            .translate(country)
            .ok_or_else(|| FetchError::NoCoverage {
                origin: SOURCE,
                country: country.name.clone(),
            })?;
        let url = format!(
            "{}/country/{}/indicator/{}?format=json&per_page=100",
            self.base_url,
            iso3,
            indicator_id(indicator),
        );
        let (_meta, entries) = split_payload(&self.get_json(&url)?)?;
        series_from_entries(indicator, &entries).ok_or(FetchError::EmptyResult { origin: SOURCE })
    }

    fn fetch_batch(
        &self,
        indicator: Indicator,
        countries: &[Country],
    ) -> Result<BatchResult, FetchError> {
        // ISO3 -> external id, dropping countries outside the dialect table.
        let mut translated: Vec<(String, &str)> = Vec::new();
        for country in countries {
            if let Some(iso3) = self.translate(country) {
                translated.push((iso3, country.id.as_str()));
            }
        }
        if translated.is_empty() {
            return Ok(BatchResult::new());
        }

        let mut out = BatchResult::new();
        for chunk in translated.chunks(BATCH_CHUNK) {
            let iso3_codes: Vec<&str> = chunk.iter().map(|(iso3, _)| iso3.as_str()).collect();
            let entries = self.fetch_latest_chunk(indicator, &iso3_codes)?;
            for (iso3, external_id) in chunk {
                let mine: Vec<WbEntry> = entries
                    .iter()
                    .filter(|e| e.countryiso3code.eq_ignore_ascii_case(iso3))
                    .cloned()
                    .collect();
                if let Some(series) = series_from_entries(indicator, &mine) {
                    out.insert((*external_id).to_string(), series);
                }
            }
        }
        debug!(
            "{}: {} of {} requested countries resolved",
            indicator_id(indicator),
            out.len(),
            countries.len()
        );
        Ok(out)
    }
}
