//! Primary/fallback resolution across the two source adapters.
//!
//! The resolver is the only layer allowed to swallow a source failure, and
//! only while a fallback path remains. Adapters are injected at construction;
//! nothing here knows about wire formats.

use crate::error::{FetchError, NoDataAvailable};
use crate::eurostat::EurostatClient;
use crate::models::{BatchResult, Country, DataSource, Indicator, Profile, Resolved};
use crate::worldbank::WorldBankClient;
use log::{debug, warn};
use std::collections::HashMap;
use std::thread;

#[derive(Debug, Clone)]
pub struct Resolver<P: DataSource, S: DataSource> {
    primary: P,
    secondary: S,
}

impl Resolver<EurostatClient, WorldBankClient> {
    /// Resolver over the production sources: Eurostat first, World Bank as
    /// the fallback.
    pub fn with_default_sources() -> Self {
        Resolver::new(EurostatClient::default(), WorldBankClient::default())
    }
}

impl<P: DataSource, S: DataSource> Resolver<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    /// Resolve one indicator for one country: primary source first, then the
    /// fallback. On a primary success the secondary is never consulted. When
    /// both fail, the primary's error is surfaced as the diagnostic cause —
    /// its messages are the more informative of the two.
    pub fn resolve(
        &self,
        indicator: Indicator,
        country: &Country,
    ) -> Result<Resolved, NoDataAvailable> {
        let primary_err = match self.primary.fetch_series(indicator, country) {
            Ok(series) => {
                return Ok(Resolved {
                    series,
                    source: self.primary.name(),
                });
            }
            Err(e) => e,
        };
        debug!(
            "{} {} for {}: falling back ({primary_err})",
            self.primary.name(),
            indicator.label(),
            country.name
        );

        match self.secondary.fetch_series(indicator, country) {
            Ok(series) => Ok(Resolved {
                series,
                source: self.secondary.name(),
            }),
            Err(secondary_err) => {
                warn!(
                    "both sources failed for {} {}: {primary_err}; {secondary_err}",
                    indicator.label(),
                    country.name
                );
                Err(NoDataAvailable::new(
                    country.name.clone(),
                    Some(primary_err),
                ))
            }
        }
    }

    /// Resolve all four indicators for one country, concurrently and
    /// all-or-nothing: the four metrics are presented together, so a failure
    /// in any one fails the profile. The other three still run to completion
    /// before this returns.
    pub fn resolve_profile(&self, country: &Country) -> Result<Profile, NoDataAvailable> {
        thread::scope(|s| {
            let gdp = s.spawn(|| self.resolve(Indicator::Gdp, country));
            let unemployment = s.spawn(|| self.resolve(Indicator::Unemployment, country));
            let inflation = s.spawn(|| self.resolve(Indicator::Inflation, country));
            let population = s.spawn(|| self.resolve(Indicator::Population, country));

            let gdp = gdp.join().expect("indicator resolution panicked");
            let unemployment = unemployment.join().expect("indicator resolution panicked");
            let inflation = inflation.join().expect("indicator resolution panicked");
            let population = population.join().expect("indicator resolution panicked");

            Ok(Profile {
                gdp: gdp?,
                unemployment: unemployment?,
                inflation: inflation?,
                population: population?,
            })
        })
    }

    /// Resolve one indicator for many countries: one primary batch call, one
    /// secondary batch call for the gap set, merged with primary precedence.
    /// Countries covered by neither source are simply absent; only a wholly
    /// empty merge is an error.
    pub fn resolve_batch(
        &self,
        indicator: Indicator,
        countries: &[Country],
    ) -> Result<BatchResult, NoDataAvailable> {
        let mut preferred_err: Option<FetchError> = None;
        let mut merged = match self.primary.fetch_batch(indicator, countries) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    "{} batch {} failed: {e}",
                    self.primary.name(),
                    indicator.label()
                );
                preferred_err = Some(e);
                BatchResult::new()
            }
        };

        // The gap set: untranslatable for the primary, or translatable but
        // absent from its result.
        let missing: Vec<Country> = countries
            .iter()
            .filter(|c| !merged.contains_key(&c.id))
            .cloned()
            .collect();
        debug!(
            "batch {}: {} primary hits, {} missing",
            indicator.label(),
            merged.len(),
            missing.len()
        );

        if !missing.is_empty() {
            match self.secondary.fetch_batch(indicator, &missing) {
                Ok(fill) => {
                    for (id, series) in fill {
                        merged.entry(id).or_insert(series);
                    }
                }
                Err(e) => {
                    warn!(
                        "{} batch {} failed: {e}",
                        self.secondary.name(),
                        indicator.label()
                    );
                    preferred_err.get_or_insert(e);
                }
            }
        }

        if merged.is_empty() {
            return Err(NoDataAvailable::new(
                format!("{} batch", indicator.label()),
                preferred_err,
            ));
        }
        Ok(merged)
    }
}

/// In-memory cache of batch results, one entry per indicator, living for the
/// duration of an overlay session. Repeated toggles of the same indicator
/// reuse the entry; a failed resolution caches nothing, so the next toggle
/// retries.
#[derive(Debug, Default)]
pub struct OverlayCache {
    entries: HashMap<Indicator, BatchResult>,
}

impl OverlayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_fetch<P: DataSource, S: DataSource>(
        &mut self,
        resolver: &Resolver<P, S>,
        indicator: Indicator,
        countries: &[Country],
    ) -> Result<&BatchResult, NoDataAvailable> {
        if !self.entries.contains_key(&indicator) {
            let batch = resolver.resolve_batch(indicator, countries)?;
            self.entries.insert(indicator, batch);
        }
        Ok(&self.entries[&indicator])
    }

    pub fn cached(&self, indicator: Indicator) -> Option<&BatchResult> {
        self.entries.get(&indicator)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
