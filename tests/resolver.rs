use chrono::NaiveDate;
use euroind::error::{FetchError, NoDataAvailable};
use euroind::models::{BatchResult, Country, DataSource, Indicator, Series, TimePoint};
use euroind::resolver::{OverlayCache, Resolver};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory source: covers a fixed set of country ids with one value each,
/// counting calls so fallback behavior can be asserted.
struct MockSource {
    name: &'static str,
    data: HashMap<String, f64>,
    fail: bool,
    series_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl MockSource {
    fn covering(name: &'static str, ids: &[(&str, f64)]) -> Self {
        Self {
            name,
            data: ids.iter().map(|(id, v)| (id.to_string(), *v)).collect(),
            fail: false,
            series_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
        }
    }

    fn failing(name: &'static str) -> Self {
        let mut s = Self::covering(name, &[]);
        s.fail = true;
        s
    }

    fn series_for(&self, value: f64) -> Series {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Series {
            latest: value,
            historical: vec![TimePoint { date, value }],
        }
    }
}

impl DataSource for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn translate(&self, country: &Country) -> Option<String> {
        self.data.contains_key(&country.id).then(|| country.id.clone())
    }

    fn fetch_series(&self, _indicator: Indicator, country: &Country) -> Result<Series, FetchError> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::upstream(self.name, "mock upstream failure"));
        }
        match self.data.get(&country.id) {
            Some(v) => Ok(self.series_for(*v)),
            None => Err(FetchError::NoCoverage {
                origin: self.name,
                country: country.name.clone(),
            }),
        }
    }

    fn fetch_batch(
        &self,
        _indicator: Indicator,
        countries: &[Country],
    ) -> Result<BatchResult, FetchError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::upstream(self.name, "mock upstream failure"));
        }
        Ok(countries
            .iter()
            .filter_map(|c| {
                self.data
                    .get(&c.id)
                    .map(|v| (c.id.clone(), self.series_for(*v)))
            })
            .collect())
    }
}

fn country(id: &str) -> Country {
    Country::new(id, format!("Country {id}"))
}

#[test]
fn primary_success_never_consults_secondary() {
    let primary = MockSource::covering("primary", &[("DE", 1.0)]);
    let secondary = MockSource::covering("secondary", &[("DE", 2.0)]);
    let resolver = Resolver::new(primary, secondary);

    let resolved = resolver.resolve(Indicator::Gdp, &country("DE")).unwrap();
    assert_eq!(resolved.series.latest, 1.0);
    assert_eq!(resolved.source, "primary");
}

#[test]
fn secondary_covers_the_gap_with_correct_provenance() {
    let primary = MockSource::covering("primary", &[]);
    let secondary = MockSource::covering("secondary", &[("RU", 3.0)]);
    let resolver = Resolver::new(primary, secondary);

    let resolved = resolver.resolve(Indicator::Inflation, &country("RU")).unwrap();
    assert_eq!(resolved.series.latest, 3.0);
    assert_eq!(resolved.source, "secondary");
}

#[test]
fn secondary_call_count_is_zero_on_primary_success() {
    let primary = MockSource::covering("primary", &[("DE", 1.0)]);
    let secondary = MockSource::covering("secondary", &[("DE", 2.0)]);
    let resolver = Resolver::new(&primary, &secondary);
    resolver.resolve(Indicator::Gdp, &country("DE")).unwrap();

    assert_eq!(primary.series_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary.series_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn both_sources_exhausted_is_no_data_with_primary_cause() {
    let primary = MockSource::failing("primary");
    let secondary = MockSource::covering("secondary", &[]);
    let resolver = Resolver::new(primary, secondary);

    let err: NoDataAvailable = resolver
        .resolve(Indicator::Population, &country("ZZ"))
        .unwrap_err();
    match err.cause {
        Some(FetchError::Upstream { origin, .. }) => assert_eq!(origin, "primary"),
        other => panic!("expected primary upstream cause, got {other:?}"),
    }
}

#[test]
fn profile_resolves_all_four_indicators() {
    let primary = MockSource::covering("primary", &[("DE", 7.0)]);
    let secondary = MockSource::covering("secondary", &[]);
    let resolver = Resolver::new(primary, secondary);

    let profile = resolver.resolve_profile(&country("DE")).unwrap();
    assert_eq!(profile.gdp.series.latest, 7.0);
    assert_eq!(profile.unemployment.series.latest, 7.0);
    assert_eq!(profile.inflation.series.latest, 7.0);
    assert_eq!(profile.population.series.latest, 7.0);
    assert_eq!(profile.gdp.source, "primary");
}

#[test]
fn profile_is_all_or_nothing() {
    // Neither source covers the country: every indicator fails, and so must
    // the profile as a whole.
    let resolver = Resolver::new(
        MockSource::covering("primary", &[]),
        MockSource::covering("secondary", &[]),
    );
    assert!(resolver.resolve_profile(&country("ZZ")).is_err());
}

#[test]
fn batch_merges_sources_with_single_calls() {
    // Three countries only in the primary, two only in the secondary.
    let primary = MockSource::covering("primary", &[("DE", 1.0), ("FR", 2.0), ("IT", 3.0)]);
    let secondary = MockSource::covering("secondary", &[("RU", 4.0), ("UA", 5.0)]);
    let countries: Vec<Country> = ["DE", "FR", "IT", "RU", "UA"]
        .iter()
        .copied()
        .map(country)
        .collect();

    let resolver = Resolver::new(&primary, &secondary);
    let batch = resolver.resolve_batch(Indicator::Gdp, &countries).unwrap();

    assert_eq!(batch.len(), 5);
    assert_eq!(batch["DE"].latest, 1.0);
    assert_eq!(batch["IT"].latest, 3.0);
    assert_eq!(batch["RU"].latest, 4.0);
    assert_eq!(batch["UA"].latest, 5.0);
    assert_eq!(primary.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary.batch_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn batch_primary_takes_precedence_on_overlap() {
    let primary = MockSource::covering("primary", &[("DE", 1.0)]);
    let secondary = MockSource::covering("secondary", &[("DE", 99.0), ("SE", 2.0)]);
    let countries = vec![country("DE"), country("SE")];

    let resolver = Resolver::new(primary, secondary);
    let batch = resolver.resolve_batch(Indicator::Population, &countries).unwrap();
    assert_eq!(batch["DE"].latest, 1.0);
    assert_eq!(batch["SE"].latest, 2.0);
}

#[test]
fn fully_uncovered_batch_is_no_data() {
    let resolver = Resolver::new(
        MockSource::covering("primary", &[]),
        MockSource::covering("secondary", &[]),
    );
    let countries = vec![country("AA"), country("BB")];
    assert!(resolver.resolve_batch(Indicator::Inflation, &countries).is_err());
}

#[test]
fn batch_survives_a_failing_primary() {
    let primary = MockSource::failing("primary");
    let secondary = MockSource::covering("secondary", &[("NO", 6.0)]);
    let resolver = Resolver::new(primary, secondary);

    let batch = resolver
        .resolve_batch(Indicator::Unemployment, &[country("NO")])
        .unwrap();
    assert_eq!(batch["NO"].latest, 6.0);
}

#[test]
fn overlay_cache_issues_one_fetch_per_indicator() {
    let primary = MockSource::covering("primary", &[("DE", 1.0)]);
    let secondary = MockSource::covering("secondary", &[]);
    let resolver = Resolver::new(&primary, &secondary);
    let countries = vec![country("DE")];

    let mut cache = OverlayCache::new();
    cache
        .get_or_fetch(&resolver, Indicator::Gdp, &countries)
        .unwrap();
    cache
        .get_or_fetch(&resolver, Indicator::Gdp, &countries)
        .unwrap();
    assert_eq!(primary.batch_calls.load(Ordering::SeqCst), 1);

    // A different indicator populates its own entry.
    cache
        .get_or_fetch(&resolver, Indicator::Population, &countries)
        .unwrap();
    assert_eq!(primary.batch_calls.load(Ordering::SeqCst), 2);

    cache.clear();
    cache
        .get_or_fetch(&resolver, Indicator::Gdp, &countries)
        .unwrap();
    assert_eq!(primary.batch_calls.load(Ordering::SeqCst), 3);
}
