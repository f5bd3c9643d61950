//! euroind
//!
//! A lightweight Rust library for retrieving European economic indicator
//! data (GDP, unemployment, inflation, population) from Eurostat, with the
//! World Bank as a fallback source, normalized into one canonical time
//! series model. Pairs with the `euroind` CLI.
//!
//! ### Features
//! - Single-country lookups: full history for one indicator, primary source
//!   first, automatic fallback
//! - Four-indicator country profiles, fetched concurrently
//! - Batch "latest value per country" lookups for choropleth overlays, with
//!   gap-filling from the fallback source and in-memory caching
//! - Uniform unit reconciliation (GDP in million EUR) and date normalization
//!   regardless of which source answered
//!
//! ### Example
//! ```no_run
//! use euroind::{Indicator, Resolver, codes};
//!
//! let resolver = Resolver::with_default_sources();
//! let greece = codes::find_country("GR").unwrap();
//! let resolved = resolver.resolve(Indicator::Gdp, &greece)?;
//! println!("GDP: {} MEUR (from {})", resolved.series.latest, resolved.source);
//! # Ok::<(), euroind::NoDataAvailable>(())
//! ```

pub mod codes;
pub mod error;
pub mod eurostat;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod worldbank;

pub use error::{FetchError, NoDataAvailable};
pub use models::{BatchResult, Country, DataSource, Indicator, Profile, Resolved, Series, TimePoint};
pub use resolver::{OverlayCache, Resolver};
