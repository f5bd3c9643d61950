use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use euroind::{Indicator, OverlayCache, Resolver, codes};

#[derive(Parser, Debug)]
#[command(
    name = "euroind",
    version,
    about = "Fetch European economic indicators from Eurostat with a World Bank fallback"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve all four indicators for one country and print a profile.
    Profile(ProfileArgs),
    /// Resolve the latest value of one indicator for every known country.
    Overlay(OverlayArgs),
    /// List the known countries and per-source coverage.
    Countries,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Country code as used by the map dataset (e.g., DE, GR, GB)
    country: String,
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// One of: gdp, unemployment, inflation, population
    indicator: Indicator,
}

/// GDP is canonically in million EUR; headline display rounds to billions
/// or trillions like the original panel did.
fn fmt_gdp(meur: f64) -> String {
    if meur >= 1e6 {
        format!("€{}T", (meur / 1e6).round())
    } else {
        format!("€{}B", (meur / 1e3).round())
    }
}

fn fmt_population(count: f64) -> String {
    if count >= 1e9 {
        format!("{}B", (count / 1e9).round())
    } else {
        format!("{}M", (count / 1e6).round())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Profile(args) => cmd_profile(args),
        Command::Overlay(args) => cmd_overlay(args),
        Command::Countries => cmd_countries(),
    }
}

fn cmd_profile(args: ProfileArgs) -> Result<()> {
    let country = codes::find_country(&args.country)
        .ok_or_else(|| anyhow!("unknown country code {:?}", args.country))?;
    let resolver = Resolver::with_default_sources();
    let profile = resolver.resolve_profile(&country)?;

    println!("{} ({})", country.name, country.id);
    println!(
        "  GDP           {:>12}   [{}]",
        fmt_gdp(profile.gdp.series.latest),
        profile.gdp.source
    );
    println!(
        "  Population    {:>12}   [{}]",
        fmt_population(profile.population.series.latest),
        profile.population.source
    );
    println!(
        "  Unemployment  {:>11.2}%   [{}]",
        profile.unemployment.series.latest, profile.unemployment.source
    );
    println!(
        "  Inflation     {:>11.2}%   [{}]",
        profile.inflation.series.latest, profile.inflation.source
    );
    println!(
        "  history: {} GDP points, {} unemployment, {} inflation, {} population",
        profile.gdp.series.historical.len(),
        profile.unemployment.series.historical.len(),
        profile.inflation.series.historical.len(),
        profile.population.series.historical.len(),
    );
    Ok(())
}

fn cmd_overlay(args: OverlayArgs) -> Result<()> {
    let resolver = Resolver::with_default_sources();
    let countries = codes::all_countries();
    let mut cache = OverlayCache::new();
    let batch = cache.get_or_fetch(&resolver, args.indicator, &countries)?;

    let mut rows: Vec<(&str, f64)> = countries
        .iter()
        .filter_map(|c| batch.get(&c.id).map(|s| (c.name.as_str(), s.latest)))
        .collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    println!("{} ({} of {} countries):", args.indicator.label(), rows.len(), countries.len());
    for (name, value) in rows {
        println!("  {name:<24} {value:>16.2}");
    }
    Ok(())
}

fn cmd_countries() -> Result<()> {
    for country in codes::all_countries() {
        let eurostat = codes::eurostat_code(&country).unwrap_or_else(|| "-".into());
        let worldbank = codes::worldbank_code(&country).unwrap_or_else(|| "-".into());
        println!(
            "  {:<2}  {:<24} eurostat={:<3} worldbank={}",
            country.id, country.name, eurostat, worldbank
        );
    }
    Ok(())
}
