mod report;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use selene::chart::{ChartKind, ChartSnapshot};
use selene::engine::Engine;
use selene::ephemeris::Planet;
use selene::forecast::{parse_birth_datetime, BirthProfile};
use selene::retrograde::next_period;
use selene::settings::EngineSettings;
use selene::timezone::today_in;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Astrological forecasts, retrograde windows and lunar days")]
struct Args {
    /// Engine config file (otherwise SELENE_CONFIG or configs/engine.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Swiss Ephemeris data directory override.
    #[arg(long, global = true)]
    ephemeris_path: Option<PathBuf>,

    /// Print JSON instead of rendered text.
    #[arg(long, global = true)]
    json: bool,

    /// Seed for template selection (0 = random).
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Daily forecast for a birth profile stored as JSON.
    Forecast {
        /// Path to a JSON birth profile.
        #[arg(long)]
        profile: PathBuf,
        /// Target date (default: today in the profile's timezone).
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 0)]
        user_id: i64,
    },
    /// Retrograde periods in a date range.
    Retro {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Single planet (default: all tracked planets).
        #[arg(long)]
        planet: Option<Planet>,
        /// Render premium wording.
        #[arg(long)]
        premium: bool,
    },
    /// Lunar phase, Moon sign and suggested actions for consecutive days.
    Lunar {
        /// IANA timezone of the user.
        #[arg(long, default_value = "UTC")]
        tz: String,
        /// First day (default: today in `tz`).
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long, default_value_t = 5)]
        days: u32,
        /// Birth profile for natal house enrichment.
        #[arg(long)]
        profile: Option<PathBuf>,
        #[arg(long)]
        premium: bool,
        /// Actions shown per day.
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },
    /// Aspects between transiting planets on a day.
    Sky {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        premium: bool,
    },
}

fn load_settings(args: &Args) -> anyhow::Result<EngineSettings> {
    let mut settings = match &args.config {
        Some(path) => selene_config::load_engine_settings_from(path)?,
        None => selene_config::load_engine_settings()?,
    };
    if let Some(path) = &args.ephemeris_path {
        settings.ephemeris.path = Some(path.clone());
    }
    if let Some(path) = &settings.ephemeris.path {
        selene_config::validate_ephemeris_dir(path)?;
    }
    Ok(settings)
}

fn read_profile(path: &PathBuf) -> anyhow::Result<BirthProfile> {
    let text = fs::read_to_string(path).with_context(|| format!("read profile {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse profile {}", path.display()))
}

/// Natal chart for a profile, without the transit and aspect work of a forecast.
fn natal_chart(engine: &Engine, profile: &BirthProfile) -> anyhow::Result<ChartSnapshot> {
    let missing = profile.missing_fields();
    let (true, Some(birth_date), Some(timezone), Some(lat), Some(lon)) = (
        missing.is_empty(),
        profile.birth_date.as_deref(),
        profile.timezone.as_deref(),
        profile.lat,
        profile.lon,
    ) else {
        anyhow::bail!("profile is missing {}", missing.join(", "));
    };
    let birth = parse_birth_datetime(birth_date, profile.birth_time.as_deref())?;
    engine
        .build_chart(birth, timezone, lat, lon, ChartKind::Natal)
        .context("build natal chart")
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let settings = load_settings(&args)?;
    let mut engine = Engine::swiss(settings).context("initialise engine")?;
    let mut rng = if args.seed == 0 {
        StdRng::from_entropy()
    } else {
        StdRng::seed_from_u64(args.seed)
    };

    match &args.command {
        Command::Forecast {
            profile,
            date,
            user_id,
        } => {
            let profile = read_profile(profile)?;
            let result = engine.generate_forecast(&profile, *user_id, *date);
            if let Some(err) = &result.error {
                log::warn!("Forecast for user {} failed: {}", user_id, err);
            }
            if args.json {
                print_json(&result)?;
            } else {
                println!("{}", engine.render_forecast(&result, &mut rng));
            }
        }
        Command::Retro {
            from,
            to,
            planet,
            premium,
        } => {
            let periods = match planet {
                Some(planet) => {
                    let mut single = std::collections::BTreeMap::new();
                    single.insert(*planet, engine.extract_retrograde_periods(*planet, *from, *to)?);
                    single
                }
                None => engine.retrograde_periods(*from, *to)?,
            };
            if args.json {
                return print_json(&periods);
            }
            for (planet, list) in &periods {
                match next_period(list, *from) {
                    Some(period) => println!("{}\n", engine.format_summary(period, *premium, *from)),
                    None => println!("{}: no retrograde periods near {}..{}\n", planet, from, to),
                }
            }
        }
        Command::Lunar {
            tz,
            start,
            days,
            profile,
            premium,
            limit,
        } => {
            let natal = match profile {
                Some(path) => Some(natal_chart(&engine, &read_profile(path)?)?),
                None => None,
            };
            let start = start.unwrap_or_else(|| today_in(tz));
            let window = engine.build_lunar_window(start, tz, *days, natal.as_ref())?;
            let sections: Vec<report::DayReport> = window
                .iter()
                .map(|day| report::DayReport {
                    actions: engine.select_actions(day, *premium, *limit),
                    day: day.clone(),
                })
                .collect();
            if args.json {
                return print_json(&sections);
            }
            for index in 0..sections.len() {
                println!("{}\n", report::format_day_section(&engine, &sections, index, &mut rng));
            }
        }
        Command::Sky { date, premium } => {
            let date = date.unwrap_or_else(|| today_in("UTC"));
            let aspects = engine.aspects_of_day(date, &mut rng)?;
            if args.json {
                return print_json(&aspects);
            }
            let shown = if *premium { &aspects[..] } else { &aspects[..aspects.len().min(1)] };
            println!("{}", engine.format_day_aspects(shown, *premium));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use selene::ephemeris::{
        CuspId, EphemerisError, EphemerisProvider, GeoLocation, HouseSystem, PlanetPosition, RawCusp,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Sun at 10° on every instant, equal houses from 0°
    struct StillSky {
        planet_calls: Arc<AtomicUsize>,
    }

    impl EphemerisProvider for StillSky {
        fn planet_positions(
            &self,
            _instant: DateTime<Utc>,
            planets: &[Planet],
        ) -> Result<HashMap<Planet, PlanetPosition>, EphemerisError> {
            self.planet_calls.fetch_add(1, Ordering::SeqCst);
            Ok(planets
                .iter()
                .filter(|p| **p == Planet::Sun)
                .map(|p| (*p, PlanetPosition::new(*p, 10.0, 0.0, 1.0)))
                .collect())
        }

        fn house_cusps(
            &self,
            _instant: DateTime<Utc>,
            _location: GeoLocation,
            _system: HouseSystem,
        ) -> Result<Vec<RawCusp>, EphemerisError> {
            Ok((1..=12)
                .map(|i| RawCusp {
                    id: CuspId::Index(i),
                    lon: (i - 1) as f64 * 30.0,
                })
                .collect())
        }
    }

    fn engine() -> (Engine, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = StillSky {
            planet_calls: calls.clone(),
        };
        let engine = Engine::new(Box::new(provider), EngineSettings::default()).unwrap();
        (engine, calls)
    }

    fn profile() -> BirthProfile {
        BirthProfile {
            birth_date: Some("1990-05-17".into()),
            birth_time: Some("10:30".into()),
            timezone: Some("Europe/Moscow".into()),
            lat: Some(55.75),
            lon: Some(37.62),
            place_name: None,
        }
    }

    #[test]
    fn test_natal_chart_casts_only_the_birth_sky() {
        let (engine, calls) = engine();
        let chart = natal_chart(&engine, &profile()).unwrap();
        assert_eq!(chart.kind, ChartKind::Natal);
        assert_eq!(chart.houses.len(), 12);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_natal_chart_reports_missing_fields() {
        let (engine, calls) = engine();
        let partial = BirthProfile {
            lat: None,
            ..profile()
        };
        let err = natal_chart(&engine, &partial).unwrap_err();
        assert!(err.to_string().contains("lat"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
