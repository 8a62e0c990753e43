use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use court_slots::config::AppConfig;
use court_slots::display::{print_availability, write_availability_to_file};
use court_slots::parser::{load_courts, load_reservations, reservations_for_court, Court, ReservationRecord};
use court_slots::schedule::slot_utils::{days_after, parse_iso_date};
use court_slots::schedule::{compute_availability, AvailabilityRequest, CivilZone, SystemClock};
use court_slots::web::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let mut config = AppConfig::load()?;
    let zone = config.zone()?;
    let args: Vec<String> = std::env::args().collect();

    // Web mode
    if args.len() > 1 && args[1] == "web" {
        if let Some(port) = args.get(2) {
            config.port = port.parse().with_context(|| format!("invalid port '{}'", port))?;
        }
        let courts = load_courts(&config.courts_csv).unwrap_or_else(|e| {
            warn!("starting without courts, could not read {}: {}", config.courts_csv.display(), e);
            Vec::new()
        });
        let reservations = load_reservations_or_empty(&config);

        info!("Starting web server on port {}...", config.port);
        info!("Access the API at http://localhost:{}/api/courts", config.port);

        let state = AppState::new(courts, reservations, zone, Arc::new(SystemClock))
            .with_courts_csv(config.courts_csv.clone())
            .with_default_range_days(config.default_range_days)
            .with_max_range_days(config.max_range_days);
        web::start_server(&config, state).await?;
        return Ok(());
    }

    // CLI mode
    let courts = load_courts(&config.courts_csv)
        .with_context(|| format!("failed to load courts from {}", config.courts_csv.display()))?;
    let reservations = load_reservations_or_empty(&config);
    info!("Loaded {} court(s) and {} reservation(s)", courts.len(), reservations.len());

    if args.len() > 1 && args[1] == "availability" {
        let court_id: u32 = args
            .get(2)
            .ok_or_else(|| anyhow!("usage: court-slots availability <court_id> [from] [days]"))?
            .parse()
            .context("court id must be a number")?;
        let Some(court) = courts.iter().find(|c| c.court_id == court_id) else {
            bail!("court {} not found", court_id);
        };
        let from = match args.get(3) {
            Some(text) => Some(parse_iso_date(text)?),
            None => None,
        };
        let days = match args.get(4) {
            Some(text) => text.parse().context("days must be a number")?,
            None => config.default_range_days,
        };
        if days > config.max_range_days {
            bail!("at most {} day(s) can be reported at once", config.max_range_days);
        }
        report_court(court, &reservations, zone, from, days, false)?;
        return Ok(());
    }

    println!("\n=== Availability for the next {} day(s) ===", config.default_range_days);
    for court in &courts {
        report_court(court, &reservations, zone, None, config.default_range_days, true)?;
    }
    Ok(())
}

fn load_reservations_or_empty(config: &AppConfig) -> Vec<ReservationRecord> {
    load_reservations(&config.reservations_csv).unwrap_or_else(|e| {
        warn!(
            "no reservations loaded, could not read {}: {}",
            config.reservations_csv.display(),
            e
        );
        Vec::new()
    })
}

fn report_court(
    court: &Court,
    reservations: &[ReservationRecord],
    zone: CivilZone,
    from: Option<chrono::NaiveDate>,
    days: u32,
    write_file: bool,
) -> anyhow::Result<()> {
    let now = zone.local_now(&SystemClock);
    let range_start = from.unwrap_or(now.date());
    let range_end_exclusive = days_after(range_start, days)
        .ok_or_else(|| anyhow!("a {}-day range from {} runs past the last supported date", days, range_start))?;
    let schedule = court.schedule();
    let ranges = reservations_for_court(reservations, court.court_id);

    let availability = compute_availability(&AvailabilityRequest {
        range_start,
        range_end_exclusive,
        schedule: &schedule,
        reservations: &ranges,
        now,
    });
    print_availability(court, &availability);

    if write_file {
        let filename = format!("availability_court_{}.txt", court.court_id);
        write_availability_to_file(court, &availability, &filename)?;
        println!("Saved to {}\n", filename);
    }
    Ok(())
}
