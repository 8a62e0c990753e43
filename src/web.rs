use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::display::{
    format_hours, format_open_days, reservation_amount_label, reservation_state_label, reservation_time_label,
};
use crate::form::{export_court_to_csv, validate_court_form, CourtForm};
use crate::parser::{read_reservations, reservations_for_court, Court, ReservationRecord};
use crate::schedule::slot_utils::{days_after, minutes_of_day, minutes_to_hhmm, parse_iso_date};
use crate::schedule::{
    day_occupancy, AvailabilityCache, AvailabilityRequest, CivilZone, Clock, SlotAvailability,
};

/// Reservation batch plus a version bumped on every upload
#[derive(Debug, Default)]
pub struct ReservationStore {
    pub records: Vec<ReservationRecord>,
    pub version: u64,
}

// In-memory state; the courts CSV is the only thing written back to disk
pub struct AppState {
    pub courts: Mutex<Vec<Court>>,
    pub reservations: Mutex<ReservationStore>,
    pub caches: Mutex<HashMap<u32, AvailabilityCache>>,
    pub zone: CivilZone,
    pub clock: Arc<dyn Clock>,
    pub courts_csv: Option<PathBuf>,
    pub default_range_days: u32,
    pub max_range_days: u32,
}

impl AppState {
    pub fn new(
        courts: Vec<Court>,
        reservations: Vec<ReservationRecord>,
        zone: CivilZone,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            courts: Mutex::new(courts),
            reservations: Mutex::new(ReservationStore {
                records: reservations,
                version: 1,
            }),
            caches: Mutex::new(HashMap::new()),
            zone,
            clock,
            courts_csv: None,
            default_range_days: 7,
            max_range_days: 62,
        }
    }

    pub fn with_courts_csv(mut self, path: PathBuf) -> Self {
        self.courts_csv = Some(path);
        self
    }

    pub fn with_default_range_days(mut self, days: u32) -> Self {
        self.default_range_days = days;
        self
    }

    pub fn with_max_range_days(mut self, days: u32) -> Self {
        self.max_range_days = days;
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("state lock poisoned"))
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"error": message.into()}))
}

fn court_not_found(court_id: u32) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"error": format!("court {} not found", court_id)}))
}

#[derive(Serialize)]
pub struct CourtSummary {
    court_id: u32,
    name: String,
    open_days: String,
    hours: String,
    slot_minutes: Option<u32>,
    price: f64,
}

impl From<&Court> for CourtSummary {
    fn from(court: &Court) -> Self {
        Self {
            court_id: court.court_id,
            name: court.name.clone(),
            open_days: format_open_days(court.open_days),
            hours: format_hours(court),
            slot_minutes: court.slot_minutes,
            price: court.price,
        }
    }
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Serialize)]
pub struct SlotResponse {
    index: u32,
    start: String,
    end: String,
    status: &'static str,
}

impl From<&SlotAvailability> for SlotResponse {
    fn from(entry: &SlotAvailability) -> Self {
        let start = minutes_of_day(entry.slot.start);
        let end = start + (entry.slot.end - entry.slot.start).num_minutes() as u32;
        Self {
            index: entry.slot.index,
            start: minutes_to_hhmm(start),
            end: minutes_to_hhmm(end),
            status: entry.status.as_str(),
        }
    }
}

#[derive(Serialize)]
pub struct DayResponse {
    date: NaiveDate,
    slots: Vec<SlotResponse>,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    court_id: u32,
    from: NaiveDate,
    to: NaiveDate,
    price: f64,
    days: Vec<DayResponse>,
}

#[derive(Serialize)]
pub struct ReservationRow {
    reservation_id: u64,
    date: String,
    time: String,
    amount: String,
    state: &'static str,
}

#[derive(Deserialize)]
pub struct OccupancyQuery {
    date: Option<String>,
}

// Courts listing endpoint
async fn list_courts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let courts = lock(&state.courts)?;
    let summaries: Vec<CourtSummary> = courts.iter().map(CourtSummary::from).collect();
    Ok(HttpResponse::Ok().json(summaries))
}

// Court registration endpoint
async fn create_court(form: web::Json<CourtForm>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let form = form.into_inner();
    if let Err(e) = validate_court_form(&form) {
        return Ok(bad_request(e.to_string()));
    }

    let mut courts = lock(&state.courts)?;
    let Some(court_id) = courts.iter().map(|c| c.court_id).max().unwrap_or(0).checked_add(1) else {
        warn!("court ids are exhausted, cannot register '{}'", form.name);
        return Ok(HttpResponse::InternalServerError()
            .json(serde_json::json!({"error": "no court id left to assign"})));
    };
    let court = form.into_court(court_id);

    if let Some(path) = &state.courts_csv {
        export_court_to_csv(&court, path).map_err(|e| {
            actix_web::error::ErrorInternalServerError(format!("Failed to save court: {}", e))
        })?;
    }

    info!("registered court {} ({})", court.court_id, court.name);
    let summary = CourtSummary::from(&court);
    courts.push(court);
    Ok(HttpResponse::Created().json(summary))
}

// Reservation CSV upload endpoint
async fn upload_reservations(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    match read_reservations(body.as_ref()) {
        Ok(records) => {
            let count = records.len();
            let mut store = lock(&state.reservations)?;
            store.records = records;
            store.version += 1;
            info!("loaded {} reservation(s), data version {}", count, store.version);
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "count": count,
            })))
        }
        Err(e) => Ok(bad_request(format!("Failed to process CSV: {}", e))),
    }
}

// Availability endpoint
async fn get_availability(
    court_id: web::Path<u32>,
    query: web::Query<AvailabilityQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let court_id = court_id.into_inner();
    let now = state.zone.local_now(state.clock.as_ref());

    let from = match query.from.as_deref() {
        Some(text) => match parse_iso_date(text) {
            Ok(date) => date,
            Err(e) => return Ok(bad_request(e.to_string())),
        },
        None => now.date(),
    };
    let to = match query.to.as_deref() {
        Some(text) => match parse_iso_date(text) {
            Ok(date) => date,
            Err(e) => return Ok(bad_request(e.to_string())),
        },
        None => match days_after(from, state.default_range_days) {
            Some(date) => date,
            None => return Ok(bad_request(format!("range starting {} runs past the last supported date", from))),
        },
    };
    if to < from {
        return Ok(bad_request("'to' must not be before 'from'"));
    }
    let span = to.signed_duration_since(from).num_days();
    if span > i64::from(state.max_range_days) {
        return Ok(bad_request(format!(
            "range of {} days exceeds the maximum of {}",
            span, state.max_range_days
        )));
    }

    let court = {
        let courts = lock(&state.courts)?;
        match courts.iter().find(|c| c.court_id == court_id) {
            Some(court) => court.clone(),
            None => return Ok(court_not_found(court_id)),
        }
    };
    let schedule = court.schedule();

    let (ranges, version) = {
        let store = lock(&state.reservations)?;
        (reservations_for_court(&store.records, court_id), store.version)
    };

    let request = AvailabilityRequest {
        range_start: from,
        range_end_exclusive: to,
        schedule: &schedule,
        reservations: &ranges,
        now,
    };
    let availability = {
        let mut caches = lock(&state.caches)?;
        caches.entry(court_id).or_default().get_or_compute(&request, version)
    };

    let days = availability
        .iter()
        .map(|(date, slots)| DayResponse {
            date: *date,
            slots: slots.iter().map(SlotResponse::from).collect(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(AvailabilityResponse {
        court_id,
        from,
        to,
        price: schedule.price,
        days,
    }))
}

// Reservations table endpoint
async fn list_reservations(court_id: web::Path<u32>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let court_id = court_id.into_inner();
    let schedule = {
        let courts = lock(&state.courts)?;
        match courts.iter().find(|c| c.court_id == court_id) {
            Some(court) => court.schedule(),
            None => return Ok(court_not_found(court_id)),
        }
    };

    let store = lock(&state.reservations)?;
    let mut records: Vec<&ReservationRecord> = store.records.iter().filter(|r| r.court_id == court_id).collect();
    records.sort_by(|a, b| (&a.date, a.slot_index_from).cmp(&(&b.date, b.slot_index_from)));

    let rows: Vec<ReservationRow> = records
        .into_iter()
        .map(|record| ReservationRow {
            reservation_id: record.reservation_id,
            date: record.date.clone(),
            time: reservation_time_label(record, &schedule),
            amount: reservation_amount_label(record),
            state: reservation_state_label(record),
        })
        .collect();
    Ok(HttpResponse::Ok().json(rows))
}

// Statistics endpoint
async fn get_occupancy(
    court_id: web::Path<u32>,
    query: web::Query<OccupancyQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let court_id = court_id.into_inner();
    let date = match query.date.as_deref() {
        Some(text) => match parse_iso_date(text) {
            Ok(date) => date,
            Err(e) => return Ok(bad_request(e.to_string())),
        },
        None => state.zone.local_now(state.clock.as_ref()).date(),
    };

    let schedule = {
        let courts = lock(&state.courts)?;
        match courts.iter().find(|c| c.court_id == court_id) {
            Some(court) => court.schedule(),
            None => return Ok(court_not_found(court_id)),
        }
    };
    let ranges = {
        let store = lock(&state.reservations)?;
        reservations_for_court(&store.records, court_id)
    };

    let occupancy = day_occupancy(date, &schedule, &ranges);
    if occupancy.total == 0 {
        warn!("court {} has an empty slot grid on {}", court_id, date);
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "court_id": court_id,
        "date": occupancy.date,
        "total": occupancy.total,
        "taken": occupancy.taken,
        "free": occupancy.free,
        "occupancy_ratio": occupancy.occupancy_ratio(),
        "booked_value": occupancy.booked_value(&schedule),
        "slots": occupancy.slots,
    })))
}

/// Registers all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/courts", web::get().to(list_courts))
        .route("/api/courts", web::post().to(create_court))
        .route("/api/reservations/upload", web::post().to(upload_reservations))
        .route("/api/courts/{id}/availability", web::get().to(get_availability))
        .route("/api/courts/{id}/reservations", web::get().to(list_reservations))
        .route("/api/courts/{id}/occupancy", web::get().to(get_occupancy));
}

pub async fn start_server(config: &AppConfig, state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);
    let port = config.port;

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
