//! Tabular (CSV) interop
//!
//! Per-kind exports with a fixed column order (inspection/interop only, not
//! re-imported) and the bulk-import template for seeding history.

use fitcycle_model::{Metric, Session, SessionKind, SetLog};
use fitcycle_store::RecordStore;
use fitcycle_util::{format_iso_date, parse_iso_date};
use tracing::{debug, warn};

use crate::{BackupError, BackupResult};

/// Required header of the bulk-import template
pub const TEMPLATE_HEADER: [&str; 4] = ["date", "type", "dayNumber", "bodyweightLb"];

fn writer_to_string(writer: csv::Writer<Vec<u8>>) -> BackupResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| BackupError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BackupError::Csv(e.to_string()))
}

/// Sessions table: `id,date,type,dayNumber,createdAt,updatedAt`
pub fn sessions_csv(sessions: &[Session]) -> BackupResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "date", "type", "dayNumber", "createdAt", "updatedAt"])?;
    for s in sessions {
        writer.write_record([
            s.id.as_str(),
            &format_iso_date(s.date),
            s.kind.as_str(),
            &s.day_number.to_string(),
            &s.created_at.to_rfc3339(),
            &s.updated_at.to_rfc3339(),
        ])?;
    }
    writer_to_string(writer)
}

/// Set logs table:
/// `id,sessionId,date,type,dayNumber,exerciseName,setNumber,reps,weight,createdAt`
pub fn set_logs_csv(logs: &[SetLog]) -> BackupResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "sessionId",
        "date",
        "type",
        "dayNumber",
        "exerciseName",
        "setNumber",
        "reps",
        "weight",
        "createdAt",
    ])?;
    for log in logs {
        writer.write_record([
            log.id.as_str(),
            log.session_id.as_str(),
            &format_iso_date(log.date),
            SessionKind::Workout.as_str(),
            &log.day_number.to_string(),
            &log.exercise_name,
            &log.set_number.to_string(),
            &log.reps.to_string(),
            &log.weight.to_string(),
            &log.created_at.to_rfc3339(),
        ])?;
    }
    writer_to_string(writer)
}

/// Metrics table: `date,bodyweightLb,calories,updatedAt`
pub fn metrics_csv(metrics: &[Metric]) -> BackupResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["date", "bodyweightLb", "calories", "updatedAt"])?;
    for m in metrics {
        writer.write_record([
            format_iso_date(m.date),
            m.bodyweight_lb.map(|v| v.to_string()).unwrap_or_default(),
            m.calories.map(|v| v.to_string()).unwrap_or_default(),
            m.updated_at.to_rfc3339(),
        ])?;
    }
    writer_to_string(writer)
}

/// Outcome counters of a template import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateImportSummary {
    /// New sessions written
    pub sessions_added: usize,
    /// Rows whose date already had a session (the metric may still apply)
    pub sessions_skipped: usize,
    /// Metric rows written or merged
    pub metrics_updated: usize,
    /// Rows dropped by validation
    pub rows_skipped: usize,
}

/// Import the bulk template: `date,type,dayNumber,bodyweightLb`.
///
/// Invalid rows are skipped and counted, not fatal. A row whose date already
/// has a session keeps the existing session but may still update the metric.
/// Cycle state is left untouched; callers re-derive it afterwards.
pub fn import_template(
    store: &dyn RecordStore,
    text: &str,
) -> BackupResult<TemplateImportSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = reader.headers()?.clone();
    let expected = csv::StringRecord::from(TEMPLATE_HEADER.to_vec());
    if header != expected {
        return Err(BackupError::MalformedInput(format!(
            "template header must be exactly {}",
            TEMPLATE_HEADER.join(",")
        )));
    }

    let mut summary = TemplateImportSummary::default();

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(row = index, error = %e, "Template row unreadable, skipped");
                summary.rows_skipped += 1;
                continue;
            }
        };

        let Some(parsed) = parse_template_row(&record) else {
            debug!(row = index, "Template row failed validation, skipped");
            summary.rows_skipped += 1;
            continue;
        };

        if store.get_session_by_date(parsed.date)?.is_some() {
            summary.sessions_skipped += 1;
        } else {
            let session = match parsed.kind {
                SessionKind::Workout => Session::workout(parsed.date, parsed.day_number),
                SessionKind::Rest => Session::rest(parsed.date),
            };
            store.put_session(&session)?;
            summary.sessions_added += 1;
        }

        if let Some(bodyweight) = parsed.bodyweight_lb {
            let mut metric = store
                .get_metric_by_date(parsed.date)?
                .unwrap_or_else(|| Metric::empty(parsed.date));
            metric.bodyweight_lb = Some(bodyweight);
            metric.updated_at = fitcycle_util::now();
            store.put_metric(&metric)?;
            summary.metrics_updated += 1;
        }
    }

    debug!(?summary, "Template import finished");
    Ok(summary)
}

struct TemplateRow {
    date: chrono::NaiveDate,
    kind: SessionKind,
    day_number: u8,
    bodyweight_lb: Option<f64>,
}

fn parse_template_row(record: &csv::StringRecord) -> Option<TemplateRow> {
    let date = parse_iso_date(record.get(0)?.trim())?;
    let kind = SessionKind::parse(record.get(1)?.trim())?;
    let day_number: u8 = record.get(2)?.trim().parse().ok()?;

    // REST rows must carry 0, WORKOUT rows a plan position
    match kind {
        SessionKind::Workout if !(1..=5).contains(&day_number) => return None,
        SessionKind::Rest if day_number != 0 => return None,
        _ => {}
    }

    let bodyweight_field = record.get(3).map(str::trim).unwrap_or("");
    let bodyweight_lb = if bodyweight_field.is_empty() {
        None
    } else {
        let value: f64 = bodyweight_field.parse().ok()?;
        if !(value.is_finite() && value > 0.0) {
            return None;
        }
        Some(value)
    };

    Some(TemplateRow {
        date,
        kind,
        day_number,
        bodyweight_lb,
    })
}
