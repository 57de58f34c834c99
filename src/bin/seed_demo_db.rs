// Dev utility: reset a demo database with one day of hourly production for every known line.
//
// Usage:
//   cargo run --bin seed_demo_db -- [db_path] [YYYY-MM-DD]
//
// The seeded day has a missing hour per line and a spread of stoppages (minor/moderate/critical)
// plus note-only rows, so every alert path shows up on the first refresh.

use chrono::{Local, NaiveDate};
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use production_monitor::app::get_default_db_path;
use production_monitor::config::{ConfigManager, KNOWN_LINES};
use production_monitor::db::{init_schema, open_sqlite_connection};
use production_monitor::domain::types::Shift;
use production_monitor::repository::ProductionRecordRepository;
use production_monitor::RawProductionRow;

const PLANT: &str = "Sopó";
const FIRST_HOUR: u32 = 6;
const LAST_HOUR: u32 = 21;

fn main() -> Result<(), Box<dyn Error>> {
    production_monitor::logging::init();

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(get_default_db_path);

    let date = match std::env::args().nth(2) {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")?,
        None => Local::now().date_naive(),
    };

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone())?;
    config.set_global_config_value("plant", PLANT)?;
    config.set_line_target("Litro", 800.0)?;
    config.set_line_target("Atlanta 1", 650.0)?;

    let repo = ProductionRecordRepository::from_connection(conn);
    let rows = build_demo_rows(date);
    let inserted = repo.batch_insert_raw(PLANT, &rows)?;

    println!("db_path={}", db_path);
    println!("date={}", date);
    println!("production_record={}", inserted);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn build_demo_rows(date: NaiveDate) -> Vec<RawProductionRow> {
    let operators = ["Ana", "Carlos", "Luisa", "Jorge"];
    let mut rows = Vec::new();

    for (line_idx, line) in KNOWN_LINES.iter().enumerate() {
        // Each line skips a different hour.
        let skipped = FIRST_HOUR + 2 + line_idx as u32;

        for hour in FIRST_HOUR..=LAST_HOUR {
            if hour == skipped {
                continue;
            }
            let shift = Shift::ALL
                .iter()
                .copied()
                .find(|s| s.covers_hour(hour))
                .unwrap_or(Shift::Shift1);

            let seed = (line_idx as u32 * 31 + hour * 17) % 100;
            let (lost, notes) = match seed {
                0..=4 => ("55", "Falla en etiquetadora"),
                5..=9 => ("30", "Atasco en transportador"),
                10..=14 => ("10", "Ajuste de guías"),
                15..=19 => ("0", "Cambio de referencia"),
                _ => ("", ""),
            };
            let base = if *line == "Litro" { 780 } else { 95 };
            let actual = base + (seed % 20) as i32 - 10;

            rows.push(RawProductionRow {
                line: Some(line.to_string()),
                operator: Some(operators[(hour as usize + line_idx) % operators.len()].to_string()),
                shift: Some(shift.to_string()),
                operator_count: Some((3 + line_idx % 3).to_string()),
                actual_output: Some(actual.max(0).to_string()),
                lost_minutes: Some(lost.to_string()).filter(|v| !v.is_empty()),
                notes: Some(notes.to_string()).filter(|v| !v.is_empty()),
                timestamp: None,
                date: Some(date.format("%Y-%m-%d").to_string()),
                hour: Some(format!("{:02}:00", hour)),
            });
        }
    }

    rows
}
