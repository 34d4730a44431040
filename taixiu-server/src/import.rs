use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

use taixiu_db::db::insert_round;
use taixiu_db::models::Round;
use taixiu_db::rusqlite::Connection;

use crate::fetch::{parse_record, UpstreamRecord};

/// Colonnes : id, dice1, dice2, dice3 puis total (facultatif).
fn to_upstream(record: &csv::StringRecord) -> UpstreamRecord {
    let field = |idx: usize| -> Option<Value> {
        record
            .get(idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
    };

    UpstreamRecord {
        id: field(0),
        dice1: field(1),
        dice2: field(2),
        dice3: field(3),
        total: field(4),
        result: None,
    }
}

fn parse_row(record: &csv::StringRecord) -> Result<Round> {
    Ok(parse_record(&to_upstream(record))?)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path, fetched_at: &str) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult::default();

    for record_result in reader.records() {
        result.total_records += 1;
        let line = result.total_records;
        match record_result {
            Ok(record) => match parse_row(&record) {
                Ok(round) => match insert_round(&tx, &round, fetched_at) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        warn!(line, "Erreur insertion : {:#}", e);
                        result.errors += 1;
                    }
                },
                Err(e) => {
                    warn!(line, "Ligne rejetée : {}", e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                warn!(line, "Erreur lecture : {}", e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use taixiu_db::db::{count_rounds, fetch_all_rounds, migrate};
    use taixiu_db::models::Outcome;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_import_valid_rows() {
        let conn = setup();
        let file = write_csv("id,dice1,dice2,dice3,total\n1,4,4,3,11\n2,1,2,3,6\n3,6,6,6\n");
        let result = import_csv(&conn, file.path(), "2026-01-01T00:00:00Z").unwrap();

        assert_eq!(result, ImportResult { total_records: 3, inserted: 3, skipped: 0, errors: 0 });
        let rounds = fetch_all_rounds(&conn).unwrap();
        let outcomes: Vec<Outcome> = rounds.iter().map(|r| r.outcome).collect();
        assert_eq!(outcomes, vec![Outcome::Over, Outcome::Under, Outcome::Over]);
    }

    #[test]
    fn test_import_skips_duplicates_and_counts_errors() {
        let conn = setup();
        let file = write_csv("id,dice1,dice2,dice3,total\n1,4,4,3,11\n1,4,4,3,11\n2,7,1,1\n3,1,1,1,25\n4,1,2,3,12\n");
        let result = import_csv(&conn, file.path(), "2026-01-01T00:00:00Z").unwrap();

        assert_eq!(result.total_records, 5);
        assert_eq!(result.inserted, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 3);
        assert_eq!(count_rounds(&conn).unwrap(), 1);
    }

    #[test]
    fn test_import_missing_file() {
        let conn = setup();
        assert!(import_csv(&conn, Path::new("/nonexistent/rounds.csv"), "x").is_err());
    }
}
