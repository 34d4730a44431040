use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{Outcome, Round};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rounds (
    sequence_id   INTEGER PRIMARY KEY,
    die_1         INTEGER NOT NULL,
    die_2         INTEGER NOT NULL,
    die_3         INTEGER NOT NULL,
    total         INTEGER NOT NULL,
    outcome       TEXT NOT NULL,
    fetched_at    TEXT NOT NULL
);
";

/// Tour archivé avec sa date de réception.
#[derive(Debug, Clone)]
pub struct ArchivedRound {
    pub round: Round,
    pub fetched_at: String,
}

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("taixiu.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// `Ok(false)` si le tour était déjà archivé.
pub fn insert_round(conn: &Connection, round: &Round, fetched_at: &str) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO rounds (sequence_id, die_1, die_2, die_3, total, outcome, fetched_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            round.sequence_id,
            round.dice[0],
            round.dice[1],
            round.dice[2],
            round.sum,
            round.outcome.symbol().to_string(),
            fetched_at,
        ],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

fn row_to_archived(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, [u8; 3], String)> {
    Ok((
        row.get(0)?,
        [
            row.get::<_, u8>(1)?,
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
        ],
        row.get(4)?,
    ))
}

/// Les dés font foi : somme et résultat sont recalculés à la lecture.
fn rebuild(rows: Vec<(i64, [u8; 3], String)>) -> Result<Vec<ArchivedRound>> {
    rows.into_iter()
        .map(|(id, dice, fetched_at)| {
            let round = Round::new(id, dice)
                .with_context(|| format!("Tour {} corrompu dans l'archive", id))?;
            Ok(ArchivedRound { round, fetched_at })
        })
        .collect()
}

/// Les `limit` derniers tours, le plus récent en premier.
pub fn fetch_last_rounds(conn: &Connection, limit: u32) -> Result<Vec<ArchivedRound>> {
    let mut stmt = conn.prepare(
        "SELECT sequence_id, die_1, die_2, die_3, fetched_at
         FROM rounds ORDER BY sequence_id DESC LIMIT ?1"
    )?;
    let rows = stmt.query_map([limit], row_to_archived)?
        .collect::<Result<Vec<_>, _>>()?;
    rebuild(rows)
}

/// Toute l'archive, ordre chronologique (pour le backtest).
pub fn fetch_all_rounds(conn: &Connection) -> Result<Vec<Round>> {
    let mut stmt = conn.prepare(
        "SELECT sequence_id, die_1, die_2, die_3, fetched_at
         FROM rounds ORDER BY sequence_id ASC"
    )?;
    let rows = stmt.query_map([], row_to_archived)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rebuild(rows)?.into_iter().map(|a| a.round).collect())
}

pub fn count_rounds(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM rounds", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_by_outcome(conn: &Connection, outcome: Outcome) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM rounds WHERE outcome = ?1",
        [outcome.symbol().to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}
