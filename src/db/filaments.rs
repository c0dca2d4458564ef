//! Queries over the `filaments` table.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::models::Filament;

/// Length of the generated identifiers.
const ID_LEN: usize = 8;

const SELECT_COLUMNS: &str =
    "SELECT id, brand, material, color, weight, date_opened, empty, open FROM filaments";

fn filament_from_row(row: &Row<'_>) -> rusqlite::Result<Filament> {
    Ok(Filament {
        id: row.get(0)?,
        brand: row.get(1)?,
        material: row.get(2)?,
        color: row.get(3)?,
        weight: row.get(4)?,
        date_opened: row.get(5)?,
        empty: row.get(6)?,
        open: row.get(7)?,
    })
}

/// Every record in insertion order. The inventory view renders them as-is.
pub fn fetch_filaments(conn: &Connection) -> Result<Vec<Filament>> {
    let mut stmt = conn
        .prepare(&format!("{SELECT_COLUMNS} ORDER BY rowid"))
        .context("failed to prepare filament query")?;

    let filaments = stmt
        .query_map([], filament_from_row)
        .context("failed to load filaments")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect filaments")?;

    Ok(filaments)
}

/// Identifiers for the update form's selector.
pub fn fetch_filament_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT id FROM filaments ORDER BY rowid")
        .context("failed to prepare filament id query")?;

    let ids = stmt
        .query_map([], |row| row.get(0))
        .context("failed to load filament ids")?
        .collect::<Result<Vec<String>, _>>()
        .context("failed to collect filament ids")?;

    Ok(ids)
}

/// Point lookup by primary key.
pub fn get_filament(conn: &Connection, id: &str) -> Result<Option<Filament>> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        filament_from_row,
    )
    .optional()
    .context("failed to look up filament")
}

pub fn filament_exists(conn: &Connection, id: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM filaments WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
    .context("failed to check filament id")
}

/// Insert a brand new record. The write runs in its own transaction; any
/// failure drops it and rolls back.
pub fn insert_filament(conn: &Connection, filament: &Filament) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin transaction")?;
    tx.execute(
        "INSERT INTO filaments (id, brand, material, color, weight, date_opened, empty, open)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            filament.id,
            filament.brand,
            filament.material,
            filament.color,
            filament.weight,
            filament.date_opened,
            filament.empty,
            filament.open,
        ],
    )
    .context("failed to insert filament")?;
    tx.commit().context("failed to commit filament insert")?;

    debug!(id = %filament.id, "inserted filament");
    Ok(())
}

/// Insert-or-replace keyed on `id`, rewriting every non-key column. Applying
/// the same payload twice leaves the table as applying it once.
pub fn upsert_filament(conn: &Connection, filament: &Filament) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to begin transaction")?;
    tx.execute(
        "INSERT INTO filaments (id, brand, material, color, weight, date_opened, empty, open)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
             brand = excluded.brand,
             material = excluded.material,
             color = excluded.color,
             weight = excluded.weight,
             date_opened = excluded.date_opened,
             empty = excluded.empty,
             open = excluded.open",
        params![
            filament.id,
            filament.brand,
            filament.material,
            filament.color,
            filament.weight,
            filament.date_opened,
            filament.empty,
            filament.open,
        ],
    )
    .context("failed to upsert filament")?;
    tx.commit().context("failed to commit filament update")?;

    debug!(id = %filament.id, "upserted filament");
    Ok(())
}

/// Draw random tokens until one is not taken yet.
pub fn generate_unique_id(conn: &Connection) -> Result<String> {
    generate_unique_id_with(conn, random_token)
}

/// Same as [`generate_unique_id`] with a caller-supplied token source.
pub fn generate_unique_id_with<F>(conn: &Connection, mut next_token: F) -> Result<String>
where
    F: FnMut() -> String,
{
    loop {
        let candidate = next_token();
        if !filament_exists(conn, &candidate)? {
            return Ok(candidate);
        }
        debug!(id = %candidate, "generated id already taken, retrying");
    }
}

fn random_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(ID_LEN);
    token
}
