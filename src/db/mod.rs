//! Persistence module split across logical submodules.

mod connection;
mod filaments;

pub use connection::{ensure_schema, open_store};
pub use filaments::{
    fetch_filament_ids, fetch_filaments, filament_exists, generate_unique_id,
    generate_unique_id_with, get_filament, insert_filament, upsert_filament,
};
