pub mod database;
pub mod store;

pub use store::TripStore;

use std::fs;
use std::path::Path;

/// Ensure the parent directory of the database file exists
pub fn ensure_data_dir(database_path: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(database_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
