pub mod authors;
pub mod books;
pub mod schema;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};

// Re-export all public items from submodules
pub use authors::*;
pub use books::*;
pub use schema::run_migrations;

pub type DbPool = Arc<Mutex<Connection>>;

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).ok();
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Open an in-memory database with the full schema (fixtures and tests)
pub fn init_db_in_memory() -> Result<DbPool> {
  let conn = Connection::open_in_memory()?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}
