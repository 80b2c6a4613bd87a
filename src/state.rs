use std::path::PathBuf;

use crate::db::{DbPool, OrmConn};

/// Shared handler state. `orm` wraps the same Postgres pool as `pool`,
/// so both query paths draw from one set of connections.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub upload_dir: PathBuf,
}
