//! Canonical name sources
//!
//! A source yields the ordered list of canonical table names that assets are
//! matched against. The order is part of the contract: equal scores keep
//! source order, so a stable order keeps runs reproducible.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::DataSourceError;
use popmedia_common::db::{connect_readonly, quote_identifier, table_columns};

/// Table file extensions stripped from catalog names
const TABLE_EXTENSIONS: &[&str] = &["vpx", "vpt", "fpt", "fp"];

/// Canonical names plus any non-fatal problems met while listing them
#[derive(Debug, Default)]
pub struct CatalogListing {
    pub names: Vec<String>,
    pub warnings: Vec<DataSourceError>,
}

/// Supplies canonical names
#[async_trait]
pub trait CanonicalNameSource: Send + Sync {
    /// Ordered, possibly duplicate-containing canonical names
    ///
    /// Schema mismatches are reported through [`CatalogListing::warnings`];
    /// an `Err` means the catalog could not be read at all.
    async fn list_canonical_names(&self) -> Result<CatalogListing, DataSourceError>;
}

/// A fixed in-memory list, used as-is
#[async_trait]
impl CanonicalNameSource for Vec<String> {
    async fn list_canonical_names(&self) -> Result<CatalogListing, DataSourceError> {
        Ok(CatalogListing {
            names: self.iter().filter_map(|name| clean_catalog_name(name)).collect(),
            warnings: Vec::new(),
        })
    }
}

/// Strip a table-file extension and reject names unusable as file names
///
/// Returns `None` for blank names and names containing path separators.
pub fn clean_catalog_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let stripped = match trimmed.rsplit_once('.') {
        Some((stem, ext))
            if TABLE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext)) =>
        {
            stem.trim_end()
        }
        _ => trimmed,
    };

    if stripped.is_empty() || stripped.contains(['/', '\\', '\0']) {
        return None;
    }
    Some(stripped.to_string())
}

/// Canonical names from a PinUP Popper catalog database
///
/// Reads the `emulators` and `Games` tables. Expected columns are `EMUID`
/// and `EmuName` on `emulators`, `GameDisplay` and `EMUID` on `Games`; when
/// one is missing the first or second column of the table is used instead
/// and a warning is recorded.
pub struct PupDatabaseSource {
    pool: SqlitePool,
    emulator_filter: String,
}

impl PupDatabaseSource {
    /// Wrap an open pool
    pub fn new(pool: SqlitePool, emulator_filter: impl Into<String>) -> Self {
        Self {
            pool,
            emulator_filter: emulator_filter.into(),
        }
    }

    /// Open the catalog file read-only
    pub async fn open(
        db_path: &Path,
        emulator_filter: impl Into<String>,
    ) -> Result<Self, DataSourceError> {
        let pool = connect_readonly(db_path).await?;
        info!("Catalog database: {}", db_path.display());
        Ok(Self::new(pool, emulator_filter))
    }

    async fn emulator_ids(
        &self,
        warnings: &mut Vec<DataSourceError>,
    ) -> Result<Vec<String>, DataSourceError> {
        let columns = table_columns(&self.pool, "emulators").await?;
        debug!("Columns in emulators table: {:?}", columns);

        let (Some(id_column), Some(name_column)) = (
            pick_column("emulators", &columns, "EMUID", 0, warnings),
            pick_column("emulators", &columns, "EmuName", 1, warnings),
        ) else {
            return Ok(Vec::new());
        };

        let query = format!(
            "SELECT CAST({id} AS TEXT) FROM emulators WHERE {name} LIKE ? AND {id} IS NOT NULL",
            id = quote_identifier(&id_column),
            name = quote_identifier(&name_column),
        );
        let ids: Vec<String> = sqlx::query_scalar(&query)
            .bind(format!("%{}%", self.emulator_filter))
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn game_names(
        &self,
        emulator_ids: &[String],
        warnings: &mut Vec<DataSourceError>,
    ) -> Result<Vec<String>, DataSourceError> {
        let columns = table_columns(&self.pool, "Games").await?;
        debug!("Columns in Games table: {:?}", columns);

        let (Some(display_column), Some(emulator_column)) = (
            pick_column("Games", &columns, "GameDisplay", 0, warnings),
            pick_column("Games", &columns, "EMUID", 1, warnings),
        ) else {
            return Ok(Vec::new());
        };

        let placeholders = vec!["?"; emulator_ids.len()].join(", ");
        let query = format!(
            "SELECT CAST({display} AS TEXT) AS name FROM Games \
             WHERE CAST({emu} AS TEXT) IN ({placeholders}) \
             ORDER BY name COLLATE NOCASE, name",
            display = quote_identifier(&display_column),
            emu = quote_identifier(&emulator_column),
            placeholders = placeholders,
        );

        let mut statement = sqlx::query(&query);
        for id in emulator_ids {
            statement = statement.bind(id);
        }
        let rows = statement.fetch_all(&self.pool).await?;

        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: Option<String> = row.try_get("name")?;
            match raw.as_deref().and_then(clean_catalog_name) {
                Some(name) => names.push(name),
                None => debug!("Skipping unusable catalog name {:?}", raw),
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl CanonicalNameSource for PupDatabaseSource {
    async fn list_canonical_names(&self) -> Result<CatalogListing, DataSourceError> {
        let mut warnings = Vec::new();

        let emulator_ids = self.emulator_ids(&mut warnings).await?;
        if emulator_ids.is_empty() {
            warn!(
                "No emulators matching '{}' found in catalog",
                self.emulator_filter
            );
            return Ok(CatalogListing {
                names: Vec::new(),
                warnings,
            });
        }
        debug!("Emulator IDs: {:?}", emulator_ids);

        let names = self.game_names(&emulator_ids, &mut warnings).await?;
        if names.is_empty() {
            warn!("No tables found for emulators matching '{}'", self.emulator_filter);
        }
        info!("Found {} canonical table names", names.len());

        Ok(CatalogListing { names, warnings })
    }
}

/// Column `expected` if present, else the column at `position`
fn pick_column(
    table: &str,
    columns: &[String],
    expected: &str,
    position: usize,
    warnings: &mut Vec<DataSourceError>,
) -> Option<String> {
    if columns.iter().any(|column| column == expected) {
        return Some(expected.to_string());
    }

    match columns.get(position) {
        Some(fallback) => {
            let warning = DataSourceError::ColumnFallback {
                table: table.to_string(),
                expected: expected.to_string(),
                fallback: fallback.clone(),
            };
            warn!("{}", warning);
            warnings.push(warning);
            Some(fallback.clone())
        }
        None => {
            let warning = DataSourceError::TooFewColumns {
                table: table.to_string(),
                found: columns.len(),
            };
            // Report each table once even though two lookups may fail
            if !warnings.iter().any(|w| {
                matches!(w, DataSourceError::TooFewColumns { table: t, .. } if t == table)
            }) {
                warn!("{}", warning);
                warnings.push(warning);
            }
            None
        }
    }
}

/// Canonical names from a text file, one per line
///
/// Blank lines and lines starting with `#` are skipped; file order is kept.
pub struct NameListSource {
    path: PathBuf,
}

impl NameListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CanonicalNameSource for NameListSource {
    async fn list_canonical_names(&self) -> Result<CatalogListing, DataSourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DataSourceError::NameList(self.path.clone(), e.to_string()))?;

        let names: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(clean_catalog_name)
            .collect();

        info!(
            "Loaded {} canonical names from {}",
            names.len(),
            self.path.display()
        );
        Ok(CatalogListing {
            names,
            warnings: Vec::new(),
        })
    }
}
