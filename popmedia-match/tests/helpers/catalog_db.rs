//! Catalog Database Test Utilities
//!
//! Builds throwaway PUPDatabase.db files with a chosen schema.

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

/// Create a catalog with the stock PinUP columns
///
/// `emulators` rows are `(EMUID, EmuName)`, `games` rows are
/// `(GameDisplay, EMUID)`.
pub async fn create_catalog_db(
    dir: &Path,
    emulators: &[(i64, &str)],
    games: &[(Option<&str>, i64)],
) -> Result<PathBuf> {
    let path = dir.join("PUPDatabase.db");
    let pool = open_writable(&path).await?;

    sqlx::query("CREATE TABLE emulators (EMUID INTEGER PRIMARY KEY, EmuName TEXT, EmuDisplay TEXT)")
        .execute(&pool)
        .await?;
    sqlx::query(
        "CREATE TABLE Games (GameID INTEGER PRIMARY KEY, EMUID INTEGER, GameName TEXT, GameDisplay TEXT)",
    )
    .execute(&pool)
    .await?;

    for (id, name) in emulators {
        sqlx::query("INSERT INTO emulators (EMUID, EmuName, EmuDisplay) VALUES (?, ?, ?)")
            .bind(*id)
            .bind(*name)
            .bind(*name)
            .execute(&pool)
            .await?;
    }
    for (display, emu) in games {
        sqlx::query("INSERT INTO Games (EMUID, GameName, GameDisplay) VALUES (?, ?, ?)")
            .bind(*emu)
            .bind(*display)
            .bind(*display)
            .execute(&pool)
            .await?;
    }

    pool.close().await;
    Ok(path)
}

/// Create a catalog from raw SQL statements
pub async fn create_catalog_db_with_schema(dir: &Path, statements: &[&str]) -> Result<PathBuf> {
    let path = dir.join("PUPDatabase.db");
    let pool = open_writable(&path).await?;

    for statement in statements {
        sqlx::query(statement).execute(&pool).await?;
    }

    pool.close().await;
    Ok(path)
}

async fn open_writable(path: &Path) -> Result<SqlitePool> {
    let db_url = format!("sqlite:{}?mode=rwc", path.display());
    Ok(SqlitePool::connect(&db_url).await?)
}
