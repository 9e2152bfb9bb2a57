use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;

use crate::{error::Result, table::visible::OccupancyTable};

pub const TABLE_NAME: &str = "machine_schedule_table";

/// The occupancy table of each page, stored as a JSON encoded boolean matrix.
pub struct TableStore {}

impl TableStore {
    pub fn create_table(connection_pool: &Arc<Pool<SqliteConnectionManager>>) -> Result<()> {
        let connection = connection_pool.get()?;
        connection.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    page_id INTEGER PRIMARY KEY,
                    table_json TEXT NOT NULL
                )",
                TABLE_NAME
            ),
            (),
        )?;
        Ok(())
    }

    /**
    Get the occupancy table of a page.

    Returns `Ok(None)` if the page id is not a valid page or nothing has been stored for it.
    */
    pub fn query_table(
        connection: &PooledConnection<SqliteConnectionManager>,
        page_id: i64,
    ) -> Result<Option<OccupancyTable>> {
        if page_id < 0 {
            return Ok(None);
        }
        let table_json: Option<String> = connection
            .query_row(
                &format!("SELECT table_json FROM {} WHERE page_id = ?1", TABLE_NAME),
                rusqlite::params![page_id],
                |row| row.get(0),
            )
            .optional()?;
        match table_json {
            None => Ok(None),
            Some(table_json) => Ok(Some(serde_json::from_str(&table_json)?)),
        }
    }

    /**
    Replace the occupancy table of a page.

    Returns `Ok(false)` without writing if the page id is not a valid page.
    */
    pub fn update_table(
        connection: &PooledConnection<SqliteConnectionManager>,
        page_id: i64,
        table: &OccupancyTable,
    ) -> Result<bool> {
        if page_id < 0 {
            return Ok(false);
        }
        let table_json = serde_json::to_string(table)?;
        connection.execute(
            &format!(
                "INSERT INTO {} (page_id, table_json) VALUES (?1, ?2)
                 ON CONFLICT(page_id) DO UPDATE SET table_json = excluded.table_json",
                TABLE_NAME
            ),
            rusqlite::params![page_id, table_json],
        )?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_pool() -> Arc<Pool<SqliteConnectionManager>> {
        // A single connection, every in-memory connection is its own database.
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        let pool = Arc::new(pool);
        TableStore::create_table(&pool).unwrap();
        pool
    }

    #[test]
    fn nothing_stored_yet() {
        let pool = memory_pool();
        let connection = pool.get().unwrap();
        assert_eq!(TableStore::query_table(&connection, 1).unwrap(), None);
    }

    #[test]
    fn update_then_query() {
        let pool = memory_pool();
        let connection = pool.get().unwrap();
        let table = vec![vec![true, false], vec![false, false]];
        assert!(TableStore::update_table(&connection, 5, &table).unwrap());
        assert_eq!(TableStore::query_table(&connection, 5).unwrap(), Some(table));
        assert_eq!(TableStore::query_table(&connection, 6).unwrap(), None);
    }

    #[test]
    fn update_replaces_previous_table() {
        let pool = memory_pool();
        let connection = pool.get().unwrap();
        TableStore::update_table(&connection, 5, &vec![vec![true]]).unwrap();
        let table = vec![vec![false, true, true]];
        TableStore::update_table(&connection, 5, &table).unwrap();
        assert_eq!(TableStore::query_table(&connection, 5).unwrap(), Some(table));
    }

    #[test]
    fn negative_page_is_not_a_page() {
        let pool = memory_pool();
        let connection = pool.get().unwrap();
        assert!(!TableStore::update_table(&connection, -1, &vec![vec![true]]).unwrap());
        assert_eq!(TableStore::query_table(&connection, -1).unwrap(), None);
    }

    #[test]
    fn corrupt_json_is_an_error() {
        let pool = memory_pool();
        let connection = pool.get().unwrap();
        connection
            .execute(
                &format!("INSERT INTO {} (page_id, table_json) VALUES (9, 'oops')", TABLE_NAME),
                (),
            )
            .unwrap();
        assert!(TableStore::query_table(&connection, 9).is_err());
    }
}
