use crate::domain::error::AveoError;
use crate::domain::traits::{KeyValueStore, StoreEvent};
use async_trait::async_trait;
use std::io::Cursor;
use std::path::Path;
use tokio::sync::broadcast;
use tokio_rusqlite::{params, Connection};
use zstd::stream::{decode_all, encode_all};

pub async fn init_database(db_path: &Path) -> Result<Connection, AveoError> {
    let db = Connection::open(db_path.to_path_buf()).await?;
    create_schema(&db).await?;
    Ok(db)
}

async fn create_schema(db: &Connection) -> Result<(), AveoError> {
    db.call(|conn| {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                data BLOB NOT NULL,
                original_size INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    })
    .await?;

    Ok(())
}

/// SQLite-backed key/value store.
///
/// Values are zstd-compressed. Change events are only seen by subscribers of
/// this handle, not by other processes sharing the file.
pub struct SqliteStore {
    conn: Connection,
    events: broadcast::Sender<StoreEvent>,
}

impl SqliteStore {
    pub async fn open(db_path: &Path) -> Result<Self, AveoError> {
        let conn = init_database(db_path).await?;
        Ok(Self::new(conn))
    }

    pub async fn open_in_memory() -> Result<Self, AveoError> {
        let conn = Connection::open_in_memory().await?;
        create_schema(&conn).await?;
        Ok(Self::new(conn))
    }

    pub fn new(conn: Connection) -> Self {
        let (events, _) = broadcast::channel(64);
        Self { conn, events }
    }

    pub async fn count(&self) -> Result<usize, AveoError> {
        let count: i64 = self
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0)))
            .await?;
        Ok(count as usize)
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn load(&self, key: &str) -> Result<Option<String>, AveoError> {
        use rusqlite::OptionalExtension;

        let key_string = key.to_string();
        let blob: Option<Vec<u8>> = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT data FROM kv WHERE key = ?",
                    params![key_string],
                    |row| row.get(0),
                )
                .optional()
            })
            .await?;

        match blob {
            Some(compressed) => {
                let raw = decode_all(Cursor::new(&compressed))?;
                let text = String::from_utf8(raw).map_err(|e| {
                    AveoError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), AveoError> {
        let compressed = encode_all(Cursor::new(value.as_bytes()), 0)?;
        let original_len = value.len();
        let now = chrono::Utc::now().timestamp();
        let key_string = key.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO kv (key, data, original_size, updated_at)
                     VALUES (?, ?, ?, ?)",
                    params![key_string, compressed, original_len, now],
                )
            })
            .await?;

        let _ = self.events.send(StoreEvent::Saved(key.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AveoError> {
        let key_string = key.to_string();
        self.conn
            .call(move |conn| conn.execute("DELETE FROM kv WHERE key = ?", params![key_string]))
            .await?;

        let _ = self.events.send(StoreEvent::Removed(key.to_string()));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
