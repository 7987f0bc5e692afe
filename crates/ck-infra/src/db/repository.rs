use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use ck_core::clipboard::{ClipboardEntry, DataType, PINNED_TIMESTAMP_MS};
use ck_core::dedup::{content_equals, plan_cleanup, unique_newest};
use ck_core::ids::EntryId;
use ck_core::ports::{
    ClockPort, HistoryEvent, HistoryEvents, HistoryStoreError, HistoryStorePort, StoreResult,
};
use ck_core::Settings;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use tracing::{debug, info};

use crate::db::connection::{database_url, establish, run_migrations};
use crate::db::executor::{RetryPolicy, RetryingExecutor};
use crate::db::mapper::{HistoryRowMapper, InsertMapper, RowMapper};
use crate::db::models::HistoryRow;
use crate::db::schema::clipboard_history;

/// Database file name under the cache folder.
pub const DATABASE_FILE_NAME: &str = "history.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub max_history_size: usize,
    pub ignore_duplicates: bool,
}

impl StoreOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_history_size: settings.history.max_history_size,
            ignore_duplicates: settings.history.ignore_duplicates,
        }
    }
}

enum AddOutcome {
    Duplicate(String),
    Inserted { evicted: Vec<(String, String)> },
}

/// History kept in a single SQLite file.
pub struct EmbeddedHistoryStore {
    executor: RetryingExecutor,
    mapper: HistoryRowMapper,
    options: StoreOptions,
    clock: Arc<dyn ClockPort>,
    events: HistoryEvents,
}

impl EmbeddedHistoryStore {
    /// Opens (creating if needed) the database at `path` and runs pending
    /// migrations.
    pub async fn open(
        path: &Path,
        options: StoreOptions,
        clock: Arc<dyn ClockPort>,
        events: HistoryEvents,
    ) -> StoreResult<Self> {
        Self::open_with_policy(path, options, RetryPolicy::default(), clock, events).await
    }

    pub async fn open_with_policy(
        path: &Path,
        options: StoreOptions,
        policy: RetryPolicy,
        clock: Arc<dyn ClockPort>,
        events: HistoryEvents,
    ) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let url = database_url(path);
        let mut conn = establish(&url).map_err(|e| HistoryStoreError::Database(e.to_string()))?;
        run_migrations(&mut conn)?;
        info!(path = %path.display(), "Opened embedded history store");

        Ok(Self {
            executor: RetryingExecutor::new(url, conn, policy),
            mapper: HistoryRowMapper,
            options,
            clock,
            events,
        })
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    fn to_domain_all(&self, rows: &[HistoryRow]) -> StoreResult<Vec<ClipboardEntry>> {
        rows.iter()
            .map(|row| {
                self.mapper
                    .to_domain(row)
                    .map_err(|e| HistoryStoreError::Codec(e.to_string()))
            })
            .collect()
    }

    fn publish_removed(&self, removed: Vec<(String, String)>) {
        for (id, data_type) in removed {
            let Some(data_type) = DataType::parse(&data_type) else {
                continue;
            };
            self.events.publish(HistoryEvent::EntryRemoved {
                id: EntryId::from(id),
                data_type,
                source_file: None,
            });
        }
    }
}

fn codec_error(e: anyhow::Error) -> DieselError {
    DieselError::DeserializationError(e.into())
}

/// Deletes the oldest non-pinned rows until at most `max` rows remain.
fn evict_overflow(
    conn: &mut SqliteConnection,
    max: usize,
) -> Result<Vec<(String, String)>, DieselError> {
    let total: i64 = clipboard_history::table.count().get_result(conn)?;
    let excess = total - max as i64;
    if excess <= 0 {
        return Ok(Vec::new());
    }

    let victims: Vec<(String, String)> = clipboard_history::table
        .filter(clipboard_history::timestamp_ms.lt(PINNED_TIMESTAMP_MS))
        .order((
            clipboard_history::timestamp_ms.asc(),
            clipboard_history::id.asc(),
        ))
        .limit(excess)
        .select((clipboard_history::id, clipboard_history::data_type))
        .load(conn)?;

    let ids: Vec<&str> = victims.iter().map(|(id, _)| id.as_str()).collect();
    diesel::delete(clipboard_history::table.filter(clipboard_history::id.eq_any(ids)))
        .execute(conn)?;

    Ok(victims)
}

#[async_trait::async_trait]
impl HistoryStorePort for EmbeddedHistoryStore {
    async fn add(&self, entry: ClipboardEntry) -> StoreResult<bool> {
        let row = self
            .mapper
            .to_row(&entry)
            .map_err(|e| HistoryStoreError::Codec(e.to_string()))?;
        let options = self.options;

        let outcome = self
            .executor
            .execute_with_retry(|conn| {
                conn.immediate_transaction(|conn| {
                    if options.ignore_duplicates {
                        let same_type: Vec<HistoryRow> = clipboard_history::table
                            .filter(clipboard_history::data_type.eq(row.data_type.as_str()))
                            .select(HistoryRow::as_select())
                            .load(conn)?;
                        for existing in &same_type {
                            let existing = self.mapper.to_domain(existing).map_err(codec_error)?;
                            if content_equals(&existing.content, &entry.content) {
                                return Ok(AddOutcome::Duplicate(existing.id.into_inner()));
                            }
                        }
                    }

                    diesel::insert_into(clipboard_history::table)
                        .values(&row)
                        .execute(conn)?;

                    let evicted = evict_overflow(conn, options.max_history_size)?;
                    Ok::<_, DieselError>(AddOutcome::Inserted { evicted })
                })
            })
            .await?;

        match outcome {
            AddOutcome::Duplicate(existing_id) => {
                debug!(existing_id = %existing_id, "Skipped entry already in history");
                Ok(false)
            }
            AddOutcome::Inserted { evicted } => {
                if !evicted.is_empty() {
                    debug!(count = evicted.len(), "Evicted oldest entries");
                }
                self.events.publish(HistoryEvent::EntryAdded(entry));
                self.publish_removed(evicted);
                Ok(true)
            }
        }
    }

    async fn get_recent(&self, limit: usize) -> StoreResult<Vec<ClipboardEntry>> {
        let unique = self.options.ignore_duplicates;
        let rows = self
            .executor
            .execute_with_retry(|conn| {
                let query = clipboard_history::table
                    .order((
                        clipboard_history::timestamp_ms.desc(),
                        clipboard_history::id.desc(),
                    ))
                    .select(HistoryRow::as_select());
                if unique {
                    query.load::<HistoryRow>(conn)
                } else {
                    query.limit(limit as i64).load::<HistoryRow>(conn)
                }
            })
            .await?;

        let entries = self.to_domain_all(&rows)?;
        if unique {
            Ok(unique_newest(entries, limit))
        } else {
            Ok(entries)
        }
    }

    async fn get(&self, id: &EntryId) -> StoreResult<Option<ClipboardEntry>> {
        let id = id.as_str();
        let row = self
            .executor
            .execute_with_retry(|conn| {
                clipboard_history::table
                    .filter(clipboard_history::id.eq(id))
                    .select(HistoryRow::as_select())
                    .first(conn)
                    .optional()
            })
            .await?;

        row.map(|row| {
            self.mapper
                .to_domain(&row)
                .map_err(|e| HistoryStoreError::Codec(e.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, id: &EntryId) -> StoreResult<bool> {
        let key = id.as_str();
        let removed = self
            .executor
            .execute_with_retry(|conn| {
                conn.immediate_transaction(|conn| {
                    let data_type: Option<String> = clipboard_history::table
                        .filter(clipboard_history::id.eq(key))
                        .select(clipboard_history::data_type)
                        .first(conn)
                        .optional()?;
                    if data_type.is_some() {
                        diesel::delete(clipboard_history::table.filter(clipboard_history::id.eq(key)))
                            .execute(conn)?;
                    }
                    Ok::<_, DieselError>(data_type)
                })
            })
            .await?;

        match removed {
            Some(data_type) => {
                debug!(entry_id = %id, "Deleted entry");
                self.publish_removed(vec![(id.to_string(), data_type)]);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_pinned(&self, id: &EntryId, pinned: bool) -> StoreResult<Option<ClipboardEntry>> {
        let key = id.as_str();
        let timestamp_ms = if pinned {
            PINNED_TIMESTAMP_MS
        } else {
            self.clock.now_ms()
        };

        let row = self
            .executor
            .execute_with_retry(|conn| {
                conn.immediate_transaction(|conn| {
                    let updated = diesel::update(
                        clipboard_history::table.filter(clipboard_history::id.eq(key)),
                    )
                    .set(clipboard_history::timestamp_ms.eq(timestamp_ms))
                    .execute(conn)?;
                    if updated == 0 {
                        return Ok(None);
                    }
                    clipboard_history::table
                        .filter(clipboard_history::id.eq(key))
                        .select(HistoryRow::as_select())
                        .first(conn)
                        .optional()
                })
            })
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let entry = self
            .mapper
            .to_domain(&row)
            .map_err(|e| HistoryStoreError::Codec(e.to_string()))?;

        debug!(entry_id = %id, pinned, "Changed pin state");
        self.events.publish(HistoryEvent::PinChanged {
            id: id.clone(),
            pinned,
        });
        Ok(Some(entry))
    }

    async fn cleanup_duplicates(&self) -> StoreResult<usize> {
        let removed = self
            .executor
            .execute_with_retry(|conn| {
                conn.immediate_transaction(|conn| {
                    let rows: Vec<HistoryRow> = clipboard_history::table
                        .select(HistoryRow::as_select())
                        .load(conn)?;
                    let entries = rows
                        .iter()
                        .map(|row| self.mapper.to_domain(row).map_err(codec_error))
                        .collect::<Result<Vec<_>, _>>()?;

                    let doomed = plan_cleanup(&entries);
                    if doomed.is_empty() {
                        return Ok(Vec::new());
                    }

                    let types: HashMap<&str, &str> = rows
                        .iter()
                        .map(|row| (row.id.as_str(), row.data_type.as_str()))
                        .collect();
                    let removed: Vec<(String, String)> = doomed
                        .iter()
                        .filter_map(|id| {
                            types
                                .get(id.as_str())
                                .map(|data_type| (id.to_string(), data_type.to_string()))
                        })
                        .collect();

                    let ids: Vec<&str> = doomed.iter().map(|id| id.as_str()).collect();
                    diesel::delete(clipboard_history::table.filter(clipboard_history::id.eq_any(ids)))
                        .execute(conn)?;
                    Ok::<_, DieselError>(removed)
                })
            })
            .await?;

        let count = removed.len();
        if count > 0 {
            info!(count, "Removed duplicate entries");
        }
        self.publish_removed(removed);
        self.events.publish(HistoryEvent::DuplicatesCleaned(count));
        Ok(count)
    }

    async fn count(&self) -> StoreResult<usize> {
        let total: i64 = self
            .executor
            .execute_with_retry(|conn| clipboard_history::table.count().get_result(conn))
            .await?;
        Ok(total.max(0) as usize)
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.executor.close().await;
        info!("Embedded history store closed");
        Ok(())
    }
}
