use std::time::Duration;

use ck_core::ports::HistoryStoreError;
use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;
use diesel::ConnectionError;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::connection::establish;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Attempt `n` waits `base_delay * n` before retrying.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
        }
    }
}

/// Whether `err` is lock or busy contention on the database file.
pub fn is_contention(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(_, info) => is_contention_message(info.message()),
        _ => false,
    }
}

fn is_contention_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("locked") || message.contains("busy")
}

fn is_contention_connect(err: &ConnectionError) -> bool {
    match err {
        ConnectionError::BadConnection(message) => is_contention_message(message),
        _ => false,
    }
}

/// Runs every database operation through one gate around a single handle.
///
/// Contention errors are retried with linear backoff. Before the last attempt
/// the handle is closed and reopened.
pub struct RetryingExecutor {
    database_url: String,
    policy: RetryPolicy,
    handle: Mutex<Option<SqliteConnection>>,
}

impl RetryingExecutor {
    pub fn new(database_url: String, conn: SqliteConnection, policy: RetryPolicy) -> Self {
        Self {
            database_url,
            policy,
            handle: Mutex::new(Some(conn)),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn execute_with_retry<T, F>(&self, mut operation: F) -> Result<T, HistoryStoreError>
    where
        F: FnMut(&mut SqliteConnection) -> Result<T, DieselError> + Send,
        T: Send,
    {
        let mut handle = self.handle.lock().await;
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            let mut connect_error = None;
            if handle.is_none() {
                match establish(&self.database_url) {
                    Ok(conn) => {
                        debug!(attempt, "Reopened database handle");
                        *handle = Some(conn);
                    }
                    Err(e) => connect_error = Some(AttemptError::Connect(e)),
                }
            }

            let outcome = match (connect_error, handle.as_mut()) {
                (Some(err), _) => Err(err),
                (None, Some(conn)) => operation(conn).map_err(AttemptError::Query),
                (None, None) => Err(AttemptError::Connect(ConnectionError::BadConnection(
                    "database handle unavailable".to_string(),
                ))),
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_contention() {
                return Err(err.into_store_error());
            }

            if attempt >= max_attempts {
                warn!(attempts = attempt, error = %err, "Database still contended, giving up");
                return Err(HistoryStoreError::StorageUnavailable { attempts: attempt });
            }

            let delay = self.policy.base_delay * attempt;
            warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "Database contended, retrying");

            if attempt + 1 == max_attempts {
                // Drop the handle so the final attempt starts from a fresh one.
                handle.take();
            }

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Closes the handle. A later operation reopens it.
    pub async fn close(&self) {
        self.handle.lock().await.take();
    }
}

enum AttemptError {
    Query(DieselError),
    Connect(ConnectionError),
}

impl AttemptError {
    fn is_contention(&self) -> bool {
        match self {
            AttemptError::Query(e) => is_contention(e),
            AttemptError::Connect(e) => is_contention_connect(e),
        }
    }

    fn into_store_error(self) -> HistoryStoreError {
        match self {
            AttemptError::Query(e) => HistoryStoreError::Database(e.to_string()),
            AttemptError::Connect(e) => HistoryStoreError::Database(e.to_string()),
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Query(e) => write!(f, "{e}"),
            AttemptError::Connect(e) => write!(f, "{e}"),
        }
    }
}
