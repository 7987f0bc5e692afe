use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ck_core::clipboard::from_millis;
use ck_core::ports::ClockPort;

use super::SystemClock;

/// Millisecond clock whose readings strictly increase within the process.
///
/// Two captures in the same millisecond get consecutive timestamps, so
/// timestamp order always equals capture order.
pub struct MonotonicClock {
    inner: Arc<dyn ClockPort>,
    last_ms: AtomicI64,
}

impl MonotonicClock {
    pub fn new(inner: Arc<dyn ClockPort>) -> Self {
        Self {
            inner,
            last_ms: AtomicI64::new(i64::MIN),
        }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl ClockPort for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = self.inner.now_ms();
        let mut last = self.last_ms.load(Ordering::Relaxed);
        loop {
            let next = if wall > last { wall } else { last + 1 };
            match self
                .last_ms
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return from_millis(next),
                Err(current) => last = current,
            }
        }
    }
}
