use chrono::{DateTime, Utc};

/// Injectable time source. Handlers and the evaluation pipeline take `now`
/// from here instead of calling `Utc::now()` directly, so scheduling and
/// statistics are deterministic under test.
///
/// Carried in `AppState` as `Arc<dyn Clock>`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time. The only implementation used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
