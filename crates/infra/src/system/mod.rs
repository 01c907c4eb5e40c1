use chrono::prelude::*;

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current point in time
    fn now(&self) -> DateTime<Utc>;

    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
