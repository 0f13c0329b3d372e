/// Unix-seconds clock abstraction, injected so custody timestamps are
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn unix_now(&self) -> i64;
}
