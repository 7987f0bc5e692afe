mod monotonic_clock;
mod system_clock;

pub use monotonic_clock::MonotonicClock;
pub use system_clock::SystemClock;
