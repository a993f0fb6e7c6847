use crate::alias::DateTime;
use std::time::Duration;

pub trait Clock {
    fn now(&self) -> DateTime;
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        chrono::Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
