//! Global named counters, enabled by the `counter` and `counter_time` features.
//!
//! Counters register themselves lazily on first use and are dumped by [report_counters] at the
//! end of a run.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

pub enum Counter {
    Events(CounterU64),
    Time(CounterTime),
}

impl Counter {
    pub fn format(&self) -> String {
        match self {
            Counter::Events(c) => c.value().to_string(),
            Counter::Time(c) => super::timer::format_elapsed(c.value()),
        }
    }
}

#[derive(Default)]
pub struct CounterU64 {
    atomic: AtomicU64,
}

impl CounterU64 {
    pub const fn new() -> Self {
        Self {
            atomic: AtomicU64::new(0),
        }
    }

    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, n: u64) {
        self.atomic.fetch_add(n, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.atomic.load(Ordering::Acquire)
    }
}

/// Accumulated wall time, stored in nanoseconds.
#[derive(Default)]
pub struct CounterTime {
    nanos: AtomicU64,
}

impl CounterTime {
    pub const fn new() -> Self {
        Self {
            nanos: AtomicU64::new(0),
        }
    }

    pub fn add(&self, dur: Duration) {
        self.nanos.fetch_add(dur.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn value(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

lazy_static::lazy_static! {
    pub static ref __COUNTERS: Mutex<BTreeMap<&'static str, Arc<Counter>>> = Mutex::new(BTreeMap::new());
}

pub fn insert_counter(descr: &'static str, counter: Counter) -> Arc<Counter> {
    let mut counters = __COUNTERS.lock().unwrap_or_else(PoisonError::into_inner);
    counters.entry(descr).or_insert_with(|| Arc::new(counter)).clone()
}

pub fn report_counters() {
    let counters = __COUNTERS.lock().unwrap_or_else(PoisonError::into_inner);
    for (name, counter) in counters.iter() {
        log::info!(target: "counter_report", "{}: {}", name, counter.format());
    }
}

#[macro_export]
macro_rules! counter {
    ($descr:literal) => {
        $crate::counter!($descr, 1)
    };
    ($descr:literal, $n:expr) => {
        if cfg!(feature = "counter") {
            use $crate::utils::counter::{insert_counter, lazy_static, Counter, CounterU64};
            lazy_static::lazy_static! {
                static ref COUNTER_REF: std::sync::Arc<Counter> =
                    insert_counter($descr, Counter::Events(CounterU64::new()));
            }

            if let Counter::Events(c) = &**COUNTER_REF {
                c.add($n as u64);
            }
        }
    };
}

pub use counter;
pub use lazy_static;
