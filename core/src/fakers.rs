//! Random test data for fakebank payloads.
//!
//! # Design
//! `Fake` is an ordinary value passed to whatever needs generated defaults;
//! there is no process-wide instance. `Fake::seeded` gives a reproducible
//! sequence, which is how tests pin the values a request will carry. The
//! RNG sits behind a mutex so one generator can be shared by a client used
//! from several threads.

use std::sync::{Mutex, PoisonError};

use chrono::{Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::types::{CreateOperation, Operation, Patch, UpdateOperation};

const CATEGORIES: &[&str] = &[
    "food",
    "taxi",
    "fuel",
    "groceries",
    "restaurants",
    "entertainment",
    "utilities",
    "healthcare",
    "education",
    "travel",
    "salary",
    "transfer",
];

const WORDS: &[&str] = &[
    "payment", "monthly", "card", "store", "online", "subscription", "refund", "coffee",
    "market", "service", "order", "invoice", "weekly", "station", "ticket", "dinner",
    "delivery", "rent", "bonus", "account",
];

pub struct Fake {
    rng: Mutex<StdRng>,
}

impl Fake {
    /// Generator seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Generator that yields the same sequence for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Date within the last 30 days, today included.
    pub fn default_date(&self) -> NaiveDate {
        self.date(Duration::days(-30), Duration::zero())
    }

    /// Uniform date in `[today + start, today + end]`, whole days only.
    pub fn date(&self, start: Duration, end: Duration) -> NaiveDate {
        self.date_between(Local::now().date_naive(), start, end)
    }

    /// Like `date` but relative to an explicit `today`.
    pub fn date_between(&self, today: NaiveDate, start: Duration, end: Duration) -> NaiveDate {
        let (lo, hi) = ordered(start.num_days(), end.num_days());
        let offset = if lo == hi {
            lo
        } else {
            self.with_rng(|rng| rng.random_range(lo..=hi))
        };
        today + Duration::days(offset)
    }

    /// Amount in `[-100, 100]`.
    pub fn default_money(&self) -> f64 {
        self.money(-100.0, 100.0)
    }

    /// Amount in `[min, max]`, rounded to cents and kept inside the bounds.
    ///
    /// Always finite: infinite bounds are narrowed to the finite `f64`
    /// range, a NaN bound is replaced by the other one, and two NaN bounds
    /// give `0.0`.
    pub fn money(&self, min: f64, max: f64) -> f64 {
        let (lo, hi) = match (min.is_nan(), max.is_nan()) {
            (true, true) => return 0.0,
            (true, false) => (max, max),
            (false, true) => (min, min),
            (false, false) => ordered(min, max),
        };
        let (lo, hi) = (lo.clamp(f64::MIN, f64::MAX), hi.clamp(f64::MIN, f64::MAX));
        if lo == hi {
            return lo;
        }
        let t: f64 = self.with_rng(|rng| rng.random());
        // Interpolating never computes `hi - lo`, which overflows for wide bounds.
        let raw = lo * (1.0 - t) + hi * t;
        let rounded = if raw.abs() < CENTS_LIMIT {
            (raw * 100.0).round() / 100.0
        } else {
            raw
        };
        rounded.clamp(lo, hi)
    }

    pub fn category(&self) -> String {
        self.with_rng(|rng| CATEGORIES.choose(rng).copied().unwrap_or("other"))
            .to_string()
    }

    /// Short capitalized sentence ending with a period.
    pub fn sentence(&self) -> String {
        let words: Vec<&str> = self.with_rng(|rng| {
            let count = rng.random_range(3..=7);
            (0..count)
                .filter_map(|_| WORDS.choose(rng).copied())
                .collect()
        });
        let mut sentence = words.join(" ");
        if let Some(first) = sentence.get(..1).map(str::to_uppercase) {
            sentence.replace_range(..1, &first);
        }
        sentence.push('.');
        sentence
    }

    /// Create form with every field generated.
    pub fn create_operation(&self) -> CreateOperation {
        CreateOperation {
            debit: Some(self.default_money()),
            credit: Some(self.default_money()),
            category: self.category(),
            description: self.sentence(),
            transaction_date: self.default_date(),
        }
    }

    /// Update form with every field explicitly set.
    pub fn update_operation(&self) -> UpdateOperation {
        UpdateOperation {
            debit: Patch::Value(self.default_money()),
            credit: Patch::Value(self.default_money()),
            category: Patch::Value(self.category()),
            description: Patch::Value(self.sentence()),
            transaction_date: Patch::Value(self.default_date()),
        }
    }

    /// Full form with generated fields and a caller-chosen id. Meant for
    /// fixtures; real ids only come back from the server.
    pub fn operation(&self, id: i64) -> Operation {
        Operation {
            id,
            fields: self.create_operation(),
        }
    }
}

impl Default for Fake {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Fake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fake").finish_non_exhaustive()
    }
}

/// Above this magnitude an `f64` has no cent resolution left to round to.
const CENTS_LIMIT: f64 = 1.0e15;

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
