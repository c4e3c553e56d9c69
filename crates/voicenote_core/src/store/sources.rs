//! Identifier and time sources injected into the note store.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of globally unique note identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs in hyphenated lowercase form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Source of creation timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::{IdGenerator, UuidV4Generator};
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn uuid_generator_yields_distinct_parsable_ids() {
        let mut generator = UuidV4Generator;
        let ids = (0..64).map(|_| generator.next_id()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), 64);
        assert!(ids.iter().all(|id| Uuid::parse_str(id).is_ok()));
    }
}
