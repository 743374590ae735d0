//! Positional output schema.
//!
//! The domain keeps an ordered list of fixed-shape records; the numbered
//! field names only exist at serialization time. The first event uses bare
//! names (`Adverse_Event_Terms`), events 2..5 append their position
//! (`Adverse_Event_Terms2`).

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::types::{ResolvedEvent, MAX_EVENTS};

pub const TERM_FIELD: &str = "Adverse_Event_Terms";
pub const SEVERITY_FIELD: &str = "Side_Effect_Severity";
pub const SERIOUSNESS_FIELD: &str = "Side_Effect_Seriousness";

/// Ranked, resolved adverse events ready for the response boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdverseEventReport {
    events: Vec<ResolvedEvent>,
}

impl AdverseEventReport {
    /// Drop empty terms, then keep at most `MAX_EVENTS` in order.
    pub fn new(events: Vec<ResolvedEvent>) -> Self {
        let events = events
            .into_iter()
            .filter(|event| !event.term.trim().is_empty())
            .take(MAX_EVENTS)
            .collect();
        Self { events }
    }

    pub fn events(&self) -> &[ResolvedEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Field name for the event at 1-based `position`.
pub fn positional_field(base: &str, position: usize) -> String {
    if position == 1 {
        base.to_string()
    } else {
        format!("{base}{position}")
    }
}

impl Serialize for AdverseEventReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.events.len() * 3))?;
        for (position, event) in (1..).zip(&self.events) {
            map.serialize_entry(&positional_field(TERM_FIELD, position), event.term.trim())?;
            map.serialize_entry(&positional_field(SEVERITY_FIELD, position), &event.severity)?;
            map.serialize_entry(&positional_field(SERIOUSNESS_FIELD, position), &event.seriousness)?;
        }
        map.end()
    }
}
