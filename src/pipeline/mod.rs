pub mod adverse_event; // Narrative → ranked, severity-tagged adverse events
