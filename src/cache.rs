use chrono::{DateTime, Utc};

use crate::config::DeviceConfig;

/// Last configuration accepted from the registry and when it was accepted.
///
/// Both fields are always set together, so the cache is either empty or
/// holds a complete snapshot.
#[derive(Debug, Default)]
pub struct ConfigCache {
    entry: Option<(DeviceConfig, DateTime<Utc>)>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&DeviceConfig> {
        self.entry.as_ref().map(|(config, _)| config)
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|(_, received_at)| *received_at)
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    pub fn should_refresh(&self, now: DateTime<Utc>) -> bool {
        let Some((config, received_at)) = &self.entry else {
            return true;
        };

        // A clock that moved backwards yields a negative age, which counts as fresh.
        match (now - *received_at).to_std() {
            Ok(age) => age >= config.configuration_refresh,
            Err(_) => false,
        }
    }

    /// Stores `candidate` unless it equals the cached configuration.
    ///
    /// Returns `true` when the cache changed.
    pub fn apply(&mut self, candidate: DeviceConfig, now: DateTime<Utc>) -> bool {
        if let Some((current, _)) = &self.entry
            && *current == candidate
        {
            return false;
        }

        self.entry = Some((candidate, now));
        true
    }
}
