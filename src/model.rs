//! The two shapes keystrokes take: transient in-memory events and the
//! persistent per-day rows they aggregate into.

use chrono::Local;

/// Bounded symbolic names are truncated to this many characters.
pub const KEY_NAME_MAX: usize = 32;

/// Substituted for any scan code the kernel vocabulary has no name for.
pub const UNKNOWN_KEY_NAME: &str = "UNKNOWN";

/// A single keyboard press, canonicalized and ready to enter the
/// coalescing buffer. Only PRESSED events ever become one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystrokeEvent {
    pub scan_code: u32,
    pub key_name: String,
    /// `YYYY-MM-DD` in the local time zone at the moment of capture.
    pub local_date: String,
}

impl KeystrokeEvent {
    /// Builds an event from a raw scan code and an optional looked-up name,
    /// stamping `local_date` with the current wall-clock local date.
    ///
    /// A missing or empty name is substituted with [`UNKNOWN_KEY_NAME`];
    /// an overlong name is truncated to [`KEY_NAME_MAX`] characters.
    pub fn new(scan_code: u32, key_name: Option<&str>) -> Self {
        Self::at(scan_code, key_name, Local::now().format("%Y-%m-%d").to_string())
    }

    /// Same as [`Self::new`] but with an explicit date, for deterministic tests.
    pub fn at(scan_code: u32, key_name: Option<&str>, local_date: String) -> Self {
        let name = match key_name {
            Some(n) if !n.is_empty() => n,
            _ => UNKNOWN_KEY_NAME,
        };
        let key_name = if name.len() > KEY_NAME_MAX {
            name.chars().take(KEY_NAME_MAX).collect()
        } else {
            name.to_string()
        };
        debug_assert_eq!(local_date.len(), 10, "local_date must be YYYY-MM-DD");
        Self {
            scan_code,
            key_name,
            local_date,
        }
    }
}

/// A persisted, aggregated row: one per `(scan_code, date)` pair ever
/// observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystrokeRow {
    pub id: i64,
    pub scan_code: u32,
    pub key_name: String,
    pub date: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_becomes_unknown() {
        let event = KeystrokeEvent::at(30, None, "2024-01-01".into());
        assert_eq!(event.key_name, UNKNOWN_KEY_NAME);
    }

    #[test]
    fn empty_name_becomes_unknown() {
        let event = KeystrokeEvent::at(30, Some(""), "2024-01-01".into());
        assert_eq!(event.key_name, UNKNOWN_KEY_NAME);
    }

    #[test]
    fn overlong_name_is_truncated() {
        let long = "KEY_".to_string() + &"A".repeat(64);
        let event = KeystrokeEvent::at(30, Some(&long), "2024-01-01".into());
        assert_eq!(event.key_name.len(), KEY_NAME_MAX);
    }

    #[test]
    fn short_name_is_preserved() {
        let event = KeystrokeEvent::at(30, Some("KEY_A"), "2024-01-01".into());
        assert_eq!(event.key_name, "KEY_A");
    }
}
