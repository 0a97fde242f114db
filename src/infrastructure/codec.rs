use crate::domain::WeightEntry;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Version tag written into every persisted blob so a future format change
/// can be detected instead of silently misread.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    entries: Vec<WeightEntry>,
}

pub fn encode(entries: &[WeightEntry]) -> Result<Vec<u8>> {
    let envelope = Envelope {
        version: FORMAT_VERSION,
        entries: entries.to_vec(),
    };
    serde_json::to_vec(&envelope).context("failed to serialize weight entries")
}

pub fn decode(bytes: &[u8]) -> Result<Vec<WeightEntry>> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).context("failed to deserialize weight entries")?;
    if envelope.version != FORMAT_VERSION {
        bail!("unsupported weight data version {}", envelope.version);
    }
    Ok(envelope.entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn round_trips_entries_with_and_without_notes() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let entries = vec![
            WeightEntry::with_note(70.5, date, "morning"),
            WeightEntry::new(71.0, date.succ_opt().unwrap()),
        ];

        let bytes = encode(&entries).unwrap();
        assert_eq!(decode(&bytes).unwrap(), entries);
    }

    #[test]
    fn blob_carries_the_version_tag() {
        let bytes = encode(&[]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["version"], FORMAT_VERSION);
    }

    #[test]
    fn rejects_unknown_version() {
        let bytes = br#"{"version": 99, "entries": []}"#;
        assert!(decode(bytes).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode(b"not json at all").is_err());
    }
}
