use std::collections::BTreeMap;
use std::path::Path;

use fxhash::FxHashMap;

use super::error::NoiseTableError;

/// Parse a noise key of the form `board<B>_ch<C>`.
///
/// Both numbers are plain decimal without leading zeros, so `board01_ch0` is not a key.
fn parse_noise_key(key: &str) -> Option<(u32, u32)> {
    let (board, channel) = key.strip_prefix("board")?.split_once("_ch")?;
    Some((parse_id(board)?, parse_id(channel)?))
}

fn parse_id(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0'))
    {
        return None;
    }
    s.parse().ok()
}

/// NoiseTable holds the per-channel baseline (pedestal) subtracted from raw readings.
///
/// The calibration document is a flat map of `board<B>_ch<C>` keys to numbers. JSON documents
/// are accepted as they are valid YAML. Channels without an entry have a baseline of 0.
#[derive(Debug, Clone, Default)]
pub struct NoiseTable {
    baselines: FxHashMap<(u32, u32), f64>,
}

impl NoiseTable {
    /// Load the table from the calibration file.
    /// If the path is None there is no calibration and every baseline is 0
    pub fn new(path: Option<&Path>) -> Result<Self, NoiseTableError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(NoiseTableError::BadFilePath(p.to_path_buf()));
                }
                let document = std::fs::read_to_string(p)?;
                Self::from_document(&document)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse the text of a calibration document
    pub fn from_document(document: &str) -> Result<Self, NoiseTableError> {
        let entries = serde_yaml::from_str::<BTreeMap<String, f64>>(document)?;
        let mut table = Self::default();
        for (key, value) in entries {
            match parse_noise_key(&key) {
                Some(id) => {
                    table.baselines.insert(id, value);
                }
                None => spdlog::warn!("Ignoring noise entry with unrecognized key {key}"),
            }
        }
        Ok(table)
    }

    /// Baseline of a channel, 0 if the channel is not in the table
    pub fn lookup(&self, board: u32, channel: u32) -> f64 {
        self.baselines
            .get(&(board, channel))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_lookup_and_default() {
        let table = NoiseTable::from_document(r#"{"board1_ch0": 50, "board2_ch13": 12.5}"#)
            .expect("valid document");
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(1, 0), 50.0);
        assert_eq!(table.lookup(2, 13), 12.5);
        assert_eq!(table.lookup(1, 1), 0.0);
        assert_eq!(table.lookup(13, 2), 0.0);
    }

    #[test]
    fn test_unrecognized_keys_are_skipped() {
        let table = NoiseTable::from_document(
            r#"{"board01_ch0": 1, "board1_ch": 2, "Board1_ch0": 3, "board1_ch0_x": 4, "board0_ch0": 5}"#,
        )
        .expect("valid document");
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(0, 0), 5.0);
        assert_eq!(table.lookup(1, 0), 0.0);
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            NoiseTable::from_document(r#"{"board1_ch0": "loud"}"#),
            Err(NoiseTableError::ParsingError(_))
        ));
        assert!(matches!(
            NoiseTable::from_document("[1, 2, 3]"),
            Err(NoiseTableError::ParsingError(_))
        ));
        assert!(matches!(
            NoiseTable::from_document(r#"{"board1_ch0": 50"#),
            Err(NoiseTableError::ParsingError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("fers_noises.json");
        let mut file = std::fs::File::create(&path).expect("create noise file");
        file.write_all(br#"{"board3_ch7": 101.0}"#)
            .expect("write noise file");
        drop(file);

        let table = NoiseTable::new(Some(&path)).expect("valid file");
        assert_eq!(table.lookup(3, 7), 101.0);

        assert!(matches!(
            NoiseTable::new(Some(&dir.path().join("missing.json"))),
            Err(NoiseTableError::BadFilePath(_))
        ));
        assert!(NoiseTable::new(None).expect("no calibration").is_empty());
    }
}
