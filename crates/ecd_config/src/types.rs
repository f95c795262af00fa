//! Configuration types deserialized from `ecd_sample_prep.toml`.

use ecd_common::ByteSize;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// The run configuration for one sample-file generation or trace.
///
/// Field names match the keys of the configuration file. Relative paths are
/// used as given, i.e. relative to the working directory of the process.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplePrepConfig {
    /// Width of one frame in bytes (one byte per cell).
    pub cells_per_frame: u32,
    /// Size of the contiguous buffer the whole output must fit into.
    pub contig_size: ByteSize,
    /// Number of data frames in each frame group.
    pub data_frames: u32,
    /// Explicit per-frame diagnostic fill values, one diagnostic frame each.
    ///
    /// Accepts either a single integer or a list of integers.
    #[serde(default, deserialize_with = "deserialize_byte_or_vec")]
    pub diagnostic_values: Vec<u8>,
    /// Fill value for every diagnostic frame when the count form is used.
    #[serde(default)]
    pub diagnostic_constant: Option<u8>,
    /// Number of diagnostic frames filled with `diagnostic_constant`.
    #[serde(default)]
    pub diagnostic_frames: u32,
    /// Value of every cell not covered by a distribution record.
    #[serde(default)]
    pub quiescent: u8,
    /// Path to the fragment definition file.
    pub fragment_file: PathBuf,
    /// Path to the distribution definition file.
    pub distribution_file: PathBuf,
    /// Path of the generated sample file (also the file read by a trace).
    pub output_file: PathBuf,
}

impl SamplePrepConfig {
    /// Returns the fill value of each diagnostic frame, in output order.
    ///
    /// The explicit list takes the place of the constant form; validation
    /// guarantees at most one of them is configured.
    pub fn diagnostic_sequence(&self) -> Vec<u8> {
        if !self.diagnostic_values.is_empty() {
            return self.diagnostic_values.clone();
        }
        match self.diagnostic_constant {
            Some(value) => vec![value; self.diagnostic_frames as usize],
            None => Vec::new(),
        }
    }

    /// Number of diagnostic frames at the start of every frame group.
    pub fn diagnostic_frame_count(&self) -> usize {
        if !self.diagnostic_values.is_empty() {
            self.diagnostic_values.len()
        } else if self.diagnostic_constant.is_some() {
            self.diagnostic_frames as usize
        } else {
            0
        }
    }
}

/// Deserializes a field that can be either a single byte or a list of bytes.
///
/// Allows `diagnostic_values = 255` as well as `diagnostic_values = [255, 0]`.
fn deserialize_byte_or_vec<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ByteOrVec;

    impl<'de> Visitor<'de> for ByteOrVec {
        type Value = Vec<u8>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a byte value or a list of byte values")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            u8::try_from(v)
                .map(|b| vec![b])
                .map_err(|_| E::custom(format!("diagnostic value {v} does not fit in a byte")))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u8::try_from(v)
                .map(|b| vec![b])
                .map_err(|_| E::custom(format!("diagnostic value {v} does not fit in a byte")))
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<u8>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(ByteOrVec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    const PATHS: &str = r#"
fragment_file = "fragments.txt"
distribution_file = "distribution.txt"
output_file = "sample.bin"
"#;

    fn config_with(extra: &str) -> SamplePrepConfig {
        let toml = format!(
            "cells_per_frame = 2048\ncontig_size = 1048576\ndata_frames = 4\n{extra}\n{PATHS}"
        );
        load_config_from_str(&toml).unwrap()
    }

    #[test]
    fn diagnostic_values_list() {
        let config = config_with("diagnostic_values = [255, 0, 170]");
        assert_eq!(config.diagnostic_values, vec![255, 0, 170]);
        assert_eq!(config.diagnostic_sequence(), vec![255, 0, 170]);
        assert_eq!(config.diagnostic_frame_count(), 3);
    }

    #[test]
    fn diagnostic_values_single_integer() {
        let config = config_with("diagnostic_values = 255");
        assert_eq!(config.diagnostic_sequence(), vec![255]);
    }

    #[test]
    fn diagnostic_constant_form() {
        let config = config_with("diagnostic_constant = 0xAA\ndiagnostic_frames = 3");
        assert_eq!(config.diagnostic_sequence(), vec![0xAA, 0xAA, 0xAA]);
        assert_eq!(config.diagnostic_frame_count(), 3);
    }

    #[test]
    fn no_diagnostics() {
        let config = config_with("");
        assert!(config.diagnostic_sequence().is_empty());
        assert_eq!(config.diagnostic_frame_count(), 0);
    }

    #[test]
    fn diagnostic_value_out_of_range() {
        let toml = format!(
            "cells_per_frame = 2048\ncontig_size = 1\ndata_frames = 1\ndiagnostic_values = [256]\n{PATHS}"
        );
        assert!(load_config_from_str(&toml).is_err());
    }

    #[test]
    fn quiescent_defaults_to_zero() {
        let config = config_with("");
        assert_eq!(config.quiescent, 0);
    }

    #[test]
    fn contig_size_accepts_unit_string() {
        let toml = format!(
            "cells_per_frame = 2048\ncontig_size = \"4GiB\"\ndata_frames = 1\n{PATHS}"
        );
        let config = load_config_from_str(&toml).unwrap();
        assert_eq!(config.contig_size.bytes(), 4 << 30);
    }

    #[test]
    fn unknown_key_rejected() {
        let config = format!(
            "cells_per_frame = 2048\ncontig_size = 1\ndata_frames = 1\nquiesent = 3\n{PATHS}"
        );
        assert!(load_config_from_str(&config).is_err());
    }
}
