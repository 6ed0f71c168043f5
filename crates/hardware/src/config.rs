//! Configuration for the LoongArch semantics core.
//!
//! This module defines the configuration tree used to parameterize a `Cpu`. It provides:
//! 1. **Defaults:** Baseline hardware constants (TLB geometry, counter frequency, CPUCFG words).
//! 2. **Structures:** Config sections for the TLB, the vector units, CPUCFG and the timer.
//! 3. **Loading:** JSON parsing with per-field defaults, followed by validation.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built with `Config::default()`.

use serde::Deserialize;
use thiserror::Error;

use crate::common::constants::CPUCFG_WORDS;

/// Default configuration constants.
mod defaults {
    /// TLB entry count.
    pub const TLB_ENTRIES: usize = 64;

    /// Largest accepted TLB (the `PRCFG3.MTLB_ENTRY` field is 8 bits wide).
    pub const MAX_TLB_ENTRIES: usize = 256;

    /// Seed for TLB victim selection.
    pub const TLB_SEED: u64 = 0x2545_f491_4f6c_dd1d;

    /// Stable counter frequency in Hz (reported through CPUCFG word 4).
    pub const COUNTER_FREQ: u32 = 100_000_000;

    /// CPUCFG word 0: processor identification.
    pub const PRID: u32 = 0x0014_c010;

    /// CPUCFG word 1: LA64, paged MMU, IOCSR, PALEN/VALEN 48, UAL, RI, EP, RPLV, HP, CRC.
    pub const CFG1: u32 = 2 | 1 << 2 | 1 << 3 | 47 << 4 | 47 << 12 | 0x3f << 20;

    /// CPUCFG word 2: FP (SP, DP, version 1), LSX, LASX, LLFTP version 1, LSPW, LAM.
    pub const CFG2: u32 = 0x7 | 1 << 3 | 1 << 6 | 1 << 7 | 1 << 14 | 1 << 15 | 1 << 21 | 1 << 22;

    /// CPUCFG word 3: cache and speculation features.
    pub const CFG3: u32 = 0xfcff;

    /// CPUCFG word 5: counter multiplier 1, divider 1.
    pub const CFG5: u32 = 1 | 1 << 16;

    /// CPUCFG word 16: cache hierarchy presence.
    pub const CFG16: u32 = 0x2c3d;

    /// CPUCFG words 17-20: per-level cache geometry (ways - 1, log2 sets, log2 line).
    pub const CACHE_GEOMETRY: [u32; 4] = [0x0608_0003, 0x0608_0003, 0x0608_000f, 0x060e_000f];
}

/// `LSX` bit in CPUCFG word 2.
pub const CPUCFG2_LSX: u32 = 1 << 6;

/// `LASX` bit in CPUCFG word 2.
pub const CPUCFG2_LASX: u32 = 1 << 7;

/// Configuration validation and parsing errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON text could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// TLB capacity is zero or larger than the architecture can describe.
    #[error("tlb.entries must be in 1..={max}, got {entries}")]
    TlbSize {
        /// Configured capacity.
        entries: usize,
        /// Largest accepted capacity.
        max: usize,
    },
    /// More CPUCFG words than the instruction can address.
    #[error("cpucfg.words has {len} entries, at most {max} are allowed")]
    CpucfgTooLong {
        /// Configured length.
        len: usize,
        /// Largest accepted length.
        max: usize,
    },
    /// LASX requires LSX.
    #[error("vector.lasx requires vector.lsx")]
    LasxWithoutLsx,
    /// The stable counter must tick.
    #[error("timer.frequency_hz must be non-zero")]
    ZeroFrequency,
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use lasim_core::config::Config;
///
/// let json = r#"{ "tlb": { "entries": 32 }, "vector": { "lasx": false } }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.tlb.entries, 32);
/// assert!(config.vector.lsx);
/// assert!(!config.vector.lasx);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// TLB geometry and eviction.
    #[serde(default)]
    pub tlb: TlbConfig,
    /// Vector unit availability.
    #[serde(default)]
    pub vector: VectorConfig,
    /// Values returned by `cpucfg`.
    #[serde(default)]
    pub cpucfg: CpucfgConfig,
    /// Stable counter and timer.
    #[serde(default)]
    pub timer: TimerConfig,
}

impl Config {
    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON, or the first validation failure.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tlb.entries == 0 || self.tlb.entries > defaults::MAX_TLB_ENTRIES {
            return Err(ConfigError::TlbSize {
                entries: self.tlb.entries,
                max: defaults::MAX_TLB_ENTRIES,
            });
        }
        if self.cpucfg.words.len() > CPUCFG_WORDS {
            return Err(ConfigError::CpucfgTooLong {
                len: self.cpucfg.words.len(),
                max: CPUCFG_WORDS,
            });
        }
        if self.vector.lasx && !self.vector.lsx {
            return Err(ConfigError::LasxWithoutLsx);
        }
        if self.timer.frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        Ok(())
    }

    /// The CPUCFG table a CPU built from this configuration reports.
    ///
    /// Word 2 reflects the vector settings and word 4 the counter frequency; the table is
    /// padded with zeros to its full length.
    pub fn cpucfg_words(&self) -> [u32; CPUCFG_WORDS] {
        let mut words = [0; CPUCFG_WORDS];
        for (dst, src) in words.iter_mut().zip(&self.cpucfg.words) {
            *dst = *src;
        }
        words[2] &= !(CPUCFG2_LSX | CPUCFG2_LASX);
        if self.vector.lsx {
            words[2] |= CPUCFG2_LSX;
        }
        if self.vector.lasx {
            words[2] |= CPUCFG2_LASX;
        }
        words[4] = self.timer.frequency_hz;
        words
    }
}

/// TLB configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TlbConfig {
    /// Number of fully associative entries.
    #[serde(default = "TlbConfig::default_entries")]
    pub entries: usize,
    /// Seed of the victim selection sequence.
    #[serde(default = "TlbConfig::default_seed")]
    pub seed: u64,
}

impl TlbConfig {
    fn default_entries() -> usize {
        defaults::TLB_ENTRIES
    }

    fn default_seed() -> u64 {
        defaults::TLB_SEED
    }
}

impl Default for TlbConfig {
    fn default() -> Self {
        Self { entries: defaults::TLB_ENTRIES, seed: defaults::TLB_SEED }
    }
}

/// Vector unit availability.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    /// 128-bit LSX.
    #[serde(default = "VectorConfig::enabled")]
    pub lsx: bool,
    /// 256-bit LASX.
    #[serde(default = "VectorConfig::enabled")]
    pub lasx: bool,
}

impl VectorConfig {
    fn enabled() -> bool {
        true
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self { lsx: true, lasx: true }
    }
}

/// CPUCFG table.
#[derive(Debug, Clone, Deserialize)]
pub struct CpucfgConfig {
    /// Words 0 upwards; missing trailing words read as zero.
    #[serde(default = "CpucfgConfig::default_words")]
    pub words: Vec<u32>,
}

impl CpucfgConfig {
    fn default_words() -> Vec<u32> {
        let mut words = vec![0; CPUCFG_WORDS];
        words[0] = defaults::PRID;
        words[1] = defaults::CFG1;
        words[2] = defaults::CFG2;
        words[3] = defaults::CFG3;
        words[4] = defaults::COUNTER_FREQ;
        words[5] = defaults::CFG5;
        words[16] = defaults::CFG16;
        words[17..21].copy_from_slice(&defaults::CACHE_GEOMETRY);
        words
    }
}

impl Default for CpucfgConfig {
    fn default() -> Self {
        Self { words: Self::default_words() }
    }
}

/// Stable counter and timer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    /// Counter frequency in Hz.
    #[serde(default = "TimerConfig::default_frequency")]
    pub frequency_hz: u32,
    /// Counter value at reset.
    #[serde(default)]
    pub initial_counter: u64,
}

impl TimerConfig {
    fn default_frequency() -> u32 {
        defaults::COUNTER_FREQ
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self { frequency_hz: defaults::COUNTER_FREQ, initial_counter: 0 }
    }
}
