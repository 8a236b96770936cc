// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Legajo document pipeline.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorKind, LegajoError, Result};

/// Zero-based page position inside a document.
pub type PageIndex = usize;

// ---------------------------------------------------------------------------
// Compression quality
// ---------------------------------------------------------------------------

/// Compression policy handed to the external PDF engine.
///
/// Variants are declared in tier order (0, 1, 2): most compression first,
/// best fidelity last. The order is part of the contract with callers that
/// present the tiers as a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityProfile {
    Screen,
    #[default]
    Ebook,
    Printer,
}

impl QualityProfile {
    /// All profiles in tier order.
    pub const ALL: [QualityProfile; 3] = [Self::Screen, Self::Ebook, Self::Printer];

    /// Map a list position to a profile; anything outside 0..=2 is rejected.
    pub fn from_tier(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(LegajoError::InvalidTier(index))
    }

    /// List position of this profile.
    pub fn tier(&self) -> usize {
        match self {
            Self::Screen => 0,
            Self::Ebook => 1,
            Self::Printer => 2,
        }
    }

    /// Ghostscript `PDFSETTINGS` name.
    pub fn engine_name(&self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Ebook => "ebook",
            Self::Printer => "printer",
        }
    }

    /// User-facing description of the trade-off.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Screen => "Extreme compression (lower quality)",
            Self::Ebook => "Recommended compression (good quality)",
            Self::Printer => "Low compression (high quality)",
        }
    }
}

impl std::fmt::Display for QualityProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.engine_name())
    }
}

impl FromStr for QualityProfile {
    type Err = LegajoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "screen" => Ok(Self::Screen),
            "ebook" => Ok(Self::Ebook),
            "printer" => Ok(Self::Printer),
            other => Err(LegajoError::Config(format!(
                "unknown quality profile '{other}' (expected screen, ebook or printer)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Render a byte count as `"<value> <unit>"` with 1024-based units.
///
/// The value is rounded to two decimals. Whole values keep a single decimal
/// (`"1.0 KB"`), everything else uses the shortest exact form (`"1.46 KB"`).
/// Zero is special-cased to `"0 B"`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    // floor(log1024(bytes)) without floating point drift at exact powers.
    let mut exponent = 0usize;
    let mut remaining = bytes;
    while remaining >= 1024 && exponent < SIZE_UNITS.len() - 1 {
        remaining /= 1024;
        exponent += 1;
    }

    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    if rounded.fract() == 0.0 {
        format!("{rounded:.1} {}", SIZE_UNITS[exponent])
    } else {
        format!("{rounded} {}", SIZE_UNITS[exponent])
    }
}

/// A file size in bytes, read from filesystem metadata when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// Size of the file at `path` right now.
    pub fn of_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self(std::fs::metadata(path)?.len()))
    }

    pub fn bytes(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ByteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_size(self.0))
    }
}

/// Before/after sizes of a compression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeReport {
    pub original: ByteSize,
    pub compressed: ByteSize,
}

impl SizeReport {
    /// Read both sizes from disk.
    pub fn measure(original: impl AsRef<Path>, compressed: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            original: ByteSize::of_path(original)?,
            compressed: ByteSize::of_path(compressed)?,
        })
    }

    /// Percentage saved relative to the original; negative when the output
    /// grew.
    pub fn reduction_percent(&self) -> f64 {
        if self.original.0 == 0 {
            return 0.0;
        }
        (1.0 - self.compressed.0 as f64 / self.original.0 as f64) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Unique identifier for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which pipeline an operation ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    ConvertWord,
    RemovePages,
    Compress,
    ImageToPdf,
    SecureDelete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConvertWord => "convert_word",
            Self::RemovePages => "remove_pages",
            Self::Compress => "compress",
            Self::ImageToPdf => "image_to_pdf",
            Self::SecureDelete => "secure_delete",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success flag plus message returned by every pipeline at its boundary.
///
/// Failures carry the error category so callers can log consistently
/// without holding on to the error value itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
    pub output_path: Option<PathBuf>,
    pub error: Option<ErrorKind>,
}

/// Result shape of the compression pipeline.
pub type CompressionResult = OperationOutcome;

impl OperationOutcome {
    pub fn succeeded(message: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            success: true,
            message: message.into(),
            output_path: Some(output_path.into()),
            error: None,
        }
    }

    pub fn failed(err: &LegajoError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            output_path: None,
            error: Some(err.kind()),
        }
    }
}

/// Terminal record of one background operation, fit for the operational
/// log and for machine-readable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationReport {
    pub id: OperationId,
    pub kind: OperationKind,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub success: bool,
    pub message: String,
    pub error: Option<ErrorKind>,
    /// SHA-256 of the input as it was before the operation, when known.
    pub input_sha256: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl OperationReport {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_reference_values() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
    }

    #[test]
    fn format_size_below_one_kilobyte() {
        assert_eq!(format_size(1), "1.0 B");
        assert_eq!(format_size(500), "500.0 B");
        assert_eq!(format_size(1023), "1023.0 B");
    }

    #[test]
    fn format_size_rounds_to_two_decimals() {
        assert_eq!(format_size(1500), "1.46 KB");
        assert_eq!(format_size(1_234_567), "1.18 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn format_size_exact_powers_stay_in_their_unit() {
        for (exp, unit) in SIZE_UNITS.iter().enumerate().take(7) {
            let bytes = 1024u64.pow(exp as u32);
            assert_eq!(format_size(bytes), format!("1.0 {unit}"));
        }
    }

    #[test]
    fn format_size_largest_u64() {
        assert_eq!(format_size(u64::MAX), "16.0 EB");
    }

    #[test]
    fn tier_mapping() {
        assert_eq!(QualityProfile::from_tier(0).unwrap().engine_name(), "screen");
        assert_eq!(QualityProfile::from_tier(1).unwrap().engine_name(), "ebook");
        assert_eq!(QualityProfile::from_tier(2).unwrap().engine_name(), "printer");
        assert!(matches!(
            QualityProfile::from_tier(3),
            Err(LegajoError::InvalidTier(3))
        ));
    }

    #[test]
    fn tier_round_trips() {
        for profile in QualityProfile::ALL {
            assert_eq!(QualityProfile::from_tier(profile.tier()).unwrap(), profile);
        }
    }

    #[test]
    fn quality_parses_engine_names() {
        assert_eq!("Screen".parse::<QualityProfile>().unwrap(), QualityProfile::Screen);
        assert_eq!(" printer ".parse::<QualityProfile>().unwrap(), QualityProfile::Printer);
        assert!("prepress".parse::<QualityProfile>().is_err());
    }

    #[test]
    fn quality_serialises_lowercase() {
        let json = serde_json::to_string(&QualityProfile::Ebook).unwrap();
        assert_eq!(json, "\"ebook\"");
    }

    #[test]
    fn size_report_reduction() {
        let report = SizeReport {
            original: ByteSize(1000),
            compressed: ByteSize(250),
        };
        assert!((report.reduction_percent() - 75.0).abs() < f64::EPSILON);

        let grew = SizeReport {
            original: ByteSize(100),
            compressed: ByteSize(150),
        };
        assert!(grew.reduction_percent() < 0.0);
    }

    #[test]
    fn byte_size_reads_metadata() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &[0u8; 1536]).unwrap();
        let size = ByteSize::of_path(file.path()).unwrap();
        assert_eq!(size.bytes(), 1536);
        assert_eq!(size.to_string(), "1.5 KB");
    }

    #[test]
    fn outcome_from_error_keeps_kind() {
        let err = LegajoError::InvalidTier(9);
        let outcome = OperationOutcome::failed(&err);
        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(ErrorKind::InvalidTier));
        assert!(outcome.output_path.is_none());
        assert!(outcome.message.contains('9'));
    }
}
