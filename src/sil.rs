//! SIL classification against IEC 61508 bands
//!
//! Maps a summed PFDavg or PFH to a Safety Integrity Level and compares it
//! to the required level of the safety function. Values outside every band
//! (including anything better than the SIL 4 band) classify as "n.a.".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classified Safety Integrity Level, including the out-of-band case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SilClass {
    Sil1,
    Sil2,
    Sil3,
    Sil4,
    /// Outside every SIL band
    NotApplicable,
}

impl SilClass {
    /// Numeric rank 1-4; 0 for the out-of-band case
    pub fn rank(&self) -> u8 {
        match self {
            SilClass::Sil1 => 1,
            SilClass::Sil2 => 2,
            SilClass::Sil3 => 3,
            SilClass::Sil4 => 4,
            SilClass::NotApplicable => 0,
        }
    }

    /// SilClass from a rank; anything outside 1-4 is `NotApplicable`
    pub fn from_rank(rank: u8) -> Self {
        match rank {
            1 => SilClass::Sil1,
            2 => SilClass::Sil2,
            3 => SilClass::Sil3,
            4 => SilClass::Sil4,
            _ => SilClass::NotApplicable,
        }
    }
}

impl fmt::Display for SilClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SilClass::NotApplicable => f.write_str("n.a."),
            other => write!(f, "SIL {}", other.rank()),
        }
    }
}

/// Classify a summed PFH (1/h) into IEC 61508 high-demand bands
pub fn classify_sil_from_pfh(pfh_sum: f64) -> SilClass {
    if (1e-9..1e-8).contains(&pfh_sum) {
        SilClass::Sil4
    } else if (1e-8..1e-7).contains(&pfh_sum) {
        SilClass::Sil3
    } else if (1e-7..1e-6).contains(&pfh_sum) {
        SilClass::Sil2
    } else if (1e-6..1e-5).contains(&pfh_sum) {
        SilClass::Sil1
    } else {
        SilClass::NotApplicable
    }
}

/// Classify a summed PFDavg into IEC 61508 low-demand bands
pub fn classify_sil_from_pfd(pfd_sum: f64) -> SilClass {
    if (1e-5..1e-4).contains(&pfd_sum) {
        SilClass::Sil4
    } else if (1e-4..1e-3).contains(&pfd_sum) {
        SilClass::Sil3
    } else if (1e-3..1e-2).contains(&pfd_sum) {
        SilClass::Sil2
    } else if (1e-2..1e-1).contains(&pfd_sum) {
        SilClass::Sil1
    } else {
        SilClass::NotApplicable
    }
}

/// Extract the SIL rank 1-4 from a label such as "SIL 3"
///
/// The digit must stand alone (word-bounded); anything else yields 0.
pub fn sil_rank(text: &str) -> u8 {
    let chars: Vec<char> = text.trim().chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if ('1'..='4').contains(c) {
            let before_ok = i == 0 || !chars[i - 1].is_alphanumeric();
            let after_ok = i + 1 == chars.len() || !chars[i + 1].is_alphanumeric();
            if before_ok && after_ok {
                return *c as u8 - b'0';
            }
        }
    }
    0
}

/// A required-SIL value as supplied by callers: numeric or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequiredSil {
    Rank(f64),
    Label(String),
}

impl From<f64> for RequiredSil {
    fn from(value: f64) -> Self {
        RequiredSil::Rank(value)
    }
}

impl From<u8> for RequiredSil {
    fn from(value: u8) -> Self {
        RequiredSil::Rank(value as f64)
    }
}

impl From<&str> for RequiredSil {
    fn from(value: &str) -> Self {
        RequiredSil::Label(value.to_string())
    }
}

impl From<String> for RequiredSil {
    fn from(value: String) -> Self {
        RequiredSil::Label(value)
    }
}

/// Normalize a required-SIL value to a classified level
///
/// Numbers are truncated to an integer rank; strings are scanned with
/// [`sil_rank`]. Anything outside 1-4 normalizes to `NotApplicable`.
pub fn normalize_required_sil(value: impl Into<RequiredSil>) -> SilClass {
    match value.into() {
        RequiredSil::Rank(number) => {
            let rank = number as i64;
            if (1..=4).contains(&rank) {
                SilClass::from_rank(rank as u8)
            } else {
                SilClass::NotApplicable
            }
        }
        RequiredSil::Label(text) => SilClass::from_rank(sil_rank(&text)),
    }
}

/// Requirement rule: the calculated level must reach the required rank and
/// must itself be inside a SIL band
pub fn requirement_met(calculated: SilClass, required: SilClass) -> bool {
    calculated.rank() >= required.rank() && calculated.rank() > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pfh_band_edges() {
        assert_eq!(classify_sil_from_pfh(1e-9), SilClass::Sil4);
        assert_eq!(classify_sil_from_pfh(9.999e-9), SilClass::Sil4);
        assert_eq!(classify_sil_from_pfh(1e-8), SilClass::Sil3);
        assert_eq!(classify_sil_from_pfh(1e-7), SilClass::Sil2);
        assert_eq!(classify_sil_from_pfh(1e-6), SilClass::Sil1);
        assert_eq!(classify_sil_from_pfh(9.999e-6), SilClass::Sil1);
        assert_eq!(classify_sil_from_pfh(1e-5), SilClass::NotApplicable);
        assert_eq!(classify_sil_from_pfh(5e-10), SilClass::NotApplicable);
        assert_eq!(classify_sil_from_pfh(0.0), SilClass::NotApplicable);
    }

    #[test]
    fn test_pfd_band_edges() {
        assert_eq!(classify_sil_from_pfd(1e-5), SilClass::Sil4);
        assert_eq!(classify_sil_from_pfd(1e-4), SilClass::Sil3);
        assert_eq!(classify_sil_from_pfd(1e-3), SilClass::Sil2);
        assert_eq!(classify_sil_from_pfd(1e-2), SilClass::Sil1);
        assert_eq!(classify_sil_from_pfd(9.99e-2), SilClass::Sil1);
        assert_eq!(classify_sil_from_pfd(1e-1), SilClass::NotApplicable);
        assert_eq!(classify_sil_from_pfd(1e-6), SilClass::NotApplicable);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(SilClass::Sil3.to_string(), "SIL 3");
        assert_eq!(SilClass::NotApplicable.to_string(), "n.a.");
    }

    #[test]
    fn test_sil_rank_parsing() {
        assert_eq!(sil_rank("SIL 3"), 3);
        assert_eq!(sil_rank("sil 1"), 1);
        assert_eq!(sil_rank("  SIL 4 ✓"), 4);
        assert_eq!(sil_rank("garbage"), 0);
        assert_eq!(sil_rank("SIL 5"), 0);
        assert_eq!(sil_rank("SIL3X"), 0); // digit not word-bounded
        assert_eq!(sil_rank(""), 0);
    }

    #[test]
    fn test_normalize_required_sil() {
        assert_eq!(normalize_required_sil(3u8), SilClass::Sil3);
        assert_eq!(normalize_required_sil(2.0), SilClass::Sil2);
        assert_eq!(normalize_required_sil("SIL 4"), SilClass::Sil4);
        assert_eq!(normalize_required_sil("n.a."), SilClass::NotApplicable);
        assert_eq!(normalize_required_sil(0.0), SilClass::NotApplicable);
        assert_eq!(normalize_required_sil(7u8), SilClass::NotApplicable);
    }

    #[test]
    fn test_requirement_rule() {
        assert!(requirement_met(SilClass::Sil3, SilClass::Sil2));
        assert!(requirement_met(SilClass::Sil2, SilClass::Sil2));
        assert!(!requirement_met(SilClass::Sil1, SilClass::Sil2));
        // out-of-band calculation never satisfies a requirement
        assert!(!requirement_met(SilClass::NotApplicable, SilClass::NotApplicable));
        // but any in-band level satisfies an absent requirement
        assert!(requirement_met(SilClass::Sil1, SilClass::NotApplicable));
    }
}
