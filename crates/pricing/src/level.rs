use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stackassign_core::DomainError;

/// Academic level tier used for base pricing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcademicLevel {
    HighSchool,
    Bachelor,
    Master,
    Phd,
}

/// Level an unrecognized tier string prices at.
///
/// Compatibility behavior inherited from the original rate table: unknown
/// levels silently priced at the high-school rate. Kept, but the fallback
/// path logs a warning (see [`AcademicLevel::parse_lossy`]).
pub const FALLBACK_LEVEL: AcademicLevel = AcademicLevel::HighSchool;

impl AcademicLevel {
    /// Base rate per page in INR for this level.
    pub fn base_rate(&self) -> i64 {
        match self {
            AcademicLevel::HighSchool => 250,
            AcademicLevel::Bachelor => 350,
            AcademicLevel::Master => 450,
            AcademicLevel::Phd => 750,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AcademicLevel::HighSchool => "high_school",
            AcademicLevel::Bachelor => "bachelor",
            AcademicLevel::Master => "master",
            AcademicLevel::Phd => "phd",
        }
    }

    /// Parse a tier string, pricing unknown values at [`FALLBACK_LEVEL`].
    ///
    /// The fallback is deliberate compatibility behavior, not an error path,
    /// but it can hide misconfigured callers; a warning makes it visible.
    pub fn parse_lossy(s: &str) -> Self {
        match Self::from_str(s) {
            Ok(level) => level,
            Err(_) => {
                tracing::warn!(level = %s, fallback = %FALLBACK_LEVEL.as_str(),
                    "unknown academic level, pricing at fallback rate");
                FALLBACK_LEVEL
            }
        }
    }

    pub const ALL: [AcademicLevel; 4] = [
        AcademicLevel::HighSchool,
        AcademicLevel::Bachelor,
        AcademicLevel::Master,
        AcademicLevel::Phd,
    ];
}

impl core::fmt::Display for AcademicLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AcademicLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high_school" => Ok(AcademicLevel::HighSchool),
            "bachelor" => Ok(AcademicLevel::Bachelor),
            "master" => Ok(AcademicLevel::Master),
            "phd" => Ok(AcademicLevel::Phd),
            _ => Err(DomainError::invalid_id(format!("unknown academic level: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_rates_match_the_published_table() {
        assert_eq!(AcademicLevel::HighSchool.base_rate(), 250);
        assert_eq!(AcademicLevel::Bachelor.base_rate(), 350);
        assert_eq!(AcademicLevel::Master.base_rate(), 450);
        assert_eq!(AcademicLevel::Phd.base_rate(), 750);
    }

    #[test]
    fn parse_roundtrips_known_levels() {
        for level in AcademicLevel::ALL {
            assert_eq!(level.as_str().parse::<AcademicLevel>().unwrap(), level);
        }
    }

    #[test]
    fn unknown_level_falls_back_to_high_school_rate() {
        let level = AcademicLevel::parse_lossy("postdoc");
        assert_eq!(level, FALLBACK_LEVEL);
        assert_eq!(level.base_rate(), 250);
    }
}
