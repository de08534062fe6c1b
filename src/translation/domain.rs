/*!
 * Subject domains a translation can be biased toward.
 */

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain selected by the user for a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainTag {
    /// Everyday language, no domain-specific phrasing
    #[serde(alias = "daily")]
    General,
    Medical,
    Technical,
    Legal,
    Business,
    Gaming,
    Travel,
    Study,
    Slang,
    Idiom,
}

impl DomainTag {
    pub const ALL: [DomainTag; 10] = [
        DomainTag::General,
        DomainTag::Medical,
        DomainTag::Technical,
        DomainTag::Legal,
        DomainTag::Business,
        DomainTag::Gaming,
        DomainTag::Travel,
        DomainTag::Study,
        DomainTag::Slang,
        DomainTag::Idiom,
    ];

    /// A specific professional field whose terminology should be used
    pub fn is_professional(&self) -> bool {
        !matches!(self, Self::General | Self::Slang | Self::Idiom)
    }

    /// Label used in menus and in backend instructions
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Medical => "Medical/Healthcare",
            Self::Technical => "Technical/IT",
            Self::Legal => "Legal/Contracts",
            Self::Business => "Business/Work",
            Self::Gaming => "Gaming/Entertainment",
            Self::Travel => "Travel/Tourism",
            Self::Study => "Study/Education",
            Self::Slang => "Slang",
            Self::Idiom => "Idiom",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Medical => "medical",
            Self::Technical => "technical",
            Self::Legal => "legal",
            Self::Business => "business",
            Self::Gaming => "gaming",
            Self::Travel => "travel",
            Self::Study => "study",
            Self::Slang => "slang",
            Self::Idiom => "idiom",
        }
    }
}

impl fmt::Display for DomainTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for DomainTag {
    type Err = anyhow::Error;

    /// Accepts the short key ("medical") or the menu label ("Medical/Healthcare")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        if lowered == "daily" {
            return Ok(Self::General);
        }

        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.key() == lowered || tag.label().to_lowercase() == lowered)
            .ok_or_else(|| anyhow!("Invalid domain: {}", s))
    }
}
