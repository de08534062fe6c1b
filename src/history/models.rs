/*!
 * History entity model.
 */

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::language_utils::LanguageTag;
use crate::translation::DomainTag;

/// Characters kept from input and output in the history panel summary
pub const SUMMARY_MAX_CHARS: usize = 50;

/// A completed translation, as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Row id, `None` until stored
    pub id: Option<i64>,
    pub source_language: LanguageTag,
    pub target_language: LanguageTag,
    pub input_text: String,
    pub output_text: String,
    pub domain: Option<DomainTag>,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Create a record stamped with the current time
    pub fn new(
        source_language: LanguageTag,
        target_language: LanguageTag,
        input_text: impl Into<String>,
        output_text: impl Into<String>,
        domain: Option<DomainTag>,
    ) -> Self {
        Self {
            id: None,
            source_language,
            target_language,
            input_text: input_text.into(),
            output_text: output_text.into(),
            domain,
            created_at: Utc::now(),
        }
    }

    /// Header line: local timestamp, language pair and domain
    pub fn header(&self) -> String {
        let timestamp = self.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
        let mut header = format!("{} | {} → {}", timestamp, self.source_language, self.target_language);
        if let Some(domain) = self.domain {
            header.push_str(&format!(" ({})", domain.label()));
        }
        header
    }

    /// Short two-line view used when listing recent translations
    pub fn summary(&self) -> String {
        format!(
            "{}\n  {} → {}",
            self.header(),
            truncate_chars(&self.input_text, SUMMARY_MAX_CHARS),
            truncate_chars(&self.output_text, SUMMARY_MAX_CHARS)
        )
    }

    /// Full block used by the plain-text export
    pub fn export_block(&self) -> String {
        format!(
            "{}\nInput: {}\nOutput: {}\n",
            self.header(),
            self.input_text,
            self.output_text
        )
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let truncated: String = single_line.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
