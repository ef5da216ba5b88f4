//! Record classification.
//!
//! Turns raw directory entries into [`ClassifiedRecord`]s when their
//! description contains one of the configured keywords. Classification
//! never fails: a malformed or incomplete entry is simply not a match.

use serde::{Deserialize, Serialize};

use crate::model::{
    AccountStatus, ClassifiedRecord, RawRecord, DESCRIPTION, SAM_ACCOUNT_NAME,
    USER_ACCOUNT_CONTROL,
};

/// `ACCOUNTDISABLE` flag in the account control bitmask.
pub const ACCOUNT_DISABLED_FLAG: i64 = 0x2;

/// Keywords used when none are configured.
pub const DEFAULT_KEYWORDS: [&str; 3] = ["PW", "PASS", "ADMIN"];

// ============================================================================
// Keywords
// ============================================================================

/// Case-insensitive substring keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    /// Keywords as configured.
    keywords: Vec<String>,
    /// Lowercased copies used for matching.
    folded: Vec<String>,
}

impl KeywordSet {
    /// Creates a keyword set. Keywords are kept as given, surrounding
    /// whitespace included; entries that are empty or all whitespace are
    /// dropped. An empty result falls back to [`DEFAULT_KEYWORDS`].
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.trim().is_empty())
            .collect();

        if keywords.is_empty() {
            keywords = DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect();
        }

        let folded = keywords.iter().map(|k| k.to_lowercase()).collect();
        Self { keywords, folded }
    }

    /// Parses a comma-separated keyword list, trimming each entry.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim))
    }

    /// Whether `text` contains any keyword, ignoring case.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.folded.iter().any(|k| text.contains(k.as_str()))
    }

    /// Keywords in configured order.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

// ============================================================================
// Attribute Names
// ============================================================================

/// Names of the attributes the classifier reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeNames {
    /// Identity attribute (primary key).
    pub identity: String,
    /// Free-text attribute searched for keywords.
    pub description: String,
    /// Bitmask attribute carrying the disabled flag.
    pub status: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            identity: SAM_ACCOUNT_NAME.to_string(),
            description: DESCRIPTION.to_string(),
            status: USER_ACCOUNT_CONTROL.to_string(),
        }
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Classifies raw entries against a keyword set.
#[derive(Debug, Clone, Default)]
pub struct RecordClassifier {
    attributes: AttributeNames,
    keywords: KeywordSet,
}

impl RecordClassifier {
    /// Creates a classifier reading the default attributes.
    #[must_use]
    pub fn new(keywords: KeywordSet) -> Self {
        Self {
            attributes: AttributeNames::default(),
            keywords,
        }
    }

    /// Overrides the attribute names.
    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeNames) -> Self {
        self.attributes = attributes;
        self
    }

    /// Keyword set in use.
    #[must_use]
    pub const fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// Classifies an entry.
    ///
    /// Returns `None` when the identity is missing, the bitmask is missing
    /// or not a number, the description is missing, or no keyword matches.
    #[must_use]
    pub fn classify(&self, raw: &RawRecord) -> Option<ClassifiedRecord> {
        let primary_key = raw
            .first(&self.attributes.identity)
            .filter(|v| !v.is_empty())?;
        let status = account_status(raw.first(&self.attributes.status)?)?;
        let description = raw
            .first(&self.attributes.description)
            .filter(|v| !v.is_empty())?;

        if !self.keywords.matches(description) {
            return None;
        }

        Some(ClassifiedRecord {
            primary_key: primary_key.to_string(),
            description: description.to_string(),
            status,
        })
    }
}

/// Derives the account status from a decimal bitmask value.
#[must_use]
pub fn account_status(bitmask: &str) -> Option<AccountStatus> {
    let flags: i64 = bitmask.trim().parse().ok()?;
    if flags & ACCOUNT_DISABLED_FLAG != 0 {
        Some(AccountStatus::Disabled)
    } else {
        Some(AccountStatus::Enabled)
    }
}
