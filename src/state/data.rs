/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the record store, the sort engine and the UI layer.

use std::cmp::Ordering;
use std::fmt;

use crate::error::ValidationError;

/// Represents a single book in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// Caller-assigned id (duplicates are allowed)
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Kept as entered; no date parsing is done
    pub year: String,
}

impl BookRecord {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            year: year.into(),
        }
    }

    /// Validate raw user input and build a record from it.
    ///
    /// The id is checked first, then the text fields in display order.
    pub fn from_fields(fields: &BookFields) -> Result<Self, ValidationError> {
        let id = fields
            .id
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidId {
                value: fields.id.clone(),
            })?;

        for (field, value) in [
            ("title", &fields.title),
            ("author", &fields.author),
            ("year", &fields.year),
        ] {
            if value.is_empty() {
                return Err(ValidationError::MissingField { field });
            }
        }

        Ok(Self::new(id, &fields.title, &fields.author, &fields.year))
    }

    /// True if the decimal id or the title contains `needle`.
    /// `needle` must already be lowercase.
    fn matches_lowercase(&self, needle: &str) -> bool {
        self.id.to_string().contains(needle) || self.title.to_lowercase().contains(needle)
    }
}

/// Case-insensitive match on id text or title. An empty query matches everything.
pub fn matches_query(record: &BookRecord, query: &str) -> bool {
    record.matches_lowercase(&query.to_lowercase())
}

/// Raw text from the entry widgets, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields {
    pub id: String,
    pub title: String,
    pub author: String,
    pub year: String,
}

/// Field a sort orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Numeric ordering
    Id,
    /// Plain lexicographic ordering on the stored string, case preserved
    Title,
}

impl SortKey {
    pub fn compare(self, a: &BookRecord, b: &BookRecord) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Title => a.title.cmp(&b.title),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Id => write!(f, "ID"),
            SortKey::Title => write!(f, "TITLE"),
        }
    }
}
