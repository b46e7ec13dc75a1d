use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// The columns that the digest understands. Header text must match the serialized name exactly,
/// e.g. `Amount`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum KnownColumn {
    Date,
    Month,
    Category,
    Type,
    Amount,
}

serde_plain::derive_display_from_serialize!(KnownColumn);
serde_plain::derive_fromstr_from_deserialize!(KnownColumn);

impl KnownColumn {
    pub fn from_header(header: &Header) -> Option<Self> {
        KnownColumn::from_str(header.as_ref()).ok()
    }
}

/// The header row of an uploaded CSV file. Knows where each `KnownColumn` lives, if anywhere.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<Header>,
    known: HashMap<KnownColumn, usize>,
}

impl Mapping {
    /// Create a new `Mapping` from a list of header strings.
    pub fn new<S, I>(headers: I) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers.into_iter().map(|s| s.into().into()).collect();

        let mut seen = HashSet::new();
        if let Some(duplicate) = headers.iter().find(|h| !seen.insert(*h)) {
            return Err(MappingError(format!(
                "Encountered a duplicate header '{duplicate}'"
            )));
        }

        let known = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| KnownColumn::from_header(h).map(|k| (k, idx)))
            .collect();

        Ok(Self { headers, known })
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// The position of `column` in the header row, or `None` if the file does not have it.
    pub fn index_of(&self, column: KnownColumn) -> Option<usize> {
        self.known.get(&column).cloned()
    }

    pub fn has(&self, column: KnownColumn) -> bool {
        self.known.contains_key(&column)
    }
}

impl Serialize for Mapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.headers.len()))?;
        for header in &self.headers {
            seq.serialize_element(header.as_ref())?;
        }
        seq.end()
    }
}

/// Represents a header in the CSV file, for example, `Amount` or `Account #`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(String);

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl<S: Into<String>> From<S> for Header {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_known_columns() {
        let mapping = Mapping::new(["Date", "Notes", "Amount", "Type"]).unwrap();
        assert_eq!(mapping.index_of(KnownColumn::Date), Some(0));
        assert_eq!(mapping.index_of(KnownColumn::Amount), Some(2));
        assert_eq!(mapping.index_of(KnownColumn::Type), Some(3));
        assert_eq!(mapping.index_of(KnownColumn::Category), None);
        assert!(!mapping.has(KnownColumn::Month));
        assert_eq!(mapping.headers()[1].as_ref(), "Notes");
    }

    #[test]
    fn test_known_column_match_is_exact() {
        let mapping = Mapping::new(["amount", "CATEGORY"]).unwrap();
        assert!(!mapping.has(KnownColumn::Amount));
        assert!(!mapping.has(KnownColumn::Category));
    }

    #[test]
    fn test_known_column_display() {
        assert_eq!(KnownColumn::Type.to_string(), "Type");
        assert_eq!(KnownColumn::from_str("Month").unwrap(), KnownColumn::Month);
    }

    #[test]
    fn test_duplicate_header() {
        let err = Mapping::new(["Amount", "Date", "Amount"]).unwrap_err();
        assert!(err.to_string().contains("'Amount'"));
    }

    #[test]
    fn test_empty_mapping() {
        let mapping = Mapping::new(Vec::<String>::new()).unwrap();
        assert!(mapping.is_empty());
        assert_eq!(mapping.len(), 0);
    }

    #[test]
    fn test_mapping_serializes_as_header_list() {
        let mapping = Mapping::new(["Date", "Category", "Account #"]).unwrap();
        let serialized = serde_json::to_string(&mapping).unwrap();
        assert_eq!(serialized, r##"["Date","Category","Account #"]"##);
        assert_eq!(mapping.index_of(KnownColumn::Category), Some(1));
    }
}
