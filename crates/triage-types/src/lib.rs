//! Validated primitive types shared across the triage workspace.
//!
//! - [`NonEmptyText`] for names, procedures, slots and other free text that must carry content.
//! - [`LabelList`] for ordered, de-duplicated label collections such as comorbidities.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// An ordered list of unique, non-empty labels.
///
/// Labels keep the order in which they were first supplied. A label that repeats an earlier
/// one (exact match after trimming) is dropped. An empty list is valid and serialises as `[]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelList(Vec<NonEmptyText>);

impl LabelList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a list from raw strings, rejecting blank entries.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if any entry is empty or whitespace only.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, TextError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for label in labels {
            list.push(NonEmptyText::new(label)?);
        }
        Ok(list)
    }

    /// Appends a label unless an identical one is already present.
    ///
    /// Returns `true` if the label was added.
    pub fn push(&mut self, label: NonEmptyText) -> bool {
        if self.0.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &NonEmptyText> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the labels as plain strings.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|l| l.as_str().to_owned()).collect()
    }
}

impl<'a> IntoIterator for &'a LabelList {
    type Item = &'a NonEmptyText;
    type IntoIter = std::slice::Iter<'a, NonEmptyText>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl serde::Serialize for LabelList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for LabelList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        LabelList::from_labels(raw).map_err(serde::de::Error::custom)
    }
}
