//! Small validated value types shared across the PUW workspace.
//!
//! - [`NonEmptyText`]: trimmed text that is guaranteed to contain something.
//! - [`Language`]: the language a piece of free text coming from the ward or from the
//!   prediction service is written in.
//! - [`LocalisedText`]: opaque text tagged with its [`Language`], compared by text only.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
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

    /// Consumes the wrapper and returns the owned string.
    pub fn into_inner(self) -> String {
        self.0
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

/// Language of a free-text value.
///
/// The ward runs bilingually; the prediction service answers in whichever language it was
/// prompted in. Only Korean and English are distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Korean,
    English,
}

impl Language {
    /// Detects the language of `text`.
    ///
    /// Any Hangul syllable or jamo makes the text Korean; everything else is English.
    pub fn detect(text: &str) -> Self {
        let has_hangul = text.chars().any(|c| {
            matches!(c,
                '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
        });
        if has_hangul {
            Language::Korean
        } else {
            Language::English
        }
    }

    /// BCP 47 tag for this language.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Korean => "ko",
            Language::English => "en",
        }
    }
}

/// Free text tagged with its language.
///
/// The text is never interpreted. Two values are equal exactly when their text is equal; the
/// language tag is derived from the text and carried only for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalisedText {
    text: String,
    language: Language,
}

impl LocalisedText {
    /// Wraps `text`, detecting its language.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let language = Language::detect(&text);
        Self { text, language }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl std::fmt::Display for LocalisedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl serde::Serialize for LocalisedText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> serde::Deserialize<'de> for LocalisedText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(LocalisedText::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_and_rejects_blank() {
        let text = NonEmptyText::new("  Ward 3B  ").expect("should accept padded text");
        assert_eq!(text.as_str(), "Ward 3B");

        let err = NonEmptyText::new("   ").expect_err("whitespace should be rejected");
        assert!(matches!(err, TextError::Empty));
    }

    #[test]
    fn test_non_empty_text_deserialize_rejects_empty() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(Language::detect("위험"), Language::Korean);
        assert_eq!(Language::detect("HIGH"), Language::English);
        assert_eq!(Language::detect("risk: 주의"), Language::Korean);
        assert_eq!(Language::detect(""), Language::English);
    }

    #[test]
    fn test_localised_text_equality_is_textual() {
        assert_eq!(LocalisedText::new("HIGH"), LocalisedText::new("HIGH"));
        assert_ne!(LocalisedText::new("HIGH"), LocalisedText::new("High"));
        assert_eq!(LocalisedText::new("중등도").language(), Language::Korean);
    }

    #[test]
    fn test_localised_text_serialises_as_plain_string() {
        let json = serde_json::to_string(&LocalisedText::new("LOW")).unwrap();
        assert_eq!(json, "\"LOW\"");
        let back: LocalisedText = serde_json::from_str("\"낮음\"").unwrap();
        assert_eq!(back.language(), Language::Korean);
    }
}
