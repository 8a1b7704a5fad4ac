//! URL slugs for public store menus.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// Shorter than [`Slug::MIN_LENGTH`] or longer than [`Slug::MAX_LENGTH`].
    #[error("slug must be between {min} and {max} characters")]
    BadLength {
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
    /// Contains something other than lowercase ASCII letters, digits and `-`.
    #[error("slug may only contain lowercase letters, digits and '-'")]
    InvalidCharacter,
    /// Starts or ends with `-`, or has `--`.
    #[error("slug cannot start or end with '-' or contain '--'")]
    BadHyphen,
}

/// The public identifier of a store menu (`/menu/{slug}`).
///
/// ```
/// use menuhub_core::Slug;
///
/// assert_eq!(Slug::from_name("Pizzaria São João").unwrap().as_str(), "pizzaria-sao-joao");
/// assert!(Slug::parse("Bad Slug").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Minimum slug length.
    pub const MIN_LENGTH: usize = 2;
    /// Maximum slug length.
    pub const MAX_LENGTH: usize = 64;

    /// Validate an existing slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has the wrong length, contains
    /// characters outside `[a-z0-9-]`, or misuses hyphens.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&s.len()) {
            return Err(SlugError::BadLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(SlugError::InvalidCharacter);
        }
        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::BadHyphen);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a store name.
    ///
    /// Accented Portuguese letters are folded to ASCII and every run of other
    /// characters becomes a single `-`. Long names are cut at
    /// [`Slug::MAX_LENGTH`].
    ///
    /// # Errors
    ///
    /// Returns an error if the name yields fewer than two usable characters.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for ch in name.chars().flat_map(char::to_lowercase) {
            let folded = fold_accent(ch);
            if folded.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(folded);
            } else {
                pending_hyphen = true;
            }
            if out.len() >= Self::MAX_LENGTH {
                break;
            }
        }

        out.truncate(Self::MAX_LENGTH);
        let trimmed = out.trim_end_matches('-');
        Self::parse(trimmed)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

const fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("burger-house").is_ok());
        assert!(Slug::parse("loja-2").is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Slug::parse("Loja"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("-loja"), Err(SlugError::BadHyphen));
        assert_eq!(Slug::parse("lo--ja"), Err(SlugError::BadHyphen));
        assert!(matches!(Slug::parse("a"), Err(SlugError::BadLength { .. })));
    }

    #[test]
    fn test_from_name_folds_and_collapses() {
        assert_eq!(
            Slug::from_name("  Açaí & Café -- Centro! ").unwrap().as_str(),
            "acai-cafe-centro"
        );
    }

    #[test]
    fn test_from_name_truncates() {
        let slug = Slug::from_name(&"ab ".repeat(40)).unwrap();
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_from_name_rejects_symbols_only() {
        assert!(Slug::from_name("!!!").is_err());
    }
}
