//! Tenant namespace type.
//!
//! A [`Namespace`] is the storage key that partitions supplier records per
//! company. It is derived from the company name typed at signup and derived
//! again from the URL path segment on every submission, so there is exactly
//! one derivation: [`Namespace::derive`]. No other code path may transform a
//! company name into a storage key.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when deriving or parsing a [`Namespace`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// Nothing usable was left after normalization.
    #[error("company name must contain at least one ASCII letter or digit")]
    Empty,
    /// The derived namespace collides with a route segment of the application.
    #[error("\"{0}\" is reserved and cannot be used as a company namespace")]
    Reserved(String),
    /// The input is not a canonical namespace identifier.
    #[error("\"{0}\" is not a canonical namespace identifier")]
    Malformed(String),
}

/// A canonical, storage-safe tenant identifier.
///
/// ## Derivation policy
///
/// 1. ASCII letters are lower-cased; ASCII digits are kept.
/// 2. Runs of whitespace, `-` and `_` become a single `-` separator.
/// 3. Every other character is dropped without splitting words, so
///    `"A.C.M.E."` becomes `acme` and `"Smith & Sons"` becomes `smith-sons`.
/// 4. Leading and trailing separators are never emitted.
/// 5. The result is truncated to [`Namespace::MAX_LENGTH`] bytes, dropping a
///    separator left dangling by the cut.
///
/// The result is rejected when it is empty or equals one of
/// [`Namespace::RESERVED`].
///
/// ## Constraints
///
/// - Length: 1-48 bytes
/// - Characters: `a-z`, `0-9`, `-`
/// - No leading, trailing or doubled `-`
///
/// ## Examples
///
/// ```
/// use supplierdb_core::Namespace;
///
/// let ns = Namespace::derive("Acme Co").unwrap();
/// assert_eq!(ns.as_str(), "acme-co");
///
/// // Case and spacing differences resolve to the same tenant
/// assert_eq!(Namespace::derive("  ACME   co ").unwrap(), ns);
///
/// // Deriving a namespace from its own text is a no-op
/// assert_eq!(Namespace::derive(ns.as_str()).unwrap(), ns);
///
/// assert!(Namespace::derive("!!!").is_err());
/// assert!(Namespace::derive("Account").is_err()); // reserved route
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Maximum length of a namespace in bytes.
    pub const MAX_LENGTH: usize = 48;

    /// Separator emitted for whitespace, `-` and `_` runs.
    pub const SEPARATOR: char = '-';

    /// Namespaces that would shadow application routes (`/{namespace}` is the
    /// public form URL).
    pub const RESERVED: &'static [&'static str] = &[
        "account",
        "admin",
        "api",
        "auth",
        "download",
        "export",
        "health",
        "login",
        "logout",
        "signup",
        "static",
        "submit",
        "suppliers",
    ];

    /// Derive the namespace for a raw company name.
    ///
    /// This is the only supported way to turn user-supplied text into a
    /// namespace. It is pure and total over accepted names.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceError::Empty` if no ASCII letter or digit survives
    /// normalization, or `NamespaceError::Reserved` if the result is a
    /// reserved route segment.
    pub fn derive(raw: &str) -> Result<Self, NamespaceError> {
        let mut out = String::with_capacity(raw.len().min(Self::MAX_LENGTH + 1));
        let mut pending_separator = false;

        for ch in raw.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_separator && !out.is_empty() {
                    out.push(Self::SEPARATOR);
                }
                pending_separator = false;
                out.push(ch.to_ascii_lowercase());
            } else if ch.is_whitespace() || ch == '-' || ch == '_' {
                pending_separator = true;
            }

            if out.len() > Self::MAX_LENGTH {
                break;
            }
        }

        // Only ASCII was pushed, so any byte index is a char boundary.
        out.truncate(Self::MAX_LENGTH);
        if out.ends_with(Self::SEPARATOR) {
            out.pop();
        }

        if out.is_empty() {
            return Err(NamespaceError::Empty);
        }

        if Self::RESERVED.contains(&out.as_str()) {
            return Err(NamespaceError::Reserved(out));
        }

        Ok(Self(out))
    }

    /// Parse an already-canonical namespace identifier.
    ///
    /// Unlike [`Namespace::derive`], this does not normalize: the input must
    /// be exactly what `derive` would produce for it.
    ///
    /// # Errors
    ///
    /// Returns `NamespaceError::Malformed` if the input is not canonical, or
    /// the errors of [`Namespace::derive`] for empty and reserved input.
    pub fn parse(s: &str) -> Result<Self, NamespaceError> {
        let derived = Self::derive(s)?;
        if derived.0 != s {
            return Err(NamespaceError::Malformed(s.to_owned()));
        }
        Ok(derived)
    }

    /// Returns the namespace as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Namespace` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Namespace {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Namespace {
    type Error = NamespaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Namespace {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Namespace {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Namespace {
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

    fn derived(raw: &str) -> String {
        Namespace::derive(raw).unwrap().into_inner()
    }

    #[test]
    fn test_derive_lowercases_and_joins_words() {
        assert_eq!(derived("Acme Co"), "acme-co");
        assert_eq!(derived("ACME"), "acme");
        assert_eq!(derived("Widget Works 2024"), "widget-works-2024");
    }

    #[test]
    fn test_derive_case_and_whitespace_insensitive() {
        let expected = Namespace::derive("Acme Co").unwrap();
        for variant in ["acme co", "ACME CO", "  Acme   Co  ", "acme\tco", "Acme\n Co"] {
            assert_eq!(Namespace::derive(variant).unwrap(), expected, "{variant:?}");
        }
    }

    #[test]
    fn test_derive_separators_collapse() {
        assert_eq!(derived("acme--co"), "acme-co");
        assert_eq!(derived("acme_co"), "acme-co");
        assert_eq!(derived("acme - _ co"), "acme-co");
        assert_eq!(derived("-acme co-"), "acme-co");
    }

    #[test]
    fn test_derive_strips_punctuation_without_splitting() {
        assert_eq!(derived("A.C.M.E."), "acme");
        assert_eq!(derived("Smith & Sons"), "smith-sons");
        assert_eq!(derived("O'Reilly Media, Inc."), "oreilly-media-inc");
        assert_eq!(derived("Café Ltd"), "caf-ltd");
    }

    #[test]
    fn test_derive_empty() {
        assert_eq!(Namespace::derive(""), Err(NamespaceError::Empty));
        assert_eq!(Namespace::derive("   "), Err(NamespaceError::Empty));
        assert_eq!(Namespace::derive("!!! ..."), Err(NamespaceError::Empty));
        assert_eq!(Namespace::derive("株式会社"), Err(NamespaceError::Empty));
    }

    #[test]
    fn test_derive_reserved() {
        assert_eq!(
            Namespace::derive("Account"),
            Err(NamespaceError::Reserved("account".to_owned()))
        );
        assert!(matches!(
            Namespace::derive(" static "),
            Err(NamespaceError::Reserved(_))
        ));
        // Reserved words are fine as part of a longer name
        assert_eq!(derived("Static Electric"), "static-electric");
    }

    #[test]
    fn test_derive_truncates() {
        let long = "a".repeat(100);
        assert_eq!(derived(&long).len(), Namespace::MAX_LENGTH);

        // A cut landing right after a separator must not leave it dangling
        let boundary = format!("{} bc", "a".repeat(Namespace::MAX_LENGTH - 1));
        let ns = derived(&boundary);
        assert_eq!(ns.len(), Namespace::MAX_LENGTH - 1);
        assert!(!ns.ends_with('-'));
    }

    #[test]
    fn test_derive_is_idempotent() {
        let inputs = [
            "Acme Co",
            "  Smith & Sons  ",
            "A.C.M.E.",
            "x_y-z w",
            "The Very Long Company Name Of Many Words Limited Partnership",
        ];
        for raw in inputs {
            let once = Namespace::derive(raw).unwrap();
            let twice = Namespace::derive(once.as_str()).unwrap();
            assert_eq!(once, twice, "{raw:?}");
            assert_eq!(Namespace::derive(raw).unwrap(), once, "deterministic");
        }
    }

    #[test]
    fn test_derived_output_is_storage_safe() {
        let ns = derived("  --Weird__Name!!  With  (Stuff) 42--");
        assert_eq!(ns, "weird-name-with-stuff-42");
        assert!(
            ns.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
        assert!(!ns.contains("--"));
    }

    #[test]
    fn test_parse_accepts_canonical_only() {
        assert_eq!(Namespace::parse("acme-co").unwrap().as_str(), "acme-co");
        assert_eq!(
            Namespace::parse("Acme Co"),
            Err(NamespaceError::Malformed("Acme Co".to_owned()))
        );
        assert!(matches!(
            Namespace::parse("acme--co"),
            Err(NamespaceError::Malformed(_))
        ));
        assert_eq!(Namespace::parse(""), Err(NamespaceError::Empty));
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let ns = Namespace::derive("Acme Co").unwrap();
        let json = serde_json::to_string(&ns).unwrap();
        assert_eq!(json, "\"acme-co\"");
        assert_eq!(serde_json::from_str::<Namespace>(&json).unwrap(), ns);
        assert!(serde_json::from_str::<Namespace>("\"Not Canonical\"").is_err());
    }

    #[test]
    fn test_display_and_from_str() {
        let ns: Namespace = "acme-co".parse().unwrap();
        assert_eq!(format!("{ns}"), "acme-co");
        let s: &str = ns.as_ref();
        assert_eq!(s, "acme-co");
    }
}
