//! I define the [`Term`] data model: IRIs, blank nodes and literals.

use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use crate::nquads::write_term;

/// The datatype IRI implied by a plain literal.
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// The datatype IRI implied by a language-tagged literal.
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// The reserved datatype IRI prefix carrying a language tag and a base
/// direction, as used by JSON-LD's base-direction feature
/// (`https://www.w3.org/ns/i18n#<lang>_<dir>`).
pub const I18N: &str = "https://www.w3.org/ns/i18n#";

/// An RDF term: an IRI, a blank node, or a literal.
///
/// Equality and hashing are structural; ordering compares the canonical
/// N-Quads serialization byte-lexicographically.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// An IRI, stored verbatim (no `<`/`>` delimiters).
    Iri(Box<str>),
    /// A blank node label, without the leading `_:`.
    Blank(Box<str>),
    /// A literal.
    Literal(Literal),
}

impl Term {
    /// Build an IRI term.
    pub fn iri(iri: impl Into<Box<str>>) -> Self {
        Self::Iri(iri.into())
    }

    /// Build a blank node term from its label (without the leading `_:`).
    pub fn blank(label: impl Into<Box<str>>) -> Self {
        Self::Blank(label.into())
    }

    /// Whether this term is a blank node.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    /// The blank node label, if this term is a blank node.
    pub fn bnode_label(&self) -> Option<&str> {
        match self {
            Self::Blank(label) => Some(label),
            _ => None,
        }
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut buf1 = String::new();
        let mut buf2 = String::new();
        write_term(&mut buf1, self);
        write_term(&mut buf2, other);
        buf1.cmp(&buf2)
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = String::new();
        write_term(&mut buf, self);
        f.write_str(&buf)
    }
}

/// An RDF literal: a lexical form with a datatype IRI,
/// optionally carrying a language tag and a base direction.
///
/// The constructors maintain the following invariants:
/// + a plain literal has datatype [`XSD_STRING`];
/// + a language-tagged literal has datatype [`RDF_LANG_STRING`]
///   and serializes as `"…"@tag`;
/// + a literal with a base direction has an [`I18N`] datatype,
///   which is kept verbatim so it round-trips exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    lexical: Box<str>,
    datatype: Box<str>,
    language: Option<Box<str>>,
    direction: Option<BaseDirection>,
}

impl Literal {
    /// Build a plain (`xsd:string`) literal.
    pub fn simple(lexical: impl Into<Box<str>>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: XSD_STRING.into(),
            language: None,
            direction: None,
        }
    }

    /// Build a datatyped literal.
    ///
    /// If `datatype` is an [`I18N`] IRI with a well-formed `<lang>_<dir>`
    /// suffix, the language tag and base direction are extracted from it;
    /// otherwise the datatype is kept opaque.
    pub fn typed(lexical: impl Into<Box<str>>, datatype: impl Into<Box<str>>) -> Self {
        let datatype = datatype.into();
        let (language, direction) = match parse_i18n(&datatype) {
            Some((lang, dir)) => (lang, Some(dir)),
            None => (None, None),
        };
        Self {
            lexical: lexical.into(),
            datatype,
            language,
            direction,
        }
    }

    /// Build a language-tagged literal.
    pub fn lang_tagged(lexical: impl Into<Box<str>>, tag: impl Into<Box<str>>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: RDF_LANG_STRING.into(),
            language: Some(tag.into()),
            direction: None,
        }
    }

    /// Build a literal with a base direction (and an optional language tag,
    /// where the empty string means "no language").
    pub fn directional(
        lexical: impl Into<Box<str>>,
        tag: &str,
        direction: BaseDirection,
    ) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: format!("{I18N}{tag}_{direction}").into(),
            language: (!tag.is_empty()).then(|| tag.into()),
            direction: Some(direction),
        }
    }

    /// The lexical form.
    pub fn lexical_form(&self) -> &str {
        &self.lexical
    }

    /// The datatype IRI.
    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    /// The language tag, if any.
    pub fn language_tag(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The base direction, if any.
    pub fn base_direction(&self) -> Option<BaseDirection> {
        self.direction
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

/// Split an [`I18N`] datatype IRI into its language tag and base direction.
fn parse_i18n(datatype: &str) -> Option<(Option<Box<str>>, BaseDirection)> {
    let suffix = datatype.strip_prefix(I18N)?;
    let (lang, dir) = suffix.split_once('_')?;
    let dir = dir.parse().ok()?;
    let lang = (!lang.is_empty()).then(|| lang.into());
    Some((lang, dir))
}

/// The base direction of a directional literal.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum BaseDirection {
    /// Left-to-right
    Ltr,
    /// Right-to-left
    Rtl,
}

impl Display for BaseDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        })
    }
}

impl FromStr for BaseDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ltr" => Ok(Self::Ltr),
            "rtl" => Ok(Self::Rtl),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn i18n_datatype_is_split() {
        let lit = Literal::typed("hello", "https://www.w3.org/ns/i18n#en_ltr");
        assert_eq!(lit.language_tag(), Some("en"));
        assert_eq!(lit.base_direction(), Some(BaseDirection::Ltr));
        assert_eq!(lit.datatype(), "https://www.w3.org/ns/i18n#en_ltr");
    }

    #[test]
    fn i18n_datatype_without_language() {
        let lit = Literal::typed("hello", "https://www.w3.org/ns/i18n#_rtl");
        assert_eq!(lit.language_tag(), None);
        assert_eq!(lit.base_direction(), Some(BaseDirection::Rtl));
    }

    #[test_case("https://www.w3.org/ns/i18n#en"; "no direction")]
    #[test_case("https://www.w3.org/ns/i18n#en_nope"; "bad direction")]
    #[test_case("https://example.org/dt"; "unrelated datatype")]
    fn opaque_datatype(dt: &str) {
        let lit = Literal::typed("hello", dt);
        assert_eq!(lit.language_tag(), None);
        assert_eq!(lit.base_direction(), None);
        assert_eq!(lit.datatype(), dt);
    }

    #[test]
    fn directional_builds_i18n_datatype() {
        let lit = Literal::directional("hello", "en", BaseDirection::Ltr);
        assert_eq!(lit.datatype(), "https://www.w3.org/ns/i18n#en_ltr");
        let lit = Literal::directional("hello", "", BaseDirection::Rtl);
        assert_eq!(lit.datatype(), "https://www.w3.org/ns/i18n#_rtl");
        assert_eq!(lit.language_tag(), None);
    }

    #[test]
    fn term_order_follows_serialization() {
        let lit = Term::from(Literal::simple("a"));
        let iri = Term::iri("tag:a");
        let bnode = Term::blank("a");
        // '"' < '<' < '_'
        assert!(lit < iri);
        assert!(iri < bnode);
        // "a!" sorts before "a" because '!' < '"'
        assert!(Term::from(Literal::simple("a!")) < Term::from(Literal::simple("a")));
    }
}
