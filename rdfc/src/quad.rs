//! I define [`Quad`], the [`Dataset`] container, and the per-run
//! [`BnodeIndex`] answering "which quads mention blank node B".

use std::collections::BTreeMap;

use thiserror::Error;

use crate::term::Term;

/// An RDF quad: subject, predicate, object, and optional graph name.
///
/// A quad with no graph name belongs to the default graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Quad {
    /// The subject.
    pub s: Term,
    /// The predicate; always an IRI.
    pub p: Term,
    /// The object.
    pub o: Term,
    /// The graph name, if any; an IRI or a blank node.
    pub g: Option<Term>,
}

/// This error is raised when constructing a [`Quad`] from ill-positioned terms.
#[derive(Debug, Error)]
pub enum InvalidQuad {
    /// The predicate was not an IRI
    #[error("predicate must be an IRI")]
    PredicateNotIri,
    /// The graph name was a literal
    #[error("graph name must be an IRI or a blank node")]
    GraphLiteral,
}

impl Quad {
    /// Build a quad, checking positional constraints:
    /// the predicate must be an IRI,
    /// and the graph name (if any) must not be a literal.
    pub fn new(s: Term, p: Term, o: Term, g: Option<Term>) -> Result<Self, InvalidQuad> {
        if !matches!(p, Term::Iri(_)) {
            return Err(InvalidQuad::PredicateNotIri);
        }
        if matches!(g, Some(Term::Literal(_))) {
            return Err(InvalidQuad::GraphLiteral);
        }
        Ok(Self { s, p, o, g })
    }

    /// Iterate over the components of this quad, in s, p, o, g order.
    pub fn components(&self) -> impl Iterator<Item = &Term> {
        [&self.s, &self.p, &self.o]
            .into_iter()
            .chain(self.g.as_ref())
    }
}

/// A collection of [`Quad`]s.
///
/// Duplicates are not rejected on insertion;
/// deduplication happens when the canonical form is written.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    quads: Vec<Quad>,
}

impl Dataset {
    /// Build an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quad to this dataset.
    pub fn insert(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    /// The number of quads in this dataset (duplicates included).
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Whether this dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Iterate over the quads of this dataset, in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Quad> {
        self.quads.iter()
    }

    /// The quads of this dataset, as a slice.
    pub fn as_slice(&self) -> &[Quad] {
        &self.quads
    }
}

impl FromIterator<Quad> for Dataset {
    fn from_iter<T: IntoIterator<Item = Quad>>(iter: T) -> Self {
        Self {
            quads: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Quad;
    type IntoIter = std::slice::Iter<'a, Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An index from blank node label to the quads mentioning it,
/// built once per canonicalization run.
///
/// Each quad is listed at most once per label,
/// even when the label occurs in several positions of that quad.
#[derive(Clone, Debug)]
pub struct BnodeIndex<'a> {
    b2q: BTreeMap<&'a str, Vec<&'a Quad>>,
}

impl<'a> BnodeIndex<'a> {
    /// Build the index over `quads`.
    pub fn new(quads: &'a [Quad]) -> Self {
        let mut b2q: BTreeMap<&'a str, Vec<&'a Quad>> = BTreeMap::new();
        for quad in quads {
            let mut seen: [Option<&str>; 3] = [None; 3];
            let mut nseen = 0;
            for component in quad.components() {
                if let Term::Blank(label) = component {
                    let label = label.as_ref();
                    if seen[..nseen].contains(&Some(label)) {
                        continue;
                    }
                    seen[nseen] = Some(label);
                    nseen += 1;
                    b2q.entry(label).or_default().push(quad);
                }
            }
        }
        Self { b2q }
    }

    /// The number of distinct blank node labels.
    pub fn len(&self) -> usize {
        self.b2q.len()
    }

    /// Whether no quad mentions any blank node.
    pub fn is_empty(&self) -> bool {
        self.b2q.is_empty()
    }

    /// Iterate over the distinct blank node labels, in label order.
    pub fn blank_nodes(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.b2q.keys().copied()
    }

    /// All quads mentioning `label` in subject, object or graph position.
    pub fn quads_mentioning(&self, label: &str) -> &[&'a Quad] {
        self.b2q.get(label).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::Literal;

    fn quad(s: Term, p: &str, o: Term, g: Option<Term>) -> Quad {
        Quad::new(s, Term::iri(p), o, g).unwrap()
    }

    #[test]
    fn blank_predicate_is_rejected() {
        let res = Quad::new(
            Term::iri("tag:s"),
            Term::blank("p"),
            Term::iri("tag:o"),
            None,
        );
        assert!(matches!(res, Err(InvalidQuad::PredicateNotIri)));
    }

    #[test]
    fn literal_graph_is_rejected() {
        let res = Quad::new(
            Term::iri("tag:s"),
            Term::iri("tag:p"),
            Term::iri("tag:o"),
            Some(Literal::simple("g").into()),
        );
        assert!(matches!(res, Err(InvalidQuad::GraphLiteral)));
    }

    #[test]
    fn index_covers_subject_object_and_graph() {
        let quads = [
            quad(Term::blank("b0"), "tag:p", Term::iri("tag:o"), None),
            quad(Term::iri("tag:s"), "tag:p", Term::blank("b1"), None),
            quad(
                Term::iri("tag:s"),
                "tag:p",
                Term::iri("tag:o"),
                Some(Term::blank("b2")),
            ),
        ];
        let index = BnodeIndex::new(&quads);
        assert_eq!(index.len(), 3);
        assert_eq!(index.blank_nodes().collect::<Vec<_>>(), ["b0", "b1", "b2"]);
        assert_eq!(index.quads_mentioning("b1"), [&quads[1]]);
        assert!(index.quads_mentioning("b3").is_empty());
    }

    #[test]
    fn index_lists_each_quad_once_per_label() {
        // b appears as both subject and object of the same quad
        let quads = [quad(Term::blank("b"), "tag:p", Term::blank("b"), None)];
        let index = BnodeIndex::new(&quads);
        assert_eq!(index.quads_mentioning("b").len(), 1);
    }
}
