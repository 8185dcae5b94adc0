//! I provide the implementation of the RDFC-1.0 algorithm described at
//! <https://www.w3.org/TR/rdf-canon/>

use std::collections::BTreeMap;
use std::io;

use crate::CanonError;
use crate::_permutations::for_each_permutation_of;
use crate::hash::{DigestAlgorithm, HashFunction, Sha256, Sha384, hex};
use crate::nquads::{quad_to_line, write_term};
use crate::quad::{BnodeIndex, Dataset, Quad};
use crate::term::Term;
use crate::ticker::Ticker;

/// The default value of `depth_factor` in [`normalize`] and [`relabel`].
///
/// The algorithm will not recurse more deeply than `depth_factor`*N,
/// where N is the total number of blank nodes in the dataset;
/// this bounds termination explicitly, independently of the ticker.
pub const DEFAULT_DEPTH_FACTOR: f32 = 1.0;

/// The default value of `permutation_limit` in [`normalize`] and [`relabel`].
///
/// The algorithm will not try to disambiguate more than `permutation_limit`
/// indistinguishable blank nodes (blank nodes with the same immediate
/// neighbourhood).
pub const DEFAULT_PERMUTATION_LIMIT: usize = 6;

/// Write into `w` the canonical N-Quads representation of `dataset`, where
/// + blank nodes are canonically [relabelled](relabel) with
///   - the [SHA-256](Sha256) hash function,
///   - the [`DEFAULT_DEPTH_FACTOR`],
///   - the [`DEFAULT_PERMUTATION_LIMIT`];
/// + quads are deduplicated and sorted in codepoint order.
///
/// The `ticker` is consulted at every bounded step of the algorithm;
/// no output is written if it expires mid-run.
///
/// See also [`normalize_with`].
pub fn normalize<W: io::Write>(
    dataset: &Dataset,
    ticker: &Ticker,
    w: W,
) -> Result<(), CanonError> {
    normalize_with::<Sha256, W>(
        dataset,
        ticker,
        w,
        DEFAULT_DEPTH_FACTOR,
        DEFAULT_PERMUTATION_LIMIT,
    )
}

/// [`normalize`] with the [SHA-384](Sha384) hash function.
pub fn normalize_sha384<W: io::Write>(
    dataset: &Dataset,
    ticker: &Ticker,
    w: W,
) -> Result<(), CanonError> {
    normalize_with::<Sha384, W>(
        dataset,
        ticker,
        w,
        DEFAULT_DEPTH_FACTOR,
        DEFAULT_PERMUTATION_LIMIT,
    )
}

/// [`normalize`] with a digest algorithm selected at runtime.
///
/// The selection only changes the digest function,
/// never the control flow of the algorithm.
pub fn normalize_digest<W: io::Write>(
    dataset: &Dataset,
    digest: DigestAlgorithm,
    ticker: &Ticker,
    w: W,
) -> Result<(), CanonError> {
    match digest {
        DigestAlgorithm::Sha256 => normalize(dataset, ticker, w),
        DigestAlgorithm::Sha384 => normalize_sha384(dataset, ticker, w),
    }
}

/// Write into `w` a canonical N-quads representation of `dataset`, where
/// + blank nodes are canonically [relabelled](relabel_with) with
///   - the [hash function](HashFunction) `H`,
///   - the given `depth_factor`,
///   - the given `permutation_limit`;
/// + quads are deduplicated and sorted in codepoint order.
///
/// See also [`normalize`].
pub fn normalize_with<H: HashFunction, W: io::Write>(
    dataset: &Dataset,
    ticker: &Ticker,
    mut w: W,
    depth_factor: f32,
    permutation_limit: usize,
) -> Result<(), CanonError> {
    let (quads, _) = relabel_with::<H>(dataset, ticker, depth_factor, permutation_limit)?;
    let mut lines: Vec<String> = quads.iter().map(quad_to_line).collect();
    lines.sort_unstable();
    lines.dedup();
    for line in &lines {
        w.write_all(line.as_bytes())?;
    }
    Ok(())
}

/// An identifier map as returned by [`relabel`] and [`relabel_with`],
/// from input blank node label to canonical label (without the `_:` prefix).
pub type IdMap = BTreeMap<Box<str>, Box<str>>;

/// Return a [`Dataset`] isomorphic to `dataset` whose blank nodes carry
/// canonical `c14n<N>` labels, paired with a mapping from original blank
/// node labels to canonical ones.
///
/// This calls [`relabel_with`] with
///   - the [SHA-256](Sha256) hash function,
///   - the [`DEFAULT_DEPTH_FACTOR`],
///   - the [`DEFAULT_PERMUTATION_LIMIT`].
///
/// Implements <https://www.w3.org/TR/rdf-canon/#canon-algorithm>
///
/// See also [`normalize`].
pub fn relabel(dataset: &Dataset, ticker: &Ticker) -> Result<(Dataset, IdMap), CanonError> {
    relabel_with::<Sha256>(
        dataset,
        ticker,
        DEFAULT_DEPTH_FACTOR,
        DEFAULT_PERMUTATION_LIMIT,
    )
}

/// Return a [`Dataset`] isomorphic to `dataset` whose blank nodes carry
/// canonical `c14n<N>` labels, paired with a mapping from original blank
/// node labels to canonical ones.
///
/// The generic parameter `H` determines which [hash function](HashFunction)
/// the algorithm uses internally (RDFC-1.0 uses [SHA-256](Sha256) by default).
///
/// The parameters `depth_factor` and `permutation_limit`
/// are used to stop the algorithm if the computation becomes too complex,
/// in order to secure it against [dataset poisoning](https://www.w3.org/TR/rdf-canon/#dataset-poisoning);
/// the `ticker` additionally bounds the wall-clock time spent.
/// Canonicalization is all-or-nothing: an expired ticker or an exceeded
/// safeguard yields an error and no partial relabelling.
///
/// Implements <https://www.w3.org/TR/rdf-canon/#canon-algorithm>
pub fn relabel_with<'a, H: HashFunction>(
    dataset: &'a Dataset,
    ticker: &Ticker,
    depth_factor: f32,
    permutation_limit: usize,
) -> Result<(Dataset, IdMap), CanonError> {
    // Steps 1 and 2
    let mut state = CanonState::<H>::new(
        BnodeIndex::new(dataset.as_slice()),
        *ticker,
        depth_factor,
        permutation_limit,
    );
    // Step 3
    for bnid in state.index.blank_nodes() {
        state.ticker.tick()?;
        let hash = hash_first_degree::<H>(bnid, state.index.quads_mentioning(bnid));
        state.h2b.entry(hash).or_default().push(bnid);
        state.b2h.insert(bnid, hash);
    }
    // Step 4: hash classes with a single member are uniquely identified;
    // issue their canonical identifier in hash order
    // (BTreeMap iteration is sorted on the hash)
    let mut next_h2b = BTreeMap::new();
    for (hash, bnids) in std::mem::take(&mut state.h2b) {
        debug_assert!(!bnids.is_empty());
        if bnids.len() > 1 {
            next_h2b.insert(hash, bnids);
        } else {
            state.canonical.issue(bnids[0]);
        }
    }
    state.h2b = next_h2b;
    // Step 5: resolve shared-hash classes with the N-degree hash,
    // in ascending order of their shared first-degree hash
    for identifier_list in state.h2b.values() {
        let mut hash_path_list = vec![];
        // Step 5.2
        for &identifier in identifier_list {
            let mut issuer = Issuer::new("b");
            issuer.issue(identifier);
            hash_path_list.push(state.hash_n_degree(identifier, &issuer, 0)?);
        }
        // Step 5.3
        hash_path_list.sort_unstable_by_key(|p| p.0);
        for (_, issuer) in hash_path_list {
            for bnid in issuer.issued_order {
                state.canonical.issue(bnid);
            }
        }
    }
    // every blank node must have been issued an identifier by now
    if state.canonical.issued.len() != state.index.len() {
        return Err(CanonError::Internal(
            "some blank nodes were left without a canonical identifier".to_string(),
        ));
    }
    // Step 6
    let issued = state.canonical.issued;
    let convert = |term: &Term| match term {
        Term::Blank(label) => Term::Blank(issued[label.as_ref()].clone()),
        other => other.clone(),
    };
    let quads = dataset
        .iter()
        .map(|q| Quad {
            s: convert(&q.s),
            p: q.p.clone(),
            o: convert(&q.o),
            g: q.g.as_ref().map(&convert),
        })
        .collect();
    let map = issued
        .into_iter()
        .map(|(label, canon_id)| (Box::from(label), canon_id))
        .collect();
    Ok((quads, map))
}

#[derive(Clone, Debug)]
struct CanonState<'a, H: HashFunction> {
    index: BnodeIndex<'a>,
    h2b: BTreeMap<H::Output, Vec<&'a str>>,
    canonical: Issuer<'a>,
    /// Not specified in the spec: memoizing the results of hash 1st degree
    b2h: BTreeMap<&'a str, H::Output>,
    ticker: Ticker,
    /// Not specified in the spec: maximum recursion factor in `hash_n_degree`
    depth_factor: f32,
    /// Not specified in the spec: maximum number of nodes on which permutations will be computed
    permutation_limit: usize,
}

impl<'a, H: HashFunction> CanonState<'a, H> {
    fn new(
        index: BnodeIndex<'a>,
        ticker: Ticker,
        depth_factor: f32,
        permutation_limit: usize,
    ) -> Self {
        CanonState {
            index,
            h2b: BTreeMap::new(),
            canonical: Issuer::new("c14n"),
            b2h: BTreeMap::new(),
            ticker,
            depth_factor,
            permutation_limit,
        }
    }

    /// Implements <https://www.w3.org/TR/rdf-canon/#hash-related-blank-node>
    fn hash_related(
        &self,
        related: &str,
        quad: &Quad,
        issuer: &Issuer<'a>,
        position: &str,
    ) -> H::Output {
        let mut input = H::initialize();
        input.update(position);
        if position != "g" {
            if let Term::Iri(p) = &quad.p {
                input.update(b"<");
                input.update(p.as_bytes());
                input.update(b">");
            }
        }
        if let Some(canon_id) = self.canonical.issued.get(related) {
            input.update(b"_:");
            input.update(canon_id.as_bytes());
        } else if let Some(temp_id) = issuer.issued.get(related) {
            input.update(b"_:");
            input.update(temp_id.as_bytes());
        } else {
            // memoized value of hash_first_degree for this blank node
            input.update(hex(&self.b2h[related]));
        }
        input.finalize()
    }

    /// Implements <https://www.w3.org/TR/rdf-canon/#hash-nd-quads>
    fn hash_n_degree(
        &self,
        identifier: &'a str,
        issuer: &Issuer<'a>,
        depth: usize,
    ) -> Result<(H::Output, Issuer<'a>), CanonError> {
        self.ticker.tick()?;
        if depth as f32 > self.depth_factor * self.index.len() as f32 {
            return Err(CanonError::ToxicGraph(format!(
                "too many recursions (limit={} per blank node)",
                self.depth_factor
            )));
        }
        // Step 1
        let mut hn = BTreeMap::<H::Output, Vec<&'a str>>::new();
        // Steps 2 and 3
        for quad in self.index.quads_mentioning(identifier) {
            for (component, position) in quad.components().zip(["s", "p", "o", "g"]) {
                if let Term::Blank(label) = component {
                    let label = label.as_ref();
                    if label == identifier {
                        continue;
                    }
                    let hash = self.hash_related(label, quad, issuer, position);
                    hn.entry(hash).or_default().push(label);
                }
            }
        }
        // Step 4
        let mut data_to_hash = H::initialize();
        // Step 5
        let mut ret_issuer: Option<Issuer<'a>> = None;
        for (related_hash, mut blank_nodes) in hn {
            data_to_hash.update(hex(&related_hash));
            let mut chosen_path = String::new();
            let mut chosen_issuer: Option<Issuer<'a>> = None;
            // Step 5.4
            if blank_nodes.len() > self.permutation_limit {
                return Err(CanonError::ToxicGraph(format!(
                    "too many permutations ({} nodes, limit set to {})",
                    blank_nodes.len(),
                    self.permutation_limit,
                )));
            }
            for_each_permutation_of(&mut blank_nodes, |p| -> Result<(), CanonError> {
                // each permutation attempt is an abort checkpoint
                self.ticker.tick()?;
                let mut issuer_copy = ret_issuer.as_ref().unwrap_or(issuer).clone();
                let mut path = String::new();
                let mut recursion_list = vec![];
                // Step 5.4.4
                for &related in p {
                    if let Some(canon_id) = self.canonical.issued.get(related) {
                        path.push_str("_:");
                        path.push_str(canon_id);
                    } else {
                        let (id, new) = issuer_copy.issue(related);
                        if new {
                            recursion_list.push(related);
                        }
                        path.push_str("_:");
                        path.push_str(id);
                    }
                }
                if !chosen_path.is_empty() && smaller_path(&chosen_path, &path) {
                    return Ok(()); // skip to the next permutation
                }
                // Step 5.4.5
                for related in recursion_list {
                    let result = self.hash_n_degree(related, &issuer_copy, depth + 1)?;
                    let (id, _) = issuer_copy.issue(related);
                    path.push_str("_:");
                    path.push_str(id);
                    path.push('<');
                    path.push_str(&hex(&result.0));
                    path.push('>');
                    issuer_copy = result.1;
                    if !chosen_path.is_empty() && smaller_path(&chosen_path, &path) {
                        return Ok(()); // skip to the next permutation
                    }
                }
                // Step 5.4.6
                if chosen_path.is_empty() || path < chosen_path {
                    chosen_path = path;
                    chosen_issuer = Some(issuer_copy);
                }
                Ok(())
            })?;
            data_to_hash.update(chosen_path.as_bytes());
            ret_issuer = chosen_issuer;
        }
        let ret = (
            data_to_hash.finalize(),
            ret_issuer.unwrap_or_else(|| issuer.clone()),
        );
        debug_assert!({
            log::trace!(
                "hash-n-degree({}, {})\n-> {}",
                identifier,
                depth,
                hex(&ret.0)
            );
            true
        });
        Ok(ret)
    }
}

#[derive(Clone, Debug)]
struct Issuer<'a> {
    prefix: &'static str,
    //counter: usize, // use issued_order.len() instead
    issued: BTreeMap<&'a str, Box<str>>,
    // Not specified in the spec: allows to keep the order in which identifiers were issued
    issued_order: Vec<&'a str>,
}

impl<'a> Issuer<'a> {
    const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            issued: BTreeMap::new(),
            issued_order: vec![],
        }
    }

    /// Implements <https://www.w3.org/TR/rdf-canon/#issue-identifier>
    /// modified to also return a boolean indicating whether the issued identifier
    /// was newly created (true) or if it existed before (false)
    fn issue(&mut self, bnid: &'a str) -> (&str, bool) {
        let mut new = false;
        let ret = self.issued.entry(bnid).or_insert_with(|| {
            new = true;
            let counter = self.issued_order.len();
            self.issued_order.push(bnid);
            format!("{}{}", self.prefix, counter).into_boxed_str()
        });
        (ret, new)
    }
}

/// Implements <https://www.w3.org/TR/rdf-canon/#hash-1d-quads>
/// with the difference that the canonicalization state is not passed;
/// instead, the quad list corresponding to bnid is passed directly
fn hash_first_degree<H: HashFunction>(bnid: &str, quads: &[&Quad]) -> H::Output {
    let mut nquads: Vec<_> = quads
        .iter()
        .map(|quad| {
            let mut line = String::new();
            for term in quad.components() {
                nq_for_hash(&mut line, term, bnid);
                line.push(' ');
            }
            line.push_str(".\n");
            line
        })
        .collect();
    nquads.sort_unstable();
    let mut hasher = H::initialize();
    for line in nquads {
        hasher.update(&line);
    }
    let ret = hasher.finalize();
    debug_assert!({
        log::trace!("hash-first-degree({})\n-> {}", bnid, hex(&ret));
        true
    });
    ret
}

/// Serialize `term` for the first-degree hash:
/// the node being hashed serializes as `_:a`,
/// every other blank node as `_:z`,
/// so the hash never leaks as-yet-unlabelled identities.
fn nq_for_hash(buffer: &mut String, term: &Term, ref_bnid: &str) {
    if let Term::Blank(label) = term {
        if label.as_ref() == ref_bnid {
            buffer.push_str("_:a");
        } else {
            buffer.push_str("_:z");
        }
    } else {
        write_term(buffer, term);
    }
}

fn smaller_path(path1: &str, path2: &str) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match Ord::cmp(&path1.len(), &path2.len()) {
        Less => true,
        Equal => path1 < path2,
        Greater => false,
    }
}
