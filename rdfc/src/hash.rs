//! Define the [`HashFunction`] trait as well as standard hash functions.
use std::fmt::Write;
use std::str::FromStr;

use sha2::Digest;

/// Abstraction of the hash function used by the canonicalization algorithm.
pub trait HashFunction {
    /// Output of the hash function; usually `[u8; N]`.
    type Output: AsRef<[u8]> + Copy + Eq + Ord;

    /// Start the computation of a hash
    fn initialize() -> Self;

    /// Update internal state by hashing `data`
    fn update(&mut self, data: impl AsRef<[u8]>);

    /// Return the hash
    fn finalize(self) -> Self::Output;
}

/// The [SHA-256](https://en.wikipedia.org/wiki/SHA-2) [`HashFunction`]
pub struct Sha256(sha2::Sha256);

impl HashFunction for Sha256 {
    type Output = [u8; 32];

    fn initialize() -> Self {
        Sha256(sha2::Sha256::new())
    }

    fn update(&mut self, data: impl AsRef<[u8]>) {
        self.0.update(data.as_ref());
    }

    fn finalize(self) -> Self::Output {
        self.0.finalize().into()
    }
}

/// The [SHA-384](https://en.wikipedia.org/wiki/SHA-2) [`HashFunction`]
pub struct Sha384(sha2::Sha384);

impl HashFunction for Sha384 {
    type Output = [u8; 48];

    fn initialize() -> Self {
        Sha384(sha2::Sha384::new())
    }

    fn update(&mut self, data: impl AsRef<[u8]>) {
        self.0.update(data.as_ref());
    }

    fn finalize(self) -> Self::Output {
        self.0.finalize().into()
    }
}

/// Runtime selector for the digest algorithm,
/// for callers (such as a CLI) that pick the hash function from a string.
///
/// The selection only affects the digest;
/// it does not change the algorithm's control flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// SHA-256, the RDFC-1.0 default
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
        })
    }
}

impl FromStr for DigestAlgorithm {
    type Err = UnknownDigest;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA256" | "SHA-256" => Ok(Self::Sha256),
            "SHA384" | "SHA-384" => Ok(Self::Sha384),
            _ => Err(UnknownDigest(s.to_string())),
        }
    }
}

/// This error is raised when parsing an unknown digest algorithm name.
#[derive(Debug, thiserror::Error)]
#[error("unknown digest algorithm '{0}', expected SHA256 or SHA384")]
pub struct UnknownDigest(pub String);

/// Render a hash as lowercase hexadecimal.
pub fn hex(hash: &impl AsRef<[u8]>) -> String {
    let mut digest = String::with_capacity(2 * hash.as_ref().len());
    for b in hash.as_ref() {
        write!(&mut digest, "{b:02x}").unwrap();
    }
    digest
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn sha256_hex() {
        let mut h = Sha256::initialize();
        h.update(b"abc");
        assert_eq!(
            hex(&h.finalize()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha384_hex() {
        let mut h = Sha384::initialize();
        h.update(b"abc");
        assert_eq!(
            hex(&h.finalize()),
            "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed\
             8086072ba1e7cc2358baeca134c825a7"
        );
    }

    #[test_case("SHA256", DigestAlgorithm::Sha256; "sha256 upper")]
    #[test_case("sha-256", DigestAlgorithm::Sha256; "sha256 dashed")]
    #[test_case("SHA384", DigestAlgorithm::Sha384; "sha384 upper")]
    #[test_case("sha384", DigestAlgorithm::Sha384; "sha384 lower")]
    fn digest_from_str(name: &str, exp: DigestAlgorithm) {
        assert_eq!(name.parse::<DigestAlgorithm>().unwrap(), exp);
    }

    #[test]
    fn digest_from_str_unknown() {
        assert!("MD5".parse::<DigestAlgorithm>().is_err());
    }
}
