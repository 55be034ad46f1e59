// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    fmt::{self, Write},
    str::FromStr,
};

use crate::errors::{CodonError, ParseError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::serde_utils;

/// A DNA nucleotide.
///
/// The discriminant doubles as the index into base-indexed tables
/// (stationary frequencies, event-tree branches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[repr(u8)]
pub enum Nucleotide {
    A = 0,
    C = 1,
    G = 2,
    T = 3,
}

const fn ascii_to_nucleotide_table() -> [Option<Nucleotide>; 256] {
    let mut pack_table = [None; 256];

    macro_rules! insert {
        ($chr:literal, $variant:expr) => {
            pack_table[$chr.to_ascii_uppercase() as usize] = Some($variant);
            pack_table[$chr.to_ascii_lowercase() as usize] = Some($variant);
        };
    }

    insert!(b'a', Nucleotide::A);
    insert!(b'c', Nucleotide::C);
    insert!(b'g', Nucleotide::G);
    insert!(b't', Nucleotide::T);

    pack_table
}

const ASCII_TO_NUCLEOTIDE: [Option<Nucleotide>; 256] = ascii_to_nucleotide_table();

impl Nucleotide {
    pub const ALL: [Self; 4] = [Self::A, Self::C, Self::G, Self::T];

    pub const PURINES: [Self; 2] = [Self::A, Self::G];
    pub const PYRIMIDINES: [Self; 2] = [Self::C, Self::T];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn complement(self) -> Self {
        match self {
            Self::A => Self::T,
            Self::T => Self::A,
            Self::C => Self::G,
            Self::G => Self::C,
        }
    }

    /// The base reached by a transition (purine ↔ purine, pyrimidine ↔ pyrimidine).
    pub const fn transition(self) -> Self {
        match self {
            Self::A => Self::G,
            Self::G => Self::A,
            Self::C => Self::T,
            Self::T => Self::C,
        }
    }

    /// Whether substituting `to` for `self` is a transversion.
    ///
    /// Substituting a base for itself is neither; callers exclude that
    /// case before asking.
    pub fn is_transversion(self, to: Self) -> bool {
        to != self && to != self.transition()
    }

    pub fn to_ascii(self) -> u8 {
        match self {
            Self::A => b'A',
            Self::C => b'C',
            Self::G => b'G',
            Self::T => b'T',
        }
    }
}

impl TryFrom<u8> for Nucleotide {
    type Error = ParseError;

    #[inline(always)]
    fn try_from(u: u8) -> Result<Self, Self::Error> {
        if u >= 128 {
            return Err(ParseError::NonAsciiByte(u));
        }

        match ASCII_TO_NUCLEOTIDE[u as usize] {
            Some(n) => Ok(n),
            None => Err(ParseError::BadNucleotide(u.into())),
        }
    }
}

impl From<Nucleotide> for u8 {
    fn from(n: Nucleotide) -> Self {
        n.to_ascii()
    }
}

impl From<Nucleotide> for char {
    fn from(n: Nucleotide) -> Self {
        n.to_ascii() as char
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((*self).into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, std::hash::Hash)]
pub struct Codon(pub [Nucleotide; 3]);

impl Codon {
    /// Index into 64-entry codon tables.
    pub const fn index(self) -> usize {
        let Codon([a, b, c]) = self;
        a.index() * 16 + b.index() * 4 + c.index()
    }
}

impl TryFrom<[u8; 3]> for Codon {
    type Error = ParseError;

    fn try_from(value: [u8; 3]) -> Result<Self, Self::Error> {
        Ok(Self([
            Nucleotide::try_from(value[0])?,
            Nucleotide::try_from(value[1])?,
            Nucleotide::try_from(value[2])?,
        ]))
    }
}

impl From<[Nucleotide; 3]> for Codon {
    fn from(nucleotides: [Nucleotide; 3]) -> Self {
        Codon(nucleotides)
    }
}

impl From<Codon> for [Nucleotide; 3] {
    fn from(c: Codon) -> Self {
        c.0
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for Codon {
    type Err = CodonError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let three: [u8; 3] = value.as_bytes().try_into()?;
        Ok(Self::try_from(three)?)
    }
}

#[cfg(feature = "serde")]
serde_utils::impl_stringlike!(Codon);

/// An owned strand of concrete nucleotides.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
pub struct DnaSequence {
    dna: Vec<Nucleotide>,
}

impl DnaSequence {
    pub fn new(dna: Vec<Nucleotide>) -> Self {
        Self { dna }
    }

    pub fn len(&self) -> usize {
        self.dna.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dna.is_empty()
    }

    pub fn as_slice(&self) -> &[Nucleotide] {
        &self.dna
    }

    pub fn iter(&self) -> impl Iterator<Item = Nucleotide> + '_ {
        self.dna.iter().copied()
    }

    pub fn push(&mut self, n: Nucleotide) {
        self.dna.push(n);
    }

    /// Takes the reverse complement of this sequence.
    pub fn reverse_complement(&self) -> Self {
        Self::new(self.dna.iter().rev().map(|n| n.complement()).collect())
    }
}

impl std::ops::Index<usize> for DnaSequence {
    type Output = Nucleotide;

    fn index(&self, index: usize) -> &Self::Output {
        &self.dna[index]
    }
}

impl From<DnaSequence> for String {
    fn from(seq: DnaSequence) -> Self {
        seq.to_string()
    }
}

impl fmt::Display for DnaSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &n in &self.dna {
            f.write_char(n.into())?;
        }
        Ok(())
    }
}

impl TryFrom<&[u8]> for DnaSequence {
    type Error = ParseError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let mut vec = Vec::with_capacity(value.len());

        for &b in value {
            if b != b' ' && b != b'\t' {
                vec.push(Nucleotide::try_from(b)?);
            }
        }
        Ok(Self::new(vec))
    }
}

impl TryFrom<Vec<u8>> for DnaSequence {
    type Error = ParseError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(&value[..])
    }
}

impl FromStr for DnaSequence {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.as_bytes())
    }
}

#[cfg(feature = "serde")]
serde_utils::impl_stringlike!(DnaSequence);

/// Empirical base frequencies of a sequence, in ACGT order.
///
/// The usual default for π when the caller has no better estimate.
pub fn base_frequencies(dna: &[Nucleotide]) -> [f64; 4] {
    let mut counts = [0usize; 4];
    for &n in dna {
        counts[n.index()] += 1;
    }
    let total = dna.len().max(1) as f64;
    counts.map(|c| c as f64 / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dna_parses() {
        for c in 0_u8..128 {
            let c = char::from(c);
            let r = DnaSequence::from_str(&String::from(c));
            if "aAcCgGtT \t".chars().any(|x| x == c) {
                assert!(
                    r.is_ok(),
                    "{c:?} should be a valid nucleotide or allowed whitespace"
                );
            } else {
                assert!(
                    r.is_err(),
                    "{c:?} should *not* be a valid nucleotide or allowed whitespace"
                );
            }
        }
    }

    #[test]
    fn test_complement() {
        for n in Nucleotide::ALL {
            assert_eq!(n.complement().complement(), n);
        }
        assert_eq!(Nucleotide::A.complement(), Nucleotide::T);
        assert_eq!(Nucleotide::C.complement(), Nucleotide::G);
    }

    #[test]
    fn test_transitions_and_transversions() {
        use Nucleotide::*;

        assert_eq!(A.transition(), G);
        assert_eq!(G.transition(), A);
        assert_eq!(C.transition(), T);
        assert_eq!(T.transition(), C);

        assert!(!A.is_transversion(G));
        assert!(A.is_transversion(C));
        assert!(A.is_transversion(T));
        assert!(!A.is_transversion(A));

        // every base has exactly two transversion targets
        for from in Nucleotide::ALL {
            let n = Nucleotide::ALL
                .iter()
                .filter(|&&to| from.is_transversion(to))
                .count();
            assert_eq!(n, 2);
        }
    }

    #[test]
    fn test_reverse_complement() {
        let d = DnaSequence::from_str("CATTAG").unwrap();
        assert_eq!(d.reverse_complement().to_string(), "CTAATG");
        assert_eq!(d.reverse_complement().reverse_complement(), d);
    }

    #[test]
    fn test_codon_roundtrip() {
        let c = Codon::from_str("ATG").unwrap();
        assert_eq!(c.to_string(), "ATG");
        assert!(Codon::from_str("AT").is_err());
        assert!(Codon::from_str("ATX").is_err());
    }

    #[test]
    fn test_codon_index_unique() {
        let mut seen = [false; 64];
        for a in Nucleotide::ALL {
            for b in Nucleotide::ALL {
                for c in Nucleotide::ALL {
                    let i = Codon([a, b, c]).index();
                    assert!(!seen[i]);
                    seen[i] = true;
                }
            }
        }
    }

    #[test]
    fn test_base_frequencies() {
        let d = DnaSequence::from_str("AACG").unwrap();
        let pi = base_frequencies(d.as_slice());
        assert_eq!(pi, [0.5, 0.25, 0.25, 0.0]);
    }

    #[test]
    fn test_whitespace_tolerated() {
        let d = DnaSequence::from_str(" ACG\tT ").unwrap();
        assert_eq!(d.to_string(), "ACGT");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_json() {
        assert_eq!(
            serde_json::to_value(Nucleotide::A).unwrap(),
            serde_json::json!("A")
        );
        assert_eq!(
            serde_json::to_value(Codon([Nucleotide::A, Nucleotide::C, Nucleotide::G])).unwrap(),
            serde_json::json!("ACG")
        );
        assert_eq!(
            serde_json::to_value(DnaSequence::from_str("acgt").unwrap()).unwrap(),
            serde_json::json!("ACGT")
        );
    }
}
