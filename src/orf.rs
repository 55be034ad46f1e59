// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Open reading frame descriptors and ingest validation.

use std::{
    fmt::{self, Write},
    str::FromStr,
};

use crate::discrete::{discretize, DiscreteDist};
use crate::errors::{OrfError, ParseError};
use crate::genetic_code::START_CODON;
use crate::nucleotide::{Codon, Nucleotide};

/// A reading frame tag relative to the forward strand.
///
/// `-` frames read the reverse complement; their shift is still counted
/// on forward-strand coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, std::hash::Hash)]
pub enum Frame {
    Plus0,
    Plus1,
    Plus2,
    Minus0,
    Minus1,
    Minus2,
}

impl Frame {
    pub const ALL: [Self; 6] = [
        Self::Plus0,
        Self::Plus1,
        Self::Plus2,
        Self::Minus0,
        Self::Minus1,
        Self::Minus2,
    ];

    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::Minus0 | Self::Minus1 | Self::Minus2)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, shift) = match self {
            Self::Plus0 => ('+', '0'),
            Self::Plus1 => ('+', '1'),
            Self::Plus2 => ('+', '2'),
            Self::Minus0 => ('-', '0'),
            Self::Minus1 => ('-', '1'),
            Self::Minus2 => ('-', '2'),
        };
        f.write_char(sign)?;
        f.write_char(shift)
    }
}

impl FromStr for Frame {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+0" => Ok(Self::Plus0),
            "+1" => Ok(Self::Plus1),
            "+2" => Ok(Self::Plus2),
            "-0" => Ok(Self::Minus0),
            "-1" => Ok(Self::Minus1),
            "-2" => Ok(Self::Minus2),
            other => Err(ParseError::BadFrame(other.to_string())),
        }
    }
}

#[cfg(feature = "serde")]
crate::serde_utils::impl_stringlike!(Frame);

/// An ORF as declared by the caller, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrfSpec {
    pub frame: Frame,
    /// Half-open intervals in splice order. Forward ORFs have
    /// `start < end` per interval, reverse ORFs `start > end`.
    pub coords: Vec<(usize, usize)>,
    pub omega_shape: f64,
    pub omega_classes: usize,
}

/// A validated ORF with its realized ω classes.
#[derive(Debug, Clone, PartialEq)]
pub struct Orf {
    pub frame: Frame,
    pub coords: Vec<(usize, usize)>,
    pub omega_shape: f64,
    /// Ascending dN/dS class values from the discretized gamma.
    pub omega_values: Vec<f64>,
    /// Position in the declared ORF table. Fixes the ORF's bit in every
    /// ω-signature and resolves all tie-breaks.
    pub index: usize,
}

impl Orf {
    /// One-hot bitmask identifying this ORF among all ORFs in the genome.
    pub fn map(&self) -> u64 {
        1 << self.index
    }

    pub fn spliced_len(&self) -> usize {
        self.coords
            .iter()
            .map(|&(s, e)| s.abs_diff(e))
            .sum()
    }
}

/// The genome's declared ORFs, in declaration order.
///
/// Built with [`OrfTable::from_specs`], which drops structurally invalid
/// ORFs with a warning instead of failing the whole run.
#[derive(Debug, Clone, Default)]
pub struct OrfTable {
    orfs: Vec<Orf>,
}

impl OrfTable {
    pub fn from_specs(specs: impl IntoIterator<Item = OrfSpec>, seq_len: usize) -> Self {
        let mut orfs = Vec::new();

        for spec in specs {
            match validate(&spec, seq_len, orfs.len()) {
                Ok(omega_values) => {
                    let index = orfs.len();
                    orfs.push(Orf {
                        frame: spec.frame,
                        coords: spec.coords,
                        omega_shape: spec.omega_shape,
                        omega_values,
                        index,
                    });
                }
                Err(err) => {
                    log::warn!("dropping ORF {:?} ({}): {err}", spec.coords, spec.frame);
                }
            }
        }

        Self { orfs }
    }

    pub fn len(&self) -> usize {
        self.orfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orfs.is_empty()
    }

    pub fn get(&self, index: usize) -> &Orf {
        &self.orfs[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Orf> {
        self.orfs.iter()
    }
}

fn validate(spec: &OrfSpec, seq_len: usize, declared: usize) -> Result<Vec<f64>, OrfError> {
    if declared >= 64 {
        return Err(OrfError::TooManyOrfs(declared + 1));
    }
    if spec.coords.is_empty() {
        return Err(OrfError::EmptyCoordinates);
    }

    for &(start, end) in &spec.coords {
        if start == end {
            return Err(OrfError::ZeroLength { start, end });
        }
        if start.max(end) > seq_len {
            return Err(OrfError::OutOfRange {
                start,
                end,
                len: seq_len,
            });
        }
        let forward_interval = start < end;
        if forward_interval == spec.frame.is_reverse() {
            return Err(OrfError::WrongOrientation {
                start,
                end,
                frame: spec.frame,
            });
        }
    }

    let spliced: usize = spec.coords.iter().map(|&(s, e)| s.abs_diff(e)).sum();
    if spliced % 3 != 0 {
        return Err(OrfError::NotCodonSized(spliced));
    }

    if spec.omega_classes == 0 {
        return Err(OrfError::NoOmegaClasses);
    }
    discretize(spec.omega_shape, spec.omega_classes, DiscreteDist::Gamma)
        .map_err(|_| OrfError::BadOmegaShape(spec.omega_shape))
}

/// Scan both strands for START…STOP spans in frame, at least three codons
/// long, skipping internal methionines.
///
/// Reverse-strand hits are reported on forward coordinates with
/// `start > end`, matching the orientation convention of [`OrfSpec`].
pub fn find_open_reading_frames(seq: &[Nucleotide]) -> Vec<(usize, usize)> {
    let mut found = scan_strand(seq);
    let rc: Vec<Nucleotide> = seq.iter().rev().map(|n| n.complement()).collect();
    let len = seq.len();

    for (start, end) in scan_strand(&rc) {
        found.push((len - start, len - end));
    }

    found
}

fn scan_strand(seq: &[Nucleotide]) -> Vec<(usize, usize)> {
    let mut found: Vec<(usize, usize)> = Vec::new();
    if seq.len() < 9 {
        return found;
    }

    'starts: for pos in 0..=seq.len() - 3 {
        if Codon([seq[pos], seq[pos + 1], seq[pos + 2]]) != START_CODON {
            continue;
        }
        let frame = pos % 3;

        // An ATG inside an existing in-frame ORF is an internal
        // methionine, not an initiation codon.
        for &(start, end) in found.iter().rev() {
            if start % 3 == frame && end < pos {
                break;
            }
            if start < pos && pos < end && start % 3 == frame {
                continue 'starts;
            }
        }

        let mut stop = pos + 3;
        while stop + 3 <= seq.len() {
            let codon = Codon([seq[stop], seq[stop + 1], seq[stop + 2]]);
            if codon.is_stop() {
                if stop + 3 - pos >= 9 {
                    found.push((pos, stop + 3));
                }
                break;
            }
            stop += 3;
        }
    }

    found
}

/// Classify ORF coordinate pairs into frame tags relative to the first
/// declared ORF (which anchors `+0`).
pub fn classify_frames(orfs: &[(usize, usize)]) -> Vec<(Frame, (usize, usize))> {
    let mut classified = Vec::with_capacity(orfs.len());
    let Some(&first) = orfs.first() else {
        return classified;
    };
    let first_forward = first.0 < first.1;

    for &orf in orfs {
        let shift = orf.0.abs_diff(first.0) % 3;
        let forward = orf.0 < orf.1;

        let frame = match (first_forward, forward, shift) {
            (true, true, 0) => Frame::Plus0,
            (true, true, 1) => Frame::Plus1,
            (true, true, _) => Frame::Plus2,
            (true, false, 0) => Frame::Minus2,
            (true, false, 1) => Frame::Minus1,
            (true, false, _) => Frame::Minus0,
            (false, true, 0) => Frame::Plus2,
            (false, true, 1) => Frame::Plus1,
            (false, true, _) => Frame::Plus0,
            (false, false, 0) => Frame::Minus0,
            (false, false, 1) => Frame::Minus1,
            (false, false, _) => Frame::Minus2,
        };
        classified.push((frame, orf));
    }

    classified
}
