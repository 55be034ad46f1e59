// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::array::TryFromSliceError;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("non-ascii byte: {:x?}", .0)]
    NonAsciiByte(u8),
    #[error("bad nucleotide: {:?}", .0)]
    BadNucleotide(char),
    #[error("bad reading frame tag: {:?}", .0)]
    BadFrame(String),
}

#[derive(Debug, Clone, Error)]
pub enum CodonError {
    #[error("{:?}", .0)]
    BadParse(#[from] ParseError),
    #[error("{:?}", .0)]
    BadSlice(#[from] TryFromSliceError),
}

/// Problems with the sequence or model inputs that abort simulation
/// before it starts. Non-ACGT content is caught earlier, by
/// [`ParseError`] at `DnaSequence` parse time.
#[derive(Debug, Clone, Error)]
pub enum SequenceError {
    #[error("sequence of length {0} is too short; need at least 9 nt")]
    SequenceTooShort(usize),
    #[error("stationary frequencies sum to {0}, expected 1")]
    FrequencySum(f64),
    #[error("{param} must be positive, got {value}")]
    NonPositive { param: &'static str, value: f64 },
    #[error("at least one rate category is required")]
    NoRateCategories,
}

/// Problems with a single ORF descriptor. ORFs failing validation are
/// dropped at ingest with a warning; the rest of the table proceeds.
#[derive(Debug, Clone, Error)]
pub enum OrfError {
    #[error("ORF has no coordinate intervals")]
    EmptyCoordinates,
    #[error("interval ({start}, {end}) is zero-length")]
    ZeroLength { start: usize, end: usize },
    #[error("interval ({start}, {end}) falls outside the sequence (length {len})")]
    OutOfRange { start: usize, end: usize, len: usize },
    #[error("spliced length {0} is not a multiple of three")]
    NotCodonSized(usize),
    #[error("interval ({start}, {end}) is oriented against frame {frame}")]
    WrongOrientation {
        start: usize,
        end: usize,
        frame: crate::orf::Frame,
    },
    #[error("ORF declares no omega classes")]
    NoOmegaClasses,
    #[error("omega shape {0} is not positive")]
    BadOmegaShape(f64),
    #[error("at most 64 ORFs are supported, got {0}")]
    TooManyOrfs(usize),
}

#[derive(Debug, Clone, Error)]
pub enum TreeError {
    #[error("phylogeny is not rooted")]
    Unrooted,
    #[error("branch leading to {clade:?} has no positive length")]
    BranchLength { clade: String },
    #[error("simulation was cancelled")]
    Cancelled,
    #[error("branch simulation exceeded its wall-clock budget")]
    Timeout,
}
