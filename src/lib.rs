// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Codon-aware simulation of sequence evolution along a phylogeny.
//!
//! The model combines an HKY-style nucleotide process (κ, π), discretized
//! gamma rate heterogeneity among sites (μ), and per-ORF selective
//! pressure (ω) that scores a substitution against every reading frame it
//! touches, overlapping or not. Simulation is event-driven: a Gillespie
//! sampler draws substitutions from a layered event tree rather than
//! exponentiating rate matrices.

mod discrete;
pub use discrete::*;

mod errors;
pub use errors::*;

mod events;
pub use events::{EventTree, SampledEvent};

mod genetic_code;
pub use genetic_code::{START_CODON, STOP};

mod nucleotide;
pub use nucleotide::*;

mod orf;
pub use orf::*;

mod phylo;
pub use phylo::*;

mod sequence;
pub use sequence::*;

mod signature;
pub use signature::*;

mod simulate;
pub use simulate::*;

#[cfg(feature = "serde")]
mod serde_utils;

#[cfg(any(test, feature = "quickcheck"))]
mod quickcheck;
