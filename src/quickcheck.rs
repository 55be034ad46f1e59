// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use ::quickcheck::{Arbitrary, Gen};

use crate::{Codon, DnaSequence, Frame, Nucleotide};

impl Arbitrary for Nucleotide {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&Nucleotide::ALL)
            .expect("Gen should be able to choose a Nucleotide")
    }
}

impl Arbitrary for Codon {
    fn arbitrary(g: &mut Gen) -> Self {
        Self([
            Nucleotide::arbitrary(g),
            Nucleotide::arbitrary(g),
            Nucleotide::arbitrary(g),
        ])
    }
}

impl Arbitrary for Frame {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&Frame::ALL)
            .expect("Gen should be able to choose a Frame")
    }
}

impl Arbitrary for DnaSequence {
    fn arbitrary(g: &mut Gen) -> Self {
        Self::new(Arbitrary::arbitrary(g))
    }
}
