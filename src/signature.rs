// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ω-signatures: per-(site, target) records of the selective effect a
//! substitution has in every reading frame it touches.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::orf::OrfTable;

/// The effect of a substitution within one ORF: either synonymous, or
/// non-synonymous with one of the ORF's ω classes chosen for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, std::hash::Hash)]
pub enum OmegaSlot {
    NonSyn(u8),
    Syn,
}

/// One slot per ORF the site participates in, ordered by declared ORF
/// index. A site outside every ORF has the empty signature.
///
/// (site, target) pairs that would create or destroy a START or STOP get
/// no signature at all; they are excluded from the event tree.
#[derive(Debug, Clone, PartialEq, Eq, std::hash::Hash, Default)]
pub struct OmegaSignature {
    slots: SmallVec<[(u16, OmegaSlot); 2]>,
}

impl OmegaSignature {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a slot. Slots must arrive in ascending ORF order.
    pub fn push(&mut self, orf: u16, slot: OmegaSlot) {
        debug_assert!(self.slots.last().map_or(true, |&(prev, _)| prev < orf));
        self.slots.push((orf, slot));
    }

    pub fn slots(&self) -> &[(u16, OmegaSlot)] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when no slot is non-synonymous (including the no-ORF case).
    pub fn is_synonymous(&self) -> bool {
        self.slots
            .iter()
            .all(|&(_, slot)| matches!(slot, OmegaSlot::Syn))
    }
}

/// A signature interned by a [`SignatureRegistry`], dense per sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
pub struct SigId(pub u32);

impl SigId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interns every signature observed on a sequence and keeps the ω-product
/// registry used to normalize signature probabilities.
#[derive(Debug, Clone, Default)]
pub struct SignatureRegistry {
    interned: Vec<OmegaSignature>,
    ids: HashMap<OmegaSignature, SigId>,
    /// Π of the chosen ω values over non-synonymous slots; `None` for
    /// fully synonymous signatures.
    products: Vec<Option<f64>>,
    product_sum: f64,
}

impl SignatureRegistry {
    pub fn intern(&mut self, sig: OmegaSignature, orfs: &OrfTable) -> SigId {
        if let Some(&id) = self.ids.get(&sig) {
            return id;
        }

        let id = SigId(self.interned.len() as u32);
        let product = if sig.is_synonymous() {
            None
        } else {
            let mut p = 1.0;
            for &(orf, slot) in sig.slots() {
                if let OmegaSlot::NonSyn(class) = slot {
                    p *= orfs.get(orf as usize).omega_values[class as usize];
                }
            }
            self.product_sum += p;
            Some(p)
        };

        self.products.push(product);
        self.ids.insert(sig.clone(), id);
        self.interned.push(sig);
        id
    }

    pub fn get(&self, id: SigId) -> &OmegaSignature {
        &self.interned[id.index()]
    }

    pub fn len(&self) -> usize {
        self.interned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interned.is_empty()
    }

    /// The ω-product of a non-synonymous signature.
    pub fn product(&self, id: SigId) -> Option<f64> {
        self.products[id.index()]
    }

    /// All registered non-synonymous signatures with their products.
    pub fn products(&self) -> impl Iterator<Item = (SigId, f64)> + '_ {
        self.products
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (SigId(i as u32), p)))
    }

    /// `1 + Σ` registered ω-products.
    pub fn denominator(&self) -> f64 {
        1.0 + self.product_sum
    }

    /// Unnormalized sampling weight of a signature: its ω-product, or 1
    /// when synonymous.
    pub(crate) fn weight(&self, id: SigId) -> f64 {
        self.products[id.index()].unwrap_or(1.0)
    }

    /// The probability mass the event tree assigns to this signature.
    pub fn probability(&self, id: SigId) -> f64 {
        self.weight(id) / self.denominator()
    }
}
