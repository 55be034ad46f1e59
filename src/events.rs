// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event tree: a layered index of admissible substitutions.
//!
//! Levels are `to` base → `from` base → μ-category → ω-signature; each
//! leaf holds the sites currently eligible for that exact mutation
//! descriptor. Interior nodes carry conditional probabilities (fixed by κ
//! and μ at construction) and rolled-up event counts (maintained on every
//! attach/detach), so sampling the next substitution is a cheap weighted
//! descent that never touches the sequence itself.

use rand::Rng;
use smallvec::SmallVec;

use crate::nucleotide::Nucleotide;
use crate::signature::{SigId, SignatureRegistry};

#[derive(Debug, Clone)]
pub struct EventTree {
    to: [ToBranch; 4],
}

#[derive(Debug, Clone)]
struct ToBranch {
    /// `None` on the diagonal (`from == to`).
    from: [Option<FromBranch>; 4],
    n_events: usize,
}

#[derive(Debug, Clone)]
struct FromBranch {
    /// Transition vs transversion share under the 1+2κ normalization.
    prob: f64,
    cats: Vec<CatBranch>,
    n_events: usize,
}

#[derive(Debug, Clone)]
struct CatBranch {
    /// μ_i / Σμ.
    prob: f64,
    /// Flat map from interned signature id to leaf.
    leaves: Vec<Option<Leaf>>,
    n_events: usize,
}

#[derive(Debug, Clone, Default)]
struct Leaf {
    sites: Vec<usize>,
}

/// A substitution drawn from the tree: which site mutates to which base,
/// and the branch it was found under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledEvent {
    pub from: Nucleotide,
    pub to: Nucleotide,
    pub category: usize,
    pub signature: SigId,
    pub site: usize,
}

impl EventTree {
    pub fn new(kappa: f64, mu: &[f64]) -> Self {
        let mu_sum: f64 = mu.iter().sum();
        let norm = 1.0 + 2.0 * kappa;

        let to = std::array::from_fn(|t| {
            let from = std::array::from_fn(|f| {
                if f == t {
                    return None;
                }
                let prob = if Nucleotide::ALL[f].is_transversion(Nucleotide::ALL[t]) {
                    kappa / norm
                } else {
                    1.0 / norm
                };
                Some(FromBranch {
                    prob,
                    cats: mu
                        .iter()
                        .map(|&m| CatBranch {
                            prob: m / mu_sum,
                            leaves: Vec::new(),
                            n_events: 0,
                        })
                        .collect(),
                    n_events: 0,
                })
            });
            ToBranch { from, n_events: 0 }
        });

        Self { to }
    }

    pub(crate) fn attach(
        &mut self,
        to: Nucleotide,
        from: Nucleotide,
        cat: usize,
        sig: SigId,
        site: usize,
    ) {
        debug_assert_ne!(to, from);
        let tb = &mut self.to[to.index()];
        let Some(fb) = tb.from[from.index()].as_mut() else {
            return;
        };
        let cb = &mut fb.cats[cat];
        if cb.leaves.len() <= sig.index() {
            cb.leaves.resize_with(sig.index() + 1, || None);
        }
        cb.leaves[sig.index()]
            .get_or_insert_with(Leaf::default)
            .sites
            .push(site);
        cb.n_events += 1;
        fb.n_events += 1;
        tb.n_events += 1;
    }

    pub(crate) fn detach(
        &mut self,
        to: Nucleotide,
        from: Nucleotide,
        cat: usize,
        sig: SigId,
        site: usize,
    ) {
        let tb = &mut self.to[to.index()];
        let Some(fb) = tb.from[from.index()].as_mut() else {
            return;
        };
        let cb = &mut fb.cats[cat];
        let Some(leaf) = cb.leaves.get_mut(sig.index()).and_then(Option::as_mut) else {
            return;
        };
        if let Some(pos) = leaf.sites.iter().position(|&s| s == site) {
            leaf.sites.swap_remove(pos);
            cb.n_events -= 1;
            fb.n_events -= 1;
            tb.n_events -= 1;
        }
    }

    /// Total admissible (site, target) pairs currently indexed.
    pub fn n_events(&self) -> usize {
        self.to.iter().map(|tb| tb.n_events).sum()
    }

    pub fn n_events_to(&self, to: Nucleotide) -> usize {
        self.to[to.index()].n_events
    }

    pub fn n_events_from(&self, to: Nucleotide, from: Nucleotide) -> Option<usize> {
        self.to[to.index()].from[from.index()]
            .as_ref()
            .map(|fb| fb.n_events)
    }

    /// The κ-derived conditional probability of `from` under `to`.
    pub fn from_prob(&self, to: Nucleotide, from: Nucleotide) -> Option<f64> {
        self.to[to.index()].from[from.index()]
            .as_ref()
            .map(|fb| fb.prob)
    }

    /// The μ share of category `cat` under any (to, from) branch.
    pub fn category_prob(&self, to: Nucleotide, from: Nucleotide, cat: usize) -> Option<f64> {
        self.to[to.index()].from[from.index()]
            .as_ref()
            .and_then(|fb| fb.cats.get(cat))
            .map(|cb| cb.prob)
    }

    /// Occupied leaves under a fixed (to, from, μ) branch.
    pub fn leaves(
        &self,
        to: Nucleotide,
        from: Nucleotide,
        cat: usize,
    ) -> impl Iterator<Item = (SigId, &[usize])> + '_ {
        self.to[to.index()].from[from.index()]
            .as_ref()
            .and_then(|fb| fb.cats.get(cat))
            .into_iter()
            .flat_map(|cb| {
                cb.leaves.iter().enumerate().filter_map(|(i, leaf)| {
                    leaf.as_ref()
                        .filter(|l| !l.sites.is_empty())
                        .map(|l| (SigId(i as u32), l.sites.as_slice()))
                })
            })
    }

    /// Draw the next substitution, weighting every level by its
    /// conditional probability times the events below it. `None` when the
    /// tree is empty.
    pub(crate) fn sample<R: Rng>(
        &self,
        registry: &SignatureRegistry,
        rng: &mut R,
    ) -> Option<SampledEvent> {
        let to_idx = weighted_choice(
            rng,
            self.to.iter().map(|tb| {
                tb.from
                    .iter()
                    .flatten()
                    .map(|fb| fb.prob * cat_weight(fb, registry))
                    .sum()
            }),
        )?;
        let tb = &self.to[to_idx];

        let from_idx = weighted_choice(
            rng,
            tb.from.iter().map(|fb| {
                fb.as_ref()
                    .map_or(0.0, |fb| fb.prob * cat_weight(fb, registry))
            }),
        )?;
        let fb = tb.from[from_idx].as_ref()?;

        let category = weighted_choice(
            rng,
            fb.cats.iter().map(|cb| cb.prob * leaf_weight(cb, registry)),
        )?;
        let cb = &fb.cats[category];

        let sig_idx = weighted_choice(
            rng,
            cb.leaves.iter().enumerate().map(|(i, leaf)| {
                leaf.as_ref().map_or(0.0, |l| {
                    registry.weight(SigId(i as u32)) * l.sites.len() as f64
                })
            }),
        )?;
        let leaf = cb.leaves[sig_idx].as_ref()?;
        let site = leaf.sites[rng.gen_range(0..leaf.sites.len())];

        Some(SampledEvent {
            from: Nucleotide::ALL[from_idx],
            to: Nucleotide::ALL[to_idx],
            category,
            signature: SigId(sig_idx as u32),
            site,
        })
    }
}

fn leaf_weight(cb: &CatBranch, registry: &SignatureRegistry) -> f64 {
    cb.leaves
        .iter()
        .enumerate()
        .map(|(i, leaf)| {
            leaf.as_ref().map_or(0.0, |l| {
                registry.weight(SigId(i as u32)) * l.sites.len() as f64
            })
        })
        .sum()
}

fn cat_weight(fb: &FromBranch, registry: &SignatureRegistry) -> f64 {
    fb.cats
        .iter()
        .map(|cb| cb.prob * leaf_weight(cb, registry))
        .sum()
}

fn weighted_choice<R: Rng>(rng: &mut R, weights: impl Iterator<Item = f64>) -> Option<usize> {
    let weights: SmallVec<[f64; 8]> = weights.collect();
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return None;
    }

    let mut r = rng.gen::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        if r < w {
            return Some(i);
        }
        r -= w;
    }
    // float rounding can walk r past the last bucket
    weights.iter().rposition(|&w| w > 0.0)
}
