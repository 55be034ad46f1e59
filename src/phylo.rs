// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Preorder simulation over a rooted phylogeny.
//!
//! Each child of a node gets a deep copy of the parent sequence and
//! evolves it along its own branch; independent subtrees run on the
//! rayon pool via two-way `rayon::join` forks at each split. Every node
//! derives its RNG stream from the root seed and its child-index path,
//! so results are identical for any worker count.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::errors::TreeError;
use crate::nucleotide::DnaSequence;
use crate::sequence::Sequence;
use crate::simulate::{evolve_branch, CancelToken};

/// One node of the input phylogeny.
///
/// Parsing Newick (or anything else) into this shape is the caller's
/// business; the simulator only walks it.
#[derive(Debug, Clone, Default)]
pub struct Clade {
    pub name: Option<String>,
    /// Length of the branch leading to this node; the root has none.
    pub branch_length: Option<f64>,
    pub children: Vec<Clade>,
}

impl Clade {
    pub fn leaf(name: impl Into<String>, branch_length: f64) -> Self {
        Self {
            name: Some(name.into()),
            branch_length: Some(branch_length),
            children: Vec::new(),
        }
    }

    pub fn internal(branch_length: f64, children: Vec<Clade>) -> Self {
        Self {
            name: None,
            branch_length: Some(branch_length),
            children,
        }
    }

    pub fn root(children: Vec<Clade>) -> Self {
        Self {
            name: None,
            branch_length: None,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A validated, rooted phylogeny.
#[derive(Debug, Clone)]
pub struct Phylogeny {
    root: Clade,
}

impl Phylogeny {
    /// Accept a tree after checking it is rooted (at most two children at
    /// the root; a trifurcating root is the standard rendering of an
    /// unrooted tree) and every non-root branch has a finite,
    /// non-negative length.
    pub fn rooted(root: Clade) -> Result<Self, TreeError> {
        if root.children.len() > 2 {
            return Err(TreeError::Unrooted);
        }
        validate_branches(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Clade {
        &self.root
    }

    pub fn leaf_count(&self) -> usize {
        fn count(clade: &Clade) -> usize {
            if clade.is_leaf() {
                1
            } else {
                clade.children.iter().map(count).sum()
            }
        }
        count(&self.root)
    }
}

fn validate_branches(clade: &Clade) -> Result<(), TreeError> {
    for child in &clade.children {
        match child.branch_length {
            Some(length) if length.is_finite() && length >= 0.0 => validate_branches(child)?,
            _ => {
                return Err(TreeError::BranchLength {
                    clade: child
                        .name
                        .clone()
                        .unwrap_or_else(|| "<unnamed>".to_string()),
                })
            }
        }
    }
    Ok(())
}

/// The simulation output: every leaf's name and evolved sequence, in the
/// phylogeny's left-to-right leaf order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    records: Vec<(String, DnaSequence)>,
}

impl Alignment {
    pub fn records(&self) -> &[(String, DnaSequence)] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&DnaSequence> {
        self.records
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, seq)| seq)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, DnaSequence)> {
        self.records.iter()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    pub seed: u64,
    pub cancel: CancelToken,
    /// Wall-clock budget per branch.
    pub branch_timeout: Option<Duration>,
}

impl SimulationOptions {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Evolve `root_seq` over the phylogeny and collect the terminal
/// sequences.
pub fn simulate_phylogeny(
    root_seq: &Sequence,
    tree: &Phylogeny,
    options: &SimulationOptions,
) -> Result<Alignment, TreeError> {
    let records = walk(root_seq, tree.root(), options.seed, "0", options)?;
    Ok(Alignment { records })
}

fn walk(
    seq: &Sequence,
    clade: &Clade,
    seed: u64,
    path: &str,
    options: &SimulationOptions,
) -> Result<Vec<(String, DnaSequence)>, TreeError> {
    if options.cancel.is_cancelled() {
        return Err(TreeError::Cancelled);
    }

    if clade.is_leaf() {
        let name = clade
            .name
            .clone()
            .unwrap_or_else(|| format!("node_{path}"));
        return Ok(vec![(name, seq.to_dna())]);
    }

    fork(seq, &clade.children, 0, seed, path, options)
}

/// Fan the children out over the rayon pool: each `rayon::join` splits
/// the remaining children in half, so any arity decomposes into two-way
/// forks. `offset` is the position of `children[0]` in the parent's
/// child list, which keeps seeds and fallback names tied to absolute
/// child indices regardless of how the splits land.
fn fork(
    seq: &Sequence,
    children: &[Clade],
    offset: usize,
    seed: u64,
    path: &str,
    options: &SimulationOptions,
) -> Result<Vec<(String, DnaSequence)>, TreeError> {
    match children {
        [] => Ok(Vec::new()),
        [child] => {
            let child_seed = mix_seed(seed, offset as u64);
            let child_path = format!("{path}.{offset}");

            let mut child_seq = seq.clone_for_child();
            let mut rng = ChaCha20Rng::seed_from_u64(child_seed);
            let deadline = options.branch_timeout.map(|t| Instant::now() + t);
            evolve_branch(
                &mut child_seq,
                child.branch_length.unwrap_or(0.0),
                &mut rng,
                &options.cancel,
                deadline,
            )?;

            walk(&child_seq, child, child_seed, &child_path, options)
        }
        _ => {
            let mid = children.len() / 2;
            let (left, right) = children.split_at(mid);
            let (left, right) = rayon::join(
                || fork(seq, left, offset, seed, path, options),
                || fork(seq, right, offset + mid, seed, path, options),
            );

            let mut records = left?;
            records.extend(right?);
            Ok(records)
        }
    }
}

// splitmix64-style combine of a node seed and a child index
fn mix_seed(seed: u64, child: u64) -> u64 {
    let mut z = seed ^ child.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
