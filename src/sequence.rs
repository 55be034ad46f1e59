// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The mutable sequence model: sites, their codon memberships, and the
//! per-(site, target) rate bookkeeping that feeds the event tree.
//!
//! All cross-references are indices into vectors owned by [`Sequence`];
//! nothing here holds a pointer into anything else, which is what makes
//! the fork-time deep copy a structural clone.

use rand::Rng;
use smallvec::SmallVec;

use crate::errors::SequenceError;
use crate::events::EventTree;
use crate::genetic_code::START_CODON;
use crate::nucleotide::{Codon, DnaSequence, Nucleotide};
use crate::orf::{Frame, OrfTable};
use crate::signature::{OmegaSignature, OmegaSlot, SigId, SignatureRegistry};

pub type CodonId = usize;

/// Evolution model scalars shared by every site.
#[derive(Debug, Clone)]
pub struct ModelParams {
    /// Transition/transversion rate ratio; multiplies transversions.
    pub kappa: f64,
    /// Substitutions per site per unit time.
    pub global_rate: f64,
    /// Stationary base frequencies in ACGT order; must sum to 1.
    pub pi: [f64; 4],
    /// μ base-rate categories, typically from [`crate::discrete::discretize`].
    pub mu: Vec<f64>,
    pub circular: bool,
}

impl ModelParams {
    fn validate(&self) -> Result<(), SequenceError> {
        for (param, value) in [("kappa", self.kappa), ("global_rate", self.global_rate)] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SequenceError::NonPositive { param, value });
            }
        }
        let sum: f64 = self.pi.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(SequenceError::FrequencySum(sum));
        }
        if self.mu.is_empty() {
            return Err(SequenceError::NoRateCategories);
        }
        for &value in &self.mu {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SequenceError::NonPositive {
                    param: "mu category",
                    value,
                });
            }
        }
        Ok(())
    }
}

/// One nucleotide position with its mutation bookkeeping.
///
/// Rates, μ-category keys and ω-signature keys are indexed by target
/// base; entries are `None` for the current base and for targets that
/// would create or destroy a START or STOP in any containing codon.
#[derive(Debug, Clone)]
pub struct Site {
    base: Nucleotide,
    pos: usize,
    codons: SmallVec<[CodonId; 2]>,
    rates: [Option<f64>; 4],
    cat_keys: [usize; 4],
    sig_keys: [Option<SigId>; 4],
    total_rate: f64,
}

impl Site {
    pub fn base(&self) -> Nucleotide {
        self.base
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn codons(&self) -> &[CodonId] {
        &self.codons
    }

    pub fn rate(&self, to: Nucleotide) -> Option<f64> {
        self.rates[to.index()]
    }

    pub fn category(&self, to: Nucleotide) -> Option<usize> {
        self.sig_keys[to.index()].map(|_| self.cat_keys[to.index()])
    }

    pub fn signature(&self, to: Nucleotide) -> Option<SigId> {
        self.sig_keys[to.index()]
    }

    pub fn total_rate(&self) -> f64 {
        self.total_rate
    }

    /// True when every admissible target would touch a START or STOP:
    /// the site can never substitute.
    pub fn is_degenerate(&self) -> bool {
        self.rates.iter().all(Option::is_none)
    }
}

/// A codon's place in the sequence: three site indices in reading order.
///
/// For reverse-strand ORFs the indices run 3′→5′ on the forward strand,
/// so [`CodonRef::reading`] only has to complement each base to produce
/// the codon as its own strand sees it. Structure never changes after
/// construction; only the referenced sites' bases do.
#[derive(Debug, Clone)]
pub struct CodonRef {
    frame: Frame,
    orf: usize,
    sites: [usize; 3],
    first_in_orf: bool,
}

impl CodonRef {
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn orf(&self) -> usize {
        self.orf
    }

    pub fn sites(&self) -> [usize; 3] {
        self.sites
    }

    fn strand_base(&self, base: Nucleotide) -> Nucleotide {
        if self.frame.is_reverse() {
            base.complement()
        } else {
            base
        }
    }

    /// The codon as read on its own strand.
    pub fn reading(&self, sites: &[Site]) -> Codon {
        Codon(self.sites.map(|i| self.strand_base(sites[i].base)))
    }

    /// The codon after substituting `base` at `site_idx` (a forward-strand
    /// base, complemented here as needed).
    pub fn reading_with(&self, sites: &[Site], site_idx: usize, base: Nucleotide) -> Codon {
        Codon(self.sites.map(|i| {
            self.strand_base(if i == site_idx { base } else { sites[i].base })
        }))
    }

    pub fn position_of(&self, site_idx: usize) -> Option<usize> {
        self.sites.iter().position(|&s| s == site_idx)
    }

    pub fn is_start(&self, sites: &[Site]) -> bool {
        self.first_in_orf && self.reading(sites) == START_CODON
    }

    pub fn is_stop(&self, sites: &[Site]) -> bool {
        self.reading(sites).is_stop()
    }

    pub fn creates_stop(&self, sites: &[Site], site_idx: usize, to: Nucleotide) -> bool {
        self.reading_with(sites, site_idx, to).is_stop()
    }

    pub fn is_nonsyn(&self, sites: &[Site], site_idx: usize, to: Nucleotide) -> bool {
        self.reading_with(sites, site_idx, to).amino_acid() != self.reading(sites).amino_acid()
    }
}

/// A sequence under simulation: nucleotides, codon structure, and the
/// event tree over every admissible substitution.
#[derive(Debug, Clone)]
pub struct Sequence {
    sites: Vec<Site>,
    codons: Vec<CodonRef>,
    orfs: OrfTable,
    params: ModelParams,
    registry: SignatureRegistry,
    tree: EventTree,
    total_rate: f64,
}

impl Sequence {
    /// Build the full site/codon/event-tree bookkeeping for a sequence.
    ///
    /// The RNG realizes the frozen random choices of the model: one μ
    /// category and (per non-synonymous ORF slot) one ω class for every
    /// admissible (site, target) pair.
    pub fn new<R: Rng>(
        dna: &DnaSequence,
        orfs: OrfTable,
        params: ModelParams,
        rng: &mut R,
    ) -> Result<Self, SequenceError> {
        if dna.len() < 9 {
            return Err(SequenceError::SequenceTooShort(dna.len()));
        }
        params.validate()?;

        let mut sites: Vec<Site> = dna
            .iter()
            .enumerate()
            .map(|(pos, base)| Site {
                base,
                pos,
                codons: SmallVec::new(),
                rates: [None; 4],
                cat_keys: [0; 4],
                sig_keys: [None; 4],
                total_rate: 0.0,
            })
            .collect();

        // Resolve codons ORF by ORF. The spliced view concatenates the
        // declared intervals and is reversed wholesale for `-` frames.
        let mut codons: Vec<CodonRef> = Vec::new();
        for orf in orfs.iter() {
            let mut spliced: Vec<usize> = Vec::with_capacity(orf.spliced_len());
            for &(start, end) in &orf.coords {
                if start < end {
                    spliced.extend(start..end);
                } else {
                    spliced.extend(end..start);
                }
            }
            if orf.frame.is_reverse() {
                spliced.reverse();
            }

            for (nth, chunk) in spliced.chunks_exact(3).enumerate() {
                let id = codons.len();
                codons.push(CodonRef {
                    frame: orf.frame,
                    orf: orf.index,
                    sites: [chunk[0], chunk[1], chunk[2]],
                    first_in_orf: nth == 0,
                });
                for &s in chunk {
                    sites[s].codons.push(id);
                }
            }
        }

        let tree = EventTree::new(params.kappa, &params.mu);
        let mut seq = Self {
            sites,
            codons,
            orfs,
            params,
            registry: SignatureRegistry::default(),
            tree,
            total_rate: 0.0,
        };

        for site in 0..seq.sites.len() {
            seq.assign_rates(site, rng);
            seq.attach_site(site);
        }

        Ok(seq)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn site(&self, idx: usize) -> &Site {
        &self.sites[idx]
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn codon(&self, id: CodonId) -> &CodonRef {
        &self.codons[id]
    }

    pub fn codons(&self) -> &[CodonRef] {
        &self.codons
    }

    pub fn orfs(&self) -> &OrfTable {
        &self.orfs
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    pub fn event_tree(&self) -> &EventTree {
        &self.tree
    }

    /// Aggregate instantaneous substitution rate over all sites.
    pub fn total_rate(&self) -> f64 {
        self.total_rate
    }

    /// Count of (site, target) pairs carrying a rate.
    pub fn admissible_pairs(&self) -> usize {
        self.sites
            .iter()
            .map(|s| s.rates.iter().flatten().count())
            .sum()
    }

    pub fn to_dna(&self) -> DnaSequence {
        DnaSequence::new(self.sites.iter().map(|s| s.base).collect())
    }

    /// The neighbor to the right, wrapping on circular genomes.
    pub fn right_of(&self, pos: usize) -> Option<usize> {
        if pos + 1 < self.sites.len() {
            Some(pos + 1)
        } else if self.params.circular {
            Some(0)
        } else {
            None
        }
    }

    /// The neighbor to the left, wrapping on circular genomes.
    pub fn left_of(&self, pos: usize) -> Option<usize> {
        if pos > 0 {
            Some(pos - 1)
        } else if self.params.circular {
            Some(self.sites.len() - 1)
        } else {
            None
        }
    }

    /// The deep copy handed to a child branch at a phylogeny fork.
    ///
    /// Because codons and event-tree leaves reference sites by index
    /// rather than by pointer, a structural clone already re-targets all
    /// bookkeeping at the new site vector.
    pub fn clone_for_child(&self) -> Self {
        self.clone()
    }

    /// Draw the next substitution from the event tree. `None` when no
    /// site can mutate.
    pub fn sample_event<R: Rng>(&self, rng: &mut R) -> Option<crate::events::SampledEvent> {
        self.tree.sample(&self.registry, rng)
    }

    /// Apply a substitution and repair all bookkeeping it invalidates.
    ///
    /// The mutated site and every site of every codon it shares re-enter
    /// the event tree under freshly computed rates, categories and
    /// signatures, since the codon context (and therefore the ω
    /// classification) of all of them may have changed.
    pub fn apply_substitution<R: Rng>(&mut self, site_idx: usize, to: Nucleotide, rng: &mut R) {
        debug_assert_ne!(self.sites[site_idx].base, to);

        let mut affected: SmallVec<[usize; 8]> = SmallVec::new();
        affected.push(site_idx);
        for &cid in &self.sites[site_idx].codons {
            affected.extend_from_slice(&self.codons[cid].sites);
        }
        affected.sort_unstable();
        affected.dedup();

        for &s in &affected {
            self.detach_site(s);
        }
        self.sites[site_idx].base = to;
        for &s in &affected {
            self.assign_rates(s, rng);
            self.attach_site(s);
        }
    }

    fn is_start_stop(&self, site_idx: usize, to: Nucleotide) -> bool {
        self.sites[site_idx].codons.iter().any(|&cid| {
            let codon = &self.codons[cid];
            codon.is_start(&self.sites)
                || codon.is_stop(&self.sites)
                || codon.creates_stop(&self.sites, site_idx, to)
        })
    }

    fn assign_rates<R: Rng>(&mut self, site_idx: usize, rng: &mut R) {
        let base = self.sites[site_idx].base;
        let mut rates = [None; 4];
        let mut cat_keys = [0usize; 4];
        let mut sig_keys = [None; 4];

        for to in Nucleotide::ALL {
            if to == base {
                continue;
            }
            if self.is_start_stop(site_idx, to) {
                continue;
            }

            let mut rate = self.params.global_rate * self.params.pi[base.index()];
            if base.is_transversion(to) {
                rate *= self.params.kappa;
            }

            // one μ category per (site, target), frozen until this
            // site's codon context changes again
            let cat = rng.gen_range(0..self.params.mu.len());
            rate *= self.params.mu[cat];

            let mut sig = OmegaSignature::empty();
            for ci in 0..self.sites[site_idx].codons.len() {
                let cid = self.sites[site_idx].codons[ci];
                let codon = &self.codons[cid];
                if sig
                    .slots()
                    .last()
                    .map_or(false, |&(orf, _)| orf as usize == codon.orf)
                {
                    // a second codon of the same ORF covering this site;
                    // the first one's slot stands
                    continue;
                }
                let slot = if codon.is_nonsyn(&self.sites, site_idx, to) {
                    let classes = self.orfs.get(codon.orf).omega_values.len();
                    OmegaSlot::NonSyn(rng.gen_range(0..classes) as u8)
                } else {
                    OmegaSlot::Syn
                };
                sig.push(codon.orf as u16, slot);
            }

            sig_keys[to.index()] = Some(self.registry.intern(sig, &self.orfs));
            cat_keys[to.index()] = cat;
            rates[to.index()] = Some(rate);
        }

        let site = &mut self.sites[site_idx];
        site.rates = rates;
        site.cat_keys = cat_keys;
        site.sig_keys = sig_keys;
        site.total_rate = rates.iter().flatten().sum();
    }

    fn attach_site(&mut self, site_idx: usize) {
        let site = &self.sites[site_idx];
        let base = site.base;
        for to in Nucleotide::ALL {
            if let Some(sig) = site.sig_keys[to.index()] {
                self.tree
                    .attach(to, base, site.cat_keys[to.index()], sig, site_idx);
            }
        }
        self.total_rate += self.sites[site_idx].total_rate;
    }

    fn detach_site(&mut self, site_idx: usize) {
        let site = &self.sites[site_idx];
        let base = site.base;
        for to in Nucleotide::ALL {
            if let Some(sig) = site.sig_keys[to.index()] {
                self.tree
                    .detach(to, base, site.cat_keys[to.index()], sig, site_idx);
            }
        }
        self.total_rate -= self.sites[site_idx].total_rate;
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use crate::orf::OrfSpec;

    use super::*;
    use Nucleotide::*;

    fn dna(s: &str) -> DnaSequence {
        DnaSequence::from_str(s).unwrap()
    }

    fn params() -> ModelParams {
        ModelParams {
            kappa: 1.0,
            global_rate: 0.05,
            pi: [0.25; 4],
            mu: vec![1.0],
            circular: false,
        }
    }

    fn orf(frame: &str, coords: &[(usize, usize)], classes: usize) -> OrfSpec {
        OrfSpec {
            frame: Frame::from_str(frame).unwrap(),
            coords: coords.to_vec(),
            omega_shape: 2.0,
            omega_classes: classes,
        }
    }

    fn trivial_orf_sequence() -> Sequence {
        let table = OrfTable::from_specs([orf("+0", &[(0, 9)], 3)], 9);
        let mut rng = StdRng::seed_from_u64(7);
        Sequence::new(&dna("ATGAAATAG"), table, params(), &mut rng).unwrap()
    }

    #[test]
    fn test_rejects_short_sequence() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = Sequence::new(&dna("ATGTAG"), OrfTable::default(), params(), &mut rng);
        assert!(matches!(err, Err(SequenceError::SequenceTooShort(6))));
    }

    #[test]
    fn test_rejects_bad_params() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut p = params();
        p.pi = [0.5, 0.5, 0.5, 0.5];
        assert!(matches!(
            Sequence::new(&dna("ATGAAATAG"), OrfTable::default(), p, &mut rng),
            Err(SequenceError::FrequencySum(_))
        ));

        let mut p = params();
        p.kappa = 0.0;
        assert!(Sequence::new(&dna("ATGAAATAG"), OrfTable::default(), p, &mut rng).is_err());
    }

    #[test]
    fn test_no_orf_sequence_has_three_targets_per_site() {
        let mut rng = StdRng::seed_from_u64(1);
        let seq = Sequence::new(&dna("ACGTACGTACGT"), OrfTable::default(), params(), &mut rng)
            .unwrap();
        assert_eq!(seq.admissible_pairs(), 3 * seq.len());
        assert_eq!(seq.event_tree().n_events(), 3 * seq.len());
        // every signature is the empty (no-ORF) one
        assert_eq!(seq.registry().len(), 1);
        assert!(seq.registry().get(SigId(0)).is_empty());
    }

    #[test]
    fn test_trivial_orf_bookkeeping() {
        let seq = trivial_orf_sequence();

        // START and STOP sites can never mutate
        for idx in [0, 1, 2, 6, 7, 8] {
            assert!(seq.site(idx).is_degenerate(), "site {idx}");
            assert_relative_eq!(seq.site(idx).total_rate(), 0.0);
        }

        // middle codon AAA: position 3 loses only its T target (TAA)
        assert!(seq.site(3).rate(T).is_none());
        assert!(seq.site(3).rate(C).is_some());
        assert!(seq.site(3).rate(G).is_some());
        for idx in [4, 5] {
            let admissible = Nucleotide::ALL
                .iter()
                .filter(|&&to| seq.site(idx).rate(to).is_some())
                .count();
            assert_eq!(admissible, 3, "site {idx}");
            assert!(seq.site(idx).total_rate() > 0.0);
        }

        assert_eq!(seq.admissible_pairs(), 8);
        assert_eq!(seq.event_tree().n_events(), 8);
    }

    #[test]
    fn test_rate_composition() {
        let mut p = params();
        p.kappa = 3.0;
        p.pi = [0.1, 0.2, 0.3, 0.4];
        p.mu = vec![2.0];
        let mut rng = StdRng::seed_from_u64(5);
        let seq = Sequence::new(&dna("AAAAAAAAA"), OrfTable::default(), p, &mut rng).unwrap();

        let site = seq.site(0);
        // A→G transition: global · π[A] · μ
        assert_relative_eq!(site.rate(G).unwrap(), 0.05 * 0.1 * 2.0);
        // A→C transversion picks up κ
        assert_relative_eq!(site.rate(C).unwrap(), 0.05 * 0.1 * 3.0 * 2.0);
        assert_relative_eq!(
            site.total_rate(),
            site.rate(C).unwrap() + site.rate(G).unwrap() + site.rate(T).unwrap()
        );
    }

    #[test]
    fn test_overlapping_orfs_have_two_slot_signatures() {
        // all-C payload: no substitution can create a stop, and neither
        // ORF starts with ATG, so every pair stays admissible
        let seq_str = "C".repeat(120);
        let table = OrfTable::from_specs(
            [orf("+0", &[(0, 120)], 2), orf("+1", &[(1, 118)], 2)],
            120,
        );
        let mut rng = StdRng::seed_from_u64(11);
        let seq = Sequence::new(&dna(&seq_str), table, params(), &mut rng).unwrap();

        for idx in 1..118 {
            for to in [A, G, T] {
                let sig = seq.site(idx).signature(to).expect("admissible");
                assert_eq!(seq.registry().get(sig).len(), 2, "site {idx}");
            }
        }

        // both-non-synonymous combinations land in the product registry
        let orf0 = seq.orfs().get(0);
        let orf1 = seq.orfs().get(1);
        let has_double = seq.registry().products().any(|(id, product)| {
            let sig = seq.registry().get(id);
            sig.slots()
                .iter()
                .all(|&(_, slot)| matches!(slot, OmegaSlot::NonSyn(_)))
                && sig.len() == 2
                && {
                    let expected: f64 = sig
                        .slots()
                        .iter()
                        .map(|&(o, slot)| match slot {
                            OmegaSlot::NonSyn(c) => {
                                let orf = if o == 0 { orf0 } else { orf1 };
                                orf.omega_values[c as usize]
                            }
                            OmegaSlot::Syn => 1.0,
                        })
                        .product();
                    (product - expected).abs() < 1e-12
                }
        });
        assert!(has_double);
    }

    #[test]
    fn test_reverse_orf_reads_reverse_complement() {
        // forward strand is the reverse complement of ATGAAATAG
        let table = OrfTable::from_specs([orf("-0", &[(9, 0)], 2)], 9);
        let mut rng = StdRng::seed_from_u64(3);
        let seq = Sequence::new(&dna("CTATTTCAT"), table, params(), &mut rng).unwrap();

        let readings: Vec<String> = seq
            .codons()
            .iter()
            .map(|c| c.reading(seq.sites()).to_string())
            .collect();
        assert_eq!(readings, vec!["ATG", "AAA", "TAG"]);
        assert!(seq.codon(0).is_start(seq.sites()));
        assert!(seq.codon(2).is_stop(seq.sites()));

        // every site belongs to the START or STOP codon except 3..6
        assert_eq!(seq.admissible_pairs(), 8);
    }

    #[test]
    fn test_spliced_reverse_orf() {
        // two-interval reverse splice: [6,12) then [0,6), read backwards.
        // The spliced forward view is CTATTTGGGCAT, whose reverse
        // complement is ATGCCCAAATAG.
        let fwd = dna("GGGCATCTATTT");
        let table = OrfTable::from_specs([orf("-0", &[(12, 6), (6, 0)], 2)], 12);
        let mut rng = StdRng::seed_from_u64(3);
        let seq = Sequence::new(&fwd, table, params(), &mut rng).unwrap();

        let readings: Vec<String> = seq
            .codons()
            .iter()
            .map(|c| c.reading(seq.sites()).to_string())
            .collect();
        assert_eq!(readings, vec!["ATG", "CCC", "AAA", "TAG"]);
        assert!(seq.codon(0).is_start(seq.sites()));
        assert!(seq.codon(3).is_stop(seq.sites()));

        // round-trip: the reverse complement of the spliced forward view
        // is exactly the codon sequence the model reads
        let spliced = dna("CTATTTGGGCAT");
        assert_eq!(
            spliced.reverse_complement().to_string(),
            readings.concat()
        );
    }

    #[test]
    fn test_apply_substitution_repairs_bookkeeping() {
        let mut rng = StdRng::seed_from_u64(9);
        let table = OrfTable::from_specs([orf("+0", &[(0, 12)], 3)], 12);
        let mut seq = Sequence::new(&dna("ATGAAACCCTAG"), table, params(), &mut rng).unwrap();

        let before = seq.event_tree().n_events();
        assert_eq!(before, seq.admissible_pairs());

        // A→G at site 4 keeps the middle codons stop-free
        assert!(seq.site(4).rate(G).is_some());
        seq.apply_substitution(4, G, &mut rng);

        assert_eq!(seq.site(4).base(), G);
        assert_eq!(seq.to_dna().to_string(), "ATGAGACCCTAG");
        assert_eq!(seq.event_tree().n_events(), seq.admissible_pairs());
        let total: f64 = seq.sites().iter().map(Site::total_rate).sum();
        assert_relative_eq!(seq.total_rate(), total, epsilon = 1e-12);
    }

    #[test]
    fn test_circular_neighbors() {
        let mut p = params();
        p.circular = true;
        let mut rng = StdRng::seed_from_u64(2);
        let seq = Sequence::new(&dna("ACGTACGTA"), OrfTable::default(), p, &mut rng).unwrap();

        assert_eq!(seq.left_of(0), Some(8));
        assert_eq!(seq.right_of(8), Some(0));
        assert_eq!(seq.left_of(4), Some(3));
        assert_eq!(seq.right_of(4), Some(5));
    }

    #[test]
    fn test_linear_neighbors_stop_at_the_ends() {
        let mut rng = StdRng::seed_from_u64(2);
        let seq =
            Sequence::new(&dna("ACGTACGTA"), OrfTable::default(), params(), &mut rng).unwrap();
        assert_eq!(seq.left_of(0), None);
        assert_eq!(seq.right_of(8), None);
    }

    #[test]
    fn test_degenerate_stop_codon_site() {
        // middle codon is itself a STOP: all three of its sites are
        // frozen, removing 3 pairs each relative to a stop-free codon
        let table = OrfTable::from_specs([orf("+0", &[(0, 9)], 2)], 9);
        let mut rng = StdRng::seed_from_u64(4);
        let seq = Sequence::new(&dna("AAATAAAAA"), table, params(), &mut rng).unwrap();

        for idx in 3..6 {
            assert!(seq.site(idx).is_degenerate());
        }
        assert_eq!(seq.event_tree().n_events(), seq.admissible_pairs());
    }

    ::quickcheck::quickcheck! {
        fn prop_tree_events_match_admissible_pairs(dna_vec: Vec<Nucleotide>) -> bool {
            let mut bases = dna_vec;
            while bases.len() < 9 {
                bases.push(Nucleotide::A);
            }
            let dna = DnaSequence::new(bases);
            let mut rng = StdRng::seed_from_u64(17);
            let seq = Sequence::new(&dna, OrfTable::default(), params(), &mut rng).unwrap();
            // without ORFs nothing is blocked
            seq.event_tree().n_events() == 3 * seq.len()
                && seq.admissible_pairs() == 3 * seq.len()
        }
    }
}
