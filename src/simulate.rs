// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gillespie simulation of substitutions along a single branch.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Instant;

use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::errors::TreeError;
use crate::sequence::Sequence;

/// A shared flag checked between Gillespie steps and before each node
/// handoff. Cancelling aborts the current branch cleanly.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Evolve `seq` in place along a branch of the given length.
///
/// Each step draws an exponential waiting time at the sequence's
/// aggregate rate, samples a substitution from the event tree, applies
/// it, and repairs the bookkeeping. Stops once the accumulated waiting
/// time overruns the branch. Returns the number of substitutions applied.
///
/// A sequence whose aggregate rate is zero (every site degenerate)
/// propagates unchanged.
pub fn evolve_branch<R: Rng>(
    seq: &mut Sequence,
    branch_length: f64,
    rng: &mut R,
    cancel: &CancelToken,
    deadline: Option<Instant>,
) -> Result<usize, TreeError> {
    let mut elapsed = 0.0;
    let mut events = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(TreeError::Cancelled);
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(TreeError::Timeout);
            }
        }

        // Exp::new rejects a non-positive rate, which is exactly the
        // all-degenerate no-op case.
        let Ok(waiting) = Exp::new(seq.total_rate()) else {
            break;
        };
        elapsed += waiting.sample(rng);
        if elapsed > branch_length {
            break;
        }

        let Some(event) = seq.sample_event(rng) else {
            break;
        };
        seq.apply_substitution(event.site, event.to, rng);
        events += 1;
    }

    log::debug!("branch of length {branch_length}: {events} substitutions");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::time::{Duration, Instant};

    use rand::{rngs::StdRng, SeedableRng};

    use crate::nucleotide::DnaSequence;
    use crate::orf::{Frame, OrfSpec, OrfTable};
    use crate::sequence::ModelParams;

    use super::*;

    fn params() -> ModelParams {
        ModelParams {
            kappa: 1.0,
            global_rate: 1.0,
            pi: [0.25; 4],
            mu: vec![1.0],
            circular: false,
        }
    }

    fn build(seq: &str, orfs: OrfTable, seed: u64) -> Sequence {
        let dna = DnaSequence::from_str(seq).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        Sequence::new(&dna, orfs, params(), &mut rng).unwrap()
    }

    #[test]
    fn test_zero_length_branch_is_identity() {
        let mut seq = build("ACGTACGTACGT", OrfTable::default(), 1);
        let mut rng = StdRng::seed_from_u64(2);
        let events =
            evolve_branch(&mut seq, 0.0, &mut rng, &CancelToken::new(), None).unwrap();
        assert_eq!(events, 0);
        assert_eq!(seq.to_dna().to_string(), "ACGTACGTACGT");
    }

    #[test]
    fn test_long_branch_mutates() {
        let mut seq = build("ACGTACGTACGTACGTACGT", OrfTable::default(), 1);
        let mut rng = StdRng::seed_from_u64(2);
        let events =
            evolve_branch(&mut seq, 5.0, &mut rng, &CancelToken::new(), None).unwrap();
        assert!(events > 0);
        assert_ne!(seq.to_dna().to_string(), "ACGTACGTACGTACGTACGT");
    }

    #[test]
    fn test_all_degenerate_sequence_is_a_no_op() {
        // START, STOP, STOP: every site is frozen
        let orfs = OrfTable::from_specs(
            [OrfSpec {
                frame: Frame::Plus0,
                coords: vec![(0, 9)],
                omega_shape: 2.0,
                omega_classes: 3,
            }],
            9,
        );
        let mut seq = build("ATGTAATAG", orfs, 1);
        assert_eq!(seq.total_rate(), 0.0);

        let mut rng = StdRng::seed_from_u64(2);
        let events =
            evolve_branch(&mut seq, 100.0, &mut rng, &CancelToken::new(), None).unwrap();
        assert_eq!(events, 0);
        assert_eq!(seq.to_dna().to_string(), "ATGTAATAG");
    }

    #[test]
    fn test_cancellation() {
        let mut seq = build("ACGTACGTACGT", OrfTable::default(), 1);
        let mut rng = StdRng::seed_from_u64(2);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(matches!(
            evolve_branch(&mut seq, 1.0, &mut rng, &cancel, None),
            Err(TreeError::Cancelled)
        ));
    }

    #[test]
    fn test_deadline() {
        let mut seq = build("ACGTACGTACGT", OrfTable::default(), 1);
        let mut rng = StdRng::seed_from_u64(2);
        let expired = Instant::now() - Duration::from_millis(1);
        assert!(matches!(
            evolve_branch(&mut seq, 1.0, &mut rng, &CancelToken::new(), Some(expired)),
            Err(TreeError::Timeout)
        ));
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let run = || {
            let mut seq = build("ACGTACGTACGTACGTACGT", OrfTable::default(), 1);
            let mut rng = StdRng::seed_from_u64(99);
            evolve_branch(&mut seq, 2.0, &mut rng, &CancelToken::new(), None).unwrap();
            seq.to_dna().to_string()
        };
        assert_eq!(run(), run());
    }
}
