// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discretization of rate distributions into equal-probability categories.
//!
//! Both ω classes (per ORF) and μ base-rate categories (per sequence) are
//! drawn from a distribution collapsed to `ncat` representative values:
//! the distribution is cut at its `i/n` quantiles and each bin is replaced
//! by its conditional mean, so the categories average out to the
//! distribution mean.

use statrs::distribution::{ContinuousCDF, Gamma, LogNormal};

use crate::errors::SequenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscreteDist {
    /// Gamma with the given shape and scale `1/shape` (unit mean).
    Gamma,
    /// Lognormal with `s = shape` and scale `exp(shape²/2)`.
    LogNormal,
}

/// Produce `ncat` ascending category values for the given shape.
///
/// Value `i` is `ncat · ∫ x·f(x) dx` over the bin between the `i/ncat`
/// and `(i+1)/ncat` quantiles; the final bin runs to +∞.
pub fn discretize(shape: f64, ncat: usize, dist: DiscreteDist) -> Result<Vec<f64>, SequenceError> {
    if ncat == 0 {
        return Err(SequenceError::NoRateCategories);
    }
    if !(shape > 0.0) || !shape.is_finite() {
        return Err(SequenceError::NonPositive {
            param: "shape",
            value: shape,
        });
    }

    let bad_shape = |_| SequenceError::NonPositive {
        param: "shape",
        value: shape,
    };

    match dist {
        DiscreteDist::Gamma => {
            let quantiles = Gamma::new(shape, shape).map_err(bad_shape)?;
            // The size-biased identity: x·f_α(x) integrates to F_{α+1}(x)
            // for a gamma at unit mean.
            let biased = Gamma::new(shape + 1.0, shape).map_err(bad_shape)?;
            Ok(bin_means(ncat, 1.0, &quantiles, &biased))
        }
        DiscreteDist::LogNormal => {
            let sigma = shape;
            let location = 0.5 * sigma * sigma;
            let quantiles = LogNormal::new(location, sigma).map_err(bad_shape)?;
            // x·f(x) for LN(μ, σ) integrates to E[X]·F_{LN(μ+σ², σ)}(x).
            let biased = LogNormal::new(location + sigma * sigma, sigma).map_err(bad_shape)?;
            let mean = (sigma * sigma).exp();
            Ok(bin_means(ncat, mean, &quantiles, &biased))
        }
    }
}

fn bin_means<Q, B>(ncat: usize, mean: f64, quantiles: &Q, biased: &B) -> Vec<f64>
where
    Q: ContinuousCDF<f64, f64>,
    B: ContinuousCDF<f64, f64>,
{
    let n = ncat as f64;
    let mut values = Vec::with_capacity(ncat);
    let mut below = 0.0;

    for i in 1..=ncat {
        let above = if i == ncat {
            1.0
        } else {
            biased.cdf(quantiles.inverse_cdf(i as f64 / n))
        };
        values.push(n * mean * (above - below));
        below = above;
    }

    values
}
