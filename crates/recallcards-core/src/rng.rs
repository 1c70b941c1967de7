// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Random sources and the distributions the scheduler draws from.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The random source used by scheduling passes and interval sampling.
pub type SchedulerRng = ChaCha8Rng;

const EPSILON: f64 = 1e-10;

/// Bound on Marsaglia-Tsang rejection rounds. Acceptance is above 95% per
/// round, so hitting this is practically impossible.
const MAX_GAMMA_ITERATIONS: usize = 1000;

/// A deterministic random source, for tests and reproducible runs.
pub fn seeded(seed: u64) -> SchedulerRng {
    SchedulerRng::seed_from_u64(seed)
}

/// A random source seeded from the operating system.
pub fn from_entropy() -> SchedulerRng {
    SchedulerRng::from_entropy()
}

/// Draw from Beta(alpha, beta) as X / (X + Y) with X ~ Gamma(alpha) and
/// Y ~ Gamma(beta).
pub fn sample_beta<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    let x = sample_gamma(rng, alpha.max(EPSILON));
    let y = sample_gamma(rng, beta.max(EPSILON));
    let sum = x + y;
    if sum > 0.0 && sum.is_finite() {
        x / sum
    } else {
        0.5
    }
}

/// Draw from Gamma(shape, 1) with the Marsaglia-Tsang method.
fn sample_gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64) -> f64 {
    if shape < 1.0 {
        // Gamma(a) = Gamma(a + 1) * U^(1/a)
        let u: f64 = rng.r#gen::<f64>().max(EPSILON);
        return sample_gamma(rng, shape + 1.0) * u.powf(1.0 / shape);
    }
    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    for _ in 0..MAX_GAMMA_ITERATIONS {
        let x = sample_normal(rng);
        let v = 1.0 + c * x;
        if v <= 0.0 {
            continue;
        }
        let v = v * v * v;
        let u: f64 = rng.r#gen();
        let x2 = x * x;
        if u < 1.0 - 0.0331 * x2 * x2 {
            return d * v;
        }
        if u.ln() < 0.5 * x2 + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
    shape
}

/// Standard normal draw via Box-Muller.
fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.r#gen::<f64>().max(EPSILON);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = seeded(7);
        let mut b = seeded(7);
        for _ in 0..10 {
            assert_eq!(sample_beta(&mut a, 3.0, 2.0), sample_beta(&mut b, 3.0, 2.0));
        }
    }

    #[test]
    fn test_beta_samples_in_unit_interval() {
        let mut rng = seeded(1);
        for (alpha, beta) in [(1.0, 1.0), (0.5, 0.5), (2.0, 1.0), (40.0, 3.0)] {
            for _ in 0..1000 {
                let p = sample_beta(&mut rng, alpha, beta);
                assert!((0.0..=1.0).contains(&p), "{p} out of range");
            }
        }
    }

    #[test]
    fn test_beta_mean() {
        let mut rng = seeded(2);
        for (alpha, beta) in [(1.0, 1.0), (6.0, 2.0), (2.0, 9.0), (0.7, 0.4)] {
            let samples: Vec<f64> = (0..20_000).map(|_| sample_beta(&mut rng, alpha, beta)).collect();
            let expected = alpha / (alpha + beta);
            let actual = mean(&samples);
            assert!(
                (actual - expected).abs() < 0.02,
                "Beta({alpha}, {beta}): mean {actual}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_gamma_mean() {
        let mut rng = seeded(3);
        let samples: Vec<f64> = (0..20_000).map(|_| sample_gamma(&mut rng, 4.0)).collect();
        assert!((mean(&samples) - 4.0).abs() < 0.1);
    }
}
