//! Reconstruction of the global distribution
//!
//! Every variant contributes its empirical probability vector weighted by a
//! signed tomographic coefficient: `(−1)^h / 16^C`, where `C` is the number
//! of cuts and `h` counts the X/Y bases in the variant's out-combo. The sign
//! is computed from the structured basis assignment, never from the name.
//!
//! Two modes assemble the contributions:
//!
//! - **Full definition (FD)**: one Kronecker-product term per element of the
//!   cartesian product of the subcircuits' variant sets, summed into a dense
//!   vector of length 2^(Σ mᵢ). Terms evaluate in parallel.
//! - **Dynamic definition (DD)**: the global vector is built entry by entry;
//!   each global index splits into per-subcircuit local indices (subcircuit
//!   0 in the most significant bits, matching the FD Kronecker order) and
//!   only the sparse non-zero contributions are combined.
//!
//! If the accumulated vector sums to (near) zero the result is the zero
//! vector with a warning, never a division by zero.

use crate::{MeasBasis, Result, RuntimeError, VariantDistribution};
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::warn;

/// Below this magnitude an accumulated vector counts as cancelled
const NORMALISATION_EPS: f64 = 1e-12;

/// The signed coefficient of one variant: `(−1)^h · κ` with `h` the number
/// of X/Y measurement bases
pub fn effective_coefficient(measured_info: &BTreeMap<usize, MeasBasis>, base_coeff: f64) -> f64 {
    let signed = measured_info.values().filter(|b| b.is_signed()).count();
    if signed % 2 == 0 {
        base_coeff
    } else {
        -base_coeff
    }
}

/// Expand a probability table into a dense vector of length 2^m, indexed by
/// the big-endian integer value of the bitstring
pub fn probability_vector(
    probabilities: &BTreeMap<String, f64>,
    num_qubits: usize,
) -> Result<Vec<f64>> {
    let mut vec = vec![0.0; 1 << num_qubits];
    for (bitstring, &prob) in probabilities {
        let index = usize::from_str_radix(bitstring, 2).map_err(|_| RuntimeError::Shape {
            variant: String::new(),
            bitstring: bitstring.clone(),
            expected: num_qubits,
            actual: bitstring.len(),
        })?;
        vec[index] = prob;
    }
    Ok(vec)
}

/// One variant's processed contribution
struct Contribution {
    vec: Vec<f64>,
    coeff: f64,
    num_qubits: usize,
}

/// Group contributions by subcircuit, ascending by id
fn group_by_subcircuit(
    distributions: &BTreeMap<String, VariantDistribution>,
    base_coeff: f64,
) -> Result<Vec<(usize, Vec<Contribution>)>> {
    let mut grouped: BTreeMap<usize, Vec<Contribution>> = BTreeMap::new();
    for dist in distributions.values() {
        let num_qubits = dist.active_qubits.len();
        grouped.entry(dist.sub_id).or_default().push(Contribution {
            vec: probability_vector(&dist.probabilities, num_qubits)?,
            coeff: effective_coefficient(&dist.measured_info, base_coeff),
            num_qubits,
        });
    }
    Ok(grouped.into_iter().collect())
}

fn normalise(mut vec: Vec<f64>) -> Vec<f64> {
    let total: f64 = vec.iter().sum();
    if total.abs() <= NORMALISATION_EPS {
        warn!(
            total,
            "reconstructed vector sums to (near) zero; returning the zero vector"
        );
        vec.iter_mut().for_each(|x| *x = 0.0);
        return vec;
    }
    vec.iter_mut().for_each(|x| *x /= total);
    vec
}

fn kron(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(a.len() * b.len());
    for &x in a {
        for &y in b {
            out.push(x * y);
        }
    }
    out
}

/// Full-definition reconstruction
pub fn fd_reconstruct(
    distributions: &BTreeMap<String, VariantDistribution>,
    base_coeff: f64,
) -> Result<Vec<f64>> {
    let groups = group_by_subcircuit(distributions, base_coeff)?;
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let total_qubits: usize = groups.iter().map(|(_, list)| list[0].num_qubits).sum();
    let dim = 1usize << total_qubits;

    // One term per element of the cartesian product across subcircuits
    let terms: Vec<Vec<&Contribution>> = groups
        .iter()
        .map(|(_, list)| list.iter())
        .multi_cartesian_product()
        .collect();

    let accumulated = terms
        .par_iter()
        .map(|combo| {
            // A fully cancelled factor zeroes the whole term
            if combo
                .iter()
                .any(|c| c.vec.iter().all(|&x| x == 0.0))
            {
                return vec![0.0; dim];
            }
            let total_coeff: f64 = combo.iter().map(|c| c.coeff).product();
            let mut term = vec![total_coeff];
            for c in combo {
                term = kron(&term, &c.vec);
            }
            term
        })
        .reduce(
            || vec![0.0; dim],
            |mut acc, term| {
                for (a, t) in acc.iter_mut().zip(&term) {
                    *a += t;
                }
                acc
            },
        );

    Ok(normalise(accumulated))
}

/// Dynamic-definition reconstruction
pub fn dd_reconstruct(
    distributions: &BTreeMap<String, VariantDistribution>,
    base_coeff: f64,
) -> Result<Vec<f64>> {
    let groups = group_by_subcircuit(distributions, base_coeff)?;
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    // Per subcircuit: qubit count plus sparse index → [(value, coeff)]
    let sparse: Vec<(usize, BTreeMap<usize, Vec<(f64, f64)>>)> = groups
        .iter()
        .map(|(_, list)| {
            let num_qubits = list[0].num_qubits;
            let mut entries: BTreeMap<usize, Vec<(f64, f64)>> = BTreeMap::new();
            for contribution in list {
                for (index, &value) in contribution.vec.iter().enumerate() {
                    if value != 0.0 {
                        entries
                            .entry(index)
                            .or_default()
                            .push((value, contribution.coeff));
                    }
                }
            }
            (num_qubits, entries)
        })
        .collect();

    let total_qubits: usize = sparse.iter().map(|(n, _)| n).sum();
    let dim = 1usize << total_qubits;

    let accumulated: Vec<f64> = (0..dim)
        .into_par_iter()
        .map(|global_index| {
            let mut lists: Vec<&Vec<(f64, f64)>> = Vec::with_capacity(sparse.len());
            let mut offset = 0;
            for (width, entries) in &sparse {
                let shift = total_qubits - offset - width;
                let local_index = (global_index >> shift) & ((1 << width) - 1);
                offset += width;
                match entries.get(&local_index) {
                    Some(list) => lists.push(list),
                    // One subcircuit with no contributors zeroes the entry
                    None => return 0.0,
                }
            }

            lists
                .iter()
                .map(|list| list.iter())
                .multi_cartesian_product()
                .map(|combo| {
                    combo
                        .iter()
                        .map(|(value, coeff)| value * coeff)
                        .product::<f64>()
                })
                .sum()
        })
        .collect();

    Ok(normalise(accumulated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InitState;
    use std::collections::BTreeMap as Map;

    fn dist(
        sub_id: usize,
        probabilities: &[(&str, f64)],
        bases: &[(usize, MeasBasis)],
        width: usize,
    ) -> VariantDistribution {
        VariantDistribution {
            sub_id,
            probabilities: probabilities
                .iter()
                .map(|&(k, v)| (k.to_string(), v))
                .collect(),
            total_shots: 1024,
            active_qubits: (0..width).collect(),
            initialized_info: Map::<usize, InitState>::new(),
            measured_info: bases.iter().copied().collect(),
            qbit_map: (0..width).map(|i| (i, i)).collect(),
        }
    }

    #[test]
    fn test_effective_coefficient_sign() {
        let none: Map<usize, MeasBasis> = Map::new();
        assert_eq!(effective_coefficient(&none, 0.25), 0.25);

        let one_x = Map::from([(0, MeasBasis::X)]);
        assert_eq!(effective_coefficient(&one_x, 0.25), -0.25);

        let x_and_y = Map::from([(0, MeasBasis::X), (1, MeasBasis::Y)]);
        assert_eq!(effective_coefficient(&x_and_y, 0.25), 0.25);

        let z_only = Map::from([(0, MeasBasis::Z), (1, MeasBasis::I)]);
        assert_eq!(effective_coefficient(&z_only, 0.25), 0.25);
    }

    #[test]
    fn test_probability_vector_big_endian() {
        let probs = Map::from([("10".to_string(), 0.75), ("01".to_string(), 0.25)]);
        let vec = probability_vector(&probs, 2).unwrap();
        assert_eq!(vec, vec![0.0, 0.25, 0.75, 0.0]);
    }

    #[test]
    fn test_fd_kronecker_of_bell_marginals() {
        // Two cut-free Bell subcircuits: FD is the Kronecker of the marginals
        let distributions = Map::from([
            (
                "sub_0_in__out_".to_string(),
                dist(0, &[("00", 0.5), ("11", 0.5)], &[], 2),
            ),
            (
                "sub_1_in__out_".to_string(),
                dist(1, &[("00", 0.5), ("11", 0.5)], &[], 2),
            ),
        ]);

        let vec = fd_reconstruct(&distributions, 1.0).unwrap();
        assert_eq!(vec.len(), 16);
        for (index, &value) in vec.iter().enumerate() {
            let expected = match index {
                0b0000 | 0b0011 | 0b1100 | 0b1111 => 0.25,
                _ => 0.0,
            };
            assert!(
                (value - expected).abs() < 1e-12,
                "index {index}: {value} != {expected}"
            );
        }
    }

    #[test]
    fn test_dd_matches_fd() {
        let distributions = Map::from([
            (
                "sub_0_in__out_q1-X".to_string(),
                dist(0, &[("0", 0.8), ("1", 0.2)], &[(0, MeasBasis::X)], 1),
            ),
            (
                "sub_0_in__out_q1-Z".to_string(),
                dist(0, &[("0", 0.3), ("1", 0.7)], &[(0, MeasBasis::Z)], 1),
            ),
            (
                "sub_0_in__out_q1-I".to_string(),
                dist(0, &[("0", 0.6), ("1", 0.4)], &[(0, MeasBasis::I)], 1),
            ),
            (
                "sub_1_in_q1-|0>_out_".to_string(),
                dist(1, &[("00", 0.5), ("10", 0.5)], &[], 2),
            ),
        ]);

        let fd = fd_reconstruct(&distributions, 0.25).unwrap();
        let dd = dd_reconstruct(&distributions, 0.25).unwrap();
        assert_eq!(fd.len(), dd.len());
        let fd_sum: f64 = fd.iter().sum();
        assert!((fd_sum - 1.0).abs() < 1e-9);
        for (a, b) in fd.iter().zip(dd.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn test_reconstruction_normalised() {
        let distributions = Map::from([
            (
                "sub_0_in__out_q0-Z".to_string(),
                dist(0, &[("0", 0.6), ("1", 0.4)], &[(0, MeasBasis::Z)], 1),
            ),
            (
                "sub_0_in__out_q0-I".to_string(),
                dist(0, &[("0", 0.5), ("1", 0.5)], &[(0, MeasBasis::I)], 1),
            ),
        ]);
        let vec = fd_reconstruct(&distributions, 0.0625).unwrap();
        let sum: f64 = vec.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cancellation_returns_zero_vector() {
        // Identical vectors with opposite signs cancel exactly
        let distributions = Map::from([
            (
                "sub_0_in__out_q0-I".to_string(),
                dist(0, &[("0", 1.0)], &[(0, MeasBasis::I)], 1),
            ),
            (
                "sub_0_in__out_q0-X".to_string(),
                dist(0, &[("0", 1.0)], &[(0, MeasBasis::X)], 1),
            ),
        ]);

        let fd = fd_reconstruct(&distributions, 1.0).unwrap();
        assert_eq!(fd, vec![0.0, 0.0]);

        let dd = dd_reconstruct(&distributions, 1.0).unwrap();
        assert_eq!(dd, vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_input() {
        let distributions = Map::new();
        assert!(fd_reconstruct(&distributions, 1.0).unwrap().is_empty());
        assert!(dd_reconstruct(&distributions, 1.0).unwrap().is_empty());
    }
}
