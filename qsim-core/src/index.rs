//! # Group decomposition
//!
//! A k-qubit gate partitions the 2^N amplitudes into 2^(N-k) disjoint groups
//! of 2^k amplitudes each. A group is addressed by a group index `i` (the
//! register bits that the gate does not touch, packed together) and a local
//! index `j` (the bits the gate does touch). The global amplitude index is
//! rebuilt by inserting each bit of `j` into `i` at its qubit's position.
//!
//! ```text
//!   i = 0b101   targets = [1, 3]   j = 0b10
//!
//!   insert j₀ = 0 at position 1  →  0b1001
//!   insert j₁ = 1 at position 3  →  0b11001
//! ```
//!
//! Insertions happen in list order, so every later insertion at a lower
//! position shifts the bits already placed. [`compact_positions`] lowers each
//! target's insertion point by the number of later targets below it so that
//! the bit lands at its real qubit position once all insertions are done.
//! Every backend (host or device) uses this same rule.

use std::collections::HashSet;

use crate::error::{QuantumError, QuantumResult};

/// Inserts `bit` into `x` at `position`, shifting the higher bits left by one.
#[inline(always)]
pub fn insert_bit(x: usize, bit: usize, position: usize) -> usize {
    let low = x & ((1usize << position) - 1);
    ((((x >> position) << 1) | bit) << position) | low
}

/// Insertion positions for an ordered list of target qubits.
pub fn compact_positions(targets: &[usize]) -> Vec<usize> {
    targets
        .iter()
        .enumerate()
        .map(|(k, &t)| t - targets[k + 1..].iter().filter(|&&later| later < t).count())
        .collect()
}

/// Global amplitude index of local position `j` inside group `i`.
#[inline]
pub fn group_index(i: usize, j: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(i, |state, (k, &position)| insert_bit(state, (j >> k) & 1, position))
}

/// Fills `out[j]` with the global index of every local position of group `i`.
#[inline]
pub fn group_indices(i: usize, positions: &[usize], out: &mut [usize]) {
    for (j, slot) in out.iter_mut().enumerate() {
        *slot = group_index(i, j, positions);
    }
}

/// Checks a target list against the register width before any mutation:
/// non-empty, every index in range, no repeats.
pub fn validate_targets(targets: &[usize], qubits: usize) -> QuantumResult<()> {
    if targets.is_empty() {
        return Err(QuantumError::NoTargets);
    }

    let mut seen = HashSet::with_capacity(targets.len());
    for &qubit in targets {
        if qubit >= qubits {
            return Err(QuantumError::QubitOutOfRange { qubit, qubits });
        }
        if !seen.insert(qubit) {
            return Err(QuantumError::DuplicateQubit(qubit));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_bit() {
        assert_eq!(insert_bit(0b101, 0, 0), 0b1010);
        assert_eq!(insert_bit(0b101, 1, 0), 0b1011);
        assert_eq!(insert_bit(0b101, 1, 1), 0b1011);
        assert_eq!(insert_bit(0b101, 0, 3), 0b0101);
        assert_eq!(insert_bit(0b101, 1, 3), 0b1101);
        assert_eq!(insert_bit(0, 1, 5), 0b100000);
    }

    #[test]
    fn test_compact_positions() {
        assert_eq!(compact_positions(&[0]), vec![0]);
        assert_eq!(compact_positions(&[1, 0]), vec![0, 0]);
        assert_eq!(compact_positions(&[0, 1]), vec![0, 1]);
        assert_eq!(compact_positions(&[3, 1, 2]), vec![1, 1, 2]);
    }

    #[test]
    fn test_group_index_places_bits_at_target_positions() {
        let targets = [3, 0, 2];
        let positions = compact_positions(&targets);

        for i in 0..(1 << 2) {
            for j in 0..(1 << 3) {
                let g = group_index(i, j, &positions);
                for (k, &t) in targets.iter().enumerate() {
                    assert_eq!((g >> t) & 1, (j >> k) & 1, "i={i} j={j} target {t}");
                }
            }
        }
    }

    #[test]
    fn test_groups_cover_every_index_once() {
        let n = 5;
        for targets in [vec![2], vec![4, 1], vec![0, 3], vec![1, 4, 0], vec![3, 2, 1, 0]] {
            let k = targets.len();
            let positions = compact_positions(&targets);
            let mut seen = vec![false; 1 << n];

            for i in 0..(1 << (n - k)) {
                for j in 0..(1 << k) {
                    let g = group_index(i, j, &positions);
                    assert!(!seen[g], "index {g} produced twice for {targets:?}");
                    seen[g] = true;
                }
            }
            assert!(seen.iter().all(|&s| s), "gaps for {targets:?}");
        }
    }

    #[test]
    fn test_validate_targets() {
        assert!(validate_targets(&[0, 2], 3).is_ok());
        assert!(matches!(validate_targets(&[], 3), Err(QuantumError::NoTargets)));
        assert!(matches!(
            validate_targets(&[0, 3], 3),
            Err(QuantumError::QubitOutOfRange { qubit: 3, qubits: 3 })
        ));
        assert!(matches!(
            validate_targets(&[1, 1], 3),
            Err(QuantumError::DuplicateQubit(1))
        ));
    }
}
