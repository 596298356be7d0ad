//! Backend escalar de referência
//!
//! Implementa o algoritmo de grupos para qualquer aridade com aritmética
//! complexa explícita. Os demais backends são comparados contra este.

use crate::error::QuantumResult;
use crate::gates::Gate;
use crate::index::{self, insert_bit};
use crate::register::{Backend, QuantumRegister, check_arity};
use crate::state::StateVector;
use crate::Amplitude;

/// Registrador com primitivos escalares
#[derive(Clone, Debug)]
pub struct ScalarRegister {
    state: StateVector,
}

impl ScalarRegister {
    /// Registrador de `qubits` qubits em |0…0⟩
    pub fn new(qubits: usize) -> QuantumResult<Self> {
        Ok(Self {
            state: StateVector::new(qubits)?,
        })
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }
}

impl QuantumRegister for ScalarRegister {
    fn qubits(&self) -> usize {
        self.state.qubits()
    }

    fn backend(&self) -> Backend {
        Backend::Scalar
    }

    fn state_vector(&self) -> QuantumResult<Vec<Amplitude>> {
        Ok(self.state.amplitudes().to_vec())
    }

    fn set_state_vector(&mut self, state: &[Amplitude]) -> QuantumResult<()> {
        self.state.set(state)
    }

    fn apply_one_qubit_gate(&mut self, gate: &Gate, qubit: usize) -> QuantumResult<()> {
        check_arity(gate, 1)?;
        index::validate_targets(&[qubit], self.qubits())?;

        let m = gate.matrix();
        let (a, b, c, d) = (m.at(0, 0), m.at(0, 1), m.at(1, 0), m.at(1, 1));
        let amps = self.state.amplitudes_mut();

        for i in 0..amps.len() / 2 {
            let i0 = insert_bit(i, 0, qubit);
            let i1 = i0 | (1 << qubit);
            let (x, y) = (amps[i0], amps[i1]);
            amps[i0] = a * x + b * y;
            amps[i1] = c * x + d * y;
        }
        Ok(())
    }

    fn apply_two_qubit_gate(&mut self, gate: &Gate, q0: usize, q1: usize) -> QuantumResult<()> {
        check_arity(gate, 2)?;
        index::validate_targets(&[q0, q1], self.qubits())?;

        let m = gate.matrix();
        let positions = index::compact_positions(&[q0, q1]);
        let amps = self.state.amplitudes_mut();

        for i in 0..amps.len() / 4 {
            let g: [usize; 4] = std::array::from_fn(|j| index::group_index(i, j, &positions));
            let x: [Amplitude; 4] = g.map(|idx| amps[idx]);

            for (r, &idx) in g.iter().enumerate() {
                amps[idx] = m.at(r, 0) * x[0] + m.at(r, 1) * x[1] + m.at(r, 2) * x[2] + m.at(r, 3) * x[3];
            }
        }
        Ok(())
    }

    fn apply_k_qubit_gate(&mut self, gate: &Gate, targets: &[usize]) -> QuantumResult<()> {
        check_arity(gate, targets.len())?;
        index::validate_targets(targets, self.qubits())?;

        self.state.apply_groups(gate.matrix(), targets);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuantumError;
    use std::f32::consts::FRAC_1_SQRT_2;

    fn assert_state(reg: &ScalarRegister, expected: &[(f32, f32)]) {
        let state = reg.state_vector().unwrap();
        for (i, (a, &(re, im))) in state.iter().zip(expected).enumerate() {
            assert!(
                (a.re - re).abs() < 1e-6 && (a.im - im).abs() < 1e-6,
                "amplitude {i}: got {a}, expected {re}+{im}i"
            );
        }
    }

    #[test]
    fn test_hadamard_superposition() {
        let mut reg = ScalarRegister::new(1).unwrap();
        reg.hadamard(0).unwrap();
        assert_state(&reg, &[(FRAC_1_SQRT_2, 0.0), (FRAC_1_SQRT_2, 0.0)]);
    }

    #[test]
    fn test_pauli_x_on_high_qubit() {
        let mut reg = ScalarRegister::new(3).unwrap();
        reg.pauli_x(2).unwrap();
        let probs = reg.probabilities().unwrap();
        assert!((probs[0b100] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bell_state() {
        let mut reg = ScalarRegister::new(2).unwrap();
        reg.hadamard(0).unwrap();
        reg.controlled_x(0, 1).unwrap();
        assert_state(
            &reg,
            &[(FRAC_1_SQRT_2, 0.0), (0.0, 0.0), (0.0, 0.0), (FRAC_1_SQRT_2, 0.0)],
        );
    }

    #[test]
    fn test_cnot_target_below_control() {
        // |10⟩ com controle no qubit 1 → |11⟩
        let mut reg = ScalarRegister::new(2).unwrap();
        reg.pauli_x(1).unwrap();
        reg.controlled_x(1, 0).unwrap();
        let probs = reg.probabilities().unwrap();
        assert!((probs[0b11] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_swap() {
        let mut reg = ScalarRegister::new(3).unwrap();
        reg.pauli_x(0).unwrap();
        reg.swap(0, 2).unwrap();
        let probs = reg.probabilities().unwrap();
        assert!((probs[0b100] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_k_qubit_matches_two_qubit_path() {
        let mut a = ScalarRegister::new(3).unwrap();
        let mut b = ScalarRegister::new(3).unwrap();
        for reg in [&mut a, &mut b] {
            reg.hadamard(0).unwrap();
            reg.hadamard(2).unwrap();
            reg.phase(2, 0.4).unwrap();
        }

        a.apply_two_qubit_gate(&Gate::controlled_y(), 2, 0).unwrap();
        b.apply_k_qubit_gate(&Gate::controlled_y(), &[2, 0]).unwrap();

        let (sa, sb) = (a.state_vector().unwrap(), b.state_vector().unwrap());
        for (x, y) in sa.iter().zip(&sb) {
            assert!((x - y).norm() < 1e-6);
        }
    }

    #[test]
    fn test_primitive_rejects_wrong_arity() {
        let mut reg = ScalarRegister::new(2).unwrap();
        assert!(matches!(
            reg.apply_one_qubit_gate(&Gate::swap(), 0),
            Err(QuantumError::GateArity { gate_qubits: 2, targets: 1 })
        ));
    }
}
