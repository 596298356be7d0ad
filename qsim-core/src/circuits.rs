//! Circuitos prontos: demonstração e teste de velocidade

use std::f32::consts::{FRAC_PI_4, PI};
use std::time::{Duration, Instant};

use crate::error::{QuantumError, QuantumResult};
use crate::index;
use crate::register::QuantumRegister;

/// Qubits usados pelo circuito de demonstração
pub const DEMO_QUBITS: usize = 4;

/// Circuito de demonstração sobre os 4 primeiros qubits
///
/// H em todos os qubits do registrador, depois CX(1,2), CZ(0,3), CY(1,3),
/// CP(0,1,π/3), CX(1,2) e Toffoli(2,1,3).
pub fn demo_circuit(register: &mut dyn QuantumRegister) -> QuantumResult<()> {
    if register.qubits() < DEMO_QUBITS {
        return Err(QuantumError::QubitOutOfRange {
            qubit: DEMO_QUBITS - 1,
            qubits: register.qubits(),
        });
    }

    for q in 0..register.qubits() {
        register.hadamard(q)?;
    }
    register.controlled_x(1, 2)?;
    register.controlled_z(0, 3)?;
    register.controlled_y(1, 3)?;
    register.controlled_phase(0, 1, PI / 3.0)?;
    register.controlled_x(1, 2)?;
    toffoli(register, 2, 1, 3)?;
    Ok(())
}

/// Toffoli, decomposto em H/T/T†/CX quando o backend não aceita 3 qubits
///
/// Retorna `true` se a decomposição foi usada. A decomposição é exata
/// (sem fase global) e usa 6 CX.
pub fn toffoli(
    register: &mut dyn QuantumRegister,
    control1: usize,
    control2: usize,
    target: usize,
) -> QuantumResult<bool> {
    match register.toffoli(control1, control2, target) {
        Err(QuantumError::UnsupportedArity { backend, arity: 3 }) => {
            index::validate_targets(&[target, control2, control1], register.qubits())?;
            tracing::trace!(%backend, control1, control2, target, "toffoli decomposed");
            decomposed_toffoli(register, control1, control2, target)?;
            Ok(true)
        }
        other => other.map(|()| false),
    }
}

fn decomposed_toffoli(register: &mut dyn QuantumRegister, a: usize, b: usize, c: usize) -> QuantumResult<()> {
    register.hadamard(c)?;
    register.controlled_x(b, c)?;
    register.phase(c, -FRAC_PI_4)?;
    register.controlled_x(a, c)?;
    register.pi_over_eight(c)?;
    register.controlled_x(b, c)?;
    register.phase(c, -FRAC_PI_4)?;
    register.controlled_x(a, c)?;
    register.pi_over_eight(b)?;
    register.pi_over_eight(c)?;
    register.hadamard(c)?;
    register.controlled_x(a, b)?;
    register.pi_over_eight(a)?;
    register.phase(b, -FRAC_PI_4)?;
    register.controlled_x(a, b)
}

/// Tempos do teste de velocidade
#[derive(Clone, Copy, Debug, Default)]
pub struct SpeedReport {
    /// H em cada qubit
    pub one_qubit: Duration,
    /// CX(0, q) para q ≥ 1
    pub two_qubit: Duration,
    /// Toffoli(0, 1, q) para q ≥ 2
    pub k_qubit: Duration,
    /// O caminho de 3 qubits foi decomposto em portas de 1 e 2 qubits
    pub k_qubit_decomposed: bool,
}

/// Mede os três caminhos de porta sobre todos os qubits do registrador
///
/// O estado atual do registrador é usado como entrada.
pub fn speed_test(register: &mut dyn QuantumRegister) -> QuantumResult<SpeedReport> {
    let n = register.qubits();
    let mut report = SpeedReport::default();

    let tick = Instant::now();
    for q in 0..n {
        register.hadamard(q)?;
    }
    report.one_qubit = tick.elapsed();

    let tick = Instant::now();
    for q in 1..n {
        register.controlled_x(0, q)?;
    }
    report.two_qubit = tick.elapsed();

    let tick = Instant::now();
    for q in 2..n {
        report.k_qubit_decomposed |= toffoli(register, 0, 1, q)?;
    }
    report.k_qubit = tick.elapsed();

    tracing::debug!(qubits = n, ?report, "speed test finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::Gate;
    use crate::register::Backend;
    use crate::{Amplitude, ScalarRegister, random_state};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Registrador de host com o contrato de aridade do backend de dispositivo
    struct TwoQubitOnly(ScalarRegister);

    impl QuantumRegister for TwoQubitOnly {
        fn qubits(&self) -> usize {
            self.0.qubits()
        }

        fn backend(&self) -> Backend {
            Backend::Device
        }

        fn state_vector(&self) -> QuantumResult<Vec<Amplitude>> {
            self.0.state_vector()
        }

        fn set_state_vector(&mut self, state: &[Amplitude]) -> QuantumResult<()> {
            self.0.set_state_vector(state)
        }

        fn apply_one_qubit_gate(&mut self, gate: &Gate, qubit: usize) -> QuantumResult<()> {
            self.0.apply_one_qubit_gate(gate, qubit)
        }

        fn apply_two_qubit_gate(&mut self, gate: &Gate, q0: usize, q1: usize) -> QuantumResult<()> {
            self.0.apply_two_qubit_gate(gate, q0, q1)
        }

        fn apply_k_qubit_gate(&mut self, gate: &Gate, targets: &[usize]) -> QuantumResult<()> {
            match *targets {
                [q] => self.apply_one_qubit_gate(gate, q),
                [q0, q1] => self.apply_two_qubit_gate(gate, q0, q1),
                _ => Err(QuantumError::UnsupportedArity {
                    backend: Backend::Device,
                    arity: targets.len(),
                }),
            }
        }
    }

    fn assert_same_state(a: &dyn QuantumRegister, b: &dyn QuantumRegister) {
        let (sa, sb) = (a.state_vector().unwrap(), b.state_vector().unwrap());
        for (i, (x, y)) in sa.iter().zip(&sb).enumerate() {
            assert!((x - y).norm() < 1e-5, "amplitude {i}: {x} vs {y}");
        }
    }

    #[test]
    fn test_demo_circuit_without_k_qubit_gates() {
        let initial = random_state(5, &mut StdRng::seed_from_u64(31)).unwrap();
        let mut limited = TwoQubitOnly(ScalarRegister::new(5).unwrap());
        let mut scalar = ScalarRegister::new(5).unwrap();
        limited.set_state_vector(&initial).unwrap();
        scalar.set_state_vector(&initial).unwrap();

        demo_circuit(&mut limited).unwrap();
        demo_circuit(&mut scalar).unwrap();
        assert_same_state(&limited, &scalar);
    }

    #[test]
    fn test_toffoli_decomposition_truth_table() {
        for input in 0..8usize {
            let mut reg = TwoQubitOnly(ScalarRegister::new(3).unwrap());
            for q in 0..3 {
                if (input >> q) & 1 == 1 {
                    reg.pauli_x(q).unwrap();
                }
            }
            assert!(toffoli(&mut reg, 0, 2, 1).unwrap());

            let expected = if input & 0b101 == 0b101 { input ^ 0b010 } else { input };
            let probs = reg.probabilities().unwrap();
            assert!((probs[expected] - 1.0).abs() < 1e-5, "input {input:03b}");
        }

        let mut native = ScalarRegister::new(3).unwrap();
        assert!(!toffoli(&mut native, 0, 2, 1).unwrap());
    }

    #[test]
    fn test_decomposed_toffoli_validates_first() {
        let mut reg = TwoQubitOnly(ScalarRegister::new(3).unwrap());
        reg.hadamard(0).unwrap();
        let before = reg.state_vector().unwrap();

        assert!(matches!(
            toffoli(&mut reg, 0, 0, 2),
            Err(QuantumError::DuplicateQubit(0))
        ));
        assert_eq!(reg.state_vector().unwrap(), before);
    }

    #[test]
    fn test_speed_test_without_k_qubit_gates() {
        let initial = random_state(5, &mut StdRng::seed_from_u64(8)).unwrap();
        let mut limited = TwoQubitOnly(ScalarRegister::new(5).unwrap());
        let mut scalar = ScalarRegister::new(5).unwrap();
        limited.set_state_vector(&initial).unwrap();
        scalar.set_state_vector(&initial).unwrap();

        assert!(speed_test(&mut limited).unwrap().k_qubit_decomposed);
        assert!(!speed_test(&mut scalar).unwrap().k_qubit_decomposed);
        assert_same_state(&limited, &scalar);
    }

    #[test]
    fn test_demo_circuit_keeps_norm() {
        let mut reg = ScalarRegister::new(DEMO_QUBITS).unwrap();
        demo_circuit(&mut reg).unwrap();
        assert!(reg.is_normalized(1e-5).is_ok());
    }

    #[test]
    fn test_demo_circuit_needs_four_qubits() {
        let mut reg = ScalarRegister::new(3).unwrap();
        assert!(matches!(
            demo_circuit(&mut reg),
            Err(QuantumError::QubitOutOfRange { qubit: 3, qubits: 3 })
        ));
    }

    #[test]
    fn test_speed_test_runs() {
        let mut reg = ScalarRegister::new(5).unwrap();
        speed_test(&mut reg).unwrap();
        assert!(reg.is_normalized(1e-5).is_ok());
    }
}
