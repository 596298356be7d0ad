//! Vetor de estado compartilhado pelos backends de host
//!
//! Os registradores escalar e vetorizado guardam suas amplitudes aqui; só
//! os primitivos de porta diferem entre eles.

use rand::Rng;

use crate::error::{QuantumError, QuantumResult};
use crate::index;
use crate::{Amplitude, Real};

/// Amplitudes de um registrador de `qubits` qubits
#[derive(Clone, Debug, PartialEq)]
pub struct StateVector {
    qubits: usize,
    amplitudes: Vec<Amplitude>,
}

impl StateVector {
    /// Aloca 2^qubits amplitudes no estado |0…0⟩
    pub fn new(qubits: usize) -> QuantumResult<Self> {
        let len = amplitude_count(qubits)?;
        let mut amplitudes = vec![Amplitude::new(0.0, 0.0); len];
        amplitudes[0] = Amplitude::new(1.0, 0.0);

        tracing::debug!(qubits, amplitudes = len, "state vector allocated");
        Ok(Self { qubits, amplitudes })
    }

    pub fn qubits(&self) -> usize {
        self.qubits
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Nunca vazio: um registrador de 0 qubits tem uma amplitude
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    pub fn amplitudes(&self) -> &[Amplitude] {
        &self.amplitudes
    }

    pub fn amplitudes_mut(&mut self) -> &mut [Amplitude] {
        &mut self.amplitudes
    }

    /// Substitui as amplitudes; o comprimento precisa ser exatamente 2^qubits
    pub fn set(&mut self, state: &[Amplitude]) -> QuantumResult<()> {
        if state.len() != self.amplitudes.len() {
            return Err(QuantumError::StateLength {
                expected: self.amplitudes.len(),
                actual: state.len(),
            });
        }
        self.amplitudes.copy_from_slice(state);
        Ok(())
    }

    /// Aplica uma porta de qualquer aridade grupo a grupo (caminho geral)
    ///
    /// Os alvos já devem ter sido validados pelo chamador.
    pub(crate) fn apply_groups(&mut self, matrix: &crate::ComplexMatrix, targets: &[usize]) {
        let k = targets.len();
        let dim = 1usize << k;
        let positions = index::compact_positions(targets);

        let mut indices = vec![0usize; dim];
        let mut local = vec![Amplitude::new(0.0, 0.0); dim];

        for i in 0..(self.amplitudes.len() >> k) {
            index::group_indices(i, &positions, &mut indices);
            for (slot, &g) in local.iter_mut().zip(&indices) {
                *slot = self.amplitudes[g];
            }

            for (r, &g) in indices.iter().enumerate() {
                self.amplitudes[g] = (0..dim).map(|c| matrix.at(r, c) * local[c]).sum();
            }
        }
    }
}

/// Número de amplitudes de um registrador, ou erro se não couber na memória endereçável
pub(crate) fn amplitude_count(qubits: usize) -> QuantumResult<usize> {
    u32::try_from(qubits)
        .ok()
        .and_then(|q| 1usize.checked_shl(q))
        .filter(|len| {
            len.checked_mul(std::mem::size_of::<Amplitude>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or(QuantumError::TooManyQubits(qubits))
}

/// Gera um estado aleatório normalizado de `qubits` qubits
///
/// Cada componente é uniforme em [-1, 1); o vetor é dividido pela raiz da
/// soma dos módulos ao quadrado.
pub fn random_state<G: Rng>(qubits: usize, rng: &mut G) -> QuantumResult<Vec<Amplitude>> {
    let len = amplitude_count(qubits)?;
    let mut state: Vec<Amplitude> = (0..len)
        .map(|_| Amplitude::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect();

    let norm = state.iter().map(|a| a.norm_sqr() as f64).sum::<f64>().sqrt();
    if norm > 0.0 {
        let scale = (1.0 / norm) as Real;
        for a in &mut state {
            *a *= scale;
        }
    } else {
        state[0] = Amplitude::new(1.0, 0.0);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_new_is_ground_state() {
        let s = StateVector::new(3).unwrap();
        assert_eq!(s.len(), 8);
        assert_eq!(s.amplitudes()[0], Amplitude::new(1.0, 0.0));
        assert!(s.amplitudes()[1..].iter().all(|a| *a == Amplitude::new(0.0, 0.0)));
    }

    #[test]
    fn test_zero_qubits() {
        let s = StateVector::new(0).unwrap();
        assert_eq!(s.len(), 1);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_too_many_qubits() {
        assert!(matches!(StateVector::new(200), Err(QuantumError::TooManyQubits(200))));
        assert!(matches!(StateVector::new(63), Err(QuantumError::TooManyQubits(63))));
    }

    #[test]
    fn test_set_length_checked() {
        let mut s = StateVector::new(2).unwrap();
        let err = s.set(&[Amplitude::new(1.0, 0.0); 3]);
        assert!(matches!(err, Err(QuantumError::StateLength { expected: 4, actual: 3 })));
        assert_eq!(s.amplitudes()[0], Amplitude::new(1.0, 0.0));
    }

    #[test]
    fn test_random_state_is_normalized() {
        let mut rng = StdRng::seed_from_u64(7);
        for qubits in [0, 1, 4, 9] {
            let state = random_state(qubits, &mut rng).unwrap();
            assert_eq!(state.len(), 1 << qubits);
            let sum: f64 = state.iter().map(|a| a.norm_sqr() as f64).sum();
            assert!((sum - 1.0).abs() < 1e-5, "{qubits} qubits: sum = {sum}");
        }
    }

    #[test]
    fn test_random_state_reproducible() {
        let a = random_state(3, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = random_state(3, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
