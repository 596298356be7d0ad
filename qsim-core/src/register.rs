//! Contrato de registrador quântico
//!
//! Todo backend implementa os três primitivos (1, 2 e k qubits) e o acesso
//! ao vetor de estado. O restante (despacho por aridade, portas nomeadas com
//! ordenação canônica, dump, arquivo) vem pronto do trait.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QuantumError, QuantumResult};
use crate::gates::Gate;
use crate::{Amplitude, Real, io};

/// Estratégia de execução das portas
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Laço escalar de referência
    #[default]
    Scalar,
    /// Lanes SIMD sobre o mesmo algoritmo de índices
    Vectorized,
    /// Kernels wgpu sobre um buffer residente no dispositivo
    Device,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Scalar, Backend::Vectorized, Backend::Device];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Vectorized => "vectorized",
            Backend::Device => "device",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = QuantumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" | "cpu" => Ok(Backend::Scalar),
            "vectorized" | "simd" => Ok(Backend::Vectorized),
            "device" | "gpu" => Ok(Backend::Device),
            other => Err(QuantumError::Config(format!("unknown backend '{other}'"))),
        }
    }
}

/// Registrador de N qubits
///
/// Os primitivos validam todos os índices antes de tocar nas amplitudes;
/// um erro nunca deixa o estado parcialmente modificado.
pub trait QuantumRegister {
    /// Número de qubits (fixo após a construção)
    fn qubits(&self) -> usize;

    fn backend(&self) -> Backend;

    /// Cópia das 2^N amplitudes
    fn state_vector(&self) -> QuantumResult<Vec<Amplitude>>;

    /// Substitui as amplitudes; `state.len()` precisa ser 2^N
    fn set_state_vector(&mut self, state: &[Amplitude]) -> QuantumResult<()>;

    fn apply_one_qubit_gate(&mut self, gate: &Gate, qubit: usize) -> QuantumResult<()>;

    /// `q0` corresponde ao bit menos significativo do índice local da porta
    fn apply_two_qubit_gate(&mut self, gate: &Gate, q0: usize, q1: usize) -> QuantumResult<()>;

    /// `targets[k]` corresponde ao bit k do índice local da porta
    fn apply_k_qubit_gate(&mut self, gate: &Gate, targets: &[usize]) -> QuantumResult<()>;

    /// Aplica `gate` aos `targets`, despachando pela quantidade de alvos
    fn gate(&mut self, gate: &Gate, targets: &[usize]) -> QuantumResult<()> {
        check_arity(gate, targets.len())?;
        tracing::trace!(gate = gate.name(), ?targets, backend = %self.backend(), "apply");

        match *targets {
            [q] => self.apply_one_qubit_gate(gate, q),
            [q0, q1] => self.apply_two_qubit_gate(gate, q0, q1),
            _ => self.apply_k_qubit_gate(gate, targets),
        }
    }

    // =========================================================================
    // Portas nomeadas
    // =========================================================================

    fn hadamard(&mut self, qubit: usize) -> QuantumResult<()> {
        self.gate(&Gate::hadamard(), &[qubit])
    }

    fn pauli_x(&mut self, qubit: usize) -> QuantumResult<()> {
        self.gate(&Gate::pauli_x(), &[qubit])
    }

    fn pauli_y(&mut self, qubit: usize) -> QuantumResult<()> {
        self.gate(&Gate::pauli_y(), &[qubit])
    }

    fn pauli_z(&mut self, qubit: usize) -> QuantumResult<()> {
        self.gate(&Gate::pauli_z(), &[qubit])
    }

    fn phase(&mut self, qubit: usize, theta: Real) -> QuantumResult<()> {
        self.gate(&Gate::phase(theta), &[qubit])
    }

    fn pi_over_eight(&mut self, qubit: usize) -> QuantumResult<()> {
        self.gate(&Gate::pi_over_eight(), &[qubit])
    }

    /// CNOT; aplicado como porta de 2 qubits com alvos `{target, control}`
    fn controlled_x(&mut self, control: usize, target: usize) -> QuantumResult<()> {
        self.gate(&Gate::controlled_x(), &[target, control])
    }

    fn controlled_y(&mut self, control: usize, target: usize) -> QuantumResult<()> {
        self.gate(&Gate::controlled_y(), &[target, control])
    }

    fn controlled_z(&mut self, control: usize, target: usize) -> QuantumResult<()> {
        self.gate(&Gate::controlled_z(), &[target, control])
    }

    fn controlled_phase(&mut self, control: usize, target: usize, theta: Real) -> QuantumResult<()> {
        self.gate(&Gate::controlled_phase(theta), &[target, control])
    }

    fn swap(&mut self, a: usize, b: usize) -> QuantumResult<()> {
        self.gate(&Gate::swap(), &[b, a])
    }

    /// CCX; aplicado como porta de 3 qubits com alvos `{target, control2, control1}`
    fn toffoli(&mut self, control1: usize, control2: usize, target: usize) -> QuantumResult<()> {
        self.gate(&Gate::toffoli(), &[target, control2, control1])
    }

    // =========================================================================
    // Leitura
    // =========================================================================

    /// Probabilidade de cada estado da base
    fn probabilities(&self) -> QuantumResult<Vec<f64>> {
        Ok(self
            .state_vector()?
            .iter()
            .map(|a| a.norm_sqr() as f64)
            .collect())
    }

    /// Verifica |Σ|a|² - 1| ≤ tolerance
    fn is_normalized(&self, tolerance: f64) -> QuantumResult<()> {
        let sum: f64 = self.probabilities()?.iter().sum();
        if (sum - 1.0).abs() > tolerance {
            tracing::warn!(sum, tolerance, "state vector failed normalization check");
            return Err(QuantumError::NotNormalized(sum));
        }
        Ok(())
    }

    /// Representação textual, uma linha por estado da base
    fn dump(&self) -> QuantumResult<String> {
        Ok(io::dump(&self.state_vector()?, self.qubits()))
    }

    /// Serializa no formato binário de estado
    fn write_state(&self, writer: &mut dyn Write) -> QuantumResult<()> {
        io::write_state(writer, &self.state_vector()?, self.qubits())
    }

    fn to_file(&self, path: &Path) -> QuantumResult<()> {
        io::save(path, &self.state_vector()?, self.qubits())
    }
}

impl<R: QuantumRegister + ?Sized> QuantumRegister for Box<R> {
    fn qubits(&self) -> usize {
        (**self).qubits()
    }

    fn backend(&self) -> Backend {
        (**self).backend()
    }

    fn state_vector(&self) -> QuantumResult<Vec<Amplitude>> {
        (**self).state_vector()
    }

    fn set_state_vector(&mut self, state: &[Amplitude]) -> QuantumResult<()> {
        (**self).set_state_vector(state)
    }

    fn apply_one_qubit_gate(&mut self, gate: &Gate, qubit: usize) -> QuantumResult<()> {
        (**self).apply_one_qubit_gate(gate, qubit)
    }

    fn apply_two_qubit_gate(&mut self, gate: &Gate, q0: usize, q1: usize) -> QuantumResult<()> {
        (**self).apply_two_qubit_gate(gate, q0, q1)
    }

    fn apply_k_qubit_gate(&mut self, gate: &Gate, targets: &[usize]) -> QuantumResult<()> {
        (**self).apply_k_qubit_gate(gate, targets)
    }
}

/// Cria um registrador de host do backend pedido
///
/// O backend de dispositivo precisa de um contexto explícito; veja
/// `create_device_register`.
pub fn create_register(backend: Backend, qubits: usize) -> QuantumResult<Box<dyn QuantumRegister>> {
    match backend {
        Backend::Scalar => Ok(Box::new(crate::ScalarRegister::new(qubits)?)),
        Backend::Vectorized => Ok(Box::new(crate::VectorizedRegister::new(qubits)?)),
        Backend::Device => Err(QuantumError::BackendUnavailable(backend)),
    }
}

/// Cria um registrador de dispositivo sobre um contexto já inicializado
#[cfg(feature = "gpu")]
pub fn create_device_register(
    qubits: usize,
    context: std::sync::Arc<crate::gpu::GpuContext>,
) -> QuantumResult<Box<dyn QuantumRegister>> {
    Ok(Box::new(crate::gpu::DeviceRegister::new(qubits, context)?))
}

/// A porta precisa atuar sobre exatamente `targets` qubits
pub(crate) fn check_arity(gate: &Gate, targets: usize) -> QuantumResult<()> {
    if targets == 0 {
        return Err(QuantumError::NoTargets);
    }
    if gate.qubits() != targets {
        return Err(QuantumError::GateArity {
            gate_qubits: gate.qubits(),
            targets,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScalarRegister;

    #[test]
    fn test_backend_parse_and_display() {
        for backend in Backend::ALL {
            assert_eq!(backend.to_string().parse::<Backend>().unwrap(), backend);
        }
        assert_eq!("SIMD".parse::<Backend>().unwrap(), Backend::Vectorized);
        assert_eq!("gpu".parse::<Backend>().unwrap(), Backend::Device);
        assert!("quantum".parse::<Backend>().is_err());
    }

    #[test]
    fn test_gate_arity_mismatch() {
        let mut reg = ScalarRegister::new(3).unwrap();
        assert!(matches!(
            reg.gate(&Gate::hadamard(), &[0, 1]),
            Err(QuantumError::GateArity { gate_qubits: 1, targets: 2 })
        ));
        assert!(matches!(reg.gate(&Gate::hadamard(), &[]), Err(QuantumError::NoTargets)));
    }

    #[test]
    fn test_invalid_targets_leave_state_untouched() {
        let mut reg = ScalarRegister::new(2).unwrap();
        reg.hadamard(0).unwrap();
        let before = reg.state_vector().unwrap();

        assert!(matches!(
            reg.controlled_x(0, 2),
            Err(QuantumError::QubitOutOfRange { qubit: 2, qubits: 2 })
        ));
        assert!(matches!(reg.swap(1, 1), Err(QuantumError::DuplicateQubit(1))));
        assert_eq!(reg.state_vector().unwrap(), before);
    }

    #[test]
    fn test_create_register() {
        let reg = create_register(Backend::Vectorized, 3).unwrap();
        assert_eq!(reg.backend(), Backend::Vectorized);
        assert_eq!(reg.qubits(), 3);

        assert!(matches!(
            create_register(Backend::Device, 3),
            Err(QuantumError::BackendUnavailable(Backend::Device))
        ));
    }

    #[test]
    fn test_boxed_register_forwards() {
        let mut reg: Box<dyn QuantumRegister> = create_register(Backend::Scalar, 1).unwrap();
        reg.pauli_x(0).unwrap();
        let probs = reg.probabilities().unwrap();
        assert!((probs[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_is_normalized() {
        let mut reg = ScalarRegister::new(2).unwrap();
        assert!(reg.is_normalized(1e-5).is_ok());

        reg.set_state_vector(&[Amplitude::new(1.0, 0.0); 4]).unwrap();
        assert!(matches!(reg.is_normalized(1e-5), Err(QuantumError::NotNormalized(s)) if (s - 4.0).abs() < 1e-9));
    }
}
