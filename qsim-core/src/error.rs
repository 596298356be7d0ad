//! Tipos de erro para qsim-core

use thiserror::Error;

use crate::register::Backend;

/// Resultado customizado para operações quânticas
pub type QuantumResult<T> = Result<T, QuantumError>;

/// Erros que podem ocorrer em operações quânticas
#[derive(Debug, Error)]
pub enum QuantumError {
    #[error("Cannot create quantum logic gate from non-square matrix of size {rows}x{columns}")]
    NonSquareMatrix { rows: usize, columns: usize },

    #[error("Gate dimension {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("All rows must have the same number of columns (row {row} has {found}, expected {expected})")]
    RaggedRows { row: usize, expected: usize, found: usize },

    #[error("Element ({row}, {column}) is out of range for matrix of size {rows}x{columns}")]
    ElementOutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    #[error("Vector of size {vector} cannot be multiplied by matrix of size {rows}x{columns}")]
    DimensionMismatch {
        vector: usize,
        rows: usize,
        columns: usize,
    },

    #[error("Controlled gate of {qubits} qubits exceeds the limit of {max}")]
    GateTooLarge { qubits: usize, max: usize },

    #[error("Cannot apply gate to qubit {qubit} in {qubits}-qubit register")]
    QubitOutOfRange { qubit: usize, qubits: usize },

    #[error("Qubit {0} appears more than once in the target list")]
    DuplicateQubit(usize),

    #[error("A gate needs at least one target qubit")]
    NoTargets,

    #[error("Gate acts on {gate_qubits} qubits but {targets} targets were given")]
    GateArity { gate_qubits: usize, targets: usize },

    #[error("State vector of length {actual} does not fit a register of {expected} amplitudes")]
    StateLength { expected: usize, actual: usize },

    #[error("Register of {0} qubits is too large for this host")]
    TooManyQubits(usize),

    #[error("State vector is not normalized. Sum of probs: {0}")]
    NotNormalized(f64),

    #[error("{backend} backend does not support {arity}-qubit gates")]
    UnsupportedArity { backend: Backend, arity: usize },

    #[error("{0} backend needs an explicit device context")]
    BackendUnavailable(Backend),

    #[error("Invalid state file: {0}")]
    InvalidStateFile(String),

    #[error("Unsupported amplitude precision: {0} bytes per component")]
    UnsupportedPrecision(u8),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "gpu")]
    #[error(transparent)]
    Gpu(#[from] crate::gpu::GpuError),
}
