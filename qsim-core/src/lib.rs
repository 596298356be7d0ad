//! # ⚛️ qsim-core — Dense State-Vector Simulation
//!
//! Simula circuitos quânticos mantendo o vetor denso de 2^N amplitudes
//! complexas de um registrador de N qubits e aplicando portas unitárias
//! sobre ele.
//!
//! ## Computational Complexity
//!
//! **Gate application — O(2^N):**
//! - Every gate touches each amplitude exactly once, whatever its arity k
//! - A k-qubit gate costs 2^(N-k) groups × 4^k complex multiply-adds
//!
//! **Sampling — O(shots × 2^N):**
//! - Marginal mode reads N marginals once per run, then O(N) per shot
//! - Joint mode draws from the cumulative distribution, O(log 2^N) per shot
//!
//! **Memory:** 8 bytes per amplitude (`Complex<f32>`); 30 qubits = 8 GiB.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 QuantumRegister (trait)                 │
//! │    gate(&Gate, &[qubit]) ── dispatch por aridade        │
//! │       ├── apply_one_qubit_gate                          │
//! │       ├── apply_two_qubit_gate                          │
//! │       └── apply_k_qubit_gate                            │
//! ├──────────────────┬────────────────────┬─────────────────┤
//! │  ScalarRegister  │ VectorizedRegister │ DeviceRegister  │
//! │  (referência)    │  (lanes SIMD)      │ (wgpu, "gpu")   │
//! └──────────────────┴────────────────────┴─────────────────┘
//!           │                  │
//!           └── StateVector ───┘        index: insert_bit / compact_positions
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use qsim_core::{QuantumRegister, ScalarRegister};
//!
//! let mut reg = ScalarRegister::new(2).unwrap();
//! reg.hadamard(0).unwrap();
//! reg.controlled_x(0, 1).unwrap();
//!
//! let probs = reg.probabilities().unwrap();
//! assert!((probs[0] - 0.5).abs() < 1e-6);
//! assert!((probs[3] - 0.5).abs() < 1e-6);
//! ```

pub mod circuits;
pub mod config;
pub mod error;
pub mod gates;
pub mod index;
pub mod io;
pub mod matrix;
pub mod register;
pub mod sampler;
pub mod scalar;
pub mod simd;
pub mod state;

#[cfg(feature = "gpu")]
pub mod gpu;

/// Componente real de uma amplitude
pub type Real = f32;

/// Amplitude complexa
pub type Amplitude = num_complex::Complex<Real>;

pub use config::SimConfig;
pub use error::{QuantumError, QuantumResult};
pub use gates::Gate;
pub use matrix::ComplexMatrix;
pub use register::{Backend, QuantumRegister, create_register};
pub use sampler::{Sampler, SamplingMode};
pub use scalar::ScalarRegister;
pub use simd::VectorizedRegister;
pub use state::{StateVector, random_state};

#[cfg(feature = "gpu")]
pub use gpu::{DeviceRegister, GpuContext, GpuError};
#[cfg(feature = "gpu")]
pub use register::create_device_register;
