//! # 🎮 GPU Backend — Registrador no Dispositivo
//!
//! Aceleração via wgpu: o vetor de estado vive num storage buffer
//! (`vec2<f32>` por amplitude) e cada porta é um dispatch de compute
//! shader que trata um grupo de amplitudes por invocação.
//!
//! ## Limites
//!
//! - Índices são `u32` no kernel: no máximo [`MAX_DEVICE_QUBITS`] qubits,
//!   e menos se o adaptador limitar o tamanho de storage buffers
//! - Portas de 1 e 2 qubits; k ≥ 3 retorna `UnsupportedArity`
//!
//! ## Uso
//!
//! ```ignore
//! use std::sync::Arc;
//! use qsim_core::{DeviceRegister, GpuContext, QuantumRegister};
//!
//! let ctx = Arc::new(GpuContext::new_sync()?);
//! let mut reg = DeviceRegister::new(20, ctx)?;
//! reg.hadamard(0)?;
//! let state = reg.state_vector()?;
//! ```

mod context;
mod register;
mod shaders;

pub use context::GpuContext;
pub use register::{DeviceRegister, MAX_DEVICE_QUBITS};
pub use shaders::REGISTER_KERNEL;

use std::sync::OnceLock;

/// Erro de GPU
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("GPU não disponível")]
    NoAdapter,

    #[error("Falha ao criar device: {0}")]
    DeviceCreation(String),

    #[error("Kernel inválido: {0}")]
    KernelBuild(String),

    #[error("Falha ao mapear buffer: {0}")]
    BufferMapping(String),

    #[error("Timeout na execução GPU")]
    Timeout,

    #[error("{qubits} qubits excedem o limite do dispositivo ({max})")]
    TooManyQubits { qubits: usize, max: usize },
}

/// Resultado GPU
pub type GpuResult<T> = Result<T, GpuError>;

/// Cache estático de disponibilidade de GPU
static GPU_AVAILABLE: OnceLock<bool> = OnceLock::new();

impl GpuContext {
    /// Verifica se há adaptador disponível (com cache)
    pub fn is_available() -> bool {
        *GPU_AVAILABLE.get_or_init(|| {
            let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            pollster::block_on(async {
                instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: None,
                        force_fallback_adapter: false,
                    })
                    .await
                    .is_some()
            })
        })
    }
}
