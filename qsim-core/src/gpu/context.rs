//! Contexto de dispositivo para registradores de estado
//!
//! Um único buffer de storage guarda o vetor de estado inteiro, então o
//! que importa do adaptador são os limites de buffer: o device é pedido
//! com o maior binding de storage que o adaptador suporta.

use wgpu::{Adapter, Device, DeviceDescriptor, Features, Instance, InstanceDescriptor, Limits, Queue, RequestAdapterOptions};

use super::{GpuError, GpuResult};

/// Bytes de uma amplitude no buffer (dois `f32`)
pub(crate) const AMPLITUDE_BYTES: u64 = std::mem::size_of::<[f32; 2]>() as u64;

/// Device e fila compartilhados entre registradores via `Arc`
///
/// Cada registrador guarda seu próprio buffer de estado e pipelines.
pub struct GpuContext {
    pub(crate) adapter: Adapter,
    pub device: Device,
    pub(crate) queue: Queue,
}

impl GpuContext {
    /// Abre o adaptador de maior desempenho disponível
    pub async fn new() -> GpuResult<Self> {
        let instance = Instance::new(InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let limits = state_buffer_limits(&adapter.limits());
        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = ?info.backend,
            max_binding = limits.max_storage_buffer_binding_size,
            "gpu adapter selected"
        );

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("qsim state device"),
                    required_features: Features::empty(),
                    required_limits: limits,
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

        Ok(Self { adapter, device, queue })
    }

    /// Versão bloqueante de [`GpuContext::new`]
    pub fn new_sync() -> GpuResult<Self> {
        pollster::block_on(Self::new())
    }

    /// Nome do adaptador e backend, para logs e para a CLI
    pub fn describe(&self) -> String {
        let info = self.adapter.get_info();
        format!("{} ({:?})", info.name, info.backend)
    }

    /// Maior buffer de estado que o device aceita, em bytes
    ///
    /// O buffer é ligado inteiro num único binding, então vale o menor
    /// entre o tamanho de buffer e o tamanho de binding.
    pub fn max_state_bytes(&self) -> u64 {
        let limits = self.device.limits();
        (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size)
    }

    /// Maior número de qubits cujo vetor de estado cabe em [`max_state_bytes`](Self::max_state_bytes)
    pub fn max_state_qubits(&self) -> usize {
        (self.max_state_bytes() / AMPLITUDE_BYTES).max(1).ilog2() as usize
    }
}

/// Limites padrão com os tetos de buffer do adaptador
///
/// Os padrões do wgpu (128 MiB de binding) cortariam o registrador em
/// 24 qubits mesmo em placas com mais memória.
fn state_buffer_limits(supported: &Limits) -> Limits {
    Limits {
        max_storage_buffer_binding_size: supported.max_storage_buffer_binding_size,
        max_buffer_size: supported.max_buffer_size,
        ..Limits::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_buffer_limits_take_adapter_ceilings() {
        let supported = Limits {
            max_storage_buffer_binding_size: u32::MAX,
            max_buffer_size: 1 << 34,
            ..Limits::default()
        };
        let limits = state_buffer_limits(&supported);
        assert_eq!(limits.max_storage_buffer_binding_size, u32::MAX);
        assert_eq!(limits.max_buffer_size, 1 << 34);
        assert_eq!(limits.max_bind_groups, Limits::default().max_bind_groups);
    }

    #[test]
    fn test_gpu_context_creation() {
        let Ok(ctx) = GpuContext::new_sync() else {
            println!("GPU não disponível (ok em CI)");
            return;
        };
        println!("GPU: {}", ctx.describe());

        let qubits = ctx.max_state_qubits();
        assert!(qubits > 0);
        assert!((1u64 << qubits) * AMPLITUDE_BYTES <= ctx.max_state_bytes());
    }
}
