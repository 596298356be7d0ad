//! Registrador residente na GPU
//!
//! ## Bindings
//!
//! ```text
//! @binding(0)  storage rw   amplitudes   array<vec2<f32>>   2^N
//! @binding(1)  uniform      params       Params             48 bytes
//! @binding(2)  storage r    gate_matrix  array<vec2<f32>>   16 (4×4 row-major)
//! ```
//!
//! Todos os buffers são criados uma vez por registrador; cada porta só
//! reescreve `params` (e `gate_matrix` para 2 qubits) e despacha.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::context::AMPLITUDE_BYTES;
use super::{GpuContext, GpuError, GpuResult};
use crate::config::KERNEL_WORKGROUP_SIZE;
use crate::error::{QuantumError, QuantumResult};
use crate::gates::Gate;
use crate::index;
use crate::register::{Backend, QuantumRegister, check_arity};
use crate::Amplitude;

/// Índices do kernel são u32; o grupo precisa caber com folga
pub const MAX_DEVICE_QUBITS: usize = 30;

/// Limite de workgroups por dimensão de dispatch
const MAX_DISPATCH: u32 = 65_535;

/// Uniform com os parâmetros de uma porta
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
struct GateParams {
    groups: u32,
    p0: u32,
    p1: u32,
    stride: u32,
    /// (m00, m01) e (m10, m11) da porta de 1 qubit
    m0: [f32; 4],
    m1: [f32; 4],
}

/// Registrador cujo vetor de estado vive num buffer do dispositivo
pub struct DeviceRegister {
    context: Arc<GpuContext>,
    qubits: usize,
    state: wgpu::Buffer,
    params: wgpu::Buffer,
    gate_matrix: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    one_qubit: wgpu::ComputePipeline,
    two_qubit: wgpu::ComputePipeline,
}

impl DeviceRegister {
    /// Registrador com o kernel embutido
    pub fn new(qubits: usize, context: Arc<GpuContext>) -> GpuResult<Self> {
        Self::with_kernel_source(qubits, context, super::REGISTER_KERNEL)
    }

    /// Registrador com fonte de kernel alternativa
    ///
    /// A fonte precisa oferecer `applyOneQubitGate` e `applyTwoQubitGate`
    /// com os mesmos bindings do kernel embutido.
    pub fn with_kernel_source(qubits: usize, context: Arc<GpuContext>, source: &str) -> GpuResult<Self> {
        let bytes = check_capacity(qubits, &context)?;
        let device = &context.device;

        let (one_qubit, two_qubit, layout) = build_kernel(device, source)?;

        // Buffers do wgpu nascem zerados; só a amplitude de |0…0⟩ é escrita
        let state = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("State Vector Buffer"),
            size: bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        context.queue.write_buffer(&state, 0, bytemuck::cast_slice(&[1.0f32, 0.0]));

        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Gate Params Buffer"),
            contents: bytemuck::bytes_of(&GateParams::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let gate_matrix = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Gate Matrix Buffer"),
            contents: bytemuck::cast_slice(&[[0.0f32; 2]; 16]),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Register Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: state.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: gate_matrix.as_entire_binding(),
                },
            ],
        });

        tracing::debug!(qubits, bytes, device = %context.describe(), "device register created");

        Ok(Self {
            context,
            qubits,
            state,
            params,
            gate_matrix,
            bind_group,
            one_qubit,
            two_qubit,
        })
    }

    fn amplitude_count(&self) -> usize {
        1 << self.qubits
    }

    /// Escreve os parâmetros, despacha um invocação por grupo e espera
    fn dispatch(&self, pipeline: &wgpu::ComputePipeline, mut params: GateParams) {
        let (wx, wy) = grid(params.groups);
        params.stride = wx * KERNEL_WORKGROUP_SIZE;

        let queue = &self.context.queue;
        queue.write_buffer(&self.params, 0, bytemuck::bytes_of(&params));

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Gate Encoder") });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Gate Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(wx, wy, 1);
        }

        queue.submit(std::iter::once(encoder.finish()));
        self.context.device.poll(wgpu::Maintain::Wait);
    }

    fn read_back(&self) -> GpuResult<Vec<Amplitude>> {
        let device = &self.context.device;
        let size = self.amplitude_count() as u64 * AMPLITUDE_BYTES;

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("State Staging Buffer"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Read Encoder") });
        encoder.copy_buffer_to_buffer(&self.state, 0, &staging_buffer, 0, size);
        self.context.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (tx, rx) = tokio::sync::oneshot::channel();

        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        device.poll(wgpu::Maintain::Wait);

        pollster::block_on(rx)
            .map_err(|_| GpuError::Timeout)?
            .map_err(|e| GpuError::BufferMapping(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let result = bytemuck::cast_slice::<u8, [f32; 2]>(&data)
            .iter()
            .map(|&[re, im]| Amplitude::new(re, im))
            .collect();
        drop(data);
        staging_buffer.unmap();

        Ok(result)
    }
}

impl QuantumRegister for DeviceRegister {
    fn qubits(&self) -> usize {
        self.qubits
    }

    fn backend(&self) -> Backend {
        Backend::Device
    }

    fn state_vector(&self) -> QuantumResult<Vec<Amplitude>> {
        Ok(self.read_back()?)
    }

    fn set_state_vector(&mut self, state: &[Amplitude]) -> QuantumResult<()> {
        let expected = self.amplitude_count();
        if state.len() != expected {
            return Err(QuantumError::StateLength {
                expected,
                actual: state.len(),
            });
        }

        let raw: Vec<[f32; 2]> = state.iter().map(|a| [a.re, a.im]).collect();
        self.context.queue.write_buffer(&self.state, 0, bytemuck::cast_slice(&raw));
        self.context.queue.submit(std::iter::empty());
        self.context.device.poll(wgpu::Maintain::Wait);
        Ok(())
    }

    fn apply_one_qubit_gate(&mut self, gate: &Gate, qubit: usize) -> QuantumResult<()> {
        check_arity(gate, 1)?;
        index::validate_targets(&[qubit], self.qubits)?;

        let m = gate.matrix();
        let (a, b, c, d) = (m.at(0, 0), m.at(0, 1), m.at(1, 0), m.at(1, 1));
        self.dispatch(
            &self.one_qubit,
            GateParams {
                groups: (self.amplitude_count() / 2) as u32,
                p0: qubit as u32,
                m0: [a.re, a.im, b.re, b.im],
                m1: [c.re, c.im, d.re, d.im],
                ..GateParams::default()
            },
        );
        Ok(())
    }

    fn apply_two_qubit_gate(&mut self, gate: &Gate, q0: usize, q1: usize) -> QuantumResult<()> {
        check_arity(gate, 2)?;
        index::validate_targets(&[q0, q1], self.qubits)?;

        let matrix: Vec<[f32; 2]> = gate.matrix().data().iter().map(|v| [v.re, v.im]).collect();
        self.context
            .queue
            .write_buffer(&self.gate_matrix, 0, bytemuck::cast_slice(&matrix));

        let positions = index::compact_positions(&[q0, q1]);
        self.dispatch(
            &self.two_qubit,
            GateParams {
                groups: (self.amplitude_count() / 4) as u32,
                p0: positions[0] as u32,
                p1: positions[1] as u32,
                ..GateParams::default()
            },
        );
        Ok(())
    }

    fn apply_k_qubit_gate(&mut self, gate: &Gate, targets: &[usize]) -> QuantumResult<()> {
        check_arity(gate, targets.len())?;
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

impl Drop for DeviceRegister {
    fn drop(&mut self) {
        self.state.destroy();
    }
}

/// Tamanho do buffer de estado, se couber no dispositivo
fn check_capacity(qubits: usize, context: &GpuContext) -> GpuResult<u64> {
    let max = context.max_state_qubits().min(MAX_DEVICE_QUBITS);
    if qubits > max {
        return Err(GpuError::TooManyQubits { qubits, max });
    }
    Ok((1u64 << qubits) * AMPLITUDE_BYTES)
}

/// Compila o kernel dentro de um escopo de validação
fn build_kernel(
    device: &wgpu::Device,
    source: &str,
) -> GpuResult<(wgpu::ComputePipeline, wgpu::ComputePipeline, wgpu::BindGroupLayout)> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Register Kernel"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Register Bind Group Layout"),
        entries: &[
            // @binding(0): amplitudes (read-write)
            storage(0, false),
            // @binding(1): uniform params
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            // @binding(2): matriz 4×4 (read-only)
            storage(2, true),
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Register Pipeline Layout"),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });

    let pipeline = |entry_point: &str| {
        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(entry_point),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            cache: None,
        })
    };
    let one_qubit = pipeline("applyOneQubitGate");
    let two_qubit = pipeline("applyTwoQubitGate");

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        tracing::error!(%err, "device kernel failed to build");
        return Err(GpuError::KernelBuild(err.to_string()));
    }
    tracing::info!("device kernel built");

    Ok((one_qubit, two_qubit, layout))
}

/// Grade 2-D de workgroups cobrindo `invocations`
fn grid(invocations: u32) -> (u32, u32) {
    let workgroups = invocations.div_ceil(KERNEL_WORKGROUP_SIZE).max(1);
    let x = workgroups.min(MAX_DISPATCH);
    (x, workgroups.div_ceil(x))
}
