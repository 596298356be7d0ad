//! Amostrador de medições
//!
//! Lê o vetor de estado do registrador e sorteia resultados clássicos,
//! acumulando a frequência de cada estado da base. O registrador nunca
//! colapsa: cada disparo mede a mesma distribuição.
//!
//! ## Modos
//!
//! - [`SamplingMode::Marginal`]: cada qubit é sorteado independentemente a
//!   partir de sua probabilidade marginal de valer 1. Aproximação: ignora
//!   correlações entre qubits emaranhados (um par de Bell produz |01⟩ e
//!   |10⟩ com 25% cada).
//! - [`SamplingMode::Joint`]: sorteia um estado da base completo a partir
//!   da distribuição conjunta |a_i|². Estatística exata de uma medição
//!   projetiva.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::QuantumResult;
use crate::io::ket_label;
use crate::register::QuantumRegister;

/// Estratégia de sorteio de cada disparo
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SamplingMode {
    #[default]
    Marginal,
    Joint,
}

/// Amostrador; detém o registrador com exclusividade
pub struct Sampler<R: QuantumRegister> {
    register: R,
    counts: Vec<u64>,
    rng: StdRng,
    mode: SamplingMode,
}

impl<R: QuantumRegister> Sampler<R> {
    /// Amostrador com semente de entropia do sistema
    pub fn new(register: R) -> Self {
        Self::with_rng(register, StdRng::from_entropy())
    }

    /// Amostrador reprodutível
    pub fn with_seed(register: R, seed: u64) -> Self {
        Self::with_rng(register, StdRng::seed_from_u64(seed))
    }

    fn with_rng(register: R, rng: StdRng) -> Self {
        let states = 1usize << register.qubits();
        Self {
            register,
            counts: vec![0; states],
            rng,
            mode: SamplingMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: SamplingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Executa `shots` medições e acumula as contagens
    pub fn run(&mut self, shots: u64) -> QuantumResult<()> {
        let probabilities = self.register.probabilities()?;
        tracing::debug!(shots, mode = ?self.mode, qubits = self.register.qubits(), "sampling");

        match self.mode {
            SamplingMode::Marginal => self.run_marginal(&probabilities, shots),
            SamplingMode::Joint => self.run_joint(&probabilities, shots),
        }
        Ok(())
    }

    fn run_marginal(&mut self, probabilities: &[f64], shots: u64) {
        let qubits = self.register.qubits();
        let marginals: Vec<f64> = (0..qubits)
            .map(|b| {
                probabilities
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| (i >> b) & 1 == 1)
                    .map(|(_, p)| p)
                    .sum()
            })
            .collect();

        for _ in 0..shots {
            let outcome = marginals
                .iter()
                .enumerate()
                .filter(|&(_, &p)| self.rng.gen_range(0.0..1.0) < p)
                .fold(0usize, |acc, (b, _)| acc | (1 << b));
            self.counts[outcome] += 1;
        }
    }

    fn run_joint(&mut self, probabilities: &[f64], shots: u64) {
        let cumulative: Vec<f64> = probabilities
            .iter()
            .scan(0.0, |acc, p| {
                *acc += p;
                Some(*acc)
            })
            .collect();
        let Some(&total) = cumulative.last() else {
            return;
        };
        if total <= 0.0 {
            return;
        }

        let last = cumulative.len() - 1;
        for _ in 0..shots {
            let r = self.rng.gen_range(0.0..total);
            let outcome = cumulative.partition_point(|&c| c <= r).min(last);
            self.counts[outcome] += 1;
        }
    }

    /// Contagem por estado da base (índice = ket)
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total_shots(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Fração de disparos por estado; zeros se nada foi amostrado
    pub fn frequencies(&self) -> Vec<f64> {
        let total = self.total_shots();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts.iter().map(|&c| c as f64 / total as f64).collect()
    }

    /// Zera as contagens
    pub fn reset(&mut self) {
        self.counts.fill(0);
    }

    pub fn register(&self) -> &R {
        &self.register
    }

    /// Devolve o registrador
    pub fn into_register(self) -> R {
        self.register
    }
}

impl<R: QuantumRegister> fmt::Display for Sampler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qubits = self.register.qubits();
        for (i, (count, freq)) in self.counts.iter().zip(self.frequencies()).enumerate() {
            writeln!(f, "|{}>: {} ({:.2}%)", ket_label(i, qubits), count, freq * 100.0)?;
        }
        Ok(())
    }
}
