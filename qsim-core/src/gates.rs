//! # Quantum Gates — Portas Quânticas
//!
//! Uma porta é uma matriz complexa quadrada de dimensão 2^k que atua sobre
//! k qubits. Portas são imutáveis depois de construídas e podem ser
//! compartilhadas livremente entre registradores.
//!
//! ## Catálogo
//!
//! - **Single-qubit**: X, Y, Z (Pauli), H (Hadamard), P(θ) (fase), T (π/8)
//! - **Two-qubit**: SWAP, CX, CY, CZ, CP(θ)
//! - **Three-qubit**: Toffoli (CCX)
//! - **Controle**: [`Gate::make_controlled`] embute uma porta no bloco
//!   inferior direito de uma identidade maior
//!
//! Unitariedade não é verificada na construção; [`Gate::is_unitary`] existe
//! para quem quiser checar.

use std::f32::consts::{FRAC_1_SQRT_2, PI};
use std::fmt;

use crate::error::{QuantumError, QuantumResult};
use crate::matrix::ComplexMatrix;
use crate::{Amplitude, Real};

/// Maior porta controlada que `make_controlled` constrói (matriz de 2^10 × 2^10)
pub const MAX_GATE_QUBITS: usize = 10;

/// Porta lógica quântica
#[derive(Clone, Debug, PartialEq)]
pub struct Gate {
    name: String,
    qubits: usize,
    matrix: ComplexMatrix,
}

impl Gate {
    /// Cria porta a partir de uma matriz quadrada de dimensão 2^k
    pub fn new(matrix: ComplexMatrix) -> QuantumResult<Self> {
        Self::named("U", matrix)
    }

    /// Cria porta com nome
    pub fn named(name: impl Into<String>, matrix: ComplexMatrix) -> QuantumResult<Self> {
        if matrix.rows() != matrix.columns() {
            return Err(QuantumError::NonSquareMatrix {
                rows: matrix.rows(),
                columns: matrix.columns(),
            });
        }

        let dimension = matrix.rows();
        if !dimension.is_power_of_two() {
            return Err(QuantumError::NotPowerOfTwo(dimension));
        }

        Ok(Self {
            name: name.into(),
            qubits: dimension.trailing_zeros() as usize,
            matrix,
        })
    }

    /// Nome da porta
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Número de qubits sobre os quais a porta atua
    pub fn qubits(&self) -> usize {
        self.qubits
    }

    /// Dimensão da matriz (2^qubits)
    pub fn dimension(&self) -> usize {
        self.matrix.rows()
    }

    pub fn matrix(&self) -> &ComplexMatrix {
        &self.matrix
    }

    /// Transposta conjugada (porta inversa para portas unitárias)
    pub fn dagger(&self) -> Gate {
        Gate {
            name: format!("{}†", self.name),
            qubits: self.qubits,
            matrix: self.matrix.dagger(),
        }
    }

    /// Verifica se U·U† ≈ I dentro da tolerância
    pub fn is_unitary(&self, tolerance: Real) -> bool {
        let Ok(product) = self.matrix.mul(&self.matrix.dagger()) else {
            return false;
        };

        let n = self.dimension();
        (0..n).all(|r| {
            (0..n).all(|c| {
                let expected = if r == c { 1.0 } else { 0.0 };
                let v = product.at(r, c);
                (v.re - expected).abs() < tolerance && v.im.abs() < tolerance
            })
        })
    }

    // =========================================================================
    // Catálogo
    // =========================================================================

    /// Pauli-X (NOT quântico)
    pub fn pauli_x() -> Gate {
        fixed("X", &[&[0.0, 1.0], &[1.0, 0.0]])
    }

    /// Pauli-Y
    pub fn pauli_y() -> Gate {
        let i = Amplitude::i();
        let o = Amplitude::new(0.0, 0.0);
        complex("Y", [[o, -i], [i, o]])
    }

    /// Pauli-Z (phase flip)
    pub fn pauli_z() -> Gate {
        fixed("Z", &[&[1.0, 0.0], &[0.0, -1.0]])
    }

    /// Hadamard: cria superposição
    pub fn hadamard() -> Gate {
        let h = FRAC_1_SQRT_2;
        fixed("H", &[&[h, h], &[h, -h]])
    }

    /// Fase: |1⟩ → e^(iθ)|1⟩
    pub fn phase(theta: Real) -> Gate {
        diagonal_phase("P", 2, theta)
    }

    /// Porta π/8 (T)
    pub fn pi_over_eight() -> Gate {
        diagonal_phase("T", 2, PI / 4.0)
    }

    pub fn swap() -> Gate {
        fixed(
            "SWAP",
            &[
                &[1.0, 0.0, 0.0, 0.0],
                &[0.0, 0.0, 1.0, 0.0],
                &[0.0, 1.0, 0.0, 0.0],
                &[0.0, 0.0, 0.0, 1.0],
            ],
        )
    }

    /// CNOT; o controle é o qubit mais significativo do par
    pub fn controlled_x() -> Gate {
        controlled_catalog("CX", Gate::pauli_x())
    }

    pub fn controlled_y() -> Gate {
        controlled_catalog("CY", Gate::pauli_y())
    }

    pub fn controlled_z() -> Gate {
        controlled_catalog("CZ", Gate::pauli_z())
    }

    /// Fase controlada: só |11⟩ recebe e^(iθ)
    pub fn controlled_phase(theta: Real) -> Gate {
        diagonal_phase("CP", 4, theta)
    }

    /// Toffoli (CCX); os dois controles são os qubits mais significativos
    pub fn toffoli() -> Gate {
        let mut gate = embed_controlled(&Gate::pauli_x(), 2);
        gate.name = "CCX".into();
        gate
    }

    /// Constrói versão controlada de `gate` com `controls` qubits de controle
    ///
    /// O resultado tem dimensão 2^(k+c): identidade nas primeiras
    /// `2^(k+c) - 2^k` entradas diagonais e a porta original no bloco
    /// inferior direito. A porta só atua quando todos os controles valem 1.
    ///
    /// k + c acima de [`MAX_GATE_QUBITS`] retorna `GateTooLarge`.
    pub fn make_controlled(gate: &Gate, controls: usize) -> QuantumResult<Gate> {
        let qubits = gate.qubits.saturating_add(controls);
        if controls > 0 && qubits > MAX_GATE_QUBITS {
            return Err(QuantumError::GateTooLarge {
                qubits,
                max: MAX_GATE_QUBITS,
            });
        }
        Ok(embed_controlled(gate, controls))
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-qubit)", self.name, self.qubits)
    }
}

// As tabelas do catálogo são quadradas e de dimensão potência de dois.
fn fixed(name: &str, rows: &[&[Real]]) -> Gate {
    let n = rows.len();
    let mut matrix = ComplexMatrix::zeros(n, n);
    for (r, row) in rows.iter().enumerate() {
        for (c, &re) in row.iter().enumerate() {
            matrix.put(r, c, Amplitude::new(re, 0.0));
        }
    }
    catalog(name, matrix)
}

fn complex(name: &str, rows: [[Amplitude; 2]; 2]) -> Gate {
    let mut matrix = ComplexMatrix::zeros(2, 2);
    for (r, row) in rows.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            matrix.put(r, c, v);
        }
    }
    catalog(name, matrix)
}

fn catalog(name: &str, matrix: ComplexMatrix) -> Gate {
    let qubits = matrix.rows().trailing_zeros() as usize;
    Gate {
        name: name.into(),
        qubits,
        matrix,
    }
}

fn diagonal_phase(name: &str, dimension: usize, theta: Real) -> Gate {
    let mut matrix = ComplexMatrix::identity(dimension);
    matrix.put(dimension - 1, dimension - 1, Amplitude::from_polar(1.0, theta));
    catalog(name, matrix)
}

// Chamadores garantem 2^(k+c) representável.
fn embed_controlled(gate: &Gate, controls: usize) -> Gate {
    if controls == 0 {
        return gate.clone();
    }

    let dim = gate.dimension();
    let size = dim << controls;
    let offset = size - dim;

    let mut matrix = ComplexMatrix::identity(size);
    for r in 0..dim {
        for c in 0..dim {
            matrix.put(offset + r, offset + c, gate.matrix.at(r, c));
        }
    }

    Gate {
        name: format!("{}{}", "C".repeat(controls), gate.name),
        qubits: gate.qubits + controls,
        matrix,
    }
}

fn controlled_catalog(name: &str, target: Gate) -> Gate {
    let mut gate = embed_controlled(&target, 1);
    gate.name = name.into();
    gate
}

// =============================================================================
// Testes
// =============================================================================
