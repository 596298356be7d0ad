//! Matriz complexa densa
//!
//! Contêiner row-major com acesso verificado e produto matriz × vetor.
//! Inicializada com zeros.

use crate::error::{QuantumError, QuantumResult};
use crate::{Amplitude, Real};

/// Matriz de números complexos
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexMatrix {
    rows: usize,
    columns: usize,
    data: Vec<Amplitude>,
}

impl ComplexMatrix {
    /// Cria matriz `rows × columns` preenchida com zeros
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![Amplitude::new(0.0, 0.0); rows * columns],
        }
    }

    /// Matriz identidade `n × n`
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = Amplitude::new(1.0, 0.0);
        }
        m
    }

    /// Cria matriz a partir de linhas
    ///
    /// Todas as linhas precisam ter o mesmo número de colunas.
    pub fn from_rows(rows: Vec<Vec<Amplitude>>) -> QuantumResult<Self> {
        let row_count = rows.len();
        let columns = rows.first().map_or(0, Vec::len);

        let mut data = Vec::with_capacity(row_count * columns);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != columns {
                return Err(QuantumError::RaggedRows {
                    row: i,
                    expected: columns,
                    found: row.len(),
                });
            }
            data.extend(row);
        }

        Ok(Self {
            rows: row_count,
            columns,
            data,
        })
    }

    /// Atalho para matrizes de entradas reais
    pub fn from_real_rows(rows: &[&[Real]]) -> QuantumResult<Self> {
        Self::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|&re| Amplitude::new(re, 0.0)).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Dados em ordem row-major
    pub fn data(&self) -> &[Amplitude] {
        &self.data
    }

    /// Elemento `(row, column)` com verificação de limites
    pub fn get(&self, row: usize, column: usize) -> QuantumResult<Amplitude> {
        self.check_bounds(row, column)?;
        Ok(self.data[row * self.columns + column])
    }

    /// Escreve elemento `(row, column)` com verificação de limites
    pub fn set(&mut self, row: usize, column: usize, value: Amplitude) -> QuantumResult<()> {
        self.check_bounds(row, column)?;
        self.data[row * self.columns + column] = value;
        Ok(())
    }

    /// Acesso sem verificação de `Result`; panics fora dos limites.
    ///
    /// Usado nos laços internos dos backends depois que as dimensões
    /// já foram validadas.
    #[inline]
    pub fn at(&self, row: usize, column: usize) -> Amplitude {
        self.data[row * self.columns + column]
    }

    #[inline]
    pub(crate) fn put(&mut self, row: usize, column: usize, value: Amplitude) {
        self.data[row * self.columns + column] = value;
    }

    /// Produto matriz × vetor
    pub fn mul_vec(&self, vector: &[Amplitude]) -> QuantumResult<Vec<Amplitude>> {
        if vector.len() != self.columns {
            return Err(QuantumError::DimensionMismatch {
                vector: vector.len(),
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.columns == 0 {
            return Ok(vec![Amplitude::new(0.0, 0.0); self.rows]);
        }

        Ok(self
            .data
            .chunks_exact(self.columns)
            .map(|row| row.iter().zip(vector).map(|(m, x)| m * x).sum())
            .collect())
    }

    /// Transposta conjugada (dagger)
    pub fn dagger(&self) -> Self {
        let mut out = Self::zeros(self.columns, self.rows);
        for r in 0..self.rows {
            for c in 0..self.columns {
                out.data[c * self.rows + r] = self.at(r, c).conj();
            }
        }
        out
    }

    /// Produto matriz × matriz
    pub fn mul(&self, other: &ComplexMatrix) -> QuantumResult<ComplexMatrix> {
        if self.columns != other.rows {
            return Err(QuantumError::DimensionMismatch {
                vector: other.rows,
                rows: self.rows,
                columns: self.columns,
            });
        }

        let mut out = Self::zeros(self.rows, other.columns);
        for r in 0..self.rows {
            for c in 0..other.columns {
                out.data[r * other.columns + c] =
                    (0..self.columns).map(|k| self.at(r, k) * other.at(k, c)).sum();
            }
        }
        Ok(out)
    }

    fn check_bounds(&self, row: usize, column: usize) -> QuantumResult<()> {
        if row >= self.rows || column >= self.columns {
            return Err(QuantumError::ElementOutOfRange {
                row,
                column,
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(())
    }
}
