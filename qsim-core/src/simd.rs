//! SIMD gate engine
//!
//! Fixed-width data-parallel lanes and the vectorized register built on
//! them.
//!
//! ## Lanes
//!
//! | type     | x86_64 (compile-time feature) | fallback   |
//! |----------|-------------------------------|------------|
//! | `F32x4`  | SSE2 `__m128`                 | `[f32; 4]` |
//! | `F32x8`  | AVX `__m256`                  | `[f32; 8]` |
//! | `U64x2`  | SSE2 `__m128i`                | `[u64; 2]` |
//! | `U64x4`  | AVX2 `__m256i`                | `[u64; 4]` |
//!
//! `mul_add` lowers to a fused multiply-add when `fma` is enabled.
//!
//! ## Complex product in real lanes
//!
//! An amplitude pair `(x, y)` is transformed by `[[a, b], [c, d]]` with
//! four multiply-adds on 4-wide lanes:
//!
//! ```text
//!   ac0 = [a.re, a.im, c.re, c.im]     ac1 = swap_pairs_neg(ac0) = [-a.im, a.re, -c.im, c.re]
//!   bd0 = [b.re, b.im, d.re, d.im]     bd1 = swap_pairs_neg(bd0)
//!
//!   z = ac0·x.re + ac1·x.im + bd0·y.re + bd1·y.im
//!     = [(ax+by).re, (ax+by).im, (cx+dy).re, (cx+dy).im]
//! ```
//!
//! The two-qubit path uses the same identity on 8-wide lanes (one column of
//! the 4×4 matrix per lane); the k-qubit path walks the matrix two rows at a
//! time on 4-wide lanes.

use std::ops::{Add, BitAnd, BitOr, Mul, Shl, Shr};

#[cfg(target_arch = "x86_64")]
#[allow(unused_imports)]
use std::arch::x86_64::*;

use crate::error::QuantumResult;
use crate::gates::Gate;
use crate::index;
use crate::register::{Backend, QuantumRegister, check_arity};
use crate::state::StateVector;
use crate::Amplitude;

// =============================================================================
// F32x4
// =============================================================================

/// Four `f32` lanes
#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
#[derive(Clone, Copy, Debug)]
pub struct F32x4(__m128);

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
impl F32x4 {
    #[inline(always)]
    pub fn splat(v: f32) -> Self {
        Self(unsafe { _mm_set1_ps(v) })
    }

    #[inline(always)]
    pub fn from_array(a: [f32; 4]) -> Self {
        Self(unsafe { _mm_loadu_ps(a.as_ptr()) })
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        unsafe { _mm_storeu_ps(out.as_mut_ptr(), self.0) };
        out
    }

    /// `self * b + c`
    #[inline(always)]
    pub fn mul_add(self, b: Self, c: Self) -> Self {
        #[cfg(target_feature = "fma")]
        {
            Self(unsafe { _mm_fmadd_ps(self.0, b.0, c.0) })
        }
        #[cfg(not(target_feature = "fma"))]
        {
            self * b + c
        }
    }

    /// `[a0, a1, a2, a3]` → `[-a1, a0, -a3, a2]` (multiply each complex pair by i)
    #[inline(always)]
    pub fn swap_pairs_neg(self) -> Self {
        unsafe {
            let swapped = _mm_shuffle_ps::<0xB1>(self.0, self.0);
            Self(_mm_mul_ps(swapped, _mm_setr_ps(-1.0, 1.0, -1.0, 1.0)))
        }
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
impl Add for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(unsafe { _mm_add_ps(self.0, rhs.0) })
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
impl Mul for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(unsafe { _mm_mul_ps(self.0, rhs.0) })
    }
}

/// Four `f32` lanes (portable)
#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
#[derive(Clone, Copy, Debug)]
pub struct F32x4([f32; 4]);

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
impl F32x4 {
    #[inline(always)]
    pub fn splat(v: f32) -> Self {
        Self([v; 4])
    }

    #[inline(always)]
    pub fn from_array(a: [f32; 4]) -> Self {
        Self(a)
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; 4] {
        self.0
    }

    #[inline(always)]
    pub fn mul_add(self, b: Self, c: Self) -> Self {
        Self(std::array::from_fn(|k| self.0[k].mul_add(b.0[k], c.0[k])))
    }

    #[inline(always)]
    pub fn swap_pairs_neg(self) -> Self {
        let a = self.0;
        Self([-a[1], a[0], -a[3], a[2]])
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
impl Add for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|k| self.0[k] + rhs.0[k]))
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
impl Mul for F32x4 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|k| self.0[k] * rhs.0[k]))
    }
}

// =============================================================================
// F32x8
// =============================================================================

/// Eight `f32` lanes
#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
#[derive(Clone, Copy, Debug)]
pub struct F32x8(__m256);

#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
impl F32x8 {
    #[inline(always)]
    pub fn splat(v: f32) -> Self {
        Self(unsafe { _mm256_set1_ps(v) })
    }

    #[inline(always)]
    pub fn from_array(a: [f32; 8]) -> Self {
        Self(unsafe { _mm256_loadu_ps(a.as_ptr()) })
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; 8] {
        let mut out = [0.0f32; 8];
        unsafe { _mm256_storeu_ps(out.as_mut_ptr(), self.0) };
        out
    }

    #[inline(always)]
    pub fn mul_add(self, b: Self, c: Self) -> Self {
        #[cfg(target_feature = "fma")]
        {
            Self(unsafe { _mm256_fmadd_ps(self.0, b.0, c.0) })
        }
        #[cfg(not(target_feature = "fma"))]
        {
            self * b + c
        }
    }

    #[inline(always)]
    pub fn swap_pairs_neg(self) -> Self {
        unsafe {
            let swapped = _mm256_permute_ps::<0xB1>(self.0);
            let sign = _mm256_setr_ps(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
            Self(_mm256_mul_ps(swapped, sign))
        }
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
impl Add for F32x8 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(unsafe { _mm256_add_ps(self.0, rhs.0) })
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
impl Mul for F32x8 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(unsafe { _mm256_mul_ps(self.0, rhs.0) })
    }
}

/// Eight `f32` lanes (portable)
#[cfg(not(all(target_arch = "x86_64", target_feature = "avx")))]
#[derive(Clone, Copy, Debug)]
pub struct F32x8([f32; 8]);

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx")))]
impl F32x8 {
    #[inline(always)]
    pub fn splat(v: f32) -> Self {
        Self([v; 8])
    }

    #[inline(always)]
    pub fn from_array(a: [f32; 8]) -> Self {
        Self(a)
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; 8] {
        self.0
    }

    #[inline(always)]
    pub fn mul_add(self, b: Self, c: Self) -> Self {
        Self(std::array::from_fn(|k| self.0[k].mul_add(b.0[k], c.0[k])))
    }

    #[inline(always)]
    pub fn swap_pairs_neg(self) -> Self {
        let a = self.0;
        Self(std::array::from_fn(|k| if k % 2 == 0 { -a[k + 1] } else { a[k - 1] }))
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx")))]
impl Add for F32x8 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|k| self.0[k] + rhs.0[k]))
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx")))]
impl Mul for F32x8 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|k| self.0[k] * rhs.0[k]))
    }
}

// =============================================================================
// U64x2
// =============================================================================

/// Two `u64` lanes
#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
#[derive(Clone, Copy, Debug)]
pub struct U64x2(__m128i);

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
impl U64x2 {
    #[inline(always)]
    pub fn splat(v: u64) -> Self {
        Self(unsafe { _mm_set1_epi64x(v as i64) })
    }

    #[inline(always)]
    pub fn from_array(a: [u64; 2]) -> Self {
        Self(unsafe { _mm_set_epi64x(a[1] as i64, a[0] as i64) })
    }

    #[inline(always)]
    pub fn to_array(self) -> [u64; 2] {
        let mut out = [0u64; 2];
        unsafe { _mm_storeu_si128(out.as_mut_ptr().cast::<__m128i>(), self.0) };
        out
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
impl BitOr for U64x2 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(unsafe { _mm_or_si128(self.0, rhs.0) })
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
impl BitAnd for U64x2 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(unsafe { _mm_and_si128(self.0, rhs.0) })
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
impl Shl<u32> for U64x2 {
    type Output = Self;
    #[inline(always)]
    fn shl(self, n: u32) -> Self {
        Self(unsafe { _mm_sll_epi64(self.0, _mm_cvtsi64_si128(n as i64)) })
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
impl Shr<u32> for U64x2 {
    type Output = Self;
    #[inline(always)]
    fn shr(self, n: u32) -> Self {
        Self(unsafe { _mm_srl_epi64(self.0, _mm_cvtsi64_si128(n as i64)) })
    }
}

/// Two `u64` lanes (portable)
#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
#[derive(Clone, Copy, Debug)]
pub struct U64x2([u64; 2]);

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
impl U64x2 {
    #[inline(always)]
    pub fn splat(v: u64) -> Self {
        Self([v; 2])
    }

    #[inline(always)]
    pub fn from_array(a: [u64; 2]) -> Self {
        Self(a)
    }

    #[inline(always)]
    pub fn to_array(self) -> [u64; 2] {
        self.0
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
impl BitOr for U64x2 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self([self.0[0] | rhs.0[0], self.0[1] | rhs.0[1]])
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
impl BitAnd for U64x2 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self([self.0[0] & rhs.0[0], self.0[1] & rhs.0[1]])
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
impl Shl<u32> for U64x2 {
    type Output = Self;
    #[inline(always)]
    fn shl(self, n: u32) -> Self {
        Self(self.0.map(|v| v << n))
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "sse2")))]
impl Shr<u32> for U64x2 {
    type Output = Self;
    #[inline(always)]
    fn shr(self, n: u32) -> Self {
        Self(self.0.map(|v| v >> n))
    }
}

// =============================================================================
// U64x4
// =============================================================================

/// Four `u64` lanes
#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
#[derive(Clone, Copy, Debug)]
pub struct U64x4(__m256i);

#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
impl U64x4 {
    #[inline(always)]
    pub fn splat(v: u64) -> Self {
        Self(unsafe { _mm256_set1_epi64x(v as i64) })
    }

    #[inline(always)]
    pub fn from_array(a: [u64; 4]) -> Self {
        Self(unsafe { _mm256_loadu_si256(a.as_ptr().cast::<__m256i>()) })
    }

    #[inline(always)]
    pub fn to_array(self) -> [u64; 4] {
        let mut out = [0u64; 4];
        unsafe { _mm256_storeu_si256(out.as_mut_ptr().cast::<__m256i>(), self.0) };
        out
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
impl BitOr for U64x4 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(unsafe { _mm256_or_si256(self.0, rhs.0) })
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
impl BitAnd for U64x4 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(unsafe { _mm256_and_si256(self.0, rhs.0) })
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
impl Shl<u32> for U64x4 {
    type Output = Self;
    #[inline(always)]
    fn shl(self, n: u32) -> Self {
        Self(unsafe { _mm256_sll_epi64(self.0, _mm_cvtsi64_si128(n as i64)) })
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
impl Shr<u32> for U64x4 {
    type Output = Self;
    #[inline(always)]
    fn shr(self, n: u32) -> Self {
        Self(unsafe { _mm256_srl_epi64(self.0, _mm_cvtsi64_si128(n as i64)) })
    }
}

/// Four `u64` lanes (portable)
#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2")))]
#[derive(Clone, Copy, Debug)]
pub struct U64x4([u64; 4]);

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2")))]
impl U64x4 {
    #[inline(always)]
    pub fn splat(v: u64) -> Self {
        Self([v; 4])
    }

    #[inline(always)]
    pub fn from_array(a: [u64; 4]) -> Self {
        Self(a)
    }

    #[inline(always)]
    pub fn to_array(self) -> [u64; 4] {
        self.0
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2")))]
impl BitOr for U64x4 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|k| self.0[k] | rhs.0[k]))
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2")))]
impl BitAnd for U64x4 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|k| self.0[k] & rhs.0[k]))
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2")))]
impl Shl<u32> for U64x4 {
    type Output = Self;
    #[inline(always)]
    fn shl(self, n: u32) -> Self {
        Self(self.0.map(|v| v << n))
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "avx2")))]
impl Shr<u32> for U64x4 {
    type Output = Self;
    #[inline(always)]
    fn shr(self, n: u32) -> Self {
        Self(self.0.map(|v| v >> n))
    }
}

/// Reports which lane implementations this build uses
pub fn lane_support() -> &'static str {
    if cfg!(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma")) {
        "avx2+fma"
    } else if cfg!(all(target_arch = "x86_64", target_feature = "avx")) {
        "avx"
    } else if cfg!(all(target_arch = "x86_64", target_feature = "sse2")) {
        "sse2"
    } else {
        "portable"
    }
}

// =============================================================================
// Vectorized register
// =============================================================================

/// Register whose gate primitives run on SIMD lanes
#[derive(Clone, Debug)]
pub struct VectorizedRegister {
    state: StateVector,
}

impl VectorizedRegister {
    pub fn new(qubits: usize) -> QuantumResult<Self> {
        Ok(Self {
            state: StateVector::new(qubits)?,
        })
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }
}

#[inline(always)]
fn lanes_of(p: Amplitude, q: Amplitude) -> F32x4 {
    F32x4::from_array([p.re, p.im, q.re, q.im])
}

impl QuantumRegister for VectorizedRegister {
    fn qubits(&self) -> usize {
        self.state.qubits()
    }

    fn backend(&self) -> Backend {
        Backend::Vectorized
    }

    fn state_vector(&self) -> QuantumResult<Vec<Amplitude>> {
        Ok(self.state.amplitudes().to_vec())
    }

    fn set_state_vector(&mut self, state: &[Amplitude]) -> QuantumResult<()> {
        self.state.set(state)
    }

    fn apply_one_qubit_gate(&mut self, gate: &Gate, qubit: usize) -> QuantumResult<()> {
        check_arity(gate, 1)?;
        index::validate_targets(&[qubit], self.qubits())?;

        let m = gate.matrix();
        let ac0 = lanes_of(m.at(0, 0), m.at(1, 0));
        let ac1 = ac0.swap_pairs_neg();
        let bd0 = lanes_of(m.at(0, 1), m.at(1, 1));
        let bd1 = bd0.swap_pairs_neg();

        let t = qubit as u32;
        let low = U64x2::splat((1u64 << t) - 1);
        let sibling = U64x2::from_array([0, 1]);
        let amps = self.state.amplitudes_mut();

        for i in 0..(amps.len() / 2) as u64 {
            let v = U64x2::splat(i);
            let [i0, i1] = ((((v >> t) << 1) | sibling) << t | (v & low)).to_array();
            let (i0, i1) = (i0 as usize, i1 as usize);
            let (x, y) = (amps[i0], amps[i1]);

            let z = ac0 * F32x4::splat(x.re);
            let z = ac1.mul_add(F32x4::splat(x.im), z);
            let z = bd0.mul_add(F32x4::splat(y.re), z);
            let z = bd1.mul_add(F32x4::splat(y.im), z);

            let [r0, m0, r1, m1] = z.to_array();
            amps[i0] = Amplitude::new(r0, m0);
            amps[i1] = Amplitude::new(r1, m1);
        }
        Ok(())
    }

    fn apply_two_qubit_gate(&mut self, gate: &Gate, q0: usize, q1: usize) -> QuantumResult<()> {
        check_arity(gate, 2)?;
        index::validate_targets(&[q0, q1], self.qubits())?;

        let m = gate.matrix();
        let columns: [F32x8; 4] = std::array::from_fn(|c| {
            F32x8::from_array(std::array::from_fn(|k| {
                let v = m.at(k / 2, c);
                if k % 2 == 0 { v.re } else { v.im }
            }))
        });
        let rotated = columns.map(F32x8::swap_pairs_neg);

        let positions = index::compact_positions(&[q0, q1]);
        let (p0, p1) = (positions[0] as u32, positions[1] as u32);
        let low0 = U64x4::splat((1u64 << p0) - 1);
        let low1 = U64x4::splat((1u64 << p1) - 1);
        let bit0 = U64x4::from_array([0, 1, 0, 1]);
        let bit1 = U64x4::from_array([0, 0, 1, 1]);
        let amps = self.state.amplitudes_mut();

        for i in 0..(amps.len() / 4) as u64 {
            let v = U64x4::splat(i);
            let v = (((v >> p0) << 1) | bit0) << p0 | (v & low0);
            let v = (((v >> p1) << 1) | bit1) << p1 | (v & low1);
            let g = v.to_array().map(|idx| idx as usize);

            let mut acc = F32x8::splat(0.0);
            for c in 0..4 {
                let x = amps[g[c]];
                acc = columns[c].mul_add(F32x8::splat(x.re), acc);
                acc = rotated[c].mul_add(F32x8::splat(x.im), acc);
            }

            let out = acc.to_array();
            for (r, &idx) in g.iter().enumerate() {
                amps[idx] = Amplitude::new(out[2 * r], out[2 * r + 1]);
            }
        }
        Ok(())
    }

    fn apply_k_qubit_gate(&mut self, gate: &Gate, targets: &[usize]) -> QuantumResult<()> {
        check_arity(gate, targets.len())?;
        index::validate_targets(targets, self.qubits())?;

        let k = targets.len();
        let dim = 1usize << k;
        let m = gate.matrix();

        // lanes[pair * dim + c] holds rows (2·pair, 2·pair + 1) of column c
        let lanes: Vec<(F32x4, F32x4)> = (0..dim / 2)
            .flat_map(|pair| {
                (0..dim).map(move |c| {
                    let l = lanes_of(m.at(2 * pair, c), m.at(2 * pair + 1, c));
                    (l, l.swap_pairs_neg())
                })
            })
            .collect();

        let positions = index::compact_positions(targets);
        let mut indices = vec![0usize; dim];
        let mut local = vec![Amplitude::new(0.0, 0.0); dim];
        let amps = self.state.amplitudes_mut();

        for i in 0..(amps.len() >> k) {
            index::group_indices(i, &positions, &mut indices);
            for (slot, &g) in local.iter_mut().zip(&indices) {
                *slot = amps[g];
            }

            for (pair, row_lanes) in lanes.chunks_exact(dim).enumerate() {
                let mut acc = F32x4::splat(0.0);
                for (&(l, rot), x) in row_lanes.iter().zip(&local) {
                    acc = l.mul_add(F32x4::splat(x.re), acc);
                    acc = rot.mul_add(F32x4::splat(x.im), acc);
                }
                let [r0, m0, r1, m1] = acc.to_array();
                amps[indices[2 * pair]] = Amplitude::new(r0, m0);
                amps[indices[2 * pair + 1]] = Amplitude::new(r1, m1);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScalarRegister;
    use crate::state::random_state;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_swap_pairs_neg() {
        let v = F32x4::from_array([1.0, 2.0, 3.0, 4.0]).swap_pairs_neg();
        assert_eq!(v.to_array(), [-2.0, 1.0, -4.0, 3.0]);

        let w = F32x8::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).swap_pairs_neg();
        assert_eq!(w.to_array(), [-2.0, 1.0, -4.0, 3.0, -6.0, 5.0, -8.0, 7.0]);
    }

    #[test]
    fn test_float_lane_arithmetic() {
        let a = F32x4::from_array([1.0, 2.0, 3.0, 4.0]);
        let b = F32x4::splat(2.0);
        let c = F32x4::from_array([0.5, 0.5, 0.5, 0.5]);
        assert_eq!(a.mul_add(b, c).to_array(), [2.5, 4.5, 6.5, 8.5]);
        assert_eq!((a + b).to_array(), [3.0, 4.0, 5.0, 6.0]);

        let x = F32x8::splat(3.0);
        assert_eq!((x * F32x8::splat(2.0)).to_array(), [6.0; 8]);
    }

    #[test]
    fn test_integer_lanes_build_index_pairs() {
        for t in 0..6u32 {
            for i in 0..32u64 {
                let v = U64x2::splat(i);
                let low = U64x2::splat((1u64 << t) - 1);
                let pair = ((((v >> t) << 1) | U64x2::from_array([0, 1])) << t | (v & low)).to_array();
                assert_eq!(pair[0] as usize, index::insert_bit(i as usize, 0, t as usize));
                assert_eq!(pair[1] as usize, index::insert_bit(i as usize, 1, t as usize));
            }
        }

        let v = U64x4::from_array([1, 2, 3, 4]);
        assert_eq!((v << 3).to_array(), [8, 16, 24, 32]);
        assert_eq!((v >> 1).to_array(), [0, 1, 1, 2]);
        assert_eq!((v & U64x4::splat(1)).to_array(), [1, 0, 1, 0]);
    }

    fn assert_parity(gate: &Gate, targets: &[usize], qubits: usize, seed: u64) {
        let initial = random_state(qubits, &mut StdRng::seed_from_u64(seed)).unwrap();

        let mut scalar = ScalarRegister::new(qubits).unwrap();
        let mut simd = VectorizedRegister::new(qubits).unwrap();
        scalar.set_state_vector(&initial).unwrap();
        simd.set_state_vector(&initial).unwrap();

        scalar.gate(gate, targets).unwrap();
        simd.gate(gate, targets).unwrap();

        let (a, b) = (scalar.state_vector().unwrap(), simd.state_vector().unwrap());
        for (i, (x, y)) in a.iter().zip(&b).enumerate() {
            assert!((x - y).norm() < 1e-5, "{gate} on {targets:?}: amplitude {i} {x} vs {y}");
        }
    }

    #[test]
    fn test_one_qubit_parity() {
        for q in 0..5 {
            assert_parity(&Gate::hadamard(), &[q], 5, q as u64);
            assert_parity(&Gate::pauli_y(), &[q], 5, 10 + q as u64);
            assert_parity(&Gate::phase(0.9), &[q], 5, 20 + q as u64);
        }
    }

    #[test]
    fn test_two_qubit_parity() {
        for (q0, q1) in [(0, 1), (1, 0), (0, 4), (4, 2), (3, 1)] {
            assert_parity(&Gate::controlled_y(), &[q0, q1], 5, (q0 * 7 + q1) as u64);
            assert_parity(&Gate::controlled_phase(1.3), &[q0, q1], 5, 99);
            assert_parity(&Gate::swap(), &[q0, q1], 5, 5);
        }
    }

    #[test]
    fn test_k_qubit_parity() {
        let ccy = Gate::make_controlled(&Gate::pauli_y(), 2).unwrap();
        for targets in [[0, 1, 2], [2, 1, 0], [4, 0, 3], [1, 4, 2]] {
            assert_parity(&Gate::toffoli(), &targets, 5, 3);
            assert_parity(&ccy, &targets, 5, 4);
        }

        let c3h = Gate::make_controlled(&Gate::hadamard(), 3).unwrap();
        assert_parity(&c3h, &[3, 0, 4, 1], 5, 8);
    }

    #[test]
    fn test_k_path_handles_small_gates() {
        let mut a = VectorizedRegister::new(3).unwrap();
        let mut b = ScalarRegister::new(3).unwrap();
        a.apply_k_qubit_gate(&Gate::hadamard(), &[1]).unwrap();
        b.hadamard(1).unwrap();
        assert_eq!(a.state_vector().unwrap().len(), 8);
        for (x, y) in a.state_vector().unwrap().iter().zip(&b.state_vector().unwrap()) {
            assert!((x - y).norm() < 1e-6);
        }
    }
}
