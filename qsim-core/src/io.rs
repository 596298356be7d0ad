//! State file codec and text dump
//!
//! ## Binary layout
//!
//! ```text
//! offset  size              field
//! 0       6                 reserved (zero)
//! 6       1                 precision: bytes per real component
//! 7       1                 qubit count N
//! 8       2^N · 2 · prec    amplitudes, index order, (re, im) little-endian
//! ```
//!
//! Files are written with precision 4 (`f32`). Precision 8 files are read
//! and narrowed to `f32`.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{QuantumError, QuantumResult};
use crate::state::amplitude_count;
use crate::{Amplitude, Real};

pub const HEADER_LEN: usize = 8;

/// Bytes per real component written by this build
pub const PRECISION: u8 = std::mem::size_of::<Real>() as u8;

/// Decoded state file
#[derive(Clone, Debug, PartialEq)]
pub struct StateFile {
    pub qubits: usize,
    /// Precision recorded in the header (before narrowing)
    pub precision: u8,
    pub amplitudes: Vec<Amplitude>,
}

/// Encodes `amplitudes` of a `qubits`-qubit register
pub fn encode_state(amplitudes: &[Amplitude], qubits: usize) -> QuantumResult<Bytes> {
    let qubit_byte = u8::try_from(qubits)
        .map_err(|_| QuantumError::InvalidStateFile(format!("{qubits} qubits do not fit the header")))?;
    let expected = amplitude_count(qubits)?;
    if amplitudes.len() != expected {
        return Err(QuantumError::StateLength {
            expected,
            actual: amplitudes.len(),
        });
    }

    let mut buf = BytesMut::with_capacity(HEADER_LEN + amplitudes.len() * 2 * PRECISION as usize);
    buf.put_bytes(0, 6);
    buf.put_u8(PRECISION);
    buf.put_u8(qubit_byte);
    for a in amplitudes {
        buf.put_f32_le(a.re);
        buf.put_f32_le(a.im);
    }
    Ok(buf.freeze())
}

/// Decodes a complete state file image
pub fn decode_state(mut data: Bytes) -> QuantumResult<StateFile> {
    if data.len() < HEADER_LEN {
        return Err(QuantumError::InvalidStateFile(format!(
            "header needs {HEADER_LEN} bytes, found {}",
            data.len()
        )));
    }

    data.advance(6);
    let precision = data.get_u8();
    let qubits = data.get_u8() as usize;

    if precision != 4 && precision != 8 {
        return Err(QuantumError::UnsupportedPrecision(precision));
    }

    let count = amplitude_count(qubits)
        .map_err(|_| QuantumError::InvalidStateFile(format!("qubit count {qubits} is too large")))?;
    let body = count
        .checked_mul(2 * precision as usize)
        .ok_or_else(|| QuantumError::InvalidStateFile(format!("qubit count {qubits} is too large")))?;

    if data.remaining() != body {
        return Err(QuantumError::InvalidStateFile(format!(
            "{qubits} qubits at precision {precision} need {body} body bytes, found {}",
            data.remaining()
        )));
    }

    let amplitudes = (0..count)
        .map(|_| match precision {
            4 => Amplitude::new(data.get_f32_le(), data.get_f32_le()),
            _ => Amplitude::new(data.get_f64_le() as Real, data.get_f64_le() as Real),
        })
        .collect();

    Ok(StateFile {
        qubits,
        precision,
        amplitudes,
    })
}

pub fn write_state(writer: &mut dyn Write, amplitudes: &[Amplitude], qubits: usize) -> QuantumResult<()> {
    writer.write_all(&encode_state(amplitudes, qubits)?)?;
    writer.flush()?;
    Ok(())
}

pub fn read_state(reader: &mut dyn Read) -> QuantumResult<StateFile> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    decode_state(Bytes::from(raw))
}

/// Writes a state file at `path`, replacing any existing file
pub fn save(path: &Path, amplitudes: &[Amplitude], qubits: usize) -> QuantumResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_state(&mut writer, amplitudes, qubits)?;
    tracing::debug!(path = %path.display(), qubits, "state saved");
    Ok(())
}

pub fn load(path: &Path) -> QuantumResult<StateFile> {
    let mut reader = BufReader::new(File::open(path)?);
    let file = read_state(&mut reader)?;
    tracing::debug!(path = %path.display(), qubits = file.qubits, precision = file.precision, "state loaded");
    Ok(file)
}

/// Human-readable listing of every basis state
///
/// ```text
/// |01>:  0.71 + 0.00i;  p(|01>) = 0.50
/// |10>: -0.71 - 0.00i;  p(|10>) = 0.50
/// Sum of probabilities: 1.00
/// ```
pub fn dump(amplitudes: &[Amplitude], qubits: usize) -> String {
    let mut out = String::new();
    let mut sum = 0.0f64;

    for (i, a) in amplitudes.iter().enumerate() {
        let p = a.norm_sqr() as f64;
        sum += p;

        let ket = ket_label(i, qubits);
        let pad = if a.re >= 0.0 { " " } else { "" };
        let sign = if a.im >= 0.0 { '+' } else { '-' };
        let _ = writeln!(
            out,
            "|{ket}>: {pad}{:.2} {sign} {:.2}i;  p(|{ket}>) = {p:.2}",
            a.re,
            a.im.abs()
        );
    }
    let _ = writeln!(out, "Sum of probabilities: {sum:.2}");
    out
}

/// `qubits`-wide binary label, most significant qubit first
pub fn ket_label(index: usize, qubits: usize) -> String {
    if qubits == 0 {
        return String::new();
    }
    format!("{index:0qubits$b}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    fn bell() -> Vec<Amplitude> {
        vec![
            Amplitude::new(FRAC_1_SQRT_2, 0.0),
            Amplitude::new(0.0, 0.0),
            Amplitude::new(0.0, 0.0),
            Amplitude::new(FRAC_1_SQRT_2, 0.0),
        ]
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode_state(&bell(), 2).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 4 * 8);
        assert_eq!(&bytes[..6], &[0u8; 6]);
        assert_eq!(bytes[6], 4);
        assert_eq!(bytes[7], 2);
        assert_eq!(&bytes[8..12], &FRAC_1_SQRT_2.to_le_bytes());
    }

    #[test]
    fn test_round_trip_is_bit_identical() {
        let state = vec![
            Amplitude::new(0.1, -0.2),
            Amplitude::new(-0.3, 0.4),
            Amplitude::new(1e-30, f32::MIN_POSITIVE),
            Amplitude::new(-0.0, 0.5),
        ];
        let mut buf = Vec::new();
        write_state(&mut buf, &state, 2).unwrap();

        let file = read_state(&mut buf.as_slice()).unwrap();
        assert_eq!(file.qubits, 2);
        assert_eq!(file.precision, 4);
        for (a, b) in file.amplitudes.iter().zip(&state) {
            assert_eq!(a.re.to_bits(), b.re.to_bits());
            assert_eq!(a.im.to_bits(), b.im.to_bits());
        }
    }

    #[test]
    fn test_reads_double_precision() {
        let mut raw = vec![0u8; 6];
        raw.extend([8u8, 1u8]);
        for v in [0.6f64, 0.0, 0.0, -0.8] {
            raw.extend(v.to_le_bytes());
        }

        let file = decode_state(Bytes::from(raw)).unwrap();
        assert_eq!(file.precision, 8);
        assert_eq!(file.amplitudes, vec![Amplitude::new(0.6, 0.0), Amplitude::new(0.0, -0.8)]);
    }

    #[test]
    fn test_rejects_malformed_files() {
        assert!(matches!(
            decode_state(Bytes::from_static(&[0, 0, 0])),
            Err(QuantumError::InvalidStateFile(_))
        ));
        assert!(matches!(
            decode_state(Bytes::from_static(&[0, 0, 0, 0, 0, 0, 2, 1])),
            Err(QuantumError::UnsupportedPrecision(2))
        ));

        let mut truncated = encode_state(&bell(), 2).unwrap().to_vec();
        truncated.pop();
        assert!(matches!(
            decode_state(Bytes::from(truncated)),
            Err(QuantumError::InvalidStateFile(_))
        ));

        assert!(matches!(
            decode_state(Bytes::from_static(&[0, 0, 0, 0, 0, 0, 4, 200])),
            Err(QuantumError::InvalidStateFile(_))
        ));
    }

    #[test]
    fn test_encode_checks_length() {
        assert!(matches!(
            encode_state(&bell(), 3),
            Err(QuantumError::StateLength { expected: 8, actual: 4 })
        ));
    }

    #[test]
    fn test_dump_format() {
        let state = vec![
            Amplitude::new(FRAC_1_SQRT_2, 0.0),
            Amplitude::new(0.0, 0.0),
            Amplitude::new(-FRAC_1_SQRT_2, -0.0001),
            Amplitude::new(0.0, 0.0),
        ];
        let text = dump(&state, 2);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "|00>:  0.71 + 0.00i;  p(|00>) = 0.50");
        assert_eq!(lines[2], "|10>: -0.71 - 0.00i;  p(|10>) = 0.50");
        assert_eq!(lines[4], "Sum of probabilities: 1.00");
    }

    #[test]
    fn test_ket_label() {
        assert_eq!(ket_label(5, 4), "0101");
        assert_eq!(ket_label(0, 1), "0");
        assert_eq!(ket_label(0, 0), "");
    }
}
