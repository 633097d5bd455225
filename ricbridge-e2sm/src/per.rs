//! Aligned PER (APER) primitives
//!
//! The subset of ITU-T X.691 needed by the E2SM indication messages:
//! constrained and unconstrained integers, length determinants, CHOICE
//! and ENUMERATED indices, SEQUENCE preambles with extension skipping,
//! OCTET STRING / PrintableString, REAL and open types.
//!
//! Fragmented lengths (above 16383 octets) are not supported; no E2SM
//! indication field comes near that size inside an RMR message.

use bitvec::prelude::*;
use bytes::Bytes;
use thiserror::Error;

/// Largest length encodable without fragmentation.
const MAX_UNFRAGMENTED_LENGTH: usize = 16383;

/// PER codec errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerError {
    #[error("Buffer underflow: need {needed} bits, have {available}")]
    BufferUnderflow { needed: usize, available: usize },

    #[error("Value {value} not in range {min}..={max}")]
    ConstraintViolation { value: i64, min: i64, max: i64 },

    #[error("Invalid choice index: {index} (max {max})")]
    InvalidChoiceIndex { index: usize, max: usize },

    #[error("Invalid length: {length}")]
    InvalidLength { length: usize },

    #[error("Fragmented length determinants are not supported")]
    Fragmented,

    #[error("Integer does not fit in 64 bits ({octets} octets)")]
    IntegerOverflow { octets: usize },

    #[error("Unsupported REAL encoding: first octet {0:#04x}")]
    UnsupportedReal(u8),

    #[error("Invalid character {0:#04x} in PrintableString")]
    InvalidCharacter(u8),

    #[error("{0} trailing octets after the encoded value")]
    TrailingData(usize),
}

pub type PerResult<T> = Result<T, PerError>;

/// Value or size constraint `(min..max[, ...])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub min: i64,
    pub max: i64,
    pub extensible: bool,
}

impl Constraint {
    pub const fn new(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            extensible: false,
        }
    }

    pub const fn extensible(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            extensible: true,
        }
    }

    /// Number of values in the root range.
    pub fn range(&self) -> u64 {
        if self.max >= self.min {
            (self.max - self.min) as u64 + 1
        } else {
            0
        }
    }

    /// Bits of a minimal bit-field able to hold every offset in the range.
    pub fn bits_needed(&self) -> usize {
        let range = self.range();
        if range <= 1 {
            0
        } else {
            64 - (range - 1).leading_zeros() as usize
        }
    }

    fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }

    fn violation(&self, value: i64) -> PerError {
        PerError::ConstraintViolation {
            value,
            min: self.min,
            max: self.max,
        }
    }
}

/// Minimal two's-complement octets of `value`.
fn signed_octets(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

/// Minimal unsigned octets of `value` (at least one).
fn unsigned_octets(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(7);
    bytes[start..].to_vec()
}

/// X.690 binary encoding of a REAL value (base 2, scale factor 0).
fn real_to_octets(value: f64) -> Vec<u8> {
    if value == 0.0 {
        return if value.is_sign_negative() {
            vec![0x43]
        } else {
            Vec::new()
        };
    }
    if value.is_nan() {
        return vec![0x42];
    }
    if value.is_infinite() {
        return vec![if value > 0.0 { 0x40 } else { 0x41 }];
    }

    let bits = value.to_bits();
    let negative = bits >> 63 != 0;
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & 0x000f_ffff_ffff_ffff;
    let (mut mantissa, mut exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };
    while mantissa & 1 == 0 {
        mantissa >>= 1;
        exponent += 1;
    }

    let exponent_octets = signed_octets(exponent);
    let mut first = 0x80u8;
    if negative {
        first |= 0x40;
    }
    first |= (exponent_octets.len() - 1) as u8;

    let mut out = vec![first];
    out.extend_from_slice(&exponent_octets);
    out.extend_from_slice(&unsigned_octets(mantissa));
    out
}

/// `value * 2^exponent` in steps that never overflow an intermediate power.
fn scale_by_power_of_two(mut value: f64, exponent: i64) -> f64 {
    // Past this, any 64-bit mantissa has already saturated to inf or 0.
    let mut exponent = exponent.clamp(-1200, 1200);
    while exponent > 0 {
        let step = exponent.min(1000);
        value *= 2f64.powi(step as i32);
        exponent -= step;
    }
    while exponent < 0 {
        let step = (-exponent).min(1000);
        value /= 2f64.powi(step as i32);
        exponent += step;
    }
    value
}

fn real_from_octets(octets: &[u8]) -> PerResult<f64> {
    let Some(&first) = octets.first() else {
        return Ok(0.0);
    };

    if first & 0x80 == 0 {
        return match first {
            0x40 => Ok(f64::INFINITY),
            0x41 => Ok(f64::NEG_INFINITY),
            0x42 => Ok(f64::NAN),
            0x43 => Ok(-0.0),
            other => Err(PerError::UnsupportedReal(other)),
        };
    }

    let base_bits: i64 = match (first >> 4) & 0x03 {
        0 => 1,
        1 => 3,
        2 => 4,
        _ => return Err(PerError::UnsupportedReal(first)),
    };
    let scale = i32::from((first >> 2) & 0x03);
    let (exponent_len, mut index) = match first & 0x03 {
        3 => match octets.get(1) {
            Some(&len) => (len as usize, 2),
            None => return Err(PerError::InvalidLength { length: 0 }),
        },
        n => (n as usize + 1, 1),
    };

    let exponent_octets = octets
        .get(index..index + exponent_len)
        .ok_or(PerError::InvalidLength {
            length: octets.len(),
        })?;
    if exponent_octets.is_empty() || exponent_octets.len() > 4 {
        return Err(PerError::UnsupportedReal(first));
    }
    let mut exponent: i64 = if exponent_octets[0] & 0x80 != 0 { -1 } else { 0 };
    for b in exponent_octets {
        exponent = (exponent << 8) | i64::from(*b);
    }
    index += exponent_len;

    let mantissa_octets = &octets[index..];
    if mantissa_octets.len() > 8 {
        return Err(PerError::IntegerOverflow {
            octets: mantissa_octets.len(),
        });
    }
    let mut mantissa: u64 = 0;
    for b in mantissa_octets {
        mantissa = (mantissa << 8) | u64::from(*b);
    }

    let magnitude = scale_by_power_of_two(mantissa as f64, i64::from(scale) + exponent * base_bits);
    Ok(if first & 0x40 != 0 {
        -magnitude
    } else {
        magnitude
    })
}

/// APER (Aligned PER) Encoder
#[derive(Debug, Default)]
pub struct AperEncoder {
    buffer: BitVec<u8, Msb0>,
}

impl AperEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finishes the encoding, padding the last octet with zero bits.
    pub fn into_bytes(mut self) -> Bytes {
        self.align();
        Bytes::from(self.buffer.into_vec())
    }

    pub fn bit_len(&self) -> usize {
        self.buffer.len()
    }

    /// Pads with zero bits up to the next octet boundary.
    pub fn align(&mut self) {
        let remainder = self.buffer.len() % 8;
        if remainder != 0 {
            self.buffer.resize(self.buffer.len() + 8 - remainder, false);
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.buffer.push(bit);
    }

    /// Writes the low `num_bits` of `value`, most significant first.
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        for i in (0..num_bits).rev() {
            self.buffer.push((value >> i) & 1 == 1);
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_raw_slice(bytes);
    }

    /// Constrained whole number (X.691 12.2), without extension handling.
    pub fn encode_constrained_whole_number(
        &mut self,
        value: i64,
        constraint: &Constraint,
    ) -> PerResult<()> {
        if !constraint.contains(value) {
            return Err(constraint.violation(value));
        }

        let range = constraint.range();
        let offset = (value - constraint.min) as u64;
        match range {
            1 => {}
            2..=255 => self.write_bits(offset, constraint.bits_needed()),
            256 => {
                self.align();
                self.write_bits(offset, 8);
            }
            257..=65536 => {
                self.align();
                self.write_bits(offset, 16);
            }
            _ => {
                // indefinite-length case: minimal octets behind a length
                let octets = unsigned_octets(offset);
                self.encode_length_determinant(octets.len())?;
                self.write_bytes(&octets);
            }
        }
        Ok(())
    }

    /// INTEGER with an optional (possibly extensible) constraint.
    pub fn encode_integer(&mut self, value: i64, constraint: Option<&Constraint>) -> PerResult<()> {
        match constraint {
            None => self.encode_unconstrained_whole_number(value),
            Some(c) if c.extensible => {
                let in_root = c.contains(value);
                self.write_bit(!in_root);
                if in_root {
                    self.encode_constrained_whole_number(value, c)
                } else {
                    self.encode_unconstrained_whole_number(value)
                }
            }
            Some(c) => self.encode_constrained_whole_number(value, c),
        }
    }

    /// Unconstrained whole number (X.691 12.2.6): length plus octets.
    pub fn encode_unconstrained_whole_number(&mut self, value: i64) -> PerResult<()> {
        let octets = signed_octets(value);
        self.encode_length_determinant(octets.len())?;
        self.write_bytes(&octets);
        Ok(())
    }

    /// Unconstrained length determinant (X.691 11.9), always aligned.
    pub fn encode_length_determinant(&mut self, length: usize) -> PerResult<()> {
        self.align();
        if length <= 127 {
            self.write_bits(length as u64, 8);
        } else if length <= MAX_UNFRAGMENTED_LENGTH {
            self.write_bits(0x8000 | length as u64, 16);
        } else {
            return Err(PerError::Fragmented);
        }
        Ok(())
    }

    /// Length bounded by a size constraint.
    pub fn encode_constrained_length(&mut self, length: usize, min: usize, max: usize) -> PerResult<()> {
        if max >= 65536 {
            return self.encode_length_determinant(length);
        }
        let constraint = Constraint::new(min as i64, max as i64);
        self.encode_constrained_whole_number(length as i64, &constraint)
    }

    /// Normally small non-negative whole number (X.691 11.6).
    pub fn encode_normally_small_non_negative(&mut self, value: u64) -> PerResult<()> {
        if value <= 63 {
            self.write_bit(false);
            self.write_bits(value, 6);
        } else {
            self.write_bit(true);
            let octets = unsigned_octets(value);
            self.encode_length_determinant(octets.len())?;
            self.write_bytes(&octets);
        }
        Ok(())
    }

    /// CHOICE index (X.691 23); indices past the root go to the extension.
    pub fn encode_choice_index(
        &mut self,
        index: usize,
        root_alternatives: usize,
        extensible: bool,
    ) -> PerResult<()> {
        let in_root = index < root_alternatives;
        if extensible {
            self.write_bit(!in_root);
            if !in_root {
                return self.encode_normally_small_non_negative((index - root_alternatives) as u64);
            }
        } else if !in_root {
            return Err(PerError::InvalidChoiceIndex {
                index,
                max: root_alternatives.saturating_sub(1),
            });
        }
        let constraint = Constraint::new(0, root_alternatives as i64 - 1);
        self.encode_constrained_whole_number(index as i64, &constraint)
    }

    /// ENUMERATED (X.691 14) by position in the root list.
    pub fn encode_enumerated(
        &mut self,
        index: usize,
        root_values: usize,
        extensible: bool,
    ) -> PerResult<()> {
        self.encode_choice_index(index, root_values, extensible)
    }

    /// SEQUENCE preamble: extension bit (if extensible) and one presence
    /// bit per OPTIONAL component. Extension additions are never emitted.
    pub fn encode_sequence_preamble(&mut self, extensible: bool, optional_present: &[bool]) {
        if extensible {
            self.write_bit(false);
        }
        for present in optional_present {
            self.write_bit(*present);
        }
    }

    /// OCTET STRING (X.691 17) with an optional size constraint.
    ///
    /// Also used for PrintableString, whose characters occupy one aligned
    /// octet each under APER.
    pub fn encode_octet_string(&mut self, data: &[u8], size: Option<&Constraint>) -> PerResult<()> {
        let len = data.len();
        let Some(size) = size else {
            self.encode_length_determinant(len)?;
            self.write_bytes(data);
            return Ok(());
        };

        if size.extensible {
            let in_root = size.contains(len as i64);
            self.write_bit(!in_root);
            if !in_root {
                self.encode_length_determinant(len)?;
                self.write_bytes(data);
                return Ok(());
            }
        } else if !size.contains(len as i64) {
            return Err(PerError::InvalidLength { length: len });
        }

        let (min, max) = (size.min as usize, size.max as usize);
        if min == max {
            if min > 2 {
                self.align();
            }
        } else {
            self.encode_constrained_length(len, min, max)?;
            if max > 2 {
                self.align();
            }
        }
        self.write_bytes(data);
        Ok(())
    }

    /// REAL (X.691 15): length determinant plus the X.690 contents octets.
    pub fn encode_real(&mut self, value: f64) -> PerResult<()> {
        let octets = real_to_octets(value);
        self.encode_length_determinant(octets.len())?;
        self.write_bytes(&octets);
        Ok(())
    }

    /// Wraps an already-encoded value as an open type.
    pub fn encode_open_type(&mut self, encoded: &[u8]) -> PerResult<()> {
        self.encode_octet_string(encoded, None)
    }
}

/// APER (Aligned PER) Decoder
pub struct AperDecoder<'a> {
    data: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> AperDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data: BitSlice::from_slice(data),
            position: 0,
        }
    }

    pub fn bit_position(&self) -> usize {
        self.position
    }

    pub fn remaining_bits(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn align(&mut self) {
        let remainder = self.position % 8;
        if remainder != 0 {
            self.position += 8 - remainder;
        }
    }

    /// Succeeds only if nothing but final-octet padding is left.
    pub fn finish(mut self) -> PerResult<()> {
        self.align();
        match self.remaining_bits() {
            0 => Ok(()),
            bits => Err(PerError::TrailingData(bits / 8)),
        }
    }

    pub fn read_bit(&mut self) -> PerResult<bool> {
        let bit = *self.data.get(self.position).ok_or(PerError::BufferUnderflow {
            needed: 1,
            available: 0,
        })?;
        self.position += 1;
        Ok(bit)
    }

    /// Reads `num_bits` (at most 64) as an unsigned value, MSB first.
    pub fn read_bits(&mut self, num_bits: usize) -> PerResult<u64> {
        if num_bits > self.remaining_bits() {
            return Err(PerError::BufferUnderflow {
                needed: num_bits,
                available: self.remaining_bits(),
            });
        }
        let mut value: u64 = 0;
        for _ in 0..num_bits {
            value = (value << 1) | u64::from(self.data[self.position]);
            self.position += 1;
        }
        Ok(value)
    }

    pub fn read_bytes(&mut self, num_bytes: usize) -> PerResult<Vec<u8>> {
        let needed = num_bytes * 8;
        if needed > self.remaining_bits() {
            return Err(PerError::BufferUnderflow {
                needed,
                available: self.remaining_bits(),
            });
        }
        let mut bytes = Vec::with_capacity(num_bytes);
        for _ in 0..num_bytes {
            bytes.push(self.read_bits(8)? as u8);
        }
        Ok(bytes)
    }

    /// Constrained whole number (X.691 12.2), without extension handling.
    pub fn decode_constrained_whole_number(&mut self, constraint: &Constraint) -> PerResult<i64> {
        let offset = match constraint.range() {
            1 => 0,
            2..=255 => self.read_bits(constraint.bits_needed())?,
            256 => {
                self.align();
                self.read_bits(8)?
            }
            257..=65536 => {
                self.align();
                self.read_bits(16)?
            }
            _ => {
                let len = self.decode_length_determinant()?;
                if len == 0 || len > 8 {
                    return Err(PerError::IntegerOverflow { octets: len });
                }
                self.read_bits(len * 8)?
            }
        };

        let value = i64::try_from(offset)
            .ok()
            .and_then(|o| constraint.min.checked_add(o))
            .ok_or(PerError::IntegerOverflow { octets: 8 })?;
        if !constraint.contains(value) {
            return Err(constraint.violation(value));
        }
        Ok(value)
    }

    /// INTEGER with an optional (possibly extensible) constraint.
    pub fn decode_integer(&mut self, constraint: Option<&Constraint>) -> PerResult<i64> {
        match constraint {
            None => self.decode_unconstrained_whole_number(),
            Some(c) if c.extensible => {
                if self.read_bit()? {
                    self.decode_unconstrained_whole_number()
                } else {
                    self.decode_constrained_whole_number(c)
                }
            }
            Some(c) => self.decode_constrained_whole_number(c),
        }
    }

    /// Unconstrained whole number (X.691 12.2.6).
    pub fn decode_unconstrained_whole_number(&mut self) -> PerResult<i64> {
        let len = self.decode_length_determinant()?;
        if len == 0 {
            return Err(PerError::InvalidLength { length: 0 });
        }
        if len > 8 {
            return Err(PerError::IntegerOverflow { octets: len });
        }
        let bytes = self.read_bytes(len)?;

        let mut value: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for byte in bytes {
            value = (value << 8) | i64::from(byte);
        }
        Ok(value)
    }

    /// Unconstrained length determinant (X.691 11.9).
    pub fn decode_length_determinant(&mut self) -> PerResult<usize> {
        self.align();
        let first = self.read_bits(8)? as usize;
        if first & 0x80 == 0 {
            Ok(first)
        } else if first & 0x40 == 0 {
            let second = self.read_bits(8)? as usize;
            Ok(((first & 0x3f) << 8) | second)
        } else {
            Err(PerError::Fragmented)
        }
    }

    /// Length bounded by a size constraint.
    pub fn decode_constrained_length(&mut self, min: usize, max: usize) -> PerResult<usize> {
        if max >= 65536 {
            let len = self.decode_length_determinant()?;
            if len < min || len > max {
                return Err(PerError::InvalidLength { length: len });
            }
            return Ok(len);
        }
        let constraint = Constraint::new(min as i64, max as i64);
        self.decode_constrained_whole_number(&constraint)
            .map(|v| v as usize)
    }

    /// Normally small non-negative whole number (X.691 11.6).
    pub fn decode_normally_small_non_negative(&mut self) -> PerResult<u64> {
        if !self.read_bit()? {
            return self.read_bits(6);
        }
        let len = self.decode_length_determinant()?;
        if len == 0 || len > 8 {
            return Err(PerError::IntegerOverflow { octets: len });
        }
        self.read_bits(len * 8)
    }

    /// CHOICE index (X.691 23). Indices at or past `root_alternatives`
    /// denote extension alternatives; their open-type value is left for
    /// the caller (see [`skip_open_type`](Self::skip_open_type)).
    pub fn decode_choice_index(
        &mut self,
        root_alternatives: usize,
        extensible: bool,
    ) -> PerResult<usize> {
        if extensible && self.read_bit()? {
            let ext = self.decode_normally_small_non_negative()?;
            return usize::try_from(ext)
                .ok()
                .and_then(|ext| root_alternatives.checked_add(ext))
                .ok_or(PerError::IntegerOverflow { octets: 8 });
        }
        let constraint = Constraint::new(0, root_alternatives as i64 - 1);
        let index = self
            .decode_constrained_whole_number(&constraint)
            .map_err(|_| PerError::InvalidChoiceIndex {
                index: root_alternatives,
                max: root_alternatives.saturating_sub(1),
            })?;
        Ok(index as usize)
    }

    /// ENUMERATED (X.691 14); extension values come back past the root.
    pub fn decode_enumerated(&mut self, root_values: usize, extensible: bool) -> PerResult<usize> {
        self.decode_choice_index(root_values, extensible)
    }

    /// SEQUENCE preamble. Returns whether extension additions are present
    /// and the presence bit of each OPTIONAL component.
    pub fn decode_sequence_preamble(
        &mut self,
        extensible: bool,
        optional_count: usize,
    ) -> PerResult<(bool, Vec<bool>)> {
        let extended = extensible && self.read_bit()?;
        let mut present = Vec::with_capacity(optional_count);
        for _ in 0..optional_count {
            present.push(self.read_bit()?);
        }
        Ok((extended, present))
    }

    /// Skips the extension additions of a SEQUENCE (X.691 19.7-19.9).
    pub fn skip_extension_additions(&mut self) -> PerResult<()> {
        let announced = self.decode_normally_small_non_negative()?;
        // One presence bit per addition must still be in the buffer.
        let available = self.remaining_bits();
        let count = usize::try_from(announced)
            .ok()
            .and_then(|n| n.checked_add(1))
            .filter(|n| *n <= available)
            .ok_or(PerError::BufferUnderflow {
                needed: usize::try_from(announced)
                    .unwrap_or(usize::MAX)
                    .saturating_add(1),
                available,
            })?;
        let mut present = Vec::with_capacity(count);
        for _ in 0..count {
            present.push(self.read_bit()?);
        }
        for _ in present.into_iter().filter(|p| *p) {
            self.skip_open_type()?;
        }
        Ok(())
    }

    /// Skips one open-type value.
    pub fn skip_open_type(&mut self) -> PerResult<()> {
        let len = self.decode_length_determinant()?;
        self.read_bytes(len).map(|_| ())
    }

    /// OCTET STRING (X.691 17) with an optional size constraint.
    pub fn decode_octet_string(&mut self, size: Option<&Constraint>) -> PerResult<Vec<u8>> {
        let Some(size) = size else {
            let len = self.decode_length_determinant()?;
            return self.read_bytes(len);
        };

        if size.extensible && self.read_bit()? {
            let len = self.decode_length_determinant()?;
            return self.read_bytes(len);
        }

        let (min, max) = (size.min as usize, size.max as usize);
        let len = if min == max {
            if min > 2 {
                self.align();
            }
            min
        } else {
            let len = self.decode_constrained_length(min, max)?;
            if max > 2 {
                self.align();
            }
            len
        };
        self.read_bytes(len)
    }

    /// PrintableString decoded as octets, restricted to printable ASCII.
    pub fn decode_printable_string(&mut self, size: Option<&Constraint>) -> PerResult<String> {
        let bytes = self.decode_octet_string(size)?;
        if let Some(bad) = bytes.iter().find(|b| !(b.is_ascii_graphic() || **b == b' ')) {
            return Err(PerError::InvalidCharacter(*bad));
        }
        Ok(bytes.into_iter().map(char::from).collect())
    }

    /// REAL (X.691 15).
    pub fn decode_real(&mut self) -> PerResult<f64> {
        let len = self.decode_length_determinant()?;
        let octets = self.read_bytes(len)?;
        real_from_octets(&octets)
    }
}

/// Types that can be encoded with APER
pub trait AperEncode {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()>;
}

/// Types that can be decoded with APER
pub trait AperDecode: Sized {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self>;
}

/// Encodes a complete value into octets.
pub fn encode_to_bytes<T: AperEncode>(value: &T) -> PerResult<Bytes> {
    let mut encoder = AperEncoder::new();
    value.encode_aper(&mut encoder)?;
    Ok(encoder.into_bytes())
}

/// Decodes a complete value, rejecting trailing octets.
pub fn decode_from_bytes<T: AperDecode>(data: &[u8]) -> PerResult<T> {
    let mut decoder = AperDecoder::new(data);
    let value = T::decode_aper(&mut decoder)?;
    decoder.finish()?;
    Ok(value)
}
