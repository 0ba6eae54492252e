//! Bit strings for BIT and VARBIT attributes.

use std::fmt::{self, Write};

/// A packed bit string, most significant bit first.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct BitString {
    bytes: Vec<u8>,
    len: u32,
}

impl BitString {
    /// Parse a binary literal body (`0101`).
    pub fn from_binary(text: &str) -> Option<BitString> {
        let mut bits = BitString::default();
        for c in text.chars() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => return None,
            }
        }
        Some(bits)
    }

    /// Parse a hex literal body (`1f`); each digit is four bits.
    pub fn from_hex(text: &str) -> Option<BitString> {
        let mut bits = BitString::default();
        for c in text.chars() {
            let nibble = c.to_digit(16)?;
            for shift in (0..4).rev() {
                bits.push((nibble >> shift) & 1 == 1);
            }
        }
        Some(bits)
    }

    fn push(&mut self, bit: bool) {
        let index = self.len as usize;
        if index % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[index / 8] |= 0x80 >> (index % 8);
        }
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bit(&self, index: u32) -> bool {
        let index = index as usize;
        index < self.len as usize && self.bytes[index / 8] & (0x80 >> (index % 8)) != 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether every bit at or after `precision` is zero.
    pub fn excess_is_zero(&self, precision: u32) -> bool {
        (precision..self.len).all(|i| !self.bit(i))
    }

    /// Copy of this string cut or zero-extended to exactly `len` bits.
    #[must_use]
    pub fn resized(&self, len: u32) -> BitString {
        let mut out = BitString::default();
        for i in 0..len {
            out.push(self.bit(i));
        }
        out
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len % 4 == 0 {
            let mut hex = String::with_capacity(self.bytes.len() * 2);
            for byte in &self.bytes {
                let _ = write!(hex, "{byte:02x}");
            }
            // A trailing half byte prints as a single digit.
            return write!(f, "X'{}'", &hex[..(self.len / 4) as usize]);
        }
        f.write_str("B'")?;
        for i in 0..self.len {
            f.write_char(if self.bit(i) { '1' } else { '0' })?;
        }
        f.write_char('\'')
    }
}
