//! Precision rules for character and bit strings.
//!
//! A value longer than its declared precision is accepted only when the
//! excess is pure pad: trailing spaces for characters, zero bits for bit
//! strings. Fixed-width values are padded out to their precision.

use ldb_diagnostic::{LoadError, LoadResult};
use ldb_ir::{BitString, Domain, DomainKind};

/// Fit a character value into a CHAR/VARCHAR/NCHAR/VARNCHAR domain.
pub fn fit_chars(text: &str, domain: &Domain) -> LoadResult<String> {
    let precision = domain.precision as usize;
    let mut out = match text.char_indices().nth(precision) {
        Some((cut, _)) => {
            if !text[cut..].bytes().all(|b| b == b' ') {
                return Err(LoadError::overflow(format!("'{text}'"), domain));
            }
            text[..cut].to_owned()
        }
        None => text.to_owned(),
    };
    if domain.kind.is_fixed_width() {
        let len = out.chars().count();
        out.push_str(&" ".repeat(precision.saturating_sub(len)));
    }
    Ok(out)
}

/// Fit a bit string into a BIT/VARBIT domain.
pub fn fit_bits(bits: &BitString, domain: &Domain) -> LoadResult<BitString> {
    let precision = domain.precision;
    if bits.len() > precision {
        if !bits.excess_is_zero(precision) {
            return Err(LoadError::overflow(bits.to_string(), domain));
        }
        return Ok(bits.resized(precision));
    }
    if domain.kind == DomainKind::Bit {
        return Ok(bits.resized(precision));
    }
    Ok(bits.clone())
}

#[cfg(test)]
mod tests;
