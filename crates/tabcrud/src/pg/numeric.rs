//! Binary `NUMERIC` codec.
//!
//! The wire form is a header of `ndigits`, `weight`, `sign` and `dscale`
//! (16 bits each) followed by `ndigits` base-10000 digits, the first one
//! scaled by `10000^weight`.

use bytes::{BufMut, BytesMut};
use std::error::Error;
use tokio_postgres::types::{FromSql, Type};

type BoxError = Box<dyn Error + Sync + Send>;

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Encode a plain decimal literal (`-12.50`, `.5`, `7`).
pub(crate) fn encode_decimal(text: &str, out: &mut BytesMut) -> Result<(), BoxError> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let well_formed = !(int_part.is_empty() && frac_part.is_empty())
        && int_part
            .bytes()
            .chain(frac_part.bytes())
            .all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(format!("invalid numeric literal {text:?}").into());
    }
    let dscale = u16::try_from(frac_part.len())?;

    let int_pad = (4 - int_part.len() % 4) % 4;
    let frac_pad = (4 - frac_part.len() % 4) % 4;
    let padded = format!(
        "{}{int_part}{frac_part}{}",
        "0".repeat(int_pad),
        "0".repeat(frac_pad)
    );
    let mut digits: Vec<i16> = padded
        .as_bytes()
        .chunks(4)
        .map(|chunk| chunk.iter().fold(0i16, |acc, b| acc * 10 + i16::from(b - b'0')))
        .collect();
    let mut weight = i16::try_from((int_part.len() + int_pad) / 4)? - 1;

    let leading = digits.iter().take_while(|d| **d == 0).count();
    digits.drain(..leading);
    weight -= i16::try_from(leading)?;
    while digits.last() == Some(&0) {
        digits.pop();
    }
    if digits.is_empty() {
        weight = 0;
    }

    out.put_i16(i16::try_from(digits.len())?);
    out.put_i16(weight);
    out.put_u16(if negative && !digits.is_empty() { NUMERIC_NEG } else { 0 });
    out.put_u16(dscale);
    for digit in digits {
        out.put_i16(digit);
    }
    Ok(())
}

/// A `NUMERIC` read as the nearest `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Numeric(pub f64);

fn read_u16(raw: &[u8], at: usize) -> Result<u16, BoxError> {
    raw.get(at..at + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| BoxError::from("numeric value truncated"))
}

impl<'a> FromSql<'a> for Numeric {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let ndigits = usize::from(read_u16(raw, 0)?);
        let weight = i32::from(read_u16(raw, 2)? as i16);
        let sign = read_u16(raw, 4)?;
        match sign {
            NUMERIC_NAN => return Ok(Numeric(f64::NAN)),
            NUMERIC_PINF => return Ok(Numeric(f64::INFINITY)),
            NUMERIC_NINF => return Ok(Numeric(f64::NEG_INFINITY)),
            _ => {}
        }

        let mut mantissa = String::with_capacity(ndigits * 4 + 1);
        if sign == NUMERIC_NEG {
            mantissa.push('-');
        }
        for i in 0..ndigits {
            mantissa.push_str(&format!("{:04}", read_u16(raw, 8 + 2 * i)?));
        }
        if ndigits == 0 {
            return Ok(Numeric(0.0));
        }
        let exponent = 4 * (weight - ndigits as i32 + 1);
        Ok(Numeric(format!("{mantissa}e{exponent}").parse()?))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}
