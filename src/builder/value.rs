// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::buffer::{DatagramBuffer, Truncated};
use std::fmt;

/// Holder for metric values that knows how to display itself
///
/// Integers are written in plain decimal, floats in their shortest form that
/// round-trips (always with a fractional part, `1.0` rather than `1`) and
/// text is written as given. Packed values are written `:` separated, which
/// lets a single datagram carry several timings or distribution samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue<'a> {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Str(&'a str),
    PackedUnsigned(&'a [u64]),
    PackedFloat(&'a [f64]),
}

impl<'a> fmt::Display for MetricValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fmt = ValueFormatter::new();
        match *self {
            MetricValue::Signed(v) => f.write_str(fmt.int(v)),
            MetricValue::Unsigned(v) => f.write_str(fmt.int(v)),
            MetricValue::Float(v) => f.write_str(fmt.float(v)),
            MetricValue::Str(v) => f.write_str(v),
            MetricValue::PackedUnsigned(vals) => {
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        f.write_str(":")?;
                    }
                    f.write_str(fmt.int(*v))?;
                }
                Ok(())
            }
            MetricValue::PackedFloat(vals) => {
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        f.write_str(":")?;
                    }
                    f.write_str(fmt.float(*v))?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! value_from {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl<'a> From<$t> for MetricValue<'a> {
                fn from(v: $t) -> Self {
                    MetricValue::$variant(v as $target)
                }
            }
        )+
    };
}

value_from!(Signed, i64, i64, i32, i16, i8);
value_from!(Unsigned, u64, u64, u32, u16, u8);
value_from!(Float, f64, f64);

impl<'a> From<f32> for MetricValue<'a> {
    fn from(v: f32) -> Self {
        // Going through the shortest decimal form keeps 0.1f32 from
        // turning into 0.10000000149011612.
        let mut buf = ryu::Buffer::new();
        let value = buf.format(v).parse::<f64>().unwrap_or(v as f64);
        MetricValue::Float(value)
    }
}

impl<'a> From<&'a str> for MetricValue<'a> {
    fn from(v: &'a str) -> Self {
        MetricValue::Str(v)
    }
}

impl<'a> From<&'a [u64]> for MetricValue<'a> {
    fn from(v: &'a [u64]) -> Self {
        MetricValue::PackedUnsigned(v)
    }
}

impl<'a> From<&'a [f64]> for MetricValue<'a> {
    fn from(v: &'a [f64]) -> Self {
        MetricValue::PackedFloat(v)
    }
}

/// Reusable scratch space for rendering numbers without allocating.
pub(crate) struct ValueFormatter {
    int_writer: itoa::Buffer,
    float_writer: ryu::Buffer,
}

impl fmt::Debug for ValueFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueFormatter { .. }")
    }
}

impl ValueFormatter {
    pub fn new() -> Self {
        ValueFormatter {
            int_writer: itoa::Buffer::new(),
            float_writer: ryu::Buffer::new(),
        }
    }

    pub fn int<I: itoa::Integer>(&mut self, v: I) -> &str {
        self.int_writer.format(v)
    }

    pub fn float<F: ryu::Float>(&mut self, v: F) -> &str {
        self.float_writer.format(v)
    }

    /// Append `:` followed by the value as one segment. On overflow nothing
    /// of the value is left in the buffer.
    pub fn write_value(&mut self, buf: &mut DatagramBuffer, value: &MetricValue<'_>) -> Result<(), Truncated> {
        let mark = buf.len();
        let res = self.write_value_parts(buf, value);
        if res.is_err() {
            buf.truncate(mark);
        }
        res
    }

    fn write_value_parts(&mut self, buf: &mut DatagramBuffer, value: &MetricValue<'_>) -> Result<(), Truncated> {
        match *value {
            MetricValue::Signed(v) => buf.try_extend_all(&[b":", self.int(v).as_bytes()]),
            MetricValue::Unsigned(v) => buf.try_extend_all(&[b":", self.int(v).as_bytes()]),
            MetricValue::Float(v) => buf.try_extend_all(&[b":", self.float(v).as_bytes()]),
            MetricValue::Str(v) => buf.try_extend_all(&[b":", v.as_bytes()]),
            MetricValue::PackedUnsigned(vals) => {
                if vals.is_empty() {
                    return buf.try_extend(b":");
                }
                for v in vals {
                    buf.try_extend_all(&[b":", self.int(*v).as_bytes()])?;
                }
                Ok(())
            }
            MetricValue::PackedFloat(vals) => {
                if vals.is_empty() {
                    return buf.try_extend(b":");
                }
                for v in vals {
                    buf.try_extend_all(&[b":", self.float(*v).as_bytes()])?;
                }
                Ok(())
            }
        }
    }
}
