// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::value::ValueFormatter;
use crate::types::{ErrorKind, MetricError};

/// Represents the sample rate of a metric.
///
/// Only rates below `1` are written to a datagram (as `|@<rate>`); a rate of
/// `1` or more means every occurrence is sent, which is what servers assume
/// when the field is missing.
///
/// Integer rates are written in plain decimal, floating point rates in the
/// shortest form that round-trips (`0.5`, `0.01`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRate(Repr);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Repr {
    Integer(i64),
    Float32(f32),
    Float64(f64),
}

impl SampleRate {
    /// Rate as a probability.
    pub fn value(&self) -> f64 {
        match self.0 {
            Repr::Integer(v) => v as f64,
            Repr::Float32(v) => f64::from(v),
            Repr::Float64(v) => v,
        }
    }

    /// True when the rate is below `1` and so needs to be written.
    pub fn is_partial(&self) -> bool {
        self.value() < 1.0
    }

    pub(crate) fn render<'f>(&self, fmt: &'f mut ValueFormatter) -> &'f str {
        match self.0 {
            Repr::Integer(v) => fmt.int(v),
            Repr::Float32(v) => fmt.float(v),
            Repr::Float64(v) => fmt.float(v),
        }
    }

    /// Build a rate that must lie within `[0, 1]`, as required for rates
    /// used to decide whether a metric is sent at all.
    pub fn checked(rate: f64) -> Result<Self, MetricError> {
        if (0.0..=1.0).contains(&rate) {
            Ok(SampleRate::from(rate))
        } else {
            Err(MetricError::from((
                ErrorKind::InvalidInput,
                "Sample rate must be between 0.0 and 1.0",
            )))
        }
    }
}

impl From<f64> for SampleRate {
    fn from(rate: f64) -> Self {
        SampleRate(Repr::Float64(rate))
    }
}

impl From<f32> for SampleRate {
    fn from(rate: f32) -> Self {
        SampleRate(Repr::Float32(rate))
    }
}

impl From<i64> for SampleRate {
    fn from(rate: i64) -> Self {
        SampleRate(Repr::Integer(rate))
    }
}

impl From<i32> for SampleRate {
    fn from(rate: i32) -> Self {
        SampleRate(Repr::Integer(i64::from(rate)))
    }
}

impl From<u32> for SampleRate {
    fn from(rate: u32) -> Self {
        SampleRate(Repr::Integer(i64::from(rate)))
    }
}

#[cfg(test)]
mod tests {
    use super::SampleRate;
    use crate::builder::value::ValueFormatter;
    use crate::types::ErrorKind;

    fn rendered(rate: SampleRate) -> String {
        let mut fmt = ValueFormatter::new();
        rate.render(&mut fmt).to_string()
    }

    #[test]
    fn test_render_float() {
        assert_eq!("0.5", rendered(SampleRate::from(0.5)));
        assert_eq!("0.01", rendered(SampleRate::from(0.01)));
        assert_eq!("0.1", rendered(SampleRate::from(0.1f32)));
    }

    #[test]
    fn test_render_integer() {
        assert_eq!("0", rendered(SampleRate::from(0)));
    }

    #[test]
    fn test_is_partial() {
        assert!(SampleRate::from(0.5).is_partial());
        assert!(SampleRate::from(0).is_partial());
        assert!(!SampleRate::from(1).is_partial());
        assert!(!SampleRate::from(1.0).is_partial());
        assert!(!SampleRate::from(2.5).is_partial());
        assert!(!SampleRate::from(f64::NAN).is_partial());
    }

    #[test]
    fn test_checked_range() {
        assert!(SampleRate::checked(0.0).is_ok());
        assert!(SampleRate::checked(1.0).is_ok());
        assert_eq!(ErrorKind::InvalidInput, SampleRate::checked(1.5).unwrap_err().kind());
        assert_eq!(ErrorKind::InvalidInput, SampleRate::checked(-0.1).unwrap_err().kind());
        assert!(SampleRate::checked(f64::NAN).is_err());
    }
}
