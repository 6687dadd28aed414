// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt;
use std::io;
use std::str::FromStr;

/// Type of metric, knows the short code used for it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Counter,
    Gauge,
    Timer,
    Set,
    Histogram,
    Distribution,
    KeyValue,
}

impl MetricType {
    /// The type code written after the `|` separator.
    pub fn as_str(&self) -> &'static str {
        match *self {
            MetricType::Counter => "c",
            MetricType::Gauge => "g",
            MetricType::Timer => "ms",
            MetricType::Set => "s",
            MetricType::Histogram => "h",
            MetricType::Distribution => "d",
            MetricType::KeyValue => "kv",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl FromStr for MetricType {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c" => Ok(MetricType::Counter),
            "g" => Ok(MetricType::Gauge),
            "ms" => Ok(MetricType::Timer),
            "s" => Ok(MetricType::Set),
            "h" => Ok(MetricType::Histogram),
            "d" => Ok(MetricType::Distribution),
            "kv" => Ok(MetricType::KeyValue),
            _ => Err(MetricError::from((ErrorKind::InvalidInput, "Unknown metric type code"))),
        }
    }
}

/// Flavor of the StatsD line protocol spoken by the receiving server.
///
/// The encoder itself always produces the same grammar; the flavor only
/// decides which metric types and whether tags are allowed to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// DogStatsD: tags, histograms and distributions are supported.
    #[default]
    Datadog,
    /// Plain Etsy StatsD: no tags, no histograms or distributions.
    Statsd,
    /// Statsite: plain StatsD plus key/value metrics.
    Statsite,
}

impl Protocol {
    pub fn supports_type(&self, metric_type: MetricType) -> bool {
        match *self {
            Protocol::Datadog => metric_type != MetricType::KeyValue,
            Protocol::Statsd => matches!(
                metric_type,
                MetricType::Counter | MetricType::Gauge | MetricType::Timer | MetricType::Set
            ),
            Protocol::Statsite => metric_type != MetricType::Histogram && metric_type != MetricType::Distribution,
        }
    }

    pub fn supports_tags(&self) -> bool {
        matches!(*self, Protocol::Datadog)
    }

    /// Type used when timing a block: distributions where the server has
    /// them, plain timers everywhere else.
    pub fn latency_metric_type(&self) -> MetricType {
        match *self {
            Protocol::Datadog => MetricType::Distribution,
            Protocol::Statsd | Protocol::Statsite => MetricType::Timer,
        }
    }
}

impl FromStr for Protocol {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "datadog" | "dogstatsd" => Ok(Protocol::Datadog),
            "statsd" => Ok(Protocol::Statsd),
            "statsite" => Ok(Protocol::Statsite),
            _ => Err(MetricError::from((
                ErrorKind::InvalidInput,
                "Unknown StatsD implementation",
            ))),
        }
    }
}

/// Potential categories an error from this library falls into.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Unsupported,
    IoError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ErrorKind::InvalidInput => "invalid input".fmt(f),
            ErrorKind::Unsupported => "unsupported by protocol".fmt(f),
            ErrorKind::IoError => "i/o error".fmt(f),
        }
    }
}

/// Error generated by this library potentially wrapping another
/// type of error (exposed via the `Error` trait).
#[derive(Debug)]
pub struct MetricError {
    repr: ErrorRepr,
}

#[derive(Debug)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    IoError(io::Error),
}

impl MetricError {
    /// Return the kind of the error
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::IoError(_) => ErrorKind::IoError,
            ErrorRepr::WithDescription(kind, _) => kind,
        }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            ErrorRepr::IoError(ref err) => err.fmt(f),
            ErrorRepr::WithDescription(kind, desc) => write!(f, "{}: {}", kind, desc),
        }
    }
}

impl error::Error for MetricError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr {
            ErrorRepr::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MetricError {
    fn from(err: io::Error) -> MetricError {
        MetricError {
            repr: ErrorRepr::IoError(err),
        }
    }
}

impl From<(ErrorKind, &'static str)> for MetricError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;

#[cfg(test)]
mod tests {
    use super::{ErrorKind, MetricError, MetricType, Protocol};
    use std::error::Error;
    use std::io;

    #[test]
    fn test_metric_type_codes_parse_back() {
        let all = [
            MetricType::Counter,
            MetricType::Gauge,
            MetricType::Timer,
            MetricType::Set,
            MetricType::Histogram,
            MetricType::Distribution,
            MetricType::KeyValue,
        ];

        for t in all {
            assert_eq!(t, t.as_str().parse::<MetricType>().unwrap());
        }
    }

    #[test]
    fn test_metric_type_unknown_code() {
        let err = "x".parse::<MetricType>().unwrap_err();
        assert_eq!(ErrorKind::InvalidInput, err.kind());
    }

    #[test]
    fn test_protocol_from_str() {
        assert_eq!(Protocol::Datadog, "datadog".parse().unwrap());
        assert_eq!(Protocol::Datadog, "dogstatsd".parse().unwrap());
        assert_eq!(Protocol::Statsd, "statsd".parse().unwrap());
        assert_eq!(Protocol::Statsite, "statsite".parse().unwrap());
        assert!("graphite".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_protocol_statsd_rejects_extensions() {
        assert!(Protocol::Statsd.supports_type(MetricType::Counter));
        assert!(Protocol::Statsd.supports_type(MetricType::Set));
        assert!(!Protocol::Statsd.supports_type(MetricType::Histogram));
        assert!(!Protocol::Statsd.supports_type(MetricType::Distribution));
        assert!(!Protocol::Statsd.supports_type(MetricType::KeyValue));
        assert!(!Protocol::Statsd.supports_tags());
    }

    #[test]
    fn test_protocol_latency_metric_type() {
        assert_eq!(MetricType::Distribution, Protocol::Datadog.latency_metric_type());
        assert_eq!(MetricType::Timer, Protocol::Statsd.latency_metric_type());
        assert_eq!(MetricType::Timer, Protocol::Statsite.latency_metric_type());

        for p in [Protocol::Datadog, Protocol::Statsd, Protocol::Statsite] {
            assert!(p.supports_type(p.latency_metric_type()));
        }
    }

    #[test]
    fn test_protocol_statsite_accepts_key_value() {
        assert!(Protocol::Statsite.supports_type(MetricType::KeyValue));
        assert!(Protocol::Statsite.supports_type(MetricType::Timer));
        assert!(!Protocol::Statsite.supports_type(MetricType::Histogram));
        assert!(!Protocol::Statsite.supports_tags());
    }

    #[test]
    fn test_protocol_datadog_rejects_key_value() {
        assert!(Protocol::Datadog.supports_type(MetricType::Distribution));
        assert!(!Protocol::Datadog.supports_type(MetricType::KeyValue));
        assert!(Protocol::Datadog.supports_tags());
    }

    #[test]
    fn test_metric_error_kind_io_error() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "Broken!");
        let our_err = MetricError::from(io_err);
        assert_eq!(ErrorKind::IoError, our_err.kind());
        assert!(our_err.source().is_some());
    }

    #[test]
    fn test_metric_error_display_with_description() {
        let err = MetricError::from((ErrorKind::Unsupported, "Tags are not supported"));
        assert_eq!("unsupported by protocol: Tags are not supported", err.to_string());
        assert!(err.source().is_none());
    }
}
