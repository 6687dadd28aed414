// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use ::log::Level;
use std::io;

use crate::sinks::core::MetricSink;

const LOG_TARGET: &str = "metrics";

/// Implementation of a `MetricSink` that emits datagrams using the `log!` macro.
///
/// Datagrams are emitted at the `Level` provided at construction with a target
/// of `metrics`. Note that the number of bytes written returned by `emit` does
/// not reflect whether the level is high enough to be active.
#[derive(Debug, Clone)]
pub struct LoggingMetricSink {
    level: Level,
}

impl LoggingMetricSink {
    pub fn new(level: Level) -> LoggingMetricSink {
        LoggingMetricSink { level }
    }
}

impl Default for LoggingMetricSink {
    fn default() -> Self {
        LoggingMetricSink::new(Level::Info)
    }
}

impl MetricSink for LoggingMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        log!(target: LOG_TARGET, self.level, "{}", metric);
        Ok(metric.len())
    }
}
