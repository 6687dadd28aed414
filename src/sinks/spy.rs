// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::sinks::core::{MetricSink, SinkStats, SocketStats};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use std::io::{self, ErrorKind};

/// `MetricSink` implementation that writes all datagrams to the `Sender` half
/// of a channel while callers are given ownership of the `Receiver` half.
///
/// This is not a general purpose sink, rather it's a sink meant for verifying
/// datagrams written during the course of tests. By default, the channel
/// used is unbounded. The channel size can be limited using the `with_capacity`
/// method.
///
/// # Example
///
/// ```
/// use statsd_datagram::{MetricSink, SpyMetricSink};
///
/// let (rx, sink) = SpyMetricSink::new();
/// sink.emit("buz:1|c").unwrap();
///
/// assert_eq!(b"buz:1|c".to_vec(), rx.recv().unwrap());
/// ```
#[derive(Debug)]
pub struct SpyMetricSink {
    sender: Sender<Vec<u8>>,
    stats: SocketStats,
}

impl SpyMetricSink {
    pub fn new() -> (Receiver<Vec<u8>>, Self) {
        Self::with_queue_capacity(None)
    }

    pub fn with_capacity(queue: usize) -> (Receiver<Vec<u8>>, Self) {
        Self::with_queue_capacity(Some(queue))
    }

    fn with_queue_capacity(queue: Option<usize>) -> (Receiver<Vec<u8>>, Self) {
        let (tx, rx) = match queue {
            Some(sz) => bounded(sz),
            None => unbounded(),
        };

        let sink = SpyMetricSink {
            sender: tx,
            stats: SocketStats::default(),
        };
        (rx, sink)
    }
}

impl MetricSink for SpyMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        let res = match self.sender.try_send(metric.as_bytes().to_vec()) {
            Err(TrySendError::Disconnected(_)) => Err(io::Error::new(ErrorKind::Other, "channel disconnected")),
            Err(TrySendError::Full(_)) => Err(io::Error::new(ErrorKind::Other, "channel full")),
            Ok(_) => Ok(metric.len()),
        };

        self.stats.update(res, metric.len())
    }

    fn stats(&self) -> SinkStats {
        (&self.stats).into()
    }
}
