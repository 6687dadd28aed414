// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Export commonly used parts of this crate for easy glob imports
//!
//! # Example
//!
//! ```
//! use statsd_datagram::prelude::*;
//!
//! let client = StatsdClient::from_sink("some.prefix", NopMetricSink);
//! client.count("some.counter", 1).unwrap();
//!
//! let mut builder = DatagramBuilder::new("", Vec::<String>::new());
//! let datagram = builder.encode("some.gauge", MetricValue::from(45u64), "g", None, &Tags::None);
//! assert_eq!(&b"some.gauge:45|g"[..], datagram);
//! ```

pub use crate::builder::{DatagramBuilder, MetricValue, SampleRate};
pub use crate::normalize::Tags;
pub use crate::sinks::{MetricSink, NopMetricSink};
pub use crate::client::StatsdClient;
pub use crate::types::{MetricResult, Protocol};
