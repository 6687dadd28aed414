// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::convert::TryFrom;
use std::fmt;
use std::net::{ToSocketAddrs, UdpSocket};
use std::panic::RefUnwindSafe;
use std::str;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::builder::{DatagramBuilder, MetricValue, SampleRate};
use crate::config::ClientConfig;
use crate::normalize::{normalize_name, Tags};
use crate::sampler::{Sampler, Sampling};
use crate::sinks::{MetricSink, UdpMetricSink};
use crate::types::{ErrorKind, MetricError, MetricResult, MetricType, Protocol};

/// Conversion trait for valid values for timers
///
/// This trait must be implemented for any types that are used as timer
/// values (currently `u64` milliseconds, `f64` fractional milliseconds and
/// `Duration`).
pub trait ToTimerValue {
    fn try_to_value(self) -> MetricResult<MetricValue<'static>>;
}

impl ToTimerValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue<'static>> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToTimerValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue<'static>> {
        if self.is_finite() && self >= 0.0 {
            Ok(MetricValue::Float(self))
        } else {
            Err(MetricError::from((
                ErrorKind::InvalidInput,
                "Timer value must be finite and non-negative",
            )))
        }
    }
}

impl ToTimerValue for Duration {
    fn try_to_value(self) -> MetricResult<MetricValue<'static>> {
        let as_millis = self.as_millis();
        u64::try_from(as_millis)
            .map(MetricValue::Unsigned)
            .map_err(|_| MetricError::from((ErrorKind::InvalidInput, "u64 overflow")))
    }
}

/// Builder for adding tags, a sample rate or dropping the prefix before
/// sending a single metric.
///
/// Instances are returned by the `*_with_tags` methods of `StatsdClient`.
/// Nothing is sent until `.send()` or `.try_send()` is called.
///
/// # Example
///
/// ```
/// use statsd_datagram::{StatsdClient, NopMetricSink};
///
/// let client = StatsdClient::from_sink("some.prefix", NopMetricSink);
/// let res = client.count_with_tags("some.counter", 1)
///     .with_tags(&["region:us-east-1", "host:web01"])
///     .with_sample_rate(0.5)
///     .try_send();
///
/// assert!(res.is_ok());
/// ```
#[must_use = "Did you forget to call .send() after adding tags?"]
pub struct MetricBuilder<'a> {
    client: &'a StatsdClient,
    name: &'a str,
    value: MetricResult<MetricValue<'a>>,
    metric_type: MetricType,
    tags: Tags<'a>,
    sample_rate: Option<SampleRate>,
    prefixed: bool,
}

impl<'a> MetricBuilder<'a> {
    fn new(
        client: &'a StatsdClient,
        name: &'a str,
        value: MetricResult<MetricValue<'a>>,
        metric_type: MetricType,
    ) -> Self {
        MetricBuilder {
            client,
            name,
            value,
            metric_type,
            tags: Tags::None,
            sample_rate: None,
            prefixed: true,
        }
    }

    /// Set the tags sent with this metric. Default tags of the client are
    /// appended after these.
    pub fn with_tags<T>(mut self, tags: T) -> Self
    where
        T: Into<Tags<'a>>,
    {
        self.tags = tags.into();
        self
    }

    /// Override the default sample rate of the client for this metric.
    pub fn with_sample_rate<R>(mut self, rate: R) -> Self
    where
        R: Into<SampleRate>,
    {
        self.sample_rate = Some(rate.into());
        self
    }

    /// Send this metric without the client prefix.
    pub fn without_prefix(mut self) -> Self {
        self.prefixed = false;
        self
    }

    /// Send the metric, returning the number of bytes handed to the sink.
    ///
    /// A metric dropped by sampling is not an error and returns `0`.
    pub fn try_send(self) -> MetricResult<usize> {
        let value = self.value?;
        self.client.send_metric(
            self.name,
            value,
            self.metric_type,
            self.sample_rate,
            &self.tags,
            self.prefixed,
        )
    }

    /// Send the metric, passing any error to the error handler of the client.
    pub fn send(self) {
        let client = self.client;
        if let Err(e) = self.try_send() {
            client.consume_error(e);
        }
    }
}

impl<'a> fmt::Debug for MetricBuilder<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricBuilder")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("metric_type", &self.metric_type)
            .field("tags", &self.tags)
            .field("sample_rate", &self.sample_rate)
            .field("prefixed", &self.prefixed)
            .finish()
    }
}

/// Builder for creating and customizing `StatsdClient` instances.
///
/// Instances of the builder should be created by calling the `::builder()`
/// method on the `StatsClient` struct.
///
/// # Example
///
/// ```
/// use statsd_datagram::{MetricError, NopMetricSink, Protocol, StatsdClient};
///
/// fn my_error_handler(err: MetricError) {
///     println!("Metric error! {}", err);
/// }
///
/// let client = StatsdClient::builder("prefix", NopMetricSink)
///     .with_error_handler(my_error_handler)
///     .with_default_tags(vec!["environment:production"])
///     .with_default_sample_rate(0.5)
///     .with_protocol(Protocol::Datadog)
///     .build()
///     .unwrap();
///
/// client.count_with_tags("some.counter", 42)
///     .with_tags(&["region:us-east-2"])
///     .send();
/// ```
pub struct StatsdClientBuilder {
    prefix: String,
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    errors: Box<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>,
    default_tags: Vec<String>,
    sample_rate: SampleRate,
    protocol: Protocol,
}

impl StatsdClientBuilder {
    // Set the required fields and defaults for optional fields
    fn new<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder {
            // required
            prefix: Self::formatted_prefix(prefix),
            sink: Box::new(sink),

            // optional with defaults
            errors: Box::new(nop_error_handler),
            default_tags: Vec::new(),
            sample_rate: SampleRate::from(1),
            protocol: Protocol::default(),
        }
    }

    /// Set an error handler to use for metrics sent via `MetricBuilder::send()`
    /// and `StatsdClient::measure()`.
    ///
    /// The error handler should consume the error without panicking. The error
    /// may be logged (see `log_error_handler`), discarded, etc.
    pub fn with_error_handler<F>(mut self, errors: F) -> Self
    where
        F: Fn(MetricError) + Sync + Send + RefUnwindSafe + 'static,
    {
        self.errors = Box::new(errors);
        self
    }

    /// Tags appended to every metric sent by the built client, after any tags
    /// given for the metric itself.
    pub fn with_default_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.default_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sample rate used for metrics that don't set one. Must be in `[0, 1]`.
    pub fn with_default_sample_rate<R>(mut self, rate: R) -> Self
    where
        R: Into<SampleRate>,
    {
        self.sample_rate = rate.into();
        self
    }

    /// StatsD flavor spoken by the server, `Protocol::Datadog` by default.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Construct a new `StatsdClient` instance based on current settings.
    ///
    /// # Failures
    ///
    /// * The default sample rate is outside of `[0, 1]`.
    /// * Default tags were given for a protocol that doesn't support tags.
    pub fn build(self) -> MetricResult<StatsdClient> {
        check_rate(self.sample_rate)?;
        if !self.default_tags.is_empty() && !self.protocol.supports_tags() {
            return Err(MetricError::from((
                ErrorKind::Unsupported,
                "Default tags are not supported by this protocol",
            )));
        }

        Ok(StatsdClient::from_builder(self))
    }

    fn formatted_prefix(prefix: &str) -> String {
        let trimmed = prefix.trim_end_matches('.');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}.", normalize_name(trimmed))
        }
    }
}

/// Client for StatsD that encodes metrics with a `DatagramBuilder` and hands
/// each datagram to a `MetricSink`.
///
/// # Threading
///
/// The client is `Send` and `Sync`, share it between threads by wrapping it
/// in an `Arc`. Each of its two builders (with and without the prefix) sits
/// behind its own `Mutex`, held only while a datagram is encoded and emitted.
///
/// ``` no_run
/// use std::sync::Arc;
/// use std::thread;
/// use statsd_datagram::{StatsdClient, DEFAULT_PORT};
///
/// let client = StatsdClient::from_udp_host("my.app", ("localhost", DEFAULT_PORT)).unwrap();
/// let client = Arc::new(client);
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let client = Arc::clone(&client);
///         thread::spawn(move || {
///             let _ = client.incr("worker.started");
///         })
///     })
///     .collect();
///
/// for h in handles {
///     h.join().unwrap();
/// }
/// ```
pub struct StatsdClient {
    prefix: String,
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    errors: Box<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>,
    sample_rate: SampleRate,
    protocol: Protocol,
    prefixed: Mutex<DatagramBuilder>,
    bare: Mutex<DatagramBuilder>,
}

impl StatsdClient {
    /// Create a new client instance that will use the given prefix for
    /// all metrics emitted to the given `MetricSink` implementation.
    ///
    /// The client speaks the DogStatsD flavor, sends every metric and
    /// discards errors encountered in `MetricBuilder::send()`.
    ///
    /// # Example
    ///
    /// ```
    /// use statsd_datagram::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink("my.stats", NopMetricSink);
    /// ```
    pub fn from_sink<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        Self::from_builder(Self::builder(prefix, sink))
    }

    /// Create a new client that sends metrics over UDP to the given host.
    ///
    /// A non-blocking socket bound to an ephemeral local port is used.
    ///
    /// # Failures
    ///
    /// This method may fail if the local socket can't be bound or the host
    /// can't be resolved.
    pub fn from_udp_host<A>(prefix: &str, host: A) -> MetricResult<Self>
    where
        A: ToSocketAddrs,
    {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(true)?;
        let sink = UdpMetricSink::from(host, socket)?;
        Ok(StatsdClient::from_sink(prefix, sink))
    }

    /// Create a new client sending over UDP using settings read from the
    /// environment (see `ClientConfig::from_env`).
    ///
    /// ```no_run
    /// use statsd_datagram::{ClientConfig, StatsdClient};
    ///
    /// let config = ClientConfig::from_env().unwrap();
    /// let client = StatsdClient::from_config(&config).unwrap();
    /// ```
    pub fn from_config(config: &ClientConfig) -> MetricResult<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(true)?;
        let sink = UdpMetricSink::from(config.addr.as_str(), socket)?;

        Self::builder(config.prefix.as_deref().unwrap_or(""), sink)
            .with_default_tags(config.default_tags.iter().cloned())
            .with_default_sample_rate(config.sample_rate)
            .with_protocol(config.protocol)
            .build()
    }

    /// Create a new builder with the provided prefix and metric sink.
    ///
    /// The prefix is normalized like a metric name and joined to every name
    /// with a `.`, an empty prefix means names are sent as given.
    ///
    /// General defaults:
    ///
    /// * No default tags.
    /// * A default sample rate of `1`.
    /// * The `Protocol::Datadog` flavor.
    /// * A no-op error handler.
    pub fn builder<T>(prefix: &str, sink: T) -> StatsdClientBuilder
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder::new(prefix, sink)
    }

    /// Flush the underlying metric sink.
    pub fn flush(&self) -> MetricResult<()> {
        Ok(self.sink.flush()?)
    }

    /// Increment the counter by `1`
    pub fn incr(&self, name: &str) -> MetricResult<usize> {
        self.count(name, 1)
    }

    /// Decrement the counter by `1`
    pub fn decr(&self, name: &str) -> MetricResult<usize> {
        self.count(name, -1)
    }

    /// Increment or decrement the counter by the given amount
    pub fn count(&self, name: &str, value: i64) -> MetricResult<usize> {
        self.count_with_tags(name, value).try_send()
    }

    pub fn count_with_tags<'a>(&'a self, name: &'a str, value: i64) -> MetricBuilder<'a> {
        MetricBuilder::new(self, name, Ok(MetricValue::Signed(value)), MetricType::Counter)
    }

    pub fn gauge<'a, V>(&'a self, name: &'a str, value: V) -> MetricResult<usize>
    where
        V: Into<MetricValue<'a>>,
    {
        self.gauge_with_tags(name, value).try_send()
    }

    pub fn gauge_with_tags<'a, V>(&'a self, name: &'a str, value: V) -> MetricBuilder<'a>
    where
        V: Into<MetricValue<'a>>,
    {
        MetricBuilder::new(self, name, Ok(value.into()), MetricType::Gauge)
    }

    /// Record a timing in milliseconds, as a `u64`, an `f64` or a `Duration`.
    ///
    /// A `Duration` is sent in whole milliseconds.
    pub fn time<T>(&self, name: &str, time: T) -> MetricResult<usize>
    where
        T: ToTimerValue,
    {
        self.time_with_tags(name, time).try_send()
    }

    pub fn time_with_tags<'a, T>(&'a self, name: &'a str, time: T) -> MetricBuilder<'a>
    where
        T: ToTimerValue,
    {
        MetricBuilder::new(self, name, time.try_to_value(), MetricType::Timer)
    }

    pub fn set<'a, V>(&'a self, name: &'a str, value: V) -> MetricResult<usize>
    where
        V: Into<MetricValue<'a>>,
    {
        self.set_with_tags(name, value).try_send()
    }

    pub fn set_with_tags<'a, V>(&'a self, name: &'a str, value: V) -> MetricBuilder<'a>
    where
        V: Into<MetricValue<'a>>,
    {
        MetricBuilder::new(self, name, Ok(value.into()), MetricType::Set)
    }

    pub fn histogram<'a, V>(&'a self, name: &'a str, value: V) -> MetricResult<usize>
    where
        V: Into<MetricValue<'a>>,
    {
        self.histogram_with_tags(name, value).try_send()
    }

    pub fn histogram_with_tags<'a, V>(&'a self, name: &'a str, value: V) -> MetricBuilder<'a>
    where
        V: Into<MetricValue<'a>>,
    {
        MetricBuilder::new(self, name, Ok(value.into()), MetricType::Histogram)
    }

    pub fn distribution<'a, V>(&'a self, name: &'a str, value: V) -> MetricResult<usize>
    where
        V: Into<MetricValue<'a>>,
    {
        self.distribution_with_tags(name, value).try_send()
    }

    pub fn distribution_with_tags<'a, V>(&'a self, name: &'a str, value: V) -> MetricBuilder<'a>
    where
        V: Into<MetricValue<'a>>,
    {
        MetricBuilder::new(self, name, Ok(value.into()), MetricType::Distribution)
    }

    /// Record a key/value metric, only carried by `Protocol::Statsite`.
    pub fn key_value<'a, V>(&'a self, name: &'a str, value: V) -> MetricResult<usize>
    where
        V: Into<MetricValue<'a>>,
    {
        self.key_value_with_tags(name, value).try_send()
    }

    pub fn key_value_with_tags<'a, V>(&'a self, name: &'a str, value: V) -> MetricBuilder<'a>
    where
        V: Into<MetricValue<'a>>,
    {
        MetricBuilder::new(self, name, Ok(value.into()), MetricType::KeyValue)
    }

    /// Run `f` and record how long it took as a timer in milliseconds.
    ///
    /// The elapsed time is sent with sub-millisecond precision. The result of
    /// `f` is returned as is; an error sending the timer goes to the error
    /// handler.
    ///
    /// ```
    /// use statsd_datagram::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink("my.app", NopMetricSink);
    /// let sum = client.measure("compute.sum", || (1..=10).sum::<u32>());
    /// assert_eq!(55, sum);
    /// ```
    pub fn measure<F, R>(&self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.timed(name, MetricType::Timer, f)
    }

    /// Run `f` and record how long it took as a distribution in milliseconds.
    ///
    /// Only `Protocol::Datadog` carries distributions, other flavors report
    /// an `Unsupported` error to the error handler.
    pub fn measure_distribution<F, R>(&self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.timed(name, MetricType::Distribution, f)
    }

    /// Run `f` and record how long it took using the latency type of the
    /// protocol: a distribution for DogStatsD, a timer otherwise.
    ///
    /// ```
    /// use statsd_datagram::{Protocol, SpyMetricSink, StatsdClient};
    ///
    /// let (rx, sink) = SpyMetricSink::new();
    /// let client = StatsdClient::builder("", sink)
    ///     .with_protocol(Protocol::Statsd)
    ///     .build()
    ///     .unwrap();
    ///
    /// client.latency("db.query", || ());
    /// let sent = String::from_utf8(rx.try_recv().unwrap()).unwrap();
    /// assert!(sent.ends_with("|ms"));
    /// ```
    pub fn latency<F, R>(&self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.timed(name, self.protocol.latency_metric_type(), f)
    }

    fn timed<F, R>(&self, name: &str, metric_type: MetricType, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let res = f();
        let millis = start.elapsed().as_secs_f64() * 1000.0;
        MetricBuilder::new(self, name, Ok(MetricValue::Float(millis)), metric_type).send();
        res
    }

    // Create a new StatsdClient by consuming the builder
    fn from_builder(builder: StatsdClientBuilder) -> Self {
        let prefixed = DatagramBuilder::new(&builder.prefix, &builder.default_tags);
        let bare = DatagramBuilder::new("", &builder.default_tags);

        StatsdClient {
            prefix: builder.prefix,
            sink: builder.sink,
            errors: builder.errors,
            sample_rate: builder.sample_rate,
            protocol: builder.protocol,
            prefixed: Mutex::new(prefixed),
            bare: Mutex::new(bare),
        }
    }

    fn send_metric(
        &self,
        name: &str,
        value: MetricValue<'_>,
        metric_type: MetricType,
        sample_rate: Option<SampleRate>,
        tags: &Tags<'_>,
        prefixed: bool,
    ) -> MetricResult<usize> {
        if !self.protocol.supports_type(metric_type) {
            return Err(MetricError::from((
                ErrorKind::Unsupported,
                "Metric type is not supported by this protocol",
            )));
        }

        if !tags.is_empty() && !self.protocol.supports_tags() {
            return Err(MetricError::from((
                ErrorKind::Unsupported,
                "Tags are not supported by this protocol",
            )));
        }

        let rate = sample_rate.unwrap_or(self.sample_rate);
        check_rate(rate)?;
        if rate.is_partial() && !Sampler::new_with_rate(rate.value()).should_emit() {
            return Ok(0);
        }

        let lock = if prefixed { &self.prefixed } else { &self.bare };
        // A panic while encoding can't leave the builder half written, every
        // call starts by resetting the buffer to the prefix.
        let mut builder = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let datagram = builder.encode(name, value, metric_type.as_str(), Some(rate), tags);
        let metric = str::from_utf8(datagram)
            .map_err(|_| MetricError::from((ErrorKind::InvalidInput, "Datagram is not valid UTF-8")))?;

        Ok(self.sink.emit(metric)?)
    }

    fn consume_error(&self, err: MetricError) {
        (self.errors)(err);
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatsdClient {{ prefix: {:?}, sink: ..., errors: ..., sample_rate: {:?}, protocol: {:?} }}",
            self.prefix, self.sample_rate, self.protocol,
        )
    }
}

fn check_rate(rate: SampleRate) -> MetricResult<()> {
    SampleRate::checked(rate.value()).map(|_| ())
}

fn nop_error_handler(_err: MetricError) {
    // nothing
}

/// Error handler that reports failed metrics through the `log` facade at
/// the `warn` level.
pub fn log_error_handler(err: MetricError) {
    warn!("failed to send metric: {}", err);
}
