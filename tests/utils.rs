use crossbeam_channel::Receiver;
use statsd_datagram::{DatagramBuilder, MetricValue, SampleRate, SpyMetricSink, StatsdClient, Tags};
use std::sync::Arc;
use std::thread;

/// Encode a metric and copy the datagram out of the builder as a `String`.
#[allow(dead_code)]
pub fn encode_to_string(
    builder: &mut DatagramBuilder,
    name: &str,
    value: MetricValue<'_>,
    metric_type: &str,
    sample_rate: Option<SampleRate>,
    tags: &Tags<'_>,
) -> String {
    let out = builder.encode(name, value, metric_type, sample_rate, tags);
    String::from_utf8(out.to_vec()).unwrap()
}

/// Drain every datagram currently queued on a spy channel.
#[allow(dead_code)]
pub fn drain(rx: &Receiver<Vec<u8>>) -> Vec<String> {
    rx.try_iter().map(|v| String::from_utf8(v).unwrap()).collect()
}

#[allow(dead_code)]
pub fn new_spy_client(prefix: &str) -> (Receiver<Vec<u8>>, StatsdClient) {
    let (rx, sink) = SpyMetricSink::new();
    (rx, StatsdClient::from_sink(prefix, sink))
}

#[allow(dead_code)]
pub fn run_arc_threaded_test(client: StatsdClient, num_threads: u64, iterations: u64) {
    let shared_client = Arc::new(client);

    let threads: Vec<_> = (0..num_threads)
        .map(|_| {
            let local_client = Arc::clone(&shared_client);

            thread::spawn(move || {
                for i in 0..iterations {
                    local_client.count("some.counter", i as i64).unwrap();
                    local_client.time("some.timer", i).unwrap();
                    local_client.gauge("some.gauge", i).unwrap();
                    local_client.gauge("some.gauge", i as f64).unwrap();
                    local_client.histogram("some.histogram", i).unwrap();
                    local_client.distribution("some.distribution", i).unwrap();
                    local_client.set("some.set", i as i64).unwrap();
                    local_client
                        .count_with_tags("some.counter", 1)
                        .with_tags(&["thread:worker"])
                        .try_send()
                        .unwrap();
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }
}
