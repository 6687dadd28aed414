use statsd_datagram::{
    ClientConfig, ErrorKind, LoggingMetricSink, MetricSink, NopMetricSink, Protocol, SpyMetricSink, StatsdClient,
};

mod utils;
use utils::{drain, new_spy_client, run_arc_threaded_test};

#[test]
fn test_statsd_client_nop_sink_single_threaded() {
    let client = StatsdClient::from_sink("counter.threaded.nop", NopMetricSink);
    run_arc_threaded_test(client, 1, 1);
}

#[test]
fn test_statsd_client_spy_sink_many_threaded() {
    let (rx, client) = new_spy_client("counter.threaded.spy");
    run_arc_threaded_test(client, 10, 20);

    let sent = drain(&rx);
    assert_eq!(10 * 20 * 8, sent.len());
    assert!(sent.iter().all(|m| m.starts_with("counter.threaded.spy.some.")));
    assert!(sent
        .iter()
        .filter(|m| m.contains("|#"))
        .all(|m| m.ends_with("|#thread:worker")));
}

#[test]
fn test_statsd_client_logging_sink() {
    let client = StatsdClient::from_sink("counter.logging", LoggingMetricSink::default());
    assert_eq!(32, client.count("some.counter", 1).unwrap());
}

#[test]
fn test_statsd_client_prefix_is_normalized() {
    let (rx, client) = new_spy_client("my:app.");
    client.incr("hits").unwrap();
    assert_eq!(vec!["my_app.hits:1|c"], drain(&rx));
}

#[test]
fn test_statsd_client_default_tags_and_call_tags() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder("web", sink)
        .with_default_tags(vec!["env:prod", "region:eu"])
        .build()
        .unwrap();

    client.incr("requests").unwrap();
    client
        .time_with_tags("latency", 12u64)
        .with_tags(&[("route", "home"), ("status", "200")])
        .try_send()
        .unwrap();
    client
        .gauge_with_tags("workers", 4u64)
        .with_tags(&["pool:main"])
        .without_prefix()
        .try_send()
        .unwrap();

    assert_eq!(
        vec![
            "web.requests:1|c|#env:prod,region:eu",
            "web.latency:12|ms|#route:home,status:200,env:prod,region:eu",
            "workers:4|g|#pool:main,env:prod,region:eu",
        ],
        drain(&rx)
    );
}

#[test]
fn test_statsd_client_default_sample_rate_written() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder("", sink)
        .with_default_sample_rate(1.0)
        .build()
        .unwrap();

    client.count_with_tags("hits", 1).with_sample_rate(1).try_send().unwrap();
    assert_eq!(vec!["hits:1|c"], drain(&rx));
}

#[test]
fn test_statsd_client_sampled_metrics_carry_rate() {
    let (rx, client) = new_spy_client("");
    for _ in 0..200 {
        client.count_with_tags("hits", 1).with_sample_rate(0.5).try_send().unwrap();
    }

    let sent = drain(&rx);
    assert!(sent.len() <= 200);
    assert!(sent.iter().all(|m| m == "hits:1|c|@0.5"));
}

#[test]
fn test_statsd_client_statsd_protocol() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder("app", sink)
        .with_protocol(Protocol::Statsd)
        .build()
        .unwrap();

    client.count("hits", 2).unwrap();
    client.set("users", 42i64).unwrap();
    assert_eq!(ErrorKind::Unsupported, client.distribution("d", 1.0).unwrap_err().kind());
    assert_eq!(
        ErrorKind::Unsupported,
        client
            .gauge_with_tags("g", 1u64)
            .with_tags(&["a"])
            .try_send()
            .unwrap_err()
            .kind()
    );

    assert_eq!(vec!["app.hits:2|c", "app.users:42|s"], drain(&rx));
}

#[test]
fn test_statsd_client_from_config_bad_address() {
    let config = ClientConfig {
        addr: "not-an-address".to_string(),
        ..ClientConfig::default()
    };
    assert!(StatsdClient::from_config(&config).is_err());
}

#[test]
fn test_statsd_client_from_config() {
    let config = ClientConfig::from_vars(vec![
        ("STATSD_ADDR", "127.0.0.1:8125"),
        ("STATSD_PREFIX", "svc"),
        ("STATSD_DEFAULT_TAGS", "env:test"),
        ("STATSD_SAMPLE_RATE", "1"),
    ])
    .unwrap();

    let client = StatsdClient::from_config(&config).unwrap();
    assert!(client.count("boot", 1).is_ok());
}

#[test]
fn test_statsd_client_from_config_statsd_with_tags_fails() {
    let config = ClientConfig::from_vars(vec![
        ("STATSD_ADDR", "127.0.0.1:8125"),
        ("STATSD_DEFAULT_TAGS", "env:test"),
        ("STATSD_IMPLEMENTATION", "statsd"),
    ])
    .unwrap();

    let err = StatsdClient::from_config(&config).unwrap_err();
    assert_eq!(ErrorKind::Unsupported, err.kind());
}

#[test]
fn test_spy_sink_stats_after_client_use() {
    let (rx, sink) = SpyMetricSink::with_capacity(2);
    assert_eq!(0, sink.stats().packets_sent);

    let client = StatsdClient::from_sink("", sink);
    client.incr("a").unwrap();
    client.incr("b").unwrap();

    let err = client.incr("c").unwrap_err();
    assert_eq!(ErrorKind::IoError, err.kind());
    assert_eq!(vec!["a:1|c", "b:1|c"], drain(&rx));
}

#[test]
fn test_statsd_client_latency_follows_protocol() {
    let (rx, client) = new_spy_client("svc");
    client.latency("db.query", || ());

    let (statsd_rx, sink) = SpyMetricSink::new();
    let statsd = StatsdClient::builder("svc", sink)
        .with_protocol(Protocol::Statsd)
        .build()
        .unwrap();
    statsd.latency("db.query", || ());

    let sent = drain(&rx);
    assert_eq!(1, sent.len());
    assert!(sent[0].starts_with("svc.db.query:") && sent[0].ends_with("|d"));

    let sent = drain(&statsd_rx);
    assert_eq!(1, sent.len());
    assert!(sent[0].starts_with("svc.db.query:") && sent[0].ends_with("|ms"));
}
