use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use sweepr_common::config::SweepConfig;
use sweepr_common::network::address::Address;
use sweepr_core::probe::Status;
use sweepr_core::probe::icmp::IcmpProber;
use sweepr_core::sweep::{ProgressCallback, Sweeper};

use crate::support::MockProber;

fn addresses(count: usize) -> Vec<Address> {
    (0..count).map(|i| Address::new(format!("host-{i}"))).collect()
}

/// Completion order is scrambled by giving earlier inputs longer delays;
/// the report must still come back in input order.
#[tokio::test]
async fn results_preserve_input_order() {
    let count = 20;
    let mut prober = MockProber::new(Status::Offline);
    for i in 0..count {
        let name = format!("host-{i}");
        prober = prober.delay(&name, Duration::from_millis(((count - i) * 5) as u64));
        if i % 3 == 0 {
            prober = prober.script(&name, Status::Online);
        }
    }

    let sweeper = Sweeper::new(Arc::new(prober));
    let report = sweeper
        .run(&addresses(count), &SweepConfig::default(), None)
        .await;

    assert_eq!(report.len(), count);
    for (i, result) in report.results().iter().enumerate() {
        assert_eq!(result.address, Address::new(format!("host-{i}")));
        let expected = if i % 3 == 0 {
            Status::Online
        } else {
            Status::Offline
        };
        assert_eq!(result.status, expected, "wrong status at row {i}");
    }
}

#[tokio::test]
async fn duplicate_addresses_each_get_a_row() {
    let input: Vec<Address> = ["10.0.0.1", "10.0.0.1", "10.0.0.1"]
        .into_iter()
        .map(Address::new)
        .collect();

    let sweeper = Sweeper::new(Arc::new(MockProber::new(Status::Online)));
    let report = sweeper.run(&input, &SweepConfig::default(), None).await;

    assert_eq!(report.len(), 3);
    assert!(
        report
            .results()
            .iter()
            .all(|r| r.address == Address::new("10.0.0.1") && r.status == Status::Online)
    );
}

#[tokio::test]
async fn empty_address_list_yields_empty_report() {
    let sweeper = Sweeper::new(Arc::new(MockProber::new(Status::Online)));
    let report = sweeper.run(&[], &SweepConfig::default(), None).await;
    assert!(report.is_empty());
}

/// 100 slow probes with the default pool run effectively all at once:
/// total wall-clock stays near one probe's latency, nowhere near the
/// 20 s a serial sweep would take.
#[tokio::test]
async fn probes_run_concurrently() {
    let prober = MockProber::new(Status::Offline)
        .with_default_delay(Duration::from_millis(200));
    let sweeper = Sweeper::new(Arc::new(prober));

    let start = Instant::now();
    let report = sweeper
        .run(&addresses(100), &SweepConfig::default(), None)
        .await;
    let elapsed = start.elapsed();

    assert_eq!(report.len(), 100);
    assert!(
        elapsed < Duration::from_secs(1),
        "sweep took {elapsed:?}, expected concurrent execution"
    );
}

/// With a pool of 10, the same sweep runs in waves: bounded below by
/// (100 / 10) * 200 ms, and still far below the serial 20 s.
#[tokio::test]
async fn pool_size_bounds_concurrency() {
    let prober = MockProber::new(Status::Offline)
        .with_default_delay(Duration::from_millis(200));
    let sweeper = Sweeper::new(Arc::new(prober));

    let cfg = SweepConfig {
        pool_size: Some(10),
        timeout: Duration::from_millis(200),
        ..SweepConfig::default()
    };

    let start = Instant::now();
    let report = sweeper.run(&addresses(100), &cfg, None).await;
    let elapsed = start.elapsed();

    assert_eq!(report.len(), 100);
    assert!(
        elapsed >= Duration::from_secs(2),
        "sweep took {elapsed:?}, pool limit was not applied"
    );
    assert!(
        elapsed < Duration::from_secs(5),
        "sweep took {elapsed:?}, expected bounded-pool concurrency"
    );
}

#[tokio::test]
async fn progress_callback_sees_every_completion() {
    let reported_max = Arc::new(AtomicUsize::new(0));
    let reported_ref = reported_max.clone();
    let on_probe_done: Option<ProgressCallback> = Some(Box::new(move |done| {
        reported_ref.fetch_max(done, Ordering::Relaxed);
    }));

    let sweeper = Sweeper::new(Arc::new(MockProber::new(Status::Online)));
    let report = sweeper
        .run(&addresses(25), &SweepConfig::default(), on_probe_done)
        .await;

    assert_eq!(report.len(), 25);
    assert_eq!(reported_max.load(Ordering::Relaxed), 25);
}

/// Live ICMP probe against loopback. Raw channels need privileges, so
/// the test skips itself when they cannot be opened.
#[tokio::test]
async fn icmp_probe_classifies_loopback_online() {
    let prober = match IcmpProber::new(Duration::from_millis(1000), 1) {
        Ok(prober) => prober,
        Err(e) => {
            eprintln!("Skipping ICMP test: cannot open raw channels ({e})");
            return;
        }
    };

    let sweeper = Sweeper::new(Arc::new(prober));
    let input = vec![Address::new("127.0.0.1")];
    let report = sweeper.run(&input, &SweepConfig::default(), None).await;

    assert_eq!(report.len(), 1);
    assert_eq!(report.results()[0].status, Status::Online);
}

/// A name that cannot resolve classifies as HostNotFound (or Offline on
/// platforms that report generic unreachability instead).
#[tokio::test]
async fn icmp_probe_flags_unresolvable_names() {
    let prober = match IcmpProber::new(Duration::from_millis(200), 1) {
        Ok(prober) => prober,
        Err(e) => {
            eprintln!("Skipping ICMP test: cannot open raw channels ({e})");
            return;
        }
    };

    let sweeper = Sweeper::new(Arc::new(prober));
    let input = vec![Address::new("invalid.nonexistent.domain.test")];
    let report = sweeper.run(&input, &SweepConfig::default(), None).await;

    assert_eq!(report.len(), 1);
    assert!(matches!(
        report.results()[0].status,
        Status::HostNotFound | Status::Offline
    ));
}
