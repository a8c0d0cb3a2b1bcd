//! Fetch coordinator regression test
//!
//! A scripted in-memory source stands in for the network. Time is paused
//! so backoff sleeps and simulated latency advance instantly.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use stripcut_core::{ImageFormat, Pix, PixMut, PixelDepth, color};
use stripcut_fetch::{FetchError, FetchOptions, FetchResult, PanelSource, RetryPolicy, fetch_all};
use stripcut_segment::Background;
use stripcut_test::RegParams;
use stripcut_test::synth;
use tokio::time::Instant;

#[derive(Clone)]
enum Reply {
    Image(Vec<u8>),
    Status(u16),
    Garbage,
}

struct Script {
    replies: Vec<Reply>,
    delay: Duration,
}

/// Replays a fixed sequence of replies per URL; the last reply repeats.
#[derive(Default)]
struct MockSource {
    scripts: HashMap<String, Script>,
    calls: Mutex<HashMap<String, usize>>,
    referers: Mutex<Vec<Option<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSource {
    fn add(&mut self, url: &str, delay: Duration, replies: Vec<Reply>) {
        self.scripts
            .insert(url.to_string(), Script { replies, delay });
    }

    fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PanelSource for MockSource {
    async fn fetch(&self, url: &str, referer: Option<&str>) -> FetchResult<Vec<u8>> {
        let script = &self.scripts[url];
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(url.to_string()).or_insert(0);
            *n += 1;
            *n - 1
        };
        self.referers
            .lock()
            .unwrap()
            .push(referer.map(str::to_string));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(script.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = &script.replies[call.min(script.replies.len() - 1)];
        match reply {
            Reply::Image(bytes) => Ok(bytes.clone()),
            Reply::Status(status) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            Reply::Garbage => Ok(b"<html>not found</html>".to_vec()),
        }
    }
}

/// PNG of a gray block whose height identifies the panel.
fn panel_png(index: usize) -> Vec<u8> {
    let pix = synth::solid(8, 10 * index as u32, 128).unwrap();
    stripcut_io::write_image_mem(&pix, ImageFormat::Png).unwrap()
}

fn urls(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("https://cdn.test/{}.png", i)).collect()
}

#[tokio::test(start_paused = true)]
async fn fetch_order_reg() {
    let mut rp = RegParams::new("fetch_order");

    // Earlier panels finish later
    let urls = urls(5);
    let mut source = MockSource::default();
    for (i, url) in urls.iter().enumerate() {
        let delay = Duration::from_millis(100 * (5 - i as u64));
        source.add(url, delay, vec![Reply::Image(panel_png(i + 1))]);
    }
    let source = Arc::new(source);

    let options = FetchOptions::default().with_referer("https://reader.test/ch1");
    let fragments = fetch_all(source.clone(), &urls, &options).await.unwrap();

    rp.compare_values(5.0, fragments.len() as f64, 0.0);
    for (i, fragment) in fragments.iter().enumerate() {
        rp.compare_values((i + 1) as f64, fragment.index as f64, 0.0);
        rp.compare_values(10.0 * (i + 1) as f64, fragment.height() as f64, 0.0);
        rp.compare_values(3.0, fragment.pix.spp() as f64, 0.0);
    }
    let referers = source.referers.lock().unwrap().clone();
    rp.compare_true(
        referers
            .iter()
            .all(|r| r.as_deref() == Some("https://reader.test/ch1")),
        "referer sent with every request",
    );

    assert!(rp.cleanup(), "fetch_order regression test failed");
}

#[tokio::test(start_paused = true)]
async fn fetch_concurrency_limit_reg() {
    let mut rp = RegParams::new("fetch_concurrency");

    let urls = urls(12);
    let mut source = MockSource::default();
    for (i, url) in urls.iter().enumerate() {
        source.add(
            url,
            Duration::from_millis(100),
            vec![Reply::Image(panel_png(i + 1))],
        );
    }
    let source = Arc::new(source);

    let start = Instant::now();
    let options = FetchOptions::default().with_concurrency_limit(3);
    let fragments = fetch_all(source.clone(), &urls, &options).await.unwrap();

    rp.compare_values(12.0, fragments.len() as f64, 0.0);
    rp.compare_values(
        3.0,
        source.max_in_flight.load(Ordering::SeqCst) as f64,
        0.0,
    );
    // 12 panels, 3 at a time, 100 ms each
    rp.compare_true(
        start.elapsed() >= Duration::from_millis(400),
        "limit forces four rounds",
    );

    assert!(rp.cleanup(), "fetch_concurrency regression test failed");
}

#[tokio::test(start_paused = true)]
async fn fetch_retry_reg() {
    let mut rp = RegParams::new("fetch_retry");

    let urls = urls(3);
    let mut source = MockSource::default();
    source.add(&urls[0], Duration::ZERO, vec![Reply::Image(panel_png(1))]);
    source.add(
        &urls[1],
        Duration::ZERO,
        vec![Reply::Status(503), Reply::Garbage, Reply::Image(panel_png(2))],
    );
    source.add(&urls[2], Duration::ZERO, vec![Reply::Image(panel_png(3))]);
    let source = Arc::new(source);

    // Default policy: unlimited attempts, 1 s apart
    let start = Instant::now();
    let fragments = fetch_all(source.clone(), &urls, &FetchOptions::default())
        .await
        .unwrap();

    rp.compare_values(3.0, fragments.len() as f64, 0.0);
    rp.compare_values(20.0, fragments[1].height() as f64, 0.0);
    rp.compare_values(3.0, source.calls(&urls[1]) as f64, 0.0);
    rp.compare_values(1.0, source.calls(&urls[0]) as f64, 0.0);
    rp.compare_true(
        start.elapsed() >= Duration::from_secs(2),
        "two backoff pauses",
    );

    assert!(rp.cleanup(), "fetch_retry regression test failed");
}

#[tokio::test(start_paused = true)]
async fn fetch_retries_exhausted_reg() {
    let mut rp = RegParams::new("fetch_exhausted");

    let urls = urls(2);
    let mut source = MockSource::default();
    source.add(&urls[0], Duration::ZERO, vec![Reply::Image(panel_png(1))]);
    source.add(&urls[1], Duration::ZERO, vec![Reply::Status(500)]);
    let source = Arc::new(source);

    let policy = RetryPolicy::default()
        .with_max_attempts(3)
        .with_fixed_backoff(Duration::from_millis(10));
    let options = FetchOptions::default().with_retry(policy);
    let err = fetch_all(source.clone(), &urls, &options).await.unwrap_err();

    match err {
        FetchError::RetriesExhausted {
            index,
            attempts,
            last_error,
            ..
        } => {
            rp.compare_values(2.0, index as f64, 0.0);
            rp.compare_values(3.0, attempts as f64, 0.0);
            rp.compare_true(
                matches!(*last_error, FetchError::Status { status: 500, .. }),
                "last error is the 500",
            );
        }
        other => {
            rp.compare_true(false, &format!("unexpected error: {}", other));
        }
    }
    rp.compare_values(3.0, source.calls(&urls[1]) as f64, 0.0);

    assert!(rp.cleanup(), "fetch_exhausted regression test failed");
}

#[tokio::test(start_paused = true)]
async fn fetch_staging_and_alpha_reg() {
    let mut rp = RegParams::new("fetch_staging");

    // Fully transparent RGBA panel
    let mut rgba = PixMut::new(4, 4, PixelDepth::Bit32).unwrap();
    rgba.set_spp(4);
    rgba.fill(color::compose_rgba(10, 20, 30, 0));
    let rgba: Pix = rgba.into();
    let rgba_png = stripcut_io::write_image_mem(&rgba, ImageFormat::Png).unwrap();

    let urls = urls(2);
    let mut source = MockSource::default();
    source.add(&urls[0], Duration::ZERO, vec![Reply::Image(rgba_png)]);
    source.add(&urls[1], Duration::ZERO, vec![Reply::Image(panel_png(2))]);
    let source = Arc::new(source);

    let dir = tempfile::tempdir().unwrap();
    let staging = dir.path().join("staging");
    let options = FetchOptions::default().with_staging_dir(&staging);
    let fragments = fetch_all(source.clone(), &urls, &options).await.unwrap();

    rp.compare_values(3.0, fragments[0].pix.spp() as f64, 0.0);
    rp.compare_true(
        fragments[0].pix.get_pixel(0, 0) == Some(color::WHITE),
        "transparent pixels flattened onto white",
    );
    for i in 1..=2 {
        let path = staging.join(format!("{}.png", i));
        rp.compare_true(path.exists(), "staged file exists");
        let staged = stripcut_io::read_image(&path).unwrap();
        rp.compare_pix(&staged, &fragments[i - 1].pix);
    }

    let options = FetchOptions::default().with_background(Background::Black);
    let fragments = fetch_all(source, &urls, &options).await.unwrap();
    rp.compare_true(
        fragments[0].pix.get_pixel(0, 0) == Some(color::BLACK),
        "transparent pixels flattened onto black",
    );

    assert!(rp.cleanup(), "fetch_staging regression test failed");
}

#[tokio::test]
async fn fetch_edge_cases_reg() {
    let mut rp = RegParams::new("fetch_edges");

    let source: Arc<dyn PanelSource> = Arc::new(MockSource::default());
    let fragments = fetch_all(source.clone(), &[], &FetchOptions::default())
        .await
        .unwrap();
    rp.compare_values(0.0, fragments.len() as f64, 0.0);

    let options = FetchOptions::default().with_concurrency_limit(0);
    let result = fetch_all(source, &urls(1), &options).await;
    rp.compare_true(
        matches!(result, Err(FetchError::InvalidOptions(_))),
        "zero concurrency rejected",
    );

    assert!(rp.cleanup(), "fetch_edges regression test failed");
}
