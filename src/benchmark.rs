// src/benchmark.rs
// =============================================================================
// Response-time benchmark: a handful of sequential GETs with caching disabled.
//
// Each run sends its own no-cache headers (nothing is left behind on the
// shared client) and waits one second before the next run. Any response,
// whatever its status, is a timed run. Runs that fail outright are logged and
// left out of min/avg/max.
// =============================================================================

use crate::net::{HttpClient, RequestOptions};
use crate::schedule::Clock;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::warn;
use url::Url;

pub const DEFAULT_RUNS: usize = 5;
const PAUSE_BETWEEN_RUNS: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Serialize)]
pub struct RunSample {
    pub run: usize,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunSample {
    pub fn is_timed(&self) -> bool {
        self.status.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkSummary {
    pub url: String,
    pub samples: Vec<RunSample>,
    pub min_ms: Option<u64>,
    pub max_ms: Option<u64>,
    pub avg_ms: Option<f64>,
}

impl BenchmarkSummary {
    pub fn from_samples(url: &Url, samples: Vec<RunSample>) -> Self {
        let timed: Vec<u64> = samples
            .iter()
            .filter(|s| s.is_timed())
            .map(|s| s.elapsed_ms)
            .collect();

        let avg_ms = if timed.is_empty() {
            None
        } else {
            Some(timed.iter().sum::<u64>() as f64 / timed.len() as f64)
        };

        Self {
            url: url.to_string(),
            min_ms: timed.iter().copied().min(),
            max_ms: timed.iter().copied().max(),
            avg_ms,
            samples,
        }
    }
}

pub async fn benchmark<C: Clock + ?Sized>(
    client: &HttpClient,
    options: &RequestOptions,
    url: &Url,
    runs: usize,
    clock: &C,
) -> BenchmarkSummary {
    let options = options
        .clone()
        .with_header("Cache-Control", "no-cache, no-store")
        .with_header("Pragma", "no-cache");

    let mut samples = Vec::with_capacity(runs);
    for run in 1..=runs {
        let started = Instant::now();
        let result = client.send(url, &options).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let sample = match result {
            Ok(response) => RunSample {
                run,
                elapsed_ms,
                status: Some(response.status().as_u16()),
                error: None,
            },
            Err(error) => {
                warn!(%url, run, %error, "benchmark run failed");
                RunSample {
                    run,
                    elapsed_ms,
                    status: None,
                    error: Some(error.to_string()),
                }
            }
        };
        samples.push(sample);

        if run < runs {
            clock.sleep(PAUSE_BETWEEN_RUNS).await;
        }
    }

    BenchmarkSummary::from_samples(url, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ManualClock;
    use wiremock::matchers::{header, header_exists, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample(run: usize, elapsed_ms: u64, status: Option<u16>) -> RunSample {
        RunSample {
            run,
            elapsed_ms,
            status,
            error: status.is_none().then(|| "timed out".to_string()),
        }
    }

    #[test]
    fn test_summary_ignores_failed_runs() {
        let url = Url::parse("https://x.com/").unwrap();
        let summary = BenchmarkSummary::from_samples(
            &url,
            vec![
                sample(1, 100, Some(200)),
                sample(2, 30_000, None),
                sample(3, 50, Some(404)),
                sample(4, 150, Some(200)),
            ],
        );
        assert_eq!(summary.min_ms, Some(50));
        assert_eq!(summary.max_ms, Some(150));
        assert_eq!(summary.avg_ms, Some(100.0));
    }

    #[test]
    fn test_summary_without_successes_has_no_stats() {
        let url = Url::parse("https://x.com/").unwrap();
        let summary = BenchmarkSummary::from_samples(&url, vec![sample(1, 10, None)]);
        assert_eq!(summary.min_ms, None);
        assert_eq!(summary.avg_ms, None);
    }

    #[tokio::test]
    async fn test_benchmark_sends_no_cache_headers_and_pauses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("cache-control"))
            .and(header("pragma", "no-cache"))
            .respond_with(ResponseTemplate::new(200))
            .expect(3)
            .mount(&server)
            .await;

        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let clock = ManualClock::default();

        let summary = benchmark(&client, &RequestOptions::new("ua"), &url, 3, &clock).await;
        assert_eq!(summary.samples.len(), 3);
        assert!(summary.samples.iter().all(|s| s.status == Some(200)));
        assert_eq!(clock.sleeps(), vec![PAUSE_BETWEEN_RUNS; 2]);
    }
}
