//! One log event per rate-limited attempt and per terminal failure.
//!
//! Events are captured with a `tracing_subscriber` fmt layer that writes into
//! a shared buffer. The runtime is current-thread, so a scoped default
//! subscriber sees every event the client emits.

use rustpubmed::pubmed::PubmedClient;
use rustpubmed::PipelineConfig;
use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = "<PubmedArticleSet><PubmedArticle><ArticleTitle>Ok</ArticleTitle></PubmedArticle></PubmedArticleSet>";

#[derive(Clone)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Logged output of the crate while `fut` runs.
struct Captured(String);

impl Captured {
    fn lines_at(&self, level: &str) -> Vec<&str> {
        let level = format!(" {} ", level);
        self.0.lines().filter(|l| l.contains(&level)).collect()
    }

    fn count(&self, level: &str, message: &str) -> usize {
        self.lines_at(level)
            .iter()
            .filter(|l| l.contains(message))
            .count()
    }
}

async fn capture<F: Future>(fut: F) -> (F::Output, Captured) {
    let buf = SharedBuf(Arc::new(Mutex::new(Vec::new())));
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_env_filter(EnvFilter::new("rustpubmed=debug"))
        .finish();

    let output = {
        let _guard = tracing::subscriber::set_default(subscriber);
        fut.await
    };

    let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    (output, Captured(text))
}

fn client(server: &MockServer) -> PubmedClient {
    let config = PipelineConfig::default()
        .with_base_url(server.uri())
        .with_backoff_unit(Duration::from_millis(1));
    PubmedClient::new(config).unwrap()
}

async fn mount_efetch(server: &MockServer, id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", id))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sustained_rate_limit_logs_each_attempt_and_one_give_up() {
    let server = MockServer::start().await;
    mount_efetch(&server, "7", ResponseTemplate::new(429)).await;
    let client = client(&server);

    let (doc, logs) = capture(client.fetch_detail("7")).await;

    assert!(doc.is_none());
    assert_eq!(logs.count("WARN", "Rate limit exceeded"), 5);
    assert_eq!(logs.count("WARN", "Giving up on paper"), 1);
    assert_eq!(logs.lines_at("WARN").len(), 6, "{}", logs.0);
    assert!(logs.lines_at("ERROR").is_empty());
}

#[tokio::test]
async fn test_rate_limit_then_success_logs_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_efetch(&server, "8", ResponseTemplate::new(200).set_body_string(ARTICLE)).await;
    let client = client(&server);

    let (doc, logs) = capture(client.fetch_detail("8")).await;

    assert!(doc.is_some());
    assert_eq!(logs.lines_at("WARN").len(), 1, "{}", logs.0);
    assert_eq!(logs.count("WARN", "Rate limit exceeded"), 1);
}

#[tokio::test]
async fn test_server_error_logs_once() {
    let server = MockServer::start().await;
    mount_efetch(&server, "9", ResponseTemplate::new(503)).await;
    let client = client(&server);

    let (doc, logs) = capture(client.fetch_detail("9")).await;

    assert!(doc.is_none());
    assert_eq!(logs.lines_at("WARN").len(), 1, "{}", logs.0);
    assert_eq!(logs.count("WARN", "Error fetching paper"), 1);
    assert_eq!(logs.count("WARN", "Giving up"), 0);
}

#[tokio::test]
async fn test_unparseable_bodies_log_once() {
    let deep = format!(
        "<PubmedArticleSet>{}{}</PubmedArticleSet>",
        "<x>".repeat(100_000),
        "</x>".repeat(100_000)
    );

    for body in ["<PubmedArticleSet><oops></PubmedArticleSet>".to_string(), deep] {
        let server = MockServer::start().await;
        mount_efetch(&server, "10", ResponseTemplate::new(200).set_body_string(body)).await;
        let client = client(&server);

        let (doc, logs) = capture(client.fetch_detail("10")).await;

        assert!(doc.is_none());
        assert_eq!(logs.lines_at("WARN").len(), 1, "{}", logs.0);
        assert_eq!(logs.count("WARN", "Error fetching paper"), 1);
    }
}

#[tokio::test]
async fn test_success_logs_no_warning() {
    let server = MockServer::start().await;
    mount_efetch(&server, "11", ResponseTemplate::new(200).set_body_string(ARTICLE)).await;
    let client = client(&server);

    let (doc, logs) = capture(client.fetch_detail("11")).await;

    assert!(doc.is_some());
    assert!(logs.lines_at("WARN").is_empty(), "{}", logs.0);
    assert_eq!(logs.count("DEBUG", "Fetched paper details"), 1);
}

#[tokio::test]
async fn test_search_failure_logs_one_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = client(&server);

    let (ids, logs) = capture(client.search("kinase")).await;

    assert!(ids.is_empty());
    assert_eq!(logs.lines_at("ERROR").len(), 1, "{}", logs.0);
    assert_eq!(logs.count("ERROR", "PubMed search failed"), 1);
    assert!(logs.lines_at("WARN").is_empty());
}
