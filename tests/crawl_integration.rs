//! End-to-end crawl cycles against a mocked hosting API

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use camino::Utf8PathBuf;
use chrono::{DateTime, Days, TimeZone, Utc};
use repo_trending::config::Config;
use repo_trending::fetch::{Progress, WindowKind, search_query};
use repo_trending::model::Period;
use repo_trending::pipeline::{CrawlOutcome, CrawlRequest, Crawler, ExhaustionPolicy, FailureKind};
use repo_trending::store::{HistoryPolicy, JsonReportStore, ReportStore};
use repo_trending::trends::TrendStatus;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 9, 9];

/// No-op progress reporter for testing
#[derive(Debug)]
struct NoOpProgress;

impl Progress for NoOpProgress {
    fn set_phase(&self, _phase: &str) {}
    fn set_determinate(&self, _callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {}
    fn set_indeterminate(&self, _callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {}
    fn done(&self) {}
}

fn repo_json(full_name: &str, stars: u64) -> serde_json::Value {
    let (owner, name) = full_name.split_once('/').unwrap();
    json!({
        "full_name": full_name,
        "name": name,
        "owner": { "login": owner },
        "html_url": format!("https://example.com/{full_name}"),
        "description": format!("The {name} project"),
        "language": "Rust",
        "topics": ["cli"],
        "stargazers_count": stars,
        "forks_count": stars / 10,
        "open_issues_count": 1,
        "watchers_count": stars,
        "default_branch": "main",
        "created_at": "2023-06-01T00:00:00Z",
        "pushed_at": "2024-02-12T00:00:00Z",
    })
}

/// Mount search results for the weekly window, plus detail, README and languages per repository.
async fn mount_cycle(server: &MockServer, now: DateTime<Utc>, repos: &[(&str, u64, Option<&str>)]) {
    let items: Vec<_> = repos.iter().map(|(name, stars, _)| repo_json(name, *stars)).collect();
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", search_query(WindowKind::Weekly, "", 50, now)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_count": items.len(), "items": items })))
        .mount(server)
        .await;

    for (name, stars, readme) in repos {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(repo_json(name, *stars)))
            .mount(server)
            .await;

        let readme_response = match readme {
            Some(text) => ResponseTemplate::new(200).set_body_json(json!({ "content": STANDARD.encode(text), "encoding": "base64" })),
            None => ResponseTemplate::new(404),
        };
        Mock::given(method("GET"))
            .and(path(format!("/repos/{name}/readme")))
            .respond_with(readme_response)
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/repos/{name}/languages")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Rust": 1000 })))
            .mount(server)
            .await;
    }
}

fn config_for(server: &MockServer) -> Config {
    Config {
        api_base_url: server.uri(),
        raw_content_base_url: server.uri(),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

struct Workspace {
    _guard: tempfile::TempDir,
    root: Utf8PathBuf,
    store: Arc<JsonReportStore>,
}

impl Workspace {
    fn new() -> Self {
        let guard = tempfile::tempdir().expect("Failed to create temp dir");
        let root = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).expect("temp dir is not UTF-8");
        let store = Arc::new(JsonReportStore::new(root.join("reports"), HistoryPolicy::Upsert));
        Self { _guard: guard, root, store }
    }

    fn crawler(&self, config: &Config, now: DateTime<Utc>) -> Crawler {
        Crawler::new(config, None, Arc::clone(&self.store) as Arc<dyn ReportStore>, self.root.join("images"), now).unwrap()
    }
}

#[tokio::test]
async fn test_two_cycles_produce_trends() {
    let workspace = Workspace::new();
    let first_run = Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap();
    let second_run = first_run.checked_add_days(Days::new(7)).unwrap();

    let first = MockServer::start().await;
    mount_cycle(&first, first_run, &[("a/one", 900, Some("# One\n\n![logo](./logo.png)\n")), ("b/two", 300, None)]).await;
    Mock::given(method("GET"))
        .and(path("/a/one/main/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES).insert_header("content-type", "image/png"))
        .expect(1)
        .mount(&first)
        .await;

    let outcome = workspace
        .crawler(&config_for(&first), first_run)
        .run(&CrawlRequest::default(), first_run, &NoOpProgress)
        .await;

    let CrawlOutcome::Success { report, location, stats } = outcome else {
        panic!("first cycle failed: {outcome}");
    };
    assert_eq!(report.period, Period::Week { year: 2024, week: 7 });
    assert_eq!(location, workspace.root.join("reports").join("2024-W07.json"));
    assert!(location.exists());
    assert!(!stats.has_previous);
    assert_eq!(stats.images, 1);
    assert!(stats.issues.is_empty());

    let ranks: Vec<_> = report.repositories.iter().map(|r| (r.full_name.as_str(), r.rank)).collect();
    assert_eq!(ranks, [("a/one", 1), ("b/two", 2)]);
    assert!(report.repositories.iter().all(|r| r.trend.is_new && r.trend.status == TrendStatus::New));

    let image = report.repositories[0].image.as_ref().unwrap();
    assert_eq!(image.path, workspace.root.join("images").join("2024-W07").join("a_one").join("1_logo.png"));
    assert!(image.path.exists());
    assert!(report.repositories[1].image.is_none());

    let second = MockServer::start().await;
    mount_cycle(&second, second_run, &[("b/two", 1500, None), ("a/one", 950, None), ("c/three", 100, None)]).await;

    let outcome = workspace
        .crawler(&config_for(&second), second_run)
        .run(&CrawlRequest::default(), second_run, &NoOpProgress)
        .await;

    let CrawlOutcome::Success { report, stats, .. } = outcome else {
        panic!("second cycle failed: {outcome}");
    };
    assert!(stats.has_previous);
    assert_eq!(report.period, Period::Week { year: 2024, week: 8 });

    let two = &report.repositories[0];
    assert_eq!(two.full_name, "b/two");
    assert_eq!(two.trend.status, TrendStatus::Rising);
    assert_eq!(two.trend.rank_change, 1);
    assert_eq!(two.trend.star_change, 1200);

    let one = &report.repositories[1];
    assert_eq!(one.trend.status, TrendStatus::Falling);
    assert_eq!(one.trend.rank_change, -1);
    assert_eq!(one.trend.star_change, 50);
    assert_eq!(one.trend.previous_rank, Some(1));

    let three = &report.repositories[2];
    assert_eq!(three.trend.status, TrendStatus::New);
    assert!(three.trend.is_new);

    assert_eq!(workspace.store.load_all().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rerun_in_same_period_replaces_report() {
    let workspace = Workspace::new();
    let now = Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 2, 15, 8, 0, 0).unwrap();

    let server = MockServer::start().await;
    mount_cycle(&server, now, &[("a/one", 900, None)]).await;
    let outcome = workspace.crawler(&config_for(&server), now).run(&CrawlRequest::default(), now, &NoOpProgress).await;
    assert!(outcome.is_success(), "{outcome}");

    let server = MockServer::start().await;
    mount_cycle(&server, later, &[("a/one", 990, None)]).await;
    let outcome = workspace.crawler(&config_for(&server), later).run(&CrawlRequest::default(), later, &NoOpProgress).await;

    // A rerun in the same week has no earlier period to compare against
    let report = outcome.report().unwrap();
    assert_eq!(report.repositories[0].trend.status, TrendStatus::New);

    let stored = workspace.store.load_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].repositories[0].stars, 990);
}

#[tokio::test]
async fn test_empty_search_is_a_failure_by_default() {
    let workspace = Workspace::new();
    let now = Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap();

    let server = MockServer::start().await;
    mount_cycle(&server, now, &[]).await;

    let outcome = workspace.crawler(&config_for(&server), now).run(&CrawlRequest::default(), now, &NoOpProgress).await;
    assert!(matches!(outcome, CrawlOutcome::Failure { kind: FailureKind::Exhaustion, .. }), "{outcome}");
    assert!(workspace.store.load_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_search_can_skip_the_cycle() {
    let workspace = Workspace::new();
    let now = Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap();

    let server = MockServer::start().await;
    mount_cycle(&server, now, &[]).await;

    let config = Config {
        exhaustion_policy: ExhaustionPolicy::EmptyCycle,
        ..config_for(&server)
    };

    let outcome = workspace.crawler(&config, now).run(&CrawlRequest::default(), now, &NoOpProgress).await;
    let CrawlOutcome::Skipped { period, .. } = outcome else {
        panic!("expected a skipped cycle, got {outcome}");
    };
    assert_eq!(period.label(), "2024-W07");
    assert!(workspace.store.load_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_zero_limit_is_rejected_before_any_request() {
    let workspace = Workspace::new();
    let now = Utc.with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let request = CrawlRequest {
        limit: 0,
        ..CrawlRequest::default()
    };
    let outcome = workspace.crawler(&config_for(&server), now).run(&request, now, &NoOpProgress).await;
    assert!(matches!(outcome, CrawlOutcome::Failure { kind: FailureKind::Validation, .. }), "{outcome}");
}
