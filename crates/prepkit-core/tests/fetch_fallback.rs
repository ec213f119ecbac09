//! Integration tests for the fetcher: mirror fallback order, exhaustion,
//! partial-write cleanup, idempotent re-runs, and progress reporting,
//! against a local fault-injecting HTTP server.

mod common;

use common::http_server::{self, ServerOptions};
use prepkit_core::config::PrepkitConfig;
use prepkit_core::fetch::{fetch, FetchError, FetchOutcome, FetchRequest};
use prepkit_core::progress::ProgressUpdate;
use tempfile::tempdir;

fn collect_percents(updates: &mut Vec<f64>) -> impl FnMut(&ProgressUpdate) + '_ {
    move |u: &ProgressUpdate| updates.push(u.percent)
}

#[test]
fn existing_destination_skips_transport() {
    let server = http_server::start(b"network copy".to_vec());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("a.zip");
    std::fs::write(&dest, b"local copy").unwrap();

    let request = FetchRequest::single(&server.url, &dest);
    let mut sink = |_: &ProgressUpdate| {};
    let outcome = fetch(&request, &PrepkitConfig::default(), &mut sink).unwrap();

    assert_eq!(outcome, FetchOutcome::AlreadyPresent);
    assert_eq!(server.hits(), 0, "no request may be made");
    assert_eq!(std::fs::read(&dest).unwrap(), b"local copy");
}

#[test]
fn sources_are_tried_in_order_and_later_ones_skipped() {
    let a = http_server::start_with_options(
        b"from-a".to_vec(),
        ServerOptions {
            status: 500,
            ..Default::default()
        },
    );
    let b = http_server::start(b"from-b".to_vec());
    let c = http_server::start(b"from-c".to_vec());

    let dir = tempdir().unwrap();
    let dest = dir.path().join("pick.bin");
    let request =
        FetchRequest::new(vec![a.url.clone(), b.url.clone(), c.url.clone()], &dest).unwrap();
    let mut sink = |_: &ProgressUpdate| {};
    let outcome = fetch(&request, &PrepkitConfig::default(), &mut sink).unwrap();

    assert!(matches!(outcome, FetchOutcome::Downloaded { source, .. } if source == b.url));
    assert_eq!(std::fs::read(&dest).unwrap(), b"from-b");
    assert!(a.hits() >= 1, "primary must be attempted first");
    assert!(b.hits() >= 1);
    assert_eq!(c.hits(), 0, "later mirrors must not be contacted");
}

#[test]
fn exhaustion_fails_and_leaves_no_file() {
    let a = http_server::start_with_options(
        b"nope".to_vec(),
        ServerOptions {
            status: 404,
            ..Default::default()
        },
    );
    let b = http_server::start_with_options(
        b"nope".to_vec(),
        ServerOptions {
            status: 500,
            ..Default::default()
        },
    );

    let dir = tempdir().unwrap();
    let dest = dir.path().join("missing.bin");
    let request = FetchRequest::new(vec![a.url.clone(), b.url.clone()], &dest).unwrap();
    let mut sink = |_: &ProgressUpdate| {};
    let err = fetch(&request, &PrepkitConfig::default(), &mut sink).unwrap_err();

    assert!(matches!(err, FetchError::Exhausted { .. }));
    assert!(!dest.exists(), "no partial file may remain");
}

#[test]
fn truncated_body_is_cleaned_up_before_fallback() {
    let body: Vec<u8> = (0u8..=255).cycle().take(64 * 1024).collect();
    let broken = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            truncate_body_at: Some(1024),
            ..Default::default()
        },
    );
    let good = http_server::start(body.clone());

    let dir = tempdir().unwrap();
    let dest = dir.path().join("archive.zip");
    let request = FetchRequest::new(vec![broken.url.clone(), good.url.clone()], &dest).unwrap();
    let mut sink = |_: &ProgressUpdate| {};
    let outcome = fetch(&request, &PrepkitConfig::default(), &mut sink).unwrap();

    assert!(matches!(outcome, FetchOutcome::Downloaded { source, .. } if source == good.url));
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[test]
fn truncated_body_with_no_fallback_removes_partial_file() {
    let body = vec![7u8; 32 * 1024];
    let broken = http_server::start_with_options(
        body,
        ServerOptions {
            truncate_body_at: Some(4096),
            ..Default::default()
        },
    );

    let dir = tempdir().unwrap();
    let dest = dir.path().join("half.bin");
    let request = FetchRequest::single(&broken.url, &dest);
    let mut sink = |_: &ProgressUpdate| {};
    let err = fetch(&request, &PrepkitConfig::default(), &mut sink).unwrap_err();

    assert!(matches!(err, FetchError::Exhausted { .. }));
    assert!(!dest.exists(), "partial write must be removed");
}

#[test]
fn dead_primary_falls_back_to_mirror() {
    // The concrete scenario: first URL refuses the connection, second serves
    // 2048 bytes with Content-Length.
    let body = vec![42u8; 2048];
    let mirror = http_server::start(body.clone());

    let dir = tempdir().unwrap();
    let dest = dir.path().join("out").join("a.zip");
    let request = FetchRequest::new(vec![http_server::dead_url(), mirror.url.clone()], &dest).unwrap();

    let mut percents = Vec::new();
    let mut sink = collect_percents(&mut percents);
    let outcome = fetch(&request, &PrepkitConfig::default(), &mut sink).unwrap();
    drop(sink);

    assert!(matches!(outcome, FetchOutcome::Downloaded { bytes: 2048, .. }));
    assert_eq!(std::fs::read(&dest).unwrap().len(), 2048);
    assert!(
        percents.iter().any(|&p| p == 100.0),
        "at least one observation must report 100, got {percents:?}"
    );
}

#[test]
fn progress_is_monotonic_and_ends_at_100() {
    // Large enough for several 1 MiB progress chunks.
    let body = vec![1u8; 3 * 1024 * 1024 + 4096];
    let server = http_server::start(body.clone());

    let dir = tempdir().unwrap();
    let dest = dir.path().join("big.bin");
    let request = FetchRequest::single(&server.url, &dest);

    let mut percents = Vec::new();
    let mut sink = collect_percents(&mut percents);
    fetch(&request, &PrepkitConfig::default(), &mut sink).unwrap();
    drop(sink);

    assert!(percents.len() >= 2, "expected chunked progress, got {percents:?}");
    assert!(
        percents.windows(2).all(|w| w[0] <= w[1]),
        "fractions must be non-decreasing: {percents:?}"
    );
    assert_eq!(*percents.last().unwrap(), 100.0);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[test]
fn missing_content_length_downloads_without_incremental_progress() {
    let body = b"sized only by connection close".to_vec();
    let server = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            send_content_length: false,
            ..Default::default()
        },
    );

    let dir = tempdir().unwrap();
    let dest = dir.path().join("unsized.bin");
    let request = FetchRequest::single(&server.url, &dest);

    let mut percents = Vec::new();
    let mut sink = collect_percents(&mut percents);
    let outcome = fetch(&request, &PrepkitConfig::default(), &mut sink).unwrap();
    drop(sink);

    assert!(matches!(outcome, FetchOutcome::Downloaded { bytes, .. } if bytes == body.len() as u64));
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    assert!(percents.is_empty(), "no incremental progress without a total");
}

#[test]
fn custom_headers_and_user_agent_reach_the_wire() {
    let server = http_server::start(b"authenticated".to_vec());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("auth.bin");

    let mut headers = std::collections::HashMap::new();
    headers.insert("X-Build-Token".to_string(), "secret-token".to_string());
    let request = FetchRequest::single(&server.url, &dest).with_headers(headers);

    let cfg = PrepkitConfig::default();
    let mut sink = |_: &ProgressUpdate| {};
    fetch(&request, &cfg, &mut sink).unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let head = &requests[0];
    assert!(
        head.contains("X-Build-Token: secret-token"),
        "custom header missing from request: {head:?}"
    );
    assert!(
        head.contains(&format!("User-Agent: {}", cfg.user_agent)),
        "configured User-Agent missing from request: {head:?}"
    );
}

#[test]
fn parent_directories_are_created() {
    let server = http_server::start(b"nested".to_vec());
    let dir = tempdir().unwrap();
    let dest = dir.path().join("vendor").join("premake").join("bin").join("premake.zip");

    let request = FetchRequest::single(&server.url, &dest);
    let mut sink = |_: &ProgressUpdate| {};
    fetch(&request, &PrepkitConfig::default(), &mut sink).unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"nested");
}
