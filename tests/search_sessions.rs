// Mon Oct 19 2026 - Alex

//! Drives full search sessions against ROM images written to disk.

use spritepal_core::config::SearchConfig;
use spritepal_core::engine::{PromptKind, SearchContext, SearchCoordinator, SearchEvent, SearchRequest, SessionState};
use spritepal_core::pattern::{CombineOp, PatternKind, SearchResult};
use std::io::Write;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(30);

fn rom_file(data: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

/// Results streamed before completion; the terminal event only counts them.
fn completed_results(events: Vec<SearchEvent>) -> Vec<SearchResult> {
    let mut results = Vec::new();
    for event in events {
        match event {
            SearchEvent::ResultFound(result) => results.push(result),
            SearchEvent::Completed { results: count, .. } => {
                assert_eq!(count, results.len());
                return results;
            }
            SearchEvent::Progress { .. } | SearchEvent::Prompt(_) => {}
            other => panic!("expected completion, got {:?}", other),
        }
    }
    panic!("session never completed")
}

#[test]
fn regex_match_across_default_chunk_boundary() {
    let mut data = vec![0u8; 0x30000];
    let at = 0x10000 - 3;
    data[at..at + 9].copy_from_slice(b"KIRBY0042");

    let file = rom_file(&data);
    let request = SearchRequest::new(file.path(), "KIRBY[0-9]+").with_kind(PatternKind::Regex);
    let handle = SearchCoordinator::default().start(request);

    let results = completed_results(handle.drain(TIMEOUT).unwrap());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].offset(), at);
    assert_eq!(results[0].decoded_text(), Some("KIRBY0042"));
}

#[test]
fn and_search_over_file() {
    let mut data = vec![0u8; 0x2000];
    data[0x1010..0x1012].copy_from_slice(&[0xAB, 0xCD]);
    data[0x1080..0x1082].copy_from_slice(&[0xEF, 0x01]);
    data[0x200..0x202].copy_from_slice(&[0xAB, 0xCD]);

    let file = rom_file(&data);
    let request = SearchRequest::new(file.path(), "AB CD\nEF 01").with_op(CombineOp::And);
    let handle = SearchCoordinator::default().start(request);

    // Windows at 0xF82 and 0x1002 (one half-window later) both hold the pair.
    let results = completed_results(handle.drain(TIMEOUT).unwrap());
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.offset() == 0x1010));
    assert!(results.iter().all(|r| r.sub_matches()[1].offset == 0x1080));
}

#[test]
fn progress_is_monotonic_and_ends_at_total() {
    let data = vec![0u8; 0x25000];
    let file = rom_file(&data);
    let handle = SearchCoordinator::default().start(SearchRequest::new(file.path(), "FF EE"));

    let progress: Vec<(usize, usize)> = handle
        .drain(TIMEOUT)
        .unwrap()
        .into_iter()
        .filter_map(|e| match e {
            SearchEvent::Progress { current, total } => Some((current, total)),
            _ => None,
        })
        .collect();

    assert_eq!(progress.len(), 3);
    assert!(progress.windows(2).all(|w| w[0].0 < w[1].0));
    assert_eq!(progress.last(), Some(&(0x25000, 0x25000)));
}

#[test]
fn cancel_while_limit_question_pending() {
    let data = vec![0x11u8; 0x1000];
    let file = rom_file(&data);
    let context = SearchContext::new(SearchConfig::default().with_max_results(3));
    let handle = SearchCoordinator::new(context).start(SearchRequest::new(file.path(), "11").interactive(true));

    loop {
        match handle.next_event() {
            Some(SearchEvent::Prompt(request)) => {
                assert_eq!(request.kind, PromptKind::Question);
                break;
            }
            Some(event) if event.is_terminal() => panic!("finished before prompt: {:?}", event),
            Some(_) => {}
            None => panic!("channel closed early"),
        }
    }
    handle.cancel();

    let events = handle.drain(TIMEOUT).unwrap();
    match events.last() {
        Some(SearchEvent::Cancelled { results }) => assert_eq!(*results, 3),
        other => panic!("expected cancellation, got {:?}", other),
    }
    assert_eq!(handle.wait(), SessionState::Cancelled);
}

#[test]
fn concurrent_sessions_are_independent() {
    let mut a = vec![0u8; 0x800];
    a[0x10] = 0xAA;
    let mut b = vec![0u8; 0x800];
    b[0x20] = 0xBB;
    b[0x30] = 0xBB;

    let file_a = rom_file(&a);
    let file_b = rom_file(&b);
    let coordinator = SearchCoordinator::default();
    let first = coordinator.start(SearchRequest::new(file_a.path(), "AA"));
    let second = coordinator.start(SearchRequest::new(file_b.path(), "BB"));
    assert_ne!(first.id(), second.id());

    let second_results = completed_results(second.drain(TIMEOUT).unwrap());
    let first_results = completed_results(first.drain(TIMEOUT).unwrap());
    assert_eq!(first_results.len(), 1);
    assert_eq!(second_results.len(), 2);
}

#[test]
fn request_from_json_config() {
    let mut data = vec![0u8; 0x100];
    data[0x40..0x44].copy_from_slice(b"Wadd");

    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        config_file,
        r#"{{ "pattern": "wadd", "pattern_kind": "regex", "case_sensitive": false, "context_bytes": 2 }}"#
    )
    .unwrap();

    let config = SearchConfig::load(config_file.path()).unwrap();
    let file = rom_file(&data);
    let request = SearchRequest::from_config(file.path(), &config).unwrap();
    let handle = SearchCoordinator::new(SearchContext::new(config)).start(request);

    let results = completed_results(handle.drain(TIMEOUT).unwrap());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].offset(), 0x40);
    assert_eq!(results[0].context().len(), 8);
}

#[test]
fn empty_file_completes_without_results() {
    let file = rom_file(&[]);
    let handle = SearchCoordinator::default().start(SearchRequest::new(file.path(), "AB"));
    let results = completed_results(handle.drain(TIMEOUT).unwrap());
    assert!(results.is_empty());
}
