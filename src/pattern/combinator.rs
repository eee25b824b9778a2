// Mon Oct 19 2026 - Alex

use crate::memory::ByteView;
use crate::pattern::scanner::{ChunkedScanner, Emitter, PatternCursor};
use crate::pattern::{BytePattern, MatchDetail, ScanOutcome, SearchResult, SubMatch};
use crate::utils::{align_up, escape_bytes};

/// OR (and single-pattern) mode: every pattern is run over each chunk in
/// turn, so hits come out chunk-ordered, then pattern-ordered.
pub(crate) fn scan_any(
    scanner: &ChunkedScanner,
    data: &[u8],
    from: usize,
    patterns: &[BytePattern],
    emitter: &mut Emitter<'_>,
) -> ScanOutcome {
    let total = data.len();
    if from >= total {
        emitter.progress(total, total);
        return ScanOutcome::Completed;
    }

    let mut cursors = vec![PatternCursor::at(from); patterns.len()];

    for chunk in scanner.chunks(from, total) {
        if emitter.is_cancelled() {
            return ScanOutcome::Cancelled;
        }

        for (pattern, cursor) in patterns.iter().zip(cursors.iter_mut()) {
            if let Some(stop) = scanner.scan_chunk(data, pattern, cursor, chunk, emitter) {
                return stop;
            }
        }

        emitter.progress(chunk.1, total);
    }

    ScanOutcome::Completed
}

/// AND mode: a window slides over the source and a result is produced only
/// when every pattern occurs inside it.
pub(crate) fn scan_all(
    scanner: &ChunkedScanner,
    data: &[u8],
    from: usize,
    patterns: &[BytePattern],
    emitter: &mut Emitter<'_>,
) -> ScanOutcome {
    let total = data.len();
    if from >= total || patterns.is_empty() {
        emitter.progress(total, total);
        return ScanOutcome::Completed;
    }

    let options = scanner.options();
    let window = options.and_window.max(1);
    let chunk_size = options.chunk_size.max(1);
    let align = patterns[0].alignment();

    // Leftmost hit at or after the last window start it was looked up for.
    let mut next_hits: Vec<Option<(usize, usize)>> = vec![None; patterns.len()];
    let mut report_at = from.saturating_add(chunk_size);
    let mut start = align_up(from, align);

    'windows: while start < total {
        while start >= report_at {
            emitter.progress(report_at.min(total), total);
            if emitter.is_cancelled() {
                return ScanOutcome::Cancelled;
            }
            report_at = report_at.saturating_add(chunk_size);
        }

        let end = start.saturating_add(window).min(total);
        let mut found = Vec::with_capacity(patterns.len());
        let mut skip_to = start.saturating_add(align);

        for (pattern, cached) in patterns.iter().zip(next_hits.iter_mut()) {
            let hit = match *cached {
                Some(hit) if hit.0 >= start => Some(hit),
                _ => pattern.find_from(data, start),
            };
            *cached = hit;

            let Some((hit_start, hit_end)) = hit else {
                // No further occurrence anywhere; no later window can succeed.
                break 'windows;
            };

            match locate_in_window(data, pattern, (hit_start, hit_end), start, end) {
                Some(m) => found.push((pattern, m)),
                None => {
                    if pattern.fixed_len().is_some() {
                        // Windows ending before this hit cannot contain it.
                        skip_to = skip_to.max(align_up(hit_end.saturating_sub(window), align));
                    }
                    break;
                }
            }
        }

        if found.len() < patterns.len() {
            start = skip_to;
            continue;
        }

        if emitter.is_cancelled() {
            return ScanOutcome::Cancelled;
        }
        if let Some(stop) = emitter.emit(package_and(scanner, data, &found)) {
            return stop;
        }

        start = align_up(start.saturating_add((window / 2).max(1)), align);
    }

    emitter.progress(total, total);
    ScanOutcome::Completed
}

/// Narrows a pattern's next hit to one lying entirely inside
/// `[start, end)`. Regex hits that spill past the window get a second,
/// window-bounded search.
fn locate_in_window(
    data: &[u8],
    pattern: &BytePattern,
    (hit_start, hit_end): (usize, usize),
    start: usize,
    end: usize,
) -> Option<(usize, usize)> {
    if hit_end <= end {
        return Some((hit_start, hit_end));
    }
    if pattern.fixed_len().is_some() || hit_start >= end {
        return None;
    }
    pattern
        .find_from(&data[start..end], 0)
        .map(|(s, e)| (start + s, start + e))
}

fn package_and(scanner: &ChunkedScanner, data: &[u8], found: &[(&BytePattern, (usize, usize))]) -> SearchResult {
    let sub_matches = found
        .iter()
        .map(|(pattern, (s, e))| SubMatch {
            pattern: pattern.text().to_string(),
            offset: *s,
            size: e - s,
            text: pattern
                .fixed_len()
                .is_none()
                .then(|| escape_bytes(ByteView::new(data).clipped(*s, e - s))),
        })
        .collect();

    let (first, (s, e)) = found[0];
    let label = format!("AND: {} (+{} more)", first.text(), found.len() - 1);

    let anchored = scanner.package(data, first, s, e);
    SearchResult::new(s, e - s, &label, first.kind())
        .with_context(anchored.context_start(), anchored.context())
        .with_match_bytes(anchored.match_bytes())
        .with_detail(MatchDetail::AndMatch { sub_matches })
}
