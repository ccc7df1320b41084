//! Execution-span reconstruction.
//!
//! A timeline records one sample per tick; consumers that draw or reason
//! about slices want the maximal runs of consecutive ticks instead.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::process::{Pid, Sample, Tick};

/// Half-open interval `[start, end)` during which one process held a core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Tick,
    pub end: Tick,
}

impl Span {
    pub fn len(&self) -> Tick {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Group a timeline into per-pid execution spans.
///
/// Two samples of the same pid belong to one span only if their times are
/// adjacent; an idle tick or another process in between starts a new span.
/// Idle samples produce no spans.
pub fn execution_spans(timeline: &[Sample]) -> BTreeMap<Pid, Vec<Span>> {
    let mut spans: BTreeMap<Pid, Vec<Span>> = BTreeMap::new();

    for sample in timeline {
        let Some(pid) = sample.pid else { continue };
        let slots = spans.entry(pid).or_default();
        match slots.last_mut() {
            Some(last) if last.end == sample.time => last.end = sample.time + 1,
            _ => slots.push(Span {
                start: sample.time,
                end: sample.time + 1,
            }),
        }
    }
    spans
}

/// Spans in timeline order, as `(pid, span)` pairs.
pub fn ordered_spans(timeline: &[Sample]) -> Vec<(Pid, Span)> {
    let mut ordered: Vec<(Pid, Span)> = execution_spans(timeline)
        .into_iter()
        .flat_map(|(pid, spans)| spans.into_iter().map(move |span| (pid, span)))
        .collect();
    ordered.sort_by_key(|(_, span)| span.start);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(pids: &[Option<Pid>]) -> Vec<Sample> {
        pids.iter()
            .enumerate()
            .map(|(t, &pid)| Sample { time: t as Tick, pid })
            .collect()
    }

    #[test]
    fn contiguous_ticks_merge_into_one_span() {
        let spans = execution_spans(&timeline(&[Some(0), Some(0), Some(0), Some(1), Some(1)]));
        assert_eq!(spans[&0], vec![Span { start: 0, end: 3 }]);
        assert_eq!(spans[&1], vec![Span { start: 3, end: 5 }]);
    }

    #[test]
    fn preemption_and_idle_split_spans() {
        let spans = execution_spans(&timeline(&[Some(0), Some(1), Some(0), None, Some(0)]));
        assert_eq!(
            spans[&0],
            vec![
                Span { start: 0, end: 1 },
                Span { start: 2, end: 3 },
                Span { start: 4, end: 5 }
            ]
        );
        assert_eq!(spans.len(), 2, "idle ticks never produce a span");
    }

    #[test]
    fn ordered_spans_follow_time() {
        let ordered = ordered_spans(&timeline(&[Some(4), Some(4), Some(1), Some(4)]));
        let starts: Vec<(Pid, Tick)> = ordered.iter().map(|(pid, s)| (*pid, s.start)).collect();
        assert_eq!(starts, vec![(4, 0), (1, 2), (4, 3)]);
        assert_eq!(ordered[0].1.len(), 2);
    }
}
