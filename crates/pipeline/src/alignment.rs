//! Transcript / diarization alignment
//!
//! Attributes each transcript span to the speaker segment it overlaps
//! most, then merges consecutive same-speaker spans into turns.
//! Spans that overlap nothing attach to the nearest segment by
//! midpoint distance, so no speech is dropped.

use call_audit_core::{SpeakerLabel, SpeakerSegment, TranscriptSpan, TranscriptTurn};
use call_audit_analysis::word_count;

/// Merge transcript spans with speaker segments into turns
pub fn align(spans: &[TranscriptSpan], segments: &[SpeakerSegment]) -> Vec<TranscriptTurn> {
    if spans.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&TranscriptSpan> = spans.iter().collect();
    ordered.sort_by(|a, b| a.start_secs.total_cmp(&b.start_secs));

    let mut turns: Vec<TranscriptTurn> = Vec::new();
    for span in ordered {
        let speaker = attribute(span, segments);
        match turns.last_mut() {
            Some(last) if last.speaker == speaker => {
                if !span.text.trim().is_empty() {
                    if !last.text.is_empty() {
                        last.text.push(' ');
                    }
                    last.text.push_str(span.text.trim());
                }
                last.end_secs = last.end_secs.max(span.end_secs);
                last.word_count = word_count(&last.text);
            }
            _ => {
                let text = span.text.trim().to_string();
                turns.push(TranscriptTurn {
                    speaker,
                    word_count: word_count(&text),
                    text,
                    start_secs: span.start_secs,
                    end_secs: span.end_secs,
                });
            }
        }
    }

    turns
}

/// Pick the speaker for one span
///
/// Greatest overlap wins; ties keep the earlier segment. With no
/// overlap anywhere, the segment whose midpoint is closest to the
/// span's midpoint takes it. With no segments at all, everything is
/// the default speaker.
fn attribute(span: &TranscriptSpan, segments: &[SpeakerSegment]) -> SpeakerLabel {
    if segments.is_empty() {
        return SpeakerLabel::from_index(0);
    }

    let mut best: Option<(&SpeakerSegment, f64)> = None;
    for segment in segments {
        let overlap = segment.overlap_secs(span.start_secs, span.end_secs);
        if overlap <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_overlap)) if overlap <= best_overlap => {}
            _ => best = Some((segment, overlap)),
        }
    }

    if let Some((segment, _)) = best {
        return segment.speaker.clone();
    }

    // Orphan span: nearest segment by midpoint distance.
    let midpoint = span.midpoint_secs();
    segments
        .iter()
        .min_by(|a, b| {
            (a.midpoint_secs() - midpoint)
                .abs()
                .total_cmp(&(b.midpoint_secs() - midpoint).abs())
        })
        .map(|s| s.speaker.clone())
        .unwrap_or_else(|| SpeakerLabel::from_index(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, start: f64, end: f64) -> TranscriptSpan {
        TranscriptSpan::new(text, start, end)
    }

    fn segment(speaker: &str, start: f64, end: f64) -> SpeakerSegment {
        SpeakerSegment::new(speaker, start, end)
    }

    #[test]
    fn test_spans_attributed_by_overlap() {
        let spans = vec![
            span("hello there", 0.0, 2.0),
            span("hi how are you", 2.0, 4.0),
        ];
        let segments = vec![
            segment("SPEAKER_00", 0.0, 2.0),
            segment("SPEAKER_01", 2.0, 4.0),
        ];
        let turns = align(&spans, &segments);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker.as_str(), "SPEAKER_00");
        assert_eq!(turns[1].speaker.as_str(), "SPEAKER_01");
        assert_eq!(turns[1].word_count, 4);
    }

    #[test]
    fn test_consecutive_same_speaker_merged() {
        let spans = vec![
            span("good morning", 0.0, 1.0),
            span("thank you for calling", 1.0, 3.0),
            span("yes hello", 3.5, 4.5),
        ];
        let segments = vec![
            segment("SPEAKER_00", 0.0, 3.2),
            segment("SPEAKER_01", 3.2, 5.0),
        ];
        let turns = align(&spans, &segments);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "good morning thank you for calling");
        assert_eq!(turns[0].start_secs, 0.0);
        assert_eq!(turns[0].end_secs, 3.0);
        assert_eq!(turns[0].word_count, 6);
    }

    #[test]
    fn test_tie_keeps_earlier_segment() {
        // Equal 1s overlap with both segments.
        let spans = vec![span("split evenly", 1.0, 3.0)];
        let segments = vec![
            segment("SPEAKER_00", 0.0, 2.0),
            segment("SPEAKER_01", 2.0, 4.0),
        ];
        let turns = align(&spans, &segments);
        assert_eq!(turns[0].speaker.as_str(), "SPEAKER_00");
    }

    #[test]
    fn test_orphan_span_attaches_to_nearest() {
        let spans = vec![span("late remark", 10.0, 11.0)];
        let segments = vec![
            segment("SPEAKER_00", 0.0, 2.0),
            segment("SPEAKER_01", 7.0, 9.0),
        ];
        let turns = align(&spans, &segments);
        assert_eq!(turns[0].speaker.as_str(), "SPEAKER_01");
    }

    #[test]
    fn test_no_segments_single_default_speaker() {
        let spans = vec![span("all one voice", 0.0, 2.0), span("still talking", 2.0, 4.0)];
        let turns = align(&spans, &[]);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].speaker.as_str(), "SPEAKER_00");
        assert_eq!(turns[0].text, "all one voice still talking");
    }

    #[test]
    fn test_no_spans() {
        assert!(align(&[], &[segment("SPEAKER_00", 0.0, 1.0)]).is_empty());
    }

    #[test]
    fn test_out_of_order_spans_sorted() {
        let spans = vec![span("second", 2.0, 3.0), span("first", 0.0, 1.0)];
        let segments = vec![segment("SPEAKER_00", 0.0, 4.0)];
        let turns = align(&spans, &segments);
        assert_eq!(turns[0].text, "first second");
    }
}
