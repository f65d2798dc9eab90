//! Exact-phrase occurrence location across segment boundaries
//!
//! A phrase's words can be split across text segments when inline annotations
//! sit between them, so the locator walks the ordered segment list with a
//! cursor of "next expected token". Tokens must appear in order and adjacent
//! (within a small tolerance); a false start rewinds to just past the
//! anchoring token and retries.

use crate::config::{ADJACENCY_TOLERANCE, MAX_SEGMENT_PASSES};
use crate::search::{is_word_char, Occurrence, SearchOptions, TextSegment};

/// Punctuation split off into standalone tokens
const TOKEN_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '\'', '“', '”', '‘', '’',
];

/// One complete phrase occurrence; hits span one or more segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatch {
    /// Per-token hits in phrase order; the first carries the anchor flag
    pub hits: Vec<Occurrence>,
}

/// Result of scanning one verse's segments for a phrase
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhraseOutcome {
    /// Complete phrase occurrences in document order
    pub matches: Vec<PhraseMatch>,
    /// The furthest incomplete attempt, kept for partial-match statistics
    pub partial: Option<PhraseMatch>,
    /// Number of tokens the phrase splits into
    pub tokens_total: usize,
}

impl PhraseOutcome {
    /// Tokens located by the best attempt, complete or not
    pub fn tokens_found(&self) -> usize {
        if !self.matches.is_empty() {
            self.tokens_total
        } else {
            self.partial.as_ref().map(|p| p.hits.len()).unwrap_or(0)
        }
    }
}

/// Split a phrase into tokens on whitespace, peeling leading and trailing
/// punctuation into tokens of their own so `"end."` matches text that
/// renders the period in a separate node.
pub fn tokenize(phrase: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in phrase.split_whitespace() {
        let mut core = word;
        while let Some(c) = core.chars().next() {
            if !TOKEN_PUNCTUATION.contains(&c) {
                break;
            }
            tokens.push(c.to_string());
            core = &core[c.len_utf8()..];
        }
        let mut trailing: Vec<char> = Vec::new();
        while let Some(c) = core.chars().next_back() {
            if !TOKEN_PUNCTUATION.contains(&c) {
                break;
            }
            trailing.push(c);
            core = &core[..core.len() - c.len_utf8()];
        }
        if !core.is_empty() {
            tokens.push(core.to_string());
        }
        for c in trailing.into_iter().rev() {
            tokens.push(c.to_string());
        }
    }
    tokens
}

/// Scanner state for one pass over the segment list
struct Scan {
    /// Index of the next expected token
    token: usize,
    /// Byte offset in the current segment to search from
    cursor: usize,
    /// Where the next token must sit (within tolerance), if mid-phrase
    expected: Option<usize>,
    /// Whether the current segment was entered with a phrase in progress
    entered_mid_phrase: bool,
    /// Hits of the occurrence being assembled
    pending: Vec<Occurrence>,
    /// Segment and offset of the pending occurrence's first hit
    anchor: Option<(usize, usize)>,
}

impl Scan {
    fn fresh() -> Self {
        Self {
            token: 0,
            cursor: 0,
            expected: None,
            entered_mid_phrase: false,
            pending: Vec::new(),
            anchor: None,
        }
    }

    /// Drop the pending attempt and return its hits for statistics
    fn reset(&mut self) -> Vec<Occurrence> {
        self.token = 0;
        self.expected = None;
        self.anchor = None;
        self.entered_mid_phrase = false;
        std::mem::take(&mut self.pending)
    }
}

/// Locate every occurrence of `phrase` across the ordered segment list
pub fn locate(segments: &[TextSegment], phrase: &str, options: &SearchOptions) -> PhraseOutcome {
    let tokens = tokenize(phrase);
    let mut outcome = PhraseOutcome {
        matches: Vec::new(),
        partial: None,
        tokens_total: tokens.len(),
    };
    if tokens.is_empty() || segments.is_empty() {
        return outcome;
    }

    let haystacks: Vec<String> = segments
        .iter()
        .map(|s| fold_case(&s.text, options.case_sensitive))
        .collect();
    let needles: Vec<String> = tokens
        .iter()
        .map(|t| fold_case(t, options.case_sensitive))
        .collect();

    let mut passes = vec![0usize; segments.len()];
    let mut scan = Scan::fresh();
    let mut seg = 0;

    while seg < segments.len() {
        passes[seg] += 1;
        if passes[seg] > MAX_SEGMENT_PASSES {
            log::debug!("phrase scan cap reached in segment {}, skipping it", seg);
            let dropped = scan.reset();
            note_partial(&mut outcome, dropped);
            scan.cursor = 0;
            seg += 1;
            continue;
        }

        let hay = haystacks[seg].as_str();
        let needle = needles[scan.token].as_str();
        let start_at = scan.cursor.min(hay.len());
        let found = hay[start_at..].find(needle).map(|rel| start_at + rel);

        // a hit only counts where the phrase expects it
        let hit = match found {
            Some(at) => match scan.expected {
                Some(expected) if gap_chars(hay, expected, at) > ADJACENCY_TOLERANCE => None,
                _ => Some(at),
            },
            None => None,
        };

        match hit {
            Some(at) => {
                let end = at + needle.len();
                if options.word_boundaries && !flanks_ok(hay, at, end, needle) {
                    // boundary miss: scan past it, the expectation stands
                    scan.cursor = at + 1;
                    continue;
                }
                let text = segments[seg]
                    .text
                    .get(at..end)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| needle.to_string());
                if scan.token == 0 {
                    scan.anchor = Some((seg, at));
                }
                scan.pending.push(Occurrence {
                    segment: seg,
                    offset: at,
                    text,
                    first_of_phrase: scan.token == 0,
                });
                scan.token += 1;
                scan.cursor = end;
                scan.expected = Some(end);
                scan.entered_mid_phrase = false;
                if scan.token == tokens.len() {
                    outcome.matches.push(PhraseMatch {
                        hits: std::mem::take(&mut scan.pending),
                    });
                    scan.token = 0;
                    scan.expected = None;
                    scan.anchor = None;
                }
            }
            None => {
                let rest = &hay[start_at..];
                if rest.trim().is_empty() {
                    // whitespace-only remainders never break the phrase
                    let carrying = !scan.pending.is_empty();
                    scan.cursor = 0;
                    scan.expected = if carrying { Some(0) } else { None };
                    scan.entered_mid_phrase = carrying;
                    seg += 1;
                } else if scan.entered_mid_phrase && !scan.pending.is_empty() {
                    // false start: retry from just past the anchoring token
                    let anchor = scan.anchor;
                    let dropped = scan.reset();
                    note_partial(&mut outcome, dropped);
                    if let Some((anchor_seg, anchor_at)) = anchor {
                        seg = anchor_seg;
                        scan.cursor = anchor_at + 1;
                    } else {
                        scan.cursor = 0;
                    }
                } else if scan.pending.is_empty() {
                    // opening token is nowhere in this segment
                    scan.cursor = 0;
                    seg += 1;
                } else {
                    // adjacency broken mid-segment: drop the attempt and
                    // keep scanning forward from here
                    let dropped = scan.reset();
                    note_partial(&mut outcome, dropped);
                }
            }
        }
    }

    let leftover = scan.reset();
    note_partial(&mut outcome, leftover);
    outcome
}

fn fold_case(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

/// Separator run between the expected offset and the found offset, measured
/// in characters. The tolerance is a character budget, so a multi-byte space
/// between tokens counts as one.
fn gap_chars(hay: &str, expected: usize, at: usize) -> usize {
    hay.get(expected..at)
        .map(|gap| gap.chars().count())
        .unwrap_or(usize::MAX)
}

/// Word-boundary check against segment edges and neighbor characters.
/// Only flanks that touch a word character of the token are constrained,
/// so punctuation tokens match regardless of their neighbors.
fn flanks_ok(hay: &str, start: usize, end: usize, token: &str) -> bool {
    let first_is_word = token.chars().next().map(is_word_char).unwrap_or(false);
    let last_is_word = token.chars().next_back().map(is_word_char).unwrap_or(false);
    if first_is_word {
        if let Some(prev) = hay[..start].chars().next_back() {
            if is_word_char(prev) {
                return false;
            }
        }
    }
    if last_is_word {
        if let Some(next) = hay[end..].chars().next() {
            if is_word_char(next) {
                return false;
            }
        }
    }
    true
}

fn note_partial(outcome: &mut PhraseOutcome, hits: Vec<Occurrence>) {
    if hits.is_empty() {
        return;
    }
    let best = outcome.partial.as_ref().map(|p| p.hits.len()).unwrap_or(0);
    if hits.len() > best {
        outcome.partial = Some(PhraseMatch { hits });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeId;

    fn segments(texts: &[&str]) -> Vec<TextSegment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextSegment {
                text: t.to_string(),
                node: NodeId(i + 1),
            })
            .collect()
    }

    fn options() -> SearchOptions {
        SearchOptions::default()
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(tokenize("end."), vec!["end", "."]);
        assert_eq!(tokenize("Jesus wept."), vec!["Jesus", "wept", "."]);
        assert_eq!(
            tokenize("“Jesus wept.”"),
            vec!["“", "Jesus", "wept", ".", "”"]
        );
        assert_eq!(tokenize(""), Vec::<String>::new());
    }

    #[test]
    fn test_phrase_in_single_segment() {
        let segs = segments(&["Jesus wept. John 11:35"]);
        let outcome = locate(&segs, "Jesus wept.", &options());
        assert_eq!(outcome.matches.len(), 1);
        let hits = &outcome.matches[0].hits;
        assert_eq!(hits.len(), 3);
        assert!(hits[0].first_of_phrase);
        assert!(!hits[1].first_of_phrase);
        assert_eq!(hits[0].offset, 0);
        assert_eq!(hits[1].offset, 6);
        assert_eq!(hits[2].text, ".");
    }

    #[test]
    fn test_phrase_across_segments() {
        let segs = segments(&["In the beginning God ", "created the heaven"]);
        let outcome = locate(&segs, "God created", &options());
        assert_eq!(outcome.matches.len(), 1);
        let hits = &outcome.matches[0].hits;
        assert_eq!((hits[0].segment, hits[0].offset), (0, 17));
        assert_eq!((hits[1].segment, hits[1].offset), (1, 0));
        assert_eq!(hits[0].text, "God");
    }

    #[test]
    fn test_phrase_false_start_rewinds() {
        let segs = segments(&["In God ", "he trusts God ", "created"]);
        let outcome = locate(&segs, "God created", &options());
        assert_eq!(outcome.matches.len(), 1);
        let hits = &outcome.matches[0].hits;
        assert_eq!((hits[0].segment, hits[0].offset), (1, 10));
        assert_eq!((hits[1].segment, hits[1].offset), (2, 0));
    }

    #[test]
    fn test_phrase_rejects_distant_continuation() {
        let segs = segments(&["In God ", "he created trust"]);
        let outcome = locate(&segs, "God created", &options());
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.tokens_found(), 1);
    }

    #[test]
    fn test_tolerance_counts_characters_not_bytes() {
        // a single multi-byte space between tokens is one character of slack
        let segs = segments(&["In\u{2009}the beginning"]);
        let outcome = locate(&segs, "In the", &options());
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].hits[1].offset, 5);

        // three separator characters exceed the budget either way
        let segs = segments(&["In   the beginning"]);
        assert!(locate(&segs, "In the", &options()).matches.is_empty());
    }

    #[test]
    fn test_whitespace_segment_keeps_continuity() {
        let segs = segments(&["God ", "  ", "created"]);
        let outcome = locate(&segs, "God created", &options());
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].hits[1].segment, 2);
    }

    #[test]
    fn test_phrase_longer_than_remaining_text() {
        let segs = segments(&["In the beginning God"]);
        let outcome = locate(&segs, "God created the heaven", &options());
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.tokens_total, 4);
        assert_eq!(outcome.tokens_found(), 1);
    }

    #[test]
    fn test_multiple_occurrences_in_one_segment() {
        let segs = segments(&["and God said and God said"]);
        let outcome = locate(&segs, "God said", &options());
        assert_eq!(outcome.matches.len(), 2);
    }

    #[test]
    fn test_word_boundary_skips_embedded_token() {
        let segs = segments(&["the cathedral cat sat"]);
        let with_boundaries = SearchOptions {
            word_boundaries: true,
            ..SearchOptions::default()
        };
        let outcome = locate(&segs, "cat sat", &with_boundaries);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].hits[0].offset, 14);
    }

    #[test]
    fn test_case_sensitive_phrase() {
        let segs = segments(&["Jesus wept here"]);
        let sensitive = SearchOptions {
            case_sensitive: true,
            ..SearchOptions::default()
        };
        assert_eq!(locate(&segs, "jesus wept", &sensitive).matches.len(), 0);
        assert_eq!(locate(&segs, "Jesus wept", &sensitive).matches.len(), 1);
        assert_eq!(locate(&segs, "jesus WEPT", &options()).matches.len(), 1);
    }

    #[test]
    fn test_scan_cap_terminates_degenerate_input() {
        let text = "a ".repeat(15);
        let segs = segments(&[text.as_str()]);
        let outcome = locate(&segs, "a z", &options());
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.tokens_found(), 1);
    }

    #[test]
    fn test_recorded_text_keeps_source_case() {
        let segs = segments(&["And GOD said"]);
        let outcome = locate(&segs, "god said", &options());
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].hits[0].text, "GOD");
    }
}
