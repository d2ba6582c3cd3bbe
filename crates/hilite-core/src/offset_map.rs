//! Offset mapping between linear text offsets and structural positions.
//!
//! A paragraph's text is spread over segments, and a highlighted segment may
//! hold several text children. The functions here translate a char offset
//! counted from the paragraph start into a [`Point`] (segment, text child,
//! offset in that child) and back.
//!
//! Lookups are tolerant of the placeholder segment: an empty paragraph maps
//! offset 0 onto the placeholder. Anything out of range resolves to `None`
//! so callers can skip the event instead of guessing.

use crate::paragraph::Paragraph;
use crate::segment::Segment;
use crate::text_helpers::char_len;
use crate::types::Point;

/// Linear offset of a structural point within its paragraph.
///
/// For a text point this is the length of every preceding segment, plus the
/// preceding text children of the same segment, plus the in-node offset. A
/// `Child { index }` point sums the segments before `index`.
pub fn to_linear_offset(paragraph: &Paragraph, point: Point) -> Option<usize> {
    match point {
        Point::Child { index } => {
            if index > paragraph.segment_count() {
                return None;
            }
            Some(paragraph.segment_start(index))
        }
        Point::Text {
            segment,
            part,
            offset,
        } => {
            let seg = paragraph.segment(segment)?;
            let part_len = seg.part_len(part)?;
            if offset > part_len {
                return None;
            }
            let before_part: usize = match seg {
                Segment::Highlighted(h) => h.parts()[..part].iter().map(|p| char_len(p)).sum(),
                _ => 0,
            };
            Some(paragraph.segment_start(segment) + before_part + offset)
        }
    }
}

/// Structural position of a linear offset within a paragraph.
///
/// The first segment whose cumulative length meets or exceeds `target`
/// wins, so an offset on a segment boundary lands at the end of the left
/// segment. `target == char_len` maps to the end of the last segment.
pub fn to_structural_position(paragraph: &Paragraph, target: usize) -> Option<Point> {
    locate_from(paragraph, 0, 0, target)
}

/// Walk the segments starting at `from_index`, whose start is known to be at
/// linear offset `from_base`, until the one containing `target`.
///
/// Cursor restoration after a local reformat uses this to avoid re-summing
/// the untouched segments in front of the window.
pub fn locate_from(
    paragraph: &Paragraph,
    from_index: usize,
    from_base: usize,
    target: usize,
) -> Option<Point> {
    if target < from_base {
        return None;
    }

    let mut cumulative = from_base;
    for (index, segment) in paragraph.segments().iter().enumerate().skip(from_index) {
        let len = segment.char_len();
        if cumulative + len >= target {
            let local = target - cumulative;
            return Some(resolve_in_segment(index, segment, local));
        }
        cumulative += len;
    }

    tracing::trace!(target, total = cumulative, "offset past end of paragraph");
    None
}

/// Resolve a local offset inside one segment to a text child.
fn resolve_in_segment(index: usize, segment: &Segment, local: usize) -> Point {
    match segment {
        Segment::Highlighted(h) => {
            let mut part_start = 0;
            let last = h.parts().len().saturating_sub(1);
            for (part, text) in h.parts().iter().enumerate() {
                let part_len = char_len(text);
                if part_start + part_len >= local || part == last {
                    return Point::Text {
                        segment: index,
                        part,
                        offset: local - part_start,
                    };
                }
                part_start += part_len;
            }
            Point::text(index, local)
        }
        Segment::Plain(_) | Segment::Placeholder => Point::text(index, local),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paragraph::make_paragraph_id;
    use crate::pattern::HighlightKind;
    use crate::segment::Highlight;
    use proptest::prelude::*;

    fn sample() -> Paragraph {
        Paragraph::from_segments(
            make_paragraph_id(0),
            vec![
                Segment::plain("see "),
                Segment::highlighted(HighlightKind::Url, "a.io"),
                Segment::plain(" and "),
                Segment::Highlighted(Highlight::with_parts(
                    HighlightKind::Hashtag,
                    vec!["#x".into(), "\u{a0}".into()],
                )),
            ],
        )
    }

    #[test]
    fn test_boundary_prefers_left_segment() {
        let p = sample();
        assert_eq!(to_structural_position(&p, 4), Some(Point::text(0, 4)));
        assert_eq!(to_structural_position(&p, 5), Some(Point::text(1, 1)));
        assert_eq!(to_structural_position(&p, 8), Some(Point::text(1, 4)));
    }

    #[test]
    fn test_end_of_paragraph() {
        let p = sample();
        let end = p.char_len();
        assert_eq!(
            to_structural_position(&p, end),
            Some(Point::Text {
                segment: 3,
                part: 1,
                offset: 1
            })
        );
        assert_eq!(to_structural_position(&p, end + 1), None);
    }

    #[test]
    fn test_decorative_child_counts() {
        let p = sample();
        let point = Point::Text {
            segment: 3,
            part: 1,
            offset: 0,
        };
        assert_eq!(to_linear_offset(&p, point), Some(15));
    }

    #[test]
    fn test_empty_paragraph_maps_to_placeholder() {
        let p = Paragraph::empty(make_paragraph_id(0));
        assert_eq!(to_structural_position(&p, 0), Some(Point::text(0, 0)));
        assert_eq!(to_linear_offset(&p, Point::text(0, 0)), Some(0));
        assert_eq!(to_linear_offset(&p, Point::text(0, 1)), None);
    }

    #[test]
    fn test_child_point_sums_preceding_children() {
        let p = sample();
        assert_eq!(to_linear_offset(&p, Point::Child { index: 0 }), Some(0));
        assert_eq!(to_linear_offset(&p, Point::Child { index: 2 }), Some(8));
        assert_eq!(to_linear_offset(&p, Point::Child { index: 4 }), Some(16));
        assert_eq!(to_linear_offset(&p, Point::Child { index: 5 }), None);
    }

    #[test]
    fn test_locate_from_window() {
        let p = sample();
        assert_eq!(locate_from(&p, 2, 8, 10), Some(Point::text(2, 2)));
        assert_eq!(locate_from(&p, 2, 8, 7), None);
    }

    #[test]
    fn test_out_of_range_points() {
        let p = sample();
        assert_eq!(to_linear_offset(&p, Point::text(9, 0)), None);
        assert_eq!(to_linear_offset(&p, Point::text(0, 5)), None);
        assert_eq!(
            to_linear_offset(
                &p,
                Point::Text {
                    segment: 0,
                    part: 1,
                    offset: 0
                }
            ),
            None
        );
    }

    fn arb_segment() -> impl Strategy<Value = Segment> {
        prop_oneof![
            "[a-zé ]{1,6}".prop_map(Segment::plain),
            ("[a-z]{1,4}", proptest::option::of("[ a-z]{1,2}")).prop_map(|(head, tail)| {
                let mut parts = vec![format!("#{head}").into()];
                parts.extend(tail.map(Into::into));
                Segment::Highlighted(Highlight::with_parts(HighlightKind::Hashtag, parts))
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_offset_round_trip(segments in proptest::collection::vec(arb_segment(), 0..6)) {
            let p = Paragraph::from_segments(make_paragraph_id(0), segments);
            for offset in 0..=p.char_len() {
                let point = to_structural_position(&p, offset).unwrap();
                prop_assert_eq!(to_linear_offset(&p, point), Some(offset));
            }
        }
    }
}
