//! Line renderer: interleaves literal text with annotated numeric fields.

use crate::fields::ParsedLine;
use crate::fields::ranges::{Span, spans};
use crate::monitor::history::Observation;
use crate::render::styles::{Style, StyleRegistry};

/// Render `line` under `style`.
///
/// Lines whose shape just changed (first sight, no fields, new skeleton) are
/// returned verbatim so a reflowed line never shows a bogus delta.
pub fn render_line(
    line: &str,
    parsed: &ParsedLine,
    observation: &Observation,
    style: Style,
    registry: &mut StyleRegistry,
) -> String {
    if observation.shape.is_passthrough() {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() * 2);
    for span in spans(&parsed.ranges, line.len()) {
        match span {
            Span::Literal(range) => out.push_str(&line[range]),
            Span::Field(index, _) => {
                let value = parsed.values[index];
                let delta = observation.delta.get(index).copied().unwrap_or(0);
                out.push_str(&registry.annotate(style, value, delta));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fields::heuristic::SeparatorHeuristic;
    use crate::monitor::history::{Frame, HistoryCache, Shape};

    fn registry() -> StyleRegistry {
        StyleRegistry::new(Duration::from_secs(1), false)
    }

    fn parse(line: &str) -> ParsedLine {
        ParsedLine::parse(line, SeparatorHeuristic::default()).unwrap()
    }

    fn same(delta: Vec<i64>) -> Observation {
        Observation {
            shape: Shape::Same,
            delta,
        }
    }

    #[test]
    fn passthrough_on_first_sight() {
        let line = "rx 10 tx 20";
        let obs = Observation {
            shape: Shape::FirstSight,
            delta: vec![0, 0],
        };
        let out = render_line(line, &parse(line), &obs, Style::Counter, &mut registry());
        assert_eq!(out, line);
    }

    #[test]
    fn value_style_reproduces_line() {
        let line = "cnt: 9 abc:10 11 12,note:13 ";
        let parsed = parse(line);
        let out = render_line(line, &parsed, &same(vec![0; 5]), Style::Value, &mut registry());
        assert_eq!(out, line);
    }

    #[test]
    fn token_at_line_start_comes_first() {
        let line = "42 packets";
        let out = render_line(line, &parse(line), &same(vec![2]), Style::ValueDelta, &mut registry());
        assert_eq!(out, "42[+2] packets");
    }

    #[test]
    fn counter_numbers_fields_in_order() {
        let line = "a 1 b 2 c 3";
        let out = render_line(line, &parse(line), &same(vec![0; 3]), Style::Counter, &mut registry());
        assert_eq!(out, "a [1] b [2] c [3]");
    }

    #[test]
    fn field_count_change_renders_zero_delta() {
        let line = "x 5 6";
        let obs = Observation {
            shape: Shape::FieldCount,
            delta: vec![0, 0],
        };
        let out = render_line(line, &parse(line), &obs, Style::ValueDelta, &mut registry());
        assert_eq!(out, "x 5 6");
    }

    #[test]
    fn two_ticks_through_the_cache() {
        let mut cache = HistoryCache::new();
        let mut reg = registry();
        let first = "eth0 rx 100 tx 200";
        let second = "eth0 rx 150 tx 180";

        let p1 = parse(first);
        let o1 = cache.update(0, Frame::from(&p1));
        assert_eq!(render_line(first, &p1, &o1, Style::ValueDelta, &mut reg), first);

        let p2 = parse(second);
        let o2 = cache.update(0, Frame::from(&p2));
        assert_eq!(
            render_line(second, &p2, &o2, Style::ValueDelta, &mut reg),
            "eth0 rx 150[+50] tx 180[-20]"
        );
    }
}
