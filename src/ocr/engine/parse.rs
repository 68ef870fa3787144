use std::collections::BTreeMap;

use crate::geometry::BBoxPx;

use super::geom::{center_y, union_bbox};
use super::text::needs_space;

const WORD_LEVEL: i32 = 5;

/// A run of words on one tesseract line, close enough to read as one phrase.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TextLine {
    pub(super) text: String,
    pub(super) bbox: BBoxPx,
    /// Mean word confidence weighted by word length, 0..=100.
    pub(super) conf: f32,
}

#[derive(Clone)]
struct WordToken {
    text: String,
    bbox: BBoxPx,
    conf: f32,
    len: usize,
}

pub(super) fn parse_tsv_lines(tsv: &str) -> Vec<TextLine> {
    let mut word_map: BTreeMap<(i32, i32, i32, i32), Vec<WordToken>> = BTreeMap::new();

    for row in tsv.lines().skip(1) {
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < 12 {
            continue;
        }
        let level: i32 = cols[0].parse().unwrap_or(0);
        if level != WORD_LEVEL {
            continue;
        }
        let page_num: i32 = cols[1].parse().unwrap_or(0);
        let block_num: i32 = cols[2].parse().unwrap_or(0);
        let par_num: i32 = cols[3].parse().unwrap_or(0);
        let line_num: i32 = cols[4].parse().unwrap_or(0);
        let left: u32 = cols[6].parse().unwrap_or(0);
        let top: u32 = cols[7].parse().unwrap_or(0);
        let width: u32 = cols[8].parse().unwrap_or(0);
        let height: u32 = cols[9].parse().unwrap_or(0);
        let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 || width == 0 || height == 0 {
            continue;
        }

        let key = (page_num, block_num, par_num, line_num);
        word_map.entry(key).or_default().push(WordToken {
            text: text.to_string(),
            bbox: BBoxPx {
                x: left,
                y: top,
                width,
                height,
            },
            conf,
            len: text.chars().count().max(1),
        });
    }

    let mut lines = Vec::new();
    for (_, mut words) in word_map {
        words.sort_by_key(|word| word.bbox.x);
        for segment in split_word_segments(words) {
            if let Some(line) = build_line(&segment) {
                lines.push(line);
            }
        }
    }
    lines.sort_by_key(|line| (line.bbox.y, line.bbox.x));
    lines
}

/// Splits a line's words wherever the horizontal gap or the vertical drift
/// is large relative to the median word height.
fn split_word_segments(words: Vec<WordToken>) -> Vec<Vec<WordToken>> {
    if words.len() <= 1 {
        return if words.is_empty() { Vec::new() } else { vec![words] };
    }

    let mut heights = words.iter().map(|word| word.bbox.height).collect::<Vec<_>>();
    heights.sort_unstable();
    let median_h = heights[heights.len() / 2].max(1) as f32;
    let gap_threshold = (median_h * 2.5).clamp(12.0, 120.0);
    let vertical_threshold = (median_h * 0.9).clamp(6.0, 80.0);

    let mut segments: Vec<Vec<WordToken>> = Vec::new();
    let mut current: Vec<WordToken> = Vec::new();
    let mut last_right = 0u32;
    let mut last_center_y = 0f32;
    for word in words {
        let right = word.bbox.x + word.bbox.width;
        let word_center_y = center_y(&word.bbox);
        if !current.is_empty() {
            let gap = word.bbox.x.saturating_sub(last_right) as f32;
            let drift = (word_center_y - last_center_y).abs();
            if gap > gap_threshold || drift > vertical_threshold {
                segments.push(std::mem::take(&mut current));
            }
        }
        if current.is_empty() {
            last_right = right;
            last_center_y = word_center_y;
        } else {
            last_right = last_right.max(right);
            last_center_y = (last_center_y + word_center_y) * 0.5;
        }
        current.push(word);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn build_line(words: &[WordToken]) -> Option<TextLine> {
    let (first, rest) = words.split_first()?;

    let mut text = first.text.clone();
    let mut bbox = first.bbox;
    let mut conf_sum = first.conf * first.len as f32;
    let mut len_sum = first.len as f32;
    let mut last_token = first.text.as_str();
    for word in rest {
        if needs_space(last_token, &word.text) {
            text.push(' ');
        }
        text.push_str(&word.text);
        last_token = &word.text;
        bbox = union_bbox(&bbox, &word.bbox);
        conf_sum += word.conf * word.len as f32;
        len_sum += word.len as f32;
    }
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    Some(TextLine {
        text: text.to_string(),
        bbox,
        conf: conf_sum / len_sum.max(1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(
        block: i32,
        line: i32,
        left: u32,
        top: u32,
        width: u32,
        conf: f32,
        text: &str,
    ) -> String {
        format!("5\t1\t{block}\t1\t{line}\t1\t{left}\t{top}\t{width}\t20\t{conf}\t{text}")
    }

    fn tsv(rows: &[String]) -> String {
        let mut out = vec![
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t".to_string(),
        ];
        out.extend(rows.iter().cloned());
        out.join("\n")
    }

    #[test]
    fn joins_words_of_one_line() {
        let lines = parse_tsv_lines(&tsv(&[
            word(1, 1, 10, 40, 50, 90.0, "Hello"),
            word(1, 1, 70, 42, 50, 60.0, "world"),
        ]));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(
            lines[0].bbox,
            BBoxPx {
                x: 10,
                y: 40,
                width: 110,
                height: 22
            }
        );
        assert_eq!(lines[0].conf, 75.0);
    }

    #[test]
    fn wide_gaps_split_a_line() {
        let lines = parse_tsv_lines(&tsv(&[
            word(1, 1, 10, 40, 40, 90.0, "Left"),
            word(1, 1, 400, 40, 40, 90.0, "Right"),
        ]));
        let texts: Vec<&str> = lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["Left", "Right"]);
    }

    #[test]
    fn skips_non_word_rows_and_empty_words() {
        let lines = parse_tsv_lines(&tsv(&[
            "4\t1\t1\t1\t1\t0\t10\t40\t300\t20\t-1\t".to_string(),
            word(1, 1, 10, 40, 40, -1.0, "ghost"),
            word(1, 1, 60, 40, 40, 80.0, "   "),
            "garbage row".to_string(),
        ]));
        assert!(lines.is_empty());
    }

    #[test]
    fn lines_are_ordered_top_to_bottom() {
        let lines = parse_tsv_lines(&tsv(&[
            word(2, 1, 10, 200, 40, 90.0, "second"),
            word(1, 1, 300, 20, 40, 90.0, "first"),
        ]));
        let texts: Vec<&str> = lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
