//! Page layout: spans grouped into lines, lines grouped into blocks
//!
//! All coordinates are page space (top-left origin, y down, points).

use std::cmp::Ordering;

use serde::Serialize;

use crate::content::{PageContent, TextRun};
use crate::coords::BBox;

/// Baselines closer than this (points) share a line
const Y_TOLERANCE: f32 = 1.0;

/// Horizontal gap (points) above which adjacent spans are separated by a space
const MIN_WORD_GAP: f32 = 1.5;

/// A vertical step larger than this multiple of the font size starts a new block
const BLOCK_GAP_FACTOR: f32 = 1.4;

/// Text in one font at one size. A size change always starts a new span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    pub text: String,
    pub font_name: String,
    pub font_size: f32,
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub spans: Vec<Span>,
    pub bbox: BBox,
    pub baseline: f32,
    /// Largest span size on the line
    pub font_size: f32,
}

impl Line {
    /// Span texts joined with a space wherever the spans don't touch
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut prev_end: Option<f32> = None;
        for span in &self.spans {
            if let Some(end) = prev_end {
                if span.bbox.x0 - end >= MIN_WORD_GAP
                    && !out.ends_with(' ')
                    && !span.text.starts_with(' ')
                {
                    out.push(' ');
                }
            }
            out.push_str(&span.text);
            prev_end = Some(span.bbox.x1);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Image,
}

/// A rectangular region of related content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub bbox: BBox,
    /// Empty for image blocks
    pub lines: Vec<Line>,
}

impl Block {
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One page's displayed size and content blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    /// 1-based page number
    pub number: u32,
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<Block>,
}

impl PageLayout {
    /// Assemble a page from interpreted content.
    ///
    /// Anything lying entirely outside the page is dropped.
    pub fn build(number: u32, width: f32, height: f32, content: PageContent) -> Self {
        let page = BBox::new(0.0, 0.0, width, height);

        let runs: Vec<TextRun> = content
            .runs
            .into_iter()
            .filter(|run| run.bbox.intersects(&page))
            .collect();
        let mut blocks = group_lines_into_blocks(group_runs_into_lines(runs));

        blocks.extend(
            content
                .images
                .into_iter()
                .filter(|bbox| bbox.intersects(&page))
                .map(|bbox| Block {
                    kind: BlockKind::Image,
                    bbox,
                    lines: Vec::new(),
                }),
        );

        Self {
            number,
            width,
            height,
            blocks,
        }
    }

    /// Every text span on the page, in reading order
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.blocks
            .iter()
            .flat_map(|block| block.lines.iter())
            .flat_map(|line| line.spans.iter())
    }

    /// Plain text of the page, one line per text line
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter(|block| block.kind == BlockKind::Text)
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn by_position(a: &TextRun, b: &TextRun) -> Ordering {
    a.baseline
        .partial_cmp(&b.baseline)
        .unwrap_or(Ordering::Equal)
        .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
}

fn group_runs_into_lines(mut runs: Vec<TextRun>) -> Vec<Line> {
    runs.sort_by(by_position);

    let mut lines = Vec::new();
    let mut current: Vec<TextRun> = Vec::new();
    let mut current_baseline = 0.0f32;

    for run in runs {
        if !current.is_empty() && (run.baseline - current_baseline).abs() > Y_TOLERANCE {
            lines.push(assemble_line(std::mem::take(&mut current)));
        }
        if current.is_empty() {
            current_baseline = run.baseline;
        }
        current.push(run);
    }
    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

fn assemble_line(mut runs: Vec<TextRun>) -> Line {
    runs.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));
    let baseline = runs.first().map_or(0.0, |r| r.baseline);

    let mut spans: Vec<Span> = Vec::with_capacity(runs.len());
    for run in runs {
        if let Some(prev) = spans.last_mut() {
            let same_font = prev.font_name == run.font_name && prev.font_size == run.font_size;
            let gap = run.bbox.x0 - prev.bbox.x1;
            if same_font && gap > -prev.font_size && gap < prev.font_size * 2.0 {
                if gap >= MIN_WORD_GAP && !prev.text.ends_with(' ') && !run.text.starts_with(' ') {
                    prev.text.push(' ');
                }
                prev.text.push_str(&run.text);
                prev.bbox = prev.bbox.union(&run.bbox);
                continue;
            }
        }
        spans.push(Span {
            text: run.text,
            font_name: run.font_name,
            font_size: run.font_size,
            bbox: run.bbox,
        });
    }

    let bbox = spans
        .iter()
        .map(|s| s.bbox)
        .reduce(|a, b| a.union(&b))
        .unwrap_or(BBox::new(0.0, baseline, 0.0, baseline));
    let font_size = spans.iter().map(|s| s.font_size).fold(0.0, f32::max);

    Line {
        spans,
        bbox,
        baseline,
        font_size,
    }
}

fn group_lines_into_blocks(lines: Vec<Line>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Vec<Line> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            let step = line.baseline - prev.baseline;
            let gap_break = step > prev.font_size.max(line.font_size) * BLOCK_GAP_FACTOR;
            let column_break = !prev.bbox.overlaps_horizontally(&line.bbox);
            if gap_break || column_break {
                blocks.push(text_block(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(text_block(current));
    }

    blocks
}

fn text_block(lines: Vec<Line>) -> Block {
    let bbox = lines
        .iter()
        .map(|l| l.bbox)
        .reduce(|a, b| a.union(&b))
        .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
    Block {
        kind: BlockKind::Text,
        bbox,
        lines,
    }
}
