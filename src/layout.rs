use crate::history::{ChatTurn, TurnContent};
use egui::{pos2, Rect, Vec2};
use std::path::{Path, PathBuf};

// Panel paddings, lifted from the hand-tuned pixel layout this replaces.
const BOTTOM_PAD: f32 = 12.0;
const TOP_PAD: f32 = 10.0;
const TEXT_INDENT: f32 = 16.0;
const CODE_INDENT: f32 = 24.0;
const SIDE_MARGIN: f32 = 40.0;
const LABEL_GAP: f32 = 6.0;
const PROSE_GAP: f32 = 6.0;
const CODE_GAP: f32 = 4.0;
const IMAGE_GAP: f32 = 12.0;

/// Which font/color a text line is painted with. Hit-testing ignores this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Speaker,
    Body,
    Caption,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    TextLine { text: String, role: TextRole },
    CodeLine(String),
    Image { path: PathBuf },
    LinkSpan { url: String },
}

/// One positioned, hit-testable visual unit. Lives for a single frame; the
/// whole list is recomputed and replaced on the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableElement {
    pub rect: Rect,
    pub kind: ElementKind,
}

/// Text and image measurement supplied by the rendering side. Keeping
/// measurement behind a trait makes the layout pass a pure function of its
/// inputs.
pub trait Metrics {
    fn prose(&self, text: &str) -> Vec2;
    fn mono(&self, text: &str) -> Vec2;
    fn label(&self, text: &str) -> Vec2;
    /// Natural pixel size of an image, or `None` when it cannot be loaded.
    fn image_size(&self, path: &Path) -> Option<Vec2>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOutput {
    /// Emission order: newest turn first, each turn's pieces bottom-up.
    pub elements: Vec<DrawableElement>,
    pub consumed_height: f32,
}

/// Lays out the tail of the conversation inside `panel`, newest turn at the
/// bottom, walking upward until the panel top is reached. Deterministic for
/// identical inputs.
pub fn layout(turns: &[ChatTurn], panel: Rect, metrics: &dyn Metrics) -> LayoutOutput {
    let mut elements = Vec::new();
    let mut y = panel.bottom() - BOTTOM_PAD;
    let usable_width = panel.width() - SIDE_MARGIN;
    let left = panel.left() + TEXT_INDENT;

    for turn in turns.iter().rev() {
        // The speaker label goes in first, so it sits at the bottom of the
        // turn's block with the content stacked above it.
        let label = turn.speaker.label();
        let size = metrics.label(label);
        y -= size.y + LABEL_GAP;
        elements.push(DrawableElement {
            rect: Rect::from_min_size(pos2(left, y), size),
            kind: ElementKind::TextLine {
                text: label.to_string(),
                role: TextRole::Speaker,
            },
        });
        y -= LABEL_GAP;

        match &turn.content {
            TurnContent::Image { caption, path } => {
                place_image(&mut elements, &mut y, left, usable_width, caption, path, metrics);
            }
            TurnContent::Text(text) => {
                place_text(&mut elements, &mut y, panel, left, usable_width, text, metrics);
            }
        }

        if y < panel.top() + TOP_PAD {
            break;
        }
    }

    LayoutOutput {
        consumed_height: (panel.bottom() - BOTTOM_PAD) - y,
        elements,
    }
}

fn place_image(
    elements: &mut Vec<DrawableElement>,
    y: &mut f32,
    left: f32,
    usable_width: f32,
    caption: &str,
    path: &Path,
    metrics: &dyn Metrics,
) {
    match metrics.image_size(path) {
        Some(mut size) => {
            if size.x > usable_width {
                size *= usable_width / size.x;
            }
            *y -= size.y;
            elements.push(DrawableElement {
                rect: Rect::from_min_size(pos2(left, *y), size),
                kind: ElementKind::Image {
                    path: path.to_path_buf(),
                },
            });
            *y -= IMAGE_GAP;
        }
        None => {
            let size = metrics.prose(caption);
            *y -= size.y + PROSE_GAP;
            elements.push(DrawableElement {
                rect: Rect::from_min_size(pos2(left, *y), size),
                kind: ElementKind::TextLine {
                    text: caption.to_string(),
                    role: TextRole::Caption,
                },
            });
        }
    }
}

fn place_text(
    elements: &mut Vec<DrawableElement>,
    y: &mut f32,
    panel: Rect,
    left: f32,
    usable_width: f32,
    text: &str,
    metrics: &dyn Metrics,
) {
    // The cursor climbs upward, so segments and lines are emitted last-first
    // to keep top-to-bottom reading order on screen.
    for segment in split_fenced(text).iter().rev() {
        match segment {
            Segment::Code(code) => {
                for line in code.lines().rev() {
                    let size = metrics.mono(line);
                    *y -= size.y + CODE_GAP;
                    elements.push(DrawableElement {
                        rect: Rect::from_min_size(pos2(panel.left() + CODE_INDENT, *y), size),
                        kind: ElementKind::CodeLine(line.to_string()),
                    });
                }
            }
            Segment::Prose(prose) => {
                for line in wrap_words(prose, usable_width, metrics).iter().rev() {
                    place_prose_line(elements, y, left, line, metrics);
                }
            }
        }
    }
}

fn place_prose_line(
    elements: &mut Vec<DrawableElement>,
    y: &mut f32,
    left: f32,
    line: &str,
    metrics: &dyn Metrics,
) {
    *y -= metrics.prose(line).y + PROSE_GAP;
    let mut x = left;
    for (segment, is_url) in split_links(line) {
        let size = metrics.prose(&segment);
        let rect = Rect::from_min_size(pos2(x, *y), size);
        x = rect.right();
        if is_url {
            elements.push(DrawableElement {
                rect,
                kind: ElementKind::LinkSpan { url: segment },
            });
        } else if !segment.trim().is_empty() {
            elements.push(DrawableElement {
                rect,
                kind: ElementKind::TextLine {
                    text: segment,
                    role: TextRole::Body,
                },
            });
        }
    }
}

enum Segment {
    Prose(String),
    Code(String),
}

/// Splits on matching triple-backtick fences. An unmatched opening fence is
/// left in the prose.
fn split_fenced(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let Some(close) = rest[open + 3..].find("```") else {
            break;
        };
        let end = open + 3 + close + 3;
        if open > 0 {
            segments.push(Segment::Prose(rest[..open].to_string()));
        }
        let inner = rest[open..end].trim_matches('`').trim_matches('\n');
        segments.push(Segment::Code(inner.to_string()));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Prose(rest.to_string()));
    }
    segments
}

/// Greedy word wrap against the measured width. A single word wider than the
/// limit still gets its own line.
fn wrap_words(prose: &str, usable_width: f32, metrics: &dyn Metrics) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in prose.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if metrics.prose(&candidate).x > usable_width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Splits a line into plain and URL runs. A URL starts at a scheme prefix
/// and ends at the next whitespace.
fn split_links(line: &str) -> Vec<(String, bool)> {
    let mut segments = Vec::new();
    let mut rest = line;
    loop {
        let start = match (rest.find("http://"), rest.find("https://")) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => break,
        };
        let len = rest[start..]
            .find(char::is_whitespace)
            .unwrap_or(rest.len() - start);
        if start > 0 {
            segments.push((rest[..start].to_string(), false));
        }
        segments.push((rest[start..start + len].to_string(), true));
        rest = &rest[start + len..];
    }
    if !rest.is_empty() {
        segments.push((rest.to_string(), false));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ChatTurn;
    use std::collections::HashMap;

    /// Fixed-width fonts: 10px per char, fixed line heights.
    struct FakeMetrics {
        images: HashMap<PathBuf, Vec2>,
    }

    impl FakeMetrics {
        fn new() -> Self {
            Self {
                images: HashMap::new(),
            }
        }

        fn with_image(path: &str, size: Vec2) -> Self {
            let mut metrics = Self::new();
            metrics.images.insert(PathBuf::from(path), size);
            metrics
        }
    }

    impl Metrics for FakeMetrics {
        fn prose(&self, text: &str) -> Vec2 {
            Vec2::new(text.chars().count() as f32 * 10.0, 16.0)
        }

        fn mono(&self, text: &str) -> Vec2 {
            Vec2::new(text.chars().count() as f32 * 10.0, 14.0)
        }

        fn label(&self, text: &str) -> Vec2 {
            Vec2::new(text.chars().count() as f32 * 12.0, 20.0)
        }

        fn image_size(&self, path: &Path) -> Option<Vec2> {
            self.images.get(path).copied()
        }
    }

    fn panel(width: f32, height: f32) -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), Vec2::new(width, height))
    }

    fn text_lines(output: &LayoutOutput) -> Vec<&DrawableElement> {
        output
            .elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::TextLine { role: TextRole::Body, .. }))
            .collect()
    }

    #[test]
    fn wrapped_lines_stay_within_usable_width() {
        let metrics = FakeMetrics::new();
        let turns = vec![ChatTurn::bot(
            "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima",
        )];
        let output = layout(&turns, panel(240.0, 2000.0), &metrics);

        let lines = text_lines(&output);
        assert!(lines.len() > 1, "long prose should wrap");
        for element in lines {
            assert!(
                element.rect.width() <= 200.0,
                "line {:?} exceeds usable width",
                element.kind
            );
        }
    }

    #[test]
    fn wrapped_lines_read_top_to_bottom() {
        let metrics = FakeMetrics::new();
        let turns = vec![ChatTurn::bot("first second third fourth fifth sixth")];
        let output = layout(&turns, panel(200.0, 2000.0), &metrics);

        let lines = text_lines(&output);
        assert!(lines.len() >= 2);
        // Emission is bottom-up, so the earliest-emitted body line is the
        // last line of the paragraph and carries the largest y.
        let texts: Vec<&str> = lines
            .iter()
            .map(|e| match &e.kind {
                ElementKind::TextLine { text, .. } => text.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert!(texts[0].ends_with("sixth") || texts.last().unwrap().starts_with("first"));
        let first_line = lines
            .iter()
            .find(|e| matches!(&e.kind, ElementKind::TextLine { text, .. } if text.starts_with("first")))
            .unwrap();
        let last_line = lines
            .iter()
            .find(|e| matches!(&e.kind, ElementKind::TextLine { text, .. } if text.ends_with("sixth")))
            .unwrap();
        assert!(first_line.rect.min.y < last_line.rect.min.y);
    }

    #[test]
    fn fenced_block_emits_code_lines_in_reading_order() {
        let metrics = FakeMetrics::new();
        let turns = vec![ChatTurn::bot("```\nline1\nline2\n```")];
        let output = layout(&turns, panel(400.0, 2000.0), &metrics);

        let code: Vec<&DrawableElement> = output
            .elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::CodeLine(_)))
            .collect();
        assert_eq!(code.len(), 2);

        let find = |needle: &str| {
            code.iter()
                .find(|e| matches!(&e.kind, ElementKind::CodeLine(text) if text == needle))
                .copied()
                .unwrap()
        };
        assert!(find("line1").rect.min.y < find("line2").rect.min.y);
        // Code is indented past the prose margin.
        assert_eq!(find("line1").rect.min.x, 24.0);
    }

    #[test]
    fn mid_sentence_url_becomes_one_link_span() {
        let metrics = FakeMetrics::new();
        let turns = vec![ChatTurn::bot("see https://example.com now")];
        let output = layout(&turns, panel(800.0, 2000.0), &metrics);

        let links: Vec<&DrawableElement> = output
            .elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::LinkSpan { .. }))
            .collect();
        assert_eq!(links.len(), 1);
        let ElementKind::LinkSpan { url } = &links[0].kind else {
            unreachable!()
        };
        assert_eq!(url, "https://example.com");
        // "see " is 4 chars at 10px, starting at the 16px indent.
        assert_eq!(links[0].rect.min.x, 16.0 + 40.0);

        // Trailing text continues from the link's right edge.
        let trailing = output
            .elements
            .iter()
            .find(|e| matches!(&e.kind, ElementKind::TextLine { text, .. } if text == " now"))
            .expect("trailing text after url");
        assert_eq!(trailing.rect.min.x, links[0].rect.max.x);
        assert_eq!(trailing.rect.min.y, links[0].rect.min.y);
    }

    #[test]
    fn layout_is_deterministic() {
        let metrics = FakeMetrics::with_image("/tmp/cat.png", Vec2::new(120.0, 90.0));
        let turns = vec![
            ChatTurn::user("show me http://a.example and ```\ncode\n```"),
            ChatTurn {
                speaker: crate::history::Speaker::Bot,
                content: TurnContent::Image {
                    caption: "Found image for \"cat\"".to_string(),
                    path: PathBuf::from("/tmp/cat.png"),
                },
            },
        ];
        let geometry = panel(320.0, 600.0);
        let first = layout(&turns, geometry, &metrics);
        let second = layout(&turns, geometry, &metrics);
        assert_eq!(first, second);
    }

    #[test]
    fn oversized_image_is_scaled_to_fit() {
        let metrics = FakeMetrics::with_image("/tmp/wide.png", Vec2::new(400.0, 100.0));
        let turns = vec![ChatTurn {
            speaker: crate::history::Speaker::Bot,
            content: TurnContent::Image {
                caption: "wide".to_string(),
                path: PathBuf::from("/tmp/wide.png"),
            },
        }];
        let output = layout(&turns, panel(240.0, 600.0), &metrics);

        let image = output
            .elements
            .iter()
            .find(|e| matches!(e.kind, ElementKind::Image { .. }))
            .unwrap();
        assert_eq!(image.rect.width(), 200.0);
        assert_eq!(image.rect.height(), 50.0);
    }

    #[test]
    fn unloadable_image_falls_back_to_caption() {
        let metrics = FakeMetrics::new();
        let turns = vec![ChatTurn {
            speaker: crate::history::Speaker::Bot,
            content: TurnContent::Image {
                caption: "Found image for \"cats\"".to_string(),
                path: PathBuf::from("/missing.png"),
            },
        }];
        let output = layout(&turns, panel(400.0, 600.0), &metrics);

        assert!(!output
            .elements
            .iter()
            .any(|e| matches!(e.kind, ElementKind::Image { .. })));
        assert!(output.elements.iter().any(|e| matches!(
            &e.kind,
            ElementKind::TextLine { text, role: TextRole::Caption } if text.contains("cats")
        )));
    }

    #[test]
    fn turns_above_the_panel_top_are_not_laid_out() {
        let metrics = FakeMetrics::new();
        let turns: Vec<ChatTurn> = (0..50)
            .map(|i| ChatTurn::user(format!("message number {i}")))
            .collect();
        let output = layout(&turns, panel(400.0, 120.0), &metrics);

        assert!(!output.elements.iter().any(|e| matches!(
            &e.kind,
            ElementKind::TextLine { text, .. } if text.contains("number 0")
        )));
        // The newest turn is always present.
        assert!(output.elements.iter().any(|e| matches!(
            &e.kind,
            ElementKind::TextLine { text, .. } if text.contains("number 49")
        )));
    }

    #[test]
    fn consumed_height_tracks_cursor_travel() {
        let metrics = FakeMetrics::new();
        let output = layout(&[ChatTurn::bot("hi")], panel(400.0, 600.0), &metrics);
        assert!(output.consumed_height > 0.0);
        let taller = layout(
            &[ChatTurn::bot("hi"), ChatTurn::bot("ho")],
            panel(400.0, 600.0),
            &metrics,
        );
        assert!(taller.consumed_height > output.consumed_height);
    }
}
