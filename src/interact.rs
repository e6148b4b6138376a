use crate::layout::{DrawableElement, ElementKind};
use egui::{Pos2, Rect};
use std::path::PathBuf;

pub const SIGN_IN_URL: &str = "https://accounts.google.com/";

/// Side effect the frame loop should perform for a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    DismissModal,
    SignIn,
    OpenLink(String),
    OpenImage(PathBuf),
}

/// Routes one primary click against the current frame's hit-test list.
///
/// Precedence: an open modal swallows the click, then the sign-in control,
/// then the first element (in emission order) containing the point. Elements
/// are always the current frame's; callers replace the list wholesale every
/// frame, so stale geometry is never consulted.
pub fn route_click(
    pos: Pos2,
    modal_open: bool,
    sign_in: Option<Rect>,
    elements: &[DrawableElement],
) -> Option<ClickAction> {
    if modal_open {
        return Some(ClickAction::DismissModal);
    }

    if sign_in.is_some_and(|rect| rect.contains(pos)) {
        return Some(ClickAction::SignIn);
    }

    for element in elements {
        if !element.rect.contains(pos) {
            continue;
        }
        match &element.kind {
            ElementKind::LinkSpan { url } => return Some(ClickAction::OpenLink(url.clone())),
            ElementKind::Image { path } => return Some(ClickAction::OpenImage(path.clone())),
            // Plain text and code are not interactive, but they still end
            // the scan for the first containing element.
            ElementKind::TextLine { .. } | ElementKind::CodeLine(_) => return None,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TextRole;
    use egui::{pos2, vec2, Rect};

    fn link(x: f32, y: f32, url: &str) -> DrawableElement {
        DrawableElement {
            rect: Rect::from_min_size(pos2(x, y), vec2(100.0, 16.0)),
            kind: ElementKind::LinkSpan {
                url: url.to_string(),
            },
        }
    }

    fn image(x: f32, y: f32, path: &str) -> DrawableElement {
        DrawableElement {
            rect: Rect::from_min_size(pos2(x, y), vec2(120.0, 80.0)),
            kind: ElementKind::Image {
                path: PathBuf::from(path),
            },
        }
    }

    fn body_text(x: f32, y: f32, text: &str) -> DrawableElement {
        DrawableElement {
            rect: Rect::from_min_size(pos2(x, y), vec2(100.0, 16.0)),
            kind: ElementKind::TextLine {
                text: text.to_string(),
                role: TextRole::Body,
            },
        }
    }

    #[test]
    fn open_modal_swallows_any_click() {
        let elements = vec![link(0.0, 0.0, "https://example.com")];
        let action = route_click(pos2(10.0, 10.0), true, None, &elements);
        assert_eq!(action, Some(ClickAction::DismissModal));
    }

    #[test]
    fn sign_in_box_takes_precedence_over_elements() {
        let sign_in = Rect::from_min_size(pos2(0.0, 0.0), vec2(60.0, 20.0));
        let elements = vec![link(0.0, 0.0, "https://example.com")];
        let action = route_click(pos2(5.0, 5.0), false, Some(sign_in), &elements);
        assert_eq!(action, Some(ClickAction::SignIn));
    }

    #[test]
    fn click_on_link_yields_its_exact_url() {
        let elements = vec![
            body_text(0.0, 0.0, "see"),
            link(0.0, 20.0, "https://example.com/docs"),
        ];
        let action = route_click(pos2(50.0, 28.0), false, None, &elements);
        assert_eq!(
            action,
            Some(ClickAction::OpenLink("https://example.com/docs".to_string()))
        );
    }

    #[test]
    fn click_on_image_opens_it() {
        let elements = vec![image(10.0, 10.0, "/tmp/cat.png")];
        let action = route_click(pos2(40.0, 40.0), false, None, &elements);
        assert_eq!(
            action,
            Some(ClickAction::OpenImage(PathBuf::from("/tmp/cat.png")))
        );
    }

    #[test]
    fn first_containing_element_wins() {
        // Overlapping link and image; the link was emitted first.
        let elements = vec![link(0.0, 0.0, "https://first.example"), image(0.0, 0.0, "/x.png")];
        let action = route_click(pos2(5.0, 5.0), false, None, &elements);
        assert_eq!(
            action,
            Some(ClickAction::OpenLink("https://first.example".to_string()))
        );
    }

    #[test]
    fn miss_performs_no_action() {
        let elements = vec![link(0.0, 0.0, "https://example.com")];
        let action = route_click(pos2(500.0, 500.0), false, None, &elements);
        assert_eq!(action, None);
    }

    #[test]
    fn click_on_plain_text_performs_no_action() {
        let elements = vec![body_text(0.0, 0.0, "hello")];
        let action = route_click(pos2(5.0, 5.0), false, None, &elements);
        assert_eq!(action, None);
    }
}
