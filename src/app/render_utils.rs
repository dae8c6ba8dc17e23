use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::ontology::{NodeKind, RelationClass};

pub(super) const BACKGROUND: Color32 = Color32::from_rgb(250, 250, 252);

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Fade a color toward the canvas background. Used to dim everything
/// outside the active highlight sets on the light theme.
pub(super) fn fade_color(color: Color32, visibility: f32) -> Color32 {
    blend_color(BACKGROUND, color, visibility.clamp(0.0, 1.0))
}

/// Fill and outline for a node shape.
pub(super) fn node_palette(
    kind: NodeKind,
    is_hub: bool,
    is_proposed: bool,
    is_new: bool,
) -> (Color32, Color32) {
    match kind {
        NodeKind::Question if is_proposed => (rgb(0xf3e5f5), rgb(0x9c27b0)),
        NodeKind::Question => (rgb(0xe1bee7), rgb(0x7b1fa2)),
        NodeKind::Answer if is_proposed => (rgb(0xe8f5e9), rgb(0x4caf50)),
        NodeKind::Answer => (rgb(0xc8e6c9), rgb(0x388e3c)),
        _ if is_proposed => (rgb(0xfff3cd), rgb(0xffc107)),
        _ if is_new => (rgb(0xd4edda), rgb(0x28a745)),
        _ if is_hub => (rgb(0xe8eaf6), rgb(0x5c6bc0)),
        NodeKind::Instance => (rgb(0xe3f2fd), rgb(0x2196f3)),
        NodeKind::Person => (rgb(0xfce4ec), rgb(0xe91e63)),
        NodeKind::Class => (rgb(0xf8f9fa), rgb(0xdee2e6)),
    }
}

/// Color and width for an edge line.
pub(super) fn edge_style(relation_class: RelationClass, is_proposed: bool) -> (Color32, f32) {
    if is_proposed {
        return (rgb(0xffc107), 3.0);
    }
    match relation_class {
        RelationClass::Taxonomic => (rgb(0x999999), 2.0),
        RelationClass::Informational => (rgb(0x9c27b0), 2.0),
        RelationClass::Predicate => (rgb(0xff6b6b), 2.5),
    }
}

const fn rgb(hex: u32) -> Color32 {
    Color32::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let grid = Stroke::new(1.0, Color32::from_rgba_unmultiplied(40, 45, 60, 16));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], grid);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], grid);
        y += step;
    }
}

pub(super) fn dashed_circle(painter: &Painter, center: Pos2, radius: f32, stroke: Stroke) {
    let segments = ((radius * 0.9) as usize).clamp(24, 96);
    let points = (0..=segments)
        .map(|i| {
            let angle = (i as f32 / segments as f32) * std::f32::consts::TAU;
            Pos2::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect::<Vec<_>>();
    painter.extend(Shape::dashed_line(&points, stroke, 6.0, 4.0));
}

pub(super) fn dashed_rect(painter: &Painter, rect: Rect, stroke: Stroke) {
    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ];
    painter.extend(Shape::dashed_line(&corners, stroke, 6.0, 4.0));
}

/// Arrowhead pointing along `from -> to`, with its tip pulled back by
/// `inset` so it rests on the target shape's border.
pub(super) fn draw_arrowhead(painter: &Painter, from: Pos2, to: Pos2, inset: f32, color: Color32) {
    let delta = to - from;
    let length = delta.length();
    if length <= inset + 1.0 {
        return;
    }

    let direction = delta / length;
    let tip = to - direction * inset;
    let size = 8.0;
    let normal = Vec2::new(-direction.y, direction.x);
    let base = tip - direction * size;

    painter.add(Shape::convex_polygon(
        vec![
            tip,
            base + normal * (size * 0.5),
            base - normal * (size * 0.5),
        ],
        color,
        Stroke::NONE,
    ));
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn screen_world_transforms_are_inverse() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), vec2(800.0, 600.0));
        let pan = vec2(30.0, -12.0);
        let zoom = 1.7;

        let world = vec2(123.0, -456.0);
        let screen = world_to_screen(rect, pan, zoom, world);
        let roundtrip = screen_to_world(rect, pan, zoom, screen);
        assert!((roundtrip - world).length() < 1e-3);
    }

    #[test]
    fn proposed_palette_overrides_kind_specific_fill() {
        let (_, confirmed_stroke) = node_palette(NodeKind::Instance, false, false, false);
        let (proposed_fill, proposed_stroke) = node_palette(NodeKind::Instance, false, true, false);
        assert_ne!(confirmed_stroke, proposed_stroke);
        assert_eq!(proposed_fill, Color32::from_rgb(0xff, 0xf3, 0xcd));
    }

    #[test]
    fn fully_faded_color_matches_background() {
        assert_eq!(fade_color(Color32::RED, 0.0), BACKGROUND);
        assert_eq!(fade_color(Color32::RED, 1.0), Color32::RED);
    }
}
