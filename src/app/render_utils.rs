use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) const MIN_NODE_RADIUS: f32 = 4.0;
pub(super) const DEFAULT_NODE_RADIUS: f32 = 9.0;

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

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(18, 22, 28));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let grid_stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 68, 78, 68));
    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            grid_stroke,
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            grid_stroke,
        );
        y += step;
    }
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

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];

    (0..4).any(|side| segments_intersect(start, end, corners[side], corners[(side + 1) % 4]))
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(origin: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - origin;
        let ob = b - origin;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    if a1.x.max(a2.x) < b1.x.min(b2.x)
        || b1.x.max(b2.x) < a1.x.min(a2.x)
        || a1.y.max(a2.y) < b1.y.min(b2.y)
        || b1.y.max(b2.y) < a1.y.min(a2.y)
    {
        return false;
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Log-normalizes a score into [0, 1]. Non-finite or non-positive scores map
/// to 0 so garbage never reaches position math.
fn normalize_score(value: f64, min: f64, max: f64) -> f32 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }

    let min = min.max(1e-12);
    let max = max.max(1e-12);
    if max <= min {
        return 0.5;
    }

    let t = (value.clamp(min, max).ln() - min.ln()) / (max.ln() - min.ln());
    t.clamp(0.0, 1.0) as f32
}

pub(super) fn node_radius(score: f64, min: f64, max: f64) -> f32 {
    MIN_NODE_RADIUS + (normalize_score(score, min, max) * 22.0)
}

pub(super) fn score_color(score: f64, min: f64, max: f64) -> Color32 {
    let t = normalize_score(score, min, max);
    let r = (60.0 + (185.0 * t)) as u8;
    let g = (148.0 - (66.0 * t)) as u8;
    let b = (212.0 - (150.0 * t)) as u8;
    Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_scores_get_the_minimum_radius() {
        assert_eq!(node_radius(f64::NAN, 0.001, 0.5), MIN_NODE_RADIUS);
        assert_eq!(node_radius(f64::INFINITY * -1.0, 0.001, 0.5), MIN_NODE_RADIUS);
        assert_eq!(node_radius(-3.0, 0.001, 0.5), MIN_NODE_RADIUS);
    }

    #[test]
    fn radius_grows_with_score() {
        let small = node_radius(0.001, 0.001, 0.5);
        let large = node_radius(0.5, 0.001, 0.5);
        assert!(small < large);
        assert!(small >= MIN_NODE_RADIUS);
    }

    #[test]
    fn screen_world_round_trip() {
        let rect = Rect::from_min_size(Pos2::ZERO, eframe::egui::vec2(800.0, 600.0));
        let pan = eframe::egui::vec2(12.0, -40.0);
        let world = eframe::egui::vec2(75.0, -120.0);

        let screen = world_to_screen(rect, pan, 1.7, world);
        let back = screen_to_world(rect, pan, 1.7, screen);
        assert!((back - world).length() < 1e-3);
    }
}
