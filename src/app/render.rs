use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2, vec2};

use crate::chain::{EdgeKind, NodeKind};

use super::graph::Scene;
use super::graph::interaction::InteractionState;
use super::viewport::Transform;

const EDGE_ALPHA: u8 = 130;
const EDGE_WIDTH: f32 = 1.1;
const DEGREE_RADIUS_GAIN: f32 = 1.6;
const DEGREE_RADIUS_CAP: f32 = 8.0;
const ARROW_SIZE: f32 = 7.0;

pub(super) const SEED_HUE: Color32 = Color32::from_rgb(244, 114, 182);
const SELECTED: Color32 = Color32::from_rgb(245, 206, 93);
const HOVERED: Color32 = Color32::from_rgb(255, 164, 101);

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

pub(super) fn node_hue(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Address => Color32::from_rgb(96, 165, 250),
        NodeKind::Contract => Color32::from_rgb(167, 139, 250),
        NodeKind::Token => Color32::from_rgb(251, 191, 36),
        NodeKind::Coin => Color32::from_rgb(52, 211, 153),
    }
}

pub(super) fn edge_hue(kind: EdgeKind) -> Color32 {
    match kind {
        EdgeKind::Transfer => Color32::from_rgb(148, 163, 184),
        EdgeKind::Token => Color32::from_rgb(251, 191, 36),
        EdgeKind::Balance => Color32::from_rgb(52, 211, 153),
        EdgeKind::Coin => Color32::from_rgb(56, 189, 248),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct NodeStyle {
    /// World units.
    pub(super) radius: f32,
    pub(super) fill: Color32,
}

pub(super) fn base_radius(kind: NodeKind, is_seed: bool) -> f32 {
    if is_seed {
        return 10.0;
    }
    match kind {
        NodeKind::Token | NodeKind::Coin => 8.0,
        NodeKind::Address | NodeKind::Contract => 6.0,
    }
}

pub(super) fn node_style(kind: NodeKind, is_seed: bool, degree: u64, max_degree: u64) -> NodeStyle {
    let degree_log = (degree as f32).ln_1p();
    let max_log = (max_degree as f32).ln_1p();
    let weight = if max_log > 0.0 {
        (degree_log / max_log).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let hue = if is_seed { SEED_HUE } else { node_hue(kind) };

    NodeStyle {
        radius: base_radius(kind, is_seed) + (degree_log * DEGREE_RADIUS_GAIN).min(DEGREE_RADIUS_CAP),
        fill: blend_color(Color32::WHITE, hue, weight),
    }
}

pub(super) fn edge_stroke(kind: EdgeKind, weight: u64, scale: f32) -> Stroke {
    let hue = edge_hue(kind);
    Stroke::new(
        EDGE_WIDTH * (weight as f32 + 1.0).ln() * scale,
        Color32::from_rgba_unmultiplied(hue.r(), hue.g(), hue.b(), EDGE_ALPHA),
    )
}

/// Arrow triangle whose tip touches the rim of the target circle.
pub(super) fn arrowhead(start: Pos2, end: Pos2, target_radius: f32, size: f32) -> Option<[Pos2; 3]> {
    let delta = end - start;
    let length = delta.length();
    if !length.is_finite() || length <= target_radius + size {
        return None;
    }

    let direction = delta / length;
    let normal = vec2(-direction.y, direction.x);
    let tip = end - direction * target_radius;
    let back = tip - direction * size;
    Some([tip, back + normal * (size * 0.5), back - normal * (size * 0.5)])
}

pub(super) fn should_label(kind: NodeKind, is_seed: bool) -> bool {
    is_seed || kind != NodeKind::Address
}

pub(super) fn tooltip_text(id: &str, kind: NodeKind, degree: u64) -> String {
    format!("{id}\ntype: {}\ndegree: {degree}", kind.label())
}

fn to_screen(rect: Rect, transform: Transform, world: Vec2) -> Pos2 {
    rect.min + transform.world_to_screen(world).to_vec2()
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: Transform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * transform.scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + transform.translate;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

fn dashed_ring(painter: &Painter, center: Pos2, radius: f32, stroke: Stroke) {
    const SEGMENTS: usize = 40;
    let points = (0..=SEGMENTS)
        .map(|step| {
            let angle = step as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect::<Vec<_>>();
    painter.extend(Shape::dashed_line(&points, stroke, 4.0, 3.0));
}

/// Paints edges, then nodes and their rings. Reads the scene only.
pub(super) fn draw_scene(
    painter: &Painter,
    rect: Rect,
    scene: &Scene,
    transform: Transform,
    interaction: &InteractionState,
) {
    let positions = scene.engine.positions();
    let styles = scene
        .nodes
        .iter()
        .map(|node| node_style(node.kind, node.is_seed, node.degree, scene.max_degree))
        .collect::<Vec<_>>();

    for edge in &scene.edges {
        let (Some(source), Some(target)) = (positions.get(edge.source), positions.get(edge.target))
        else {
            continue;
        };
        if !source.is_finite() || !target.is_finite() {
            continue;
        }

        let start = to_screen(rect, transform, *source);
        let end = to_screen(rect, transform, *target);
        let stroke = edge_stroke(edge.kind, edge.weight, transform.scale);
        painter.line_segment([start, end], stroke);

        if edge.kind.is_directed()
            && let Some(points) = arrowhead(
                start,
                end,
                styles[edge.target].radius * transform.scale,
                ARROW_SIZE * transform.scale.sqrt(),
            )
        {
            painter.add(Shape::convex_polygon(points.to_vec(), stroke.color, Stroke::NONE));
        }
    }

    for (index, node) in scene.nodes.iter().enumerate() {
        let world = positions[index];
        if !world.is_finite() {
            continue;
        }

        let center = to_screen(rect, transform, world);
        let radius = styles[index].radius * transform.scale;
        painter.circle_filled(center, radius, styles[index].fill);
        painter.circle_stroke(
            center,
            radius,
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
        );

        if interaction.selected == Some(index) {
            painter.circle_stroke(center, radius + 4.0, Stroke::new(1.8, SELECTED));
        }
        if interaction.hovered == Some(index) {
            painter.circle_stroke(center, radius + 2.0, Stroke::new(2.0, HOVERED));
        }
        if scene.engine.is_pinned(index) {
            dashed_ring(painter, center, radius + 7.0, Stroke::new(1.3, Color32::from_gray(225)));
        }

        if should_label(node.kind, node.is_seed) {
            painter.text(
                center + vec2(radius + 5.0, 0.0),
                Align2::LEFT_CENTER,
                &node.label,
                FontId::proportional(12.0),
                Color32::from_gray(238),
            );
        }
    }
}

pub(super) fn draw_tooltip(painter: &Painter, anchor: Pos2, text: String) {
    let galley = painter.layout_no_wrap(text, FontId::monospace(12.0), Color32::from_gray(240));
    let origin = anchor + vec2(14.0, 14.0);
    let frame = Rect::from_min_size(origin, galley.size()).expand(6.0);

    painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(12, 14, 18, 230));
    painter.galley(origin, galley, Color32::from_gray(240));
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Color32, pos2};

    use crate::chain::{EdgeKind, NodeKind};

    use super::{arrowhead, blend_color, edge_stroke, node_hue, node_style, should_label, tooltip_text};

    #[test]
    fn blend_interpolates_channels() {
        let mixed = blend_color(Color32::BLACK, Color32::WHITE, 0.5);
        assert!((126..=128).contains(&mixed.r()));
        assert_eq!(blend_color(Color32::BLACK, Color32::WHITE, 2.0), Color32::WHITE);
    }

    #[test]
    fn isolated_nodes_are_white_and_base_sized() {
        let style = node_style(NodeKind::Address, false, 0, 10);
        assert_eq!(style.fill, Color32::WHITE);
        assert_eq!(style.radius, 6.0);

        assert_eq!(node_style(NodeKind::Token, false, 0, 0).radius, 8.0);
        assert_eq!(node_style(NodeKind::Address, true, 0, 0).radius, 10.0);
    }

    #[test]
    fn busiest_node_takes_full_hue() {
        let style = node_style(NodeKind::Contract, false, 40, 40);
        assert_eq!(style.fill, node_hue(NodeKind::Contract));
    }

    #[test]
    fn degree_bonus_is_capped() {
        let small = node_style(NodeKind::Address, false, 3, 1_000_000);
        let huge = node_style(NodeKind::Address, false, 1_000_000, 1_000_000);
        assert!(small.radius > 6.0);
        assert_eq!(huge.radius, 14.0);
    }

    #[test]
    fn edge_width_grows_with_weight_and_zoom() {
        let light = edge_stroke(EdgeKind::Transfer, 1, 1.0);
        let heavy = edge_stroke(EdgeKind::Transfer, 20, 1.0);
        let zoomed = edge_stroke(EdgeKind::Transfer, 20, 2.0);

        assert!(heavy.width > light.width);
        assert!((zoomed.width - heavy.width * 2.0).abs() < 1e-4);
        assert!(light.color.a() < 255);
        assert_ne!(
            edge_stroke(EdgeKind::Token, 1, 1.0).color,
            edge_stroke(EdgeKind::Balance, 1, 1.0).color
        );
    }

    #[test]
    fn arrow_tip_sits_on_target_rim() {
        let points = arrowhead(pos2(0.0, 0.0), pos2(100.0, 0.0), 10.0, 6.0);
        let [tip, left, right] = points.unwrap();

        assert_eq!(tip, pos2(90.0, 0.0));
        assert_eq!(left.x, 84.0);
        assert_eq!(right.x, 84.0);
        assert!(arrowhead(pos2(0.0, 0.0), pos2(12.0, 0.0), 10.0, 6.0).is_none());
        assert!(arrowhead(pos2(0.0, 0.0), pos2(f32::NAN, 0.0), 10.0, 6.0).is_none());
    }

    #[test]
    fn plain_addresses_stay_unlabelled() {
        assert!(!should_label(NodeKind::Address, false));
        assert!(should_label(NodeKind::Address, true));
        assert!(should_label(NodeKind::Contract, false));
        assert!(should_label(NodeKind::Coin, false));
    }

    #[test]
    fn tooltip_lists_id_type_and_degree() {
        assert_eq!(
            tooltip_text("0xabc", NodeKind::Token, 7),
            "0xabc\ntype: token\ndegree: 7"
        );
    }
}
