use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) padding: f32,
    pub(super) max_distance_sq: f32,
}

/// Deterministic push direction for coincident points.
fn separation_axis(from: usize, to: usize) -> Vec2 {
    let angle =
        ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

pub(super) fn repulsion_between(at: Vec2, other: Vec2, strength: f32, softening: f32) -> Vec2 {
    let delta = at - other;
    let distance_sq = delta.length_sq();
    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        vec2(1.0, 0.0)
    };
    direction * (strength / (distance_sq + softening))
}

pub(super) fn accumulate_repulsion(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    softening: f32,
    theta: f32,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let at = positions[index];

    if node.is_leaf() {
        for &member in &node.members {
            if member != index {
                *force += repulsion_between(at, positions[member], strength, softening);
            }
        }
        return;
    }

    let delta = at - node.center_of_mass;
    let distance_sq = delta.length_sq().max(0.0001);
    let distance = distance_sq.sqrt();
    let far_enough = !node.bounds.contains(at)
        && (node.bounds.side_length() / distance) < theta
        && node.mass > 1.0;

    if far_enough {
        let scaled = (strength * node.mass) / (distance_sq + softening);
        *force += (delta / distance) * scaled;
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion(child, index, positions, strength, softening, theta, force);
    }
}

/// Push a pair apart when their padded radii overlap.
fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    let min_distance = radii[from] + radii[to] + (2.0 * params.padding);
    if distance >= min_distance {
        return;
    }

    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        separation_axis(from, to)
    };

    let push = direction * ((min_distance - distance) * params.strength);
    forces[from] += push;
    forces[to] -= push;
}

pub(super) fn accumulate_collisions(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.members.iter().enumerate() {
                for &to in &node_a.members[offset + 1..] {
                    collide_pair(from, to, positions, radii, params, forces);
                }
            }
        } else {
            for &from in &node_a.members {
                for &to in &node_b.members {
                    collide_pair(from, to, positions, radii, params, forces);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collisions(child_a, child_a, true, positions, radii, params, forces);

            for second in (first + 1)..4 {
                if let Some(child_b) = node_a.children[second].as_ref() {
                    accumulate_collisions(child_a, child_b, false, positions, radii, params, forces);
                }
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collisions(child, node_b, false, positions, radii, params, forces);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collisions(node_a, child, false, positions, radii, params, forces);
        }
    }
}
