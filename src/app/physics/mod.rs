mod forces;
mod quadtree;

use eframe::egui::Vec2;

use super::{PhysicsConfig, RenderGraph};
use forces::{CollisionParams, accumulate_collisions, accumulate_repulsion};
use quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.72;
const REPULSION_SOFTENING: f32 = 620.0;
const VELOCITY_DAMPING: f32 = 0.9;
const FORCE_GAIN: f32 = 0.055;
const MAX_FORCE: f32 = 220.0;
const MAX_SPEED: f32 = 24.0;

pub(in crate::app) const START_ENERGY: f32 = 1.0;
pub(in crate::app) const STOP_ENERGY: f32 = 0.001;
pub(in crate::app) const REHEAT_ENERGY: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum SimPhase {
    Idle,
    Running,
    Cooling,
}

/// Lifecycle of the layout simulation: `Idle -> Running -> Cooling -> Idle`.
/// `Running` means a gesture is keeping the layout hot, `Cooling` means it is
/// settling. Energy decays in both phases; the engine stops at the energy
/// floor, never after a fixed iteration count.
pub(in crate::app) struct Simulation {
    phase: SimPhase,
    energy: f32,
}

impl Simulation {
    pub(in crate::app) fn new() -> Self {
        Self {
            phase: SimPhase::Idle,
            energy: 0.0,
        }
    }

    pub(in crate::app) fn start(&mut self) {
        self.energy = START_ENERGY;
        self.phase = SimPhase::Running;
    }

    pub(in crate::app) fn reheat(&mut self, boost: f32) {
        self.energy = self.energy.max(boost.clamp(STOP_ENERGY, START_ENERGY));
        self.phase = SimPhase::Running;
    }

    pub(in crate::app) fn cool(&mut self) {
        if self.phase == SimPhase::Running {
            self.phase = SimPhase::Cooling;
        }
    }

    pub(in crate::app) fn phase(&self) -> SimPhase {
        self.phase
    }

    pub(in crate::app) fn energy(&self) -> f32 {
        self.energy
    }

    pub(in crate::app) fn is_idle(&self) -> bool {
        self.phase == SimPhase::Idle
    }

    fn decay(&mut self, rate: f32, time_step_scale: f32) {
        self.energy *= rate.clamp(0.5, 0.9999).powf(time_step_scale);
        if self.energy < STOP_ENERGY {
            self.energy = 0.0;
            self.phase = SimPhase::Idle;
        }
    }
}

/// Advances the simulation one tick. Returns whether ticking should continue.
pub(in crate::app) fn step_simulation(cache: &mut RenderGraph, config: PhysicsConfig) -> bool {
    if cache.sim.is_idle() || cache.nodes.is_empty() {
        return false;
    }

    let node_count = cache.nodes.len();
    let scratch = &mut cache.physics_scratch;
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.forces.fill(Vec2::ZERO);
    scratch.positions.clear();
    scratch.radii.clear();
    let mut max_radius = 0.0_f32;
    for node in &cache.nodes {
        scratch.positions.push(node.world_pos);
        scratch.radii.push(node.base_radius);
        max_radius = max_radius.max(node.base_radius);
    }

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;
    let radii = &scratch.radii;

    let repulsion_strength = 52_000.0 * config.repulsion.clamp(0.1, 4.0);
    let spring_strength = 0.018;
    let spring_damping = 0.22;
    let collision_strength = 1.6;
    let center_pull = 0.0012;
    let padding = config.collision_padding.clamp(0.0, 24.0);
    let time_step_scale = (config.delta_seconds * 60.0).clamp(0.25, 3.0);
    let damping_factor = VELOCITY_DAMPING.powf(time_step_scale);

    if node_count >= 2
        && let Some(quadtree) = QuadNode::build(positions)
    {
        for (index, force) in forces.iter_mut().enumerate() {
            accumulate_repulsion(
                &quadtree,
                index,
                positions,
                repulsion_strength,
                REPULSION_SOFTENING,
                BARNES_HUT_THETA,
                force,
            );
        }

        let max_collision_distance = (max_radius + padding) * 2.0;
        accumulate_collisions(
            &quadtree,
            &quadtree,
            true,
            positions,
            radii,
            CollisionParams {
                strength: collision_strength,
                padding,
                max_distance_sq: max_collision_distance * max_collision_distance,
            },
            forces,
        );
    }

    for &(from, to) in &cache.edges {
        if from == to {
            continue;
        }

        let delta = cache.nodes[from].world_pos - cache.nodes[to].world_pos;
        let distance_sq = delta.length_sq();
        if distance_sq <= 1e-8 {
            continue;
        }
        let distance = distance_sq.sqrt();
        let direction = delta / distance;

        let preferred = config.link_distance.max(1.0)
            + cache.nodes[from].base_radius
            + cache.nodes[to].base_radius;
        let spring = (distance - preferred) * spring_strength;
        let relative_velocity = cache.nodes[from].velocity - cache.nodes[to].velocity;
        let damping_force = relative_velocity.dot(direction) * spring_damping;
        let correction = direction * (spring + damping_force);

        forces[from] -= correction;
        forces[to] += correction;
    }

    // Weak pull toward the origin; the view puts the origin at the viewport
    // center, so the layout centroid converges there.
    for (index, force) in forces.iter_mut().enumerate() {
        *force -= cache.nodes[index].world_pos * center_pull;
    }

    let energy = cache.sim.energy();
    let bounds = config.bounds_half_extent.max(100.0);
    let max_force_sq = MAX_FORCE * MAX_FORCE;
    let max_speed_sq = MAX_SPEED * MAX_SPEED;
    for (index, force_value) in forces.iter().enumerate() {
        let node = &mut cache.nodes[index];
        if let Some(pin) = node.pin {
            node.world_pos = pin;
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut force = *force_value;
        let force_sq = force.length_sq();
        if force_sq > max_force_sq {
            force *= MAX_FORCE / force_sq.sqrt();
        }

        let mut velocity =
            (node.velocity + force * (FORCE_GAIN * time_step_scale * energy)) * damping_factor;
        let speed_sq = velocity.length_sq();
        if speed_sq > max_speed_sq {
            velocity *= MAX_SPEED / speed_sq.sqrt();
        }

        node.velocity = velocity;
        node.world_pos += velocity * time_step_scale;
        node.world_pos.x = node.world_pos.x.clamp(-bounds, bounds);
        node.world_pos.y = node.world_pos.y.clamp(-bounds, bounds);
    }

    cache.sim.decay(config.energy_decay, time_step_scale);
    !cache.sim.is_idle()
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Vec2, vec2};

    use crate::app::graph::seed_position;
    use crate::app::{PhysicsConfig, RenderGraph, RenderNode};

    use super::*;

    fn test_node(id: &str, position: Vec2) -> RenderNode {
        RenderNode {
            id: id.to_owned(),
            world_pos: position,
            velocity: Vec2::ZERO,
            pin: None,
            score: 0.0,
            base_radius: 8.0,
        }
    }

    fn path_graph(count: usize) -> RenderGraph {
        let nodes = (0..count)
            .map(|index| test_node(&format!("n{index}"), seed_position(index, count)))
            .collect::<Vec<_>>();
        let edges = (0..count.saturating_sub(1))
            .map(|index| (index, index + 1))
            .collect::<Vec<_>>();
        RenderGraph::new(nodes, edges)
    }

    #[test]
    fn simulation_terminates_at_the_energy_floor() {
        let mut graph = path_graph(5);
        graph.sim.start();

        let config = PhysicsConfig::default();
        let mut ticks = 0usize;
        while step_simulation(&mut graph, config) {
            ticks += 1;
            assert!(ticks < 1000, "simulation failed to settle");
        }

        assert!(graph.sim.is_idle());
        assert_eq!(graph.sim.energy(), 0.0);
        assert!(!step_simulation(&mut graph, config));
    }

    #[test]
    fn idle_simulation_does_not_tick() {
        let mut graph = path_graph(3);
        let before = graph.nodes.iter().map(|node| node.world_pos).collect::<Vec<_>>();

        assert!(!step_simulation(&mut graph, PhysicsConfig::default()));
        for (node, position) in graph.nodes.iter().zip(before) {
            assert_eq!(node.world_pos, position);
        }
    }

    #[test]
    fn pinned_node_holds_its_pin_exactly() {
        let mut graph = path_graph(5);
        let pin = vec2(33.0, -17.0);
        graph.nodes[2].pin = Some(pin);
        graph.sim.start();

        let config = PhysicsConfig::default();
        for _ in 0..50 {
            step_simulation(&mut graph, config);
        }

        assert_eq!(graph.nodes[2].world_pos, pin);
        assert_eq!(graph.nodes[2].velocity, Vec2::ZERO);
    }

    #[test]
    fn positions_stay_inside_the_bounds() {
        let mut graph = path_graph(8);
        graph.sim.start();

        let config = PhysicsConfig {
            bounds_half_extent: 200.0,
            ..PhysicsConfig::default()
        };
        for _ in 0..200 {
            step_simulation(&mut graph, config);
        }

        for node in &graph.nodes {
            assert!(node.world_pos.x.abs() <= 200.0);
            assert!(node.world_pos.y.abs() <= 200.0);
        }
    }

    #[test]
    fn reheat_resumes_ticking_and_cool_lets_it_settle() {
        let mut graph = path_graph(4);
        graph.sim.start();

        let config = PhysicsConfig::default();
        while step_simulation(&mut graph, config) {}
        assert!(graph.sim.is_idle());

        graph.sim.reheat(REHEAT_ENERGY);
        assert_eq!(graph.sim.phase(), SimPhase::Running);
        assert!(step_simulation(&mut graph, config));

        graph.sim.cool();
        assert_eq!(graph.sim.phase(), SimPhase::Cooling);
        while step_simulation(&mut graph, config) {}
        assert!(graph.sim.is_idle());
    }

    #[test]
    fn quadtree_repulsion_matches_naive_within_tolerance() {
        let positions = (0..48)
            .map(|index| {
                let base = seed_position(index, 48);
                base + vec2((index % 7) as f32 * 13.0, (index % 5) as f32 * -11.0)
            })
            .collect::<Vec<_>>();

        let strength = 52_000.0;
        let quadtree = QuadNode::build(&positions).unwrap();

        for index in 0..positions.len() {
            let mut approximate = Vec2::ZERO;
            accumulate_repulsion(
                &quadtree,
                index,
                &positions,
                strength,
                REPULSION_SOFTENING,
                BARNES_HUT_THETA,
                &mut approximate,
            );

            let mut exact = Vec2::ZERO;
            for (other, position) in positions.iter().enumerate() {
                if other != index {
                    exact += forces::repulsion_between(
                        positions[index],
                        *position,
                        strength,
                        REPULSION_SOFTENING,
                    );
                }
            }

            let tolerance = exact.length() * 0.25 + 0.05;
            assert!(
                (approximate - exact).length() <= tolerance,
                "node {index}: approx {approximate:?} vs exact {exact:?}"
            );
        }
    }
}
