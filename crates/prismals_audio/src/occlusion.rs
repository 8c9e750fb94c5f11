//! Ray-traced occlusion.
//!
//! A ray is marched from the listener to each sound source through the
//! block grid with a 3D DDA. Every cell the ray crosses adds
//! `damping × length` to the path damping (`AIR_DAMPING` for empty cells),
//! and the source gain is `exp(-DAMPING_FALLOFF × damping)`.
//!
//! Blocks are unit cubes centered on their position, so the cell of a point
//! `p` is `round(p)`.

use std::collections::HashMap;

use prismals_core::{InstanceId, PrototypeId, PrototypeRegistry, Vec3, World};
use tracing::trace;

use crate::error::AudioResult;
use crate::shared::SourceState;
use crate::visualizer::VISUALIZER_NAME;

/// Damping per unit length through empty cells.
pub const AIR_DAMPING: f32 = 0.25;

/// Exponent scale turning damping into gain.
pub const DAMPING_FALLOFF: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cell {
    damping: f32,
    occluder: bool,
}

/// Block occupancy of one world.
#[derive(Clone, Debug, Default)]
pub struct OcclusionGrid {
    cells: HashMap<[i32; 3], Cell>,
}

impl OcclusionGrid {
    /// Indexes every block instance of `world`. The first block in a cell wins.
    ///
    /// # Errors
    ///
    /// Fails if an instance references an unregistered prototype.
    pub fn build(world: &World, registry: &PrototypeRegistry) -> AudioResult<Self> {
        let mut cells = HashMap::with_capacity(world.len());
        for inst in &world.instances {
            let proto = registry.get(inst.prototype)?;
            if !proto.is_block {
                continue;
            }
            cells.entry(inst.position.round_to_cell()).or_insert(Cell {
                damping: proto.damping_factor,
                occluder: proto.is_occluder,
            });
        }
        Ok(Self { cells })
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Marches from `listener` to `source`.
    #[must_use]
    pub fn trace(&self, listener: Vec3, source: Vec3) -> SourceState {
        let max_distance = listener.distance(source);
        if max_distance <= f32::EPSILON {
            return SourceState::default();
        }
        let dir = (source - listener) * (1.0 / max_distance);

        // Shift by half a cell so cell boundaries sit on integers.
        let shifted = listener + Vec3::splat(0.5);
        let origin = shifted.to_array();
        let dir = dir.to_array();

        let mut cell = shifted.floor_to_cell();
        let mut step = [0_i32; 3];
        let mut t_max = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];
        for axis in 0..3 {
            if dir[axis] > 0.0 {
                step[axis] = 1;
                t_max[axis] = (cell[axis] as f32 + 1.0 - origin[axis]) / dir[axis];
                t_delta[axis] = 1.0 / dir[axis];
            } else if dir[axis] < 0.0 {
                step[axis] = -1;
                t_max[axis] = (cell[axis] as f32 - origin[axis]) / dir[axis];
                t_delta[axis] = -1.0 / dir[axis];
            }
        }

        let mut damping = 0.0;
        let mut occluded = false;
        let mut traveled = 0.0;
        while traveled < max_distance {
            let axis = if t_max[0] < t_max[1] {
                if t_max[0] < t_max[2] { 0 } else { 2 }
            } else if t_max[1] < t_max[2] {
                1
            } else {
                2
            };

            // The segment [traveled, exit] lies inside `cell`.
            let exit = t_max[axis].min(max_distance);
            let length = exit - traveled;
            match self.cells.get(&cell) {
                Some(c) => {
                    damping += c.damping * length;
                    occluded |= c.occluder;
                }
                None => damping += AIR_DAMPING * length,
            }

            traveled = exit;
            cell[axis] += step[axis];
            t_max[axis] += t_delta[axis];
        }

        SourceState {
            occluded,
            distance_gain: (-DAMPING_FALLOFF * damping).exp(),
        }
    }
}

/// Per-source propagation for the current frame.
#[derive(Debug, Default)]
pub struct OcclusionTracer {
    visualizer: Option<PrototypeId>,
    sources: HashMap<InstanceId, SourceState>,
}

impl OcclusionTracer {
    /// Creates a tracer for the `AudioVisualizer` prototype, if registered.
    #[must_use]
    pub fn new(registry: &PrototypeRegistry) -> Self {
        Self {
            visualizer: registry.find(VISUALIZER_NAME),
            sources: HashMap::new(),
        }
    }

    /// Recomputes the state of every source in `world`.
    ///
    /// Returns the number of sources traced.
    ///
    /// # Errors
    ///
    /// Fails if an instance references an unregistered prototype.
    pub fn update(&mut self, world: &World, registry: &PrototypeRegistry, listener: Vec3) -> AudioResult<usize> {
        self.sources.clear();
        let Some(visualizer) = self.visualizer else {
            return Ok(0);
        };
        if world.count_of(visualizer) == 0 {
            return Ok(0);
        }

        let grid = OcclusionGrid::build(world, registry)?;
        for inst in world.instances.iter().filter(|i| i.prototype == visualizer) {
            let state = grid.trace(listener, inst.position);
            trace!(
                source = %inst.id,
                gain = state.distance_gain,
                occluded = state.occluded,
                "traced audio source"
            );
            self.sources.insert(inst.id, state);
        }
        Ok(self.sources.len())
    }

    /// State of a source; open and at unit gain if it was not traced.
    #[must_use]
    pub fn source_state(&self, id: InstanceId) -> SourceState {
        self.sources.get(&id).copied().unwrap_or_default()
    }

    /// Number of sources traced by the last update.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prismals_core::{InstanceFactory, Prototype, DEBUG_COLOR};

    const EPS: f32 = 1e-4;

    fn registry() -> (PrototypeRegistry, PrototypeId, PrototypeId, PrototypeId) {
        let mut registry = PrototypeRegistry::new();
        let wall = registry.register(Prototype::block("Wall").with_occluder(2.0)).unwrap();
        let glass = registry.register(Prototype::block("Glass")).unwrap();
        let vis = registry.register(Prototype::new(VISUALIZER_NAME)).unwrap();
        (registry, wall, glass, vis)
    }

    #[test]
    fn test_open_air_gain() {
        let (registry, ..) = registry();
        let grid = OcclusionGrid::build(&World::new("w"), &registry).unwrap();
        let state = grid.trace(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert!(!state.occluded);
        let expected = (-DAMPING_FALLOFF * AIR_DAMPING * 10.0).exp();
        assert!((state.distance_gain - expected).abs() < EPS);
    }

    #[test]
    fn test_wall_occludes_and_damps() {
        let (registry, wall, ..) = registry();
        let mut factory = InstanceFactory::new();
        let mut world = World::new("w");
        world.push(factory.create(wall, Vec3::new(5.0, 0.0, 0.0), DEBUG_COLOR));
        let grid = OcclusionGrid::build(&world, &registry).unwrap();

        let state = grid.trace(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert!(state.occluded);
        // 9 units of air, 1 unit of wall.
        let expected = (-DAMPING_FALLOFF * (9.0 * AIR_DAMPING + 2.0)).exp();
        assert!((state.distance_gain - expected).abs() < EPS);

        // A ray passing beside the wall is unaffected.
        let beside = grid.trace(Vec3::new(0.0, 2.0, 0.0), Vec3::new(10.0, 2.0, 0.0));
        assert!(!beside.occluded);
    }

    #[test]
    fn test_non_occluder_block_damps_only() {
        let (registry, _, glass, _) = registry();
        let mut factory = InstanceFactory::new();
        let mut world = World::new("w");
        world.push(factory.create(glass, Vec3::new(0.0, 0.0, -3.0), DEBUG_COLOR));
        let grid = OcclusionGrid::build(&world, &registry).unwrap();

        let state = grid.trace(Vec3::ZERO, Vec3::new(0.0, 0.0, -6.0));
        assert!(!state.occluded);
        let expected = (-DAMPING_FALLOFF * (5.0 * AIR_DAMPING + Prototype::DEFAULT_DAMPING)).exp();
        assert!((state.distance_gain - expected).abs() < EPS);
    }

    #[test]
    fn test_diagonal_ray_terminates() {
        let (registry, ..) = registry();
        let grid = OcclusionGrid::build(&World::new("w"), &registry).unwrap();
        let state = grid.trace(Vec3::new(0.3, -1.2, 4.4), Vec3::new(-7.1, 3.3, -2.0));
        let length = Vec3::new(0.3, -1.2, 4.4).distance(Vec3::new(-7.1, 3.3, -2.0));
        let expected = (-DAMPING_FALLOFF * AIR_DAMPING * length).exp();
        assert!((state.distance_gain - expected).abs() < EPS);
        assert_eq!(grid.trace(Vec3::ZERO, Vec3::ZERO), SourceState::default());
    }

    #[test]
    fn test_tracer_tracks_visualizers() {
        let (registry, wall, _, vis) = registry();
        let mut factory = InstanceFactory::new();
        let mut world = World::new("w");
        world.push(factory.create(wall, Vec3::new(0.0, 0.0, -2.0), DEBUG_COLOR));
        let behind = factory.create(vis, Vec3::new(0.0, 0.0, -4.0), DEBUG_COLOR);
        let open = factory.create(vis, Vec3::new(4.0, 0.0, 0.0), DEBUG_COLOR);
        world.push(behind);
        world.push(open);

        let mut tracer = OcclusionTracer::new(&registry);
        assert_eq!(tracer.update(&world, &registry, Vec3::ZERO).unwrap(), 2);
        assert!(tracer.source_state(behind.id).occluded);
        assert!(!tracer.source_state(open.id).occluded);
        assert_eq!(tracer.source_state(InstanceId(999)), SourceState::default());
    }

    #[test]
    fn test_tracer_without_visualizer_prototype() {
        let mut registry = PrototypeRegistry::new();
        registry.register(Prototype::block("Stone")).unwrap();
        let mut tracer = OcclusionTracer::new(&registry);
        assert_eq!(tracer.update(&World::new("w"), &registry, Vec3::ZERO).unwrap(), 0);
    }
}
