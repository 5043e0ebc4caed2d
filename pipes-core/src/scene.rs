use crate::camera::CameraPose;
use crate::types::ColorIndex;
use glam::{IVec3, Vec3};

/// Edge length of one grid cell in world units.
pub const CELL_SIZE: f32 = 4.0;

/// Pipe radius in world units; consumed by renderers.
pub const PIPE_RADIUS: f32 = 0.4;

/// The shared pipe palette, RGB. Pipes carry an index into this table.
pub const PIPE_COLORS: [[u8; 3]; 8] = [
    [255, 67, 67],  // red
    [67, 255, 67],  // green
    [67, 67, 255],  // blue
    [255, 255, 67], // yellow
    [255, 67, 255], // magenta
    [67, 255, 255], // cyan
    [255, 165, 67], // orange
    [165, 67, 255], // purple
];

/// Maps a grid cell to its world-space position, centering the lattice on
/// the origin.
pub fn cell_to_world(cell: IVec3, dim: usize) -> Vec3 {
    (cell.as_vec3() - Vec3::splat((dim / 2) as f32)) * CELL_SIZE
}

/// One active pipe as a renderer sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenePipe {
    pub color: ColorIndex,
    /// Committed segment endpoints in world space, oldest first.
    pub joints: Vec<Vec3>,
    /// The partially grown tip: from the last committed joint toward the
    /// pipe's current position, scaled by the growth progress. `None` until
    /// the first segment has been committed or while progress is zero.
    pub growing: Option<[Vec3; 2]>,
}

/// Renderable description of one tick, handed to the external renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub pipes: Vec<ScenePipe>,
    pub camera: CameraPose,
    /// Half the world-space extent of the lattice, for bounds display.
    pub half_extent: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_center_maps_to_world_origin() {
        assert_eq!(cell_to_world(IVec3::new(10, 10, 10), 20), Vec3::ZERO);
    }

    #[test]
    fn cell_offsets_scale_by_cell_size() {
        assert_eq!(
            cell_to_world(IVec3::new(0, 0, 0), 20),
            Vec3::new(-40.0, -40.0, -40.0)
        );
        assert_eq!(
            cell_to_world(IVec3::new(11, 10, 9), 20),
            Vec3::new(CELL_SIZE, 0.0, -CELL_SIZE)
        );
    }

    #[test]
    fn empty_scene_has_no_pipes() {
        let scene = Scene::default();
        assert!(scene.pipes.is_empty());
        assert_eq!(scene.half_extent, 0.0);
    }
}
