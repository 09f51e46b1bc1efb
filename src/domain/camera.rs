/// Side-scrolling camera.
///
/// The camera is not stored anywhere: the offset is recomputed every frame
/// from the player's position. The renderer adds `(offset_x, offset_y)` to
/// every world coordinate before drawing.
///
/// Horizontal only. Inside half a viewport of either world edge the camera
/// pins to that edge; elsewhere the player stays centered.

use super::bbox::BoundingBox;

pub fn camera_offset(target: &BoundingBox, world_width: i32, viewport_width: i32) -> (i32, i32) {
    let cx = target.center_x();
    let half = viewport_width / 2;

    let offset_x = if cx < half {
        0
    } else if cx > world_width - half {
        viewport_width - world_width
    } else {
        half - cx
    };

    (offset_x, 0)
}
