use super::TileCoord;

/// Rasterizes the straight line from `start` to `end` into single-tile steps.
///
/// The returned sequence excludes `start`, ends at `end`, and holds exactly
/// `start.chebyshev_distance(end)` tiles. Consecutive tiles are 8-connected
/// neighbours. `start == end` yields an empty sequence.
pub fn line_steps(start: TileCoord, end: TileCoord) -> Vec<TileCoord> {
    let dx = (i64::from(end.x) - i64::from(start.x)).abs();
    let dy = (i64::from(end.y) - i64::from(start.y)).abs();
    let sx: i64 = if start.x < end.x { 1 } else { -1 };
    let sy: i64 = if start.y < end.y { 1 } else { -1 };

    let mut err = dx - dy;
    let mut x = i64::from(start.x);
    let mut y = i64::from(start.y);
    let target_x = i64::from(end.x);
    let target_y = i64::from(end.y);
    let mut steps = Vec::with_capacity(dx.max(dy) as usize);

    while x != target_x || y != target_y {
        let e2 = err * 2;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
        // x and y stay between the two i32 endpoints.
        steps.push(TileCoord::new(x as i32, y as i32));
    }

    steps
}
