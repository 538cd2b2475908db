/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Room geometry: rectangular bounds, internal wall segments and the
//! point-in-room / segment-crossing queries the simulation needs.

use serde::{Deserialize, Serialize};

use crate::{Float, Int, SimError};

/// A position in the room. Positions are continuous; the dirt grid is not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate, in `[0, width]`.
    pub x: Float,
    /// Y coordinate, in `[0, height]`.
    pub y: Float,
}

/// A dirt-grid cell. The tile `(x, y)` covers positions
/// `[x, x + 1) x [y, y + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileLocation {
    /// Tile column.
    pub x: Int,
    /// Tile row.
    pub y: Int,
}

/// An internal wall: a straight segment between two integer-coordinate
/// endpoints. Walls may be diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wall {
    /// One endpoint.
    pub a: TileLocation,
    /// The other endpoint.
    pub b: TileLocation,
}

/// A rectangular room with optional internal walls.
///
/// The room spans `[0, width] x [0, height]`. Wall endpoints must lie inside
/// those bounds; [`RoomLayout::set_wall`] rejects anything else. The layout
/// is pure configuration: it is built once by the caller and passed by
/// reference into simulations, never mutated by them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    width: Int,
    height: Int,
    walls: Vec<Wall>,
}

impl RoomLayout {
    /// Create an empty rectangular room.
    pub fn new(width: Int, height: Int) -> Self {
        Self {
            width,
            height,
            walls: Vec::new(),
        }
    }

    /// Add an internal wall from `a` to `b`.
    ///
    /// Both endpoints must lie within `[0, width] x [0, height]`, otherwise
    /// the wall is rejected with [`SimError::MalformedRoomLayout`] and the
    /// layout is left unchanged.
    pub fn set_wall(&mut self, a: (Int, Int), b: (Int, Int)) -> Result<(), SimError> {
        for (x, y) in [a, b] {
            if x < 0 || x > self.width || y < 0 || y > self.height {
                return Err(SimError::MalformedRoomLayout {
                    x,
                    y,
                    width: self.width,
                    height: self.height,
                });
            }
        }
        self.walls.push(Wall {
            a: TileLocation { x: a.0, y: a.1 },
            b: TileLocation { x: b.0, y: b.1 },
        });
        Ok(())
    }

    /// Room width.
    pub fn width(&self) -> Int {
        self.width
    }

    /// Room height.
    pub fn height(&self) -> Int {
        self.height
    }

    /// The internal walls.
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Number of tiles in the dirt grid.
    pub fn num_tiles(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Whether a position lies within the room bounds.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.x <= self.width as Float && p.y >= 0.0 && p.y <= self.height as Float
    }

    /// The dirt-grid tile underneath a position. Positions exactly on the
    /// far boundary belong to the last tile.
    pub fn tile_of(&self, p: Point) -> TileLocation {
        TileLocation {
            x: (p.x.floor() as Int).clamp(0, self.width - 1),
            y: (p.y.floor() as Int).clamp(0, self.height - 1),
        }
    }

    /// Whether moving in a straight line from `from` to `to` is blocked,
    /// either by leaving the room or by crossing an internal wall.
    pub fn blocks(&self, from: Point, to: Point) -> bool {
        if !self.contains(to) {
            return true;
        }
        self.walls.iter().any(|wall| {
            let a = Point {
                x: wall.a.x as Float,
                y: wall.a.y as Float,
            };
            let b = Point {
                x: wall.b.x as Float,
                y: wall.b.y as Float,
            };
            segments_intersect(from, to, a, b)
        })
    }
}

/// Signed area of the triangle `(a, b, c)`, positive if `c` is to the left
/// of the directed line `a -> b`.
fn cross(a: Point, b: Point, c: Point) -> Float {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether `c` lies on the segment `a -> b`, assuming the three points are
/// collinear.
fn on_segment(a: Point, b: Point, c: Point) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

/// Whether the segments `p1 -> p2` and `q1 -> q2` intersect, endpoints
/// included.
fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: Float, y: Float) -> Point {
        Point { x, y }
    }

    #[test]
    fn test_set_wall_accepts_endpoints_on_boundary() {
        let mut room = RoomLayout::new(30, 30);
        assert!(room.set_wall((0, 0), (30, 30)).is_ok());
        assert_eq!(room.walls().len(), 1);
    }

    #[test]
    fn test_set_wall_rejects_endpoint_outside_room() {
        let mut room = RoomLayout::new(10, 10);
        let result = room.set_wall((5, 5), (5, 11));
        assert_eq!(
            result,
            Err(SimError::MalformedRoomLayout {
                x: 5,
                y: 11,
                width: 10,
                height: 10,
            })
        );
        assert!(room.walls().is_empty());
    }

    #[test]
    fn test_tile_of_far_boundary_belongs_to_last_tile() {
        let room = RoomLayout::new(10, 10);
        assert_eq!(room.tile_of(p(10.0, 10.0)), TileLocation { x: 9, y: 9 });
        assert_eq!(room.tile_of(p(0.0, 0.0)), TileLocation { x: 0, y: 0 });
        assert_eq!(room.tile_of(p(3.7, 9.2)), TileLocation { x: 3, y: 9 });
    }

    #[test]
    fn test_blocks_leaving_the_room() {
        let room = RoomLayout::new(10, 10);
        assert!(room.blocks(p(9.5, 5.0), p(10.5, 5.0)));
        assert!(!room.blocks(p(9.0, 5.0), p(10.0, 5.0)));
    }

    #[test]
    fn test_blocks_crossing_a_wall() {
        let mut room = RoomLayout::new(10, 10);
        room.set_wall((5, 0), (5, 10)).unwrap();
        assert!(room.blocks(p(4.5, 5.0), p(5.5, 5.0)));
        assert!(!room.blocks(p(3.0, 5.0), p(4.0, 5.0)));
    }

    #[test]
    fn test_blocks_crossing_a_diagonal_wall() {
        let mut room = RoomLayout::new(30, 30);
        room.set_wall((5, 5), (25, 25)).unwrap();
        assert!(room.blocks(p(10.0, 12.0), p(12.0, 10.0)));
        assert!(!room.blocks(p(1.0, 1.0), p(2.0, 1.0)));
    }

    #[test]
    fn test_segments_touching_at_endpoint_intersect() {
        assert!(segments_intersect(
            p(0.0, 0.0),
            p(1.0, 1.0),
            p(1.0, 1.0),
            p(2.0, 0.0)
        ));
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(0.0, 1.0),
            p(1.0, 1.0)
        ));
    }

    #[test]
    fn test_collinear_overlapping_segments_intersect() {
        assert!(segments_intersect(
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(1.0, 0.0),
            p(3.0, 0.0)
        ));
    }
}
