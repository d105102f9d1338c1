//! Obstacles, terrain, floating platforms and collectable hearts

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::*;

/// Closed set of world geometry kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Hazard standing on the running surface, height = level * unit
    Ground { level: u8 },
    /// One-way platform, solid from above only
    Floating,
    /// Raised block or dip in the running surface
    Terrain { goes_up: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Player has moved past this obstacle's right edge
    pub passed: bool,
    /// Clear has been scored (set at most once)
    pub scored: bool,
    pub close_call: bool,
    /// Smallest vertical gap seen between player bottom and obstacle top
    /// while horizontally overlapping
    #[serde(default)]
    pub min_clearance: Option<f32>,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec2, size: Vec2) -> Self {
        debug_assert!(size.x > 0.0 && size.y > 0.0, "degenerate obstacle {size:?}");
        Self {
            id,
            kind,
            pos,
            size,
            passed: false,
            scored: false,
            close_call: false,
            min_clearance: None,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Height level (1-4); platforms and terrain report 1
    pub fn height_level(&self) -> u8 {
        match self.kind {
            ObstacleKind::Ground { level } => level,
            _ => 1,
        }
    }

    #[inline]
    pub fn is_floating(&self) -> bool {
        matches!(self.kind, ObstacleKind::Floating)
    }

    #[inline]
    pub fn is_terrain(&self) -> bool {
        matches!(self.kind, ObstacleKind::Terrain { .. })
    }

    /// Damages the player on contact
    #[inline]
    pub fn is_hazard(&self) -> bool {
        matches!(self.kind, ObstacleKind::Ground { .. })
    }

    /// Running surface height for terrain; None for other kinds
    pub fn surface_y(&self) -> Option<f32> {
        match self.kind {
            ObstacleKind::Terrain { goes_up: true } => Some(self.pos.y),
            ObstacleKind::Terrain { goes_up: false } => Some(self.pos.y + self.size.y),
            _ => None,
        }
    }

    #[inline]
    pub fn spans_x(&self, min_x: f32, max_x: f32) -> bool {
        self.left() < max_x && self.right() > min_x
    }

    pub fn scroll(&mut self, dx: f32) {
        self.pos.x -= dx;
    }

    #[inline]
    pub fn is_offscreen(&self) -> bool {
        self.right() < 0.0
    }
}

/// Effective running surface over `[min_x, max_x)`.
///
/// Base ground unless terrain spans the range; the highest (smallest y)
/// surface wins when several overlap, so a dip only applies when the range
/// lies entirely inside it.
pub fn effective_ground_y(obstacles: &[Obstacle], min_x: f32, max_x: f32) -> f32 {
    let mut raised: Option<f32> = None;
    let mut dip: Option<f32> = None;
    for o in obstacles.iter().filter(|o| o.spans_x(min_x, max_x)) {
        match o.surface_y() {
            Some(y) if y < GROUND_Y => raised = Some(raised.map_or(y, |r| r.min(y))),
            Some(y) if o.left() <= min_x && o.right() >= max_x => dip = Some(y),
            _ => {}
        }
    }
    raised.or(dip).unwrap_or(GROUND_Y)
}

/// A floating heart that restores a life
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectable {
    pub id: u32,
    /// Rest position (top-left), before bobbing
    pub pos: Vec2,
    pub size: f32,
    pub collected: bool,
    /// Bobbing animation phase (radians)
    pub phase: f32,
}

impl Collectable {
    pub fn heart(id: u32, pos: Vec2, phase: f32) -> Self {
        Self {
            id,
            pos,
            size: HEART_SIZE,
            collected: false,
            phase,
        }
    }

    /// Current drawn/collidable position including bob offset
    pub fn current_pos(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, self.phase.sin() * HEART_BOB_AMPLITUDE)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.current_pos(), Vec2::splat(self.size))
    }

    pub fn update(&mut self, dx: f32, dt: f32) {
        self.pos.x -= dx;
        self.phase = (self.phase + HEART_BOB_SPEED * dt) % std::f32::consts::TAU;
    }

    #[inline]
    pub fn is_offscreen(&self) -> bool {
        self.pos.x + self.size < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain(id: u32, x: f32, width: f32, goes_up: bool, delta: f32) -> Obstacle {
        let (y, h) = if goes_up {
            (GROUND_Y - delta, delta)
        } else {
            (GROUND_Y, delta)
        };
        Obstacle::new(
            id,
            ObstacleKind::Terrain { goes_up },
            Vec2::new(x, y),
            Vec2::new(width, h),
        )
    }

    #[test]
    fn test_effective_ground_defaults_to_base() {
        assert_eq!(effective_ground_y(&[], 0.0, 40.0), GROUND_Y);
    }

    #[test]
    fn test_effective_ground_on_raised_terrain() {
        let obstacles = vec![terrain(1, 100.0, 200.0, true, 60.0)];
        assert_eq!(effective_ground_y(&obstacles, 150.0, 190.0), GROUND_Y - 60.0);
        // Partially over the raised block still stands on it
        assert_eq!(effective_ground_y(&obstacles, 80.0, 120.0), GROUND_Y - 60.0);
        assert_eq!(effective_ground_y(&obstacles, 400.0, 440.0), GROUND_Y);
    }

    #[test]
    fn test_dip_requires_full_cover() {
        let obstacles = vec![terrain(1, 100.0, 200.0, false, 60.0)];
        assert_eq!(effective_ground_y(&obstacles, 150.0, 190.0), GROUND_Y + 60.0);
        assert_eq!(effective_ground_y(&obstacles, 80.0, 120.0), GROUND_Y);
    }

    #[test]
    fn test_ground_obstacle_kind_flags() {
        let o = Obstacle::new(
            1,
            ObstacleKind::Ground { level: 3 },
            Vec2::new(0.0, GROUND_Y - 105.0),
            Vec2::new(46.0, 105.0),
        );
        assert!(o.is_hazard());
        assert!(!o.is_floating());
        assert!(!o.is_terrain());
        assert_eq!(o.height_level(), 3);
        assert_eq!(o.surface_y(), None);
    }

    #[test]
    fn test_heart_scroll_and_bob() {
        let mut h = Collectable::heart(1, Vec2::new(500.0, 200.0), 0.0);
        h.update(10.0, 0.5);
        assert_eq!(h.pos.x, 490.0);
        let dy = (h.current_pos().y - 200.0).abs();
        assert!(dy <= HEART_BOB_AMPLITUDE + 0.001);
    }
}
