//! Player physics and the multi-jump state machine

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::*;
use crate::tuning::PhysicsTuning;

/// How the player was moving when an obstacle was cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClearType {
    Ground,
    Platform,
    Aerial,
}

impl ClearType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearType::Ground => "ground",
            ClearType::Platform => "platform",
            ClearType::Aerial => "aerial",
        }
    }
}

/// Derived jump state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpState {
    OnGround,
    Airborne { jumps_left: u8 },
    /// Airborne with an active somersault rotation
    Somersault { jumps_left: u8 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    /// Vertical velocity (pixels/s, negative is up)
    pub vel_y: f32,
    pub size: f32,
    pub on_ground: bool,
    /// Standing on a floating platform rather than the ground surface
    pub on_platform: bool,
    /// Jumps used since last landing (0..=max_jumps)
    pub jump_count: u8,
    /// Level (1-4) of the most recent jump
    pub jump_level: u8,
    /// Accumulated somersault angle (radians)
    pub rotation: f32,
    /// Somersault angular speed (rad/s, 0 = not spinning)
    pub spin_speed: f32,
    /// Somersault animation frame (0..SPIN_FRAMES)
    pub frame: u8,
    pub clear_type: ClearType,
    /// Last air jump was taken at the apex
    pub peak_timed: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, GROUND_Y - PLAYER_SIZE),
            vel_y: 0.0,
            size: PLAYER_SIZE,
            on_ground: true,
            on_platform: false,
            jump_count: 0,
            jump_level: 1,
            rotation: 0.0,
            spin_speed: 0.0,
            frame: 0,
            clear_type: ClearType::Ground,
            peak_timed: false,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Vec2::splat(self.size))
    }

    /// Collision box used against hazards
    #[inline]
    pub fn hitbox(&self) -> Rect {
        self.rect().inset(PLAYER_HITBOX_INSET)
    }

    pub fn jump_state(&self, max_jumps: u8) -> JumpState {
        if self.on_ground {
            return JumpState::OnGround;
        }
        let jumps_left = max_jumps.saturating_sub(self.jump_count);
        if self.spin_speed > 0.0 {
            JumpState::Somersault { jumps_left }
        } else {
            JumpState::Airborne { jumps_left }
        }
    }

    #[inline]
    pub fn is_somersaulting(&self) -> bool {
        !self.on_ground && self.spin_speed > 0.0
    }

    /// Attempt a jump of the given level (1-4).
    ///
    /// Returns false (and changes nothing) once all jumps are spent.
    pub fn jump(&mut self, level: u8, game_level: u32, tuning: &PhysicsTuning) -> bool {
        if self.jump_count >= tuning.max_jumps {
            return false;
        }
        let level = level.clamp(1, MAX_OBSTACLE_LEVEL);
        let boost = 1.0
            + (tuning.jump_level_boost * game_level.saturating_sub(1) as f32)
                .min(tuning.jump_level_boost_cap);
        let power = tuning.jump_power[(level - 1) as usize] * boost;

        if self.jump_count == 0 {
            // First jump (from the ground, or after walking off an edge)
            self.vel_y = -power;
            self.rotation = 0.0;
            self.spin_speed = tuning.base_spin;
            self.clear_type = ClearType::Ground;
            self.peak_timed = false;
        } else {
            let at_peak = self.vel_y.abs() < tuning.peak_threshold;
            let factor = if at_peak {
                tuning.air_jump_factor * tuning.peak_boost
            } else {
                tuning.air_jump_factor
            };
            self.vel_y = -power * factor;
            self.spin_speed += tuning.spin_per_air_jump;
            self.clear_type = ClearType::Aerial;
            self.peak_timed = at_peak;
        }

        self.jump_count += 1;
        self.jump_level = level;
        self.on_ground = false;
        self.on_platform = false;
        true
    }

    /// Advance physics by `dt` against the supporting surface below the player.
    ///
    /// `support_y` is the highest surface the player may stand on this tick
    /// and `support_is_platform` tells whether it belongs to a floating
    /// platform. Returns true when the player lands this tick.
    pub fn update(
        &mut self,
        dt: f32,
        support_y: f32,
        support_is_platform: bool,
        tuning: &PhysicsTuning,
    ) -> bool {
        if self.on_ground {
            if support_y > self.bottom() + 0.5 {
                // Surface dropped away (walked off a platform or into a dip)
                self.on_ground = false;
                self.on_platform = false;
            } else {
                // Follow the surface (terrain steps up)
                self.pos.y = support_y - self.size;
                self.on_platform = support_is_platform;
                return false;
            }
        }

        self.vel_y += tuning.gravity * dt;
        self.pos.y += self.vel_y * dt;

        if self.spin_speed > 0.0 {
            self.rotation += self.spin_speed * dt;
            let turn = self.rotation.rem_euclid(std::f32::consts::TAU) / std::f32::consts::TAU;
            self.frame = ((turn * SPIN_FRAMES as f32) as u8).min(SPIN_FRAMES - 1);
        }

        if self.vel_y >= 0.0 && self.bottom() >= support_y {
            self.land(support_y, support_is_platform);
            return true;
        }
        false
    }

    fn land(&mut self, surface_y: f32, on_platform: bool) {
        self.pos.y = surface_y - self.size;
        self.vel_y = 0.0;
        self.on_ground = true;
        self.on_platform = on_platform;
        self.jump_count = 0;
        self.rotation = 0.0;
        self.spin_speed = 0.0;
        self.frame = 0;
        self.peak_timed = false;
        self.clear_type = ClearType::Ground;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn tuning() -> PhysicsTuning {
        PhysicsTuning::default()
    }

    #[test]
    fn test_triple_jump_then_noop() {
        let t = tuning();
        let mut p = Player::new();
        assert_eq!(p.jump_state(t.max_jumps), JumpState::OnGround);

        let mut counts = Vec::new();
        for _ in 0..3 {
            assert!(p.jump(1, 1, &t));
            counts.push(p.jump_count);
            p.update(DT, GROUND_Y, false, &t);
        }
        assert_eq!(counts, vec![1, 2, 3]);

        let vel_before = p.vel_y;
        assert!(!p.jump(4, 1, &t));
        assert_eq!(p.jump_count, 3);
        assert_eq!(p.vel_y, vel_before);
    }

    #[test]
    fn test_ground_jump_tags_ground() {
        let t = tuning();
        let mut p = Player::new();
        p.jump(2, 1, &t);
        assert_eq!(p.clear_type, ClearType::Ground);
        assert_eq!(p.vel_y, -t.jump_power[1]);
        assert!(p.is_somersaulting());
    }

    #[test]
    fn test_peak_timed_air_jump_is_stronger() {
        let t = tuning();

        let mut early = Player::new();
        early.jump(1, 1, &t);
        early.jump(1, 1, &t);
        assert!(!early.peak_timed);

        let mut apex = Player::new();
        apex.jump(1, 1, &t);
        while apex.vel_y < -t.peak_threshold * 0.5 {
            apex.update(DT, GROUND_Y, false, &t);
        }
        apex.jump(1, 1, &t);
        assert!(apex.peak_timed);
        assert_eq!(apex.clear_type, ClearType::Aerial);
        assert!(apex.vel_y < early.vel_y);
    }

    #[test]
    fn test_air_jump_stacks_spin() {
        let t = tuning();
        let mut p = Player::new();
        p.jump(1, 1, &t);
        let spin = p.spin_speed;
        p.jump(1, 1, &t);
        assert!(p.spin_speed > spin);
    }

    #[test]
    fn test_lands_and_resets() {
        let t = tuning();
        let mut p = Player::new();
        p.jump(1, 1, &t);
        p.jump(1, 1, &t);
        let mut landed = false;
        for _ in 0..600 {
            if p.update(DT, GROUND_Y, false, &t) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(p.on_ground);
        assert_eq!(p.jump_count, 0);
        assert_eq!(p.rotation, 0.0);
        assert_eq!(p.bottom(), GROUND_Y);
    }

    #[test]
    fn test_frame_index_in_range() {
        let t = tuning();
        let mut p = Player::new();
        p.jump(4, 1, &t);
        p.jump(4, 1, &t);
        for _ in 0..40 {
            p.update(DT, GROUND_Y, false, &t);
            assert!(p.frame < SPIN_FRAMES);
        }
    }

    #[test]
    fn test_walk_off_edge_falls() {
        let t = tuning();
        let mut p = Player::new();
        p.pos.y = GROUND_Y - 60.0 - p.size;
        p.on_platform = true;
        p.update(DT, GROUND_Y, false, &t);
        assert!(!p.on_ground);
        // First jump after falling still uses ground-jump power
        assert!(p.jump(1, 1, &t));
        assert_eq!(p.clear_type, ClearType::Ground);
    }

    #[test]
    fn test_steps_up_on_raised_surface() {
        let t = tuning();
        let mut p = Player::new();
        p.update(DT, GROUND_Y - 50.0, false, &t);
        assert!(p.on_ground);
        assert_eq!(p.bottom(), GROUND_Y - 50.0);
    }
}
