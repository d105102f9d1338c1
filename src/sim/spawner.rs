//! Procedural spawning of obstacles, terrain, platforms and hearts
//!
//! Once per elapsed spawn interval the spawner runs one cycle at the right
//! edge of the field:
//! 1. independent heart roll, placed once the rest of the cycle is known
//! 2. terrain roll (`terrain_chance`), which pushes the next cycle out by
//!    the segment's scroll time
//! 3. skip the cycle when the spawn point sits over raised terrain
//! 4. floating platform roll (`floating_chance`)
//! 5. otherwise a ground obstacle, level 2-4 with `multi_level_chance`

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::obstacle::{Collectable, Obstacle, ObstacleKind, effective_ground_y};
use crate::Rect;
use crate::consts::*;

/// Spawn x coordinate (right edge of the field)
pub const SPAWN_X: f32 = FIELD_WIDTH;
/// Delay before the first cycle of a level (seconds)
pub const FIRST_SPAWN_DELAY: f32 = 1.0;

/// What a spawn cycle produced (besides a possible heart)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnOutcome {
    Terrain { goes_up: bool, width: f32 },
    Platform,
    Ground { level: u8 },
    /// Spawn point was over terrain
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnReport {
    pub heart: bool,
    pub outcome: SpawnOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Seconds until the next cycle
    pub time_until_spawn: f32,
    next_id: u32,
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner {
    pub fn new() -> Self {
        Self {
            time_until_spawn: FIRST_SPAWN_DELAY,
            next_id: 1,
        }
    }

    /// Restart the spawn clock (new level or after a life loss); ids keep counting
    pub fn reset_timer(&mut self) {
        self.time_until_spawn = FIRST_SPAWN_DELAY;
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Advance the spawn clock and run a cycle when due
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        difficulty: &Difficulty,
        obstacles: &mut Vec<Obstacle>,
        collectables: &mut Vec<Collectable>,
        rng: &mut R,
    ) -> Option<SpawnReport> {
        self.time_until_spawn -= dt;
        if self.time_until_spawn > 0.0 {
            return None;
        }
        self.time_until_spawn = difficulty.spawn_interval_secs();
        let report = self.spawn_cycle(difficulty, obstacles, collectables, rng);
        log::debug!("spawn cycle: {:?}", report);
        Some(report)
    }

    /// One spawn decision at [`SPAWN_X`]
    pub fn spawn_cycle<R: Rng>(
        &mut self,
        difficulty: &Difficulty,
        obstacles: &mut Vec<Obstacle>,
        collectables: &mut Vec<Collectable>,
        rng: &mut R,
    ) -> SpawnReport {
        let heart_rolled = rng.random_bool(HEART_CHANCE);
        let outcome = self.spawn_primary(difficulty, obstacles, rng);
        let heart = heart_rolled && self.place_heart(obstacles, collectables, rng);
        SpawnReport { heart, outcome }
    }

    /// Put a heart a jump above whatever now stands at [`SPAWN_X`].
    ///
    /// Rests above the effective ground and any hazard under its footprint;
    /// dropped if it would sit inside a platform. Returns whether one spawned.
    fn place_heart<R: Rng>(
        &mut self,
        obstacles: &[Obstacle],
        collectables: &mut Vec<Collectable>,
        rng: &mut R,
    ) -> bool {
        let (min_x, max_x) = (SPAWN_X, SPAWN_X + HEART_SIZE);
        let floor = obstacles
            .iter()
            .filter(|o| !o.is_floating() && o.spans_x(min_x, max_x))
            .map(Obstacle::top)
            .fold(effective_ground_y(obstacles, min_x, max_x), f32::min);
        let lift = rng.random_range(HEART_MIN_LIFT..HEART_MAX_LIFT);
        let pos = Vec2::new(SPAWN_X, floor - HEART_SIZE - lift);
        let phase = rng.random_range(0.0..std::f32::consts::TAU);

        // Full bob range
        let sweep = Rect::from_pos_size(
            pos - Vec2::new(0.0, HEART_BOB_AMPLITUDE),
            Vec2::new(HEART_SIZE, HEART_SIZE + 2.0 * HEART_BOB_AMPLITUDE),
        );
        if obstacles.iter().any(|o| o.rect().overlaps(&sweep)) {
            return false;
        }
        let id = self.next_id();
        collectables.push(Collectable::heart(id, pos, phase));
        true
    }

    fn spawn_primary<R: Rng>(
        &mut self,
        difficulty: &Difficulty,
        obstacles: &mut Vec<Obstacle>,
        rng: &mut R,
    ) -> SpawnOutcome {
        let terrain_clear = !obstacles
            .iter()
            .any(|o| o.is_terrain() && o.right() > SPAWN_X);

        if terrain_clear && rng.random::<f32>() < difficulty.terrain_chance {
            let width = rng.random_range(TERRAIN_MIN_WIDTH..=TERRAIN_MAX_WIDTH);
            let goes_up = rng.random_bool(0.5);
            let delta = rng.random_range(MIN_ELEVATION..=MAX_ELEVATION);
            let id = self.next_id();
            obstacles.push(terrain_obstacle(id, SPAWN_X, width, goes_up, delta));
            // Wait for the whole segment to scroll in before the next cycle
            self.time_until_spawn += width / difficulty.speed.max(1.0);
            return SpawnOutcome::Terrain { goes_up, width };
        }

        let over_raised = obstacles.iter().any(|o| {
            matches!(o.kind, ObstacleKind::Terrain { goes_up: true })
                && o.spans_x(SPAWN_X, SPAWN_X + PLATFORM_MAX_WIDTH)
        });
        if over_raised {
            return SpawnOutcome::Skipped;
        }

        if rng.random::<f32>() < difficulty.floating_chance {
            let width = rng.random_range(PLATFORM_MIN_WIDTH..=PLATFORM_MAX_WIDTH);
            let gap = rng.random_range(PLATFORM_MIN_GAP..=PLATFORM_MAX_GAP);
            let ground = effective_ground_y(obstacles, SPAWN_X, SPAWN_X + width);
            let id = self.next_id();
            obstacles.push(platform_obstacle(id, SPAWN_X, width, ground, gap));
            return SpawnOutcome::Platform;
        }

        let level = roll_height_level(rng, difficulty.multi_level_chance);
        let width = ground_obstacle_width(level);
        let footprint_on_terrain = obstacles
            .iter()
            .any(|o| o.is_terrain() && o.spans_x(SPAWN_X, SPAWN_X + width));
        if footprint_on_terrain {
            return SpawnOutcome::Skipped;
        }
        let id = self.next_id();
        obstacles.push(ground_obstacle(id, SPAWN_X, level));
        SpawnOutcome::Ground { level }
    }
}

/// Height level distribution: mostly 1, otherwise 2 and 3 favoured over 4
pub fn roll_height_level<R: Rng>(rng: &mut R, multi_level_chance: f32) -> u8 {
    if rng.random::<f32>() >= multi_level_chance {
        return 1;
    }
    let roll = rng.random::<f32>();
    if roll < 0.45 {
        2
    } else if roll < 0.8 {
        3
    } else {
        4
    }
}

#[inline]
pub fn ground_obstacle_width(level: u8) -> f32 {
    OBSTACLE_BASE_WIDTH + (level.saturating_sub(1)) as f32 * OBSTACLE_WIDTH_PER_LEVEL
}

/// Ground hazard of `level` standing on base ground at `x`
pub fn ground_obstacle(id: u32, x: f32, level: u8) -> Obstacle {
    let level = level.clamp(1, MAX_OBSTACLE_LEVEL);
    let height = level as f32 * OBSTACLE_HEIGHT_UNIT;
    Obstacle::new(
        id,
        ObstacleKind::Ground { level },
        Vec2::new(x, GROUND_Y - height),
        Vec2::new(ground_obstacle_width(level), height),
    )
}

/// Floating platform whose underside leaves room for the player above `ground`
pub fn platform_obstacle(id: u32, x: f32, width: f32, ground: f32, gap: f32) -> Obstacle {
    let width = width.max(PLATFORM_MIN_WIDTH);
    let gap = gap.clamp(PLATFORM_MIN_GAP, PLATFORM_MAX_GAP);
    let y = ground - PLAYER_SIZE - gap - PLATFORM_THICKNESS;
    Obstacle::new(
        id,
        ObstacleKind::Floating,
        Vec2::new(x, y),
        Vec2::new(width, PLATFORM_THICKNESS),
    )
}

/// Raised block (`goes_up`) or dip; elevation change is at least [`MIN_ELEVATION`]
pub fn terrain_obstacle(id: u32, x: f32, width: f32, goes_up: bool, delta: f32) -> Obstacle {
    let width = width.max(TERRAIN_MIN_WIDTH);
    let delta = delta.clamp(MIN_ELEVATION, MAX_ELEVATION);
    let y = if goes_up { GROUND_Y - delta } else { GROUND_Y };
    Obstacle::new(
        id,
        ObstacleKind::Terrain { goes_up },
        Vec2::new(x, y),
        Vec2::new(width, delta),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::DifficultyTuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn difficulty(terrain: f32, floating: f32, multi: f32) -> Difficulty {
        let mut d = Difficulty::new_game(&DifficultyTuning::default());
        d.terrain_chance = terrain;
        d.floating_chance = floating;
        d.multi_level_chance = multi;
        d
    }

    #[test]
    fn test_terrain_up_and_down_elevation() {
        let up = terrain_obstacle(1, 0.0, 250.0, true, 10.0);
        assert!(up.surface_y().unwrap() <= GROUND_Y - MIN_ELEVATION);
        let down = terrain_obstacle(2, 0.0, 250.0, false, 10.0);
        assert!(down.surface_y().unwrap() >= GROUND_Y + MIN_ELEVATION);
    }

    #[test]
    fn test_ground_obstacle_geometry() {
        for level in 1..=4 {
            let o = ground_obstacle(1, SPAWN_X, level);
            assert_eq!(o.size.y, level as f32 * OBSTACLE_HEIGHT_UNIT);
            assert_eq!(o.pos.y + o.size.y, GROUND_Y);
            assert!(o.size.x > 0.0);
        }
        assert!(ground_obstacle_width(4) > ground_obstacle_width(1));
    }

    #[test]
    fn test_platform_leaves_headroom() {
        let p = platform_obstacle(1, SPAWN_X, 100.0, GROUND_Y, 0.0);
        let underside = p.pos.y + p.size.y;
        assert!(GROUND_Y - underside >= PLAYER_SIZE + PLATFORM_MIN_GAP - 0.001);
    }

    #[test]
    fn test_only_ground_obstacles_without_chances() {
        let mut spawner = Spawner::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let d = difficulty(0.0, 0.0, 0.0);
        let mut obstacles = Vec::new();
        let mut hearts = Vec::new();
        for _ in 0..50 {
            let report = spawner.spawn_cycle(&d, &mut obstacles, &mut hearts, &mut rng);
            assert_eq!(report.outcome, SpawnOutcome::Ground { level: 1 });
            obstacles.clear();
        }
    }

    #[test]
    fn test_terrain_pushes_next_spawn_out() {
        let mut spawner = Spawner::new();
        let mut rng = Pcg32::seed_from_u64(11);
        let d = difficulty(1.0, 0.0, 0.0);
        let mut obstacles = Vec::new();
        let mut hearts = Vec::new();
        spawner.time_until_spawn = 0.0;
        let report = spawner
            .update(0.016, &d, &mut obstacles, &mut hearts, &mut rng)
            .unwrap();
        let SpawnOutcome::Terrain { width, .. } = report.outcome else {
            panic!("expected terrain, got {:?}", report.outcome);
        };
        let expected = d.spawn_interval_secs() + width / d.speed;
        assert!((spawner.time_until_spawn - expected).abs() < 0.001);
    }

    #[test]
    fn test_no_nested_terrain() {
        let mut spawner = Spawner::new();
        let mut rng = Pcg32::seed_from_u64(3);
        let d = difficulty(1.0, 0.0, 0.0);
        let mut obstacles = Vec::new();
        let mut hearts = Vec::new();
        spawner.spawn_cycle(&d, &mut obstacles, &mut hearts, &mut rng);
        let second = spawner.spawn_cycle(&d, &mut obstacles, &mut hearts, &mut rng);
        assert!(!matches!(second.outcome, SpawnOutcome::Terrain { .. }));
        assert_eq!(obstacles.iter().filter(|o| o.is_terrain()).count(), 1);
    }

    #[test]
    fn test_ground_obstacle_never_on_terrain() {
        let mut spawner = Spawner::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let d = difficulty(0.0, 0.0, 0.5);
        for goes_up in [true, false] {
            let mut obstacles = vec![terrain_obstacle(99, SPAWN_X - 50.0, 300.0, goes_up, 60.0)];
            let mut hearts = Vec::new();
            let report = spawner.spawn_cycle(&d, &mut obstacles, &mut hearts, &mut rng);
            assert_eq!(report.outcome, SpawnOutcome::Skipped);
            assert_eq!(obstacles.len(), 1);
        }
    }

    #[test]
    fn test_multi_level_distribution() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut counts = [0u32; 5];
        for _ in 0..4000 {
            counts[roll_height_level(&mut rng, 1.0) as usize] += 1;
        }
        assert_eq!(counts[1], 0);
        assert!(counts[2] > counts[4]);
        assert!(counts[3] > counts[4]);
        assert!(counts[4] > 0);
    }

    #[test]
    fn test_hearts_never_inside_same_cycle_spawns() {
        let cases = [
            difficulty(1.0, 0.0, 0.0),
            difficulty(0.0, 0.0, 1.0),
            difficulty(0.0, 1.0, 0.0),
        ];
        let mut placed = 0;
        for seed in 0..3000 {
            for d in &cases {
                let mut spawner = Spawner::new();
                let mut rng = Pcg32::seed_from_u64(seed);
                let mut obstacles = Vec::new();
                let mut hearts = Vec::new();
                let report = spawner.spawn_cycle(d, &mut obstacles, &mut hearts, &mut rng);
                assert_eq!(report.heart, !hearts.is_empty());
                for h in &hearts {
                    placed += 1;
                    for o in &obstacles {
                        assert!(
                            !h.rect().overlaps(&o.rect()),
                            "seed {seed}: heart {:?} inside {:?}",
                            h.rect(),
                            o.kind
                        );
                    }
                }
            }
        }
        assert!(placed > 0);
    }

    #[test]
    fn test_heart_rests_above_tall_hazard() {
        let mut spawner = Spawner::new();
        let mut hearts = Vec::new();
        let obstacles = vec![ground_obstacle(1, SPAWN_X, 4)];
        let mut rng = Pcg32::seed_from_u64(120);
        assert!(spawner.place_heart(&obstacles, &mut hearts, &mut rng));
        let hazard_top = obstacles[0].top();
        assert!(hearts[0].pos.y + HEART_SIZE <= hazard_top - HEART_MIN_LIFT + 0.001);
    }

    #[test]
    fn test_hearts_spawn_above_ground() {
        let mut spawner = Spawner::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let d = difficulty(0.0, 0.0, 0.0);
        let mut hearts = Vec::new();
        for _ in 0..500 {
            let mut obstacles = Vec::new();
            spawner.spawn_cycle(&d, &mut obstacles, &mut hearts, &mut rng);
        }
        assert!(!hearts.is_empty());
        for h in &hearts {
            assert!(h.pos.y + h.size <= GROUND_Y - HEART_MIN_LIFT + 0.001);
        }
    }
}
