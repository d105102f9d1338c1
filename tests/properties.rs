//! Property tests for the simulation rules

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use cave_runner::consts::*;
use cave_runner::sim::collision::resolve_obstacles;
use cave_runner::sim::difficulty::{Difficulty, level_bonus};
use cave_runner::sim::level::{LevelManager, cumulative_required};
use cave_runner::sim::scoring::clear_points;
use cave_runner::sim::spawner::{ground_obstacle, terrain_obstacle};
use cave_runner::sim::{ClearType, Player, ScoreState, Spawner};
use cave_runner::tuning::{DifficultyTuning, PhysicsTuning, ScoringTuning};

fn clear_type() -> impl Strategy<Value = ClearType> {
    prop_oneof![
        Just(ClearType::Ground),
        Just(ClearType::Platform),
        Just(ClearType::Aerial),
    ]
}

proptest! {
    #[test]
    fn speed_never_decreases_within_a_level(
        level in 1u32..20,
        t1 in 0.0f32..400.0,
        extra in 0.0f32..400.0,
    ) {
        let tuning = DifficultyTuning::default();
        let a = Difficulty::at(t1, level, &tuning);
        let b = Difficulty::at(t1 + extra, level, &tuning);
        prop_assert!(b.speed >= a.speed);
        let cap = BASE_SPEED * MAX_SPEED_MULTIPLIER * level_bonus(level, &tuning);
        prop_assert!(b.speed <= cap + 1e-3);
        prop_assert!(b.spawn_interval_ms >= tuning.min_spawn_interval_ms);
    }

    #[test]
    fn level_completion_boundary(level in 1u32..60) {
        let mut lm = LevelManager::new(1);
        for _ in 1..level {
            let score = lm.cumulative_required();
            lm.advance_level(score, 0.0);
        }
        let need = cumulative_required(level);
        let by_sum: u64 = (1..=level as u64).map(|i| i * POINTS_PER_LEVEL).sum();
        prop_assert_eq!(need, by_sum);
        prop_assert!(!lm.is_level_complete(need - 1));
        prop_assert!(lm.is_level_complete(need));
    }

    #[test]
    fn clear_points_monotonic(
        level in 1u8..4,
        clear in clear_type(),
        jumps in 0u8..3,
        at_peak in any::<bool>(),
    ) {
        let t = ScoringTuning::default();
        let here = clear_points(level, clear, jumps, at_peak, &t);
        let baseline = clear_points(1, ClearType::Ground, 0, false, &t);
        prop_assert!(here >= baseline);
        prop_assert!(clear_points(level + 1, clear, jumps, at_peak, &t) >= here);
        prop_assert!(clear_points(level, clear, jumps + 1, at_peak, &t) >= here);
        prop_assert!(clear_points(level, clear, jumps, true, &t) >= here);
        let better = match clear {
            ClearType::Ground => ClearType::Platform,
            _ => ClearType::Aerial,
        };
        prop_assert!(clear_points(level, better, jumps, at_peak, &t) >= here);
    }

    #[test]
    fn obstacles_scored_at_most_once(
        start in 0.0f32..60.0,
        steps in prop::collection::vec(0.5f32..12.0, 1..80),
    ) {
        let t = ScoringTuning::default();
        let mut player = Player::new();
        player.on_ground = false;
        player.pos.y -= 300.0;
        let mut score = ScoreState::new(&t);
        let mut events = Vec::new();
        let mut obstacles = vec![ground_obstacle(1, player.right() + start, 2)];

        let mut first_scored = None;
        for (i, dx) in steps.iter().enumerate() {
            obstacles[0].scroll(*dx);
            let right = obstacles[0].right();
            resolve_obstacles(&player, &mut obstacles, &mut score, &t, &mut events);
            if obstacles[0].scored && first_scored.is_none() {
                prop_assert!(right < player.left());
                first_scored = Some(i);
            }
            if !obstacles[0].scored {
                prop_assert!(right >= player.left());
            }
        }
        prop_assert!(score.obstacles_cleared <= 1);
        prop_assert_eq!(events.len() as u32, score.obstacles_cleared);
    }

    #[test]
    fn terrain_elevation_at_least_minimum(
        goes_up in any::<bool>(),
        delta in 0.0f32..200.0,
        width in 0.0f32..500.0,
    ) {
        let o = terrain_obstacle(1, 300.0, width, goes_up, delta);
        let surface = o.surface_y().unwrap();
        if goes_up {
            prop_assert!(surface <= GROUND_Y - MIN_ELEVATION);
        } else {
            prop_assert!(surface >= GROUND_Y + MIN_ELEVATION);
        }
        prop_assert!(o.size.x > 0.0 && o.size.y > 0.0);
    }

    #[test]
    fn spawner_geometry_is_valid(seed in any::<u64>(), secs in 1u32..90) {
        let tuning = DifficultyTuning::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut spawner = Spawner::new();
        let mut obstacles = Vec::new();
        let mut hearts = Vec::new();
        let dt = 1.0 / 30.0;
        for step in 0..(secs * 30) {
            let elapsed = step as f32 * dt;
            let d = Difficulty::at(elapsed, 1, &tuning);
            spawner.update(dt, &d, &mut obstacles, &mut hearts, &mut rng);
            for o in &mut obstacles {
                o.scroll(d.speed * dt);
            }
            obstacles.retain(|o| !o.is_offscreen());
        }
        for o in &obstacles {
            prop_assert!(o.size.x > 0.0 && o.size.y > 0.0);
            prop_assert!(o.height_level() <= MAX_OBSTACLE_LEVEL);
        }
    }

    #[test]
    fn fourth_jump_is_ignored(levels in prop::array::uniform4(1u8..=4), game_level in 1u32..10) {
        let tuning = PhysicsTuning::default();
        let mut player = Player::new();
        let mut counts = Vec::new();
        for level in &levels[..3] {
            prop_assert!(player.jump(*level, game_level, &tuning));
            counts.push(player.jump_count);
        }
        prop_assert_eq!(counts, vec![1, 2, 3]);
        let vel = player.vel_y;
        prop_assert!(!player.jump(levels[3], game_level, &tuning));
        prop_assert_eq!(player.jump_count, 3);
        prop_assert_eq!(player.vel_y, vel);
    }
}
