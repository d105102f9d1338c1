//! Player versus world: support surfaces, clears, hits and pickups

use super::obstacle::{Collectable, Obstacle, effective_ground_y};
use super::player::{ClearType, Player};
use super::scoring::ScoreState;
use super::state::GameEvent;
use crate::consts::*;
use crate::tuning::ScoringTuning;

/// Highest surface the player may stand on this tick.
///
/// Platforms only support from above: the player's bottom before the move
/// must have been at or above the platform top.
pub fn support_surface(obstacles: &[Obstacle], player: &Player, prev_bottom: f32) -> (f32, bool) {
    let mut best = (
        effective_ground_y(obstacles, player.left(), player.right()),
        false,
    );
    for o in obstacles
        .iter()
        .filter(|o| o.is_floating() && o.spans_x(player.left(), player.right()))
    {
        if prev_bottom <= o.top() + 0.5 && o.top() < best.0 {
            best = (o.top(), true);
        }
    }
    best
}

/// How the player is moving right now, for clear scoring
fn current_clear(player: &Player) -> (ClearType, u8, bool) {
    if !player.on_ground {
        (player.clear_type, player.jump_count, player.peak_timed)
    } else if player.on_platform {
        (ClearType::Platform, 0, false)
    } else {
        (ClearType::Ground, 0, false)
    }
}

/// Check hazards and score clears. Returns the id of the obstacle hit, if any.
///
/// An obstacle is scored exactly once, on the first tick its right edge is
/// behind the player's left edge. Only hazards award points.
pub fn resolve_obstacles(
    player: &Player,
    obstacles: &mut [Obstacle],
    score: &mut ScoreState,
    tuning: &ScoringTuning,
    events: &mut Vec<GameEvent>,
) -> Option<u32> {
    let hitbox = player.hitbox();
    let airborne = !player.on_ground;

    for o in obstacles.iter_mut().filter(|o| !o.scored) {
        if o.spans_x(player.left(), player.right()) {
            let clearance = o.top() - player.bottom();
            o.min_clearance = Some(o.min_clearance.map_or(clearance, |c| c.min(clearance)));
        }

        if o.is_hazard() && hitbox.overlaps(&o.rect()) {
            return Some(o.id);
        }

        if o.right() < player.left() {
            o.passed = true;
            o.scored = true;
            if !o.is_hazard() {
                continue;
            }
            o.close_call = o.min_clearance.is_some_and(|c| c < tuning.close_call_px);
            let (clear, jumps_used, at_peak) = current_clear(player);
            let award = score.record_clear(
                o.height_level(),
                clear,
                jumps_used,
                at_peak,
                airborne,
                o.close_call,
                tuning,
            );
            events.push(GameEvent::ObstacleCleared {
                id: o.id,
                level: o.height_level(),
                clear,
                points: award.points,
                bonus: award.bonus,
                combo: award.combo,
                close_call: award.close_call,
            });
        }
    }
    None
}

/// Remove obstacles around the player after a hit so play can resume.
/// Terrain stays since it is part of the running surface.
pub fn clear_hit_window(obstacles: &mut Vec<Obstacle>, player: &Player) -> usize {
    let min_x = player.left() - HIT_CLEAR_BEHIND;
    let max_x = player.right() + HIT_CLEAR_AHEAD;
    let before = obstacles.len();
    obstacles.retain(|o| o.is_terrain() || !o.spans_x(min_x, max_x));
    before - obstacles.len()
}

/// Heart pickups: +1 life up to the cap, otherwise bonus points
pub fn resolve_collectables(
    player: &Player,
    collectables: &mut [Collectable],
    lives: &mut u8,
    score: &mut ScoreState,
    tuning: &ScoringTuning,
    events: &mut Vec<GameEvent>,
) {
    let rect = player.rect();
    for heart in collectables
        .iter_mut()
        .filter(|c| !c.collected && rect.overlaps(&c.rect()))
    {
        heart.collected = true;
        score.level.hearts += 1;
        let extra_life = *lives < MAX_LIVES;
        if extra_life {
            *lives += 1;
        } else {
            score.add_heart_bonus(tuning);
        }
        events.push(GameEvent::HeartCollected {
            extra_life,
            lives: *lives,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawner::{ground_obstacle, platform_obstacle, terrain_obstacle};
    use crate::tuning::{PhysicsTuning, ScoringTuning};
    use glam::Vec2;

    fn setup() -> (Player, ScoreState, ScoringTuning, Vec<GameEvent>) {
        let t = ScoringTuning::default();
        (Player::new(), ScoreState::new(&t), t, Vec::new())
    }

    #[test]
    fn test_scored_once_when_right_edge_passes() {
        let (mut player, mut score, t, mut events) = setup();
        player.pos.y -= 200.0; // high above
        player.on_ground = false;
        let mut obstacles = vec![ground_obstacle(1, player.left() - 30.0, 1)];
        // right edge == player.left: not yet passed
        assert_eq!(obstacles[0].right(), player.left());
        resolve_obstacles(&player, &mut obstacles, &mut score, &t, &mut events);
        assert!(!obstacles[0].scored);

        obstacles[0].scroll(1.0);
        resolve_obstacles(&player, &mut obstacles, &mut score, &t, &mut events);
        assert!(obstacles[0].scored);
        assert_eq!(score.obstacles_cleared, 1);

        obstacles[0].scroll(50.0);
        resolve_obstacles(&player, &mut obstacles, &mut score, &t, &mut events);
        assert_eq!(score.obstacles_cleared, 1);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_hit_detected() {
        let (player, mut score, t, mut events) = setup();
        let mut obstacles = vec![ground_obstacle(7, player.left() + 10.0, 2)];
        let hit = resolve_obstacles(&player, &mut obstacles, &mut score, &t, &mut events);
        assert_eq!(hit, Some(7));
        assert_eq!(score.obstacles_cleared, 0);
    }

    #[test]
    fn test_close_call_flagged() {
        let (mut player, mut score, t, mut events) = setup();
        let mut obstacles = vec![ground_obstacle(1, player.left(), 1)];
        player.on_ground = false;
        // 10px above the obstacle top while overlapping
        player.pos.y = obstacles[0].top() - player.size - 10.0;
        resolve_obstacles(&player, &mut obstacles, &mut score, &t, &mut events);
        let width = obstacles[0].size.x;
        obstacles[0].scroll(width + 1.0);
        resolve_obstacles(&player, &mut obstacles, &mut score, &t, &mut events);
        assert!(obstacles[0].close_call);
        assert_eq!(score.level.close_calls, 1);
    }

    #[test]
    fn test_hit_window_spares_terrain_and_far_obstacles() {
        let player = Player::new();
        let mut obstacles = vec![
            ground_obstacle(1, player.right() + 50.0, 1),
            ground_obstacle(2, player.right() + HIT_CLEAR_AHEAD + 10.0, 1),
            terrain_obstacle(3, player.left(), 250.0, true, 60.0),
        ];
        assert_eq!(clear_hit_window(&mut obstacles, &player), 1);
        let ids: Vec<u32> = obstacles.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_heart_adds_life_then_bonus() {
        let (player, mut score, t, mut events) = setup();
        let mut lives = MAX_LIVES - 1;
        let mut hearts = vec![
            Collectable::heart(1, player.pos, 0.0),
            Collectable::heart(2, player.pos, 0.0),
        ];
        resolve_collectables(&player, &mut hearts, &mut lives, &mut score, &t, &mut events);
        assert_eq!(lives, MAX_LIVES);
        assert_eq!(score.bonus_points, t.heart_bonus_points);
        assert!(hearts.iter().all(|h| h.collected));
    }

    #[test]
    fn test_platform_support_from_above_only() {
        let player = Player::new();
        let platform = platform_obstacle(1, player.left() - 10.0, 100.0, GROUND_Y, 30.0);
        let top = platform.top();
        let obstacles = vec![platform];
        // Above the platform: it supports
        assert_eq!(support_surface(&obstacles, &player, top - 5.0), (top, true));
        // Below the platform: ground supports
        assert_eq!(
            support_surface(&obstacles, &player, GROUND_Y),
            (GROUND_Y, false)
        );
    }

    #[test]
    fn test_platform_landing_marks_platform_clear() {
        let phys = PhysicsTuning::default();
        let (mut player, mut score, t, mut events) = setup();
        let platform = platform_obstacle(1, player.left() - 10.0, 140.0, GROUND_Y, 30.0);
        player.pos = Vec2::new(player.pos.x, platform.top() - player.size - 0.5);
        player.on_ground = false;
        let obstacles = vec![platform];
        let (support, on_platform) = support_surface(&obstacles, &player, player.bottom());
        assert!(player.update(1.0 / 60.0, support, on_platform, &phys));
        assert!(player.on_platform);

        let mut hazards = vec![ground_obstacle(2, player.left() - 40.0, 1)];
        resolve_obstacles(&player, &mut hazards, &mut score, &t, &mut events);
        assert!(matches!(
            events[0],
            GameEvent::ObstacleCleared {
                clear: ClearType::Platform,
                ..
            }
        ));
    }
}
