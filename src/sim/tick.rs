//! Delta-time simulation tick
//!
//! Drives the game phase machine. Countdowns are timed states advanced by the
//! same dt as everything else, so there is a single clock.

use super::collision::{clear_hit_window, resolve_collectables, resolve_obstacles, support_surface};
use super::difficulty::Difficulty;
use super::player::Player;
use super::state::{Character, Countdown, GameEvent, GamePhase, GameState, PauseReason};
use super::transition::{LevelTransition, TransitionStats, TransitionUpdate};
use crate::consts::*;

/// Abstract input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump with the given level (1-4)
    pub jump: Option<u8>,
    /// Pause toggle
    pub pause: bool,
    /// Character picked on the start screen
    pub select_character: Option<Character>,
    /// Name typed on the start screen
    pub player_name: Option<String>,
    /// Confirm start / dismiss game over
    pub confirm: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_DT);
    state.clock.advance(dt);

    match state.phase {
        GamePhase::StartScreen => tick_start_screen(state, input),

        GamePhase::Countdown => {
            let finished = state.countdown.as_mut().is_none_or(|c| c.tick(dt));
            if finished {
                state.countdown = None;
                state.clock.start_run();
                state.phase = GamePhase::Playing;
                log::info!("Go!");
            }
        }

        GamePhase::Playing => {
            if input.pause {
                pause(state, PauseReason::User);
                return;
            }
            tick_playing(state, input, dt);
        }

        GamePhase::Paused => match state.pause_reason {
            Some(PauseReason::LifeLost) => {
                let finished = state.countdown.as_mut().is_none_or(|c| c.tick(dt));
                if finished {
                    resume(state);
                }
            }
            _ => {
                if input.pause {
                    resume(state);
                }
            }
        },

        GamePhase::LevelTransition => {
            if state.transition.update(dt, &mut state.rng) == TransitionUpdate::Completed {
                finish_level_transition(state);
            }
        }

        GamePhase::GameOver => {
            if input.confirm {
                state.phase = GamePhase::StartScreen;
            }
        }
    }
}

fn tick_start_screen(state: &mut GameState, input: &TickInput) {
    if let Some(character) = input.select_character {
        if character != state.character {
            state.character = character;
            state.emit(GameEvent::CharacterSelected { character });
        }
    }
    if let Some(name) = &input.player_name {
        state.set_player_name(name);
    }
    if input.idle_mode && state.player_name.is_empty() {
        state.set_player_name("Demo");
    }
    if (input.confirm || input.idle_mode) && !state.player_name.is_empty() {
        start_countdown(state);
    }
}

/// Reset the run and begin the 3-2-1 countdown. Any pending countdown is
/// replaced.
pub fn start_countdown(state: &mut GameState) {
    state.new_game();
    state.countdown = Some(Countdown::new(COUNTDOWN_SECS));
    state.phase = GamePhase::Countdown;
    log::info!(
        "Game started: {} as {}",
        state.player_name,
        state.character.as_str()
    );
    let event = GameEvent::GameStarted {
        character: state.character,
        name: state.player_name.clone(),
    };
    state.emit(event);
}

fn pause(state: &mut GameState, reason: PauseReason) {
    state.phase = GamePhase::Paused;
    state.pause_reason = Some(reason);
    state.countdown = match reason {
        PauseReason::LifeLost => Some(Countdown::new(COUNTDOWN_SECS)),
        PauseReason::User => None,
    };
    state.clock.begin_pause();
    state.emit(GameEvent::Paused { reason });
}

fn resume(state: &mut GameState) {
    state.clock.end_pause();
    state.phase = GamePhase::Playing;
    state.pause_reason = None;
    state.countdown = None;
    state.emit(GameEvent::Resumed);
}

fn tick_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    let level = state.level.current_level;

    // 1. Difficulty for this tick
    state.difficulty = Difficulty::at(state.level_time() as f32, level, &state.tuning.difficulty);

    // 2. Spawning
    state.spawner.update(
        dt,
        &state.difficulty,
        &mut state.obstacles,
        &mut state.collectables,
        &mut state.rng,
    );

    // 3. Jump command
    let jump = if input.idle_mode {
        autopilot_jump(state)
    } else {
        input.jump
    };
    if let Some(jump_level) = jump {
        state.player.jump(jump_level, level, &state.tuning.physics);
    }

    // 4. Scroll the world
    let dx = state.difficulty.speed * dt;
    for o in &mut state.obstacles {
        o.scroll(dx);
    }
    for c in &mut state.collectables {
        c.update(dx, dt);
    }

    // 5. Player physics
    let prev_bottom = state.player.bottom();
    let (support, on_platform) = support_surface(&state.obstacles, &state.player, prev_bottom);
    if state
        .player
        .update(dt, support, on_platform, &state.tuning.physics)
    {
        let combo_broken = state.score.combo.reset();
        if combo_broken > 0 {
            state.emit(GameEvent::Landed { combo_broken });
        }
    }

    // 6. Collisions and clears
    let hit = resolve_obstacles(
        &state.player,
        &mut state.obstacles,
        &mut state.score,
        &state.tuning.scoring,
        &mut state.events,
    );
    if hit.is_some() {
        lose_life(state);
        return;
    }
    resolve_collectables(
        &state.player,
        &mut state.collectables,
        &mut state.lives,
        &mut state.score,
        &state.tuning.scoring,
        &mut state.events,
    );

    // 7. Time score and milestones
    state.score.add_time(dt, &state.tuning.scoring);
    for score in state.score.check_milestones(&state.tuning.scoring) {
        state.emit(GameEvent::Milestone { score });
    }

    // 8. Cull
    state.obstacles.retain(|o| !o.is_offscreen());
    state
        .collectables
        .retain(|c| !c.collected && !c.is_offscreen());

    // 9. Level completion
    if state.level.is_level_complete(state.total_score()) {
        begin_level_transition(state);
    }
}

fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.score.combo.reset();
    clear_hit_window(&mut state.obstacles, &state.player);
    let lives_left = state.lives;
    state.emit(GameEvent::ObstacleHit { lives_left });

    if lives_left == 0 {
        game_over(state);
    } else {
        log::info!("Life lost, {} left", lives_left);
        pause(state, PauseReason::LifeLost);
    }
}

fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.countdown = None;
    state.pause_reason = None;
    let summary = state.summary();
    log::info!(
        "Game over: {} scored {} (level {})",
        summary.name,
        summary.score,
        summary.level
    );
    state.emit(GameEvent::GameOver { summary });
}

fn begin_level_transition(state: &mut GameState) {
    let score = state.total_score();
    let stats = TransitionStats {
        completed_level: state.level.current_level,
        total_score: score,
        level_score: score.saturating_sub(state.level.level_start_score),
        level_time: state.level_time(),
        obstacles_cleared: state.score.level.obstacles_cleared,
        max_combo: state.score.level.max_combo,
        close_calls: state.score.level.close_calls,
        hearts: state.score.level.hearts,
    };
    log::info!("Level {} complete ({} points)", stats.completed_level, score);
    state.emit(GameEvent::LevelComplete {
        level: stats.completed_level,
        score,
        time: stats.level_time,
    });
    state.transition = LevelTransition::start(stats);
    state.phase = GamePhase::LevelTransition;
    // The cinematic is not play time
    state.clock.begin_pause();
}

/// Set up the next level once the cave sequence is over
fn finish_level_transition(state: &mut GameState) {
    state.clock.end_pause();
    let new_best = state
        .level
        .advance_level(state.total_score(), state.clock.play_time());
    let level = state.level.current_level;
    state.obstacles.clear();
    state.collectables.clear();
    state.score.reset_for_level();
    state.difficulty = Difficulty::level_start(level, &state.tuning.difficulty);
    state.spawner.reset_timer();
    state.player = Player::new();
    state.phase = GamePhase::Playing;
    let theme = state.theme();
    log::info!("Level {} ({})", level, theme.as_str());
    state.emit(GameEvent::LevelStarted {
        level,
        theme,
        new_best,
    });
}

/// Pick a jump for the nearest hazard ahead, if it is time to jump
fn autopilot_jump(state: &GameState) -> Option<u8> {
    let player = &state.player;
    let physics = &state.tuning.physics;
    let speed = state.difficulty.speed.max(1.0);

    let target = state
        .obstacles
        .iter()
        .filter(|o| o.is_hazard() && !o.scored && o.right() > player.left())
        .min_by(|a, b| {
            a.left()
                .partial_cmp(&b.left())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;

    let level = target.height_level().clamp(1, MAX_OBSTACLE_LEVEL);
    if player.on_ground {
        let power = physics.jump_power[(level - 1) as usize];
        let airtime = 2.0 * power / physics.gravity;
        // Be at the apex when the obstacle is halfway under the player
        let lead = airtime * 0.5 - (player.size + target.size.x) * 0.5 / speed;
        let time_to_reach = (target.left() - player.right()) / speed;
        return (time_to_reach <= lead.max(0.05)).then_some(level);
    }

    // Falling onto the obstacle: spend an air jump
    let overlapping_soon = target.left() - player.right() < speed * 0.12;
    let too_low = player.bottom() > target.top() - 10.0;
    (player.vel_y > 0.0 && overlapping_soon && too_low && player.jump_count < physics.max_jumps)
        .then_some(level)
}
