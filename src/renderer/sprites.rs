//! Character and world-object sprites as draw commands
//!
//! Sprites are drawn around the origin, `PLAYER_SIZE` across. The caller
//! places them with a [`DrawCommand::Group`].

use glam::Vec2;

use super::{Color, DrawCommand};
use crate::consts::*;
use crate::sim::Character;

/// What the character is doing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pose {
    /// Running on a surface; `stride` cycles 0..4
    Run { stride: u8 },
    /// Single jump, no spin
    Jump,
    /// Air jump somersault, `frame` in 0..SPIN_FRAMES
    Somersault { frame: u8 },
    /// Brief flinch after losing a life
    Hurt,
}

impl Pose {
    /// Pose for a player given whether it is on a surface and how far the
    /// world has scrolled (drives the running stride)
    pub fn for_player(player: &crate::sim::Player, distance: f32) -> Self {
        if player.on_ground {
            Pose::Run {
                stride: ((distance / 18.0) as u32 % 4) as u8,
            }
        } else if player.is_somersaulting() {
            Pose::Somersault {
                frame: player.frame,
            }
        } else {
            Pose::Jump
        }
    }
}

struct Palette {
    body: Color,
    accent: Color,
    trim: Color,
}

fn palette(character: Character) -> Palette {
    match character {
        Character::Fox => Palette {
            body: Color::rgb(0.93, 0.45, 0.13),
            accent: Color::rgb(1.0, 0.95, 0.88),
            trim: Color::rgb(0.25, 0.15, 0.1),
        },
        Character::Knight => Palette {
            body: Color::rgb(0.7, 0.72, 0.78),
            accent: Color::rgb(0.75, 0.1, 0.12),
            trim: Color::rgb(0.3, 0.3, 0.35),
        },
        Character::Robot => Palette {
            body: Color::rgb(0.35, 0.6, 0.85),
            accent: Color::rgb(0.95, 0.85, 0.2),
            trim: Color::rgb(0.15, 0.2, 0.3),
        },
        Character::Ninja => Palette {
            body: Color::rgb(0.12, 0.12, 0.16),
            accent: Color::rgb(0.85, 0.15, 0.2),
            trim: Color::rgb(0.9, 0.8, 0.7),
        },
        Character::Astronaut => Palette {
            body: Color::rgb(0.95, 0.95, 0.97),
            accent: Color::rgb(0.3, 0.55, 0.95),
            trim: Color::rgb(0.55, 0.55, 0.6),
        },
    }
}

fn rect(x: f32, y: f32, w: f32, h: f32, color: Color) -> DrawCommand {
    DrawCommand::Rect {
        pos: Vec2::new(x, y),
        size: Vec2::new(w, h),
        color,
    }
}

fn circle(x: f32, y: f32, radius: f32, color: Color) -> DrawCommand {
    DrawCommand::Circle {
        center: Vec2::new(x, y),
        radius,
        color,
    }
}

/// Legs for the pose, in local coordinates
fn legs(pose: Pose, color: Color) -> Vec<DrawCommand> {
    let h = PLAYER_SIZE / 2.0;
    match pose {
        Pose::Run { stride } => {
            let swing = [-5.0, 0.0, 5.0, 0.0][stride as usize % 4];
            vec![
                rect(-10.0 + swing, h - 10.0, 7.0, 10.0, color),
                rect(3.0 - swing, h - 10.0, 7.0, 10.0, color),
            ]
        }
        Pose::Jump => vec![
            rect(-11.0, h - 12.0, 7.0, 8.0, color),
            rect(4.0, h - 8.0, 7.0, 8.0, color),
        ],
        // Tucked in
        Pose::Somersault { .. } => vec![rect(-8.0, h - 14.0, 16.0, 6.0, color)],
        Pose::Hurt => vec![
            rect(-12.0, h - 10.0, 7.0, 10.0, color),
            rect(5.0, h - 10.0, 7.0, 10.0, color),
        ],
    }
}

/// Character-specific head and details
fn features(character: Character, p: &Palette) -> Vec<DrawCommand> {
    let h = PLAYER_SIZE / 2.0;
    match character {
        Character::Fox => vec![
            DrawCommand::Polygon {
                points: vec![
                    Vec2::new(-12.0, -h + 8.0),
                    Vec2::new(-8.0, -h - 4.0),
                    Vec2::new(-3.0, -h + 6.0),
                ],
                color: p.body,
            },
            DrawCommand::Polygon {
                points: vec![
                    Vec2::new(3.0, -h + 6.0),
                    Vec2::new(8.0, -h - 4.0),
                    Vec2::new(12.0, -h + 8.0),
                ],
                color: p.body,
            },
            rect(2.0, -4.0, 14.0, 8.0, p.accent),
            circle(6.0, -8.0, 2.0, p.trim),
            // Tail
            circle(-h, 4.0, 7.0, p.body),
            circle(-h - 4.0, 2.0, 3.5, p.accent),
        ],
        Character::Knight => vec![
            rect(-12.0, -h, 24.0, 16.0, p.trim),
            rect(0.0, -h + 6.0, 12.0, 3.0, Color::BLACK),
            rect(-3.0, -h - 8.0, 6.0, 8.0, p.accent),
        ],
        Character::Robot => vec![
            rect(-11.0, -h + 2.0, 22.0, 14.0, p.trim),
            circle(-4.0, -h + 9.0, 2.5, p.accent),
            circle(5.0, -h + 9.0, 2.5, p.accent),
            rect(-1.0, -h - 6.0, 2.0, 8.0, p.trim),
            circle(0.0, -h - 7.0, 2.5, p.accent),
        ],
        Character::Ninja => vec![
            rect(-12.0, -h + 6.0, 24.0, 5.0, p.trim),
            circle(-4.0, -h + 8.5, 1.5, Color::BLACK),
            circle(5.0, -h + 8.5, 1.5, Color::BLACK),
            DrawCommand::Polygon {
                points: vec![
                    Vec2::new(-12.0, -h + 4.0),
                    Vec2::new(-22.0, -h + 2.0),
                    Vec2::new(-20.0, -h + 10.0),
                ],
                color: p.accent,
            },
        ],
        Character::Astronaut => vec![
            circle(0.0, -h + 10.0, 11.0, p.trim),
            circle(2.0, -h + 10.0, 8.0, p.accent),
            rect(-h, -4.0, 6.0, 16.0, p.trim),
        ],
    }
}

/// Full character sprite for a pose
pub fn character(character: Character, pose: Pose) -> Vec<DrawCommand> {
    let p = palette(character);
    let h = PLAYER_SIZE / 2.0;
    let mut commands = legs(pose, p.trim);
    commands.push(rect(-h + 4.0, -h + 4.0, PLAYER_SIZE - 8.0, PLAYER_SIZE - 12.0, p.body));
    commands.extend(features(character, &p));
    if pose == Pose::Hurt {
        commands.push(rect(-h, -h, PLAYER_SIZE, PLAYER_SIZE, Color::rgba(1.0, 0.0, 0.0, 0.35)));
    }
    commands
}

/// Heart pickup centered at the origin
pub fn heart(size: f32) -> Vec<DrawCommand> {
    let r = size * 0.28;
    let color = Color::rgb(0.93, 0.2, 0.3);
    vec![
        circle(-r * 0.9, -r * 0.4, r, color),
        circle(r * 0.9, -r * 0.4, r, color),
        DrawCommand::Polygon {
            points: vec![
                Vec2::new(-size * 0.5, -r * 0.1),
                Vec2::new(size * 0.5, -r * 0.1),
                Vec2::new(0.0, size * 0.5),
            ],
            color,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_character_draws() {
        for c in Character::ALL {
            for pose in [
                Pose::Run { stride: 1 },
                Pose::Jump,
                Pose::Somersault { frame: 2 },
                Pose::Hurt,
            ] {
                assert!(character(c, pose).len() >= 4, "{:?} {:?}", c, pose);
            }
        }
    }

    #[test]
    fn test_pose_follows_player() {
        let mut player = crate::sim::Player::new();
        assert!(matches!(Pose::for_player(&player, 0.0), Pose::Run { .. }));
        player.on_ground = false;
        assert_eq!(Pose::for_player(&player, 0.0), Pose::Jump);
    }
}
