mod collision;
mod config;
mod cushion;
mod friction;
mod pocket;

pub use config::PhysicsConfig;
pub use pocket::objective_mask;

use crate::state::{ContactScore, TableState};
use crate::table::{BALL_COUNT, CAROM_BALLS, CUE_BALL};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsEvent {
    BallContact { a: usize, b: usize, strength: f32 },
    Pocketed { ball: usize, objective: bool },
    CaromPoint { ball: usize },
    CaromPenalty { ball: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub moving: bool,
}

impl StepReport {
    pub fn settled(&self) -> bool {
        !self.moving
    }
}

/// Fixed-step integrator for the sixteen balls.
#[derive(Debug, Clone, Default)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Advances the table by one fixed step.
    ///
    /// Balls are moved and collided in id order. When nothing moved, cushions and pockets are
    /// skipped and the report says settled.
    pub fn step(&self, table: &mut TableState, events: &mut Vec<PhysicsEvent>) -> StepReport {
        let dt = self.config.fixed_step;
        let mut moving = false;

        if !table.pocketed.contains(CUE_BALL) {
            if !collision::predict_cue_contact(&mut table.balls, table.pocketed, dt) {
                let cue = &mut table.balls[CUE_BALL];
                cue.position += cue.velocity * dt;
            }
            moving |= self.advance_ball(table, CUE_BALL, events);
        }

        for id in 1..BALL_COUNT {
            if table.pocketed.contains(id) {
                continue;
            }
            let ball = &mut table.balls[id];
            ball.position += ball.velocity * dt;
            moving |= self.advance_ball(table, id, events);
        }

        if !moving {
            return StepReport { moving };
        }

        if table.game.mode.is_carom() {
            for id in CAROM_BALLS {
                cushion::carom_table(&mut table.balls[id]);
            }
            return StepReport { moving };
        }

        for id in 0..BALL_COUNT {
            if !table.pocketed.contains(id) {
                cushion::pocket_table(&mut table.balls[id]);
            }
        }

        for id in 0..BALL_COUNT {
            if !table.pocketed.contains(id) && pocket::in_pocket(table.balls[id].position) {
                pocket::pocket_ball(table, id, events);
            }
        }

        StepReport { moving }
    }

    fn advance_ball(&self, table: &mut TableState, id: usize, events: &mut Vec<PhysicsEvent>) -> bool {
        let moving = friction::apply(&mut table.balls[id], &self.config);

        for other in (id + 1)..BALL_COUNT {
            if table.pocketed.contains(other) {
                continue;
            }
            let Some(strength) = collision::collide(&mut table.balls, id, other) else {
                continue;
            };
            events.push(PhysicsEvent::BallContact {
                a: id,
                b: other,
                strength,
            });
            if id == CUE_BALL {
                record_cue_contact(table, other, events);
            }
        }

        moving
    }
}

fn record_cue_contact(table: &mut TableState, ball: usize, events: &mut Vec<PhysicsEvent>) {
    if !table.game.mode.is_carom() {
        table.shot.record_contact(ball);
        return;
    }

    let turn = table.game.turn;
    match table.shot.record_carom_contact(ball, table.carom.region) {
        ContactScore::Point => {
            table.carom.award(turn);
            events.push(PhysicsEvent::CaromPoint { ball });
        }
        ContactScore::Penalty => {
            table.carom.penalize(turn);
            events.push(PhysicsEvent::CaromPenalty { ball });
        }
        ContactScore::Nothing => {}
    }
}
