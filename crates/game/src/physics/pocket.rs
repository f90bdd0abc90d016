use glam::Vec3;

use super::PhysicsEvent;
use crate::state::{GameState, PocketMask, TableState};
use crate::table::{POCKET_DEPTH, TABLE_HALF_HEIGHT, TABLE_HALF_WIDTH, tray_slot};

const GROUP_MASK: u16 = 0x01FC;
const OBJECT_MASK: u16 = 0xFFFC;
const MONEY_BIT: u16 = 0x0002;

pub(super) fn in_pocket(position: Vec3) -> bool {
    let ax = position.x.abs();
    let az = position.z * position.z.signum();
    az > TABLE_HALF_HEIGHT + POCKET_DEPTH
        || az > -ax + TABLE_HALF_WIDTH + TABLE_HALF_HEIGHT + POCKET_DEPTH
}

/// Balls the player at the table may sink without it counting against them.
pub fn objective_mask(game: &GameState, pocketed: PocketMask) -> u16 {
    let group = GROUP_MASK << (u16::from((game.turn ^ game.colours) & 1) * 7);
    let open = if game.open { OBJECT_MASK } else { 0 };
    let money = if pocketed.intersection(group) == group {
        MONEY_BIT
    } else {
        0
    };
    group | open | money
}

/// Sends `ball` to the tray and marks it pocketed.
pub(super) fn pocket_ball(table: &mut TableState, ball: usize, events: &mut Vec<PhysicsEvent>) {
    let last = table.game.mode.last_ball();
    let in_tray = (1..=last).filter(|&id| table.pocketed.contains(id)).count() as u32;

    let target = &mut table.balls[ball];
    target.position = tray_slot(in_tray);
    target.stop();
    table.pocketed.insert(ball);

    let objective = objective_mask(&table.game, table.pocketed) & (1 << ball) != 0;
    log::debug!("ball {ball} pocketed (objective: {objective})");
    events.push(PhysicsEvent::Pocketed { ball, objective });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pocket_regions() {
        assert!(!in_pocket(Vec3::new(0.0, 0.0, 0.0)));
        assert!(!in_pocket(Vec3::new(0.0, 0.0, TABLE_HALF_HEIGHT)));
        assert!(in_pocket(Vec3::new(0.0, 0.0, TABLE_HALF_HEIGHT + 0.05)));
        assert!(in_pocket(Vec3::new(-0.5, 0.0, -(TABLE_HALF_HEIGHT + 0.05))));
        assert!(in_pocket(Vec3::new(
            TABLE_HALF_WIDTH + 0.03,
            0.0,
            TABLE_HALF_HEIGHT + 0.02
        )));
        assert!(!in_pocket(Vec3::new(TABLE_HALF_WIDTH, 0.0, 0.0)));
    }

    #[test]
    fn objective_mask_follows_group() {
        let mut game = GameState {
            open: false,
            ..Default::default()
        };
        assert_eq!(objective_mask(&game, PocketMask::EMPTY), 0x01FC);

        game.turn = 1;
        assert_eq!(objective_mask(&game, PocketMask::EMPTY), 0xFE00);

        game.open = true;
        assert_eq!(objective_mask(&game, PocketMask::EMPTY) & 0x0002, 0);

        game.open = false;
        assert_eq!(objective_mask(&game, PocketMask(0xFE00)), 0xFE02);
    }

    #[test]
    fn pocketed_ball_goes_to_tray() {
        let mut table = TableState::default();
        table.pocketed.insert(4);
        table.balls[6].velocity = Vec3::new(1.0, 0.0, 1.0);
        table.balls[6].angular_velocity = Vec3::Y;

        let mut events = Vec::new();
        pocket_ball(&mut table, 6, &mut events);

        assert!(table.pocketed.contains(6));
        assert!(table.balls[6].is_at_rest());
        assert_eq!(table.balls[6].position, tray_slot(1));
        assert_eq!(
            events,
            vec![PhysicsEvent::Pocketed {
                ball: 6,
                objective: true
            }]
        );
    }
}
