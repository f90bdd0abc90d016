use serde::{Deserialize, Serialize};

use super::CaromRegion;
use crate::table::CAROM_OPPONENT_CUE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactScore {
    Nothing,
    Point,
    Penalty,
}

/// Cue-ball contacts made during the shot in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotTracker {
    pub first_contact: Option<usize>,
    pub second_contact: Option<usize>,
    pub third_contact: Option<usize>,
    pub made_point: bool,
    pub made_penalty: bool,
}

impl ShotTracker {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn record_contact(&mut self, ball: usize) {
        if self.first_contact.is_none() {
            self.first_contact = Some(ball);
        }
    }

    pub fn record_carom_contact(&mut self, ball: usize, region: CaromRegion) -> ContactScore {
        match region {
            CaromRegion::Korean => {
                if ball == CAROM_OPPONENT_CUE {
                    if self.made_penalty {
                        return ContactScore::Nothing;
                    }
                    self.made_penalty = true;
                    return ContactScore::Penalty;
                }
                match self.first_contact {
                    None => self.first_contact = Some(ball),
                    Some(first) if first != ball && self.second_contact.is_none() => {
                        self.second_contact = Some(ball);
                        self.made_point = true;
                        return ContactScore::Point;
                    }
                    Some(_) => {}
                }
            }
            CaromRegion::Japanese => match (self.first_contact, self.second_contact) {
                (None, _) => self.first_contact = Some(ball),
                (Some(first), None) if ball != first => {
                    self.second_contact = Some(ball);
                    self.made_point = true;
                    return ContactScore::Point;
                }
                (Some(first), Some(second))
                    if self.third_contact.is_none() && ball != first && ball != second =>
                {
                    self.third_contact = Some(ball);
                    self.made_point = true;
                    return ContactScore::Point;
                }
                _ => {}
            },
        }
        ContactScore::Nothing
    }
}
