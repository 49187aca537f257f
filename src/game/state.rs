//! per-game mutable state: the `seen[]` patron stream, running counters,
//! and the pending-patron handoff.

use crate::error::GameError;
use crate::goal::check_goals;
use crate::rng::NormalGenerator;
use crate::sampler::generate_attributes;
use crate::{ACCEPTED_LIMIT, LOSS_LIMIT};

use super::params::GameParams;

/// bit 7 of a `seen[]` byte marks the patron as accepted; bits 0..=6 carry
/// the attribute bitmask, so persisted game types are limited to 7
/// attributes even though [`crate::sampler::SamplerParams`] permits up to 32.
pub const ACCEPT_BIT: u8 = 1 << 7;

#[derive(Debug, Clone)]
pub struct GameState {
    pub name: String,
    pub id: u32,
    pub user_id: u32,
    pub game_type: i32,
    pub seen: Vec<u8>,
    pub count: u32,
    pub accepted: u32,
    pub attr_n: Vec<u32>,
    pub has_next: bool,
    pub next: u8,
    pub goals_satisfied: bool,
}

impl GameState {
    pub fn new(name: String, id: u32, user_id: u32, game_type: i32, n: usize) -> Self {
        Self {
            name,
            id,
            user_id,
            game_type,
            seen: Vec::new(),
            count: 0,
            accepted: 0,
            attr_n: vec![0; n],
            has_next: false,
            next: 0,
            goals_satisfied: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.accepted >= ACCEPTED_LIMIT || self.count >= LOSS_LIMIT
    }

    /// recompute `accepted`, `attr_n`, and (if terminal) `goals_satisfied`
    /// from scratch by rescanning `seen[0..count)`, matching the reference
    /// semantics rather than updating incrementally.
    pub fn recompute(&mut self, params: &GameParams) {
        self.accepted = 0;
        for n in self.attr_n.iter_mut() {
            *n = 0;
        }

        for &byte in self.seen.iter().take(self.count as usize) {
            if byte & ACCEPT_BIT != 0 {
                self.accepted += 1;
            }
            for (attr, n) in self.attr_n.iter_mut().enumerate() {
                if byte & (1 << attr) != 0 {
                    *n += 1;
                }
            }
        }

        if self.is_finished() {
            self.goals_satisfied = check_goals(&params.goals, &self.attr_n);
        }
    }

    /// draw and stash the next pending patron.
    pub fn draw_next_person(&mut self, rng: &NormalGenerator, params: &GameParams) {
        let attr = generate_attributes(rng, &params.sampler);
        self.next = attr as u8;
        self.has_next = true;
    }

    /// apply a verdict for the pending patron at index `person`, recompute
    /// counters, and leave `has_next` false until the caller draws again.
    pub fn process_person(&mut self, person: u32, verdict: bool, params: &GameParams) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        if !self.has_next {
            return Err(GameError::NoPendingPatron);
        }
        if person != self.count {
            return Err(GameError::WrongPerson {
                expected: self.count,
                got: person,
            });
        }

        let mut byte = self.next;
        if verdict {
            byte |= ACCEPT_BIT;
        }

        self.seen.push(byte);
        self.count += 1;
        self.has_next = false;
        self.recompute(params);
        Ok(())
    }
}
