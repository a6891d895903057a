//! Program identity
//!
//! The engine always analyzes exactly two communicating programs. Program
//! membership is part of every value's identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two analyzed programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProgramId {
    /// Program 1 (e.g. the client)
    First,
    /// Program 2 (e.g. the daemon)
    Second,
}

impl ProgramId {
    /// Both programs, in numbering order
    pub const ALL: [ProgramId; 2] = [ProgramId::First, ProgramId::Second];

    /// The peer program on the other end of the channel
    #[inline]
    pub fn other(self) -> Self {
        match self {
            ProgramId::First => ProgramId::Second,
            ProgramId::Second => ProgramId::First,
        }
    }

    /// 1-based program number
    #[inline]
    pub fn number(self) -> u8 {
        match self {
            ProgramId::First => 1,
            ProgramId::Second => 2,
        }
    }

    /// 0-based index for per-program arrays
    #[inline]
    pub fn index(self) -> usize {
        self.number() as usize - 1
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(ProgramId::First),
            2 => Some(ProgramId::Second),
            _ => None,
        }
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.number())
    }
}

/// Fixed-size per-program storage indexed by [`ProgramId`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerProgram<T> {
    slots: [T; 2],
}

impl<T> PerProgram<T> {
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
        }
    }

    #[inline]
    pub fn get(&self, program: ProgramId) -> &T {
        &self.slots[program.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, program: ProgramId) -> &mut T {
        &mut self.slots[program.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProgramId, &T)> {
        ProgramId::ALL.into_iter().zip(self.slots.iter())
    }
}
