//! Communication direction of a network primitive

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetDirection {
    Send,
    Recv,
}

impl NetDirection {
    pub const ALL: [NetDirection; 2] = [NetDirection::Send, NetDirection::Recv];

    /// Direction a peer call must have to be paired with this one
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            NetDirection::Send => NetDirection::Recv,
            NetDirection::Recv => NetDirection::Send,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetDirection::Send => "send",
            NetDirection::Recv => "recv",
        }
    }
}
