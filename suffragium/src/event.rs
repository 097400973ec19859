use crate::*;

/// Emitted once per state transition; the only observation point for off-ledger watchers
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum Event {
    VoteCreated { vote_id: VoteId },
    VoteCasted { vote_id: VoteId },
    VoteRevealRequested { vote_id: VoteId },
    VoteRevealed { vote_id: VoteId, passed: bool },
}

impl Event {
    pub fn vote_id(&self) -> VoteId {
        match self {
            Event::VoteCreated { vote_id }
            | Event::VoteCasted { vote_id }
            | Event::VoteRevealRequested { vote_id }
            | Event::VoteRevealed { vote_id, .. } => *vote_id,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::VoteCreated { vote_id } => write!(f, "VoteCreated({})", vote_id),
            Event::VoteCasted { vote_id } => write!(f, "VoteCasted({})", vote_id),
            Event::VoteRevealRequested { vote_id } => write!(f, "VoteRevealRequested({})", vote_id),
            Event::VoteRevealed { vote_id, passed } => {
                write!(f, "VoteRevealed({}, {})", vote_id, passed)
            }
        }
    }
}
