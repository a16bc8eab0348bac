use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Unset,
    Offerer,
    Answerer,
}

/// Offerer path: `Idle -> LocalOfferPending -> AwaitingAnswer -> Connected`.
/// Answerer path: `Idle -> AwaitingRemoteOffer -> AnswerPending -> Connected`.
/// `Closed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    LocalOfferPending,
    AwaitingAnswer,
    AwaitingRemoteOffer,
    AnswerPending,
    Connected,
    Closed,
    Failed,
}

impl NegotiationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LocalOfferPending => "local-offer-pending",
            Self::AwaitingAnswer => "awaiting-answer",
            Self::AwaitingRemoteOffer => "awaiting-remote-offer",
            Self::AnswerPending => "answer-pending",
            Self::Connected => "connected",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
