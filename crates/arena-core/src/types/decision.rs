//! Agent decisions.

use serde::{Deserialize, Serialize};

use super::Side;

/// What an agent wants to do with a symbol this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Action {
    /// The order side this action trades on, if any.
    pub fn side(&self) -> Option<Side> {
        match self {
            Action::Buy => Some(Side::Buy),
            Action::Sell => Some(Side::Sell),
            Action::Hold => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

/// Tagged decision returned by an agent.
///
/// `quantity` is only meaningful for buys and sells; holds always carry 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Decision {
    pub action: Action,
    pub quantity: u64,
}

impl Decision {
    /// Do nothing.
    pub const HOLD: Decision = Decision {
        action: Action::Hold,
        quantity: 0,
    };

    /// Buy `quantity` shares.
    pub fn buy(quantity: u64) -> Self {
        Self {
            action: Action::Buy,
            quantity,
        }
    }

    /// Sell `quantity` shares.
    pub fn sell(quantity: u64) -> Self {
        Self {
            action: Action::Sell,
            quantity,
        }
    }

    /// Hold.
    pub fn hold() -> Self {
        Self::HOLD
    }

    /// Check if this decision trades (buy/sell with a positive quantity).
    pub fn is_actionable(&self) -> bool {
        self.action != Action::Hold && self.quantity > 0
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.action {
            Action::Hold => write!(f, "HOLD"),
            action => write!(f, "{} {}", action, self.quantity),
        }
    }
}
