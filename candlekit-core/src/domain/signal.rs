//! Signal: a strategy's request to enter or leave the market at one bar.
//!
//! Signals are ephemeral: the engine consumes them in the same step they are
//! produced and never stores them.

use serde::{Deserialize, Serialize};

/// Direction of a position or signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }

    /// +1.0 for long, -1.0 for short. Multiplies a price move into P&L.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Entry,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub side: Side,
    pub kind: SignalKind,
    /// Conviction in `[0.0, 1.0]`, when the strategy has a notion of it.
    pub strength: Option<f64>,
    pub reference_price: f64,
    /// Short label of the pattern that produced the signal.
    pub reason: &'static str,
}

impl Signal {
    pub fn entry(side: Side, reference_price: f64, reason: &'static str) -> Self {
        Self {
            side,
            kind: SignalKind::Entry,
            strength: None,
            reference_price,
            reason,
        }
    }

    pub fn exit(side: Side, reference_price: f64, reason: &'static str) -> Self {
        Self {
            side,
            kind: SignalKind::Exit,
            strength: None,
            reference_price,
            reason,
        }
    }

    /// Attach a strength, clamped into `[0.0, 1.0]`.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength.clamp(0.0, 1.0));
        self
    }

    pub fn is_entry(&self) -> bool {
        self.kind == SignalKind::Entry
    }

    /// True if this signal asks to close a position held on `held` side:
    /// an explicit exit for that side, or an entry in the opposite direction.
    pub fn closes(&self, held: Side) -> bool {
        match self.kind {
            SignalKind::Exit => self.side == held,
            SignalKind::Entry => self.side == held.opposite(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite_and_sign() {
        assert_eq!(Side::Long.opposite(), Side::Short);
        assert_eq!(Side::Short.opposite(), Side::Long);
        assert_eq!(Side::Long.sign(), 1.0);
        assert_eq!(Side::Short.sign(), -1.0);
    }

    #[test]
    fn strength_is_clamped() {
        let sig = Signal::entry(Side::Long, 100.0, "test").with_strength(1.7);
        assert_eq!(sig.strength, Some(1.0));
        let sig = Signal::entry(Side::Long, 100.0, "test").with_strength(-0.2);
        assert_eq!(sig.strength, Some(0.0));
    }

    #[test]
    fn exit_closes_same_side_only() {
        let exit_long = Signal::exit(Side::Long, 100.0, "test");
        assert!(exit_long.closes(Side::Long));
        assert!(!exit_long.closes(Side::Short));
    }

    #[test]
    fn opposing_entry_closes() {
        let enter_short = Signal::entry(Side::Short, 100.0, "test");
        assert!(enter_short.closes(Side::Long));
        assert!(!enter_short.closes(Side::Short));
    }

    #[test]
    fn side_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Side::Long).unwrap(), "\"long\"");
        assert_eq!(serde_json::to_string(&SignalKind::Exit).unwrap(), "\"exit\"");
    }
}
