use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

/// Last known state of the commander's fleet carrier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierStatus {
    pub name: String,
    /// Star system the carrier was last seen in.
    pub location: String,
    pub fuel: i64,
    /// Balance as displayed, already thousands-separated.
    pub credits: String,
}

impl Default for CarrierStatus {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            location: UNKNOWN.to_string(),
            fuel: 0,
            credits: "0".to_string(),
        }
    }
}

impl CarrierStatus {
    /// Replaces the location, returning `true` when it actually changed.
    pub fn set_location(&mut self, location: &str) -> bool {
        if self.location == location {
            return false;
        }
        self.location = location.to_string();
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuelAlert {
    Normal,
    Low,
}

impl FuelAlert {
    pub fn is_low(self) -> bool {
        matches!(self, FuelAlert::Low)
    }
}

/// Strict less-than against the threshold. There is no hysteresis band, so a
/// level hovering at the threshold flips on every sample that crosses it.
pub fn fuel_alert(fuel: i64, threshold: i64) -> FuelAlert {
    if fuel < threshold {
        FuelAlert::Low
    } else {
        FuelAlert::Normal
    }
}

/// Formats a credit balance with `,` thousands separators.
pub fn format_credits(balance: i64) -> String {
    let digits = balance.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if balance < 0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
