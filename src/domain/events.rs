//! Typed views over the journal and CAPI JSON the monitor consumes.

use serde_json::Value;

use super::carrier::{format_credits, UNKNOWN};

pub const EVENT_CARRIER_STATS: &str = "CarrierStats";
pub const EVENT_CARRIER_LOCATION: &str = "CarrierLocation";

/// Journal ids are numeric but configs store them as text.
pub fn carrier_id_of(entry: &Value) -> Option<String> {
    id_text(entry.get("CarrierID")?)
}

pub fn event_name(entry: &Value) -> Option<&str> {
    entry.get("event").and_then(Value::as_str)
}

/// A `CarrierLocation` event reduced to what the reconciler needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarrierLocation {
    pub carrier_id: Option<String>,
    pub star_system: String,
}

impl CarrierLocation {
    pub fn from_entry(entry: &Value) -> Option<Self> {
        if event_name(entry) != Some(EVENT_CARRIER_LOCATION) {
            return None;
        }
        let star_system = entry.get("StarSystem")?.as_str()?.to_string();
        Some(Self {
            carrier_id: carrier_id_of(entry),
            star_system,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarrierStatsUpdate {
    pub carrier_id: Option<String>,
    pub name: String,
    pub fuel: i64,
    pub credits: String,
}

impl CarrierStatsUpdate {
    pub fn from_entry(entry: &Value) -> Option<Self> {
        if event_name(entry) != Some(EVENT_CARRIER_STATS) {
            return None;
        }
        let name = entry
            .get("Name")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN)
            .to_string();
        let fuel = entry.get("FuelLevel").and_then(int_value).unwrap_or(0);
        let balance = entry
            .get("Finance")
            .and_then(|finance| finance.get("CarrierBalance"))
            .and_then(int_value)
            .unwrap_or(0);
        Some(Self {
            carrier_id: carrier_id_of(entry),
            name,
            fuel,
            credits: format_credits(balance),
        })
    }
}

/// Fields picked out of a CAPI `/fleetcarrier` payload. Missing fields stay
/// `None` so they leave the stored status untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapiCarrierUpdate {
    pub market_id: Option<String>,
    pub name: Option<String>,
    pub fuel: Option<i64>,
    pub credits: Option<String>,
    pub location: Option<String>,
}

impl CapiCarrierUpdate {
    pub fn from_payload(data: &Value) -> Self {
        let name_block = data.get("name");
        let name = name_block
            .and_then(|n| n.get("vanityName"))
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
            .map(decode_vanity_name)
            .or_else(|| {
                name_block
                    .and_then(|n| n.get("callsign"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });

        Self {
            market_id: data
                .get("market")
                .and_then(|market| market.get("id"))
                .and_then(id_text),
            name,
            fuel: data.get("fuel").and_then(int_value),
            credits: data.get("balance").and_then(int_value).map(format_credits),
            location: data
                .get("currentStarSystem")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// CAPI hex-encodes the vanity name. Anything that is not valid hex UTF-8 is
/// taken as-is.
fn decode_vanity_name(raw: &str) -> String {
    hex::decode(raw)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| raw.to_string())
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn carrier_stats_fields_and_defaults() {
        let entry = json!({
            "event": "CarrierStats",
            "CarrierID": 3700000001u64,
            "Name": "THE WANDERING HEN",
            "FuelLevel": 432,
            "Finance": { "CarrierBalance": 2_500_000_000i64 }
        });
        let update = CarrierStatsUpdate::from_entry(&entry).unwrap();
        assert_eq!(update.carrier_id.as_deref(), Some("3700000001"));
        assert_eq!(update.name, "THE WANDERING HEN");
        assert_eq!(update.fuel, 432);
        assert_eq!(update.credits, "2,500,000,000");

        let sparse = json!({ "event": "CarrierStats" });
        let update = CarrierStatsUpdate::from_entry(&sparse).unwrap();
        assert_eq!(update.name, "Unknown");
        assert_eq!(update.fuel, 0);
        assert_eq!(update.credits, "0");
        assert_eq!(update.carrier_id, None);

        assert!(CarrierStatsUpdate::from_entry(&json!({ "event": "FSDJump" })).is_none());
    }

    #[test]
    fn location_requires_star_system() {
        let entry = json!({ "event": "CarrierLocation", "CarrierID": "42", "StarSystem": "Colonia" });
        assert_eq!(
            CarrierLocation::from_entry(&entry),
            Some(CarrierLocation {
                carrier_id: Some("42".into()),
                star_system: "Colonia".into()
            })
        );
        let missing = json!({ "event": "CarrierLocation", "CarrierID": 42 });
        assert!(CarrierLocation::from_entry(&missing).is_none());
    }

    #[test]
    fn capi_payload_decodes_vanity_name() {
        let payload = json!({
            "name": { "callsign": "K7Q-1HT", "vanityName": "4E4F4D414453" },
            "currentStarSystem": "Shinrarta Dezhra",
            "balance": 1234567,
            "fuel": "800",
            "market": { "id": 3700000001u64 }
        });
        let update = CapiCarrierUpdate::from_payload(&payload);
        assert_eq!(update.name.as_deref(), Some("NOMADS"));
        assert_eq!(update.fuel, Some(800));
        assert_eq!(update.credits.as_deref(), Some("1,234,567"));
        assert_eq!(update.location.as_deref(), Some("Shinrarta Dezhra"));
        assert_eq!(update.market_id.as_deref(), Some("3700000001"));
    }

    #[test]
    fn capi_falls_back_to_callsign() {
        let payload = json!({ "name": { "callsign": "K7Q-1HT", "vanityName": "" } });
        let update = CapiCarrierUpdate::from_payload(&payload);
        assert_eq!(update.name.as_deref(), Some("K7Q-1HT"));
        assert_eq!(update.fuel, None);
    }
}
