#![forbid(unsafe_code)]

//! Typed reference records as the backend sends them.
//!
//! Ids arrive as strings or numbers depending on the endpoint; both
//! deserialize into `String`. Each record implements [`OptionSource`] with its
//! own extras type, so a selector over carriers can show carrier codes without
//! any stringly-typed lookups.

use crate::adapter::OptionSource;
use crate::option::{OptionFields, SelectOption};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

/// Role a party can play on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyType {
    Shipper,
    Consignee,
    NotifyParty,
    LocalClient,
    OverseasClient,
    Vendor,
}

impl PartyType {
    pub const ALL: [PartyType; 6] = [
        Self::Shipper,
        Self::Consignee,
        Self::NotifyParty,
        Self::LocalClient,
        Self::OverseasClient,
        Self::Vendor,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Shipper => "Shipper",
            Self::Consignee => "Consignee",
            Self::NotifyParty => "Notify Party",
            Self::LocalClient => "Local Client",
            Self::OverseasClient => "Overseas Client",
            Self::Vendor => "Vendor",
        }
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(deserialize_with = "de_id")]
    pub party_id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub party_types: Vec<PartyType>,
}

impl Party {
    pub fn has_type(&self, kind: PartyType) -> bool {
        self.party_types.contains(&kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyExtra {
    pub short_name: Option<String>,
    pub email: Option<String>,
    pub party_types: Vec<PartyType>,
}

impl OptionFields for PartyExtra {
    fn code(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn kind(&self) -> Option<&str> {
        self.party_types.first().map(|t| t.label())
    }
}

impl OptionSource for Party {
    type Extra = PartyExtra;

    fn to_option(&self) -> SelectOption<PartyExtra> {
        SelectOption::new(
            self.party_id.clone(),
            self.name.clone(),
            PartyExtra {
                short_name: self.short_name.clone(),
                email: self.email.clone(),
                party_types: self.party_types.clone(),
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Carriers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarrierType {
    #[serde(alias = "AIRLINE", alias = "airline")]
    Airline,
    #[serde(alias = "SHIPPING", alias = "shipping")]
    Shipping,
    #[serde(alias = "ROAD", alias = "road")]
    Road,
    #[serde(alias = "RAIL", alias = "rail")]
    Rail,
}

impl CarrierType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Airline => "Airline",
            Self::Shipping => "Shipping",
            Self::Road => "Road",
            Self::Rail => "Rail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    #[serde(deserialize_with = "de_id")]
    pub carrier_id: String,
    pub carrier_name: String,
    pub carrier_code: String,
    pub carrier_type: CarrierType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierExtra {
    pub code: String,
    pub carrier_type: CarrierType,
}

impl OptionFields for CarrierExtra {
    fn code(&self) -> Option<&str> {
        Some(&self.code)
    }

    fn kind(&self) -> Option<&str> {
        Some(self.carrier_type.label())
    }
}

impl OptionSource for Carrier {
    type Extra = CarrierExtra;

    fn to_option(&self) -> SelectOption<CarrierExtra> {
        SelectOption::new(
            self.carrier_id.clone(),
            format!("{} ({})", self.carrier_name, self.carrier_code),
            CarrierExtra {
                code: self.carrier_code.clone(),
                carrier_type: self.carrier_type,
            },
        )
    }
}

/// Freight kind of a job, which decides which carriers make sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FreightMode {
    Air,
    FclSea,
    LclSea,
    Road,
    Rail,
}

impl FreightMode {
    /// Carrier type this mode is restricted to, if any.
    pub const fn carrier_type(self) -> Option<CarrierType> {
        match self {
            Self::Air => Some(CarrierType::Airline),
            Self::FclSea | Self::LclSea => Some(CarrierType::Shipping),
            Self::Road | Self::Rail => None,
        }
    }

    /// Port kind this mode loads and discharges at, if restricted.
    pub const fn port_kind(self) -> Option<PortKind> {
        match self {
            Self::Air => Some(PortKind::Airport),
            Self::FclSea | Self::LclSea => Some(PortKind::Port),
            Self::Road | Self::Rail => None,
        }
    }
}

/// Carriers applicable to `mode`: airlines for air, shipping lines for sea,
/// everything otherwise.
pub fn carriers_for_mode(carriers: &[Carrier], mode: Option<FreightMode>) -> Vec<Carrier> {
    match mode.and_then(FreightMode::carrier_type) {
        Some(kind) => carriers
            .iter()
            .filter(|c| c.carrier_type == kind)
            .cloned()
            .collect(),
        None => carriers.to_vec(),
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortKind {
    #[serde(alias = "airport")]
    Airport,
    #[serde(alias = "port")]
    Port,
}

impl PortKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Airport => "Airport",
            Self::Port => "Port",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    #[serde(deserialize_with = "de_id")]
    pub port_id: String,
    pub port_name: String,
    pub port_code: String,
    #[serde(default)]
    pub country: Option<String>,
    /// Untyped ports are kept only when no mode narrows the list.
    #[serde(default, rename = "type", alias = "port_type")]
    pub port_type: Option<PortKind>,
}

/// Ports applicable to `mode`: airports for air, seaports for sea,
/// everything otherwise.
pub fn ports_for_mode(ports: &[Port], mode: Option<FreightMode>) -> Vec<Port> {
    match mode.and_then(FreightMode::port_kind) {
        Some(kind) => ports
            .iter()
            .filter(|p| p.port_type == Some(kind))
            .cloned()
            .collect(),
        None => ports.to_vec(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortExtra {
    pub code: String,
    pub country: Option<String>,
    pub kind: Option<PortKind>,
}

impl OptionFields for PortExtra {
    fn code(&self) -> Option<&str> {
        Some(&self.code)
    }

    fn field(&self, key: &str) -> Option<&str> {
        match key {
            "country" => self.country.as_deref(),
            "type" => self.kind.map(PortKind::label),
            _ => None,
        }
    }

    fn kind(&self) -> Option<&str> {
        self.kind.map(PortKind::label)
    }
}

impl OptionSource for Port {
    type Extra = PortExtra;

    fn to_option(&self) -> SelectOption<PortExtra> {
        SelectOption::new(
            self.port_id.clone(),
            self.port_name.clone(),
            PortExtra {
                code: self.port_code.clone(),
                country: self.country.clone(),
                kind: self.port_type,
            },
        )
    }
}

// ---------------------------------------------------------------------------
// Transport modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMode {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl TransportMode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: None,
        }
    }

    /// Explicit code, or the id upper-cased.
    pub fn code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| self.id.to_uppercase())
    }

    /// Airways, Seaways, Roadways, Railways.
    pub fn builtin() -> Vec<TransportMode> {
        [
            ("airways", "Airways"),
            ("seaways", "Seaways"),
            ("roadways", "Roadways"),
            ("railways", "Railways"),
        ]
        .into_iter()
        .map(|(id, name)| Self::new(id, name))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeExtra {
    pub code: String,
}

impl OptionFields for ModeExtra {
    fn code(&self) -> Option<&str> {
        Some(&self.code)
    }
}

impl OptionSource for TransportMode {
    type Extra = ModeExtra;

    fn to_option(&self) -> SelectOption<ModeExtra> {
        let code = self.code();
        let name = match &self.code {
            Some(code) => format!("{} ({code})", self.name),
            None => self.name.clone(),
        };
        SelectOption::new(self.id.clone(), name, ModeExtra { code })
    }
}

/// Row of the mode-of-transport master table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeRow {
    pub mode_id: String,
    pub mode_name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub associated_carriers: Vec<String>,
}

fn active_by_default() -> bool {
    true
}

/// `(key, header, sortable)` for each column of the master table.
pub const MODE_COLUMNS: [(&str, &str, bool); 5] = [
    ("mode_name", "Mode Name", true),
    ("code", "Mode Code", true),
    ("description", "Description / Notes", false),
    ("is_active", "Is Active / Status", true),
    ("associated_carriers", "Associated Carriers", false),
];

impl ModeRow {
    pub fn from_mode(mode: &TransportMode) -> Self {
        Self {
            mode_id: mode.id.clone(),
            mode_name: mode.name.clone(),
            code: mode.id.to_uppercase(),
            description: Some(format!("{} transportation mode", mode.name)),
            is_active: true,
            associated_carriers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_carriers(mut self, carriers: impl IntoIterator<Item = String>) -> Self {
        self.associated_carriers = carriers.into_iter().collect();
        self
    }

    /// Rendered text of column `key`.
    pub fn cell(&self, key: &str) -> String {
        match key {
            "mode_id" => self.mode_id.clone(),
            "mode_name" => self.mode_name.clone(),
            "code" => self.code.clone(),
            "description" => match self.description.as_deref() {
                Some(d) if !d.is_empty() => d.to_owned(),
                _ => "No description".to_owned(),
            },
            "is_active" => (if self.is_active { "Active" } else { "Inactive" }).to_owned(),
            "associated_carriers" if self.associated_carriers.is_empty() => "None".to_owned(),
            "associated_carriers" => self.associated_carriers.join(", "),
            _ => String::new(),
        }
    }

    /// Key used when the backend sorts by `column`.
    pub fn sort_key(&self, column: &str) -> String {
        match column {
            "is_active" => u8::from(!self.is_active).to_string(),
            other => self.cell(other).to_lowercase(),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserExtra {
    pub email: String,
}

impl OptionFields for UserExtra {
    fn email(&self) -> Option<&str> {
        Some(&self.email)
    }
}

impl OptionSource for User {
    type Extra = UserExtra;

    fn to_option(&self) -> SelectOption<UserExtra> {
        SelectOption::new(
            self.id.clone(),
            format!("{} {} ({})", self.first_name, self.last_name, self.email),
            UserExtra {
                email: self.email.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::normalize;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn carrier(id: u32, name: &str, code: &str, kind: CarrierType) -> Carrier {
        Carrier {
            carrier_id: id.to_string(),
            carrier_name: name.into(),
            carrier_code: code.into(),
            carrier_type: kind,
        }
    }

    #[test]
    fn party_deserializes_with_numeric_id() {
        let party: Party = serde_json::from_value(json!({
            "party_id": 42,
            "name": "Acme Exports",
            "party_types": ["SHIPPER", "NOTIFY_PARTY"]
        }))
        .unwrap();
        assert_eq!(party.party_id, "42");
        assert!(party.has_type(PartyType::NotifyParty));
        let opt = party.to_option();
        assert_eq!(opt.kind(), Some("Shipper"));
        assert_eq!(opt.email(), None);
    }

    #[test]
    fn bad_id_is_an_error() {
        let res: Result<Port, _> = serde_json::from_value(json!({
            "port_id": [1], "port_name": "x", "port_code": "y"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn carrier_label_includes_code() {
        let opt = carrier(1, "Emirates", "EK", CarrierType::Airline).to_option();
        assert_eq!(opt.name, "Emirates (EK)");
        assert_eq!(opt.code(), Some("EK"));
        assert_eq!(opt.field("type"), Some("Airline"));
    }

    #[test]
    fn carrier_type_accepts_upper_case() {
        let c: Carrier = serde_json::from_value(json!({
            "carrier_id": "c1", "carrier_name": "MSC", "carrier_code": "MSCU",
            "carrier_type": "SHIPPING"
        }))
        .unwrap();
        assert_eq!(c.carrier_type, CarrierType::Shipping);
    }

    #[test]
    fn carriers_narrow_by_freight_mode() {
        let all = vec![
            carrier(1, "Emirates", "EK", CarrierType::Airline),
            carrier(2, "Maersk", "MAEU", CarrierType::Shipping),
            carrier(3, "DHL Road", "DHLR", CarrierType::Road),
        ];
        let names = |mode| -> Vec<String> {
            carriers_for_mode(&all, mode)
                .into_iter()
                .map(|c| c.carrier_code)
                .collect()
        };
        assert_eq!(names(Some(FreightMode::Air)), ["EK"]);
        assert_eq!(names(Some(FreightMode::LclSea)), ["MAEU"]);
        assert_eq!(names(Some(FreightMode::FclSea)), ["MAEU"]);
        assert_eq!(names(Some(FreightMode::Road)).len(), 3);
        assert_eq!(names(None).len(), 3);
    }

    #[test]
    fn ports_narrow_by_freight_mode() {
        let ports: Vec<Port> = serde_json::from_value(json!([
            {"port_id": 1, "port_name": "Changi", "port_code": "SIN", "type": "AIRPORT"},
            {"port_id": 2, "port_name": "Singapore", "port_code": "SGSIN", "type": "PORT"},
            {"port_id": 3, "port_name": "Woodlands", "port_code": "SGWDL"}
        ]))
        .unwrap();
        let codes = |mode| -> Vec<String> {
            ports_for_mode(&ports, mode)
                .into_iter()
                .map(|p| p.port_code)
                .collect()
        };
        assert_eq!(codes(Some(FreightMode::Air)), ["SIN"]);
        assert_eq!(codes(Some(FreightMode::FclSea)), ["SGSIN"]);
        assert_eq!(codes(Some(FreightMode::LclSea)), ["SGSIN"]);
        assert_eq!(codes(Some(FreightMode::Rail)).len(), 3);
        assert_eq!(codes(None).len(), 3);
        assert_eq!(ports[0].to_option().kind(), Some("Airport"));
        assert_eq!(ports[2].to_option().field("type"), None);
    }

    #[test]
    fn builtin_modes_and_rows() {
        let modes = TransportMode::builtin();
        let ids: Vec<_> = modes.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["airways", "seaways", "roadways", "railways"]);
        let row = ModeRow::from_mode(&modes[1]);
        assert_eq!(row.code, "SEAWAYS");
        assert_eq!(row.cell("description"), "Seaways transportation mode");
        assert_eq!(row.cell("is_active"), "Active");
        assert_eq!(row.cell("associated_carriers"), "None");
    }

    #[test]
    fn mode_row_cell_fallbacks() {
        let mut row = ModeRow::from_mode(&TransportMode::new("roadways", "Roadways"))
            .with_carriers(["DHL".to_string(), "FedEx".to_string()]);
        row.description = Some(String::new());
        row.is_active = false;
        assert_eq!(row.cell("description"), "No description");
        assert_eq!(row.cell("is_active"), "Inactive");
        assert_eq!(row.cell("associated_carriers"), "DHL, FedEx");
    }

    #[test]
    fn mode_option_label_uses_code_when_present() {
        let mut mode = TransportMode::new(7.to_string(), "Sea Freight");
        assert_eq!(mode.to_option().name, "Sea Freight");
        mode.code = Some("SEA".into());
        let opt = mode.to_option();
        assert_eq!(opt.name, "Sea Freight (SEA)");
        assert_eq!(opt.id, "7");
    }

    #[test]
    fn user_label_and_camel_case_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 5, "firstName": "Ana", "lastName": "Ng", "email": "ana@fwd.io"
        }))
        .unwrap();
        assert_eq!(user.to_option().name, "Ana Ng (ana@fwd.io)");
    }

    #[test]
    fn normalize_typed_records_dedups() {
        let ports = vec![
            Port {
                port_id: "1".into(),
                port_name: "Singapore".into(),
                port_code: "SGSIN".into(),
                country: Some("SG".into()),
                port_type: Some(PortKind::Port),
            },
            Port {
                port_id: "1".into(),
                port_name: "Singapore again".into(),
                port_code: "SGSIN".into(),
                country: None,
                port_type: None,
            },
        ];
        let options = normalize(&ports);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].field("country"), Some("SG"));
    }
}
