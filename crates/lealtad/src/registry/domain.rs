use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::deadline::RebuttalTerm;

/// Numeric identifier assigned by the record store (max existing id + 1).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RecordId(pub u32);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Office area a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Area {
    #[serde(rename = "DEFENSA DEL CONSUMIDOR")]
    ConsumerDefense,
    #[serde(rename = "DEPARTAMENTO JURIDICO")]
    Legal,
    #[serde(rename = "LEALTAD COMERCIAL")]
    CommercialLoyalty,
    #[serde(rename = "OTROS")]
    Other,
}

impl Area {
    pub const fn label(self) -> &'static str {
        match self {
            Area::ConsumerDefense => "DEFENSA DEL CONSUMIDOR",
            Area::Legal => "DEPARTAMENTO JURIDICO",
            Area::CommercialLoyalty => "LEALTAD COMERCIAL",
            Area::Other => "OTROS",
        }
    }
}

/// Kind of notification issued by the office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "AUDIENCIA")]
    Audience,
    #[serde(rename = "AUTO DE IMPUTACIÓN")]
    Imputation,
    #[serde(rename = "PREVENTIVA")]
    Preventive,
    #[serde(rename = "TRASLADO")]
    Transfer,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::Audience => "AUDIENCIA",
            NotificationKind::Imputation => "AUTO DE IMPUTACIÓN",
            NotificationKind::Preventive => "PREVENTIVA",
            NotificationKind::Transfer => "TRASLADO",
        }
    }

    pub const fn ordered() -> [NotificationKind; 4] {
        [
            NotificationKind::Audience,
            NotificationKind::Imputation,
            NotificationKind::Preventive,
            NotificationKind::Transfer,
        ]
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label() == label.trim())
    }
}

/// Provincial departments served by the office.
pub const DEPARTMENTS: [&str; 16] = [
    "Capital",
    "Valle Viejo",
    "Fray Mamerto Esquiú",
    "Andalgalá",
    "Belén",
    "Santa María",
    "Tinogasta",
    "Pomán",
    "Capayán",
    "La Paz",
    "Paclín",
    "El Alto",
    "Ancasti",
    "Santa Rosa",
    "Antofagasta de la Sierra",
    "Recreo",
];

/// Staff roster shared by the notifier and inspector form fields.
pub const INSPECTORS: [&str; 8] = [
    "Patato",
    "Nieva",
    "Ahumada",
    "Rodriguez",
    "Molina",
    "Ponce",
    "Inspectores",
    "Reartes",
];

/// Built-in law labels offered on the infraction and inspection forms. The
/// effective catalog also includes any label already present on stored
/// records.
pub const LAW_OPTIONS: [&str; 10] = [
    "ART. N° 5 LEY 24240",
    "ART. N° 42 CN",
    "ART. 5 LEY 24240 + ART. 42 CN",
    "ART. 1 RES E-51",
    "ART. 11 DNU 274/19",
    "ART. 75 DNU 274/19",
    "ART. 2 INC C RES 4/2025",
    "ART. 4 LEY 24240",
    "ART. 4, 7, 8 BIS LEY 24240",
    "LEY 24240",
];

/// Validation failures surfaced before anything reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("required field missing: {field}")]
    MissingField { field: &'static str },
    #[error("tax id must be exactly 11 numeric digits, got '{value}'")]
    InvalidTaxId { value: String },
}

/// 11-digit CUIL/CUIT tax identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxId(String);

impl TaxId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() == 11 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ValidationError::InvalidTaxId { value })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaxId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaxId> for String {
    fn from(value: TaxId) -> Self {
        value.0
    }
}

impl std::fmt::Display for TaxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A notification registered against a company or person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: RecordId,
    pub entry_date: NaiveDate,
    pub reference: String,
    pub year: i32,
    pub area: Area,
    pub department: String,
    pub kind: NotificationKind,
    pub company: String,
    pub against: String,
    pub hearing_date: Option<NaiveDate>,
    pub notifier: String,
    pub notified_on: Option<NaiveDate>,
}

/// Form payload for a new notification; the store assigns id and entry date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub reference: String,
    pub year: i32,
    pub area: Area,
    pub department: String,
    pub kind: NotificationKind,
    pub company: String,
    pub against: String,
    #[serde(default)]
    pub hearing_date: Option<NaiveDate>,
    pub notifier: String,
    #[serde(default)]
    pub notified_on: Option<NaiveDate>,
}

impl NotificationDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.reference, "reference")?;
        require(&self.company, "company")?;
        require(&self.against, "against")?;
        Ok(())
    }

    pub fn into_record(self, id: RecordId, entry_date: NaiveDate) -> NotificationRecord {
        NotificationRecord {
            id,
            entry_date,
            reference: self.reference,
            year: self.year,
            area: self.area,
            department: self.department,
            kind: self.kind,
            company: self.company,
            against: self.against,
            hearing_date: self.hearing_date,
            notifier: self.notifier,
            notified_on: self.notified_on,
        }
    }
}

/// A formal infraction act, including the computed rebuttal deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfractionRecord {
    pub id: RecordId,
    pub digital_number: String,
    pub entry_date: NaiveDate,
    pub act_number: String,
    pub act_date: Option<NaiveDate>,
    pub inspector: String,
    pub second_inspector: Option<String>,
    pub locality: String,
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: TaxId,
    pub laws: Vec<String>,
    pub expired_products: u32,
    pub seized_products: u32,
    pub rebuttal_days: u8,
    pub rebuttal_due: NaiveDate,
    pub status: String,
    pub rebuttal_filed: bool,
    pub rebuttal_date: Option<NaiveDate>,
}

fn default_status() -> String {
    "Pendiente".to_string()
}

/// Form payload for a new infraction act. The rebuttal term is computed by
/// the service, never supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfractionDraft {
    pub digital_number: String,
    #[serde(default)]
    pub act_number: String,
    #[serde(default)]
    pub act_date: Option<NaiveDate>,
    pub inspector: String,
    #[serde(default)]
    pub second_inspector: Option<String>,
    pub locality: String,
    pub legal_name: String,
    #[serde(default)]
    pub trade_name: String,
    pub tax_id: String,
    #[serde(default)]
    pub laws: Vec<String>,
    #[serde(default)]
    pub expired_products: u32,
    #[serde(default)]
    pub seized_products: u32,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub rebuttal_filed: bool,
    #[serde(default)]
    pub rebuttal_date: Option<NaiveDate>,
}

impl InfractionDraft {
    /// Required-field and tax-id checks; returns the parsed tax id so the
    /// caller does not revalidate.
    pub fn validate(&self) -> Result<TaxId, ValidationError> {
        require(&self.digital_number, "digital_number")?;
        require(&self.legal_name, "legal_name")?;
        TaxId::new(self.tax_id.clone())
    }

    pub fn into_record(
        self,
        id: RecordId,
        entry_date: NaiveDate,
        tax_id: TaxId,
        term: RebuttalTerm,
    ) -> InfractionRecord {
        InfractionRecord {
            id,
            digital_number: self.digital_number,
            entry_date,
            act_number: self.act_number,
            act_date: self.act_date,
            inspector: self.inspector,
            second_inspector: self.second_inspector,
            locality: self.locality,
            legal_name: self.legal_name,
            trade_name: self.trade_name,
            tax_id,
            laws: self.laws,
            expired_products: self.expired_products,
            seized_products: self.seized_products,
            rebuttal_days: term.business_days,
            rebuttal_due: term.due_date,
            status: self.status,
            rebuttal_filed: self.rebuttal_filed,
            rebuttal_date: self.rebuttal_date,
        }
    }
}

/// A routine or ex-officio inspection act.
///
/// The explicit `ex_officio` field is authoritative; legacy spreadsheet rows
/// that only carry the sentinel column are normalized at the wire boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    pub act_number: String,
    pub inspector: String,
    pub second_inspector: Option<String>,
    pub locality: String,
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: String,
    pub laws: Vec<String>,
    pub ex_officio: bool,
}

/// Form payload for a new inspection act; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionDraft {
    pub date: NaiveDate,
    #[serde(default)]
    pub act_number: String,
    pub inspector: String,
    #[serde(default)]
    pub second_inspector: Option<String>,
    pub locality: String,
    pub legal_name: String,
    #[serde(default)]
    pub trade_name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub laws: Vec<String>,
    #[serde(default)]
    pub ex_officio: bool,
}

impl InspectionDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.legal_name, "legal_name")?;
        Ok(())
    }

    pub fn into_record(self, id: RecordId) -> InspectionRecord {
        InspectionRecord {
            id,
            date: self.date,
            act_number: self.act_number,
            inspector: self.inspector,
            second_inspector: self.second_inspector,
            locality: self.locality,
            legal_name: self.legal_name,
            trade_name: self.trade_name,
            tax_id: self.tax_id,
            laws: self.laws,
            ex_officio: self.ex_officio,
        }
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> NotificationDraft {
        NotificationDraft {
            reference: "EXP-001".to_string(),
            year: 2025,
            area: Area::CommercialLoyalty,
            department: DEPARTMENTS[0].to_string(),
            kind: NotificationKind::Audience,
            company: "Supermercado X".to_string(),
            against: "Juan Perez".to_string(),
            hearing_date: NaiveDate::from_ymd_opt(2025, 7, 14),
            notifier: INSPECTORS[5].to_string(),
            notified_on: None,
        }
    }

    #[test]
    fn tax_id_accepts_exactly_eleven_digits() {
        assert!(TaxId::new("20123456789").is_ok());
        assert!(matches!(
            TaxId::new("2012345678"),
            Err(ValidationError::InvalidTaxId { .. })
        ));
        assert!(matches!(
            TaxId::new("20-12345678"),
            Err(ValidationError::InvalidTaxId { .. })
        ));
        assert!(matches!(
            TaxId::new("201234567890"),
            Err(ValidationError::InvalidTaxId { .. })
        ));
    }

    #[test]
    fn tax_id_trims_surrounding_whitespace() {
        let id = TaxId::new(" 20123456789 ").expect("valid after trim");
        assert_eq!(id.as_str(), "20123456789");
    }

    #[test]
    fn notification_draft_requires_reference_company_and_against() {
        assert!(draft().validate().is_ok());

        let mut missing = draft();
        missing.reference = "  ".to_string();
        assert_eq!(
            missing.validate(),
            Err(ValidationError::MissingField { field: "reference" })
        );

        let mut missing = draft();
        missing.company.clear();
        assert_eq!(
            missing.validate(),
            Err(ValidationError::MissingField { field: "company" })
        );
    }

    #[test]
    fn kind_labels_round_trip() {
        for kind in NotificationKind::ordered() {
            assert_eq!(NotificationKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(NotificationKind::from_label("DESCONOCIDO"), None);
    }

    #[test]
    fn kind_serializes_to_wire_label() {
        let json = serde_json::to_string(&NotificationKind::Imputation).expect("serializes");
        assert_eq!(json, "\"AUTO DE IMPUTACIÓN\"");
    }

    #[test]
    fn infraction_draft_rejects_malformed_tax_id() {
        let draft = InfractionDraft {
            digital_number: "DIG-77".to_string(),
            act_number: "12345".to_string(),
            act_date: NaiveDate::from_ymd_opt(2025, 7, 7),
            inspector: INSPECTORS[0].to_string(),
            second_inspector: None,
            locality: DEPARTMENTS[0].to_string(),
            legal_name: "Comercial SRL".to_string(),
            trade_name: String::new(),
            tax_id: "123".to_string(),
            laws: vec![LAW_OPTIONS[0].to_string()],
            expired_products: 0,
            seized_products: 0,
            status: "Pendiente".to_string(),
            rebuttal_filed: false,
            rebuttal_date: None,
        };

        assert!(matches!(
            draft.validate(),
            Err(ValidationError::InvalidTaxId { .. })
        ));
    }
}
