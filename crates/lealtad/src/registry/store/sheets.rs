//! Client for the spreadsheet-backed web endpoint.
//!
//! The endpoint is a single URL taking an `action` query parameter; reads are
//! GETs, writes are POSTs with a JSON body sent as `text/plain` (the Apps
//! Script contract). Row decoding tolerates the sheet's uppercase header
//! variants, comma-joined law lists, and `SI`/`NO` flags.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use serde::de::Deserializer;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use super::{InfractionSubmission, RecordStore, StoreError};
use crate::registry::domain::{
    Area, InfractionRecord, InspectionDraft, InspectionRecord, NotificationDraft,
    NotificationKind, NotificationRecord, RecordId, TaxId,
};

/// Client for the record spreadsheet endpoint.
pub struct SheetsStore {
    client: reqwest::Client,
    base_url: String,
}

enum Method {
    Get,
    Post(Value),
}

impl SheetsStore {
    /// `base_url` is the deployed script URL, no query string.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn request(&self, action: &str, method: Method) -> Result<Value, StoreError> {
        // Cache-busting timestamp; the script endpoint otherwise serves
        // stale reads.
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let url = format!("{}?action={}&_t={}", self.base_url, action, stamp);

        info!(action, "record store request");
        let request = match method {
            Method::Get => self.client.get(&url),
            Method::Post(body) => self
                .client
                .post(&url)
                .header(CONTENT_TYPE, "text/plain;charset=utf-8")
                .body(body.to_string()),
        };

        let data: Value = request.send().await?.json().await?;
        if let Some(error) = data.get("error").filter(|e| !e.is_null()) {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(StoreError::Remote { message });
        }
        Ok(data)
    }

    fn rows<R: for<'de> Deserialize<'de>>(data: Value) -> Result<Vec<R>, StoreError> {
        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl RecordStore for SheetsStore {
    async fn notifications(&self) -> Result<Vec<NotificationRecord>, StoreError> {
        let rows: Vec<NotificationRow> = Self::rows(self.request("getNotifications", Method::Get).await?)?;
        Ok(rows.into_iter().filter_map(NotificationRow::into_domain).collect())
    }

    async fn save_notification(
        &self,
        draft: NotificationDraft,
    ) -> Result<NotificationRecord, StoreError> {
        let data = self
            .request("saveNotification", Method::Post(notification_draft_body(&draft)))
            .await?;
        let row: NotificationRow = serde_json::from_value(data)?;
        row.into_domain().ok_or_else(|| StoreError::Remote {
            message: "server returned an unreadable notification row".to_string(),
        })
    }

    async fn update_notification(&self, record: NotificationRecord) -> Result<(), StoreError> {
        let data = self
            .request(
                "updateNotification",
                Method::Post(notification_update_body(&record)),
            )
            .await?;
        // The script replies `{ success: false }` when the row was not found.
        if data.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(StoreError::Remote {
                message: "server could not confirm the update".to_string(),
            });
        }
        Ok(())
    }

    async fn delete_notification(&self, id: RecordId) -> Result<(), StoreError> {
        self.request("deleteNotification", Method::Post(json!({ "id": id.0 })))
            .await?;
        Ok(())
    }

    async fn infractions(&self) -> Result<Vec<InfractionRecord>, StoreError> {
        let rows: Vec<InfractionRow> = Self::rows(self.request("getInfractions", Method::Get).await?)?;
        Ok(rows.into_iter().filter_map(InfractionRow::into_domain).collect())
    }

    async fn save_infraction(
        &self,
        submission: InfractionSubmission,
    ) -> Result<InfractionRecord, StoreError> {
        let data = self
            .request("saveInfraction", Method::Post(infraction_body(&submission)))
            .await?;
        let row: InfractionRow = serde_json::from_value(data)?;
        row.into_domain().ok_or_else(|| StoreError::Remote {
            message: "server returned an unreadable infraction row".to_string(),
        })
    }

    async fn inspections(&self) -> Result<Vec<InspectionRecord>, StoreError> {
        let rows: Vec<InspectionRow> = Self::rows(self.request("getInspections", Method::Get).await?)?;
        Ok(rows.into_iter().map(InspectionRow::into_domain).collect())
    }

    async fn save_inspection(
        &self,
        draft: InspectionDraft,
    ) -> Result<InspectionRecord, StoreError> {
        let data = self
            .request("saveInspection", Method::Post(inspection_body(&draft)))
            .await?;
        let row: InspectionRow = serde_json::from_value(data)?;
        Ok(row.into_domain())
    }

    async fn companies(&self) -> Result<Vec<String>, StoreError> {
        let data = self.request("getCompanies", Method::Get).await?;
        let names = data
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(names)
    }
}

// ---------------------------------------------------------------------------
// Wire rows
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NotificationRow {
    #[serde(default, alias = "ID", deserialize_with = "de_number")]
    id: u32,
    #[serde(
        default,
        rename = "fechaIngreso",
        alias = "FECHA INGRESO",
        deserialize_with = "de_opt_date"
    )]
    entry_date: Option<NaiveDate>,
    #[serde(default, rename = "ref", alias = "REF")]
    reference: String,
    #[serde(default, alias = "ANIO", deserialize_with = "de_number")]
    year: u32,
    #[serde(default, alias = "AREA")]
    area: String,
    #[serde(default, rename = "departamento", alias = "DEPARTAMENTO")]
    department: String,
    #[serde(default, rename = "tipo", alias = "TIPO")]
    kind: String,
    #[serde(default, rename = "dirigidoA", alias = "DIRIGIDO A")]
    company: String,
    #[serde(default, rename = "contra", alias = "CONTRA")]
    against: String,
    #[serde(
        default,
        rename = "fechaAudiencia",
        alias = "FECHA AUDIENCIA",
        deserialize_with = "de_opt_date"
    )]
    hearing_date: Option<NaiveDate>,
    #[serde(default, rename = "notificador", alias = "NOTIFICADOR")]
    notifier: String,
    #[serde(
        default,
        rename = "notificado",
        alias = "NOTIFICADO",
        alias = "FECHA NOTIFICACION",
        deserialize_with = "de_opt_date"
    )]
    notified_on: Option<NaiveDate>,
}

impl NotificationRow {
    /// Rows with an unrecognized notification kind are dropped rather than
    /// failing the whole fetch.
    fn into_domain(self) -> Option<NotificationRecord> {
        let Some(kind) = NotificationKind::from_label(&self.kind) else {
            warn!(id = self.id, kind = %self.kind, "dropping notification row with unknown kind");
            return None;
        };
        Some(NotificationRecord {
            id: RecordId(self.id),
            entry_date: self.entry_date.unwrap_or_default(),
            reference: self.reference,
            year: self.year as i32,
            area: parse_area(&self.area),
            department: self.department,
            kind,
            company: self.company,
            against: self.against,
            hearing_date: self.hearing_date,
            notifier: self.notifier,
            notified_on: self.notified_on,
        })
    }
}

#[derive(Debug, Deserialize)]
struct InfractionRow {
    #[serde(default, alias = "ID", deserialize_with = "de_number")]
    id: u32,
    #[serde(default, rename = "numeroDigital", alias = "NUMERO DIGITAL")]
    digital_number: String,
    #[serde(
        default,
        rename = "fechaIngreso",
        alias = "FECHA INGRESO",
        deserialize_with = "de_opt_date"
    )]
    entry_date: Option<NaiveDate>,
    #[serde(default, rename = "ref", alias = "REF")]
    act_number: String,
    #[serde(
        default,
        rename = "fechaActa",
        alias = "FECHA ACTA",
        deserialize_with = "de_opt_date"
    )]
    act_date: Option<NaiveDate>,
    #[serde(default, rename = "inspector1", alias = "INSPECTOR 1")]
    inspector: String,
    #[serde(default, rename = "inspector2", alias = "INSPECTOR 2")]
    second_inspector: String,
    #[serde(default, rename = "localidad", alias = "LOCALIDAD")]
    locality: String,
    #[serde(default, rename = "razonSocial", alias = "RAZON SOCIAL")]
    legal_name: String,
    #[serde(default, rename = "fantasia", alias = "FANTASIA")]
    trade_name: String,
    #[serde(default, rename = "cuil", alias = "CUIL")]
    tax_id: String,
    #[serde(default, rename = "leyes", alias = "LEYES", deserialize_with = "de_laws")]
    laws: Vec<String>,
    #[serde(default, rename = "vencido", alias = "VENCIDO", deserialize_with = "de_number")]
    expired_products: u32,
    #[serde(default, rename = "decomiso", alias = "DECOMISO", deserialize_with = "de_number")]
    seized_products: u32,
    #[serde(
        default,
        rename = "diasDescargo",
        alias = "DIAS DESCARGO",
        deserialize_with = "de_number"
    )]
    rebuttal_days: u32,
    #[serde(
        default,
        rename = "fechaLimiteDescargo",
        alias = "FECHA LIMITE DESCARGO",
        deserialize_with = "de_opt_date"
    )]
    rebuttal_due: Option<NaiveDate>,
    #[serde(default, rename = "estado", alias = "ESTADO")]
    status: String,
    #[serde(
        default,
        rename = "presentoDescargo",
        alias = "PRESENTO DESCARGO",
        deserialize_with = "de_flag"
    )]
    rebuttal_filed: bool,
    #[serde(
        default,
        rename = "fechaDescargo",
        alias = "FECHA DESCARGO",
        deserialize_with = "de_opt_date"
    )]
    rebuttal_date: Option<NaiveDate>,
}

impl InfractionRow {
    /// Rows with an unparseable tax id are dropped; acts written through this
    /// service are always validated before they reach the sheet.
    fn into_domain(self) -> Option<InfractionRecord> {
        let tax_id = match TaxId::new(self.tax_id) {
            Ok(tax_id) => tax_id,
            Err(err) => {
                warn!(id = self.id, %err, "dropping infraction row");
                return None;
            }
        };
        Some(InfractionRecord {
            id: RecordId(self.id),
            digital_number: self.digital_number,
            entry_date: self.entry_date.unwrap_or_default(),
            act_number: self.act_number,
            act_date: self.act_date,
            inspector: self.inspector,
            second_inspector: non_empty(self.second_inspector),
            locality: self.locality,
            legal_name: self.legal_name,
            trade_name: self.trade_name,
            tax_id,
            laws: self.laws,
            expired_products: self.expired_products,
            seized_products: self.seized_products,
            rebuttal_days: self.rebuttal_days.min(u8::MAX as u32) as u8,
            rebuttal_due: self.rebuttal_due.unwrap_or_default(),
            status: self.status,
            rebuttal_filed: self.rebuttal_filed,
            rebuttal_date: self.rebuttal_date,
        })
    }
}

#[derive(Debug, Deserialize)]
struct InspectionRow {
    #[serde(default, alias = "ID", deserialize_with = "de_number")]
    id: u32,
    #[serde(default, rename = "fecha", alias = "FECHA", deserialize_with = "de_opt_date")]
    date: Option<NaiveDate>,
    #[serde(default, rename = "ref", alias = "REF")]
    act_number: String,
    #[serde(default, rename = "inspector1", alias = "INSPECTOR 1")]
    inspector: String,
    #[serde(default, rename = "inspector2", alias = "INSPECTOR 2")]
    second_inspector: String,
    #[serde(default, rename = "localidad", alias = "LOCALIDAD")]
    locality: String,
    #[serde(default, rename = "razonSocial", alias = "RAZON SOCIAL")]
    legal_name: String,
    #[serde(default, rename = "fantasia", alias = "FANTASIA")]
    trade_name: String,
    #[serde(default, rename = "cuil", alias = "CUIL")]
    tax_id: String,
    #[serde(default, rename = "leyes", alias = "LEYES", deserialize_with = "de_laws")]
    laws: Vec<String>,
    // Legacy sheets carry the flag as a sentinel column.
    #[serde(
        default,
        rename = "esActuacionDeOficio",
        alias = "DE OFICIO",
        alias = "ES ACTUACION DE OFICIO",
        deserialize_with = "de_flag"
    )]
    ex_officio: bool,
}

impl InspectionRow {
    fn into_domain(self) -> InspectionRecord {
        InspectionRecord {
            id: RecordId(self.id),
            date: self.date.unwrap_or_default(),
            act_number: self.act_number,
            inspector: self.inspector,
            second_inspector: non_empty(self.second_inspector),
            locality: self.locality,
            legal_name: self.legal_name,
            trade_name: self.trade_name,
            tax_id: self.tax_id,
            laws: self.laws,
            ex_officio: self.ex_officio,
        }
    }
}

fn parse_area(label: &str) -> Area {
    match label.trim() {
        "DEFENSA DEL CONSUMIDOR" => Area::ConsumerDefense,
        "DEPARTAMENTO JURIDICO" => Area::Legal,
        "LEALTAD COMERCIAL" => Area::CommercialLoyalty,
        _ => Area::Other,
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Write payloads (script-side column names)
// ---------------------------------------------------------------------------

fn opt_date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn notification_draft_body(draft: &NotificationDraft) -> Value {
    json!({
        "ref": draft.reference,
        "anio": draft.year,
        "area": draft.area.label(),
        "departamento": draft.department,
        "tipo": draft.kind.label(),
        "dirigidoA": draft.company,
        "contra": draft.against,
        "fechaAudiencia": opt_date(draft.hearing_date),
        "notificador": draft.notifier,
        "notificado": opt_date(draft.notified_on),
    })
}

/// Updates duplicate the uppercase column names so older script deployments
/// keep matching rows.
fn notification_update_body(record: &NotificationRecord) -> Value {
    json!({
        "id": record.id.0,
        "fechaIngreso": record.entry_date.to_string(),
        "ref": record.reference,
        "anio": record.year,
        "area": record.area.label(),
        "departamento": record.department,
        "tipo": record.kind.label(),
        "dirigidoA": record.company,
        "contra": record.against,
        "fechaAudiencia": opt_date(record.hearing_date),
        "notificador": record.notifier,
        "notificado": opt_date(record.notified_on),
        "ID": record.id.0,
        "REF": record.reference,
        "DIRIGIDO A": record.company,
        "FECHA AUDIENCIA": opt_date(record.hearing_date),
        "NOTIFICADOR": record.notifier,
        "NOTIFICADO": opt_date(record.notified_on),
        "FECHA NOTIFICACION": opt_date(record.notified_on),
    })
}

fn infraction_body(submission: &InfractionSubmission) -> Value {
    let draft = &submission.draft;
    json!({
        "numeroDigital": draft.digital_number,
        "ref": draft.act_number,
        "fechaActa": opt_date(draft.act_date),
        "inspector1": draft.inspector,
        "inspector2": draft.second_inspector.clone().unwrap_or_default(),
        "localidad": draft.locality,
        "razonSocial": draft.legal_name,
        "fantasia": draft.trade_name,
        "cuil": submission.tax_id.as_str(),
        "leyes": draft.laws,
        "vencido": draft.expired_products,
        "decomiso": draft.seized_products,
        "diasDescargo": submission.term.business_days,
        "fechaLimiteDescargo": submission.term.due_date.to_string(),
        "estado": draft.status,
        "presentoDescargo": draft.rebuttal_filed,
        "fechaDescargo": opt_date(draft.rebuttal_date),
    })
}

fn inspection_body(draft: &InspectionDraft) -> Value {
    json!({
        "fecha": draft.date.to_string(),
        "ref": draft.act_number,
        "inspector1": draft.inspector,
        "inspector2": draft.second_inspector.clone().unwrap_or_default(),
        "localidad": draft.locality,
        "razonSocial": draft.legal_name,
        "fantasia": draft.trade_name,
        "cuil": draft.tax_id,
        "leyes": draft.laws,
        "esActuacionDeOficio": draft.ex_officio,
    })
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

/// Accepts numbers, numeric strings, empty strings, and null.
fn de_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default() as u32,
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

/// Accepts `YYYY-MM-DD`, full ISO datetimes (the sheet exports those for
/// date cells), empty strings, and null.
fn de_opt_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_wire_date))
}

fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Accepts a JSON array of labels or the sheet's comma-joined string.
fn de_laws<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Joined(String),
        Listed(Vec<String>),
    }

    let value = Option::<Raw>::deserialize(deserializer)?;
    Ok(match value {
        Some(Raw::Listed(laws)) => laws,
        Some(Raw::Joined(joined)) => joined
            .split(',')
            .map(|law| law.trim().to_string())
            .filter(|law| !law.is_empty())
            .collect(),
        None => Vec::new(),
    })
}

/// Accepts booleans and the sheet's `SI`/`NO` strings.
fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("si"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_row_reads_uppercase_headers() {
        let row: NotificationRow = serde_json::from_value(json!({
            "ID": "7",
            "FECHA INGRESO": "2025-07-01T00:00:00.000Z",
            "REF": "EXP-007",
            "ANIO": 2025,
            "AREA": "LEALTAD COMERCIAL",
            "DEPARTAMENTO": "Capital",
            "TIPO": "AUDIENCIA",
            "DIRIGIDO A": "Supermercado X",
            "CONTRA": "Juan Perez",
            "FECHA AUDIENCIA": "",
            "NOTIFICADOR": "Ponce",
            "FECHA NOTIFICACION": "2025-07-02",
        }))
        .expect("row decodes");

        let record = row.into_domain().expect("known kind");
        assert_eq!(record.id, RecordId(7));
        assert_eq!(
            record.entry_date,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
        assert_eq!(record.kind, NotificationKind::Audience);
        assert_eq!(record.area, Area::CommercialLoyalty);
        assert!(record.hearing_date.is_none());
        assert_eq!(
            record.notified_on,
            NaiveDate::from_ymd_opt(2025, 7, 2)
        );
    }

    #[test]
    fn notification_row_with_unknown_kind_is_dropped() {
        let row: NotificationRow = serde_json::from_value(json!({
            "id": 1,
            "tipo": "CITACION",
        }))
        .expect("row decodes");
        assert!(row.into_domain().is_none());
    }

    #[test]
    fn infraction_row_splits_joined_laws_and_lenient_numbers() {
        let row: InfractionRow = serde_json::from_value(json!({
            "id": 3,
            "numeroDigital": "DIG-3",
            "fechaIngreso": "2025-07-01",
            "ref": "12345",
            "inspector1": "Nieva",
            "inspector2": " ",
            "localidad": "Capital",
            "razonSocial": "Comercial SRL",
            "fantasia": "La Esquina",
            "cuil": "20123456789",
            "leyes": "LEY 24240, ART. N° 42 CN",
            "VENCIDO": "4",
            "decomiso": 2,
            "DIAS DESCARGO": "10",
            "fechaLimiteDescargo": "2025-07-15",
            "estado": "Pendiente",
            "presentoDescargo": "SI",
        }))
        .expect("row decodes");

        let record = row.into_domain().expect("valid tax id");
        assert_eq!(record.laws, vec!["LEY 24240", "ART. N° 42 CN"]);
        assert_eq!(record.expired_products, 4);
        assert_eq!(record.seized_products, 2);
        assert_eq!(record.rebuttal_days, 10);
        assert!(record.rebuttal_filed);
        assert!(record.second_inspector.is_none());
    }

    #[test]
    fn infraction_row_with_bad_tax_id_is_dropped() {
        let row: InfractionRow = serde_json::from_value(json!({
            "id": 4,
            "cuil": "garbage",
        }))
        .expect("row decodes");
        assert!(row.into_domain().is_none());
    }

    #[test]
    fn inspection_row_reads_sentinel_flag_column() {
        let row: InspectionRow = serde_json::from_value(json!({
            "id": 9,
            "fecha": "2025-06-10",
            "ref": "556",
            "inspector1": "Molina",
            "inspector2": "",
            "localidad": "Belén",
            "razonSocial": "Almacén Y",
            "fantasia": "",
            "cuil": "",
            "leyes": ["LEY 24240"],
            "DE OFICIO": "SI",
        }))
        .expect("row decodes");

        let record = row.into_domain();
        assert!(record.ex_officio);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
    }

    #[test]
    fn inspection_flag_defaults_to_false() {
        let row: InspectionRow =
            serde_json::from_value(json!({ "id": 1, "fecha": "2025-06-10" })).expect("row decodes");
        assert!(!row.into_domain().ex_officio);
    }

    #[test]
    fn update_body_duplicates_uppercase_columns() {
        let record = NotificationRecord {
            id: RecordId(5),
            entry_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            reference: "EXP-005".to_string(),
            year: 2025,
            area: Area::ConsumerDefense,
            department: "Capital".to_string(),
            kind: NotificationKind::Transfer,
            company: "Supermercado X".to_string(),
            against: "Juan Perez".to_string(),
            hearing_date: None,
            notifier: "Ponce".to_string(),
            notified_on: NaiveDate::from_ymd_opt(2025, 7, 3),
        };

        let body = notification_update_body(&record);
        assert_eq!(body["ID"], json!(5));
        assert_eq!(body["NOTIFICADO"], json!("2025-07-03"));
        assert_eq!(body["FECHA NOTIFICACION"], json!("2025-07-03"));
        assert_eq!(body["DIRIGIDO A"], json!("Supermercado X"));
        assert_eq!(body["tipo"], json!("TRASLADO"));
    }
}
