//! Wire models for both sides of the gateway.
//!
//! The *source* protocol is the Ferma cloud-register API that clients speak to
//! us; the *target* protocol is eKomKassa (Atol v5) that we speak upstream.
//! Inbound Ferma models are lenient (every field optional, defaults applied by
//! the engine). Upstream reply models are equally lenient because eKomKassa
//! omits fields freely depending on document state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::tables::{PaymentMethod, TaxationSystem, VatType};

/// Field-level deserializers that turn a type mismatch into `None` instead
/// of failing the enclosing struct. Use with `#[serde(default, deserialize_with = ..)]`.
pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    /// A string, or a number rendered as text. Ids and INNs arrive both ways.
    pub fn text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// An integer code, given as a number or as numeric text.
    pub fn integer<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn object<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(de)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }
}

// ============================================================================
// Source Request Models (Ferma → gateway)
// ============================================================================

/// Body of `POST /auth`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

/// Query of `GET /status`.
#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    #[serde(rename = "AuthToken")]
    pub auth_token: Option<String>,
    pub uuid: Option<String>,
    pub group_code: Option<String>,
}

/// The structured Ferma `Request` object of a receipt submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FermaRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub inn: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "lenient::string")]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub invoice_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub callback_url: Option<String>,
    pub customer_receipt: Option<CustomerReceipt>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerReceipt {
    #[serde(default, deserialize_with = "lenient::string")]
    pub taxation_system: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    pub items: Option<Vec<FermaItem>>,
    pub cashless_payments: Option<Vec<CashlessPayment>>,
    pub payment_agent_info: Option<PaymentAgentInfo>,
}

/// A Ferma receipt line. Amount is passed through as-is; it is not
/// reconciled against price × quantity. Money fields stay strict; a
/// mistyped code field falls back to its table default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FermaItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub label: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub vat: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub payment_method: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub measure: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CashlessPayment {
    pub payment_sum: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentAgentInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub agent_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub payment_agent_operation: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub payment_agent_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub transfer_agent_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub transfer_agent_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub transfer_agent_address: Option<String>,
    #[serde(rename = "TransferAgentINN", default, deserialize_with = "lenient::text")]
    pub transfer_agent_inn: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub supplier_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub supplier_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub supplier_inn: Option<String>,
}

// ============================================================================
// Target Request Models (gateway → eKomKassa)
// ============================================================================

/// Body of `POST /getToken`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtolTokenRequest {
    pub login: String,
    pub pass: String,
}

/// A fiscal document submitted to `POST /{group_code}/{operation}`.
#[derive(Debug, Clone, Serialize)]
pub struct AtolDocument {
    pub external_id: String,
    #[serde(flatten)]
    pub body: AtolDocumentBody,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AtolDocumentBody {
    Receipt(ReceiptBody),
    Correction(AtolCorrection),
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReceiptBody {
    Structured(AtolReceipt),
    /// Simple-format callers supply the receipt object already in Atol shape.
    Passthrough(Value),
}

#[derive(Debug, Clone, Serialize)]
pub struct AtolReceipt {
    pub client: AtolClient,
    pub company: AtolCompany,
    pub items: Vec<AtolItem>,
    pub payments: Vec<AtolPayment>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_info: Option<AtolAgentInfo>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AtolClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtolCompany {
    pub email: String,
    pub sno: TaxationSystem,
    pub inn: String,
    pub payment_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtolItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_object: u8,
    pub measure: u16,
    pub vat: AtolVat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_info: Option<AtolSupplierInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtolVat {
    #[serde(rename = "type")]
    pub vat_type: VatType,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtolPayment {
    #[serde(rename = "type")]
    pub payment_type: u8,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtolCorrection {
    pub company: AtolCompany,
    pub correction_info: AtolCorrectionInfo,
    pub payments: Vec<AtolPayment>,
    pub vats: Vec<AtolVatSum>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtolCorrectionInfo {
    #[serde(rename = "type")]
    pub correction_type: String,
    pub base_date: String,
    pub base_number: String,
    pub base_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtolVatSum {
    #[serde(rename = "type")]
    pub vat_type: VatType,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtolAgentInfo {
    #[serde(rename = "type")]
    pub agent_type: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paying_agent: Option<AtolPayingAgent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_payments_operator: Option<AtolPhones>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money_transfer_operator: Option<AtolMoneyTransferOperator>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AtolPayingAgent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AtolPhones {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AtolMoneyTransferOperator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inn: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AtolSupplierInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inn: Option<String>,
}

// ============================================================================
// Target Reply Models (eKomKassa → gateway)
// ============================================================================

/// Error object embedded in eKomKassa replies. `code` is numeric in v5 but
/// has been seen as a string, so it is kept untyped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtolError {
    pub code: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtolTokenReply {
    #[serde(default, deserialize_with = "lenient::string")]
    pub token: Option<String>,
    pub code: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtolDocumentReply {
    #[serde(default, deserialize_with = "lenient::text")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub external_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    pub code: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtolReport {
    #[serde(default, deserialize_with = "lenient::text")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    pub code: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub payload: Option<AtolReportPayload>,
}

/// Fiscal attributes of a registered document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtolReportPayload {
    pub device_sn: Option<Value>,
    pub ecr_registration_number: Option<Value>,
    pub fn_number: Option<Value>,
    pub fiscal_document_number: Option<Value>,
    pub fiscal_document_attribute: Option<Value>,
    pub shift_number: Option<Value>,
    pub fiscal_receipt_number: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub receipt_datetime: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ofd_receipt_url: Option<String>,
}

// ============================================================================
// Source Reply Models (gateway → Ferma client)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReplyStatus {
    Success,
    Failed,
}

/// The `{Status, Data, Error}` envelope every Ferma reply uses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FermaReply<T: Serialize> {
    pub status: ReplyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FermaError>,
}

impl<T: Serialize> FermaReply<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ReplyStatus::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(data: Option<T>, error: FermaError) -> Self {
        Self {
            status: ReplyStatus::Failed,
            data,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FermaError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthData {
    pub auth_token: String,
    pub expiration_date_utc: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReceiptStatus {
    Pending,
    Ready,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiptData {
    pub receipt_id: Option<String>,
    pub status: ReceiptStatus,
    pub status_code: i64,
    pub status_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FermaError>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusData {
    pub status_code: i32,
    pub status_name: String,
    pub status_message: String,
    pub modified_date_utc: Option<String>,
    pub receipt_date_utc: Option<String>,
    pub device: Option<DeviceInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceInfo {
    #[serde(rename = "DeviceId")]
    pub device_id: Option<String>,
    #[serde(rename = "RNM")]
    pub rnm: Option<String>,
    #[serde(rename = "ZN")]
    pub zn: Option<String>,
    #[serde(rename = "FN")]
    pub fn_number: Option<String>,
    #[serde(rename = "FDN")]
    pub fdn: Option<String>,
    #[serde(rename = "FPD")]
    pub fpd: Option<String>,
    #[serde(rename = "ShiftNumber")]
    pub shift_number: Option<i64>,
    #[serde(rename = "ReceiptNumInShift")]
    pub receipt_num_in_shift: Option<i64>,
    #[serde(rename = "OfdReceiptUrl")]
    pub ofd_receipt_url: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}
