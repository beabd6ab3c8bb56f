//! # Response Translator
//!
//! Reshapes raw eKomKassa replies into Ferma replies. Upstream bodies are
//! parsed leniently: a field that is missing or has an unexpected type is
//! treated as absent rather than failing the whole translation.
//!
//! Error normalization: whenever the upstream reply carries an `error`
//! object, or arrives with a non-2xx status, the Ferma reply gets an
//! `Error { Code, Message }` with generic defaults for whatever upstream
//! left out.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::engine::tables::UpstreamStatus;
use crate::models::{
    AtolDocumentReply, AtolError, AtolReport, AtolReportPayload, AtolTokenReply, AuthData,
    DeviceInfo, FermaError, FermaReply, ReceiptData, ReceiptStatus, ReplyStatus, StatusData,
};

pub const AUTH_FAILED_MESSAGE: &str = "Authorization failed";
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown upstream error";

/// Lifetime the gateway advertises for issued tokens. eKomKassa does not
/// report one.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ============================================================================
// Auth
// ============================================================================

/// Success iff upstream returned a non-empty token. Expiry is always
/// `now + 24h`.
pub fn translate_auth_reply(
    http_status: u16,
    body: &Value,
    now: DateTime<Utc>,
) -> FermaReply<AuthData> {
    let reply: AtolTokenReply = lenient(body);

    match reply.token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => FermaReply::success(AuthData {
            auth_token: token.to_string(),
            expiration_date_utc: (now + Duration::hours(TOKEN_LIFETIME_HOURS))
                .format(EXPIRATION_FORMAT)
                .to_string(),
        }),
        None => {
            let error = normalize_error(
                http_status,
                embedded_error(body).as_ref(),
                reply.code.as_ref(),
                reply.text.as_deref(),
                AUTH_FAILED_MESSAGE,
            )
            .unwrap_or_else(|| FermaError {
                code: code_string(reply.code.as_ref()),
                message: non_empty(reply.text.as_deref())
                    .unwrap_or(AUTH_FAILED_MESSAGE)
                    .to_string(),
            });
            FermaReply::failed(None, error)
        }
    }
}

// ============================================================================
// Receipt
// ============================================================================

pub fn translate_receipt_reply(http_status: u16, body: &Value) -> FermaReply<ReceiptData> {
    let reply: AtolDocumentReply = lenient(body);
    let error = normalize_error(
        http_status,
        embedded_error(body).as_ref(),
        reply.code.as_ref(),
        reply.text.as_deref(),
        UNKNOWN_ERROR_MESSAGE,
    );

    let status = if error.is_some() {
        ReceiptStatus::Error
    } else if reply.status.as_deref() == Some("wait") {
        ReceiptStatus::Pending
    } else {
        ReceiptStatus::Ready
    };

    let data = ReceiptData {
        receipt_id: non_empty(reply.uuid.as_deref())
            .or(non_empty(reply.external_id.as_deref()))
            .map(str::to_string),
        status,
        status_code: reply.code.as_ref().and_then(value_to_i64).unwrap_or(0),
        status_message: reply.text.unwrap_or_default(),
        error,
    };

    if data.error.is_some() {
        FermaReply {
            status: ReplyStatus::Failed,
            data: Some(data),
            error: None,
        }
    } else {
        FermaReply::success(data)
    }
}

// ============================================================================
// Status
// ============================================================================

pub fn translate_status_reply(http_status: u16, body: &Value) -> FermaReply<StatusData> {
    let report: AtolReport = lenient(body);
    let status = UpstreamStatus::parse(report.status.as_deref());
    let (status_code, status_name, status_message) = status.ferma_status();
    let done = status == UpstreamStatus::Done;

    let data = StatusData {
        status_code,
        status_name: status_name.to_string(),
        status_message: status_message.to_string(),
        modified_date_utc: report.timestamp.clone().filter(|_| done),
        receipt_date_utc: report
            .payload
            .as_ref()
            .and_then(|p| p.receipt_datetime.clone())
            .filter(|_| done),
        device: if done {
            Some(device_info(report.payload.as_ref()))
        } else {
            None
        },
    };

    match normalize_error(
        http_status,
        embedded_error(body).as_ref(),
        report.code.as_ref(),
        report.text.as_deref(),
        UNKNOWN_ERROR_MESSAGE,
    ) {
        Some(error) => FermaReply::failed(Some(data), error),
        None => FermaReply::success(data),
    }
}

fn device_info(payload: Option<&AtolReportPayload>) -> DeviceInfo {
    let Some(payload) = payload else {
        return DeviceInfo::default();
    };
    let device_sn = payload.device_sn.as_ref().and_then(value_to_string);

    DeviceInfo {
        device_id: device_sn.clone(),
        rnm: payload
            .ecr_registration_number
            .as_ref()
            .and_then(value_to_string),
        zn: device_sn,
        fn_number: payload.fn_number.as_ref().and_then(value_to_string),
        fdn: payload
            .fiscal_document_number
            .as_ref()
            .and_then(value_to_string),
        fpd: payload
            .fiscal_document_attribute
            .as_ref()
            .and_then(value_to_string),
        shift_number: payload.shift_number.as_ref().and_then(value_to_i64),
        receipt_num_in_shift: payload
            .fiscal_receipt_number
            .as_ref()
            .and_then(value_to_i64),
        ofd_receipt_url: payload.ofd_receipt_url.clone(),
    }
}

// ============================================================================
// Error normalization
// ============================================================================

/// Build the Ferma `Error` for a reply, or `None` when the reply is a clean
/// 2xx without an embedded error object.
pub fn normalize_error(
    http_status: u16,
    embedded: Option<&AtolError>,
    top_code: Option<&Value>,
    top_text: Option<&str>,
    default_message: &str,
) -> Option<FermaError> {
    let failed_status = !(200..300).contains(&http_status);

    if let Some(err) = embedded {
        return Some(FermaError {
            code: err
                .code
                .as_ref()
                .and_then(value_to_string)
                .unwrap_or_else(|| code_string(top_code)),
            message: non_empty(err.text.as_deref())
                .or(non_empty(top_text))
                .unwrap_or(default_message)
                .to_string(),
        });
    }

    failed_status.then(|| FermaError {
        code: top_code
            .and_then(value_to_string)
            .unwrap_or_else(|| http_status.to_string()),
        message: non_empty(top_text).unwrap_or(default_message).to_string(),
    })
}

/// The upstream `error` field as an error object. A bare string is taken as
/// the message; `null` means no error.
pub fn embedded_error(body: &Value) -> Option<AtolError> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(text) => Some(AtolError {
            code: None,
            text: Some(text.clone()),
        }),
        obj @ Value::Object(_) => Some(lenient(obj)),
        other => Some(AtolError {
            code: Some(other.clone()),
            text: None,
        }),
    }
}

/// Reply models read each field leniently, so this only falls back to
/// defaults when the body is not an object at all.
fn lenient<T: DeserializeOwned + Default>(body: &Value) -> T {
    serde_json::from_value(body.clone()).unwrap_or_else(|e| {
        debug!("Upstream reply did not match expected shape: {}", e);
        T::default()
    })
}

fn code_string(code: Option<&Value>) -> String {
    code.and_then(value_to_string)
        .unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string())
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
