//! # Dispatch Policy
//!
//! Decides, for a raw receipt-submission body, which payload shape applies
//! and which upstream operation it targets. Also owns construction of every
//! upstream URL so that path layout lives in one place.
//!
//! Shape detection is a single rule: a body carrying a `Request` object is
//! Structured, a body without one is Simple. A body carrying both a
//! `Request` object and a top-level `receipt` is ambiguous and rejected.

use serde_json::Value;

use crate::engine::tables::Operation;
use crate::error::GatewayError;
use crate::models::FermaRequest;

/// Register group used when the caller does not name one.
pub const DEFAULT_GROUP_CODE: &str = "700";

/// A receipt submission after shape detection and validation.
#[derive(Debug, Clone)]
pub enum ReceiptSubmission {
    /// Full Ferma `Request` object, translated field by field.
    Structured {
        token: String,
        group_code: String,
        request: FermaRequest,
    },
    /// Flat body whose `receipt` object is already in Atol shape.
    Simple {
        token: String,
        group_code: String,
        operation: Operation,
        external_id: Option<String>,
        receipt: Value,
    },
}

impl ReceiptSubmission {
    /// Classify and validate a raw body. Every rejection happens here, before
    /// any upstream traffic.
    pub fn detect(body: &Value) -> Result<Self, GatewayError> {
        let fields = body
            .as_object()
            .ok_or_else(|| GatewayError::InvalidBody("expected a JSON object".into()))?;

        let structured = match fields.get("Request") {
            None | Some(Value::Null) => None,
            Some(request @ Value::Object(_)) => Some(request),
            Some(_) => {
                return Err(GatewayError::InvalidBody(
                    "Request must be a JSON object".into(),
                ))
            }
        };

        if structured.is_some() && fields.get("receipt").is_some_and(|r| !r.is_null()) {
            return Err(GatewayError::InvalidBody(
                "body carries both Request and receipt".into(),
            ));
        }

        let token = non_empty_str(fields.get("token")).ok_or(GatewayError::MissingToken)?;
        let group_code =
            path_segment("group_code", group_code_or_default(fields.get("group_code")))?;

        match structured {
            Some(raw) => {
                let request: FermaRequest = serde_json::from_value(raw.clone())
                    .map_err(|e| GatewayError::InvalidBody(e.to_string()))?;
                let has_items = request
                    .customer_receipt
                    .as_ref()
                    .and_then(|r| r.items.as_ref())
                    .is_some_and(|items| !items.is_empty());
                if !has_items {
                    return Err(GatewayError::EmptyItems);
                }
                Ok(ReceiptSubmission::Structured {
                    token,
                    group_code,
                    request,
                })
            }
            None => {
                let receipt = fields
                    .get("receipt")
                    .filter(|r| r.is_object())
                    .ok_or(GatewayError::MissingField("receipt.items"))?;
                match receipt.get("items") {
                    None | Some(Value::Null) => {
                        return Err(GatewayError::MissingField("receipt.items"))
                    }
                    Some(Value::Array(items)) if items.is_empty() => {
                        return Err(GatewayError::EmptyItems)
                    }
                    Some(_) => {}
                }
                Ok(ReceiptSubmission::Simple {
                    token,
                    group_code,
                    operation: Operation::from_keyword(
                        fields.get("operation").and_then(Value::as_str),
                    ),
                    external_id: non_empty_str(fields.get("external_id")),
                    receipt: receipt.clone(),
                })
            }
        }
    }

    pub fn token(&self) -> &str {
        match self {
            ReceiptSubmission::Structured { token, .. }
            | ReceiptSubmission::Simple { token, .. } => token,
        }
    }

    pub fn group_code(&self) -> &str {
        match self {
            ReceiptSubmission::Structured { group_code, .. }
            | ReceiptSubmission::Simple { group_code, .. } => group_code,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ReceiptSubmission::Structured { request, .. } => {
                Operation::from_ferma_type(request.document_type.as_deref())
            }
            ReceiptSubmission::Simple { operation, .. } => *operation,
        }
    }

    /// Label used in logs and the log sink.
    pub fn shape(&self) -> &'static str {
        match self {
            ReceiptSubmission::Structured { .. } => "ferma",
            ReceiptSubmission::Simple { .. } => "simple",
        }
    }
}

/// Accept the group code as a string or a bare number; blank means default.
pub fn group_code_or_default(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => DEFAULT_GROUP_CODE.to_string(),
    }
}

fn non_empty_str(raw: Option<&Value>) -> Option<String> {
    raw.and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Upstream paths
// ============================================================================

/// Caller-supplied values end up as URL path segments; anything that could
/// escape its segment is refused.
pub fn path_segment(field: &'static str, value: String) -> Result<String, GatewayError> {
    let breaks_path = value == "."
        || value == ".."
        || value
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control());
    if breaks_path {
        return Err(GatewayError::InvalidBody(format!(
            "{field} is not a valid path segment"
        )));
    }
    Ok(value)
}

pub fn token_url(base_url: &str) -> String {
    format!("{}/getToken", base_url.trim_end_matches('/'))
}

pub fn document_url(base_url: &str, group_code: &str, operation: Operation) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        group_code,
        operation.keyword()
    )
}

pub fn report_url(base_url: &str, group_code: &str, document_id: &str) -> String {
    format!(
        "{}/{}/report/{}",
        base_url.trim_end_matches('/'),
        group_code,
        document_id
    )
}
