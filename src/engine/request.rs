//! # Request Translator
//!
//! Builds eKomKassa request bodies and targets from validated Ferma input.
//! Nothing here performs I/O or reads the clock; callers pass a
//! [`RequestTime`] so the same input and the same instant always produce the
//! same upstream request.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::engine::dispatch::{self, ReceiptSubmission};
use crate::engine::tables::{self, Operation};
use crate::error::GatewayError;
use crate::models::{
    AtolAgentInfo, AtolClient, AtolCompany, AtolCorrection, AtolCorrectionInfo, AtolDocument,
    AtolDocumentBody, AtolItem, AtolMoneyTransferOperator, AtolPayingAgent, AtolPayment,
    AtolPhones, AtolReceipt, AtolSupplierInfo, AtolTokenRequest, AtolVat, AtolVatSum, AuthRequest,
    CustomerReceipt, FermaRequest, PaymentAgentInfo, ReceiptBody, StatusParams,
};

/// Company email used when the buyer supplied none.
pub const PLACEHOLDER_EMAIL: &str = "shop@example.com";
/// Taxpayer id used when the request carries no `Inn`.
pub const PLACEHOLDER_INN: &str = "0000000000";
/// Settlement address used when the request carries no `CallbackUrl`.
pub const PLACEHOLDER_PAYMENT_ADDRESS: &str = "https://example.com";

const DEFAULT_ITEM_NAME: &str = "Товар";
const CORRECTION_BASE_NAME: &str = "Коррекция";
const CORRECTION_TYPE_SELF: &str = "self";
/// Atol `payment_object` 4: service.
const PAYMENT_OBJECT_SERVICE: u8 = 4;
/// Atol payment type 1: electronic.
const PAYMENT_TYPE_ELECTRONIC: u8 = 1;

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";
const DATE_FORMAT: &str = "%d.%m.%Y";

// ============================================================================
// Clock reading
// ============================================================================

/// The instant a request is processed, captured once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTime {
    pub utc: DateTime<Utc>,
    /// Gateway wall-clock time; eKomKassa expects local time in `timestamp`.
    pub local: NaiveDateTime,
}

impl RequestTime {
    pub fn now() -> Self {
        let utc = Utc::now();
        Self {
            utc,
            local: utc.with_timezone(&Local).naive_local(),
        }
    }

    pub fn in_offset(utc: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            utc,
            local: utc.with_timezone(&offset).naive_local(),
        }
    }

    /// `DD.MM.YYYY, HH:MM:SS`, the exact format eKomKassa accepts.
    pub fn timestamp(&self) -> String {
        self.local.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn date(&self) -> String {
        self.local.format(DATE_FORMAT).to_string()
    }

    pub fn fallback_external_id(&self) -> String {
        format!("req-{}", self.utc.timestamp_millis())
    }
}

// ============================================================================
// Upstream request envelope
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMethod {
    Get,
    Post,
}

/// Which operation a request belongs to; the HTTP client picks its timeout
/// from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Auth,
    Receipt,
    Status,
}

impl RequestKind {
    pub fn function_name(self) -> &'static str {
        match self {
            RequestKind::Auth => "auth",
            RequestKind::Receipt => "receipt",
            RequestKind::Status => "status",
        }
    }
}

/// A fully built call against eKomKassa, ready for the HTTP collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub kind: RequestKind,
    pub method: UpstreamMethod,
    pub url: String,
    /// Sent as the `Token` header.
    pub token: Option<String>,
    pub body: Option<Value>,
}

// ============================================================================
// Auth
// ============================================================================

/// `{login, password}` → `{login, pass}`. Both must be present and non-empty.
pub fn translate_auth(req: &AuthRequest) -> Result<AtolTokenRequest, GatewayError> {
    match (non_empty(&req.login), non_empty(&req.password)) {
        (Some(login), Some(password)) => Ok(AtolTokenRequest {
            login: login.to_string(),
            pass: password.to_string(),
        }),
        _ => Err(GatewayError::MissingField("login and password")),
    }
}

pub fn token_request(
    base_url: &str,
    credentials: &AtolTokenRequest,
) -> Result<UpstreamRequest, GatewayError> {
    Ok(UpstreamRequest {
        kind: RequestKind::Auth,
        method: UpstreamMethod::Post,
        url: dispatch::token_url(base_url),
        token: None,
        body: Some(serde_json::to_value(credentials)?),
    })
}

// ============================================================================
// Receipt submission
// ============================================================================

/// Translate a detected submission into the upstream call.
pub fn receipt_request(
    base_url: &str,
    submission: &ReceiptSubmission,
    now: &RequestTime,
) -> Result<UpstreamRequest, GatewayError> {
    let operation = submission.operation();
    let document = match submission {
        ReceiptSubmission::Structured { request, .. } => {
            translate_structured(request, operation, now)?
        }
        ReceiptSubmission::Simple {
            external_id,
            receipt,
            ..
        } => translate_simple(external_id.as_deref(), receipt.clone(), now),
    };

    Ok(UpstreamRequest {
        kind: RequestKind::Receipt,
        method: UpstreamMethod::Post,
        url: dispatch::document_url(base_url, submission.group_code(), operation),
        token: Some(submission.token().to_string()),
        body: Some(to_json(&document)?),
    })
}

/// Structured Ferma request → Atol receipt or correction document.
/// Fails only when the amounts cannot be totalled without overflow.
pub fn translate_structured(
    request: &FermaRequest,
    operation: Operation,
    now: &RequestTime,
) -> Result<AtolDocument, GatewayError> {
    let empty = CustomerReceipt::default();
    let receipt = request.customer_receipt.as_ref().unwrap_or(&empty);

    let supplier = receipt
        .payment_agent_info
        .as_ref()
        .and_then(supplier_info);
    let items = translate_items(receipt, supplier);
    let payments = translate_payments(receipt, &items)?;
    let company = company_block(request, receipt);
    let external_id = non_empty(&request.invoice_id)
        .or(non_empty(&request.request_id))
        .map(str::to_string)
        .unwrap_or_else(|| now.fallback_external_id());

    let body = if operation.is_correction() {
        let base_number = non_empty(&request.request_id)
            .or(non_empty(&request.invoice_id))
            .unwrap_or("1")
            .to_string();
        AtolDocumentBody::Correction(AtolCorrection {
            company,
            correction_info: AtolCorrectionInfo {
                correction_type: CORRECTION_TYPE_SELF.to_string(),
                base_date: now.date(),
                base_number,
                base_name: CORRECTION_BASE_NAME.to_string(),
            },
            payments,
            vats: items
                .iter()
                .map(|item| AtolVatSum {
                    vat_type: item.vat.vat_type,
                    sum: item.sum,
                })
                .collect(),
        })
    } else {
        let client = AtolClient {
            email: non_empty(&receipt.email).map(str::to_string),
            phone: non_empty(&receipt.phone).map(str::to_string),
        };
        let total = checked_total(payments.iter().map(|p| p.sum))?;
        AtolDocumentBody::Receipt(ReceiptBody::Structured(AtolReceipt {
            client,
            company,
            items,
            payments,
            total,
            agent_info: receipt.payment_agent_info.as_ref().map(agent_info),
        }))
    };

    Ok(AtolDocument {
        external_id,
        body,
        timestamp: now.timestamp(),
    })
}

/// Simple format: the receipt object is forwarded untouched.
pub fn translate_simple(
    external_id: Option<&str>,
    receipt: Value,
    now: &RequestTime,
) -> AtolDocument {
    AtolDocument {
        external_id: external_id
            .map(str::to_string)
            .unwrap_or_else(|| now.fallback_external_id()),
        body: AtolDocumentBody::Receipt(ReceiptBody::Passthrough(receipt)),
        timestamp: now.timestamp(),
    }
}

fn translate_items(receipt: &CustomerReceipt, supplier: Option<AtolSupplierInfo>) -> Vec<AtolItem> {
    receipt
        .items
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|item| AtolItem {
            name: non_empty(&item.label)
                .unwrap_or(DEFAULT_ITEM_NAME)
                .to_string(),
            price: item.price.unwrap_or(Decimal::ZERO),
            quantity: item.quantity.unwrap_or(Decimal::ONE),
            sum: item.amount.unwrap_or(Decimal::ZERO),
            payment_method: tables::payment_method(item.payment_method),
            payment_object: PAYMENT_OBJECT_SERVICE,
            measure: tables::measure_code(item.measure.as_deref()),
            vat: AtolVat {
                vat_type: tables::vat_type(item.vat.as_deref()),
            },
            supplier_info: supplier.clone(),
        })
        .collect()
}

/// Declared cashless payments, or a single electronic payment for the sum of
/// all item amounts when none are declared.
fn translate_payments(
    receipt: &CustomerReceipt,
    items: &[AtolItem],
) -> Result<Vec<AtolPayment>, GatewayError> {
    let declared: Vec<AtolPayment> = receipt
        .cashless_payments
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|payment| AtolPayment {
            payment_type: PAYMENT_TYPE_ELECTRONIC,
            sum: payment.payment_sum.unwrap_or(Decimal::ZERO),
        })
        .collect();

    if !declared.is_empty() {
        return Ok(declared);
    }

    Ok(vec![AtolPayment {
        payment_type: PAYMENT_TYPE_ELECTRONIC,
        sum: checked_total(items.iter().map(|item| item.sum))?,
    }])
}

fn checked_total(mut sums: impl Iterator<Item = Decimal>) -> Result<Decimal, GatewayError> {
    sums.try_fold(Decimal::ZERO, |total, sum| {
        total
            .checked_add(sum)
            .ok_or_else(|| GatewayError::InvalidBody("amount total is out of range".into()))
    })
}

fn company_block(request: &FermaRequest, receipt: &CustomerReceipt) -> AtolCompany {
    AtolCompany {
        email: non_empty(&receipt.email)
            .unwrap_or(PLACEHOLDER_EMAIL)
            .to_string(),
        sno: tables::taxation_system(receipt.taxation_system.as_deref()),
        inn: non_empty(&request.inn).unwrap_or(PLACEHOLDER_INN).to_string(),
        payment_address: non_empty(&request.callback_url)
            .unwrap_or(PLACEHOLDER_PAYMENT_ADDRESS)
            .to_string(),
    }
}

fn agent_info(info: &PaymentAgentInfo) -> AtolAgentInfo {
    let operation = non_empty(&info.payment_agent_operation).map(str::to_string);
    let paying_phones = phones(&info.payment_agent_phone);
    let paying_agent = (operation.is_some() || paying_phones.is_some()).then(|| AtolPayingAgent {
        operation,
        phones: paying_phones,
    });

    let has_transfer_agent = [
        &info.transfer_agent_name,
        &info.transfer_agent_phone,
        &info.transfer_agent_address,
        &info.transfer_agent_inn,
    ]
    .iter()
    .any(|field| non_empty(field).is_some());

    AtolAgentInfo {
        agent_type: tables::agent_type(info.agent_type.as_deref()),
        paying_agent,
        receive_payments_operator: has_transfer_agent.then(|| AtolPhones {
            phones: phones(&info.transfer_agent_phone),
        }),
        money_transfer_operator: has_transfer_agent.then(|| AtolMoneyTransferOperator {
            name: non_empty(&info.transfer_agent_name).map(str::to_string),
            phones: phones(&info.transfer_agent_phone),
            address: non_empty(&info.transfer_agent_address).map(str::to_string),
            inn: non_empty(&info.transfer_agent_inn).map(str::to_string),
        }),
    }
}

fn supplier_info(info: &PaymentAgentInfo) -> Option<AtolSupplierInfo> {
    let supplier = AtolSupplierInfo {
        name: non_empty(&info.supplier_name).map(str::to_string),
        phones: phones(&info.supplier_phone),
        inn: non_empty(&info.supplier_inn).map(str::to_string),
    };
    (supplier.name.is_some() || supplier.phones.is_some() || supplier.inn.is_some())
        .then_some(supplier)
}

fn phones(phone: &Option<String>) -> Option<Vec<String>> {
    non_empty(phone).map(|p| vec![p.to_string()])
}

// ============================================================================
// Status
// ============================================================================

/// A validated status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusQuery {
    pub auth_token: String,
    pub group_code: String,
    pub document_id: String,
}

impl StatusQuery {
    pub fn from_params(params: &StatusParams) -> Result<Self, GatewayError> {
        let auth_token = non_empty(&params.auth_token).ok_or(GatewayError::MissingField("AuthToken"))?;
        let document_id = non_empty(&params.uuid).ok_or(GatewayError::MissingField("uuid"))?;
        let group_code = non_empty(&params.group_code)
            .unwrap_or(dispatch::DEFAULT_GROUP_CODE);

        Ok(Self {
            auth_token: auth_token.to_string(),
            group_code: dispatch::path_segment("group_code", group_code.to_string())?,
            document_id: dispatch::path_segment("uuid", document_id.to_string())?,
        })
    }
}

pub fn report_request(base_url: &str, query: &StatusQuery) -> UpstreamRequest {
    UpstreamRequest {
        kind: RequestKind::Status,
        method: UpstreamMethod::Get,
        url: dispatch::report_url(base_url, &query.group_code, &query.document_id),
        token: Some(query.auth_token.clone()),
        body: None,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, GatewayError> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const BASE: &str = "https://app.ecomkassa.ru/fiscalorder/v5";

    fn fixed_time() -> RequestTime {
        let utc = Utc.with_ymd_and_hms(2025, 1, 15, 9, 5, 7).unwrap();
        RequestTime::in_offset(utc, FixedOffset::east_opt(3 * 3600).unwrap())
    }

    fn submission(body: Value) -> ReceiptSubmission {
        ReceiptSubmission::detect(&body).expect("valid submission")
    }

    fn sale_body() -> Value {
        json!({
            "token": "tok",
            "group_code": "700",
            "Request": {
                "Inn": "0123456789",
                "Type": "Income",
                "InvoiceId": "inv-1",
                "CallbackUrl": "https://shop.test/callback",
                "CustomerReceipt": {
                    "TaxationSystem": "Simplified",
                    "Email": "buyer@test.ru",
                    "Phone": "+79000000001",
                    "Items": [{
                        "Label": "Страховка",
                        "Price": 100.00,
                        "Quantity": 1.0,
                        "Amount": 100.00,
                        "Vat": "Vat20",
                        "PaymentMethod": 4,
                        "Measure": "KILOGRAM"
                    }]
                }
            }
        })
    }

    #[test]
    fn test_timestamp_format() {
        let now = fixed_time();
        assert_eq!(now.timestamp(), "15.01.2025, 12:05:07");
        assert_eq!(now.date(), "15.01.2025");
        assert_eq!(now.fallback_external_id(), format!("req-{}", now.utc.timestamp_millis()));
    }

    #[test]
    fn test_translate_auth() {
        let creds = translate_auth(&AuthRequest {
            login: Some("u".into()),
            password: Some("p".into()),
        })
        .unwrap();
        assert_eq!(serde_json::to_value(&creds).unwrap(), json!({"login": "u", "pass": "p"}));

        let req = token_request(BASE, &creds).unwrap();
        assert_eq!(req.url, format!("{BASE}/getToken"));
        assert_eq!(req.method, UpstreamMethod::Post);
        assert!(req.token.is_none());
    }

    #[test]
    fn test_translate_auth_requires_both_fields() {
        for (login, password) in [(None, Some("p")), (Some("u"), None), (Some(""), Some("p"))] {
            let result = translate_auth(&AuthRequest {
                login: login.map(String::from),
                password: password.map(String::from),
            });
            assert!(matches!(result, Err(GatewayError::MissingField(_))));
        }
    }

    #[test]
    fn test_structured_sale_payload() {
        let req = receipt_request(BASE, &submission(sale_body()), &fixed_time()).unwrap();
        assert_eq!(req.url, format!("{BASE}/700/sell"));
        assert_eq!(req.token.as_deref(), Some("tok"));
        assert_eq!(req.kind, RequestKind::Receipt);

        let body = req.body.unwrap();
        assert_eq!(body["external_id"], "inv-1");
        assert_eq!(body["timestamp"], "15.01.2025, 12:05:07");

        let receipt = &body["receipt"];
        assert_eq!(receipt["client"], json!({"email": "buyer@test.ru", "phone": "+79000000001"}));
        assert_eq!(
            receipt["company"],
            json!({
                "email": "buyer@test.ru",
                "sno": "usn_income",
                "inn": "0123456789",
                "payment_address": "https://shop.test/callback"
            })
        );

        let item = &receipt["items"][0];
        assert_eq!(item["name"], "Страховка");
        assert_eq!(item["sum"], json!(100.0));
        assert_eq!(item["payment_method"], "partial_payment");
        assert_eq!(item["payment_object"], 4);
        assert_eq!(item["measure"], 11);
        assert_eq!(item["vat"], json!({"type": "vat20"}));

        assert_eq!(receipt["payments"], json!([{"type": 1, "sum": 100.0}]));
        assert_eq!(receipt["total"], json!(100.0));
        assert!(receipt.get("agent_info").is_none());
        assert!(body.get("correction").is_none());
    }

    #[test]
    fn test_declared_payments_drive_total() {
        let mut body = sale_body();
        body["Request"]["CustomerReceipt"]["CashlessPayments"] =
            json!([{ "PaymentSum": 60 }, { "PaymentSum": 40.5 }]);
        let req = receipt_request(BASE, &submission(body), &fixed_time()).unwrap();
        let receipt = &req.body.unwrap()["receipt"];
        assert_eq!(receipt["payments"], json!([{"type": 1, "sum": 60.0}, {"type": 1, "sum": 40.5}]));
        assert_eq!(receipt["total"], json!(100.5));
    }

    #[test]
    fn test_placeholders_when_optional_fields_absent() {
        let body = json!({
            "token": "tok",
            "Request": { "CustomerReceipt": { "Items": [{ "Amount": 5 }] } }
        });
        let now = fixed_time();
        let req = receipt_request(BASE, &submission(body), &now).unwrap();
        let body = req.body.unwrap();

        assert_eq!(body["external_id"], now.fallback_external_id());
        let receipt = &body["receipt"];
        assert_eq!(receipt["client"], json!({}));
        assert_eq!(receipt["company"]["email"], PLACEHOLDER_EMAIL);
        assert_eq!(receipt["company"]["inn"], PLACEHOLDER_INN);
        assert_eq!(receipt["company"]["payment_address"], PLACEHOLDER_PAYMENT_ADDRESS);
        assert_eq!(receipt["company"]["sno"], "osn");

        let item = &receipt["items"][0];
        assert_eq!(item["name"], "Товар");
        assert_eq!(item["price"], json!(0.0));
        assert_eq!(item["quantity"], json!(1.0));
        assert_eq!(item["payment_method"], "full_payment");
        assert_eq!(item["measure"], 0);
        assert_eq!(item["vat"]["type"], "none");
    }

    #[test]
    fn test_correction_payload_has_vats_and_no_items() {
        let body = json!({
            "token": "tok",
            "Request": {
                "Type": "IncomeCorrection",
                "RequestId": "req-77",
                "CustomerReceipt": {
                    "Items": [{ "Label": "Расходы", "Price": 1, "Quantity": 1, "Amount": 1, "Vat": "CalculatedVat20120" }]
                }
            }
        });
        let now = fixed_time();
        let req = receipt_request(BASE, &submission(body), &now).unwrap();
        assert_eq!(req.url, format!("{BASE}/700/sell_correction"));

        let body = req.body.unwrap();
        assert!(body.get("receipt").is_none());
        let correction = &body["correction"];
        assert!(correction.get("items").is_none());
        assert_eq!(correction["vats"], json!([{"type": "vat20", "sum": 1.0}]));
        assert_eq!(correction["payments"], json!([{"type": 1, "sum": 1.0}]));
        assert_eq!(
            correction["correction_info"],
            json!({
                "type": "self",
                "base_date": "15.01.2025",
                "base_number": "req-77",
                "base_name": "Коррекция"
            })
        );
    }

    #[test]
    fn test_correction_base_number_defaults_to_one() {
        let request = FermaRequest {
            customer_receipt: Some(CustomerReceipt {
                items: Some(vec![Default::default()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let doc = translate_structured(&request, Operation::BuyRefundCorrection, &fixed_time())
            .unwrap();
        match doc.body {
            AtolDocumentBody::Correction(correction) => {
                assert_eq!(correction.correction_info.base_number, "1");
                assert_eq!(correction.vats[0].sum, dec!(0));
            }
            other => panic!("expected correction, got {other:?}"),
        }
    }

    #[test]
    fn test_overflowing_amounts_are_rejected() {
        let huge = "79228162514264337593543950335";
        let mut body = sale_body();
        body["Request"]["CustomerReceipt"]["Items"] =
            json!([{ "Amount": huge }, { "Amount": huge }]);
        let result = receipt_request(BASE, &submission(body), &fixed_time());
        assert!(matches!(result, Err(GatewayError::InvalidBody(_))));

        let mut body = sale_body();
        body["Request"]["CustomerReceipt"]["CashlessPayments"] =
            json!([{ "PaymentSum": huge }, { "PaymentSum": huge }]);
        let result = receipt_request(BASE, &submission(body), &fixed_time());
        assert!(matches!(result, Err(GatewayError::InvalidBody(_))));
    }

    #[test]
    fn test_blank_invoice_id_does_not_shadow_request_id() {
        let mut body = sale_body();
        body["Request"]["InvoiceId"] = json!("");
        body["Request"]["RequestId"] = json!("req-9");
        let req = receipt_request(BASE, &submission(body), &fixed_time()).unwrap();
        assert_eq!(req.body.unwrap()["external_id"], "req-9");

        let request = FermaRequest {
            request_id: Some(String::new()),
            invoice_id: Some("inv-3".into()),
            customer_receipt: Some(CustomerReceipt {
                items: Some(vec![Default::default()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let doc = translate_structured(&request, Operation::SellCorrection, &fixed_time()).unwrap();
        match doc.body {
            AtolDocumentBody::Correction(correction) => {
                assert_eq!(correction.correction_info.base_number, "inv-3");
            }
            other => panic!("expected correction, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_ids_and_string_codes_accepted() {
        let mut body = sale_body();
        body["Request"]["Inn"] = json!(7700000000u64);
        body["Request"]["InvoiceId"] = json!(1234);
        body["Request"]["CustomerReceipt"]["Items"][0]["PaymentMethod"] = json!("4");
        let req = receipt_request(BASE, &submission(body), &fixed_time()).unwrap();
        let body = req.body.unwrap();
        assert_eq!(body["external_id"], "1234");
        assert_eq!(body["receipt"]["company"]["inn"], "7700000000");
        assert_eq!(body["receipt"]["items"][0]["payment_method"], "partial_payment");
    }

    #[test]
    fn test_mistyped_codes_fall_back_to_defaults() {
        let mut body = sale_body();
        let item = &mut body["Request"]["CustomerReceipt"]["Items"][0];
        item["PaymentMethod"] = json!("four");
        item["Vat"] = json!(20);
        item["Measure"] = json!(true);
        body["Request"]["CustomerReceipt"]["TaxationSystem"] = json!(1);
        let req = receipt_request(BASE, &submission(body), &fixed_time()).unwrap();
        let receipt = &req.body.unwrap()["receipt"];
        assert_eq!(receipt["company"]["sno"], "osn");
        assert_eq!(receipt["items"][0]["payment_method"], "full_payment");
        assert_eq!(receipt["items"][0]["vat"]["type"], "none");
        assert_eq!(receipt["items"][0]["measure"], 0);
    }

    #[test]
    fn test_agent_and_supplier_info() {
        let mut body = sale_body();
        body["Request"]["CustomerReceipt"]["PaymentAgentInfo"] = json!({
            "AgentType": "COMMISSION_AGENT",
            "PaymentAgentOperation": "Перевод",
            "TransferAgentName": "ООО Оператор",
            "TransferAgentINN": "7700000000",
            "SupplierName": "ИП Поставщик",
            "SupplierPhone": "+79000000002"
        });
        let req = receipt_request(BASE, &submission(body), &fixed_time()).unwrap();
        let receipt = &req.body.unwrap()["receipt"];

        assert_eq!(
            receipt["agent_info"],
            json!({
                "type": 5,
                "paying_agent": { "operation": "Перевод" },
                "receive_payments_operator": {},
                "money_transfer_operator": { "name": "ООО Оператор", "inn": "7700000000" }
            })
        );
        assert_eq!(
            receipt["items"][0]["supplier_info"],
            json!({ "name": "ИП Поставщик", "phones": ["+79000000002"] })
        );
    }

    #[test]
    fn test_simple_passthrough() {
        let body = json!({
            "token": "tok",
            "group_code": "g1",
            "operation": "buy",
            "receipt": { "items": [{ "name": "raw" }], "total": 3 }
        });
        let req = receipt_request(BASE, &submission(body), &fixed_time()).unwrap();
        assert_eq!(req.url, format!("{BASE}/g1/buy"));
        let body = req.body.unwrap();
        assert_eq!(body["receipt"], json!({ "items": [{ "name": "raw" }], "total": 3 }));
        assert!(body["external_id"].as_str().unwrap().starts_with("req-"));
        assert_eq!(body["timestamp"], "15.01.2025, 12:05:07");
    }

    #[test]
    fn test_same_input_same_instant_is_identical() {
        let now = fixed_time();
        let first = receipt_request(BASE, &submission(sale_body()), &now).unwrap();
        let second = receipt_request(BASE, &submission(sale_body()), &now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_status_query() {
        let query = StatusQuery::from_params(&StatusParams {
            auth_token: Some("tok".into()),
            uuid: Some("doc-1".into()),
            group_code: None,
        })
        .unwrap();
        assert_eq!(query.group_code, "700");

        let req = report_request(BASE, &query);
        assert_eq!(req.url, format!("{BASE}/700/report/doc-1"));
        assert_eq!(req.method, UpstreamMethod::Get);
        assert_eq!(req.token.as_deref(), Some("tok"));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_status_query_requires_token_and_uuid() {
        let missing_uuid = StatusQuery::from_params(&StatusParams {
            auth_token: Some("tok".into()),
            ..Default::default()
        });
        assert!(matches!(missing_uuid, Err(GatewayError::MissingField("uuid"))));

        let missing_token = StatusQuery::from_params(&StatusParams {
            uuid: Some("doc".into()),
            ..Default::default()
        });
        assert!(matches!(missing_token, Err(GatewayError::MissingField("AuthToken"))));
    }

    #[test]
    fn test_status_query_rejects_path_characters() {
        let traversal = StatusQuery::from_params(&StatusParams {
            auth_token: Some("tok".into()),
            uuid: Some("../700/sell".into()),
            group_code: None,
        });
        assert!(matches!(traversal, Err(GatewayError::InvalidBody(_))));

        let bad_group = StatusQuery::from_params(&StatusParams {
            auth_token: Some("tok".into()),
            uuid: Some("doc-1".into()),
            group_code: Some("700?x".into()),
        });
        assert!(matches!(bad_group, Err(GatewayError::InvalidBody(_))));
    }
}
