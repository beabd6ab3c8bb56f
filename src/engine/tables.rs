//! # Code Table Registry
//!
//! Static mappings between the enumerated values of the Ferma vocabulary and
//! the Atol v5 (eKomKassa) vocabulary. Every lookup is a total function: an
//! unrecognised or absent key resolves to the documented default instead of
//! failing, so a typo in an inbound request never aborts translation.

use serde::Serialize;

// ============================================================================
// VAT category
// ============================================================================

/// Atol VAT type attached to a line item or a correction VAT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VatType {
    None,
    Vat0,
    Vat10,
    Vat20,
}

/// Ferma `Vat` → Atol `vat.type`. Default: `none`.
pub fn vat_type(ferma_vat: Option<&str>) -> VatType {
    match ferma_vat {
        Some("VatNo") => VatType::None,
        Some("Vat0") => VatType::Vat0,
        Some("Vat10") | Some("CalculatedVat10110") => VatType::Vat10,
        Some("Vat20") | Some("CalculatedVat20120") => VatType::Vat20,
        _ => VatType::None,
    }
}

// ============================================================================
// Payment method (settlement sign)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    FullPrepayment,
    Prepayment,
    Advance,
    FullPayment,
    PartialPayment,
    Credit,
    CreditPayment,
}

/// Ferma integer `PaymentMethod` (0..=6) → Atol `payment_method`. Default: `full_payment`.
pub fn payment_method(code: Option<i64>) -> PaymentMethod {
    match code {
        Some(0) => PaymentMethod::FullPrepayment,
        Some(1) => PaymentMethod::Prepayment,
        Some(2) => PaymentMethod::Advance,
        Some(3) => PaymentMethod::FullPayment,
        Some(4) => PaymentMethod::PartialPayment,
        Some(5) => PaymentMethod::Credit,
        Some(6) => PaymentMethod::CreditPayment,
        _ => PaymentMethod::FullPayment,
    }
}

// ============================================================================
// Unit of measure
// ============================================================================

/// Ferma `Measure` name → Atol numeric `measure` code. Default: `0` (piece).
pub fn measure_code(unit: Option<&str>) -> u16 {
    match unit {
        Some("PIECE") => 0,
        Some("GRAM") => 10,
        Some("KILOGRAM") => 11,
        Some("TON") => 12,
        Some("CENTIMETER") => 20,
        Some("DECIMETER") => 21,
        Some("METER") => 22,
        Some("SQUARE_CENTIMETER") => 30,
        Some("SQUARE_DECIMETER") => 31,
        Some("SQUARE_METER") => 32,
        Some("MILLILITER") => 40,
        Some("LITER") => 41,
        Some("CUBIC_METER") => 42,
        Some("KILOWATT_HOUR") => 50,
        Some("GIGACALORIE") => 51,
        Some("DAY") => 70,
        Some("HOUR") => 71,
        Some("MINUTE") => 72,
        Some("SECOND") => 73,
        Some("KILOBYTE") => 80,
        Some("MEGABYTE") => 81,
        Some("GIGABYTE") => 82,
        Some("TERABYTE") => 83,
        Some("OTHER") => 255,
        _ => 0,
    }
}

// ============================================================================
// Taxation system (SNO)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxationSystem {
    Osn,
    UsnIncome,
    UsnIncomeOutcome,
    Envd,
    Patent,
    Esn,
}

/// Ferma `TaxationSystem` → Atol `sno`. Default: `osn`.
pub fn taxation_system(ferma_sno: Option<&str>) -> TaxationSystem {
    match ferma_sno {
        Some("Common") => TaxationSystem::Osn,
        Some("Simplified") => TaxationSystem::UsnIncome,
        Some("SimplifiedWithExpenses") => TaxationSystem::UsnIncomeOutcome,
        Some("Unified") => TaxationSystem::Envd,
        Some("Patent") => TaxationSystem::Patent,
        Some("UnifiedAgricultural") => TaxationSystem::Esn,
        _ => TaxationSystem::Osn,
    }
}

// ============================================================================
// Operation / document type
// ============================================================================

/// Upstream operation keyword; also the last segment of the submission URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Sell,
    SellRefund,
    Buy,
    BuyRefund,
    SellCorrection,
    BuyCorrection,
    SellRefundCorrection,
    BuyRefundCorrection,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Sell,
        Operation::SellRefund,
        Operation::Buy,
        Operation::BuyRefund,
        Operation::SellCorrection,
        Operation::BuyCorrection,
        Operation::SellRefundCorrection,
        Operation::BuyRefundCorrection,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Operation::Sell => "sell",
            Operation::SellRefund => "sell_refund",
            Operation::Buy => "buy",
            Operation::BuyRefund => "buy_refund",
            Operation::SellCorrection => "sell_correction",
            Operation::BuyCorrection => "buy_correction",
            Operation::SellRefundCorrection => "sell_refund_correction",
            Operation::BuyRefundCorrection => "buy_refund_correction",
        }
    }

    /// Corrections are sent as aggregate VAT breakdowns, never as item lists.
    pub fn is_correction(self) -> bool {
        matches!(
            self,
            Operation::SellCorrection
                | Operation::BuyCorrection
                | Operation::SellRefundCorrection
                | Operation::BuyRefundCorrection
        )
    }

    /// Ferma `Type` → upstream operation. Both spellings of each correction
    /// variant are accepted. Default: `sell`.
    pub fn from_ferma_type(ferma_type: Option<&str>) -> Self {
        match ferma_type {
            Some("Income") => Operation::Sell,
            Some("IncomeReturn") => Operation::SellRefund,
            Some("Outcome") => Operation::Buy,
            Some("OutcomeReturn") => Operation::BuyRefund,
            Some("IncomeCorrection") | Some("SellCorrection") => Operation::SellCorrection,
            Some("OutcomeCorrection") | Some("BuyCorrection") => Operation::BuyCorrection,
            Some("IncomeReturnCorrection") | Some("SellRefundCorrection") => {
                Operation::SellRefundCorrection
            }
            Some("OutcomeReturnCorrection") | Some("BuyRefundCorrection") => {
                Operation::BuyRefundCorrection
            }
            _ => Operation::Sell,
        }
    }

    /// Upstream keyword as sent by Simple-format callers. Default: `sell`.
    pub fn from_keyword(keyword: Option<&str>) -> Self {
        keyword
            .and_then(|k| Self::ALL.into_iter().find(|op| op.keyword() == k))
            .unwrap_or(Operation::Sell)
    }
}

// ============================================================================
// Document status
// ============================================================================

/// Processing state reported by the upstream report endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStatus {
    Wait,
    Done,
    Fail,
}

impl UpstreamStatus {
    /// `done`/`ready` → Done, `fail`/`error` → Fail, anything else → Wait.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("done") | Some("ready") => UpstreamStatus::Done,
            Some("fail") | Some("error") => UpstreamStatus::Fail,
            _ => UpstreamStatus::Wait,
        }
    }

    /// Ferma status triple: numeric code, symbolic name, message.
    pub fn ferma_status(self) -> (i32, &'static str, &'static str) {
        match self {
            UpstreamStatus::Wait => (0, "NEW", "receipt request received"),
            UpstreamStatus::Done => (1, "PROCESSED", "receipt issued at register"),
            UpstreamStatus::Fail => (-1, "ERROR", "receipt creation failed"),
        }
    }
}

// ============================================================================
// Payment agent type
// ============================================================================

/// Ferma `PaymentAgentInfo.AgentType` → Atol `agent_info.type`. Default: `6` (agent).
pub fn agent_type(ferma_agent: Option<&str>) -> u8 {
    match ferma_agent {
        Some("BANK_PAYMENT_AGENT") => 0,
        Some("BANK_PAYMENT_SUBAGENT") => 1,
        Some("PAYMENT_AGENT") => 2,
        Some("PAYMENT_SUBAGENT") => 3,
        Some("ATTORNEY") => 4,
        Some("COMMISSION_AGENT") => 5,
        Some("AGENT") => 6,
        _ => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vat_table_is_total() {
        let cases = [
            ("VatNo", VatType::None),
            ("Vat0", VatType::Vat0),
            ("Vat10", VatType::Vat10),
            ("Vat20", VatType::Vat20),
            ("CalculatedVat10110", VatType::Vat10),
            ("CalculatedVat20120", VatType::Vat20),
        ];
        for (input, expected) in cases {
            assert_eq!(vat_type(Some(input)), expected, "vat {input}");
        }
        assert_eq!(vat_type(Some("Vat18")), VatType::None);
        assert_eq!(vat_type(None), VatType::None);
    }

    #[test]
    fn test_vat_serializes_to_atol_tags() {
        assert_eq!(serde_json::to_value(VatType::Vat20).unwrap(), "vat20");
        assert_eq!(serde_json::to_value(VatType::None).unwrap(), "none");
    }

    #[test]
    fn test_payment_method_codes() {
        let expected = [
            "full_prepayment",
            "prepayment",
            "advance",
            "full_payment",
            "partial_payment",
            "credit",
            "credit_payment",
        ];
        for (code, tag) in expected.iter().enumerate() {
            let method = payment_method(Some(code as i64));
            assert_eq!(serde_json::to_value(method).unwrap(), *tag);
        }
        assert_eq!(payment_method(Some(7)), PaymentMethod::FullPayment);
        assert_eq!(payment_method(Some(-1)), PaymentMethod::FullPayment);
        assert_eq!(payment_method(None), PaymentMethod::FullPayment);
    }

    #[test]
    fn test_measure_codes() {
        assert_eq!(measure_code(Some("PIECE")), 0);
        assert_eq!(measure_code(Some("KILOGRAM")), 11);
        assert_eq!(measure_code(Some("CUBIC_METER")), 42);
        assert_eq!(measure_code(Some("TERABYTE")), 83);
        assert_eq!(measure_code(Some("OTHER")), 255);
        assert_eq!(measure_code(Some("FURLONG")), 0);
        assert_eq!(measure_code(None), 0);
    }

    #[test]
    fn test_taxation_system() {
        let cases = [
            ("Common", "osn"),
            ("Simplified", "usn_income"),
            ("SimplifiedWithExpenses", "usn_income_outcome"),
            ("Unified", "envd"),
            ("Patent", "patent"),
            ("UnifiedAgricultural", "esn"),
        ];
        for (input, tag) in cases {
            assert_eq!(serde_json::to_value(taxation_system(Some(input))).unwrap(), tag);
        }
        assert_eq!(taxation_system(Some("Unknown")), TaxationSystem::Osn);
        assert_eq!(taxation_system(None), TaxationSystem::Osn);
    }

    #[test]
    fn test_all_twelve_ferma_types_resolve() {
        let cases = [
            ("Income", "sell"),
            ("IncomeReturn", "sell_refund"),
            ("Outcome", "buy"),
            ("OutcomeReturn", "buy_refund"),
            ("IncomeCorrection", "sell_correction"),
            ("SellCorrection", "sell_correction"),
            ("OutcomeCorrection", "buy_correction"),
            ("BuyCorrection", "buy_correction"),
            ("IncomeReturnCorrection", "sell_refund_correction"),
            ("SellRefundCorrection", "sell_refund_correction"),
            ("OutcomeReturnCorrection", "buy_refund_correction"),
            ("BuyRefundCorrection", "buy_refund_correction"),
        ];
        for (input, keyword) in cases {
            let op = Operation::from_ferma_type(Some(input));
            assert_eq!(op.keyword(), keyword, "type {input}");
            assert_eq!(op.is_correction(), keyword.ends_with("_correction"));
        }
        assert_eq!(Operation::from_ferma_type(Some("Bogus")), Operation::Sell);
        assert_eq!(Operation::from_ferma_type(None), Operation::Sell);
    }

    #[test]
    fn test_keyword_lookup() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_keyword(Some(op.keyword())), op);
        }
        assert_eq!(Operation::from_keyword(Some("../getToken")), Operation::Sell);
        assert_eq!(Operation::from_keyword(None), Operation::Sell);
    }

    #[test]
    fn test_status_table() {
        assert_eq!(UpstreamStatus::parse(Some("wait")), UpstreamStatus::Wait);
        assert_eq!(UpstreamStatus::parse(Some("done")), UpstreamStatus::Done);
        assert_eq!(UpstreamStatus::parse(Some("ready")), UpstreamStatus::Done);
        assert_eq!(UpstreamStatus::parse(Some("fail")), UpstreamStatus::Fail);
        assert_eq!(UpstreamStatus::parse(Some("error")), UpstreamStatus::Fail);
        assert_eq!(UpstreamStatus::parse(Some("weird")), UpstreamStatus::Wait);
        assert_eq!(UpstreamStatus::parse(None), UpstreamStatus::Wait);

        assert_eq!(UpstreamStatus::Wait.ferma_status().0, 0);
        assert_eq!(UpstreamStatus::Done.ferma_status().1, "PROCESSED");
        assert_eq!(UpstreamStatus::Fail.ferma_status().0, -1);
    }

    #[test]
    fn test_agent_type() {
        assert_eq!(agent_type(Some("BANK_PAYMENT_AGENT")), 0);
        assert_eq!(agent_type(Some("COMMISSION_AGENT")), 5);
        assert_eq!(agent_type(Some("SOMETHING")), 6);
        assert_eq!(agent_type(None), 6);
    }
}
