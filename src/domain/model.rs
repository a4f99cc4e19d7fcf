use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Column headers of the legacy workbooks. The labels are whatever the
/// source sheets carry; field extraction requires an exact match.
pub mod columns {
    pub mod customers {
        pub const LEGACY_CODE: &str = "كود";
        pub const FULL_NAME: &str = "أسماء العملاء";
        pub const PHONE_1: &str = "Mobile";
        pub const PHONE_2: &str = "Mobile2";
    }

    pub mod transactions {
        pub const CUSTOMER_LEGACY_CODE: &str = "رقم العميل";
        pub const LEGACY_CODE: &str = "رقم البيع";
        pub const GOODS_PRICE: &str = "سعر السلعة";
        pub const INSTALLMENTS_COUNT: &str = "عدد الدفعات";
        pub const MONTHLY_INSTALLMENT: &str = "القسط الشهرى";
        pub const FIRST_PAYMENT_DATE: &str = "تاريخ بدء القرض";
    }

    pub mod payments {
        pub const TRANSACTION_LEGACY_CODE: &str = "رقم البيع";
        pub const PAYMENT_DATE: &str = "تاريخ الدفعة";
        pub const AMOUNT_PRIMARY: &str = "قيمة الدفعة";
        pub const AMOUNT_FALLBACK: &str = "التحصيل";
    }
}

/// One raw row decoded from a workbook sheet, keyed by source column header.
/// Empty cells are absent keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(data: HashMap<String, serde_json::Value>) -> Self {
        Self { data }
    }

    /// Integer cell. Spreadsheet decoders hand numeric cells back as floats,
    /// so integral floats count too.
    pub fn integer(&self, column: &str) -> Option<i64> {
        let value = self.data.get(column)?;
        if let Some(n) = value.as_i64() {
            return Some(n);
        }
        let f = value.as_f64()?;
        if f.is_finite() && f.fract() == 0.0 {
            Some(f as i64)
        } else {
            None
        }
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.data.get(column)?.as_f64()
    }

    /// Cell as text: strings are trimmed, integral numbers are rendered
    /// without a fractional part (phone columns hold numeric cells).
    pub fn text(&self, column: &str) -> Option<String> {
        let value = self.data.get(column)?;
        match value {
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            serde_json::Value::Number(_) => {
                if let Some(n) = self.integer(column) {
                    Some(n.to_string())
                } else {
                    value.as_f64().map(|f| f.to_string())
                }
            }
            _ => None,
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.data.contains_key(column)
    }
}

/// Normalized customer record, shaped as the store's insert body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCustomer {
    pub full_name: String,
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
}

/// Normalized transaction record. `customer_id` is the store-assigned id
/// resolved through the customer legacy-id map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTransaction {
    pub customer_id: String,
    pub goods_price: f64,
    pub monthly_installment: f64,
    pub installments_count: i64,
    pub first_payment_date: Option<String>,
}

/// Normalized payment record. Terminal phase, no legacy code of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPayment {
    pub transaction_id: String,
    pub payment_amount: f64,
    pub payment_date: Option<String>,
}

/// Where a migration run currently stands, derived from which id maps exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    Idle,
    CustomersImported,
    TransactionsImported,
    PaymentsComplete,
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MigrationPhase::Idle => "idle (no phase completed)",
            MigrationPhase::CustomersImported => "customers imported",
            MigrationPhase::TransactionsImported => "transactions imported",
            MigrationPhase::PaymentsComplete => "payments complete",
        };
        f.write_str(label)
    }
}

/// Outcome of one import phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    pub inserted: usize,
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
        let mut data = HashMap::new();
        for (k, v) in pairs {
            data.insert(k.to_string(), v.clone());
        }
        Record::new(data)
    }

    #[test]
    fn test_integer_accepts_integral_floats() {
        let r = record(&[("a", json!(7)), ("b", json!(7.0)), ("c", json!(7.5))]);
        assert_eq!(r.integer("a"), Some(7));
        assert_eq!(r.integer("b"), Some(7));
        assert_eq!(r.integer("c"), None);
        assert_eq!(r.integer("missing"), None);
    }

    #[test]
    fn test_text_renders_numeric_phone_without_fraction() {
        let r = record(&[("Mobile", json!(1012345678.0))]);
        assert_eq!(r.text("Mobile"), Some("1012345678".to_string()));
    }

    #[test]
    fn test_text_trims_and_drops_blank_strings() {
        let r = record(&[("name", json!("  أحمد  ")), ("blank", json!("   "))]);
        assert_eq!(r.text("name"), Some("أحمد".to_string()));
        assert_eq!(r.text("blank"), None);
    }

    #[test]
    fn test_new_customer_serializes_null_phones() {
        let c = NewCustomer {
            full_name: "Test".to_string(),
            phone_1: None,
            phone_2: Some("123".to_string()),
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["phone_1"], serde_json::Value::Null);
        assert_eq!(v["phone_2"], json!("123"));
    }
}
