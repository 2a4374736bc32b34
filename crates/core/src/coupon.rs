//! Discount coupons.
//!
//! Codes are stored trimmed and upper-cased, so `save10` and `SAVE10` are the
//! same coupon. Values are either a percentage (0 < v ≤ 100) or a fixed
//! amount (v > 0).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::impl_record;
use crate::types::{new_id, EntityId, Timestamp};

/// Maximum length of a coupon code.
pub const MAX_CODE_LENGTH: usize = 32;

/// How a coupon discounts a price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum CouponValue {
    Percent(f64),
    Amount(f64),
}

impl CouponValue {
    pub fn amount(self) -> f64 {
        match self {
            Self::Percent(v) | Self::Amount(v) => v,
        }
    }

    pub fn type_label(self) -> &'static str {
        match self {
            Self::Percent(_) => "Percent",
            Self::Amount(_) => "Amount",
        }
    }

    /// Price after the discount, never below zero.
    pub fn apply(self, price: f64) -> f64 {
        let discounted = match self {
            Self::Percent(p) => price - price * p / 100.0,
            Self::Amount(a) => price - a,
        };
        discounted.max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: EntityId,
    pub code: String,
    pub value: CouponValue,
    pub uses_left: u32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_record!(Coupon, "coupons", "Coupon");

#[derive(Debug, Clone, Deserialize)]
pub struct CouponDraft {
    pub code: String,
    pub value: CouponValue,
    pub uses_left: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Trim and upper-case a coupon code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validate a normalized code: non-empty, bounded, alphanumeric plus `-`/`_`.
pub fn validate_code(code: &str) -> Result<(), CoreError> {
    if code.is_empty() {
        return Err(CoreError::Validation("Coupon code cannot be empty".to_string()));
    }
    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Coupon code exceeds maximum length of {MAX_CODE_LENGTH} characters"
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Coupon code '{code}' may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

/// Validate a coupon value: positive, finite, and at most 100 for percents.
pub fn validate_value(value: CouponValue) -> Result<(), CoreError> {
    let v = value.amount();
    if !v.is_finite() || v <= 0.0 {
        return Err(CoreError::Validation(
            "Coupon value must be greater than 0".to_string(),
        ));
    }
    if let CouponValue::Percent(p) = value {
        if p > 100.0 {
            return Err(CoreError::Validation(
                "Percent coupons cannot exceed 100".to_string(),
            ));
        }
    }
    Ok(())
}

impl Coupon {
    pub fn from_draft(draft: CouponDraft, now: Timestamp) -> Result<Self, CoreError> {
        let code = normalize_code(&draft.code);
        validate_code(&code)?;
        validate_value(draft.value)?;
        Ok(Self {
            id: new_id(),
            code,
            value: draft.value,
            uses_left: draft.uses_left,
            active: draft.active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_draft(&mut self, draft: CouponDraft, now: Timestamp) -> Result<(), CoreError> {
        let code = normalize_code(&draft.code);
        validate_code(&code)?;
        validate_value(draft.value)?;
        self.code = code;
        self.value = draft.value;
        self.uses_left = draft.uses_left;
        self.active = draft.active;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_redeemable(&self) -> bool {
        self.active && self.uses_left > 0
    }

    /// Consume one use and return the discounted price.
    pub fn redeem(&mut self, price: f64, now: Timestamp) -> Result<f64, CoreError> {
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::Validation(
                "Price must be a non-negative number".to_string(),
            ));
        }
        if !self.active {
            return Err(CoreError::Conflict(format!(
                "Coupon {} is inactive",
                self.code
            )));
        }
        if self.uses_left == 0 {
            return Err(CoreError::Conflict(format!(
                "Coupon {} has no uses left",
                self.code
            )));
        }
        self.uses_left -= 1;
        self.updated_at = now;
        Ok(self.value.apply(price))
    }

    pub fn row(&self) -> CouponRow {
        CouponRow {
            id: self.id,
            code: self.code.clone(),
            type_label: self.value.type_label(),
            value: format_number(self.value.amount()),
            uses_left: self.uses_left,
            status: if self.active { "Active" } else { "Inactive" },
        }
    }
}

/// A coupon as shown in the coupon table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponRow {
    pub id: EntityId,
    pub code: String,
    #[serde(rename = "type")]
    pub type_label: &'static str,
    pub value: String,
    pub uses_left: u32,
    pub status: &'static str,
}

/// Format without trailing zeros: `10`, `12.5`, `0.25`.
pub fn format_number(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Whether `code` (any case) is already used by a coupon other than `except`.
pub fn code_taken<'a>(
    coupons: impl IntoIterator<Item = &'a Coupon>,
    code: &str,
    except: Option<EntityId>,
) -> bool {
    let code = normalize_code(code);
    coupons
        .into_iter()
        .any(|c| c.code == code && Some(c.id) != except)
}
