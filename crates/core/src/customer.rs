//! Customer and prospect records for the CRM.
//!
//! A single [`Customer`] type covers both customers and prospects; the
//! [`CustomerKind`] discriminator decides which listing surfaces a record, and
//! converting a prospect is a field mutation on the same record.
//!
//! Vehicle condition ratings are typed fields. Older records carried them
//! inside the free-text notes as `[Condition: inside 3/5, outside 4/5]`;
//! [`extract_condition_tag`] and [`embed_condition_tag`] exist only to import
//! and export that legacy form.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::impl_record;
use crate::types::{new_id, EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest valid condition rating.
pub const MIN_CONDITION: u8 = 1;

/// Highest valid condition rating.
pub const MAX_CONDITION: u8 = 5;

/// Maximum length of a customer name.
pub const MAX_NAME_LENGTH: usize = 120;

static CONDITION_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[\s*condition:\s*(?:inside\s+([1-5])\s*/\s*5(?:\s*,\s*outside\s+([1-5])\s*/\s*5)?|outside\s+([1-5])\s*/\s*5)\s*\]",
    )
    .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which listing a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerKind {
    #[default]
    Customer,
    Prospect,
}

impl CustomerKind {
    /// Parse from the wire/query form (`customer` | `prospect`).
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "customer" => Ok(Self::Customer),
            "prospect" => Ok(Self::Prospect),
            other => Err(CoreError::Validation(format!(
                "Invalid customer type '{other}'. Must be one of: customer, prospect"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Prospect => "prospect",
        }
    }
}

/// Vehicle descriptor. Every field is optional; prospects often have none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub year: Option<u16>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

impl Vehicle {
    /// `true` when no field carries information.
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && blank(self.make.as_deref())
            && blank(self.model.as_deref())
            && blank(self.color.as_deref())
    }

    /// One-line description, e.g. `2021 Tesla Model 3 (white)`.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        for part in [&self.make, &self.model].into_iter().flatten() {
            if !part.trim().is_empty() {
                parts.push(part.trim().to_string());
            }
        }
        let mut out = parts.join(" ");
        if let Some(color) = self.color.as_deref().filter(|c| !c.trim().is_empty()) {
            if out.is_empty() {
                out = color.trim().to_string();
            } else {
                out = format!("{out} ({})", color.trim());
            }
        }
        out
    }
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Photo and video links attached to a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSet {
    pub general: Vec<String>,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub videos: Vec<String>,
}

impl MediaSet {
    pub fn len(&self) -> usize {
        self.general.len() + self.before.len() + self.after.len() + self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A customer or prospect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: EntityId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub vehicle: Option<Vehicle>,
    pub condition_inside: Option<u8>,
    pub condition_outside: Option<u8>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub media: MediaSet,
    #[serde(rename = "type")]
    pub kind: CustomerKind,
    #[serde(default)]
    pub archived: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_record!(Customer, "customers", "Customer");

/// Form input for creating or editing a customer.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CustomerDraft {
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub vehicle: Option<Vehicle>,
    #[validate(range(min = 1, max = 5, message = "inside condition must be 1-5"))]
    pub condition_inside: Option<u8>,
    #[validate(range(min = 1, max = 5, message = "outside condition must be 1-5"))]
    pub condition_outside: Option<u8>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub media: MediaSet,
    #[serde(default, rename = "type")]
    pub kind: CustomerKind,
}

impl CustomerDraft {
    /// Run field validation plus the checks `validator` cannot express.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("name is required".to_string()));
        }
        Ok(())
    }
}

impl Customer {
    /// Build a new record from a validated draft.
    pub fn from_draft(draft: CustomerDraft, now: Timestamp) -> Result<Self, CoreError> {
        draft.check()?;
        Ok(Self {
            id: new_id(),
            name: draft.name.trim().to_string(),
            email: normalize_optional(draft.email),
            phone: normalize_optional(draft.phone),
            address: normalize_optional(draft.address),
            vehicle: draft.vehicle.filter(|v| !v.is_empty()),
            condition_inside: draft.condition_inside,
            condition_outside: draft.condition_outside,
            notes: draft.notes,
            media: draft.media,
            kind: draft.kind,
            archived: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace every editable field with the draft's values.
    ///
    /// `id`, `created_at` and `archived` are preserved.
    pub fn apply_draft(&mut self, draft: CustomerDraft, now: Timestamp) -> Result<(), CoreError> {
        draft.check()?;
        self.name = draft.name.trim().to_string();
        self.email = normalize_optional(draft.email);
        self.phone = normalize_optional(draft.phone);
        self.address = normalize_optional(draft.address);
        self.vehicle = draft.vehicle.filter(|v| !v.is_empty());
        self.condition_inside = draft.condition_inside;
        self.condition_outside = draft.condition_outside;
        self.notes = draft.notes;
        self.media = draft.media;
        self.kind = draft.kind;
        self.updated_at = now;
        Ok(())
    }

    /// Turn a prospect into a customer. No-op for existing customers.
    pub fn convert_to_customer(&mut self, now: Timestamp) -> bool {
        if self.kind == CustomerKind::Customer {
            return false;
        }
        self.kind = CustomerKind::Customer;
        self.updated_at = now;
        true
    }

    /// Notes in the legacy form, with the condition tag embedded.
    pub fn legacy_notes(&self) -> String {
        embed_condition_tag(&self.notes, self.condition_inside, self.condition_outside)
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Records of the given kind, optionally including archived ones, sorted
/// by name (case-insensitive).
pub fn listing<'a>(
    rows: impl IntoIterator<Item = &'a Customer>,
    kind: CustomerKind,
    include_archived: bool,
) -> Vec<&'a Customer> {
    let mut out: Vec<&Customer> = rows
        .into_iter()
        .filter(|c| c.kind == kind && (include_archived || !c.archived))
        .collect();
    out.sort_by_key(|c| c.name.to_lowercase());
    out
}

// ---------------------------------------------------------------------------
// Legacy condition tag
// ---------------------------------------------------------------------------

/// Ratings parsed out of legacy notes text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionTag {
    pub inside: Option<u8>,
    pub outside: Option<u8>,
    /// The notes with the tag removed and surrounding whitespace trimmed.
    pub remaining_notes: String,
}

/// Parse the first `[Condition: inside N/5, outside M/5]` tag out of `notes`.
///
/// Either half may be absent, but not both. Every tag occurrence is stripped from
/// `remaining_notes`.
pub fn extract_condition_tag(notes: &str) -> ConditionTag {
    let (inside, outside) = match CONDITION_TAG_RE.captures(notes) {
        Some(caps) => (
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2)
                .or_else(|| caps.get(3))
                .and_then(|m| m.as_str().parse().ok()),
        ),
        None => (None, None),
    };
    ConditionTag {
        inside,
        outside,
        remaining_notes: strip_condition_tags(notes),
    }
}

/// Write the ratings into `notes` as a single trailing tag, replacing any
/// existing tag. With neither rating present the tag is removed entirely.
pub fn embed_condition_tag(notes: &str, inside: Option<u8>, outside: Option<u8>) -> String {
    let body = strip_condition_tags(notes);
    let tag = match (inside, outside) {
        (Some(i), Some(o)) => format!("[Condition: inside {i}/5, outside {o}/5]"),
        (Some(i), None) => format!("[Condition: inside {i}/5]"),
        (None, Some(o)) => format!("[Condition: outside {o}/5]"),
        (None, None) => return body,
    };
    if body.is_empty() {
        tag
    } else {
        format!("{body}\n\n{tag}")
    }
}

fn strip_condition_tags(notes: &str) -> String {
    CONDITION_TAG_RE.replace_all(notes, "").trim().to_string()
}

/// Promote a legacy notes tag into the draft's typed fields.
///
/// Typed values already present win over the tag. The tag is removed from
/// the notes either way.
pub fn import_legacy_draft(mut draft: CustomerDraft) -> CustomerDraft {
    let tag = extract_condition_tag(&draft.notes);
    draft.condition_inside = draft.condition_inside.or(tag.inside);
    draft.condition_outside = draft.condition_outside.or(tag.outside);
    draft.notes = tag.remaining_notes;
    draft
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn draft(name: &str) -> CustomerDraft {
        CustomerDraft {
            name: name.to_string(),
            ..Default::default()
        }
    }

    // -- drafts --------------------------------------------------------------

    #[test]
    fn empty_name_rejected() {
        assert!(Customer::from_draft(draft(""), Utc::now()).is_err());
        assert!(Customer::from_draft(draft("   "), Utc::now()).is_err());
    }

    #[test]
    fn bad_email_rejected() {
        let mut d = draft("Jane Doe");
        d.email = Some("not-an-email".to_string());
        let err = Customer::from_draft(d, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn condition_out_of_range_rejected() {
        let mut d = draft("Jane Doe");
        d.condition_inside = Some(6);
        assert!(Customer::from_draft(d, Utc::now()).is_err());

        let mut d = draft("Jane Doe");
        d.condition_outside = Some(0);
        assert!(Customer::from_draft(d, Utc::now()).is_err());
    }

    #[test]
    fn empty_vehicle_dropped() {
        let mut d = draft("Jane Doe");
        d.vehicle = Some(Vehicle {
            make: Some("  ".to_string()),
            ..Default::default()
        });
        let c = Customer::from_draft(d, Utc::now()).unwrap();
        assert!(c.vehicle.is_none());
    }

    #[test]
    fn apply_draft_keeps_identity() {
        let now = Utc::now();
        let mut c = Customer::from_draft(draft("Jane"), now).unwrap();
        let id = c.id;
        c.archived = true;
        c.apply_draft(draft("Jane Doe"), now).unwrap();
        assert_eq!(c.id, id);
        assert_eq!(c.name, "Jane Doe");
        assert!(c.archived);
    }

    // -- listings ------------------------------------------------------------

    #[test]
    fn prospect_listed_only_as_prospect_until_converted() {
        let now = Utc::now();
        let mut d = draft("Jane Doe");
        d.kind = CustomerKind::Prospect;
        let mut jane = Customer::from_draft(d, now).unwrap();
        let bob = Customer::from_draft(draft("Bob"), now).unwrap();

        let rows = vec![jane.clone(), bob.clone()];
        let prospects = listing(&rows, CustomerKind::Prospect, false);
        let customers = listing(&rows, CustomerKind::Customer, false);
        assert_eq!(prospects.len(), 1);
        assert_eq!(prospects[0].name, "Jane Doe");
        assert!(customers.iter().all(|c| c.name != "Jane Doe"));

        assert!(jane.convert_to_customer(now));
        assert!(!jane.convert_to_customer(now));
        let rows = vec![jane, bob];
        assert!(listing(&rows, CustomerKind::Prospect, false).is_empty());
        assert_eq!(listing(&rows, CustomerKind::Customer, false).len(), 2);
    }

    #[test]
    fn archived_hidden_by_default() {
        let mut c = Customer::from_draft(draft("Old"), Utc::now()).unwrap();
        c.archived = true;
        let rows = vec![c];
        assert!(listing(&rows, CustomerKind::Customer, false).is_empty());
        assert_eq!(listing(&rows, CustomerKind::Customer, true).len(), 1);
    }

    #[test]
    fn kind_parse() {
        assert_eq!(CustomerKind::parse("prospect").unwrap(), CustomerKind::Prospect);
        assert!(CustomerKind::parse("lead").is_err());
    }

    #[test]
    fn kind_serializes_as_type_field() {
        let c = Customer::from_draft(draft("Jane"), Utc::now()).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "customer");
    }

    #[test]
    fn vehicle_description() {
        let v = Vehicle {
            year: Some(2021),
            make: Some("Tesla".to_string()),
            model: Some("Model 3".to_string()),
            color: Some("white".to_string()),
        };
        assert_eq!(v.describe(), "2021 Tesla Model 3 (white)");
        assert_eq!(Vehicle::default().describe(), "");
    }

    // -- legacy tag ----------------------------------------------------------

    #[test]
    fn extract_both_ratings() {
        let tag = extract_condition_tag("Swirls on hood.\n\n[Condition: inside 3/5, outside 4/5]");
        assert_eq!(tag.inside, Some(3));
        assert_eq!(tag.outside, Some(4));
        assert_eq!(tag.remaining_notes, "Swirls on hood.");
    }

    #[test]
    fn extract_single_rating() {
        let tag = extract_condition_tag("[condition: outside 2/5] needs clay bar");
        assert_eq!(tag.inside, None);
        assert_eq!(tag.outside, Some(2));
        assert_eq!(tag.remaining_notes, "needs clay bar");
    }

    #[test]
    fn empty_tags_are_left_in_free_text() {
        for notes in ["Ask about [Condition:] later", "See [condition: ,] form"] {
            let tag = extract_condition_tag(notes);
            assert_eq!(tag.inside, None);
            assert_eq!(tag.outside, None);
            assert_eq!(tag.remaining_notes, notes);
        }
    }

    #[test]
    fn extract_without_tag() {
        let tag = extract_condition_tag("plain notes");
        assert_eq!(tag.inside, None);
        assert_eq!(tag.outside, None);
        assert_eq!(tag.remaining_notes, "plain notes");
    }

    #[test]
    fn embed_replaces_existing_tag() {
        let notes = embed_condition_tag("Hood [Condition: inside 1/5] scratch", Some(5), Some(2));
        assert_eq!(notes.matches("[Condition").count(), 1);
        assert!(notes.ends_with("[Condition: inside 5/5, outside 2/5]"));
    }

    #[test]
    fn embed_without_ratings_removes_tag() {
        let notes = embed_condition_tag("Hood\n[Condition: inside 1/5]", None, None);
        assert_eq!(notes, "Hood");
    }

    #[test]
    fn ratings_survive_free_text_edits() {
        let saved = embed_condition_tag("Pet hair in trunk.", Some(2), Some(4));
        let edited = format!("Returning customer. {saved}\nPrefers mornings.");
        let tag = extract_condition_tag(&edited);
        assert_eq!(tag.inside, Some(2));
        assert_eq!(tag.outside, Some(4));
    }

    #[test]
    fn import_promotes_tag_to_fields() {
        let mut d = draft("Jane");
        d.notes = "Ceramic coat.\n[Condition: inside 4/5, outside 3/5]".to_string();
        let d = import_legacy_draft(d);
        assert_eq!(d.condition_inside, Some(4));
        assert_eq!(d.condition_outside, Some(3));
        assert_eq!(d.notes, "Ceramic coat.");
    }

    #[test]
    fn import_prefers_typed_values() {
        let mut d = draft("Jane");
        d.condition_inside = Some(1);
        d.notes = "[Condition: inside 4/5, outside 3/5]".to_string();
        let d = import_legacy_draft(d);
        assert_eq!(d.condition_inside, Some(1));
        assert_eq!(d.condition_outside, Some(3));
    }

    #[test]
    fn legacy_notes_round_trip() {
        let mut d = draft("Jane");
        d.condition_inside = Some(3);
        d.condition_outside = Some(5);
        d.notes = "Wax only.".to_string();
        let c = Customer::from_draft(d, Utc::now()).unwrap();

        let reopened = extract_condition_tag(&c.legacy_notes());
        assert_eq!(reopened.inside, c.condition_inside);
        assert_eq!(reopened.outside, c.condition_outside);
        assert_eq!(reopened.remaining_notes, "Wax only.");
    }
}
