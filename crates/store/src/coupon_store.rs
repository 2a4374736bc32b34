//! Coupon store. Codes are unique across the table, compared after
//! normalization.

use detailhq_core::coupon::{code_taken, normalize_code, Coupon, CouponDraft, CouponRow};
use detailhq_core::error::CoreError;
use detailhq_core::types::{EntityId, Timestamp};
use serde::Serialize;

use crate::collection::{SyncStatus, SyncedCollection};
use crate::commands::FlushReport;
use crate::error::StoreError;
use crate::repository::Repository;

/// Result of redeeming a coupon against a price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Redemption {
    pub coupon_id: EntityId,
    pub code: String,
    pub original_price: f64,
    pub discounted_price: f64,
    pub uses_left: u32,
}

pub struct CouponStore {
    coupons: SyncedCollection<Coupon>,
}

impl CouponStore {
    pub fn new(repo: Repository<Coupon>) -> Self {
        Self {
            coupons: SyncedCollection::new(repo),
        }
    }

    pub fn collection_mut(&mut self) -> &mut SyncedCollection<Coupon> {
        &mut self.coupons
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.coupons.refresh().await
    }

    pub async fn flush(&mut self) -> FlushReport {
        self.coupons.flush().await
    }

    pub async fn retry_failed(&mut self) -> FlushReport {
        self.coupons.retry_failed().await
    }

    pub fn status(&self) -> SyncStatus {
        self.coupons.status()
    }

    pub fn coupons(&self) -> &[Coupon] {
        self.coupons.rows()
    }

    /// Table rows, sorted by code.
    pub fn rows(&self) -> Vec<CouponRow> {
        let mut rows: Vec<CouponRow> = self.coupons.rows().iter().map(Coupon::row).collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        rows
    }

    pub fn get(&self, id: EntityId) -> Result<&Coupon, CoreError> {
        self.coupons.require(id)
    }

    pub fn create(&mut self, draft: CouponDraft, now: Timestamp) -> Result<Coupon, CoreError> {
        self.ensure_code_free(&draft.code, None)?;
        let coupon = Coupon::from_draft(draft, now)?;
        tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon created");
        self.coupons.insert(coupon.clone());
        Ok(coupon)
    }

    pub fn update(
        &mut self,
        id: EntityId,
        draft: CouponDraft,
        now: Timestamp,
    ) -> Result<Coupon, CoreError> {
        self.ensure_code_free(&draft.code, Some(id))?;
        let coupon = self.coupons.update_with(id, |c| {
            c.apply_draft(draft, now)?;
            Ok(c.clone())
        })?;
        tracing::info!(coupon_id = %id, code = %coupon.code, "Coupon updated");
        Ok(coupon)
    }

    pub fn delete(&mut self, id: EntityId) -> Result<Coupon, CoreError> {
        let coupon = self.coupons.remove(id)?;
        tracing::info!(coupon_id = %id, code = %coupon.code, "Coupon deleted");
        Ok(coupon)
    }

    /// Apply the coupon to `price`, consuming one use.
    pub fn redeem(
        &mut self,
        id: EntityId,
        price: f64,
        now: Timestamp,
    ) -> Result<Redemption, CoreError> {
        let redemption = self.coupons.update_with(id, |c| {
            let discounted_price = c.redeem(price, now)?;
            Ok(Redemption {
                coupon_id: c.id,
                code: c.code.clone(),
                original_price: price,
                discounted_price,
                uses_left: c.uses_left,
            })
        })?;
        tracing::info!(
            coupon_id = %id,
            uses_left = redemption.uses_left,
            "Coupon redeemed"
        );
        Ok(redemption)
    }

    fn ensure_code_free(&self, code: &str, except: Option<EntityId>) -> Result<(), CoreError> {
        if code_taken(self.coupons.rows(), code, except) {
            return Err(CoreError::Conflict(format!(
                "Coupon code '{}' already exists",
                normalize_code(code)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRemote;
    use crate::test_support::repo;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use detailhq_core::coupon::CouponValue;

    fn draft(code: &str, value: CouponValue, uses_left: u32) -> CouponDraft {
        CouponDraft {
            code: code.into(),
            value,
            uses_left,
            active: true,
        }
    }

    fn store() -> CouponStore {
        CouponStore::new(repo(&MemoryRemote::new()))
    }

    #[test]
    fn create_lists_normalized_row() {
        let mut store = store();
        store
            .create(draft("save10", CouponValue::Percent(10.0), 100), Utc::now())
            .unwrap();
        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code, "SAVE10");
        assert_eq!(rows[0].type_label, "Percent");
        assert_eq!(rows[0].value, "10");
        assert_eq!(rows[0].status, "Active");
    }

    #[test]
    fn duplicate_code_conflicts_case_insensitively() {
        let mut store = store();
        store
            .create(draft("SAVE10", CouponValue::Percent(10.0), 1), Utc::now())
            .unwrap();
        assert_matches!(
            store.create(draft("save10", CouponValue::Amount(5.0), 1), Utc::now()),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn update_may_keep_own_code() {
        let mut store = store();
        let c = store
            .create(draft("SAVE10", CouponValue::Percent(10.0), 1), Utc::now())
            .unwrap();
        let updated = store
            .update(c.id, draft("save10", CouponValue::Percent(15.0), 5), Utc::now())
            .unwrap();
        assert_eq!(updated.value, CouponValue::Percent(15.0));
    }

    #[test]
    fn redeem_until_exhausted() {
        let mut store = store();
        let c = store
            .create(draft("TWO", CouponValue::Amount(30.0), 2), Utc::now())
            .unwrap();
        let r = store.redeem(c.id, 100.0, Utc::now()).unwrap();
        assert_eq!(r.discounted_price, 70.0);
        assert_eq!(r.uses_left, 1);
        let r = store.redeem(c.id, 20.0, Utc::now()).unwrap();
        assert_eq!(r.discounted_price, 0.0);
        assert_matches!(
            store.redeem(c.id, 20.0, Utc::now()),
            Err(CoreError::Conflict(_))
        );
        assert_eq!(store.get(c.id).unwrap().uses_left, 0);
    }
}
