//! Customer and prospect store.

use detailhq_core::customer::{import_legacy_draft, listing, Customer, CustomerDraft, CustomerKind};
use detailhq_core::error::CoreError;
use detailhq_core::types::{EntityId, Timestamp};

use crate::collection::{SyncStatus, SyncedCollection};
use crate::commands::FlushReport;
use crate::error::StoreError;
use crate::repository::Repository;

pub struct CustomerStore {
    customers: SyncedCollection<Customer>,
}

impl CustomerStore {
    pub fn new(repo: Repository<Customer>) -> Self {
        Self {
            customers: SyncedCollection::new(repo),
        }
    }

    pub fn collection_mut(&mut self) -> &mut SyncedCollection<Customer> {
        &mut self.customers
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.customers.refresh().await
    }

    pub async fn flush(&mut self) -> FlushReport {
        self.customers.flush().await
    }

    pub async fn retry_failed(&mut self) -> FlushReport {
        self.customers.retry_failed().await
    }

    pub fn status(&self) -> SyncStatus {
        self.customers.status()
    }

    /// Records of `kind`, sorted by name. Archived records only when asked.
    pub fn list(&self, kind: CustomerKind, include_archived: bool) -> Vec<Customer> {
        listing(self.customers.rows(), kind, include_archived)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get(&self, id: EntityId) -> Result<&Customer, CoreError> {
        self.customers.require(id)
    }

    pub fn create(&mut self, draft: CustomerDraft, now: Timestamp) -> Result<Customer, CoreError> {
        let customer = Customer::from_draft(draft, now)?;
        tracing::info!(
            customer_id = %customer.id,
            kind = customer.kind.as_str(),
            "Customer created"
        );
        self.customers.insert(customer.clone());
        Ok(customer)
    }

    /// Create from a legacy record whose condition ratings live in `notes`.
    pub fn import_legacy(
        &mut self,
        draft: CustomerDraft,
        now: Timestamp,
    ) -> Result<Customer, CoreError> {
        self.create(import_legacy_draft(draft), now)
    }

    pub fn update(
        &mut self,
        id: EntityId,
        draft: CustomerDraft,
        now: Timestamp,
    ) -> Result<Customer, CoreError> {
        let customer = self.customers.update_with(id, |c| {
            c.apply_draft(draft, now)?;
            Ok(c.clone())
        })?;
        tracing::info!(customer_id = %id, "Customer updated");
        Ok(customer)
    }

    pub fn delete(&mut self, id: EntityId) -> Result<Customer, CoreError> {
        let customer = self.customers.remove(id)?;
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(customer)
    }

    /// Turn a prospect into a customer. Converting a customer is a no-op.
    pub fn convert(&mut self, id: EntityId, now: Timestamp) -> Result<Customer, CoreError> {
        if self.customers.require(id)?.kind == CustomerKind::Customer {
            return self.get(id).cloned();
        }
        let customer = self.customers.update_with(id, |c| {
            c.convert_to_customer(now);
            Ok(c.clone())
        })?;
        tracing::info!(customer_id = %id, "Prospect converted to customer");
        Ok(customer)
    }

    pub fn set_archived(
        &mut self,
        id: EntityId,
        archived: bool,
        now: Timestamp,
    ) -> Result<Customer, CoreError> {
        let customer = self.customers.update_with(id, |c| {
            c.archived = archived;
            c.updated_at = now;
            Ok(c.clone())
        })?;
        tracing::info!(customer_id = %id, archived, "Customer archive flag set");
        Ok(customer)
    }
}
