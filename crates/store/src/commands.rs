//! Write-ahead command queue with explicit per-command status.
//!
//! Every optimistic mutation is recorded as a [`Command`]. `flush` sends
//! pending commands to the remote tier strictly in FIFO order; a failure
//! marks that command `Failed` and moves on to the next one.

use chrono::Utc;
use detailhq_core::record::Record;
use detailhq_core::types::{new_id, EntityId, Timestamp};
use serde::Serialize;

use crate::remote::RemoteTable;

/// Confirmed commands kept per queue as recent history. Older ones are
/// dropped at the end of each flush.
pub const MAX_CONFIRMED_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone)]
pub enum CommandOp<T> {
    Upsert(T),
    Delete,
}

impl<T> CommandOp<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upsert(_) => "upsert",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Command<T> {
    pub id: EntityId,
    pub table: &'static str,
    pub record_id: EntityId,
    pub op: CommandOp<T>,
    pub status: CommandStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub enqueued_at: Timestamp,
}

/// Payload-free view of a command, as reported at `/sync`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandSummary {
    pub id: EntityId,
    pub table: &'static str,
    pub record_id: EntityId,
    pub op: &'static str,
    pub status: CommandStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub enqueued_at: Timestamp,
}

impl<T> From<&Command<T>> for CommandSummary {
    fn from(cmd: &Command<T>) -> Self {
        Self {
            id: cmd.id,
            table: cmd.table,
            record_id: cmd.record_id,
            op: cmd.op.name(),
            status: cmd.status,
            attempts: cmd.attempts,
            last_error: cmd.last_error.clone(),
            enqueued_at: cmd.enqueued_at,
        }
    }
}

/// Outcome of one flush pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub confirmed: usize,
    pub failed: usize,
}

impl FlushReport {
    pub fn merge(&mut self, other: FlushReport) {
        self.confirmed += other.confirmed;
        self.failed += other.failed;
    }
}

pub struct CommandQueue<T: Record> {
    commands: Vec<Command<T>>,
}

impl<T: Record> Default for CommandQueue<T> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<T: Record> CommandQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mutation of `record_id`.
    ///
    /// Unconfirmed commands for the same record are superseded: the newest
    /// command carries the full latest state, so replaying an older one
    /// after it could only resurrect stale data.
    pub fn enqueue(&mut self, record_id: EntityId, op: CommandOp<T>) -> EntityId {
        self.commands
            .retain(|c| c.record_id != record_id || c.status == CommandStatus::Confirmed);
        let id = new_id();
        self.commands.push(Command {
            id,
            table: T::TABLE,
            record_id,
            op,
            status: CommandStatus::Pending,
            attempts: 0,
            last_error: None,
            enqueued_at: Utc::now(),
        });
        id
    }

    pub fn commands(&self) -> &[Command<T>] {
        &self.commands
    }

    pub fn summaries(&self) -> Vec<CommandSummary> {
        self.commands.iter().map(CommandSummary::from).collect()
    }

    pub fn count(&self, status: CommandStatus) -> usize {
        self.commands.iter().filter(|c| c.status == status).count()
    }

    /// Pending and failed commands, oldest first.
    pub fn unconfirmed(&self) -> impl Iterator<Item = &Command<T>> {
        self.commands
            .iter()
            .filter(|c| c.status != CommandStatus::Confirmed)
    }

    pub fn has_unconfirmed(&self, record_id: EntityId) -> bool {
        self.unconfirmed().any(|c| c.record_id == record_id)
    }

    /// Send every pending command to `remote`, oldest first.
    pub async fn flush(&mut self, remote: &dyn RemoteTable<T>) -> FlushReport {
        let mut report = FlushReport::default();
        for cmd in self
            .commands
            .iter_mut()
            .filter(|c| c.status == CommandStatus::Pending)
        {
            cmd.attempts += 1;
            let result = match &cmd.op {
                CommandOp::Upsert(record) => remote.upsert(record).await,
                CommandOp::Delete => remote.delete(cmd.record_id).await,
            };
            match result {
                Ok(()) => {
                    cmd.status = CommandStatus::Confirmed;
                    cmd.last_error = None;
                    report.confirmed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        table = T::TABLE,
                        record_id = %cmd.record_id,
                        op = cmd.op.name(),
                        attempts = cmd.attempts,
                        error = %e,
                        "Command failed"
                    );
                    cmd.status = CommandStatus::Failed;
                    cmd.last_error = Some(e.to_string());
                    report.failed += 1;
                }
            }
        }
        self.trim_confirmed(MAX_CONFIRMED_HISTORY);
        report
    }

    /// Move failed commands back to pending and flush again.
    pub async fn retry_failed(&mut self, remote: &dyn RemoteTable<T>) -> FlushReport {
        for cmd in self
            .commands
            .iter_mut()
            .filter(|c| c.status == CommandStatus::Failed)
        {
            cmd.status = CommandStatus::Pending;
        }
        self.flush(remote).await
    }

    /// Keep only the newest `keep` confirmed commands.
    fn trim_confirmed(&mut self, keep: usize) {
        let confirmed = self.count(CommandStatus::Confirmed);
        if confirmed <= keep {
            return;
        }
        let mut excess = confirmed - keep;
        self.commands.retain(|c| {
            if excess > 0 && c.status == CommandStatus::Confirmed {
                excess -= 1;
                return false;
            }
            true
        });
    }

    /// Drop confirmed history, returning how many commands were removed.
    pub fn prune_confirmed(&mut self) -> usize {
        let before = self.commands.len();
        self.commands
            .retain(|c| c.status != CommandStatus::Confirmed);
        before - self.commands.len()
    }
}
