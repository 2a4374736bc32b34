//! Notes store: notebooks, sections and notes with cascading deletes and the
//! active selection used to scope `visible_notes`.

use detailhq_core::error::CoreError;
use detailhq_core::notes::{
    notebook_cascade, scope_notes, section_cascade, Note, NoteDraft, NotePatch, Notebook,
    NotebookDraft, Section, SectionDraft, SectionScope,
};
use detailhq_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::collection::{SyncStatus, SyncedCollection};
use crate::commands::FlushReport;
use crate::error::StoreError;
use crate::repository::Repository;

/// Which notebook, section and note are selected, plus the search box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSelection {
    pub notebook: Option<EntityId>,
    pub section: SectionScope,
    pub note: Option<EntityId>,
    pub search: String,
}

impl NoteSelection {
    /// Switching notebooks resets the section and note selection.
    pub fn set_active_notebook(&mut self, notebook: Option<EntityId>) {
        self.notebook = notebook;
        self.section = SectionScope::All;
        self.note = None;
    }

    pub fn set_active_section(&mut self, section: SectionScope) {
        self.section = section;
        self.note = None;
    }

    pub fn set_active_note(&mut self, note: Option<EntityId>) {
        self.note = note;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }
}

pub struct NotesStore {
    notebooks: SyncedCollection<Notebook>,
    sections: SyncedCollection<Section>,
    notes: SyncedCollection<Note>,
    selection: NoteSelection,
}

impl NotesStore {
    pub fn new(
        notebooks: Repository<Notebook>,
        sections: Repository<Section>,
        notes: Repository<Note>,
    ) -> Self {
        Self {
            notebooks: SyncedCollection::new(notebooks),
            sections: SyncedCollection::new(sections),
            notes: SyncedCollection::new(notes),
            selection: NoteSelection::default(),
        }
    }

    pub fn notebooks_mut(&mut self) -> &mut SyncedCollection<Notebook> {
        &mut self.notebooks
    }

    pub fn sections_mut(&mut self) -> &mut SyncedCollection<Section> {
        &mut self.sections
    }

    pub fn notes_mut(&mut self) -> &mut SyncedCollection<Note> {
        &mut self.notes
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.notebooks.refresh().await?;
        self.sections.refresh().await?;
        self.notes.refresh().await
    }

    /// Flush parents before children so a new note never reaches the remote
    /// ahead of its notebook.
    pub async fn flush(&mut self) -> FlushReport {
        let mut report = self.notebooks.flush().await;
        report.merge(self.sections.flush().await);
        report.merge(self.notes.flush().await);
        report
    }

    pub async fn retry_failed(&mut self) -> FlushReport {
        let mut report = self.notebooks.retry_failed().await;
        report.merge(self.sections.retry_failed().await);
        report.merge(self.notes.retry_failed().await);
        report
    }

    pub fn status(&self) -> SyncStatus {
        let mut status = self.notebooks.status();
        status.merge(self.sections.status());
        status.merge(self.notes.status());
        status
    }

    // -- reads --

    pub fn notebooks(&self) -> &[Notebook] {
        self.notebooks.rows()
    }

    /// Sections, optionally limited to one notebook.
    pub fn sections(&self, notebook: Option<EntityId>) -> Vec<Section> {
        self.sections
            .rows()
            .iter()
            .filter(|s| notebook.is_none_or(|nb| s.notebook_id == nb))
            .cloned()
            .collect()
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.rows()
    }

    pub fn get_notebook(&self, id: EntityId) -> Result<&Notebook, CoreError> {
        self.notebooks.require(id)
    }

    pub fn get_section(&self, id: EntityId) -> Result<&Section, CoreError> {
        self.sections.require(id)
    }

    pub fn get_note(&self, id: EntityId) -> Result<&Note, CoreError> {
        self.notes.require(id)
    }

    // -- selection --

    pub fn selection(&self) -> &NoteSelection {
        &self.selection
    }

    pub fn set_active_notebook(&mut self, notebook: Option<EntityId>) {
        self.selection.set_active_notebook(notebook);
    }

    pub fn set_active_section(&mut self, section: SectionScope) {
        self.selection.set_active_section(section);
    }

    pub fn set_active_note(&mut self, note: Option<EntityId>) {
        self.selection.set_active_note(note);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.selection.set_search(search);
    }

    /// Notes visible under the store's own selection.
    pub fn visible_notes(&self) -> Vec<Note> {
        self.visible_for(&self.selection)
    }

    /// Notes visible under `selection`: search first (global), otherwise
    /// scoped to the notebook and section.
    pub fn visible_for(&self, selection: &NoteSelection) -> Vec<Note> {
        scope_notes(
            self.notes.rows(),
            selection.notebook,
            selection.section,
            &selection.search,
        )
        .into_iter()
        .cloned()
        .collect()
    }

    // -- notebooks --

    pub fn create_notebook(
        &mut self,
        draft: NotebookDraft,
        now: Timestamp,
    ) -> Result<Notebook, CoreError> {
        let notebook = Notebook::from_draft(draft, now)?;
        tracing::info!(notebook_id = %notebook.id, name = %notebook.name, "Notebook created");
        self.notebooks.insert(notebook.clone());
        Ok(notebook)
    }

    pub fn update_notebook(
        &mut self,
        id: EntityId,
        draft: NotebookDraft,
        now: Timestamp,
    ) -> Result<Notebook, CoreError> {
        self.notebooks.update_with(id, |nb| {
            nb.rename(draft, now)?;
            Ok(nb.clone())
        })
    }

    /// Delete a notebook together with its sections and every note in it.
    ///
    /// Returns the removed `(section_ids, note_ids)`.
    pub fn delete_notebook(
        &mut self,
        id: EntityId,
    ) -> Result<(Vec<EntityId>, Vec<EntityId>), CoreError> {
        self.notebooks.require(id)?;
        let (section_ids, note_ids) =
            notebook_cascade(id, self.sections.rows(), self.notes.rows());
        self.notes.remove_where(|n| note_ids.contains(&n.id));
        self.sections.remove_where(|s| section_ids.contains(&s.id));
        self.notebooks.remove(id)?;

        if self.selection.notebook == Some(id) {
            self.selection.set_active_notebook(None);
        }
        tracing::info!(
            notebook_id = %id,
            sections = section_ids.len(),
            notes = note_ids.len(),
            "Notebook deleted"
        );
        Ok((section_ids, note_ids))
    }

    // -- sections --

    pub fn create_section(
        &mut self,
        draft: SectionDraft,
        now: Timestamp,
    ) -> Result<Section, CoreError> {
        self.notebooks.require(draft.notebook_id)?;
        let section = Section::from_draft(draft, now)?;
        tracing::info!(section_id = %section.id, notebook_id = %section.notebook_id, "Section created");
        self.sections.insert(section.clone());
        Ok(section)
    }

    pub fn update_section(
        &mut self,
        id: EntityId,
        name: &str,
        now: Timestamp,
    ) -> Result<Section, CoreError> {
        self.sections.update_with(id, |s| {
            s.rename(name, now)?;
            Ok(s.clone())
        })
    }

    /// Delete a section and its notes. Returns the removed note ids.
    pub fn delete_section(&mut self, id: EntityId) -> Result<Vec<EntityId>, CoreError> {
        self.sections.require(id)?;
        let note_ids = section_cascade(id, self.notes.rows());
        self.notes.remove_where(|n| note_ids.contains(&n.id));
        self.sections.remove(id)?;

        if self.selection.section == SectionScope::Section(id) {
            self.selection.set_active_section(SectionScope::All);
        }
        tracing::info!(section_id = %id, notes = note_ids.len(), "Section deleted");
        Ok(note_ids)
    }

    // -- notes --

    pub fn create_note(&mut self, draft: NoteDraft, now: Timestamp) -> Result<Note, CoreError> {
        self.notebooks.require(draft.notebook_id)?;
        if let Some(section_id) = draft.section_id {
            self.check_section_in_notebook(section_id, draft.notebook_id)?;
        }
        let note = Note::from_draft(draft, now)?;
        tracing::info!(note_id = %note.id, notebook_id = %note.notebook_id, "Note created");
        self.notes.insert(note.clone());
        Ok(note)
    }

    pub fn update_note(
        &mut self,
        id: EntityId,
        patch: NotePatch,
        now: Timestamp,
    ) -> Result<Note, CoreError> {
        if let Some(Some(section_id)) = patch.section_id {
            let notebook_id = self.notes.require(id)?.notebook_id;
            self.check_section_in_notebook(section_id, notebook_id)?;
        }
        self.notes.update_with(id, |n| {
            n.apply_patch(patch, now)?;
            Ok(n.clone())
        })
    }

    pub fn delete_note(&mut self, id: EntityId) -> Result<Note, CoreError> {
        let note = self.notes.remove(id)?;
        if self.selection.note == Some(id) {
            self.selection.set_active_note(None);
        }
        tracing::info!(note_id = %id, "Note deleted");
        Ok(note)
    }

    pub fn toggle_pin(&mut self, id: EntityId, now: Timestamp) -> Result<Note, CoreError> {
        self.notes.update_with(id, |n| {
            n.pinned = !n.pinned;
            n.updated_at = now;
            Ok(n.clone())
        })
    }

    pub fn toggle_lock(&mut self, id: EntityId, now: Timestamp) -> Result<Note, CoreError> {
        self.notes.update_with(id, |n| {
            n.locked = !n.locked;
            n.updated_at = now;
            Ok(n.clone())
        })
    }

    fn check_section_in_notebook(
        &self,
        section_id: EntityId,
        notebook_id: EntityId,
    ) -> Result<(), CoreError> {
        let section = self.sections.require(section_id)?;
        if section.notebook_id != notebook_id {
            return Err(CoreError::Validation(format!(
                "Section {section_id} does not belong to notebook {notebook_id}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
