//! Notebook → Section → Note hierarchy.
//!
//! A note with no `section_id` lives in the notebook's virtual "Quick Notes"
//! section. Search is a case-insensitive substring match over title, content
//! and tags; a non-empty search string ignores the hierarchy entirely.
//! `locked` only hides content in rendered views ([`NoteView`]); the content
//! is still stored and loaded.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::impl_record;
use crate::types::{new_id, EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a notebook or section name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of note content in characters.
pub const MAX_NOTE_CONTENT_LENGTH: usize = 100_000;

/// Title used when a note is saved without one.
pub const UNTITLED: &str = "Untitled";

/// Display name of the virtual section holding unsectioned notes.
pub const QUICK_NOTES: &str = "Quick Notes";

static IMAGE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)\s]+)[^)]*\)").expect("valid regex"));

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub id: EntityId,
    pub name: String,
    pub color: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_record!(Notebook, "notebooks", "Notebook");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: EntityId,
    pub notebook_id: EntityId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_record!(Section, "sections", "Section");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub notebook_id: EntityId,
    /// `None` places the note in Quick Notes.
    pub section_id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub locked: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl_record!(Note, "notes", "Note");

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NotebookDraft {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionDraft {
    pub notebook_id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteDraft {
    pub notebook_id: EntityId,
    pub section_id: Option<EntityId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub locked: bool,
}

/// Partial note update. `section_id: null` moves the note to Quick Notes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub section_id: Option<Option<EntityId>>,
    pub pinned: Option<bool>,
    pub locked: Option<bool>,
}

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a notebook or section name.
pub fn validate_name(kind: &str, name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{kind} name cannot be empty")));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{kind} name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate note content length.
pub fn validate_note_content(content: &str) -> Result<(), CoreError> {
    if content.chars().count() > MAX_NOTE_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Note content exceeds maximum length of {MAX_NOTE_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Trim tags and drop empties; the set makes order and duplicates irrelevant.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn title_or_untitled(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

/// URLs of every `![alt](url)` image reference in `content`, in order.
pub fn extract_image_refs(content: &str) -> Vec<String> {
    IMAGE_REF_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Constructors / updates
// ---------------------------------------------------------------------------

impl Notebook {
    pub fn from_draft(draft: NotebookDraft, now: Timestamp) -> Result<Self, CoreError> {
        validate_name("Notebook", &draft.name)?;
        Ok(Self {
            id: new_id(),
            name: draft.name.trim().to_string(),
            color: draft.color,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn rename(&mut self, draft: NotebookDraft, now: Timestamp) -> Result<(), CoreError> {
        validate_name("Notebook", &draft.name)?;
        self.name = draft.name.trim().to_string();
        self.color = draft.color;
        self.updated_at = now;
        Ok(())
    }
}

impl Section {
    pub fn from_draft(draft: SectionDraft, now: Timestamp) -> Result<Self, CoreError> {
        validate_name("Section", &draft.name)?;
        Ok(Self {
            id: new_id(),
            notebook_id: draft.notebook_id,
            name: draft.name.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn rename(&mut self, name: &str, now: Timestamp) -> Result<(), CoreError> {
        validate_name("Section", name)?;
        self.name = name.trim().to_string();
        self.updated_at = now;
        Ok(())
    }
}

impl Note {
    pub fn from_draft(draft: NoteDraft, now: Timestamp) -> Result<Self, CoreError> {
        validate_note_content(&draft.content)?;
        Ok(Self {
            id: new_id(),
            notebook_id: draft.notebook_id,
            section_id: draft.section_id,
            title: title_or_untitled(&draft.title),
            content: draft.content,
            tags: normalize_tags(&draft.tags),
            pinned: draft.pinned,
            locked: draft.locked,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: NotePatch, now: Timestamp) -> Result<(), CoreError> {
        if let Some(content) = &patch.content {
            validate_note_content(content)?;
        }
        if let Some(title) = patch.title {
            self.title = title_or_untitled(&title);
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(&tags);
        }
        if let Some(section_id) = patch.section_id {
            self.section_id = section_id;
        }
        if let Some(pinned) = patch.pinned {
            self.pinned = pinned;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Case-insensitive substring match over title, content and tags.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    pub fn is_quick_note(&self) -> bool {
        self.section_id.is_none()
    }
}

// ---------------------------------------------------------------------------
// Scoping
// ---------------------------------------------------------------------------

/// Which section of the active notebook is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum SectionScope {
    /// Every note in the notebook.
    #[default]
    All,
    /// Notes without a section.
    QuickNotes,
    Section(EntityId),
}

impl SectionScope {
    /// Parse the query-string form: `all`, `quick`, or a section UUID.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "" | "all" => Ok(Self::All),
            "quick" | "quick_notes" => Ok(Self::QuickNotes),
            other => other.parse::<EntityId>().map(Self::Section).map_err(|_| {
                CoreError::Validation(format!(
                    "Invalid section '{other}'. Must be 'all', 'quick', or a section id"
                ))
            }),
        }
    }

    fn contains(self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::QuickNotes => note.section_id.is_none(),
            Self::Section(id) => note.section_id == Some(id),
        }
    }
}

/// Notes visible for the given selection.
///
/// A non-blank `search` matches across every notebook and section; otherwise
/// notes are restricted to `notebook` (all notebooks when `None`) and
/// `section`. Results are pinned first, then most recently updated.
pub fn scope_notes<'a>(
    notes: impl IntoIterator<Item = &'a Note>,
    notebook: Option<EntityId>,
    section: SectionScope,
    search: &str,
) -> Vec<&'a Note> {
    let global = !search.trim().is_empty();
    let mut out: Vec<&Note> = notes
        .into_iter()
        .filter(|n| {
            if global {
                n.matches_search(search)
            } else {
                notebook.is_none_or(|nb| n.notebook_id == nb) && section.contains(n)
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    out
}

/// Sections and notes removed when `notebook_id` is deleted.
pub fn notebook_cascade(
    notebook_id: EntityId,
    sections: &[Section],
    notes: &[Note],
) -> (Vec<EntityId>, Vec<EntityId>) {
    let section_ids: Vec<EntityId> = sections
        .iter()
        .filter(|s| s.notebook_id == notebook_id)
        .map(|s| s.id)
        .collect();
    let note_ids = notes
        .iter()
        .filter(|n| {
            n.notebook_id == notebook_id
                || n.section_id.is_some_and(|sid| section_ids.contains(&sid))
        })
        .map(|n| n.id)
        .collect();
    (section_ids, note_ids)
}

/// Notes removed when `section_id` is deleted.
pub fn section_cascade(section_id: EntityId, notes: &[Note]) -> Vec<EntityId> {
    notes
        .iter()
        .filter(|n| n.section_id == Some(section_id))
        .map(|n| n.id)
        .collect()
}

// ---------------------------------------------------------------------------
// Rendered view
// ---------------------------------------------------------------------------

/// A note as rendered in listings: locked notes carry no content.
#[derive(Debug, Clone, Serialize)]
pub struct NoteView {
    pub id: EntityId,
    pub notebook_id: EntityId,
    pub section_id: Option<EntityId>,
    pub title: String,
    pub content: Option<String>,
    pub image_refs: Vec<String>,
    pub tags: BTreeSet<String>,
    pub pinned: bool,
    pub locked: bool,
    pub updated_at: Timestamp,
}

impl From<&Note> for NoteView {
    fn from(note: &Note) -> Self {
        let (content, image_refs) = if note.locked {
            (None, Vec::new())
        } else {
            (Some(note.content.clone()), extract_image_refs(&note.content))
        };
        Self {
            id: note.id,
            notebook_id: note.notebook_id,
            section_id: note.section_id,
            title: note.title.clone(),
            content,
            image_refs,
            tags: note.tags.clone(),
            pinned: note.pinned,
            locked: note.locked,
            updated_at: note.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
