//! Paginated report generation and the generated-file archive.
//!
//! - [`writer`]: [`PageWriter`], the one paginated document writer every
//!   report goes through (cursor, margins, word wrap, page breaks).
//! - [`pdf`]: serializes a finished [`Document`] to PDF bytes.
//! - [`reports`]: task, customer and coupon report builders.
//! - [`archive`]: the [`FileArchive`] seam with memory and disk backends.

pub mod archive;
pub mod pdf;
pub mod reports;
pub mod writer;

pub use archive::{ArchiveError, DiskArchive, FileArchive, MemoryArchive};
pub use pdf::render_pdf;
pub use writer::{Document, FontWeight, Page, PageLayout, PageWriter, TextRun};
