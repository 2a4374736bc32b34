//! Serializes [`Document`]s to PDF through `pdf-writer`.
//!
//! Uses the standard Type1 fonts Helvetica and Helvetica-Bold with
//! WinAnsiEncoding, so no fonts are embedded. Characters outside Latin-1
//! are replaced with `?`.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

use crate::writer::{Document, FontWeight, Page, TextRun};

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");

/// Serialize `doc` to PDF bytes.
pub fn render_pdf(doc: &Document) -> Vec<u8> {
    let mut next_id = 1;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };

    let catalog_id = alloc();
    let tree_id = alloc();
    let regular_id = alloc();
    let bold_id = alloc();
    // Each page takes two objects: the page dictionary and its content stream.
    let page_ids: Vec<(Ref, Ref)> = doc.pages.iter().map(|_| (alloc(), alloc())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let media_box = Rect::new(0.0, 0.0, doc.layout.width, doc.layout.height);
    for (page, (page_id, content_id)) in doc.pages.iter().zip(&page_ids) {
        let mut writer = pdf.page(*page_id);
        writer.media_box(media_box);
        writer.parent(tree_id);
        writer.contents(*content_id);
        writer
            .resources()
            .fonts()
            .pair(FONT_REGULAR, regular_id)
            .pair(FONT_BOLD, bold_id);
        writer.finish();

        let content = page_content(page, doc.layout.height);
        pdf.stream(*content_id, &content);
    }

    pdf.finish()
}

fn page_content(page: &Page, page_height: f32) -> Vec<u8> {
    let mut content = Content::new();
    for run in page.runs.iter().chain(page.footer.iter()) {
        show_run(&mut content, run, page_height);
    }
    if !page.rules.is_empty() {
        content.set_line_width(0.5);
        for rule in &page.rules {
            let y = page_height - rule.y;
            content.move_to(rule.x1, y);
            content.line_to(rule.x2, y);
            content.stroke();
        }
    }
    content.finish()
}

fn show_run(content: &mut Content, run: &TextRun, page_height: f32) {
    let font = match run.weight {
        FontWeight::Regular => FONT_REGULAR,
        FontWeight::Bold => FONT_BOLD,
    };
    let text = win_ansi(&run.text);
    content.begin_text();
    content.set_font(font, run.size);
    content.next_line(run.x, page_height - run.y);
    content.show(Str(&text));
    content.end_text();
}

/// Encode `text` as single-byte WinAnsi; anything outside Latin-1 is `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(b) if b >= 0x20 && b != 0x7f && !(0x80..0xa0).contains(&b) => b,
            _ => b'?',
        })
        .collect()
}
