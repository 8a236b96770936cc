// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// legajo-document — Document pipelines for Legajo.
//
// Provides PDF page removal by structural copy, Ghostscript compression,
// Word → PDF conversion through an office suite, image → PDF, and a runner
// that executes any of them in the background with progress events.

pub mod compress;
pub mod convert;
pub mod engine;
pub mod pdf;
pub mod task;

// Re-export the primary types so callers can use `legajo_document::PdfReader` etc.
pub use compress::CompressionPipeline;
pub use convert::{ConversionPipeline, OfficeExporter, SofficeExporter};
pub use engine::{EngineLocator, EngineSpec};
pub use pdf::{PageSelection, PageSelectionPlan, PdfReader, RemovalSummary};
pub use task::{OperationEvent, OperationHandle, ProgressReporter, spawn_operation};

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use lopdf::{Dictionary, Document, Object, Stream, dictionary};

    /// An `n`-page document whose pages inherit `MediaBox` and a shared font
    /// resource from the page tree root. Page `k` shows the text `Page k`.
    pub fn sample_document(pages: usize) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages);
        for number in 1..=pages {
            let content = format!("BT /F1 12 Tf 72 720 Td (Page {number}) Tj ET");
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Sample"),
        });
        doc.trailer.set("Info", info_id);

        doc
    }

    pub fn sample_pdf_bytes(pages: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        sample_document(pages).save_to(&mut bytes).unwrap();
        bytes
    }

    pub fn write_sample_pdf(path: &Path, pages: usize) {
        std::fs::write(path, sample_pdf_bytes(pages)).unwrap();
    }
}
