// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — atomic persistence of finished documents, and single-image
// PDFs built with `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::io::Write;
use std::path::{Path, PathBuf};

use legajo_core::error::{LegajoError, Result};
use lopdf::Document;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// Resolution used to size an image page: one image pixel is 1/100 inch.
pub const IMAGE_DPI: f32 = 100.0;

const MM_PER_INCH: f32 = 25.4;

// -- Atomic persistence -------------------------------------------------------

/// Serialise `document` to `output` through a temporary sibling file.
///
/// Nothing appears at `output` unless the whole document was written; a
/// failure at any step yields `DestinationWrite` and removes the temporary.
#[instrument(skip_all, fields(output = %output.display()))]
pub fn persist_document(document: &mut Document, output: &Path) -> Result<()> {
    persist_with(output, |file| {
        document
            .save_to(file)
            .map_err(|err| std::io::Error::other(err.to_string()))
    })
}

/// Write `bytes` to `output` with the same all-or-nothing guarantee as
/// [`persist_document`].
pub fn persist_bytes(bytes: &[u8], output: &Path) -> Result<()> {
    persist_with(output, |file| file.write_all(bytes))
}

/// Copy the file at `source` to `output` with the same all-or-nothing
/// guarantee as [`persist_document`].
pub fn persist_copy(source: &Path, output: &Path) -> Result<()> {
    persist_with(output, |file| {
        let mut reader = std::fs::File::open(source)?;
        std::io::copy(&mut reader, file).map(|_| ())
    })
}

fn persist_with<F>(output: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
{
    let dir = staging_dir(output);
    let mut staged = NamedTempFile::new_in(&dir)
        .map_err(|err| LegajoError::destination_write(output, err))?;

    write(&mut staged).map_err(|err| LegajoError::destination_write(output, err))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|err| LegajoError::destination_write(output, err))?;

    staged
        .persist(output)
        .map_err(|err| LegajoError::destination_write(output, err.error))?;

    debug!("document persisted");
    Ok(())
}

/// Empty temporary file next to `output`, for external tools that write by
/// path. Dropping it removes whatever the tool left there.
pub(crate) fn staged_file(output: &Path) -> Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(".legajo-")
        .suffix(".pdf")
        .tempfile_in(staging_dir(output))
        .map_err(|err| LegajoError::destination_write(output, err))
}

/// Flush a file an external tool produced at `staged` and rename it onto
/// `output`.
pub(crate) fn commit_staged(staged: NamedTempFile, output: &Path) -> Result<()> {
    // The tool may have replaced the file, so sync by path, not by handle.
    std::fs::File::open(staged.path())
        .and_then(|file| file.sync_all())
        .map_err(|err| LegajoError::destination_write(output, err))?;

    staged
        .persist(output)
        .map_err(|err| LegajoError::destination_write(output, err.error))?;

    debug!("staged output committed");
    Ok(())
}

/// Directory that will hold the temporary file; it must share a filesystem
/// with `output` for the final rename to be atomic.
fn staging_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// -- Image to PDF -------------------------------------------------------------

/// Decode the image at `input` and write it as a single-page PDF to `output`.
///
/// The page is exactly the size of the image at [`IMAGE_DPI`].
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn image_to_pdf(input: &Path, output: &Path) -> Result<PathBuf> {
    if !input.is_file() {
        return Err(LegajoError::source_unreadable(input, "file does not exist"));
    }

    let bytes = std::fs::read(input).map_err(|err| LegajoError::source_unreadable(input, err))?;
    let pdf = image_bytes_to_pdf(&bytes, &document_title(input))?;
    persist_bytes(&pdf, output)?;

    info!(pdf_bytes = pdf.len(), "image converted to PDF");
    Ok(output.to_path_buf())
}

/// Build the PDF bytes for a single image page.
pub fn image_bytes_to_pdf(image_bytes: &[u8], title: &str) -> Result<Vec<u8>> {
    let decoded = ::image::load_from_memory(image_bytes)
        .map_err(|err| LegajoError::ImageError(format!("failed to decode image: {err}")))?;

    let width = decoded.width() as usize;
    let height = decoded.height() as usize;
    if width == 0 || height == 0 {
        return Err(LegajoError::ImageError("image has no pixels".into()));
    }

    let raw = RawImage {
        pixels: RawImageData::U8(decoded.to_rgb8().into_raw()),
        width,
        height,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };

    let mut doc = PdfDocument::new(title);
    let xobject_id = doc.add_image(&raw);

    let page_w = Mm(pixels_to_mm(width));
    let page_h = Mm(pixels_to_mm(height));

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: None,
            translate_y: None,
            scale_x: None,
            scale_y: None,
            dpi: Some(IMAGE_DPI),
            rotate: None,
        },
    }];

    doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "printpdf reported warnings");
    }

    debug!(width, height, page_w_mm = page_w.0, page_h_mm = page_h.0, "image page built");
    Ok(output)
}

fn pixels_to_mm(pixels: usize) -> f32 {
    pixels as f32 / IMAGE_DPI * MM_PER_INCH
}

fn document_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Legajo".to_string())
}
