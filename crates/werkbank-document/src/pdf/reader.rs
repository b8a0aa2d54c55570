// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open existing documents, extract page subsets, and merge
// several documents, using the `lopdf` crate.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, info, instrument, warn};
use werkbank_core::error::{Result, WerkbankError};

use crate::pdf::pages::PageSet;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed page trees whose /Parent chain loops.
const MAX_TREE_DEPTH: usize = 64;

/// Reads existing PDF files and copies pages out of them.
///
/// Wraps `lopdf::Document`. Output documents are always built fresh, so the
/// source is never modified.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            WerkbankError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            WerkbankError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    // -- Extraction -----------------------------------------------------------

    /// Copy the given pages (1-based, ascending) into a new PDF and return
    /// its bytes.
    #[instrument(skip(self, pages), fields(selected = pages.len()))]
    pub fn extract_pages(&self, pages: &PageSet) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(WerkbankError::InvalidPageRange("no pages selected".into()));
        }

        let page_map = self.document.get_pages();
        let page_ids = pages
            .iter()
            .map(|page_number| {
                page_map.get(&page_number).copied().ok_or_else(|| {
                    WerkbankError::PdfError(format!(
                        "page {} out of range (document has {} pages)",
                        page_number,
                        page_map.len()
                    ))
                })
            })
            .collect::<Result<Vec<ObjectId>>>()?;

        let mut output = OutputDocument::new();
        output.append_pages(&self.document, &page_ids)?;
        let bytes = output.into_bytes()?;

        info!(
            pages = page_ids.len(),
            output_bytes = bytes.len(),
            "Pages extracted"
        );
        Ok(bytes)
    }

    /// Extract a single page (1-indexed) into a new standalone PDF document.
    pub fn extract_page(&self, page_number: u32) -> Result<Vec<u8>> {
        self.extract_pages(&PageSet::from_pages([page_number]))
    }

    /// Every page object id, in page order.
    fn page_ids(&self) -> Vec<ObjectId> {
        // lopdf keys pages by 1-based page number in a BTreeMap, so values()
        // is already in document order.
        self.document.get_pages().into_values().collect()
    }
}

/// Concatenate the pages of every input, in order, into a new PDF.
///
/// At least two inputs are required.
#[instrument(skip_all, fields(documents = inputs.len()))]
pub fn merge_documents(inputs: &[&[u8]]) -> Result<Vec<u8>> {
    if inputs.len() < 2 {
        return Err(WerkbankError::NotEnoughFiles {
            required: 2,
            found: inputs.len(),
        });
    }

    let mut output = OutputDocument::new();
    for (index, data) in inputs.iter().enumerate() {
        let reader = PdfReader::from_bytes(data).map_err(|err| {
            WerkbankError::PdfError(format!("failed to load PDF #{}: {}", index + 1, err))
        })?;
        let page_ids = reader.page_ids();
        debug!(document = index + 1, pages = page_ids.len(), "Appending document");
        output.append_pages(&reader.document, &page_ids)?;
    }

    let total_pages = output.page_count();
    let bytes = output.into_bytes()?;
    info!(total_pages, output_bytes = bytes.len(), "Merge complete");
    Ok(bytes)
}

// -- Output assembly ----------------------------------------------------------

/// A fresh document with a single flat page tree that pages are appended to.
struct OutputDocument {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl OutputDocument {
    fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let catalog_id = document.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
        });
        document.trailer.set("Root", Object::Reference(catalog_id));
        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Copy `page_ids` from `source`, in order. Objects shared between those
    /// pages are copied once.
    fn append_pages(&mut self, source: &Document, page_ids: &[ObjectId]) -> Result<()> {
        let mut copier = PageCopier::new(source);
        for &page_id in page_ids {
            let new_id = copier.copy_page(&mut self.document, self.pages_id, page_id)?;
            self.kids.push(Object::Reference(new_id));
        }
        Ok(())
    }

    fn into_bytes(mut self) -> Result<Vec<u8>> {
        let count = self.kids.len() as i64;
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => Object::Array(self.kids),
                "Count" => Object::Integer(count),
            }),
        );

        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            WerkbankError::PdfError(format!("failed to serialise PDF: {}", err))
        })?;
        Ok(output)
    }
}

/// Deep-copies pages and everything they reference from one source document.
///
/// Source object ids are memoised, so shared resources are copied once and
/// reference cycles (e.g. an annotation's /P pointing back at its page)
/// terminate. `/Parent` links are not followed: the page's parent is
/// re-pointed at the output page tree and other page-tree nodes reached by
/// reference become `null`.
struct PageCopier<'a> {
    source: &'a Document,
    mapped: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            mapped: HashMap::new(),
        }
    }

    fn copy_page(
        &mut self,
        target: &mut Document,
        pages_id: ObjectId,
        page_id: ObjectId,
    ) -> Result<ObjectId> {
        let page = self.source.get_dictionary(page_id).map_err(|err| {
            WerkbankError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let new_id = target.new_object_id();
        self.mapped.insert(page_id, new_id);

        let mut new_page = self.copy_dictionary(target, page)?;
        for key in INHERITABLE_KEYS {
            if new_page.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(self.source, page, key) {
                let copied = self.copy_object(target, value)?;
                new_page.set(key.to_vec(), copied);
            }
        }
        new_page.set("Type", Object::Name(b"Page".to_vec()));
        new_page.set("Parent", Object::Reference(pages_id));

        target.objects.insert(new_id, Object::Dictionary(new_page));
        Ok(new_id)
    }

    fn copy_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Result<Dictionary> {
        let mut new_dict = Dictionary::new();
        for (key, value) in dict.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            let copied = self.copy_object(target, value)?;
            new_dict.set(key.clone(), copied);
        }
        Ok(new_dict)
    }

    fn copy_object(&mut self, target: &mut Document, object: &Object) -> Result<Object> {
        match object {
            Object::Reference(ref_id) => self.copy_reference(target, *ref_id),
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.copy_dictionary(target, dict)?)),
            Object::Array(items) => {
                let mut new_items = Vec::with_capacity(items.len());
                for item in items {
                    new_items.push(self.copy_object(target, item)?);
                }
                Ok(Object::Array(new_items))
            }
            Object::Stream(stream) => {
                let dict = self.copy_dictionary(target, &stream.dict)?;
                Ok(Object::Stream(Stream::new(dict, stream.content.clone())))
            }
            other => Ok(other.clone()),
        }
    }

    fn copy_reference(&mut self, target: &mut Document, ref_id: ObjectId) -> Result<Object> {
        if let Some(&new_id) = self.mapped.get(&ref_id) {
            return Ok(Object::Reference(new_id));
        }

        let referenced = match self.source.get_object(ref_id) {
            Ok(object) => object,
            Err(err) => {
                warn!(?ref_id, %err, "Cannot resolve reference, using null");
                return Ok(Object::Null);
            }
        };
        if is_page_tree_node(referenced) {
            debug!(?ref_id, "Dropping reference to a page outside the selection");
            return Ok(Object::Null);
        }

        let new_id = target.new_object_id();
        self.mapped.insert(ref_id, new_id);
        let copied = self.copy_object(target, referenced)?;
        target.objects.insert(new_id, copied);
        Ok(Object::Reference(new_id))
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type"),
            Ok(Object::Name(name)) if name.as_slice() == b"Page" || name.as_slice() == b"Pages"
        ),
        _ => false,
    }
}

/// Look up `key` on the nearest ancestor of `page` that defines it.
fn inherited_attribute<'a>(
    source: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = source.get_dictionary(parent_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an in-memory PDF with `pages` pages. Each page carries a
    /// `/Marker` integer `base + page_number`; MediaBox and Resources live on
    /// the page tree root so they must be inherited.
    fn sample_pdf(pages: u32, base: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Font".to_vec()),
            "Subtype" => Object::Name(b"Type1".to_vec()),
            "BaseFont" => Object::Name(b"Helvetica".to_vec()),
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        });

        let mut kids = Vec::new();
        for n in 1..=pages {
            let content = format!("BT /F1 12 Tf 72 720 Td (Page {n}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => Object::Name(b"Page".to_vec()),
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
                "Marker" => Object::Integer(base + n as i64),
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => Object::Array(kids),
                "Count" => Object::Integer(pages as i64),
                "Resources" => Object::Reference(resources_id),
                "MediaBox" => Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ]),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn markers(pdf: &[u8]) -> Vec<i64> {
        let doc = Document::load_mem(pdf).unwrap();
        doc.get_pages()
            .values()
            .map(|&id| {
                doc.get_dictionary(id)
                    .unwrap()
                    .get(b"Marker")
                    .unwrap()
                    .as_i64()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn counts_pages() {
        let reader = PdfReader::from_bytes(&sample_pdf(4, 0)).unwrap();
        assert_eq!(reader.page_count(), 4);
        assert!(reader.source_path().is_none());
    }

    #[test]
    fn extracts_selected_pages_in_order() {
        let reader = PdfReader::from_bytes(&sample_pdf(5, 100)).unwrap();
        let out = reader.extract_pages(&PageSet::from_pages([4, 2])).unwrap();
        assert_eq!(markers(&out), [102, 104]);
    }

    #[test]
    fn extracted_pages_keep_inherited_attributes() {
        let reader = PdfReader::from_bytes(&sample_pdf(3, 0)).unwrap();
        let out = reader.extract_page(2).unwrap();

        let doc = Document::load_mem(&out).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page = doc.get_dictionary(pages[&1]).unwrap();
        assert!(page.has(b"MediaBox"));
        let resources = page.get(b"Resources").unwrap().as_reference().unwrap();
        let fonts = doc.get_dictionary(resources).unwrap().get(b"Font").unwrap();
        assert!(fonts.as_dict().unwrap().has(b"F1"));
    }

    #[test]
    fn shared_resources_are_copied_once() {
        let reader = PdfReader::from_bytes(&sample_pdf(3, 0)).unwrap();
        let out = reader.extract_pages(&PageSet::from_pages([1, 2, 3])).unwrap();

        let doc = Document::load_mem(&out).unwrap();
        let resource_ids: Vec<ObjectId> = doc
            .get_pages()
            .values()
            .map(|&id| {
                doc.get_dictionary(id)
                    .unwrap()
                    .get(b"Resources")
                    .unwrap()
                    .as_reference()
                    .unwrap()
            })
            .collect();
        assert!(resource_ids.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn extracting_missing_page_fails() {
        let reader = PdfReader::from_bytes(&sample_pdf(2, 0)).unwrap();
        assert!(matches!(
            reader.extract_pages(&PageSet::from_pages([3])),
            Err(WerkbankError::PdfError(_))
        ));
    }

    #[test]
    fn extracting_nothing_fails() {
        let reader = PdfReader::from_bytes(&sample_pdf(2, 0)).unwrap();
        assert!(matches!(
            reader.extract_pages(&PageSet::default()),
            Err(WerkbankError::InvalidPageRange(_))
        ));
    }

    #[test]
    fn annotation_back_reference_terminates() {
        let mut doc = Document::load_mem(&sample_pdf(1, 0)).unwrap();
        let page_id = doc.get_pages()[&1];
        let annot_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Annot".to_vec()),
            "Subtype" => Object::Name(b"Text".to_vec()),
            "P" => Object::Reference(page_id),
        });
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let out = PdfReader::from_bytes(&bytes).unwrap().extract_page(1).unwrap();
        let copy = Document::load_mem(&out).unwrap();
        let new_page_id = copy.get_pages()[&1];
        let annots = copy
            .get_dictionary(new_page_id)
            .unwrap()
            .get(b"Annots")
            .unwrap()
            .as_array()
            .unwrap();
        let annot = copy
            .get_dictionary(annots[0].as_reference().unwrap())
            .unwrap();
        assert_eq!(annot.get(b"P").unwrap().as_reference().unwrap(), new_page_id);
    }

    #[test]
    fn merges_documents_in_order() {
        let first = sample_pdf(2, 100);
        let second = sample_pdf(3, 200);
        let merged = merge_documents(&[first.as_slice(), second.as_slice()]).unwrap();
        assert_eq!(markers(&merged), [101, 102, 201, 202, 203]);
    }

    #[test]
    fn merge_needs_two_documents() {
        let only = sample_pdf(1, 0);
        assert!(matches!(
            merge_documents(&[only.as_slice()]),
            Err(WerkbankError::NotEnoughFiles {
                required: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn merge_reports_which_input_is_broken() {
        let good = sample_pdf(1, 0);
        let err = merge_documents(&[good.as_slice(), b"not a pdf".as_slice()]).unwrap_err();
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn garbage_is_not_a_pdf() {
        assert!(matches!(
            PdfReader::from_bytes(b"hello"),
            Err(WerkbankError::PdfError(_))
        ));
    }
}
