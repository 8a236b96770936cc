// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structural page copy — move a subset of pages from one `lopdf` document into
// a fresh one without re-encoding any content stream.
//
// Every object reachable from a retained page is cloned exactly once; the
// remap table keeps shared objects shared and breaks reference cycles.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed page trees whose `/Parent` chain loops.
const MAX_TREE_DEPTH: usize = 64;

/// Copies selected pages of `source` into a new document.
pub struct PageCopier<'a> {
    source: &'a Document,
    target: Document,
    /// Source object id → target object id.
    remap: HashMap<ObjectId, ObjectId>,
    /// Source ids that must not be carried over; references to them become
    /// `null`.
    dropped: HashSet<ObjectId>,
    pages_root: ObjectId,
    kids: Vec<Object>,
}

impl<'a> PageCopier<'a> {
    /// Prepare a copy that will keep exactly `retained` (source page object
    /// ids, in output order).
    pub fn new(source: &'a Document, retained: &[ObjectId]) -> Self {
        let mut target = Document::with_version(source.version.clone());
        let pages_root = target.new_object_id();

        let keep: HashSet<ObjectId> = retained.iter().copied().collect();
        let dropped = source
            .get_pages()
            .into_values()
            .filter(|id| !keep.contains(id))
            .collect();

        let mut remap = HashMap::new();

        // Any reference into the old page tree now points at the new root.
        for (id, object) in &source.objects {
            if let Object::Dictionary(dict) = object {
                if is_type(dict, b"Pages") {
                    remap.insert(*id, pages_root);
                }
            }
        }

        // Reserve target ids for the retained pages up front so that links
        // between retained pages resolve to their copies.
        for page_id in retained {
            let new_id = target.new_object_id();
            remap.insert(*page_id, new_id);
        }

        Self {
            source,
            target,
            remap,
            dropped,
            pages_root,
            kids: Vec::with_capacity(retained.len()),
        }
    }

    /// Copy one retained page. Pages must be copied in output order.
    pub fn copy_page(&mut self, page_id: ObjectId) -> lopdf::Result<()> {
        let source = self.source;
        let page = source.get_dictionary(page_id)?;

        let mut copied = Dictionary::new();
        for (key, value) in page.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            let value = self.clone_value(value);
            copied.set(key.clone(), value);
        }

        for key in INHERITABLE {
            if copied.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, page, key) {
                let value = self.clone_value(value);
                copied.set(key, value);
            }
        }

        copied.set("Parent", Object::Reference(self.pages_root));

        let new_id = match self.remap.get(&page_id) {
            Some(id) => *id,
            None => {
                let id = self.target.new_object_id();
                self.remap.insert(page_id, id);
                id
            }
        };
        self.target.objects.insert(new_id, Object::Dictionary(copied));
        self.kids.push(Object::Reference(new_id));
        Ok(())
    }

    /// Build the page tree, catalog and trailer, and hand back the document.
    pub fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(std::mem::take(&mut self.kids)));
        pages.set("Count", Object::Integer(count));
        self.target
            .objects
            .insert(self.pages_root, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_root));
        let catalog_id = self.target.add_object(Object::Dictionary(catalog));
        self.target.trailer.set("Root", Object::Reference(catalog_id));

        let source = self.source;
        if let Ok(info) = source.trailer.get(b"Info") {
            let info = self.clone_value(info);
            if !matches!(info, Object::Null) {
                self.target.trailer.set("Info", info);
            }
        }

        debug!(
            pages = count,
            objects = self.target.objects.len(),
            "structural copy finished"
        );
        self.target
    }

    // -- Object graph ---------------------------------------------------------

    fn clone_value(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.clone_reference(*id),
            Object::Dictionary(dict) => Object::Dictionary(self.clone_dictionary(dict)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.clone_value(item)).collect())
            }
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.clone_dictionary(&stream.dict);
                Object::Stream(copied)
            }
            other => other.clone(),
        }
    }

    fn clone_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            let value = self.clone_value(value);
            copied.set(key.clone(), value);
        }
        copied
    }

    fn clone_reference(&mut self, id: ObjectId) -> Object {
        if self.dropped.contains(&id) {
            return Object::Null;
        }
        if let Some(mapped) = self.remap.get(&id) {
            return Object::Reference(*mapped);
        }

        let source = self.source;
        let object = match source.get_object(id) {
            Ok(object) => object,
            Err(err) => {
                warn!(?id, %err, "dangling reference replaced with null");
                return Object::Null;
            }
        };

        // Register before recursing so cycles terminate on the remap lookup.
        let new_id = self.target.new_object_id();
        self.remap.insert(id, new_id);
        let copied = self.clone_value(object);
        self.target.objects.insert(new_id, copied);
        Object::Reference(new_id)
    }
}

/// Copy `retained` pages of `source`, in order, into a new document.
pub fn copy_pages(source: &Document, retained: &[ObjectId]) -> lopdf::Result<Document> {
    let mut copier = PageCopier::new(source, retained);
    for page_id in retained {
        copier.copy_page(*page_id)?;
    }
    Ok(copier.finish())
}

/// Look `key` up on the ancestors of `page`, nearest first.
fn inherited_attribute<'d>(
    document: &'d Document,
    page: &'d Dictionary,
    key: &[u8],
) -> Option<&'d Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent {
        if depth >= MAX_TREE_DEPTH {
            warn!(?node_id, "page tree deeper than expected, inheritance lookup stopped");
            return None;
        }
        let node = document.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    None
}

fn is_type(dict: &Dictionary, name: &[u8]) -> bool {
    matches!(dict.get(b"Type").and_then(Object::as_name), Ok(found) if found == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_document;

    fn page_ids(doc: &Document) -> Vec<ObjectId> {
        doc.get_pages().into_values().collect()
    }

    fn page_text(doc: &Document, page_id: ObjectId) -> String {
        let content = doc.get_page_content(page_id).unwrap();
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn keeps_requested_pages_in_order() {
        let source = sample_document(4);
        let ids = page_ids(&source);

        let copied = copy_pages(&source, &[ids[3], ids[1]]).unwrap();

        let pages = page_ids(&copied);
        assert_eq!(pages.len(), 2);
        assert!(page_text(&copied, pages[0]).contains("(Page 4)"));
        assert!(page_text(&copied, pages[1]).contains("(Page 2)"));
    }

    #[test]
    fn inherited_attributes_are_materialised() {
        let source = sample_document(2);
        let ids = page_ids(&source);
        // The fixture keeps MediaBox and Resources on the Pages node only.
        assert!(!source.get_dictionary(ids[0]).unwrap().has(b"MediaBox"));

        let copied = copy_pages(&source, &[ids[1]]).unwrap();
        let page = copied.get_dictionary(page_ids(&copied)[0]).unwrap();

        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }

    #[test]
    fn shared_font_is_copied_once() {
        let source = sample_document(3);
        let ids = page_ids(&source);

        let copied = copy_pages(&source, &ids).unwrap();

        let fonts = copied
            .objects
            .values()
            .filter(|object| match object {
                Object::Dictionary(dict) => is_type(dict, b"Font"),
                _ => false,
            })
            .count();
        assert_eq!(fonts, 1);
    }

    #[test]
    fn references_to_removed_pages_become_null() {
        let mut source = sample_document(2);
        let ids = page_ids(&source);
        // Page 1 points at page 2 through a custom key.
        if let Ok(Object::Dictionary(page)) = source.get_object_mut(ids[0]) {
            page.set("Next", Object::Reference(ids[1]));
        }

        let copied = copy_pages(&source, &[ids[0]]).unwrap();
        let page = copied.get_dictionary(page_ids(&copied)[0]).unwrap();

        assert!(matches!(page.get(b"Next"), Ok(Object::Null)));
    }

    #[test]
    fn links_between_retained_pages_follow_the_copy() {
        let mut source = sample_document(3);
        let ids = page_ids(&source);
        if let Ok(Object::Dictionary(page)) = source.get_object_mut(ids[0]) {
            page.set("Next", Object::Reference(ids[2]));
        }

        let copied = copy_pages(&source, &[ids[0], ids[2]]).unwrap();
        let pages = page_ids(&copied);
        let first = copied.get_dictionary(pages[0]).unwrap();

        assert_eq!(first.get(b"Next").unwrap().as_reference().unwrap(), pages[1]);
    }

    #[test]
    fn info_dictionary_carried_over() {
        let source = sample_document(1);
        let ids = page_ids(&source);

        let copied = copy_pages(&source, &ids).unwrap();

        let info_id = copied.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = copied.get_dictionary(info_id).unwrap();
        assert!(info.has(b"Title"));
    }
}
