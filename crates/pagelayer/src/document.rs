//! Splitting a draw.io document into pages.

use std::{fs, path::Path};

use log::{debug, trace};

use crate::{
    PagelayerError,
    xml::{Element, Node, XmlError},
};

/// One page (diagram sheet) of a draw.io document.
#[derive(Debug, Clone)]
pub struct Page {
    name: String,
    index: usize,
    tree: Element,
}

impl Page {
    /// Display name of the page, empty when the document does not name it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based position of the page in the document.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The `diagram` element holding the page content.
    pub fn tree(&self) -> &Element {
        &self.tree
    }
}

/// Splits an uncompressed draw.io document into its pages, in document order.
///
/// Every immediate child of the document root named `diagram` is a page.
///
/// # Errors
///
/// Returns [`XmlError`] if the document is not well-formed.
pub fn get_pages(document: &str) -> Result<Vec<Page>, XmlError> {
    let root = Element::parse(document)?;

    let pages: Vec<Page> = root
        .into_children()
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(element) if element.name() == "diagram" => Some(element),
            _ => None,
        })
        .enumerate()
        .map(|(index, tree)| Page {
            name: tree.attribute("name").unwrap_or_default().to_string(),
            index,
            tree,
        })
        .collect();

    debug!(pages_count = pages.len(); "Document split into pages");
    trace!(pages:?; "Pages");
    Ok(pages)
}

/// Reads a document from disk and splits it into pages.
///
/// # Errors
///
/// Returns [`PagelayerError::Io`] if the file cannot be read and
/// [`PagelayerError::Xml`] if it cannot be parsed.
pub fn read_pages(path: &Path) -> Result<Vec<Page>, PagelayerError> {
    let document = fs::read_to_string(path)?;
    get_pages(&document).map_err(|source| PagelayerError::Xml {
        path: path.to_path_buf(),
        source,
    })
}
