//! Input documents: an ordered list of HTML units plus the resources they
//! reference.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::util::decode_markup;

/// One entry of the reading order.
#[derive(Debug, Clone)]
pub struct SpineItem {
    pub href: String,
    pub data: Vec<u8>,
}

/// The HTML units to convert, in reading order, and the resources (images,
/// stylesheets) they refer to by href.
///
/// Resources are looked up in memory first, then, when the document was
/// opened from disk, relative to its root directory.
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    spine: Vec<SpineItem>,
    resources: HashMap<String, Vec<u8>>,
    root: Option<PathBuf>,
}

impl SourceDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open HTML files as units, in the order given.
    ///
    /// Hrefs are taken relative to the directory of the first file, so
    /// relative links between units and to their images keep working.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let root = paths
            .first()
            .and_then(|p| p.as_ref().parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut doc = Self {
            root: Some(root.clone()),
            ..Self::default()
        };
        for path in paths {
            let path = path.as_ref();
            let data = std::fs::read(path)?;
            let href = path
                .strip_prefix(&root)
                .unwrap_or(path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            doc.spine.push(SpineItem { href, data });
        }
        log::debug!("Opened {} units under {}", doc.spine.len(), root.display());
        Ok(doc)
    }

    /// Append an HTML unit to the reading order.
    pub fn add_unit(&mut self, href: impl Into<String>, html: impl Into<Vec<u8>>) -> &mut Self {
        self.spine.push(SpineItem {
            href: href.into(),
            data: html.into(),
        });
        self
    }

    /// Register a resource such as an image or stylesheet.
    pub fn add_resource(&mut self, href: impl Into<String>, data: impl Into<Vec<u8>>) -> &mut Self {
        self.resources.insert(href.into(), data.into());
        self
    }

    pub fn spine(&self) -> &[SpineItem] {
        &self.spine
    }

    /// Bytes of the resource at `href`.
    pub fn resource(&self, href: &str) -> Option<Cow<'_, [u8]>> {
        if let Some(data) = self.resources.get(href) {
            return Some(Cow::Borrowed(data));
        }
        if let Some(unit) = self.spine.iter().find(|u| u.href == href) {
            return Some(Cow::Borrowed(&unit.data));
        }

        let root = self.root.as_ref()?;
        let path = root.join(href);
        // Keep lookups inside the document root.
        if !path.starts_with(root) || href.split('/').any(|s| s == "..") {
            return None;
        }
        std::fs::read(&path).ok().map(Cow::Owned)
    }

    /// Decoded text of the resource at `href`.
    pub fn resource_text(&self, href: &str) -> Option<String> {
        let data = self.resource(href)?;
        Some(decode_markup(&data).into_owned())
    }

    /// Like [`SourceDocument::resource`], failing with
    /// [`Error::MissingResource`].
    pub fn require(&self, href: &str) -> Result<Cow<'_, [u8]>> {
        self.resource(href)
            .ok_or_else(|| Error::MissingResource(href.to_string()))
    }
}
