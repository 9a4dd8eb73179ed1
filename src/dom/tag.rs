//! Tag-name classification.
//!
//! The converter only distinguishes a handful of HTML elements by name; every
//! tag-name comparison lives here so the walker can branch on [`TagKind`].

use html5ever::LocalName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `script`, `style`, `title`, `meta`: never produce content.
    NonContent,
    /// `br`
    LineBreak,
    /// `img`
    Image,
    Other,
}

impl TagKind {
    pub fn of(local_name: &LocalName) -> Self {
        match local_name.as_ref() {
            "script" | "style" | "title" | "meta" => TagKind::NonContent,
            "br" => TagKind::LineBreak,
            "img" => TagKind::Image,
            _ => TagKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_kinds() {
        assert_eq!(TagKind::of(&LocalName::from("script")), TagKind::NonContent);
        assert_eq!(TagKind::of(&LocalName::from("meta")), TagKind::NonContent);
        assert_eq!(TagKind::of(&LocalName::from("br")), TagKind::LineBreak);
        assert_eq!(TagKind::of(&LocalName::from("img")), TagKind::Image);
        assert_eq!(TagKind::of(&LocalName::from("p")), TagKind::Other);
        assert_eq!(TagKind::of(&LocalName::from("link")), TagKind::Other);
    }
}
