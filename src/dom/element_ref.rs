//! `selectors::Element` implementation over [`ArenaDom`].

use std::fmt;

use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::MatchingContext;
use selectors::matching::ElementSelectorFlags;
use selectors::parser::SelectorParseErrorKind;
use selectors::{OpaqueElement, SelectorImpl};

use super::arena::{ArenaDom, NodeData, NodeId};

/// Selector implementation marker for the `selectors` crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomSelectors;

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        self.0
            .bytes()
            .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32))
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentStr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IdentStr {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssLocalName {
    fn from(s: String) -> Self {
        Self(LocalName::from(s))
    }
}

impl From<&str> for CssLocalName {
    fn from(s: &str) -> Self {
        Self(LocalName::from(s))
    }
}

impl AsRef<str> for CssLocalName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssNamespace {
    fn from(s: String) -> Self {
        Self(Namespace::from(s))
    }
}

impl From<&str> for CssNamespace {
    fn from(s: &str) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'i> selectors::parser::Parser<'i> for DomSelectors {
    type Impl = DomSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

/// No pseudo-elements are supported; the type is uninhabited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = DomSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        false
    }

    fn valid_after_slotted(&self) -> bool {
        false
    }
}

/// Only `:link` can match in a static document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {
    Link,
    Visited,
}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = DomSelectors;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::Link => dest.write_str(":link"),
            Self::Visited => dest.write_str(":visited"),
        }
    }
}

impl SelectorImpl for DomSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// An element of an [`ArenaDom`], as seen by the selector matcher.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub dom: &'a ArenaDom,
    pub id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(dom: &'a ArenaDom, id: NodeId) -> Self {
        Self { dom, id }
    }

    fn sibling_element(&self, step: impl Fn(&super::arena::Node) -> NodeId) -> Option<Self> {
        let mut current = step(self.dom.get(self.id)?);
        while let Some(node) = self.dom.get(current) {
            if matches!(node.data, NodeData::Element { .. }) {
                return Some(Self::new(self.dom, current));
            }
            current = step(node);
        }
        None
    }

    fn is_anchor_with_href(&self) -> bool {
        self.dom
            .element_name(self.id)
            .is_some_and(|n| n.as_ref() == "a")
            && self.dom.get_attr(self.id, "href").is_some()
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.dom.element_name(self.id))
            .finish()
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = DomSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        self.dom
            .parent(self.id)
            .filter(|&p| self.dom.is_element(p))
            .map(|p| Self::new(self.dom, p))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|n| n.prev_sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|n| n.next_sibling)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.dom
            .element_children(self.id)
            .next()
            .map(|c| Self::new(self.dom, c))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.dom.element_name(self.id).is_some_and(|n| n == &name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.dom
            .element_namespace(self.id)
            .is_some_and(|n| n == &ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.dom.element_name(self.id) == other.dom.element_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        let Some(NodeData::Element { attrs, .. }) = self.dom.get(self.id).map(|n| &n.data) else {
            return false;
        };
        attrs
            .iter()
            .filter(|attr| match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            })
            .find(|attr| attr.name.local == local_name.0)
            .is_some_and(|attr| operation.eval_str(&attr.value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match pc {
            NonTSPseudoClass::Link => self.is_anchor_with_href(),
            NonTSPseudoClass::Visited => false,
        }
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        self.is_anchor_with_href()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_id(self.id)
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_classes(self.id)
            .iter()
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.dom.children(self.id).all(|c| match self.dom.get(c).map(|n| &n.data) {
            Some(NodeData::Element { .. }) => false,
            Some(NodeData::Text(t)) => t.is_empty(),
            _ => true,
        })
    }

    fn is_root(&self) -> bool {
        self.dom
            .parent(self.id)
            .and_then(|p| self.dom.get(p))
            .is_some_and(|p| matches!(p.data, NodeData::Document))
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use selectors::context::SelectorCaches;
    use selectors::parser::Selector;

    use super::*;
    use crate::dom::parse_html;

    fn parse_selector(s: &str) -> Selector<DomSelectors> {
        let mut input = cssparser::ParserInput::new(s);
        let mut parser = cssparser::Parser::new(&mut input);
        Selector::parse(&DomSelectors, &mut parser).expect("valid selector")
    }

    fn matches(elem: ElementRef<'_>, selector: &str) -> bool {
        let selector = parse_selector(selector);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );
        selectors::matching::matches_selector(&selector, 0, None, &elem, &mut context)
    }

    #[test]
    fn test_type_class_and_id() {
        let dom = parse_html(r#"<p id="lead" class="intro wide">Hello</p>"#);
        let p = dom.find_by_tag("p").unwrap();
        let elem = ElementRef::new(&dom, p);

        assert!(matches(elem, "p"));
        assert!(matches(elem, ".intro"));
        assert!(matches(elem, "p.wide#lead"));
        assert!(!matches(elem, "div"));
        assert!(!matches(elem, ".missing"));
    }

    #[test]
    fn test_combinators() {
        let dom = parse_html("<div><span><b>x</b></span><i>y</i></div>");
        let b = ElementRef::new(&dom, dom.find_by_tag("b").unwrap());
        let i = ElementRef::new(&dom, dom.find_by_tag("i").unwrap());

        assert!(matches(b, "div b"));
        assert!(matches(b, "span > b"));
        assert!(!matches(b, "div > b"));
        assert!(matches(i, "span + i"));
    }

    #[test]
    fn test_attribute_selectors() {
        let dom = parse_html(r#"<a href="x.html" lang="en">go</a>"#);
        let a = ElementRef::new(&dom, dom.find_by_tag("a").unwrap());

        assert!(matches(a, "a[href]"));
        assert!(matches(a, "[lang=en]"));
        assert!(!matches(a, "a[title]"));
    }
}
