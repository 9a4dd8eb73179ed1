//! CSS cascade.
//!
//! [`Stylizer`] resolves the [`ComputedStyle`] of each element on demand and
//! caches the result, so a node's ancestors are styled at most once per unit.
//! Declarations are ordered by importance, then origin, then specificity,
//! then source order, and applied last-wins.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

use selectors::context::{MatchingContext, SelectorCaches};

use super::StyleResolver;
use super::computed::{
    Clear, ComputedStyle, Display, Float, FontStyle, Length, PageBreak, TextAlign, TextTransform,
    VerticalAlign, Visibility, WhiteSpace,
};
use super::stylesheet::{
    CssRule, Declaration, Origin, PropertyValue, Specificity, Stylesheet, parse_declarations,
};
use crate::dom::{ArenaDom, ElementRef, NodeId};
use crate::error::{Error, Result};

/// A matched declaration with its cascade sort key.
#[derive(Debug)]
struct MatchedRule<'a> {
    declaration: &'a Declaration,
    origin: Origin,
    specificity: Specificity,
    order: usize,
}

impl MatchedRule<'_> {
    fn cascade_cmp(&self, other: &Self) -> Ordering {
        self.declaration
            .important
            .cmp(&other.declaration.important)
            .then(self.origin.cmp(&other.origin))
            .then(self.specificity.cmp(&other.specificity))
            .then(self.order.cmp(&other.order))
    }
}

/// Resolves element styles for one parsed unit.
pub struct Stylizer<'a> {
    dom: &'a ArenaDom,
    sheets: Vec<(&'a Stylesheet, Origin)>,
    cache: HashMap<NodeId, Rc<ComputedStyle>>,
    root_style: Rc<ComputedStyle>,
}

impl<'a> Stylizer<'a> {
    /// Sheets apply in the order given; pass the user-agent sheet first.
    pub fn new(dom: &'a ArenaDom, sheets: Vec<(&'a Stylesheet, Origin)>) -> Self {
        Self {
            dom,
            sheets,
            cache: HashMap::new(),
            root_style: Rc::new(ComputedStyle::default()),
        }
    }

    /// Font size of the initial containing block, which `rem` and the
    /// absolute size keywords resolve against.
    pub fn with_base_font_size(mut self, size: f32) -> Self {
        self.root_style = Rc::new(ComputedStyle {
            font_size: size,
            ..ComputedStyle::default()
        });
        self
    }

    fn base_font_size(&self) -> f32 {
        self.root_style.font_size
    }

    /// Style of the nearest styled ancestor, or the root style.
    fn parent_style(&self, node: NodeId) -> Rc<ComputedStyle> {
        self.dom
            .parent(node)
            .and_then(|p| self.cache.get(&p))
            .cloned()
            .unwrap_or_else(|| Rc::clone(&self.root_style))
    }

    fn compute(&self, node: NodeId) -> ComputedStyle {
        let elem = ElementRef::new(self.dom, node);
        let mut caches = SelectorCaches::default();
        let mut matched: Vec<MatchedRule> = Vec::with_capacity(16);
        let mut order = 0;

        for (sheet, origin) in &self.sheets {
            for rule in &sheet.rules {
                let Some(specificity) = rule_specificity(elem, rule, &mut caches) else {
                    continue;
                };
                for declaration in &rule.declarations {
                    matched.push(MatchedRule {
                        declaration,
                        origin: *origin,
                        specificity,
                        order,
                    });
                    order += 1;
                }
            }
        }

        let inline = self
            .dom
            .get_attr(node, "style")
            .map(parse_declarations)
            .unwrap_or_default();
        for declaration in &inline {
            matched.push(MatchedRule {
                declaration,
                origin: Origin::Inline,
                specificity: Specificity::default(),
                order,
            });
            order += 1;
        }

        if matched.len() > 1 {
            matched.sort_by(MatchedRule::cascade_cmp);
        }

        let parent = self.parent_style(node);
        let mut style = ComputedStyle::inherit_from(&parent);
        let mut applier = DeclarationApplier {
            style: &mut style,
            parent: &parent,
            root_font_size: self.base_font_size(),
        };

        // Lengths in `em` depend on the element's own font size.
        for m in matched.iter().filter(|m| m.declaration.property == "font-size") {
            applier.apply(m.declaration);
        }
        for m in matched.iter().filter(|m| m.declaration.property != "font-size") {
            applier.apply(m.declaration);
        }

        style
    }
}

impl StyleResolver for Stylizer<'_> {
    fn style(&mut self, node: NodeId) -> Result<Rc<ComputedStyle>> {
        if let Some(style) = self.cache.get(&node) {
            return Ok(Rc::clone(style));
        }
        if !self.dom.is_element(node) {
            return Err(Error::StyleResolution {
                node: node.to_string(),
            });
        }

        // Style unresolved ancestors top-down so each sees its parent's style.
        let mut pending = vec![node];
        let mut current = node;
        while let Some(parent) = self.dom.parent(current) {
            if !self.dom.is_element(parent) || self.cache.contains_key(&parent) {
                break;
            }
            pending.push(parent);
            current = parent;
        }

        while let Some(id) = pending.pop() {
            let style = Rc::new(self.compute(id));
            self.cache.insert(id, style);
        }

        self.cache
            .get(&node)
            .cloned()
            .ok_or_else(|| Error::StyleResolution {
                node: node.to_string(),
            })
    }
}

/// The most specific selector of `rule` that matches `elem`, if any.
fn rule_specificity(
    elem: ElementRef<'_>,
    rule: &CssRule,
    caches: &mut SelectorCaches,
) -> Option<Specificity> {
    let mut context = MatchingContext::new(
        selectors::matching::MatchingMode::Normal,
        None,
        caches,
        selectors::context::QuirksMode::NoQuirks,
        selectors::matching::NeedsSelectorFlags::No,
        selectors::matching::MatchingForInvalidation::No,
    );

    rule.selectors
        .iter()
        .filter(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
        .map(Specificity::from_selector)
        .max()
}

struct DeclarationApplier<'s> {
    style: &'s mut ComputedStyle,
    parent: &'s ComputedStyle,
    root_font_size: f32,
}

impl DeclarationApplier<'_> {
    fn apply(&mut self, decl: &Declaration) {
        let property = decl.property.as_str();
        match decl.value.keyword() {
            Some("inherit") => {
                let parent = self.parent;
                return self.copy_from(property, parent);
            }
            Some("initial" | "unset") => {
                let initial = ComputedStyle {
                    font_size: self.root_font_size,
                    ..ComputedStyle::default()
                };
                return self.copy_from(property, &initial);
            }
            _ => {}
        }

        if property == "font-size" {
            if let Some(size) = self.resolve_font_size(&decl.value) {
                self.style.font_size = size;
            }
            return;
        }

        let style = &mut *self.style;
        let em = style.font_size;
        let root_em = self.root_font_size;
        let length = |value: &PropertyValue| match value {
            PropertyValue::Length(l) => Some(l.to_pt(em, root_em).unwrap_or(0.0)),
            _ => None,
        };

        match (property, &decl.value) {
            ("color", PropertyValue::Color(c)) => style.color = Some(*c),
            ("color", PropertyValue::Keyword(k)) if k == "currentcolor" => {}
            ("background-color", PropertyValue::Color(c)) => {
                style.background_color = (!c.is_transparent()).then_some(*c);
            }
            ("font-family", PropertyValue::String(s)) => style.font_family = Some(s.clone()),
            ("font-weight", PropertyValue::FontWeight(w)) => style.font_weight = *w,
            ("font-style", PropertyValue::Keyword(k)) => {
                style.font_style = match k.as_str() {
                    "italic" => FontStyle::Italic,
                    "oblique" => FontStyle::Oblique,
                    _ => FontStyle::Normal,
                };
            }
            ("font-variant", PropertyValue::Keyword(k)) => style.small_caps = k == "small-caps",
            ("text-transform", PropertyValue::Keyword(k)) => {
                style.text_transform = match k.as_str() {
                    "uppercase" => TextTransform::Uppercase,
                    "lowercase" => TextTransform::Lowercase,
                    "capitalize" => TextTransform::Capitalize,
                    _ => TextTransform::None,
                };
            }
            ("text-decoration-line", PropertyValue::Keyword(k)) => {
                style.underline = k.split(' ').any(|w| w == "underline");
                style.line_through = k.split(' ').any(|w| w == "line-through");
            }
            ("vertical-align", PropertyValue::Keyword(k)) => {
                style.vertical_align = match k.as_str() {
                    "super" => VerticalAlign::Super,
                    "sub" => VerticalAlign::Sub,
                    _ => VerticalAlign::Baseline,
                };
            }
            ("letter-spacing", PropertyValue::Keyword(k)) if k == "normal" => {
                style.letter_spacing = None;
            }
            ("letter-spacing", value) => {
                if let Some(pt) = length(value) {
                    style.letter_spacing = Some(pt);
                }
            }
            ("text-align", PropertyValue::Keyword(k)) => {
                style.text_align = match k.as_str() {
                    "left" => TextAlign::Left,
                    "right" | "end" => TextAlign::Right,
                    "center" => TextAlign::Center,
                    "justify" => TextAlign::Justify,
                    _ => TextAlign::Start,
                };
            }
            ("text-indent", value) => {
                if let Some(pt) = length(value) {
                    style.text_indent = pt;
                }
            }
            ("margin-top", value) => style.margin_top = length(value).unwrap_or(style.margin_top),
            ("margin-bottom", value) => {
                style.margin_bottom = length(value).unwrap_or(style.margin_bottom);
            }
            ("margin-left", value) => {
                style.margin_left = length(value).unwrap_or(style.margin_left);
            }
            ("margin-right", value) => {
                style.margin_right = length(value).unwrap_or(style.margin_right);
            }
            ("width", PropertyValue::Length(l)) => style.width = l.to_pt(em, root_em),
            ("height", PropertyValue::Length(l)) => style.height = l.to_pt(em, root_em),
            ("display", PropertyValue::Keyword(k)) => {
                if let Some(display) = Display::from_keyword(k) {
                    style.display = display;
                }
            }
            ("white-space", PropertyValue::Keyword(k)) => {
                if let Some(ws) = WhiteSpace::from_keyword(k) {
                    style.white_space = ws;
                }
            }
            ("float", PropertyValue::Keyword(k)) => {
                if let Some(float) = Float::from_keyword(k) {
                    style.float = float;
                }
            }
            ("clear", PropertyValue::Keyword(k)) => {
                if let Some(clear) = Clear::from_keyword(k) {
                    style.clear = clear;
                }
            }
            ("page-break-after", PropertyValue::Keyword(k)) => {
                if let Some(page_break) = PageBreak::from_keyword(k) {
                    style.page_break_after = page_break;
                }
            }
            ("visibility", PropertyValue::Keyword(k)) => {
                if let Some(visibility) = Visibility::from_keyword(k) {
                    style.visibility = visibility;
                }
            }
            _ => log::trace!("Ignoring declaration {property}: {:?}", decl.value),
        }
    }

    fn resolve_font_size(&self, value: &PropertyValue) -> Option<f32> {
        let parent = self.parent.font_size;
        let medium = self.root_font_size;
        match value {
            PropertyValue::Length(Length::Percent(p)) => Some(parent * p / 100.0),
            PropertyValue::Length(Length::Auto) => None,
            PropertyValue::Length(l) => l.to_pt(parent, medium),
            PropertyValue::Keyword(k) => Some(match k.as_str() {
                "xx-small" => medium * 3.0 / 5.0,
                "x-small" => medium * 3.0 / 4.0,
                "small" => medium * 8.0 / 9.0,
                "medium" => medium,
                "large" => medium * 6.0 / 5.0,
                "x-large" => medium * 3.0 / 2.0,
                "xx-large" => medium * 2.0,
                "smaller" => parent / 1.2,
                "larger" => parent * 1.2,
                _ => return None,
            }),
            _ => None,
        }
    }

    /// `inherit` / `initial`: copy one property's value from `source`.
    fn copy_from(&mut self, property: &str, source: &ComputedStyle) {
        let style = &mut *self.style;
        match property {
            "color" => style.color = source.color,
            "background-color" => style.background_color = source.background_color,
            "font-family" => style.font_family = source.font_family.clone(),
            "font-size" => style.font_size = source.font_size,
            "font-weight" => style.font_weight = source.font_weight,
            "font-style" => style.font_style = source.font_style,
            "font-variant" => style.small_caps = source.small_caps,
            "text-transform" => style.text_transform = source.text_transform,
            "text-decoration-line" => {
                style.underline = source.underline;
                style.line_through = source.line_through;
            }
            "vertical-align" => style.vertical_align = source.vertical_align,
            "letter-spacing" => style.letter_spacing = source.letter_spacing,
            "text-align" => style.text_align = source.text_align,
            "text-indent" => style.text_indent = source.text_indent,
            "margin-top" => style.margin_top = source.margin_top,
            "margin-bottom" => style.margin_bottom = source.margin_bottom,
            "margin-left" => style.margin_left = source.margin_left,
            "margin-right" => style.margin_right = source.margin_right,
            "width" => style.width = source.width,
            "height" => style.height = source.height,
            "display" => style.display = source.display,
            "white-space" => style.white_space = source.white_space,
            "float" => style.float = source.float,
            "clear" => style.clear = source.clear,
            "page-break-after" => style.page_break_after = source.page_break_after,
            "visibility" => style.visibility = source.visibility,
            _ => {}
        }
    }
}

/// Author stylesheets referenced by a unit, in document order.
///
/// `<style>` elements are read directly; `<link rel="stylesheet">` targets are
/// fetched through `load`, which receives the raw `href`. Sheets `load`
/// cannot provide are skipped.
pub fn document_stylesheets(
    dom: &ArenaDom,
    mut load: impl FnMut(&str) -> Option<String>,
) -> Vec<Stylesheet> {
    let mut sheets = Vec::new();
    let mut stack = vec![dom.document()];

    while let Some(id) = stack.pop() {
        match dom.element_name(id).map(|n| n.as_ref()) {
            Some("style") => {
                let css: String = dom
                    .children(id)
                    .filter_map(|c| dom.text_content(c))
                    .collect();
                sheets.push(Stylesheet::parse(&css));
                continue;
            }
            Some("link") => {
                let is_stylesheet = dom.get_attr(id, "rel").is_some_and(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("stylesheet"))
                });
                if let (true, Some(href)) = (is_stylesheet, dom.get_attr(id, "href")) {
                    match load(href) {
                        Some(css) => sheets.push(Stylesheet::parse(&css)),
                        None => log::warn!("Stylesheet not found: {href}"),
                    }
                }
                continue;
            }
            _ => {}
        }

        let mut children: Vec<_> = dom.element_children(id).collect();
        children.reverse();
        stack.extend(children);
    }

    sheets
}
