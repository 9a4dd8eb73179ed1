//! CSS stylesheet and declaration parsing.

use std::cmp::Ordering;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser, Token,
};
use selectors::parser::{ParseRelative, Selector, SelectorList};

use super::computed::{Color, Length};
use crate::dom::DomSelectors;

/// A parsed CSS stylesheet.
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

#[derive(Debug, Clone)]
pub struct CssRule {
    pub selectors: Vec<Selector<DomSelectors>>,
    pub declarations: Vec<Declaration>,
}

/// One `property: value` pair. Shorthands are expanded at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: PropertyValue,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Color(Color),
    Length(Length),
    FontWeight(u16),
    String(String),
    Keyword(String),
    None,
}

impl PropertyValue {
    pub fn keyword(&self) -> Option<&str> {
        match self {
            PropertyValue::Keyword(k) => Some(k),
            _ => None,
        }
    }
}

/// CSS specificity for cascade ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Specificity {
    pub ids: u16,
    pub classes: u16,
    pub elements: u16,
}

impl Specificity {
    pub fn from_selector(selector: &Selector<DomSelectors>) -> Self {
        // selectors packs specificity as (ids << 20) | (classes << 10) | elements
        let packed = selector.specificity();
        Self {
            ids: ((packed >> 20) & 0x3FF) as u16,
            classes: ((packed >> 10) & 0x3FF) as u16,
            elements: (packed & 0x3FF) as u16,
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ids
            .cmp(&other.ids)
            .then(self.classes.cmp(&other.classes))
            .then(self.elements.cmp(&other.elements))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Where a declaration came from. Later variants win at equal importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    UserAgent = 0,
    Author = 1,
    /// `style=""` attributes.
    Inline = 2,
}

impl Stylesheet {
    /// Parse a stylesheet. Invalid rules and declarations are dropped.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();

        let mut rule_parser = TopLevelRuleParser { rules: &mut rules };
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            if let Err((err, slice)) = result {
                log::trace!("Skipping CSS rule {slice:?}: {:?}", err.kind);
            }
        }

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parse the body of a `style=""` attribute.
pub fn parse_declarations(css: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();
    let mut decl_parser = DeclarationListParser {
        declarations: &mut declarations,
    };
    for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
        let _ = result;
    }
    declarations
}

struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<CssRule>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        // @media, @font-face, @page and friends do not affect paragraph flow.
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<Selector<DomSelectors>>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let location = input.current_source_location();
        SelectorList::parse(&DomSelectors, input, ParseRelative::No)
            .map(|list| list.slice().to_vec())
            .map_err(|_| location.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut declarations = Vec::new();
        let mut decl_parser = DeclarationListParser {
            declarations: &mut declarations,
        };
        for result in RuleBodyParser::new(input, &mut decl_parser) {
            let _ = result;
        }
        self.rules.push(CssRule {
            selectors: prelude,
            declarations,
        });
        Ok(())
    }
}

struct DeclarationListParser<'a> {
    declarations: &'a mut Vec<Declaration>,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();
}

impl<'i> DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let property = name.to_ascii_lowercase();
        let values = parse_property(&property, input);
        let important = input.try_parse(cssparser::parse_important).is_ok();

        for (property, value) in values {
            if value != PropertyValue::None {
                self.declarations.push(Declaration {
                    property,
                    value,
                    important,
                });
            }
        }
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parse one property, expanding shorthands into longhand declarations.
fn parse_property(property: &str, input: &mut Parser<'_, '_>) -> Vec<(String, PropertyValue)> {
    let single = |value: Option<PropertyValue>| {
        vec![(property.to_string(), value.unwrap_or(PropertyValue::None))]
    };

    let values = match property {
        "color" | "background-color" => single(parse_color(input)),
        "background" => {
            let mut color = None;
            while !input.is_exhausted() {
                if let Ok(c) = input.try_parse(|i| parse_color(i).ok_or(())) {
                    color = Some(c);
                } else if !skip_value_token(input) {
                    break;
                }
            }
            vec![(
                "background-color".to_string(),
                color.unwrap_or(PropertyValue::None),
            )]
        }
        "font-size" => single(parse_font_size(input)),
        "margin-top" | "margin-bottom" | "margin-left" | "margin-right" | "text-indent"
        | "width" | "height" => single(parse_length(input)),
        "letter-spacing" => single(
            input
                .try_parse(|i| i.expect_ident_matching("normal"))
                .map(|_| PropertyValue::Keyword("normal".to_string()))
                .ok()
                .or_else(|| parse_length(input)),
        ),
        "margin" => {
            let mut sides = Vec::new();
            while sides.len() < 4 {
                match input.try_parse(|i| parse_length(i).ok_or(())) {
                    Ok(v) => sides.push(v),
                    Err(_) => break,
                }
            }
            // CSS box shorthand: top, right, bottom, left
            let (top, right, bottom, left) = match sides.as_slice() {
                [a] => (a, a, a, a),
                [a, b] => (a, b, a, b),
                [a, b, c] => (a, b, c, b),
                [a, b, c, d] => (a, b, c, d),
                _ => return Vec::new(),
            };
            vec![
                ("margin-top".to_string(), top.clone()),
                ("margin-right".to_string(), right.clone()),
                ("margin-bottom".to_string(), bottom.clone()),
                ("margin-left".to_string(), left.clone()),
            ]
        }
        "font-weight" => single(parse_font_weight(input)),
        "font-family" => single(parse_font_family(input)),
        "text-decoration" | "text-decoration-line" => {
            let mut keywords = Vec::new();
            while let Ok(token) = input.try_parse(|i| i.expect_ident_cloned()) {
                keywords.push(token.to_ascii_lowercase());
            }
            let value = (!keywords.is_empty()).then(|| PropertyValue::Keyword(keywords.join(" ")));
            vec![("text-decoration-line".to_string(), value.unwrap_or(PropertyValue::None))]
        }
        "break-after" => vec![(
            "page-break-after".to_string(),
            parse_keyword(input).unwrap_or(PropertyValue::None),
        )],
        "font-variant-caps" => vec![(
            "font-variant".to_string(),
            parse_keyword(input).unwrap_or(PropertyValue::None),
        )],
        "display" | "white-space" | "float" | "clear" | "page-break-after" | "visibility"
        | "font-style" | "text-align" | "vertical-align" | "text-transform" | "font-variant" => {
            single(parse_keyword(input))
        }
        _ => Vec::new(),
    };

    // Drop anything unparsed, stopping before `!important`.
    while skip_value_token(input) {}
    values
}

/// Consume one token unless it starts `!important`.
fn skip_value_token(input: &mut Parser<'_, '_>) -> bool {
    input
        .try_parse(|i| match i.next() {
            Ok(Token::Delim('!')) | Err(_) => Err(()),
            Ok(_) => Ok(()),
        })
        .is_ok()
}

fn parse_keyword(input: &mut Parser<'_, '_>) -> Option<PropertyValue> {
    let token = input.expect_ident_cloned().ok()?;
    Some(PropertyValue::Keyword(token.to_ascii_lowercase()))
}

fn parse_color(input: &mut Parser<'_, '_>) -> Option<PropertyValue> {
    if let Ok(token) = input.try_parse(|i| i.expect_ident_cloned()) {
        let color = match token.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "blue" => Color::rgb(0, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "cyan" | "aqua" => Color::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "silver" => Color::rgb(192, 192, 192),
            "maroon" => Color::rgb(128, 0, 0),
            "navy" => Color::rgb(0, 0, 128),
            "olive" => Color::rgb(128, 128, 0),
            "purple" => Color::rgb(128, 0, 128),
            "teal" => Color::rgb(0, 128, 128),
            "lime" => Color::rgb(0, 255, 0),
            "orange" => Color::rgb(255, 165, 0),
            "transparent" => Color::TRANSPARENT,
            kw @ ("inherit" | "initial" | "unset" | "currentcolor") => {
                return Some(PropertyValue::Keyword(kw.to_string()));
            }
            _ => return None,
        };
        return Some(PropertyValue::Color(color));
    }

    let hash = input.try_parse(|i| match i.next() {
        Ok(Token::IDHash(hash) | Token::Hash(hash)) => Ok(hash.clone()),
        _ => Err(()),
    });
    if let Ok(hash) = hash {
        return parse_hex_color(hash.as_ref()).map(PropertyValue::Color);
    }

    input
        .try_parse(parse_rgb_function)
        .ok()
        .map(PropertyValue::Color)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        6 => Some(Color::rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        8 => Some(Color::rgba(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

fn parse_rgb_function<'i>(input: &mut Parser<'i, '_>) -> Result<Color, ParseError<'i, ()>> {
    let name = input.expect_function()?.clone();
    let has_alpha = match name.to_ascii_lowercase().as_str() {
        "rgb" => false,
        "rgba" => true,
        _ => return Err(input.new_custom_error(())),
    };
    input.parse_nested_block(|input| {
        let r = parse_color_component(input)?;
        input.expect_comma()?;
        let g = parse_color_component(input)?;
        input.expect_comma()?;
        let b = parse_color_component(input)?;
        let mut a = 255;
        if has_alpha && input.try_parse(|i| i.expect_comma()).is_ok() {
            let alpha = input.expect_number()?;
            a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        Ok(Color::rgba(r, g, b, a))
    })
}

fn parse_color_component<'i>(input: &mut Parser<'i, '_>) -> Result<u8, ParseError<'i, ()>> {
    let location = input.current_source_location();
    match input.next()? {
        Token::Number { value, .. } => Ok(value.round().clamp(0.0, 255.0) as u8),
        Token::Percentage { unit_value, .. } => {
            Ok((unit_value * 255.0).round().clamp(0.0, 255.0) as u8)
        }
        _ => Err(location.new_custom_error(())),
    }
}

fn parse_length(input: &mut Parser<'_, '_>) -> Option<PropertyValue> {
    let length = match input.next().ok()? {
        Token::Dimension { value, unit, .. } => match unit.to_ascii_lowercase().as_str() {
            "px" => Length::Px(*value),
            "pt" => Length::Pt(*value),
            "pc" => Length::Pt(*value * 12.0),
            "in" => Length::Pt(*value * 72.0),
            "cm" => Length::Pt(*value * 72.0 / 2.54),
            "mm" => Length::Pt(*value * 72.0 / 25.4),
            "em" => Length::Em(*value),
            "rem" => Length::Rem(*value),
            _ => return None,
        },
        Token::Percentage { unit_value, .. } => Length::Percent(*unit_value * 100.0),
        Token::Number { value, .. } if *value == 0.0 => Length::Px(0.0),
        Token::Ident(ident) => match ident.to_ascii_lowercase().as_str() {
            "auto" => Length::Auto,
            kw @ ("inherit" | "initial" | "unset") => {
                return Some(PropertyValue::Keyword(kw.to_string()));
            }
            _ => return None,
        },
        _ => return None,
    };
    Some(PropertyValue::Length(length))
}

fn parse_font_size(input: &mut Parser<'_, '_>) -> Option<PropertyValue> {
    if let Ok(token) = input.try_parse(|i| i.expect_ident_cloned()) {
        let kw = token.to_ascii_lowercase();
        return match kw.as_str() {
            "xx-small" | "x-small" | "small" | "medium" | "large" | "x-large" | "xx-large"
            | "smaller" | "larger" | "inherit" | "initial" | "unset" => {
                Some(PropertyValue::Keyword(kw))
            }
            _ => None,
        };
    }
    parse_length(input)
}

fn parse_font_weight(input: &mut Parser<'_, '_>) -> Option<PropertyValue> {
    if let Ok(token) = input.try_parse(|i| i.expect_ident_cloned()) {
        let weight = match token.to_ascii_lowercase().as_str() {
            "normal" => 400,
            "bold" => 700,
            "lighter" => 300,
            "bolder" => 700,
            kw @ ("inherit" | "initial" | "unset") => {
                return Some(PropertyValue::Keyword(kw.to_string()));
            }
            _ => return None,
        };
        return Some(PropertyValue::FontWeight(weight));
    }

    match input.next().ok()? {
        Token::Number {
            int_value: Some(v), ..
        } if (1..=1000).contains(v) => Some(PropertyValue::FontWeight(*v as u16)),
        _ => None,
    }
}

fn parse_font_family(input: &mut Parser<'_, '_>) -> Option<PropertyValue> {
    let mut families = Vec::new();
    loop {
        if let Ok(name) = input.try_parse(|i| i.expect_string_cloned()) {
            families.push(name.to_string());
        } else {
            // Unquoted family names may span several identifiers.
            let mut words = Vec::new();
            while let Ok(word) = input.try_parse(|i| i.expect_ident_cloned()) {
                words.push(word.to_string());
            }
            if words.is_empty() {
                break;
            }
            families.push(words.join(" "));
        }
        if input.try_parse(|i| i.expect_comma()).is_err() {
            break;
        }
    }
    families
        .into_iter()
        .next()
        .map(|first| match first.as_str() {
            "inherit" | "initial" | "unset" => PropertyValue::Keyword(first),
            _ => PropertyValue::String(first),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_rule() {
        let sheet = Stylesheet::parse("p { color: red; }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors.len(), 1);
        assert_eq!(
            sheet.rules[0].declarations,
            vec![Declaration {
                property: "color".to_string(),
                value: PropertyValue::Color(Color::rgb(255, 0, 0)),
                important: false,
            }]
        );
    }

    #[test]
    fn test_selector_list_and_skipped_at_rules() {
        let sheet = Stylesheet::parse(
            "@media print { p { color: red } } h1, h2 { white-space: pre } ::bogus( { }",
        );
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors.len(), 2);
    }

    #[test]
    fn test_margin_shorthand_expands() {
        let decls = parse_declarations("margin: 1em 2px");
        let props: Vec<_> = decls.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(
            props,
            ["margin-top", "margin-right", "margin-bottom", "margin-left"]
        );
        assert_eq!(decls[1].value, PropertyValue::Length(Length::Px(2.0)));
        assert_eq!(decls[2].value, PropertyValue::Length(Length::Em(1.0)));
    }

    #[test]
    fn test_important_flag() {
        let decls = parse_declarations("color: #0f0 !important; float: LEFT");
        assert_eq!(decls.len(), 2);
        assert!(decls[0].important);
        assert_eq!(decls[0].value, PropertyValue::Color(Color::rgb(0, 255, 0)));
        assert!(!decls[1].important);
        assert_eq!(decls[1].value.keyword(), Some("left"));
    }

    #[test]
    fn test_break_after_maps_to_page_break_after() {
        let decls = parse_declarations("break-after: avoid");
        assert_eq!(decls[0].property, "page-break-after");
        assert_eq!(decls[0].value.keyword(), Some("avoid"));
    }

    #[test]
    fn test_background_shorthand_color() {
        let decls = parse_declarations("background: url(x.png) no-repeat #ffffff");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].property, "background-color");
        assert_eq!(decls[0].value, PropertyValue::Color(Color::WHITE));
    }

    #[test]
    fn test_font_family_first_entry() {
        let decls = parse_declarations("font-family: Times New Roman, serif");
        assert_eq!(
            decls[0].value,
            PropertyValue::String("Times New Roman".to_string())
        );
    }

    #[test]
    fn test_unknown_properties_dropped() {
        assert!(parse_declarations("transform: rotate(4deg); display: grid").len() == 1);
    }

    #[test]
    fn test_specificity_ordering() {
        let id = Specificity {
            ids: 1,
            classes: 0,
            elements: 0,
        };
        let classes = Specificity {
            ids: 0,
            classes: 10,
            elements: 0,
        };
        assert!(id > classes);
    }
}
