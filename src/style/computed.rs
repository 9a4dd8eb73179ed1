//! Computed style values.

/// Font size used when nothing in the cascade sets one, in points.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// CSS `display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    ListItem,
    Table,
    InlineTable,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableRow,
    TableColumnGroup,
    TableColumn,
    TableCell,
    TableCaption,
    /// Layout models the converter has no special handling for
    /// (`flex`, `grid`, `flow-root`, ...). They behave like `block`.
    Other,
    None,
}

impl Display {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        Some(match kw {
            "inline" => Display::Inline,
            "block" => Display::Block,
            "inline-block" => Display::InlineBlock,
            "list-item" => Display::ListItem,
            "table" => Display::Table,
            "inline-table" => Display::InlineTable,
            "table-row-group" => Display::TableRowGroup,
            "table-header-group" => Display::TableHeaderGroup,
            "table-footer-group" => Display::TableFooterGroup,
            "table-row" => Display::TableRow,
            "table-column-group" => Display::TableColumnGroup,
            "table-column" => Display::TableColumn,
            "table-cell" => Display::TableCell,
            "table-caption" => Display::TableCaption,
            "none" => Display::None,
            "flex" | "grid" | "flow-root" | "run-in" | "contents" | "inline-flex"
            | "inline-grid" => Display::Other,
            _ => return None,
        })
    }

    /// `table`, `inline-table` and every `table-*` value.
    pub fn is_table_part(self) -> bool {
        matches!(
            self,
            Display::Table
                | Display::InlineTable
                | Display::TableRowGroup
                | Display::TableHeaderGroup
                | Display::TableFooterGroup
                | Display::TableRow
                | Display::TableColumnGroup
                | Display::TableColumn
                | Display::TableCell
                | Display::TableCaption
        )
    }
}

/// CSS `white-space`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WhiteSpace {
    #[default]
    Normal,
    NoWrap,
    Pre,
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        Some(match kw {
            "normal" => WhiteSpace::Normal,
            "nowrap" => WhiteSpace::NoWrap,
            "pre" => WhiteSpace::Pre,
            "pre-wrap" => WhiteSpace::PreWrap,
            "pre-line" => WhiteSpace::PreLine,
            _ => return None,
        })
    }

    /// Whether text is kept verbatim.
    pub fn preserves(self) -> bool {
        matches!(self, WhiteSpace::Pre | WhiteSpace::PreWrap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

impl Float {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        Some(match kw {
            "none" => Float::None,
            "left" => Float::Left,
            "right" => Float::Right,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Clear {
    #[default]
    None,
    Left,
    Right,
    Both,
}

impl Clear {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        Some(match kw {
            "none" => Clear::None,
            "left" => Clear::Left,
            "right" => Clear::Right,
            "both" => Clear::Both,
            _ => return None,
        })
    }
}

/// CSS `page-break-after` (and the `break-after` values that map onto it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageBreak {
    #[default]
    Auto,
    Always,
    Avoid,
    Left,
    Right,
}

impl PageBreak {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        Some(match kw {
            "auto" => PageBreak::Auto,
            "always" | "page" => PageBreak::Always,
            "avoid" | "avoid-page" => PageBreak::Avoid,
            "left" => PageBreak::Left,
            "right" => PageBreak::Right,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        Some(match kw {
            "visible" => Visibility::Visible,
            "hidden" => Visibility::Hidden,
            "collapse" => Visibility::Collapse,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Super,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Left,
    Right,
    Center,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// `RRGGBB`, the form WordprocessingML expects.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A length as written in CSS, before resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Pt(f32),
    Em(f32),
    Rem(f32),
    Percent(f32),
    Auto,
}

impl Length {
    /// Resolve to points. `em` is the font size the length is relative to.
    /// Percentages and `auto` have no fixed size and resolve to `None`.
    pub fn to_pt(self, em: f32, root_em: f32) -> Option<f32> {
        match self {
            Length::Px(v) => Some(v * 0.75),
            Length::Pt(v) => Some(v),
            Length::Em(v) => Some(v * em),
            Length::Rem(v) => Some(v * root_em),
            Length::Percent(_) | Length::Auto => None,
        }
    }
}

/// The resolved style of one element.
///
/// Lengths are in points. Inherited properties are copied from the parent
/// by [`ComputedStyle::inherit_from`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    // Properties the converter dispatches on
    pub display: Display,
    pub white_space: WhiteSpace,
    pub float: Float,
    pub clear: Clear,
    pub page_break_after: PageBreak,
    pub visibility: Visibility,

    // Character formatting
    pub font_family: Option<String>,
    pub font_size: f32,
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub small_caps: bool,
    pub text_transform: TextTransform,
    pub underline: bool,
    pub line_through: bool,
    pub vertical_align: VerticalAlign,
    pub color: Option<Color>,
    pub background_color: Option<Color>,
    /// `None` for `letter-spacing: normal`.
    pub letter_spacing: Option<f32>,

    // Paragraph formatting
    pub text_align: TextAlign,
    pub text_indent: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,

    // Replaced-element sizing
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            white_space: WhiteSpace::Normal,
            float: Float::None,
            clear: Clear::None,
            page_break_after: PageBreak::Auto,
            visibility: Visibility::Visible,
            font_family: None,
            font_size: DEFAULT_FONT_SIZE,
            font_weight: 400,
            font_style: FontStyle::Normal,
            small_caps: false,
            text_transform: TextTransform::None,
            underline: false,
            line_through: false,
            vertical_align: VerticalAlign::Baseline,
            color: None,
            background_color: None,
            letter_spacing: None,
            text_align: TextAlign::Start,
            text_indent: 0.0,
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            width: None,
            height: None,
        }
    }
}

impl ComputedStyle {
    /// Initial values with the inherited properties taken from `parent`.
    ///
    /// Text decorations are not inherited in CSS but are drawn through
    /// descendants, so they propagate here too.
    pub fn inherit_from(parent: &ComputedStyle) -> Self {
        Self {
            white_space: parent.white_space,
            visibility: parent.visibility,
            font_family: parent.font_family.clone(),
            font_size: parent.font_size,
            font_weight: parent.font_weight,
            font_style: parent.font_style,
            small_caps: parent.small_caps,
            text_transform: parent.text_transform,
            underline: parent.underline,
            line_through: parent.line_through,
            color: parent.color,
            letter_spacing: parent.letter_spacing,
            text_align: parent.text_align,
            text_indent: parent.text_indent,
            ..Self::default()
        }
    }

    /// `display: none` or `visibility: hidden`.
    pub fn is_hidden(&self) -> bool {
        self.display == Display::None || self.visibility == Visibility::Hidden
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight >= 600
    }

    pub fn is_italic(&self) -> bool {
        self.font_style != FontStyle::Normal
    }
}
