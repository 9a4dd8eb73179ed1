//! Style resolution.
//!
//! The converter asks a [`StyleResolver`] for the [`ComputedStyle`] of each
//! element it visits. [`Stylizer`] is the CSS cascade implementation used by
//! default: user-agent defaults, `<style>` and linked sheets, and `style=""`
//! attributes.

mod cascade;
mod computed;
mod stylesheet;
mod user_agent;

use std::rc::Rc;

pub use cascade::{Stylizer, document_stylesheets};
pub use computed::{
    Clear, Color, ComputedStyle, DEFAULT_FONT_SIZE, Display, Float, FontStyle, Length, PageBreak,
    TextAlign, TextTransform, VerticalAlign, Visibility, WhiteSpace,
};
pub use stylesheet::{CssRule, Declaration, Origin, PropertyValue, Specificity, Stylesheet};
pub use user_agent::user_agent_stylesheet;

use crate::dom::NodeId;
use crate::error::Result;

/// Source of computed styles for the elements of one unit.
pub trait StyleResolver {
    /// The computed style of an element.
    ///
    /// Fails with [`Error::StyleResolution`](crate::Error::StyleResolution)
    /// when `node` is not an element of the unit.
    fn style(&mut self, node: NodeId) -> Result<Rc<ComputedStyle>>;
}
