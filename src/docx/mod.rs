//! Conversion into the WordprocessingML paragraph model.
//!
//! [`Converter`] walks each unit's DOM, building [`Paragraph`]s of [`Run`]s
//! in a shared [`Blocks`] sequence. Character and paragraph styles are
//! interned through a [`StyleRegistry`] and pictures through an
//! [`ImageEmbedder`]; [`StylesManager`] and [`ImagesManager`] are the
//! implementations used by default.

mod blocks;
mod convert;
mod document;
mod images;
mod paragraph;
mod run;
mod serialize;
mod styles;

pub use blocks::{Blocks, UnitMark};
pub use convert::{ElementCategory, Walker};
pub use document::{Converter, DocxDocument};
pub use images::{Drawing, EmbeddedImage, FloatSide, ImageEmbedder, ImagesManager, UnitImages};
pub use paragraph::{Paragraph, TextOptions};
pub use run::{BreakClear, Run, Token, collapse_whitespace};
pub use serialize::{document_xml, write_paragraph, write_run};
pub use styles::{BlockStyle, BlockStyleId, StyleRegistry, StylesManager, TextStyle, TextStyleId};
