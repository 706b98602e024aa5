//! siluet-export: Pure format serializers (sans-IO)
//!
//! Converts collision outlines into inspection formats. Currently
//! supports SVG debug views; the binary runtime format lives in
//! `siluet-collide` itself.

pub mod svg;

pub use svg::{SvgOptions, to_svg};
