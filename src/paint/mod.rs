/// Color definitions and CSS-style color construction.
pub mod color;
