//! Positional style parsing.
//!
//! The converter writes every layout box as an inline declaration such as
//! `left:12.5mm;top:3mm;width:50%;height:4.2mm`. Percentages are always
//! relative to the page, never to the parent box.

use crate::model::{PageDimensions, StyleBox};

/// Parse the positional part of a style declaration.
///
/// Missing keys default to 0 and unknown keys are ignored. A value that is
/// not a number zeroes the whole box.
pub fn parse_style(style: &str, page: PageDimensions) -> StyleBox {
    let mut style_box = StyleBox::default();

    for declaration in style.split(';') {
        let Some((key, value)) = declaration.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let reference = match key.as_str() {
            "left" | "width" => page.width,
            "top" | "height" => page.height,
            _ => continue,
        };
        let Some(mm) = parse_length(value, reference) else {
            log::warn!("Malformed style value '{}' in '{}'", value.trim(), style);
            return StyleBox::default();
        };
        match key.as_str() {
            "left" => style_box.left = mm,
            "top" => style_box.top = mm,
            "width" => style_box.width = mm,
            _ => style_box.height = mm,
        }
    }

    style_box
}

/// Parse a style declaration that carries no percentages.
pub fn parse_style_absolute(style: &str) -> StyleBox {
    parse_style(style, PageDimensions::default())
}

/// Read a page container's absolute size from its style.
pub fn page_dimensions(style: &str) -> PageDimensions {
    let parsed = parse_style_absolute(style);
    PageDimensions::new(parsed.width, parsed.height)
}

/// Parse one length (`12mm`, `12`, `50%`) into millimetres.
fn parse_length(value: &str, reference: f64) -> Option<f64> {
    let value = value.trim();
    if let Some(percent) = value.strip_suffix('%') {
        let percent: f64 = percent.trim().parse().ok()?;
        return Some(percent / 100.0 * reference);
    }
    let number = value.strip_suffix("mm").unwrap_or(value).trim();
    let mm: f64 = number.parse().ok()?;
    mm.is_finite().then_some(mm)
}
