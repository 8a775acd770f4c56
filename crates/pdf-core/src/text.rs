//! Text operator generation

use crate::document::Color;
use crate::Anchor;

/// Context for rendering one text run
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "CG1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    /// Text width in points (for anchoring)
    pub text_width: f64,
    /// Fill color
    pub color: Color,
}

/// Generate PDF operators for one positioned text run
///
/// Creates the BT, rg, Tf, Td, Tj, ET sequence. A `Center` anchor shifts the
/// run left by half its width so that `x` is the visual midpoint.
///
/// # Arguments
/// * `text_hex` - Hex-encoded glyph IDs (e.g., "<00410042>")
/// * `x` - X coordinate in points from the page's left edge
/// * `y` - Baseline in points from the page's bottom edge
/// * `anchor` - How `x` relates to the run
/// * `ctx` - Text rendering context
pub fn generate_text_operators(
    text_hex: &str,
    x: f64,
    y: f64,
    anchor: Anchor,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let final_x = match anchor {
        Anchor::Start => x,
        Anchor::Center => x - ctx.text_width / 2.0,
    };

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{final_x} {y} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}
