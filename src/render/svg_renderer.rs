use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::core::Anchor;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, RenderFrame, Renderer, TextHAlign, Transition};

const DESELECTED_OPACITY: f64 = 0.2;

/// Serializes every frame into a standalone SVG document per anchor.
///
/// Transitions are not animated; the latest document for an anchor always
/// reflects the final state of its last draw.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    documents: IndexMap<String, String>,
}

impl SvgRenderer {
    #[must_use]
    pub fn document(&self, selector: &str) -> Option<&str> {
        self.documents.get(selector).map(String::as_str)
    }

    #[must_use]
    pub fn documents(&self) -> &IndexMap<String, String> {
        &self.documents
    }
}

fn opacity(color: Color, deselected: bool) -> f64 {
    if deselected {
        color.alpha * DESELECTED_OPACITY
    } else {
        color.alpha
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub(crate) fn write_svg(frame: &RenderFrame) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}">"#,
        frame.size.width, frame.size.height
    )?;
    for rect in &frame.rects {
        writeln!(
            out,
            r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="{:.2}"/>"#,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            rect.fill.to_hex(),
            opacity(rect.fill, rect.tag.deselected)
        )?;
    }
    for path in &frame.paths {
        let fill = path.fill.map_or_else(|| "none".to_owned(), Color::to_hex);
        let fill_opacity = path.fill.map_or(0.0, |fill| opacity(fill, path.tag.deselected));
        let stroke = path.stroke.map_or_else(|| "none".to_owned(), Color::to_hex);
        writeln!(
            out,
            r#"  <path d="{}" fill="{}" fill-opacity="{:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
            path.data, fill, fill_opacity, stroke, path.stroke_width
        )?;
    }
    for circle in &frame.circles {
        writeln!(
            out,
            r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{:.2}"/>"#,
            circle.cx,
            circle.cy,
            circle.radius,
            circle.fill.to_hex(),
            opacity(circle.fill, circle.tag.deselected)
        )?;
    }
    for line in &frame.lines {
        writeln!(
            out,
            r#"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
            line.x1,
            line.y1,
            line.x2,
            line.y2,
            line.color.to_hex(),
            line.stroke_width
        )?;
    }
    for text in frame.texts.iter().filter(|text| !text.is_title) {
        let anchor = match text.h_align {
            TextHAlign::Left => "start",
            TextHAlign::Center => "middle",
            TextHAlign::Right => "end",
        };
        writeln!(
            out,
            r#"  <text x="{:.2}" y="{:.2}" font-size="{:.1}" fill="{}" text-anchor="{}">{}</text>"#,
            text.x,
            text.y,
            text.font_size_px,
            text.color.to_hex(),
            anchor,
            escape(&text.text)
        )?;
    }
    out.push_str("</svg>\n");
    Ok(out)
}

impl Renderer for SvgRenderer {
    fn render(
        &mut self,
        anchor: &Anchor,
        frame: &RenderFrame,
        _transition: Transition,
    ) -> ChartResult<()> {
        frame.validate()?;
        let document = write_svg(frame)
            .map_err(|err| ChartError::Render(format!("svg serialization failed: {err}")))?;
        self.documents
            .insert(anchor.selector().to_owned(), document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SvgRenderer;
    use crate::core::{Anchor, Key, Size};
    use crate::render::{Color, MarkTag, RectPrimitive, RenderFrame, Renderer, TextPrimitive, Transition};

    #[test]
    fn frames_serialize_to_svg_documents() {
        let mut renderer = SvgRenderer::default();
        let mut rect = RectPrimitive::new(1.0, 2.0, 3.0, 4.0, Color::from_hex("#ff0000"))
            .with_tag(MarkTag::keyed(Key::text("a")));
        rect.tag.deselected = true;
        let frame = RenderFrame::new(Size::new(100.0, 50.0))
            .with_rect(rect)
            .with_text(TextPrimitive::label("a < b", 5.0, 5.0));

        renderer
            .render(&Anchor::new("#chart"), &frame, Transition::instant())
            .expect("render");

        let svg = renderer.document("#chart").expect("document");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r##"fill="#ff0000" fill-opacity="0.20""##));
        assert!(svg.contains("a &lt; b"));
    }
}
