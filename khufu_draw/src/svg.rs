use core::fmt::{self, Write};

use super::*;

/// Writes `commands` as a standalone SVG document, `width` by `height` pixels.
///
/// The view box is fitted around every anchor of every command. Scene coordinates have their
/// y axis pointing up, so it is flipped.
pub fn write_svg(
    commands: &[DrawCommand],
    width: u32,
    height: u32,
    out: &mut impl Write,
) -> fmt::Result {
    let (min, max) = bounds(commands);
    let extent = (max - min).max().max(Float::EPSILON);
    let margin = extent * 0.02;
    let (min, max) = (min.add_scalar(-margin), max.add_scalar(margin));
    let size = max - min;

    let font_size = extent / 80.;
    let radius = extent / 400.;

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="{} {} {} {}">"#,
        min.x, -max.y, size.x, size.y,
    )?;
    writeln!(
        out,
        r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#101010"/>"##,
        min.x, -max.y, size.x, size.y,
    )?;

    for command in commands {
        match command {
            DrawCommand::Segment { start, end, color } => writeln!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="1" vector-effect="non-scaling-stroke"/>"#,
                start.x,
                -start.y,
                end.x,
                -end.y,
                color.to_hex(),
            )?,
            DrawCommand::Point { at, label, color } => {
                writeln!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="{radius}" fill="none" stroke="{}" vector-effect="non-scaling-stroke"/>"#,
                    at.x,
                    -at.y,
                    color.to_hex(),
                )?;
                write_text(out, at, label, color, font_size)?;
            }
            DrawCommand::Text { at, text, color } => write_text(out, at, text, color, font_size)?,
        }
    }

    writeln!(out, "</svg>")
}

/// See [`write_svg`]
pub fn to_svg(commands: &[DrawCommand], width: u32, height: u32) -> String {
    log::debug!("rendering {} draw commands to svg", commands.len());

    let mut svg = String::new();
    // writing to a `String` never fails
    let _ = write_svg(commands, width, height, &mut svg);
    svg
}

fn write_text(
    out: &mut impl Write,
    at: &Vector,
    text: &str,
    color: &Color,
    font_size: Float,
) -> fmt::Result {
    writeln!(
        out,
        r#"<text x="{}" y="{}" font-size="{font_size}" fill="{}">{}</text>"#,
        at.x,
        -at.y,
        color.to_hex(),
        escape(text),
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn bounds(commands: &[DrawCommand]) -> (Vector, Vector) {
    let mut anchors = commands.iter().flat_map(DrawCommand::anchors);

    let Some(first) = anchors.next() else {
        return (Vector::zeros(), Vector::new(1., 1.));
    };

    anchors.fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_axis_is_flipped() {
        let mut list = List::new();
        list.segment(Vector::new(0., 0.), Vector::new(2., 3.), Color::WHITE);

        let svg = to_svg(list.as_slice(), 640, 480);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"x2="2" y2="-3""#));
        assert!(svg.contains(r##"stroke="#ffffff""##));
    }

    #[test]
    fn text_is_escaped() {
        let mut list = List::new();
        list.text(Vector::new(1., 1.), "26.56'51\" <a & b>", Color::RED);

        let svg = to_svg(list.as_slice(), 100, 100);
        assert!(svg.contains("26.56'51&quot; &lt;a &amp; b&gt;"));
    }

    #[test]
    fn empty_list_still_renders() {
        let svg = to_svg(&[], 10, 10);
        assert!(svg.contains("viewBox"));
    }
}
