//! SVG preview of a turtle program.
//!
//! Replays the command stream with the reference interpreter, confined
//! to the program's canvas, and draws what the pen would leave on paper.
//! Each pen-down stroke becomes a `<path>`; a stroke that never moves (a one-pixel island) becomes a
//! 1×1 `<rect>`. Lattice point `(x, y)` is drawn at the pixel centre
//! `(x + 0.5, y + 0.5)` so the preview lines up with the source mask in a
//! `0 0 width height` view box.
//!
//! Pen-up travel can be overlaid as dashed red paths for checking tour
//! quality.
//!
//! This is a pure function with no I/O: it returns a `String`.

use svg::Document;
use svg::node::Text;
use svg::node::element::path::Data;
use svg::node::element::{Description, Group, Path, Rectangle, Title};
use turtlepen_pipeline::replay::Point;
use turtlepen_pipeline::{Program, replay_within};

use crate::ExportError;

/// Metadata and options for the SVG preview.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Draw pen-up travel as dashed lines.
    pub show_travel: bool,
}

/// Render a program as an SVG preview.
///
/// # Errors
///
/// Returns [`ExportError::Replay`] if the program cannot be interpreted
/// or walks off its canvas.
pub fn to_svg(program: &Program, metadata: &SvgMetadata<'_>) -> Result<String, ExportError> {
    let trace = replay_within(&program.commands, program.dimensions)?;
    let (w, h) = (program.dimensions.width, program.dimensions.height);

    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    let mut ink = Group::new()
        .set("id", "strokes")
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", 1)
        .set("stroke-linecap", "square");
    for stroke in &trace.strokes {
        match path_data(stroke) {
            Some(data) => ink = ink.add(Path::new().set("d", data)),
            None => {
                if let Some(&(x, y)) = stroke.first() {
                    ink = ink.add(
                        Rectangle::new()
                            .set("x", x)
                            .set("y", y)
                            .set("width", 1)
                            .set("height", 1)
                            .set("fill", "black")
                            .set("stroke", "none"),
                    );
                }
            }
        }
    }
    doc = doc.add(ink);

    if metadata.show_travel {
        let mut travel = Group::new()
            .set("id", "travel")
            .set("fill", "none")
            .set("stroke", "red")
            .set("stroke-width", 0.25)
            .set("stroke-dasharray", "1,1");
        for leg in &trace.travel {
            if let Some(data) = path_data(leg) {
                travel = travel.add(Path::new().set("d", data));
            }
        }
        doc = doc.add(travel);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n"))
}

/// `M`/`L` path data through pixel centres, or `None` for fewer than two
/// points.
#[allow(clippy::cast_precision_loss)]
fn path_data(points: &[Point]) -> Option<Data> {
    let centre = |&(x, y): &Point| (x as f64 + 0.5, y as f64 + 0.5);
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    Some(
        rest.iter()
            .fold(Data::new().move_to(centre(first)), |data, p| {
                data.line_to(centre(p))
            }),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use turtlepen_pipeline::{Command, Dimensions};

    use super::*;

    fn program(commands: Vec<Command>) -> Program {
        Program {
            commands,
            dimensions: Dimensions {
                width: 8,
                height: 6,
            },
        }
    }

    #[test]
    fn empty_program_is_valid_svg() {
        let svg = to_svg(&program(Vec::new()), &SvgMetadata::default()).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
        assert!(svg.contains("viewBox=\"0 0 8 6\""));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn stroke_becomes_path_through_pixel_centres() {
        let svg = to_svg(
            &program(vec![Command::PenDown, Command::Move(2)]),
            &SvgMetadata::default(),
        )
        .unwrap();
        assert!(svg.contains("M0.5,0.5 L1.5,0.5 L2.5,0.5"), "{svg}");
    }

    #[test]
    fn single_pixel_stroke_becomes_rect() {
        let svg = to_svg(
            &program(vec![Command::PenUp, Command::Move(3), Command::PenDown]),
            &SvgMetadata::default(),
        )
        .unwrap();
        assert!(svg.contains("<rect"));
        assert!(svg.contains("x=\"3\""));
    }

    #[test]
    fn travel_only_drawn_when_requested() {
        let commands = vec![Command::PenUp, Command::Move(3), Command::PenDown];
        let hidden = to_svg(&program(commands.clone()), &SvgMetadata::default()).unwrap();
        assert!(!hidden.contains("id=\"travel\""));

        let shown = to_svg(
            &program(commands),
            &SvgMetadata {
                show_travel: true,
                ..SvgMetadata::default()
            },
        )
        .unwrap();
        assert!(shown.contains("id=\"travel\""));
        assert!(shown.contains("stroke-dasharray"));
    }

    #[test]
    fn metadata_is_escaped() {
        let svg = to_svg(
            &program(Vec::new()),
            &SvgMetadata {
                title: Some("a & b"),
                description: Some("<edge>"),
                show_travel: false,
            },
        )
        .unwrap();
        assert!(svg.contains("<title>a &amp; b</title>"));
        assert!(svg.contains("&lt;edge&gt;"));
    }

    #[test]
    fn unaligned_rotation_is_an_error() {
        let result = to_svg(&program(vec![Command::Rotate(30)]), &SvgMetadata::default());
        assert!(matches!(result, Err(ExportError::Replay(_))));
    }

    #[test]
    fn oversized_move_from_document_is_an_error() {
        let doc = crate::from_turtle_json(r#"{"size":[4,4],"data":["d","m4294967295"]}"#).unwrap();
        let result = to_svg(&doc.into_program(), &SvgMetadata::default());
        assert!(matches!(result, Err(ExportError::Replay(_))));
    }

    #[test]
    fn move_off_canvas_is_an_error() {
        let result = to_svg(
            &program(vec![Command::PenDown, Command::Move(8)]),
            &SvgMetadata::default(),
        );
        assert!(matches!(
            result,
            Err(ExportError::Replay(
                turtlepen_pipeline::ReplayError::OffCanvas { index: 1, .. }
            ))
        ));
    }
}
