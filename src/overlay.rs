//! Target-zone annotation: decide what to draw, then replay it onto a canvas.

use anyhow::Result;

use crate::models::{CircleCandidate, TargetZone};

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const ZONE_COLOR: Color = Color::new(0, 0, 255);
pub const ZONE_ALERT_COLOR: Color = Color::new(255, 0, 0);
pub const CIRCLE_COLOR: Color = Color::new(0, 255, 0);
pub const CENTER_COLOR: Color = Color::new(255, 0, 0);
pub const LABEL_COLOR: Color = Color::new(255, 255, 0);

pub const LABEL_TEXT: &str = "CIRCLE DETECTED";
/// Label origin relative to the zone's top-left corner
pub const LABEL_OFFSET: (i32, i32) = (10, 30);
pub const LABEL_SCALE: f64 = 0.8;

const LINE_THICKNESS: i32 = 2;
const CENTER_RADIUS: i32 = 2;
const CENTER_THICKNESS: i32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle {
        center: (i32, i32),
        radius: i32,
        color: Color,
        thickness: i32,
    },
    Rectangle {
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Color,
        thickness: i32,
    },
    /// `origin` is the text baseline's left end
    Label {
        text: String,
        origin: (i32, i32),
        scale: f64,
        color: Color,
        thickness: i32,
    },
}

/// Drawing instructions for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub shapes: Vec<Shape>,
    pub in_target: bool,
}

impl Overlay {
    pub fn empty() -> Self {
        Self {
            shapes: Vec::new(),
            in_target: false,
        }
    }
}

/// Decide the annotations for one frame.
///
/// The zone outline is always drawn. A candidate adds its outline and center
/// marker; a candidate whose center lies in the zone also switches the zone to
/// the alert color and adds the label.
pub fn plan(candidate: Option<CircleCandidate>, zone: TargetZone) -> Overlay {
    let mut shapes = Vec::with_capacity(4);
    let in_target = zone.contains_opt(candidate.as_ref());

    if let Some(circle) = candidate {
        shapes.push(Shape::Circle {
            center: circle.center(),
            radius: circle.radius,
            color: CIRCLE_COLOR,
            thickness: LINE_THICKNESS,
        });
        shapes.push(Shape::Circle {
            center: circle.center(),
            radius: CENTER_RADIUS,
            color: CENTER_COLOR,
            thickness: CENTER_THICKNESS,
        });
    }

    if in_target {
        shapes.push(Shape::Label {
            text: LABEL_TEXT.to_string(),
            origin: (zone.x1.saturating_add(LABEL_OFFSET.0), zone.y1.saturating_add(LABEL_OFFSET.1)),
            scale: LABEL_SCALE,
            color: LABEL_COLOR,
            thickness: LINE_THICKNESS,
        });
    }

    shapes.push(Shape::Rectangle {
        top_left: zone.top_left(),
        bottom_right: zone.bottom_right(),
        color: if in_target { ZONE_ALERT_COLOR } else { ZONE_COLOR },
        thickness: LINE_THICKNESS,
    });

    Overlay { shapes, in_target }
}

/// Surface the overlay can be drawn onto
pub trait Canvas {
    fn circle(&mut self, center: (i32, i32), radius: i32, color: Color, thickness: i32) -> Result<()>;

    fn rectangle(
        &mut self,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Color,
        thickness: i32,
    ) -> Result<()>;

    fn text(&mut self, text: &str, origin: (i32, i32), scale: f64, color: Color, thickness: i32) -> Result<()>;
}

/// Replay an overlay's shapes in order
pub fn render<C: Canvas + ?Sized>(overlay: &Overlay, canvas: &mut C) -> Result<()> {
    for shape in &overlay.shapes {
        match shape {
            Shape::Circle { center, radius, color, thickness } => {
                canvas.circle(*center, *radius, *color, *thickness)?
            }
            Shape::Rectangle { top_left, bottom_right, color, thickness } => {
                canvas.rectangle(*top_left, *bottom_right, *color, *thickness)?
            }
            Shape::Label { text, origin, scale, color, thickness } => {
                canvas.text(text, *origin, *scale, *color, *thickness)?
            }
        }
    }
    Ok(())
}
