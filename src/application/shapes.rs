//! Shape payloads for the graphic editor demo trees.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Leaf payload of a scene. Groups of shapes are branches, not shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    Circle { radius: f64 },
    Rectangle { width: f64, height: f64 },
    Triangle { base: f64, height: f64 },
    Line { length: f64 },
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Circle { .. } => "circle",
            Shape::Rectangle { .. } => "rectangle",
            Shape::Triangle { .. } => "triangle",
            Shape::Line { .. } => "line",
        }
    }

    /// Lines have no area.
    pub fn area(&self) -> f64 {
        match *self {
            Shape::Circle { radius } => PI * radius * radius,
            Shape::Rectangle { width, height } => width * height,
            Shape::Triangle { base, height } => base * height / 2.0,
            Shape::Line { .. } => 0.0,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Circle { radius } => write!(f, "circle with radius {}", radius),
            Shape::Rectangle { width, height } => {
                write!(f, "rectangle with width {} and height {}", width, height)
            }
            Shape::Triangle { base, height } => {
                write!(f, "triangle with base {} and height {}", base, height)
            }
            Shape::Line { length } => write!(f, "line with length {}", length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Shape::Circle { radius: 5.0 }, "78.54")]
    #[case(Shape::Rectangle { width: 4.0, height: 6.0 }, "24.00")]
    #[case(Shape::Triangle { base: 3.0, height: 7.0 }, "10.50")]
    #[case(Shape::Line { length: 9.0 }, "0.00")]
    fn given_shape_when_computing_area_then_matches(#[case] shape: Shape, #[case] expected: &str) {
        assert_eq!(format!("{:.2}", shape.area()), expected);
    }

    #[rstest]
    fn given_shape_when_displayed_then_describes_dimensions() {
        let shape = Shape::Rectangle {
            width: 4.0,
            height: 6.0,
        };
        assert_eq!(shape.to_string(), "rectangle with width 4 and height 6");
        assert_eq!(shape.name(), "rectangle");
    }
}
