//! Board geometry: zigzag node placement and S-curve connectors.
//!
//! Everything here is a pure function of its inputs. Degenerate container
//! sizes (zero, negative, NaN) are clamped instead of rejected so the board
//! can always be drawn, even if the result is visually meaningless.

use serde::{Deserialize, Serialize};

use crate::models::{ContainerSize, Point};
use crate::roster::AgentKey;

/// Rendered icon edge length
pub const ICON_SIZE: f64 = 64.0;
/// Fixed inset between the container edge and the nearest icon edge
pub const INSET: f64 = 24.0;
/// Extent left between the outermost node centers at the threshold
pub const MIN_STEP: f64 = 10.0;
/// From this extent on, on both axes, every node gets its own position.
/// Below it spacing and amplitude shrink toward zero.
pub const MIN_EXTENT: f64 = ICON_SIZE + 2.0 * INSET + MIN_STEP;
/// Upper bound on horizontal distance between neighbours
pub const MAX_SPACING: f64 = 220.0;
/// Upper bound on the zigzag offset from the vertical center
pub const MAX_AMPLITUDE: f64 = 90.0;
/// Control point offset per unit of vertical distance
pub const CURVATURE: f64 = 0.35;

/// Node positions for one roster, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub size: ContainerSize,
    positions: Vec<(AgentKey, Point)>,
}

impl Layout {
    pub fn position(&self, agent: AgentKey) -> Option<Point> {
        self.positions
            .iter()
            .find(|(key, _)| *key == agent)
            .map(|(_, point)| *point)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentKey, Point)> + '_ {
        self.positions.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Place `roster` left to right inside `size`, alternating above and below
/// the vertical center.
///
/// Horizontal spacing is `min(available_width / (n - 1), MAX_SPACING)` and the
/// row is centered. The zigzag amplitude is `min(available_height / 4,
/// MAX_AMPLITUDE)`; even indices sit above the center, odd ones below.
///
/// # Examples
///
/// ```rust
/// use workspace_core::geometry::compute_positions;
/// use workspace_core::models::ContainerSize;
/// use workspace_core::roster::BOARD_ROSTER;
///
/// let layout = compute_positions(ContainerSize::new(800.0, 480.0), &BOARD_ROSTER);
/// assert_eq!(layout.len(), 6);
/// ```
pub fn compute_positions(size: ContainerSize, roster: &[AgentKey]) -> Layout {
    let width = sanitize(size.width);
    let height = sanitize(size.height);
    let margin = INSET + ICON_SIZE / 2.0;
    let available_width = (width - 2.0 * margin).max(0.0);
    let available_height = (height - 2.0 * margin).max(0.0);

    let n = roster.len();
    let spacing = if n > 1 {
        (available_width / (n - 1) as f64).min(MAX_SPACING)
    } else {
        0.0
    };
    let amplitude = (available_height / 4.0).min(MAX_AMPLITUDE);

    let span = spacing * n.saturating_sub(1) as f64;
    let start_x = width / 2.0 - span / 2.0;
    let center_y = height / 2.0;

    let positions = roster
        .iter()
        .enumerate()
        .map(|(i, agent)| {
            let offset = if i % 2 == 0 { -amplitude } else { amplitude };
            (*agent, Point::new(start_x + spacing * i as f64, center_y + offset))
        })
        .collect();

    Layout {
        size: ContainerSize::new(width, height),
        positions,
    }
}

/// Cubic Bezier description of a connector between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl Connector {
    /// SVG path data for the curve
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }

    /// Evaluate the curve at `t` in `[0, 1]`
    pub fn point_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Point::new(
            b0 * self.start.x + b1 * self.control1.x + b2 * self.control2.x + b3 * self.end.x,
            b0 * self.start.y + b1 * self.control1.y + b2 * self.control2.y + b3 * self.end.y,
        )
    }
}

/// S-curve between `a` and `b`.
///
/// The control points sit at the thirds of the segment, pushed along its
/// unit perpendicular by `CURVATURE * |dy|` in opposite directions. The sign
/// of `dy` flips the push so rising and falling links bend consistently.
pub fn compute_connector(a: Point, b: Point) -> Connector {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);

    if !length.is_finite() || length == 0.0 {
        return Connector {
            start: a,
            control1: a,
            control2: b,
            end: b,
        };
    }

    let (nx, ny) = (-dy / length, dx / length);
    let direction = if dy < 0.0 { -1.0 } else { 1.0 };
    let offset = CURVATURE * dy.abs() * direction;

    Connector {
        start: a,
        control1: Point::new(a.x + dx / 3.0 + nx * offset, a.y + dy / 3.0 + ny * offset),
        control2: Point::new(
            a.x + 2.0 * dx / 3.0 - nx * offset,
            a.y + 2.0 * dy / 3.0 - ny * offset,
        ),
        end: b,
    }
}
