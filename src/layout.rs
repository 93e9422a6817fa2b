// ABOUTME: Layout entities (boxes, groups) and the geometric contract they share

use crate::error::EvalError;
use crate::solver::{ConstraintSystem, Relation};
use cassowary::Variable;

/// Every box defaults to a 50x50 square, pinned by equality constraints.
pub const DEFAULT_BOX_SIZE: f64 = 50.0;

/// The four solver handles every layout entity owns.
///
/// Boxes and groups share this geometric contract: edge queries evaluate the
/// handles against the solver, and relational operations submit the linear
/// inequality for a screen coordinate system (y grows downward, so "above"
/// means smaller y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: Variable,
    pub y: Variable,
    pub w: Variable,
    pub h: Variable,
}

impl Frame {
    pub fn new(cs: &mut ConstraintSystem) -> Self {
        Frame {
            x: cs.new_var(),
            y: cs.new_var(),
            w: cs.new_var(),
            h: cs.new_var(),
        }
    }

    pub fn left_edge(&self, cs: &mut ConstraintSystem) -> f64 {
        cs.value(self.x)
    }

    pub fn right_edge(&self, cs: &mut ConstraintSystem) -> f64 {
        cs.value(self.x) + cs.value(self.w)
    }

    pub fn top(&self, cs: &mut ConstraintSystem) -> f64 {
        cs.value(self.y)
    }

    pub fn bottom(&self, cs: &mut ConstraintSystem) -> f64 {
        cs.value(self.y) + cs.value(self.h)
    }

    /// self.x + self.w <= other.x
    pub fn is_left_of(&self, other: &Frame, cs: &mut ConstraintSystem) -> Result<(), EvalError> {
        cs.constrain(
            Relation::Lte,
            0.0,
            &[(self.x, 1.0), (self.w, 1.0), (other.x, -1.0)],
        )
    }

    /// self.x >= other.x + other.w
    pub fn is_right_of(&self, other: &Frame, cs: &mut ConstraintSystem) -> Result<(), EvalError> {
        cs.constrain(
            Relation::Gte,
            0.0,
            &[(self.x, 1.0), (other.x, -1.0), (other.w, -1.0)],
        )
    }

    /// self.y + self.h <= other.y
    pub fn is_above(&self, other: &Frame, cs: &mut ConstraintSystem) -> Result<(), EvalError> {
        cs.constrain(
            Relation::Lte,
            0.0,
            &[(self.y, 1.0), (self.h, 1.0), (other.y, -1.0)],
        )
    }

    /// self.y >= other.y + other.h
    pub fn is_below(&self, other: &Frame, cs: &mut ConstraintSystem) -> Result<(), EvalError> {
        cs.constrain(
            Relation::Gte,
            0.0,
            &[(self.y, 1.0), (other.y, -1.0), (other.h, -1.0)],
        )
    }
}

/// A primitive rectangle with an identifier shown in the rendered output
#[derive(Debug, Clone, PartialEq)]
pub struct BoxItem {
    pub id: String,
    pub frame: Frame,
}

impl BoxItem {
    /// Allocates fresh handles and pins width and height to the default size.
    /// x and y stay unconstrained until relations or grouping pin them down.
    pub fn new(cs: &mut ConstraintSystem, id: impl Into<String>) -> Result<Self, EvalError> {
        let frame = Frame::new(cs);
        cs.constrain(Relation::Eq, -DEFAULT_BOX_SIZE, &[(frame.w, 1.0)])?;
        cs.constrain(Relation::Eq, -DEFAULT_BOX_SIZE, &[(frame.h, 1.0)])?;

        Ok(BoxItem {
            id: id.into(),
            frame,
        })
    }
}

/// An ordered collection of layout entities that encloses its children
#[derive(Debug, Clone, PartialEq)]
pub struct GroupItem {
    pub children: Vec<LayoutNode>,
    pub frame: Frame,
}

impl GroupItem {
    /// Builds a group around the children's bounding box as solved right now.
    ///
    /// The min/max extents accumulate from zero, so the bounds always include
    /// the origin. An empty group degenerates to a zero-size frame anchored
    /// there.
    pub fn new(cs: &mut ConstraintSystem, children: Vec<LayoutNode>) -> Result<Self, EvalError> {
        let mut min_x = 0.0f64;
        let mut min_y = 0.0f64;
        let mut max_x = 0.0f64;
        let mut max_y = 0.0f64;

        for child in &children {
            let f = child.frame();
            min_x = min_x.min(f.left_edge(cs));
            min_y = min_y.min(f.top(cs));
            max_x = max_x.max(f.right_edge(cs));
            max_y = max_y.max(f.bottom(cs));
        }

        let frame = Frame::new(cs);

        // Position and size bounded by the children's current extents
        cs.constrain(Relation::Gte, -min_x, &[(frame.x, 1.0)])?;
        cs.constrain(Relation::Gte, -min_y, &[(frame.y, 1.0)])?;
        cs.constrain(Relation::Gte, -(max_x - min_x), &[(frame.w, 1.0)])?;
        cs.constrain(Relation::Gte, -(max_y - min_y), &[(frame.h, 1.0)])?;

        // The group itself stays on screen
        cs.constrain(Relation::Gte, 0.0, &[(frame.x, 1.0)])?;
        cs.constrain(Relation::Gte, 0.0, &[(frame.y, 1.0)])?;

        // Each child is pushed inside the group's top-left corner
        for child in &children {
            let f = child.frame();
            cs.constrain(Relation::Gte, 0.0, &[(f.x, 1.0), (frame.x, -1.0)])?;
            cs.constrain(Relation::Gte, 0.0, &[(f.y, 1.0), (frame.y, -1.0)])?;
        }

        Ok(GroupItem { children, frame })
    }
}

/// A layout entity as stored in a group's child list
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Box(BoxItem),
    Group(GroupItem),
}

impl LayoutNode {
    pub fn frame(&self) -> &Frame {
        match self {
            LayoutNode::Box(b) => &b.frame,
            LayoutNode::Group(g) => &g.frame,
        }
    }
}
