//! Coordinate transformation between PDF user space and page space
//!
//! PDF user space has its origin at the bottom-left of the page box with y
//! increasing upward. Page space, which every layout type in this crate
//! uses, has its origin at the top-left of the *displayed* page (after
//! `/Rotate`) with y increasing downward.

use lopdf::Object;

/// 2x3 affine matrix `[a b c d e f]` in PDF row-vector convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Read six numeric operands, as supplied to `cm` and `Tm`
    pub fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let vals: Vec<f32> = operands.iter().take(6).filter_map(number).collect();
        if vals.len() != 6 {
            return None;
        }
        Some(Self::new(vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]))
    }

    /// `self × other`: apply `self` first, then `other`
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Length of the transformed unit vertical vector
    pub fn vertical_scale(&self) -> f32 {
        (self.c.powi(2) + self.d.powi(2)).sqrt()
    }

    /// Transform a rectangle and return the axis-aligned box around it
    pub fn apply_rect(&self, rect: &BBox) -> BBox {
        let corners = [
            self.apply(rect.x0, rect.y0),
            self.apply(rect.x1, rect.y0),
            self.apply(rect.x0, rect.y1),
            self.apply(rect.x1, rect.y1),
        ];
        BBox::around(&corners)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned rectangle, always normalized so `x0 <= x1` and `y0 <= y1`
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Smallest box containing every point
    pub fn around(points: &[(f32, f32)]) -> Self {
        let mut bbox = BBox {
            x0: f32::INFINITY,
            y0: f32::INFINITY,
            x1: f32::NEG_INFINITY,
            y1: f32::NEG_INFINITY,
        };
        for &(x, y) in points {
            bbox.x0 = bbox.x0.min(x);
            bbox.y0 = bbox.y0.min(y);
            bbox.x1 = bbox.x1.max(x);
            bbox.y1 = bbox.y1.max(y);
        }
        bbox
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// True if the horizontal extents share any interval
    pub fn overlaps_horizontally(&self, other: &BBox) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1
    }

    /// True if the two boxes share any area
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Read a `[llx lly urx ury]` array such as `/MediaBox`
    pub fn from_pdf_array(values: &[Object]) -> Option<Self> {
        if values.len() < 4 {
            return None;
        }
        let nums: Vec<f32> = values.iter().take(4).filter_map(number).collect();
        if nums.len() != 4 {
            return None;
        }
        let bbox = BBox::new(nums[0], nums[1], nums[2], nums[3]);
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return None;
        }
        Some(bbox)
    }
}

/// US Letter, used when a page declares no usable box
pub const DEFAULT_PAGE_BOX: BBox = BBox {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

/// A page's visible box and rotation; maps user space to page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub page_box: BBox,
    /// Clockwise rotation in degrees, normalized to 0, 90, 180 or 270
    pub rotation: u16,
}

impl PageFrame {
    pub fn new(page_box: BBox, rotate: i64) -> Self {
        let rotation = (rotate.rem_euclid(360) / 90 * 90) as u16;
        Self { page_box, rotation }
    }

    /// Displayed (width, height)
    pub fn size(&self) -> (f32, f32) {
        match self.rotation {
            90 | 270 => (self.page_box.height(), self.page_box.width()),
            _ => (self.page_box.width(), self.page_box.height()),
        }
    }

    /// Map a user-space point to page space
    pub fn to_page(&self, x: f32, y: f32) -> (f32, f32) {
        let b = &self.page_box;
        match self.rotation {
            90 => (y - b.y0, x - b.x0),
            180 => (b.x1 - x, y - b.y0),
            270 => (b.y1 - y, b.x1 - x),
            _ => (x - b.x0, b.y1 - y),
        }
    }

    /// Map a user-space rectangle to page space
    pub fn rect_to_page(&self, rect: &BBox) -> BBox {
        let corners = [
            self.to_page(rect.x0, rect.y0),
            self.to_page(rect.x1, rect.y1),
        ];
        BBox::around(&corners)
    }
}

/// Numeric value of an integer or real operand
pub fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}
