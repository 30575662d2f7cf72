//! Focus region selection
//!
//! Tracks the draggable rectangle shown over the captured photo and maps it
//! from display pixels to source-image pixels for cropping.

use serde::{Deserialize, Serialize};

/// Rectangle over the displayed photo, in display pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FocusRegion {
    /// A region of the given size anchored at the top-left corner
    pub fn at_origin(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

/// Size the captured photo is rendered at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub width: f32,
    pub height: f32,
}

impl DisplayGeometry {
    /// Display size for a source image rendered at `reference_width`.
    ///
    /// The height follows the image's own aspect ratio.
    pub fn for_source(source_width: u32, source_height: u32, reference_width: f32) -> Self {
        let height = if source_width == 0 {
            0.0
        } else {
            source_height as f32 * reference_width / source_width as f32
        };
        Self {
            width: reference_width,
            height,
        }
    }
}

/// Crop rectangle in source-image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Map a focus region onto the full-resolution source image.
///
/// Scale factors are `source / displayed` per axis, with the displayed height
/// derived from the image's aspect ratio.
pub fn crop_rect(
    region: &FocusRegion,
    source_width: u32,
    source_height: u32,
    reference_width: f32,
) -> CropRect {
    let display = DisplayGeometry::for_source(source_width, source_height, reference_width);
    let scale_x = scale(source_width, display.width);
    let scale_y = scale(source_height, display.height);

    CropRect {
        x: (region.x * scale_x).round().max(0.0) as u32,
        y: (region.y * scale_y).round().max(0.0) as u32,
        width: (region.width * scale_x).round().max(0.0) as u32,
        height: (region.height * scale_y).round().max(0.0) as u32,
    }
}

fn scale(source: u32, displayed: f32) -> f32 {
    if displayed > 0.0 {
        source as f32 / displayed
    } else {
        0.0
    }
}

/// Drag-driven focus region over a container of fixed size
#[derive(Debug, Clone)]
pub struct RegionSelector {
    region: FocusRegion,
    container: DisplayGeometry,
    dragging: bool,
}

impl RegionSelector {
    /// Create a selector with `region` placed inside `container`
    pub fn new(region: FocusRegion, container: DisplayGeometry) -> Self {
        let mut selector = Self {
            region,
            container,
            dragging: false,
        };
        selector.move_to(region.x, region.y);
        selector
    }

    pub fn region(&self) -> FocusRegion {
        self.region
    }

    pub fn drag_start(&mut self) {
        self.dragging = true;
    }

    /// Center the region under the pointer, clamped inside the container.
    ///
    /// Pointer coordinates are relative to the container's top-left corner.
    /// Ignored unless a drag is in progress.
    pub fn drag_move(&mut self, pointer_x: f32, pointer_y: f32) {
        if !self.dragging {
            return;
        }
        let x = pointer_x - self.region.width / 2.0;
        let y = pointer_y - self.region.height / 2.0;
        self.move_to(x, y);
    }

    pub fn drag_end(&mut self) {
        self.dragging = false;
    }

    fn move_to(&mut self, x: f32, y: f32) {
        // max() last: a region larger than the container pins to 0
        self.region.x = x.min(self.container.width - self.region.width).max(0.0);
        self.region.y = y.min(self.container.height - self.region.height).max(0.0);
    }
}
