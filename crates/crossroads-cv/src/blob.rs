//! Candidate vehicle shapes found in one frame

use crossroads_core::{CountVector, LaneIndex, LaneLayout, PixelPoint};
use opencv::core::Rect;
use serde::Serialize;

/// One accepted contour, described by its axis-aligned bounding box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blob {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Enclosed contour area in source pixels
    pub area: f64,
    /// Vertex count of the approximated polygon
    pub vertices: usize,
    /// Lane the centroid fell in, if any
    pub lane: Option<LaneIndex>,
}

impl Blob {
    pub fn new(x: i32, y: i32, width: i32, height: i32, area: f64, vertices: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            area,
            vertices,
            lane: None,
        }
    }

    /// Create from OpenCV Rect
    pub fn from_rect(rect: Rect, area: f64, vertices: usize) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height, area, vertices)
    }

    /// Convert to OpenCV Rect
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Center of the bounding box, rounded down. This is not the shape's
    /// center of mass.
    pub fn centroid(&self) -> PixelPoint {
        PixelPoint::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn with_lane(mut self, lane: Option<LaneIndex>) -> Self {
        self.lane = lane;
        self
    }
}

/// Blobs from a single frame
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlobCollection {
    blobs: Vec<Blob>,
}

impl BlobCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(blobs: Vec<Blob>) -> Self {
        Self { blobs }
    }

    pub fn push(&mut self, blob: Blob) {
        self.blobs.push(blob);
    }

    pub fn as_slice(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Blob> {
        self.blobs.iter()
    }

    /// Tag every blob with the lane its centroid falls in.
    pub fn classify(self, layout: &LaneLayout) -> Self {
        self.into_iter()
            .map(|blob| {
                let lane = layout.classify(blob.centroid());
                blob.with_lane(lane)
            })
            .collect()
    }

    /// Per-lane totals of the classified blobs.
    pub fn counts(&self) -> CountVector {
        CountVector::from_assignments(self.blobs.iter().map(|b| b.lane))
    }

    pub fn in_lane(&self, lane: LaneIndex) -> impl Iterator<Item = &Blob> {
        self.blobs.iter().filter(move |b| b.lane == Some(lane))
    }

    pub fn unassigned(&self) -> impl Iterator<Item = &Blob> {
        self.blobs.iter().filter(|b| b.lane.is_none())
    }
}

impl IntoIterator for BlobCollection {
    type Item = Blob;
    type IntoIter = std::vec::IntoIter<Blob>;

    fn into_iter(self) -> Self::IntoIter {
        self.blobs.into_iter()
    }
}

impl FromIterator<Blob> for BlobCollection {
    fn from_iter<T: IntoIterator<Item = Blob>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
