use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// A position clicked on a video frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrackedPoint {
    pub id: u32,

    // in px
    pub x: f64,
    pub y: f64,

    // in seconds
    pub time: f64,
}

impl TrackedPoint {
    #[inline]
    pub fn new(id: u32, x: f64, y: f64, time: f64) -> Self {
        Self { id, x, y, time }
    }

    #[inline(always)]
    pub fn pixel(&self) -> na::Point2<f64> {
        na::Point2::new(self.x, self.y)
    }
}

/// Points clicked for one object, e.g. "Object A".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    pub id: u32,
    pub name: String,
    points: Vec<TrackedPoint>,
    next_point_id: u32,
}

impl Track {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            points: Vec::new(),
            next_point_id: 1,
        }
    }

    /// Builds a track from already-created points, keeping their ids.
    pub fn with_points(id: u32, name: impl Into<String>, points: Vec<TrackedPoint>) -> Self {
        let next_point_id = points.iter().map(|p| p.id).max().unwrap_or(0) + 1;

        Self {
            id,
            name: name.into(),
            points,
            next_point_id,
        }
    }

    pub fn add_point(&mut self, x: f64, y: f64, time: f64) -> u32 {
        let id = self.next_point_id;
        self.next_point_id += 1;
        self.points.push(TrackedPoint::new(id, x, y, time));

        id
    }

    /// Drag correction, the timestamp stays as it was.
    pub fn move_point(&mut self, id: u32, x: f64, y: f64) -> Result<(), Error> {
        let point = self
            .points
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(Error::UnknownPoint(id))?;

        point.x = x;
        point.y = y;

        Ok(())
    }

    pub fn remove_point(&mut self, id: u32) -> Result<TrackedPoint, Error> {
        let idx = self
            .points
            .iter()
            .position(|p| p.id == id)
            .ok_or(Error::UnknownPoint(id))?;

        Ok(self.points.remove(idx))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    #[inline]
    pub fn points(&self) -> &[TrackedPoint] {
        &self.points
    }

    /// Points ordered by ascending time; equal timestamps keep insertion order.
    pub fn sorted_points(&self) -> Vec<TrackedPoint> {
        let mut points = self.points.clone();
        points.sort_by(|a, b| a.time.total_cmp(&b.time));

        points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
