use super::location::*;
use serde::{Deserialize, Serialize};

/// A renderer-agnostic drawing record in world coordinates.
///
/// A record with more than one point is a polyline; a single point marks an
/// entity centre.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Visualization {
    pub path: Vec<WorldPoint>,
    pub size: u32,
    pub alpha: f64,
    /// RGB colour, `None` leaves the choice to the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

impl Visualization {
    pub fn path(path: Vec<WorldPoint>, size: u32, alpha: f64) -> Self {
        Visualization {
            path,
            size,
            alpha,
            color: None,
        }
    }
}

pub trait Visualizer {
    fn draw(&mut self, visualization: &Visualization);
}

impl Visualizer for Vec<Visualization> {
    fn draw(&mut self, visualization: &Visualization) {
        self.push(visualization.clone());
    }
}

/// Replay records onto a renderer.
pub fn render_all<V: Visualizer + ?Sized>(visualizer: &mut V, visualizations: &[Visualization]) {
    for visualization in visualizations {
        visualizer.draw(visualization);
    }
}
