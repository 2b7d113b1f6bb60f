mod cornell;
mod quad_over_plane;

pub use cornell::CornellBoxScene;
pub use quad_over_plane::QuadOverPlaneScene;
