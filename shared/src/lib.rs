pub mod geometry;
pub mod hit;
pub mod labels;
pub mod names;
pub mod projection;
pub mod render;
pub mod view;

pub use geometry::{GeoBounds, GeometryError, Region, regions_from_geojson};
pub use hit::HitGrid;
pub use labels::{LabelInstruction, estimate_label};
pub use names::{DisplayMode, resolve};
pub use projection::{Projection, Rotation, configure};
pub use render::{Frame, MapTransform, ShapeStyle, build_frame};
pub use view::{MapView, SeamRotation, ViewState};
