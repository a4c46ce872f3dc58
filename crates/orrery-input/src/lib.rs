//! Mouse input and the orbit camera controller it drives.

pub mod mouse;
pub mod orbit;

pub use mouse::MouseState;
pub use orbit::{OrbitControls, OrbitSettings};
