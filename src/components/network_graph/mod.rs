//! Canvas network view: display-list rendering, interaction and the Leptos
//! component that ties them to a `<canvas>`.

mod canvas;
pub mod color;
mod component;
pub mod interaction;
mod mount;
pub mod render;
mod state;

pub use color::{ColorMode, EdgeColorMode, Rgba};
pub use component::NetworkGraphCanvas;
pub use interaction::{Interaction, Pointer, Release};
pub use mount::{CanvasSize, GraphMount};
pub use render::{DrawList, Shape, StyleConfig};
