//! Canvas 2D rendering module
//!
//! `shapes` is plain geometry; `canvas` does the drawing in the browser.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
