#![forbid(unsafe_code)]

//! Browser bindings for Vetrom widgets.
//!
//! The DOM-free parts ([`scan`], [`markup`], [`page`], [`console`]) build and test on any
//! target. The `wasm-bindgen` surface, [`VetromPage`], is only compiled for
//! `wasm32`:
//!
//! ```js
//! import init, { VetromPage } from "./vetrom_web.js";
//! await init();
//! const page = new VetromPage(JSON.stringify({ cache: { retention_days: 7 } }));
//! page.goToSlide(0, 2);
//! ```

pub mod console;
pub mod markup;
pub mod page;
pub mod scan;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::VetromPage;

pub use page::{PageCore, load_options};
pub use scan::{WidgetKind, classify};
