//! `.rtr` scene file support.
//!
//! This module parses the sectioned `.rtr` text format and loads it, along
//! with any OBJ models it references, into a validated [`ScenePack`].
//!
//! [`ScenePack`]: crate::scene::ScenePack
//!
//! # Example
//!
//! ```ignore
//! use rtr_core::rtr::load_rtr;
//!
//! let pack = load_rtr("scenes.rtr")?;
//! println!("Loaded {} scenes", pack.scene_count());
//! ```

mod loader;
mod parser;

pub use loader::*;
pub use parser::*;
