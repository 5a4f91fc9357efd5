// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Scene snapshots and keyframe animation for a 3D molecular viewer.
//!
//! The crate captures a viewer's full visual state, stores named scenes,
//! places them as keyframes on a timeline, and blends between them for
//! preview, playback, and movie recording. Rendering and movie encoding
//! stay with the host, reached through the [`viewer::Viewer`] and
//! [`recording::MovieRecorder`] traits.
//!
//! # Key entry points
//!
//! - [`session::Session`] - a viewer plus its scenes and animation, driven
//!   by [`command::Command`]s
//! - [`state::VisualState`] - the captured, versioned visual state
//! - [`scene::SceneStore`] - named scenes
//! - [`interpolate::interpolate`] - blending two states
//! - [`timeline::Timeline`] - keyframes and the per-frame schedule
//! - [`animation::Animation`] - preview, play, and record
//!
//! # Frame driving
//!
//! Nothing here spawns threads or timers. After starting playback the host
//! calls [`session::Session::tick`] (or
//! [`animation::Animation::on_frame_drawn`]) once per drawn frame;
//! stopping takes effect before the next call.

pub mod animation;
pub mod command;
pub mod error;
pub mod event;
pub mod interpolate;
pub mod options;
pub mod playback;
pub mod recording;
pub mod scene;
pub mod session;
pub mod state;
pub mod timeline;
pub mod util;
pub mod viewer;

pub use error::{SceneError, SceneResult};
