//! Wildwood renders an animated generative forest: a twinkling starfield, jittering parallax
//! ridgelines, fog, and two populations of swaying trees laid out afresh on every resize.
//!
//! The crate is organised like the component it models:
//!
//! - [`Surface`] sizes the backing store against a container and the device pixel ratio
//! - [`generate_scene`] lays out the tree descriptors for a viewport
//! - [`FrameRenderer`] turns a scene and a timestamp into a [`FramePlan`], which a
//!   [`PaintBackend`] (normally [`CpuBackend`]) rasterizes
//! - [`AnimationDriver`] keeps exactly one frame request outstanding while mounted
//!
//! [`ForestCanvas`] ties them to a [`Host`]. [`HeadlessHost`] plays the part of a browser tab
//! and streams presented frames into a [`FrameSink`].
#![forbid(unsafe_code)]

mod foundation;

mod component;
mod driver;
/// Output sinks for presented frames.
pub mod encode;
mod host;
/// Color definitions.
pub mod paint;
mod render;
/// Tree descriptors and their generator.
pub mod scene;
mod surface;
mod timeline;

pub use crate::foundation::core::{
    Affine, BezPath, Fps, FrameIndex, LogicalSize, Point, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{WildwoodError, WildwoodResult};

pub use crate::component::{CanvasStats, ForestCanvas, render_still};
pub use crate::driver::{AnimationDriver, DriverState};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use crate::host::{
    FrameHandle, FrameScheduler, HeadlessConfig, HeadlessHost, Host, HostEvents, HostStats,
    ListenerId, ResizeEvent,
};
pub use crate::paint::color::ColorDef;
pub use crate::render::backend::{FrameRGBA, PaintBackend, execute_plan};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::frame::FrameRenderer;
pub use crate::render::plan::{DrawOp, FramePlan, GradientStop, Layer, Paint, VerticalGradient};
pub use crate::scene::{BeautifulTree, Scene, UglyTree, generate_scene};
pub use crate::surface::{MAX_DEVICE_PIXEL_RATIO, Surface, clamp_device_pixel_ratio};
pub use crate::timeline::{ResizeSpec, RunReport, Timeline};
