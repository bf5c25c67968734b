//! JSON description of a headless run: the viewport, its scripted resizes and when to unmount.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::component::{CanvasStats, ForestCanvas};
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Fps, LogicalSize, Rect};
use crate::foundation::error::{WildwoodError, WildwoodResult};
use crate::host::{HeadlessConfig, HeadlessHost, HostStats};
use crate::paint::color::ColorDef;
use crate::render::backend::check_target_size;
use crate::surface::Surface;

/// One viewport change at `at_ms` after mount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResizeSpec {
    pub at_ms: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timeline {
    /// Container size at mount, in logical pixels.
    pub viewport: LogicalSize,
    #[serde(default = "default_dpr")]
    pub device_pixel_ratio: f64,
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: u32,
    /// Length of the run on the virtual clock.
    pub duration_ms: f64,
    #[serde(default)]
    pub resizes: Vec<ResizeSpec>,
    /// Unmount the component at this time; frames stop while the clock keeps running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmount_at_ms: Option<f64>,
    /// Color that translucent pixels are flattened over by the output sinks.
    #[serde(default)]
    pub background: ColorDef,
}

fn default_dpr() -> f64 {
    1.0
}

fn default_refresh_hz() -> u32 {
    60
}

/// What a [`Timeline::run`] produced.
pub struct RunReport<S> {
    pub sink: S,
    pub host: HostStats,
    pub canvas: CanvasStats,
}

impl Timeline {
    pub fn new(viewport: LogicalSize, duration_ms: f64) -> Self {
        Self {
            viewport,
            device_pixel_ratio: default_dpr(),
            refresh_hz: default_refresh_hz(),
            duration_ms,
            resizes: Vec::new(),
            unmount_at_ms: None,
            background: ColorDef::default(),
        }
    }

    pub fn from_reader<R: std::io::Read>(r: R) -> WildwoodResult<Self> {
        let mut timeline: Self = serde_json::from_reader(r)?;
        timeline.validate()?;
        Ok(timeline)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> WildwoodResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WildwoodError::validation(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check ranges and put resize events in time order.
    pub fn validate(&mut self) -> WildwoodResult<()> {
        fn non_negative(what: &str, v: f64) -> WildwoodResult<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(WildwoodError::validation(format!(
                    "{what} must be finite and non-negative, got {v}"
                )))
            }
        }

        non_negative("duration_ms", self.duration_ms)?;
        let dpr = self.device_pixel_ratio;
        let fits = |what: &str, width: f64, height: f64| -> WildwoodResult<()> {
            let mut surface = Surface::new();
            surface.resize(Rect::new(0.0, 0.0, width, height), dpr);
            check_target_size(surface.backing_width(), surface.backing_height())
                .map_err(|e| WildwoodError::validation(format!("{what}: {e}")))
        };

        non_negative("viewport.width", self.viewport.width)?;
        non_negative("viewport.height", self.viewport.height)?;
        if !dpr.is_finite() {
            return Err(WildwoodError::validation("device_pixel_ratio must be finite"));
        }
        fits("viewport", self.viewport.width, self.viewport.height)?;
        if self.refresh_hz == 0 {
            return Err(WildwoodError::validation("refresh_hz must be non-zero"));
        }
        for (i, r) in self.resizes.iter().enumerate() {
            non_negative(&format!("resizes[{i}].at_ms"), r.at_ms)?;
            non_negative(&format!("resizes[{i}].width"), r.width)?;
            non_negative(&format!("resizes[{i}].height"), r.height)?;
            fits(&format!("resizes[{i}]"), r.width, r.height)?;
        }
        if let Some(at) = self.unmount_at_ms {
            non_negative("unmount_at_ms", at)?;
        }
        self.resizes.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        Ok(())
    }

    pub fn refresh(&self) -> WildwoodResult<Fps> {
        Fps::new(self.refresh_hz, 1)
    }

    /// Background as straight RGBA8 for the sinks.
    pub fn background_rgba(&self) -> [u8; 4] {
        self.background.to_rgba8_straight()
    }

    /// Build a headless host with every resize already scheduled.
    pub fn headless_host<S: FrameSink>(&self, sink: S) -> WildwoodResult<HeadlessHost<S>> {
        let cfg = HeadlessConfig {
            viewport: self.viewport,
            device_pixel_ratio: self.device_pixel_ratio,
            refresh: self.refresh()?,
        };
        let mut host = HeadlessHost::new(cfg, sink)?;
        for r in &self.resizes {
            host.schedule_resize(r.at_ms, LogicalSize::new(r.width, r.height));
        }
        Ok(host)
    }

    /// Mount a fresh forest on a headless host and play the timeline into `sink`.
    #[tracing::instrument(level = "debug", skip_all, fields(duration_ms = self.duration_ms))]
    pub fn run<S: FrameSink>(&self, sink: S) -> WildwoodResult<RunReport<S>> {
        let mut timeline = self.clone();
        timeline.validate()?;

        let mut host = timeline.headless_host(sink)?;
        let mut canvas = ForestCanvas::new();
        canvas.mount(&mut host)?;

        match timeline.unmount_at_ms {
            Some(at) if at <= timeline.duration_ms => {
                host.run_until(&mut canvas, at)?;
                canvas.unmount(&mut host);
                host.run_until(&mut canvas, timeline.duration_ms)?;
            }
            _ => {
                host.run_until(&mut canvas, timeline.duration_ms)?;
                canvas.unmount(&mut host);
            }
        }

        let canvas_stats = canvas.stats();
        let (sink, host_stats) = host.finish()?;
        tracing::debug!(
            frames = canvas_stats.frames_rendered,
            regenerations = canvas_stats.regenerations,
            "timeline finished"
        );
        Ok(RunReport {
            sink,
            host: host_stats,
            canvas: canvas_stats,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/timeline.rs"]
mod tests;
