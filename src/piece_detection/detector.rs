//! Piece detection pipeline: locate anchor, project, sample, classify

use super::anchor::{AnchorLocator, AnchorMatch};
use super::color::{Color, ColorTable, Piece};
use super::config::DetectionConfig;
use super::projector::{SlotOffset, project};
use super::region::SearchRegion;
use super::sampler::{CaptureStrategy, FrameSampler};
use super::template::Template;
use crate::capture::{CaptureResult, FrameSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// What the preview shows right now
///
/// `None` entries are unknown pieces. An empty queue means the anchor was not
/// found (UI not ready), which is a normal state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub current_piece: Option<Piece>,
    pub queue: Vec<Option<Piece>>,
}

impl DetectionResult {
    /// Result for "anchor not visible"
    pub fn not_ready() -> Self {
        Self::default()
    }

    /// Every slot has a label
    pub fn is_complete(&self) -> bool {
        self.current_piece.is_some() && !self.queue.is_empty() && self.queue.iter().all(Option::is_some)
    }

    /// Labels as strings for hand-off to the move engine
    pub fn labels(&self) -> (Option<String>, Vec<Option<String>>) {
        (
            self.current_piece.map(|p| p.to_string()),
            self.queue.iter().map(|p| p.map(|p| p.to_string())).collect(),
        )
    }
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = |p: &Option<Piece>| p.map_or("?".to_string(), |p| p.to_string());
        write!(f, "current={} queue=[", label(&self.current_piece))?;
        for (i, piece) in self.queue.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", label(piece))?;
        }
        write!(f, "]")
    }
}

/// Stateless detection front end over a frame source
///
/// Each call captures, classifies and returns; nothing is remembered between
/// calls. Which slot to refresh next is the caller's business.
pub struct DetectionPipeline<'a, S: FrameSource> {
    source: &'a S,
    colors: &'a ColorTable,
    config: DetectionConfig,
}

impl<'a, S: FrameSource> DetectionPipeline<'a, S> {
    pub fn new(source: &'a S, colors: &'a ColorTable, config: DetectionConfig) -> Self {
        Self {
            source,
            colors,
            config,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect the current piece and queue
    ///
    /// Sampling uses one capture for all slots (unless the strategy is
    /// `PerPoint`), taken after the anchor is located.
    pub fn detect(
        &self,
        region: &SearchRegion,
        template: &Template,
        anchor_threshold: f32,
        current_offset: &SlotOffset,
        queue_offsets: &[SlotOffset],
    ) -> CaptureResult<DetectionResult> {
        let start = Instant::now();
        let Some(anchor) = self.locate(region, template, anchor_threshold)? else {
            log::debug!("Anchor not found, preview not ready ({}ms)", start.elapsed().as_millis());
            return Ok(DetectionResult::not_ready());
        };
        let locate_ms = start.elapsed().as_millis();

        let mut slots = Vec::with_capacity(queue_offsets.len() + 1);
        slots.push(*current_offset);
        slots.extend_from_slice(queue_offsets);

        let mut labels = self.sample_slots(&anchor, &slots)?.into_iter();
        let current_piece = labels.next().flatten();
        let result = DetectionResult {
            current_piece,
            queue: labels.collect(),
        };

        log::debug!(
            "Detected {} (anchor {}ms, total {}ms)",
            result,
            locate_ms,
            start.elapsed().as_millis()
        );
        Ok(result)
    }

    /// Re-read a single slot, typically the newly revealed end of the queue
    pub fn detect_one(
        &self,
        region: &SearchRegion,
        template: &Template,
        anchor_threshold: f32,
        offset: &SlotOffset,
    ) -> CaptureResult<Option<Piece>> {
        let Some(anchor) = self.locate(region, template, anchor_threshold)? else {
            return Ok(None);
        };
        Ok(self
            .sample_slots(&anchor, std::slice::from_ref(offset))?
            .into_iter()
            .next()
            .flatten())
    }

    /// `detect` with the region, threshold and offsets from the configuration
    pub fn run(&self, template: &Template) -> CaptureResult<DetectionResult> {
        self.detect(
            &self.config.search_region,
            template,
            self.config.anchor_threshold,
            &self.config.current_offset,
            &self.config.queue_offsets,
        )
    }

    /// Refresh only the last configured queue slot
    pub fn refresh_last_slot(&self, template: &Template) -> CaptureResult<Option<Piece>> {
        let Some(last) = self.config.queue_offsets.last() else {
            return Ok(None);
        };
        self.detect_one(
            &self.config.search_region,
            template,
            self.config.anchor_threshold,
            last,
        )
    }

    /// Load the configured template and run detection
    ///
    /// A missing or unreadable template is logged and reported as "not ready";
    /// the caller's polling loop will simply try again.
    pub fn run_from_path(&self) -> CaptureResult<DetectionResult> {
        match Template::load(&self.config.template_path) {
            Ok(template) => self.run(&template),
            Err(e) => {
                log::warn!("{e}");
                Ok(DetectionResult::not_ready())
            }
        }
    }

    fn locate(
        &self,
        region: &SearchRegion,
        template: &Template,
        threshold: f32,
    ) -> CaptureResult<Option<AnchorMatch>> {
        AnchorLocator::new(self.source, self.config.match_method).locate(
            region,
            template,
            threshold,
            self.config.resolution_scale,
        )
    }

    fn label(&self, color: Color) -> Option<Piece> {
        self.config
            .policy
            .apply(color, self.colors, self.config.dark_threshold)
    }

    /// Sample and classify `slots` in order, with the configured strategy and policy
    fn sample_slots(
        &self,
        anchor: &AnchorMatch,
        slots: &[SlotOffset],
    ) -> CaptureResult<Vec<Option<Piece>>> {
        let points = project(anchor, slots);
        let sampler = FrameSampler::new(self.source);

        match self.config.strategy {
            CaptureStrategy::RegionScan => {
                let cells: Vec<_> = points
                    .iter()
                    .zip(slots)
                    .map(|(point, slot)| (*point, slot.window))
                    .collect();
                let colors = sampler.scan_windows(&cells, self.config.dark_threshold)?;
                Ok(colors
                    .into_iter()
                    .map(|color| color.and_then(|c| self.label(c)))
                    .collect())
            }
            strategy => {
                let colors = sampler.sample(&points, strategy)?;
                Ok(points
                    .iter()
                    .map(|point| {
                        colors
                            .get(point)
                            .and_then(|c| self.label(*c))
                    })
                    .collect())
            }
        }
    }
}
