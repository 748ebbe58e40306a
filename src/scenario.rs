//! Placement scenarios
//!
//! A scenario describes one overlay, its anchor (or target point) and the
//! viewport in TOML, runs it through a [`SimulatedHost`] until transitions
//! settle and reports where the overlay ended up.
//!
//! ```toml
//! [viewport]
//! width = 800
//! height = 600
//!
//! [overlay]
//! width = 100
//! height = 40
//!
//! [anchor]
//! x = 750
//! y = 100
//! width = 20
//! height = 20
//!
//! [placement]
//! alignment = "right"
//! bleed = false
//! ```

use std::fmt;

use serde::Deserialize;

use crate::alignment::Alignment;
use crate::arrow::{ArrowAlignment, ArrowDirection};
use crate::config::EngineConfig;
use crate::error::ScenarioError;
use crate::geometry::{Rect, Size};
use crate::overlay::{Overlay, OverlayElements};
use crate::placement::Placement;
use crate::sim::SimulatedHost;
use crate::transition::{OverlayEvent, VisualState};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeDef {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectDef {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<SizeDef> for Size {
    fn from(def: SizeDef) -> Self {
        Size::new(def.width, def.height)
    }
}

impl From<RectDef> for Rect {
    fn from(def: RectDef) -> Self {
        Rect::new(def.x, def.y, def.width, def.height)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementDef {
    pub alignment: Option<String>,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default)]
    pub bleed: bool,
    /// Target point, used when there is no `[anchor]`
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub containing: Option<RectDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArrowDef {
    pub direction: String,
    #[serde(default = "default_arrow_size")]
    pub size: f64,
    pub target: RectDef,
}

fn default_arrow_size() -> f64 {
    8.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub viewport: SizeDef,
    pub overlay: SizeDef,
    pub anchor: Option<RectDef>,
    #[serde(default)]
    pub placement: PlacementDef,
    pub arrow: Option<ArrowDef>,
}

impl Scenario {
    /// Load a scenario from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(ScenarioError::invalid("viewport must have a positive size"));
        }
        if self.overlay.width < 0.0 || self.overlay.height < 0.0 {
            return Err(ScenarioError::invalid("overlay size must not be negative"));
        }
        let has_point = self.placement.x.is_some() && self.placement.y.is_some();
        if self.anchor.is_none() && !has_point {
            return Err(ScenarioError::invalid(
                "scenario needs an [anchor] table or both placement.x and placement.y",
            ));
        }
        Ok(())
    }

    /// Run the scenario: configure an overlay, show it and let every
    /// transition settle
    pub fn run(&self, config: &EngineConfig) -> ScenarioReport {
        let mut host = SimulatedHost::new(self.viewport.into());
        let overlay_size: Size = self.overlay.into();
        let panel = host.insert(Rect::from_size(overlay_size));
        let mut elements = OverlayElements::new(panel);

        let arrow = self.arrow.as_ref().map(|def| {
            let direction = ArrowDirection::parse_lenient(&def.direction);
            let rest = arrow_rest_rect(direction, overlay_size, def.size);
            let element = host.insert_child(panel, rest);
            let target = host.insert(def.target.into());
            (direction, element, target)
        });
        if let Some((_, element, _)) = arrow {
            elements = elements.with_arrow(element);
        }

        let mut overlay = Overlay::new(elements, config);
        let alignment = self
            .placement
            .alignment
            .as_deref()
            .map(Alignment::parse)
            .unwrap_or(config.default_alignment);

        overlay.set_alignment_spec(&mut host, alignment);
        overlay.set_offset(&mut host, self.placement.offset_x, self.placement.offset_y);
        overlay.set_bleed(&mut host, self.placement.bleed);
        overlay.set_containing_bounds(&mut host, self.placement.containing.map(Rect::from));
        if let Some(anchor) = self.anchor {
            let anchor = host.insert(anchor.into());
            overlay.set_anchor(&mut host, Some(anchor));
        } else if let (Some(x), Some(y)) = (self.placement.x, self.placement.y) {
            overlay.set_coordinates(&mut host, x, y);
        }
        if let Some((direction, _, target)) = arrow {
            overlay.set_arrow(&mut host, direction, Some(target));
        }
        overlay.set_visible(&mut host, true);

        let events = host.run_for(&mut overlay, config.settle_time());

        ScenarioReport {
            alignment,
            placement: overlay.placement().copied(),
            arrow_direction: overlay.effective_arrow_direction(),
            arrow: overlay.arrow_alignment().copied(),
            state: overlay.visual_state(),
            events,
        }
    }
}

// Arrow sits just outside the panel side it points from, at the leading corner
fn arrow_rest_rect(direction: ArrowDirection, overlay: Size, size: f64) -> Rect {
    match direction {
        ArrowDirection::Top => Rect::new(0.0, -size, size, size),
        ArrowDirection::Bottom => Rect::new(0.0, overlay.height, size, size),
        ArrowDirection::Left => Rect::new(-size, 0.0, size, size),
        ArrowDirection::Right | ArrowDirection::None => Rect::new(overlay.width, 0.0, size, size),
    }
}

/// Outcome of running a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub alignment: Alignment,
    pub placement: Option<Placement>,
    pub arrow_direction: ArrowDirection,
    pub arrow: Option<ArrowAlignment>,
    pub state: VisualState,
    pub events: Vec<OverlayEvent>,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "alignment: {}", self.alignment)?;
        match &self.placement {
            Some(placement) => {
                let flipped = if placement.flipped { " (flipped)" } else { "" };
                writeln!(f, "edge: {}{}", placement.edge, flipped)?;
                let r = placement.rect;
                writeln!(
                    f,
                    "rect: x={} y={} width={} height={}",
                    r.x, r.y, r.width, r.height
                )?;
            }
            None => writeln!(f, "rect: unplaced")?,
        }
        match &self.arrow {
            Some(arrow) if arrow.hidden => writeln!(f, "arrow: {} hidden", self.arrow_direction)?,
            Some(arrow) => writeln!(f, "arrow: {} offset={}", self.arrow_direction, arrow.offset)?,
            None => writeln!(f, "arrow: none")?,
        }
        writeln!(f, "state: {}", self.state)?;
        let events: Vec<String> = self.events.iter().map(|e| e.to_string()).collect();
        if events.is_empty() {
            write!(f, "events: none")
        } else {
            write!(f, "events: {}", events.join(", "))
        }
    }
}
