//! Ring configurator: pick a stone, pick a setting and metal, then enquire.
//!
//! The flow is a pure reducer over [`ConfiguratorAction`] so the same
//! transitions run behind the HTTP API, the CLI and tests. Transitions that
//! are not allowed from the current state leave it unchanged.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::stone::StoneRecord;
use crate::whatsapp::whatsapp_link;
use crate::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Stone,
    Ring,
    Enquire,
}

impl Step {
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            Step::Stone => 0,
            Step::Ring => 1,
            Step::Enquire => 2,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Step::Stone => "Choose your stone",
            Step::Ring => "Choose your setting",
            Step::Enquire => "Enquire",
        }
    }
}

impl TryFrom<u8> for Step {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Step::Stone),
            1 => Ok(Step::Ring),
            2 => Ok(Step::Enquire),
            other => Err(CoreError::InvalidStep(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metal {
    #[default]
    SilverPlatinum,
    YellowGold,
    WhiteGold,
}

impl Metal {
    pub const ALL: [Metal; 3] = [Metal::SilverPlatinum, Metal::YellowGold, Metal::WhiteGold];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Metal::SilverPlatinum => "Silver / Platinum",
            Metal::YellowGold => "Yellow Gold",
            Metal::WhiteGold => "White Gold",
        }
    }

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Metal::SilverPlatinum => "silver-platinum",
            Metal::YellowGold => "yellow-gold",
            Metal::WhiteGold => "white-gold",
        }
    }
}

impl std::fmt::Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metal {
    type Err = CoreError;

    /// Accepts slugs (`yellow-gold`), labels (`Yellow Gold`) and the short
    /// forms `silver`, `platinum`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        let key = key
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        match key.as_str() {
            "silver-platinum" | "silver" | "platinum" => Ok(Metal::SilverPlatinum),
            "yellow-gold" => Ok(Metal::YellowGold),
            "white-gold" => Ok(Metal::WhiteGold),
            _ => Err(CoreError::InvalidMetal(s.to_string())),
        }
    }
}

/// A ring setting offered in the configurator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingShape {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Preview image per metal.
    #[serde(default)]
    pub images: BTreeMap<Metal, String>,
}

impl RingShape {
    #[must_use]
    pub fn image_for(&self, metal: Metal) -> Option<&str> {
        self.images.get(&metal).map(String::as_str)
    }
}

/// The slice of a [`StoneRecord`] the configurator carries between steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoneChoice {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub carat: Option<f64>,
    pub price_display: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&StoneRecord> for StoneChoice {
    fn from(stone: &StoneRecord) -> Self {
        Self {
            id: stone.id.clone(),
            name: stone.name.clone(),
            origin: stone.origin.clone().filter(|o| !o.trim().is_empty()),
            carat: stone.carat,
            price_display: stone.price_display().to_string(),
            image: stone.cover_image().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConfiguratorAction {
    SelectStone(StoneChoice),
    SelectRing(RingShape),
    SelectMetal(Metal),
    /// Progress-bar navigation. Keeps every selection.
    GoTo(Step),
    /// "Change stone" from the summary. Drops the stone and the ring.
    ChangeStone,
    /// "Change setting" from the enquiry step. Drops the ring only.
    ChangeRing,
    /// "Start over".
    Reset,
}

/// Wizard state. Deserialized states are checked: a step is only reachable
/// once every earlier step has a selection, and a ring needs a stone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfiguratorWire")]
pub struct Configurator {
    pub step: Step,
    pub selected_stone: Option<StoneChoice>,
    pub selected_ring: Option<RingShape>,
    pub metal: Metal,
}

#[derive(Deserialize)]
struct ConfiguratorWire {
    #[serde(default)]
    step: Step,
    #[serde(default)]
    selected_stone: Option<StoneChoice>,
    #[serde(default)]
    selected_ring: Option<RingShape>,
    #[serde(default)]
    metal: Metal,
}

impl TryFrom<ConfiguratorWire> for Configurator {
    type Error = CoreError;

    fn try_from(wire: ConfiguratorWire) -> Result<Self, Self::Error> {
        let has_stone = wire.selected_stone.is_some();
        let has_ring = wire.selected_ring.is_some();
        if has_ring && !has_stone {
            return Err(CoreError::InvalidState(
                "a ring is selected without a stone".to_string(),
            ));
        }
        let reachable = match wire.step {
            Step::Stone => true,
            Step::Ring => has_stone,
            Step::Enquire => has_stone && has_ring,
        };
        if !reachable {
            return Err(CoreError::InvalidState(format!(
                "step '{}' is missing an earlier selection",
                wire.step.title()
            )));
        }

        Ok(Self {
            step: wire.step,
            selected_stone: wire.selected_stone,
            selected_ring: wire.selected_ring,
            metal: wire.metal,
        })
    }
}

impl Configurator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `target` can be shown: every earlier step has a selection.
    /// Steps already passed always qualify, since states stay consistent.
    #[must_use]
    pub fn can_visit(&self, target: Step) -> bool {
        match target {
            Step::Stone => true,
            Step::Ring => self.selected_stone.is_some(),
            Step::Enquire => self.selected_stone.is_some() && self.selected_ring.is_some(),
        }
    }

    /// Applies one user action and returns the next state.
    #[must_use]
    pub fn apply(mut self, action: ConfiguratorAction) -> Self {
        match action {
            ConfiguratorAction::SelectStone(stone) => {
                self.selected_stone = Some(stone);
                self.step = Step::Ring;
            }
            ConfiguratorAction::SelectRing(ring) => {
                if self.selected_stone.is_some() {
                    self.selected_ring = Some(ring);
                    self.step = Step::Enquire;
                }
            }
            ConfiguratorAction::SelectMetal(metal) => self.metal = metal,
            ConfiguratorAction::GoTo(target) => {
                if self.can_visit(target) {
                    self.step = target;
                }
            }
            ConfiguratorAction::ChangeStone => {
                if matches!(self.step, Step::Ring | Step::Enquire) {
                    self.selected_stone = None;
                    self.selected_ring = None;
                    self.step = Step::Stone;
                }
            }
            ConfiguratorAction::ChangeRing => {
                if self.step == Step::Enquire {
                    self.selected_ring = None;
                    self.step = Step::Ring;
                }
            }
            ConfiguratorAction::Reset => self = Self::default(),
        }
        self
    }

    #[must_use]
    pub fn select_stone(self, stone: StoneChoice) -> Self {
        self.apply(ConfiguratorAction::SelectStone(stone))
    }

    #[must_use]
    pub fn select_ring(self, ring: RingShape) -> Self {
        self.apply(ConfiguratorAction::SelectRing(ring))
    }

    #[must_use]
    pub fn select_metal(self, metal: Metal) -> Self {
        self.apply(ConfiguratorAction::SelectMetal(metal))
    }

    #[must_use]
    pub fn go_to(self, step: Step) -> Self {
        self.apply(ConfiguratorAction::GoTo(step))
    }

    #[must_use]
    pub fn change_stone(self) -> Self {
        self.apply(ConfiguratorAction::ChangeStone)
    }

    #[must_use]
    pub fn change_ring(self) -> Self {
        self.apply(ConfiguratorAction::ChangeRing)
    }

    #[must_use]
    pub fn reset(self) -> Self {
        self.apply(ConfiguratorAction::Reset)
    }

    /// Preview image of the selected ring in the selected metal.
    #[must_use]
    pub fn ring_preview(&self) -> Option<&str> {
        self.selected_ring
            .as_ref()
            .and_then(|ring| ring.image_for(self.metal))
    }

    /// Composes the enquiry text for the current selection.
    ///
    /// `None` until both a stone and a ring are selected. Lines for absent
    /// carat or origin are left out entirely.
    #[must_use]
    pub fn summary_message(&self) -> Option<String> {
        let stone = self.selected_stone.as_ref()?;
        let ring = self.selected_ring.as_ref()?;

        let mut message = String::from("Hello, I would like to enquire about a custom ring.\n\n");
        let _ = writeln!(message, "Stone: {}", stone.name);
        if let Some(carat) = stone.carat {
            let _ = writeln!(message, "Carat: {carat} ct");
        }
        if let Some(origin) = stone.origin.as_deref().filter(|o| !o.trim().is_empty()) {
            let _ = writeln!(message, "Origin: {origin}");
        }
        let _ = writeln!(message, "Price: {}", stone.price_display);
        let _ = writeln!(message, "Setting: {}", ring.label);
        let _ = write!(message, "Metal: {}", self.metal.label());
        Some(message)
    }

    /// WhatsApp deep link carrying [`Self::summary_message`].
    #[must_use]
    pub fn whatsapp_url(&self, phone: &str) -> Option<String> {
        self.summary_message()
            .map(|message| whatsapp_link(phone, &message))
    }
}
