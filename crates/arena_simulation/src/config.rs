//! Serde-backed configuration: fighters, their actions, the session.
//!
//! Every struct has a `Default` matching the reference tuning, so a JSON
//! file only needs to list what it changes.

use serde::{Deserialize, Serialize};

use crate::actions::{
    FighterAction, IronTail, IronTailProperty, Tackle, TackleProperty, Thunderbolt,
    ThunderboltProperty,
};
use crate::error::CombatError;
use crate::fighter::{StaggerLevel, ACTION_MAX};
use crate::state::MotionParameters;

/// Stagger durations (seconds) and blow strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    pub light: f32,
    pub heavy: f32,
    pub blown: f32,
    pub blown_horizontal: f32,
    pub blown_vertical: f32,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            light: 0.7,
            heavy: 1.7,
            blown: 2.7,
            blown_horizontal: 5.0,
            blown_vertical: 5.0,
        }
    }
}

impl StaggerConfig {
    pub fn duration(&self, level: StaggerLevel) -> f32 {
        match level {
            StaggerLevel::Light => self.light,
            StaggerLevel::Heavy => self.heavy,
            StaggerLevel::Blown => self.blown,
        }
    }

    fn validate(&self) -> Result<(), CombatError> {
        let values = [
            ("stagger.light", self.light),
            ("stagger.heavy", self.heavy),
            ("stagger.blown", self.blown),
            ("stagger.blown_horizontal", self.blown_horizontal),
            ("stagger.blown_vertical", self.blown_vertical),
        ];
        values
            .into_iter()
            .try_for_each(|(name, value)| non_negative(name, value))
    }
}

/// One equipped action, tagged by kind:
///
/// ```json
/// { "kind": "Thunderbolt", "damage": 40 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ActionSpec {
    Tackle(TackleProperty),
    IronTail(IronTailProperty),
    Thunderbolt(ThunderboltProperty),
}

impl ActionSpec {
    pub fn build(&self) -> Box<dyn FighterAction> {
        match self {
            ActionSpec::Tackle(property) => Box::new(Tackle::new(property.clone())),
            ActionSpec::IronTail(property) => Box::new(IronTail::new(property.clone())),
            ActionSpec::Thunderbolt(property) => Box::new(Thunderbolt::new(property.clone())),
        }
    }

    fn validate(&self) -> Result<(), CombatError> {
        match self {
            ActionSpec::Tackle(p) => {
                non_negative("tackle.speed", p.speed)?;
                non_negative("tackle.turn_speed", p.turn_speed)?;
                non_negative("tackle.duration", p.duration)?;
                non_negative("tackle.knockback_duration", p.knockback_duration)?;
                non_negative("tackle.knockback_horizontal", p.knockback_horizontal)?;
                non_negative("tackle.knockback_up", p.knockback_up)
            }
            ActionSpec::IronTail(p) => non_negative("iron_tail.duration", p.duration),
            ActionSpec::Thunderbolt(p) => {
                non_negative("thunderbolt.speed", p.speed)?;
                non_negative("thunderbolt.max_distance", p.max_distance)?;
                // Стоячий снаряд никогда не исчезнет сам: боец застрянет в STOP
                if p.speed == 0.0 && p.max_distance > 0.0 {
                    return Err(CombatError::InvalidConfig(
                        "thunderbolt.speed must be positive when max_distance > 0".to_string(),
                    ));
                }
                non_negative("thunderbolt.launch_offset", p.launch_offset)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterConfig {
    pub nickname: String,
    pub hp: u32,
    pub motion: MotionParameters,
    pub stagger: StaggerConfig,
    pub actions: Vec<ActionSpec>,
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            nickname: "pikachu".to_string(),
            hp: 100,
            motion: MotionParameters::default(),
            stagger: StaggerConfig::default(),
            actions: vec![
                ActionSpec::Tackle(TackleProperty::default()),
                ActionSpec::IronTail(IronTailProperty::default()),
                ActionSpec::Thunderbolt(ThunderboltProperty::default()),
            ],
        }
    }
}

impl FighterConfig {
    pub fn named(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Default::default()
        }
    }

    pub fn with_actions(mut self, actions: Vec<ActionSpec>) -> Self {
        self.actions = actions;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, CombatError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CombatError> {
        if self.actions.len() > ACTION_MAX {
            return Err(CombatError::TooManyActions {
                max: ACTION_MAX,
                got: self.actions.len(),
            });
        }
        if self.hp == 0 {
            return Err(CombatError::InvalidConfig("hp must be positive".to_string()));
        }
        non_negative("motion.running_speed", self.motion.running_speed)?;
        non_negative("motion.turning_speed", self.motion.turning_speed)?;
        self.stagger.validate()?;
        self.actions.iter().try_for_each(ActionSpec::validate)
    }

    pub fn build_actions(&self) -> Vec<Box<dyn FighterAction>> {
        self.actions.iter().map(ActionSpec::build).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed timestep rate
    pub tick_hz: f64,
    pub seed: u64,
    /// Two fighters target each other as soon as the second one joins
    pub one_on_one: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            one_on_one: true,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, CombatError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CombatError> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(CombatError::InvalidConfig(format!(
                "tick_hz must be positive, got {}",
                self.tick_hz
            )));
        }
        Ok(())
    }

    pub fn timestep(&self) -> f32 {
        (1.0 / self.tick_hz) as f32
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), CombatError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CombatError::InvalidConfig(format!(
            "{} must be non-negative, got {}",
            name, value
        )))
    }
}
