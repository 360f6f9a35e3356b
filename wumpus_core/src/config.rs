use serde::{Deserialize, Serialize};

use crate::environment::WorldError;

/// Parameters for randomly generated worlds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    /// Chance that any non-home cell holds a pit.
    pub pit_probability: f64,
    /// Seed for reproducible layouts. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            pit_probability: 0.1,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.width == 0 || self.height == 0 {
            return Err(WorldError::EmptyWorld {
                width: self.width,
                height: self.height,
            });
        }
        if !(0.0..=1.0).contains(&self.pit_probability) {
            return Err(WorldError::InvalidPitProbability(self.pit_probability));
        }
        Ok(())
    }
}

/// A batch of episodes played on freshly generated worlds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub world: WorldConfig,
    pub episodes: usize,
    /// Step budget per episode; the episode counts as a timeout when exhausted.
    pub max_steps: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            episodes: 100,
            max_steps: 100,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), WorldError> {
        self.world.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ExperimentConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_empty_world() {
        let config = WorldConfig {
            width: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(WorldError::EmptyWorld {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let config = WorldConfig {
            pit_probability: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(WorldError::InvalidPitProbability(1.5))
        );
        let config = WorldConfig {
            pit_probability: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
