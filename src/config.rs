use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// Deepest search the scoring range is sized for.
pub const MAX_DEPTH: u32 = 6;

/// How the move selector picks among moves that all reach the best score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First matching move in Rules Engine order.
    #[default]
    First,
    /// Uniformly among all matching moves, using the selector's RNG.
    Random,
}

/// Multipliers applied to the three evaluation terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalWeights {
    pub material: i32,
    pub piece_square: i32,
    pub pawn_structure: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            material: 2,
            piece_square: 1,
            pawn_structure: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Search depth in plies.
    pub depth: u32,
    pub weights: EvalWeights,
    pub tie_break: TieBreak,
    /// Seed for the fallback and tie-break RNG.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            weights: EvalWeights::default(),
            tie_break: TieBreak::First,
            seed: 0x5a1304,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    ///
    /// ```toml
    /// depth = 3
    /// tie_break = "random"
    ///
    /// [weights]
    /// pawn_structure = 1
    /// ```
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(EngineError::InvalidConfig(format!(
                "depth must be between 1 and {}, got {}",
                MAX_DEPTH, self.depth
            )));
        }
        Ok(())
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }
}
