//! Game configuration: ring definitions, void symbol, session limits

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::symbols::{ReelSymbol, ReelSymbols, SymbolId, SymbolKind};
use crate::timing::SpinTiming;

fn default_weight() -> u32 {
    1
}

/// Ladder entry as written in config files: `1.5` or `"1.5X"`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LadderEntry {
    Number(f64),
    Label(String),
}

/// Parse a multiplier label such as `"1.2X"`, `"3x"` or `"4.5"`
pub fn parse_multiplier_label(label: &str) -> Result<f64, ConfigError> {
    let trimmed = label.trim();
    let number = trimmed
        .strip_suffix('X')
        .or_else(|| trimmed.strip_suffix('x'))
        .unwrap_or(trimmed)
        .trim();
    number
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidMultiplierLabel(label.to_string()))
}

fn deserialize_ladder<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<LadderEntry>::deserialize(deserializer)?;
    entries
        .into_iter()
        .map(|entry| match entry {
            LadderEntry::Number(value) => Ok(value),
            LadderEntry::Label(label) => {
                parse_multiplier_label(&label).map_err(serde::de::Error::custom)
            }
        })
        .collect()
}

/// Immutable definition of one ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingDefinition {
    /// Symbol that advances this ring
    pub symbol: SymbolId,
    /// Number of progress segments (max progress)
    pub segments: u32,
    /// Multiplier unlocked by each segment, in segment order
    #[serde(deserialize_with = "deserialize_ladder")]
    pub multipliers: Vec<f64>,
    /// Share of the reel strip used by the random spin source
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl RingDefinition {
    pub fn new(symbol: impl Into<SymbolId>, multipliers: &[f64]) -> Self {
        Self {
            symbol: symbol.into(),
            segments: multipliers.len() as u32,
            multipliers: multipliers.to_vec(),
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Lion ring: 8 segments
    pub fn lion() -> Self {
        Self::new("lion", &[1.0, 1.2, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0])
    }

    /// Crown ring: 6 segments
    pub fn crown() -> Self {
        Self::new("crown", &[1.0, 1.1, 1.3, 2.2, 3.0, 4.5])
    }

    /// Woman's Day ring: 4 segments
    pub fn womans_day() -> Self {
        Self::new("womansDay", &[1.0, 1.5, 3.0, 5.0])
    }

    /// Index of the first segment whose multiplier drops below its predecessor
    pub fn first_decrease(&self) -> Option<usize> {
        self.multipliers
            .windows(2)
            .position(|pair| pair[1] < pair[0])
            .map(|i| i + 1)
    }

    fn validate(&self, strict_ladders: bool) -> Result<(), ConfigError> {
        let name = self.symbol.to_string();
        if self.segments == 0 {
            return Err(ConfigError::NoSegments(name));
        }
        if self.multipliers.len() != self.segments as usize {
            return Err(ConfigError::LadderLength {
                symbol: name,
                expected: self.segments as usize,
                actual: self.multipliers.len(),
            });
        }
        for (index, &value) in self.multipliers.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidMultiplier {
                    symbol: name,
                    index,
                    value,
                });
            }
        }
        if let Some(index) = self.first_decrease() {
            if strict_ladders {
                return Err(ConfigError::DecreasingLadder {
                    symbol: name,
                    index,
                });
            }
            log::warn!(
                "[Config] Ring {} ladder decreases at segment {}",
                self.symbol,
                index
            );
        }
        Ok(())
    }
}

/// The symbol that wipes all progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidDefinition {
    pub symbol: SymbolId,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl Default for VoidDefinition {
    fn default() -> Self {
        Self {
            symbol: SymbolId::from("forbidden"),
            weight: default_weight(),
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Balance at session start
    pub starting_balance: f64,
    /// Number of history records retained
    pub history_limit: usize,
    /// Deadline for a single spin (ms)
    pub spin_timeout_ms: u64,
    /// Give the stake back when a spin fails or times out
    pub refund_on_spin_failure: bool,
    /// Reject ladders whose multipliers decrease
    pub strict_ladders: bool,
    /// Simulated reel animation timing
    pub timing: SpinTiming,
    /// Ring definitions, in display order
    pub rings: Vec<RingDefinition>,
    /// The reset symbol
    pub void_symbol: VoidDefinition,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_balance: 200.0,
            history_limit: 20,
            spin_timeout_ms: 10_000,
            refund_on_spin_failure: true,
            strict_ladders: false,
            timing: SpinTiming::normal(),
            rings: vec![
                RingDefinition::lion(),
                RingDefinition::crown(),
                RingDefinition::womans_day(),
            ],
            void_symbol: VoidDefinition::default(),
        }
    }
}

impl GameConfig {
    /// Default rings with instant spins (tests, batch simulation)
    pub fn studio() -> Self {
        Self {
            timing: SpinTiming::studio(),
            ..Self::default()
        }
    }

    pub fn with_rings(mut self, rings: Vec<RingDefinition>) -> Self {
        self.rings = rings;
        self
    }

    pub fn with_starting_balance(mut self, balance: f64) -> Self {
        self.starting_balance = balance;
        self
    }

    pub fn with_spin_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.spin_timeout_ms = timeout_ms;
        self
    }

    /// Validate every invariant the game relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(ConfigError::InvalidStartingBalance(self.starting_balance));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidHistoryLimit);
        }
        if self.spin_timeout_ms == 0 {
            return Err(ConfigError::InvalidSpinTimeout);
        }
        self.timing.validate()?;
        if self.rings.is_empty() {
            return Err(ConfigError::NoRings);
        }

        let mut seen = HashSet::new();
        for ring in &self.rings {
            if !seen.insert(&ring.symbol) {
                return Err(ConfigError::DuplicateSymbol(ring.symbol.to_string()));
            }
            ring.validate(self.strict_ladders)?;
        }
        if seen.contains(&self.void_symbol.symbol) {
            return Err(ConfigError::DuplicateSymbol(
                self.void_symbol.symbol.to_string(),
            ));
        }

        let total_weight: u64 = self
            .rings
            .iter()
            .map(|r| r.weight as u64)
            .sum::<u64>()
            + self.void_symbol.weight as u64;
        if total_weight == 0 {
            return Err(ConfigError::EmptyReel);
        }

        Ok(())
    }

    /// Ordered multiset of reel symbols (rings first, void last)
    pub fn reel_symbols(&self) -> ReelSymbols {
        let mut symbols: Vec<ReelSymbol> = self
            .rings
            .iter()
            .map(|r| ReelSymbol {
                id: r.symbol.clone(),
                kind: SymbolKind::Ring,
                weight: r.weight,
            })
            .collect();
        symbols.push(ReelSymbol {
            id: self.void_symbol.symbol.clone(),
            kind: SymbolKind::Void,
            weight: self.void_symbol.weight,
        });
        ReelSymbols::new(symbols)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, picking the format from its extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Export as YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yml::to_string(self).map_err(|e| ConfigError::Yaml(e.to_string()))
    }
}
