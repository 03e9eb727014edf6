//! Declarative strategies: entry/exit predicates and a sizing function over a
//! single indicator-augmented bar.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::error::RuleError;
use crate::domain::indicator::{AnalyzedBar, IndicatorType};

pub type Predicate = Arc<dyn Fn(&AnalyzedBar) -> Result<bool, RuleError> + Send + Sync>;
pub type Sizer = Arc<dyn Fn(&AnalyzedBar) -> Result<f64, RuleError> + Send + Sync>;

/// Name, description and parameters of a strategy, as reported in results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: BTreeMap<String, f64>,
}

#[derive(Clone)]
pub struct Strategy {
    pub name: String,
    pub description: String,
    pub parameters: BTreeMap<String, f64>,
    /// Indicators the rules read; the engine augments bars with exactly these.
    pub indicators: Vec<IndicatorType>,
    entry_rule: Predicate,
    exit_rule: Predicate,
    position_size: Sizer,
}

impl Strategy {
    pub fn builder(name: impl Into<String>) -> StrategyBuilder {
        StrategyBuilder::new(name)
    }

    pub fn should_enter(&self, bar: &AnalyzedBar) -> Result<bool, RuleError> {
        (self.entry_rule)(bar)
    }

    pub fn should_exit(&self, bar: &AnalyzedBar) -> Result<bool, RuleError> {
        (self.exit_rule)(bar)
    }

    pub fn position_size(&self, bar: &AnalyzedBar) -> Result<f64, RuleError> {
        (self.position_size)(bar)
    }

    pub fn descriptor(&self) -> StrategyDescriptor {
        StrategyDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("indicators", &self.indicators)
            .finish_non_exhaustive()
    }
}

/// Builds a [`Strategy`]. Without explicit rules it never enters, never
/// exits, and sizes one unit.
pub struct StrategyBuilder {
    name: String,
    description: String,
    parameters: BTreeMap<String, f64>,
    indicators: Vec<IndicatorType>,
    entry_rule: Predicate,
    exit_rule: Predicate,
    position_size: Sizer,
}

impl StrategyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        StrategyBuilder {
            name: name.into(),
            description: String::new(),
            parameters: BTreeMap::new(),
            indicators: Vec::new(),
            entry_rule: Arc::new(|_| Ok(false)),
            exit_rule: Arc::new(|_| Ok(false)),
            position_size: Arc::new(|_| Ok(1.0)),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn parameters(mut self, parameters: BTreeMap<String, f64>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn indicator(mut self, indicator_type: IndicatorType) -> Self {
        if !self.indicators.contains(&indicator_type) {
            self.indicators.push(indicator_type);
        }
        self
    }

    pub fn entry<F>(mut self, rule: F) -> Self
    where
        F: Fn(&AnalyzedBar) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        self.entry_rule = Arc::new(rule);
        self
    }

    pub fn exit<F>(mut self, rule: F) -> Self
    where
        F: Fn(&AnalyzedBar) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        self.exit_rule = Arc::new(rule);
        self
    }

    pub fn position_size<F>(mut self, sizer: F) -> Self
    where
        F: Fn(&AnalyzedBar) -> Result<f64, RuleError> + Send + Sync + 'static,
    {
        self.position_size = Arc::new(sizer);
        self
    }

    pub fn build(self) -> Strategy {
        Strategy {
            name: self.name,
            description: self.description,
            parameters: self.parameters,
            indicators: self.indicators,
            entry_rule: self.entry_rule,
            exit_rule: self.exit_rule,
            position_size: self.position_size,
        }
    }
}
