//! Configuration validation and loading.
//!
//! Validates config fields before a backtest or optimization runs and turns
//! them into typed values.

use std::collections::BTreeMap;

use crate::domain::backtest::BacktestConfig;
use crate::domain::catalog::StrategyKind;
use crate::domain::error::QuantError;
use crate::domain::fundamental::IndustryAverages;
use crate::domain::optimizer::ParameterRange;
use crate::ports::config_port::ConfigPort;

const BACKTEST: &str = "backtest";
const STRATEGY: &str = "strategy";
const OPTIMIZE: &str = "optimize";
const INDUSTRY: &str = "industry";

/// `[backtest]` section, with defaults for absent keys.
pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, QuantError> {
    let defaults = BacktestConfig::default();

    let initial_capital = config.get_double(BACKTEST, "initial_capital", defaults.initial_capital);
    if initial_capital <= 0.0 || !initial_capital.is_finite() {
        return Err(invalid(BACKTEST, "initial_capital", "initial_capital must be positive"));
    }

    let commission = config.get_double(BACKTEST, "commission", defaults.commission);
    validate_fraction("commission", commission)?;

    let slippage = config.get_double(BACKTEST, "slippage", defaults.slippage);
    validate_fraction("slippage", slippage)?;

    Ok(BacktestConfig {
        initial_capital,
        commission,
        slippage,
    })
}

fn validate_fraction(key: &str, value: f64) -> Result<(), QuantError> {
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            BACKTEST,
            key,
            &format!("{key} must be a fraction in [0, 1)"),
        ));
    }
    Ok(())
}

/// `[strategy]` section: catalog name plus numeric parameter overrides.
pub fn load_strategy_config(
    config: &dyn ConfigPort,
) -> Result<(StrategyKind, BTreeMap<String, f64>), QuantError> {
    let name = match config.get_string(STRATEGY, "name") {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            return Err(QuantError::ConfigMissing {
                section: STRATEGY.to_string(),
                key: "name".to_string(),
            });
        }
    };
    let kind: StrategyKind = name.parse()?;

    let mut overrides = BTreeMap::new();
    for key in config.keys(STRATEGY).into_iter().filter(|k| k != "name") {
        let raw = config.get_string(STRATEGY, &key).unwrap_or_default();
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| invalid(STRATEGY, &key, &format!("expected a number, got {raw:?}")))?;
        overrides.insert(key, value);
    }

    Ok((kind, overrides))
}

/// Validates `[strategy]` by building the strategy it describes.
pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), QuantError> {
    let (kind, overrides) = load_strategy_config(config)?;
    kind.build(&overrides).map(|_| ())
}

/// `[optimize]` section: one `param = min,max,step` entry per parameter, in
/// key order.
pub fn load_parameter_ranges(config: &dyn ConfigPort) -> Result<Vec<ParameterRange>, QuantError> {
    let keys = config.keys(OPTIMIZE);
    if keys.is_empty() {
        return Err(QuantError::ConfigMissing {
            section: OPTIMIZE.to_string(),
            key: "<parameter>".to_string(),
        });
    }

    keys.into_iter()
        .map(|key| {
            let raw = config.get_string(OPTIMIZE, &key).unwrap_or_default();
            parse_range(&key, &raw)
        })
        .collect()
}

/// `[industry]` section: average ratios for the industry comparison. Absent
/// keys stay undefined.
pub fn load_industry_averages(config: &dyn ConfigPort) -> Result<IndustryAverages, QuantError> {
    let ratio = |key: &str| -> Result<Option<f64>, QuantError> {
        let Some(raw) = config.get_string(INDUSTRY, key) else {
            return Ok(None);
        };
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(INDUSTRY, key, &format!("expected a number, got {raw:?}")))
    };

    Ok(IndustryAverages {
        pe: ratio("pe")?,
        pb: ratio("pb")?,
        roe: ratio("roe")?,
        debt_to_equity: ratio("debt_to_equity")?,
        net_margin: ratio("net_margin")?,
    })
}

fn parse_range(key: &str, raw: &str) -> Result<ParameterRange, QuantError> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid(OPTIMIZE, key, &format!("expected min,max,step, got {raw:?}")))?;

    let [min, max, step] = parts[..] else {
        return Err(invalid(
            OPTIMIZE,
            key,
            &format!("expected min,max,step, got {raw:?}"),
        ));
    };

    ParameterRange::new(key, min, max, step).map_err(|err| invalid(OPTIMIZE, key, &err.to_string()))
}

fn invalid(section: &str, key: &str, reason: &str) -> QuantError {
    QuantError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
initial_capital = 50000.0
commission = 0.002
slippage = 0.001
"#,
        );
        let loaded = load_backtest_config(&config).unwrap();
        assert!((loaded.initial_capital - 50_000.0).abs() < f64::EPSILON);
        assert!((loaded.commission - 0.002).abs() < f64::EPSILON);
        assert!((loaded.slippage - 0.001).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_backtest_section_uses_defaults() {
        let config = make_config("[strategy]\nname = rsi\n");
        assert_eq!(load_backtest_config(&config).unwrap(), BacktestConfig::default());
    }

    #[test]
    fn initial_capital_must_be_positive() {
        for capital in ["0", "-100"] {
            let config = make_config(&format!("[backtest]\ninitial_capital = {capital}\n"));
            let err = load_backtest_config(&config).unwrap_err();
            assert!(
                matches!(err, QuantError::ConfigInvalid { key, .. } if key == "initial_capital")
            );
        }
    }

    #[test]
    fn commission_out_of_range_fails() {
        let config = make_config("[backtest]\ncommission = -0.1\n");
        let err = load_backtest_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "commission"));

        let config = make_config("[backtest]\ncommission = 1.0\n");
        assert!(load_backtest_config(&config).is_err());
    }

    #[test]
    fn slippage_negative_fails() {
        let config = make_config("[backtest]\nslippage = -0.01\n");
        let err = load_backtest_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "slippage"));
    }

    #[test]
    fn strategy_with_overrides() {
        let config =
            make_config("[strategy]\nname = ma_cross\nfast_period = 10\nslow_period = 30\n");
        let (kind, overrides) = load_strategy_config(&config).unwrap();
        assert_eq!(kind, StrategyKind::MovingAverageCross);
        assert_eq!(overrides.get("fast_period"), Some(&10.0));
        assert_eq!(overrides.get("slow_period"), Some(&30.0));
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn missing_strategy_name_fails() {
        let config = make_config("[strategy]\nperiod = 14\n");
        let err = load_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigMissing { key, .. } if key == "name"));
    }

    #[test]
    fn unknown_strategy_fails() {
        let config = make_config("[strategy]\nname = turtle\n");
        let err = load_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::UnknownStrategy { name } if name == "turtle"));
    }

    #[test]
    fn non_numeric_override_fails() {
        let config = make_config("[strategy]\nname = rsi\nperiod = fourteen\n");
        let err = load_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn invalid_override_rejected_by_builder() {
        let config = make_config("[strategy]\nname = rsi\noversold = 90\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::InvalidParameters { .. }));
    }

    #[test]
    fn parameter_ranges_parsed_in_key_order() {
        let config =
            make_config("[optimize]\nslow_period = 100,200,50\nfast_period = 10, 30, 10\n");
        let ranges = load_parameter_ranges(&config).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].name, "fast_period");
        assert_eq!(ranges[0].values(), vec![10.0, 20.0, 30.0]);
        assert_eq!(ranges[1].name, "slow_period");
    }

    #[test]
    fn malformed_ranges_fail() {
        for raw in ["1,2", "a,b,c", "5,1,1", "1,5,0"] {
            let config = make_config(&format!("[optimize]\nperiod = {raw}\n"));
            let err = load_parameter_ranges(&config).unwrap_err();
            assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "period"));
        }
    }

    #[test]
    fn industry_averages_partial() {
        let config = make_config("[industry]\npe = 18.5\nroe = 0.12\n");
        let industry = load_industry_averages(&config).unwrap();
        assert_eq!(industry.pe, Some(18.5));
        assert_eq!(industry.roe, Some(0.12));
        assert_eq!(industry.pb, None);
        assert_eq!(industry.net_margin, None);
    }

    #[test]
    fn industry_average_must_be_numeric() {
        let config = make_config("[industry]\npb = high\n");
        let err = load_industry_averages(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "pb"));
    }

    #[test]
    fn missing_optimize_section_fails() {
        let config = make_config("[strategy]\nname = rsi\n");
        assert!(matches!(
            load_parameter_ranges(&config),
            Err(QuantError::ConfigMissing { .. })
        ));
    }
}
