//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n prices, then
//! EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! Output length: len - n + 1 (empty when len < n).

pub fn ema(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(prices.len() - period + 1);

    let mut current = prices[..period].iter().sum::<f64>() / period as f64;
    values.push(current);

    for &price in &prices[period..] {
        current = price * k + current * (1.0 - k);
        values.push(current);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_length() {
        let series = ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn ema_period_1() {
        let series = ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(series, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn ema_seed_is_sma() {
        let series = ema(&[10.0, 20.0, 30.0], 3);
        let expected_sma = (10.0 + 20.0 + 30.0) / 3.0;
        assert!((series[0] - expected_sma).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        let k = 2.0 / 4.0;
        let sma = (10.0 + 20.0 + 30.0) / 3.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((series[0] - sma).abs() < f64::EPSILON);
        assert!((series[1] - ema_3).abs() < f64::EPSILON);
        assert!((series[2] - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_prices() {
        let series = ema(&[100.0; 5], 3);
        for v in series {
            assert!((v - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_insufficient_data() {
        assert!(ema(&[10.0, 20.0], 3).is_empty());
        assert!(ema(&[], 3).is_empty());
        assert!(ema(&[10.0, 20.0], 0).is_empty());
    }
}
