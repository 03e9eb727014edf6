//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warm-up: n + 1 prices (n price changes), so output length is len - n.

pub const DEFAULT_PERIOD: usize = 14;

pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() <= period {
        return Vec::new();
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = prices
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let mut values = Vec::with_capacity(prices.len() - period);

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    values.push(rsi_value(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        values.push(rsi_value(avg_gain, avg_loss));
    }

    values
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_prices() {
        assert!(rsi(&[], DEFAULT_PERIOD).is_empty());
    }

    #[test]
    fn rsi_warmup_period() {
        let prices: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();

        assert!(rsi(&prices[..14], 14).is_empty());
        assert_eq!(rsi(&prices, 14).len(), 1);
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = rsi(&prices, 14);
        assert!((series[0] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = rsi(&prices, 14);
        assert!(series[0].abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_flat_prices_is_100() {
        let series = rsi(&[50.0; 20], 14);
        assert_eq!(series.len(), 6);
        assert!(series.iter().all(|&v| v == 100.0));
    }

    #[test]
    fn rsi_in_range() {
        let prices: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();

        for v in rsi(&prices, 14) {
            assert!((0.0..=100.0).contains(&v), "RSI {} out of range", v);
        }
    }

    #[test]
    fn rsi_zero_period() {
        assert!(rsi(&[100.0, 101.0], 0).is_empty());
    }

    #[test]
    fn rsi_wilder_smoothing_step() {
        // period 2: changes +2, -1, +3
        let series = rsi(&[10.0, 12.0, 11.0, 14.0], 2);
        assert_eq!(series.len(), 2);

        let (g0, l0) = (1.0, 0.5);
        let first = 100.0 - 100.0 / (1.0 + g0 / l0);
        assert!((series[0] - first).abs() < 1e-12);

        let g1 = (g0 * 1.0 + 3.0) / 2.0;
        let l1 = (l0 * 1.0 + 0.0) / 2.0;
        let second = 100.0 - 100.0 / (1.0 + g1 / l1);
        assert!((series[1] - second).abs() < 1e-12);
    }

    #[test]
    fn rsi_known_calculation() {
        let prices = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let series = rsi(&prices, 14);
        assert!(
            series[0] > 50.0 && series[0] < 100.0,
            "RSI should be in bullish territory"
        );
    }
}
