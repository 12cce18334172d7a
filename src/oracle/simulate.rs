//! Simulated price drift used when no remote feed is available.

use super::{AssetPair, PriceSnapshot};
use crate::rng::RandomSource;

/// Maximum absolute move per refresh, in quote currency.
pub fn max_step(pair: AssetPair) -> f64 {
    match pair {
        AssetPair::EthUsd => 25.0,
        AssetPair::BtcUsd => 500.0,
    }
}

/// Price never drifts below this.
pub fn price_floor(pair: AssetPair) -> f64 {
    match pair {
        AssetPair::EthUsd => 100.0,
        AssetPair::BtcUsd => 1000.0,
    }
}

/// Advance one pair by a uniform random move of at most `max_step`.
pub fn simulate_step(
    pair: AssetPair,
    previous: &PriceSnapshot,
    rng: &mut dyn RandomSource,
) -> PriceSnapshot {
    let variation = (rng.uniform() - 0.5) * 2.0 * max_step(pair);
    let next = (previous.price + variation).max(price_floor(pair));
    PriceSnapshot::from_move(previous.price, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{PcgSource, ScriptedSource};

    #[test]
    fn step_is_bounded_and_consistent() {
        let mut rng = PcgSource::from_seed(11);
        let mut eth = PriceSnapshot::from_change(3245.67, 0.0);
        for _ in 0..200 {
            let next = simulate_step(AssetPair::EthUsd, &eth, &mut rng);
            assert!((next.price - eth.price).abs() <= 25.0 + 1e-9);
            assert!(next.price >= 100.0);
            assert!((next.fractional_delta * 100.0 - next.percent_change).abs() < 1e-9);
            eth = next;
        }
    }

    #[test]
    fn floor_clamps_price() {
        let mut rng = ScriptedSource::new([0.0]);
        let low = PriceSnapshot::flat(1010.0);
        let next = simulate_step(AssetPair::BtcUsd, &low, &mut rng);
        assert_eq!(next.price, 1000.0);
        assert!(next.percent_change < 0.0);
    }
}
