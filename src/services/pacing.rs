use std::time::Duration;

use rand::Rng;

/// Every wait in the scrape pipeline is drawn from one of these ranges, so the
/// whole cadence can be swapped out at once. Tests run with `zero()`.
#[derive(Debug, Clone, Copy)]
pub struct PacingPolicy {
    pub typing: (f64, f64),
    pub page_load: (f64, f64),
    pub search_settle: (f64, f64),
    pub results_settle: (f64, f64),
    pub scroll_settle: (f64, f64),
    pub panel_settle: (f64, f64),
    pub result_pause: (f64, f64),
    pub target_pause: (f64, f64),
}

impl PacingPolicy {
    pub fn standard() -> Self {
        PacingPolicy {
            typing: (0.5, 1.0),
            page_load: (2.0, 4.0),
            search_settle: (3.0, 5.0),
            results_settle: (2.0, 3.0),
            scroll_settle: (1.0, 2.0),
            panel_settle: (2.0, 3.0),
            result_pause: (2.0, 4.0),
            target_pause: (2.0, 2.0),
        }
    }

    pub fn zero() -> Self {
        PacingPolicy {
            typing: (0.0, 0.0),
            page_load: (0.0, 0.0),
            search_settle: (0.0, 0.0),
            results_settle: (0.0, 0.0),
            scroll_settle: (0.0, 0.0),
            panel_settle: (0.0, 0.0),
            result_pause: (0.0, 0.0),
            target_pause: (0.0, 0.0),
        }
    }

    pub async fn wait(&self, range: (f64, f64)) {
        // ThreadRng must not be held across the await point.
        let secs = {
            let mut rng = rand::thread_rng();
            rng.gen_range(range.0..=range.1)
        };
        if secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_policy_returns_immediately() {
        let pacing = PacingPolicy::zero();
        let started = std::time::Instant::now();

        pacing.wait(pacing.search_settle).await;
        pacing.wait(pacing.target_pause).await;

        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
