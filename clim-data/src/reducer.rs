use crate::config::CalculationType;

/// Collapses a bucket of values to one number.
///
/// Threshold comparisons are strict: a value equal to the threshold is never
/// counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reducer {
    pub calculation: CalculationType,
    pub threshold: f64,
}

impl Reducer {
    pub fn new(calculation: CalculationType, threshold: f64) -> Self {
        Reducer {
            calculation,
            threshold,
        }
    }

    /// Reduce a single-field bucket. An empty bucket reduces to 0.
    pub fn reduce(&self, values: &[f64]) -> f64 {
        match self.calculation {
            CalculationType::Average => mean(values.iter()),
            CalculationType::AboveThreshold => self.count_above(values),
            CalculationType::BelowThreshold => self.count_below(values),
        }
    }

    /// Reduce a paired TX/TN bucket.
    ///
    /// The average runs over TX and TN together; above-threshold counts TX
    /// values and below-threshold counts TN values.
    pub fn reduce_paired(&self, tx: &[f64], tn: &[f64]) -> f64 {
        match self.calculation {
            CalculationType::Average => mean(tx.iter().chain(tn.iter())),
            CalculationType::AboveThreshold => self.count_above(tx),
            CalculationType::BelowThreshold => self.count_below(tn),
        }
    }

    fn count_above(&self, values: &[f64]) -> f64 {
        values.iter().filter(|v| **v > self.threshold).count() as f64
    }

    fn count_below(&self, values: &[f64]) -> f64 {
        values.iter().filter(|v| **v < self.threshold).count() as f64
    }
}

fn mean<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::Reducer;
    use crate::config::CalculationType;

    #[test]
    fn test_average() {
        let reducer = Reducer::new(CalculationType::Average, 0.0);
        assert_eq!(reducer.reduce(&[1.0, 2.0, 6.0]), 3.0);
        assert_eq!(reducer.reduce(&[]), 0.0);
        assert_eq!(reducer.reduce_paired(&[20.0, 20.0], &[10.0, 10.0]), 15.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let values = [14.9, 15.0, 15.1];
        let above = Reducer::new(CalculationType::AboveThreshold, 15.0);
        let below = Reducer::new(CalculationType::BelowThreshold, 15.0);
        assert_eq!(above.reduce(&values), 1.0);
        assert_eq!(below.reduce(&values), 1.0);
        assert_eq!(above.reduce(&[15.0, 15.0]), 0.0);
    }

    #[test]
    fn test_paired_counts_use_tx_above_and_tn_below() {
        let tx = [20.0, 12.0];
        let tn = [10.0, -2.0];
        let above = Reducer::new(CalculationType::AboveThreshold, 11.0);
        let below = Reducer::new(CalculationType::BelowThreshold, 11.0);
        assert_eq!(above.reduce_paired(&tx, &tn), 2.0);
        assert_eq!(below.reduce_paired(&tx, &tn), 2.0);
        let frost = Reducer::new(CalculationType::BelowThreshold, 0.0);
        assert_eq!(frost.reduce_paired(&tx, &tn), 1.0);
    }
}
