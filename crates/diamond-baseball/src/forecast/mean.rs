// Baseline forecaster: predicts the training mean.

use super::{check_shape, FeatureRow, FeatureShape, ForecastError, Forecaster, TrainingSet};

#[derive(Debug, Clone, Default)]
pub struct MeanForecaster {
    fitted: Option<(FeatureShape, f64)>,
}

impl MeanForecaster {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Forecaster for MeanForecaster {
    fn name(&self) -> &str {
        "mean"
    }

    fn fit(&mut self, training: &TrainingSet) -> Result<(), ForecastError> {
        if training.is_empty() {
            return Err(ForecastError::EmptyTrainingSet);
        }
        let mean = training.targets().iter().sum::<f64>() / training.len() as f64;
        self.fitted = Some((training.shape(), mean));
        Ok(())
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ForecastError> {
        let Some((shape, mean)) = self.fitted else {
            return Err(ForecastError::NotFitted(self.name().to_string()));
        };
        check_shape(shape, row)?;
        Ok(mean)
    }
}
