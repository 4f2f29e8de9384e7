// Linear forecaster: a `burn` linear layer trained by full-batch gradient
// descent on mean squared error plus an L2 penalty on the weights.
//
// Features and targets are standardized before training, so the intercept
// (the layer bias) is not penalized and one step size suits every column.
// The trained weights are mapped back to raw units, so prediction is plain
// arithmetic and the fitted model carries no tensors.

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::tensor::{ElementConversion, Tensor};
use tracing::debug;

use super::{check_shape, FeatureRow, FeatureShape, ForecastError, Forecaster, TrainingSet};

type TrainBackend = Autodiff<NdArray<f32>>;

/// Full-batch passes over the training set.
pub const DEFAULT_EPOCHS: usize = 5000;

#[derive(Debug, Clone)]
struct Fitted {
    shape: FeatureShape,
    intercept: f64,
    coefficients: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct RidgeForecaster {
    lambda: f64,
    epochs: usize,
    fitted: Option<Fitted>,
}

impl RidgeForecaster {
    /// `lambda` is the L2 penalty; 0 gives ordinary least squares.
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda: lambda.max(0.0),
            epochs: DEFAULT_EPOCHS,
            fitted: None,
        }
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs.max(1);
        self
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Fitted coefficients in feature order and raw units, if fitted.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.coefficients.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }
}

impl Default for RidgeForecaster {
    fn default() -> Self {
        Self::new(1.0)
    }
}

// ---------------------------------------------------------------------------
// Standardization
// ---------------------------------------------------------------------------

/// Mean and standard deviation of a column. A constant column gets a scale
/// of 1 so it standardizes to zeros.
fn moments(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    (mean, if std > f64::EPSILON { std } else { 1.0 })
}

fn tensor_values(tensor: Tensor<TrainBackend, 1>) -> Result<Vec<f32>, ForecastError> {
    let data = tensor.into_data();
    data.as_slice::<f32>()
        .map(<[f32]>::to_vec)
        .map_err(|e| ForecastError::Backend(format!("{e:?}")))
}

impl Forecaster for RidgeForecaster {
    fn name(&self) -> &str {
        "ridge"
    }

    fn fit(&mut self, training: &TrainingSet) -> Result<(), ForecastError> {
        if training.is_empty() {
            return Err(ForecastError::EmptyTrainingSet);
        }
        let shape = training.shape();
        let width = shape.width;
        let rows = training.rows();
        let n = rows.len();

        let x_moments: Vec<(f64, f64)> = (0..width)
            .map(|j| moments(rows.iter().map(move |r| r.values()[j])))
            .collect();
        let (y_mean, y_std) = moments(training.targets().iter().copied());

        let scales = x_moments.as_slice();
        let x: Vec<f32> = rows
            .iter()
            .flat_map(move |r| {
                r.values()
                    .iter()
                    .zip(scales)
                    .map(|(v, (m, s))| ((v - m) / s) as f32)
            })
            .collect();
        let y: Vec<f32> = training
            .targets()
            .iter()
            .map(|t| ((t - y_mean) / y_std) as f32)
            .collect();

        let device = NdArrayDevice::default();
        let x = Tensor::<TrainBackend, 1>::from_floats(x.as_slice(), &device).reshape([n, width]);
        let y = Tensor::<TrainBackend, 1>::from_floats(y.as_slice(), &device).reshape([n, 1]);

        let mut model: Linear<TrainBackend> = LinearConfig::new(width, 1)
            .with_initializer(Initializer::Zeros)
            .init(&device);
        let mut optimizer = SgdConfig::new().init();

        // Curvature is at most 2 * (width + penalty) on standardized columns.
        let penalty = self.lambda / n as f64;
        let learning_rate = 0.5 / (width as f64 + penalty);

        let mut last_loss = f32::NAN;
        for _ in 0..self.epochs {
            let residual = model.forward(x.clone()) - y.clone();
            let mse = (residual.clone() * residual).mean();
            let weight = model.weight.val();
            let loss = mse + (weight.clone() * weight).sum().mul_scalar(penalty as f32);

            last_loss = loss.clone().into_scalar().elem();
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(learning_rate, model, grads);
        }
        if !last_loss.is_finite() {
            return Err(ForecastError::Diverged);
        }
        debug!("ridge fit: {n} rows, {} epochs, loss {last_loss:.6}", self.epochs);

        let weights = tensor_values(model.weight.val().reshape([width]))?;
        let bias = match model.bias.as_ref() {
            Some(bias) => tensor_values(bias.val())?.first().copied().unwrap_or(0.0),
            None => 0.0,
        };

        let coefficients: Vec<f64> = weights
            .iter()
            .zip(&x_moments)
            .map(|(&w, (_, s))| y_std * f64::from(w) / s)
            .collect();
        let intercept = y_mean + y_std * f64::from(bias)
            - coefficients
                .iter()
                .zip(&x_moments)
                .map(|(c, (m, _))| c * m)
                .sum::<f64>();
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::Diverged);
        }

        self.fitted = Some(Fitted {
            shape,
            intercept,
            coefficients,
        });
        Ok(())
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ForecastError> {
        let Some(fitted) = &self.fitted else {
            return Err(ForecastError::NotFitted(self.name().to_string()));
        };
        check_shape(fitted.shape, row)?;
        Ok(fitted.intercept
            + fitted
                .coefficients
                .iter()
                .zip(row.values())
                .map(|(c, v)| c * v)
                .sum::<f64>())
    }
}
