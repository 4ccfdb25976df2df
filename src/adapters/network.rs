//! Dense feed-forward classifier exported by the training pipeline.
//!
//! Each layer stores its kernel in Keras layout (`weights[input][unit]`) plus a
//! bias per unit. The output head is either one sigmoid unit or two softmax
//! units `[not readmitted, readmitted]`.

use serde::{Deserialize, Serialize};

use super::ArtifactError;
use crate::ports::Classifier;
use crate::{ReadmitError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    fn apply(self, values: &mut [f64]) {
        match self {
            Self::Linear => {}
            Self::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
            Self::Sigmoid => values.iter_mut().for_each(|v| *v = sigmoid(*v)),
            Self::Tanh => values.iter_mut().for_each(|v| *v = v.tanh()),
            Self::Softmax => softmax(values),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax (shift by the max logit).
fn softmax(values: &mut [f64]) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values.iter_mut().for_each(|v| *v = (*v - max).exp());
    let total: f64 = values.iter().sum();
    values.iter_mut().for_each(|v| *v /= total);
}

/// One fully connected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Kernel, `[inputs][units]`
    pub weights: Vec<Vec<f64>>,
    /// One bias per unit
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    #[must_use]
    pub fn inputs(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn units(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut out = self.bias.clone();
        for (x, row) in input.iter().zip(&self.weights) {
            for (acc, w) in out.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        self.activation.apply(&mut out);
        out
    }
}

/// A frozen multilayer perceptron as stored in `classifier.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseNetwork {
    pub layers: Vec<DenseLayer>,

    /// Column order the network was trained on, if the exporter recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl DenseNetwork {
    #[must_use]
    pub fn new(layers: Vec<DenseLayer>) -> Self {
        Self {
            layers,
            feature_names: None,
        }
    }

    /// Width of the output head.
    #[must_use]
    pub fn n_outputs(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::units)
    }

    /// Check that layer shapes chain and the head is a binary classifier.
    ///
    /// # Errors
    /// Returns `ArtifactError::Invalid` describing the first problem found.
    pub fn validate(&self) -> std::result::Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            artifact: "classifier",
            reason,
        };

        let Some(last) = self.layers.last() else {
            return Err(invalid("no layers".into()));
        };

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.inputs() == 0 || layer.units() == 0 {
                return Err(invalid(format!("layer {i} is empty")));
            }
            if let Some(r) = layer.weights.iter().position(|row| row.len() != layer.units()) {
                return Err(invalid(format!(
                    "layer {i} kernel row {r} has {} weights, expected {}",
                    layer.weights[r].len(),
                    layer.units()
                )));
            }
            let finite = layer.weights.iter().flatten().chain(&layer.bias).all(|v| v.is_finite());
            if !finite {
                return Err(invalid(format!("layer {i} has non-finite parameters")));
            }
            if let Some(next) = self.layers.get(i + 1) {
                if next.inputs() != layer.units() {
                    return Err(invalid(format!(
                        "layer {} expects {} inputs but layer {i} produces {}",
                        i + 1,
                        next.inputs(),
                        layer.units()
                    )));
                }
            }
        }

        match (last.units(), last.activation) {
            (1, Activation::Sigmoid) | (2, Activation::Softmax) => {}
            (units, activation) => {
                return Err(invalid(format!(
                    "output head must be 1 sigmoid or 2 softmax units, got {units} {activation:?}"
                )))
            }
        }

        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features() {
                return Err(invalid(format!(
                    "{} feature names for {} inputs",
                    names.len(),
                    self.n_features()
                )));
            }
        }
        Ok(())
    }
}

impl Classifier for DenseNetwork {
    fn n_features(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::inputs)
    }

    fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.n_features() {
            return Err(ReadmitError::Dimensionality {
                context: "classifier",
                expected: self.n_features(),
                actual: input.len(),
            });
        }

        let output = self
            .layers
            .iter()
            .fold(input.to_vec(), |activations, layer| layer.forward(&activations));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistic(weights: &[f64], bias: f64) -> DenseNetwork {
        DenseNetwork::new(vec![DenseLayer {
            weights: weights.iter().map(|w| vec![*w]).collect(),
            bias: vec![bias],
            activation: Activation::Sigmoid,
        }])
    }

    #[test]
    fn test_logistic_head() {
        let net = logistic(&[1.0, -1.0], 0.0);
        assert!(net.validate().is_ok());
        let p = net.predict_proba(&[2.0, 2.0]).unwrap();
        assert_eq!(p, vec![0.5]);
        let p = net.predict_proba(&[3.0, 0.0]).unwrap();
        assert!((p[0] - sigmoid(3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_hidden_relu_and_softmax_head() {
        let net = DenseNetwork::new(vec![
            DenseLayer {
                weights: vec![vec![1.0, -1.0]],
                bias: vec![0.0, 0.0],
                activation: Activation::Relu,
            },
            DenseLayer {
                weights: vec![vec![0.0, 1.0], vec![0.0, -1.0]],
                bias: vec![0.0, 0.0],
                activation: Activation::Softmax,
            },
        ]);
        assert!(net.validate().is_ok());

        // hidden = [2, 0]; logits = [0, 2]
        let p = net.predict_proba(&[2.0]).unwrap();
        assert_eq!(p.len(), 2);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
        let expected = 2f64.exp() / (1.0 + 2f64.exp());
        assert!((p[1] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let mut v = [1000.0, 1000.0];
        softmax(&mut v);
        assert_eq!(v, [0.5, 0.5]);
    }

    #[test]
    fn test_validate_rejects_broken_shapes() {
        let mut net = logistic(&[1.0, 1.0], 0.0);
        net.layers[0].weights[1] = vec![1.0, 2.0];
        assert!(net.validate().is_err());

        let unchained = DenseNetwork::new(vec![
            DenseLayer {
                weights: vec![vec![1.0, 1.0, 1.0]],
                bias: vec![0.0; 3],
                activation: Activation::Relu,
            },
            DenseLayer {
                weights: vec![vec![1.0]; 2],
                bias: vec![0.0],
                activation: Activation::Sigmoid,
            },
        ]);
        let err = unchained.validate().unwrap_err().to_string();
        assert!(err.contains("expects 2 inputs"), "{err}");

        assert!(DenseNetwork::new(vec![]).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_binary_head() {
        let net = DenseNetwork::new(vec![DenseLayer {
            weights: vec![vec![1.0, 1.0, 1.0]],
            bias: vec![0.0; 3],
            activation: Activation::Softmax,
        }]);
        assert!(net.validate().is_err());

        let linear = DenseNetwork::new(vec![DenseLayer {
            weights: vec![vec![1.0]],
            bias: vec![0.0],
            activation: Activation::Linear,
        }]);
        assert!(linear.validate().is_err());
    }

    #[test]
    fn test_predict_rejects_wrong_dimension() {
        let net = logistic(&[1.0, 1.0, 1.0], 0.0);
        let err = net.predict_proba(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ReadmitError::Dimensionality { expected: 3, actual: 1, .. }
        ));
    }

    #[test]
    fn test_activation_defaults_to_linear() {
        let layer: DenseLayer =
            serde_json::from_str(r#"{"weights":[[1.0]],"bias":[0.0]}"#).expect("parse");
        assert_eq!(layer.activation, Activation::Linear);
    }
}
