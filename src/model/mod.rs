use burn::nn::conv::Conv2d;
use burn::nn::{BatchNorm, Linear};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

pub mod cnn;
pub mod mlp;

pub use cnn::{ConvNet, ConvNetConfig};
pub use mlp::{TinyMlp, TinyMlpConfig};

/// Which network the training binary builds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Architecture {
    /// [`TinyMlp`].
    #[default]
    Mlp,
    /// [`ConvNet`].
    Cnn,
}

/// Name and shape of one trainable parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSummary {
    pub name: String,
    pub shape: Vec<usize>,
}

impl ParamSummary {
    pub fn new(name: impl Into<String>, shape: impl Into<Vec<usize>>) -> Self {
        Self {
            name: name.into(),
            shape: shape.into(),
        }
    }

    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }
}

/// A network mapping flattened MNIST images to 10 class scores.
pub trait Classifier<B: Backend>: Module<B> {
    /// # Shapes
    ///   - Input [batch, WIDTH * HEIGHT]
    ///   - Output [batch, NUM_CLASSES]
    fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Trainable parameters, in layer order with weights before biases.
    fn parameters(&self) -> Vec<ParamSummary>;

    fn describe(&self) -> String;
}

pub(crate) fn linear_params<B: Backend>(prefix: &str, linear: &Linear<B>) -> Vec<ParamSummary> {
    let mut params = vec![ParamSummary::new(
        format!("{prefix}.weight"),
        linear.weight.dims(),
    )];
    if let Some(bias) = &linear.bias {
        params.push(ParamSummary::new(format!("{prefix}.bias"), bias.dims()));
    }
    params
}

pub(crate) fn conv_params<B: Backend>(prefix: &str, conv: &Conv2d<B>) -> Vec<ParamSummary> {
    let mut params = vec![ParamSummary::new(
        format!("{prefix}.weight"),
        conv.weight.dims(),
    )];
    if let Some(bias) = &conv.bias {
        params.push(ParamSummary::new(format!("{prefix}.bias"), bias.dims()));
    }
    params
}

pub(crate) fn batch_norm_params<B: Backend, const D: usize>(
    prefix: &str,
    norm: &BatchNorm<B, D>,
) -> Vec<ParamSummary> {
    vec![
        ParamSummary::new(format!("{prefix}.gamma"), norm.gamma.dims()),
        ParamSummary::new(format!("{prefix}.beta"), norm.beta.dims()),
    ]
}

/// `Linear(in -> out)`
pub(crate) fn describe_linear<B: Backend>(linear: &Linear<B>) -> String {
    let [d_input, d_output] = linear.weight.dims();
    format!("Linear({d_input} -> {d_output})")
}
