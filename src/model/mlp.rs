use crate::data::{NUM_CLASSES, NUM_FEATURES};
use crate::model::{Classifier, ParamSummary, describe_linear, linear_params};
use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Two-layer perceptron: linear, ReLU, linear.
#[derive(Module, Debug)]
pub struct TinyMlp<B: Backend> {
    pub l1: Linear<B>,
    pub l2: Linear<B>,
    pub activation: Relu,
}

#[derive(Config, Debug)]
pub struct TinyMlpConfig {
    #[config(default = "NUM_FEATURES")]
    pub input_size: usize,
    #[config(default = 100)]
    pub hidden_size: usize,
    #[config(default = "NUM_CLASSES")]
    pub num_classes: usize,
}

impl TinyMlpConfig {
    /// Returns the initialized model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> TinyMlp<B> {
        TinyMlp {
            l1: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            l2: LinearConfig::new(self.hidden_size, self.num_classes).init(device),
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> Classifier<B> for TinyMlp<B> {
    fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch, _] = images.dims();
        let [_, num_classes] = self.l2.weight.dims();

        let x = self.l1.forward(images);
        let x = self.activation.forward(x);
        let x = self.l2.forward(x);
        debug_assert_eq!([batch, num_classes], x.dims());

        x
    }

    fn parameters(&self) -> Vec<ParamSummary> {
        let mut params = linear_params("l1", &self.l1);
        params.extend(linear_params("l2", &self.l2));
        params
    }

    fn describe(&self) -> String {
        format!(
            "Tiny MLP({}, {})",
            describe_linear(&self.l1),
            describe_linear(&self.l2)
        )
    }
}
