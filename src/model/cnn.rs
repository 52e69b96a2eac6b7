use crate::data::{HEIGHT, NUM_CLASSES, WIDTH};
use crate::model::{
    Classifier, ParamSummary, batch_norm_params, conv_params, describe_linear, linear_params,
};
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::prelude::*;
use burn::tensor::activation::softmax;

/// Convolution, batch normalization, ReLU, then 2x2 max pooling.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: BatchNorm<B, 2>,
    pub pool: MaxPool2d,
    pub activation: Relu,
}

impl<B: Backend> ConvBlock<B> {
    /// Halves the spatial size.
    ///
    /// # Shapes
    ///   - Input [batch, channels_in, height, width]
    ///   - Output [batch, channels_out, height / 2, width / 2]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.norm.forward(x);
        let x = self.activation.forward(x);
        self.pool.forward(x)
    }

    fn parameters(&self, prefix: &str) -> Vec<ParamSummary> {
        let mut params = conv_params(&format!("{prefix}.conv"), &self.conv);
        params.extend(batch_norm_params(&format!("{prefix}.norm"), &self.norm));
        params
    }

    fn describe(&self) -> String {
        let [channels_out, channels_in, kernel_h, kernel_w] = self.conv.weight.dims();
        format!(
            "Conv2d({channels_in} -> {channels_out}, {kernel_h}x{kernel_w}), BatchNorm({channels_out}), ReLU, MaxPool2d(2x2)"
        )
    }
}

/// Two [`ConvBlock`]s, then linear, ReLU, linear, softmax.
#[derive(Module, Debug)]
pub struct ConvNet<B: Backend> {
    pub block1: ConvBlock<B>,
    pub block2: ConvBlock<B>,
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    pub activation: Relu,
}

#[derive(Config, Debug)]
pub struct ConvNetConfig {
    /// Output channels of the first and second block.
    #[config(default = "[32, 64]")]
    pub channels: [usize; 2],
    #[config(default = 3)]
    pub kernel_size: usize,
    #[config(default = 128)]
    pub hidden_size: usize,
    #[config(default = "NUM_CLASSES")]
    pub num_classes: usize,
}

impl ConvNetConfig {
    /// Returns the initialized model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvNet<B> {
        let [c1, c2] = self.channels;
        // each block halves height and width
        let flat_size = c2 * (HEIGHT / 4) * (WIDTH / 4);

        ConvNet {
            block1: self.block(1, c1, device),
            block2: self.block(c1, c2, device),
            fc1: LinearConfig::new(flat_size, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.num_classes).init(device),
            activation: Relu::new(),
        }
    }

    fn block<B: Backend>(
        &self,
        channels_in: usize,
        channels_out: usize,
        device: &B::Device,
    ) -> ConvBlock<B> {
        ConvBlock {
            conv: Conv2dConfig::new(
                [channels_in, channels_out],
                [self.kernel_size, self.kernel_size],
            )
            .with_padding(PaddingConfig2d::Same)
            .init(device),
            norm: BatchNormConfig::new(channels_out).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> Classifier<B> for ConvNet<B> {
    fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch, _] = images.dims();

        let x = images.reshape([batch, 1, HEIGHT, WIDTH]);
        let x = self.block1.forward(x);
        let x = self.block2.forward(x);

        let [_, channels, height, width] = x.dims();
        let x = x.reshape([batch, channels * height * width]);

        let x = self.fc1.forward(x);
        let x = self.activation.forward(x);
        let x = self.fc2.forward(x);

        softmax(x, 1)
    }

    fn parameters(&self) -> Vec<ParamSummary> {
        let mut params = self.block1.parameters("block1");
        params.extend(self.block2.parameters("block2"));
        params.extend(linear_params("fc1", &self.fc1));
        params.extend(linear_params("fc2", &self.fc2));
        params
    }

    fn describe(&self) -> String {
        format!(
            "ConvNet([{}], [{}], Flatten, {}, ReLU, {}, Softmax)",
            self.block1.describe(),
            self.block2.describe(),
            describe_linear(&self.fc1),
            describe_linear(&self.fc2),
        )
    }
}
