use burn::{
    module::Module,
    nn::{Initializer, Linear, LinearConfig},
    tensor::{backend::Backend, Tensor},
};
use serde::{Deserialize, Serialize};

/// Reduction used when pooling over the time dimension
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    /// Keep the largest activation
    #[default]
    Max,

    /// Average the activations
    Avg,
}

impl TryFrom<&str> for Pooling {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "max" => Ok(Pooling::Max),
            "avg" | "average" | "mean" => Ok(Pooling::Avg),
            _ => Err(anyhow!("unknown pooling {}", value)),
        }
    }
}

/// Global pooling that collapses one dimension of a `[batch, a, b]` tensor
#[derive(Module, Clone, Debug)]
pub struct GlobalPool1d {
    max: bool,
}

impl GlobalPool1d {
    /// Create a pooling layer for the given reduction
    pub fn new(pooling: Pooling) -> Self {
        Self {
            max: pooling == Pooling::Max,
        }
    }

    /// Reduce `dim` (1 or 2) away, returning `[batch, features]`
    pub fn forward<B: Backend>(&self, input: Tensor<B, 3>, dim: usize) -> Tensor<B, 2> {
        let pooled = if self.max {
            input.max_dim(dim)
        } else {
            input.mean_dim(dim)
        };

        pooled.squeeze(dim)
    }
}

/// A fully connected layer with Glorot-uniform kernels
pub fn dense<B: Backend>(d_input: usize, d_output: usize, device: &B::Device) -> Linear<B> {
    LinearConfig::new(d_input, d_output)
        .with_initializer(Initializer::XavierUniform { gain: 1.0 })
        .init(device)
}

/// `weight_decay * sum(W^2)` over the kernel of a dense layer
pub fn l2_penalty<B: Backend>(layer: &Linear<B>, weight_decay: f64) -> Tensor<B, 1> {
    layer
        .weight
        .val()
        .powf_scalar(2.0)
        .sum()
        .mul_scalar(weight_decay)
}
