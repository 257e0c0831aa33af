use burn::{
    tensor::{backend::Backend, Tensor},
    train::metric::{Adaptor, LossInput},
};
use derive_new::new;

/// Output of a multi-label training or validation step
#[derive(new)]
pub struct Output<B: Backend> {
    /// Binary cross-entropy plus the kernel penalties
    pub loss: Tensor<B, 1>,

    /// Logits: [batch_size, num_classes]
    pub output: Tensor<B, 2>,

    /// 0/1 targets: [batch_size, num_classes]
    pub targets: Tensor<B, 2>,
}

impl<B: Backend> Adaptor<LossInput<B>> for Output<B> {
    fn adapt(&self) -> LossInput<B> {
        LossInput::new(self.loss.clone())
    }
}
