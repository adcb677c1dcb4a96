//! Batch generation over many conversations.

use super::invoker::Invoker;
use crate::types::{Conversation, GenerationBatch};

impl Invoker {
    /// Run each conversation through the invoker, one after another.
    ///
    /// The batch has exactly one entry per input, in input order. A failed
    /// conversation yields its failure text and the batch moves on.
    pub async fn generate<I>(&self, conversations: I, stop: Option<&[String]>) -> GenerationBatch
    where
        I: IntoIterator,
        I::Item: Into<Conversation>,
    {
        let mut batch = GenerationBatch::default();

        for conversation in conversations {
            let result = self.invoke(conversation, stop).await;
            batch.push(result);
        }

        tracing::debug!(generations = batch.len(), "batch generation finished");
        batch
    }
}
