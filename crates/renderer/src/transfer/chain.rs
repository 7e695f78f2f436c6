//! Two-stage transfer composition.

use super::{ApplyMode, Bulk, Executor, Specialized, Transfer};
use crate::error::Result;
use ar_common::Aggregates;

/// Applies `first`, then `second` to the result.
///
/// The second stage is specialized against the first stage's output for the
/// same input grid, so it can only be specialized once that output exists:
/// specializing a chain specializes `first` immediately and defers `second`
/// to application time.
#[derive(Debug, Clone)]
pub struct Chain<T1, T2> {
    first: T1,
    second: T2,
}

impl<T1, T2> Chain<T1, T2> {
    pub fn new(first: T1, second: T2) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &T1 {
        &self.first
    }

    pub fn second(&self) -> &T2 {
        &self.second
    }
}

impl<T1, T2> Transfer for Chain<T1, T2>
where
    T1: Transfer,
    T2: Transfer<In = T1::Out> + Clone,
    T1::In: Clone + Send + Sync,
    T1::Out: Clone + Send + Sync,
    T2::Out: Clone + Send + Sync,
{
    type In = T1::In;
    type Out = T2::Out;
    type Specialized = SpecializedChain<T1::Specialized, T2>;

    fn empty_value(&self) -> Self::Out {
        self.second.empty_value()
    }

    fn specialize(&self, aggregates: &Aggregates<Self::In>) -> Result<Self::Specialized> {
        Ok(SpecializedChain {
            first: self.first.specialize(aggregates)?,
            second: self.second.clone(),
        })
    }
}

/// A chain whose first stage is bound to its input grid.
#[derive(Debug, Clone)]
pub struct SpecializedChain<S1, T2> {
    first: S1,
    second: T2,
}

impl<S1, T2> Specialized for SpecializedChain<S1, T2>
where
    S1: Specialized,
    T2: Transfer<In = S1::Out>,
    S1::In: Clone + Send + Sync,
    S1::Out: Clone + Send + Sync,
    T2::Out: Clone + Send + Sync,
{
    type In = S1::In;
    type Out = T2::Out;

    fn empty_value(&self) -> Self::Out {
        self.second.empty_value()
    }

    fn mode(&self) -> ApplyMode<'_, Self::In, Self::Out> {
        ApplyMode::Bulk(self)
    }
}

impl<S1, T2> Bulk<S1::In, T2::Out> for SpecializedChain<S1, T2>
where
    S1: Specialized,
    T2: Transfer<In = S1::Out>,
    S1::In: Clone + Send + Sync,
    S1::Out: Clone + Send + Sync,
    T2::Out: Clone + Send + Sync,
{
    fn process(
        &self,
        aggregates: &Aggregates<S1::In>,
        executor: &Executor<'_>,
    ) -> Result<Aggregates<T2::Out>> {
        let intermediate = executor.apply(&self.first, aggregates)?;
        executor.specialize_and_apply(&self.second, &intermediate)
    }
}
