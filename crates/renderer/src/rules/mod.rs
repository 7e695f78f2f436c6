//! Ready-made aggregators and transfers.

mod aggregators;
mod categories;
mod general;
mod numeric;

pub use aggregators::{Count, Last, Max, Min, Sum};
pub use categories::{
    CategoricalCounts, CountCategories, HdAlpha, MinPercent, SpecializedHdAlpha, ToCounts,
};
pub use general::{Const, Echo, MapWrapper, Present, Replace, Simplify, Smear, Spread, Spreader, Valuer};
pub use numeric::{Divide, Interpolate, SpecializedInterpolate, SpecializedValueSpread, ValueSpread};
