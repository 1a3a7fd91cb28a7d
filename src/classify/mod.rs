// vscdb-scrub - Classification Module
//
// Decides whether a store entry belongs to the targeted extension's stored
// credentials. Classification is a pure function of `(key, value)`.

mod classifier;

pub use classifier::{ClassificationResult, Classifier, Reason};
