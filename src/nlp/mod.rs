//! Language support utilities.

pub mod stopwords;

pub use stopwords::StopwordFilter;
