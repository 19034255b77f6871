//! Stream combinators for snapshot delivery

mod sample;

pub use sample::{Sample, SampleExt, Ticked};
