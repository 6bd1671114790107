//! Property tests run against random inputs with quickcheck.

mod algebra;
mod keyed_set;
