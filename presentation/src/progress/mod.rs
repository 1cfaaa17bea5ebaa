//! Progress reporting while ideas are generated

pub mod reporter;
