//! Idea subdomain: the versioned record and the stage outputs it carries.

pub mod entities;
pub mod iteration;
pub mod value_objects;

pub use entities::{IdeaId, IdeaRecord, IdeaStatus};
pub use iteration::IterationType;
pub use value_objects::{
    Constraints, CriticOutput, IdeaDraft, MarketAnalysis, RefinerOutput, RevenueProjections,
    SynthesizerOutput,
};
