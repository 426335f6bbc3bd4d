//! Query engine (`spec.md` §4.5): five read-only graph traversals over a
//! loaded [`crate::ir::Ir`], each building its own [`index::Indexes`].

pub mod alternatives;
pub mod blocked;
pub mod index;
pub mod tensions;
pub mod what_if;
pub mod why;

pub use alternatives::{alternatives, AlternativesFormat, AlternativesOptions, AlternativesResult};
pub use blocked::{blocked, BlockedOptions, BlockedResult};
pub use tensions::{tensions, TensionsGroupBy, TensionsOptions, TensionsResult};
pub use what_if::{what_if, WhatIfFormat, WhatIfOptions, WhatIfResult};
pub use why::{why, WhyFormat, WhyOptions, WhyResult};
