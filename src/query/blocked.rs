//! `blocked(options)` (`spec.md` §4.5.4): every node carrying a `blocked`
//! state, annotated with transitive causes/effects and an impact score.

use crate::ir::{Ir, StateType};
use crate::query::index::Indexes;
use crate::query::what_if::{self, WhatIfOptions};
use crate::query::why::{self, WhyOptions};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct BlockedOptions {
    /// Only include blockers whose `since` is on or after this date.
    pub since: Option<NaiveDate>,
    /// Depth passed through to the `why()` call behind `transitive_causes`.
    pub causes_depth: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Blocker {
    pub node_id: String,
    pub content: String,
    pub reason: String,
    pub since: String,
    pub days_blocked: i64,
    pub transitive_causes: Vec<String>,
    pub transitive_effects: Vec<String>,
    pub impact_score: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockedMetadata {
    pub total_blockers: usize,
    pub average_days_blocked: f64,
    pub oldest_blocker: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockedResult {
    pub blockers: Vec<Blocker>,
    pub metadata: BlockedMetadata,
}

/// `blocked()` never fails on malformed `since` values; a state whose
/// `since` doesn't parse as `YYYY-MM-DD` is reported with `days_blocked: 0`
/// rather than aborting the whole query (`spec.md` §4.5 preamble: queries
/// are read-only and tolerant of upstream linter-reportable defects).
pub fn blocked(ir: &Ir, as_of: NaiveDate, options: &BlockedOptions) -> BlockedResult {
    let idx = Indexes::build(ir);

    let mut blockers: Vec<Blocker> = Vec::new();
    for state in ir.states.iter().filter(|s| s.state_type == StateType::Blocked) {
        let since_str = state.fields.get("since").cloned().unwrap_or_default();
        let since_date = NaiveDate::parse_from_str(&since_str, "%Y-%m-%d").ok();

        if let (Some(filter), Some(since)) = (options.since, since_date) {
            if since < filter {
                continue;
            }
        }

        let days_blocked = since_date.map(|since| (as_of - since).num_days()).unwrap_or(0);

        let why_opts = WhyOptions {
            max_depth: options.causes_depth.or(Some(1)),
            ..Default::default()
        };
        let transitive_causes = why::why(ir, &state.node_id, &why_opts)
            .ok()
            .map(|result| match result {
                why::WhyResult::Chain { causal_chain, .. } => {
                    causal_chain.into_iter().map(|s| s.content).collect()
                }
                why::WhyResult::Minimal { chain, .. } => chain,
            })
            .unwrap_or_default();

        let transitive_effects = what_if::what_if(ir, &state.node_id, &WhatIfOptions::default())
            .ok()
            .map(|result| match result {
                what_if::WhatIfResult::Tree { impact_tree, .. } => impact_tree
                    .direct
                    .into_iter()
                    .chain(impact_tree.indirect)
                    .map(|n| n.content)
                    .collect(),
                what_if::WhatIfResult::Summary { benefits, risks, .. } => {
                    benefits.into_iter().chain(risks).collect()
                }
            })
            .unwrap_or_default();

        let impact_score = transitive_effects.len();

        blockers.push(Blocker {
            node_id: state.node_id.clone(),
            content: idx.content_of(&state.node_id),
            reason: state.fields.get("reason").cloned().unwrap_or_default(),
            since: since_str,
            days_blocked,
            transitive_causes,
            transitive_effects,
            impact_score,
        });
    }

    blockers.sort_by(|a, b| {
        b.impact_score
            .cmp(&a.impact_score)
            .then_with(|| b.days_blocked.cmp(&a.days_blocked))
    });

    let total_blockers = blockers.len();
    let average_days_blocked = if total_blockers == 0 {
        0.0
    } else {
        blockers.iter().map(|b| b.days_blocked as f64).sum::<f64>() / total_blockers as f64
    };
    let oldest_blocker = blockers
        .iter()
        .max_by_key(|b| b.days_blocked)
        .map(|b| b.node_id.clone());

    BlockedResult {
        blockers,
        metadata: BlockedMetadata {
            total_blockers,
            average_days_blocked,
            oldest_blocker,
        },
    }
}
