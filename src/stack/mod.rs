//! Stacked PR engines: tree building, rendering, sync and below

pub mod below;
mod render;
mod shell;
mod sync;
mod tree;

pub use below::{
    BelowOutcome, BelowPlan, BelowRequest, BelowResult, BelowStep, below, execute_below,
    plan_below,
};
pub use render::{
    center_text, horizontal_connector, render_forest, render_forest_indented, render_horizontal,
    render_indented, truncate_text,
};
pub use shell::{CONFLICT_ENV_VAR, FALLBACK_SHELL, ShellResolver};
pub use sync::{
    ConflictContext, ConflictResolver, Resolution, SyncReport, SyncState, sync_stacks,
};
pub use tree::{PrJson, PrTree, TreeJson, build_forest, build_tree, build_tree_from_prs, find_roots};
