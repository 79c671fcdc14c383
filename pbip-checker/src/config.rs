//! Checker configuration, bundled into a single value instead of the module-level option flags
//! the source keeps (see the crate's top-level docs).
use pbip_macros::DocDefault;

/// Tunable behavior of a single check run.
#[derive(DocDefault, Clone, Debug)]
pub struct CheckerConfig {
    /// Skip the clause-shortcut path for single-clause, single-hint input steps and always go
    /// through full BDD construction. (Default: false)
    pub bdd_only: bool,

    /// Allow the BDD manager to reorder extension variables as they're introduced. (Default:
    /// true)
    pub reorder: bool,

    /// Use the symbolic Davis-Putnam reducer instead of bucket elimination for input steps.
    /// (Default: true)
    pub sdp_reduce: bool,

    /// Verbosity level: 0 silent, 1 per-step summary, 2 comments every emitted clause, 3 dumps
    /// parsed constraints, 4 dumps internal bucket/SDP traces. (Default: 1)
    pub verbosity: u8,

    /// Node-count growth between unique-table garbage collection passes. (Default: 100000)
    pub gc_threshold: usize,
}
