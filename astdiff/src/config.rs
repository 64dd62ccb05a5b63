use arbor::MatchingConfig;

/// Configuration for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Reconcile class pairs on the rayon thread pool.
    /// Results are merged in input order either way.
    pub parallel: bool,

    /// Thresholds for the generic subtree aligner used by the leaf and
    /// composite matchers.
    pub matching: MatchingConfig,

    /// Process the renamed class pairs after the unchanged-name ones.
    pub process_renamed_classes: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            matching: MatchingConfig::default(),
            process_renamed_classes: true,
        }
    }
}
