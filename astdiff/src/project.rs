//! Whole-project reconciliation.

use rayon::prelude::*;

use crate::config::ReconcileConfig;
use crate::diff::DiffSet;
use crate::model::{ClassPairDiff, ModelDiff};
use crate::reconcile::{Outcome, Reconciler};

/// Reconciles every class pair of a [`ModelDiff`], then the refactorings
/// that span classes.
pub struct ProjectDiffer<'m> {
    model: &'m ModelDiff,
    config: ReconcileConfig,
}

impl<'m> ProjectDiffer<'m> {
    pub fn new(model: &'m ModelDiff) -> Self {
        Self::with_config(model, ReconcileConfig::default())
    }

    pub fn with_config(model: &'m ModelDiff, config: ReconcileConfig) -> Self {
        Self { model, config }
    }

    /// Produce one diff per file pair touched.
    ///
    /// Unchanged-name class pairs go first, renamed ones second; diffs for a
    /// file pair seen before are unioned into the existing one.
    pub fn diff(&self) -> DiffSet<'_> {
        let mut set = DiffSet::new();

        self.reconcile_pairs(&self.model.common_class_diffs, &mut set);
        if self.config.process_renamed_classes {
            self.reconcile_pairs(&self.model.renamed_class_diffs, &mut set);
        }

        let outcome = self.reconciler().reconcile_refactorings(&self.model.refactorings);
        set.absorb(outcome);

        debug!(
            files = set.len(),
            warnings = set.warnings().len(),
            "project reconciled"
        );
        set
    }

    fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(&self.config, &self.model.before, &self.model.after)
    }

    fn reconcile_pairs<'s>(&'s self, pairs: &'s [ClassPairDiff], set: &mut DiffSet<'s>) {
        let reconcile = |pair: &'s ClassPairDiff| self.reconciler().reconcile_class_pair(pair);
        // Collected in input order, so the merge below does not depend on
        // scheduling.
        let outcomes: Vec<Outcome<'s>> = if self.config.parallel {
            pairs.par_iter().map(reconcile).collect()
        } else {
            pairs.iter().map(reconcile).collect()
        };
        for outcome in outcomes {
            set.absorb(outcome);
        }
    }
}
