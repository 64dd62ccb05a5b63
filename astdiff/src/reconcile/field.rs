//! Field alignment.

use arbor::{NodeId, is_iso_structural, kinds, locate};

use super::{Endpoints, Reconciler};
use crate::model::Attribute;

impl<'a> Reconciler<'a> {
    pub(super) fn process_attributes(&mut self, ends: Endpoints<'a>, attributes: &'a [(Attribute, Attribute)]) {
        for (before, after) in attributes {
            self.process_field(ends, before, after);
        }
    }

    /// Align two field declarations given their declarator fragments.
    pub(super) fn process_field(&mut self, ends: Endpoints<'a>, before: &'a Attribute, after: &'a Attribute) {
        let (src, dst) = (ends.src(), ends.dst());
        let fragment = kinds::VARIABLE_DECLARATION_FRAGMENT;
        let Some((src_fragment, dst_fragment)) = ends.resolve_pair_as(&before.location, &after.location, fragment)
        else {
            trace!(field = %before.name, "field fragment not found");
            return;
        };
        let (Some(src_decl), Some(dst_decl)) = (src.parent(src_fragment), dst.parent(dst_fragment)) else {
            return;
        };

        if src.hash(src_decl) == dst.hash(dst_decl) || is_iso_structural(src, src_decl, dst, dst_decl) {
            self.add_pair_recursively(ends, src_decl, dst_decl);
            return;
        }
        self.add_pair(ends, src_decl, dst_decl);

        if before.visibility == after.visibility
            && let Some(keyword) = before.visibility.keyword()
        {
            self.match_field_keyword(ends, src_decl, dst_decl, keyword);
        }
        for keyword in before.modifiers.shared_keywords(&after.modifiers) {
            self.match_field_keyword(ends, src_decl, dst_decl, keyword);
        }

        if let Some((s, d)) = ends.resolve_pair(&before.type_.location, &after.type_.location)
            && is_iso_structural(src, s, dst, d)
        {
            self.add_pair_recursively(ends, s, d);
        }

        self.add_pair(ends, src_fragment, dst_fragment);
        let matcher = self.leaf_matcher(false);
        matcher.align(ends.trees, src_fragment, dst_fragment, self.store(ends));

        if let (Some(doc1), Some(doc2)) = (&before.javadoc, &after.javadoc)
            && doc1.equal_text(doc2)
            && let Some((s, d)) = ends.resolve_pair(&doc1.location, &doc2.location)
        {
            self.add_pair_recursively(ends, s, d);
        }

        if let Some((s, d)) = src.child(src_fragment, 0).zip(dst.child(dst_fragment, 0)) {
            self.add_pair(ends, s, d);
        }
    }

    fn match_field_keyword(&mut self, ends: Endpoints<'a>, src_decl: NodeId, dst_decl: NodeId, keyword: &str) {
        let found = locate::find_field_child_by_label(ends.src(), src_decl, keyword)
            .zip(locate::find_field_child_by_label(ends.dst(), dst_decl, keyword));
        if let Some((s, d)) = found {
            self.add_pair(ends, s, d);
        }
    }
}
