//! Fill patterns keyed by a hash of their parameters.

use std::hash::Hasher;

use indexmap::IndexMap;
use rustc_hash::{FxHashSet, FxHasher};
use strata_core::{Color, DrawContext, PatternId, PatternSpec};

pub fn pattern_id(spec: &PatternSpec) -> PatternId {
    let mut h = FxHasher::default();
    h.write_u32(spec.angle.to_bits());
    h.write_u32(spec.spacing.to_bits());
    h.write_u32(spec.stroke_width.to_bits());
    for c in [spec.color, spec.background] {
        for channel in c.to_array() {
            h.write_u32(channel.to_bits());
        }
    }
    PatternId(h.finish())
}

/// Diagonal stripes used for committed selections.
pub fn selection_stripes(color: Color) -> PatternSpec {
    PatternSpec {
        angle: 45.0,
        spacing: 6.0,
        stroke_width: 2.0,
        color,
        background: color.with_alpha(0.25),
    }
}

/// Per-chart pattern registry.
///
/// Registering is idempotent; each pattern reaches the backend once.
#[derive(Clone, Debug, Default)]
pub struct PatternRegistry {
    specs: IndexMap<PatternId, PatternSpec>,
    defined: FxHashSet<PatternId>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: PatternSpec) -> PatternId {
        let id = pattern_id(&spec);
        self.specs.entry(id).or_insert(spec);
        id
    }

    pub fn get(&self, id: PatternId) -> Option<&PatternSpec> {
        self.specs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Define every registered pattern the backend has not seen yet.
    pub fn sync(&mut self, ctx: &mut dyn DrawContext) -> usize {
        let mut defined = 0;
        for (id, spec) in &self.specs {
            if self.defined.insert(*id) {
                ctx.define_pattern(*id, spec);
                defined += 1;
            }
        }
        if defined > 0 {
            tracing::debug!(defined, "patterns defined");
        }
        defined
    }

    /// Forget what the backend has seen, e.g. after switching backends.
    pub fn reset_backend(&mut self) {
        self.defined.clear();
    }
}

#[cfg(test)]
mod tests {
    use strata_core::PaintContext;

    use super::*;

    #[test]
    fn same_spec_same_id() {
        let mut r = PatternRegistry::new();
        let a = r.register(selection_stripes(Color::BLACK));
        let b = r.register(selection_stripes(Color::BLACK));
        let c = r.register(selection_stripes(Color::WHITE));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn backend_sees_each_pattern_once() {
        let mut r = PatternRegistry::new();
        let mut ctx = PaintContext::new();
        r.register(selection_stripes(Color::BLACK));
        assert_eq!(r.sync(&mut ctx), 1);
        r.register(selection_stripes(Color::BLACK));
        assert_eq!(r.sync(&mut ctx), 0);
        assert_eq!(ctx.pattern_definitions(), 1);
    }
}
