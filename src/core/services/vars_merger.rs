use crate::core::models::variable::VariableSet;

/// Merges parsed variable files in override order.
///
/// Later sets override earlier ones; every key keeps the position at which
/// it was first introduced, so output order does not depend on how often
/// a key is overridden downstream.
pub struct VarsMerger;

impl VarsMerger {
    pub fn merge<'a, I>(&self, sets: I) -> VariableSet
    where
        I: IntoIterator<Item = &'a VariableSet>,
    {
        let mut merged = VariableSet::new();
        for set in sets {
            for variable in set.iter() {
                if let Some(previous) = merged.get(&variable.key) {
                    tracing::trace!(
                        key = %variable.key,
                        from = previous.type_name(),
                        to = variable.value.type_name(),
                        "variable overridden"
                    );
                }
                merged.insert(variable.clone());
            }
        }
        merged
    }
}
