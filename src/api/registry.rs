use indexmap::IndexMap;

use crate::core::{Anchor, ChartId};

/// Group every chart joins when none is given.
pub const DEFAULT_CHART_GROUP: &str = "__default_chart_group__";

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub id: ChartId,
    pub anchor: Anchor,
}

/// Named chart groups, each an ordered list of anchored charts.
///
/// Owned by a `Dashboard`; every dashboard (and every test) starts from an
/// empty registry.
#[derive(Debug, Clone)]
pub struct ChartRegistry {
    default_group: String,
    groups: IndexMap<String, Vec<RegistryEntry>>,
}

impl Default for ChartRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_GROUP)
    }
}

impl ChartRegistry {
    #[must_use]
    pub fn new(default_group: impl Into<String>) -> Self {
        Self {
            default_group: default_group.into(),
            groups: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn default_group(&self) -> &str {
        &self.default_group
    }

    /// Missing or empty names resolve to the default group.
    #[must_use]
    pub fn resolve_group<'a>(&'a self, group: Option<&'a str>) -> &'a str {
        match group {
            Some(name) if !name.is_empty() => name,
            _ => &self.default_group,
        }
    }

    pub fn register(&mut self, entry: RegistryEntry, group: Option<&str>) {
        self.list(group).push(entry);
    }

    /// Removes the first entry in `group` anchored at the same node as `anchor`.
    pub fn deregister(&mut self, anchor: &Anchor, group: Option<&str>) -> Option<RegistryEntry> {
        let name = self.resolve_group(group).to_owned();
        let entries = self.groups.get_mut(&name)?;
        let position = entries
            .iter()
            .position(|entry| entry.anchor.same_node(anchor))?;
        Some(entries.remove(position))
    }

    /// Removes the entry for chart `id` at `anchor`, falling back to the first
    /// entry at that anchor when no entry carries `id`.
    pub fn deregister_id(
        &mut self,
        anchor: &Anchor,
        id: ChartId,
        group: Option<&str>,
    ) -> Option<RegistryEntry> {
        let name = self.resolve_group(group).to_owned();
        let entries = self.groups.get_mut(&name)?;
        let position = entries
            .iter()
            .position(|entry| entry.id == id && entry.anchor.same_node(anchor))
            .or_else(|| {
                entries
                    .iter()
                    .position(|entry| entry.anchor.same_node(anchor))
            })?;
        Some(entries.remove(position))
    }

    #[must_use]
    pub fn has(&self, id: ChartId) -> bool {
        self.groups
            .values()
            .any(|entries| entries.iter().any(|entry| entry.id == id))
    }

    /// Live list for `group`, created empty when absent.
    pub fn list(&mut self, group: Option<&str>) -> &mut Vec<RegistryEntry> {
        let name = self.resolve_group(group).to_owned();
        self.groups.entry(name).or_default()
    }

    /// Chart ids of `group` in registration order, without creating the group.
    #[must_use]
    pub fn ids(&self, group: Option<&str>) -> Vec<ChartId> {
        self.groups
            .get(self.resolve_group(group))
            .map(|entries| entries.iter().map(|entry| entry.id).collect())
            .unwrap_or_default()
    }

    /// Drops one group, or every group when `group` is `None`.
    pub fn clear(&mut self, group: Option<&str>) {
        match group {
            Some(name) => {
                let name = self.resolve_group(Some(name)).to_owned();
                self.groups.shift_remove(&name);
            }
            None => self.groups.clear(),
        }
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartRegistry, DEFAULT_CHART_GROUP, RegistryEntry};
    use crate::core::{Anchor, ChartId};

    fn entry(id: u64, selector: &str) -> RegistryEntry {
        RegistryEntry {
            id: ChartId(id),
            anchor: Anchor::new(selector),
        }
    }

    #[test]
    fn empty_group_name_uses_default() {
        let mut registry = ChartRegistry::default();
        registry.register(entry(1, "#a"), Some(""));
        registry.register(entry(2, "#b"), None);
        assert_eq!(registry.ids(Some(DEFAULT_CHART_GROUP)), vec![ChartId(1), ChartId(2)]);
    }

    #[test]
    fn deregister_removes_first_entry_at_anchor() {
        let mut registry = ChartRegistry::default();
        registry.register(entry(1, "#a"), Some("g"));
        registry.register(entry(2, "#b"), Some("g"));
        registry.register(entry(3, "#a"), Some("g"));

        let removed = registry.deregister(&Anchor::new("#a"), Some("g"));
        assert_eq!(removed.map(|entry| entry.id), Some(ChartId(1)));
        assert_eq!(registry.ids(Some("g")), vec![ChartId(2), ChartId(3)]);
        assert!(registry.deregister(&Anchor::new("#zzz"), Some("g")).is_none());
    }

    #[test]
    fn deregister_id_keeps_other_charts_at_the_same_anchor() {
        let mut registry = ChartRegistry::default();
        registry.register(entry(1, "#slot"), None);
        registry.register(entry(2, "#slot"), None);

        let removed = registry.deregister_id(&Anchor::new("#slot"), ChartId(2), None);
        assert_eq!(removed.map(|entry| entry.id), Some(ChartId(2)));
        assert_eq!(registry.ids(None), vec![ChartId(1)]);

        let fallback = registry.deregister_id(&Anchor::new("#slot"), ChartId(9), None);
        assert_eq!(fallback.map(|entry| entry.id), Some(ChartId(1)));
        assert!(registry.ids(None).is_empty());
    }

    #[test]
    fn list_creates_and_clear_drops() {
        let mut registry = ChartRegistry::default();
        assert!(registry.list(Some("fresh")).is_empty());
        assert_eq!(registry.group_names().count(), 1);
        registry.register(entry(1, "#a"), Some("other"));
        assert!(registry.has(ChartId(1)));
        registry.clear(Some("other"));
        assert!(!registry.has(ChartId(1)));
        registry.clear(None);
        assert_eq!(registry.group_names().count(), 0);
    }
}
