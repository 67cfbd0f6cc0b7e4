use std::fmt;

use crate::core::{ChartId, Filter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartEventKind {
    PreRender,
    PostRender,
    PreRedraw,
    PostRedraw,
    Filtered,
    Zoomed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    PreRender,
    PostRender,
    PreRedraw,
    PostRedraw,
    /// Filters toggled, added or removed by one mutation. Empty on reset.
    Filtered { delta: Vec<Filter> },
    Zoomed { domain: (f64, f64) },
}

impl ChartEvent {
    #[must_use]
    pub fn kind(&self) -> ChartEventKind {
        match self {
            Self::PreRender => ChartEventKind::PreRender,
            Self::PostRender => ChartEventKind::PostRender,
            Self::PreRedraw => ChartEventKind::PreRedraw,
            Self::PostRedraw => ChartEventKind::PostRedraw,
            Self::Filtered { .. } => ChartEventKind::Filtered,
            Self::Zoomed { .. } => ChartEventKind::Zoomed,
        }
    }
}

pub type Listener = Box<dyn FnMut(ChartId, &ChartEvent)>;

struct NamedListener {
    kind: ChartEventKind,
    name: String,
    callback: Listener,
}

/// Typed listener table. Registering a second listener with the same
/// kind and name replaces the first.
#[derive(Default)]
pub struct Listeners {
    entries: Vec<NamedListener>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| (entry.kind, &entry.name)))
            .finish()
    }
}

impl Listeners {
    pub fn on(&mut self, kind: ChartEventKind, name: impl Into<String>, callback: Listener) {
        let name = name.into();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.kind == kind && entry.name == name)
        {
            Some(entry) => entry.callback = callback,
            None => self.entries.push(NamedListener {
                kind,
                name,
                callback,
            }),
        }
    }

    /// Returns `true` when a listener was removed.
    pub fn off(&mut self, kind: ChartEventKind, name: &str) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !(entry.kind == kind && entry.name == name));
        self.entries.len() != before
    }

    #[must_use]
    pub fn count(&self, kind: ChartEventKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    pub fn emit(&mut self, chart: ChartId, event: &ChartEvent) {
        let kind = event.kind();
        for entry in self.entries.iter_mut().filter(|entry| entry.kind == kind) {
            (entry.callback)(chart, event);
        }
    }
}
