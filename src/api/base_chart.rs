//! State and behavior shared by every chart kind: bindings, accessors,
//! the filter set and its handler, sizing, lifecycle hooks.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use tracing::trace;

use crate::core::{
    Anchor, ChartId, Dimension, DimensionHandle, Filter, FilterPredicate, Group, GroupHandle,
    GroupRow, Key, KeyAccessor, Size, TextAccessor, ValueAccessor,
};
use crate::mixins::Legend;
use crate::render::RenderFrame;

use super::chart::DrawPass;
use super::listeners::{ChartEvent, ChartEventKind, Listener, Listeners};

pub const DEFAULT_MIN_WIDTH: f64 = 200.0;
pub const DEFAULT_MIN_HEIGHT: f64 = 200.0;
pub const DEFAULT_TRANSITION_MS: u64 = 750;

static NEXT_CHART_ID: AtomicU64 = AtomicU64::new(1);

pub type FilterSet = SmallVec<[Filter; 4]>;

/// Produces the rows a chart draws from its bound group.
pub type DataCallback = Rc<dyn Fn(&dyn Group) -> Vec<GroupRow>>;

/// Attribute a chart kind requires before it can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MandatoryAttribute {
    Dimension,
    Group,
    XScale,
    Counter,
    Levels,
}

impl MandatoryAttribute {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dimension => "dimension",
            Self::Group => "group",
            Self::XScale => "x",
            Self::Counter => "counter",
            Self::Levels => "levels",
        }
    }
}

/// Strategy for keeping a filter set and pushing it into a dimension.
///
/// Charts with non-standard membership (range-chart overlays, custom
/// predicates) install their own policy instead of overriding the
/// filter methods.
pub trait FilterPolicy {
    fn has_filter(&self, filters: &[Filter], filter: &Filter) -> bool {
        filters.contains(filter)
    }

    fn add_filter(&self, filters: &mut FilterSet, filter: Filter) {
        filters.push(filter);
    }

    fn remove_filter(&self, filters: &mut FilterSet, filter: &Filter) {
        filters.retain(|existing| existing != filter);
    }

    fn reset_filter(&self, filters: &mut FilterSet) {
        filters.clear();
    }

    /// Clears the dimension, then installs the OR of every filter's
    /// membership test when the set is non-empty.
    fn apply(&self, dimension: &dyn Dimension, filters: &[Filter]) {
        dimension.filter(None);
        if filters.is_empty() {
            return;
        }
        let filters: Vec<Filter> = filters.to_vec();
        let predicate: FilterPredicate =
            Rc::new(move |key: &Key| filters.iter().any(|filter| filter.is_filtered(key)));
        dimension.filter(Some(predicate));
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilterPolicy;

impl FilterPolicy for DefaultFilterPolicy {}

/// What a renderlet sees once a draw has settled.
#[derive(Debug)]
pub struct RenderletContext<'a> {
    pub chart: ChartId,
    pub anchor: &'a Anchor,
    pub frame: &'a RenderFrame,
    pub pass: DrawPass,
}

pub type Renderlet = Box<dyn FnMut(&RenderletContext<'_>)>;

pub struct BaseChart {
    id: ChartId,
    anchor: Option<Anchor>,
    chart_group: Option<String>,
    dimension: Option<DimensionHandle>,
    group: Option<GroupHandle>,
    group_name: String,
    key_accessor: KeyAccessor,
    value_accessor: ValueAccessor,
    label: TextAccessor,
    title: TextAccessor,
    render_label: bool,
    render_title: bool,
    filters: FilterSet,
    filter_policy: Rc<dyn FilterPolicy>,
    mandatory: Vec<MandatoryAttribute>,
    width: Option<f64>,
    height: Option<f64>,
    min_width: f64,
    min_height: f64,
    transition_duration_ms: u64,
    data_callback: Option<DataCallback>,
    ordering: Option<KeyAccessor>,
    renderlets: Vec<Renderlet>,
    listeners: Listeners,
    legend: Option<Legend>,
    controls_use_visibility: bool,
    controls_visible: bool,
    data_revision: u64,
    drawn_revision: Option<u64>,
    pub(crate) last_frame: Option<RenderFrame>,
    pub(crate) draw_cycle: u64,
}

impl fmt::Debug for BaseChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseChart")
            .field("id", &self.id)
            .field("anchor", &self.anchor)
            .field("chart_group", &self.chart_group)
            .field("group_name", &self.group_name)
            .field("filters", &self.filters)
            .field("mandatory", &self.mandatory)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl BaseChart {
    #[must_use]
    pub fn new(mandatory: &[MandatoryAttribute]) -> Self {
        Self {
            id: ChartId(NEXT_CHART_ID.fetch_add(1, Ordering::Relaxed)),
            anchor: None,
            chart_group: None,
            dimension: None,
            group: None,
            group_name: String::new(),
            key_accessor: KeyAccessor::default(),
            value_accessor: ValueAccessor::default(),
            label: TextAccessor::default(),
            title: TextAccessor::key_and_value(),
            render_label: true,
            render_title: true,
            filters: SmallVec::new(),
            filter_policy: Rc::new(DefaultFilterPolicy),
            mandatory: mandatory.to_vec(),
            width: None,
            height: None,
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
            transition_duration_ms: DEFAULT_TRANSITION_MS,
            data_callback: None,
            ordering: None,
            renderlets: Vec::new(),
            listeners: Listeners::default(),
            legend: None,
            controls_use_visibility: false,
            controls_visible: false,
            data_revision: 0,
            drawn_revision: None,
            last_frame: None,
            draw_cycle: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> ChartId {
        self.id
    }

    #[must_use]
    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    /// Anchor selector for diagnostics; unanchored charts report `<unanchored>`.
    #[must_use]
    pub fn anchor_name(&self) -> String {
        self.anchor
            .as_ref()
            .map_or_else(|| "<unanchored>".to_owned(), ToString::to_string)
    }

    pub(crate) fn set_anchor(&mut self, anchor: Anchor, chart_group: Option<String>) {
        self.anchor = Some(anchor);
        self.chart_group = chart_group;
    }

    #[must_use]
    pub fn chart_group(&self) -> Option<&str> {
        self.chart_group.as_deref()
    }

    #[must_use]
    pub fn mandatory_attributes(&self) -> &[MandatoryAttribute] {
        &self.mandatory
    }

    // -- bindings ---------------------------------------------------------

    #[must_use]
    pub fn dimension(&self) -> Option<&DimensionHandle> {
        self.dimension.as_ref()
    }

    pub fn set_dimension(&mut self, dimension: DimensionHandle) -> &mut Self {
        self.dimension = Some(dimension);
        self.data_revision += 1;
        self
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: DimensionHandle) -> Self {
        self.set_dimension(dimension);
        self
    }

    #[must_use]
    pub fn group(&self) -> Option<&GroupHandle> {
        self.group.as_ref()
    }

    #[must_use]
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn set_group(&mut self, group: GroupHandle, name: impl Into<String>) -> &mut Self {
        self.group = Some(group);
        self.group_name = name.into();
        self.data_revision += 1;
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: GroupHandle, name: impl Into<String>) -> Self {
        self.set_group(group, name);
        self
    }

    pub fn set_data_callback(&mut self, callback: Option<DataCallback>) -> &mut Self {
        self.data_callback = callback;
        self.data_revision += 1;
        self
    }

    #[must_use]
    pub fn has_data_callback(&self) -> bool {
        self.data_callback.is_some()
    }

    #[must_use]
    pub fn with_data_callback(mut self, callback: DataCallback) -> Self {
        self.set_data_callback(Some(callback));
        self
    }

    /// Bumped whenever dimension, group or data callback change.
    #[must_use]
    pub fn data_revision(&self) -> u64 {
        self.data_revision
    }

    /// Marks the current revision as drawn; returns `true` when cached
    /// derived data must be expired first.
    pub(crate) fn take_stale_revision(&mut self) -> bool {
        let stale = self.drawn_revision != Some(self.data_revision);
        self.drawn_revision = Some(self.data_revision);
        stale
    }

    // -- accessors --------------------------------------------------------

    #[must_use]
    pub fn key_accessor(&self) -> &KeyAccessor {
        &self.key_accessor
    }

    pub fn set_key_accessor(&mut self, accessor: KeyAccessor) -> &mut Self {
        self.key_accessor = accessor;
        self
    }

    #[must_use]
    pub fn value_accessor(&self) -> &ValueAccessor {
        &self.value_accessor
    }

    pub fn set_value_accessor(&mut self, accessor: ValueAccessor) -> &mut Self {
        self.value_accessor = accessor;
        self
    }

    #[must_use]
    pub fn label(&self) -> &TextAccessor {
        &self.label
    }

    pub fn set_label(&mut self, label: TextAccessor) -> &mut Self {
        self.label = label;
        self
    }

    #[must_use]
    pub fn title(&self) -> &TextAccessor {
        &self.title
    }

    pub fn set_title(&mut self, title: TextAccessor) -> &mut Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn render_label(&self) -> bool {
        self.render_label
    }

    pub fn set_render_label(&mut self, render: bool) -> &mut Self {
        self.render_label = render;
        self
    }

    #[must_use]
    pub fn render_title(&self) -> bool {
        self.render_title
    }

    pub fn set_render_title(&mut self, render: bool) -> &mut Self {
        self.render_title = render;
        self
    }

    pub fn set_ordering(&mut self, ordering: Option<KeyAccessor>) -> &mut Self {
        self.ordering = ordering;
        self
    }

    // -- sizing and timing ------------------------------------------------

    pub fn set_width(&mut self, width: Option<f64>) -> &mut Self {
        self.width = width;
        self
    }

    pub fn set_height(&mut self, height: Option<f64>) -> &mut Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn set_min_width(&mut self, min_width: f64) -> &mut Self {
        self.min_width = min_width;
        self
    }

    pub fn set_min_height(&mut self, min_height: f64) -> &mut Self {
        self.min_height = min_height;
        self
    }

    /// Explicit size when configured; otherwise the anchor's size hint when it
    /// exceeds the minimum; otherwise the minimum.
    #[must_use]
    pub fn size(&self) -> Size {
        let hint = self.anchor.as_ref().and_then(Anchor::size_hint);
        let width = self.width.unwrap_or_else(|| {
            hint.map(|size| size.width)
                .filter(|width| *width > self.min_width)
                .unwrap_or(self.min_width)
        });
        let height = self.height.unwrap_or_else(|| {
            hint.map(|size| size.height)
                .filter(|height| *height > self.min_height)
                .unwrap_or(self.min_height)
        });
        Size::new(width, height)
    }

    #[must_use]
    pub fn transition_duration_ms(&self) -> u64 {
        self.transition_duration_ms
    }

    pub fn set_transition_duration_ms(&mut self, duration_ms: u64) -> &mut Self {
        self.transition_duration_ms = duration_ms;
        self
    }

    // -- legend, renderlets, listeners ------------------------------------

    #[must_use]
    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    pub fn set_legend(&mut self, legend: Option<Legend>) -> &mut Self {
        self.legend = legend;
        self
    }

    pub fn add_renderlet(&mut self, renderlet: impl FnMut(&RenderletContext<'_>) + 'static) {
        self.renderlets.push(Box::new(renderlet));
    }

    pub fn on(
        &mut self,
        kind: ChartEventKind,
        name: impl Into<String>,
        listener: impl FnMut(ChartId, &ChartEvent) + 'static,
    ) -> &mut Self {
        let listener: Listener = Box::new(listener);
        self.listeners.on(kind, name, listener);
        self
    }

    pub fn off(&mut self, kind: ChartEventKind, name: &str) -> bool {
        self.listeners.off(kind, name)
    }

    pub(crate) fn emit(&mut self, event: &ChartEvent) {
        self.listeners.emit(self.id, event);
    }

    /// Runs renderlets against the last drawn frame, then the post listener.
    pub(crate) fn settle_draw(&mut self, pass: DrawPass) {
        if let (Some(anchor), Some(frame)) = (&self.anchor, &self.last_frame) {
            let context = RenderletContext {
                chart: self.id,
                anchor,
                frame,
                pass,
            };
            for renderlet in &mut self.renderlets {
                renderlet(&context);
            }
        }
        let event = match pass {
            DrawPass::Render => ChartEvent::PostRender,
            DrawPass::Redraw => ChartEvent::PostRedraw,
        };
        self.emit(&event);
    }

    #[must_use]
    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub(crate) fn set_controls_visible(&mut self, visible: bool) {
        self.controls_visible = visible;
    }

    #[must_use]
    pub fn controls_use_visibility(&self) -> bool {
        self.controls_use_visibility
    }

    pub fn set_controls_use_visibility(&mut self, use_visibility: bool) -> &mut Self {
        self.controls_use_visibility = use_visibility;
        self
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.last_frame.as_ref()
    }

    // -- data -------------------------------------------------------------

    /// Rows from the data callback, or every row of the bound group.
    #[must_use]
    pub fn data(&self) -> Vec<GroupRow> {
        let Some(group) = &self.group else {
            return Vec::new();
        };
        match &self.data_callback {
            Some(callback) => callback(group.as_ref()),
            None => group.all(),
        }
    }

    /// Stable sort by the ordering accessor. Inputs of length <= 1 and
    /// already ordered inputs are returned untouched.
    #[must_use]
    pub fn compute_ordered_groups(&self, mut rows: Vec<GroupRow>) -> Vec<GroupRow> {
        let Some(ordering) = &self.ordering else {
            return rows;
        };
        if rows.len() <= 1 {
            return rows;
        }
        let keys: Vec<Key> = rows.iter().map(|row| ordering.get(row)).collect();
        if keys.windows(2).all(|pair| pair[0] <= pair[1]) {
            return rows;
        }
        let mut indexed: Vec<(Key, GroupRow)> = keys.into_iter().zip(rows.drain(..)).collect();
        indexed.sort_by(|left, right| left.0.cmp(&right.0));
        indexed.into_iter().map(|(_, row)| row).collect()
    }

    // -- filters ----------------------------------------------------------

    pub fn set_filter_policy(&mut self, policy: Rc<dyn FilterPolicy>) -> &mut Self {
        self.filter_policy = policy;
        self
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// First filter in the set.
    #[must_use]
    pub fn filter_value(&self) -> Option<&Filter> {
        self.filters.first()
    }

    /// With `None`, whether any filter is set; otherwise whether `filter` is.
    #[must_use]
    pub fn has_filter(&self, filter: Option<&Filter>) -> bool {
        match filter {
            None => !self.filters.is_empty(),
            Some(filter) => self.filter_policy.has_filter(&self.filters, filter),
        }
    }

    /// Toggles `filter` in the set; `None` clears the set.
    pub fn filter(&mut self, filter: Option<Filter>) {
        let delta = match filter {
            None => {
                self.filter_policy.reset_filter(&mut self.filters);
                Vec::new()
            }
            Some(filter) => {
                self.toggle_one(filter.clone());
                vec![filter]
            }
        };
        self.after_filter_mutation(delta);
    }

    pub fn filter_all(&mut self) {
        self.filter(None);
    }

    /// Toggles every filter in `filters` as one mutation.
    pub fn toggle_filters(&mut self, filters: Vec<Filter>) {
        for filter in &filters {
            self.toggle_one(filter.clone());
        }
        self.after_filter_mutation(filters);
    }

    /// Swaps the set for `filter` (or empties it) with a single apply and
    /// a single notification.
    pub fn replace_filter(&mut self, filter: Option<Filter>) {
        self.filter_policy.reset_filter(&mut self.filters);
        let delta = match filter {
            Some(filter) => {
                self.filter_policy.add_filter(&mut self.filters, filter.clone());
                vec![filter]
            }
            None => Vec::new(),
        };
        self.after_filter_mutation(delta);
    }

    fn toggle_one(&mut self, filter: Filter) {
        if self.filter_policy.has_filter(&self.filters, &filter) {
            self.filter_policy.remove_filter(&mut self.filters, &filter);
        } else {
            self.filter_policy.add_filter(&mut self.filters, filter);
        }
    }

    fn after_filter_mutation(&mut self, delta: Vec<Filter>) {
        if let Some(dimension) = &self.dimension {
            self.filter_policy.apply(dimension.as_ref(), &self.filters);
        }
        self.controls_visible = !self.filters.is_empty();
        trace!(chart = %self.id, count = self.filters.len(), "filter set changed");
        self.emit(&ChartEvent::Filtered { delta });
    }
}
