use std::any::Any;

use indexmap::IndexMap;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{Filter, GroupRow, Key, Size};
use crate::error::ChartResult;
use crate::mixins::{ColorMixin, HierarchyMixin, Margins};
use crate::render::{Color, MarkTag, PathPrimitive, RectPrimitive, RenderFrame, TextPrimitive};

const DEFAULT_NODE_WIDTH: f64 = 15.0;
const DEFAULT_NODE_PADDING: f64 = 10.0;
const LINK_ALPHA: f64 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyNode {
    pub level: usize,
    pub key: Key,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Flow diagram over composite path keys: one column of nodes per
/// hierarchy level, links between consecutive path components.
///
/// Node marks are tagged `[level, key]`; a node click maps to
/// `Dashboard::hierarchy_click(id, level, key)`.
#[derive(Debug)]
pub struct SankeyChart {
    base: BaseChart,
    hierarchy: HierarchyMixin,
    colors: ColorMixin,
    margins: Margins,
    node_width: f64,
    node_padding: f64,
    nodes: Vec<SankeyNode>,
    links: Vec<SankeyLink>,
}

impl Default for SankeyChart {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag of the node for `key` at `level`.
#[must_use]
pub fn node_tag_key(level: usize, key: Key) -> Key {
    Key::pair(Key::number(level as f64), key)
}

impl SankeyChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseChart::new(&[MandatoryAttribute::Group, MandatoryAttribute::Levels]),
            hierarchy: HierarchyMixin::default(),
            colors: ColorMixin::default(),
            margins: Margins::uniform(DEFAULT_NODE_PADDING),
            node_width: DEFAULT_NODE_WIDTH,
            node_padding: DEFAULT_NODE_PADDING,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn hierarchy_mixin_mut(&mut self) -> &mut HierarchyMixin {
        &mut self.hierarchy
    }

    pub fn colors_mut(&mut self) -> &mut ColorMixin {
        &mut self.colors
    }

    pub fn set_node_width(&mut self, width: f64) -> &mut Self {
        self.node_width = width.max(1.0);
        self
    }

    pub fn set_node_padding(&mut self, padding: f64) -> &mut Self {
        self.node_padding = padding.max(0.0);
        self
    }

    #[must_use]
    pub fn nodes(&self) -> &[SankeyNode] {
        &self.nodes
    }

    #[must_use]
    pub fn links(&self) -> &[SankeyLink] {
        &self.links
    }

    fn is_node_selected(&self, node: &SankeyNode) -> bool {
        self.hierarchy.levels().get(node.level).is_none_or(|level| {
            let filters = self.hierarchy.filters_for(&level.column);
            filters.is_empty() || filters.contains(&node.key)
        })
    }

    /// Aggregates flows into per-level nodes and links between consecutive
    /// levels, both in first-seen order.
    fn build_graph(&self) -> (Vec<SankeyNode>, Vec<SankeyLink>) {
        let key_accessor = self.base.key_accessor();
        let value_accessor = self.base.value_accessor();
        let mut node_index: IndexMap<(usize, Key), f64> = IndexMap::new();
        let mut link_index: IndexMap<(usize, usize), f64> = IndexMap::new();

        for row in self.base.data() {
            let value = value_accessor.get(&row);
            if !(value.is_finite() && value > 0.0) {
                continue;
            }
            let path = match key_accessor.get(&row) {
                Key::Composite(parts) => parts,
                key => vec![key],
            };
            let mut previous = None;
            for (level, key) in path.into_iter().enumerate() {
                let entry = node_index.entry((level, key));
                let index = entry.index();
                *entry.or_insert(0.0) += value;
                if let Some(source) = previous {
                    *link_index.entry((source, index)).or_insert(0.0) += value;
                }
                previous = Some(index);
            }
        }

        let nodes = node_index
            .into_iter()
            .map(|((level, key), value)| SankeyNode {
                level,
                key,
                value,
                x: 0.0,
                y: 0.0,
                height: 0.0,
            })
            .collect();
        let links = link_index
            .into_iter()
            .map(|((source, target), value)| SankeyLink {
                source,
                target,
                value,
            })
            .collect();
        (nodes, links)
    }

    /// Columns are spread evenly across the width; node heights share one
    /// value-to-pixel ratio so that the fullest column fits the height.
    fn layout(&self, nodes: &mut [SankeyNode], size: Size) {
        let levels = nodes.iter().map(|node| node.level + 1).max().unwrap_or(0);
        if levels == 0 {
            return;
        }
        let width = self.margins.effective_width(size.width);
        let height = self.margins.effective_height(size.height);
        let mut column_totals = vec![0.0; levels];
        let mut column_counts = vec![0usize; levels];
        for node in nodes.iter() {
            column_totals[node.level] += node.value;
            column_counts[node.level] += 1;
        }
        let ratio = column_totals
            .iter()
            .zip(&column_counts)
            .map(|(total, count)| {
                let free = height - self.node_padding * count.saturating_sub(1) as f64;
                if *total > 0.0 { free.max(0.0) / total } else { f64::INFINITY }
            })
            .fold(f64::INFINITY, f64::min);
        let ratio = if ratio.is_finite() { ratio } else { 0.0 };
        let column_step = if levels > 1 {
            (width - self.node_width).max(0.0) / (levels - 1) as f64
        } else {
            0.0
        };

        let mut cursors = vec![self.margins.top; levels];
        for node in nodes.iter_mut() {
            node.x = self.margins.left + node.level as f64 * column_step;
            node.y = cursors[node.level];
            node.height = node.value * ratio;
            cursors[node.level] += node.height + self.node_padding;
        }
    }

    /// Cubic link from the source's right edge to the target's left edge,
    /// `offsets` down from the top of each node.
    fn link_path(
        &self,
        source: &SankeyNode,
        target: &SankeyNode,
        thickness: f64,
        offsets: (f64, f64),
    ) -> PathPrimitive {
        let x0 = source.x + self.node_width;
        let x1 = target.x;
        let y0 = source.y + offsets.0 + thickness / 2.0;
        let y1 = target.y + offsets.1 + thickness / 2.0;
        let middle = (x0 + x1) / 2.0;
        PathPrimitive::new(format!(
            "M{x0:.2},{y0:.2}C{middle:.2},{y0:.2} {middle:.2},{y1:.2} {x1:.2},{y1:.2}"
        ))
        .with_stroke(Color::rgba(0.5, 0.5, 0.5, LINK_ALPHA), thickness.max(1.0))
    }
}

fn link_thickness(source: &SankeyNode, link: &SankeyLink) -> f64 {
    if source.value > 0.0 {
        source.height * link.value / source.value
    } else {
        0.0
    }
}

impl Chart for SankeyChart {
    fn kind(&self) -> &'static str {
        "sankey"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let (mut nodes, links) = self.build_graph();
        self.layout(&mut nodes, size);

        let mut frame = RenderFrame::new(size);
        let mut out_offsets = vec![0.0; nodes.len()];
        let mut in_offsets = vec![0.0; nodes.len()];
        for link in &links {
            let (source, target) = (&nodes[link.source], &nodes[link.target]);
            let thickness = link_thickness(source, link);
            frame.paths.push(self.link_path(
                source,
                target,
                thickness,
                (out_offsets[link.source], in_offsets[link.target]),
            ));
            out_offsets[link.source] += thickness;
            in_offsets[link.target] += thickness;
        }
        for node in &nodes {
            let fill = self.colors.color_for_key(&node.key);
            let tag = MarkTag {
                key: Some(node_tag_key(node.level, node.key.clone())),
                deselected: !self.is_node_selected(node),
            };
            frame.rects.push(
                RectPrimitive::new(node.x, node.y, self.node_width, node.height, fill)
                    .with_tag(tag),
            );
            if self.base.render_label() {
                frame.texts.push(TextPrimitive::label(
                    node.key.to_string(),
                    node.x + self.node_width / 2.0,
                    node.y + node.height / 2.0,
                ));
            }
        }
        self.nodes = nodes;
        self.links = links;
        Ok(frame)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn hierarchy(&self) -> Option<&HierarchyMixin> {
        Some(&self.hierarchy)
    }

    fn hierarchy_mut(&mut self) -> Option<&mut HierarchyMixin> {
        Some(&mut self.hierarchy)
    }

    fn set_margins(&mut self, margins: Margins) -> bool {
        self.margins = margins;
        true
    }

    fn click_filters(&self, _row: &GroupRow) -> Vec<Filter> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{SankeyChart, node_tag_key};
    use crate::api::{Chart, DrawPass};
    use crate::core::{Key, MemoryCrossfilter, Size};

    type Flow = (&'static str, &'static str, f64);

    fn flows() -> MemoryCrossfilter<Flow> {
        MemoryCrossfilter::new(vec![
            ("coal", "power", 30.0),
            ("gas", "power", 10.0),
            ("gas", "heat", 20.0),
        ])
    }

    /// Levels are bound to dimensions of `levels`, which may or may not be
    /// the crossfilter feeding the flow group.
    fn sankey(data: &MemoryCrossfilter<Flow>, levels: &MemoryCrossfilter<Flow>) -> SankeyChart {
        let source = levels.dimension(|(source, _, _): &Flow| Key::text(*source));
        let target = levels.dimension(|(_, target, _): &Flow| Key::text(*target));
        let flow = data.dimension(|(source, target, _): &Flow| {
            Key::pair(Key::text(*source), Key::text(*target))
        });
        let mut chart = SankeyChart::new();
        chart
            .hierarchy_mixin_mut()
            .add_level("source", source)
            .add_level("target", target);
        chart
            .base_mut()
            .set_group(flow.group_sum(|(_, _, amount): &Flow| *amount), "flows");
        chart
    }

    #[test]
    fn aggregates_nodes_and_links_per_level() {
        let data = flows();
        let mut chart = sankey(&data, &data);
        let frame = chart
            .draw(DrawPass::Render, Size::new(200.0, 100.0))
            .expect("draw");
        assert_eq!(chart.nodes().len(), 4);
        assert_eq!(chart.links().len(), 3);
        let power = chart
            .nodes()
            .iter()
            .find(|node| node.level == 1 && node.key == Key::text("power"))
            .expect("power node");
        assert_relative_eq!(power.value, 40.0);
        assert_eq!(frame.rects.len(), 4);
        assert_eq!(frame.paths.len(), 3);
    }

    #[test]
    fn level_filter_removes_unselected_flows() {
        let data = flows();
        let mut chart = sankey(&data, &data);
        chart
            .hierarchy_mixin_mut()
            .filter("target", Key::text("heat"));
        chart
            .draw(DrawPass::Render, Size::new(200.0, 100.0))
            .expect("draw");
        let keys: Vec<&Key> = chart.nodes().iter().map(|node| &node.key).collect();
        assert_eq!(keys, vec![&Key::text("gas"), &Key::text("heat")]);
    }

    #[test]
    fn filtered_level_deselects_nodes_on_that_level_only() {
        let levels = flows();
        let mut chart = sankey(&flows(), &levels);
        chart
            .hierarchy_mixin_mut()
            .filter("source", Key::text("gas"));
        let frame = chart
            .draw(DrawPass::Render, Size::new(200.0, 100.0))
            .expect("draw");
        assert_eq!(
            frame.deselected_keys(),
            vec![&node_tag_key(0, Key::text("coal"))]
        );
    }
}
