use std::any::Any;

use indexmap::IndexMap;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{Filter, GroupRow, Key, Size};
use crate::error::ChartResult;
use crate::mixins::{ColorMixin, HierarchyMixin, Margins};
use crate::render::{MarkTag, RectPrimitive, RenderFrame, TextPrimitive};

/// One laid out rectangle. `path` holds the keys from the root level down
/// to this node; its length minus one is the node's level.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeMapNode {
    pub path: Vec<Key>,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TreeMapNode {
    #[must_use]
    pub fn level(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Slice-and-dice tree map over composite path keys, one path component
/// per hierarchy level. Level 0 slices horizontally, level 1 vertically,
/// and so on. Node clicks go through `Dashboard::hierarchy_click`.
#[derive(Debug)]
pub struct TreeMap {
    base: BaseChart,
    hierarchy: HierarchyMixin,
    colors: ColorMixin,
    margins: Margins,
    nodes: Vec<TreeMapNode>,
}

impl Default for TreeMap {
    fn default() -> Self {
        Self::new()
    }
}

type PathRow = (Vec<Key>, f64);

fn path_of(key: Key) -> Vec<Key> {
    match key {
        Key::Composite(parts) => parts,
        key => vec![key],
    }
}

fn slice_and_dice(
    entries: &[PathRow],
    prefix: &[Key],
    (x, y, width, height): (f64, f64, f64, f64),
    out: &mut Vec<TreeMapNode>,
) {
    let depth = prefix.len();
    let mut children: IndexMap<Key, Vec<PathRow>> = IndexMap::new();
    for (path, value) in entries {
        if let Some(key) = path.get(depth) {
            children
                .entry(key.clone())
                .or_default()
                .push((path.clone(), *value));
        }
    }
    let totals: Vec<f64> = children
        .values()
        .map(|rows| rows.iter().map(|(_, value)| value).sum())
        .collect();
    let total: f64 = totals.iter().sum();
    if total <= 0.0 {
        return;
    }

    let horizontal = depth % 2 == 0;
    let mut offset = 0.0;
    for ((key, rows), value) in children.into_iter().zip(totals) {
        if value <= 0.0 {
            continue;
        }
        let share = value / total;
        let rect = if horizontal {
            (x + offset * width, y, share * width, height)
        } else {
            (x, y + offset * height, width, share * height)
        };
        offset += share;
        let mut path = prefix.to_vec();
        path.push(key);
        out.push(TreeMapNode {
            path: path.clone(),
            value,
            x: rect.0,
            y: rect.1,
            width: rect.2,
            height: rect.3,
        });
        slice_and_dice(&rows, &path, rect, out);
    }
}

impl TreeMap {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseChart::new(&[MandatoryAttribute::Group, MandatoryAttribute::Levels]),
            hierarchy: HierarchyMixin::default(),
            colors: ColorMixin::default(),
            margins: Margins::uniform(0.0),
            nodes: Vec::new(),
        }
    }

    pub fn hierarchy_mixin_mut(&mut self) -> &mut HierarchyMixin {
        &mut self.hierarchy
    }

    pub fn colors_mut(&mut self) -> &mut ColorMixin {
        &mut self.colors
    }

    /// Nodes of the last draw, parents before their children.
    #[must_use]
    pub fn nodes(&self) -> &[TreeMapNode] {
        &self.nodes
    }

    /// A node is selected when, at every level of its path that has
    /// filters, its key is one of them.
    #[must_use]
    pub fn is_node_selected(&self, path: &[Key]) -> bool {
        self.hierarchy
            .levels()
            .iter()
            .zip(path)
            .all(|(level, key)| {
                let filters = self.hierarchy.filters_for(&level.column);
                filters.is_empty() || filters.contains(key)
            })
    }
}

impl Chart for TreeMap {
    fn kind(&self) -> &'static str {
        "tree-map"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let key_accessor = self.base.key_accessor().clone();
        let value_accessor = self.base.value_accessor().clone();
        let entries: Vec<PathRow> = self
            .base
            .data()
            .iter()
            .map(|row| (path_of(key_accessor.get(row)), value_accessor.get(row)))
            .filter(|(_, value)| value.is_finite())
            .collect();

        let mut nodes = Vec::new();
        slice_and_dice(
            &entries,
            &[],
            (
                self.margins.left,
                self.margins.top,
                self.margins.effective_width(size.width),
                self.margins.effective_height(size.height),
            ),
            &mut nodes,
        );

        let mut frame = RenderFrame::new(size);
        for node in &nodes {
            let fill = self.colors.color_for_key(&node.path[0]);
            let tag = MarkTag {
                key: Some(Key::Composite(node.path.clone())),
                deselected: !self.is_node_selected(&node.path),
            };
            frame.rects.push(
                RectPrimitive::new(node.x, node.y, node.width, node.height, fill).with_tag(tag),
            );
            if self.base.render_label() && node.path.len() == self.hierarchy.levels().len() {
                if let Some(leaf) = node.path.last() {
                    frame.texts.push(TextPrimitive::label(
                        leaf.to_string(),
                        node.x + node.width / 2.0,
                        node.y + node.height / 2.0,
                    ));
                }
            }
        }
        self.nodes = nodes;
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
