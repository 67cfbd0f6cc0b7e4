use std::cell::RefCell;
use std::rc::Rc;

use linked_charts::api::{Chart, ChartEvent, ChartEventKind, Dashboard, DashboardSettings};
use linked_charts::charts::{PieChart, TreeMap};
use linked_charts::core::{Anchor, ChartId, Filter, Key, MemoryCrossfilter};
use linked_charts::render::NullRenderer;
use linked_charts::ChartError;

type Sale = (&'static str, &'static str, f64);

fn sales() -> MemoryCrossfilter<Sale> {
    MemoryCrossfilter::new(vec![
        ("east", "a", 30.0),
        ("east", "b", 10.0),
        ("west", "c", 60.0),
    ])
}

fn tree_map(data: &MemoryCrossfilter<Sale>) -> TreeMap {
    let region = data.dimension(|(region, _, _): &Sale| Key::text(*region));
    let store = data.dimension(|(_, store, _): &Sale| Key::text(*store));
    let path = data.dimension(|(region, store, _): &Sale| {
        Key::Composite(vec![Key::text(*region), Key::text(*store)])
    });
    let mut chart = TreeMap::new();
    chart
        .hierarchy_mixin_mut()
        .add_level("region", region)
        .add_level("store", store);
    chart
        .base_mut()
        .set_group(path.group_sum(|(_, _, amount): &Sale| *amount), "sales");
    chart
}

fn store_pie(data: &MemoryCrossfilter<Sale>) -> PieChart {
    let store = data.dimension(|(_, store, _): &Sale| Key::text(*store));
    let mut chart = PieChart::new();
    chart
        .base_mut()
        .set_dimension(store.clone())
        .set_group(store.group_sum(|(_, _, amount): &Sale| *amount), "stores");
    chart
}

fn dashboard() -> Dashboard<NullRenderer> {
    Dashboard::with_settings(
        NullRenderer::default(),
        DashboardSettings::default().with_disable_transitions(true),
    )
}

fn store_values(dashboard: &Dashboard<NullRenderer>, pie: ChartId) -> Vec<f64> {
    dashboard
        .chart(pie)
        .expect("pie")
        .data()
        .into_iter()
        .map(|row| row.value.number())
        .collect()
}

#[test]
fn levels_filter_independently() {
    let data = sales();
    let mut dashboard = dashboard();
    let tree = dashboard.anchor(tree_map(&data), Anchor::new("#tree"), None);

    dashboard.hierarchy_filter(tree, "region", "east").expect("region");
    dashboard.hierarchy_filter(tree, "store", "a").expect("store");
    assert!(dashboard.hierarchy_has_filter(tree, "region", &Key::text("east")).expect("east"));
    assert!(dashboard.hierarchy_has_filter(tree, "store", &Key::text("a")).expect("a"));
    assert_eq!(data.selected_size(), 1);

    dashboard
        .hierarchy_filter_all_for_level(tree, "store")
        .expect("clear store");
    assert_eq!(
        dashboard.hierarchy_filters(tree, "region").expect("region"),
        vec![Key::text("east")]
    );
    assert!(dashboard.hierarchy_filters(tree, "store").expect("store").is_empty());
    assert_eq!(data.selected_size(), 2);

    dashboard.hierarchy_filter_all(tree).expect("clear all");
    assert!(!dashboard.hierarchy_has_any_filter(tree).expect("any"));
    assert_eq!(data.selected_size(), data.size());
}

#[test]
fn toggling_the_same_value_twice_clears_it() {
    let data = sales();
    let mut dashboard = dashboard();
    let tree = dashboard.anchor(tree_map(&data), Anchor::new("#tree"), None);

    dashboard.hierarchy_filter(tree, "store", "a").expect("add");
    dashboard.hierarchy_filter(tree, "store", "b").expect("add");
    assert_eq!(data.selected_size(), 2);
    dashboard.hierarchy_filter(tree, "store", "a").expect("remove");
    assert_eq!(
        dashboard.hierarchy_filters(tree, "store").expect("store"),
        vec![Key::text("b")]
    );
    assert_eq!(data.selected_size(), 1);
}

#[test]
fn replace_clears_the_column_first() {
    let data = sales();
    let mut dashboard = dashboard();
    let tree = dashboard.anchor(tree_map(&data), Anchor::new("#tree"), None);

    dashboard.hierarchy_filter(tree, "store", "a").expect("a");
    dashboard.hierarchy_filter(tree, "store", "b").expect("b");
    dashboard
        .hierarchy_replace_filter(tree, "store", "c")
        .expect("replace");
    assert_eq!(
        dashboard.hierarchy_filters(tree, "store").expect("store"),
        vec![Key::text("c")]
    );
}

#[test]
fn hierarchy_changes_notify_and_toggle_controls() {
    let data = sales();
    let deltas = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&deltas);
    let mut chart = tree_map(&data);
    chart
        .base_mut()
        .on(ChartEventKind::Filtered, "spy", move |_, event| {
            if let ChartEvent::Filtered { delta } = event {
                seen.borrow_mut().push(delta.clone());
            }
        });
    let mut dashboard = dashboard();
    let tree = dashboard.anchor(chart, Anchor::new("#tree"), None);

    dashboard.hierarchy_filter(tree, "region", "west").expect("west");
    assert!(dashboard.chart(tree).expect("tree").base().controls_visible());
    dashboard.hierarchy_filter_all(tree).expect("clear");
    assert!(!dashboard.chart(tree).expect("tree").base().controls_visible());

    assert_eq!(
        *deltas.borrow(),
        vec![vec![Filter::value("west")], Vec::new()]
    );
}

#[test]
fn node_click_filters_its_level_and_redraws_the_group() {
    let data = sales();
    let mut dashboard = dashboard();
    let tree = dashboard.anchor(tree_map(&data), Anchor::new("#tree"), None);
    let pie = dashboard.anchor(store_pie(&data), Anchor::new("#pie"), None);
    dashboard.render_all(None).expect("render");

    dashboard
        .hierarchy_click(tree, 0, Key::text("east"))
        .expect("click");
    assert_eq!(
        dashboard.hierarchy_filters(tree, "region").expect("region"),
        vec![Key::text("east")]
    );
    assert_eq!(dashboard.renderer().calls_for("#pie").len(), 2);
    assert_eq!(store_values(&dashboard, pie), vec![30.0, 10.0, 0.0]);

    let err = dashboard
        .hierarchy_click(tree, 5, Key::text("east"))
        .expect_err("no such level");
    assert!(format!("{err}").contains("no hierarchy level 5"));
}

#[test]
fn charts_without_levels_reject_hierarchy_calls() {
    let data = sales();
    let mut dashboard = dashboard();
    let pie = dashboard.anchor(store_pie(&data), Anchor::new("#pie"), None);

    let err = dashboard
        .hierarchy_filter(pie, "region", "east")
        .expect_err("pie has no levels");
    assert!(matches!(
        err,
        ChartError::CapabilityMissing {
            capability: "hierarchy",
            ..
        }
    ));
    assert!(dashboard.hierarchy_has_any_filter(pie).is_err());
}
