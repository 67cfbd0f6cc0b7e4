use std::cell::RefCell;
use std::rc::Rc;

use linked_charts::api::{Chart, Dashboard, DashboardSettings};
use linked_charts::charts::{HeatMap, HeatMapAxis, PieChart, RowChart};
use linked_charts::core::{Anchor, Filter, GroupRow, Key, MemoryCrossfilter, TwoDimensionalFilter};
use linked_charts::render::NullRenderer;

#[derive(Debug, Clone)]
struct Sale {
    fruit: &'static str,
    store: &'static str,
    amount: f64,
}

fn sales() -> MemoryCrossfilter<Sale> {
    let sale = |fruit, store, amount| Sale {
        fruit,
        store,
        amount,
    };
    MemoryCrossfilter::new(vec![
        sale("apple", "north", 5.0),
        sale("apple", "south", 2.0),
        sale("pear", "north", 3.0),
        sale("plum", "south", 1.0),
        sale("kiwi", "south", 1.0),
    ])
}

fn dashboard() -> Dashboard<NullRenderer> {
    Dashboard::with_settings(
        NullRenderer::default(),
        DashboardSettings::default().with_disable_transitions(true),
    )
}

fn fruit_pie(data: &MemoryCrossfilter<Sale>) -> PieChart {
    let dimension = data.dimension(|sale: &Sale| Key::text(sale.fruit));
    let mut chart = PieChart::new();
    chart
        .base_mut()
        .set_dimension(dimension.clone())
        .set_group(dimension.group_sum(|sale: &Sale| sale.amount), "fruit");
    chart
}

fn store_rows(data: &MemoryCrossfilter<Sale>) -> RowChart {
    let dimension = data.dimension(|sale: &Sale| Key::text(sale.store));
    let mut chart = RowChart::new();
    chart
        .base_mut()
        .set_dimension(dimension.clone())
        .set_group(dimension.group_sum(|sale: &Sale| sale.amount), "store");
    chart
}

#[test]
fn click_redraws_every_chart_of_the_group_once() {
    let data = sales();
    let mut dashboard = dashboard();
    let pie = dashboard.anchor(fruit_pie(&data), Anchor::new("#pie"), Some("sales"));
    let rows = dashboard.anchor(store_rows(&data), Anchor::new("#rows"), Some("sales"));
    let other = dashboard.anchor(fruit_pie(&data), Anchor::new("#elsewhere"), Some("other"));
    dashboard.render_all(Some("sales")).expect("render");
    dashboard.render_all(Some("other")).expect("render");
    let before = dashboard.renderer().calls.len();

    dashboard
        .click(pie, &GroupRow::new("pear", 3.0))
        .expect("click");

    let renderer = dashboard.renderer();
    assert_eq!(renderer.calls.len(), before + 2);
    assert_eq!(renderer.calls_for("#pie").len(), 2);
    assert_eq!(renderer.calls_for("#rows").len(), 2);
    assert_eq!(renderer.calls_for("#elsewhere").len(), 1);
    assert!(dashboard.has_filter(pie, Some(&Filter::value("pear"))).expect("pie"));
    assert!(!dashboard.has_filter(rows, None).expect("rows"));
    assert!(!dashboard.has_filter(other, None).expect("other"));

    let store_values: Vec<(Key, f64)> = dashboard
        .chart(rows)
        .expect("rows")
        .data()
        .into_iter()
        .map(|row| (row.key, row.value.number()))
        .collect();
    assert_eq!(
        store_values,
        vec![(Key::text("north"), 3.0), (Key::text("south"), 0.0)]
    );
}

#[test]
fn group_hooks_run_after_the_group_draw() {
    let data = sales();
    let mut dashboard = dashboard();
    dashboard.anchor(fruit_pie(&data), Anchor::new("#pie"), Some("sales"));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let hook_seen = Rc::clone(&seen);
    dashboard.set_redraw_hook(Some(Box::new(move |group: &str| {
        hook_seen.borrow_mut().push(group.to_owned());
    })));

    dashboard.redraw_all(Some("sales")).expect("redraw");
    dashboard.render_all(Some("sales")).expect("render");
    assert_eq!(*seen.borrow(), vec!["sales".to_owned()]);
}

#[test]
fn one_failing_chart_does_not_stop_the_group() {
    let data = sales();
    let mut dashboard = dashboard();
    dashboard.anchor(PieChart::new(), Anchor::new("#unbound"), None);
    dashboard.anchor(fruit_pie(&data), Anchor::new("#pie"), None);

    let err = dashboard.render_all(None).expect_err("unbound pie");
    assert!(format!("{err}").contains("#unbound"));
    assert_eq!(dashboard.renderer().calls_for("#pie").len(), 1);
}

#[test]
fn clicking_others_toggles_every_folded_key() {
    let data = sales();
    let mut pie = fruit_pie(&data);
    pie.cap_mixin_mut().set_cap(Some(2));
    let mut dashboard = dashboard();
    let id = dashboard.anchor(pie, Anchor::new("#pie"), None);
    dashboard.render(id).expect("render");

    let others = dashboard
        .downcast::<PieChart>(id)
        .expect("pie")
        .slice("Others")
        .cloned()
        .expect("others slice");
    assert_eq!(others.value.number(), 2.0);

    dashboard.click(id, &others).expect("click others");
    let filters = dashboard.filters(id).expect("filters");
    assert_eq!(filters, vec![Filter::value("kiwi"), Filter::value("plum")]);

    dashboard.click(id, &others).expect("click others again");
    assert!(dashboard.filters(id).expect("filters").is_empty());
}

#[test]
fn filter_all_clears_every_chart_of_the_group() {
    let data = sales();
    let mut dashboard = dashboard();
    let pie = dashboard.anchor(fruit_pie(&data), Anchor::new("#pie"), None);
    let rows = dashboard.anchor(store_rows(&data), Anchor::new("#rows"), None);
    dashboard.filter(pie, Some(Filter::value("apple"))).expect("pie");
    dashboard.filter(rows, Some(Filter::value("north"))).expect("rows");

    dashboard.filter_all(None).expect("filter all");
    assert!(!dashboard.has_filter(pie, None).expect("pie"));
    assert!(!dashboard.has_filter(rows, None).expect("rows"));
    assert_eq!(data.selected_size(), data.size());
}

#[test]
fn legend_click_filters_non_stacked_charts() {
    let data = sales();
    let mut dashboard = dashboard();
    let pie = dashboard.anchor(fruit_pie(&data), Anchor::new("#pie"), None);

    dashboard.legend_toggle(pie, "plum").expect("legend");
    assert_eq!(
        dashboard.filters(pie).expect("filters"),
        vec![Filter::value("plum")]
    );
    dashboard.legend_toggle(pie, "mango").expect("unknown item");
    assert_eq!(dashboard.filters(pie).expect("filters").len(), 1);
}

#[test]
fn heat_map_axis_click_selects_then_clears_a_column() {
    let data = MemoryCrossfilter::new(vec![(1_i64, 1_i64), (1, 2), (2, 1)]);
    let dimension = data.dimension(|(column, row): &(i64, i64)| {
        Key::pair(Key::from(*column), Key::from(*row))
    });
    let mut chart = HeatMap::new();
    chart
        .base_mut()
        .set_dimension(dimension.clone())
        .set_group(dimension.group_count(), "cells");
    let mut dashboard = dashboard();
    let id = dashboard.anchor(chart, Anchor::new("#heat"), None);

    let cell = |column: i64, row: i64| {
        Filter::TwoDimensional(TwoDimensionalFilter::new(column, row))
    };
    dashboard
        .toggle_heat_map_axis(id, HeatMapAxis::Column, &Key::from(1_i64))
        .expect("select column");
    assert_eq!(dashboard.filters(id).expect("filters"), vec![cell(1, 1), cell(1, 2)]);

    dashboard
        .toggle_heat_map_axis(id, HeatMapAxis::Column, &Key::from(1_i64))
        .expect("clear column");
    assert!(dashboard.filters(id).expect("filters").is_empty());

    let pie = dashboard.anchor(PieChart::new(), Anchor::new("#pie"), None);
    let err = dashboard
        .toggle_heat_map_axis(pie, HeatMapAxis::Row, &Key::from(1_i64))
        .expect_err("not a heat map");
    assert!(format!("{err}").contains("heat map axis"));
}
