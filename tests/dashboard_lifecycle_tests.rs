use std::cell::RefCell;
use std::rc::Rc;

use linked_charts::api::{Chart, ChartEvent, ChartEventKind, Dashboard, DashboardSettings};
use linked_charts::charts::{BarChart, DataCount, PieChart};
use linked_charts::core::{Anchor, ChartId, Key, LinearScale, MemoryCrossfilter, XScale};
use linked_charts::render::NullRenderer;

type Events = Rc<RefCell<Vec<(ChartId, ChartEvent)>>>;

fn pie(data: &MemoryCrossfilter<&'static str>) -> PieChart {
    let dimension = data.dimension(|fruit: &&str| Key::text(*fruit));
    let mut chart = PieChart::new();
    chart
        .base_mut()
        .set_dimension(dimension.clone())
        .set_group(dimension.group_count(), "fruit");
    chart
}

fn record(chart: &mut dyn Chart, kind: ChartEventKind, events: &Events) {
    let events = Rc::clone(events);
    chart.base_mut().on(kind, "spy", move |id, event| {
        events.borrow_mut().push((id, event.clone()));
    });
}

#[test]
fn render_fails_on_first_missing_mandatory_attribute() {
    let mut dashboard = Dashboard::new(NullRenderer::default());
    let id = dashboard.anchor(BarChart::new(), Anchor::new("#bars"), None);

    let err = dashboard.render(id).expect_err("nothing bound");
    let message = format!("{err}");
    assert!(message.contains("#bars"));
    assert!(message.contains("dimension"));
    assert!(dashboard.renderer().calls.is_empty());
}

#[test]
fn render_succeeds_once_everything_is_bound() {
    let data = MemoryCrossfilter::new(vec![1.0, 2.0, 2.0]);
    let dimension = data.dimension(|value: &f64| Key::number(*value));
    let mut chart = BarChart::new();
    chart
        .grid_mut()
        .set_x(XScale::Linear(LinearScale::new(0.0, 3.0).expect("scale")));
    chart
        .base_mut()
        .set_dimension(dimension.clone())
        .set_group(dimension.group_count(), "count");

    let mut dashboard = Dashboard::with_settings(
        NullRenderer::default(),
        DashboardSettings::default().with_disable_transitions(true),
    );
    let id = dashboard.anchor(chart, Anchor::new("#bars"), None);
    dashboard.render(id).expect("render");

    let calls = dashboard.renderer().calls_for("#bars");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].rect_count, 2);
    assert!(calls[0].transition.is_instant());
}

#[test]
fn data_count_requires_a_counter() {
    let data = MemoryCrossfilter::new(vec![1, 2, 3]);
    let mut dashboard = Dashboard::new(NullRenderer::default());
    let id = dashboard.anchor(DataCount::new(), Anchor::new("#count"), None);

    let err = dashboard.render(id).expect_err("no counter");
    assert!(format!("{err}").contains("counter"));

    dashboard
        .downcast_mut::<DataCount>(id)
        .expect("data count")
        .set_counter(Rc::new(data));
    dashboard.render(id).expect("render");
}

#[test]
fn instant_draw_runs_post_hooks_before_returning() {
    let data = MemoryCrossfilter::new(vec!["apple", "pear"]);
    let events: Events = Rc::default();
    let renderlet_runs = Rc::new(RefCell::new(0));
    let mut chart = pie(&data);
    record(&mut chart, ChartEventKind::PreRender, &events);
    record(&mut chart, ChartEventKind::PostRender, &events);
    let runs = Rc::clone(&renderlet_runs);
    chart.base_mut().add_renderlet(move |context| {
        assert!(!context.frame.paths.is_empty());
        *runs.borrow_mut() += 1;
    });

    let mut dashboard = Dashboard::new(NullRenderer::default());
    dashboard.set_disable_transitions(true);
    let id = dashboard.anchor(chart, Anchor::new("#pie"), None);
    dashboard.render(id).expect("render");

    let kinds: Vec<ChartEventKind> = events.borrow().iter().map(|(_, event)| event.kind()).collect();
    assert_eq!(kinds, vec![ChartEventKind::PreRender, ChartEventKind::PostRender]);
    assert_eq!(*renderlet_runs.borrow(), 1);
    assert_eq!(dashboard.pending_tasks(), 0);
}

#[test]
fn animated_draw_settles_after_the_transition() {
    let data = MemoryCrossfilter::new(vec!["apple"]);
    let events: Events = Rc::default();
    let mut chart = pie(&data);
    chart.base_mut().set_transition_duration_ms(300);
    record(&mut chart, ChartEventKind::PostRedraw, &events);

    let mut dashboard = Dashboard::new(NullRenderer::default());
    let id = dashboard.anchor(chart, Anchor::new("#pie"), None);
    dashboard.redraw(id).expect("redraw");
    assert!(events.borrow().is_empty());

    dashboard.advance_by(299).expect("advance");
    assert!(events.borrow().is_empty());
    dashboard.advance_by(1).expect("advance");
    assert_eq!(events.borrow().len(), 1);
    assert_eq!(events.borrow()[0], (id, ChartEvent::PostRedraw));
}

#[test]
fn superseded_draw_does_not_fire_post_hooks() {
    let data = MemoryCrossfilter::new(vec!["apple"]);
    let events: Events = Rc::default();
    let mut chart = pie(&data);
    chart.base_mut().set_transition_duration_ms(100);
    record(&mut chart, ChartEventKind::PostRedraw, &events);

    let mut dashboard = Dashboard::new(NullRenderer::default());
    let id = dashboard.anchor(chart, Anchor::new("#pie"), None);
    dashboard.redraw(id).expect("first redraw");
    dashboard.advance_by(50).expect("advance");
    dashboard.redraw(id).expect("second redraw");
    dashboard.advance_by(200).expect("advance");

    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn same_named_listener_replaces_previous_one() {
    let data = MemoryCrossfilter::new(vec!["apple"]);
    let first: Events = Rc::default();
    let second: Events = Rc::default();
    let mut chart = pie(&data);
    record(&mut chart, ChartEventKind::Filtered, &first);
    record(&mut chart, ChartEventKind::Filtered, &second);

    let mut dashboard = Dashboard::new(NullRenderer::default());
    let id = dashboard.anchor(chart, Anchor::new("#pie"), None);
    dashboard
        .filter(id, Some(linked_charts::core::Filter::value("apple")))
        .expect("filter");

    assert!(first.borrow().is_empty());
    assert_eq!(second.borrow().len(), 1);
}

#[test]
fn unknown_chart_is_reported() {
    let mut dashboard = Dashboard::new(NullRenderer::default());
    let id = dashboard.anchor(PieChart::new(), Anchor::new("#pie"), None);
    dashboard.deregister(id).expect("deregister");

    let err = dashboard.render(id).expect_err("gone");
    assert!(format!("{err}").contains("no chart with id"));
}

#[test]
fn deregistering_one_of_two_charts_at_an_anchor_keeps_the_other() {
    let data = MemoryCrossfilter::new(vec!["apple", "pear", "apple"]);
    let mut dashboard = Dashboard::with_settings(
        NullRenderer::default(),
        DashboardSettings::default().with_disable_transitions(true),
    );
    let old = dashboard.anchor(pie(&data), Anchor::new("#slot"), None);
    let new = dashboard.anchor(pie(&data), Anchor::new("#slot"), None);

    dashboard.deregister(new).expect("deregister");
    assert_eq!(dashboard.registry().ids(None), vec![old]);
    assert!(dashboard.contains(old));

    dashboard.render_all(None).expect("render all");
    let calls = dashboard.renderer().calls_for("#slot");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path_count, 2);
}
