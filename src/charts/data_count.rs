use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{RecordCount, Size};
use crate::error::ChartResult;
use crate::render::{RenderFrame, TextPrimitive};

const FILTER_COUNT: &str = "%filter-count";
const TOTAL_COUNT: &str = "%total-count";
const DEFAULT_TEMPLATE: &str = "%filter-count selected out of %total-count records";

/// "n of N selected" widget over a record counter.
///
/// `all` is used while nothing is filtered out, `some` otherwise; either
/// falls back to the default sentence.
pub struct DataCount {
    base: BaseChart,
    counter: Option<Rc<dyn RecordCount>>,
    some: Option<String>,
    all: Option<String>,
    counts: Option<(usize, usize)>,
}

impl fmt::Debug for DataCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataCount")
            .field("base", &self.base)
            .field("has_counter", &self.counter.is_some())
            .field("some", &self.some)
            .field("all", &self.all)
            .finish_non_exhaustive()
    }
}

impl Default for DataCount {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCount {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseChart::new(&[MandatoryAttribute::Counter]),
            counter: None,
            some: None,
            all: None,
            counts: None,
        }
    }

    pub fn set_counter(&mut self, counter: Rc<dyn RecordCount>) -> &mut Self {
        self.counter = Some(counter);
        self
    }

    pub fn set_templates(&mut self, some: Option<String>, all: Option<String>) -> &mut Self {
        self.some = some;
        self.all = all;
        self
    }

    /// `(selected, total)` of the last draw.
    #[must_use]
    pub fn counts(&self) -> Option<(usize, usize)> {
        self.counts
    }

    #[must_use]
    pub fn display_text(&self, selected: usize, total: usize) -> String {
        let template = if selected == total {
            self.all.as_deref()
        } else {
            self.some.as_deref()
        };
        template
            .unwrap_or(DEFAULT_TEMPLATE)
            .replace(FILTER_COUNT, &selected.to_string())
            .replace(TOTAL_COUNT, &total.to_string())
    }
}

impl Chart for DataCount {
    fn kind(&self) -> &'static str {
        "data-count"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let (selected, total) = self
            .counter
            .as_ref()
            .map_or((0, 0), |counter| (counter.selected(), counter.total()));
        self.counts = Some((selected, total));
        let text = TextPrimitive::label(
            self.display_text(selected, total),
            size.width / 2.0,
            size.height / 2.0,
        );
        Ok(RenderFrame::new(size).with_text(text))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn has_attribute(&self, attribute: MandatoryAttribute) -> bool {
        match attribute {
            MandatoryAttribute::Counter => self.counter.is_some(),
            MandatoryAttribute::Dimension => self.base.dimension().is_some(),
            MandatoryAttribute::Group => self.base.group().is_some(),
            MandatoryAttribute::XScale | MandatoryAttribute::Levels => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::DataCount;
    use crate::api::{Chart, DrawPass, MandatoryAttribute};
    use crate::core::{Filter, Key, MemoryCrossfilter, Size};

    #[test]
    fn counts_follow_dimension_filters() {
        let data = MemoryCrossfilter::new(vec![1.0, 2.0, 3.0, 4.0]);
        let dimension = data.dimension(|value: &f64| Key::number(*value));
        let mut chart = DataCount::new();
        assert!(!chart.has_attribute(MandatoryAttribute::Counter));
        chart.set_counter(Rc::new(data.clone()));
        assert!(chart.has_attribute(MandatoryAttribute::Counter));

        let frame = chart
            .draw(DrawPass::Render, Size::new(200.0, 20.0))
            .expect("draw");
        assert_eq!(frame.texts[0].text, "4 selected out of 4 records");

        let mut filtering = crate::api::BaseChart::new(&[]);
        filtering.set_dimension(dimension);
        filtering.filter(Some(Filter::range(1.0, 3.0)));
        chart.draw(DrawPass::Redraw, Size::new(200.0, 20.0)).expect("draw");
        assert_eq!(chart.counts(), Some((2, 4)));
    }

    #[test]
    fn all_template_applies_when_nothing_is_filtered_out() {
        let mut chart = DataCount::new();
        chart.set_templates(
            Some("%filter-count of %total-count".to_owned()),
            Some("All %total-count".to_owned()),
        );
        assert_eq!(chart.display_text(10, 10), "All 10");
        assert_eq!(chart.display_text(3, 10), "3 of 10");
    }
}
