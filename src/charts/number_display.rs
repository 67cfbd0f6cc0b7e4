use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::Size;
use crate::error::ChartResult;
use crate::render::{RenderFrame, TextPrimitive};

/// Formats the displayed number.
pub type NumberFormatter = Rc<dyn Fn(f64) -> String>;

const NUMBER_PLACEHOLDER: &str = "%number";
const FONT_SIZE_PX: f64 = 24.0;

/// Optional templates chosen by the displayed value; `%number` is replaced
/// by the formatted number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberTemplates {
    pub one: Option<String>,
    pub zero: Option<String>,
    pub some: Option<String>,
}

/// Single formatted value: the top row of the group read through the
/// value accessor.
pub struct NumberDisplay {
    base: BaseChart,
    formatter: NumberFormatter,
    templates: NumberTemplates,
    value: Option<f64>,
}

impl fmt::Debug for NumberDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberDisplay")
            .field("base", &self.base)
            .field("templates", &self.templates)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl Default for NumberDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseChart::new(&[MandatoryAttribute::Group]),
            formatter: Rc::new(|value| format!("{value:.2}")),
            templates: NumberTemplates::default(),
            value: None,
        }
    }

    pub fn set_formatter(&mut self, formatter: NumberFormatter) -> &mut Self {
        self.formatter = formatter;
        self
    }

    pub fn set_templates(&mut self, templates: NumberTemplates) -> &mut Self {
        self.templates = templates;
        self
    }

    /// Value shown by the last draw.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    fn current_value(&self) -> f64 {
        let rows = match self.base.group() {
            Some(_) if self.base.has_data_callback() => self.base.data(),
            Some(group) => group.top(1),
            None => Vec::new(),
        };
        rows.first()
            .map_or(0.0, |row| self.base.value_accessor().get(row))
    }

    /// Text for `value` after template selection.
    #[must_use]
    pub fn display_text(&self, value: f64) -> String {
        let number = (self.formatter)(value);
        let template = if value == 1.0 {
            self.templates.one.as_ref()
        } else if value == 0.0 {
            self.templates.zero.as_ref()
        } else {
            self.templates.some.as_ref()
        };
        match template {
            Some(template) => template.replace(NUMBER_PLACEHOLDER, &number),
            None => number,
        }
    }
}

impl Chart for NumberDisplay {
    fn kind(&self) -> &'static str {
        "number-display"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let value = self.current_value();
        self.value = Some(value);
        let mut text = TextPrimitive::label(
            self.display_text(value),
            size.width / 2.0,
            size.height / 2.0,
        );
        text.font_size_px = FONT_SIZE_PX;
        Ok(RenderFrame::new(size).with_text(text))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{NumberDisplay, NumberTemplates};
    use crate::api::{Chart, DrawPass};
    use crate::core::{Key, MemoryCrossfilter, Size};

    fn display(values: Vec<f64>) -> NumberDisplay {
        let data = MemoryCrossfilter::new(values);
        let dimension = data.dimension(|value: &f64| Key::number(*value));
        let mut chart = NumberDisplay::new();
        chart
            .base_mut()
            .set_group(dimension.group_sum(|value: &f64| *value), "total");
        chart
    }

    #[test]
    fn shows_the_top_row_value() {
        let mut chart = display(vec![1.0, 4.0, 4.0]);
        let frame = chart
            .draw(DrawPass::Render, Size::new(100.0, 40.0))
            .expect("draw");
        assert_eq!(chart.value(), Some(8.0));
        assert_eq!(frame.texts[0].text, "8.00");
    }

    #[test]
    fn templates_follow_the_value() {
        let mut chart = display(Vec::new());
        chart
            .set_formatter(Rc::new(|value| format!("{value:.0}")))
            .set_templates(NumberTemplates {
                one: Some("%number record".to_owned()),
                zero: Some("no records".to_owned()),
                some: Some("%number records".to_owned()),
            });
        assert_eq!(chart.display_text(0.0), "no records");
        assert_eq!(chart.display_text(1.0), "1 record");
        assert_eq!(chart.display_text(12.0), "12 records");

        let frame = chart
            .draw(DrawPass::Render, Size::new(100.0, 40.0))
            .expect("draw");
        assert_eq!(frame.texts[0].text, "no records");
    }
}
