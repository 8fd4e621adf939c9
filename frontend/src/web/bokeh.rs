//! Bokeh objects seen through the plot traits, via `js_sys::Reflect`.

use crate::plot::{LineDataSource, ModelResolver, PlotCursor, PlotError};
use js_sys::{Array, Function, Reflect};
use shared::GlyphStyle;
use wasm_bindgen::{JsCast, JsValue};

fn get(target: &JsValue, key: &str) -> Result<JsValue, PlotError> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(library_error)
}

fn set(target: &JsValue, key: &str, value: &JsValue) {
    if let Err(error) = Reflect::set(target, &JsValue::from_str(key), value) {
        tracing::warn!("cannot set plot property '{key}': {}", library_error(error));
    }
}

fn library_error(error: JsValue) -> PlotError {
    PlotError::Library(error.as_string().unwrap_or_else(|| format!("{error:?}")))
}

fn is_missing(value: &JsValue) -> bool {
    value.is_null() || value.is_undefined()
}

/// A Bokeh `ColumnDataSource` with `x` and `y` columns.
pub struct BokehLineSource {
    source: JsValue,
}

impl BokehLineSource {
    /// `None` when the page passed no data source.
    pub fn from_js(source: JsValue) -> Option<Self> {
        (!is_missing(&source)).then_some(Self { source })
    }

    fn data(&self) -> Result<JsValue, PlotError> {
        let data = get(&self.source, "data")?;
        if is_missing(&data) {
            return Err(PlotError::Library("line data source has no data".to_string()));
        }
        Ok(data)
    }

    fn column(&self, name: &str) -> Option<Array> {
        let column = get(&self.data().ok()?, name).ok()?;
        (!is_missing(&column)).then(|| Array::from(&column))
    }

    /// The column as a plain `Array` stored back on `data`, so typed-array
    /// columns become writable.
    fn writable_column(&self, name: &str) -> Result<Array, PlotError> {
        let data = self.data()?;
        let column = get(&data, name)?;
        if is_missing(&column) {
            return Err(PlotError::Library(format!("line data source has no '{name}' column")));
        }
        if Array::is_array(&column) {
            return Ok(column.unchecked_into());
        }
        let copy = Array::from(&column);
        Reflect::set(&data, &JsValue::from_str(name), &copy).map_err(library_error)?;
        Ok(copy)
    }

    /// Non-numeric entries read as NaN so positions stay aligned.
    fn values(&self, name: &str) -> Vec<f64> {
        self.column(name)
            .map(|column| {
                column
                    .iter()
                    .map(|value| value.as_f64().unwrap_or(f64::NAN))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Bokeh 0.12 exposes `trigger('change')`, later versions `change.emit()`.
    fn emit_change(&self) -> Result<(), PlotError> {
        let trigger = get(&self.source, "trigger")?;
        if let Some(trigger) = trigger.dyn_ref::<Function>() {
            trigger
                .call1(&self.source, &JsValue::from_str("change"))
                .map_err(library_error)?;
            return Ok(());
        }

        let signal = get(&self.source, "change")?;
        get(&signal, "emit")?
            .dyn_into::<Function>()
            .map_err(library_error)?
            .call0(&signal)
            .map_err(library_error)?;
        Ok(())
    }

    fn resize(&self, len: u32) -> Result<(), PlotError> {
        for name in ["x", "y"] {
            let column = self.writable_column(name)?;
            column.set_length(len.min(column.length()));
        }
        Ok(())
    }
}

impl LineDataSource for BokehLineSource {
    fn x(&self) -> Vec<f64> {
        self.values("x")
    }

    fn y(&self) -> Vec<f64> {
        self.values("y")
    }

    fn set_point(&mut self, index: usize, x: f64, y: f64) -> Result<(), PlotError> {
        let index = u32::try_from(index)
            .map_err(|_| PlotError::Library(format!("point index {index} out of range")))?;
        let xs = self.writable_column("x")?;
        let ys = self.writable_column("y")?;
        xs.set(index, JsValue::from_f64(x));
        ys.set(index, JsValue::from_f64(y));
        Ok(())
    }

    fn truncate(&mut self, len: usize) -> Result<(), PlotError> {
        self.resize(u32::try_from(len).unwrap_or(u32::MAX))
    }

    fn clear(&mut self) -> Result<(), PlotError> {
        self.resize(0)
    }

    fn notify_change(&mut self) -> Result<(), PlotError> {
        self.emit_change()
    }
}

/// A Bokeh `Span` used as a plot cursor.
pub struct BokehCursor {
    span: JsValue,
}

impl BokehCursor {
    pub fn new(span: JsValue) -> Self {
        Self { span }
    }

    fn number(&self, key: &str) -> f64 {
        get(&self.span, key)
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }
}

impl PlotCursor for BokehCursor {
    fn location(&self) -> f64 {
        self.number("location")
    }

    fn set_location(&mut self, location: f64) {
        set(&self.span, "location", &JsValue::from_f64(location));
    }

    fn line_alpha(&self) -> f64 {
        self.number("line_alpha")
    }

    fn set_line_alpha(&mut self, alpha: f64) {
        set(&self.span, "line_alpha", &JsValue::from_f64(alpha));
    }
}

/// Named models of the first Bokeh document on the page.
#[derive(Default)]
pub struct BokehModels;

impl BokehModels {
    fn document() -> Result<JsValue, PlotError> {
        let bokeh = get(&js_sys::global(), "Bokeh")?;
        if is_missing(&bokeh) {
            return Err(PlotError::Library("Bokeh is not loaded".to_string()));
        }
        let documents = get(&bokeh, "documents")?
            .dyn_into::<Array>()
            .map_err(library_error)?;
        let document = documents.get(0);
        if is_missing(&document) {
            return Err(PlotError::Library("no Bokeh document on the page".to_string()));
        }
        Ok(document)
    }
}

impl ModelResolver for BokehModels {
    fn set_glyph_style(&mut self, name: &str, style: &GlyphStyle) -> Result<(), PlotError> {
        let document = Self::document()?;
        let model = get(&document, "get_model_by_name")?
            .dyn_into::<Function>()
            .map_err(library_error)?
            .call1(&document, &JsValue::from_str(name))
            .map_err(library_error)?;
        if is_missing(&model) {
            return Err(PlotError::UnknownModel(name.to_string()));
        }

        let glyph = get(&model, "glyph")?;
        set(&glyph, "line_width", &JsValue::from_f64(style.line_width));
        set(&glyph, "line_color", &JsValue::from_str(&style.line_color));
        Ok(())
    }
}
