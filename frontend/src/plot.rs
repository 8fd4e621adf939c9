//! Plot handles the runtime writes through.
//!
//! The plotting library owns the objects; the runtime only sees them through
//! these traits. `Memory*` implementations back native use and tests.

use shared::GlyphStyle;
use std::collections::BTreeMap;

/// Mutable `(x, y)` sequence pair backing a plotted curve.
pub trait LineDataSource {
    fn x(&self) -> Vec<f64>;
    fn y(&self) -> Vec<f64>;
    /// Write one point, appending when `index` equals the current length.
    fn set_point(&mut self, index: usize, x: f64, y: f64) -> Result<(), PlotError>;
    fn truncate(&mut self, len: usize) -> Result<(), PlotError>;
    fn clear(&mut self) -> Result<(), PlotError>;
    /// Tell the plot that the data changed.
    fn notify_change(&mut self) -> Result<(), PlotError>;
}

pub trait PlotCursor {
    fn location(&self) -> f64;
    fn set_location(&mut self, location: f64);
    fn line_alpha(&self) -> f64;
    fn set_line_alpha(&mut self, alpha: f64);
}

/// Lookup from a model name to its glyph style.
pub trait ModelResolver {
    fn set_glyph_style(&mut self, name: &str, style: &GlyphStyle) -> Result<(), PlotError>;
}

pub fn curve_model_name(number: u32) -> String {
    format!("curve_{number}")
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlotError {
    #[error("no plot model named '{0}'")]
    UnknownModel(String),
    #[error("plot library call failed: {0}")]
    Library(String),
}

/// Handles supplied by the page for one plot. Never owned by the dispatcher.
#[derive(Default)]
pub struct PlotContext {
    pub line_data: Option<Box<dyn LineDataSource>>,
    pub cursors: Vec<Box<dyn PlotCursor>>,
}

impl PlotContext {
    pub fn new(line_data: Option<Box<dyn LineDataSource>>, cursors: Vec<Box<dyn PlotCursor>>) -> Self {
        Self { line_data, cursors }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryLineSource {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub changes: usize,
}

impl MemoryLineSource {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y, changes: 0 }
    }
}

fn write_at(values: &mut Vec<f64>, index: usize, value: f64) {
    if index < values.len() {
        values[index] = value;
    } else {
        values.resize(index, f64::NAN);
        values.push(value);
    }
}

impl LineDataSource for MemoryLineSource {
    fn x(&self) -> Vec<f64> {
        self.x.clone()
    }

    fn y(&self) -> Vec<f64> {
        self.y.clone()
    }

    fn set_point(&mut self, index: usize, x: f64, y: f64) -> Result<(), PlotError> {
        write_at(&mut self.x, index, x);
        write_at(&mut self.y, index, y);
        Ok(())
    }

    fn truncate(&mut self, len: usize) -> Result<(), PlotError> {
        self.x.truncate(len);
        self.y.truncate(len);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PlotError> {
        self.x.clear();
        self.y.clear();
        Ok(())
    }

    fn notify_change(&mut self) -> Result<(), PlotError> {
        self.changes += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryCursor {
    pub location: f64,
    pub line_alpha: f64,
}

impl Default for MemoryCursor {
    fn default() -> Self {
        Self {
            location: 0.0,
            line_alpha: 0.0,
        }
    }
}

impl PlotCursor for MemoryCursor {
    fn location(&self) -> f64 {
        self.location
    }

    fn set_location(&mut self, location: f64) {
        self.location = location;
    }

    fn line_alpha(&self) -> f64 {
        self.line_alpha
    }

    fn set_line_alpha(&mut self, alpha: f64) {
        self.line_alpha = alpha.clamp(0.0, 1.0);
    }
}

/// Named models kept in memory. Only registered names resolve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryModels {
    styles: BTreeMap<String, GlyphStyle>,
}

impl MemoryModels {
    pub fn with_models<I, S>(names: I, style: GlyphStyle) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            styles: names
                .into_iter()
                .map(|name| (name.into(), style.clone()))
                .collect(),
        }
    }

    pub fn style(&self, name: &str) -> Option<&GlyphStyle> {
        self.styles.get(name)
    }
}

impl ModelResolver for MemoryModels {
    fn set_glyph_style(&mut self, name: &str, style: &GlyphStyle) -> Result<(), PlotError> {
        let slot = self
            .styles
            .get_mut(name)
            .ok_or_else(|| PlotError::UnknownModel(name.to_string()))?;
        *slot = style.clone();
        Ok(())
    }
}
