//! Component Configuration

/// Component configuration options
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Prefix for every generated class name and selector
    pub prefix: String,

    /// Hover dwell before a tooltip expands (ms)
    pub hover_delay_ms: u64,

    /// Distance between a tooltip body and its trigger (px)
    pub tooltip_gap_px: f64,
}

impl Config {
    /// Prefixed class name, e.g. `usa-tooltip`
    pub fn class(&self, name: &str) -> String {
        format!("{}-{}", self.prefix, name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: "usa".to_string(),
            hover_delay_ms: 300,
            tooltip_gap_px: 5.0,
        }
    }
}
