use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Render a report; `table` is one `key: value` line per top-level field
    pub fn render<T: Serialize>(&self, report: &T) -> anyhow::Result<String> {
        let rendered = match self {
            Self::Json => serde_json::to_string_pretty(report)?,
            Self::Yaml => serde_yaml::to_string(report)?,
            Self::Table => {
                let value = serde_json::to_value(report)?;
                match value {
                    serde_json::Value::Object(fields) => fields
                        .iter()
                        .map(|(key, value)| format!("{key:<16} {}", plain(value)))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    other => plain(&other),
                }
            }
        };
        Ok(rendered)
    }
}

fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
