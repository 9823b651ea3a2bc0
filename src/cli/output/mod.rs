//! CLI output formatting module
//!
//! Table, tree and JSON renderings of an aggregation, plus the progress
//! spinner. Everything here returns strings; commands decide where they go.

pub mod colors;
pub mod progress;
pub mod table;
pub mod tree;

pub use table::TableFormatter;

use console::Term;
use serde::Serialize;

use crate::domain::models::{ColorChoice, ScopedError};

/// A command result that can be printed for humans or as JSON
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Render `result` in the requested mode. JSON is pretty-printed unless
/// `compact`, which yields one line per result.
pub fn render<T: CommandOutput>(result: &T, json_mode: bool, compact: bool) -> String {
    if !json_mode {
        return result.to_human();
    }
    let value = result.to_json();
    let rendered = if compact {
        serde_json::to_string(&value)
    } else {
        serde_json::to_string_pretty(&value)
    };
    rendered.unwrap_or_default()
}

/// Print `result` to stdout
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    println!("{}", render(result, json_mode, false));
}

/// Resolve the configured color choice against the terminal
pub fn use_colors(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::colors_enabled() && Term::stdout().features().is_attended(),
    }
}

/// `warning: <path>: <error>` line for a scoped failure
pub fn warning_line(error: &ScopedError) -> String {
    format!("warning: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ResourcePath;
    use crate::domain::ports::{ClientError, Operation};

    #[derive(Serialize)]
    struct Greeting {
        name: String,
    }

    impl CommandOutput for Greeting {
        fn to_human(&self) -> String {
            format!("hello {}", self.name)
        }
    }

    #[test]
    fn test_render_modes() {
        let greeting = Greeting {
            name: "prod".to_string(),
        };
        assert_eq!(render(&greeting, false, false), "hello prod");
        assert_eq!(render(&greeting, true, true), r#"{"name":"prod"}"#);
        assert!(render(&greeting, true, false).contains('\n'));
    }

    #[test]
    fn test_warning_line() {
        let error = ScopedError::new(
            ResourcePath::service("prod", "api"),
            ClientError::api(Operation::ListTasks, "AccessDenied"),
        );
        assert_eq!(
            warning_line(&error),
            "warning: prod/api: ListTasks failed: AccessDenied"
        );
    }

    #[test]
    fn test_explicit_color_choices() {
        assert!(use_colors(ColorChoice::Always));
        assert!(!use_colors(ColorChoice::Never));
    }
}
