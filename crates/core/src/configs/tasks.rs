use serde::Deserialize;

use crate::types::{WerrError, WerrResult};

/// The `[tool.werr]` table
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct WerrConfig {
    /// Task name to a list of commands, optionally led by a [`TaskOptions`] table
    #[serde(default)]
    pub task: toml::Table,
    /// Template variables, in file order
    #[serde(default)]
    pub variable: toml::Table,
    #[serde(default)]
    pub default: DefaultConfig,
    pub launcher: Option<Vec<String>>,
    /// Tools whose commands are always named by their first two tokens
    #[serde(default)]
    pub dashname: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct DefaultConfig {
    pub task: Option<String>,
}

/// The inline table that may lead a task list
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TaskOptions {
    #[serde(default)]
    pub parallel: bool,
    pub reporter: Option<String>,
    pub needs: Option<String>,
    #[serde(default)]
    pub shell: bool,
}

/// Split a task list into its options and its raw command strings
pub fn parse_task_entries(
    name: &str,
    value: &toml::Value,
) -> WerrResult<(TaskOptions, Vec<String>)> {
    let entries = value.as_array().ok_or_else(|| {
        WerrError::Config(format!("`task.{name}` must be a list of commands"))
    })?;

    let (options, commands) = match entries.split_first() {
        Some((toml::Value::Table(table), rest)) => {
            let options: TaskOptions = toml::Value::Table(table.clone())
                .try_into()
                .map_err(|e| WerrError::Config(format!("`task.{name}` options: {e}")))?;
            (options, rest)
        }
        _ => (TaskOptions::default(), entries.as_slice()),
    };

    let commands = commands
        .iter()
        .map(|entry| {
            entry.as_str().map(str::to_string).ok_or_else(|| {
                WerrError::Config(format!("`task.{name}` commands must be strings, got {entry}"))
            })
        })
        .collect::<WerrResult<Vec<_>>>()?;

    if commands.is_empty() {
        return Err(WerrError::Config(format!("`task.{name}` has no commands")));
    }
    Ok((options, commands))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(toml_str: &str) -> toml::Value {
        let table: toml::Table = toml::from_str(toml_str).unwrap();
        table["t"].clone()
    }

    #[test]
    fn test_plain_command_list() {
        let (options, commands) =
            parse_task_entries("t", &value(r#"t = ["ruff check .", "pytest"]"#)).unwrap();

        assert_eq!(options, TaskOptions::default());
        assert_eq!(commands, vec!["ruff check .", "pytest"]);
    }

    #[test]
    fn test_leading_options_table() {
        let (options, commands) = parse_task_entries(
            "t",
            &value(r#"t = [{ parallel = true, reporter = "json", needs = "build" }, "pytest"]"#),
        )
        .unwrap();

        assert!(options.parallel);
        assert_eq!(options.reporter.as_deref(), Some("json"));
        assert_eq!(options.needs.as_deref(), Some("build"));
        assert!(!options.shell);
        assert_eq!(commands, vec!["pytest"]);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err =
            parse_task_entries("t", &value(r#"t = [{ paralel = true }, "pytest"]"#)).unwrap_err();
        assert!(err.to_string().contains("task.t"));
    }

    #[test]
    fn test_non_list_is_rejected() {
        let err = parse_task_entries("t", &value(r#"t = "pytest""#)).unwrap_err();
        assert!(matches!(err, WerrError::Config(_)));
    }

    #[test]
    fn test_options_without_commands_is_rejected() {
        let err = parse_task_entries("t", &value(r#"t = [{ parallel = true }]"#)).unwrap_err();
        assert!(err.to_string().contains("no commands"));
    }

    #[test]
    fn test_non_string_command_is_rejected() {
        let err = parse_task_entries("t", &value(r#"t = ["pytest", 3]"#)).unwrap_err();
        assert!(matches!(err, WerrError::Config(_)));
    }
}
