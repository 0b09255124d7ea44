use serde::Deserialize;

use crate::configs::tasks::WerrConfig;
use crate::types::WerrResult;

/// The parts of `pyproject.toml` werr reads. Everything else is ignored.
#[derive(Deserialize, Debug, Default)]
pub struct PyProject {
    #[serde(default)]
    pub project: ProjectTable,
    #[serde(default)]
    pub tool: ToolTable,
}

#[derive(Deserialize, Debug, Default)]
pub struct ProjectTable {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ToolTable {
    pub werr: Option<WerrConfig>,
}

pub fn parse_pyproject(toml_str: &str) -> WerrResult<PyProject> {
    let config: PyProject = toml::from_str(toml_str)?;
    Ok(config)
}
