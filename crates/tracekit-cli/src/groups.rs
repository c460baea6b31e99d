//! Comparison groups, given on the command line as `name[:priority]` or in a JSON file:
//!
//! ```json
//! [{ "name": "cc_1_fct", "priority": 2 }, { "name": "bfc_fct" }]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracekit_core::{Group, PriorityClass};

#[derive(Debug, Clone, clap::Args)]
pub struct GroupArgs {
    /// A comparison group as `name[:priority]`; its FCT file is `<dir>/<name>.txt`
    #[arg(short, long = "group", value_parser = parse_group)]
    pub groups: Vec<Group>,

    /// JSON file listing comparison groups, appended after `--group`s
    #[arg(long)]
    pub groups_file: Option<PathBuf>,
}

impl GroupArgs {
    pub fn resolve(&self) -> anyhow::Result<Vec<Group>> {
        let mut groups = self.groups.clone();
        if let Some(path) = &self.groups_file {
            groups.extend(read_groups(path)?);
        }
        anyhow::ensure!(!groups.is_empty(), "no comparison groups given");
        Ok(groups)
    }
}

pub fn parse_group(s: &str) -> Result<Group, String> {
    match s.split_once(':') {
        Some((name, priority)) => {
            let priority = priority
                .parse::<PriorityClass>()
                .map_err(|_| format!("invalid priority class in {s:?}"))?;
            Ok(Group::new(name.to_owned(), Some(priority)))
        }
        None => Ok(Group::new(s.to_owned(), None)),
    }
}

pub fn read_groups(path: impl AsRef<Path>) -> anyhow::Result<Vec<Group>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read groups file {}", path.display()))?;
    let groups = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse groups file {}", path.display()))?;
    Ok(groups)
}
