use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RepoArgError {
    #[error("Invalid chart repository '{0}': expected name=url")]
    InvalidRepo(String),

    #[error("Invalid helm repo extra args '{0}': expected name=args")]
    InvalidExtraArgs(String),
}

/// A chart repository given as `name=url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRepo {
    pub name: String,
    pub url: String,
}

impl FromStr for ChartRepo {
    type Err = RepoArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, url)) if !name.trim().is_empty() && !url.trim().is_empty() => Ok(Self {
                name: name.trim().to_string(),
                url: url.trim().to_string(),
            }),
            _ => Err(RepoArgError::InvalidRepo(s.to_string())),
        }
    }
}

/// A `helm repo add` invocation to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRegistration {
    pub name: String,
    pub url: String,
    pub extra_args: Vec<String>,
}

/// Parse `name=--flag value ...` entries. A later entry for the same name
/// replaces an earlier one.
pub fn parse_repo_extra_args(
    entries: &[String],
) -> Result<HashMap<String, Vec<String>>, RepoArgError> {
    let mut args = HashMap::new();
    for entry in entries {
        let (name, rest) = entry
            .split_once('=')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| RepoArgError::InvalidExtraArgs(entry.clone()))?;
        args.insert(
            name.trim().to_string(),
            rest.split_whitespace().map(str::to_string).collect(),
        );
    }
    Ok(args)
}

/// Group arguments into `(flag name, tokens)`; values following a flag stay
/// with it. Leading positional tokens form a group with an empty name.
fn group_flags(args: &[String]) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for arg in args {
        if arg.starts_with('-') {
            let name = arg.split_once('=').map_or(arg.as_str(), |(n, _)| n);
            groups.push((name.to_string(), vec![arg.clone()]));
        } else if let Some((_, tokens)) = groups.last_mut() {
            tokens.push(arg.clone());
        } else {
            groups.push((String::new(), vec![arg.clone()]));
        }
    }
    groups
}

/// Merge default and repository-specific arguments by flag name.
///
/// Default flags come first, minus any the specific list also sets; the
/// specific arguments follow in their original order.
pub fn merge_extra_args(defaults: &[String], specific: &[String]) -> Vec<String> {
    let specific_groups = group_flags(specific);
    let overridden: HashSet<&str> = specific_groups
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| !name.is_empty())
        .collect();

    group_flags(defaults)
        .into_iter()
        .filter(|(name, _)| !overridden.contains(name.as_str()))
        .chain(specific_groups.iter().cloned())
        .flat_map(|(_, tokens)| tokens)
        .collect()
}

/// One registration per unique repository name, first definition wins.
pub fn plan_registrations(
    repos: &[ChartRepo],
    default_args: &[String],
    repo_args: &HashMap<String, Vec<String>>,
) -> Vec<RepoRegistration> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut plan = Vec::new();

    for repo in repos {
        if let Some(url) = seen.get(repo.name.as_str()) {
            if *url != repo.url {
                warn!(
                    name = %repo.name,
                    kept = %url,
                    ignored = %repo.url,
                    "Chart repository defined twice with different URLs"
                );
            }
            continue;
        }
        seen.insert(&repo.name, &repo.url);

        let specific = repo_args.get(&repo.name).map(Vec::as_slice).unwrap_or(&[]);
        plan.push(RepoRegistration {
            name: repo.name.clone(),
            url: repo.url.clone(),
            extra_args: merge_extra_args(default_args, specific),
        });
    }

    plan
}
