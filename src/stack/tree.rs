//! PR dependency forest
//!
//! Edges run from a PR's destination branch to its source branch. A root is
//! a destination that is never a source among the open PRs.

use crate::error::{Error, Result};
use crate::model::{PullRequestRef, Repository};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// A node of the PR forest
#[derive(Debug, Clone)]
pub struct PrTree {
    /// Branch this node stands for
    pub branch_name: String,
    /// PR whose source is this branch (`None` for roots)
    pub pull_request: Option<PullRequestRef>,
    /// PRs targeting this branch, in open-PR order
    pub children: Vec<PrTree>,
}

impl PrTree {
    /// The maximal run of single-child nodes starting at this node
    ///
    /// Always contains `self` first.
    pub fn chain(&self) -> Vec<&Self> {
        let mut chain = vec![self];
        let mut current = self;
        while let [only] = current.children.as_slice() {
            chain.push(only);
            current = only;
        }
        chain
    }

    /// Nodes below this one in pre-order (parents before children)
    pub fn descendants(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut stack: Vec<&Self> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Serializable view of this subtree
    pub fn to_json_node(&self) -> TreeJson {
        TreeJson {
            branch: self.branch_name.clone(),
            pull_request: self.pull_request.as_ref().map(|pr| PrJson {
                number: pr.number(),
                title: pr.title().to_string(),
                url: pr.url().to_string(),
            }),
            children: self.children.iter().map(Self::to_json_node).collect(),
        }
    }
}

/// JSON shape of a [`PrTree`]
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TreeJson {
    /// Branch name
    pub branch: String,
    /// PR for this branch
    pub pull_request: Option<PrJson>,
    /// Child nodes
    pub children: Vec<TreeJson>,
}

/// JSON shape of a PR inside a [`TreeJson`]
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PrJson {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Web URL
    pub url: String,
}

/// Destinations that are never a source, in order of first appearance
pub fn find_roots(prs: &[PullRequestRef]) -> Vec<String> {
    let sources: HashSet<String> = prs
        .iter()
        .map(|pr| pr.source_branch().name().to_string())
        .collect();

    let mut seen = HashSet::new();
    prs.iter()
        .map(|pr| pr.destination_branch().name().to_string())
        .filter(|dest| !sources.contains(dest))
        .filter(|dest| seen.insert(dest.clone()))
        .collect()
}

/// Build the tree rooted at `root` from an already-fetched PR list
///
/// Fails with [`Error::CycleDetected`] when a branch repeats on a
/// root-to-node path.
pub fn build_tree_from_prs(prs: &[PullRequestRef], root: &str) -> Result<PrTree> {
    let mut path = vec![root.to_string()];
    let children = build_children(prs, root, &mut path)?;
    Ok(PrTree {
        branch_name: root.to_string(),
        pull_request: None,
        children,
    })
}

fn build_children(
    prs: &[PullRequestRef],
    branch: &str,
    path: &mut Vec<String>,
) -> Result<Vec<PrTree>> {
    let mut children = Vec::new();
    for pr in prs
        .iter()
        .filter(|pr| pr.destination_branch().name() == branch)
    {
        let source = pr.source_branch().name().to_string();
        if path.contains(&source) {
            return Err(Error::CycleDetected(source));
        }

        path.push(source.clone());
        let grandchildren = build_children(prs, &source, path)?;
        path.pop();

        children.push(PrTree {
            branch_name: source,
            pull_request: Some(PullRequestRef::clone(pr)),
            children: grandchildren,
        });
    }
    Ok(children)
}

/// Fetch open PRs and build the tree rooted at `root`
pub async fn build_tree(repository: &dyn Repository, root: &str) -> Result<PrTree> {
    let prs = repository.open_pull_requests().await?;
    build_tree_from_prs(&prs, root)
}

/// Build one tree per root
///
/// Every open PR must be reachable from some root; otherwise it sits on or
/// above a cycle and [`Error::CycleDetected`] is returned.
pub fn build_forest(prs: &[PullRequestRef]) -> Result<Vec<PrTree>> {
    let roots = find_roots(prs);
    debug!(roots = ?roots, prs = prs.len(), "building PR forest");

    let forest = roots
        .iter()
        .map(|root| build_tree_from_prs(prs, root))
        .collect::<Result<Vec<_>>>()?;

    let reached: HashSet<u64> = forest
        .iter()
        .flat_map(PrTree::descendants)
        .filter_map(|node| node.pull_request.as_ref().map(|pr| pr.number()))
        .collect();

    if let Some(orphan) = prs.iter().find(|pr| !reached.contains(&pr.number())) {
        return Err(Error::CycleDetected(
            orphan.source_branch().name().to_string(),
        ));
    }

    Ok(forest)
}
