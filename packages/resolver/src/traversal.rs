//! Bounded search of the remote division tree for one section.
//!
//! The remote API can only list the children of a division, so finding
//! "§ 187" means walking the tree. The walk runs in two phases:
//!
//! 1. Compilation selection: the law root is fetched two levels deep and its
//!    top-level compilations are ordered so those matching the code hint come
//!    first. Only the first few are searched.
//! 2. Level-by-level breadth-first search from each chosen compilation. Every
//!    child is tested with a [`SectionMatcher`]; a match costs one content
//!    fetch and the first match with text wins.
//!
//! Every remote call is charged against a hard [`CallBudget`] before it is
//! made and reported to the [`Pacer`] after it completes.

use std::collections::{HashSet, VecDeque};

use crate::api::DivisionsApi;
use crate::config::TraversalOptions;
use crate::content::clean_content;
use crate::error::RemoteError;
use crate::matcher::{contains_token, SectionMatcher};
use crate::pacing::{CallBudget, Pacer};
use crate::types::{ChildRef, DivisionNode, DivisionResponse, LawCompilation};

/// Depth requested for the law root, so compilations arrive with children.
const ROOT_DEPTH: u32 = 2;

/// Depth requested when listing a frontier node's children.
const CHILDREN_DEPTH: u32 = 1;

/// Depth requested for a content fetch.
const CONTENT_DEPTH: u32 = 0;

/// A matched section with its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHit {
    pub node: DivisionNode,

    /// Cleaned statute text, never empty.
    pub content: String,

    /// Path of the compilation the hit was found under.
    pub compilation_path: String,

    /// BFS level of the hit below the compilation (1 = direct child).
    pub depth: u32,
}

/// What a search did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    pub api_calls: u32,
    pub levels_explored: u32,

    /// Compilation paths searched, in search order.
    pub candidates: Vec<String>,

    pub budget_exhausted: bool,
}

/// One BFS level plus the next, keeping matching apart from fetching.
///
/// Children are handed in with [`Frontier::absorb`]; matches queue up for
/// [`Frontier::next_match`] and everything else waits for the next level.
#[derive(Debug)]
pub struct Frontier {
    matcher: SectionMatcher,
    current: VecDeque<ChildRef>,
    next: Vec<ChildRef>,
    matches: VecDeque<ChildRef>,
    visited: HashSet<String>,
    level: u32,
}

impl Frontier {
    /// Start a frontier at `start`; the first level is its children.
    #[must_use]
    pub fn new(matcher: SectionMatcher, start: ChildRef) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start.path.clone());
        Self {
            matcher,
            current: VecDeque::from([start]),
            next: Vec::new(),
            matches: VecDeque::new(),
            visited,
            level: 1,
        }
    }

    /// BFS level whose children are being examined (1-based).
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Next node of the current level whose children should be listed.
    pub fn pop(&mut self) -> Option<ChildRef> {
        self.current.pop_front()
    }

    /// Sort freshly listed children into matches and the next level.
    /// Already visited paths are skipped.
    pub fn absorb(&mut self, children: impl IntoIterator<Item = ChildRef>) {
        for child in children {
            if child.path.is_empty() || !self.visited.insert(child.path.clone()) {
                continue;
            }
            if self.matcher.matches_node(&child) {
                self.matches.push_back(child);
            } else {
                self.next.push(child);
            }
        }
    }

    /// Next candidate path that matched the target section.
    pub fn next_match(&mut self) -> Option<ChildRef> {
        self.matches.pop_front()
    }

    /// Keep a match that had no text; its children are searched next level.
    pub fn defer(&mut self, child: ChildRef) {
        self.next.push(child);
    }

    /// Move to the next level. Returns false when it is empty.
    pub fn advance(&mut self) -> bool {
        self.current = std::mem::take(&mut self.next).into();
        self.level += 1;
        !self.current.is_empty()
    }
}

/// Order compilations so hint matches come first (stable) and keep `limit`.
#[must_use]
pub fn select_candidates(
    compilations: Vec<DivisionNode>,
    hint: Option<&str>,
    limit: usize,
) -> Vec<DivisionNode> {
    let mut compilations = compilations;
    if let Some(hint) = hint.filter(|hint| !hint.is_empty()) {
        let spaced = hint.replace('_', " ");
        let matches_hint = |node: &DivisionNode| {
            [hint, spaced.as_str()].iter().any(|token| {
                contains_token(&node.display_name, token) || contains_token(&node.path, token)
            })
        };
        compilations.sort_by_key(|node| !matches_hint(node));
    }
    compilations.truncate(limit);
    compilations
}

/// Budgeted, paced search over a [`DivisionsApi`].
pub struct DivisionTraversal<'a> {
    api: &'a dyn DivisionsApi,
    pacer: &'a dyn Pacer,
    options: &'a TraversalOptions,
}

impl<'a> DivisionTraversal<'a> {
    #[must_use]
    pub fn new(api: &'a dyn DivisionsApi, pacer: &'a dyn Pacer, options: &'a TraversalOptions) -> Self {
        Self { api, pacer, options }
    }

    /// Find `target` in `compilation`, exploring at most `max_depth` levels
    /// below each chosen compilation.
    ///
    /// Returns `Ok(None)` when nothing was found within the bounds. Only a
    /// failure to fetch the law root is an error; failed branches are dropped.
    pub async fn search(
        &self,
        compilation: &LawCompilation,
        target: &str,
        hint: Option<&str>,
        max_depth: u32,
    ) -> Result<Option<SectionHit>, RemoteError> {
        let (hit, _) = self
            .search_with_report(compilation, target, hint, max_depth)
            .await?;
        Ok(hit)
    }

    /// Like [`search`](Self::search), also returning what the search did.
    pub async fn search_with_report(
        &self,
        compilation: &LawCompilation,
        target: &str,
        hint: Option<&str>,
        max_depth: u32,
    ) -> Result<(Option<SectionHit>, TraversalReport), RemoteError> {
        let mut budget = CallBudget::new(self.options.call_budget);
        let mut report = TraversalReport::default();

        let hit = self
            .run(compilation, target, hint, max_depth, &mut budget, &mut report)
            .await;
        report.api_calls = budget.used();
        report.budget_exhausted = budget.is_exhausted();

        match &hit {
            Ok(Some(found)) => tracing::info!(
                jurisdiction = %compilation.jurisdiction_key,
                section = target,
                path = %found.node.path,
                api_calls = report.api_calls,
                levels = report.levels_explored,
                "Section found"
            ),
            Ok(None) => tracing::info!(
                jurisdiction = %compilation.jurisdiction_key,
                section = target,
                api_calls = report.api_calls,
                levels = report.levels_explored,
                budget_exhausted = report.budget_exhausted,
                "Section not found"
            ),
            Err(e) => tracing::warn!(
                jurisdiction = %compilation.jurisdiction_key,
                section = target,
                error = %e,
                "Law root fetch failed"
            ),
        }

        hit.map(|hit| (hit, report))
    }

    async fn run(
        &self,
        compilation: &LawCompilation,
        target: &str,
        hint: Option<&str>,
        max_depth: u32,
        budget: &mut CallBudget,
        report: &mut TraversalReport,
    ) -> Result<Option<SectionHit>, RemoteError> {
        if !budget.try_spend() {
            return Ok(None);
        }
        let root = self
            .api
            .fetch_division(compilation, None, ROOT_DEPTH)
            .await;
        self.pacer.after_call(budget.used()).await;

        let compilations = match root? {
            DivisionResponse::Root(nodes) => nodes,
            DivisionResponse::Node(node) => vec![node],
        };

        let limit = self.options.candidate_limit(hint.is_some());
        let candidates = select_candidates(compilations, hint, limit);
        report.candidates = candidates.iter().map(|node| node.path.clone()).collect();
        tracing::debug!(
            candidates = ?report.candidates,
            hint = hint.unwrap_or_default(),
            "Compilations selected"
        );

        for candidate in candidates {
            if budget.is_exhausted() {
                break;
            }
            if let Some(hit) = self
                .search_compilation(compilation, candidate, target, max_depth, budget, report)
                .await
            {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    /// BFS below one compilation. Never fails: broken branches are dropped.
    async fn search_compilation(
        &self,
        compilation: &LawCompilation,
        candidate: DivisionNode,
        target: &str,
        max_depth: u32,
        budget: &mut CallBudget,
        report: &mut TraversalReport,
    ) -> Option<SectionHit> {
        let compilation_path = candidate.path.clone();
        let mut frontier = Frontier::new(SectionMatcher::new(target), candidate.as_child_ref());
        // The root fetch already listed the compilation's children.
        let mut prefetched = Some(candidate.children).filter(|children| !children.is_empty());

        while frontier.level() <= max_depth {
            report.levels_explored = report.levels_explored.max(frontier.level());

            while let Some(node) = frontier.pop() {
                let children = match prefetched.take() {
                    Some(children) => children,
                    None => {
                        if !budget.try_spend() {
                            tracing::debug!(path = %node.path, "Call budget exhausted");
                            return None;
                        }
                        let response = self
                            .api
                            .fetch_division(compilation, Some(&node.path), CHILDREN_DEPTH)
                            .await;
                        self.pacer.after_call(budget.used()).await;
                        match response {
                            Ok(response) => response.child_refs(),
                            Err(e) => {
                                tracing::warn!(
                                    path = %node.path,
                                    transient = e.is_transient(),
                                    error = %e,
                                    "Dropping branch"
                                );
                                continue;
                            }
                        }
                    }
                };

                frontier.absorb(children);

                while let Some(matched) = frontier.next_match() {
                    if !budget.try_spend() {
                        tracing::debug!(path = %matched.path, "Call budget exhausted");
                        return None;
                    }
                    let response = self
                        .api
                        .fetch_division(compilation, Some(&matched.path), CONTENT_DEPTH)
                        .await;
                    self.pacer.after_call(budget.used()).await;

                    let node = match response.map(DivisionResponse::into_node) {
                        Ok(Some(node)) => node,
                        Ok(None) => {
                            frontier.defer(matched);
                            continue;
                        }
                        Err(e) => {
                            tracing::warn!(path = %matched.path, error = %e, "Content fetch failed");
                            continue;
                        }
                    };

                    match clean_content(&node) {
                        Some(content) => {
                            return Some(SectionHit {
                                node,
                                content,
                                compilation_path,
                                depth: frontier.level(),
                            });
                        }
                        None => {
                            tracing::debug!(path = %matched.path, "Match has no text, descending");
                            frontier.defer(matched);
                        }
                    }
                }
            }

            if !frontier.advance() {
                break;
            }
        }
        None
    }
}
