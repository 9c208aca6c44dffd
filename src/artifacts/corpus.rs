//! The corpus: everything we know about each artifact kind in one place,
//! anchor signatures plus the field-walking plan built on top of them.

use std::ops::Deref;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};

use crate::{
    artifacts::{activity, browser_request, http_request, socks_request, tab_session},
    record::ArtifactKind,
    walker::WalkPlan,
};

/// One carvable artifact kind: its anchor signatures and its walk plan.
#[derive(Debug)]
pub struct Artifact {
    pub kind: ArtifactKind,

    /// Fixed anchor byte sequences locating candidate records.
    pub signatures: &'static [&'static [u8]],

    pub plan: &'static WalkPlan,
}

/// The list of all artifact kinds that we can carve.
#[derive(Debug)]
pub struct Corpus(Vec<&'static Artifact>);

impl Corpus {
    pub fn new() -> Self {
        Self(vec![
            &activity::ARTIFACT,
            &browser_request::ARTIFACT,
            &tab_session::ARTIFACT,
            &http_request::ARTIFACT,
            &socks_request::ARTIFACT,
        ])
    }

    /// Retain only the kinds whose slug is listed; an empty list keeps all.
    pub fn retain(&mut self, slugs: &[String]) {
        if slugs.is_empty() {
            return;
        }
        self.0
            .retain(|artifact| slugs.iter().any(|s| s == artifact.kind.slug()));
    }

    /// Build the Aho-Corasick automaton over every signature of every kind.
    /// Several signatures are strict prefixes of longer ones, so the caller
    /// must scan with overlapping matches; pattern indexes map back to their
    /// kind through [`Corpus::owner`].
    pub fn automaton(&self) -> anyhow::Result<AhoCorasick> {
        let patterns: Vec<&[u8]> = self
            .0
            .iter()
            .flat_map(|artifact| artifact.signatures.iter().copied())
            .collect();

        let ac = AhoCorasickBuilder::new().build(&patterns)?;

        Ok(ac)
    }

    /// The artifact owning the automaton pattern with this index.
    pub fn owner(&self, pattern: usize) -> Option<&'static Artifact> {
        let mut remaining = pattern;
        for artifact in &self.0 {
            if remaining < artifact.signatures.len() {
                return Some(artifact);
            }
            remaining -= artifact.signatures.len();
        }
        None
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Corpus {
    type Target = Vec<&'static Artifact>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_maps_every_pattern() {
        let corpus = Corpus::new();
        let total: usize = corpus.iter().map(|a| a.signatures.len()).sum();
        for pattern in 0..total {
            assert!(corpus.owner(pattern).is_some());
        }
        assert!(corpus.owner(total).is_none());

        // first pattern belongs to the first kind, last to the last
        assert_eq!(
            corpus.owner(0).unwrap().kind,
            ArtifactKind::BrowserActivity
        );
        assert_eq!(
            corpus.owner(total - 1).unwrap().kind,
            ArtifactKind::SocksRequest
        );
    }

    #[test]
    fn retain_filters_kinds() {
        let mut corpus = Corpus::new();
        corpus.retain(&[String::from("socks"), String::from("http")]);
        assert_eq!(corpus.len(), 2);

        let mut all = Corpus::new();
        all.retain(&[]);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn automaton_builds() {
        let corpus = Corpus::new();
        assert!(corpus.automaton().is_ok());
    }
}
