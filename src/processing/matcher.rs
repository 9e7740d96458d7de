//! Matching and ranking: job posting in, ranked and explained candidates out

use crate::config::{Config, MatchingConfig};
use crate::error::{Result, SkillMatchError};
use crate::models::{CandidateProfile, JobPosting, MatchResult};
use crate::processing::embeddings::EmbeddingProvider;
use crate::processing::repository::Repository;
use crate::processing::vector_index::{SlotMap, VectorIndex};
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::RwLock;

/// The vector index and its slot map change together or not at all.
struct IndexState<V> {
    index: V,
    slots: SlotMap,
}

pub struct MatchingEngine<E, V, R> {
    embedder: E,
    state: RwLock<IndexState<V>>,
    candidates: R,
    config: MatchingConfig,
    embed_timeout: Duration,
}

impl<E, V, R> MatchingEngine<E, V, R>
where
    E: EmbeddingProvider,
    V: VectorIndex,
    R: Repository<CandidateProfile>,
{
    /// `index` must be empty: slots are mapped from zero.
    pub fn new(embedder: E, index: V, candidates: R, config: MatchingConfig, embed_timeout: Duration) -> Self {
        Self {
            embedder,
            state: RwLock::new(IndexState {
                index,
                slots: SlotMap::new(),
            }),
            candidates,
            config,
            embed_timeout,
        }
    }

    pub fn from_config(embedder: E, index: V, candidates: R, config: &Config) -> Self {
        Self::new(
            embedder,
            index,
            candidates,
            config.matching.clone(),
            Duration::from_secs(config.embedding.timeout_secs),
        )
    }

    /// Embed the profile summary and append it to the index.
    ///
    /// Embedding happens before the write lock is taken; the index append,
    /// the slot record and the repository store then run under one lock so
    /// concurrent adds cannot interleave. On any error the profile is not
    /// stored. Returns the assigned slot.
    ///
    /// If the index hands back an unexpected slot, that vector stays in the
    /// append-only index without a mapping and every later add fails with
    /// `IndexInconsistent`. The engine has to be rebuilt over a fresh index.
    pub async fn add_candidate_to_index(&self, profile: CandidateProfile) -> Result<usize> {
        if !self.embedder.is_ready() {
            return Err(SkillMatchError::EmbedderNotInitialized);
        }

        let vector = self.embed(&profile.summary).await?;
        let candidate_id = profile.id.clone();

        let mut state = self.state.write().await;
        let expected = state.slots.next_slot();
        if state.index.len() != expected {
            return Err(SkillMatchError::IndexInconsistent {
                expected,
                actual: state.index.len(),
            });
        }

        let slot = state.index.add(vector)?;
        if let Err(e) = state.slots.record(slot, candidate_id.as_str()) {
            // the vector stays in the append-only index but is never mapped
            error!("Index slot {} for candidate {} left unmapped: {}", slot, candidate_id, e);
            return Err(e);
        }
        self.candidates.put(profile);
        drop(state);

        debug!("Indexed candidate {} at slot {}", candidate_id, slot);
        Ok(slot)
    }

    /// Rank indexed candidates for `job`.
    ///
    /// Experience filtering happens after retrieval, so fewer than `top_k`
    /// results may come back unless `overfetch_factor` asks the index for
    /// more neighbours.
    pub async fn find_matches_for_job(&self, job: &JobPosting, top_k: usize) -> Result<Vec<MatchResult>> {
        if !self.embedder.is_ready() {
            return Err(SkillMatchError::EmbedderNotInitialized);
        }
        if top_k == 0 || self.index_size().await == 0 {
            return Ok(Vec::new());
        }

        let query = self.embed(&job.query_text()).await?;

        let hits: Vec<(f32, String)> = {
            let state = self.state.read().await;
            let size = state.index.len();
            if size == 0 {
                return Ok(Vec::new());
            }
            let k = top_k.saturating_mul(self.config.overfetch_factor).min(size);

            state
                .index
                .search(&query, k)?
                .into_iter()
                .filter_map(|neighbor| {
                    let slot = neighbor.slot?;
                    match state.slots.candidate_id(slot) {
                        Some(id) => Some((neighbor.similarity, id.to_string())),
                        None => {
                            debug!("Slot {} has no candidate mapping, skipping", slot);
                            None
                        }
                    }
                })
                .collect()
        };

        let retrieved: Vec<(f32, CandidateProfile)> = hits
            .into_iter()
            .filter_map(|(similarity, id)| match self.candidates.get(&id) {
                Some(candidate) => Some((similarity, candidate)),
                None => {
                    debug!("Candidate {} missing from repository, skipping", id);
                    None
                }
            })
            .collect();

        let matches = rank_candidates(retrieved, job, top_k, &self.config);
        info!("Job {}: {} candidates matched", job.id, matches.len());
        Ok(matches)
    }

    pub async fn index_size(&self) -> usize {
        self.state.read().await.index.len()
    }

    pub async fn candidate_for_slot(&self, slot: usize) -> Option<String> {
        self.state.read().await.slots.candidate_id(slot).map(str::to_string)
    }

    pub fn candidates(&self) -> &R {
        &self.candidates
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        tokio::time::timeout(self.embed_timeout, self.embedder.embed(text))
            .await
            .map_err(|_| SkillMatchError::Timeout {
                operation: "Embedding request".to_string(),
                secs: self.embed_timeout.as_secs(),
            })?
    }
}

/// Filter by experience, add the skill-overlap bonus and sort.
///
/// `retrieved` is in index order; candidates with equal composite scores
/// keep that order.
pub fn rank_candidates(
    retrieved: Vec<(f32, CandidateProfile)>,
    job: &JobPosting,
    top_k: usize,
    config: &MatchingConfig,
) -> Vec<MatchResult> {
    let mut matches: Vec<MatchResult> = retrieved
        .into_iter()
        .filter(|(_, candidate)| candidate.experience_years >= job.years_experience)
        .map(|(similarity, candidate)| {
            let matching_skills: BTreeSet<String> = candidate
                .skills
                .intersection(&job.required_skills)
                .cloned()
                .collect();
            let score = similarity + config.skill_bonus * matching_skills.len() as f32;
            let explanation = explain_match(&candidate, job, &matching_skills, similarity, config);

            MatchResult {
                candidate_id: candidate.id,
                job_id: job.id.clone(),
                score,
                similarity,
                matching_skills,
                explanation,
            }
        })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(top_k);
    matches
}

/// Human-readable reason for a match.
pub fn explain_match(
    candidate: &CandidateProfile,
    job: &JobPosting,
    matching_skills: &BTreeSet<String>,
    similarity: f32,
    config: &MatchingConfig,
) -> String {
    let required = job.required_skills.len();
    let skill_match_pct = if required == 0 {
        0.0
    } else {
        matching_skills.len() as f32 / required as f32 * 100.0
    };

    let mut parts = vec![
        format!("Score: {:.2}", similarity),
        format!("Skill Match: {}/{} ({:.0}%)", matching_skills.len(), required, skill_match_pct),
    ];

    if !matching_skills.is_empty() {
        let key: Vec<&str> = matching_skills.iter().take(3).map(String::as_str).collect();
        parts.push(format!("Key matches: {}", key.join(", ")));
    }

    parts.push(experience_tier(candidate.experience_years, config).to_string());
    parts.join(" | ")
}

pub fn experience_tier(years: u32, config: &MatchingConfig) -> &'static str {
    if years >= config.senior_years {
        "Senior experience level"
    } else if years >= config.mid_years {
        "Mid-level experience"
    } else {
        "Junior level"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::repository::InMemoryRepository;
    use crate::processing::vector_index::{FlatIndex, Neighbor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const VOCAB: [&str; 5] = ["python", "pytorch", "spark", "kubernetes", "sql"];

    /// Counts vocabulary words; the trailing constant keeps vectors non-zero.
    struct KeywordEmbedder {
        ready: bool,
    }

    impl EmbeddingProvider for KeywordEmbedder {
        fn is_ready(&self) -> bool {
            self.ready
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lowered = text.to_lowercase();
            let mut vector: Vec<f32> = VOCAB.iter().map(|w| lowered.matches(w).count() as f32).collect();
            vector.push(0.1);
            Ok(vector)
        }
    }

    /// Each call returns a vector one element longer than the last.
    struct GrowingEmbedder {
        calls: AtomicUsize,
    }

    impl EmbeddingProvider for GrowingEmbedder {
        fn is_ready(&self) -> bool {
            true
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0; n + 2])
        }
    }

    struct SlowEmbedder;

    impl EmbeddingProvider for SlowEmbedder {
        fn is_ready(&self) -> bool {
            true
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(vec![1.0])
        }
    }

    /// Returns canned neighbours regardless of the query.
    struct ScriptedIndex {
        len: usize,
        hits: Vec<Neighbor>,
        slot_offset: usize,
    }

    impl ScriptedIndex {
        fn new(hits: Vec<Neighbor>) -> Self {
            Self { len: 0, hits, slot_offset: 0 }
        }
    }

    impl VectorIndex for ScriptedIndex {
        fn add(&mut self, _vector: Vec<f32>) -> Result<usize> {
            self.len += 1;
            Ok(self.len - 1 + self.slot_offset)
        }

        fn search(&self, _query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
            Ok(self.hits.iter().take(k).copied().collect())
        }

        fn len(&self) -> usize {
            self.len
        }
    }

    fn candidate(id: &str, skills: &[&str], years: u32) -> CandidateProfile {
        let skills: BTreeSet<String> = skills.iter().map(|s| s.to_string()).collect();
        let summary = format!(
            "AI/ML professional with {} years experience. Skills: {}",
            years,
            skills.iter().cloned().collect::<Vec<_>>().join(", ")
        );
        CandidateProfile {
            id: id.to_string(),
            name: id.to_uppercase(),
            skills,
            experience_years: years,
            education: Vec::new(),
            location: "Remote".to_string(),
            summary,
        }
    }

    fn job(skills: &[&str], years: u32) -> JobPosting {
        JobPosting {
            id: "job-1".to_string(),
            title: "ML Engineer".to_string(),
            description: "Build training pipelines".to_string(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            years_experience: years,
        }
    }

    fn hit(similarity: f32, slot: usize) -> Neighbor {
        Neighbor { similarity, slot: Some(slot) }
    }

    fn engine<V: VectorIndex>(index: V) -> MatchingEngine<KeywordEmbedder, V, InMemoryRepository<CandidateProfile>> {
        engine_with(index, MatchingConfig::default())
    }

    fn engine_with<V: VectorIndex>(
        index: V,
        config: MatchingConfig,
    ) -> MatchingEngine<KeywordEmbedder, V, InMemoryRepository<CandidateProfile>> {
        MatchingEngine::new(
            KeywordEmbedder { ready: true },
            index,
            InMemoryRepository::new(),
            config,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_matches() {
        let engine = engine(FlatIndex::new());
        let matches = engine.find_matches_for_job(&job(&["Python"], 0), 10).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_uninitialized_embedder_is_a_precondition_error() {
        let engine = MatchingEngine::new(
            KeywordEmbedder { ready: false },
            FlatIndex::new(),
            InMemoryRepository::new(),
            MatchingConfig::default(),
            Duration::from_secs(5),
        );

        assert!(matches!(
            engine.add_candidate_to_index(candidate("a", &["Python"], 3)).await,
            Err(SkillMatchError::EmbedderNotInitialized)
        ));
        assert!(matches!(
            engine.find_matches_for_job(&job(&["Python"], 0), 5).await,
            Err(SkillMatchError::EmbedderNotInitialized)
        ));
        assert_eq!(engine.index_size().await, 0);
    }

    #[tokio::test]
    async fn test_slots_map_to_candidates_in_order() {
        let engine = engine(FlatIndex::new());
        assert_eq!(engine.add_candidate_to_index(candidate("a", &["Python"], 3)).await.unwrap(), 0);
        assert_eq!(engine.add_candidate_to_index(candidate("b", &["Spark"], 3)).await.unwrap(), 1);

        assert_eq!(engine.candidate_for_slot(0).await.as_deref(), Some("a"));
        assert_eq!(engine.candidate_for_slot(1).await.as_deref(), Some("b"));
        assert!(engine.candidates().contains("b"));
    }

    #[tokio::test]
    async fn test_experience_filter_and_skill_intersection() {
        let engine = engine(FlatIndex::new());
        engine.add_candidate_to_index(candidate("junior", &["Python", "PyTorch"], 1)).await.unwrap();
        engine.add_candidate_to_index(candidate("senior", &["Python", "SQL"], 6)).await.unwrap();
        engine.add_candidate_to_index(candidate("mid", &["PyTorch", "Kubernetes"], 3)).await.unwrap();

        let job = job(&["Python", "PyTorch"], 2);
        let matches = engine.find_matches_for_job(&job, 10).await.unwrap();

        assert_eq!(matches.len(), 2);
        for m in &matches {
            let c = engine.candidates().get(&m.candidate_id).unwrap();
            assert!(c.experience_years >= job.years_experience);
            let expected: BTreeSet<String> = c.skills.intersection(&job.required_skills).cloned().collect();
            assert_eq!(m.matching_skills, expected);
            assert_eq!(m.job_id, "job-1");
        }
    }

    #[tokio::test]
    async fn test_composite_score_reorders_results() {
        let index = ScriptedIndex::new(vec![hit(0.9, 0), hit(0.8, 1), hit(0.7, 2)]);
        let engine = engine(index);
        engine.add_candidate_to_index(candidate("a", &["Go"], 5)).await.unwrap();
        engine.add_candidate_to_index(candidate("b", &["Python", "PyTorch", "Spark"], 5)).await.unwrap();
        engine.add_candidate_to_index(candidate("c", &["Python"], 5)).await.unwrap();

        let matches = engine
            .find_matches_for_job(&job(&["Python", "PyTorch", "Spark"], 0), 3)
            .await
            .unwrap();

        let order: Vec<&str> = matches.iter().map(|m| m.candidate_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert!((matches[0].score - (0.8 + 0.05 * 3.0)).abs() < 1e-6);
        assert!((matches[1].score - 0.9).abs() < 1e-6);
        assert!((matches[2].score - (0.7 + 0.05)).abs() < 1e-6);
        assert!((matches[0].similarity - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_ties_keep_retrieval_order_across_runs() {
        let hits = vec![hit(0.5, 2), hit(0.5, 0), hit(0.5, 1)];
        let engine = engine(ScriptedIndex::new(hits));
        for id in ["x", "y", "z"] {
            engine.add_candidate_to_index(candidate(id, &["Python"], 4)).await.unwrap();
        }
        let job = job(&["Python"], 0);

        let first = engine.find_matches_for_job(&job, 3).await.unwrap();
        let second = engine.find_matches_for_job(&job, 3).await.unwrap();

        let order: Vec<&str> = first.iter().map(|m| m.candidate_id.as_str()).collect();
        assert_eq!(order, vec!["z", "x", "y"]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalid_and_stale_slots_are_skipped() {
        let hits = vec![
            Neighbor { similarity: 0.99, slot: None },
            hit(0.9, 0),
            hit(0.8, 7),
            hit(0.7, 1),
        ];
        let candidates: Arc<InMemoryRepository<CandidateProfile>> = Arc::new(InMemoryRepository::new());
        let engine = MatchingEngine::new(
            KeywordEmbedder { ready: true },
            ScriptedIndex::new(hits),
            Arc::clone(&candidates),
            MatchingConfig::default(),
            Duration::from_secs(5),
        );
        engine.add_candidate_to_index(candidate("gone", &["Python"], 4)).await.unwrap();
        engine.add_candidate_to_index(candidate("kept", &["Python"], 4)).await.unwrap();
        engine.add_candidate_to_index(candidate("third", &["Python"], 4)).await.unwrap();
        engine.add_candidate_to_index(candidate("fourth", &["Python"], 4)).await.unwrap();
        candidates.remove("gone");

        let matches = engine.find_matches_for_job(&job(&["Python"], 0), 4).await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["kept"]);
    }

    #[tokio::test]
    async fn test_out_of_order_slot_is_rejected() {
        let mut index = ScriptedIndex::new(Vec::new());
        index.slot_offset = 3;
        let engine = engine(index);

        let result = engine.add_candidate_to_index(candidate("a", &["Python"], 1)).await;
        assert!(matches!(
            result,
            Err(SkillMatchError::IndexInconsistent { expected: 0, actual: 3 })
        ));
        assert_eq!(engine.candidate_for_slot(3).await, None);
        assert!(!engine.candidates().contains("a"));

        // the index now holds an unmapped vector, so further adds refuse to run
        assert!(matches!(
            engine.add_candidate_to_index(candidate("b", &["Python"], 1)).await,
            Err(SkillMatchError::IndexInconsistent { expected: 0, actual: 1 })
        ));
        assert!(engine.candidates().is_empty());
    }

    #[tokio::test]
    async fn test_failed_add_leaves_repository_untouched() {
        let engine = MatchingEngine::new(
            GrowingEmbedder { calls: AtomicUsize::new(0) },
            FlatIndex::new(),
            InMemoryRepository::new(),
            MatchingConfig::default(),
            Duration::from_secs(5),
        );

        assert_eq!(engine.add_candidate_to_index(candidate("a", &["Python"], 2)).await.unwrap(), 0);
        assert!(matches!(
            engine.add_candidate_to_index(candidate("b", &["Python"], 2)).await,
            Err(SkillMatchError::DimensionMismatch { expected: 2, actual: 3 })
        ));

        assert!(engine.candidates().contains("a"));
        assert!(!engine.candidates().contains("b"));
        assert_eq!(engine.candidates().len(), 1);
        assert_eq!(engine.index_size().await, 1);
    }

    #[tokio::test]
    async fn test_overfetch_recovers_filtered_results() {
        let hits = vec![hit(0.9, 0), hit(0.8, 1), hit(0.7, 2)];
        let strict = engine(ScriptedIndex::new(hits.clone()));
        let overfetching = engine_with(
            ScriptedIndex::new(hits),
            MatchingConfig {
                overfetch_factor: 3,
                ..MatchingConfig::default()
            },
        );
        for engine in [&strict, &overfetching] {
            engine.add_candidate_to_index(candidate("new", &["Python"], 0)).await.unwrap();
            engine.add_candidate_to_index(candidate("vet", &["Python"], 9)).await.unwrap();
            engine.add_candidate_to_index(candidate("pro", &["Python"], 7)).await.unwrap();
        }
        let job = job(&["Python"], 5);

        assert!(strict.find_matches_for_job(&job, 1).await.unwrap().is_empty());

        let matches = overfetching.find_matches_for_job(&job, 1).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].candidate_id, "vet");
    }

    #[tokio::test]
    async fn test_concurrent_adds_keep_slots_aligned() {
        let engine = Arc::new(engine(FlatIndex::new()));
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..16 {
            let engine = Arc::clone(&engine);
            tasks.spawn(async move {
                let id = format!("cand-{}", i);
                let slot = engine.add_candidate_to_index(candidate(&id, &["Python"], 2)).await.unwrap();
                (slot, id)
            });
        }

        let mut seen = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (slot, id) = joined.unwrap();
            assert_eq!(engine.candidate_for_slot(slot).await, Some(id));
            seen.push(slot);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<_>>());
        assert_eq!(engine.index_size().await, 16);
    }

    #[tokio::test]
    async fn test_embedding_timeout_surfaces_as_error() {
        let engine = MatchingEngine::new(
            SlowEmbedder,
            FlatIndex::new(),
            InMemoryRepository::new(),
            MatchingConfig::default(),
            Duration::from_millis(20),
        );

        assert!(matches!(
            engine.add_candidate_to_index(candidate("a", &[], 0)).await,
            Err(SkillMatchError::Timeout { .. })
        ));
    }

    #[test]
    fn test_explanation_template() {
        let config = MatchingConfig::default();
        let c = candidate("a", &["Python", "PyTorch", "Spark", "SQL"], 6);
        let j = job(&["Python", "PyTorch", "Spark", "SQL", "Kubernetes"], 0);
        let overlap: BTreeSet<String> = c.skills.intersection(&j.required_skills).cloned().collect();

        let text = explain_match(&c, &j, &overlap, 0.8123, &config);
        assert_eq!(
            text,
            "Score: 0.81 | Skill Match: 4/5 (80%) | Key matches: PyTorch, Python, SQL | Senior experience level"
        );
    }

    #[test]
    fn test_explanation_without_required_skills() {
        let config = MatchingConfig::default();
        let text = explain_match(&candidate("a", &[], 1), &job(&[], 0), &BTreeSet::new(), 0.5, &config);
        assert_eq!(text, "Score: 0.50 | Skill Match: 0/0 (0%) | Junior level");
    }

    #[test]
    fn test_experience_tiers() {
        let config = MatchingConfig::default();
        assert_eq!(experience_tier(5, &config), "Senior experience level");
        assert_eq!(experience_tier(2, &config), "Mid-level experience");
        assert_eq!(experience_tier(4, &config), "Mid-level experience");
        assert_eq!(experience_tier(1, &config), "Junior level");
    }
}
