//! Application state shared by every connection: configuration, the optional
//! tutor client and the store of problems served over HTTP.
//!
//! Game sessions are not kept here. Each WebSocket connection owns its own
//! `GameSession`, so no session state is shared across tasks.

use std::{collections::{HashMap, HashSet, VecDeque}, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::config::{load_config_from_env, AppConfig};
use crate::domain::{Difficulty, MathProblem};
use crate::error::GenerationFailure;
use crate::generator::generate_with;
use crate::tutor::Tutor;

/// Problems by id, bounded: past `capacity` the oldest insertion is evicted.
pub struct ProblemStore {
    by_id: HashMap<String, MathProblem>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ProblemStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { by_id: HashMap::new(), order: VecDeque::new(), capacity }
    }

    pub fn insert(&mut self, p: MathProblem) {
        let id = p.id.clone();
        if self.by_id.insert(id.clone(), p).is_none() {
            self.order.push_back(id);
        }
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.by_id.remove(&old);
                debug!(target: "problem", id = %old, "Evicted stored problem");
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&MathProblem> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub problems: Arc<RwLock<ProblemStore>>,
    pub tutor: Option<Tutor>,
    pub config: AppConfig,
}

impl AppState {
    /// Build state from env: load config, init the tutor client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_config_from_env().unwrap_or_default();
        let tutor = Tutor::from_env(&config.tutor);
        if let Some(t) = &tutor {
            info!(target: "equation_adventure", base_url = %t.base_url, model = %t.model, "AI tutor enabled.");
        } else {
            info!(target: "equation_adventure", "AI tutor disabled (no TUTOR_API_KEY). Using local fallbacks.");
        }
        info!(
            target: "equation_adventure",
            retry_budget = config.game.retry_budget,
            advance_delay_ms = config.game.advance_delay_ms,
            store_capacity = config.game.store_capacity,
            locale = ?config.game.default_locale,
            "Game configuration"
        );
        Self::with_config(config, tutor)
    }

    pub fn with_config(config: AppConfig, tutor: Option<Tutor>) -> Self {
        let problems = Arc::new(RwLock::new(ProblemStore::new(config.game.store_capacity)));
        Self { problems, tutor, config }
    }

    /// Run the generator off the async executor. `seen` is a snapshot of the
    /// caller's set; the caller records the result's signature itself.
    #[instrument(level = "info", skip(self, seen), fields(%difficulty, seen = seen.len()))]
    pub async fn generate_problem(
        &self,
        difficulty: Difficulty,
        seen: HashSet<String>,
    ) -> Result<MathProblem, GenerationFailure> {
        let budget = self.config.game.retry_budget;
        let problem = tokio::task::spawn_blocking(move || {
            generate_with(difficulty, &seen, budget, &mut rand::thread_rng())
        })
        .await
        .map_err(|e| GenerationFailure(e.to_string()))?;
        info!(target: "problem", %difficulty, id = %problem.id, "Problem generated");
        Ok(problem)
    }

    /// Keep a problem so later stateless requests can refer to it by id.
    #[instrument(level = "debug", skip(self, p), fields(id = %p.id))]
    pub async fn remember(&self, p: MathProblem) {
        let mut store = self.problems.write().await;
        store.insert(p);
        debug!(target: "problem", stored = store.len(), "Problem stored");
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_problem(&self, id: &str) -> Option<MathProblem> {
        self.problems.read().await.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_equation;
    use crate::config::GameConfig;

    #[tokio::test]
    async fn generated_problems_can_be_looked_up() {
        let state = AppState::with_config(AppConfig::default(), None);
        let p = state.generate_problem(Difficulty::Hard, HashSet::new()).await.unwrap();
        assert!(check_equation(p.answer as f64, &p.equation).is_ok());
        assert!(state.get_problem(&p.id).await.is_none());

        state.remember(p.clone()).await;
        assert_eq!(state.get_problem(&p.id).await, Some(p));
    }

    #[tokio::test]
    async fn store_stays_at_capacity_and_drops_oldest() {
        let config = AppConfig { game: GameConfig { store_capacity: 3, ..GameConfig::default() }, ..AppConfig::default() };
        let state = AppState::with_config(config, None);

        let mut ids = Vec::new();
        for _ in 0..50 {
            let p = state.generate_problem(Difficulty::Easy, HashSet::new()).await.unwrap();
            ids.push(p.id.clone());
            state.remember(p).await;
            assert!(state.problems.read().await.len() <= 3);
        }

        assert_eq!(state.problems.read().await.len(), 3);
        assert!(state.get_problem(&ids[0]).await.is_none());
        assert!(state.get_problem(&ids[46]).await.is_none());
        for id in &ids[47..] {
            assert!(state.get_problem(id).await.is_some());
        }
    }

    #[test]
    fn reinserting_an_id_does_not_duplicate_its_slot() {
        let mut store = ProblemStore::new(2);
        let p = crate::generator::generate(Difficulty::Medium, &HashSet::new());
        store.insert(p.clone());
        store.insert(p.clone());
        assert_eq!(store.len(), 1);
        assert_eq!(store.order.len(), 1);
    }
}
