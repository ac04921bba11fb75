//! Playthrough state and turn handling.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use qw_core::tag::gate_passes;
use qw_core::{ChoiceOption, Content, Stat, Step};

use crate::check::{CheckOutcome, resolve_check};
use crate::error::{EngineError, EngineResult};
use crate::mutation::{Mutation, apply_mutations};
use crate::player::PlayerState;
use crate::random::RandomSource;
use crate::select::select_step;
use crate::vars::{Interpolated, QuestVars, interpolate};

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// RNG seed for reproducible playthroughs.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// An option as presented to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableOption {
    /// Index to pass to [`Session::choose`].
    pub index: usize,
    /// Interpolated label.
    pub label: String,
    /// False when the option's gate fails; disabled options cannot be chosen.
    pub enabled: bool,
    /// Skill sources rolled when chosen.
    pub skill: Vec<String>,
    /// Difficulty class, when a check is attached.
    pub dc: Option<i64>,
}

/// A rendered step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scene {
    /// Step id.
    pub location: String,
    /// Display name from the locations table.
    pub display_name: Option<String>,
    /// Interpolated body text.
    pub text: String,
    /// Interpolated journal line.
    pub log: Option<String>,
    /// Options not hidden by a failing gate.
    pub options: Vec<AvailableOption>,
    /// True for non-coordinate steps, which the caller runs without a
    /// navigation pause.
    pub is_virtual: bool,
    /// Tag changes made by entering the step.
    pub mutations: Vec<Mutation>,
    /// Placeholders that rendered empty.
    pub unresolved: Vec<String>,
}

/// What happened when an option was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceResult {
    /// Label of the chosen option.
    pub option: String,
    /// Tag changes made by the option.
    pub mutations: Vec<Mutation>,
    /// The skill check, if the option had one.
    pub check: Option<CheckOutcome>,
    /// The step id headed to; `None` when a failed check has nowhere to go.
    pub target: Option<String>,
    /// The scene now on screen, or `None` when the target had no eligible
    /// step.
    pub scene: Option<Scene>,
}

/// Serializable session state for an external persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The player.
    pub player: PlayerState,
    /// Quest variable bindings.
    pub vars: QuestVars,
    /// The effective step on screen.
    pub step: Option<Step>,
    /// Journal lines so far.
    #[serde(default)]
    pub journal: Vec<String>,
}

/// A single playthrough over shared content.
pub struct Session<R: RandomSource = StdRng> {
    content: Arc<Content>,
    player: PlayerState,
    vars: QuestVars,
    current: Option<Step>,
    rng: R,
    journal: Vec<String>,
}

impl Session<StdRng> {
    /// Create a session with a fresh character and a seeded RNG.
    pub fn new(content: Arc<Content>, config: SessionConfig) -> Self {
        Self::with_rng(content, StdRng::seed_from_u64(config.seed))
    }
}

impl<R: RandomSource> Session<R> {
    /// Create a session drawing from `rng`.
    pub fn with_rng(content: Arc<Content>, rng: R) -> Self {
        let player = PlayerState::new(&content.config);
        Self {
            content,
            player,
            vars: QuestVars::new(),
            current: None,
            rng,
            journal: Vec::new(),
        }
    }

    /// The shared content.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Get the player state.
    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Get a mutable reference to the player state.
    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    /// The quest variables.
    pub fn vars(&self) -> &QuestVars {
        &self.vars
    }

    /// Journal lines recorded so far.
    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    /// The effective step on screen.
    pub fn current_step(&self) -> Option<&Step> {
        self.current.as_ref()
    }

    /// Spend unspent stat points.
    pub fn allocate(&mut self, stat: Stat, points: u32) -> EngineResult<()> {
        self.player.allocate(stat, points)
    }

    /// Enter the configured start location.
    pub fn start(&mut self) -> EngineResult<Option<Scene>> {
        let start = self
            .content
            .start_location()
            .ok_or(EngineError::NoStartLocation)?
            .to_string();
        Ok(self.enter(&start))
    }

    /// Select and execute the step at `location`.
    ///
    /// Returns `None`, leaving the current step unchanged, when nothing is
    /// eligible there.
    pub fn enter(&mut self, location: &str) -> Option<Scene> {
        let content = Arc::clone(&self.content);
        let view = self.player.view(&content.config);
        let selection = select_step(&content, location, &view, &mut self.rng)?;
        let step = selection.step;

        let mutations = apply_mutations(&step.parsed_tags(), &mut self.player.tags);
        self.vars.bind(&step.vars, &mut self.rng);
        let awarded = self.player.record_step(&content.config);
        if awarded > 0 {
            tracing::info!(awarded, "stat points awarded");
        }

        let scene = self.render(&step, mutations);
        if let Some(log) = scene.log.as_ref().filter(|l| !l.is_empty()) {
            self.journal.push(log.clone());
        }
        tracing::debug!(step = %step.id, options = scene.options.len(), "entered step");
        self.current = Some(step);
        Some(scene)
    }

    /// Re-render the current step without executing it again.
    pub fn current_scene(&self) -> Option<Scene> {
        self.current
            .as_ref()
            .map(|step| self.render(step, Vec::new()))
    }

    /// Take option `index` of the current step.
    pub fn choose(&mut self, index: usize) -> EngineResult<ChoiceResult> {
        let step = self.current.as_ref().ok_or(EngineError::NoCurrentStep)?;
        let option: ChoiceOption = self
            .content
            .options_for(step)
            .into_iter()
            .nth(index)
            .ok_or(EngineError::InvalidChoice(index))?;

        let gate = signature(&option);
        if !gate_passes(&gate, &self.player.view(&self.content.config)) {
            return Err(EngineError::OptionUnavailable(option.label));
        }

        let mutations = apply_mutations(&option.parsed_tags(), &mut self.player.tags);
        let check = option.check().map(|(sources, dc)| {
            resolve_check(
                &sources,
                dc,
                &self.player,
                &self.content.config,
                &mut self.rng,
            )
        });

        let target = match &check {
            Some(outcome) if !outcome.success => option.fail.clone(),
            _ => Some(option.pass.clone()),
        };
        let scene = match &target {
            Some(target) => self.enter(target),
            None => self.current_scene(),
        };

        Ok(ChoiceResult {
            option: option.label,
            mutations,
            check,
            target,
            scene,
        })
    }

    /// Capture the session for persistence.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            player: self.player.clone(),
            vars: self.vars.clone(),
            step: self.current.clone(),
            journal: self.journal.clone(),
        }
    }

    /// Resume from a snapshot. The step on screen is rendered, not executed.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> EngineResult<Option<Scene>> {
        if let Some(step) = &snapshot.step
            && !self.content.has_step(&step.id)
        {
            return Err(EngineError::InvalidSnapshot(format!(
                "unknown step '{}'",
                step.id
            )));
        }
        self.player = snapshot.player;
        self.vars = snapshot.vars;
        self.current = snapshot.step;
        self.journal = snapshot.journal;
        Ok(self.current_scene())
    }

    /// Start over with a fresh character and no variables.
    pub fn reset(&mut self) {
        self.player.reset(&self.content.config);
        self.vars = QuestVars::new();
        self.current = None;
        self.journal.clear();
    }

    fn render(&self, step: &Step, mutations: Vec<Mutation>) -> Scene {
        let view = self.player.view(&self.content.config);
        let mut unresolved = Vec::new();
        let mut fill = |text: &str| {
            let Interpolated {
                text,
                unresolved: missing,
            } = interpolate(text, |key| self.lookup(key));
            unresolved.extend(missing);
            text
        };

        let text = fill(&step.text);
        let log = step.log.as_deref().map(&mut fill);
        let options = self
            .content
            .options_for(step)
            .into_iter()
            .enumerate()
            .filter_map(|(index, option)| {
                let enabled = gate_passes(&signature(&option), &view);
                if option.hidden && !enabled {
                    return None;
                }
                let (skill, dc) = match option.check() {
                    Some((sources, dc)) => {
                        (sources.into_iter().map(String::from).collect(), Some(dc))
                    }
                    None => (Vec::new(), None),
                };
                Some(AvailableOption {
                    index,
                    label: fill(&option.label),
                    enabled,
                    skill,
                    dc,
                })
            })
            .collect();

        if !unresolved.is_empty() {
            tracing::warn!(step = %step.id, ?unresolved, "unresolved placeholders");
        }

        Scene {
            location: step.id.clone(),
            display_name: self.content.display_name(&step.id).map(String::from),
            text,
            log,
            options,
            is_virtual: step.is_virtual(),
            mutations,
            unresolved,
        }
    }

    /// Resolve a placeholder: quest variables first, then stats and
    /// progression counters.
    fn lookup(&self, key: &str) -> Option<String> {
        if let Some(value) = self.vars.get(key) {
            return Some(value.to_string());
        }
        if let Some(stat) = Stat::parse(key) {
            return Some(self.player.effective_stat(stat, &self.content.config).to_string());
        }
        match key {
            "experience" => Some(self.player.experience.to_string()),
            "steps" => Some(self.player.steps_completed.to_string()),
            _ => None,
        }
    }
}

fn signature(option: &ChoiceOption) -> Vec<qw_core::Tag> {
    option
        .parsed_tags()
        .into_iter()
        .filter(|t| t.op.is_signature())
        .collect()
}
