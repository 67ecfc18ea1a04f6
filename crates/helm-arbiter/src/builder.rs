//! Fluent builder for constructing an [`Arbiter`].

use helm_behavior::{Behavior, BehaviorRegistry, BehaviorTemplate, Templating};
use helm_core::{BehaviorId, CycleClock, StateStore, TemplateId, Value};
use helm_ivp::DecisionDomain;
use helm_mode::{ModeEntry, ModeEvaluator};
use tracing::{info, warn};

use crate::{Arbiter, ArbiterConfig, ArbiterError, ArbiterResult, LifeEvent, LifeEventKind, LoadedConfig};

/// Fluent builder for [`Arbiter`].
///
/// # Required inputs
///
/// - [`DecisionDomain`] with at least one axis
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                           |
/// |---------------------|-----------------------------------|
/// | `.registry(r)`      | `BehaviorRegistry::with_builtins` |
/// | `.templates(v)`     | none                              |
/// | `.mode(e)`          | no mode variables                 |
/// | `.initial(v)`       | no initial postings               |
/// | `.config(c)`        | `ArbiterConfig::default()`        |
/// | `.loaded(l)`        | adds everything a file declared   |
///
/// Templates that fail to instantiate do not fail the build: they are
/// dropped with a warning, published on the first cycle.
///
/// # Example
///
/// ```rust,ignore
/// let domain = DecisionDomain::new()
///     .with_axis("course", 0.0, 359.0, 360)?
///     .with_axis("speed", 0.0, 4.0, 21)?;
/// let mut arbiter = ArbiterBuilder::new(domain)
///     .loaded(load_str(BHV_FILE))
///     .build()?;
/// let out = arbiter.run_cycle(0.0, &mut NoopObserver);
/// ```
pub struct ArbiterBuilder {
    domain:    DecisionDomain,
    registry:  Option<BehaviorRegistry>,
    templates: Vec<BehaviorTemplate>,
    modes:     Vec<ModeEntry>,
    initial:   Vec<(String, Value)>,
    config:    ArbiterConfig,
    warnings:  Vec<String>,
}

impl ArbiterBuilder {
    pub fn new(domain: DecisionDomain) -> Self {
        Self {
            domain,
            registry:  None,
            templates: Vec::new(),
            modes:     Vec::new(),
            initial:   Vec::new(),
            config:    ArbiterConfig::default(),
            warnings:  Vec::new(),
        }
    }

    /// Supply the behavior type table.  Replaces the built-in one.
    pub fn registry(mut self, registry: BehaviorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn templates(mut self, templates: Vec<BehaviorTemplate>) -> Self {
        self.templates.extend(templates);
        self
    }

    pub fn template(mut self, template: BehaviorTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Append a mode entry.  Entries are evaluated in the order added.
    pub fn mode(mut self, entry: ModeEntry) -> Self {
        self.modes.push(entry);
        self
    }

    /// Postings made at the start of the first cycle, before modes.
    pub fn initial(mut self, postings: Vec<(String, Value)>) -> Self {
        self.initial.extend(postings);
        self
    }

    pub fn config(mut self, config: ArbiterConfig) -> Self {
        self.config = config;
        self
    }

    /// Add everything a loaded file declared.  Its warnings are carried
    /// forward to the first cycle.
    pub fn loaded(mut self, loaded: LoadedConfig) -> Self {
        self.templates.extend(loaded.templates);
        self.modes.extend(loaded.modes);
        self.initial.extend(loaded.initial);
        self.warnings.extend(loaded.warnings.iter().map(ToString::to_string));
        self
    }

    /// Validate the domain, instantiate startup behaviors, and return a
    /// ready-to-run [`Arbiter`].
    pub fn build(self) -> ArbiterResult<Arbiter> {
        if self.domain.dims() == 0 {
            return Err(ArbiterError::Config("decision domain has no axes".into()));
        }
        if self.templates.len() >= TemplateId::INVALID.index() {
            return Err(ArbiterError::Config(format!("too many templates ({})", self.templates.len())));
        }

        let registry = self.registry.unwrap_or_else(BehaviorRegistry::with_builtins);
        let mut warnings = self.warnings;
        let mut templates = Vec::with_capacity(self.templates.len());
        let mut behaviors = Vec::new();
        let mut events = Vec::new();
        let mut next_id = BehaviorId(0);

        for template in self.templates {
            let tid = TemplateId(templates.len() as u16);
            let built = registry.instantiate(&template).map_err(ArbiterError::from).and_then(|b| {
                if behaviors.iter().any(|live: &Behavior| live.name() == b.name()) {
                    return Err(ArbiterError::NameCollision {
                        name:   b.name().to_string(),
                        origin: format!("{} at line {}", template.kind, template.line),
                    });
                }
                Ok(b)
            });
            let mut behavior = match built {
                Ok(b) => b,
                Err(e) => {
                    warn!(kind = %template.kind, line = template.line, error = %e, "template dropped");
                    warnings.push(format!("{} (line {}): {e}", template.kind, template.line));
                    continue;
                }
            };

            if template.templating != Templating::Spawn {
                behavior.assign_ids(next_id, tid);
                next_id = next_id.next();
                events.push(LifeEvent {
                    time:          0.0,
                    iteration:     Default::default(),
                    kind:          LifeEventKind::Spawn,
                    behavior:      behavior.name().to_string(),
                    behavior_type: behavior.type_name().to_string(),
                    spawn_string:  String::new(),
                });
                behaviors.push(behavior);
            }
            templates.push((tid, template));
        }

        let mut modes = ModeEvaluator::new();
        for entry in self.modes {
            modes.add_entry(entry);
        }

        info!(
            templates = templates.len(),
            behaviors = behaviors.len(),
            modes = modes.len(),
            warnings = warnings.len(),
            "arbiter built",
        );

        Ok(Arbiter {
            config:         self.config,
            clock:          CycleClock::new(),
            store:          StateStore::new(),
            domain:         self.domain,
            registry,
            templates,
            behaviors,
            modes,
            next_id,
            pending_init:   self.initial,
            pending_events: events,
            pending_warns:  warnings,
            warnings:       Vec::new(),
            spawned_total:  0,
            retired_total:  0,
            last_status:    None,
        })
    }
}
