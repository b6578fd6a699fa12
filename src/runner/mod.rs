// Step runner
//
// Executes registered deployment steps in dependency order against a
// `DeployContext`, skipping steps whose post-condition already holds.

mod plan;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

use crate::config::DeployConfig;
use crate::context::DeployContext;
use crate::error::{DeployError, Result};
use plan::{topological_order, StepNode};

/// One unit of the deployment pipeline
#[async_trait]
pub trait Step: Send + Sync {
    /// Unique identifier, used in logs and errors
    fn id(&self) -> &str;

    /// Tags this step provides; at least one
    fn tags(&self) -> &[&str];

    /// Tags of the steps that must run before this one
    fn dependencies(&self) -> &[&str] {
        &[]
    }

    /// Check that the configuration this step needs is present
    fn validate(&self, _config: &DeployConfig) -> Result<()> {
        Ok(())
    }

    /// Whether the step's post-condition already holds
    async fn skip(&self, _ctx: &DeployContext) -> anyhow::Result<bool> {
        Ok(false)
    }

    async fn run(&self, ctx: &mut DeployContext) -> anyhow::Result<()>;
}

/// Registered steps, in registration order
#[derive(Default)]
pub struct StepRegistry {
    steps: Vec<Box<dyn Step>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step, rejecting malformed or duplicate ones
    pub fn register(&mut self, step: Box<dyn Step>) -> Result<()> {
        let id = step.id();
        if id.trim().is_empty() {
            return Err(DeployError::InvalidStep {
                id: id.to_string(),
                reason: "empty identifier".to_string(),
            });
        }
        if step.tags().is_empty() {
            return Err(DeployError::InvalidStep {
                id: id.to_string(),
                reason: "no tags".to_string(),
            });
        }
        if self.steps.iter().any(|existing| existing.id() == id) {
            return Err(DeployError::InvalidStep {
                id: id.to_string(),
                reason: "already registered".to_string(),
            });
        }
        self.steps.push(step);
        Ok(())
    }

    /// Register several steps
    pub fn register_all<I: IntoIterator<Item = Box<dyn Step>>>(&mut self, steps: I) -> Result<()> {
        for step in steps {
            self.register(step)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps in execution order, restricted to `filter` tags when non-empty
    pub fn plan(&self, filter: &[String]) -> Result<Vec<&dyn Step>> {
        let nodes: Vec<StepNode<'_>> = self
            .steps
            .iter()
            .map(|step| StepNode {
                id: step.id(),
                tags: step.tags(),
                dependencies: step.dependencies(),
            })
            .collect();
        let order = topological_order(&nodes, filter)?;
        Ok(order.into_iter().map(|index| self.steps[index].as_ref()).collect())
    }
}

/// How a step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Executed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub id: String,
    pub tags: Vec<String>,
    pub status: StepStatus,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub network: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<StepOutcome>,
}

impl RunReport {
    pub fn executed(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == StepStatus::Executed)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == StepStatus::Skipped)
    }

    pub fn status_of(&self, id: &str) -> Option<StepStatus> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.id == id)
            .map(|outcome| outcome.status)
    }
}

/// Dependency-ordered step runner
pub struct Runner {
    registry: StepRegistry,
}

impl Runner {
    pub fn new(registry: StepRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Run the planned steps, halting at the first failing action.
    ///
    /// The plan and every planned step's configuration are checked before
    /// anything touches the chain.
    pub async fn run(&self, ctx: &mut DeployContext, filter: &[String]) -> Result<RunReport> {
        let steps = self.registry.plan(filter)?;
        for step in &steps {
            step.validate(&ctx.config)?;
        }

        let started_at = Utc::now();
        info!(
            "running {} steps on {}: {}",
            steps.len(),
            ctx.config.network,
            steps.iter().map(|step| step.id()).collect::<Vec<_>>().join(", ")
        );

        let mut outcomes = Vec::with_capacity(steps.len());
        for step in steps {
            let skip = match step.skip(ctx).await {
                Ok(skip) => skip,
                Err(e) => {
                    debug!("skip check of {} failed, running it: {:#}", step.id(), e);
                    false
                }
            };

            let status = if skip {
                info!("step {} skipped: post-condition already satisfied", step.id());
                StepStatus::Skipped
            } else {
                info!("step {} executing", step.id());
                step.run(ctx).await.map_err(|source| DeployError::StepFailed {
                    step: step.id().to_string(),
                    source,
                })?;
                StepStatus::Executed
            };

            outcomes.push(StepOutcome {
                id: step.id().to_string(),
                tags: step.tags().iter().map(|tag| tag.to_string()).collect(),
                status,
            });
        }

        Ok(RunReport {
            network: ctx.config.network.clone(),
            started_at,
            finished_at: Utc::now(),
            outcomes,
        })
    }
}
